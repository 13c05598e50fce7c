//! Field-width tables for every wire structure.
//!
//! Each structure is described once here, as an ordered list of named fields
//! with their bit widths. Encoders write and decoders read against these
//! tables, so a width lives in exactly one place. A table's fixed size (the sum
//! of its non-variable widths) is the minimum input a decoder accepts.

use crate::error::{Result, SomeIpError};

/// Bit width of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// A fixed number of bits.
    Bits(u32),
    /// Trailing byte data whose size comes from elsewhere.
    Variable,
}

/// A named field of a wire structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    name: &'static str,
    width: Width,
}

impl Field {
    /// A fixed-width field.
    pub const fn fixed(name: &'static str, bits: u32) -> Self {
        Self {
            name,
            width: Width::Bits(bits),
        }
    }

    /// A variable-length byte field.
    pub const fn variable(name: &'static str) -> Self {
        Self {
            name,
            width: Width::Variable,
        }
    }

    /// Field name, as used in field maps and error messages.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Field width.
    pub const fn width(&self) -> Width {
        self.width
    }

    /// Fixed width in bits, zero for variable fields.
    pub const fn bits(&self) -> u32 {
        match self.width {
            Width::Bits(bits) => bits,
            Width::Variable => 0,
        }
    }

    /// Check if this is a variable-length field.
    pub const fn is_variable(&self) -> bool {
        matches!(self.width, Width::Variable)
    }

    /// Largest value the field can hold.
    pub const fn max_value(&self) -> u128 {
        match self.width {
            Width::Bits(bits) if bits >= 128 => u128::MAX,
            Width::Bits(bits) => (1u128 << bits) - 1,
            Width::Variable => 0,
        }
    }

    /// Check that `value` fits the field width.
    pub fn check(&self, value: u128) -> Result<()> {
        if self.is_variable() || value > self.max_value() {
            return Err(self.range_error(value));
        }
        Ok(())
    }

    pub(crate) fn range_error(&self, value: u128) -> SomeIpError {
        SomeIpError::FieldRange {
            field: self.name,
            bits: self.bits(),
            value,
        }
    }
}

/// An ordered field table for one wire structure.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    name: &'static str,
    fields: &'static [Field],
}

impl Schema {
    /// Create a schema from its fields in wire order.
    pub const fn new(name: &'static str, fields: &'static [Field]) -> Self {
        Self { name, fields }
    }

    /// Structure name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Fields in wire order.
    pub const fn fields(&self) -> &'static [Field] {
        self.fields
    }

    /// Sum of the fixed field widths, in bits.
    pub const fn fixed_bits(&self) -> u32 {
        let mut total = 0;
        let mut i = 0;
        while i < self.fields.len() {
            total += self.fields[i].bits();
            i += 1;
        }
        total
    }

    /// Sum of the fixed field widths, in bytes.
    pub const fn fixed_bytes(&self) -> usize {
        (self.fixed_bits() / 8) as usize
    }

    /// Check if the structure has any variable-length field.
    pub fn has_variable(&self) -> bool {
        self.fields.iter().any(Field::is_variable)
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&'static Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up a field width by name.
    pub fn width_of(&self, name: &str) -> Option<Width> {
        self.field(name).map(Field::width)
    }
}

/// Base SOME/IP header.
pub mod someip {
    use super::{Field, Schema};

    pub const SERVICE_ID: Field = Field::fixed("service_id", 16);
    pub const METHOD_ID: Field = Field::fixed("method_id", 16);
    pub const LENGTH: Field = Field::fixed("length", 32);
    pub const CLIENT_ID: Field = Field::fixed("client_id", 16);
    pub const SESSION_ID: Field = Field::fixed("session_id", 16);
    pub const PROTOCOL_VERSION: Field = Field::fixed("protocol_version", 8);
    pub const INTERFACE_VERSION: Field = Field::fixed("interface_version", 8);
    pub const MESSAGE_TYPE: Field = Field::fixed("message_type", 8);
    pub const RETURN_CODE: Field = Field::fixed("return_code", 8);
    pub const PAYLOAD: Field = Field::variable("payload");

    /// Header fields shared by every SOME/IP message.
    pub const HEADER: Schema = Schema::new(
        "SOME/IP header",
        &[
            SERVICE_ID,
            METHOD_ID,
            LENGTH,
            CLIENT_ID,
            SESSION_ID,
            PROTOCOL_VERSION,
            INTERFACE_VERSION,
            MESSAGE_TYPE,
            RETURN_CODE,
        ],
    );

    /// Header followed by an opaque payload.
    pub const MESSAGE: Schema = Schema::new(
        "SOME/IP message",
        &[
            SERVICE_ID,
            METHOD_ID,
            LENGTH,
            CLIENT_ID,
            SESSION_ID,
            PROTOCOL_VERSION,
            INTERFACE_VERSION,
            MESSAGE_TYPE,
            RETURN_CODE,
            PAYLOAD,
        ],
    );

    /// Bytes of header counted by the length field (client ID onwards).
    pub const LENGTH_COVERED_HEADER_BYTES: u32 = 8;
}

/// SOME/IP-SD message.
pub mod someip_sd {
    use super::someip::{
        CLIENT_ID, INTERFACE_VERSION, LENGTH, MESSAGE_TYPE, METHOD_ID, PROTOCOL_VERSION,
        RETURN_CODE, SERVICE_ID, SESSION_ID,
    };
    use super::{Field, Schema};

    pub const FLAGS: Field = Field::fixed("flags", 8);
    pub const RESERVED: Field = Field::fixed("reserved", 24);
    pub const LENGTH_OF_ENTRIES_ARRAY: Field = Field::fixed("length_of_entries_array", 32);
    pub const ENTRIES_ARRAY: Field = Field::variable("entries_array");
    pub const LENGTH_OF_OPTIONS_ARRAY: Field = Field::fixed("length_of_options_array", 32);
    pub const OPTIONS_ARRAY: Field = Field::variable("options_array");

    pub const PACKET: Schema = Schema::new(
        "SOME/IP-SD packet",
        &[
            SERVICE_ID,
            METHOD_ID,
            LENGTH,
            CLIENT_ID,
            SESSION_ID,
            PROTOCOL_VERSION,
            INTERFACE_VERSION,
            MESSAGE_TYPE,
            RETURN_CODE,
            FLAGS,
            RESERVED,
            LENGTH_OF_ENTRIES_ARRAY,
            ENTRIES_ARRAY,
            LENGTH_OF_OPTIONS_ARRAY,
            OPTIONS_ARRAY,
        ],
    );

    /// Bytes counted by the length field besides the two arrays: the 8
    /// trailing header bytes, flags + reserved, and both array length words.
    pub const LENGTH_COVERED_FIXED_BYTES: u32 = 20;
}

/// SOME/IP-SD entries.
pub mod entry {
    use super::{Field, Schema};

    pub const TYPE_FIELD: Field = Field::fixed("type_field", 8);
    pub const INDEX_FIRST_OPTION_RUN: Field = Field::fixed("index_first_option_run", 8);
    pub const INDEX_SECOND_OPTION_RUN: Field = Field::fixed("index_second_option_run", 8);
    pub const NUMBER_OF_OPTIONS_1: Field = Field::fixed("number_of_options_1", 4);
    pub const NUMBER_OF_OPTIONS_2: Field = Field::fixed("number_of_options_2", 4);
    pub const SERVICE_ID: Field = Field::fixed("service_id", 16);
    pub const INSTANCE_ID: Field = Field::fixed("instance_id", 16);
    pub const MAJOR_VERSION: Field = Field::fixed("major_version", 8);
    pub const TTL: Field = Field::fixed("ttl", 24);
    pub const MINOR_VERSION: Field = Field::fixed("minor_version", 32);
    pub const RESERVED: Field = Field::fixed("reserved", 12);
    pub const COUNTER: Field = Field::fixed("counter", 4);
    pub const EVENTGROUP_ID: Field = Field::fixed("eventgroup_id", 16);

    pub const SERVICE: Schema = Schema::new(
        "service entry",
        &[
            TYPE_FIELD,
            INDEX_FIRST_OPTION_RUN,
            INDEX_SECOND_OPTION_RUN,
            NUMBER_OF_OPTIONS_1,
            NUMBER_OF_OPTIONS_2,
            SERVICE_ID,
            INSTANCE_ID,
            MAJOR_VERSION,
            TTL,
            MINOR_VERSION,
        ],
    );

    pub const EVENTGROUP: Schema = Schema::new(
        "eventgroup entry",
        &[
            TYPE_FIELD,
            INDEX_FIRST_OPTION_RUN,
            INDEX_SECOND_OPTION_RUN,
            NUMBER_OF_OPTIONS_1,
            NUMBER_OF_OPTIONS_2,
            SERVICE_ID,
            INSTANCE_ID,
            MAJOR_VERSION,
            TTL,
            RESERVED,
            COUNTER,
            EVENTGROUP_ID,
        ],
    );
}

/// SOME/IP-SD endpoint options.
pub mod option {
    use super::{Field, Schema};

    pub const LENGTH: Field = Field::fixed("length", 16);
    pub const TYPE: Field = Field::fixed("type", 8);
    pub const DISCARDABLE_FLAG: Field = Field::fixed("discardable_flag", 1);
    pub const FLAG_RESERVED: Field = Field::fixed("bit_1_to_bit_7", 7);
    pub const IPV4_ADDRESS: Field = Field::fixed("ipv4_address", 32);
    pub const IPV6_ADDRESS: Field = Field::fixed("ipv6_address", 128);
    pub const RESERVED: Field = Field::fixed("reserved", 8);
    pub const TRANSPORT_PROTOCOL: Field = Field::fixed("transport_protocol", 8);
    pub const TRANSPORT_PROTOCOL_PORT_NUMBER: Field =
        Field::fixed("transport_protocol_port_number", 16);

    pub const IPV4: Schema = Schema::new(
        "IPv4 option",
        &[
            LENGTH,
            TYPE,
            DISCARDABLE_FLAG,
            FLAG_RESERVED,
            IPV4_ADDRESS,
            RESERVED,
            TRANSPORT_PROTOCOL,
            TRANSPORT_PROTOCOL_PORT_NUMBER,
        ],
    );

    pub const IPV6: Schema = Schema::new(
        "IPv6 option",
        &[
            LENGTH,
            TYPE,
            DISCARDABLE_FLAG,
            FLAG_RESERVED,
            IPV6_ADDRESS,
            RESERVED,
            TRANSPORT_PROTOCOL,
            TRANSPORT_PROTOCOL_PORT_NUMBER,
        ],
    );
}
