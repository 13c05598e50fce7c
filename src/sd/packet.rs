//! SOME/IP-SD packet codec.
//!
//! An SD packet is a SOME/IP header followed by a flags byte, 24 reserved
//! bits and two length-prefixed arrays. The packet keeps both arrays as raw
//! bytes; [`SdPacket::entries`] and [`SdPacket::options`] split them further.

use bytes::Bytes;
use tracing::debug;

use crate::bits::{BitReader, BitWriter};
use crate::error::{Result, SomeIpError};
use crate::fields::FieldMap;
use crate::header::{ClientId, MethodId, ServiceId, SessionId, SomeIpHeader};
use crate::schema::{someip, someip_sd, Field};
use crate::types::MessageType;

use super::entry::SdEntry;
use super::option::SdOption;
use super::types::{EntryKind, SdFlags, SD_ENTRY_SIZE, SD_METHOD_ID, SD_SERVICE_ID};

/// Smallest valid SD packet: header, flags, reserved and both array lengths.
pub const SD_MIN_SIZE: usize = someip_sd::PACKET.fixed_bytes();

fn array_len(field: &Field, len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| field.range_error(len as u128))
}

fn check_entries_len(len: usize) -> Result<()> {
    if len % SD_ENTRY_SIZE != 0 {
        return Err(SomeIpError::InvalidLength {
            structure: "entries array",
            expected: len - len % SD_ENTRY_SIZE,
            actual: len,
        });
    }
    Ok(())
}

/// A SOME/IP-SD packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdPacket {
    pub header: SomeIpHeader,
    pub flags: SdFlags,
    /// Concatenated 16-byte entries.
    pub entries_array: Bytes,
    /// Concatenated options.
    pub options_array: Bytes,
}

impl SdPacket {
    /// Create a packet. The entries array must be a whole number of entries.
    pub fn new(
        header: SomeIpHeader,
        flags: SdFlags,
        entries_array: impl Into<Bytes>,
        options_array: impl Into<Bytes>,
    ) -> Result<Self> {
        let packet = Self {
            header,
            flags,
            entries_array: entries_array.into(),
            options_array: options_array.into(),
        };
        check_entries_len(packet.entries_array.len())?;
        packet.length()?;
        Ok(packet)
    }

    /// Start building a packet addressed to the SD service.
    pub fn builder() -> SdPacketBuilder {
        SdPacketBuilder::new()
    }

    /// Build a packet from named fields.
    ///
    /// `entries_array` and `options_array` are byte arrays and default to
    /// empty, `flags` defaults to zero.
    pub fn from_fields(fields: &FieldMap) -> Result<Self> {
        Self::new(
            SomeIpHeader::from_fields(fields)?,
            SdFlags(fields.uint_or(&someip_sd::FLAGS, 0)?),
            fields.bytes(&someip_sd::ENTRIES_ARRAY)?,
            fields.bytes(&someip_sd::OPTIONS_ARRAY)?,
        )
    }

    /// Value of the length field: `20 + entries + options`.
    pub fn length(&self) -> Result<u32> {
        let length = someip_sd::LENGTH_COVERED_FIXED_BYTES as usize
            + self.entries_array.len()
            + self.options_array.len();
        u32::try_from(length).map_err(|_| someip::LENGTH.range_error(length as u128))
    }

    /// Size of the encoded packet.
    pub fn total_size(&self) -> usize {
        SD_MIN_SIZE + self.entries_array.len() + self.options_array.len()
    }

    /// Encode the packet to wire bytes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        check_entries_len(self.entries_array.len())?;

        let mut writer = BitWriter::with_capacity(self.total_size());
        self.header.write(&mut writer, self.length()?)?;
        writer.put(&someip_sd::FLAGS, self.flags.0)?;
        writer.zero(&someip_sd::RESERVED)?;
        writer.put(
            &someip_sd::LENGTH_OF_ENTRIES_ARRAY,
            array_len(&someip_sd::LENGTH_OF_ENTRIES_ARRAY, self.entries_array.len())?,
        )?;
        writer.put_bytes(&self.entries_array)?;
        writer.put(
            &someip_sd::LENGTH_OF_OPTIONS_ARRAY,
            array_len(&someip_sd::LENGTH_OF_OPTIONS_ARRAY, self.options_array.len())?,
        )?;
        writer.put_bytes(&self.options_array)?;
        Ok(writer.into_bytes())
    }

    /// Decode a packet from wire bytes.
    ///
    /// The header length field is not consulted. Each array length must fit
    /// the remaining input; bytes after the options array are ignored.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < SD_MIN_SIZE {
            return Err(SomeIpError::truncated(SD_MIN_SIZE, data.len()));
        }

        let mut reader = BitReader::new(data);
        let (header, wire_length) = SomeIpHeader::read(&mut reader)?;
        let flags = SdFlags(reader.take(&someip_sd::FLAGS)?);
        reader.skip(&someip_sd::RESERVED)?;

        let entries_len: u32 = reader.take(&someip_sd::LENGTH_OF_ENTRIES_ARRAY)?;
        let entries_array = Self::read_array(&mut reader, data.len(), entries_len)?;
        check_entries_len(entries_array.len())?;

        let options_len: u32 = reader.take(&someip_sd::LENGTH_OF_OPTIONS_ARRAY)?;
        let options_array = Self::read_array(&mut reader, data.len(), options_len)?;

        let packet = Self {
            header,
            flags,
            entries_array,
            options_array,
        };

        let trailing = reader.remaining_bytes();
        if trailing > 0 || Some(wire_length) != packet.length().ok() {
            debug!(
                wire_length,
                trailing, "SOME/IP-SD length field disagrees with received arrays"
            );
        }

        Ok(packet)
    }

    fn read_array(reader: &mut BitReader<'_>, total: usize, declared: u32) -> Result<Bytes> {
        let declared = declared as usize;
        let available = reader.remaining_bytes();
        if declared > available {
            let consumed = total - available;
            return Err(SomeIpError::truncated(consumed + declared, total));
        }
        Ok(Bytes::copy_from_slice(reader.read_bytes(declared)?))
    }

    /// Number of entries in the entries array.
    pub fn entry_count(&self) -> usize {
        self.entries_array.len() / SD_ENTRY_SIZE
    }

    /// Iterate over the raw 16-byte entries.
    pub fn entries(&self) -> impl Iterator<Item = RawEntry<'_>> {
        self.entries_array
            .chunks_exact(SD_ENTRY_SIZE)
            .map(|bytes| RawEntry { bytes })
    }

    /// Decode every entry.
    pub fn decode_entries(&self) -> Result<Vec<SdEntry>> {
        self.entries().map(|raw| raw.decode()).collect()
    }

    /// Split and decode the options array.
    pub fn options(&self) -> Result<Vec<SdOption>> {
        SdOption::decode_all(&self.options_array)
    }
}

/// One undecoded 16-byte entry of an entries array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEntry<'a> {
    bytes: &'a [u8],
}

impl<'a> RawEntry<'a> {
    /// Entry type code (first byte).
    pub fn type_field(&self) -> u8 {
        self.bytes[0]
    }

    /// The 24-bit TTL at bytes 9..12.
    pub fn ttl(&self) -> u32 {
        u32::from_be_bytes([0, self.bytes[9], self.bytes[10], self.bytes[11]])
    }

    /// The operation this entry performs, if its type code is known.
    pub fn kind(&self) -> Option<EntryKind> {
        EntryKind::classify(self.type_field(), self.ttl())
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Decode the entry with the layout chosen by its type code.
    pub fn decode(&self) -> Result<SdEntry> {
        SdEntry::decode(self.bytes)
    }
}

/// Builder for SD packets addressed to service 0xFFFF, method 0x8100.
#[derive(Debug, Clone)]
pub struct SdPacketBuilder {
    client_id: ClientId,
    session_id: SessionId,
    interface_version: u8,
    flags: SdFlags,
    entries: Vec<SdEntry>,
    options: Vec<SdOption>,
}

impl SdPacketBuilder {
    pub fn new() -> Self {
        Self {
            client_id: ClientId::default(),
            session_id: SessionId::default(),
            interface_version: 1,
            flags: SdFlags::default(),
            entries: Vec::new(),
            options: Vec::new(),
        }
    }

    pub fn client_id(mut self, client_id: ClientId) -> Self {
        self.client_id = client_id;
        self
    }

    pub fn session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn interface_version(mut self, version: u8) -> Self {
        self.interface_version = version;
        self
    }

    /// Set flag bits (see the [`SdFlags`] constants).
    pub fn flags(mut self, flags: u8) -> Self {
        self.flags = SdFlags(flags);
        self
    }

    /// Append an entry.
    pub fn entry(mut self, entry: impl Into<SdEntry>) -> Self {
        self.entries.push(entry.into());
        self
    }

    /// Append an option. Options are indexed in the order they are added.
    pub fn option(mut self, option: impl Into<SdOption>) -> Self {
        self.options.push(option.into());
        self
    }

    /// Validate every entry, then encode entries and options and assemble
    /// the packet.
    pub fn build(self) -> Result<SdPacket> {
        for entry in &self.entries {
            entry.validate()?;
        }
        let mut entries = Vec::with_capacity(self.entries.len() * SD_ENTRY_SIZE);
        for entry in &self.entries {
            entries.extend_from_slice(&entry.encode()?);
        }
        let mut options = Vec::new();
        for option in &self.options {
            options.extend_from_slice(&option.encode()?);
        }

        let header = SomeIpHeader {
            client_id: self.client_id,
            session_id: self.session_id,
            interface_version: self.interface_version,
            message_type: MessageType::Notification,
            ..SomeIpHeader::new(ServiceId(SD_SERVICE_ID), MethodId(SD_METHOD_ID))
        };
        SdPacket::new(header, self.flags, entries, options)
    }
}

impl Default for SdPacketBuilder {
    fn default() -> Self {
        Self::new()
    }
}
