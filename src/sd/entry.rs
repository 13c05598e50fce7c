//! SOME/IP-SD entry types.
//!
//! Entries are decoded without looking at their type byte: a service entry
//! decoder accepts any 16 bytes and leaves it to [`EntryKind::classify`] to say
//! what the entry means.

use crate::bits::{BitReader, BitWriter};
use crate::error::{Result, SomeIpError};
use crate::fields::FieldMap;
use crate::header::ServiceId;
use crate::schema::entry as schema;

use super::types::{EntryKind, EntryType, EventgroupId, InstanceId, SD_ENTRY_SIZE};

/// Largest TTL an entry can carry (24 bits). Used as "until further notice".
pub const TTL_INFINITE: u32 = 0x00FF_FFFF;

fn check_len(structure: &'static str, data: &[u8]) -> Result<()> {
    if data.len() != SD_ENTRY_SIZE {
        return Err(SomeIpError::InvalidLength {
            structure,
            expected: SD_ENTRY_SIZE,
            actual: data.len(),
        });
    }
    Ok(())
}

fn into_array(bytes: Vec<u8>) -> Result<[u8; SD_ENTRY_SIZE]> {
    let len = bytes.len();
    bytes.try_into().map_err(|_| SomeIpError::InvalidLength {
        structure: "entry",
        expected: SD_ENTRY_SIZE,
        actual: len,
    })
}

/// A service entry (FindService, OfferService or StopOfferService).
///
/// Fields are public, so a struct literal can hold values wider than their
/// wire width. [`validate`](Self::validate) reports those; `encode` and
/// [`SdPacketBuilder::build`](super::packet::SdPacketBuilder::build) call it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEntry {
    /// Raw entry type code.
    pub type_field: u8,
    pub index_first_option_run: u8,
    pub index_second_option_run: u8,
    /// Number of options in first run (4 bits).
    pub number_of_options_1: u8,
    /// Number of options in second run (4 bits).
    pub number_of_options_2: u8,
    pub service_id: ServiceId,
    pub instance_id: InstanceId,
    pub major_version: u8,
    /// Time-to-live in seconds (24 bits, 0 = stop offer).
    pub ttl: u32,
    pub minor_version: u32,
}

impl ServiceEntry {
    /// Create a new FindService entry.
    pub fn find_service(
        service_id: ServiceId,
        instance_id: InstanceId,
        major_version: u8,
        minor_version: u32,
    ) -> Self {
        Self {
            type_field: EntryType::FindService as u8,
            index_first_option_run: 0,
            index_second_option_run: 0,
            number_of_options_1: 0,
            number_of_options_2: 0,
            service_id,
            instance_id,
            major_version,
            ttl: TTL_INFINITE,
            minor_version,
        }
    }

    /// Create a new OfferService entry. Fails if `ttl` does not fit 24 bits.
    pub fn offer_service(
        service_id: ServiceId,
        instance_id: InstanceId,
        major_version: u8,
        minor_version: u32,
        ttl: u32,
    ) -> Result<Self> {
        schema::TTL.check(ttl.into())?;
        Ok(Self {
            type_field: EntryType::OfferService as u8,
            ttl,
            ..Self::find_service(service_id, instance_id, major_version, minor_version)
        })
    }

    /// Create a StopOfferService entry (OfferService with TTL=0).
    pub fn stop_offer_service(
        service_id: ServiceId,
        instance_id: InstanceId,
        major_version: u8,
        minor_version: u32,
    ) -> Self {
        Self {
            type_field: EntryType::OfferService as u8,
            ttl: 0,
            ..Self::find_service(service_id, instance_id, major_version, minor_version)
        }
    }

    /// Reference `count` options starting at `index` as the first option run.
    pub fn with_first_run(mut self, index: u8, count: u8) -> Result<Self> {
        schema::NUMBER_OF_OPTIONS_1.check(count.into())?;
        self.index_first_option_run = index;
        self.number_of_options_1 = count;
        Ok(self)
    }

    /// Reference `count` options starting at `index` as the second option run.
    pub fn with_second_run(mut self, index: u8, count: u8) -> Result<Self> {
        schema::NUMBER_OF_OPTIONS_2.check(count.into())?;
        self.index_second_option_run = index;
        self.number_of_options_2 = count;
        Ok(self)
    }

    /// Build an entry from named fields. Option runs default to empty.
    pub fn from_fields(fields: &FieldMap) -> Result<Self> {
        Ok(Self {
            type_field: fields.uint(&schema::TYPE_FIELD)?,
            index_first_option_run: fields.uint_or(&schema::INDEX_FIRST_OPTION_RUN, 0)?,
            index_second_option_run: fields.uint_or(&schema::INDEX_SECOND_OPTION_RUN, 0)?,
            number_of_options_1: fields.uint_or(&schema::NUMBER_OF_OPTIONS_1, 0)?,
            number_of_options_2: fields.uint_or(&schema::NUMBER_OF_OPTIONS_2, 0)?,
            service_id: ServiceId(fields.uint(&schema::SERVICE_ID)?),
            instance_id: InstanceId(fields.uint(&schema::INSTANCE_ID)?),
            major_version: fields.uint(&schema::MAJOR_VERSION)?,
            ttl: fields.uint(&schema::TTL)?,
            minor_version: fields.uint(&schema::MINOR_VERSION)?,
        })
    }

    /// The operation this entry performs, if its type code is known.
    pub fn kind(&self) -> Option<EntryKind> {
        EntryKind::classify(self.type_field, self.ttl)
    }

    /// Check if this is a stop offer (type 0x01 with TTL = 0).
    pub fn is_stop_offer(&self) -> bool {
        self.kind() == Some(EntryKind::StopOfferService)
    }

    /// Check that the option counts fit 4 bits and the TTL fits 24 bits.
    pub fn validate(&self) -> Result<()> {
        schema::NUMBER_OF_OPTIONS_1.check(self.number_of_options_1.into())?;
        schema::NUMBER_OF_OPTIONS_2.check(self.number_of_options_2.into())?;
        schema::TTL.check(self.ttl.into())
    }

    /// Encode the entry to its 16 wire bytes.
    pub fn encode(&self) -> Result<[u8; SD_ENTRY_SIZE]> {
        self.validate()?;
        let mut writer = BitWriter::with_capacity(SD_ENTRY_SIZE);
        writer.put(&schema::TYPE_FIELD, self.type_field)?;
        writer.put(&schema::INDEX_FIRST_OPTION_RUN, self.index_first_option_run)?;
        writer.put(&schema::INDEX_SECOND_OPTION_RUN, self.index_second_option_run)?;
        writer.put(&schema::NUMBER_OF_OPTIONS_1, self.number_of_options_1)?;
        writer.put(&schema::NUMBER_OF_OPTIONS_2, self.number_of_options_2)?;
        writer.put(&schema::SERVICE_ID, self.service_id.0)?;
        writer.put(&schema::INSTANCE_ID, self.instance_id.0)?;
        writer.put(&schema::MAJOR_VERSION, self.major_version)?;
        writer.put(&schema::TTL, self.ttl)?;
        writer.put(&schema::MINOR_VERSION, self.minor_version)?;
        into_array(writer.into_bytes())
    }

    /// Decode an entry from exactly 16 bytes.
    pub fn decode(data: &[u8]) -> Result<Self> {
        check_len(schema::SERVICE.name(), data)?;

        let mut reader = BitReader::new(data);
        Ok(Self {
            type_field: reader.take(&schema::TYPE_FIELD)?,
            index_first_option_run: reader.take(&schema::INDEX_FIRST_OPTION_RUN)?,
            index_second_option_run: reader.take(&schema::INDEX_SECOND_OPTION_RUN)?,
            number_of_options_1: reader.take(&schema::NUMBER_OF_OPTIONS_1)?,
            number_of_options_2: reader.take(&schema::NUMBER_OF_OPTIONS_2)?,
            service_id: ServiceId(reader.take(&schema::SERVICE_ID)?),
            instance_id: InstanceId(reader.take(&schema::INSTANCE_ID)?),
            major_version: reader.take(&schema::MAJOR_VERSION)?,
            ttl: reader.take(&schema::TTL)?,
            minor_version: reader.take(&schema::MINOR_VERSION)?,
        })
    }
}

/// An eventgroup entry (Subscribe, StopSubscribe, Ack or Nack).
///
/// Like [`ServiceEntry`], sub-byte fields are checked by
/// [`validate`](Self::validate) rather than on assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventgroupEntry {
    /// Raw entry type code.
    pub type_field: u8,
    pub index_first_option_run: u8,
    pub index_second_option_run: u8,
    /// Number of options in first run (4 bits).
    pub number_of_options_1: u8,
    /// Number of options in second run (4 bits).
    pub number_of_options_2: u8,
    pub service_id: ServiceId,
    pub instance_id: InstanceId,
    pub major_version: u8,
    /// Time-to-live in seconds (24 bits, 0 = stop subscribe / nack).
    pub ttl: u32,
    /// Distinguishes parallel subscriptions to the same eventgroup (4 bits).
    pub counter: u8,
    pub eventgroup_id: EventgroupId,
}

impl EventgroupEntry {
    fn with_type(
        entry_type: EntryType,
        service_id: ServiceId,
        instance_id: InstanceId,
        major_version: u8,
        eventgroup_id: EventgroupId,
        ttl: u32,
        counter: u8,
    ) -> Result<Self> {
        schema::TTL.check(ttl.into())?;
        schema::COUNTER.check(counter.into())?;
        Ok(Self {
            type_field: entry_type as u8,
            index_first_option_run: 0,
            index_second_option_run: 0,
            number_of_options_1: 0,
            number_of_options_2: 0,
            service_id,
            instance_id,
            major_version,
            ttl,
            counter,
            eventgroup_id,
        })
    }

    /// Create a new SubscribeEventgroup entry.
    pub fn subscribe(
        service_id: ServiceId,
        instance_id: InstanceId,
        major_version: u8,
        eventgroup_id: EventgroupId,
        ttl: u32,
    ) -> Result<Self> {
        Self::with_type(
            EntryType::SubscribeEventgroup,
            service_id,
            instance_id,
            major_version,
            eventgroup_id,
            ttl,
            0,
        )
    }

    /// Create a StopSubscribeEventgroup entry (Subscribe with TTL=0).
    pub fn stop_subscribe(
        service_id: ServiceId,
        instance_id: InstanceId,
        major_version: u8,
        eventgroup_id: EventgroupId,
    ) -> Result<Self> {
        Self::subscribe(service_id, instance_id, major_version, eventgroup_id, 0)
    }

    /// Create a SubscribeEventgroupAck entry.
    pub fn subscribe_ack(
        service_id: ServiceId,
        instance_id: InstanceId,
        major_version: u8,
        eventgroup_id: EventgroupId,
        ttl: u32,
        counter: u8,
    ) -> Result<Self> {
        Self::with_type(
            EntryType::SubscribeEventgroupAck,
            service_id,
            instance_id,
            major_version,
            eventgroup_id,
            ttl,
            counter,
        )
    }

    /// Create a SubscribeEventgroupNack entry (Ack with TTL=0).
    pub fn subscribe_nack(
        service_id: ServiceId,
        instance_id: InstanceId,
        major_version: u8,
        eventgroup_id: EventgroupId,
        counter: u8,
    ) -> Result<Self> {
        Self::subscribe_ack(service_id, instance_id, major_version, eventgroup_id, 0, counter)
    }

    /// Reference `count` options starting at `index` as the first option run.
    pub fn with_first_run(mut self, index: u8, count: u8) -> Result<Self> {
        schema::NUMBER_OF_OPTIONS_1.check(count.into())?;
        self.index_first_option_run = index;
        self.number_of_options_1 = count;
        Ok(self)
    }

    /// Reference `count` options starting at `index` as the second option run.
    pub fn with_second_run(mut self, index: u8, count: u8) -> Result<Self> {
        schema::NUMBER_OF_OPTIONS_2.check(count.into())?;
        self.index_second_option_run = index;
        self.number_of_options_2 = count;
        Ok(self)
    }

    /// Build an entry from named fields. Option runs and counter default to zero.
    pub fn from_fields(fields: &FieldMap) -> Result<Self> {
        Ok(Self {
            type_field: fields.uint(&schema::TYPE_FIELD)?,
            index_first_option_run: fields.uint_or(&schema::INDEX_FIRST_OPTION_RUN, 0)?,
            index_second_option_run: fields.uint_or(&schema::INDEX_SECOND_OPTION_RUN, 0)?,
            number_of_options_1: fields.uint_or(&schema::NUMBER_OF_OPTIONS_1, 0)?,
            number_of_options_2: fields.uint_or(&schema::NUMBER_OF_OPTIONS_2, 0)?,
            service_id: ServiceId(fields.uint(&schema::SERVICE_ID)?),
            instance_id: InstanceId(fields.uint(&schema::INSTANCE_ID)?),
            major_version: fields.uint(&schema::MAJOR_VERSION)?,
            ttl: fields.uint(&schema::TTL)?,
            counter: fields.uint_or(&schema::COUNTER, 0)?,
            eventgroup_id: EventgroupId(fields.uint(&schema::EVENTGROUP_ID)?),
        })
    }

    /// The operation this entry performs, if its type code is known.
    pub fn kind(&self) -> Option<EntryKind> {
        EntryKind::classify(self.type_field, self.ttl)
    }

    /// Check if this is a stop subscribe or nack (TTL = 0).
    pub fn is_negative(&self) -> bool {
        self.ttl == 0
    }

    /// Check the 4-bit option counts and counter and the 24-bit TTL.
    pub fn validate(&self) -> Result<()> {
        schema::NUMBER_OF_OPTIONS_1.check(self.number_of_options_1.into())?;
        schema::NUMBER_OF_OPTIONS_2.check(self.number_of_options_2.into())?;
        schema::TTL.check(self.ttl.into())?;
        schema::COUNTER.check(self.counter.into())
    }

    /// Encode the entry to its 16 wire bytes.
    pub fn encode(&self) -> Result<[u8; SD_ENTRY_SIZE]> {
        self.validate()?;
        let mut writer = BitWriter::with_capacity(SD_ENTRY_SIZE);
        writer.put(&schema::TYPE_FIELD, self.type_field)?;
        writer.put(&schema::INDEX_FIRST_OPTION_RUN, self.index_first_option_run)?;
        writer.put(&schema::INDEX_SECOND_OPTION_RUN, self.index_second_option_run)?;
        writer.put(&schema::NUMBER_OF_OPTIONS_1, self.number_of_options_1)?;
        writer.put(&schema::NUMBER_OF_OPTIONS_2, self.number_of_options_2)?;
        writer.put(&schema::SERVICE_ID, self.service_id.0)?;
        writer.put(&schema::INSTANCE_ID, self.instance_id.0)?;
        writer.put(&schema::MAJOR_VERSION, self.major_version)?;
        writer.put(&schema::TTL, self.ttl)?;
        writer.zero(&schema::RESERVED)?;
        writer.put(&schema::COUNTER, self.counter)?;
        writer.put(&schema::EVENTGROUP_ID, self.eventgroup_id.0)?;
        into_array(writer.into_bytes())
    }

    /// Decode an entry from exactly 16 bytes. Reserved bits are ignored.
    pub fn decode(data: &[u8]) -> Result<Self> {
        check_len(schema::EVENTGROUP.name(), data)?;

        let mut reader = BitReader::new(data);
        let type_field = reader.take(&schema::TYPE_FIELD)?;
        let index_first_option_run = reader.take(&schema::INDEX_FIRST_OPTION_RUN)?;
        let index_second_option_run = reader.take(&schema::INDEX_SECOND_OPTION_RUN)?;
        let number_of_options_1 = reader.take(&schema::NUMBER_OF_OPTIONS_1)?;
        let number_of_options_2 = reader.take(&schema::NUMBER_OF_OPTIONS_2)?;
        let service_id = ServiceId(reader.take(&schema::SERVICE_ID)?);
        let instance_id = InstanceId(reader.take(&schema::INSTANCE_ID)?);
        let major_version = reader.take(&schema::MAJOR_VERSION)?;
        let ttl = reader.take(&schema::TTL)?;
        reader.skip(&schema::RESERVED)?;
        let counter = reader.take(&schema::COUNTER)?;
        let eventgroup_id = EventgroupId(reader.take(&schema::EVENTGROUP_ID)?);

        Ok(Self {
            type_field,
            index_first_option_run,
            index_second_option_run,
            number_of_options_1,
            number_of_options_2,
            service_id,
            instance_id,
            major_version,
            ttl,
            counter,
            eventgroup_id,
        })
    }
}

/// An SD entry (either Service or Eventgroup).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdEntry {
    Service(ServiceEntry),
    Eventgroup(EventgroupEntry),
}

impl SdEntry {
    /// Decode an entry, choosing the layout from its type byte.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let Some(&type_field) = data.first() else {
            return Err(SomeIpError::InvalidLength {
                structure: "entry",
                expected: SD_ENTRY_SIZE,
                actual: 0,
            });
        };

        match EntryType::from_u8(type_field) {
            Some(t) if t.is_service_entry() => Ok(SdEntry::Service(ServiceEntry::decode(data)?)),
            Some(_) => Ok(SdEntry::Eventgroup(EventgroupEntry::decode(data)?)),
            None => Err(SomeIpError::UnknownEntryType(type_field)),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            SdEntry::Service(e) => e.validate(),
            SdEntry::Eventgroup(e) => e.validate(),
        }
    }

    /// Encode the entry to its 16 wire bytes.
    pub fn encode(&self) -> Result<[u8; SD_ENTRY_SIZE]> {
        match self {
            SdEntry::Service(e) => e.encode(),
            SdEntry::Eventgroup(e) => e.encode(),
        }
    }

    /// The operation this entry performs, if its type code is known.
    pub fn kind(&self) -> Option<EntryKind> {
        match self {
            SdEntry::Service(e) => e.kind(),
            SdEntry::Eventgroup(e) => e.kind(),
        }
    }

    pub fn service_id(&self) -> ServiceId {
        match self {
            SdEntry::Service(e) => e.service_id,
            SdEntry::Eventgroup(e) => e.service_id,
        }
    }

    pub fn instance_id(&self) -> InstanceId {
        match self {
            SdEntry::Service(e) => e.instance_id,
            SdEntry::Eventgroup(e) => e.instance_id,
        }
    }

    pub fn ttl(&self) -> u32 {
        match self {
            SdEntry::Service(e) => e.ttl,
            SdEntry::Eventgroup(e) => e.ttl,
        }
    }
}

impl From<ServiceEntry> for SdEntry {
    fn from(entry: ServiceEntry) -> Self {
        SdEntry::Service(entry)
    }
}

impl From<EventgroupEntry> for SdEntry {
    fn from(entry: EventgroupEntry) -> Self {
        SdEntry::Eventgroup(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_entry_wire_layout() {
        let entry = ServiceEntry::offer_service(
            ServiceId(0x1234),
            InstanceId(0x0001),
            1,
            0x0000_000A,
            3,
        )
        .unwrap()
        .with_first_run(0, 1)
        .unwrap()
        .with_second_run(2, 3)
        .unwrap();

        assert_eq!(
            entry.encode().unwrap(),
            [
                0x01, 0x00, 0x02, 0x13, 0x12, 0x34, 0x00, 0x01, 0x01, 0x00, 0x00, 0x03, 0x00,
                0x00, 0x00, 0x0A
            ]
        );
    }

    #[test]
    fn test_service_entry_roundtrip() {
        let entry =
            ServiceEntry::offer_service(ServiceId(0x1234), InstanceId(0x0001), 1, 0, 3600).unwrap();

        let bytes = entry.encode().unwrap();
        let parsed = ServiceEntry::decode(&bytes).unwrap();

        assert_eq!(entry, parsed);
        assert_eq!(parsed.kind(), Some(EntryKind::OfferService));
    }

    #[test]
    fn test_find_service_entry() {
        let entry = ServiceEntry::find_service(
            ServiceId(0x1234),
            InstanceId::ANY,
            0xFF,       // Any major version
            0xFFFFFFFF, // Any minor version
        );

        assert_eq!(entry.type_field, EntryType::FindService as u8);
        assert_eq!(entry.instance_id, InstanceId::ANY);
        assert_eq!(entry.ttl, TTL_INFINITE);
        assert_eq!(entry.kind(), Some(EntryKind::FindService));
    }

    #[test]
    fn test_stop_offer() {
        let entry = ServiceEntry::stop_offer_service(ServiceId(0x1234), InstanceId(1), 1, 0);
        assert!(entry.is_stop_offer());

        let parsed = ServiceEntry::decode(&entry.encode().unwrap()).unwrap();
        assert_eq!(parsed.kind(), Some(EntryKind::StopOfferService));
    }

    #[test]
    fn test_ttl_out_of_range() {
        let err = ServiceEntry::offer_service(ServiceId(1), InstanceId(1), 1, 0, 0x0100_0000)
            .unwrap_err();
        assert!(matches!(err, SomeIpError::FieldRange { field: "ttl", .. }));
    }

    #[test]
    fn test_option_count_out_of_range() {
        let entry = ServiceEntry::find_service(ServiceId(1), InstanceId(1), 1, 0);
        let err = entry.with_first_run(0, 16).unwrap_err();
        assert!(matches!(
            err,
            SomeIpError::FieldRange {
                field: "number_of_options_1",
                bits: 4,
                value: 16
            }
        ));
    }

    #[test]
    fn test_encode_revalidates_public_fields() {
        let mut entry = ServiceEntry::find_service(ServiceId(1), InstanceId(1), 1, 0);
        entry.number_of_options_2 = 0x10;
        assert!(matches!(
            entry.encode(),
            Err(SomeIpError::FieldRange {
                field: "number_of_options_2",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_struct_literal() {
        let entry = ServiceEntry {
            ttl: 0x0100_0000,
            ..ServiceEntry::find_service(ServiceId(1), InstanceId(1), 1, 0)
        };
        assert!(matches!(
            entry.validate(),
            Err(SomeIpError::FieldRange { field: "ttl", bits: 24, .. })
        ));

        let entry = EventgroupEntry {
            counter: 0x10,
            ..EventgroupEntry::subscribe(ServiceId(1), InstanceId(1), 1, EventgroupId(1), 3)
                .unwrap()
        };
        assert!(matches!(
            SdEntry::from(entry.clone()).validate(),
            Err(SomeIpError::FieldRange { field: "counter", .. })
        ));
        assert!(entry.encode().is_err());

        let entry = EventgroupEntry { counter: 0x0F, ..entry };
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn test_decode_wrong_length() {
        for len in [0, 15, 17] {
            let err = ServiceEntry::decode(&vec![0u8; len]).unwrap_err();
            assert!(matches!(
                err,
                SomeIpError::InvalidLength {
                    expected: 16,
                    actual,
                    ..
                } if actual == len
            ));
            assert!(EventgroupEntry::decode(&vec![0u8; len]).is_err());
        }
    }

    #[test]
    fn test_from_fields_major_version_out_of_range() {
        let fields = FieldMap::new()
            .with("type_field", 1i64)
            .with("service_id", 0x1234u16)
            .with("instance_id", 1u16)
            .with("major_version", 256i64)
            .with("ttl", 3i64)
            .with("minor_version", 0i64);

        let err = ServiceEntry::from_fields(&fields).unwrap_err();
        assert!(matches!(
            err,
            SomeIpError::FieldRange {
                field: "major_version",
                bits: 8,
                value: 256
            }
        ));
    }

    #[test]
    fn test_from_fields_service_entry() {
        let fields = FieldMap::from_toml(
            r#"
            type_field = 0x01
            number_of_options_1 = 1
            service_id = 0x1234
            instance_id = 0x0001
            major_version = 1
            ttl = 0
            minor_version = 0
            "#,
        )
        .unwrap();

        let entry = ServiceEntry::from_fields(&fields).unwrap();
        assert_eq!(entry.number_of_options_1, 1);
        assert_eq!(entry.index_first_option_run, 0);
        assert!(entry.is_stop_offer());
    }

    #[test]
    fn test_eventgroup_entry_wire_layout() {
        let entry = EventgroupEntry::subscribe_ack(
            ServiceId(0x1234),
            InstanceId(0x0001),
            1,
            EventgroupId(0x0005),
            0x000102,
            0xA,
        )
        .unwrap();

        let bytes = entry.encode().unwrap();
        assert_eq!(bytes[0], 0x07);
        assert_eq!(&bytes[9..12], &[0x00, 0x01, 0x02]);
        assert_eq!(bytes[12], 0x00);
        assert_eq!(bytes[13], 0x0A);
        assert_eq!(&bytes[14..16], &[0x00, 0x05]);
    }

    #[test]
    fn test_eventgroup_decode_ignores_reserved_bits() {
        let entry = EventgroupEntry::subscribe(
            ServiceId(0x1234),
            InstanceId(0x0001),
            1,
            EventgroupId(0x0001),
            3600,
        )
        .unwrap();
        let mut bytes = entry.encode().unwrap();
        bytes[12] = 0xFF;
        bytes[13] |= 0xF0;

        let parsed = EventgroupEntry::decode(&bytes).unwrap();
        assert_eq!(parsed, entry);
    }

    #[test]
    fn test_subscribe_ack_nack() {
        let ack = EventgroupEntry::subscribe_ack(
            ServiceId(0x1234),
            InstanceId(0x0001),
            1,
            EventgroupId(0x0001),
            3600,
            0,
        )
        .unwrap();
        assert!(!ack.is_negative());
        assert_eq!(ack.kind(), Some(EntryKind::SubscribeEventgroupAck));

        let nack = EventgroupEntry::subscribe_nack(
            ServiceId(0x1234),
            InstanceId(0x0001),
            1,
            EventgroupId(0x0001),
            0,
        )
        .unwrap();
        assert!(nack.is_negative());
        assert_eq!(nack.kind(), Some(EntryKind::SubscribeEventgroupNack));

        let stop = EventgroupEntry::stop_subscribe(
            ServiceId(0x1234),
            InstanceId(0x0001),
            1,
            EventgroupId(0x0001),
        )
        .unwrap();
        assert_eq!(stop.kind(), Some(EntryKind::StopSubscribeEventgroup));
    }

    #[test]
    fn test_counter_out_of_range() {
        let err = EventgroupEntry::subscribe_ack(
            ServiceId(1),
            InstanceId(1),
            1,
            EventgroupId(1),
            1,
            0x10,
        )
        .unwrap_err();
        assert!(matches!(err, SomeIpError::FieldRange { field: "counter", .. }));
    }

    #[test]
    fn test_sd_entry_dispatch() {
        let service =
            ServiceEntry::offer_service(ServiceId(0x1234), InstanceId(0x0001), 1, 0, 3600).unwrap();
        let entry = SdEntry::decode(&service.encode().unwrap()).unwrap();
        assert!(matches!(entry, SdEntry::Service(_)));

        let eventgroup = EventgroupEntry::subscribe(
            ServiceId(0x1234),
            InstanceId(0x0001),
            1,
            EventgroupId(0x0001),
            3600,
        )
        .unwrap();
        let entry = SdEntry::decode(&eventgroup.encode().unwrap()).unwrap();
        assert!(matches!(entry, SdEntry::Eventgroup(_)));
        assert_eq!(entry.kind(), Some(EntryKind::SubscribeEventgroup));

        let mut unknown = [0u8; SD_ENTRY_SIZE];
        unknown[0] = 0x42;
        assert!(matches!(
            SdEntry::decode(&unknown),
            Err(SomeIpError::UnknownEntryType(0x42))
        ));
    }
}
