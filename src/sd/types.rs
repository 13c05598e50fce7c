//! SOME/IP-SD type definitions.

use std::net::Ipv4Addr;

/// SD Service ID (always 0xFFFF).
pub const SD_SERVICE_ID: u16 = 0xFFFF;

/// SD Method ID (always 0x8100).
pub const SD_METHOD_ID: u16 = 0x8100;

/// Default SD multicast address.
pub const SD_MULTICAST_ADDR: Ipv4Addr = Ipv4Addr::new(224, 224, 224, 245);

/// Default SD port.
pub const SD_DEFAULT_PORT: u16 = 30490;

/// Size of an SD entry in bytes.
pub const SD_ENTRY_SIZE: usize = 16;

/// Instance ID for a service instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InstanceId(pub u16);

impl InstanceId {
    /// Wildcard instance ID that matches any instance.
    pub const ANY: InstanceId = InstanceId(0xFFFF);

    /// Check if this is the wildcard instance ID.
    pub fn is_any(&self) -> bool {
        self.0 == 0xFFFF
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

/// Eventgroup ID for event subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EventgroupId(pub u16);

impl std::fmt::Display for EventgroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

/// The flags byte that follows the SOME/IP header of an SD message.
///
/// Kept as the raw byte so that bits without a defined meaning survive a
/// decode/encode cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SdFlags(pub u8);

impl SdFlags {
    /// Sender has rebooted since its last SD message.
    pub const REBOOT: u8 = 0x80;
    /// Sender accepts unicast SD messages.
    pub const UNICAST: u8 = 0x40;
    /// Explicit initial data control.
    pub const EXPLICIT_INITIAL_DATA: u8 = 0x20;

    /// Check whether every bit of `mask` is set.
    pub fn contains(&self, mask: u8) -> bool {
        self.0 & mask == mask
    }

    /// Return a copy with the bits of `mask` set.
    pub fn with(self, mask: u8) -> Self {
        Self(self.0 | mask)
    }

    /// Check the reboot flag.
    pub fn reboot(&self) -> bool {
        self.contains(Self::REBOOT)
    }

    /// Check the unicast flag.
    pub fn unicast(&self) -> bool {
        self.contains(Self::UNICAST)
    }

    /// Check the explicit initial data control flag.
    pub fn explicit_initial_data(&self) -> bool {
        self.contains(Self::EXPLICIT_INITIAL_DATA)
    }
}

impl From<u8> for SdFlags {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

/// SD entry type codes as they appear on the wire.
///
/// Codes 0x01, 0x06 and 0x07 each stand for two operations that differ only
/// in the entry TTL; see [`EntryKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EntryType {
    /// Find a service.
    FindService = 0x00,
    /// Offer a service (TTL > 0) or stop offering (TTL = 0).
    OfferService = 0x01,
    /// Subscribe to an eventgroup (TTL > 0) or unsubscribe (TTL = 0).
    SubscribeEventgroup = 0x06,
    /// Acknowledge (TTL > 0) or reject (TTL = 0) a subscription.
    SubscribeEventgroupAck = 0x07,
}

impl EntryType {
    /// Create an EntryType from a raw byte value.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::FindService),
            0x01 => Some(Self::OfferService),
            0x06 => Some(Self::SubscribeEventgroup),
            0x07 => Some(Self::SubscribeEventgroupAck),
            _ => None,
        }
    }

    /// Check if this is a service entry type.
    pub fn is_service_entry(&self) -> bool {
        matches!(self, Self::FindService | Self::OfferService)
    }

    /// Check if this is an eventgroup entry type.
    pub fn is_eventgroup_entry(&self) -> bool {
        matches!(self, Self::SubscribeEventgroup | Self::SubscribeEventgroupAck)
    }
}

/// The operation an entry performs, with the TTL overload resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    FindService,
    OfferService,
    StopOfferService,
    SubscribeEventgroup,
    StopSubscribeEventgroup,
    SubscribeEventgroupAck,
    SubscribeEventgroupNack,
}

impl EntryKind {
    /// Resolve a decoded type byte and TTL into an operation.
    ///
    /// Returns `None` for type bytes outside the known entry types.
    pub fn classify(type_field: u8, ttl: u32) -> Option<Self> {
        let stop = ttl == 0;
        let kind = match EntryType::from_u8(type_field)? {
            EntryType::FindService => Self::FindService,
            EntryType::OfferService if stop => Self::StopOfferService,
            EntryType::OfferService => Self::OfferService,
            EntryType::SubscribeEventgroup if stop => Self::StopSubscribeEventgroup,
            EntryType::SubscribeEventgroup => Self::SubscribeEventgroup,
            EntryType::SubscribeEventgroupAck if stop => Self::SubscribeEventgroupNack,
            EntryType::SubscribeEventgroupAck => Self::SubscribeEventgroupAck,
        };
        Some(kind)
    }

    /// The wire type code for this operation.
    pub fn entry_type(&self) -> EntryType {
        match self {
            Self::FindService => EntryType::FindService,
            Self::OfferService | Self::StopOfferService => EntryType::OfferService,
            Self::SubscribeEventgroup | Self::StopSubscribeEventgroup => {
                EntryType::SubscribeEventgroup
            }
            Self::SubscribeEventgroupAck | Self::SubscribeEventgroupNack => {
                EntryType::SubscribeEventgroupAck
            }
        }
    }

    /// Check if this operation withdraws an earlier one (TTL = 0).
    pub fn is_stop(&self) -> bool {
        matches!(
            self,
            Self::StopOfferService | Self::StopSubscribeEventgroup | Self::SubscribeEventgroupNack
        )
    }
}

/// SD option types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OptionType {
    /// Configuration string option.
    Configuration = 0x01,
    /// IPv4 endpoint option.
    IPv4Endpoint = 0x04,
    /// IPv6 endpoint option.
    IPv6Endpoint = 0x06,
    /// IPv4 multicast option.
    IPv4Multicast = 0x14,
    /// IPv6 multicast option.
    IPv6Multicast = 0x16,
}

impl OptionType {
    /// Create an OptionType from a raw byte value.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Configuration),
            0x04 => Some(Self::IPv4Endpoint),
            0x06 => Some(Self::IPv6Endpoint),
            0x14 => Some(Self::IPv4Multicast),
            0x16 => Some(Self::IPv6Multicast),
            _ => None,
        }
    }

    /// Check if this is an IPv4 option.
    pub fn is_ipv4(&self) -> bool {
        matches!(self, Self::IPv4Endpoint | Self::IPv4Multicast)
    }

    /// Check if this is an IPv6 option.
    pub fn is_ipv6(&self) -> bool {
        matches!(self, Self::IPv6Endpoint | Self::IPv6Multicast)
    }
}

/// Transport protocol used for endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum TransportProtocol {
    /// TCP protocol.
    Tcp = 0x06,
    /// UDP protocol.
    #[default]
    Udp = 0x11,
}

impl TransportProtocol {
    /// Create a TransportProtocol from a raw byte value.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x06 => Some(Self::Tcp),
            0x11 => Some(Self::Udp),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_type_from_u8() {
        assert_eq!(EntryType::from_u8(0x00), Some(EntryType::FindService));
        assert_eq!(EntryType::from_u8(0x01), Some(EntryType::OfferService));
        assert_eq!(EntryType::from_u8(0x06), Some(EntryType::SubscribeEventgroup));
        assert_eq!(EntryType::from_u8(0x07), Some(EntryType::SubscribeEventgroupAck));
        assert_eq!(EntryType::from_u8(0xFF), None);
    }

    #[test]
    fn test_classify_overloaded_codes() {
        assert_eq!(EntryKind::classify(0x00, 0), Some(EntryKind::FindService));
        assert_eq!(EntryKind::classify(0x01, 3), Some(EntryKind::OfferService));
        assert_eq!(EntryKind::classify(0x01, 0), Some(EntryKind::StopOfferService));
        assert_eq!(EntryKind::classify(0x06, 1), Some(EntryKind::SubscribeEventgroup));
        assert_eq!(
            EntryKind::classify(0x06, 0),
            Some(EntryKind::StopSubscribeEventgroup)
        );
        assert_eq!(
            EntryKind::classify(0x07, 0xFFFFFF),
            Some(EntryKind::SubscribeEventgroupAck)
        );
        assert_eq!(
            EntryKind::classify(0x07, 0),
            Some(EntryKind::SubscribeEventgroupNack)
        );
        assert_eq!(EntryKind::classify(0x02, 5), None);
    }

    #[test]
    fn test_entry_kind_maps_back_to_code() {
        for kind in [
            EntryKind::StopOfferService,
            EntryKind::StopSubscribeEventgroup,
            EntryKind::SubscribeEventgroupNack,
        ] {
            assert!(kind.is_stop());
            assert_eq!(EntryKind::classify(kind.entry_type() as u8, 0), Some(kind));
        }
        assert!(!EntryKind::FindService.is_stop());
    }

    #[test]
    fn test_sd_flags() {
        let flags = SdFlags::default().with(SdFlags::REBOOT | SdFlags::UNICAST);
        assert_eq!(flags.0, 0xC0);
        assert!(flags.reboot());
        assert!(flags.unicast());
        assert!(!flags.explicit_initial_data());
        assert!(SdFlags(0x21).explicit_initial_data());
    }

    #[test]
    fn test_option_type_from_u8() {
        assert_eq!(OptionType::from_u8(0x04), Some(OptionType::IPv4Endpoint));
        assert_eq!(OptionType::from_u8(0x06), Some(OptionType::IPv6Endpoint));
        assert!(OptionType::from_u8(0x14).unwrap().is_ipv4());
        assert!(OptionType::from_u8(0x16).unwrap().is_ipv6());
        assert_eq!(OptionType::from_u8(0xFF), None);
    }

    #[test]
    fn test_instance_id_any() {
        assert!(InstanceId::ANY.is_any());
        assert!(!InstanceId(0x0001).is_any());
    }

    #[test]
    fn test_transport_protocol() {
        assert_eq!(TransportProtocol::from_u8(0x06), Some(TransportProtocol::Tcp));
        assert_eq!(TransportProtocol::from_u8(0x11), Some(TransportProtocol::Udp));
        assert_eq!(TransportProtocol::from_u8(0xFF), None);
    }
}
