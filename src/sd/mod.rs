//! SOME/IP Service Discovery (SD) wire format.
//!
//! SD messages are SOME/IP messages sent to service 0xFFFF, method 0x8100.
//! [`SdPacket`] handles the packet framing and leaves the entries and options
//! arrays as bytes; [`ServiceEntry`], [`EventgroupEntry`], [`IPv4Option`] and
//! [`IPv6Option`] decode the individual structures.
//!
//! # Example
//!
//! ```
//! use someip_tester::sd::{EntryKind, InstanceId, SdPacket, ServiceEntry};
//! use someip_tester::ServiceId;
//!
//! let find = ServiceEntry::find_service(ServiceId(0x1234), InstanceId::ANY, 0xFF, 0xFFFF_FFFF);
//! let packet = SdPacket::builder().entry(find).build().unwrap();
//!
//! let bytes = packet.encode().unwrap();
//! let decoded = SdPacket::decode(&bytes).unwrap();
//! let kinds: Vec<_> = decoded.entries().map(|e| e.kind()).collect();
//! assert_eq!(kinds, [Some(EntryKind::FindService)]);
//! ```

mod entry;
mod option;
mod packet;
mod types;

pub use entry::{EventgroupEntry, SdEntry, ServiceEntry, TTL_INFINITE};
pub use option::{Endpoint, IPv4Option, IPv6Option, SdOption};
pub use packet::{RawEntry, SdPacket, SdPacketBuilder, SD_MIN_SIZE};
pub use types::{
    EntryKind, EntryType, EventgroupId, InstanceId, OptionType, SdFlags, TransportProtocol,
    SD_DEFAULT_PORT, SD_ENTRY_SIZE, SD_METHOD_ID, SD_MULTICAST_ADDR, SD_SERVICE_ID,
};
