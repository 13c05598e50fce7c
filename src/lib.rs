//! SOME/IP and SOME/IP-SD wire codecs for ECU test harnesses.
//!
//! This crate encodes and decodes SOME/IP (Scalable service-Oriented
//! MiddlewarE over IP) messages and SOME/IP-SD service discovery packets,
//! and assigns the client and session IDs that correlate requests with
//! responses.
//!
//! # Features
//!
//! - SOME/IP message codec with width-checked header fields
//! - SOME/IP-SD packets with service and eventgroup entries and IPv4/IPv6 options
//! - Thread-safe client/session ID allocator
//! - Test cases as TOML field files ([`FieldMap`])
//! - TCP and UDP request/reply transport, async TCP behind the `tokio` feature
//!
//! # Example
//!
//! ```
//! use someip_tester::{Allocator, MethodId, ServiceId, SomeIpMessage};
//!
//! let allocator = Allocator::new();
//! let (client, session) = allocator.allocate("10.0.0.1:40000".parse().unwrap()).unwrap();
//!
//! let request = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0421))
//!     .client_id(client)
//!     .session_id(session)
//!     .payload(vec![0x01, 0x02])
//!     .build();
//!
//! let bytes = request.encode().unwrap();
//! assert_eq!(bytes.len(), 18);
//! assert_eq!(SomeIpMessage::decode(&bytes).unwrap(), request);
//! ```
//!
//! # Protocol Overview
//!
//! SOME/IP messages consist of a 16-byte header followed by an optional payload:
//!
//! ```text
//! +--------+--------+--------+--------+
//! |    Service ID   |   Method ID     |  (4 bytes)
//! +--------+--------+--------+--------+
//! |           Length                  |  (4 bytes)
//! +--------+--------+--------+--------+
//! |    Client ID    |   Session ID    |  (4 bytes)
//! +--------+--------+--------+--------+
//! |Proto|Iface|MsgType|RetCode|        (4 bytes)
//! +--------+--------+--------+--------+
//! |           Payload ...             |  (variable)
//! +--------+--------+--------+--------+
//! ```
//!
//! The length field covers everything after itself, so it is always
//! `8 + payload.len()`. Encoders recompute it; [`SomeIpMessage::decode`]
//! ignores it and takes the rest of the input as payload.

pub mod allocator;
pub mod bits;
pub mod codec;
pub mod config;
pub mod error;
pub mod fields;
pub mod header;
pub mod logging;
pub mod message;
pub mod schema;
pub mod sd;
pub mod tester;
pub mod transport;
pub mod types;

// Async modules (require tokio feature)
#[cfg(feature = "tokio")]
pub mod codec_async;
#[cfg(feature = "tokio")]
pub mod transport_async;

// Re-export commonly used types at the crate root
pub use allocator::Allocator;
pub use config::{ConfigError, Environment, Part, Parts};
pub use error::{Result, SomeIpError};
pub use fields::{FieldMap, FieldValue};
pub use header::{ClientId, MethodId, ServiceId, SessionId, SomeIpHeader, HEADER_SIZE};
pub use message::{MessageBuilder, SomeIpMessage};
pub use sd::{SdEntry, SdOption, SdPacket};
pub use tester::{Tester, Vehicle};
pub use transport::{TcpTransceiver, Transceiver, UdpTransceiver};
pub use types::{MessageType, ReturnCode, PROTOCOL_VERSION};
