//! Async transport for SOME/IP test exchanges using Tokio.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use someip_tester::transport_async::AsyncTcpTransceiver;
//! use someip_tester::{MethodId, ServiceId, SomeIpMessage};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let request = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
//!         .payload(b"hello".as_slice())
//!         .build();
//!
//!     let reply = AsyncTcpTransceiver::new()
//!         .send(
//!             "127.0.0.1:0".parse()?,
//!             "127.0.0.1:30490".parse()?,
//!             &request.encode()?,
//!             Duration::from_secs(1),
//!         )
//!         .await?;
//!     println!("reply: {} bytes", reply.len());
//!
//!     Ok(())
//! }
//! ```

mod tcp;

pub use tcp::AsyncTcpTransceiver;
