//! Test harness shared by every vehicle.
//!
//! A [`Tester`] owns what a test case needs to talk to an ECU part: the
//! environment, the part addresses, the shared [`Allocator`] and a
//! [`Transceiver`]. Test cases are TOML field files; the harness stamps them
//! with an allocated client/session ID pair, builds the packet, sends it and
//! decodes the reply.

use std::fmt;
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info};

use crate::allocator::Allocator;
use crate::config::{Environment, Part, Parts};
use crate::error::{Result, SomeIpError};
use crate::fields::FieldMap;
use crate::message::SomeIpMessage;
use crate::schema::someip;
use crate::sd::SdPacket;
use crate::transport::{TcpTransceiver, Transceiver};

/// Reply timeout used unless [`Tester::with_timeout`] says otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Vehicles with a tester.
///
/// Both share the same harness; the variant selects which vehicle's test
/// cases are run and is recorded in every log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vehicle {
    Hima,
    Voyah,
}

impl Vehicle {
    pub const ALL: [Vehicle; 2] = [Vehicle::Hima, Vehicle::Voyah];

    pub fn name(&self) -> &'static str {
        match self {
            Vehicle::Hima => "hima",
            Vehicle::Voyah => "voyah",
        }
    }
}

impl FromStr for Vehicle {
    type Err = SomeIpError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|vehicle| vehicle.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SomeIpError::UnknownVehicle(wanted.to_string()))
    }
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Harness for one vehicle.
#[derive(Debug)]
pub struct Tester<T = TcpTransceiver> {
    vehicle: Vehicle,
    environment: Environment,
    parts: Parts,
    allocator: Arc<Allocator>,
    transceiver: T,
    timeout: Duration,
}

impl<T: Transceiver> Tester<T> {
    /// Build the tester for `environment.vehicle_type`.
    pub fn new(
        environment: Environment,
        parts: Parts,
        allocator: Arc<Allocator>,
        transceiver: T,
    ) -> Result<Self> {
        let vehicle: Vehicle = environment.vehicle_type.parse()?;
        info!(%vehicle, mdc = %parts.mdc, tbox = %parts.tbox, vdc = %parts.vdc, "tester ready");
        Ok(Self {
            vehicle,
            environment,
            parts,
            allocator,
            transceiver,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Set the reply timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn vehicle(&self) -> Vehicle {
        self.vehicle
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn parts(&self) -> &Parts {
        &self.parts
    }

    pub fn allocator(&self) -> &Arc<Allocator> {
        &self.allocator
    }

    pub fn transceiver(&self) -> &T {
        &self.transceiver
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Load a field file. Relative paths are resolved against `CONFIG_PATH`.
    pub fn load_fields<P: AsRef<Path>>(&self, path: P) -> Result<FieldMap> {
        let path = self.environment.config_path.join(path);
        debug!(path = %path.display(), "loading fields");
        Ok(FieldMap::from_file(&path)?)
    }

    /// Allocate the next client/session pair for `local` and merge `fields`
    /// over it, later maps winning on conflict.
    ///
    /// A field map may therefore pin `client_id` or `session_id` to force a
    /// specific value; the allocation still advances.
    pub fn combine_fields(&self, local: SocketAddr, fields: &[&FieldMap]) -> Result<FieldMap> {
        let (client, session) = self.allocator.allocate(local)?;
        let mut combined = FieldMap::new()
            .with(someip::CLIENT_ID.name(), client.0)
            .with(someip::SESSION_ID.name(), session.0);
        for map in fields {
            combined.merge(map);
        }
        Ok(combined)
    }

    /// Send raw bytes from `local` to `part`.
    pub fn send_raw(&self, local: SocketAddr, part: Part, data: &[u8]) -> Result<Bytes> {
        let remote = self.parts.get(part);
        debug!(vehicle = %self.vehicle, %part, %remote, "exchange");
        self.transceiver.send(local, remote, data, self.timeout)
    }

    /// Send a message to `part` and decode the reply.
    pub fn exchange(
        &self,
        local: SocketAddr,
        part: Part,
        message: &SomeIpMessage,
    ) -> Result<SomeIpMessage> {
        let reply = self.send_raw(local, part, &message.encode()?)?;
        let response = SomeIpMessage::decode(&reply)?;
        info!(%part, request = %message, response = %response, "exchanged");
        Ok(response)
    }

    /// Send an SD packet to `part` and decode the reply as SD.
    pub fn exchange_sd(
        &self,
        local: SocketAddr,
        part: Part,
        packet: &SdPacket,
    ) -> Result<SdPacket> {
        let reply = self.send_raw(local, part, &packet.encode()?)?;
        let response = SdPacket::decode(&reply)?;
        info!(%part, entries = response.entry_count(), "exchanged SD");
        Ok(response)
    }

    /// Build a message from allocated IDs and `fields`, send it and decode
    /// the reply.
    pub fn request(
        &self,
        local: SocketAddr,
        part: Part,
        fields: &[&FieldMap],
    ) -> Result<SomeIpMessage> {
        let message = SomeIpMessage::from_fields(&self.combine_fields(local, fields)?)?;
        self.exchange(local, part, &message)
    }

    /// Like [`request`](Self::request) for SD packets.
    pub fn request_sd(
        &self,
        local: SocketAddr,
        part: Part,
        fields: &[&FieldMap],
    ) -> Result<SdPacket> {
        let packet = SdPacket::from_fields(&self.combine_fields(local, fields)?)?;
        self.exchange_sd(local, part, &packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{read_message, write_message};
    use crate::fields::FieldValue;
    use crate::header::{ClientId, SessionId};
    use std::net::TcpListener;
    use std::path::PathBuf;
    use std::thread;

    fn environment(config_path: PathBuf, vehicle: &str) -> Environment {
        Environment {
            config_path,
            log_name: "test".to_string(),
            log_path: None,
            log_level: "info".to_string(),
            log_format: Default::default(),
            vehicle_type: vehicle.to_string(),
        }
    }

    fn parts(addr: SocketAddr) -> Parts {
        Parts {
            mdc: addr,
            tbox: addr,
            vdc: addr,
        }
    }

    fn tester(vehicle: &str, remote: SocketAddr) -> Result<Tester> {
        Tester::new(
            environment(PathBuf::from("."), vehicle),
            parts(remote),
            Arc::new(Allocator::new()),
            TcpTransceiver::new(),
        )
    }

    fn local() -> SocketAddr {
        "127.0.0.1:40001".parse().unwrap()
    }

    #[test]
    fn test_vehicle_from_str() {
        assert_eq!("hima".parse::<Vehicle>().unwrap(), Vehicle::Hima);
        assert_eq!(" Voyah\n".parse::<Vehicle>().unwrap(), Vehicle::Voyah);
        let err = "tesla".parse::<Vehicle>().unwrap_err();
        assert!(matches!(err, SomeIpError::UnknownVehicle(name) if name == "tesla"));
    }

    #[test]
    fn test_unknown_vehicle_rejected() {
        let remote: SocketAddr = "127.0.0.1:30490".parse().unwrap();
        assert!(matches!(
            tester("tesla", remote),
            Err(SomeIpError::UnknownVehicle(_))
        ));
        assert_eq!(tester("VOYAH", remote).unwrap().vehicle(), Vehicle::Voyah);
    }

    #[test]
    fn test_combine_fields() {
        let tester = tester("hima", "127.0.0.1:30490".parse().unwrap()).unwrap();
        let case = FieldMap::new().with("service_id", 0x1234u16);
        let pinned = FieldMap::new().with("session_id", 0x0042u16);

        let first = tester.combine_fields(local(), &[&case]).unwrap();
        assert_eq!(first.get("client_id"), Some(&FieldValue::Int(1)));
        assert_eq!(first.get("session_id"), Some(&FieldValue::Int(0)));
        assert_eq!(first.get("service_id"), Some(&FieldValue::Int(0x1234)));

        let second = tester.combine_fields(local(), &[&case, &pinned]).unwrap();
        assert_eq!(second.get("session_id"), Some(&FieldValue::Int(0x42)));

        // The pinned value did not stop the counter.
        let third = tester.combine_fields(local(), &[]).unwrap();
        assert_eq!(third.get("session_id"), Some(&FieldValue::Int(2)));
    }

    #[test]
    fn test_load_fields_relative_to_config_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("cases")).unwrap();
        std::fs::write(
            dir.path().join("cases").join("ping.toml"),
            "service_id = 0x1234\nmethod_id = 1\n",
        )
        .unwrap();

        let tester = Tester::new(
            environment(dir.path().to_path_buf(), "hima"),
            parts("127.0.0.1:30490".parse().unwrap()),
            Arc::new(Allocator::new()),
            TcpTransceiver::new(),
        )
        .unwrap();

        let fields = tester.load_fields("cases/ping.toml").unwrap();
        assert_eq!(fields.len(), 2);
        assert!(tester.load_fields("cases/missing.toml").is_err());
    }

    #[test]
    fn test_request_roundtrip() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let remote = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_message(&mut stream).unwrap();
            let response = request.create_response().payload(vec![0xAA]).build();
            write_message(&mut stream, &response).unwrap();
            request
        });

        let tester = tester("hima", remote).unwrap().with_timeout(Duration::from_secs(5));
        let case = FieldMap::from_toml(
            r#"
            service_id = 0x1234
            method_id = 0x0421
            interface_version = 1
            message_type = 0
            return_code = 0
            payload = [1, 2]
            "#,
        )
        .unwrap();

        let response = tester
            .request("127.0.0.1:0".parse().unwrap(), Part::Tbox, &[&case])
            .unwrap();
        assert!(response.is_response());
        assert_eq!(response.payload.as_ref(), &[0xAA]);
        assert_eq!(response.client_id(), ClientId(1));
        assert_eq!(response.session_id(), SessionId(0));

        let request = server.join().unwrap();
        assert_eq!(request.payload.as_ref(), &[1, 2]);
    }
}
