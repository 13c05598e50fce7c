//! Loading part and field files from a configuration directory.

#![allow(clippy::unwrap_used)]

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use someip_tester::config::{ConfigError, Part, Parts};
use someip_tester::sd::{EntryKind, IPv4Option, ServiceEntry};
use someip_tester::{FieldMap, SomeIpError, SomeIpMessage};

fn write_part(dir: &Path, part: Part, ip: &str, port: u16) {
    let content = format!("[address]\nip = \"{ip}\"\nport = {port}\n");
    fs::write(dir.join(part.file_name()), content).unwrap();
}

#[test]
fn load_all_parts() {
    let dir = tempfile::tempdir().unwrap();
    write_part(dir.path(), Part::Mdc, "192.168.1.10", 30501);
    write_part(dir.path(), Part::Tbox, "192.168.1.11", 30502);
    write_part(dir.path(), Part::Vdc, "fd00::12", 30503);

    let parts = Parts::load(dir.path()).unwrap();
    assert_eq!(parts.mdc, "192.168.1.10:30501".parse::<SocketAddr>().unwrap());
    assert_eq!(parts.get(Part::Tbox).port(), 30502);
    assert!(parts.vdc.is_ipv6());
}

#[test]
fn missing_part_file() {
    let dir = tempfile::tempdir().unwrap();
    write_part(dir.path(), Part::Mdc, "192.168.1.10", 30501);
    write_part(dir.path(), Part::Tbox, "192.168.1.11", 30502);

    assert!(matches!(Parts::load(dir.path()), Err(ConfigError::Io(_))));
}

#[test]
fn malformed_part_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("mdc.toml"), "[address]\nip = \"not an ip\"\nport = 1\n").unwrap();

    assert!(matches!(
        Parts::load_part(dir.path(), Part::Mdc),
        Err(ConfigError::Toml(_))
    ));
}

#[test]
fn message_from_field_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("request.toml");
    fs::write(
        &path,
        r#"
        service_id = 0x1234
        method_id = 0x0421
        client_id = 1
        session_id = 1
        interface_version = 1
        message_type = 0
        return_code = 0
        payload = [1, 2]
        "#,
    )
    .unwrap();

    let message = SomeIpMessage::from_fields(&FieldMap::from_file(&path).unwrap()).unwrap();
    assert_eq!(
        message.encode().unwrap(),
        [
            0x12, 0x34, 0x04, 0x21, 0x00, 0x00, 0x00, 0x0A, 0x00, 0x01, 0x00, 0x01, 0x01, 0x01,
            0x00, 0x00, 0x01, 0x02
        ]
    );
}

#[test]
fn sd_structures_from_field_file() {
    let fields = FieldMap::from_toml(
        r#"
        type_field = 1
        service_id = 0x1234
        instance_id = 1
        major_version = 1
        ttl = 3
        minor_version = 0
        type = 4
        ipv4_address = "192.168.0.1"
        transport_protocol = 0x11
        transport_protocol_port_number = 30509
        "#,
    )
    .unwrap();

    let entry = ServiceEntry::from_fields(&fields).unwrap();
    assert_eq!(entry.kind(), Some(EntryKind::OfferService));

    let option = IPv4Option::from_fields(&fields).unwrap();
    assert_eq!(option.port, 30509);
    assert_eq!(option.address.octets(), [192, 168, 0, 1]);
}

#[test]
fn field_width_violation_from_file() {
    let fields = FieldMap::from_toml(
        r#"
        type_field = 1
        service_id = 0x1234
        instance_id = 1
        major_version = 256
        ttl = 3
        minor_version = 0
        "#,
    )
    .unwrap();

    assert!(matches!(
        ServiceEntry::from_fields(&fields),
        Err(SomeIpError::FieldRange {
            field: "major_version",
            ..
        })
    ));
}
