//! Property tests for the wire codecs.
//!
//! Every valid value must survive encode/decode unchanged, and the SD length
//! fields must always describe what was written.

#![allow(clippy::unwrap_used)]

use std::net::{Ipv4Addr, Ipv6Addr};

use proptest::prelude::*;
use someip_tester::header::{ClientId, MethodId, ServiceId, SessionId, SomeIpHeader};
use someip_tester::sd::{
    EventgroupEntry, EventgroupId, IPv4Option, IPv6Option, InstanceId, SdEntry, SdFlags,
    SdOption, SdPacket, ServiceEntry,
};
use someip_tester::types::{MessageType, ReturnCode};
use someip_tester::{SomeIpError, SomeIpMessage};

fn message_type() -> impl Strategy<Value = MessageType> {
    any::<u8>().prop_map(MessageType::from_u8)
}

fn return_code() -> impl Strategy<Value = ReturnCode> {
    any::<u8>().prop_map(ReturnCode::from_u8)
}

fn header() -> impl Strategy<Value = SomeIpHeader> {
    (
        any::<u16>(),
        any::<u16>(),
        any::<u16>(),
        any::<u16>(),
        any::<u8>(),
        any::<u8>(),
        message_type(),
        return_code(),
    )
        .prop_map(
            |(service, method, client, session, protocol, interface, message_type, return_code)| {
                SomeIpHeader {
                    service_id: ServiceId(service),
                    method_id: MethodId(method),
                    client_id: ClientId(client),
                    session_id: SessionId(session),
                    protocol_version: protocol,
                    interface_version: interface,
                    message_type,
                    return_code,
                }
            },
        )
}

fn service_entry() -> impl Strategy<Value = ServiceEntry> {
    (
        (any::<u8>(), any::<u8>(), any::<u8>(), 0u8..16, 0u8..16),
        (any::<u16>(), any::<u16>(), any::<u8>(), 0u32..=0xFF_FFFF, any::<u32>()),
    )
        .prop_map(|((type_field, first, second, n1, n2), (service, instance, major, ttl, minor))| {
            ServiceEntry {
                type_field,
                index_first_option_run: first,
                index_second_option_run: second,
                number_of_options_1: n1,
                number_of_options_2: n2,
                service_id: ServiceId(service),
                instance_id: InstanceId(instance),
                major_version: major,
                ttl,
                minor_version: minor,
            }
        })
}

fn eventgroup_entry() -> impl Strategy<Value = EventgroupEntry> {
    (
        (any::<u8>(), any::<u8>(), any::<u8>(), 0u8..16, 0u8..16),
        (any::<u16>(), any::<u16>(), any::<u8>(), 0u32..=0xFF_FFFF),
        (0u8..16, any::<u16>()),
    )
        .prop_map(
            |((type_field, first, second, n1, n2), (service, instance, major, ttl), (counter, group))| {
                EventgroupEntry {
                    type_field,
                    index_first_option_run: first,
                    index_second_option_run: second,
                    number_of_options_1: n1,
                    number_of_options_2: n2,
                    service_id: ServiceId(service),
                    instance_id: InstanceId(instance),
                    major_version: major,
                    ttl,
                    counter,
                    eventgroup_id: EventgroupId(group),
                }
            },
        )
}

fn ipv4_option() -> impl Strategy<Value = IPv4Option> {
    (
        prop::sample::select(vec![0x04u8, 0x14]),
        any::<bool>(),
        any::<u32>(),
        any::<u8>(),
        any::<u16>(),
    )
        .prop_map(|(option_type, discardable, address, protocol, port)| IPv4Option {
            option_type,
            discardable,
            address: Ipv4Addr::from(address),
            transport_protocol: protocol,
            port,
        })
}

fn ipv6_option() -> impl Strategy<Value = IPv6Option> {
    (
        prop::sample::select(vec![0x06u8, 0x16]),
        any::<bool>(),
        any::<u128>(),
        any::<u8>(),
        any::<u16>(),
    )
        .prop_map(|(option_type, discardable, address, protocol, port)| IPv6Option {
            option_type,
            discardable,
            address: Ipv6Addr::from(address),
            transport_protocol: protocol,
            port,
        })
}

fn option() -> impl Strategy<Value = SdOption> {
    prop_oneof![
        ipv4_option().prop_map(SdOption::from),
        ipv6_option().prop_map(SdOption::from),
    ]
}

proptest! {
    #[test]
    fn prop_message_roundtrip(
        header in header(),
        payload in prop::collection::vec(any::<u8>(), 0..512),
    ) {
        let message = SomeIpMessage::new(header, payload.clone());
        let bytes = message.encode().unwrap();

        prop_assert_eq!(bytes.len(), 16 + payload.len());
        let length = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        prop_assert_eq!(length as usize, 8 + payload.len());
        prop_assert_eq!(SomeIpMessage::decode(&bytes).unwrap(), message);
    }

    #[test]
    fn prop_short_message_truncated(data in prop::collection::vec(any::<u8>(), 0..16)) {
        let truncated = matches!(
            SomeIpMessage::decode(&data),
            Err(SomeIpError::Truncated { expected: 16, .. })
        );
        prop_assert!(truncated);
    }

    #[test]
    fn prop_service_entry_roundtrip(entry in service_entry()) {
        let bytes = entry.encode().unwrap();
        prop_assert_eq!(ServiceEntry::decode(&bytes).unwrap(), entry);
    }

    #[test]
    fn prop_eventgroup_entry_roundtrip(entry in eventgroup_entry()) {
        let bytes = entry.encode().unwrap();
        prop_assert_eq!(EventgroupEntry::decode(&bytes).unwrap(), entry);
    }

    #[test]
    fn prop_entry_rejects_wrong_length(data in prop::collection::vec(any::<u8>(), 0..40)) {
        prop_assume!(data.len() != 16);
        let invalid = matches!(
            ServiceEntry::decode(&data),
            Err(SomeIpError::InvalidLength { expected: 16, .. })
        );
        prop_assert!(invalid);
    }

    #[test]
    fn prop_ipv4_option_roundtrip(option in ipv4_option()) {
        let bytes = option.encode().unwrap();
        prop_assert_eq!(bytes.len(), 12);
        prop_assert_eq!(&bytes[0..2], &[0x00, 0x09]);
        prop_assert_eq!(IPv4Option::decode(&bytes).unwrap(), option);
    }

    #[test]
    fn prop_ipv6_option_roundtrip(option in ipv6_option()) {
        let bytes = option.encode().unwrap();
        prop_assert_eq!(bytes.len(), 24);
        prop_assert_eq!(&bytes[0..2], &[0x00, 0x15]);
        prop_assert_eq!(IPv6Option::decode(&bytes).unwrap(), option);
    }

    #[test]
    fn prop_sd_packet_roundtrip(
        header in header(),
        flags in any::<u8>(),
        services in prop::collection::vec(service_entry(), 0..4),
        groups in prop::collection::vec(eventgroup_entry(), 0..4),
        options in prop::collection::vec(option(), 0..4),
    ) {
        let mut entries_array = Vec::new();
        for entry in &services {
            entries_array.extend_from_slice(&entry.encode().unwrap());
        }
        for entry in &groups {
            entries_array.extend_from_slice(&entry.encode().unwrap());
        }
        let mut options_array = Vec::new();
        for option in &options {
            options_array.extend_from_slice(&option.encode().unwrap());
        }
        let entries_len = entries_array.len();
        let options_len = options_array.len();

        let packet = SdPacket::new(header, SdFlags(flags), entries_array, options_array).unwrap();
        let bytes = packet.encode().unwrap();

        let length = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        prop_assert_eq!(length as usize, 20 + entries_len + options_len);
        prop_assert_eq!(bytes.len(), 28 + entries_len + options_len);

        let decoded = SdPacket::decode(&bytes).unwrap();
        prop_assert_eq!(decoded.entries_array.len(), entries_len);
        prop_assert_eq!(decoded.options_array.len(), options_len);
        prop_assert_eq!(decoded.entry_count(), services.len() + groups.len());
        prop_assert_eq!(decoded.options().unwrap(), options);
        prop_assert_eq!(decoded, packet);
    }

    #[test]
    fn prop_sd_declared_length_overrun(extra in 5u32..1000) {
        let packet = SdPacket::builder().build().unwrap();
        let mut bytes = packet.encode().unwrap();
        // Claim more entries than the input holds.
        bytes[20..24].copy_from_slice(&extra.to_be_bytes());
        let truncated = matches!(SdPacket::decode(&bytes), Err(SomeIpError::Truncated { .. }));
        prop_assert!(truncated);
    }
}

#[test]
fn builder_packet_entries_classify() {
    let offer = ServiceEntry::offer_service(ServiceId(0x1234), InstanceId(1), 1, 0, 3).unwrap();
    let stop = ServiceEntry::stop_offer_service(ServiceId(0x1234), InstanceId(1), 1, 0);
    let packet = SdPacket::builder()
        .entry(offer.clone())
        .entry(stop.clone())
        .option(IPv4Option::endpoint(
            Ipv4Addr::new(192, 168, 0, 1),
            someip_tester::sd::TransportProtocol::Udp,
            30509,
        ))
        .build()
        .unwrap();

    let decoded = SdPacket::decode(&packet.encode().unwrap()).unwrap();
    let entries = decoded.decode_entries().unwrap();
    assert_eq!(entries, vec![SdEntry::from(offer), SdEntry::from(stop)]);
    assert!(entries[1].kind().unwrap().is_stop());
}
