//! SOME/IP-SD option types.
//!
//! Endpoint options have a constant wire length field (0x0009 for IPv4,
//! 0x0015 for IPv6) that counts every byte after the type byte. Decoding
//! ignores the received length field and trusts the input size instead.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6};

use bytes::Bytes;
use tracing::debug;

use crate::bits::{BitReader, BitWriter};
use crate::error::{Result, SomeIpError};
use crate::fields::FieldMap;
use crate::schema::{option as schema, Schema};

use super::types::{OptionType, TransportProtocol};

/// Bytes that precede the part of an option counted by its length field.
const OPTION_PREFIX_SIZE: usize = 3;

fn check_len(schema: &Schema, data: &[u8]) -> Result<()> {
    if data.len() != schema.fixed_bytes() {
        return Err(SomeIpError::InvalidLength {
            structure: schema.name(),
            expected: schema.fixed_bytes(),
            actual: data.len(),
        });
    }
    Ok(())
}

const fn length_field(schema: &Schema) -> u16 {
    (schema.fixed_bytes() - OPTION_PREFIX_SIZE) as u16
}

fn log_length_mismatch(schema: &Schema, length: u16) {
    let expected = length_field(schema);
    if length != expected {
        debug!(
            option = schema.name(),
            length, expected, "option length field disagrees with its fixed size"
        );
    }
}

/// IPv4 endpoint or multicast option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IPv4Option {
    /// Raw option type code (0x04 endpoint, 0x14 multicast).
    pub option_type: u8,
    pub discardable: bool,
    pub address: Ipv4Addr,
    /// Raw transport protocol code (0x06 TCP, 0x11 UDP).
    pub transport_protocol: u8,
    pub port: u16,
}

impl IPv4Option {
    /// Value of the length field.
    pub const LENGTH: u16 = length_field(&schema::IPV4);
    /// Size on the wire.
    pub const SIZE: usize = schema::IPV4.fixed_bytes();

    /// Create an IPv4 endpoint option.
    pub fn endpoint(address: Ipv4Addr, protocol: TransportProtocol, port: u16) -> Self {
        Self {
            option_type: OptionType::IPv4Endpoint as u8,
            discardable: false,
            address,
            transport_protocol: protocol as u8,
            port,
        }
    }

    /// Create an IPv4 multicast option.
    pub fn multicast(address: Ipv4Addr, port: u16) -> Self {
        Self {
            option_type: OptionType::IPv4Multicast as u8,
            ..Self::endpoint(address, TransportProtocol::Udp, port)
        }
    }

    /// Create an option from a generic IP address, which must be IPv4.
    pub fn from_ip(
        option_type: u8,
        address: IpAddr,
        transport_protocol: u8,
        port: u16,
    ) -> Result<Self> {
        let IpAddr::V4(address) = address else {
            return Err(SomeIpError::invalid_address(
                "IPv4",
                format!("{address} is not an IPv4 address"),
            ));
        };
        Ok(Self {
            option_type,
            discardable: false,
            address,
            transport_protocol,
            port,
        })
    }

    /// Create from a socket address.
    pub fn from_socket_addr(addr: SocketAddrV4, protocol: TransportProtocol) -> Self {
        Self::endpoint(*addr.ip(), protocol, addr.port())
    }

    /// Convert to a socket address.
    pub fn to_socket_addr(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.address, self.port)
    }

    /// Mark the option as discardable.
    pub fn discardable(mut self, discardable: bool) -> Self {
        self.discardable = discardable;
        self
    }

    /// Build an option from named fields. `ipv4_address` is a dotted string.
    pub fn from_fields(fields: &FieldMap) -> Result<Self> {
        let text = fields.text(&schema::IPV4_ADDRESS)?;
        let address: IpAddr = text
            .parse()
            .map_err(|_| SomeIpError::invalid_address("IPv4", format!("cannot parse {text:?}")))?;
        let discardable: u8 = fields.uint_or(&schema::DISCARDABLE_FLAG, 0)?;
        Ok(Self::from_ip(
            fields.uint(&schema::TYPE)?,
            address,
            fields.uint(&schema::TRANSPORT_PROTOCOL)?,
            fields.uint(&schema::TRANSPORT_PROTOCOL_PORT_NUMBER)?,
        )?
        .discardable(discardable == 1))
    }

    /// Typed option type, if known.
    pub fn kind(&self) -> Option<OptionType> {
        OptionType::from_u8(self.option_type)
    }

    /// Typed transport protocol, if known.
    pub fn protocol(&self) -> Option<TransportProtocol> {
        TransportProtocol::from_u8(self.transport_protocol)
    }

    /// Encode the option to its 12 wire bytes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut writer = BitWriter::with_capacity(Self::SIZE);
        writer.put(&schema::LENGTH, Self::LENGTH)?;
        writer.put(&schema::TYPE, self.option_type)?;
        writer.put(&schema::DISCARDABLE_FLAG, u8::from(self.discardable))?;
        writer.zero(&schema::FLAG_RESERVED)?;
        writer.put(&schema::IPV4_ADDRESS, u32::from(self.address))?;
        writer.zero(&schema::RESERVED)?;
        writer.put(&schema::TRANSPORT_PROTOCOL, self.transport_protocol)?;
        writer.put(&schema::TRANSPORT_PROTOCOL_PORT_NUMBER, self.port)?;
        Ok(writer.into_bytes())
    }

    /// Decode an option from exactly 12 bytes.
    pub fn decode(data: &[u8]) -> Result<Self> {
        check_len(&schema::IPV4, data)?;

        let mut reader = BitReader::new(data);
        let length: u16 = reader.take(&schema::LENGTH)?;
        log_length_mismatch(&schema::IPV4, length);
        let option_type: u8 = reader.take(&schema::TYPE)?;
        if OptionType::from_u8(option_type).is_some_and(|t| t.is_ipv6()) {
            return Err(SomeIpError::invalid_address(
                "IPv4",
                format!("option type 0x{option_type:02X} carries an IPv6 address"),
            ));
        }
        let discardable: u8 = reader.take(&schema::DISCARDABLE_FLAG)?;
        reader.skip(&schema::FLAG_RESERVED)?;
        let address = Ipv4Addr::from(reader.take::<u32>(&schema::IPV4_ADDRESS)?);
        reader.skip(&schema::RESERVED)?;

        Ok(Self {
            option_type,
            discardable: discardable == 1,
            address,
            transport_protocol: reader.take(&schema::TRANSPORT_PROTOCOL)?,
            port: reader.take(&schema::TRANSPORT_PROTOCOL_PORT_NUMBER)?,
        })
    }
}

/// IPv6 endpoint or multicast option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IPv6Option {
    /// Raw option type code (0x06 endpoint, 0x16 multicast).
    pub option_type: u8,
    pub discardable: bool,
    pub address: Ipv6Addr,
    /// Raw transport protocol code (0x06 TCP, 0x11 UDP).
    pub transport_protocol: u8,
    pub port: u16,
}

impl IPv6Option {
    /// Value of the length field.
    pub const LENGTH: u16 = length_field(&schema::IPV6);
    /// Size on the wire.
    pub const SIZE: usize = schema::IPV6.fixed_bytes();

    /// Create an IPv6 endpoint option.
    pub fn endpoint(address: Ipv6Addr, protocol: TransportProtocol, port: u16) -> Self {
        Self {
            option_type: OptionType::IPv6Endpoint as u8,
            discardable: false,
            address,
            transport_protocol: protocol as u8,
            port,
        }
    }

    /// Create an IPv6 multicast option.
    pub fn multicast(address: Ipv6Addr, port: u16) -> Self {
        Self {
            option_type: OptionType::IPv6Multicast as u8,
            ..Self::endpoint(address, TransportProtocol::Udp, port)
        }
    }

    /// Create an option from a generic IP address, which must be IPv6.
    pub fn from_ip(
        option_type: u8,
        address: IpAddr,
        transport_protocol: u8,
        port: u16,
    ) -> Result<Self> {
        let IpAddr::V6(address) = address else {
            return Err(SomeIpError::invalid_address(
                "IPv6",
                format!("{address} is not an IPv6 address"),
            ));
        };
        Ok(Self {
            option_type,
            discardable: false,
            address,
            transport_protocol,
            port,
        })
    }

    /// Create from a socket address.
    pub fn from_socket_addr(addr: SocketAddrV6, protocol: TransportProtocol) -> Self {
        Self::endpoint(*addr.ip(), protocol, addr.port())
    }

    /// Convert to a socket address.
    pub fn to_socket_addr(&self) -> SocketAddrV6 {
        SocketAddrV6::new(self.address, self.port, 0, 0)
    }

    /// Mark the option as discardable.
    pub fn discardable(mut self, discardable: bool) -> Self {
        self.discardable = discardable;
        self
    }

    /// Build an option from named fields. `ipv6_address` is a textual address.
    pub fn from_fields(fields: &FieldMap) -> Result<Self> {
        let text = fields.text(&schema::IPV6_ADDRESS)?;
        let address: IpAddr = text
            .parse()
            .map_err(|_| SomeIpError::invalid_address("IPv6", format!("cannot parse {text:?}")))?;
        let discardable: u8 = fields.uint_or(&schema::DISCARDABLE_FLAG, 0)?;
        Ok(Self::from_ip(
            fields.uint(&schema::TYPE)?,
            address,
            fields.uint(&schema::TRANSPORT_PROTOCOL)?,
            fields.uint(&schema::TRANSPORT_PROTOCOL_PORT_NUMBER)?,
        )?
        .discardable(discardable == 1))
    }

    /// Typed option type, if known.
    pub fn kind(&self) -> Option<OptionType> {
        OptionType::from_u8(self.option_type)
    }

    /// Typed transport protocol, if known.
    pub fn protocol(&self) -> Option<TransportProtocol> {
        TransportProtocol::from_u8(self.transport_protocol)
    }

    /// Encode the option to its 24 wire bytes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut writer = BitWriter::with_capacity(Self::SIZE);
        writer.put(&schema::LENGTH, Self::LENGTH)?;
        writer.put(&schema::TYPE, self.option_type)?;
        writer.put(&schema::DISCARDABLE_FLAG, u8::from(self.discardable))?;
        writer.zero(&schema::FLAG_RESERVED)?;
        writer.put(&schema::IPV6_ADDRESS, u128::from(self.address))?;
        writer.zero(&schema::RESERVED)?;
        writer.put(&schema::TRANSPORT_PROTOCOL, self.transport_protocol)?;
        writer.put(&schema::TRANSPORT_PROTOCOL_PORT_NUMBER, self.port)?;
        Ok(writer.into_bytes())
    }

    /// Decode an option from exactly 24 bytes.
    pub fn decode(data: &[u8]) -> Result<Self> {
        check_len(&schema::IPV6, data)?;

        let mut reader = BitReader::new(data);
        let length: u16 = reader.take(&schema::LENGTH)?;
        log_length_mismatch(&schema::IPV6, length);
        let option_type: u8 = reader.take(&schema::TYPE)?;
        if OptionType::from_u8(option_type).is_some_and(|t| t.is_ipv4()) {
            return Err(SomeIpError::invalid_address(
                "IPv6",
                format!("option type 0x{option_type:02X} carries an IPv4 address"),
            ));
        }
        let discardable: u8 = reader.take(&schema::DISCARDABLE_FLAG)?;
        reader.skip(&schema::FLAG_RESERVED)?;
        let address = Ipv6Addr::from(reader.take::<u128>(&schema::IPV6_ADDRESS)?);
        reader.skip(&schema::RESERVED)?;

        Ok(Self {
            option_type,
            discardable: discardable == 1,
            address,
            transport_protocol: reader.take(&schema::TRANSPORT_PROTOCOL)?,
            port: reader.take(&schema::TRANSPORT_PROTOCOL_PORT_NUMBER)?,
        })
    }
}

/// An SD option found in an options array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdOption {
    IPv4(IPv4Option),
    IPv6(IPv6Option),
    /// Any other option type, kept verbatim (length and type bytes included).
    Other { option_type: u8, data: Bytes },
}

impl SdOption {
    /// Decode the option at the start of `data`.
    ///
    /// Returns the option and the number of bytes it occupies, as announced by
    /// its length field.
    pub fn decode_prefix(data: &[u8]) -> Result<(Self, usize)> {
        if data.len() < OPTION_PREFIX_SIZE {
            return Err(SomeIpError::truncated(OPTION_PREFIX_SIZE, data.len()));
        }
        let length = u16::from_be_bytes([data[0], data[1]]) as usize;
        let size = OPTION_PREFIX_SIZE + length;
        if data.len() < size {
            return Err(SomeIpError::truncated(size, data.len()));
        }

        let raw = &data[..size];
        let option_type = data[2];
        let option = match OptionType::from_u8(option_type) {
            Some(t) if t.is_ipv4() => SdOption::IPv4(IPv4Option::decode(raw)?),
            Some(t) if t.is_ipv6() => SdOption::IPv6(IPv6Option::decode(raw)?),
            _ => SdOption::Other {
                option_type,
                data: Bytes::copy_from_slice(raw),
            },
        };
        Ok((option, size))
    }

    /// Split an options array into options.
    pub fn decode_all(mut data: &[u8]) -> Result<Vec<Self>> {
        let mut options = Vec::new();
        while !data.is_empty() {
            let (option, size) = Self::decode_prefix(data)?;
            options.push(option);
            data = &data[size..];
        }
        Ok(options)
    }

    /// Encode the option.
    pub fn encode(&self) -> Result<Vec<u8>> {
        match self {
            SdOption::IPv4(opt) => opt.encode(),
            SdOption::IPv6(opt) => opt.encode(),
            SdOption::Other { data, .. } => Ok(data.to_vec()),
        }
    }

    /// Raw option type code.
    pub fn option_type(&self) -> u8 {
        match self {
            SdOption::IPv4(opt) => opt.option_type,
            SdOption::IPv6(opt) => opt.option_type,
            SdOption::Other { option_type, .. } => *option_type,
        }
    }
}

impl From<IPv4Option> for SdOption {
    fn from(option: IPv4Option) -> Self {
        SdOption::IPv4(option)
    }
}

impl From<IPv6Option> for SdOption {
    fn from(option: IPv6Option) -> Self {
        SdOption::IPv6(option)
    }
}

/// A network endpoint (address + port + protocol).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub address: SocketAddr,
    pub protocol: TransportProtocol,
}

impl Endpoint {
    pub fn new(address: SocketAddr, protocol: TransportProtocol) -> Self {
        Self { address, protocol }
    }

    pub fn tcp(address: SocketAddr) -> Self {
        Self::new(address, TransportProtocol::Tcp)
    }

    pub fn udp(address: SocketAddr) -> Self {
        Self::new(address, TransportProtocol::Udp)
    }

    /// Convert to an endpoint option of the matching family.
    pub fn to_option(&self) -> SdOption {
        match self.address {
            SocketAddr::V4(addr) => IPv4Option::from_socket_addr(addr, self.protocol).into(),
            SocketAddr::V6(addr) => IPv6Option::from_socket_addr(addr, self.protocol).into(),
        }
    }

    /// Create from an endpoint option with a known transport protocol.
    pub fn from_option(option: &SdOption) -> Option<Self> {
        match option {
            SdOption::IPv4(opt) => Some(Self::new(opt.to_socket_addr().into(), opt.protocol()?)),
            SdOption::IPv6(opt) => Some(Self::new(opt.to_socket_addr().into(), opt.protocol()?)),
            SdOption::Other { .. } => None,
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let proto = match self.protocol {
            TransportProtocol::Tcp => "tcp",
            TransportProtocol::Udp => "udp",
        };
        write!(f, "{}://{}", proto, self.address)
    }
}
