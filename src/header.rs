//! SOME/IP header types and ID newtypes.

use crate::bits::{BitReader, BitWriter};
use crate::error::{Result, SomeIpError};
use crate::fields::FieldMap;
use crate::schema::someip;
use crate::types::{MessageType, ReturnCode, PROTOCOL_VERSION};

/// Size of the SOME/IP header in bytes.
pub const HEADER_SIZE: usize = someip::HEADER.fixed_bytes();

/// Service ID - identifies a SOME/IP service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ServiceId(pub u16);

/// Method ID - identifies a method within a service.
/// Bit 15 indicates if this is an event (1) or method (0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MethodId(pub u16);

/// Client ID - identifies the client making a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ClientId(pub u16);

/// Session ID - unique identifier for a request/response pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SessionId(pub u16);

impl MethodId {
    /// Check if this method ID represents an event (bit 15 set).
    pub fn is_event(&self) -> bool {
        self.0 & 0x8000 != 0
    }

    /// Create a method ID for an event.
    pub fn event(id: u16) -> Self {
        Self(id | 0x8000)
    }

    /// Create a method ID for a regular method.
    pub fn method(id: u16) -> Self {
        Self(id & 0x7FFF)
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

impl std::fmt::Display for MethodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

/// SOME/IP message header (16 bytes).
///
/// ```text
/// +----------------+----------------+----------------+----------------+
/// |           Message ID (32 bits)                                   |
/// |   Service ID (16 bits)  |  Method ID (16 bits)                   |
/// +----------------+----------------+----------------+----------------+
/// |           Length (32 bits) - bytes after this field              |
/// +----------------+----------------+----------------+----------------+
/// |           Request ID (32 bits)                                   |
/// |   Client ID (16 bits)   |  Session ID (16 bits)                  |
/// +----------------+----------------+----------------+----------------+
/// | Protocol Ver | Interface Ver | Message Type | Return Code        |
/// | (8 bits)     | (8 bits)      | (8 bits)     | (8 bits)           |
/// +----------------+----------------+----------------+----------------+
/// ```
///
/// The length field is not stored. It depends on what follows the header, so
/// the owning message computes it at encode time and decoders discard it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SomeIpHeader {
    /// Service ID.
    pub service_id: ServiceId,
    /// Method ID.
    pub method_id: MethodId,
    /// Client ID.
    pub client_id: ClientId,
    /// Session ID.
    pub session_id: SessionId,
    /// Protocol version (normally 0x01).
    pub protocol_version: u8,
    /// Interface version.
    pub interface_version: u8,
    /// Message type.
    pub message_type: MessageType,
    /// Return code.
    pub return_code: ReturnCode,
}

impl SomeIpHeader {
    /// Create a new header with the given service and method IDs.
    pub fn new(service_id: ServiceId, method_id: MethodId) -> Self {
        Self {
            service_id,
            method_id,
            client_id: ClientId::default(),
            session_id: SessionId::default(),
            protocol_version: PROTOCOL_VERSION,
            interface_version: 1,
            message_type: MessageType::Request,
            return_code: ReturnCode::Ok,
        }
    }

    /// Create a request header.
    pub fn request(service_id: ServiceId, method_id: MethodId) -> Self {
        Self::new(service_id, method_id)
    }

    /// Create a notification header.
    pub fn notification(service_id: ServiceId, method_id: MethodId) -> Self {
        let mut header = Self::new(service_id, method_id);
        header.message_type = MessageType::Notification;
        header
    }

    /// Create a response header from a request header.
    pub fn response_from(request: &Self) -> Self {
        Self {
            message_type: MessageType::Response,
            return_code: ReturnCode::Ok,
            protocol_version: PROTOCOL_VERSION,
            ..request.clone()
        }
    }

    /// Create an error response header from a request header.
    pub fn error_from(request: &Self, return_code: ReturnCode) -> Self {
        Self {
            message_type: MessageType::Error,
            return_code,
            protocol_version: PROTOCOL_VERSION,
            ..request.clone()
        }
    }

    /// Check if the protocol version is the one this crate speaks.
    pub fn has_current_protocol_version(&self) -> bool {
        self.protocol_version == PROTOCOL_VERSION
    }

    /// Parse a header and the on-wire length field from bytes.
    pub fn parse(data: &[u8]) -> Result<(Self, u32)> {
        if data.len() < HEADER_SIZE {
            return Err(SomeIpError::truncated(HEADER_SIZE, data.len()));
        }
        let mut reader = BitReader::new(&data[..HEADER_SIZE]);
        Self::read(&mut reader)
    }

    /// Parse a header from bytes, discarding the length field.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::parse(data).map(|(header, _)| header)
    }

    /// Serialize the header with the given length field.
    pub fn to_bytes(&self, length: u32) -> Result<Vec<u8>> {
        let mut writer = BitWriter::with_capacity(HEADER_SIZE);
        self.write(&mut writer, length)?;
        Ok(writer.into_bytes())
    }

    /// Build a header from named fields.
    ///
    /// `protocol_version` defaults to the current version; every other header
    /// field is required. A `length` entry is ignored. Message type and
    /// return code accept any 8-bit value.
    pub fn from_fields(fields: &FieldMap) -> Result<Self> {
        Ok(Self {
            service_id: ServiceId(fields.uint(&someip::SERVICE_ID)?),
            method_id: MethodId(fields.uint(&someip::METHOD_ID)?),
            client_id: ClientId(fields.uint(&someip::CLIENT_ID)?),
            session_id: SessionId(fields.uint(&someip::SESSION_ID)?),
            protocol_version: fields.uint_or(&someip::PROTOCOL_VERSION, PROTOCOL_VERSION)?,
            interface_version: fields.uint(&someip::INTERFACE_VERSION)?,
            message_type: MessageType::from_u8(fields.uint(&someip::MESSAGE_TYPE)?),
            return_code: ReturnCode::from_u8(fields.uint(&someip::RETURN_CODE)?),
        })
    }

    pub(crate) fn read(reader: &mut BitReader<'_>) -> Result<(Self, u32)> {
        let service_id = ServiceId(reader.take(&someip::SERVICE_ID)?);
        let method_id = MethodId(reader.take(&someip::METHOD_ID)?);
        let length: u32 = reader.take(&someip::LENGTH)?;
        let client_id = ClientId(reader.take(&someip::CLIENT_ID)?);
        let session_id = SessionId(reader.take(&someip::SESSION_ID)?);
        let protocol_version = reader.take(&someip::PROTOCOL_VERSION)?;
        let interface_version = reader.take(&someip::INTERFACE_VERSION)?;

        let message_type = MessageType::from_u8(reader.take(&someip::MESSAGE_TYPE)?);
        let return_code = ReturnCode::from_u8(reader.take(&someip::RETURN_CODE)?);

        let header = Self {
            service_id,
            method_id,
            client_id,
            session_id,
            protocol_version,
            interface_version,
            message_type,
            return_code,
        };
        Ok((header, length))
    }

    pub(crate) fn write(&self, writer: &mut BitWriter, length: u32) -> Result<()> {
        writer.put(&someip::SERVICE_ID, self.service_id.0)?;
        writer.put(&someip::METHOD_ID, self.method_id.0)?;
        writer.put(&someip::LENGTH, length)?;
        writer.put(&someip::CLIENT_ID, self.client_id.0)?;
        writer.put(&someip::SESSION_ID, self.session_id.0)?;
        writer.put(&someip::PROTOCOL_VERSION, self.protocol_version)?;
        writer.put(&someip::INTERFACE_VERSION, self.interface_version)?;
        writer.put(&someip::MESSAGE_TYPE, self.message_type.to_u8())?;
        writer.put(&someip::RETURN_CODE, self.return_code.to_u8())
    }

    /// Get the message ID (service_id << 16 | method_id).
    pub fn message_id(&self) -> u32 {
        ((self.service_id.0 as u32) << 16) | (self.method_id.0 as u32)
    }

    /// Get the request ID (client_id << 16 | session_id).
    pub fn request_id(&self) -> u32 {
        ((self.client_id.0 as u32) << 16) | (self.session_id.0 as u32)
    }
}

impl Default for SomeIpHeader {
    fn default() -> Self {
        Self::new(ServiceId(0), MethodId(0))
    }
}
