//! SOME/IP message handling.
//!
//! A message is the 16-byte header followed by an opaque payload. The length
//! field is derived from the payload on every encode and ignored on decode, so
//! a message value can never carry a length that disagrees with its payload.

use bytes::Bytes;
use tracing::debug;

use crate::bits::{BitReader, BitWriter};
use crate::error::{Result, SomeIpError};
use crate::fields::FieldMap;
use crate::header::{ClientId, MethodId, ServiceId, SessionId, SomeIpHeader, HEADER_SIZE};
use crate::schema::someip;
use crate::types::{MessageType, ReturnCode, PROTOCOL_VERSION};

/// A complete SOME/IP message (header + payload).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SomeIpMessage {
    /// Message header.
    pub header: SomeIpHeader,
    /// Message payload.
    pub payload: Bytes,
}

impl SomeIpMessage {
    /// Create a new message with the given header and payload.
    pub fn new(header: SomeIpHeader, payload: impl Into<Bytes>) -> Self {
        Self {
            header,
            payload: payload.into(),
        }
    }

    /// Create a new message with an empty payload.
    pub fn with_header(header: SomeIpHeader) -> Self {
        Self::new(header, Bytes::new())
    }

    /// Create a request message builder.
    pub fn request(service_id: ServiceId, method_id: MethodId) -> MessageBuilder {
        MessageBuilder::new(service_id, method_id, MessageType::Request)
    }

    /// Create a request-no-return message builder.
    pub fn request_no_return(service_id: ServiceId, method_id: MethodId) -> MessageBuilder {
        MessageBuilder::new(service_id, method_id, MessageType::RequestNoReturn)
    }

    /// Create a notification message builder.
    pub fn notification(service_id: ServiceId, method_id: MethodId) -> MessageBuilder {
        MessageBuilder::new(service_id, method_id, MessageType::Notification)
    }

    /// Create a response to this message.
    pub fn create_response(&self) -> MessageBuilder {
        let mut builder = MessageBuilder::new(
            self.header.service_id,
            self.header.method_id,
            MessageType::Response,
        );
        builder.client_id = self.header.client_id;
        builder.session_id = self.header.session_id;
        builder.interface_version = self.header.interface_version;
        builder
    }

    /// Create an error response to this message.
    pub fn create_error_response(&self, return_code: ReturnCode) -> MessageBuilder {
        let mut builder = MessageBuilder::new(
            self.header.service_id,
            self.header.method_id,
            MessageType::Error,
        );
        builder.client_id = self.header.client_id;
        builder.session_id = self.header.session_id;
        builder.interface_version = self.header.interface_version;
        builder.return_code = return_code;
        builder
    }

    /// Build a message from named header fields and an optional `payload`.
    pub fn from_fields(fields: &FieldMap) -> Result<Self> {
        let header = SomeIpHeader::from_fields(fields)?;
        let payload = fields.bytes(&someip::PAYLOAD)?;
        Ok(Self { header, payload })
    }

    /// Value of the length field: the 8 header bytes after it plus the payload.
    pub fn length(&self) -> Result<u32> {
        let length = someip::LENGTH_COVERED_HEADER_BYTES as usize + self.payload.len();
        u32::try_from(length).map_err(|_| someip::LENGTH.range_error(length as u128))
    }

    /// Encode the message to wire bytes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut writer = BitWriter::with_capacity(self.total_size());
        self.header.write(&mut writer, self.length()?)?;
        writer.put_bytes(&self.payload)?;
        Ok(writer.into_bytes())
    }

    /// Decode a message from wire bytes.
    ///
    /// Everything after the 16-byte header is the payload. The on-wire length
    /// field is not consulted.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(SomeIpError::truncated(HEADER_SIZE, data.len()));
        }

        let mut reader = BitReader::new(data);
        let (header, wire_length) = SomeIpHeader::read(&mut reader)?;
        let payload = Bytes::copy_from_slice(reader.read_rest()?);

        let expected = someip::LENGTH_COVERED_HEADER_BYTES as usize + payload.len();
        if wire_length as usize != expected {
            debug!(
                wire_length,
                expected, "SOME/IP length field disagrees with received payload"
            );
        }

        Ok(Self { header, payload })
    }

    /// Get the total message size (header + payload).
    pub fn total_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    /// Check if this message is a request.
    pub fn is_request(&self) -> bool {
        matches!(
            self.header.message_type,
            MessageType::Request | MessageType::TpRequest
        )
    }

    /// Check if this message is a response.
    pub fn is_response(&self) -> bool {
        self.header.message_type.is_response()
    }

    /// Check if this message expects a response.
    pub fn expects_response(&self) -> bool {
        self.header.message_type.expects_response()
    }

    /// Get the service ID.
    pub fn service_id(&self) -> ServiceId {
        self.header.service_id
    }

    /// Get the method ID.
    pub fn method_id(&self) -> MethodId {
        self.header.method_id
    }

    /// Get the client ID.
    pub fn client_id(&self) -> ClientId {
        self.header.client_id
    }

    /// Get the session ID.
    pub fn session_id(&self) -> SessionId {
        self.header.session_id
    }

    /// Get the return code.
    pub fn return_code(&self) -> ReturnCode {
        self.header.return_code
    }

    /// Check if the return code indicates success.
    pub fn is_ok(&self) -> bool {
        self.header.return_code.is_ok()
    }
}

impl std::fmt::Display for SomeIpMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "service={} method={} client={} session={} type={:?} code={:?} payload={}B",
            self.header.service_id,
            self.header.method_id,
            self.header.client_id,
            self.header.session_id,
            self.header.message_type,
            self.header.return_code,
            self.payload.len()
        )
    }
}

/// Builder for constructing SOME/IP messages.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    service_id: ServiceId,
    method_id: MethodId,
    client_id: ClientId,
    session_id: SessionId,
    protocol_version: u8,
    interface_version: u8,
    message_type: MessageType,
    return_code: ReturnCode,
    payload: Bytes,
}

impl MessageBuilder {
    /// Create a new message builder.
    pub fn new(service_id: ServiceId, method_id: MethodId, message_type: MessageType) -> Self {
        Self {
            service_id,
            method_id,
            client_id: ClientId::default(),
            session_id: SessionId::default(),
            protocol_version: PROTOCOL_VERSION,
            interface_version: 1,
            message_type,
            return_code: ReturnCode::Ok,
            payload: Bytes::new(),
        }
    }

    /// Set the client ID.
    pub fn client_id(mut self, client_id: ClientId) -> Self {
        self.client_id = client_id;
        self
    }

    /// Set the session ID.
    pub fn session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = session_id;
        self
    }

    /// Set the protocol version.
    pub fn protocol_version(mut self, version: u8) -> Self {
        self.protocol_version = version;
        self
    }

    /// Set the interface version.
    pub fn interface_version(mut self, version: u8) -> Self {
        self.interface_version = version;
        self
    }

    /// Set the return code.
    pub fn return_code(mut self, code: ReturnCode) -> Self {
        self.return_code = code;
        self
    }

    /// Set the payload from bytes.
    pub fn payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Build the message.
    pub fn build(self) -> SomeIpMessage {
        let header = SomeIpHeader {
            service_id: self.service_id,
            method_id: self.method_id,
            client_id: self.client_id,
            session_id: self.session_id,
            protocol_version: self.protocol_version,
            interface_version: self.interface_version,
            message_type: self.message_type,
            return_code: self.return_code,
        };

        SomeIpMessage {
            header,
            payload: self.payload,
        }
    }
}
