//! Core SOME/IP types and constants.

/// SOME/IP protocol version (always 0x01).
pub const PROTOCOL_VERSION: u8 = 0x01;

/// SOME/IP message types.
///
/// Codes outside the protocol set are kept as [`MessageType::Other`] so that
/// malformed traffic can be both sent and received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Request expecting a response (0x00).
    Request,
    /// Request not expecting a response, fire-and-forget (0x01).
    RequestNoReturn,
    /// Cyclic or event-based notification (0x02).
    Notification,
    /// Response to a request (0x80).
    Response,
    /// Error response to a request (0x81).
    Error,
    /// TP Request, segmented (0x20).
    TpRequest,
    /// TP Request not expecting a response (0x21).
    TpRequestNoReturn,
    /// TP Notification (0x22).
    TpNotification,
    /// TP Response (0xA0).
    TpResponse,
    /// TP Error (0xA1).
    TpError,
    /// Any code without a defined meaning.
    Other(u8),
}

impl MessageType {
    /// Create a MessageType from a raw byte value.
    pub fn from_u8(value: u8) -> Self {
        match value {
            0x00 => Self::Request,
            0x01 => Self::RequestNoReturn,
            0x02 => Self::Notification,
            0x80 => Self::Response,
            0x81 => Self::Error,
            0x20 => Self::TpRequest,
            0x21 => Self::TpRequestNoReturn,
            0x22 => Self::TpNotification,
            0xA0 => Self::TpResponse,
            0xA1 => Self::TpError,
            other => Self::Other(other),
        }
    }

    /// Wire value of this message type.
    pub fn to_u8(self) -> u8 {
        match self {
            Self::Request => 0x00,
            Self::RequestNoReturn => 0x01,
            Self::Notification => 0x02,
            Self::Response => 0x80,
            Self::Error => 0x81,
            Self::TpRequest => 0x20,
            Self::TpRequestNoReturn => 0x21,
            Self::TpNotification => 0x22,
            Self::TpResponse => 0xA0,
            Self::TpError => 0xA1,
            Self::Other(value) => value,
        }
    }

    /// Check if the code is one the protocol defines.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Check if this message type expects a response.
    pub fn expects_response(&self) -> bool {
        matches!(self, Self::Request | Self::TpRequest)
    }

    /// Check if this is a response message type.
    pub fn is_response(&self) -> bool {
        matches!(
            self,
            Self::Response | Self::Error | Self::TpResponse | Self::TpError
        )
    }

    /// Check if this is a TP (Transport Protocol) segmented message.
    pub fn is_tp(&self) -> bool {
        matches!(
            self,
            Self::TpRequest
                | Self::TpRequestNoReturn
                | Self::TpNotification
                | Self::TpResponse
                | Self::TpError
        )
    }
}

/// First code of the reserved generic range.
pub const RESERVED_GENERIC_START: u8 = 0x10;
/// Last code of the reserved generic range.
pub const RESERVED_GENERIC_END: u8 = 0x1F;
/// First code of the service-specific range.
pub const RESERVED_SPECIFIC_START: u8 = 0x20;
/// Last code of the service-specific range.
pub const RESERVED_SPECIFIC_END: u8 = 0x5E;

/// SOME/IP return codes.
///
/// Codes 0x10..=0x5E are reserved for future generic errors and for
/// service-specific errors. ECUs do send them, so they decode into
/// [`ReturnCode::Reserved`] rather than failing; anything above 0x5E is
/// [`ReturnCode::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReturnCode {
    /// No error occurred.
    #[default]
    Ok,
    /// An unspecified error occurred.
    NotOk,
    /// The requested Service ID is unknown.
    UnknownService,
    /// The requested Method ID is unknown.
    UnknownMethod,
    /// Service is not ready.
    NotReady,
    /// Service is not reachable.
    NotReachable,
    /// Timeout occurred.
    Timeout,
    /// Wrong protocol version.
    WrongProtocolVersion,
    /// Wrong interface version.
    WrongInterfaceVersion,
    /// Malformed message.
    MalformedMessage,
    /// Wrong message type.
    WrongMessageType,
    /// E2E repeated.
    E2ERepeated,
    /// E2E wrong sequence.
    E2EWrongSequence,
    /// E2E error (not further specified).
    E2E,
    /// E2E not available.
    E2ENotAvailable,
    /// E2E no new data.
    E2ENoNewData,
    /// A code from the reserved generic or service-specific range.
    Reserved(u8),
    /// A code above the service-specific range.
    Other(u8),
}

impl ReturnCode {
    /// Create a ReturnCode from a raw byte value.
    pub fn from_u8(value: u8) -> Self {
        match value {
            0x00 => Self::Ok,
            0x01 => Self::NotOk,
            0x02 => Self::UnknownService,
            0x03 => Self::UnknownMethod,
            0x04 => Self::NotReady,
            0x05 => Self::NotReachable,
            0x06 => Self::Timeout,
            0x07 => Self::WrongProtocolVersion,
            0x08 => Self::WrongInterfaceVersion,
            0x09 => Self::MalformedMessage,
            0x0A => Self::WrongMessageType,
            0x0B => Self::E2ERepeated,
            0x0C => Self::E2EWrongSequence,
            0x0D => Self::E2E,
            0x0E => Self::E2ENotAvailable,
            0x0F => Self::E2ENoNewData,
            RESERVED_GENERIC_START..=RESERVED_SPECIFIC_END => Self::Reserved(value),
            other => Self::Other(other),
        }
    }

    /// Wire value of this return code.
    pub fn to_u8(self) -> u8 {
        match self {
            Self::Ok => 0x00,
            Self::NotOk => 0x01,
            Self::UnknownService => 0x02,
            Self::UnknownMethod => 0x03,
            Self::NotReady => 0x04,
            Self::NotReachable => 0x05,
            Self::Timeout => 0x06,
            Self::WrongProtocolVersion => 0x07,
            Self::WrongInterfaceVersion => 0x08,
            Self::MalformedMessage => 0x09,
            Self::WrongMessageType => 0x0A,
            Self::E2ERepeated => 0x0B,
            Self::E2EWrongSequence => 0x0C,
            Self::E2E => 0x0D,
            Self::E2ENotAvailable => 0x0E,
            Self::E2ENoNewData => 0x0F,
            Self::Reserved(value) | Self::Other(value) => value,
        }
    }

    /// Check if this is a service-specific code (0x20..=0x5E).
    pub fn is_service_specific(&self) -> bool {
        matches!(self, Self::Reserved(v) if (RESERVED_SPECIFIC_START..=RESERVED_SPECIFIC_END).contains(v))
    }

    /// Check if this return code indicates success.
    pub fn is_ok(&self) -> bool {
        *self == Self::Ok
    }

    /// Check if this return code indicates an error.
    pub fn is_error(&self) -> bool {
        *self != Self::Ok
    }
}
