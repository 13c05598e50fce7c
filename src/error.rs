//! Error types for SOME/IP operations.

use std::io;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur during SOME/IP operations.
#[derive(Error, Debug)]
pub enum SomeIpError {
    /// I/O error during network operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A field value does not fit its declared bit width.
    #[error("Field {field} must be a {bits}-bit unsigned integer, got {value}")]
    FieldRange {
        field: &'static str,
        bits: u32,
        value: u128,
    },

    /// Input ended before a complete structure could be read.
    #[error("Truncated input: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// A fixed-size sub-structure was given the wrong number of bytes.
    #[error("Invalid {structure} length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        structure: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Option address does not belong to the family of the option.
    #[error("Invalid {family} address: {detail}")]
    InvalidAddress {
        family: &'static str,
        detail: String,
    },

    /// Bit cursor read or seek outside its bit sequence.
    #[error("Bit range error: requested {requested} bits at index {index}, length is {len}")]
    BitRange {
        requested: usize,
        index: usize,
        len: usize,
    },

    /// Every client ID in the pool is in use.
    #[error("Client ID pool exhausted")]
    PoolExhausted,

    /// Unknown SD entry type value.
    #[error("Unknown entry type: 0x{0:02X}")]
    UnknownEntryType(u8),

    /// A field map is missing a required field.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// No tester is registered under this vehicle name.
    #[error("Unknown vehicle type: {0}")]
    UnknownVehicle(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Connection closed unexpectedly.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Operation timed out.
    #[error("Operation timed out")]
    Timeout,
}

/// Result type alias for SOME/IP operations.
pub type Result<T> = std::result::Result<T, SomeIpError>;

impl SomeIpError {
    /// Create a new truncated input error.
    pub fn truncated(expected: usize, actual: usize) -> Self {
        Self::Truncated { expected, actual }
    }

    /// Create a new invalid address error.
    pub fn invalid_address(family: &'static str, detail: impl Into<String>) -> Self {
        Self::InvalidAddress {
            family,
            detail: detail.into(),
        }
    }

    /// Check if this error is a decode failure of received bytes.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Self::Truncated { .. }
                | Self::InvalidLength { .. }
                | Self::InvalidAddress { .. }
                | Self::UnknownEntryType(_)
        )
    }

    /// Check if this error is recoverable (transient).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Io(e) if e.kind() == io::ErrorKind::WouldBlock
                || e.kind() == io::ErrorKind::TimedOut
                || e.kind() == io::ErrorKind::Interrupted
        ) || matches!(self, Self::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SomeIpError::UnknownEntryType(0xFF);
        assert_eq!(format!("{err}"), "Unknown entry type: 0xFF");

        let err = SomeIpError::truncated(16, 15);
        assert_eq!(
            format!("{err}"),
            "Truncated input: expected at least 16 bytes, got 15"
        );

        let err = SomeIpError::FieldRange {
            field: "major_version",
            bits: 8,
            value: 256,
        };
        assert_eq!(
            format!("{err}"),
            "Field major_version must be a 8-bit unsigned integer, got 256"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionRefused, "test");
        let err: SomeIpError = io_err.into();
        assert!(matches!(err, SomeIpError::Io(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_decode_error_classification() {
        assert!(SomeIpError::truncated(16, 2).is_decode_error());
        assert!(!SomeIpError::PoolExhausted.is_decode_error());
        assert!(SomeIpError::Timeout.is_recoverable());
    }
}
