//! SOME/IP message framing over byte streams.
//!
//! On a stream the length field is the only frame delimiter, so unlike
//! [`SomeIpMessage::decode`] the functions here must trust it.

use std::io::{Read, Write};

use crate::error::{Result, SomeIpError};
use crate::header::{SomeIpHeader, HEADER_SIZE};
use crate::message::SomeIpMessage;
use crate::schema::someip;

/// Largest frame accepted by default.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64 * 1024;

/// Number of payload bytes announced by a length field.
pub(crate) fn payload_length(length: u32) -> Result<usize> {
    let covered = someip::LENGTH_COVERED_HEADER_BYTES;
    length
        .checked_sub(covered)
        .map(|len| len as usize)
        .ok_or(SomeIpError::InvalidLength {
            structure: "SOME/IP length field",
            expected: covered as usize,
            actual: length as usize,
        })
}

/// Read a complete SOME/IP message from a stream.
///
/// This function handles TCP framing by first reading the header,
/// then reading the payload based on the length field.
pub fn read_message<R: Read>(reader: &mut R) -> Result<SomeIpMessage> {
    // Read header
    let mut header_buf = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header_buf)?;

    let (header, length) = SomeIpHeader::parse(&header_buf)?;
    let payload_len = payload_length(length)?;

    // Read payload
    let mut payload = vec![0u8; payload_len];
    if payload_len > 0 {
        reader.read_exact(&mut payload)?;
    }

    Ok(SomeIpMessage::new(header, payload))
}

/// Total size of the frame whose header is `header`, checked against `max_size`.
pub(crate) fn frame_size(header: &[u8; HEADER_SIZE], max_size: usize) -> Result<usize> {
    let length = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);
    let size = HEADER_SIZE + payload_length(length)?;
    if size > max_size {
        return Err(SomeIpError::InvalidLength {
            structure: "SOME/IP frame",
            expected: max_size,
            actual: size,
        });
    }
    Ok(size)
}

/// Read one length-delimited frame (header and payload) as raw bytes.
///
/// Only the length field is interpreted, so SD packets and messages with
/// codes this crate does not know are framed as well. Frames larger than
/// `max_size` bytes are rejected before their payload is read.
pub fn read_frame<R: Read>(reader: &mut R, max_size: usize) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;
    let size = frame_size(&header, max_size)?;

    let mut frame = Vec::with_capacity(size);
    frame.extend_from_slice(&header);
    frame.resize(size, 0);
    reader.read_exact(&mut frame[HEADER_SIZE..])?;
    Ok(frame)
}

/// Write a complete SOME/IP message to a stream.
pub fn write_message<W: Write>(writer: &mut W, message: &SomeIpMessage) -> Result<()> {
    writer.write_all(&message.encode()?)?;
    Ok(())
}
