//! Async SOME/IP message framing and codec utilities.
//!
//! Async versions of the [`codec`](crate::codec) stream functions for use with tokio.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::codec::{frame_size, payload_length};
use crate::error::Result;
use crate::header::{SomeIpHeader, HEADER_SIZE};
use crate::message::SomeIpMessage;

/// Read a complete SOME/IP message from an async stream.
///
/// This function handles TCP framing by first reading the header,
/// then reading the payload based on the length field.
pub async fn read_message_async<R: AsyncRead + Unpin>(reader: &mut R) -> Result<SomeIpMessage> {
    // Read header
    let mut header_buf = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header_buf).await?;

    let (header, length) = SomeIpHeader::parse(&header_buf)?;
    let payload_len = payload_length(length)?;

    // Read payload
    let mut payload = vec![0u8; payload_len];
    if payload_len > 0 {
        reader.read_exact(&mut payload).await?;
    }

    Ok(SomeIpMessage::new(header, payload))
}

/// Read one length-delimited frame (header and payload) as raw bytes.
///
/// See [`read_frame`](crate::codec::read_frame).
pub async fn read_frame_async<R: AsyncRead + Unpin>(
    reader: &mut R,
    max_size: usize,
) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header).await?;
    let size = frame_size(&header, max_size)?;

    let mut frame = Vec::with_capacity(size);
    frame.extend_from_slice(&header);
    frame.resize(size, 0);
    reader.read_exact(&mut frame[HEADER_SIZE..]).await?;
    Ok(frame)
}

/// Write a complete SOME/IP message to an async stream.
pub async fn write_message_async<W: AsyncWrite + Unpin>(
    writer: &mut W,
    message: &SomeIpMessage,
) -> Result<()> {
    writer.write_all(&message.encode()?).await?;
    Ok(())
}
