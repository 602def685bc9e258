//! Length-prefixed framing.
//!
//! One frame is an ASCII decimal length terminated by `\n` (a `\r` right before
//! it is dropped), followed by exactly that many UTF-8 bytes. Length 0 carries
//! no payload and means "send me your configuration".

use crate::error::protocol::ProtocolError;
use crate::error::transport::TransportError;
use crate::error::CoreError;

use common::ErrorLocation;

use std::panic::Location;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Longest header accepted before a newline must appear.
pub const MAX_HEADER_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameHeader {
    /// Zero-length frame: a configuration request.
    Request,

    /// A configuration payload of this many bytes follows.
    Config(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Request,
    Config(String),
}

pub fn encode_header(len: usize) -> String {
    format!("{len}\n")
}

pub fn parse_header(raw: &str) -> Result<FrameHeader, ProtocolError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ProtocolError::empty_header());
    }

    match trimmed.parse::<usize>() {
        Ok(0) => Ok(FrameHeader::Request),
        Ok(len) => Ok(FrameHeader::Config(len)),
        Err(_) => Err(ProtocolError::invalid_header(raw)),
    }
}

/// Read the header line one byte at a time.
///
/// Stops at `\n` or end of stream; a peer that closes before sending anything
/// yields an empty string.
pub async fn read_header<R>(reader: &mut R) -> Result<String, CoreError>
where
    R: AsyncRead + Unpin,
{
    let mut line = Vec::with_capacity(MAX_HEADER_LEN);
    let mut byte = [0u8; 1];

    loop {
        if reader.read(&mut byte).await.map_err(TransportError::from)? == 0 {
            break;
        }
        if byte[0] == b'\n' {
            break;
        }
        // A trailing '\r' does not count towards the limit
        let limit = if byte[0] == b'\r' {
            MAX_HEADER_LEN + 1
        } else {
            MAX_HEADER_LEN
        };
        if line.len() >= limit {
            return Err(ProtocolError::HeaderTooLong {
                limit: MAX_HEADER_LEN,
                location: ErrorLocation::from(Location::caller()),
            }
            .into());
        }
        line.push(byte[0]);
    }

    if line.last() == Some(&b'\r') {
        line.pop();
    }

    String::from_utf8(line)
        .map_err(|e| ProtocolError::invalid_header(String::from_utf8_lossy(e.as_bytes())).into())
}

/// Read exactly `len` payload bytes, accumulating over as many reads as it takes.
///
/// A read of zero bytes before `len` is reached is an end-of-stream error;
/// nothing partial is returned.
pub async fn read_payload<R>(reader: &mut R, len: usize) -> Result<Vec<u8>, TransportError>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = vec![0u8; len];
    let mut filled = 0;

    while filled < len {
        let read = reader.read(&mut buffer[filled..]).await?;
        if read == 0 {
            return Err(TransportError::unexpected_eof(len, filled));
        }
        filled += read;
    }

    Ok(buffer)
}

/// Strict UTF-8 decode: invalid bytes reject the payload.
pub fn decode_payload(bytes: Vec<u8>) -> Result<String, ProtocolError> {
    Ok(String::from_utf8(bytes)?)
}

/// Read one full frame, refusing payloads declared larger than `max_payload`.
pub async fn read_frame<R>(reader: &mut R, max_payload: usize) -> Result<Frame, CoreError>
where
    R: AsyncRead + Unpin,
{
    let raw = read_header(reader).await?;

    match parse_header(&raw)? {
        FrameHeader::Request => Ok(Frame::Request),
        FrameHeader::Config(len) if len > max_payload => Err(ProtocolError::PayloadTooLarge {
            declared: len,
            limit: max_payload,
            location: ErrorLocation::from(Location::caller()),
        }
        .into()),
        FrameHeader::Config(len) => {
            let bytes = read_payload(reader, len).await?;
            Ok(Frame::Config(decode_payload(bytes)?))
        }
    }
}

/// Write header then payload, then flush. An empty payload writes only `"0\n"`.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(encode_header(payload.len()).as_bytes())
        .await?;
    if !payload.is_empty() {
        writer.write_all(payload).await?;
    }
    writer.flush().await?;
    Ok(())
}
