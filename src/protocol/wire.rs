//! Wire framing
//!
//! Encoding and decoding of the frame envelope shared by every message.
//!
//! ## Wire Format
//!
//! ```text
//! ┌────────┬───────────┬────────────┬─────────┬─────────┬─────────┐
//! │ Op (1) │ ReqId (4) │ RespTo (4) │ Len (4) │ CRC (4) │ Payload │
//! └────────┴───────────┴────────────┴─────────┴─────────┴─────────┘
//! ```
//!
//! All integers are big-endian. `ReqId` is the frame's correlation
//! identifier; `RespTo` is zero on requests and carries the correlated
//! request id on replies. `CRC` is the CRC32 of the payload.

use std::io::Read;

use bytes::{BufMut, BytesMut};

use crate::buffer::PooledBuffer;
use crate::error::{ParchmentError, Result};

/// Header size: 1 byte op + 4 bytes each for request id, response-to,
/// payload length, and checksum
pub const HEADER_SIZE: usize = 17;

/// Absolute cap on a single frame's payload (64 MB)
pub const MAX_FRAME_SIZE: u32 = 64 * 1024 * 1024;

/// Frame operation codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    Insert = 0x01,
    Update = 0x02,
    Delete = 0x03,
    Command = 0x04,
    Reply = 0x05,
}

impl OpCode {
    /// Parse an op code from its wire byte
    pub fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            0x01 => Ok(OpCode::Insert),
            0x02 => Ok(OpCode::Update),
            0x03 => Ok(OpCode::Delete),
            0x04 => Ok(OpCode::Command),
            0x05 => Ok(OpCode::Reply),
            _ => Err(ParchmentError::Protocol(format!(
                "Unknown op code: 0x{:02x}",
                byte
            ))),
        }
    }
}

/// Parsed frame envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Operation carried by the frame
    pub op: OpCode,

    /// Correlation identifier of this frame
    pub request_id: u32,

    /// Request id this frame answers; zero on requests
    pub response_to: u32,

    /// Payload length in bytes
    pub payload_len: u32,

    /// CRC32 of the payload
    pub checksum: u32,
}

impl FrameHeader {
    /// Parse a header from its wire bytes
    pub fn parse(bytes: &[u8; HEADER_SIZE]) -> Result<Self> {
        let op = OpCode::from_byte(bytes[0])?;
        let request_id = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]);
        let response_to = u32::from_be_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]);
        let payload_len = u32::from_be_bytes([bytes[9], bytes[10], bytes[11], bytes[12]]);
        let checksum = u32::from_be_bytes([bytes[13], bytes[14], bytes[15], bytes[16]]);

        if payload_len > MAX_FRAME_SIZE {
            return Err(ParchmentError::Protocol(format!(
                "Frame payload too large: {} bytes (max {})",
                payload_len, MAX_FRAME_SIZE
            )));
        }

        Ok(Self {
            op,
            request_id,
            response_to,
            payload_len,
            checksum,
        })
    }
}

// =============================================================================
// Frame Encoding/Decoding
// =============================================================================

/// Append a complete frame (header + payload) to a buffer
///
/// Computes the payload checksum and writes the full envelope.
pub fn write_frame(
    buffer: &mut BytesMut,
    op: OpCode,
    request_id: u32,
    response_to: u32,
    payload: &[u8],
) -> Result<()> {
    if payload.len() > MAX_FRAME_SIZE as usize {
        return Err(ParchmentError::Protocol(format!(
            "Frame payload too large: {} bytes (max {})",
            payload.len(),
            MAX_FRAME_SIZE
        )));
    }

    buffer.reserve(HEADER_SIZE + payload.len());
    buffer.put_u8(op as u8);
    buffer.put_u32(request_id);
    buffer.put_u32(response_to);
    buffer.put_u32(payload.len() as u32);
    buffer.put_u32(crc32fast::hash(payload));
    buffer.put_slice(payload);

    Ok(())
}

/// Read exactly one frame from a stream
///
/// Blocks until the full frame arrives or an error occurs. The payload
/// is appended to `body`; the caller owns its release. The payload
/// checksum is verified before the header is returned.
pub fn read_frame<R: Read>(reader: &mut R, body: &mut PooledBuffer) -> Result<FrameHeader> {
    let mut header_bytes = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header_bytes)?;

    let header = FrameHeader::parse(&header_bytes)?;

    body.resize(header.payload_len as usize, 0);
    if header.payload_len > 0 {
        reader.read_exact(&mut body[..])?;
    }

    let actual = crc32fast::hash(body.as_slice());
    if actual != header.checksum {
        return Err(ParchmentError::Protocol(format!(
            "Frame checksum mismatch: expected 0x{:08x}, got 0x{:08x}",
            header.checksum, actual
        )));
    }

    Ok(header)
}

/// Parse one frame out of an in-memory byte slice
///
/// Returns the header, the payload slice, and the total number of bytes
/// consumed. Used to walk the frames accumulated in an output buffer.
pub fn split_frame(bytes: &[u8]) -> Result<(FrameHeader, &[u8], usize)> {
    if bytes.len() < HEADER_SIZE {
        return Err(ParchmentError::Protocol(format!(
            "Incomplete frame header: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut header_bytes = [0u8; HEADER_SIZE];
    header_bytes.copy_from_slice(&bytes[..HEADER_SIZE]);
    let header = FrameHeader::parse(&header_bytes)?;

    let total = HEADER_SIZE + header.payload_len as usize;
    if bytes.len() < total {
        return Err(ParchmentError::Protocol(format!(
            "Incomplete frame payload: expected {} bytes, got {}",
            total,
            bytes.len()
        )));
    }

    Ok((header, &bytes[HEADER_SIZE..total], total))
}
