//! Log frame codec
//!
//! The log is a sequence of frames with no file header or footer:
//!
//! ```text
//! +------------------+
//! | Payload Length   | (u32 LE)
//! +------------------+
//! | Payload          | (UTF-8 JSON document, `length` bytes)
//! +------------------+
//! | Terminator       | (0x0A)
//! +------------------+
//! ```
//!
//! A torn write can only damage the last frame, which then declares more
//! bytes than the file holds.

use std::fmt;

use super::errors::{StorageError, StorageResult};
use crate::document::Document;

/// Size of the little-endian length prefix
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Byte closing every frame
pub const FRAME_TERMINATOR: u8 = b'\n';

/// Bytes a frame adds around its payload
pub const FRAME_OVERHEAD: usize = LENGTH_PREFIX_SIZE + 1;

/// Why a byte slice is not a valid frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Fewer bytes than the frame declares. Nothing after this point can be delimited.
    Truncated { declared: usize, available: usize },
    /// Boundaries are intact but the contents are not a document.
    Malformed { frame_len: usize, reason: String },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Truncated {
                declared,
                available,
            } => write!(
                f,
                "Frame truncated: declares {} bytes, {} available",
                declared, available
            ),
            FrameError::Malformed { reason, .. } => write!(f, "Malformed frame: {}", reason),
        }
    }
}

/// Total frame length for a declared payload length
pub fn frame_len(payload_len: usize) -> usize {
    payload_len + FRAME_OVERHEAD
}

/// Reads the payload length from the first bytes of a frame
pub fn read_length_prefix(data: &[u8]) -> Option<usize> {
    let prefix: [u8; LENGTH_PREFIX_SIZE] = data.get(..LENGTH_PREFIX_SIZE)?.try_into().ok()?;
    Some(u32::from_le_bytes(prefix) as usize)
}

/// Encodes a document into a complete frame.
///
/// Deterministic: the same document always yields the same bytes.
pub fn encode_frame(document: &Document) -> StorageResult<Vec<u8>> {
    let payload = serde_json::to_vec(document).map_err(|e| {
        StorageError::write_failed_no_source(format!(
            "Failed to encode document {}: {}",
            document.id, e
        ))
    })?;

    let payload_len = u32::try_from(payload.len()).map_err(|_| {
        StorageError::write_failed_no_source(format!(
            "Document {} is too large for a frame: {} bytes",
            document.id,
            payload.len()
        ))
    })?;

    let mut frame = Vec::with_capacity(frame_len(payload.len()));
    frame.extend_from_slice(&payload_len.to_le_bytes());
    frame.extend_from_slice(&payload);
    frame.push(FRAME_TERMINATOR);

    Ok(frame)
}

/// Decodes the frame at the start of `data`.
///
/// Returns the document and the number of bytes consumed.
pub fn decode_frame(data: &[u8]) -> Result<(Document, usize), FrameError> {
    let payload_len = read_length_prefix(data).ok_or(FrameError::Truncated {
        declared: LENGTH_PREFIX_SIZE,
        available: data.len(),
    })?;

    let total = frame_len(payload_len);
    if data.len() < total {
        return Err(FrameError::Truncated {
            declared: total,
            available: data.len(),
        });
    }

    let payload = &data[LENGTH_PREFIX_SIZE..LENGTH_PREFIX_SIZE + payload_len];

    if data[total - 1] != FRAME_TERMINATOR {
        return Err(FrameError::Malformed {
            frame_len: total,
            reason: format!("expected terminator 0x0a, found 0x{:02x}", data[total - 1]),
        });
    }

    let text = std::str::from_utf8(payload).map_err(|e| FrameError::Malformed {
        frame_len: total,
        reason: format!("payload is not valid UTF-8: {}", e),
    })?;

    let document: Document = serde_json::from_str(text).map_err(|e| FrameError::Malformed {
        frame_len: total,
        reason: format!("payload is not a document: {}", e),
    })?;

    Ok((document, total))
}
