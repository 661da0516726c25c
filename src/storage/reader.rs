//! Sequential and point reads over the document log
//!
//! The reader separates two failure shapes:
//! - a malformed frame whose boundaries are intact is returned as
//!   [`Frame::Malformed`] so scans can step over it
//! - a frame declaring more bytes than the file holds is a
//!   `EMBER_DATA_CORRUPTION` error; a scan cannot continue past it

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use super::errors::{StorageError, StorageResult};
use super::record::{self, FrameError, LENGTH_PREFIX_SIZE};
use crate::document::Document;

/// Contents of one delimited frame
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// A decoded document (live or tombstone)
    Document(Document),
    /// Bytes that do not decode, with the reason
    Malformed(String),
}

/// A frame and the offset it starts at
#[derive(Debug, Clone, PartialEq)]
pub struct FrameAt {
    pub offset: u64,
    pub frame: Frame,
}

/// Reader over the log file.
///
/// Each reader owns its own file handle, so reads never disturb the writer.
pub struct LogReader {
    reader: BufReader<File>,
    current_offset: u64,
    file_size: u64,
}

impl LogReader {
    /// Opens the log file for reading
    pub fn open(log_path: &Path) -> StorageResult<Self> {
        let file = File::open(log_path).map_err(|e| {
            StorageError::read_failed(
                format!("Failed to open log file: {}", log_path.display()),
                e,
            )
        })?;

        let file_size = file
            .metadata()
            .map_err(|e| StorageError::read_failed("Failed to read log metadata", e))?
            .len();

        Ok(Self {
            reader: BufReader::new(file),
            current_offset: 0,
            file_size,
        })
    }

    /// Returns the offset of the next frame to be read
    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Reads the next frame.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(frame))` for a delimited frame, decoded or malformed
    /// - `Ok(None)` at end of file
    /// - `Err(EMBER_DATA_CORRUPTION)` if the frame runs past end of file
    /// - `Err(EMBER_STORAGE_READ_FAILED)` on I/O failure
    pub fn read_next(&mut self) -> StorageResult<Option<FrameAt>> {
        if self.current_offset >= self.file_size {
            return Ok(None);
        }

        let offset = self.current_offset;
        let remaining = self.file_size - offset;

        if remaining < LENGTH_PREFIX_SIZE as u64 {
            return Err(StorageError::corruption_at_offset(
                offset,
                format!(
                    "Truncated frame: {} bytes remaining, length prefix needs {}",
                    remaining, LENGTH_PREFIX_SIZE
                ),
            ));
        }

        let mut len_buf = [0u8; LENGTH_PREFIX_SIZE];
        self.reader
            .read_exact(&mut len_buf)
            .map_err(|e| StorageError::read_failed(format!("Failed to read length at {}", offset), e))?;
        let payload_len = u32::from_le_bytes(len_buf) as usize;
        let total = record::frame_len(payload_len);

        if total as u64 > remaining {
            return Err(StorageError::corruption_at_offset(
                offset,
                format!(
                    "Truncated frame: declares {} bytes, {} remaining",
                    total, remaining
                ),
            ));
        }

        let mut frame_buf = vec![0u8; total];
        frame_buf[..LENGTH_PREFIX_SIZE].copy_from_slice(&len_buf);
        self.reader
            .read_exact(&mut frame_buf[LENGTH_PREFIX_SIZE..])
            .map_err(|e| StorageError::read_failed(format!("Failed to read frame at {}", offset), e))?;

        self.current_offset += total as u64;

        let frame = match record::decode_frame(&frame_buf) {
            Ok((document, _)) => Frame::Document(document),
            Err(FrameError::Malformed { reason, .. }) => Frame::Malformed(reason),
            // Length was checked against the buffer above
            Err(e @ FrameError::Truncated { .. }) => {
                return Err(StorageError::corruption_at_offset(offset, e.to_string()))
            }
        };

        Ok(Some(FrameAt { offset, frame }))
    }

    /// Seeks to a specific offset in the file
    pub fn seek_to(&mut self, offset: u64) -> StorageResult<()> {
        self.reader.seek(SeekFrom::Start(offset)).map_err(|e| {
            StorageError::read_failed(format!("Failed to seek to offset {}", offset), e)
        })?;
        self.current_offset = offset;
        Ok(())
    }

    /// Reads the document stored at `offset`.
    ///
    /// Every decode failure is reported as `EMBER_DATA_CORRUPTION`.
    pub fn read_at(&mut self, offset: u64) -> StorageResult<Document> {
        self.seek_to(offset)?;
        match self.read_next()? {
            Some(FrameAt {
                frame: Frame::Document(document),
                ..
            }) => Ok(document),
            Some(FrameAt {
                frame: Frame::Malformed(reason),
                ..
            }) => Err(StorageError::corruption_at_offset(offset, reason)),
            None => Err(StorageError::corruption_at_offset(
                offset,
                "No frame at specified offset",
            )),
        }
    }
}
