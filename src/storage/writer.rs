//! Append-only log writer
//!
//! Frames are only ever appended. The offset of a frame is the file length
//! observed immediately before its bytes are written, so a torn earlier
//! write never shifts the offsets handed out afterwards.
//!
//! A torn frame (left by a crash or by a failed `write_all`) is sealed
//! before the next append: the missing bytes are filled with zeros up to
//! the length the frame declares. A sealed frame ends in 0x00 instead of
//! the terminator, so readers step over it as malformed and every frame
//! appended after it stays reachable.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::errors::{StorageError, StorageResult};
use super::record::{frame_len, LENGTH_PREFIX_SIZE};

/// Largest payload a torn frame may declare and still be sealed in place
pub const MAX_SEAL_PAYLOAD: usize = 16 * 1024 * 1024;

/// Writer that owns the append handle of the log file
#[derive(Debug)]
pub struct LogWriter {
    log_path: PathBuf,
    file: File,
    sync_writes: bool,
    torn_frame: Option<u64>,
}

impl LogWriter {
    /// Opens the log for appending, creating it if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `EMBER_STORAGE_INIT_FAILED` if the file cannot be created or opened.
    pub fn open(log_path: &Path, sync_writes: bool) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(log_path)
            .map_err(|e| {
                StorageError::init_failed(
                    format!("Failed to open log file: {}", log_path.display()),
                    e,
                )
            })?;

        Ok(Self {
            log_path: log_path.to_path_buf(),
            file,
            sync_writes,
            torn_frame: None,
        })
    }

    /// Returns the log file path
    pub fn path(&self) -> &Path {
        &self.log_path
    }

    /// Returns the current file length in bytes
    pub fn len(&self) -> StorageResult<u64> {
        self.file
            .metadata()
            .map(|m| m.len())
            .map_err(|e| StorageError::read_failed("Failed to read log metadata", e))
    }

    /// Records that the frame starting at `offset` runs past end of file.
    ///
    /// It is sealed on the next append.
    pub fn mark_torn(&mut self, offset: u64) {
        self.torn_frame = Some(offset);
    }

    /// Returns the offset of a torn frame still waiting to be sealed
    pub fn torn_frame(&self) -> Option<u64> {
        self.torn_frame
    }

    /// Appends one encoded frame.
    ///
    /// # Returns
    ///
    /// The byte offset the frame starts at.
    ///
    /// # Errors
    ///
    /// Returns `EMBER_STORAGE_WRITE_FAILED` if sealing a torn frame, the
    /// write, or the sync fails.
    pub fn append(&mut self, frame: &[u8]) -> StorageResult<u64> {
        if let Some(torn) = self.torn_frame {
            self.seal(torn)?;
        }

        let offset = self
            .file
            .metadata()
            .map_err(|e| StorageError::write_failed("Failed to read log length before append", e))?
            .len();

        if let Err(e) = self.file.write_all(frame) {
            // Part of the frame may be on disk
            self.torn_frame = Some(offset);
            return Err(StorageError::write_failed(
                format!("Failed to append frame at {}", offset),
                e,
            ));
        }

        self.file
            .flush()
            .map_err(|e| StorageError::write_failed("Failed to flush log", e))?;

        if self.sync_writes {
            self.file.sync_data().map_err(|e| {
                StorageError::write_failed(format!("fsync failed after frame at {}", offset), e)
            })?;
        }

        Ok(offset)
    }

    /// Pads the torn frame at `offset` out to its declared length.
    ///
    /// Missing length-prefix bytes are taken as zero. Refuses when the
    /// frame declares more than [`MAX_SEAL_PAYLOAD`] bytes; the log then
    /// needs repair before it accepts writes again.
    fn seal(&mut self, offset: u64) -> StorageResult<()> {
        let file_len = self
            .file
            .metadata()
            .map_err(|e| StorageError::write_failed("Failed to read log length before seal", e))?
            .len();

        let present = file_len.saturating_sub(offset);
        if present == 0 {
            self.torn_frame = None;
            return Ok(());
        }

        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        let have = (present as usize).min(LENGTH_PREFIX_SIZE);
        let mut reader = File::open(&self.log_path)
            .map_err(|e| StorageError::write_failed("Failed to open log to seal torn frame", e))?;
        reader
            .seek(SeekFrom::Start(offset))
            .and_then(|_| reader.read_exact(&mut prefix[..have]))
            .map_err(|e| {
                StorageError::write_failed(format!("Failed to read torn frame at {}", offset), e)
            })?;

        let payload_len = u32::from_le_bytes(prefix) as usize;
        if payload_len > MAX_SEAL_PAYLOAD {
            return Err(StorageError::write_failed_no_source(format!(
                "Torn frame at {} declares {} bytes; log needs repair before further writes",
                offset, payload_len
            )));
        }

        let total = frame_len(payload_len) as u64;
        if present < total {
            let filler = vec![0u8; (total - present) as usize];
            self.file.write_all(&filler).map_err(|e| {
                StorageError::write_failed(format!("Failed to seal torn frame at {}", offset), e)
            })?;
            self.file
                .flush()
                .and_then(|_| {
                    if self.sync_writes {
                        self.file.sync_data()
                    } else {
                        Ok(())
                    }
                })
                .map_err(|e| StorageError::write_failed("Failed to sync sealed frame", e))?;
        }

        self.torn_frame = None;
        Ok(())
    }
}
