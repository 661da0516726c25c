//! Storage engine: the document log plus the in-memory primary index
//!
//! The index maps a document id to the offset of its newest frame. It is
//! rebuilt from the log on every start and only ever changed after a write
//! has succeeded.
//!
//! The engine does no locking. `append` and `mark_deleted` take `&mut self`,
//! so a shared engine must sit behind a lock owned by the caller.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::errors::{StorageError, StorageResult};
use super::reader::{Frame, FrameAt, LogReader};
use super::record::encode_frame;
use super::writer::LogWriter;
use crate::document::Document;
use crate::observability::{log_event_with_fields, Event};

/// Name of the single data file inside the data directory
pub const DATA_FILE_NAME: &str = "documents.log";

/// Point-in-time storage statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageStats {
    /// Live documents in the index
    pub document_count: usize,
    /// Current log length in bytes
    pub file_size_bytes: u64,
}

/// Outcome of the startup index rebuild
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildReport {
    /// Frames that decoded to a document
    pub frames_read: usize,
    /// Frames stepped over because they did not decode
    pub frames_skipped: usize,
    /// Offset of the partial trailing frame the walk stopped at, if any
    pub truncated_tail: Option<u64>,
}

/// Append-only document storage with an id -> offset index
#[derive(Debug)]
pub struct StorageEngine {
    data_dir: PathBuf,
    writer: LogWriter,
    index: HashMap<String, u64>,
    rebuild_report: RebuildReport,
}

impl StorageEngine {
    /// Opens the store in `data_dir`, syncing every append to disk.
    ///
    /// See [`StorageEngine::initialize_with_sync`].
    pub fn initialize(data_dir: &Path) -> StorageResult<Self> {
        Self::initialize_with_sync(data_dir, true)
    }

    /// Opens the store in `data_dir`.
    ///
    /// Creates the directory and `documents.log` if missing, then rebuilds
    /// the index by walking every frame from offset 0. Undecodable frames
    /// are skipped; a partial trailing frame ends the walk and is sealed
    /// before the first append, so later frames stay reachable.
    ///
    /// # Errors
    ///
    /// Returns `EMBER_STORAGE_INIT_FAILED` if the directory cannot be
    /// created or the log cannot be opened.
    pub fn initialize_with_sync(data_dir: &Path, sync_writes: bool) -> StorageResult<Self> {
        fs::create_dir_all(data_dir).map_err(|e| {
            StorageError::init_failed(
                format!("Failed to create data directory: {}", data_dir.display()),
                e,
            )
        })?;

        let log_path = data_dir.join(DATA_FILE_NAME);
        let mut writer = LogWriter::open(&log_path, sync_writes)?;

        let data_dir_str = data_dir.display().to_string();
        log_event_with_fields(Event::StorageOpened, &[("data_dir", data_dir_str.as_str())]);

        let (index, rebuild_report) = Self::rebuild_index(&log_path)?;
        if let Some(offset) = rebuild_report.truncated_tail {
            writer.mark_torn(offset);
        }

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            writer,
            index,
            rebuild_report,
        })
    }

    /// Walks the whole log and computes the newest live offset per id.
    ///
    /// A tombstone removes its id, so a document deleted before a restart
    /// stays deleted after it.
    fn rebuild_index(log_path: &Path) -> StorageResult<(HashMap<String, u64>, RebuildReport)> {
        log_event_with_fields(Event::IndexRebuildBegin, &[]);

        let mut index = HashMap::new();
        let mut report = RebuildReport::default();

        let mut reader = LogReader::open(log_path)?;

        loop {
            match reader.read_next() {
                Ok(Some(FrameAt {
                    offset,
                    frame: Frame::Document(document),
                })) => {
                    report.frames_read += 1;
                    if document.deleted {
                        index.remove(&document.id);
                    } else {
                        index.insert(document.id, offset);
                    }
                }
                Ok(Some(FrameAt {
                    offset,
                    frame: Frame::Malformed(reason),
                })) => {
                    report.frames_skipped += 1;
                    log_skipped(offset, &reason);
                }
                Ok(None) => break,
                Err(e) if e.is_corruption() => {
                    report.truncated_tail = Some(reader.current_offset());
                    let offset = reader.current_offset().to_string();
                    log_event_with_fields(
                        Event::TruncatedTail,
                        &[("offset", offset.as_str()), ("reason", e.message())],
                    );
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        let live = index.len().to_string();
        let read = report.frames_read.to_string();
        let skipped = report.frames_skipped.to_string();
        log_event_with_fields(
            Event::IndexRebuildComplete,
            &[
                ("frames_read", read.as_str()),
                ("frames_skipped", skipped.as_str()),
                ("live_documents", live.as_str()),
            ],
        );

        Ok((index, report))
    }

    /// Returns the data directory
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Returns the log file path
    pub fn log_path(&self) -> &Path {
        self.writer.path()
    }

    /// Returns what the startup rebuild found
    pub fn rebuild_report(&self) -> RebuildReport {
        self.rebuild_report
    }

    /// Returns whether `id` is a live document
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Returns the offset of the newest frame for `id`
    pub fn offset_of(&self, id: &str) -> Option<u64> {
        self.index.get(id).copied()
    }

    /// Appends a document as a new frame.
    ///
    /// The index is repointed only after the write reports success; a
    /// tombstone removes the id instead.
    ///
    /// # Errors
    ///
    /// Returns `EMBER_STORAGE_WRITE_FAILED` on any encode or I/O failure.
    pub fn append(&mut self, document: &Document) -> StorageResult<u64> {
        let frame = encode_frame(document)?;

        let offset = match self.writer.append(&frame) {
            Ok(offset) => offset,
            Err(e) => {
                log_event_with_fields(
                    Event::AppendFailed,
                    &[("id", document.id.as_str()), ("reason", e.message())],
                );
                return Err(e);
            }
        };

        let offset_str = offset.to_string();
        if document.deleted {
            self.index.remove(&document.id);
            log_event_with_fields(
                Event::TombstoneAppended,
                &[("id", document.id.as_str()), ("offset", offset_str.as_str())],
            );
        } else {
            self.index.insert(document.id.clone(), offset);
            log_event_with_fields(
                Event::DocumentAppended,
                &[("id", document.id.as_str()), ("offset", offset_str.as_str())],
            );
        }

        Ok(offset)
    }

    /// Reads the newest version of a live document.
    ///
    /// # Errors
    ///
    /// - `EMBER_DOCUMENT_NOT_FOUND` if the id is not indexed
    /// - `EMBER_DATA_CORRUPTION` if the frame is short or does not decode
    pub fn read(&self, id: &str) -> StorageResult<Document> {
        let offset = self.offset_of(id).ok_or_else(|| StorageError::not_found(id))?;
        let mut reader = LogReader::open(self.log_path())?;
        reader.read_at(offset)
    }

    /// Returns the live documents of one collection, in log order.
    ///
    /// Frames that fail to decode are logged and skipped.
    pub fn scan_collection(&self, collection: &str) -> StorageResult<Vec<Document>> {
        let mut offsets: Vec<u64> = self.index.values().copied().collect();
        offsets.sort_unstable();

        let mut reader = LogReader::open(self.log_path())?;
        let mut documents = Vec::new();

        for offset in offsets {
            match reader.read_at(offset) {
                Ok(document) => {
                    if document.collection == collection && !document.deleted {
                        documents.push(document);
                    }
                }
                Err(e) if e.is_corruption() => log_skipped(offset, e.message()),
                Err(e) => return Err(e),
            }
        }

        Ok(documents)
    }

    /// Returns every live document in every collection by walking the log.
    ///
    /// Does not consult the index. The newest frame per id wins; ids whose
    /// newest frame is a tombstone are left out. Documents come back in the
    /// order their ids first appear in the log.
    pub fn scan_all(&self) -> StorageResult<Vec<Document>> {
        let mut reader = LogReader::open(self.log_path())?;
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut latest: Vec<Document> = Vec::new();

        loop {
            match reader.read_next() {
                Ok(Some(FrameAt {
                    frame: Frame::Document(document),
                    ..
                })) => match positions.get(&document.id) {
                    Some(&pos) => latest[pos] = document,
                    None => {
                        positions.insert(document.id.clone(), latest.len());
                        latest.push(document);
                    }
                },
                Ok(Some(FrameAt {
                    offset,
                    frame: Frame::Malformed(reason),
                })) => log_skipped(offset, &reason),
                Ok(None) => break,
                Err(e) if e.is_corruption() => break,
                Err(e) => return Err(e),
            }
        }

        latest.retain(|document| !document.deleted);
        Ok(latest)
    }

    /// Soft-deletes a document.
    ///
    /// Appends a tombstone copy with a fresh `updated_at` and drops the id
    /// from the index. The earlier frames stay in the log.
    ///
    /// # Errors
    ///
    /// Returns `EMBER_DOCUMENT_NOT_FOUND` if the id is not indexed.
    pub fn mark_deleted(&mut self, id: &str) -> StorageResult<()> {
        let current = self.read(id)?;
        self.append(&current.tombstone())?;
        self.index.remove(id);
        Ok(())
    }

    /// Returns live document count and log size
    pub fn stats(&self) -> StorageResult<StorageStats> {
        Ok(StorageStats {
            document_count: self.index.len(),
            file_size_bytes: self.writer.len()?,
        })
    }
}

fn log_skipped(offset: u64, reason: &str) {
    let offset = offset.to_string();
    log_event_with_fields(
        Event::RecordSkipped,
        &[("offset", offset.as_str()), ("reason", reason)],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Fields;
    use crate::value::Value;
    use std::fs::OpenOptions;
    use std::io::Write;
    use tempfile::TempDir;

    fn doc(id: &str, collection: &str, age: i64) -> Document {
        let mut data = Fields::new();
        data.insert("age".to_string(), Value::from(age));
        Document::new(id, collection, data)
    }

    fn open(dir: &Path) -> StorageEngine {
        StorageEngine::initialize_with_sync(dir, false).unwrap()
    }

    #[test]
    fn test_initialize_creates_directory_and_file() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("nested").join("db");

        let engine = open(&data_dir);
        assert!(data_dir.join(DATA_FILE_NAME).exists());
        assert_eq!(engine.stats().unwrap().document_count, 0);
        assert_eq!(engine.stats().unwrap().file_size_bytes, 0);
    }

    #[test]
    fn test_initialize_fails_when_directory_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, b"x").unwrap();

        let err = StorageEngine::initialize(&blocker.join("db")).err().unwrap();
        assert_eq!(err.code().code(), "EMBER_STORAGE_INIT_FAILED");
    }

    #[test]
    fn test_append_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let mut engine = open(temp_dir.path());

        let d = doc("a", "users", 30);
        let offset = engine.append(&d).unwrap();
        assert_eq!(offset, 0);
        assert_eq!(engine.read("a").unwrap(), d);
    }

    #[test]
    fn test_last_write_wins() {
        let temp_dir = TempDir::new().unwrap();
        let mut engine = open(temp_dir.path());

        let first = doc("a", "users", 30);
        let mut second = first.clone();
        second.set("age", Value::from(31i64));

        let off1 = engine.append(&first).unwrap();
        let off2 = engine.append(&second).unwrap();
        assert!(off2 > off1);
        assert_eq!(engine.offset_of("a"), Some(off2));
        assert_eq!(engine.read("a").unwrap().get("age"), Some(&Value::from(31i64)));
        assert_eq!(engine.stats().unwrap().document_count, 1);
    }

    #[test]
    fn test_read_unknown_id_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let engine = open(temp_dir.path());

        let err = engine.read("ghost").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_scan_collection_filters_by_collection() {
        let temp_dir = TempDir::new().unwrap();
        let mut engine = open(temp_dir.path());

        engine.append(&doc("a", "users", 1)).unwrap();
        engine.append(&doc("b", "orders", 2)).unwrap();
        engine.append(&doc("c", "users", 3)).unwrap();

        let users = engine.scan_collection("users").unwrap();
        let ids: Vec<_> = users.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(engine.scan_collection("nothing").unwrap().is_empty());
    }

    #[test]
    fn test_mark_deleted_excludes_everywhere() {
        let temp_dir = TempDir::new().unwrap();
        let mut engine = open(temp_dir.path());

        engine.append(&doc("a", "users", 1)).unwrap();
        engine.append(&doc("b", "users", 2)).unwrap();
        engine.mark_deleted("a").unwrap();

        assert!(engine.read("a").unwrap_err().is_not_found());
        assert!(engine.scan_collection("users").unwrap().iter().all(|d| d.id != "a"));
        assert!(engine.scan_all().unwrap().iter().all(|d| d.id != "a"));
        assert_eq!(engine.stats().unwrap().document_count, 1);
    }

    #[test]
    fn test_mark_deleted_unknown_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let mut engine = open(temp_dir.path());
        let size_before = engine.stats().unwrap().file_size_bytes;

        assert!(engine.mark_deleted("ghost").unwrap_err().is_not_found());
        assert_eq!(engine.stats().unwrap().file_size_bytes, size_before);
    }

    #[test]
    fn test_scan_all_returns_latest_versions() {
        let temp_dir = TempDir::new().unwrap();
        let mut engine = open(temp_dir.path());

        let a = doc("a", "users", 1);
        engine.append(&a).unwrap();
        engine.append(&doc("b", "orders", 2)).unwrap();
        let mut a2 = a.clone();
        a2.set("age", Value::from(10i64));
        engine.append(&a2).unwrap();

        let all = engine.scan_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "a");
        assert_eq!(all[0].get("age"), Some(&Value::from(10i64)));
        assert_eq!(all[1].collection, "orders");
    }

    #[test]
    fn test_restart_rebuilds_index() {
        let temp_dir = TempDir::new().unwrap();
        {
            let mut engine = open(temp_dir.path());
            engine.append(&doc("a", "users", 1)).unwrap();
            engine.append(&doc("b", "users", 2)).unwrap();
            engine.mark_deleted("b").unwrap();
        }

        let engine = open(temp_dir.path());
        assert!(engine.contains("a"));
        assert!(!engine.contains("b"));
        assert_eq!(engine.rebuild_report().frames_read, 3);
        assert_eq!(engine.rebuild_report().truncated_tail, None);
    }

    #[test]
    fn test_undecodable_frame_skipped_on_rebuild() {
        let temp_dir = TempDir::new().unwrap();
        {
            let mut engine = open(temp_dir.path());
            engine.append(&doc("a", "users", 1)).unwrap();
        }
        {
            let mut file = OpenOptions::new()
                .append(true)
                .open(temp_dir.path().join(DATA_FILE_NAME))
                .unwrap();
            file.write_all(&2u32.to_le_bytes()).unwrap();
            file.write_all(b"{]\n").unwrap();
        }
        {
            let mut engine = open(temp_dir.path());
            engine.append(&doc("c", "users", 3)).unwrap();
        }

        let engine = open(temp_dir.path());
        assert_eq!(engine.rebuild_report().frames_skipped, 1);
        assert!(engine.contains("a"));
        assert!(engine.contains("c"));
        assert_eq!(engine.scan_all().unwrap().len(), 2);
    }

    #[test]
    fn test_stats_tracks_file_size() {
        let temp_dir = TempDir::new().unwrap();
        let mut engine = open(temp_dir.path());

        engine.append(&doc("a", "users", 1)).unwrap();
        let on_disk = fs::metadata(engine.log_path()).unwrap().len();
        assert_eq!(engine.stats().unwrap().file_size_bytes, on_disk);
    }

    #[test]
    fn test_appends_after_truncated_tail_survive_restart() {
        let temp_dir = TempDir::new().unwrap();
        let torn_at = {
            let mut engine = open(temp_dir.path());
            engine.append(&doc("a", "users", 1)).unwrap();
            engine.append(&doc("b", "users", 2)).unwrap()
        };

        let log_path = temp_dir.path().join(DATA_FILE_NAME);
        let len = fs::metadata(&log_path).unwrap().len();
        OpenOptions::new()
            .write(true)
            .open(&log_path)
            .unwrap()
            .set_len(len - 10)
            .unwrap();

        {
            let mut engine = open(temp_dir.path());
            assert_eq!(engine.rebuild_report().truncated_tail, Some(torn_at));
            engine.append(&doc("c", "users", 3)).unwrap();
        }

        let engine = open(temp_dir.path());
        assert_eq!(engine.rebuild_report().truncated_tail, None);
        assert_eq!(engine.rebuild_report().frames_skipped, 1);
        assert!(engine.contains("c"));
        assert!(!engine.contains("b"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_failed_write_leaves_index_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let mut engine = open(temp_dir.path());
        let a = doc("a", "users", 1);
        let offset = engine.append(&a).unwrap();

        // Every write to /dev/full fails with ENOSPC
        engine.writer = LogWriter::open(Path::new("/dev/full"), false).unwrap();

        let mut updated = a.clone();
        updated.set("age", Value::from(2i64));
        assert!(engine.append(&updated).is_err());
        assert!(engine.append(&doc("b", "users", 2)).is_err());
        assert!(engine.append(&a.tombstone()).is_err());

        assert_eq!(engine.offset_of("a"), Some(offset));
        assert!(engine.contains("a"));
        assert!(!engine.contains("b"));
        assert_eq!(engine.stats().unwrap().document_count, 1);
    }
}
