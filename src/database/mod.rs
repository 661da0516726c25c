//! Database facade for emberdb
//!
//! Composes the storage engine and the query processor into document
//! operations: create, find, update, soft-delete, count, collections, stats.
//!
//! The engine sits behind one `RwLock`. Every mutation (including the scan
//! that picks which documents to update or delete) runs under the write
//! lock, so there is exactly one writer at a time. Reads share the read lock
//! and see whatever has been appended when they run.

mod config;
mod errors;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use uuid::Uuid;

use crate::document::{Document, Fields};
use crate::observability::{log_event_with_fields, Event, Logger};
use crate::query::{QueryProcessor, QuerySpec, UpdateOperation};
use crate::storage::StorageEngine;

pub use config::DatabaseConfig;
pub use errors::{DatabaseError, DatabaseResult};

/// Database-wide statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseStats {
    /// Live documents across all collections
    pub total_documents: usize,
    pub total_collections: usize,
    /// Log file length, including superseded frames and tombstones
    pub storage_size_bytes: u64,
    /// Sorted collection names
    pub collections: Vec<String>,
}

/// An open database
pub struct Database {
    config: DatabaseConfig,
    engine: RwLock<StorageEngine>,
}

impl Database {
    /// Opens (or creates) the database described by `config`.
    ///
    /// Applies the configured log level, then initializes the storage engine,
    /// which rebuilds the index from the log.
    pub fn open(config: DatabaseConfig) -> DatabaseResult<Self> {
        config.validate()?;
        Logger::set_min_severity(config.severity()?);

        let engine = StorageEngine::initialize_with_sync(&config.data_path(), config.sync_writes)?;

        let documents = engine.stats()?.document_count.to_string();
        log_event_with_fields(
            Event::DatabaseOpened,
            &[
                ("data_dir", config.data_dir.as_str()),
                ("documents", documents.as_str()),
            ],
        );

        Ok(Self {
            config,
            engine: RwLock::new(engine),
        })
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Creates a document and returns its new id
    pub fn create(&self, collection: &str, data: Fields) -> DatabaseResult<String> {
        validate_collection(collection)?;

        let id = Uuid::new_v4().to_string();
        let document = Document::new(id.as_str(), collection, data);

        self.write_engine()?.append(&document)?;
        Ok(id)
    }

    /// Returns the documents of `collection` matching `query`
    pub fn find(&self, collection: &str, query: &QuerySpec) -> DatabaseResult<Vec<Document>> {
        let candidates = self.read_engine()?.scan_collection(collection)?;
        Ok(run_query(collection, candidates, query))
    }

    /// Returns one live document by id
    pub fn find_by_id(&self, id: &str) -> DatabaseResult<Document> {
        Ok(self.read_engine()?.read(id)?)
    }

    /// Applies `updates` to every match and returns how many were updated.
    ///
    /// Each updated document is appended as a new version; a failure part way
    /// through leaves the earlier appends in place.
    pub fn update(
        &self,
        collection: &str,
        query: &QuerySpec,
        updates: &[UpdateOperation],
    ) -> DatabaseResult<usize> {
        let mut engine = self.write_engine()?;
        let candidates = engine.scan_collection(collection)?;
        let matches = run_query(collection, candidates, query);

        let count = matches.len();
        for mut document in matches {
            apply_updates(&mut document, updates);
            engine.append(&document)?;
        }
        Ok(count)
    }

    /// Applies `updates` to one document
    pub fn update_by_id(&self, id: &str, updates: &[UpdateOperation]) -> DatabaseResult<()> {
        let mut engine = self.write_engine()?;
        let mut document = engine.read(id)?;
        apply_updates(&mut document, updates);
        engine.append(&document)?;
        Ok(())
    }

    /// Soft-deletes every match and returns how many were deleted
    pub fn kill(&self, collection: &str, query: &QuerySpec) -> DatabaseResult<usize> {
        let mut engine = self.write_engine()?;
        let candidates = engine.scan_collection(collection)?;
        let matches = run_query(collection, candidates, query);

        for document in &matches {
            engine.mark_deleted(&document.id)?;
        }
        Ok(matches.len())
    }

    /// Soft-deletes one document
    pub fn kill_by_id(&self, id: &str) -> DatabaseResult<()> {
        self.write_engine()?.mark_deleted(id)?;
        Ok(())
    }

    /// Number of live documents in `collection`
    pub fn count(&self, collection: &str) -> DatabaseResult<usize> {
        Ok(self.read_engine()?.scan_collection(collection)?.len())
    }

    /// Sorted, deduplicated names of collections with live documents
    pub fn collections(&self) -> DatabaseResult<Vec<String>> {
        let engine = self.read_engine()?;
        collection_names(&engine)
    }

    pub fn stats(&self) -> DatabaseResult<DatabaseStats> {
        let engine = self.read_engine()?;
        let storage = engine.stats()?;
        let collections = collection_names(&engine)?;

        Ok(DatabaseStats {
            total_documents: storage.document_count,
            total_collections: collections.len(),
            storage_size_bytes: storage.file_size_bytes,
            collections,
        })
    }

    fn read_engine(&self) -> DatabaseResult<RwLockReadGuard<'_, StorageEngine>> {
        self.engine.read().map_err(|_| DatabaseError::LockPoisoned)
    }

    fn write_engine(&self) -> DatabaseResult<RwLockWriteGuard<'_, StorageEngine>> {
        self.engine.write().map_err(|_| DatabaseError::LockPoisoned)
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        log_event_with_fields(
            Event::DatabaseClosed,
            &[("data_dir", self.config.data_dir.as_str())],
        );
    }
}

fn validate_collection(collection: &str) -> DatabaseResult<()> {
    if collection.is_empty() {
        return Err(DatabaseError::InvalidDocument(
            "collection name must not be empty".into(),
        ));
    }
    Ok(())
}

fn apply_updates(document: &mut Document, updates: &[UpdateOperation]) {
    for update in updates {
        update.apply(document);
    }
}

fn run_query(collection: &str, candidates: Vec<Document>, query: &QuerySpec) -> Vec<Document> {
    let scanned = candidates.len().to_string();
    let results = QueryProcessor::filter(candidates, query);

    let returned = results.len().to_string();
    log_event_with_fields(
        Event::QueryExecuted,
        &[
            ("collection", collection),
            ("scanned", scanned.as_str()),
            ("returned", returned.as_str()),
        ],
    );
    results
}

fn collection_names(engine: &StorageEngine) -> DatabaseResult<Vec<String>> {
    let mut names: Vec<String> = engine
        .scan_all()?
        .into_iter()
        .map(|doc| doc.collection)
        .collect();
    names.sort();
    names.dedup();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::CompareOp;
    use crate::value::Value;
    use tempfile::TempDir;

    fn open(dir: &TempDir) -> Database {
        let config = DatabaseConfig::new(dir.path().to_string_lossy()).with_sync_writes(false);
        Database::open(config).unwrap()
    }

    fn fields(pairs: &[(&str, Value)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_create_and_find_by_id() {
        let dir = TempDir::new().unwrap();
        let db = open(&dir);

        let id = db
            .create("users", fields(&[("name", Value::from("Alice"))]))
            .unwrap();
        let doc = db.find_by_id(&id).unwrap();
        assert_eq!(doc.collection, "users");
        assert_eq!(doc.get("name"), Some(&Value::from("Alice")));
        assert!(!doc.deleted);
    }

    #[test]
    fn test_ids_are_unique() {
        let dir = TempDir::new().unwrap();
        let db = open(&dir);
        let a = db.create("c", Fields::new()).unwrap();
        let b = db.create("c", Fields::new()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_collection_rejected() {
        let dir = TempDir::new().unwrap();
        let db = open(&dir);
        assert!(matches!(
            db.create("", Fields::new()),
            Err(DatabaseError::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_update_by_query() {
        let dir = TempDir::new().unwrap();
        let db = open(&dir);
        for age in [20i64, 30, 40] {
            db.create("users", fields(&[("age", Value::from(age))])).unwrap();
        }

        let query = QuerySpec::new().filter("age", CompareOp::GreaterThanOrEqual, 30i64);
        let updated = db
            .update("users", &query, &[UpdateOperation::new("senior", true)])
            .unwrap();
        assert_eq!(updated, 2);

        let seniors = db
            .find("users", &QuerySpec::new().filter("senior", CompareOp::Equals, true))
            .unwrap();
        assert_eq!(seniors.len(), 2);
        assert_eq!(db.count("users").unwrap(), 3);
    }

    #[test]
    fn test_update_by_id_refreshes_updated_at() {
        let dir = TempDir::new().unwrap();
        let db = open(&dir);
        let id = db.create("c", Fields::new()).unwrap();
        let before = db.find_by_id(&id).unwrap();

        db.update_by_id(&id, &[UpdateOperation::new("x", 1i64)]).unwrap();
        let after = db.find_by_id(&id).unwrap();
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= before.updated_at);
        assert_eq!(after.get("x"), Some(&Value::from(1i64)));
    }

    #[test]
    fn test_kill_and_kill_by_id() {
        let dir = TempDir::new().unwrap();
        let db = open(&dir);
        let keep = db.create("c", fields(&[("n", Value::from(1i64))])).unwrap();
        db.create("c", fields(&[("n", Value::from(2i64))])).unwrap();
        let other = db.create("c", fields(&[("n", Value::from(3i64))])).unwrap();

        let killed = db
            .kill("c", &QuerySpec::new().filter("n", CompareOp::Equals, 2i64))
            .unwrap();
        assert_eq!(killed, 1);

        db.kill_by_id(&other).unwrap();
        assert!(db.find_by_id(&other).unwrap_err().is_not_found());
        assert!(db.kill_by_id(&other).unwrap_err().is_not_found());

        let remaining = db.find("c", &QuerySpec::new()).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, keep);
    }

    #[test]
    fn test_collections_and_stats() {
        let dir = TempDir::new().unwrap();
        let db = open(&dir);
        db.create("users", Fields::new()).unwrap();
        db.create("orders", Fields::new()).unwrap();
        let gone = db.create("logs", Fields::new()).unwrap();
        db.create("users", Fields::new()).unwrap();
        db.kill_by_id(&gone).unwrap();

        assert_eq!(db.collections().unwrap(), vec!["orders", "users"]);

        let stats = db.stats().unwrap();
        assert_eq!(stats.total_documents, 3);
        assert_eq!(stats.total_collections, 2);
        assert!(stats.storage_size_bytes > 0);
    }

    #[test]
    fn test_open_rejects_bad_config() {
        let dir = TempDir::new().unwrap();
        let config = DatabaseConfig::new(dir.path().to_string_lossy()).with_log_level("loud");
        assert!(matches!(
            Database::open(config),
            Err(DatabaseError::Config(_))
        ));
    }
}
