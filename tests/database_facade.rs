//! Database Facade Tests
//!
//! End-to-end behavior of `Database`: CRUD over collections, soft deletes,
//! persistence across reopen, collection listing and statistics.

use std::sync::Arc;
use std::thread;

use emberdb::database::{Database, DatabaseConfig, DatabaseError};
use emberdb::document::Fields;
use emberdb::query::{parse_query, parse_updates, CompareOp, QuerySpec, SortSpec, UpdateOperation};
use emberdb::value::Value;
use serde_json::json;
use tempfile::TempDir;

fn config(dir: &TempDir) -> DatabaseConfig {
    DatabaseConfig::new(dir.path().join("db").to_string_lossy()).with_sync_writes(false)
}

fn fields(body: serde_json::Value) -> Fields {
    match Value::from(body) {
        Value::Object(fields) => fields,
        _ => Fields::new(),
    }
}

#[test]
fn test_crud_lifecycle() {
    let dir = TempDir::new().unwrap();
    let db = Database::open(config(&dir)).unwrap();

    let alice = db
        .create("users", fields(json!({"name": "Alice", "age": 30, "status": "active"})))
        .unwrap();
    let bob = db
        .create("users", fields(json!({"name": "Bob", "age": 22, "status": "active"})))
        .unwrap();
    db.create("orders", fields(json!({"total": 10}))).unwrap();

    // find with a query
    let query = QuerySpec::new()
        .filter("age", CompareOp::GreaterThan, 25i64)
        .and("status", CompareOp::Equals, "active");
    let found = db.find("users", &query).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, alice);

    // update_by_id
    db.update_by_id(&bob, &[UpdateOperation::new("status", "inactive")])
        .unwrap();
    assert_eq!(
        db.find_by_id(&bob).unwrap().get("status"),
        Some(&Value::from("inactive"))
    );

    // update by query
    let updates = parse_updates(r#"{"verified": true}"#).unwrap();
    let updated = db.update("users", &QuerySpec::new(), &updates).unwrap();
    assert_eq!(updated, 2);

    // delete by query
    let deleted = db
        .kill(
            "users",
            &QuerySpec::new().filter("status", CompareOp::Equals, "inactive"),
        )
        .unwrap();
    assert_eq!(deleted, 1);
    assert!(db.find_by_id(&bob).unwrap_err().is_not_found());

    assert_eq!(db.count("users").unwrap(), 1);
    assert_eq!(db.count("orders").unwrap(), 1);
    assert_eq!(db.count("nothing").unwrap(), 0);
}

#[test]
fn test_find_does_not_cross_collections() {
    let dir = TempDir::new().unwrap();
    let db = Database::open(config(&dir)).unwrap();

    db.create("a", fields(json!({"k": 1}))).unwrap();
    db.create("b", fields(json!({"k": 1}))).unwrap();

    let query = QuerySpec::new().filter("k", CompareOp::Equals, 1i64);
    assert_eq!(db.find("a", &query).unwrap().len(), 1);
}

#[test]
fn test_state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let (kept, removed) = {
        let db = Database::open(config(&dir)).unwrap();
        let kept = db.create("notes", fields(json!({"text": "v1"}))).unwrap();
        let removed = db.create("notes", fields(json!({"text": "gone"}))).unwrap();
        db.update_by_id(&kept, &[UpdateOperation::new("text", "v2")])
            .unwrap();
        db.kill_by_id(&removed).unwrap();
        (kept, removed)
    };

    let db = Database::open(config(&dir)).unwrap();
    let doc = db.find_by_id(&kept).unwrap();
    assert_eq!(doc.get("text"), Some(&Value::from("v2")));
    assert!(db.find_by_id(&removed).unwrap_err().is_not_found());
    assert_eq!(db.count("notes").unwrap(), 1);
}

#[test]
fn test_collections_sorted_and_live_only() {
    let dir = TempDir::new().unwrap();
    let db = Database::open(config(&dir)).unwrap();

    db.create("zeta", Fields::new()).unwrap();
    db.create("alpha", Fields::new()).unwrap();
    db.create("zeta", Fields::new()).unwrap();
    let temp = db.create("temp", Fields::new()).unwrap();
    db.kill_by_id(&temp).unwrap();

    assert_eq!(db.collections().unwrap(), vec!["alpha", "zeta"]);

    let stats = db.stats().unwrap();
    assert_eq!(stats.total_documents, 3);
    assert_eq!(stats.total_collections, 2);
    assert_eq!(stats.collections, vec!["alpha", "zeta"]);
    assert!(stats.storage_size_bytes > 0);
}

#[test]
fn test_json_query_through_facade() {
    let dir = TempDir::new().unwrap();
    let db = Database::open(config(&dir)).unwrap();

    for price in [5, 50, 150, 500] {
        db.create("products", fields(json!({"price": price}))).unwrap();
    }

    let query = parse_query(
        r#"{"conditions": [
            {"field": "price", "operator": ">", "value": 10},
            {"field": "price", "operator": "<", "value": 200}
        ], "order_by": "price", "order_desc": true}"#,
    )
    .unwrap();

    let prices: Vec<f64> = db
        .find("products", &query)
        .unwrap()
        .iter()
        .filter_map(|d| d.get("price").and_then(Value::as_f64))
        .collect();
    assert_eq!(prices, vec![150.0, 50.0]);
}

#[test]
fn test_scan_order_follows_log_order() {
    let dir = TempDir::new().unwrap();
    let db = Database::open(config(&dir)).unwrap();

    let first = db.create("q", fields(json!({"n": 1}))).unwrap();
    let second = db.create("q", fields(json!({"n": 2}))).unwrap();

    // Updating the first document moves its newest version to the end
    db.update_by_id(&first, &[UpdateOperation::new("n", 3i64)])
        .unwrap();

    let ids: Vec<String> = db
        .find("q", &QuerySpec::new())
        .unwrap()
        .into_iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(ids, vec![second.clone(), first.clone()]);

    let sorted: Vec<String> = db
        .find("q", &QuerySpec::new().with_sort(SortSpec::asc("n")))
        .unwrap()
        .into_iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(sorted, vec![second, first]);
}

#[test]
fn test_concurrent_writers_serialize() {
    let dir = TempDir::new().unwrap();
    let db = Arc::new(Database::open(config(&dir)).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let db = Arc::clone(&db);
            thread::spawn(move || {
                for i in 0..25i64 {
                    let mut data = Fields::new();
                    data.insert("thread".into(), Value::from(t as i64));
                    data.insert("i".into(), Value::from(i));
                    db.create("load", data).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(db.count("load").unwrap(), 100);
    drop(db);

    // Every frame is intact after interleaved appends
    let db = Database::open(config(&dir)).unwrap();
    assert_eq!(db.count("load").unwrap(), 100);
}

#[test]
fn test_invalid_inputs() {
    let dir = TempDir::new().unwrap();
    let db = Database::open(config(&dir)).unwrap();

    assert!(matches!(
        db.create("", Fields::new()),
        Err(DatabaseError::InvalidDocument(_))
    ));
    assert!(db.update_by_id("missing", &[]).unwrap_err().is_not_found());
    assert!(db.kill_by_id("missing").unwrap_err().is_not_found());
}
