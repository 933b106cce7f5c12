//! Ingestion mechanics: chunking, counts, partial failure,
//! cancellation, and the single-record paths.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ntest::timeout;
use record_store_core::{
    ErrorCategory, IngestDriver, IngestOptions, StoreError, UpsertOutcome, WriteMode,
};
use serde_json::json;

use super::helpers::{chunked, collection, ingest_all, record, store, ty};

#[timeout(10000)]
#[test]
fn test_large_source_streams_in_chunks() {
    let store = store();
    let coll = collection(&store);
    let driver = IngestDriver::new(&store);

    // the source is an iterator; the driver must never collect it whole
    let source = (0..2_500).map(|i| {
        record(
            "sample",
            &format!("r{i}"),
            json!({"count": i, "label": format!("row {i}")}),
        )
    });
    let report = driver
        .ingest(coll, &ty("sample"), source, chunked(100))
        .unwrap();
    assert_eq!(report.inserted, 2_500);
    assert_eq!(report.updated, 0);
    assert_eq!(store.count_records(coll, &ty("sample")).unwrap(), 2_500);
}

#[test]
fn test_partial_failure_keeps_earlier_chunks() {
    let store = store();
    let coll = collection(&store);
    let driver = IngestDriver::new(&store);

    let records = vec![
        record("sample", "1", json!({"col": 1})),
        record("sample", "2", json!({"col": 2})),
        record("sample", "3", json!({"col": 3})),
        // references a type that does not exist: fails its chunk
        record("sample", "4", json!({"owner": "rel:/ghost/g1"})),
    ];
    let err = driver
        .ingest(coll, &ty("sample"), records, chunked(2))
        .unwrap_err();
    assert_eq!(err.committed.inserted, 2);
    assert_eq!(err.source.category(), ErrorCategory::MissingDependency);

    // chunk one is durable, the failing chunk committed nothing
    assert_eq!(store.count_records(coll, &ty("sample")).unwrap(), 2);
    assert!(store.get_record(coll, &ty("sample"), "3").unwrap().is_none());
}

#[test]
fn test_cancellation_between_chunks() {
    let store = store();
    let coll = collection(&store);
    let driver = IngestDriver::new(&store);

    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    // the flag flips while the first chunk is being drawn; the run
    // stops before the second chunk starts
    let source = (0..10).map(move |i| {
        if i == 4 {
            flag.store(true, Ordering::Release);
        }
        record("sample", &format!("r{i}"), json!({"count": i}))
    });
    let options = IngestOptions {
        chunk_size: Some(5),
        cancel: Some(cancel),
        ..IngestOptions::default()
    };
    let report = driver.ingest(coll, &ty("sample"), source, options).unwrap();
    assert_eq!(report.inserted, 5);
    assert_eq!(store.count_records(coll, &ty("sample")).unwrap(), 5);
}

#[test]
fn test_empty_record_id_rejected() {
    let store = store();
    let coll = collection(&store);
    let driver = IngestDriver::new(&store);

    let err = driver
        .ingest(
            coll,
            &ty("sample"),
            vec![record("sample", "", json!({"a": 1}))],
            IngestOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err.source, StoreError::EmptyRecordId { .. }));
    assert_eq!(err.source.category(), ErrorCategory::Validation);
}

#[test]
fn test_record_type_mismatch_rejected() {
    let store = store();
    let coll = collection(&store);
    let driver = IngestDriver::new(&store);

    let err = driver
        .ingest(
            coll,
            &ty("sample"),
            vec![record("other", "1", json!({"a": 1}))],
            IngestOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err.source, StoreError::RecordTypeMismatch { .. }));
}

#[test]
fn test_missing_collection_rejected() {
    let store = store();
    let driver = IngestDriver::new(&store);
    let err = driver
        .ingest(
            uuid::Uuid::new_v4(),
            &ty("sample"),
            vec![record("sample", "1", json!({"a": 1}))],
            IngestOptions::default(),
        )
        .unwrap_err();
    assert_eq!(err.source.category(), ErrorCategory::NotFound);
}

#[test]
fn test_replace_mode_nulls_absent_attributes() {
    let store = store();
    let coll = collection(&store);
    let driver = IngestDriver::new(&store);

    ingest_all(
        &store,
        coll,
        "sample",
        vec![record("sample", "1", json!({"a": 1, "b": 2}))],
    );
    let outcome = driver
        .upsert_one(coll, record("sample", "1", json!({"a": 9})), None)
        .unwrap();
    assert_eq!(outcome, UpsertOutcome::Updated);

    let merged = store.get_record(coll, &ty("sample"), "1").unwrap().unwrap();
    assert_eq!(merged.attribute("a"), Some(&json!(9)));
    assert_eq!(merged.attribute("b"), Some(&serde_json::Value::Null));
}

#[test]
fn test_replace_mode_in_bulk_run() {
    let store = store();
    let coll = collection(&store);
    let driver = IngestDriver::new(&store);

    ingest_all(
        &store,
        coll,
        "sample",
        vec![record("sample", "1", json!({"a": 1, "b": 2}))],
    );
    let options = IngestOptions {
        mode: WriteMode::Replace,
        ..IngestOptions::default()
    };
    driver
        .ingest(
            coll,
            &ty("sample"),
            vec![record("sample", "1", json!({"a": 3}))],
            options,
        )
        .unwrap();
    let merged = store.get_record(coll, &ty("sample"), "1").unwrap().unwrap();
    assert_eq!(merged.attribute("b"), Some(&serde_json::Value::Null));
}

#[test]
fn test_upsert_one_creates_type_and_record() {
    let store = store();
    let coll = collection(&store);
    let driver = IngestDriver::new(&store);

    let outcome = driver
        .upsert_one(coll, record("sample", "1", json!({"a": 1})), None)
        .unwrap();
    assert_eq!(outcome, UpsertOutcome::Created);
    assert!(store.type_exists(coll, &ty("sample")).unwrap());
    assert!(store.record_exists(coll, &ty("sample"), "1").unwrap());
}

#[test]
fn test_patch_one_merges_and_returns_record() {
    let store = store();
    let coll = collection(&store);
    let driver = IngestDriver::new(&store);

    ingest_all(
        &store,
        coll,
        "sample",
        vec![record("sample", "1", json!({"a": 1, "b": 2}))],
    );
    let merged = driver
        .patch_one(coll, record("sample", "1", json!({"b": 7})))
        .unwrap();
    assert_eq!(merged.attribute("a"), Some(&json!(1)));
    assert_eq!(merged.attribute("b"), Some(&json!(7)));
}

#[test]
fn test_patch_one_requires_existing_record() {
    let store = store();
    let coll = collection(&store);
    let driver = IngestDriver::new(&store);

    ingest_all(
        &store,
        coll,
        "sample",
        vec![record("sample", "1", json!({"a": 1}))],
    );
    let err = driver
        .patch_one(coll, record("sample", "ghost", json!({"a": 2})))
        .unwrap_err();
    assert!(matches!(err, StoreError::RecordNotFound { .. }));
}

#[test]
fn test_delete_records_reports_missing_ids() {
    let store = store();
    let coll = collection(&store);

    ingest_all(
        &store,
        coll,
        "sample",
        vec![
            record("sample", "1", json!({"a": 1})),
            record("sample", "2", json!({"a": 2})),
        ],
    );
    let err = store
        .delete_records(
            coll,
            &ty("sample"),
            &["1".to_string(), "ghost".to_string()],
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::RecordsNotFound { ref ids, .. } if ids == &["ghost"]));
    // nothing was deleted
    assert_eq!(store.count_records(coll, &ty("sample")).unwrap(), 2);

    store
        .delete_records(coll, &ty("sample"), &["1".to_string(), "2".to_string()])
        .unwrap();
    assert_eq!(store.count_records(coll, &ty("sample")).unwrap(), 0);
}

#[test]
fn test_create_collection_conflict() {
    let store = store();
    let coll = collection(&store);
    let err = store.create_collection(coll).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Conflict);
}

#[test]
fn test_delete_collection_cascades() {
    let store = store();
    let coll = collection(&store);

    ingest_all(
        &store,
        coll,
        "sample",
        vec![record("sample", "1", json!({"a": 1}))],
    );
    store.delete_collection(coll).unwrap();
    assert!(!store.collection_exists(coll).unwrap());
    let err = store.get_schema(coll, &ty("sample")).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::NotFound);
}

#[test]
fn test_create_type_conflict() {
    let store = store();
    let coll = collection(&store);

    ingest_all(
        &store,
        coll,
        "sample",
        vec![record("sample", "1", json!({"a": 1}))],
    );
    let err = store
        .create_type(coll, &ty("sample"), Vec::new(), Vec::new(), None)
        .unwrap_err();
    assert!(matches!(err, StoreError::TypeExists(_)));
}
