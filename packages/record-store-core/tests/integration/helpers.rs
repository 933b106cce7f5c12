//! Shared helpers for integration tests.

use record_model::{Record, RecordAttributes, RecordType};
use record_store_core::{IngestDriver, IngestOptions, IngestReport, RecordStore, StoreConfig};
use serde_json::Value;
use uuid::Uuid;

/// A store with default configuration.
pub fn store() -> RecordStore {
    RecordStore::new(StoreConfig::default())
}

/// Creates a fresh collection in the store.
pub fn collection(store: &RecordStore) -> Uuid {
    let id = Uuid::new_v4();
    store.create_collection(id).unwrap();
    id
}

pub fn ty(name: &str) -> RecordType {
    RecordType::new(name).unwrap()
}

/// Builds a record from a JSON object literal.
pub fn record(type_name: &str, id: &str, attrs: Value) -> Record {
    Record::new(
        id,
        ty(type_name),
        serde_json::from_value::<RecordAttributes>(attrs).unwrap(),
    )
}

/// Ingestion options with an explicit chunk size.
pub fn chunked(chunk_size: usize) -> IngestOptions {
    IngestOptions {
        chunk_size: Some(chunk_size),
        ..IngestOptions::default()
    }
}

/// Ingests records with default options, unwrapping the report.
pub fn ingest_all(
    store: &RecordStore,
    collection: Uuid,
    type_name: &str,
    records: Vec<Record>,
) -> IngestReport {
    IngestDriver::new(store)
        .ingest(collection, &ty(type_name), records, IngestOptions::default())
        .unwrap()
}
