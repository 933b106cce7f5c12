//! Batched ingestion driver.
//!
//! Consumes a pull-based record source in fixed-size chunks. Each
//! chunk is reconciled against the persisted schema and committed
//! atomically; a failure aborts the run but leaves earlier chunks
//! durably committed, and the error reports how much was written.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use record_model::{Record, RecordType};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::error::StoreError;
use crate::inference::DataTypeInferer;
use crate::reconcile::plan_chunk;
use crate::relations::{classify_relations, RelationDecision};
use crate::schema::{Cardinality, Column, RelationDef, Schema};
use crate::store::RecordStore;

/// How attributes absent from an incoming record treat persisted
/// values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Absent attributes keep their persisted values; explicit nulls
    /// clear
    #[default]
    Merge,
    /// Persisted attributes absent from the payload are nulled out
    Replace,
}

/// Per-run ingestion options.
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Records per chunk; defaults to the configured chunk size
    pub chunk_size: Option<usize>,
    /// Primary-key column for a type created by this run; must match
    /// the persisted one when the type exists
    pub primary_key: Option<String>,
    /// Merge or full-replace semantics per record
    pub mode: WriteMode,
    /// Cooperative cancellation flag, checked between chunks
    pub cancel: Option<Arc<AtomicBool>>,
}

/// Counts of durably committed records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Records inserted
    pub inserted: u64,
    /// Records updated
    pub updated: u64,
}

impl IngestReport {
    /// Total records written.
    pub fn total(&self) -> u64 {
        self.inserted + self.updated
    }
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} inserted, {} updated", self.inserted, self.updated)
    }
}

/// Ingestion failure, carrying what earlier chunks already committed.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("ingestion stopped after committing {committed}: {source}")]
pub struct IngestError {
    /// Counts committed by the chunks before the failure
    pub committed: IngestReport,
    /// The failure that aborted the run
    #[source]
    pub source: StoreError,
}

/// Outcome of a single-record upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The record did not exist before
    Created,
    /// An existing record was overwritten
    Updated,
}

/// Drives chunked ingestion runs against one store.
#[derive(Debug)]
pub struct IngestDriver<'a> {
    store: &'a RecordStore,
    inferer: DataTypeInferer,
}

impl<'a> IngestDriver<'a> {
    /// Creates a driver for the given store.
    pub fn new(store: &'a RecordStore) -> Self {
        let inferer = DataTypeInferer::new(store.config().relation_scheme.clone());
        Self { store, inferer }
    }

    /// Ingests a record source in chunks.
    ///
    /// The source is drawn incrementally and never collected as a
    /// whole. The first chunk creates the record type when absent;
    /// every chunk is reconciled and committed atomically, strictly in
    /// order. Cancellation takes effect between chunks, never
    /// mid-chunk.
    pub fn ingest<I>(
        &self,
        collection: Uuid,
        record_type: &RecordType,
        source: I,
        options: IngestOptions,
    ) -> Result<IngestReport, IngestError>
    where
        I: IntoIterator<Item = Record>,
    {
        let chunk_size = options
            .chunk_size
            .unwrap_or(self.store.config().chunk_size)
            .max(1);
        let mut source = source.into_iter();
        let mut report = IngestReport::default();
        loop {
            if let Some(cancel) = &options.cancel {
                if cancel.load(Ordering::Acquire) {
                    tracing::info!(
                        "ingestion into '{record_type}' cancelled after {report}"
                    );
                    return Ok(report);
                }
            }
            let chunk: Vec<Record> = source.by_ref().take(chunk_size).collect();
            if chunk.is_empty() {
                break;
            }
            let size = chunk.len();
            let (inserted, updated) = self
                .commit_chunk(collection, record_type, chunk, &options)
                .map_err(|source| IngestError {
                    committed: report,
                    source,
                })?;
            report.inserted += inserted;
            report.updated += updated;
            tracing::debug!(
                "chunk of {size} records committed into '{record_type}' (running total {report})"
            );
        }
        tracing::info!("ingestion into '{record_type}' finished: {report}");
        Ok(report)
    }

    /// Writes one record with full-replace semantics: persisted
    /// attributes absent from the payload are nulled out. Creates the
    /// record type on first write.
    pub fn upsert_one(
        &self,
        collection: Uuid,
        record: Record,
        primary_key: Option<&str>,
    ) -> Result<UpsertOutcome, StoreError> {
        let record_type = record.record_type().clone();
        let options = IngestOptions {
            chunk_size: Some(1),
            primary_key: primary_key.map(str::to_string),
            mode: WriteMode::Replace,
            cancel: None,
        };
        let (inserted, _) = self.commit_chunk(collection, &record_type, vec![record], &options)?;
        Ok(if inserted == 1 {
            UpsertOutcome::Created
        } else {
            UpsertOutcome::Updated
        })
    }

    /// Merges one record into an existing one: only attributes present
    /// in the payload change, explicit nulls clear. Returns the merged
    /// record.
    pub fn patch_one(&self, collection: Uuid, record: Record) -> Result<Record, StoreError> {
        let record_type = record.record_type().clone();
        let record_id = record.id().to_string();
        if !self.store.type_exists(collection, &record_type)? {
            return Err(StoreError::TypeNotFound(record_type));
        }
        if !self.store.record_exists(collection, &record_type, &record_id)? {
            return Err(StoreError::RecordNotFound {
                record_type,
                record_id,
            });
        }
        let options = IngestOptions {
            chunk_size: Some(1),
            ..IngestOptions::default()
        };
        self.commit_chunk(collection, &record_type, vec![record], &options)?;
        self.store
            .get_record(collection, &record_type, &record_id)?
            .ok_or(StoreError::RecordNotFound {
                record_type,
                record_id,
            })
    }

    fn commit_chunk(
        &self,
        collection: Uuid,
        record_type: &RecordType,
        mut chunk: Vec<Record>,
        options: &IngestOptions,
    ) -> Result<(u64, u64), StoreError> {
        validate_chunk(record_type, &chunk)?;
        let known: HashSet<RecordType> = self.store.list_types(collection)?.into_iter().collect();

        if !known.contains(record_type) {
            let resolved_pk = options
                .primary_key
                .clone()
                .unwrap_or_else(|| self.store.config().default_primary_key.clone());
            let inferred = self.inferer.infer_records(&chunk);
            let decisions =
                classify_relations(&chunk, self.inferer.scheme(), &known, record_type)?;
            let (columns, relations) = assemble_initial_schema(inferred, decisions, &resolved_pk);
            return self.store.create_type_with_records(
                collection,
                record_type,
                columns,
                relations,
                options.primary_key.as_deref(),
                &chunk,
            );
        }

        let primary_key = self.store.get_primary_key(collection, record_type)?;
        if let Some(requested) = &options.primary_key {
            if *requested != primary_key {
                return Err(StoreError::PrimaryKeyMismatch {
                    record_type: record_type.clone(),
                    requested: requested.clone(),
                    actual: primary_key,
                });
            }
        }
        let schema = self.store.get_schema(collection, record_type)?;
        if options.mode == WriteMode::Replace {
            null_absent_attributes(&schema, &mut chunk);
        }
        let plan = plan_chunk(
            &schema,
            &primary_key,
            &chunk,
            &known,
            record_type,
            &self.inferer,
        )?;
        self.store.apply_chunk(collection, record_type, &plan, &chunk)
    }
}

fn validate_chunk(record_type: &RecordType, chunk: &[Record]) -> Result<(), StoreError> {
    for record in chunk {
        if record.id().is_empty() {
            return Err(StoreError::EmptyRecordId {
                record_type: record_type.clone(),
            });
        }
        if record.record_type() != record_type {
            return Err(StoreError::RecordTypeMismatch {
                record_id: record.id().to_string(),
                expected: record_type.clone(),
                actual: record.record_type().clone(),
            });
        }
    }
    Ok(())
}

/// Turns a first chunk's inference and relation decisions into the
/// initial schema: array relations drop their inline column, and the
/// primary key never appears among the columns or relations.
fn assemble_initial_schema(
    inferred: Vec<Column>,
    decisions: Vec<RelationDecision>,
    primary_key: &str,
) -> (Vec<Column>, Vec<RelationDef>) {
    let relations: Vec<RelationDef> = decisions
        .into_iter()
        .filter(|d| d.attribute != primary_key)
        .map(|d| RelationDef {
            attribute: d.attribute,
            target: d.target,
            cardinality: d.cardinality,
        })
        .collect();
    let many: HashSet<&str> = relations
        .iter()
        .filter(|r| r.cardinality == Cardinality::Many)
        .map(|r| r.attribute.as_str())
        .collect();
    let columns = inferred
        .into_iter()
        .filter(|c| !many.contains(c.name.as_str()))
        .collect();
    (columns, relations)
}

/// Full-replace semantics: every persisted attribute absent from a
/// record's payload becomes an explicit null.
fn null_absent_attributes(schema: &Schema, chunk: &mut [Record]) {
    let mut attributes: Vec<&str> = schema.columns().iter().map(|c| c.name.as_str()).collect();
    attributes.extend(
        schema
            .relations()
            .iter()
            .filter(|r| r.cardinality == Cardinality::Many)
            .map(|r| r.attribute.as_str()),
    );
    for record in chunk {
        for attribute in &attributes {
            record
                .attributes_mut()
                .insert_if_absent(*attribute, Value::Null);
        }
    }
}
