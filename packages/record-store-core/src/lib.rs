//! Schema inference, evolution, and batched ingestion engine.
//!
//! The engine consumes streams of loosely-typed records, infers a
//! relational schema per record type, reconciles inferred schemas
//! against persisted ones (new columns, type widening, relation
//! discovery), and drives chunked upserts with per-chunk atomicity
//! against an in-memory relational backend.

pub mod config;
pub mod error;
pub mod inference;
pub mod ingest;
pub mod reconcile;
pub mod relations;
pub mod schema;
pub mod store;

pub use config::StoreConfig;
pub use error::{ErrorCategory, StoreError};
pub use inference::DataTypeInferer;
pub use ingest::{IngestDriver, IngestError, IngestOptions, IngestReport, UpsertOutcome, WriteMode};
pub use reconcile::{plan_chunk, ReconcileStep, ReconciliationPlan};
pub use relations::{classify_relations, reference_string, RelationDecision, RelationRef};
pub use schema::{Cardinality, Column, RelationDef, Schema};
pub use store::RecordStore;
