//! Integration test suite driven through the public API.
//!
//! Organized by concern:
//! - schema evolution across chunks and runs
//! - ingestion mechanics (chunking, counts, partial failure,
//!   cancellation, single-record paths)
//! - relations (foreign keys, join tables, deletion protection)

pub mod helpers;
pub mod ingestion_tests;
pub mod relation_tests;
