//! Shared model types for the record store.
//!
//! Provides validated record-type identifiers, records with ordered
//! attribute maps, and the data type lattice used for schema inference
//! and widening.

pub mod data_type;
pub mod record;
pub mod record_type;

pub use data_type::DataTypeMapping;
pub use record::{AttributeMap, Record, RecordAttributes};
pub use record_type::{NameError, RecordType, MAX_IDENTIFIER_LEN, RESERVED_PREFIX};
