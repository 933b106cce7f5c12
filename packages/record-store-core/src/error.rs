//! Engine error types.

use record_model::{NameError, RecordType};
use thiserror::Error;
use uuid::Uuid;

/// Caller-facing error taxonomy.
///
/// Callers map these onto transport-level responses: validation and
/// missing-dependency failures are client-side and never retried,
/// conflicts and not-found are surfaced distinctly, and storage
/// failures are server-side and safe to retry at the whole-chunk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed input: identifiers, mixed or ambiguous relation
    /// columns, attempted narrowing
    Validation,
    /// A referenced record type does not exist
    MissingDependency,
    /// The operation collides with existing state
    Conflict,
    /// The addressed collection, type, or record does not exist
    NotFound,
    /// The backing store rejected an operation
    Storage,
}

/// Engine operation errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    /// Invalid table or column identifier
    #[error(transparent)]
    InvalidName(#[from] NameError),

    /// Record id is empty
    #[error("record id must not be empty in record type '{record_type}'")]
    EmptyRecordId { record_type: RecordType },

    /// A record was addressed to the wrong record type
    #[error("record '{record_id}' carries type '{actual}' but was ingested into '{expected}'")]
    RecordTypeMismatch {
        record_id: String,
        expected: RecordType,
        actual: RecordType,
    },

    /// One attribute mixes relation references and plain values
    #[error("attribute '{attribute}' mixes relation references and non-relation values")]
    MixedRelationValues { attribute: String },

    /// One attribute references more than one record type
    #[error("attribute '{attribute}' references more than one record type")]
    AmbiguousRelation { attribute: String },

    /// A relation reference targets an attribute that already exists as
    /// a plain column
    #[error("attribute '{attribute}' already exists as a non-relation column")]
    RelationToExistingColumn { attribute: String },

    /// A chunk tried to change an established relation
    #[error(
        "attribute '{attribute}' already relates to '{established}' and cannot relate to '{requested}'"
    )]
    RelationTargetChanged {
        attribute: String,
        established: RecordType,
        requested: RecordType,
    },

    /// A chunk tried to turn a single-reference relation into an array
    /// relation
    #[error("attribute '{attribute}' holds single references and cannot become an array relation")]
    RelationCardinalityChanged { attribute: String },

    /// A column widen would narrow the persisted type
    #[error("cannot narrow column '{column}' of '{record_type}' from {from} to {to}")]
    ColumnNarrowing {
        record_type: RecordType,
        column: String,
        from: String,
        to: String,
    },

    /// Relation target type does not exist
    #[error("record type '{target}' referenced by attribute '{attribute}' does not exist")]
    MissingRelationTarget {
        attribute: String,
        target: RecordType,
    },

    /// Collection already exists
    #[error("collection '{0}' already exists")]
    CollectionExists(Uuid),

    /// Collection not found
    #[error("collection '{0}' not found")]
    CollectionNotFound(Uuid),

    /// Record type already exists
    #[error("record type '{0}' already exists")]
    TypeExists(RecordType),

    /// Record type not found
    #[error("record type '{0}' not found")]
    TypeNotFound(RecordType),

    /// Record not found
    #[error("record '{record_id}' not found in '{record_type}'")]
    RecordNotFound {
        record_type: RecordType,
        record_id: String,
    },

    /// Batch delete addressed records that do not exist
    #[error("records not found in '{record_type}': {ids:?}")]
    RecordsNotFound {
        record_type: RecordType,
        ids: Vec<String>,
    },

    /// Record type is the target of relations from another type
    #[error("record type '{record_type}' cannot be deleted while '{referencing}' relates to it")]
    TypeInUse {
        record_type: RecordType,
        referencing: RecordType,
    },

    /// Record is the target of relations from other records
    #[error("record '{record_id}' in '{record_type}' cannot be deleted while other records relate to it")]
    RecordInUse {
        record_type: RecordType,
        record_id: String,
    },

    /// Requested primary key differs from the one fixed at creation
    #[error("record type '{record_type}' uses primary key '{actual}', not '{requested}'")]
    PrimaryKeyMismatch {
        record_type: RecordType,
        requested: String,
        actual: String,
    },

    /// Interior lock was poisoned
    #[error("store lock poisoned")]
    LockPoisoned,

    /// The backing store rejected a statement
    #[error("storage rejected {operation}: {message}")]
    Storage {
        operation: &'static str,
        message: String,
    },
}

impl StoreError {
    /// Convenience constructor for storage-level rejections.
    pub(crate) fn storage(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Storage {
            operation,
            message: message.into(),
        }
    }

    /// Maps this error onto the caller-facing taxonomy.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidName(_)
            | Self::EmptyRecordId { .. }
            | Self::RecordTypeMismatch { .. }
            | Self::MixedRelationValues { .. }
            | Self::AmbiguousRelation { .. }
            | Self::RelationToExistingColumn { .. }
            | Self::RelationTargetChanged { .. }
            | Self::RelationCardinalityChanged { .. }
            | Self::ColumnNarrowing { .. }
            | Self::PrimaryKeyMismatch { .. } => ErrorCategory::Validation,
            Self::MissingRelationTarget { .. } => ErrorCategory::MissingDependency,
            Self::CollectionExists(_)
            | Self::TypeExists(_)
            | Self::TypeInUse { .. }
            | Self::RecordInUse { .. } => ErrorCategory::Conflict,
            Self::CollectionNotFound(_)
            | Self::TypeNotFound(_)
            | Self::RecordNotFound { .. }
            | Self::RecordsNotFound { .. } => ErrorCategory::NotFound,
            Self::LockPoisoned | Self::Storage { .. } => ErrorCategory::Storage,
        }
    }
}
