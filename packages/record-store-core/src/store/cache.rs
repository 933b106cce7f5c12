//! Schema and primary-key lookup caches.
//!
//! Both caches are keyed by `(collection, record type)` and are
//! invalidated synchronously by every mutating schema-store call that
//! touches the same key, so later reads in the same or a later run
//! always observe the latest structural state.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use record_model::RecordType;
use uuid::Uuid;

use crate::schema::Schema;

type Key = (Uuid, RecordType);

/// Cache of schemas and primary-key columns.
///
/// Soft state only: a poisoned lock is recovered rather than
/// propagated, since the cache can always be repopulated from the
/// store.
#[derive(Debug, Default)]
pub(crate) struct SchemaCache {
    schemas: RwLock<HashMap<Key, Arc<Schema>>>,
    primary_keys: RwLock<HashMap<Key, String>>,
}

impl SchemaCache {
    pub fn get_schema(&self, collection: Uuid, record_type: &RecordType) -> Option<Arc<Schema>> {
        let schemas = self
            .schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        schemas
            .get(&(collection, record_type.clone()))
            .map(Arc::clone)
    }

    pub fn put_schema(&self, collection: Uuid, record_type: &RecordType, schema: Arc<Schema>) {
        let mut schemas = self
            .schemas
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        schemas.insert((collection, record_type.clone()), schema);
    }

    pub fn get_primary_key(&self, collection: Uuid, record_type: &RecordType) -> Option<String> {
        let keys = self
            .primary_keys
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        keys.get(&(collection, record_type.clone())).cloned()
    }

    pub fn put_primary_key(&self, collection: Uuid, record_type: &RecordType, column: String) {
        let mut keys = self
            .primary_keys
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        keys.insert((collection, record_type.clone()), column);
    }

    /// Drops cached entries for one `(collection, type)` key.
    pub fn invalidate(&self, collection: Uuid, record_type: &RecordType) {
        let key = (collection, record_type.clone());
        self.schemas
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
        self.primary_keys
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
    }

    /// Drops cached entries for every type of a collection.
    pub fn invalidate_collection(&self, collection: Uuid) {
        self.schemas
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(c, _), _| *c != collection);
        self.primary_keys
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(c, _), _| *c != collection);
    }
}
