//! Records and their ordered attribute maps.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record_type::RecordType;

/// Ordered map of attribute name to value.
pub type AttributeMap = serde_json::Map<String, Value>;

/// Ordered attribute map of one record.
///
/// Insertion order is preserved so that inferred schemas keep the column
/// order of the incoming data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordAttributes(AttributeMap);

impl RecordAttributes {
    /// Creates an empty attribute map.
    pub fn empty() -> Self {
        Self(AttributeMap::new())
    }

    /// Returns the value of an attribute, if present.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Returns `true` if the attribute is present (including explicit null).
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Sets an attribute value, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(name.into(), value)
    }

    /// Sets an attribute value only if the attribute is absent.
    pub fn insert_if_absent(&mut self, name: impl Into<String>, value: Value) {
        self.0.entry(name.into()).or_insert(value);
    }

    /// Removes an attribute, returning its previous value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the wrapper and returns the underlying map.
    pub fn into_inner(self) -> AttributeMap {
        self.0
    }
}

impl From<AttributeMap> for RecordAttributes {
    fn from(map: AttributeMap) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for RecordAttributes {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One record: an id plus an ordered attribute map, addressed to one
/// record type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    id: String,
    record_type: RecordType,
    attributes: RecordAttributes,
}

impl Record {
    /// Creates a record.
    ///
    /// The id is free-form text; emptiness is rejected at the ingestion
    /// boundary rather than here so deserialized payloads can be
    /// reported with context.
    pub fn new(
        id: impl Into<String>,
        record_type: RecordType,
        attributes: impl Into<RecordAttributes>,
    ) -> Self {
        Self {
            id: id.into(),
            record_type,
            attributes: attributes.into(),
        }
    }

    /// Record id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Record type this record belongs to.
    pub fn record_type(&self) -> &RecordType {
        &self.record_type
    }

    /// Attribute map.
    pub fn attributes(&self) -> &RecordAttributes {
        &self.attributes
    }

    /// Mutable attribute map.
    pub fn attributes_mut(&mut self) -> &mut RecordAttributes {
        &mut self.attributes
    }

    /// Returns the value of one attribute, if present.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }
}
