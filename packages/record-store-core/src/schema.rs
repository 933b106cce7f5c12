//! Persisted schema of one record type.

use record_model::{DataTypeMapping, RecordType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cardinality of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinality {
    /// Single reference, stored as an inline column with a foreign key
    One,
    /// Array of references, backed by a join table
    Many,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One => write!(f, "one"),
            Self::Many => write!(f, "many"),
        }
    }
}

/// A typed reference from one attribute to another record type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationDef {
    /// Attribute holding the reference(s)
    pub attribute: String,
    /// Referenced record type
    pub target: RecordType,
    /// Single reference or array of references
    pub cardinality: Cardinality,
}

/// One column: name plus persisted data type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Persisted data type
    pub mapping: DataTypeMapping,
}

/// Persisted schema of one record type: ordered columns plus relations.
///
/// Array relations have no inline column; their attribute names appear
/// only in the relation list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<Column>,
    relations: Vec<RelationDef>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Columns in declaration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Relations in declaration order.
    pub fn relations(&self) -> &[RelationDef] {
        &self.relations
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns the persisted mapping of a column.
    pub fn mapping(&self, name: &str) -> Option<&DataTypeMapping> {
        self.column(name).map(|c| &c.mapping)
    }

    /// Looks up a relation by attribute name.
    pub fn relation(&self, attribute: &str) -> Option<&RelationDef> {
        self.relations.iter().find(|r| r.attribute == attribute)
    }

    /// Returns `true` if the schema has neither columns nor relations.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.relations.is_empty()
    }

    /// Appends a column. The caller guarantees the name is not present.
    pub(crate) fn push_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    /// Replaces the mapping of an existing column.
    pub(crate) fn set_mapping(&mut self, name: &str, mapping: DataTypeMapping) {
        if let Some(column) = self.columns.iter_mut().find(|c| c.name == name) {
            column.mapping = mapping;
        }
    }

    /// Appends a relation. The caller guarantees the attribute is not
    /// already related.
    pub(crate) fn push_relation(&mut self, relation: RelationDef) {
        self.relations.push(relation);
    }

    /// Removes the relation for an attribute, if any.
    pub(crate) fn remove_relation(&mut self, attribute: &str) -> Option<RelationDef> {
        let pos = self.relations.iter().position(|r| r.attribute == attribute)?;
        Some(self.relations.remove(pos))
    }
}
