//! One record type's table: dynamic schema, rows, and join tables.
//!
//! Tables are cloned, mutated, and swapped back by the store so that a
//! chunk's structural changes and row writes commit together or not at
//! all.

use std::collections::{BTreeMap, HashMap};

use record_model::{DataTypeMapping, RecordType};
use serde_json::Value;

use crate::error::StoreError;
use crate::schema::{Cardinality, Column, RelationDef, Schema};

use super::coerce::recoerce_stored;

/// Stored row: column name to stored value.
pub(crate) type Row = HashMap<String, Value>;

/// Join table backing one array relation, keyed `(from_id, to_id)`.
#[derive(Debug, Clone)]
pub(crate) struct JoinTable {
    pub target: RecordType,
    pub rows: Vec<(String, String)>,
}

impl JoinTable {
    /// Replaces all rows originating from `from_id` with the given
    /// target ids.
    pub fn replace_from(&mut self, from_id: &str, to_ids: Vec<String>) {
        self.rows.retain(|(from, _)| from != from_id);
        self.rows
            .extend(to_ids.into_iter().map(|to| (from_id.to_string(), to)));
    }

    /// Target ids referenced from `from_id`, in insertion order.
    pub fn targets_of(&self, from_id: &str) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|(from, _)| from == from_id)
            .map(|(_, to)| to.as_str())
            .collect()
    }
}

/// Table of one record type.
#[derive(Debug, Clone)]
pub(crate) struct RecordTable {
    /// Record type this table stores
    pub name: RecordType,
    /// Primary-key column name, fixed at creation
    pub primary_key: String,
    /// Columns and relations
    pub schema: Schema,
    /// Rows keyed by primary key
    pub rows: BTreeMap<String, Row>,
    /// Join tables keyed by attribute name
    pub joins: HashMap<String, JoinTable>,
}

impl RecordTable {
    pub fn new(name: RecordType, primary_key: String) -> Self {
        Self {
            name,
            primary_key,
            schema: Schema::new(),
            rows: BTreeMap::new(),
            joins: HashMap::new(),
        }
    }

    /// Adds a column; a column that already exists with the identical
    /// mapping is a no-op.
    ///
    /// Returns `true` if the column was added.
    pub fn add_column(&mut self, column: Column) -> Result<bool, StoreError> {
        match self.schema.column(&column.name) {
            Some(existing) if existing.mapping == column.mapping => Ok(false),
            Some(existing) => Err(StoreError::storage(
                "add column",
                format!(
                    "column '{}' already exists as {} in '{}'",
                    column.name, existing.mapping, self.name
                ),
            )),
            None => {
                self.schema.push_column(column);
                Ok(true)
            }
        }
    }

    /// Widens an existing column to a more general mapping, re-coercing
    /// stored values so earlier rows read back under the new type.
    ///
    /// Widening away from a relation drops the foreign key. Narrowing
    /// is rejected; this is a defensive check, unreachable through the
    /// monotonic lattice.
    ///
    /// Returns `true` if the column changed.
    pub fn widen_column(
        &mut self,
        name: &str,
        to: &DataTypeMapping,
        scheme: &str,
    ) -> Result<bool, StoreError> {
        let from = match self.schema.mapping(name) {
            Some(mapping) => mapping.clone(),
            None => {
                return Err(StoreError::storage(
                    "widen column",
                    format!("column '{name}' does not exist in '{}'", self.name),
                ))
            }
        };
        if from == *to {
            return Ok(false);
        }
        if from.widen(to) != *to {
            return Err(StoreError::ColumnNarrowing {
                record_type: self.name.clone(),
                column: name.to_string(),
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        for row in self.rows.values_mut() {
            if let Some(stored) = row.get(name) {
                let widened = recoerce_stored(stored, &from, to, scheme)?;
                row.insert(name.to_string(), widened);
            }
        }
        if from.is_relation() && !to.is_relation() {
            self.schema.remove_relation(name);
        }
        self.schema.set_mapping(name, to.clone());
        Ok(true)
    }

    /// Registers a relation; a relation that already exists in the
    /// identical shape is a no-op. A single-reference relation requires
    /// its inline column to be in place; an array relation gets its
    /// join table.
    ///
    /// Returns `true` if the relation was added.
    pub fn add_relation(&mut self, def: RelationDef) -> Result<bool, StoreError> {
        if let Some(existing) = self.schema.relation(&def.attribute) {
            if existing.target != def.target {
                return Err(StoreError::RelationTargetChanged {
                    attribute: def.attribute,
                    established: existing.target.clone(),
                    requested: def.target,
                });
            }
            if existing.cardinality != def.cardinality {
                return Err(StoreError::RelationCardinalityChanged {
                    attribute: def.attribute,
                });
            }
            return Ok(false);
        }
        match def.cardinality {
            Cardinality::One => {
                let expected = DataTypeMapping::Relation(def.target.clone());
                match self.schema.mapping(&def.attribute) {
                    Some(mapping) if *mapping == expected => {}
                    other => {
                        return Err(StoreError::storage(
                            "add relation",
                            format!(
                                "attribute '{}' of '{}' is {:?}, expected a {} column",
                                def.attribute, self.name, other, expected
                            ),
                        ))
                    }
                }
            }
            Cardinality::Many => {
                self.joins
                    .entry(def.attribute.clone())
                    .or_insert_with(|| JoinTable {
                        target: def.target.clone(),
                        rows: Vec::new(),
                    });
            }
        }
        self.schema.push_relation(def);
        Ok(true)
    }

    /// Inserts or updates one row with already-coerced column values.
    /// Only the given columns are touched; explicit nulls clear.
    ///
    /// Returns `true` if the row was inserted.
    pub fn upsert_row(&mut self, record_id: &str, values: Vec<(String, Value)>) -> bool {
        match self.rows.get_mut(record_id) {
            Some(row) => {
                for (column, value) in values {
                    row.insert(column, value);
                }
                false
            }
            None => {
                self.rows.insert(record_id.to_string(), values.into_iter().collect());
                true
            }
        }
    }

    /// Removes a row and its outgoing join rows.
    pub fn delete_row(&mut self, record_id: &str) -> bool {
        let existed = self.rows.remove(record_id).is_some();
        if existed {
            for join in self.joins.values_mut() {
                join.rows.retain(|(from, _)| from != record_id);
            }
        }
        existed
    }

    /// Returns `true` if this table holds any relation into `target`.
    pub fn references_type(&self, target: &RecordType) -> bool {
        self.schema.relations().iter().any(|r| r.target == *target)
    }

    /// Returns `true` if any row of this table references the record
    /// `(target, id)`, ignoring rows whose primary key is in `exclude`
    /// (used when those rows are being deleted in the same operation).
    pub fn references_record(
        &self,
        target: &RecordType,
        id: &str,
        exclude: &[String],
    ) -> bool {
        for relation in self.schema.relations() {
            if relation.target != *target {
                continue;
            }
            match relation.cardinality {
                Cardinality::One => {
                    let holds = self.rows.iter().any(|(row_id, row)| {
                        !exclude.iter().any(|e| e == row_id)
                            && row.get(&relation.attribute)
                                == Some(&Value::String(id.to_string()))
                    });
                    if holds {
                        return true;
                    }
                }
                Cardinality::Many => {
                    if let Some(join) = self.joins.get(&relation.attribute) {
                        let holds = join
                            .rows
                            .iter()
                            .any(|(from, to)| to == id && !exclude.iter().any(|e| e == from));
                        if holds {
                            return true;
                        }
                    }
                }
            }
        }
        false
    }
}
