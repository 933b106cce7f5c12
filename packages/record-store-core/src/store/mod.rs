//! The schema store and the relational backend it drives.
//!
//! Collections are isolated namespaces of tables. Structural changes
//! (create type, add column, widen column, add relation) and chunked
//! row upserts mutate a clone of the target table and swap it back in
//! under the collection write lock, so each operation commits entirely
//! or not at all.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use record_model::record_type::validate_identifier;
use record_model::{DataTypeMapping, Record, RecordAttributes, RecordType};
use serde_json::Value;
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::reconcile::{ReconcileStep, ReconciliationPlan};
use crate::relations::{reference_string, RelationRef};
use crate::schema::{Cardinality, Column, RelationDef, Schema};

mod cache;
mod coerce;
mod table;

use cache::SchemaCache;
use coerce::{coerce_value, render_stored};
use table::RecordTable;

#[derive(Debug, Default)]
struct CollectionState {
    tables: HashMap<RecordType, RecordTable>,
}

type Collections = HashMap<Uuid, CollectionState>;

/// Multi-tenant record store: per-collection tables with inferred,
/// growing schemas.
#[derive(Debug)]
pub struct RecordStore {
    collections: RwLock<Collections>,
    cache: SchemaCache,
    config: StoreConfig,
}

impl RecordStore {
    /// Creates an empty store.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            cache: SchemaCache::default(),
            config,
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn read_collections(&self) -> Result<RwLockReadGuard<'_, Collections>, StoreError> {
        self.collections.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write_collections(&self) -> Result<RwLockWriteGuard<'_, Collections>, StoreError> {
        self.collections
            .write()
            .map_err(|_| StoreError::LockPoisoned)
    }

    // ---- collections ----

    /// Creates an isolated collection namespace.
    pub fn create_collection(&self, collection: Uuid) -> Result<(), StoreError> {
        let mut collections = self.write_collections()?;
        if collections.contains_key(&collection) {
            return Err(StoreError::CollectionExists(collection));
        }
        collections.insert(collection, CollectionState::default());
        tracing::info!("created collection {collection}");
        Ok(())
    }

    /// Deletes a collection and everything in it: tables, rows, and
    /// join tables.
    pub fn delete_collection(&self, collection: Uuid) -> Result<(), StoreError> {
        let mut collections = self.write_collections()?;
        if collections.remove(&collection).is_none() {
            return Err(StoreError::CollectionNotFound(collection));
        }
        drop(collections);
        self.cache.invalidate_collection(collection);
        tracing::info!("deleted collection {collection}");
        Ok(())
    }

    /// Returns `true` if the collection exists.
    pub fn collection_exists(&self, collection: Uuid) -> Result<bool, StoreError> {
        Ok(self.read_collections()?.contains_key(&collection))
    }

    // ---- record types ----

    /// Record types of a collection, sorted by name.
    pub fn list_types(&self, collection: Uuid) -> Result<Vec<RecordType>, StoreError> {
        let collections = self.read_collections()?;
        let state = collections
            .get(&collection)
            .ok_or(StoreError::CollectionNotFound(collection))?;
        let mut types: Vec<RecordType> = state.tables.keys().cloned().collect();
        types.sort();
        Ok(types)
    }

    /// Returns `true` if the record type exists in the collection.
    pub fn type_exists(&self, collection: Uuid, record_type: &RecordType) -> Result<bool, StoreError> {
        let collections = self.read_collections()?;
        let state = collections
            .get(&collection)
            .ok_or(StoreError::CollectionNotFound(collection))?;
        Ok(state.tables.contains_key(record_type))
    }

    /// Creates a record type with an initial schema and relations.
    ///
    /// Fails with a conflict when the type already exists. Columns for
    /// single-reference relations are added implicitly when absent.
    pub fn create_type(
        &self,
        collection: Uuid,
        record_type: &RecordType,
        columns: Vec<Column>,
        relations: Vec<RelationDef>,
        primary_key: Option<&str>,
    ) -> Result<(), StoreError> {
        let table = self.build_table(record_type, columns, relations.clone(), primary_key)?;
        let mut collections = self.write_collections()?;
        let state = collections
            .get_mut(&collection)
            .ok_or(StoreError::CollectionNotFound(collection))?;
        if state.tables.contains_key(record_type) {
            return Err(StoreError::TypeExists(record_type.clone()));
        }
        verify_relation_targets(&state.tables, record_type, &relations)?;
        state.tables.insert(record_type.clone(), table);
        drop(collections);
        self.cache.invalidate(collection, record_type);
        tracing::info!("created record type '{record_type}' in collection {collection}");
        Ok(())
    }

    /// Deletes a record type, its rows, and its join tables.
    ///
    /// Rejected while any other record type holds a relation into it.
    pub fn delete_type(&self, collection: Uuid, record_type: &RecordType) -> Result<(), StoreError> {
        let mut collections = self.write_collections()?;
        let state = collections
            .get_mut(&collection)
            .ok_or(StoreError::CollectionNotFound(collection))?;
        if !state.tables.contains_key(record_type) {
            return Err(StoreError::TypeNotFound(record_type.clone()));
        }
        for (name, table) in &state.tables {
            if name != record_type && table.references_type(record_type) {
                return Err(StoreError::TypeInUse {
                    record_type: record_type.clone(),
                    referencing: name.clone(),
                });
            }
        }
        state.tables.remove(record_type);
        drop(collections);
        self.cache.invalidate(collection, record_type);
        tracing::info!("deleted record type '{record_type}' from collection {collection}");
        Ok(())
    }

    // ---- schema lookups ----

    /// Persisted schema of a record type. Cached per
    /// `(collection, type)`; invalidated by every mutating call.
    pub fn get_schema(
        &self,
        collection: Uuid,
        record_type: &RecordType,
    ) -> Result<Arc<Schema>, StoreError> {
        if let Some(schema) = self.cache.get_schema(collection, record_type) {
            return Ok(schema);
        }
        let collections = self.read_collections()?;
        let table = lookup_table(&collections, collection, record_type)?;
        let schema = Arc::new(table.schema.clone());
        tracing::debug!("schema cache miss for '{record_type}' in collection {collection}");
        self.cache.put_schema(collection, record_type, Arc::clone(&schema));
        Ok(schema)
    }

    /// Primary-key column of a record type. Cached alongside the
    /// schema.
    pub fn get_primary_key(
        &self,
        collection: Uuid,
        record_type: &RecordType,
    ) -> Result<String, StoreError> {
        if let Some(column) = self.cache.get_primary_key(collection, record_type) {
            return Ok(column);
        }
        let collections = self.read_collections()?;
        let table = lookup_table(&collections, collection, record_type)?;
        let column = table.primary_key.clone();
        self.cache
            .put_primary_key(collection, record_type, column.clone());
        Ok(column)
    }

    // ---- structural operations ----

    /// Adds a column; a no-op when the identical column already exists.
    pub fn add_column(
        &self,
        collection: Uuid,
        record_type: &RecordType,
        name: &str,
        mapping: DataTypeMapping,
    ) -> Result<(), StoreError> {
        validate_identifier(name)?;
        let mut collections = self.write_collections()?;
        let state = collections
            .get_mut(&collection)
            .ok_or(StoreError::CollectionNotFound(collection))?;
        let table = state
            .tables
            .get_mut(record_type)
            .ok_or_else(|| StoreError::TypeNotFound(record_type.clone()))?;
        let added = table.add_column(Column {
            name: name.to_string(),
            mapping: mapping.storage_form(),
        })?;
        drop(collections);
        if added {
            self.cache.invalidate(collection, record_type);
            tracing::debug!("added column '{name}' to '{record_type}'");
        }
        Ok(())
    }

    /// Widens a column to a more general mapping, re-coercing stored
    /// values; a no-op when the column already has the mapping, an
    /// error when the change would narrow.
    pub fn widen_column(
        &self,
        collection: Uuid,
        record_type: &RecordType,
        name: &str,
        mapping: DataTypeMapping,
    ) -> Result<(), StoreError> {
        let mut collections = self.write_collections()?;
        let state = collections
            .get_mut(&collection)
            .ok_or(StoreError::CollectionNotFound(collection))?;
        let table = state
            .tables
            .get(record_type)
            .ok_or_else(|| StoreError::TypeNotFound(record_type.clone()))?;
        let mut working = table.clone();
        let changed = working.widen_column(name, &mapping, &self.config.relation_scheme)?;
        if changed {
            state.tables.insert(record_type.clone(), working);
        }
        drop(collections);
        if changed {
            self.cache.invalidate(collection, record_type);
            tracing::info!("widened column '{name}' of '{record_type}' to {mapping}");
        }
        Ok(())
    }

    /// Registers a relation; a no-op when it already exists in the
    /// identical shape. Verifies the target type exists, then adds the
    /// inline reference column (ONE) or the join table (MANY).
    pub fn add_relation(
        &self,
        collection: Uuid,
        record_type: &RecordType,
        def: RelationDef,
    ) -> Result<(), StoreError> {
        validate_identifier(&def.attribute)?;
        let mut collections = self.write_collections()?;
        let state = collections
            .get_mut(&collection)
            .ok_or(StoreError::CollectionNotFound(collection))?;
        let table = state
            .tables
            .get(record_type)
            .ok_or_else(|| StoreError::TypeNotFound(record_type.clone()))?;
        verify_relation_targets(&state.tables, record_type, std::slice::from_ref(&def))?;
        let mut working = table.clone();
        prepare_relation_column(&mut working, &def)?;
        let added = working.add_relation(def.clone())?;
        if added {
            state.tables.insert(record_type.clone(), working);
        }
        drop(collections);
        if added {
            self.cache.invalidate(collection, record_type);
            tracing::debug!(
                "added {} relation '{}' -> '{}' on '{record_type}'",
                def.cardinality,
                def.attribute,
                def.target
            );
        }
        Ok(())
    }

    // ---- chunk commits ----

    /// Applies a reconciliation plan and upserts a chunk of records in
    /// one atomic commit. Returns `(inserted, updated)` counts.
    pub(crate) fn apply_chunk(
        &self,
        collection: Uuid,
        record_type: &RecordType,
        plan: &ReconciliationPlan,
        records: &[Record],
    ) -> Result<(u64, u64), StoreError> {
        let scheme = self.config.relation_scheme.clone();
        let mut collections = self.write_collections()?;
        let state = collections
            .get_mut(&collection)
            .ok_or(StoreError::CollectionNotFound(collection))?;
        let table = state
            .tables
            .get(record_type)
            .ok_or_else(|| StoreError::TypeNotFound(record_type.clone()))?;
        let mut working = table.clone();
        for step in &plan.steps {
            match step {
                ReconcileStep::AddColumn { name, mapping } => {
                    validate_identifier(name)?;
                    working.add_column(Column {
                        name: name.clone(),
                        mapping: mapping.storage_form(),
                    })?;
                }
                ReconcileStep::WidenColumn { name, to, .. } => {
                    working.widen_column(name, to, &scheme)?;
                }
                ReconcileStep::AddRelation { def } => {
                    verify_relation_targets(&state.tables, record_type, std::slice::from_ref(def))?;
                    prepare_relation_column(&mut working, def)?;
                    working.add_relation(def.clone())?;
                }
            }
        }
        let counts = upsert_records(&mut working, records, &scheme)?;
        validate_chunk_references(&state.tables, &working, records)?;
        state.tables.insert(record_type.clone(), working);
        drop(collections);
        self.cache.invalidate(collection, record_type);
        tracing::debug!(
            "committed chunk of {} records into '{record_type}' ({} inserted, {} updated)",
            records.len(),
            counts.0,
            counts.1
        );
        Ok(counts)
    }

    /// Creates a record type from its first chunk and upserts that
    /// chunk, atomically: on failure the type does not exist.
    pub(crate) fn create_type_with_records(
        &self,
        collection: Uuid,
        record_type: &RecordType,
        columns: Vec<Column>,
        relations: Vec<RelationDef>,
        primary_key: Option<&str>,
        records: &[Record],
    ) -> Result<(u64, u64), StoreError> {
        let scheme = self.config.relation_scheme.clone();
        let mut table = self.build_table(record_type, columns, relations.clone(), primary_key)?;
        let mut collections = self.write_collections()?;
        let state = collections
            .get_mut(&collection)
            .ok_or(StoreError::CollectionNotFound(collection))?;
        if state.tables.contains_key(record_type) {
            return Err(StoreError::TypeExists(record_type.clone()));
        }
        verify_relation_targets(&state.tables, record_type, &relations)?;
        let counts = upsert_records(&mut table, records, &scheme)?;
        validate_chunk_references(&state.tables, &table, records)?;
        state.tables.insert(record_type.clone(), table);
        drop(collections);
        self.cache.invalidate(collection, record_type);
        tracing::info!(
            "created record type '{record_type}' from first chunk ({} records)",
            records.len()
        );
        Ok(counts)
    }

    // ---- row operations ----

    /// Reads one record, reconstructing relation references and array
    /// relation attributes.
    pub fn get_record(
        &self,
        collection: Uuid,
        record_type: &RecordType,
        record_id: &str,
    ) -> Result<Option<Record>, StoreError> {
        let collections = self.read_collections()?;
        let table = lookup_table(&collections, collection, record_type)?;
        let row = match table.rows.get(record_id) {
            Some(row) => row,
            None => return Ok(None),
        };
        let scheme = &self.config.relation_scheme;
        let mut attributes = RecordAttributes::empty();
        for column in table.schema.columns() {
            let value = row
                .get(&column.name)
                .map(|stored| render_stored(stored, &column.mapping, scheme))
                .unwrap_or(Value::Null);
            attributes.insert(column.name.clone(), value);
        }
        for relation in table.schema.relations() {
            if relation.cardinality != Cardinality::Many {
                continue;
            }
            let references = table
                .joins
                .get(&relation.attribute)
                .map(|join| {
                    join.targets_of(record_id)
                        .into_iter()
                        .map(|to| Value::String(reference_string(&relation.target, to, scheme)))
                        .collect()
                })
                .unwrap_or_default();
            attributes.insert(relation.attribute.clone(), Value::Array(references));
        }
        Ok(Some(Record::new(
            record_id,
            record_type.clone(),
            attributes,
        )))
    }

    /// Returns `true` if the record exists.
    pub fn record_exists(
        &self,
        collection: Uuid,
        record_type: &RecordType,
        record_id: &str,
    ) -> Result<bool, StoreError> {
        let collections = self.read_collections()?;
        let table = lookup_table(&collections, collection, record_type)?;
        Ok(table.rows.contains_key(record_id))
    }

    /// Number of records of a type.
    pub fn count_records(&self, collection: Uuid, record_type: &RecordType) -> Result<usize, StoreError> {
        let collections = self.read_collections()?;
        let table = lookup_table(&collections, collection, record_type)?;
        Ok(table.rows.len())
    }

    /// Attribute names of a type: primary key first, then columns, then
    /// array relation attributes.
    pub fn list_attribute_names(
        &self,
        collection: Uuid,
        record_type: &RecordType,
    ) -> Result<Vec<String>, StoreError> {
        let collections = self.read_collections()?;
        let table = lookup_table(&collections, collection, record_type)?;
        let mut names = vec![table.primary_key.clone()];
        names.extend(table.schema.columns().iter().map(|c| c.name.clone()));
        names.extend(
            table
                .schema
                .relations()
                .iter()
                .filter(|r| r.cardinality == Cardinality::Many)
                .map(|r| r.attribute.clone()),
        );
        Ok(names)
    }

    /// Deletes one record. Returns `false` when the record does not
    /// exist; rejected while other records relate to it.
    pub fn delete_record(
        &self,
        collection: Uuid,
        record_type: &RecordType,
        record_id: &str,
    ) -> Result<bool, StoreError> {
        let mut collections = self.write_collections()?;
        let state = collections
            .get_mut(&collection)
            .ok_or(StoreError::CollectionNotFound(collection))?;
        if !state
            .tables
            .get(record_type)
            .ok_or_else(|| StoreError::TypeNotFound(record_type.clone()))?
            .rows
            .contains_key(record_id)
        {
            return Ok(false);
        }
        let batch = [record_id.to_string()];
        check_inbound_references(&state.tables, record_type, &batch)?;
        if let Some(table) = state.tables.get_mut(record_type) {
            table.delete_row(record_id);
        }
        tracing::debug!("deleted record '{record_id}' from '{record_type}'");
        Ok(true)
    }

    /// Deletes a batch of records. Fails listing the ids that do not
    /// exist before deleting anything; rejected while records outside
    /// the batch relate to any of them.
    pub fn delete_records(
        &self,
        collection: Uuid,
        record_type: &RecordType,
        record_ids: &[String],
    ) -> Result<(), StoreError> {
        let mut collections = self.write_collections()?;
        let state = collections
            .get_mut(&collection)
            .ok_or(StoreError::CollectionNotFound(collection))?;
        let table = state
            .tables
            .get(record_type)
            .ok_or_else(|| StoreError::TypeNotFound(record_type.clone()))?;
        let missing: Vec<String> = record_ids
            .iter()
            .filter(|id| !table.rows.contains_key(*id))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(StoreError::RecordsNotFound {
                record_type: record_type.clone(),
                ids: missing,
            });
        }
        check_inbound_references(&state.tables, record_type, record_ids)?;
        if let Some(table) = state.tables.get_mut(record_type) {
            for id in record_ids {
                table.delete_row(id);
            }
        }
        tracing::debug!(
            "deleted {} records from '{record_type}'",
            record_ids.len()
        );
        Ok(())
    }

    // ---- internals ----

    fn build_table(
        &self,
        record_type: &RecordType,
        columns: Vec<Column>,
        relations: Vec<RelationDef>,
        primary_key: Option<&str>,
    ) -> Result<RecordTable, StoreError> {
        let primary_key = match primary_key {
            Some(name) => {
                validate_identifier(name)?;
                name.to_string()
            }
            None => self.config.default_primary_key.clone(),
        };
        let mut table = RecordTable::new(record_type.clone(), primary_key);
        for column in columns {
            // callers sometimes include the primary key among the
            // attributes; the record id is authoritative
            if column.name == table.primary_key {
                continue;
            }
            validate_identifier(&column.name)?;
            table.add_column(Column {
                name: column.name,
                mapping: column.mapping.storage_form(),
            })?;
        }
        for def in relations {
            validate_identifier(&def.attribute)?;
            prepare_relation_column(&mut table, &def)?;
            table.add_relation(def)?;
        }
        Ok(table)
    }
}

fn lookup_table<'a>(
    collections: &'a RwLockReadGuard<'_, Collections>,
    collection: Uuid,
    record_type: &RecordType,
) -> Result<&'a RecordTable, StoreError> {
    collections
        .get(&collection)
        .ok_or(StoreError::CollectionNotFound(collection))?
        .tables
        .get(record_type)
        .ok_or_else(|| StoreError::TypeNotFound(record_type.clone()))
}

/// Every relation target must exist in the collection; the type being
/// written counts as existing so self-references work.
fn verify_relation_targets(
    tables: &HashMap<RecordType, RecordTable>,
    record_type: &RecordType,
    relations: &[RelationDef],
) -> Result<(), StoreError> {
    for def in relations {
        if def.target != *record_type && !tables.contains_key(&def.target) {
            return Err(StoreError::MissingRelationTarget {
                attribute: def.attribute.clone(),
                target: def.target.clone(),
            });
        }
    }
    Ok(())
}

/// A ONE relation needs its inline reference column; add it when
/// absent, reject when the attribute exists as a non-relation column.
fn prepare_relation_column(table: &mut RecordTable, def: &RelationDef) -> Result<(), StoreError> {
    if def.cardinality != Cardinality::One {
        return Ok(());
    }
    let expected = DataTypeMapping::Relation(def.target.clone());
    match table.schema.mapping(&def.attribute) {
        Some(mapping) if *mapping == expected => Ok(()),
        Some(_) => Err(StoreError::RelationToExistingColumn {
            attribute: def.attribute.clone(),
        }),
        None => {
            table.add_column(Column {
                name: def.attribute.clone(),
                mapping: expected,
            })?;
            Ok(())
        }
    }
}

/// Upserts a chunk into the working table. Values are coerced to their
/// columns; array relation attributes replace the record's join rows.
fn upsert_records(
    table: &mut RecordTable,
    records: &[Record],
    scheme: &str,
) -> Result<(u64, u64), StoreError> {
    let mut inserted = 0u64;
    let mut updated = 0u64;
    for record in records {
        let mut column_updates: Vec<(String, Value)> = Vec::new();
        for (attribute, value) in record.attributes().iter() {
            if *attribute == table.primary_key {
                continue;
            }
            let many_relation = table
                .schema
                .relation(attribute)
                .filter(|r| r.cardinality == Cardinality::Many)
                .cloned();
            if let Some(relation) = many_relation {
                let to_ids = reference_ids(value, &relation, scheme)?;
                if let Some(join) = table.joins.get_mut(attribute) {
                    join.replace_from(record.id(), to_ids);
                }
                continue;
            }
            match table.schema.mapping(attribute) {
                Some(mapping) => {
                    column_updates.push((attribute.clone(), coerce_value(value, mapping, scheme)?));
                }
                // reconciliation plans no column for attributes observed
                // only as null
                None if value.is_null() => {}
                None => {
                    return Err(StoreError::storage(
                        "batch upsert",
                        format!(
                            "no column for attribute '{attribute}' in '{}'",
                            table.name
                        ),
                    ))
                }
            }
        }
        if table.upsert_row(record.id(), column_updates) {
            inserted += 1;
        } else {
            updated += 1;
        }
    }
    Ok((inserted, updated))
}

/// Extracts the referenced ids an array relation attribute carries for
/// one record. Explicit null clears; a single reference counts as a
/// one-element list.
fn reference_ids(
    value: &Value,
    relation: &RelationDef,
    scheme: &str,
) -> Result<Vec<String>, StoreError> {
    let parse_one = |item: &Value| -> Result<String, StoreError> {
        let raw = item.as_str().unwrap_or_default();
        match RelationRef::parse(raw, scheme) {
            Some(reference) if reference.target == relation.target => Ok(reference.id),
            _ => Err(StoreError::storage(
                "batch upsert",
                format!(
                    "attribute '{}' expects references to '{}', got {item}",
                    relation.attribute, relation.target
                ),
            )),
        }
    };
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items.iter().map(parse_one).collect(),
        single => Ok(vec![parse_one(single)?]),
    }
}

/// Deferred referential check for the records touched by a chunk:
/// every inline reference and join row must point at an existing row,
/// with self-references resolved against the updated working table.
fn validate_chunk_references(
    tables: &HashMap<RecordType, RecordTable>,
    working: &RecordTable,
    records: &[Record],
) -> Result<(), StoreError> {
    for relation in working.schema.relations() {
        let target_table = if relation.target == working.name {
            working
        } else {
            match tables.get(&relation.target) {
                Some(table) => table,
                None => {
                    return Err(StoreError::MissingRelationTarget {
                        attribute: relation.attribute.clone(),
                        target: relation.target.clone(),
                    })
                }
            }
        };
        for record in records {
            let referenced: Vec<&str> = match relation.cardinality {
                Cardinality::One => working
                    .rows
                    .get(record.id())
                    .and_then(|row| row.get(&relation.attribute))
                    .and_then(Value::as_str)
                    .into_iter()
                    .collect(),
                Cardinality::Many => working
                    .joins
                    .get(&relation.attribute)
                    .map(|join| join.targets_of(record.id()))
                    .unwrap_or_default(),
            };
            for to_id in referenced {
                if !target_table.rows.contains_key(to_id) {
                    return Err(StoreError::storage(
                        "foreign key",
                        format!(
                            "attribute '{}' of record '{}' references missing record '{}' in '{}'",
                            relation.attribute,
                            record.id(),
                            to_id,
                            relation.target
                        ),
                    ));
                }
            }
        }
    }
    Ok(())
}

/// Rejects the deletion of records that rows outside the batch still
/// reference.
fn check_inbound_references(
    tables: &HashMap<RecordType, RecordTable>,
    record_type: &RecordType,
    batch: &[String],
) -> Result<(), StoreError> {
    for id in batch {
        for (name, table) in tables {
            let exclude: &[String] = if name == record_type { batch } else { &[] };
            if table.references_record(record_type, id, exclude) {
                return Err(StoreError::RecordInUse {
                    record_type: record_type.clone(),
                    record_id: id.clone(),
                });
            }
        }
    }
    Ok(())
}
