//! Schema reconciliation: the diff between what a chunk contains and
//! what already exists.
//!
//! Reconciliation is a pure function of the chunk plus the persisted
//! schema, which is why repeated and multi-batch imports converge to
//! the same final schema regardless of chunk boundaries or ordering.

use std::collections::{HashMap, HashSet};

use record_model::record_type::validate_identifier;
use record_model::{DataTypeMapping, Record, RecordType};

use crate::error::StoreError;
use crate::inference::DataTypeInferer;
use crate::relations::{classify_relations, RelationDecision};
use crate::schema::{Cardinality, RelationDef, Schema};

/// One structural operation required before a chunk can be written.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileStep {
    /// Create a column
    AddColumn {
        name: String,
        mapping: DataTypeMapping,
    },
    /// Widen an existing column
    WidenColumn {
        name: String,
        from: DataTypeMapping,
        to: DataTypeMapping,
    },
    /// Register a relation (foreign key or join table)
    AddRelation { def: RelationDef },
}

/// Ordered structural operations for one chunk: new columns first,
/// then widenings, then relations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationPlan {
    pub steps: Vec<ReconcileStep>,
}

impl ReconciliationPlan {
    /// Returns `true` when the chunk requires no structural change.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Computes the minimal set of structural operations required before
/// the chunk can be written.
///
/// Attributes observed only as null plan nothing. Established
/// relations are sticky: retargeting or escalating a single-reference
/// relation to an array relation fails, while single references
/// arriving for an established array relation are accepted as
/// one-element values.
pub fn plan_chunk(
    persisted: &Schema,
    primary_key: &str,
    records: &[Record],
    known_types: &HashSet<RecordType>,
    self_type: &RecordType,
    inferer: &DataTypeInferer,
) -> Result<ReconciliationPlan, StoreError> {
    let inferred = inferer.infer_records(records);
    let decisions = classify_relations(records, inferer.scheme(), known_types, self_type)?;
    let decision_by_attribute: HashMap<&str, &RelationDecision> = decisions
        .iter()
        .map(|d| (d.attribute.as_str(), d))
        .collect();

    let mut add_columns = Vec::new();
    let mut widenings = Vec::new();
    let mut add_relations = Vec::new();

    for column in &inferred {
        let attribute = &column.name;
        if attribute == primary_key {
            continue;
        }

        if let Some(decision) = decision_by_attribute.get(attribute.as_str()) {
            match persisted.relation(attribute) {
                Some(existing) => {
                    if existing.target != decision.target {
                        return Err(StoreError::RelationTargetChanged {
                            attribute: attribute.clone(),
                            established: existing.target.clone(),
                            requested: decision.target.clone(),
                        });
                    }
                    if existing.cardinality == Cardinality::One
                        && decision.cardinality == Cardinality::Many
                    {
                        return Err(StoreError::RelationCardinalityChanged {
                            attribute: attribute.clone(),
                        });
                    }
                    // identical shape, or single references flowing
                    // into an established array relation
                }
                None => {
                    if persisted.column(attribute).is_some() {
                        return Err(StoreError::RelationToExistingColumn {
                            attribute: attribute.clone(),
                        });
                    }
                    validate_identifier(attribute)?;
                    let def = RelationDef {
                        attribute: attribute.clone(),
                        target: decision.target.clone(),
                        cardinality: decision.cardinality,
                    };
                    if decision.cardinality == Cardinality::One {
                        add_columns.push(ReconcileStep::AddColumn {
                            name: attribute.clone(),
                            mapping: DataTypeMapping::Relation(decision.target.clone()),
                        });
                    }
                    add_relations.push(ReconcileStep::AddRelation { def });
                }
            }
            continue;
        }

        // non-relational observation
        if let Some(existing) = persisted.relation(attribute) {
            if column.mapping == DataTypeMapping::Null {
                continue;
            }
            match existing.cardinality {
                Cardinality::Many => {
                    // empty arrays are empty reference lists; anything
                    // else cannot flow into a join table
                    if column.mapping == DataTypeMapping::EmptyArray {
                        continue;
                    }
                    return Err(StoreError::MixedRelationValues {
                        attribute: attribute.clone(),
                    });
                }
                Cardinality::One => {
                    if column.mapping.is_array() {
                        return Err(StoreError::RelationCardinalityChanged {
                            attribute: attribute.clone(),
                        });
                    }
                    // the lattice widens the inline relation column
                    // away; the foreign key drops with it
                    let from = DataTypeMapping::Relation(existing.target.clone());
                    let to = from.widen(&column.mapping);
                    widenings.push(ReconcileStep::WidenColumn {
                        name: attribute.clone(),
                        from,
                        to,
                    });
                }
            }
            continue;
        }

        match persisted.column(attribute) {
            Some(existing) => {
                if column.mapping == DataTypeMapping::Null {
                    continue;
                }
                let to = existing.mapping.widen(&column.mapping);
                if to != existing.mapping {
                    widenings.push(ReconcileStep::WidenColumn {
                        name: attribute.clone(),
                        from: existing.mapping.clone(),
                        to,
                    });
                }
            }
            None => {
                // a column only materializes once a non-null value is
                // observed
                if column.mapping == DataTypeMapping::Null {
                    continue;
                }
                validate_identifier(attribute)?;
                add_columns.push(ReconcileStep::AddColumn {
                    name: attribute.clone(),
                    mapping: column.mapping.storage_form(),
                });
            }
        }
    }

    let mut steps = add_columns;
    steps.append(&mut widenings);
    steps.append(&mut add_relations);
    Ok(ReconciliationPlan { steps })
}
