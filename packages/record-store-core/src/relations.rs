//! Relation reference grammar and per-chunk relation classification.
//!
//! A relation reference is a string of the form
//! `<scheme>:/<recordType>/<recordId>`. Within one chunk, an attribute
//! is either fully relational towards a single target type or not
//! relational at all; anything in between is rejected rather than
//! silently degraded.

use record_model::{Record, RecordType};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::error::StoreError;
use crate::schema::Cardinality;

/// A parsed relation reference: target record type plus record id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationRef {
    /// Referenced record type
    pub target: RecordType,
    /// Referenced record id
    pub id: String,
}

impl RelationRef {
    /// Parses `<scheme>:/<recordType>/<recordId>`; returns `None` when
    /// the string does not match the grammar exactly (wrong scheme,
    /// missing or extra path segments, invalid type name, empty id).
    pub fn parse(raw: &str, scheme: &str) -> Option<Self> {
        let rest = raw.strip_prefix(scheme)?.strip_prefix(":/")?;
        let (type_name, id) = rest.split_once('/')?;
        if id.is_empty() || id.contains('/') {
            return None;
        }
        let target = RecordType::new(type_name).ok()?;
        Some(Self {
            target,
            id: id.to_string(),
        })
    }

    /// Formats this reference back into the grammar.
    pub fn to_reference_string(&self, scheme: &str) -> String {
        format!("{scheme}:/{}/{}", self.target, self.id)
    }
}

/// Builds a reference string for the given target and id.
pub fn reference_string(target: &RecordType, id: &str, scheme: &str) -> String {
    format!("{scheme}:/{target}/{id}")
}

/// Returns `true` if the value is a string matching the reference
/// grammar.
pub fn is_reference(value: &Value, scheme: &str) -> bool {
    matches!(value, Value::String(s) if RelationRef::parse(s, scheme).is_some())
}

/// Outcome of classifying one attribute as relational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDecision {
    /// Attribute holding the references
    pub attribute: String,
    /// The single target type all references point to
    pub target: RecordType,
    /// `Many` as soon as any observed value in the chunk is an array
    pub cardinality: Cardinality,
}

#[derive(Debug, Default)]
struct AttributeObservations {
    scalar_refs: usize,
    array_refs: usize,
    plain: usize,
    empty_arrays: usize,
    targets: BTreeSet<RecordType>,
}

/// Classifies every relational attribute in a chunk.
///
/// Fails on attributes that mix references with plain values, reference
/// more than one target type, or reference a type that neither exists
/// nor is the type being written (self-references are allowed).
pub fn classify_relations(
    records: &[Record],
    scheme: &str,
    known_types: &HashSet<RecordType>,
    self_type: &RecordType,
) -> Result<Vec<RelationDecision>, StoreError> {
    let mut order: Vec<String> = Vec::new();
    let mut observed: BTreeMap<String, AttributeObservations> = BTreeMap::new();

    for record in records {
        for (attribute, value) in record.attributes().iter() {
            if !observed.contains_key(attribute) {
                order.push(attribute.clone());
            }
            let stats = observed.entry(attribute.clone()).or_default();
            match value {
                Value::Null => {}
                Value::String(s) => match RelationRef::parse(s, scheme) {
                    Some(reference) => {
                        stats.scalar_refs += 1;
                        stats.targets.insert(reference.target);
                    }
                    None => stats.plain += 1,
                },
                Value::Array(items) => {
                    if items.is_empty() {
                        stats.empty_arrays += 1;
                    } else {
                        let mut refs = 0;
                        let mut non_refs = 0;
                        for item in items {
                            match item {
                                Value::String(s) => match RelationRef::parse(s, scheme) {
                                    Some(reference) => {
                                        refs += 1;
                                        stats.targets.insert(reference.target);
                                    }
                                    None => non_refs += 1,
                                },
                                _ => non_refs += 1,
                            }
                        }
                        if refs > 0 && non_refs > 0 {
                            return Err(StoreError::MixedRelationValues {
                                attribute: attribute.clone(),
                            });
                        }
                        if refs > 0 {
                            stats.array_refs += 1;
                        } else {
                            stats.plain += 1;
                        }
                    }
                }
                _ => stats.plain += 1,
            }
        }
    }

    let mut decisions = Vec::new();
    for attribute in order {
        let stats = match observed.get(&attribute) {
            Some(stats) => stats,
            None => continue,
        };
        if stats.scalar_refs + stats.array_refs == 0 {
            continue;
        }
        if stats.plain > 0 {
            return Err(StoreError::MixedRelationValues { attribute });
        }
        if stats.targets.len() > 1 {
            return Err(StoreError::AmbiguousRelation { attribute });
        }
        let target = match stats.targets.iter().next() {
            Some(target) => target.clone(),
            None => continue,
        };
        if target != *self_type && !known_types.contains(&target) {
            return Err(StoreError::MissingRelationTarget { attribute, target });
        }
        // an empty array is an empty reference list once the attribute
        // is known to be relational
        let cardinality = if stats.array_refs > 0 || stats.empty_arrays > 0 {
            Cardinality::Many
        } else {
            Cardinality::One
        };
        decisions.push(RelationDecision {
            attribute,
            target,
            cardinality,
        });
    }
    Ok(decisions)
}
