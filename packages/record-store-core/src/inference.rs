//! Data type inference over incoming attribute values.
//!
//! Values arrive loosely typed; the inferer maps each one onto the
//! [`DataTypeMapping`] lattice and folds whole chunks into a
//! chunk-local schema through `widen`.

use chrono::{NaiveDate, NaiveDateTime};
use record_model::{DataTypeMapping, Record};
use serde_json::Value;
use std::collections::HashMap;

use crate::relations::RelationRef;
use crate::schema::Column;

/// Returns `true` if the string is an ISO-8601 local date
/// (`YYYY-MM-DD`).
pub fn is_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// Returns `true` if the string is an ISO-8601 local date-time
/// (`YYYY-MM-DDTHH:MM[:SS[.fraction]]`).
pub fn is_date_time(s: &str) -> bool {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").is_ok()
}

/// Infers [`DataTypeMapping`]s from attribute values.
#[derive(Debug, Clone)]
pub struct DataTypeInferer {
    scheme: String,
}

impl DataTypeInferer {
    /// Creates an inferer recognizing relation references with the
    /// given scheme prefix.
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
        }
    }

    /// The relation reference scheme this inferer recognizes.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Infers the mapping of one attribute value.
    pub fn infer_value(&self, value: &Value) -> DataTypeMapping {
        match value {
            Value::Null => DataTypeMapping::Null,
            Value::Bool(_) => DataTypeMapping::Boolean,
            Value::Number(_) => DataTypeMapping::Number,
            Value::String(s) => self.infer_string(s),
            Value::Array(items) => self.infer_array(items),
            Value::Object(_) => DataTypeMapping::Json,
        }
    }

    /// String inference: relation references and temporal grammars are
    /// recognized; everything else stays text.
    fn infer_string(&self, s: &str) -> DataTypeMapping {
        if let Some(reference) = RelationRef::parse(s, &self.scheme) {
            return DataTypeMapping::Relation(reference.target);
        }
        if is_date(s) {
            return DataTypeMapping::Date;
        }
        if is_date_time(s) {
            return DataTypeMapping::DateTime;
        }
        DataTypeMapping::String
    }

    fn infer_array(&self, items: &[Value]) -> DataTypeMapping {
        if items.is_empty() {
            return DataTypeMapping::EmptyArray;
        }
        let element = items
            .iter()
            .map(|item| self.infer_value(item))
            .fold(DataTypeMapping::Null, |acc, m| acc.widen(&m));
        DataTypeMapping::array_of(element)
    }

    /// Folds a chunk of records into a chunk-local schema, widening
    /// over every observation per attribute. Attributes observed only
    /// as null stay [`DataTypeMapping::Null`].
    ///
    /// Columns are returned in first-seen attribute order.
    pub fn infer_records<'a, I>(&self, records: I) -> Vec<Column>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut order: Vec<String> = Vec::new();
        let mut seen: HashMap<String, DataTypeMapping> = HashMap::new();
        for record in records {
            for (name, value) in record.attributes().iter() {
                let inferred = self.infer_value(value);
                match seen.get_mut(name) {
                    Some(mapping) => *mapping = mapping.widen(&inferred),
                    None => {
                        order.push(name.clone());
                        seen.insert(name.clone(), inferred);
                    }
                }
            }
        }
        order
            .into_iter()
            .map(|name| {
                let mapping = seen.remove(&name).unwrap_or(DataTypeMapping::Null);
                Column { name, mapping }
            })
            .collect()
    }
}
