//! Value coercion between incoming attribute values and typed columns.
//!
//! Reconciliation guarantees that every value in a committed chunk fits
//! its column after widening, so coercion failures here indicate a
//! mismatch between plan and data and surface as storage errors.

use record_model::DataTypeMapping;
use serde_json::Value;

use crate::error::StoreError;
use crate::inference::{is_date, is_date_time};
use crate::relations::{reference_string, RelationRef};

fn mismatch(expected: &DataTypeMapping, value: &Value) -> StoreError {
    StoreError::storage(
        "value coercion",
        format!("expected {expected}, got incompatible value {value}"),
    )
}

/// Renders any scalar value as text. Arrays and objects become their
/// JSON representation.
fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Coerces an incoming value into the stored representation for a
/// column of the given mapping.
///
/// Relation columns store the bare referenced id; the full reference
/// string is reconstructed on read.
pub(crate) fn coerce_value(
    value: &Value,
    mapping: &DataTypeMapping,
    scheme: &str,
) -> Result<Value, StoreError> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    match mapping {
        DataTypeMapping::Boolean => match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
            _ => Err(mismatch(mapping, value)),
        },
        DataTypeMapping::Number => match value {
            Value::Number(_) => Ok(value.clone()),
            Value::String(s) => serde_json::from_str::<serde_json::Number>(s.trim())
                .map(Value::Number)
                .map_err(|_| mismatch(mapping, value)),
            _ => Err(mismatch(mapping, value)),
        },
        DataTypeMapping::Date => match value {
            Value::String(s) if is_date(s) => Ok(value.clone()),
            _ => Err(mismatch(mapping, value)),
        },
        DataTypeMapping::DateTime => match value {
            Value::String(s) if is_date_time(s) => Ok(value.clone()),
            _ => Err(mismatch(mapping, value)),
        },
        DataTypeMapping::String => Ok(Value::String(to_text(value))),
        DataTypeMapping::Json => match value {
            Value::Object(_) => Ok(value.clone()),
            _ => Err(mismatch(mapping, value)),
        },
        DataTypeMapping::Relation(target) => match value {
            Value::String(s) => {
                let reference = RelationRef::parse(s, scheme).ok_or_else(|| mismatch(mapping, value))?;
                if reference.target != *target {
                    return Err(mismatch(mapping, value));
                }
                Ok(Value::String(reference.id))
            }
            _ => Err(mismatch(mapping, value)),
        },
        DataTypeMapping::ArrayOfBoolean
        | DataTypeMapping::ArrayOfNumber
        | DataTypeMapping::ArrayOfDate
        | DataTypeMapping::ArrayOfDateTime
        | DataTypeMapping::ArrayOfString
        | DataTypeMapping::ArrayOfJson => match (value, mapping.element_type()) {
            (Value::Array(items), Some(element)) => {
                let coerced = items
                    .iter()
                    .map(|item| coerce_value(item, &element, scheme))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(coerced))
            }
            _ => Err(mismatch(mapping, value)),
        },
        // null columns are persisted as text, empty arrays as text
        // arrays, and array relations live in join tables only
        DataTypeMapping::Null
        | DataTypeMapping::EmptyArray
        | DataTypeMapping::ArrayOfRelation(_) => Err(StoreError::storage(
            "value coercion",
            format!("mapping {mapping} is not a storable column type"),
        )),
    }
}

/// Renders a stored value back into its caller-visible form: relation
/// columns expand the bare id into the full reference string.
pub(crate) fn render_stored(
    stored: &Value,
    mapping: &DataTypeMapping,
    scheme: &str,
) -> Value {
    match (mapping, stored) {
        (DataTypeMapping::Relation(target), Value::String(id)) => {
            Value::String(reference_string(target, id, scheme))
        }
        _ => stored.clone(),
    }
}

/// Re-coerces a stored value after its column widened from `old` to
/// `new`, going through the caller-visible form so no information is
/// lost (a relation id becomes a full reference string before turning
/// into text).
pub(crate) fn recoerce_stored(
    stored: &Value,
    old: &DataTypeMapping,
    new: &DataTypeMapping,
    scheme: &str,
) -> Result<Value, StoreError> {
    let logical = render_stored(stored, old, scheme);
    coerce_value(&logical, new, scheme)
}
