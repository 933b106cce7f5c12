//! The data type lattice.
//!
//! Every attribute observation maps to a [`DataTypeMapping`], and two
//! observations combine through [`DataTypeMapping::widen`]: the least
//! general mapping that represents both. `widen` is total, commutative,
//! and associative, which makes the converged schema independent of
//! chunk boundaries and chunk ordering.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record_type::RecordType;

/// Inferred or persisted type of one attribute.
///
/// `Null` is the observed-only-as-null sentinel: it never changes a
/// persisted column. `EmptyArray` is the mapping for `[]`, which widens
/// into any array type. `Relation` carries the referenced record type;
/// its array form implies join-table storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataTypeMapping {
    /// Observed only as null; must not affect the persisted column
    Null,
    /// Boolean literal
    Boolean,
    /// Integral or decimal number
    Number,
    /// ISO-8601 local date
    Date,
    /// ISO-8601 local date-time
    DateTime,
    /// Free-form text; the top of the scalar lattice
    String,
    /// Embedded object, stored opaquely
    Json,
    /// Single reference to another record type
    Relation(RecordType),
    /// Array observed only as `[]`; widens into any array type
    EmptyArray,
    /// Array of booleans
    ArrayOfBoolean,
    /// Array of numbers
    ArrayOfNumber,
    /// Array of dates
    ArrayOfDate,
    /// Array of date-times
    ArrayOfDateTime,
    /// Array of text; the top of the array lattice
    ArrayOfString,
    /// Array of embedded objects
    ArrayOfJson,
    /// Array of references to one record type; stored via a join table
    ArrayOfRelation(RecordType),
}

impl DataTypeMapping {
    /// Returns `true` for array mappings, including the empty array.
    pub fn is_array(&self) -> bool {
        matches!(
            self,
            Self::EmptyArray
                | Self::ArrayOfBoolean
                | Self::ArrayOfNumber
                | Self::ArrayOfDate
                | Self::ArrayOfDateTime
                | Self::ArrayOfString
                | Self::ArrayOfJson
                | Self::ArrayOfRelation(_)
        )
    }

    /// Returns `true` for relation mappings, scalar or array.
    pub fn is_relation(&self) -> bool {
        matches!(self, Self::Relation(_) | Self::ArrayOfRelation(_))
    }

    /// Returns the referenced record type for relation mappings.
    pub fn relation_target(&self) -> Option<&RecordType> {
        match self {
            Self::Relation(target) | Self::ArrayOfRelation(target) => Some(target),
            _ => None,
        }
    }

    /// Returns the element mapping of an array mapping.
    ///
    /// `EmptyArray` has element `Null`; scalar mappings have no element.
    pub fn element_type(&self) -> Option<Self> {
        match self {
            Self::EmptyArray => Some(Self::Null),
            Self::ArrayOfBoolean => Some(Self::Boolean),
            Self::ArrayOfNumber => Some(Self::Number),
            Self::ArrayOfDate => Some(Self::Date),
            Self::ArrayOfDateTime => Some(Self::DateTime),
            Self::ArrayOfString => Some(Self::String),
            Self::ArrayOfJson => Some(Self::Json),
            Self::ArrayOfRelation(target) => Some(Self::Relation(target.clone())),
            _ => None,
        }
    }

    /// Returns the array mapping whose elements have the given mapping.
    ///
    /// An array observed only as nulls is stored as text; nested arrays
    /// degrade to text as well.
    pub fn array_of(element: Self) -> Self {
        match element {
            Self::Boolean => Self::ArrayOfBoolean,
            Self::Number => Self::ArrayOfNumber,
            Self::Date => Self::ArrayOfDate,
            Self::DateTime => Self::ArrayOfDateTime,
            Self::String | Self::Null => Self::ArrayOfString,
            Self::Json => Self::ArrayOfJson,
            Self::Relation(target) => Self::ArrayOfRelation(target),
            _ => Self::ArrayOfString,
        }
    }

    /// Returns the mapping actually persisted when this mapping must
    /// become a column on its own: `Null` persists as text and
    /// `EmptyArray` as an array of text.
    pub fn storage_form(&self) -> Self {
        match self {
            Self::Null => Self::String,
            Self::EmptyArray => Self::ArrayOfString,
            other => other.clone(),
        }
    }

    /// Combines two mappings into the least general mapping representing
    /// both.
    ///
    /// Rules: identity on equal mappings; `Null` yields the other
    /// operand; `EmptyArray` joined with an array yields that array; two
    /// array mappings join pairwise over their elements and stay arrays;
    /// an array joined with a scalar is text; relations joined with
    /// anything but an identical relation are text; any two distinct
    /// scalar kinds are text.
    pub fn widen(&self, other: &Self) -> Self {
        if self == other {
            return self.clone();
        }
        match (self, other) {
            (Self::Null, b) => b.clone(),
            (a, Self::Null) => a.clone(),
            (Self::EmptyArray, b) if b.is_array() => b.clone(),
            (a, Self::EmptyArray) if a.is_array() => a.clone(),
            (a, b) if a.is_array() && b.is_array() => {
                match (a.element_type(), b.element_type()) {
                    (Some(ea), Some(eb)) => Self::array_of(ea.widen(&eb)),
                    _ => Self::String,
                }
            }
            _ => Self::String,
        }
    }
}

impl fmt::Display for DataTypeMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Boolean => write!(f, "boolean"),
            Self::Number => write!(f, "number"),
            Self::Date => write!(f, "date"),
            Self::DateTime => write!(f, "datetime"),
            Self::String => write!(f, "string"),
            Self::Json => write!(f, "json"),
            Self::Relation(target) => write!(f, "relation({target})"),
            Self::EmptyArray => write!(f, "empty-array"),
            Self::ArrayOfBoolean => write!(f, "boolean[]"),
            Self::ArrayOfNumber => write!(f, "number[]"),
            Self::ArrayOfDate => write!(f, "date[]"),
            Self::ArrayOfDateTime => write!(f, "datetime[]"),
            Self::ArrayOfString => write!(f, "string[]"),
            Self::ArrayOfJson => write!(f, "json[]"),
            Self::ArrayOfRelation(target) => write!(f, "relation({target})[]"),
        }
    }
}
