//! Validated identifiers for record types and attributes.
//!
//! Identifiers are interpolated into table and column names, so they are
//! validated once at the boundary: length-limited, restricted to a safe
//! character set, and kept away from the reserved system prefix.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Maximum identifier length in bytes.
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// Prefix reserved for system-managed columns and tables.
pub const RESERVED_PREFIX: &str = "sys_";

/// Identifier validation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    /// Empty identifier
    #[error("identifier must not be empty")]
    Empty,

    /// Identifier exceeds the length limit
    #[error("identifier '{name}' exceeds {MAX_IDENTIFIER_LEN} bytes")]
    TooLong { name: String },

    /// Identifier contains a disallowed character
    #[error("identifier '{name}' contains disallowed character '{character}'")]
    DisallowedCharacter { name: String, character: char },

    /// Identifier collides with the reserved system prefix
    #[error("identifier '{name}' uses the reserved '{RESERVED_PREFIX}' prefix")]
    ReservedPrefix { name: String },
}

/// Validates an identifier for use as a table or column name.
///
/// Allowed: a leading ASCII letter or underscore, followed by ASCII
/// letters, digits, underscores, or dashes. Identifiers starting with
/// the reserved system prefix are rejected.
pub fn validate_identifier(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    if name.len() > MAX_IDENTIFIER_LEN {
        return Err(NameError::TooLong {
            name: name.to_string(),
        });
    }
    if name.starts_with(RESERVED_PREFIX) {
        return Err(NameError::ReservedPrefix {
            name: name.to_string(),
        });
    }
    let mut chars = name.chars();
    // first char: letter or underscore
    if let Some(first) = chars.next() {
        if !(first.is_ascii_alphabetic() || first == '_') {
            return Err(NameError::DisallowedCharacter {
                name: name.to_string(),
                character: first,
            });
        }
    }
    for c in chars {
        if !(c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(NameError::DisallowedCharacter {
                name: name.to_string(),
                character: c,
            });
        }
    }
    Ok(())
}

/// Validated name of one record type (one table within a collection).
///
/// Immutable once constructed; construction performs full identifier
/// validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordType(String);

impl RecordType {
    /// Creates a validated record type name.
    pub fn new(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();
        validate_identifier(&name)?;
        Ok(Self(name))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for RecordType {
    type Error = NameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for RecordType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Self::new(name).map_err(serde::de::Error::custom)
    }
}
