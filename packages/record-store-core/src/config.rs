//! Engine configuration.

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Records per ingestion chunk
    pub chunk_size: usize,
    /// Scheme prefix of the relation reference grammar
    /// (`<scheme>:/<recordType>/<recordId>`)
    pub relation_scheme: String,
    /// Primary-key column used when a type is created without an
    /// explicit one
    pub default_primary_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            chunk_size: 5000,
            relation_scheme: "rel".to_string(),
            default_primary_key: "sys_id".to_string(),
        }
    }
}
