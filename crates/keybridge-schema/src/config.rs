use serde::{Deserialize, Serialize};

/// Which schema tables end up in the materialized store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exposure {
    /// Every table of the schema set is exposed, so every table needs a key
    /// choice. Tables without candidates make the schema set unusable.
    #[default]
    AllTables,
    /// Only tables named in the key mapping are exposed; the rest are left
    /// out of the store.
    MappedOnly,
}

/// Configuration for the key-resolution pipeline.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    pub exposure: Exposure,
}

impl ResolutionConfig {
    /// Expose only the tables the mapping names.
    ///
    /// Useful when one schema set feeds several stores, each built from a
    /// subset of its tables.
    pub fn mapped_only() -> Self {
        Self {
            exposure: Exposure::MappedOnly,
        }
    }
}
