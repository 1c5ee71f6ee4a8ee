//! What the builder hands to a storage engine.

use std::collections::BTreeMap;
use std::fmt;

use keybridge_types::{KeySpec, TableName, TableSchema};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Domain tag for descriptor fingerprints.
const FINGERPRINT_DOMAIN: &str = "keybridge-descriptor-v1";

/// One table of a store: its key and the record shape it passes through.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub key: KeySpec,
    pub schema: TableSchema,
}

/// Everything an engine needs to materialize a named, versioned store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreDescriptor {
    pub name: String,
    pub version: u32,
    pub tables: BTreeMap<TableName, TableDescriptor>,
}

impl StoreDescriptor {
    pub fn new(
        name: impl Into<String>,
        version: u32,
        tables: BTreeMap<TableName, TableDescriptor>,
    ) -> Self {
        Self {
            name: name.into(),
            version,
            tables,
        }
    }

    /// Key specifications by table.
    pub fn key_specs(&self) -> BTreeMap<TableName, KeySpec> {
        self.tables
            .iter()
            .map(|(name, table)| (name.clone(), table.key.clone()))
            .collect()
    }

    /// Domain-separated BLAKE3 hash of the table layout.
    ///
    /// Name and version are excluded, so two descriptors with the same
    /// tables and keys share a fingerprint.
    pub fn fingerprint(&self) -> StoreResult<Fingerprint> {
        let data = serde_json::to_vec(&self.tables)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let mut hasher = blake3::Hasher::new();
        hasher.update(FINGERPRINT_DOMAIN.as_bytes());
        hasher.update(b":");
        hasher.update(&data);
        Ok(Fingerprint(*hasher.finalize().as_bytes()))
    }
}

/// Fingerprint of a store's table layout.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First 8 hex characters.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.short_hex())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keybridge_types::{FieldDef, FieldName, ValueType};

    fn descriptor(name: &str, version: u32, key: &str) -> StoreDescriptor {
        let schema = TableSchema::new()
            .with_field(FieldName::new("id").unwrap(), FieldDef::generated(ValueType::Number))
            .with_field(FieldName::new("uuid").unwrap(), FieldDef::generated(ValueType::Text));
        let mut tables = BTreeMap::new();
        tables.insert(
            TableName::new("users").unwrap(),
            TableDescriptor {
                key: KeySpec::external(FieldName::new(key).unwrap()),
                schema,
            },
        );
        StoreDescriptor::new(name, version, tables)
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let a = descriptor("shop", 1, "id").fingerprint().unwrap();
        let b = descriptor("shop", 1, "id").fingerprint().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn fingerprint_ignores_name_and_version() {
        let a = descriptor("shop", 1, "id").fingerprint().unwrap();
        let b = descriptor("archive", 7, "id").fingerprint().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn fingerprint_tracks_key_choice() {
        let a = descriptor("shop", 1, "id").fingerprint().unwrap();
        let b = descriptor("shop", 1, "uuid").fingerprint().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn key_specs_lists_every_table() {
        let specs = descriptor("shop", 1, "uuid").key_specs();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs["users"].field_name(), "uuid");
    }

    #[test]
    fn fingerprint_hex_lengths() {
        let fp = descriptor("shop", 1, "id").fingerprint().unwrap();
        assert_eq!(fp.to_hex().len(), 64);
        assert_eq!(fp.short_hex().len(), 8);
    }
}
