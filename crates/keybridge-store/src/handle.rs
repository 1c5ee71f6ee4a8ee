//! Materialized stores and their key-enforcing tables.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use keybridge_types::{KeySpec, Record, RecordKey, TableName};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::descriptor::Fingerprint;
use crate::error::{StoreError, StoreResult};
use crate::traits::TableStore;

/// One table of a materialized store.
///
/// Every write extracts the key from the record's resolved key field. A
/// record without that field is rejected with
/// [`StoreError::KeyMissingOnInsert`]; the store never generates a key.
pub struct Table {
    name: TableName,
    key: KeySpec,
    backend: Arc<dyn TableStore>,
}

impl Table {
    pub fn new(name: TableName, key: KeySpec, backend: Arc<dyn TableStore>) -> Self {
        Self { name, key, backend }
    }

    pub fn name(&self) -> &TableName {
        &self.name
    }

    pub fn key_spec(&self) -> &KeySpec {
        &self.key
    }

    /// Insert a new record and return its key.
    ///
    /// `explicit_key`, when given, must equal the key found in the record; it
    /// never stands in for a missing key field.
    pub fn add(&self, record: Record, explicit_key: Option<RecordKey>) -> StoreResult<RecordKey> {
        let key = self.extract_key(&record)?;
        if let Some(explicit) = explicit_key {
            if explicit != key {
                return Err(StoreError::KeyConflict {
                    table: self.name.clone(),
                    explicit,
                    in_record: key,
                });
            }
        }

        if !self.backend.insert(key.clone(), record)? {
            return Err(self.duplicate(key));
        }
        debug!(table = %self.name, key = %key, "record added");
        Ok(key)
    }

    /// Insert or replace a record and return its key.
    pub fn put(&self, record: Record) -> StoreResult<RecordKey> {
        let key = self.extract_key(&record)?;
        self.backend.upsert(key.clone(), record)?;
        debug!(table = %self.name, key = %key, "record put");
        Ok(key)
    }

    /// Insert several new records.
    ///
    /// Every record is checked for a key, for duplicates within the batch and
    /// for keys already stored before the first one is written. If a write
    /// still fails (a concurrent writer took the key, or the backend errors),
    /// the records already written by this call are removed again.
    pub fn bulk_add(&self, records: Vec<Record>) -> StoreResult<Vec<RecordKey>> {
        let mut keyed = Vec::with_capacity(records.len());
        let mut seen = BTreeSet::new();
        for record in records {
            let key = self.extract_key(&record)?;
            if !seen.insert(key.clone()) || self.backend.contains(&key)? {
                return Err(self.duplicate(key));
            }
            keyed.push((key, record));
        }

        let mut keys = Vec::with_capacity(keyed.len());
        for (key, record) in keyed {
            let failure = match self.backend.insert(key.clone(), record) {
                Ok(true) => {
                    keys.push(key);
                    continue;
                }
                Ok(false) => self.duplicate(key),
                Err(e) => e,
            };
            self.roll_back(&keys);
            return Err(failure);
        }
        debug!(table = %self.name, count = keys.len(), "records bulk added");
        Ok(keys)
    }

    /// Read a record by key.
    pub fn get(&self, key: &RecordKey) -> StoreResult<Option<Record>> {
        self.backend.read(key)
    }

    /// Delete a record. Returns `true` if it existed.
    pub fn delete(&self, key: &RecordKey) -> StoreResult<bool> {
        self.backend.remove(key)
    }

    pub fn count(&self) -> StoreResult<usize> {
        self.backend.len()
    }

    pub fn clear(&self) -> StoreResult<()> {
        self.backend.clear()
    }

    /// All records in key order. Each call takes a fresh snapshot.
    pub fn to_array(&self) -> StoreResult<Vec<Record>> {
        Ok(self
            .backend
            .scan()?
            .into_iter()
            .map(|(_, record)| record)
            .collect())
    }

    fn roll_back(&self, written: &[RecordKey]) {
        for key in written {
            if let Err(e) = self.backend.remove(key) {
                warn!(table = %self.name, key = %key, error = %e, "bulk add rollback failed");
            }
        }
        debug!(table = %self.name, count = written.len(), "bulk add rolled back");
    }

    fn duplicate(&self, key: RecordKey) -> StoreError {
        StoreError::DuplicateKey {
            table: self.name.clone(),
            key,
        }
    }

    fn extract_key(&self, record: &Record) -> StoreResult<RecordKey> {
        let field = self.key.field_name();
        let value = record
            .get(field.as_str())
            .ok_or_else(|| StoreError::KeyMissingOnInsert {
                table: self.name.clone(),
                field: field.clone(),
            })?;

        RecordKey::from_value(value).map_err(|source| StoreError::InvalidKey {
            table: self.name.clone(),
            field: field.clone(),
            source,
        })
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name)
            .field("key", &self.key)
            .finish()
    }
}

/// A materialized, named, versioned store.
///
/// Each handle is an independent storage instance identified by a UUID v7.
#[derive(Debug)]
pub struct StoreHandle {
    id: Uuid,
    name: String,
    version: u32,
    fingerprint: Fingerprint,
    tables: BTreeMap<TableName, Table>,
}

impl StoreHandle {
    pub fn new(
        name: String,
        version: u32,
        fingerprint: Fingerprint,
        tables: BTreeMap<TableName, Table>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            name,
            version,
            fingerprint,
            tables,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Look up a table by name.
    pub fn table(&self, name: &str) -> StoreResult<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| StoreError::UnknownTable(name.to_string()))
    }

    pub fn table_names(&self) -> impl Iterator<Item = &TableName> {
        self.tables.keys()
    }

    pub fn key_specs(&self) -> BTreeMap<TableName, KeySpec> {
        self.tables
            .iter()
            .map(|(name, table)| (name.clone(), table.key_spec().clone()))
            .collect()
    }
}
