use std::collections::BTreeMap;
use std::sync::Arc;

use keybridge_types::{Record, RecordKey, TableName};

use crate::descriptor::{Fingerprint, StoreDescriptor, TableDescriptor};
use crate::error::StoreResult;
use crate::handle::{StoreHandle, Table};

/// Record storage for a single table.
///
/// Backends are plain key-value maps. They never look inside records and
/// never generate keys: the key is always extracted and checked by
/// [`Table`] before a backend sees the record.
pub trait TableStore: Send + Sync {
    /// Insert a new record.
    ///
    /// Returns `Ok(false)` and leaves the stored record untouched if the key
    /// is already present.
    fn insert(&self, key: RecordKey, record: Record) -> StoreResult<bool>;

    /// Insert or replace a record.
    fn upsert(&self, key: RecordKey, record: Record) -> StoreResult<()>;

    /// Read a record by key. Returns `Ok(None)` if absent.
    fn read(&self, key: &RecordKey) -> StoreResult<Option<Record>>;

    /// Delete a record. Returns `true` if it existed.
    fn remove(&self, key: &RecordKey) -> StoreResult<bool>;

    /// All records in key order.
    fn scan(&self) -> StoreResult<Vec<(RecordKey, Record)>>;

    /// Returns `true` if a record with this key exists.
    fn contains(&self, key: &RecordKey) -> StoreResult<bool> {
        Ok(self.read(key)?.is_some())
    }

    /// Number of records.
    fn len(&self) -> StoreResult<usize> {
        Ok(self.scan()?.len())
    }

    /// Remove every record.
    fn clear(&self) -> StoreResult<()>;
}

/// A key-value storage engine able to materialize stores from descriptors.
///
/// The engine owns version reconciliation: re-opening a store name at a
/// higher version is a migration the engine performs or rejects.
pub trait StorageEngine: Send + Sync {
    /// Check the descriptor against the engine's catalog before any table is
    /// opened. The default accepts everything.
    ///
    /// Must not change engine state: a table may still fail to open.
    fn prepare(&self, _descriptor: &StoreDescriptor) -> StoreResult<()> {
        Ok(())
    }

    /// Record a materialization once every table has been opened.
    fn commit(&self, _descriptor: &StoreDescriptor, _fingerprint: Fingerprint) -> StoreResult<()> {
        Ok(())
    }

    /// Open (or create) the backing storage for one table.
    fn open_table(
        &self,
        descriptor: &StoreDescriptor,
        table: &TableName,
        spec: &TableDescriptor,
    ) -> StoreResult<Arc<dyn TableStore>>;

    /// Materialize every table of the descriptor into a [`StoreHandle`].
    ///
    /// Runs `prepare`, opens every table, then `commit`s. Nothing is
    /// committed if any table fails to open.
    fn materialize(&self, descriptor: &StoreDescriptor) -> StoreResult<StoreHandle> {
        self.prepare(descriptor)?;
        let fingerprint = descriptor.fingerprint()?;

        let mut tables = BTreeMap::new();
        for (name, spec) in &descriptor.tables {
            let backend = self.open_table(descriptor, name, spec)?;
            tables.insert(
                name.clone(),
                Table::new(name.clone(), spec.key.clone(), backend),
            );
        }
        self.commit(descriptor, fingerprint)?;

        Ok(StoreHandle::new(
            descriptor.name.clone(),
            descriptor.version,
            fingerprint,
            tables,
        ))
    }
}
