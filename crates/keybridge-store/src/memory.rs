use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use keybridge_types::{Record, RecordKey, TableName};
use tracing::info;

use crate::descriptor::{Fingerprint, StoreDescriptor, TableDescriptor};
use crate::error::{StoreError, StoreResult};
use crate::traits::{StorageEngine, TableStore};

/// In-memory, BTreeMap-based table storage.
///
/// Records are held behind a `RwLock` and cloned on read and write. Keys are
/// kept in order, so scans return records sorted by key.
pub struct InMemoryTable {
    records: RwLock<BTreeMap<RecordKey, Record>>,
}

impl InMemoryTable {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
        }
    }
}

impl Default for InMemoryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TableStore for InMemoryTable {
    fn insert(&self, key: RecordKey, record: Record) -> StoreResult<bool> {
        let mut map = self.records.write().expect("lock poisoned");
        if map.contains_key(&key) {
            return Ok(false);
        }
        map.insert(key, record);
        Ok(true)
    }

    fn upsert(&self, key: RecordKey, record: Record) -> StoreResult<()> {
        let mut map = self.records.write().expect("lock poisoned");
        map.insert(key, record);
        Ok(())
    }

    fn read(&self, key: &RecordKey) -> StoreResult<Option<Record>> {
        let map = self.records.read().expect("lock poisoned");
        Ok(map.get(key).cloned())
    }

    fn remove(&self, key: &RecordKey) -> StoreResult<bool> {
        let mut map = self.records.write().expect("lock poisoned");
        Ok(map.remove(key).is_some())
    }

    fn scan(&self) -> StoreResult<Vec<(RecordKey, Record)>> {
        let map = self.records.read().expect("lock poisoned");
        Ok(map
            .iter()
            .map(|(key, record)| (key.clone(), record.clone()))
            .collect())
    }

    fn contains(&self, key: &RecordKey) -> StoreResult<bool> {
        let map = self.records.read().expect("lock poisoned");
        Ok(map.contains_key(key))
    }

    fn len(&self) -> StoreResult<usize> {
        Ok(self.records.read().expect("lock poisoned").len())
    }

    fn clear(&self) -> StoreResult<()> {
        self.records.write().expect("lock poisoned").clear();
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.records.read().expect("lock poisoned").len();
        f.debug_struct("InMemoryTable")
            .field("record_count", &count)
            .finish()
    }
}

/// Catalog entry for one store name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CatalogEntry {
    version: u32,
    fingerprint: Fingerprint,
}

/// In-memory storage engine.
///
/// Keeps a catalog of the latest version and layout fingerprint per store
/// name and enforces the versioning rules of the target store:
/// - versions start at 1
/// - a store never goes back to an older version
/// - a layout change requires a version bump
///
/// Every materialization gets fresh tables, so two handles never share
/// records even when built from identical descriptors.
pub struct InMemoryEngine {
    catalog: RwLock<HashMap<String, CatalogEntry>>,
}

impl InMemoryEngine {
    pub fn new() -> Self {
        Self {
            catalog: RwLock::new(HashMap::new()),
        }
    }

    /// Latest version materialized under `name`, if any.
    pub fn current_version(&self, name: &str) -> Option<u32> {
        self.catalog
            .read()
            .expect("lock poisoned")
            .get(name)
            .map(|entry| entry.version)
    }

    /// Number of store names in the catalog.
    pub fn store_count(&self) -> usize {
        self.catalog.read().expect("lock poisoned").len()
    }
}

impl Default for InMemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Version rules against the catalogued entry for the same store name.
fn check_version(
    current: Option<&CatalogEntry>,
    descriptor: &StoreDescriptor,
    fingerprint: Fingerprint,
) -> StoreResult<()> {
    if descriptor.version == 0 {
        return Err(StoreError::InvalidVersion {
            name: descriptor.name.clone(),
            version: descriptor.version,
        });
    }
    let Some(current) = current else {
        return Ok(());
    };
    if descriptor.version < current.version {
        return Err(StoreError::VersionRegression {
            name: descriptor.name.clone(),
            current: current.version,
            requested: descriptor.version,
        });
    }
    if descriptor.version == current.version && fingerprint != current.fingerprint {
        return Err(StoreError::SchemaChangedWithoutVersionBump {
            name: descriptor.name.clone(),
            version: descriptor.version,
        });
    }
    Ok(())
}

impl StorageEngine for InMemoryEngine {
    fn prepare(&self, descriptor: &StoreDescriptor) -> StoreResult<()> {
        let fingerprint = descriptor.fingerprint()?;
        let catalog = self.catalog.read().expect("lock poisoned");
        check_version(catalog.get(&descriptor.name), descriptor, fingerprint)
    }

    fn commit(&self, descriptor: &StoreDescriptor, fingerprint: Fingerprint) -> StoreResult<()> {
        let mut catalog = self.catalog.write().expect("lock poisoned");
        // Re-checked under the write lock; another build may have committed
        // since `prepare`.
        let current = catalog.get(&descriptor.name);
        check_version(current, descriptor, fingerprint)?;

        if let Some(current) = current {
            if descriptor.version > current.version {
                info!(
                    store = %descriptor.name,
                    from = current.version,
                    to = descriptor.version,
                    fingerprint = %fingerprint.short_hex(),
                    "store version upgraded"
                );
            }
        }

        catalog.insert(
            descriptor.name.clone(),
            CatalogEntry {
                version: descriptor.version,
                fingerprint,
            },
        );
        Ok(())
    }

    fn open_table(
        &self,
        _descriptor: &StoreDescriptor,
        _table: &TableName,
        _spec: &TableDescriptor,
    ) -> StoreResult<Arc<dyn TableStore>> {
        Ok(Arc::new(InMemoryTable::new()))
    }
}

impl std::fmt::Debug for InMemoryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryEngine")
            .field("store_count", &self.store_count())
            .finish()
    }
}
