use keybridge_types::{FieldName, RecordKey, TableName, TypeError};

/// Errors from store construction and record operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store has no table with this name.
    #[error("unknown table: {0}")]
    UnknownTable(String),

    /// A record was submitted without its resolved key field.
    #[error("record for table '{table}' is missing key field '{field}'")]
    KeyMissingOnInsert { table: TableName, field: FieldName },

    /// The key field is present but does not hold a usable key.
    #[error("invalid key in field '{field}' of table '{table}': {source}")]
    InvalidKey {
        table: TableName,
        field: FieldName,
        #[source]
        source: TypeError,
    },

    /// An explicit key was passed that disagrees with the record's key field.
    #[error("explicit key {explicit} does not match record key {in_record} in table '{table}'")]
    KeyConflict {
        table: TableName,
        explicit: RecordKey,
        in_record: RecordKey,
    },

    /// A record with this key already exists.
    #[error("duplicate key {key} in table '{table}'")]
    DuplicateKey { table: TableName, key: RecordKey },

    /// Store versions start at 1.
    #[error("invalid version {version} for store '{name}': versions start at 1")]
    InvalidVersion { name: String, version: u32 },

    /// The store already exists at a newer version.
    #[error("store '{name}' is at version {current}, cannot open version {requested}")]
    VersionRegression {
        name: String,
        current: u32,
        requested: u32,
    },

    /// Key specifications changed but the version did not.
    #[error("store '{name}' version {version} already exists with different key specifications")]
    SchemaChangedWithoutVersionBump { name: String, version: u32 },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Failure reported by the storage backend.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
