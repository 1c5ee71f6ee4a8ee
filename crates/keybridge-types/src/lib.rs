//! Foundation types for Keybridge.
//!
//! Keybridge maps relational-style table schemas, in which some fields are
//! marked as system-generated identifiers, onto a key-value store that needs
//! exactly one caller-supplied unique key per table. Every other Keybridge
//! crate depends on `keybridge-types`.
//!
//! # Key Types
//!
//! - [`TableName`] / [`FieldName`] -- Validated identifiers
//! - [`FieldKind`] -- `Generated` (candidate key) or `Plain` (data)
//! - [`TableSchema`] / [`SchemaSet`] -- Field descriptors per table
//! - [`KeySpec`] -- Emitted per-table primary-key specification
//! - [`RecordKey`] -- Concrete key value extracted from a record

pub mod error;
pub mod key;
pub mod name;
pub mod schema;

pub use error::TypeError;
pub use key::{KeySpec, Record, RecordKey};
pub use name::{FieldName, TableName};
pub use schema::{FieldDef, FieldKind, SchemaSet, TableSchema, ValueType};
