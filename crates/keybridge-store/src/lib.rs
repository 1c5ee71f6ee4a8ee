//! Storage-engine seam for Keybridge.
//!
//! The key-value storage engine is an external collaborator. This crate
//! defines what Keybridge hands to it and what it hands back:
//!
//! - [`StoreDescriptor`] -- name, version and per-table key specs plus record shape
//! - [`StorageEngine`] -- materializes a descriptor into a [`StoreHandle`]
//! - [`TableStore`] -- per-table key-value backend
//! - [`Table`] -- key-enforcing front for a backend (`add`, `get`, `to_array`, ...)
//!
//! # Storage Backends
//!
//! - [`InMemoryEngine`] / [`InMemoryTable`] -- `BTreeMap`-based, for tests and embedding
//!
//! # Design Rules
//!
//! 1. Keys are always supplied by the caller inside the record; nothing here
//!    generates a key.
//! 2. A record without its key field is rejected, never silently dropped.
//! 3. Backends never interpret records -- they are pure key-value maps.
//! 4. Version reconciliation belongs to the engine.

pub mod descriptor;
pub mod error;
pub mod handle;
pub mod memory;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use descriptor::{Fingerprint, StoreDescriptor, TableDescriptor};
pub use error::{StoreError, StoreResult};
pub use handle::{StoreHandle, Table};
pub use memory::{InMemoryEngine, InMemoryTable};
pub use traits::{StorageEngine, TableStore};
