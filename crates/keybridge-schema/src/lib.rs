//! Candidate-key inference and key resolution for Keybridge.
//!
//! Bridges relational-style table schemas, where several fields may be
//! marked as system-generated identifiers, to a key-value store that needs
//! exactly one caller-supplied unique key per table.
//!
//! # Pipeline
//!
//! 1. [`detect`] -- the candidate keys of a table (its `Generated` fields)
//! 2. [`KeyResolver`] -- checks a [`KeyMapping`] against every table's
//!    candidates through ordered [`ResolutionStage`]s
//! 3. [`emit`] -- one externally supplied, unique [`KeySpec`] per exposed table
//! 4. [`StoreBuilder`] -- binds schema, then keys, then builds a named,
//!    versioned [`StoreHandle`]
//!
//! Ambiguity is never resolved by heuristics: a table with several
//! candidates needs an explicit choice, and a table with none cannot be
//! keyed at all.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use keybridge_schema::{KeyMapping, StoreBuilder};
//! use keybridge_store::InMemoryEngine;
//! use keybridge_types::{FieldDef, FieldName, SchemaSet, TableName, TableSchema, ValueType};
//!
//! let users = TableName::new("users").unwrap();
//! let id = FieldName::new("id").unwrap();
//! let schemas = SchemaSet::new().with_table(
//!     users.clone(),
//!     TableSchema::new()
//!         .with_field(id.clone(), FieldDef::generated(ValueType::Number))
//!         .with_field(FieldName::new("name").unwrap(), FieldDef::plain(ValueType::Text)),
//! );
//!
//! let store = StoreBuilder::new(Arc::new(InMemoryEngine::new()))
//!     .schema(schemas)
//!     .keys(KeyMapping::new().with(users, id))
//!     .unwrap()
//!     .build("app", 1)
//!     .unwrap();
//!
//! let record = serde_json::json!({"id": 123, "name": "Alice"});
//! let key = store
//!     .table("users")
//!     .unwrap()
//!     .add(record.as_object().unwrap().clone(), None)
//!     .unwrap();
//! assert_eq!(key.to_string(), "123");
//! ```
//!
//! [`KeySpec`]: keybridge_types::KeySpec
//! [`StoreHandle`]: keybridge_store::StoreHandle

pub mod builder;
pub mod config;
pub mod detect;
pub mod emit;
pub mod error;
pub mod mapping;
pub mod resolver;
pub mod stage;
pub mod stages;

pub use builder::{open_store, KeysBound, SchemaBound, StoreBuilder, Unbound};
pub use config::{Exposure, ResolutionConfig};
pub use detect::{detect, detect_all, CandidateKeySet};
pub use emit::{describe, emit};
pub use error::{BuildError, BuildResult, ResolutionError};
pub use mapping::KeyMapping;
pub use resolver::{KeyResolver, ResolutionReport, ResolvedKey, ValidatedMapping};
pub use stage::{ResolutionContext, ResolutionStage, StageResult};
