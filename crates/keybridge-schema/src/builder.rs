use std::collections::BTreeMap;
use std::sync::Arc;

use keybridge_store::{StorageEngine, StoreDescriptor, StoreHandle};
use keybridge_types::{KeySpec, SchemaSet, TableName};
use tracing::info;

use crate::config::ResolutionConfig;
use crate::detect::{detect_all, CandidateKeySet};
use crate::emit::{describe, emit};
use crate::error::{BuildResult, ResolutionError};
use crate::mapping::KeyMapping;
use crate::resolver::{KeyResolver, ResolutionReport, ValidatedMapping};
use crate::stage::ResolutionStage;

// ---------------------------------------------------------------------------
// Builder states
// ---------------------------------------------------------------------------

/// No schema bound yet.
pub struct Unbound;

/// Schema bound, key mapping not yet resolved.
pub struct SchemaBound {
    schemas: SchemaSet,
}

/// Key mapping validated; the builder can materialize stores.
pub struct KeysBound {
    validated: ValidatedMapping,
}

// ---------------------------------------------------------------------------
// StoreBuilder
// ---------------------------------------------------------------------------

/// Staged construction of a store handle.
///
/// The stages are encoded in the type, so `build` only exists once a key
/// mapping has been validated against the bound schema:
///
/// ```text
/// StoreBuilder<Unbound> --schema--> StoreBuilder<SchemaBound>
///                       --keys----> StoreBuilder<KeysBound> --build--> StoreHandle
/// ```
pub struct StoreBuilder<S> {
    engine: Arc<dyn StorageEngine>,
    resolver: KeyResolver,
    state: S,
}

impl StoreBuilder<Unbound> {
    /// Start a builder that will materialize stores on `engine`.
    pub fn new(engine: Arc<dyn StorageEngine>) -> Self {
        Self {
            engine,
            resolver: KeyResolver::default(),
            state: Unbound,
        }
    }

    /// Replace the resolution configuration.
    ///
    /// Stages added with [`Self::with_stage`] before this call are dropped.
    pub fn with_config(mut self, config: ResolutionConfig) -> Self {
        self.resolver = KeyResolver::new(config);
        self
    }

    /// Append a custom resolution stage after the built-in ones.
    pub fn with_stage(mut self, stage: Box<dyn ResolutionStage>) -> Self {
        self.resolver.add_stage(stage);
        self
    }

    /// Bind the table schemas. Nothing is validated yet.
    pub fn schema(self, schemas: SchemaSet) -> StoreBuilder<SchemaBound> {
        StoreBuilder {
            engine: self.engine,
            resolver: self.resolver,
            state: SchemaBound { schemas },
        }
    }
}

impl StoreBuilder<SchemaBound> {
    /// The bound schemas.
    pub fn schemas(&self) -> &SchemaSet {
        &self.state.schemas
    }

    /// Candidate keys of every bound table.
    pub fn candidates(&self) -> BTreeMap<TableName, CandidateKeySet> {
        detect_all(&self.state.schemas)
    }

    /// Every issue `mapping` would raise, without consuming the builder.
    pub fn diagnose(&self, mapping: &KeyMapping) -> ResolutionReport {
        self.resolver.diagnose(&self.state.schemas, mapping)
    }

    /// Resolve the key mapping.
    ///
    /// On failure the builder is consumed and no store can be built from it.
    pub fn keys(self, mapping: KeyMapping) -> Result<StoreBuilder<KeysBound>, ResolutionError> {
        let validated = self.resolver.validate(&self.state.schemas, &mapping)?;
        Ok(StoreBuilder {
            engine: self.engine,
            resolver: self.resolver,
            state: KeysBound { validated },
        })
    }
}

impl StoreBuilder<KeysBound> {
    pub fn validated(&self) -> &ValidatedMapping {
        &self.state.validated
    }

    /// The key specifications `build` will hand to the engine.
    pub fn key_specs(&self) -> BTreeMap<TableName, KeySpec> {
        emit(&self.state.validated)
    }

    /// The full descriptor for a store called `name` at `version`.
    pub fn descriptor(&self, name: &str, version: u32) -> BuildResult<StoreDescriptor> {
        describe(&self.state.validated, name, version)
    }

    /// Materialize a store.
    ///
    /// Specs are emitted afresh on every call. Each call returns an
    /// independent handle; the engine decides what a repeated or higher
    /// version means for `name`.
    pub fn build(&self, name: &str, version: u32) -> BuildResult<StoreHandle> {
        let descriptor = self.descriptor(name, version)?;
        let handle = self.engine.materialize(&descriptor)?;
        info!(
            store = %handle.name(),
            version = handle.version(),
            tables = descriptor.tables.len(),
            fingerprint = %handle.fingerprint().short_hex(),
            "store materialized"
        );
        Ok(handle)
    }
}

/// Bind, resolve and build in one call with the default configuration.
pub fn open_store(
    engine: Arc<dyn StorageEngine>,
    schemas: SchemaSet,
    mapping: KeyMapping,
    name: &str,
    version: u32,
) -> BuildResult<StoreHandle> {
    StoreBuilder::new(engine)
        .schema(schemas)
        .keys(mapping)?
        .build(name, version)
}
