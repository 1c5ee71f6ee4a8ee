use std::collections::BTreeMap;

use keybridge_types::{FieldName, SchemaSet, TableName, TableSchema, ValueType};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ResolutionConfig;
use crate::detect::{detect_all, CandidateKeySet};
use crate::error::ResolutionError;
use crate::mapping::KeyMapping;
use crate::stage::{ResolutionContext, ResolutionStage, StageResult};
use crate::stages::{CandidateStage, CoverageStage, TableStage};

// ---------------------------------------------------------------------------
// ValidatedMapping
// ---------------------------------------------------------------------------

/// The resolved key of one exposed table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedKey {
    /// The chosen key field.
    pub field: FieldName,
    /// Declared value type of the key field. Informational only.
    pub value_type: ValueType,
    /// All candidates the choice was made from.
    pub candidates: CandidateKeySet,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct ResolvedTable {
    key: ResolvedKey,
    schema: TableSchema,
}

/// A key mapping that passed every resolution stage.
///
/// Only [`KeyResolver::validate`] produces one, so holding a
/// `ValidatedMapping` means every exposed table has exactly one key field
/// drawn from its candidates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedMapping {
    tables: BTreeMap<TableName, ResolvedTable>,
}

impl ValidatedMapping {
    /// The resolved key of `table`, if it is exposed.
    pub fn get(&self, table: &str) -> Option<&ResolvedKey> {
        self.tables.get(table).map(|t| &t.key)
    }

    /// Record shape of an exposed table.
    pub fn schema(&self, table: &str) -> Option<&TableSchema> {
        self.tables.get(table).map(|t| &t.schema)
    }

    /// Exposed tables and their keys in table-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&TableName, &ResolvedKey)> {
        self.tables.iter().map(|(name, t)| (name, &t.key))
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableName> {
        self.tables.keys()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ResolutionReport
// ---------------------------------------------------------------------------

/// Everything a diagnosis run found.
#[derive(Clone, Debug, Serialize)]
pub struct ResolutionReport {
    /// Candidate keys of every schema table.
    pub candidates: BTreeMap<TableName, CandidateKeySet>,
    /// Issues in stage order, then table-name order.
    pub issues: Vec<ResolutionError>,
    /// Per-stage results in evaluation order.
    pub stage_results: Vec<StageResult>,
}

impl ResolutionReport {
    /// `true` when no stage reported an issue.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issues concerning one table.
    pub fn issues_for<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a ResolutionError> {
        self.issues.iter().filter(move |e| e.table() == table)
    }
}

// ---------------------------------------------------------------------------
// KeyResolver
// ---------------------------------------------------------------------------

/// Validates key mappings against schema sets.
///
/// Runs an ordered pipeline of [`ResolutionStage`]s. The built-in stages
/// are always present and run first:
/// table -> candidate -> coverage
///
/// Extra stages appended with [`Self::add_stage`] can only narrow what is
/// accepted.
pub struct KeyResolver {
    stages: Vec<Box<dyn ResolutionStage>>,
    config: ResolutionConfig,
}

impl KeyResolver {
    /// Create a resolver with the built-in stages.
    pub fn new(config: ResolutionConfig) -> Self {
        Self {
            stages: vec![
                Box::new(TableStage),
                Box::new(CandidateStage),
                Box::new(CoverageStage),
            ],
            config,
        }
    }

    /// Append a stage to the end of the pipeline.
    pub fn add_stage(&mut self, stage: Box<dyn ResolutionStage>) {
        self.stages.push(stage);
    }

    /// The current configuration.
    pub fn config(&self) -> &ResolutionConfig {
        &self.config
    }

    /// Number of stages in the pipeline.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Validate `mapping` against `schemas`.
    ///
    /// Fail-fast: the first issue of the first failing stage is returned.
    /// Candidate keys are detected afresh on every call.
    pub fn validate(
        &self,
        schemas: &SchemaSet,
        mapping: &KeyMapping,
    ) -> Result<ValidatedMapping, ResolutionError> {
        let candidates = detect_all(schemas);
        let context = self.context(schemas, mapping, &candidates);

        for stage in &self.stages {
            if let Some(issue) = stage.inspect(&context).into_iter().next() {
                warn!(
                    stage = stage.name(),
                    table = %issue.table(),
                    error = %issue,
                    "key mapping rejected"
                );
                return Err(issue);
            }
            debug!(stage = stage.name(), "resolution stage passed");
        }

        assemble(&context)
    }

    /// Run every stage and collect all issues instead of stopping at the
    /// first one.
    pub fn diagnose(&self, schemas: &SchemaSet, mapping: &KeyMapping) -> ResolutionReport {
        let candidates = detect_all(schemas);
        let context = self.context(schemas, mapping, &candidates);

        let mut issues = Vec::new();
        let mut stage_results = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            let found = stage.inspect(&context);
            stage_results.push(StageResult {
                stage_name: stage.name().to_string(),
                issues: found.len(),
            });
            issues.extend(found);
        }

        ResolutionReport {
            candidates,
            issues,
            stage_results,
        }
    }

    fn context<'a>(
        &'a self,
        schemas: &'a SchemaSet,
        mapping: &'a KeyMapping,
        candidates: &'a BTreeMap<TableName, CandidateKeySet>,
    ) -> ResolutionContext<'a> {
        ResolutionContext {
            schemas,
            mapping,
            candidates,
            config: &self.config,
        }
    }
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::new(ResolutionConfig::default())
    }
}

/// Collect the exposed tables once every stage has passed.
///
/// The built-in stages already guarantee each lookup succeeds; the errors
/// here keep the result sound even so.
fn assemble(context: &ResolutionContext<'_>) -> Result<ValidatedMapping, ResolutionError> {
    let mut tables = BTreeMap::new();

    for (table, field) in context.mapping.iter() {
        if !context.is_exposed(table.as_str()) {
            continue;
        }
        let schema = context
            .schemas
            .get(table.as_str())
            .ok_or_else(|| ResolutionError::UnknownTable {
                table: table.clone(),
            })?;
        let candidates = context
            .candidates_for(table.as_str())
            .cloned()
            .unwrap_or_default();

        let def = schema
            .field(field.as_str())
            .filter(|_| candidates.contains(field.as_str()))
            .ok_or_else(|| {
                if candidates.is_empty() {
                    ResolutionError::NoCandidateKey {
                        table: table.clone(),
                    }
                } else {
                    ResolutionError::InvalidKeyChoice {
                        table: table.clone(),
                        field: field.clone(),
                        candidates: candidates.clone(),
                    }
                }
            })?;

        tables.insert(
            table.clone(),
            ResolvedTable {
                key: ResolvedKey {
                    field: field.clone(),
                    value_type: def.value_type,
                    candidates,
                },
                schema: schema.clone(),
            },
        );
    }

    Ok(ValidatedMapping { tables })
}
