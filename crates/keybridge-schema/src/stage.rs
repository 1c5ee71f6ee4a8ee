use std::collections::BTreeMap;

use keybridge_types::{SchemaSet, TableName};
use serde::Serialize;

use crate::config::{Exposure, ResolutionConfig};
use crate::detect::CandidateKeySet;
use crate::error::ResolutionError;
use crate::mapping::KeyMapping;

// ---------------------------------------------------------------------------
// StageResult
// ---------------------------------------------------------------------------

/// Recorded outcome of one stage in a diagnosis run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StageResult {
    /// Name of the stage that produced this result.
    pub stage_name: String,
    /// Number of issues the stage reported.
    pub issues: usize,
}

impl StageResult {
    pub fn passed(&self) -> bool {
        self.issues == 0
    }
}

// ---------------------------------------------------------------------------
// ResolutionContext
// ---------------------------------------------------------------------------

/// Inputs shared by every stage of one resolution run.
///
/// Candidate sets are computed once per run and handed to each stage; they
/// are never carried over to the next run.
pub struct ResolutionContext<'a> {
    pub schemas: &'a SchemaSet,
    pub mapping: &'a KeyMapping,
    pub candidates: &'a BTreeMap<TableName, CandidateKeySet>,
    pub config: &'a ResolutionConfig,
}

impl<'a> ResolutionContext<'a> {
    /// Candidate keys of a declared table.
    pub fn candidates_for(&self, table: &str) -> Option<&'a CandidateKeySet> {
        self.candidates.get(table)
    }

    /// Whether `table` ends up in the materialized store.
    pub fn is_exposed(&self, table: &str) -> bool {
        match self.config.exposure {
            Exposure::AllTables => self.schemas.contains(table),
            Exposure::MappedOnly => self.schemas.contains(table) && self.mapping.contains(table),
        }
    }
}

// ---------------------------------------------------------------------------
// ResolutionStage trait
// ---------------------------------------------------------------------------

/// One check in the resolution pipeline.
///
/// Stages run in order. Each reports every issue it finds, in table-name
/// order; the resolver decides whether to stop at the first one.
///
/// The trait is object-safe and `Send + Sync` so stages can be stored in a
/// `Vec<Box<dyn ResolutionStage>>`.
pub trait ResolutionStage: Send + Sync {
    /// Human-readable name of this stage (e.g. "table", "candidate").
    fn name(&self) -> &str;

    /// Inspect the mapping and return the issues found.
    fn inspect(&self, context: &ResolutionContext<'_>) -> Vec<ResolutionError>;
}
