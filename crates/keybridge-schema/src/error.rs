use keybridge_store::StoreError;
use keybridge_types::{FieldName, TableName};
use serde::Serialize;

use crate::detect::CandidateKeySet;

/// Errors raised while resolving a key mapping against a schema set.
///
/// Every variant names the offending table, and the field where one is
/// involved, so a mapping can be corrected without re-deriving candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ResolutionError {
    /// The table has no generated field, so no key can ever be chosen.
    #[error("table '{table}' has no generated field and cannot be given a key")]
    NoCandidateKey { table: TableName },

    /// The chosen field is not one of the table's candidate keys.
    #[error("field '{field}' is not a candidate key of table '{table}' (candidates: {candidates})")]
    InvalidKeyChoice {
        table: TableName,
        field: FieldName,
        candidates: CandidateKeySet,
    },

    /// The mapping names a table the schema set does not declare.
    #[error("key mapping references unknown table '{table}'")]
    UnknownTable { table: TableName },

    /// A table that will be exposed has no key choice in the mapping.
    #[error("table '{table}' needs an explicit key choice (candidates: {candidates})")]
    UnresolvedTable {
        table: TableName,
        candidates: CandidateKeySet,
    },

    /// A custom stage rejected the table.
    #[error("stage '{stage}' rejected table '{table}': {reason}")]
    Rejected {
        stage: String,
        table: TableName,
        reason: String,
    },
}

impl ResolutionError {
    /// The table the error is about.
    pub fn table(&self) -> &TableName {
        match self {
            Self::NoCandidateKey { table }
            | Self::InvalidKeyChoice { table, .. }
            | Self::UnknownTable { table }
            | Self::UnresolvedTable { table, .. }
            | Self::Rejected { table, .. } => table,
        }
    }

    /// Stable short code for tooling output. Matches the serialized tag.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoCandidateKey { .. } => "no_candidate_key",
            Self::InvalidKeyChoice { .. } => "invalid_key_choice",
            Self::UnknownTable { .. } => "unknown_table",
            Self::UnresolvedTable { .. } => "unresolved_table",
            Self::Rejected { .. } => "rejected",
        }
    }
}

/// Errors from the terminal build step.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("key resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("invalid store name {name:?}: {reason}")]
    InvalidStoreName { name: String, reason: String },
}

/// Result alias for build operations.
pub type BuildResult<T> = Result<T, BuildError>;
