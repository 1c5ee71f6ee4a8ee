//! Candidate-key detection.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use keybridge_types::{FieldName, SchemaSet, TableName, TableSchema};
use serde::Serialize;
use tracing::debug;

/// The fields of one table eligible to serve as its key.
///
/// May be empty (no viable key), a singleton, or ambiguous (more than one
/// candidate, requiring an explicit choice).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CandidateKeySet(BTreeSet<FieldName>);

impl CandidateKeySet {
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// More than one candidate.
    pub fn is_ambiguous(&self) -> bool {
        self.0.len() > 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldName> {
        self.0.iter()
    }
}

impl FromIterator<FieldName> for CandidateKeySet {
    fn from_iter<I: IntoIterator<Item = FieldName>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for CandidateKeySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, field) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{field}")?;
        }
        f.write_str("}")
    }
}

/// The set of fields tagged `Generated` in `table`.
pub fn detect(table: &TableSchema) -> CandidateKeySet {
    table
        .generated_fields()
        .map(|(name, _)| name.clone())
        .collect()
}

/// Candidate keys for every table of the set.
pub fn detect_all(schemas: &SchemaSet) -> BTreeMap<TableName, CandidateKeySet> {
    schemas
        .iter()
        .map(|(name, table)| {
            let candidates = detect(table);
            debug!(table = %name, candidates = %candidates, "detected candidate keys");
            (name.clone(), candidates)
        })
        .collect()
}
