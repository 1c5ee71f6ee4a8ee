use crate::config::Exposure;
use crate::error::ResolutionError;
use crate::stage::{ResolutionContext, ResolutionStage};

/// Requires a key choice for every exposed table.
///
/// Under [`Exposure::AllTables`] every schema table is exposed, so unmapped
/// tables fail: with [`ResolutionError::NoCandidateKey`] if nothing could
/// ever be chosen, else with [`ResolutionError::UnresolvedTable`] listing the
/// candidates. Under [`Exposure::MappedOnly`] this stage never reports.
pub struct CoverageStage;

impl ResolutionStage for CoverageStage {
    fn name(&self) -> &str {
        "coverage"
    }

    fn inspect(&self, context: &ResolutionContext<'_>) -> Vec<ResolutionError> {
        if context.config.exposure == Exposure::MappedOnly {
            return Vec::new();
        }

        context
            .candidates
            .iter()
            .filter(|(table, _)| !context.mapping.contains(table.as_str()))
            .map(|(table, candidates)| {
                if candidates.is_empty() {
                    ResolutionError::NoCandidateKey {
                        table: table.clone(),
                    }
                } else {
                    ResolutionError::UnresolvedTable {
                        table: table.clone(),
                        candidates: candidates.clone(),
                    }
                }
            })
            .collect()
    }
}
