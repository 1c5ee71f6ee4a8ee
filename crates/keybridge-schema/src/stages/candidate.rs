use tracing::debug;

use crate::error::ResolutionError;
use crate::stage::{ResolutionContext, ResolutionStage};

/// Checks each mapped table's choice against its candidate keys.
///
/// A table with no candidates fails with [`ResolutionError::NoCandidateKey`]
/// whatever field was chosen. Otherwise the chosen field must be one of the
/// candidates. Unknown tables are left to [`TableStage`](super::TableStage).
pub struct CandidateStage;

impl ResolutionStage for CandidateStage {
    fn name(&self) -> &str {
        "candidate"
    }

    fn inspect(&self, context: &ResolutionContext<'_>) -> Vec<ResolutionError> {
        let mut issues = Vec::new();

        for (table, field) in context.mapping.iter() {
            let Some(candidates) = context.candidates_for(table.as_str()) else {
                continue;
            };

            if candidates.is_empty() {
                issues.push(ResolutionError::NoCandidateKey {
                    table: table.clone(),
                });
            } else if !candidates.contains(field.as_str()) {
                issues.push(ResolutionError::InvalidKeyChoice {
                    table: table.clone(),
                    field: field.clone(),
                    candidates: candidates.clone(),
                });
            } else {
                debug!(table = %table, field = %field, "key choice accepted");
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolutionConfig;
    use crate::stages::fixtures::{field, mapping, run, schemas};

    fn inspect(pairs: &[(&str, &str)]) -> Vec<ResolutionError> {
        run(
            &CandidateStage,
            &schemas(),
            &mapping(pairs),
            &ResolutionConfig::default(),
        )
    }

    #[test]
    fn either_candidate_of_an_ambiguous_table_is_accepted() {
        assert!(inspect(&[("ambiguous_items", "id1")]).is_empty());
        assert!(inspect(&[("ambiguous_items", "id2")]).is_empty());
    }

    #[test]
    fn plain_field_is_an_invalid_choice() {
        let issues = inspect(&[("ambiguous_items", "description")]);
        assert_eq!(issues.len(), 1);
        match &issues[0] {
            ResolutionError::InvalidKeyChoice {
                table,
                field: chosen,
                candidates,
            } => {
                assert_eq!(table, "ambiguous_items");
                assert_eq!(*chosen, field("description"));
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("expected InvalidKeyChoice, got {other:?}"),
        }
    }

    #[test]
    fn missing_field_is_an_invalid_choice() {
        let issues = inspect(&[("users", "email")]);
        assert!(matches!(
            issues.as_slice(),
            [ResolutionError::InvalidKeyChoice { .. }]
        ));
    }

    #[test]
    fn keyless_table_fails_whatever_the_choice() {
        for chosen in ["message", "id", "anything"] {
            let issues = inspect(&[("logs", chosen)]);
            assert!(
                matches!(issues.as_slice(), [ResolutionError::NoCandidateKey { table }] if table == "logs"),
                "choice {chosen} gave {issues:?}"
            );
        }
    }

    #[test]
    fn unknown_tables_are_skipped() {
        assert!(inspect(&[("orders", "id")]).is_empty());
    }
}
