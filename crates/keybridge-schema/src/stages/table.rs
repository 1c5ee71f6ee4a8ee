use crate::error::ResolutionError;
use crate::stage::{ResolutionContext, ResolutionStage};

/// Rejects mapping entries that name tables the schema set does not declare.
pub struct TableStage;

impl ResolutionStage for TableStage {
    fn name(&self) -> &str {
        "table"
    }

    fn inspect(&self, context: &ResolutionContext<'_>) -> Vec<ResolutionError> {
        context
            .mapping
            .iter()
            .filter(|(table, _)| !context.schemas.contains(table.as_str()))
            .map(|(table, _)| ResolutionError::UnknownTable {
                table: table.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolutionConfig;
    use crate::stages::fixtures::{mapping, run, schemas};

    #[test]
    fn known_tables_pass() {
        let issues = run(
            &TableStage,
            &schemas(),
            &mapping(&[("users", "id"), ("logs", "message")]),
            &ResolutionConfig::default(),
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn unknown_tables_are_reported_in_name_order() {
        let issues = run(
            &TableStage,
            &schemas(),
            &mapping(&[("zebras", "id"), ("users", "id"), ("orders", "id")]),
            &ResolutionConfig::default(),
        );
        let tables: Vec<&str> = issues.iter().map(|e| e.table().as_str()).collect();
        assert_eq!(tables, vec!["orders", "zebras"]);
        assert!(issues
            .iter()
            .all(|e| matches!(e, ResolutionError::UnknownTable { .. })));
    }
}
