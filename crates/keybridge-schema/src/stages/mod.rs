//! Built-in resolution stages.

pub mod candidate;
pub mod coverage;
pub mod table;

pub use candidate::CandidateStage;
pub use coverage::CoverageStage;
pub use table::TableStage;

#[cfg(test)]
pub(crate) mod fixtures {
    use std::collections::BTreeMap;

    use keybridge_types::{FieldDef, FieldName, SchemaSet, TableName, TableSchema, ValueType};

    use crate::config::ResolutionConfig;
    use crate::detect::{detect_all, CandidateKeySet};
    use crate::error::ResolutionError;
    use crate::mapping::KeyMapping;
    use crate::stage::{ResolutionContext, ResolutionStage};

    pub fn table(name: &str) -> TableName {
        TableName::new(name).unwrap()
    }

    pub fn field(name: &str) -> FieldName {
        FieldName::new(name).unwrap()
    }

    /// `ambiguous_items` (two candidates), `users` (one) and `logs` (none).
    pub fn schemas() -> SchemaSet {
        SchemaSet::new()
            .with_table(
                table("ambiguous_items"),
                TableSchema::new()
                    .with_field(field("id1"), FieldDef::generated(ValueType::Number))
                    .with_field(field("id2"), FieldDef::generated(ValueType::Text))
                    .with_field(field("description"), FieldDef::plain(ValueType::Text)),
            )
            .with_table(
                table("users"),
                TableSchema::new()
                    .with_field(field("id"), FieldDef::generated(ValueType::Number))
                    .with_field(field("name"), FieldDef::plain(ValueType::Text)),
            )
            .with_table(
                table("logs"),
                TableSchema::new().with_field(field("message"), FieldDef::plain(ValueType::Text)),
            )
    }

    pub fn mapping(pairs: &[(&str, &str)]) -> KeyMapping {
        pairs.iter().map(|(t, f)| (table(t), field(f))).collect()
    }

    pub fn run(
        stage: &dyn ResolutionStage,
        schemas: &SchemaSet,
        mapping: &KeyMapping,
        config: &ResolutionConfig,
    ) -> Vec<ResolutionError> {
        let candidates: BTreeMap<TableName, CandidateKeySet> = detect_all(schemas);
        let context = ResolutionContext {
            schemas,
            mapping,
            candidates: &candidates,
            config,
        };
        stage.inspect(&context)
    }
}
