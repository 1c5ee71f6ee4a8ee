//! Store-schema emission.

use std::collections::BTreeMap;

use keybridge_store::{StoreDescriptor, TableDescriptor};
use keybridge_types::{name::validate_identifier, KeySpec, TableName, TypeError};

use crate::error::{BuildError, BuildResult};
use crate::resolver::ValidatedMapping;

/// One key specification per exposed table.
///
/// Every spec is unique and externally supplied, whatever the key field's
/// declared value type. Nothing emitted here ever auto-increments.
pub fn emit(validated: &ValidatedMapping) -> BTreeMap<TableName, KeySpec> {
    validated
        .iter()
        .map(|(table, resolved)| (table.clone(), KeySpec::external(resolved.field.clone())))
        .collect()
}

/// The descriptor handed to a storage engine: emitted keys plus the record
/// shape of each exposed table.
///
/// Store names follow the identifier rules of table and field names.
pub fn describe(
    validated: &ValidatedMapping,
    name: &str,
    version: u32,
) -> BuildResult<StoreDescriptor> {
    check_store_name(name)?;
    let tables = emit(validated)
        .into_iter()
        .filter_map(|(table, key)| {
            let schema = validated.schema(table.as_str())?.clone();
            Some((table, TableDescriptor { key, schema }))
        })
        .collect();
    Ok(StoreDescriptor::new(name, version, tables))
}

fn check_store_name(name: &str) -> BuildResult<()> {
    validate_identifier(name).map_err(|e| BuildError::InvalidStoreName {
        name: name.to_string(),
        reason: match e {
            TypeError::InvalidIdentifier { reason, .. } => reason,
            other => other.to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::KeyResolver;
    use crate::stages::fixtures::{field, mapping, table};
    use crate::ResolutionConfig;
    use keybridge_types::{FieldDef, SchemaSet, TableSchema, ValueType};
    use proptest::prelude::*;

    fn validated(schemas: &SchemaSet, pairs: &[(&str, &str)]) -> ValidatedMapping {
        KeyResolver::default()
            .validate(schemas, &mapping(pairs))
            .unwrap()
    }

    #[test]
    fn numeric_key_is_externally_supplied() {
        let schemas = SchemaSet::new().with_table(
            table("users"),
            TableSchema::new()
                .with_field(field("id"), FieldDef::generated(ValueType::Number))
                .with_field(field("name"), FieldDef::plain(ValueType::Text)),
        );
        let specs = emit(&validated(&schemas, &[("users", "id")]));

        let spec = &specs["users"];
        assert_eq!(spec.field_name(), "id");
        assert!(spec.unique());
        assert!(spec.externally_supplied());
        assert!(!spec.auto_increment());
    }

    #[test]
    fn describe_carries_record_shape() {
        let schemas = SchemaSet::new().with_table(
            table("products"),
            TableSchema::new()
                .with_field(field("sku"), FieldDef::generated(ValueType::Text))
                .with_field(field("name"), FieldDef::plain(ValueType::Text))
                .with_field(field("price"), FieldDef::plain(ValueType::Number)),
        );
        let descriptor = describe(&validated(&schemas, &[("products", "sku")]), "shop", 3).unwrap();

        assert_eq!(descriptor.name, "shop");
        assert_eq!(descriptor.version, 3);
        let products = &descriptor.tables["products"];
        assert_eq!(products.key.field_name(), "sku");
        assert_eq!(products.schema.len(), 3);
    }

    #[test]
    fn describe_only_includes_exposed_tables() {
        let schemas = SchemaSet::new()
            .with_table(
                table("users"),
                TableSchema::new().with_field(field("id"), FieldDef::generated(ValueType::Number)),
            )
            .with_table(
                table("logs"),
                TableSchema::new().with_field(field("message"), FieldDef::plain(ValueType::Text)),
            );
        let validated = KeyResolver::new(ResolutionConfig::mapped_only())
            .validate(&schemas, &mapping(&[("users", "id")]))
            .unwrap();
        let descriptor = describe(&validated, "app", 1).unwrap();
        assert_eq!(descriptor.tables.len(), 1);
        assert!(descriptor.tables.contains_key("users"));
    }

    #[test]
    fn describe_rejects_invalid_store_names() {
        let schemas = SchemaSet::new().with_table(
            table("users"),
            TableSchema::new().with_field(field("id"), FieldDef::generated(ValueType::Number)),
        );
        let validated = validated(&schemas, &[("users", "id")]);
        for name in ["", "a.b", " shop", "shop\t"] {
            assert!(
                matches!(
                    describe(&validated, name, 1),
                    Err(BuildError::InvalidStoreName { .. })
                ),
                "name {name:?} was accepted"
            );
        }
    }

    fn value_type() -> impl Strategy<Value = ValueType> {
        prop_oneof![
            Just(ValueType::Number),
            Just(ValueType::Text),
            Just(ValueType::Boolean),
            Just(ValueType::Timestamp),
            Just(ValueType::Json),
        ]
    }

    proptest! {
        #[test]
        fn emitted_keys_are_always_external(types in prop::collection::vec(value_type(), 1..8)) {
            let mut schemas = SchemaSet::new();
            let mut pairs = Vec::new();
            for (i, ty) in types.iter().enumerate() {
                let name = format!("t{i}");
                schemas.insert(
                    table(&name),
                    TableSchema::new().with_field(field("key"), FieldDef::generated(*ty)),
                );
                pairs.push((table(&name), field("key")));
            }
            let validated = KeyResolver::default()
                .validate(&schemas, &pairs.into_iter().collect())
                .unwrap();

            let specs = emit(&validated);
            prop_assert_eq!(specs.len(), types.len());
            for spec in specs.values() {
                prop_assert!(spec.unique());
                prop_assert!(spec.externally_supplied());
                prop_assert!(!spec.auto_increment());
            }
        }
    }
}
