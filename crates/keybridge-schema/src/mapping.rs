use std::collections::BTreeMap;

use keybridge_types::{FieldName, TableName};
use serde::{Deserialize, Serialize};

/// The caller's key choice: one field name per table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyMapping(BTreeMap<TableName, FieldName>);

impl KeyMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose `field` as the key of `table`, returning the updated mapping.
    pub fn with(mut self, table: TableName, field: FieldName) -> Self {
        self.0.insert(table, field);
        self
    }

    /// Choose `field` as the key of `table`, returning any previous choice.
    pub fn insert(&mut self, table: TableName, field: FieldName) -> Option<FieldName> {
        self.0.insert(table, field)
    }

    pub fn get(&self, table: &str) -> Option<&FieldName> {
        self.0.get(table)
    }

    pub fn contains(&self, table: &str) -> bool {
        self.0.contains_key(table)
    }

    /// Choices in table-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&TableName, &FieldName)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(TableName, FieldName)> for KeyMapping {
    fn from_iter<I: IntoIterator<Item = (TableName, FieldName)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_choice_replaces_earlier() {
        let mut mapping = KeyMapping::new().with(
            TableName::new("items").unwrap(),
            FieldName::new("id1").unwrap(),
        );
        let previous = mapping.insert(
            TableName::new("items").unwrap(),
            FieldName::new("id2").unwrap(),
        );
        assert_eq!(previous.unwrap(), "id1");
        assert_eq!(mapping.get("items").unwrap(), "id2");
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    fn deserializes_from_flat_table() {
        let mapping: KeyMapping = toml::from_str(
            r#"
            users = "id"
            products = "sku"
            "#,
        )
        .unwrap();
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.get("products").unwrap(), "sku");
        let tables: Vec<&str> = mapping.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(tables, vec!["products", "users"]);
    }
}
