//! Relational-style table schemas.
//!
//! A [`TableSchema`] is a named set of field descriptors. Each field carries a
//! [`FieldKind`] tag marking it as a system-generated identifier candidate or
//! ordinary data, and a [`ValueType`] hint that is passed through to the
//! storage engine's record shape without being interpreted.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::name::{FieldName, TableName};

/// Role of a field in the source schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// A system-assigned identifier, eligible as a candidate key.
    Generated,
    /// Ordinary data.
    Plain,
}

impl FieldKind {
    /// Returns `true` for [`FieldKind::Generated`].
    pub fn is_generated(&self) -> bool {
        matches!(self, Self::Generated)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generated => write!(f, "generated"),
            Self::Plain => write!(f, "plain"),
        }
    }
}

/// Declared value type of a field. Documentation only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Number,
    Text,
    Boolean,
    Timestamp,
    #[default]
    Json,
}

impl ValueType {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Timestamp => "timestamp",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A single field descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDef {
    pub kind: FieldKind,
    #[serde(rename = "type", default)]
    pub value_type: ValueType,
}

impl FieldDef {
    /// A system-generated identifier field.
    pub fn generated(value_type: ValueType) -> Self {
        Self {
            kind: FieldKind::Generated,
            value_type,
        }
    }

    /// An ordinary data field.
    pub fn plain(value_type: ValueType) -> Self {
        Self {
            kind: FieldKind::Plain,
            value_type,
        }
    }
}

/// The field set of one table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    #[serde(default)]
    fields: BTreeMap<FieldName, FieldDef>,
}

impl TableSchema {
    /// Create an empty table schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a field, returning the updated schema.
    pub fn with_field(mut self, name: FieldName, def: FieldDef) -> Self {
        self.fields.insert(name, def);
        self
    }

    /// Add (or replace) a field in place.
    pub fn insert_field(&mut self, name: FieldName, def: FieldDef) -> Option<FieldDef> {
        self.fields.insert(name, def)
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    /// All fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldName, &FieldDef)> {
        self.fields.iter()
    }

    /// Fields tagged [`FieldKind::Generated`], in name order.
    pub fn generated_fields(&self) -> impl Iterator<Item = (&FieldName, &FieldDef)> {
        self.fields.iter().filter(|(_, def)| def.kind.is_generated())
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the table declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(FieldName, FieldDef)> for TableSchema {
    fn from_iter<I: IntoIterator<Item = (FieldName, FieldDef)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// A set of table schemas keyed by table name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaSet {
    tables: BTreeMap<TableName, TableSchema>,
}

impl SchemaSet {
    /// Create an empty schema set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a table, returning the updated set.
    pub fn with_table(mut self, name: TableName, schema: TableSchema) -> Self {
        self.tables.insert(name, schema);
        self
    }

    /// Add (or replace) a table in place.
    pub fn insert(&mut self, name: TableName, schema: TableSchema) -> Option<TableSchema> {
        self.tables.insert(name, schema)
    }

    /// Look up a table by name.
    pub fn get(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name)
    }

    /// Returns `true` if the named table exists.
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Table names in order.
    pub fn tables(&self) -> impl Iterator<Item = &TableName> {
        self.tables.keys()
    }

    /// All tables in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&TableName, &TableSchema)> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl FromIterator<(TableName, TableSchema)> for SchemaSet {
    fn from_iter<I: IntoIterator<Item = (TableName, TableSchema)>>(iter: I) -> Self {
        Self {
            tables: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str) -> FieldName {
        FieldName::new(name).unwrap()
    }

    fn users() -> TableSchema {
        TableSchema::new()
            .with_field(field("id"), FieldDef::generated(ValueType::Number))
            .with_field(field("name"), FieldDef::plain(ValueType::Text))
    }

    #[test]
    fn generated_fields_filters_by_kind() {
        let schema = TableSchema::new()
            .with_field(field("a"), FieldDef::plain(ValueType::Text))
            .with_field(field("b"), FieldDef::generated(ValueType::Number))
            .with_field(field("c"), FieldDef::generated(ValueType::Text));

        let names: Vec<&str> = schema.generated_fields().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn with_field_replaces_existing() {
        let schema = users().with_field(field("id"), FieldDef::plain(ValueType::Number));
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.field("id").unwrap().kind, FieldKind::Plain);
    }

    #[test]
    fn schema_set_lookup() {
        let set = SchemaSet::new().with_table(TableName::new("users").unwrap(), users());
        assert!(set.contains("users"));
        assert!(!set.contains("logs"));
        assert_eq!(set.get("users").unwrap().len(), 2);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn field_def_deserializes_with_default_type() {
        let def: FieldDef = serde_json::from_str(r#"{"kind":"generated"}"#).unwrap();
        assert_eq!(def, FieldDef::generated(ValueType::Json));

        let def: FieldDef =
            serde_json::from_str(r#"{"kind":"plain","type":"boolean"}"#).unwrap();
        assert_eq!(def, FieldDef::plain(ValueType::Boolean));
    }

    #[test]
    fn schema_set_deserializes_from_toml() {
        let text = r#"
            [users.fields]
            id = { kind = "generated", type = "number" }
            name = { kind = "plain", type = "text" }

            [logs.fields]
            message = { kind = "plain", type = "text" }
        "#;
        let set: SchemaSet = toml::from_str(text).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("users").unwrap(), &users());
        assert_eq!(set.get("logs").unwrap().generated_fields().count(), 0);
    }

    #[test]
    fn schema_set_rejects_invalid_table_names() {
        let result = serde_json::from_str::<SchemaSet>(r#"{"a.b": {"fields": {}}}"#);
        assert!(result.is_err());
    }
}
