use std::fs;
use std::path::Path;

use anyhow::Context;
use keybridge_schema::{KeyMapping, ResolutionConfig};
use keybridge_types::SchemaSet;
use serde::{Deserialize, Serialize};

/// A store definition: name and version, table schemas and key choices.
///
/// ```toml
/// [store]
/// name = "shop"
/// version = 1
///
/// [tables.users.fields]
/// id = { kind = "generated", type = "number" }
///
/// [keys]
/// users = "id"
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub store: StoreSection,
    #[serde(default)]
    pub resolution: ResolutionConfig,
    #[serde(default)]
    pub tables: SchemaSet,
    #[serde(default)]
    pub keys: KeyMapping,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoreSection {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: u32,
}

fn default_version() -> u32 {
    1
}

impl Manifest {
    /// Load a manifest, picking the format from the extension: `.json` is
    /// JSON, anything else is TOML.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest {}", path.display()))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            serde_json::from_str(&text)
                .with_context(|| format!("invalid JSON manifest {}", path.display()))
        } else {
            toml::from_str(&text)
                .with_context(|| format!("invalid TOML manifest {}", path.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keybridge_schema::Exposure;
    use keybridge_types::{FieldKind, ValueType};
    use std::io::Write;

    const SHOP: &str = r#"
[store]
name = "shop"
version = 2

[resolution]
exposure = "mapped_only"

[tables.users.fields]
id = { kind = "generated", type = "number" }
name = { kind = "plain", type = "text" }

[tables.products.fields]
sku = { kind = "generated", type = "text" }
price = { kind = "plain" }

[keys]
users = "id"
"#;

    fn write(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_toml_manifest() {
        let file = write(".toml", SHOP);
        let manifest = Manifest::load(file.path()).unwrap();

        assert_eq!(manifest.store.name, "shop");
        assert_eq!(manifest.store.version, 2);
        assert_eq!(manifest.resolution.exposure, Exposure::MappedOnly);
        assert_eq!(manifest.tables.len(), 2);
        assert_eq!(manifest.keys.get("users").unwrap(), "id");

        let products = manifest.tables.get("products").unwrap();
        assert_eq!(products.field("sku").unwrap().kind, FieldKind::Generated);
        // Type hint defaults when omitted.
        assert_eq!(products.field("price").unwrap().value_type, ValueType::Json);
    }

    #[test]
    fn loads_json_manifest() {
        let json = r#"{
            "store": {"name": "shop"},
            "tables": {"users": {"fields": {"id": {"kind": "generated", "type": "number"}}}},
            "keys": {"users": "id"}
        }"#;
        let file = write(".json", json);
        let manifest = Manifest::load(file.path()).unwrap();
        assert_eq!(manifest.store.version, 1);
        assert_eq!(manifest.resolution, ResolutionConfig::default());
        assert!(manifest.tables.contains("users"));
    }

    #[test]
    fn sections_besides_store_are_optional() {
        let file = write(".toml", "[store]\nname = \"empty\"\n");
        let manifest = Manifest::load(file.path()).unwrap();
        assert!(manifest.tables.is_empty());
        assert!(manifest.keys.is_empty());
    }

    #[test]
    fn invalid_table_name_is_rejected() {
        let file = write(".toml", "[store]\nname = \"x\"\n\n[keys]\n\"a.b\" = \"id\"\n");
        let err = Manifest::load(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("invalid TOML manifest"));
    }

    #[test]
    fn unknown_field_kind_is_rejected() {
        let file = write(
            ".toml",
            "[store]\nname = \"x\"\n\n[tables.t.fields]\nid = { kind = \"serial\" }\n",
        );
        assert!(Manifest::load(file.path()).is_err());
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = Manifest::load(&path).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }
}
