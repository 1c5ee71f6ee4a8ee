//! Emitted key specifications and concrete record keys.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TypeError;
use crate::name::FieldName;

/// A record as handed to and returned from the store.
pub type Record = serde_json::Map<String, Value>;

/// Primary-key specification for one table of the target store.
///
/// The key is always unique and always supplied by the caller on insert; it
/// is never auto-incremented, whatever the declared value type of the field.
/// The only constructor is [`KeySpec::external`], and deserialization rejects
/// documents that claim otherwise.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawKeySpec", into = "RawKeySpec")]
pub struct KeySpec {
    field_name: FieldName,
}

impl KeySpec {
    /// Key specification for a caller-supplied, unique key on `field_name`.
    pub fn external(field_name: FieldName) -> Self {
        Self { field_name }
    }

    /// The record field holding the key.
    pub fn field_name(&self) -> &FieldName {
        &self.field_name
    }

    pub fn unique(&self) -> bool {
        true
    }

    pub fn externally_supplied(&self) -> bool {
        true
    }

    pub fn auto_increment(&self) -> bool {
        false
    }
}

impl fmt::Display for KeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (unique, externally supplied)", self.field_name)
    }
}

/// Wire shape of a [`KeySpec`].
#[derive(Clone, Debug, Serialize, Deserialize)]
struct RawKeySpec {
    field_name: FieldName,
    unique: bool,
    externally_supplied: bool,
    #[serde(default)]
    auto_increment: bool,
}

impl From<KeySpec> for RawKeySpec {
    fn from(spec: KeySpec) -> Self {
        Self {
            unique: spec.unique(),
            externally_supplied: spec.externally_supplied(),
            auto_increment: spec.auto_increment(),
            field_name: spec.field_name,
        }
    }
}

impl TryFrom<RawKeySpec> for KeySpec {
    type Error = TypeError;

    fn try_from(raw: RawKeySpec) -> Result<Self, Self::Error> {
        let reason = if !raw.unique {
            Some("key must be unique")
        } else if !raw.externally_supplied {
            Some("key must be externally supplied")
        } else if raw.auto_increment {
            Some("key must not auto-increment")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(TypeError::InvalidKeySpec {
                field: raw.field_name.to_string(),
                reason: reason.into(),
            }),
            None => Ok(Self::external(raw.field_name)),
        }
    }
}

/// A concrete primary-key value taken from a record.
///
/// Integer keys order before text keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordKey {
    Int(i64),
    Text(String),
}

impl RecordKey {
    /// Extract a key from a JSON value.
    ///
    /// Only integers (within `i64`) and non-empty strings are valid keys.
    pub fn from_value(value: &Value) -> Result<Self, TypeError> {
        match value {
            Value::Number(n) => n.as_i64().map(Self::Int).ok_or_else(|| {
                TypeError::InvalidKeyValue(format!("number {n} is not a 64-bit integer"))
            }),
            Value::String(s) if s.is_empty() => {
                Err(TypeError::InvalidKeyValue("empty string".into()))
            }
            Value::String(s) => Ok(Self::Text(s.clone())),
            Value::Null => Err(TypeError::InvalidKeyValue("null".into())),
            Value::Bool(_) => Err(TypeError::InvalidKeyValue("boolean".into())),
            Value::Array(_) => Err(TypeError::InvalidKeyValue("array".into())),
            Value::Object(_) => Err(TypeError::InvalidKeyValue("object".into())),
        }
    }

    /// The key as a JSON value.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Int(n) => Value::from(*n),
            Self::Text(s) => Value::from(s.as_str()),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<i64> for RecordKey {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for RecordKey {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RecordKey {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}
