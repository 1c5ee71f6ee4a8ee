//! Table and field identifiers.
//!
//! Valid identifiers:
//! - Must be non-empty
//! - Must not start or end with whitespace
//! - Must not contain control characters
//! - Must not contain `.` (the key path separator of the target store)

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Validate a table or field identifier, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use keybridge_types::name::validate_identifier;
///
/// assert!(validate_identifier("users").is_ok());
/// assert!(validate_identifier("ambiguous_items").is_ok());
/// assert!(validate_identifier("").is_err());
/// assert!(validate_identifier("address.city").is_err());
/// ```
pub fn validate_identifier(value: &str) -> Result<(), TypeError> {
    if value.is_empty() {
        return Err(invalid(value, "identifier must not be empty"));
    }

    if value.trim() != value {
        return Err(invalid(value, "must not start or end with whitespace"));
    }

    if let Some(ch) = value.chars().find(|c| c.is_control()) {
        return Err(invalid(
            value,
            format!("contains control character: {ch:?}"),
        ));
    }

    if value.contains('.') {
        return Err(invalid(value, "must not contain '.'"));
    }

    Ok(())
}

fn invalid(value: &str, reason: impl Into<String>) -> TypeError {
    TypeError::InvalidIdentifier {
        value: value.to_string(),
        reason: reason.into(),
    }
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create a validated identifier.
            pub fn new(value: impl Into<String>) -> Result<Self, TypeError> {
                let value = value.into();
                validate_identifier(&value)?;
                Ok(Self(value))
            }

            /// The identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

identifier!(
    /// Name of a table in a [`SchemaSet`](crate::SchemaSet).
    TableName
);

identifier!(
    /// Name of a field within a [`TableSchema`](crate::TableSchema).
    FieldName
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_identifiers() {
        assert!(validate_identifier("users").is_ok());
        assert!(validate_identifier("id1").is_ok());
        assert!(validate_identifier("order-lines").is_ok());
        assert!(validate_identifier("späti").is_ok());
    }

    #[test]
    fn rejects_empty() {
        let err = validate_identifier("").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn rejects_surrounding_whitespace() {
        assert!(validate_identifier(" users").is_err());
        assert!(validate_identifier("users ").is_err());
    }

    #[test]
    fn rejects_control_characters() {
        assert!(validate_identifier("us\ters").is_err());
        assert!(validate_identifier("users\n").is_err());
    }

    #[test]
    fn rejects_key_path_separator() {
        let err = validate_identifier("address.city").unwrap_err();
        assert!(err.to_string().contains("'.'"));
    }

    #[test]
    fn table_name_round_trips_through_string() {
        let name = TableName::new("products").unwrap();
        assert_eq!(name.as_str(), "products");
        assert_eq!(name, "products");
        assert_eq!(String::from(name.clone()), "products");
        assert_eq!(format!("{name}"), "products");
        assert_eq!(format!("{name:?}"), "TableName(\"products\")");
    }

    #[test]
    fn deserialization_validates() {
        let ok: FieldName = serde_json::from_str("\"sku\"").unwrap();
        assert_eq!(ok, "sku");

        let err = serde_json::from_str::<FieldName>("\"\"");
        assert!(err.is_err());
    }

    #[test]
    fn borrow_allows_str_lookup() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(TableName::new("logs").unwrap(), 1);
        assert_eq!(map.get("logs"), Some(&1));
    }
}
