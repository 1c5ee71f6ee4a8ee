use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid identifier {value:?}: {reason}")]
    InvalidIdentifier { value: String, reason: String },

    #[error("invalid key value: {0}")]
    InvalidKeyValue(String),

    #[error("key spec for '{field}' violates the external-key invariant: {reason}")]
    InvalidKeySpec { field: String, reason: String },
}
