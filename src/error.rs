//! Error types
//!
//! Everything fallible in the crate returns [`StoreError`]. A record that is
//! missing from the store is *not* an error: lookups return `Option`.

use crate::types::Identity;
use thiserror::Error as ThisError;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// A record does not expose what the identity specification asks for.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum RecordAccessError {
    #[error("record has no usable field '{field}'")]
    MissingField { field: String },

    /// `index` is the index as written in the specification (may be negative).
    #[error("record has no usable slot at index {index} (record has {len} slots)")]
    MissingSlot { index: isize, len: usize },
}

#[derive(Debug, ThisError)]
pub enum StoreError {
    /// The identity specification is not one of the recognized shapes.
    #[error("expected a field name, an index, or a non-empty group of either; got {spec}")]
    InvalidIdentitySpec { spec: String },

    #[error(transparent)]
    RecordAccess(#[from] RecordAccessError),

    /// Strict construction saw the same identity twice.
    #[error("duplicate key: {key}")]
    DuplicateKey { key: Identity },

    #[error("invalid store options: {0}")]
    InvalidOptions(#[from] serde_json::Error),

    /// A caller-supplied predicate or sort key failed.
    #[error("query callback failed: {0}")]
    Query(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wrap a caller's own error so a fallible predicate or key can return it.
    pub fn query<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        StoreError::Query(err.into())
    }

    /// The offending identity when this is a `DuplicateKey` error.
    pub fn duplicate_key(&self) -> Option<&Identity> {
        match self {
            StoreError::DuplicateKey { key } => Some(key),
            _ => None,
        }
    }

    pub fn is_record_access(&self) -> bool {
        matches!(self, StoreError::RecordAccess(_))
    }

    pub fn is_invalid_spec(&self) -> bool {
        matches!(self, StoreError::InvalidIdentitySpec { .. })
    }
}
