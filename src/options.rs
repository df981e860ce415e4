use crate::error::Result;
use crate::identity::IdentitySpec;
use crate::types::DuplicatePolicy;
use serde::{Deserialize, Serialize};

/// Construction-time settings for a [`MemoryStore`](crate::MemoryStore).
///
/// ```json
/// { "identity": ["id", "group"], "duplicates": "strict" }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreOptions {
    pub identity: IdentitySpec,
    #[serde(default)]
    pub duplicates: DuplicatePolicy,
}

impl StoreOptions {
    pub fn new(identity: impl Into<IdentitySpec>) -> Self {
        Self { identity: identity.into(), duplicates: DuplicatePolicy::default() }
    }

    pub fn with_policy(identity: impl Into<IdentitySpec>, duplicates: DuplicatePolicy) -> Self {
        Self { identity: identity.into(), duplicates }
    }

    pub fn strict(mut self) -> Self {
        self.duplicates = DuplicatePolicy::Strict;
        self
    }

    /// Parse from JSON text. The identity is validated on the way in.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
