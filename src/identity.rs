//! Identity Extraction
//!
//! An [`IdentitySpec`] says how to derive a record's identity: one field,
//! a group of fields, one position, or a group of positions. It is resolved
//! once into an [`Extractor`], which is then applied to every record.
//!
//! The dynamic JSON shape is accepted too (`"id"`, `["id", "group"]`, `0`,
//! `[0, 1]`) so specifications can come from configuration. Validation
//! precedence for that shape:
//! 1. string → single field
//! 2. array of strings → field group
//! 3. integer → single index
//! 4. array of integers → index group
//! 5. anything else → `InvalidIdentitySpec`

use crate::error::{RecordAccessError, Result, StoreError};
use crate::record::Record;
use crate::types::{Identity, KeyPart, KeyParts};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// ============ SPECIFICATION ============

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum IdentitySpec {
    ByField(String),
    ByFields(Vec<String>),
    /// Negative indices count from the end of the record
    ByIndex(isize),
    ByIndices(Vec<isize>),
}

impl IdentitySpec {
    pub fn field(name: impl Into<String>) -> Self {
        IdentitySpec::ByField(name.into())
    }

    pub fn fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        IdentitySpec::ByFields(names.into_iter().map(Into::into).collect())
    }

    pub fn index(index: isize) -> Self {
        IdentitySpec::ByIndex(index)
    }

    pub fn indices(indices: impl IntoIterator<Item = isize>) -> Self {
        IdentitySpec::ByIndices(indices.into_iter().collect())
    }

    /// True when identities are composite: a group naming two or more
    /// fields or indices. A one-element group yields a bare scalar.
    pub fn is_composite(&self) -> bool {
        match self {
            IdentitySpec::ByFields(names) => names.len() > 1,
            IdentitySpec::ByIndices(indices) => indices.len() > 1,
            IdentitySpec::ByField(_) | IdentitySpec::ByIndex(_) => false,
        }
    }

    /// Parse the dynamic JSON shape.
    pub fn from_json(value: &Value) -> Result<Self> {
        let invalid = || StoreError::InvalidIdentitySpec { spec: value.to_string() };

        match value {
            Value::String(name) => Ok(IdentitySpec::ByField(name.clone())),
            Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_string) => {
                let names = items.iter().filter_map(Value::as_str).map(str::to_string).collect();
                Ok(IdentitySpec::ByFields(names))
            }
            Value::Number(n) => n
                .as_i64()
                .and_then(|i| isize::try_from(i).ok())
                .map(IdentitySpec::ByIndex)
                .ok_or_else(invalid),
            Value::Array(items) if !items.is_empty() => items
                .iter()
                .map(|item| item.as_i64().and_then(|i| isize::try_from(i).ok()))
                .collect::<Option<Vec<_>>>()
                .map(IdentitySpec::ByIndices)
                .ok_or_else(invalid),
            _ => Err(invalid()),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            IdentitySpec::ByField(name) => Value::from(name.as_str()),
            IdentitySpec::ByFields(names) => Value::from(names.clone()),
            IdentitySpec::ByIndex(i) => Value::from(*i as i64),
            IdentitySpec::ByIndices(indices) => {
                Value::Array(indices.iter().map(|i| Value::from(*i as i64)).collect())
            }
        }
    }
}

impl TryFrom<Value> for IdentitySpec {
    type Error = StoreError;

    fn try_from(value: Value) -> Result<Self> {
        IdentitySpec::from_json(&value)
    }
}

impl From<IdentitySpec> for Value {
    fn from(spec: IdentitySpec) -> Self {
        spec.to_json()
    }
}

impl From<&str> for IdentitySpec {
    fn from(name: &str) -> Self {
        IdentitySpec::field(name)
    }
}

impl From<String> for IdentitySpec {
    fn from(name: String) -> Self {
        IdentitySpec::ByField(name)
    }
}

impl From<isize> for IdentitySpec {
    fn from(index: isize) -> Self {
        IdentitySpec::ByIndex(index)
    }
}

impl From<i32> for IdentitySpec {
    fn from(index: i32) -> Self {
        IdentitySpec::ByIndex(index as isize)
    }
}

impl<const N: usize> From<[&str; N]> for IdentitySpec {
    fn from(names: [&str; N]) -> Self {
        IdentitySpec::fields(names)
    }
}

impl<const N: usize> From<[i32; N]> for IdentitySpec {
    fn from(indices: [i32; N]) -> Self {
        IdentitySpec::indices(indices.map(|i| i as isize))
    }
}

impl<const N: usize> From<[isize; N]> for IdentitySpec {
    fn from(indices: [isize; N]) -> Self {
        IdentitySpec::indices(indices)
    }
}

impl From<Vec<String>> for IdentitySpec {
    fn from(names: Vec<String>) -> Self {
        IdentitySpec::ByFields(names)
    }
}

impl From<&[&str]> for IdentitySpec {
    fn from(names: &[&str]) -> Self {
        IdentitySpec::fields(names.iter().copied())
    }
}

impl From<&[isize]> for IdentitySpec {
    fn from(indices: &[isize]) -> Self {
        IdentitySpec::indices(indices.iter().copied())
    }
}

impl fmt::Display for IdentitySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

// ============ EXTRACTOR ============

#[derive(Clone, Debug, PartialEq, Eq)]
enum Accessor {
    Field(String),
    Index(isize),
}

impl Accessor {
    fn read<R: Record + ?Sized>(&self, record: &R) -> Result<KeyPart, RecordAccessError> {
        match self {
            Accessor::Field(name) => record
                .field(name)
                .ok_or_else(|| RecordAccessError::MissingField { field: name.clone() }),
            Accessor::Index(index) => {
                let len = record.slot_count();
                let missing = || RecordAccessError::MissingSlot { index: *index, len };
                let pos = if *index < 0 {
                    len.checked_sub(index.unsigned_abs()).ok_or_else(missing)?
                } else {
                    index.unsigned_abs()
                };
                record.slot(pos).ok_or_else(missing)
            }
        }
    }
}

/// A validated identity specification, ready to apply to records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extractor {
    spec: IdentitySpec,
    accessors: Vec<Accessor>,
}

impl Extractor {
    /// Validate `spec`. Empty groups are rejected before any record is seen.
    pub fn new(spec: IdentitySpec) -> Result<Self> {
        let accessors: Vec<Accessor> = match &spec {
            IdentitySpec::ByField(name) => vec![Accessor::Field(name.clone())],
            IdentitySpec::ByFields(names) => names.iter().cloned().map(Accessor::Field).collect(),
            IdentitySpec::ByIndex(i) => vec![Accessor::Index(*i)],
            IdentitySpec::ByIndices(indices) => indices.iter().copied().map(Accessor::Index).collect(),
        };
        if accessors.is_empty() {
            return Err(StoreError::InvalidIdentitySpec { spec: spec.to_string() });
        }
        Ok(Self { spec, accessors })
    }

    /// Build straight from the dynamic JSON shape.
    pub fn from_json(value: &Value) -> Result<Self> {
        Self::new(IdentitySpec::from_json(value)?)
    }

    pub fn spec(&self) -> &IdentitySpec {
        &self.spec
    }

    /// Identity of `record`: a scalar when one field or index is named
    /// (including a one-element group), otherwise a composite in
    /// specification order.
    pub fn extract<R: Record + ?Sized>(&self, record: &R) -> Result<Identity> {
        if let [accessor] = self.accessors.as_slice() {
            return Ok(Identity::Scalar(accessor.read(record)?));
        }
        let parts = self
            .accessors
            .iter()
            .map(|accessor| accessor.read(record))
            .collect::<Result<KeyParts, RecordAccessError>>()?;
        Ok(Identity::Composite(parts))
    }

    /// The extractor as a plain function value.
    pub fn as_fn<R: Record + ?Sized>(&self) -> impl Fn(&R) -> Result<Identity> + '_ {
        move |record: &R| self.extract(record)
    }
}

impl TryFrom<IdentitySpec> for Extractor {
    type Error = StoreError;

    fn try_from(spec: IdentitySpec) -> Result<Self> {
        Extractor::new(spec)
    }
}
