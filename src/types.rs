use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

// ============ FLOAT KEY ============

/// An `f64` that can be hashed and totally ordered.
///
/// Ordered by `f64::total_cmp`. `-0.0` is folded into `0.0` and every NaN
/// into a single NaN, so equality is bit equality.
#[derive(Clone, Copy, Debug)]
pub struct FloatKey(f64);

impl FloatKey {
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            FloatKey(f64::NAN)
        } else if value == 0.0 {
            FloatKey(0.0)
        } else {
            FloatKey(value)
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl PartialEq for FloatKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FloatKey {}

impl Hash for FloatKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for FloatKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

// ============ KEY PART ============

/// One scalar component of an identity.
///
/// Ordering follows variant order first (null < bool < int < uint < float
/// < str), then the natural order of the value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyPart {
    Null,
    Bool(bool),
    Int(i64),
    /// Only used for values above `i64::MAX`
    UInt(u64),
    /// Only used for non-integral values; `2.0` is `Int(2)`
    Float(FloatKey),
    Str(String),
}

impl KeyPart {
    /// Convert a JSON scalar. Arrays and objects are not identities.
    pub fn from_json(value: &Value) -> Option<KeyPart> {
        match value {
            Value::Null => Some(KeyPart::Null),
            Value::Bool(b) => Some(KeyPart::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(KeyPart::Int)
                .or_else(|| n.as_u64().map(KeyPart::UInt))
                .or_else(|| n.as_f64().map(KeyPart::from)),
            Value::String(s) => Some(KeyPart::Str(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            KeyPart::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            KeyPart::Float(f) => Some(f.get()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            KeyPart::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<u64> for KeyPart {
    fn from(n: u64) -> Self {
        match i64::try_from(n) {
            Ok(n) => KeyPart::Int(n),
            Err(_) => KeyPart::UInt(n),
        }
    }
}

impl From<usize> for KeyPart {
    fn from(n: usize) -> Self {
        KeyPart::from(n as u64)
    }
}

macro_rules! key_part_from_int {
    ($($ty:ty),*) => {
        $(impl From<$ty> for KeyPart {
            fn from(n: $ty) -> Self { KeyPart::Int(n as i64) }
        })*
    };
}

key_part_from_int!(i8, i16, i32, i64, isize, u8, u16, u32);

impl From<f64> for KeyPart {
    fn from(f: f64) -> Self {
        // integral values key like the integer they equal
        if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
            KeyPart::Int(f as i64)
        } else {
            KeyPart::Float(FloatKey::new(f))
        }
    }
}

impl From<f32> for KeyPart {
    fn from(f: f32) -> Self {
        KeyPart::from(f64::from(f))
    }
}

impl From<bool> for KeyPart {
    fn from(b: bool) -> Self {
        KeyPart::Bool(b)
    }
}

impl From<&str> for KeyPart {
    fn from(s: &str) -> Self {
        KeyPart::Str(s.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(s: String) -> Self {
        KeyPart::Str(s)
    }
}

impl From<&String> for KeyPart {
    fn from(s: &String) -> Self {
        KeyPart::Str(s.clone())
    }
}

impl<T: Into<KeyPart>> From<Option<T>> for KeyPart {
    fn from(v: Option<T>) -> Self {
        v.map_or(KeyPart::Null, Into::into)
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Null => f.write_str("null"),
            KeyPart::Bool(b) => write!(f, "{b}"),
            KeyPart::Int(n) => write!(f, "{n}"),
            KeyPart::UInt(n) => write!(f, "{n}"),
            KeyPart::Float(n) => write!(f, "{}", n.get()),
            KeyPart::Str(s) => write!(f, "{s:?}"),
        }
    }
}

// ============ IDENTITY ============

/// Inline storage for composite identities (most keys have few parts).
pub type KeyParts = SmallVec<[KeyPart; 4]>;

/// The value a record is indexed under.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Identity {
    /// Produced by a single field or index
    Scalar(KeyPart),
    /// Produced by a group, parts in specification order
    Composite(KeyParts),
}

impl Identity {
    pub fn composite<I, T>(parts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<KeyPart>,
    {
        Identity::Composite(parts.into_iter().map(Into::into).collect())
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Identity::Composite(_))
    }

    pub fn as_scalar(&self) -> Option<&KeyPart> {
        match self {
            Identity::Scalar(part) => Some(part),
            Identity::Composite(_) => None,
        }
    }

    /// All parts in order; a scalar yields a one-element slice.
    pub fn parts(&self) -> &[KeyPart] {
        match self {
            Identity::Scalar(part) => std::slice::from_ref(part),
            Identity::Composite(parts) => parts,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Scalar(part) => write!(f, "{part}"),
            Identity::Composite(parts) => {
                f.write_str("(")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{part}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl From<KeyPart> for Identity {
    fn from(part: KeyPart) -> Self {
        Identity::Scalar(part)
    }
}

impl From<&Identity> for Identity {
    fn from(identity: &Identity) -> Self {
        identity.clone()
    }
}

macro_rules! identity_from_scalar {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Identity {
            fn from(v: $ty) -> Self { Identity::Scalar(KeyPart::from(v)) }
        })*
    };
}

identity_from_scalar!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, bool, &str, String, &String);

macro_rules! identity_from_tuple {
    ($($name:ident $idx:tt),+) => {
        impl<$($name: Into<KeyPart>),+> From<($($name,)+)> for Identity {
            fn from(tuple: ($($name,)+)) -> Self {
                Identity::Composite(smallvec::smallvec![$(tuple.$idx.into()),+])
            }
        }
    };
}

identity_from_tuple!(A 0, B 1);
identity_from_tuple!(A 0, B 1, C 2);
identity_from_tuple!(A 0, B 1, C 2, D 3);
identity_from_tuple!(A 0, B 1, C 2, D 3, E 4);
identity_from_tuple!(A 0, B 1, C 2, D 3, E 4, F 5);

// ============ DUPLICATE POLICY ============

/// What construction does when an identity repeats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep the first record seen, drop later ones silently
    #[default]
    FirstWins,
    /// Abort construction with `DuplicateKey`
    Strict,
}

impl DuplicatePolicy {
    pub fn is_strict(self) -> bool {
        self == DuplicatePolicy::Strict
    }
}

impl From<bool> for DuplicatePolicy {
    fn from(strict: bool) -> Self {
        if strict { DuplicatePolicy::Strict } else { DuplicatePolicy::FirstWins }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicatePolicy::FirstWins => f.write_str("first_wins"),
            DuplicatePolicy::Strict => f.write_str("strict"),
        }
    }
}
