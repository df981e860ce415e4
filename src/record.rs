//! Record Access
//!
//! The store never looks inside a record except through this trait.
//! Name-based identities call `field`, index-based identities call `slot`.
//! A type implements whichever access pattern it supports; the other one
//! reports every lookup as absent.

use crate::types::KeyPart;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::sync::Arc;

pub trait Record {
    /// Value of a named field, if the record has one usable as a key.
    fn field(&self, _name: &str) -> Option<KeyPart> {
        None
    }

    /// Value at a non-negative position.
    fn slot(&self, _index: usize) -> Option<KeyPart> {
        None
    }

    /// Number of positions; used to resolve negative indices.
    fn slot_count(&self) -> usize {
        0
    }
}

impl<T: Record + ?Sized> Record for &T {
    fn field(&self, name: &str) -> Option<KeyPart> {
        (**self).field(name)
    }
    fn slot(&self, index: usize) -> Option<KeyPart> {
        (**self).slot(index)
    }
    fn slot_count(&self) -> usize {
        (**self).slot_count()
    }
}

impl<T: Record + ?Sized> Record for Arc<T> {
    fn field(&self, name: &str) -> Option<KeyPart> {
        (**self).field(name)
    }
    fn slot(&self, index: usize) -> Option<KeyPart> {
        (**self).slot(index)
    }
    fn slot_count(&self) -> usize {
        (**self).slot_count()
    }
}

// ============ JSON ============

/// Objects answer by name, arrays by position.
impl Record for Value {
    fn field(&self, name: &str) -> Option<KeyPart> {
        self.as_object()?.get(name).and_then(KeyPart::from_json)
    }

    fn slot(&self, index: usize) -> Option<KeyPart> {
        self.as_array()?.get(index).and_then(KeyPart::from_json)
    }

    fn slot_count(&self) -> usize {
        self.as_array().map_or(0, Vec::len)
    }
}

// ============ SEQUENCES ============

impl<T: Clone + Into<KeyPart>> Record for [T] {
    fn slot(&self, index: usize) -> Option<KeyPart> {
        self.get(index).cloned().map(Into::into)
    }
    fn slot_count(&self) -> usize {
        self.len()
    }
}

impl<T: Clone + Into<KeyPart>> Record for Vec<T> {
    fn slot(&self, index: usize) -> Option<KeyPart> {
        self.as_slice().slot(index)
    }
    fn slot_count(&self) -> usize {
        self.len()
    }
}

impl<T: Clone + Into<KeyPart>, const N: usize> Record for [T; N] {
    fn slot(&self, index: usize) -> Option<KeyPart> {
        self.as_slice().slot(index)
    }
    fn slot_count(&self) -> usize {
        N
    }
}

macro_rules! record_for_tuple {
    ($len:expr; $($name:ident $idx:tt),+) => {
        impl<$($name: Clone + Into<KeyPart>),+> Record for ($($name,)+) {
            fn slot(&self, index: usize) -> Option<KeyPart> {
                match index {
                    $($idx => Some(self.$idx.clone().into()),)+
                    _ => None,
                }
            }
            fn slot_count(&self) -> usize {
                $len
            }
        }
    };
}

record_for_tuple!(1; A 0);
record_for_tuple!(2; A 0, B 1);
record_for_tuple!(3; A 0, B 1, C 2);
record_for_tuple!(4; A 0, B 1, C 2, D 3);
record_for_tuple!(5; A 0, B 1, C 2, D 3, E 4);
record_for_tuple!(6; A 0, B 1, C 2, D 3, E 4, F 5);

// ============ MAPS ============

impl<V: Clone + Into<KeyPart>, S: BuildHasher> Record for HashMap<String, V, S> {
    fn field(&self, name: &str) -> Option<KeyPart> {
        self.get(name).cloned().map(Into::into)
    }
}

impl<V: Clone + Into<KeyPart>> Record for BTreeMap<String, V> {
    fn field(&self, name: &str) -> Option<KeyPart> {
        self.get(name).cloned().map(Into::into)
    }
}

// ============ STRUCTS ============

/// Implement [`Record`] for a struct by listing the fields that may take
/// part in an identity. Fields answer by name, and by position in the order
/// listed, so a struct behaves like a named tuple.
///
/// ```
/// use memorystore::{impl_record, Record, KeyPart};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Row { id: i64, value: i64 }
/// impl_record!(Row { id, value });
///
/// let row = Row { id: 1, value: 10 };
/// assert_eq!(row.field("value"), Some(KeyPart::Int(10)));
/// assert_eq!(row.slot(0), Some(KeyPart::Int(1)));
/// ```
#[macro_export]
macro_rules! impl_record {
    ($ty:ty { $($field:ident),+ $(,)? }) => {
        impl $crate::Record for $ty {
            fn field(&self, name: &str) -> ::core::option::Option<$crate::KeyPart> {
                match name {
                    $(::core::stringify!($field) => ::core::option::Option::Some(
                        $crate::KeyPart::from(::core::clone::Clone::clone(&self.$field)),
                    ),)+
                    _ => ::core::option::Option::None,
                }
            }

            fn slot(&self, index: usize) -> ::core::option::Option<$crate::KeyPart> {
                let names = [$(::core::stringify!($field)),+];
                names.get(index).and_then(|name| $crate::Record::field(self, name))
            }

            fn slot_count(&self) -> usize {
                [$(::core::stringify!($field)),+].len()
            }
        }
    };
}
