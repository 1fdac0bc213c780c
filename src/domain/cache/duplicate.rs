//! Duplication engine for copy-semantics cache access
//!
//! Whether a value must be copied is decided by its type through the
//! [`Duplicable`] capability. Identity-stable types (strings, numbers and
//! `Arc`s of them) are shared as-is; everything else is duplicated into a
//! new allocation that shares no mutable state with the source.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use crate::domain::CacheError;

/// Capability of a type to produce independent duplicates of its values
pub trait Duplicable: Sized {
    /// Values of this type can never be observed mutating, so aliasing is safe
    const IDENTITY_STABLE: bool = false;

    /// Produces a content-equal value sharing only identity-stable parts with `self`
    fn duplicate(&self) -> Result<Self, CacheError>;
}

macro_rules! identity_stable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Duplicable for $ty {
                const IDENTITY_STABLE: bool = true;

                fn duplicate(&self) -> Result<Self, CacheError> {
                    Ok(self.clone())
                }
            }
        )*
    };
}

identity_stable!(
    bool, char, String, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);

impl Duplicable for Arc<str> {
    const IDENTITY_STABLE: bool = true;

    fn duplicate(&self) -> Result<Self, CacheError> {
        Ok(Arc::clone(self))
    }
}

impl<T: Duplicable> Duplicable for Arc<T> {
    const IDENTITY_STABLE: bool = T::IDENTITY_STABLE;

    fn duplicate(&self) -> Result<Self, CacheError> {
        if T::IDENTITY_STABLE {
            return Ok(Arc::clone(self));
        }

        T::duplicate(self).map(Arc::new)
    }
}

impl<T: Duplicable> Duplicable for Option<T> {
    const IDENTITY_STABLE: bool = T::IDENTITY_STABLE;

    fn duplicate(&self) -> Result<Self, CacheError> {
        self.as_ref().map(Duplicable::duplicate).transpose()
    }
}

// Containers always get a fresh allocation; their elements decide for themselves.
impl<T: Duplicable> Duplicable for Vec<T> {
    fn duplicate(&self) -> Result<Self, CacheError> {
        self.iter().map(Duplicable::duplicate).collect()
    }
}

impl<T: Duplicable> Duplicable for HashMap<String, T> {
    fn duplicate(&self) -> Result<Self, CacheError> {
        self.iter()
            .map(|(key, value)| Ok((key.clone(), value.duplicate()?)))
            .collect()
    }
}

impl<T: Duplicable> Duplicable for BTreeMap<String, T> {
    fn duplicate(&self) -> Result<Self, CacheError> {
        self.iter()
            .map(|(key, value)| Ok((key.clone(), value.duplicate()?)))
            .collect()
    }
}

impl Duplicable for serde_json::Value {
    fn duplicate(&self) -> Result<Self, CacheError> {
        Ok(self.clone())
    }
}

/// Deep duplication through a serialization round trip
///
/// Types with a serde representation can implement [`Duplicable`] with this.
pub fn duplicate_via_serde<T: Serialize + DeserializeOwned>(value: &T) -> Result<T, CacheError> {
    let tree = serde_json::to_value(value).map_err(|e| {
        CacheError::not_duplicable::<T>(format!("serialization failed: {}", e))
    })?;

    serde_json::from_value(tree).map_err(|e| {
        CacheError::not_duplicable::<T>(format!("deserialization failed: {}", e))
    })
}

/// Stateless engine producing shared or duplicated values
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicationEngine;

impl DuplicationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Returns `value` itself for identity-stable types, otherwise a new
    /// allocation holding [`Duplicable::duplicate`] of it
    pub fn dup<V: Duplicable>(&self, value: &Arc<V>) -> Result<Arc<V>, CacheError> {
        if V::IDENTITY_STABLE {
            return Ok(Arc::clone(value));
        }

        V::duplicate(value).map(Arc::new)
    }

    /// Same contract as [`dup`](Self::dup), copying property-wise through
    /// the value's serde representation
    pub fn dup_serialized<V>(&self, value: &Arc<V>) -> Result<Arc<V>, CacheError>
    where
        V: Duplicable + Serialize + DeserializeOwned,
    {
        if V::IDENTITY_STABLE {
            return Ok(Arc::clone(value));
        }

        duplicate_via_serde::<V>(value).map(Arc::new)
    }

    /// Same contract as [`dup`](Self::dup), starting from the value's own `Clone`
    ///
    /// `Clone` may keep shared-ownership fields pointing at the source, so
    /// the clone is duplicated before it is handed out.
    pub fn dup_cloned<V>(&self, value: &Arc<V>) -> Result<Arc<V>, CacheError>
    where
        V: Duplicable + Clone,
    {
        if V::IDENTITY_STABLE {
            return Ok(Arc::clone(value));
        }

        V::clone(value).duplicate().map(Arc::new)
    }
}
