//! Value type tags recorded per named cache

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Type tag identifying the value type of a cache
///
/// Equality and hashing use the `TypeId` only; the name is kept for
/// messages and logs.
#[derive(Debug, Clone, Copy)]
pub struct ValueType {
    id: TypeId,
    name: &'static str,
}

impl ValueType {
    /// Returns the tag for `V`
    pub fn of<V: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<V>(),
            name: std::any::type_name::<V>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Checks whether this tag denotes `V`
    pub fn is<V: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<V>()
    }
}

impl PartialEq for ValueType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ValueType {}

impl Hash for ValueType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
