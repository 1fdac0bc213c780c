//! Cache domain - value types, duplication and cache interfaces

mod any_cache;
mod duplicate;
mod service;
mod value_type;

pub use any_cache::{downcast_cache, same_cache, AnyCache};
pub use duplicate::{duplicate_via_serde, Duplicable, DuplicationEngine};
pub use service::{CacheElement, CacheService};
pub use value_type::ValueType;
