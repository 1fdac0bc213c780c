//! Domain layer - cache types, duplication and errors

pub mod cache;
pub mod error;

pub use cache::{
    downcast_cache, duplicate_via_serde, same_cache, AnyCache, CacheElement, CacheService,
    Duplicable, DuplicationEngine, ValueType,
};
pub use error::CacheError;
