//! Cache infrastructure - Cache implementations and the named registry

mod registry;
mod typed;
mod zombie;

pub use registry::{CacheRegistry, CreationHook};
pub use typed::TypedCache;
pub use zombie::ZombieCacheService;
