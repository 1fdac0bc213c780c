//! Type-erased view over named caches

use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

use super::ValueType;

/// Dyn-compatible view of a named cache, independent of its value type
///
/// The registry stores caches behind this trait; callers that know the
/// value type get the concrete cache back with [`downcast_cache`].
pub trait AnyCache: Send + Sync + Debug {
    /// Name the cache was registered under
    fn name(&self) -> &str;

    /// Value type recorded when the cache was created
    fn value_type(&self) -> ValueType;

    /// Current number of keys
    fn size(&self) -> usize;

    /// Removes every key
    fn clear(&self);

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// Recovers the concrete cache behind a type-erased handle
pub fn downcast_cache<C>(cache: Arc<dyn AnyCache>) -> Option<Arc<C>>
where
    C: AnyCache + 'static,
{
    cache.into_any().downcast::<C>().ok()
}

/// Checks whether two handles point at the same cache instance
pub fn same_cache(a: &Arc<dyn AnyCache>, b: &Arc<dyn AnyCache>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
