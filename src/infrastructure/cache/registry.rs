//! Named cache registry - one cache instance and one value type per name

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Barrier, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use once_cell::sync::Lazy;
use tracing::{debug, warn};

#[cfg(test)]
use mockall::automock;

use super::TypedCache;
use crate::domain::cache::{AnyCache, ValueType};
use crate::domain::CacheError;
use crate::infrastructure::metrics::{
    record_cache_created, record_cache_removed, record_type_mismatch,
};

static GLOBAL_REGISTRY: Lazy<CacheRegistry> = Lazy::new(CacheRegistry::new);

/// Synchronization point run when a lookup misses, before the cache is created
#[cfg_attr(test, automock)]
pub trait CreationHook: Send + Sync {
    fn before_create(&self, name: &str);
}

/// Makes every missing lookup wait for the other parties, forcing them to overlap
impl CreationHook for Barrier {
    fn before_create(&self, _name: &str) {
        self.wait();
    }
}

/// Concurrency-safe registry of named caches
///
/// A name maps to exactly one cache at a time. The value type recorded when
/// the cache is created is checked on every typed lookup; concurrent first
/// lookups of a name all receive the single instance that won creation.
pub struct CacheRegistry {
    caches: RwLock<HashMap<String, Arc<dyn AnyCache>>>,
    creation_hook: Option<Arc<dyn CreationHook>>,
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheRegistry")
            .field("caches", &self.names())
            .field("has_creation_hook", &self.creation_hook.is_some())
            .finish()
    }
}

impl CacheRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self {
            caches: RwLock::new(HashMap::new()),
            creation_hook: None,
        }
    }

    /// Creates an empty registry that runs `hook` on every creating lookup
    pub fn with_creation_hook(hook: Arc<dyn CreationHook>) -> Self {
        Self {
            caches: RwLock::new(HashMap::new()),
            creation_hook: Some(hook),
        }
    }

    /// Process-wide registry
    pub fn global() -> &'static CacheRegistry {
        &GLOBAL_REGISTRY
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<dyn AnyCache>>> {
        self.caches.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<dyn AnyCache>>> {
        self.caches.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cache registered under `name`, creating it for values of
    /// type `V` if there is none
    ///
    /// Fails with [`CacheError::TypeMismatch`] when the existing cache was
    /// created for another value type; that cache is left untouched.
    pub fn get_or_create<V>(&self, name: &str) -> Result<Arc<TypedCache<V>>, CacheError>
    where
        V: Send + Sync + 'static,
    {
        let existing = self.read().get(name).cloned();
        if let Some(cache) = existing {
            return Self::typed(name, cache);
        }

        if let Some(hook) = &self.creation_hook {
            hook.before_create(name);
        }

        // Check and insert under one write lock; a racing caller that got
        // here first has already installed its instance.
        let (cache, created) = match self.write().entry(name.to_string()) {
            Entry::Occupied(entry) => (Arc::clone(entry.get()), false),
            Entry::Vacant(entry) => {
                let cache: Arc<dyn AnyCache> = Arc::new(TypedCache::<V>::new(name));
                entry.insert(Arc::clone(&cache));
                (cache, true)
            }
        };

        if created {
            debug!(cache = name, value_type = %ValueType::of::<V>(), "Created cache");
            record_cache_created(name);
        } else {
            debug!(cache = name, "Cache was created by a concurrent lookup");
        }

        Self::typed(name, cache)
    }

    fn typed<V>(name: &str, cache: Arc<dyn AnyCache>) -> Result<Arc<TypedCache<V>>, CacheError>
    where
        V: Send + Sync + 'static,
    {
        let recorded = cache.value_type();
        let requested = ValueType::of::<V>();

        if recorded != requested {
            warn!(
                cache = name,
                recorded = %recorded,
                requested = %requested,
                "Cache value type mismatch"
            );
            record_type_mismatch(name);
            return Err(CacheError::type_mismatch(name, recorded.name(), requested.name()));
        }

        cache
            .into_any()
            .downcast::<TypedCache<V>>()
            .map_err(|_| CacheError::type_mismatch(name, recorded.name(), requested.name()))
    }

    /// Returns the cache registered under `name` without checking its type
    ///
    /// Never creates a cache; use [`get_or_create`](Self::get_or_create) for that.
    pub fn get(&self, name: &str) -> Option<Arc<dyn AnyCache>> {
        self.read().get(name).cloned()
    }

    /// Detaches the cache registered under `name`
    ///
    /// The returned instance keeps its entries; a later lookup of `name`
    /// creates a new, empty cache.
    pub fn remove(&self, name: &str) -> Option<Arc<dyn AnyCache>> {
        let removed = self.write().remove(name);

        if let Some(cache) = &removed {
            debug!(cache = name, size = cache.size(), "Removed cache");
            record_cache_removed(name);
        }

        removed
    }

    /// Value type recorded for `cache`
    pub fn value_type(&self, cache: &dyn AnyCache) -> ValueType {
        cache.value_type()
    }

    /// Creates empty caches for values of type `V` under each name not yet registered
    ///
    /// Returns how many caches were created.
    pub fn preload<V, I, S>(&self, names: I) -> Result<usize, CacheError>
    where
        V: Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut created = 0;

        for name in names {
            let name = name.as_ref();
            let existed = self.contains(name);
            self.get_or_create::<V>(name)?;

            if !existed {
                created += 1;
            }
        }

        Ok(created)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Returns the registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Detaches every cache
    pub fn clear(&self) {
        let detached = std::mem::take(&mut *self.write());
        debug!(count = detached.len(), "Cleared cache registry");
    }
}
