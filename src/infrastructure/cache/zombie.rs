//! Cache service placeholder that discards every call

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::domain::cache::{CacheElement, CacheService};

/// Null-object [`CacheService`] used while the real service is unavailable
///
/// Writes are dropped and reads find nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZombieCacheService;

impl ZombieCacheService {
    pub fn new() -> Self {
        Self
    }
}

impl CacheService for ZombieCacheService {
    fn put(&self, element: CacheElement) {
        debug!(cache = %element.cache_name, key = %element.key, "Zombie put");
    }

    fn update(&self, element: CacheElement) {
        debug!(cache = %element.cache_name, key = %element.key, "Zombie update");
    }

    fn get(&self, cache_name: &str, key: &str) -> Option<CacheElement> {
        debug!(cache = cache_name, key, "Zombie get");
        None
    }

    fn get_value(&self, cache_name: &str, key: &str) -> Option<serde_json::Value> {
        debug!(cache = cache_name, key, "Zombie get value");
        None
    }

    fn get_multiple(
        &self,
        cache_name: &str,
        keys: &HashSet<String>,
    ) -> HashMap<String, CacheElement> {
        debug!(cache = cache_name, keys = keys.len(), "Zombie get multiple");
        HashMap::new()
    }

    fn remove(&self, cache_name: &str, key: &str) {
        debug!(cache = cache_name, key, "Zombie remove");
    }

    fn remove_all(&self, cache_name: &str) {
        debug!(cache = cache_name, "Zombie remove all");
    }

    fn dispose(&self, cache_name: &str) {
        debug!(cache = cache_name, "Zombie dispose");
    }

    fn release(&self) {
        debug!("Zombie release");
    }
}
