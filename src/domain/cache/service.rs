//! Service interface of remote-facing cache endpoints

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Element exchanged with a cache service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheElement {
    pub cache_name: String,
    pub key: String,
    pub value: serde_json::Value,
}

impl CacheElement {
    pub fn new(
        cache_name: impl Into<String>,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        Self {
            cache_name: cache_name.into(),
            key: key.into(),
            value,
        }
    }
}

/// Operations a cache service endpoint accepts
pub trait CacheService: Send + Sync {
    /// Stores an element
    fn put(&self, element: CacheElement);

    /// Stores an element, replacing any existing one
    fn update(&self, element: CacheElement);

    /// Gets an element by cache name and key
    fn get(&self, cache_name: &str, key: &str) -> Option<CacheElement>;

    /// Gets only the value of an element, without its cache name and key
    fn get_value(&self, cache_name: &str, key: &str) -> Option<serde_json::Value> {
        self.get(cache_name, key).map(|element| element.value)
    }

    /// Gets every element found for the given keys
    fn get_multiple(
        &self,
        cache_name: &str,
        keys: &HashSet<String>,
    ) -> HashMap<String, CacheElement>;

    /// Removes a single key
    fn remove(&self, cache_name: &str, key: &str);

    /// Removes every key of a cache
    fn remove_all(&self, cache_name: &str);

    /// Disposes of a cache
    fn dispose(&self, cache_name: &str);

    /// Frees all caches
    fn release(&self);
}
