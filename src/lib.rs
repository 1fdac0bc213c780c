//! Safe Cache
//!
//! A concurrency-safe registry of named, type-checked caches with:
//! - One recorded value type per cache name, checked on every typed lookup
//! - Exactly one winning instance when lookups race to create a cache
//! - Reference-semantics and copy-semantics accessors
//! - A duplication engine that only copies what could be mutated

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::cache::{Duplicable, DuplicationEngine, ValueType};
pub use domain::CacheError;
pub use infrastructure::cache::{CacheRegistry, TypedCache};

use config::RegistryConfig;
use infrastructure::properties::PropertyLoader;

/// Builds a registry holding an empty cache for every region declared by
/// the configured property resource
///
/// Region caches hold `serde_json::Value` documents. Without a configured
/// resource the registry starts empty.
pub fn build_registry(config: &RegistryConfig) -> Result<CacheRegistry, CacheError> {
    let registry = CacheRegistry::new();

    let Some(resource) = config.properties.as_deref() else {
        tracing::info!("No cache properties configured, starting with an empty registry");
        return Ok(registry);
    };

    let loader = PropertyLoader::new(config.search_paths.clone());
    let regions = loader.load(resource)?.cache_regions();
    let created = registry.preload::<serde_json::Value, _, _>(&regions)?;

    tracing::info!(resource, regions = created, "Cache registry assembled");
    Ok(registry)
}
