//! Prometheus metrics for registry and cache activity

use std::sync::Arc;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Deserialize;

/// Metrics configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Install the Prometheus recorder
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Prometheus recorder handle used to render the current metrics
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Renders all metrics in the Prometheus text format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Installs the global Prometheus recorder
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("safe_cache_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
            tracing::info!("Prometheus metrics initialized");

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

pub fn record_cache_created(cache: &str) {
    counter!("cache_registry_created_total", "cache" => cache.to_string()).increment(1);
}

pub fn record_cache_removed(cache: &str) {
    counter!("cache_registry_removed_total", "cache" => cache.to_string()).increment(1);
}

pub fn record_type_mismatch(cache: &str) {
    counter!("cache_registry_type_mismatch_total", "cache" => cache.to_string()).increment(1);
}

/// Records one copy-semantics access and the mechanism that produced the copy
pub fn record_copy(cache: &str, mechanism: CopyMechanism) {
    let labels = [
        ("cache", cache.to_string()),
        ("mechanism", mechanism.as_str().to_string()),
    ];

    counter!("cache_copies_total", &labels).increment(1);
}

/// Duplication mechanism behind a copy-semantics accessor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyMechanism {
    /// Type-classified duplication engine
    Duplicate,
    /// Property-wise copy through the serde representation
    BeanCopy,
    /// The type's own `Clone`
    BeanClone,
}

impl CopyMechanism {
    pub fn as_str(&self) -> &'static str {
        match self {
            CopyMechanism::Duplicate => "duplicate",
            CopyMechanism::BeanCopy => "bean_copy",
            CopyMechanism::BeanClone => "bean_clone",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_metrics_install_nothing() {
        let config = MetricsConfig { enabled: false };
        assert!(init_metrics(&config).is_none());
    }

    #[test]
    fn test_metrics_config_defaults_to_enabled() {
        let config: MetricsConfig = serde_json::from_str("{}").unwrap();
        assert!(config.enabled);
    }

    #[test]
    fn test_copy_mechanism_labels() {
        assert_eq!(CopyMechanism::Duplicate.as_str(), "duplicate");
        assert_eq!(CopyMechanism::BeanCopy.as_str(), "bean_copy");
        assert_eq!(CopyMechanism::BeanClone.as_str(), "bean_clone");
    }

    #[test]
    fn test_recording_without_recorder_is_a_no_op() {
        record_cache_created("orphan");
        record_copy("orphan", CopyMechanism::BeanClone);
    }
}
