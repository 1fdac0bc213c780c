use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::CacheError;
use crate::infrastructure::metrics::MetricsConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Startup assembly of the cache registry
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    /// Property resource declaring the cache regions to create at startup
    #[serde(default)]
    pub properties: Option<String>,
    /// Roots searched, in order, for property resources
    #[serde(default = "default_search_paths")]
    pub search_paths: Vec<PathBuf>,
}

fn default_search_paths() -> Vec<PathBuf> {
    vec![PathBuf::from("config"), PathBuf::from(".")]
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            properties: None,
            search_paths: default_search_paths(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, CacheError> {
        Self::load_from(Path::new("config"))
    }

    /// Loads `default` then `local` from `dir`, then `APP__*` environment overrides
    pub fn load_from(dir: &Path) -> Result<Self, CacheError> {
        let file = |name: &str| {
            config::File::with_name(&dir.join(name).to_string_lossy()).required(false)
        };

        let config = config::Config::builder()
            .add_source(file("default"))
            .add_source(file("local"))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| CacheError::configuration(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CacheError::configuration(e.to_string()))
    }
}
