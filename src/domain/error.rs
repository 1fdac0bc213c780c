use thiserror::Error;

/// Errors raised by the cache registry, its caches and the duplication engine
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Type mismatch for cache '{cache}': holds {expected}, requested {actual}")]
    TypeMismatch {
        cache: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Value of type {type_name} cannot be duplicated: {reason}")]
    NotDuplicable {
        type_name: &'static str,
        reason: String,
    },

    #[error("Could not load [{resource}] from any search path")]
    PropertiesNotFound { resource: String },

    #[error("Invalid properties in [{resource}]: {message}")]
    Properties { resource: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl CacheError {
    pub fn type_mismatch(
        cache: impl Into<String>,
        expected: &'static str,
        actual: &'static str,
    ) -> Self {
        Self::TypeMismatch {
            cache: cache.into(),
            expected,
            actual,
        }
    }

    pub fn not_duplicable<T: ?Sized>(reason: impl Into<String>) -> Self {
        Self::NotDuplicable {
            type_name: std::any::type_name::<T>(),
            reason: reason.into(),
        }
    }

    pub fn properties_not_found(resource: impl Into<String>) -> Self {
        Self::PropertiesNotFound {
            resource: resource.into(),
        }
    }

    pub fn properties(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Properties {
            resource: resource.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// True for the contract violation raised by a typed lookup
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }

    pub fn is_not_duplicable(&self) -> bool {
        matches!(self, Self::NotDuplicable { .. })
    }
}
