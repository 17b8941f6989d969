//! Runtime knobs shared by the controller and the list pipeline.
//!
//! Values can be loaded from `RESTKIT_*` environment variables; anything unset
//! falls back to the defaults below.

use serde::Deserialize;
use std::env;
use std::fmt;

pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;
pub const VALIDATION_ERROR_CODE: &str = "validation_error";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RestkitConfig {
    /// Page size used when a list request names none.
    pub default_limit: u64,
    /// Upper bound applied to any requested page size.
    pub max_limit: u64,
    /// Result cap applied by filters that do not define their own.
    pub collection_max_size: Option<u64>,
    /// List-level code attached to form validation failures.
    pub validation_error_code: String,
}

impl Default for RestkitConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
            collection_max_size: None,
            validation_error_code: VALIDATION_ERROR_CODE.to_string(),
        }
    }
}

/// A `RESTKIT_*` variable held a value that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub variable: &'static str,
    pub value: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid value '{}' for {}", self.value, self.variable)
    }
}

impl std::error::Error for ConfigError {}

impl RestkitConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a numeric variable is not a valid `u64`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a numeric variable is not a valid `u64`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parse = |variable: &'static str| -> Result<Option<u64>, ConfigError> {
            lookup(variable)
                .map(|value| {
                    value.trim().parse::<u64>().map_err(|_| ConfigError {
                        variable,
                        value: value.clone(),
                    })
                })
                .transpose()
        };

        let config = Self {
            default_limit: parse("RESTKIT_DEFAULT_LIMIT")?.unwrap_or(defaults.default_limit),
            max_limit: parse("RESTKIT_MAX_LIMIT")?.unwrap_or(defaults.max_limit),
            collection_max_size: parse("RESTKIT_COLLECTION_MAX_SIZE")?,
            validation_error_code: lookup("RESTKIT_VALIDATION_ERROR_CODE")
                .unwrap_or(defaults.validation_error_code),
        };

        tracing::debug!(?config, "Loaded restkit configuration");
        Ok(config)
    }

    /// Clamp a requested page size into `1..=max_limit`.
    #[must_use]
    pub fn clamp_limit(&self, limit: u64) -> u64 {
        limit.clamp(1, self.max_limit.max(1))
    }
}
