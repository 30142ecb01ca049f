use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::utils::get_env_with_prefix;

/// Security header policy configuration.
///
/// An explicit, validated snapshot of every option the engine recognizes.
/// Absent fields resolve to documented defaults; there is no runtime
/// key lookup. The struct is immutable for the duration of a request once
/// handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PolicyConfig {
    /// Emit the Strict-Transport-Security header
    #[serde(default)]
    pub hsts_enabled: bool,

    /// HSTS max-age in seconds
    #[serde(default = "default_hsts_max_age")]
    pub hsts_max_age: u64,

    /// Append `; includeSubDomains` to the HSTS value
    #[serde(default)]
    pub hsts_include_subdomains: bool,

    /// Append `; preload` to the HSTS value
    #[serde(default)]
    pub hsts_preload: bool,

    /// Safe mode: forces the HSTS max-age down to one day (86400 seconds)
    /// regardless of the configured max-age. Other HSTS sub-options are
    /// unaffected.
    #[serde(default)]
    pub safe_mode: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            hsts_enabled: false,
            hsts_max_age: default_hsts_max_age(),
            hsts_include_subdomains: false,
            hsts_preload: false,
            safe_mode: false,
        }
    }
}

impl PolicyConfig {
    /// Create a new PolicyConfig builder
    pub fn builder() -> PolicyConfigBuilder {
        PolicyConfigBuilder::new()
    }

    /// Load policy configuration from environment variables.
    ///
    /// Recognized variables (checked with a `HEADWAY_` prefix first, then
    /// bare): `HSTS_ENABLED`, `HSTS_MAX_AGE`, `HSTS_INCLUDE_SUBDOMAINS`,
    /// `HSTS_PRELOAD`, `SAFE_MODE`.
    ///
    /// A variable that is present but malformed is a hard error: the
    /// configuration fails closed rather than silently falling back to a
    /// default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(enabled) = get_env_with_prefix("HSTS_ENABLED") {
            config.hsts_enabled = parse_env_bool("HSTS_ENABLED", &enabled)?;
        }

        if let Some(max_age) = get_env_with_prefix("HSTS_MAX_AGE") {
            config.hsts_max_age = max_age.parse().map_err(|_| {
                ConfigError::invalid_value(
                    "HSTS_MAX_AGE",
                    format!("expected an integer number of seconds, got {:?}", max_age),
                )
            })?;
        }

        if let Some(include) = get_env_with_prefix("HSTS_INCLUDE_SUBDOMAINS") {
            config.hsts_include_subdomains = parse_env_bool("HSTS_INCLUDE_SUBDOMAINS", &include)?;
        }

        if let Some(preload) = get_env_with_prefix("HSTS_PRELOAD") {
            config.hsts_preload = parse_env_bool("HSTS_PRELOAD", &preload)?;
        }

        if let Some(safe_mode) = get_env_with_prefix("SAFE_MODE") {
            config.safe_mode = parse_env_bool("SAFE_MODE", &safe_mode)?;
        }

        Ok(config)
    }
}

fn parse_env_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse().map_err(|_| {
        ConfigError::invalid_value(key, format!("expected `true` or `false`, got {:?}", value))
    })
}

/// Builder for PolicyConfig
#[must_use = "builder does nothing until you call build()"]
pub struct PolicyConfigBuilder {
    config: PolicyConfig,
}

impl PolicyConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: PolicyConfig::default(),
        }
    }

    pub fn hsts_enabled(mut self, enabled: bool) -> Self {
        self.config.hsts_enabled = enabled;
        self
    }

    pub fn hsts_max_age(mut self, seconds: u64) -> Self {
        self.config.hsts_max_age = seconds;
        self
    }

    pub fn hsts_include_subdomains(mut self, include: bool) -> Self {
        self.config.hsts_include_subdomains = include;
        self
    }

    pub fn hsts_preload(mut self, preload: bool) -> Self {
        self.config.hsts_preload = preload;
        self
    }

    pub fn safe_mode(mut self, safe_mode: bool) -> Self {
        self.config.safe_mode = safe_mode;
        self
    }

    pub fn build(self) -> PolicyConfig {
        self.config
    }
}

impl Default for PolicyConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn default_hsts_max_age() -> u64 {
    31536000 // 1 year
}
