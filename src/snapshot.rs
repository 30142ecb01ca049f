use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::PolicyConfig;
use crate::error::ConfigError;

/// A typed configuration value as loaded from an external source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(u64),
    Str(String),
}

impl ConfigValue {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Str(_) => "string",
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<u64> for ConfigValue {
    fn from(v: u64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

/// Immutable mapping from dotted option keys to typed values.
///
/// This is the raw form a configuration loader hands over: keys like
/// `hsts.enabled` or `safeMode`, values as whatever type the source
/// produced. [`resolve`](Self::resolve) validates the snapshot into a
/// [`PolicyConfig`] in one pass; after that, no dynamic lookups remain.
///
/// Unknown keys are ignored so that a newer configuration file can be read
/// by an older binary. A recognized key with the wrong type is an error.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConfigSnapshot {
    #[serde(flatten)]
    entries: BTreeMap<String, ConfigValue>,
}

impl ConfigSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value for a dotted key, replacing any previous value.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    /// Validate the snapshot into a [`PolicyConfig`].
    ///
    /// Fails fast on the first recognized key with a mismatched type; no
    /// partial configuration is returned.
    pub fn resolve(&self) -> Result<PolicyConfig, ConfigError> {
        let mut config = PolicyConfig::default();

        if let Some(v) = self.entries.get("hsts.enabled") {
            config.hsts_enabled = expect_bool("hsts.enabled", v)?;
        }
        if let Some(v) = self.entries.get("hsts.maxAge") {
            config.hsts_max_age = expect_int("hsts.maxAge", v)?;
        }
        if let Some(v) = self.entries.get("hsts.includeSubDomains") {
            config.hsts_include_subdomains = expect_bool("hsts.includeSubDomains", v)?;
        }
        if let Some(v) = self.entries.get("hsts.preload") {
            config.hsts_preload = expect_bool("hsts.preload", v)?;
        }
        if let Some(v) = self.entries.get("safeMode") {
            config.safe_mode = expect_bool("safeMode", v)?;
        }

        Ok(config)
    }
}

fn expect_bool(key: &str, value: &ConfigValue) -> Result<bool, ConfigError> {
    match value {
        ConfigValue::Bool(b) => Ok(*b),
        other => Err(ConfigError::invalid_type(key, "boolean", other.type_name())),
    }
}

fn expect_int(key: &str, value: &ConfigValue) -> Result<u64, ConfigError> {
    match value {
        ConfigValue::Int(n) => Ok(*n),
        other => Err(ConfigError::invalid_type(key, "integer", other.type_name())),
    }
}
