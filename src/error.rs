/// Configuration validation error.
///
/// Raised before any header computation happens: a snapshot or environment
/// value with the wrong type for a recognized key is rejected fail-closed,
/// and no partial header set is ever produced.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid type for `{key}`: expected {expected}, got {found}")]
    InvalidType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue { key: String, reason: String },
}

impl ConfigError {
    pub fn invalid_type(
        key: impl Into<String>,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        Self::InvalidType {
            key: key.into(),
            expected,
            found,
        }
    }

    pub fn invalid_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for configuration resolution
pub type Result<T> = std::result::Result<T, ConfigError>;
