//! Headway - security headers for Axum applications
//!
//! Headway computes a set of HTTP security response headers from a validated
//! configuration and merges them into outgoing responses via a Tower layer.
//! Six base headers are always applied with set-if-absent semantics;
//! Strict-Transport-Security is applied when enabled and overrides any
//! handler-set value.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use axum::{Router, routing::get};
//! use headway::{PolicyConfig, SecurityHeadersLayer};
//!
//! let config = PolicyConfig::builder()
//!     .hsts_enabled(true)
//!     .hsts_include_subdomains(true)
//!     .build();
//!
//! let app: Router = Router::new()
//!     .route("/", get(|| async { "ok" }))
//!     .layer(SecurityHeadersLayer::new(config));
//! ```
//!
//! The engine itself is a pure function and usable without the middleware:
//!
//! ```rust
//! use axum::http::HeaderMap;
//! use headway::{HeaderComputer, HeaderPolicyEngine, PolicyConfig};
//!
//! let result = HeaderPolicyEngine::new().compute(&PolicyConfig::default(), &HeaderMap::new());
//! assert_eq!(result.get("referrer-policy").unwrap(), "no-referrer");
//! ```

mod config;
mod error;
mod layer;
mod policy;
mod snapshot;
pub mod utils;

// Re-exports for public API
pub use config::{PolicyConfig, PolicyConfigBuilder};
pub use error::{ConfigError, Result};
pub use layer::{SecurityHeadersLayer, SecurityHeadersService};
pub use policy::{
    DEFAULT_HSTS_MAX_AGE, HeaderComputer, HeaderDecision, HeaderPolicyEngine, MergePolicy,
    PolicyResult, SAFE_MODE_HSTS_MAX_AGE,
};
pub use snapshot::{ConfigSnapshot, ConfigValue};
