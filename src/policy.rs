use axum::http::{HeaderMap, HeaderName, HeaderValue, header};

use crate::config::PolicyConfig;

/// HSTS max-age applied when no explicit value is configured (1 year).
pub const DEFAULT_HSTS_MAX_AGE: u64 = 31536000;

/// HSTS max-age forced by safe mode (1 day).
pub const SAFE_MODE_HSTS_MAX_AGE: u64 = 86400;

/// How a decided header interacts with headers already on the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Emit only when the response does not already carry the header.
    /// A conflicting downstream value wins; that is a decision, not an error.
    SetIfAbsent,
    /// Emit unconditionally, replacing any downstream value.
    AlwaysOverwrite,
}

/// A single header the engine has decided to emit.
///
/// Names are lowercase by construction (`HeaderName` normalizes on parse).
/// Decision order is fixed so output is deterministic; HTTP semantics do
/// not depend on it.
#[derive(Debug, Clone)]
pub struct HeaderDecision {
    pub name: HeaderName,
    pub value: HeaderValue,
    pub policy: MergePolicy,
}

impl HeaderDecision {
    fn set_if_absent(name: HeaderName, value: HeaderValue) -> Self {
        Self {
            name,
            value,
            policy: MergePolicy::SetIfAbsent,
        }
    }

    fn always_overwrite(name: HeaderName, value: HeaderValue) -> Self {
        Self {
            name,
            value,
            policy: MergePolicy::AlwaysOverwrite,
        }
    }
}

/// The headers to merge into a response, with set-if-absent decisions
/// already resolved against the response's pre-existing headers.
#[derive(Debug, Clone, Default)]
pub struct PolicyResult {
    headers: HeaderMap,
}

impl PolicyResult {
    /// The resolved header name/value mapping.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn get(&self, name: impl AsRef<str>) -> Option<&HeaderValue> {
        self.headers.get(name.as_ref())
    }

    pub fn contains(&self, name: impl AsRef<str>) -> bool {
        self.headers.contains_key(name.as_ref())
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Merge the resolved headers into `target`, replacing any values for
    /// the names this result owns.
    pub fn merge_into(&self, target: &mut HeaderMap) {
        for name in self.headers.keys() {
            let mut values = self.headers.get_all(name).iter();
            if let Some(first) = values.next() {
                target.insert(name.clone(), first.clone());
            }
            for value in values {
                target.append(name.clone(), value.clone());
            }
        }
    }
}

/// Computes the security headers to emit for one response.
///
/// The built-in implementation is [`HeaderPolicyEngine`]; an adapter
/// delegating to an external security-headers library can stand in without
/// changing the middleware.
pub trait HeaderComputer {
    /// Pure function of configuration and pre-existing response headers.
    /// Must not mutate either input and must yield identical results for
    /// identical inputs.
    fn compute(&self, config: &PolicyConfig, existing: &HeaderMap) -> PolicyResult;
}

/// The built-in security-header decision engine.
///
/// Emits six base headers with set-if-absent semantics, plus
/// Strict-Transport-Security (always overwriting) when HSTS is enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderPolicyEngine;

impl HeaderPolicyEngine {
    pub fn new() -> Self {
        Self
    }

    /// Produce the ordered decision sequence for a configuration.
    pub fn decide(&self, config: &PolicyConfig) -> Vec<HeaderDecision> {
        let mut decisions = vec![
            HeaderDecision::set_if_absent(
                HeaderName::from_static("x-permitted-cross-domain-policies"),
                HeaderValue::from_static("none"),
            ),
            HeaderDecision::set_if_absent(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ),
            HeaderDecision::set_if_absent(
                HeaderName::from_static("expect-ct"),
                HeaderValue::from_static("max-age=2147483648"),
            ),
            HeaderDecision::set_if_absent(
                header::REFERRER_POLICY,
                HeaderValue::from_static("no-referrer"),
            ),
            HeaderDecision::set_if_absent(
                header::X_XSS_PROTECTION,
                HeaderValue::from_static("1; mode=block"),
            ),
            HeaderDecision::set_if_absent(
                header::X_FRAME_OPTIONS,
                HeaderValue::from_static("sameorigin"),
            ),
        ];

        if config.hsts_enabled {
            // Segment order is fixed: max-age, includeSubDomains, preload.
            let mut value = format!("max-age={}", effective_hsts_max_age(config));
            if config.hsts_include_subdomains {
                value.push_str("; includeSubDomains");
            }
            if config.hsts_preload {
                value.push_str("; preload");
            }
            if let Ok(value) = HeaderValue::from_str(&value) {
                decisions.push(HeaderDecision::always_overwrite(
                    header::STRICT_TRANSPORT_SECURITY,
                    value,
                ));
            }
        }

        decisions
    }
}

impl HeaderComputer for HeaderPolicyEngine {
    fn compute(&self, config: &PolicyConfig, existing: &HeaderMap) -> PolicyResult {
        let mut headers = HeaderMap::new();

        for decision in self.decide(config) {
            if decision.policy == MergePolicy::SetIfAbsent && existing.contains_key(&decision.name)
            {
                continue;
            }
            headers.insert(decision.name, decision.value);
        }

        PolicyResult { headers }
    }
}

/// Safe mode overrides the configured max-age unconditionally; it is
/// resolved after every other HSTS sub-option.
fn effective_hsts_max_age(config: &PolicyConfig) -> u64 {
    if config.safe_mode {
        SAFE_MODE_HSTS_MAX_AGE
    } else {
        config.hsts_max_age
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE_HEADERS: [&str; 6] = [
        "x-permitted-cross-domain-policies",
        "x-content-type-options",
        "expect-ct",
        "referrer-policy",
        "x-xss-protection",
        "x-frame-options",
    ];

    fn compute(config: &PolicyConfig) -> PolicyResult {
        HeaderPolicyEngine::new().compute(config, &HeaderMap::new())
    }

    #[test]
    fn test_base_headers_always_present() {
        let result = compute(&PolicyConfig::default());

        for name in BASE_HEADERS {
            assert!(result.contains(name), "missing base header {name}");
        }
        assert_eq!(result.len(), 6);
    }

    #[test]
    fn test_base_header_values() {
        let result = compute(&PolicyConfig::default());

        assert_eq!(
            result.get("x-permitted-cross-domain-policies").unwrap(),
            "none"
        );
        assert_eq!(result.get("x-content-type-options").unwrap(), "nosniff");
        assert_eq!(result.get("expect-ct").unwrap(), "max-age=2147483648");
        assert_eq!(result.get("referrer-policy").unwrap(), "no-referrer");
        assert_eq!(result.get("x-xss-protection").unwrap(), "1; mode=block");
        assert_eq!(result.get("x-frame-options").unwrap(), "sameorigin");
    }

    #[test]
    fn test_hsts_disabled_by_default() {
        let result = compute(&PolicyConfig::default());
        assert!(!result.contains("strict-transport-security"));
    }

    #[test]
    fn test_hsts_default_max_age() {
        let config = PolicyConfig::builder().hsts_enabled(true).build();
        let result = compute(&config);

        assert_eq!(
            result.get("strict-transport-security").unwrap(),
            "max-age=31536000"
        );
    }

    #[test]
    fn test_hsts_custom_max_age() {
        let config = PolicyConfig::builder()
            .hsts_enabled(true)
            .hsts_max_age(1337)
            .build();
        let result = compute(&config);

        assert_eq!(
            result.get("strict-transport-security").unwrap(),
            "max-age=1337"
        );
    }

    #[test]
    fn test_hsts_include_subdomains() {
        let config = PolicyConfig::builder()
            .hsts_enabled(true)
            .hsts_include_subdomains(true)
            .build();
        let result = compute(&config);

        assert_eq!(
            result.get("strict-transport-security").unwrap(),
            "max-age=31536000; includeSubDomains"
        );
    }

    #[test]
    fn test_hsts_preload() {
        let config = PolicyConfig::builder()
            .hsts_enabled(true)
            .hsts_preload(true)
            .build();
        let result = compute(&config);

        assert_eq!(
            result.get("strict-transport-security").unwrap(),
            "max-age=31536000; preload"
        );
    }

    #[test]
    fn test_hsts_segment_order_fixed() {
        let config = PolicyConfig::builder()
            .hsts_enabled(true)
            .hsts_include_subdomains(true)
            .hsts_preload(true)
            .build();
        let result = compute(&config);

        assert_eq!(
            result.get("strict-transport-security").unwrap(),
            "max-age=31536000; includeSubDomains; preload"
        );
    }

    #[test]
    fn test_safe_mode_overrides_max_age() {
        let config = PolicyConfig::builder()
            .hsts_enabled(true)
            .hsts_max_age(63072000)
            .safe_mode(true)
            .build();
        let result = compute(&config);

        assert_eq!(
            result.get("strict-transport-security").unwrap(),
            "max-age=86400"
        );
    }

    #[test]
    fn test_safe_mode_keeps_suffixes() {
        let config = PolicyConfig::builder()
            .hsts_enabled(true)
            .hsts_include_subdomains(true)
            .hsts_preload(true)
            .safe_mode(true)
            .build();
        let result = compute(&config);

        assert_eq!(
            result.get("strict-transport-security").unwrap(),
            "max-age=86400; includeSubDomains; preload"
        );
    }

    #[test]
    fn test_safe_mode_without_hsts_emits_nothing() {
        let config = PolicyConfig::builder().safe_mode(true).build();
        let result = compute(&config);

        assert!(!result.contains("strict-transport-security"));
    }

    #[test]
    fn test_existing_base_header_not_clobbered() {
        let mut existing = HeaderMap::new();
        existing.insert("x-frame-options", HeaderValue::from_static("deny"));

        let result = HeaderPolicyEngine::new().compute(&PolicyConfig::default(), &existing);

        assert!(!result.contains("x-frame-options"));
        assert_eq!(result.len(), 5);
    }

    #[test]
    fn test_existing_hsts_still_overwritten() {
        let mut existing = HeaderMap::new();
        existing.insert(
            "strict-transport-security",
            HeaderValue::from_static("max-age=1"),
        );

        let config = PolicyConfig::builder().hsts_enabled(true).build();
        let result = HeaderPolicyEngine::new().compute(&config, &existing);

        assert_eq!(
            result.get("strict-transport-security").unwrap(),
            "max-age=31536000"
        );
    }

    #[test]
    fn test_compute_is_idempotent() {
        let config = PolicyConfig::builder()
            .hsts_enabled(true)
            .hsts_include_subdomains(true)
            .build();
        let existing = HeaderMap::new();

        let engine = HeaderPolicyEngine::new();
        let first = engine.compute(&config, &existing);
        let second = engine.compute(&config, &existing);

        assert_eq!(first.headers(), second.headers());
    }

    #[test]
    fn test_decision_order_deterministic() {
        let config = PolicyConfig::builder().hsts_enabled(true).build();
        let decisions = HeaderPolicyEngine::new().decide(&config);

        let names: Vec<&str> = decisions.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "x-permitted-cross-domain-policies",
                "x-content-type-options",
                "expect-ct",
                "referrer-policy",
                "x-xss-protection",
                "x-frame-options",
                "strict-transport-security",
            ]
        );
    }

    #[test]
    fn test_merge_into_replaces_owned_names_only() {
        let mut target = HeaderMap::new();
        target.insert("content-type", HeaderValue::from_static("text/plain"));
        target.insert(
            "strict-transport-security",
            HeaderValue::from_static("max-age=1"),
        );

        let config = PolicyConfig::builder().hsts_enabled(true).build();
        let result = HeaderPolicyEngine::new().compute(&config, &target);
        result.merge_into(&mut target);

        assert_eq!(target.get("content-type").unwrap(), "text/plain");
        assert_eq!(
            target.get("strict-transport-security").unwrap(),
            "max-age=31536000"
        );
    }
}
