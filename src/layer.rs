use axum::body::Body;
use axum::{extract::Request, http::Response};
use futures::future::BoxFuture;
use tower::Service;

use crate::config::PolicyConfig;
use crate::policy::{HeaderComputer, HeaderPolicyEngine};

/// Tower layer that merges security headers into outgoing responses.
///
/// The engine runs after the inner service resolves, against the headers
/// the handler already set: base headers are added only if absent, HSTS
/// (when enabled) replaces any handler-set value.
#[derive(Debug, Clone)]
pub struct SecurityHeadersLayer<C = HeaderPolicyEngine> {
    config: PolicyConfig,
    computer: C,
}

impl SecurityHeadersLayer {
    /// Layer using the built-in [`HeaderPolicyEngine`].
    pub fn new(config: PolicyConfig) -> Self {
        Self {
            config,
            computer: HeaderPolicyEngine::new(),
        }
    }
}

impl<C> SecurityHeadersLayer<C>
where
    C: HeaderComputer,
{
    /// Layer delegating header computation to a custom computer, e.g. an
    /// adapter over an external security-headers library.
    pub fn with_computer(config: PolicyConfig, computer: C) -> Self {
        Self { config, computer }
    }
}

impl<S, C> tower::Layer<S> for SecurityHeadersLayer<C>
where
    C: Clone,
{
    type Service = SecurityHeadersService<S, C>;

    fn layer(&self, inner: S) -> Self::Service {
        SecurityHeadersService {
            inner,
            config: self.config.clone(),
            computer: self.computer.clone(),
        }
    }
}

/// Tower service produced by [`SecurityHeadersLayer`]
#[derive(Debug, Clone)]
pub struct SecurityHeadersService<S, C = HeaderPolicyEngine> {
    inner: S,
    config: PolicyConfig,
    computer: C,
}

impl<S, C> Service<Request> for SecurityHeadersService<S, C>
where
    S: Service<Request, Response = Response<Body>> + Send + 'static,
    S::Future: Send + 'static,
    C: HeaderComputer + Clone + Send + 'static,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let config = self.config.clone();
        let computer = self.computer.clone();
        let fut = self.inner.call(req);

        Box::pin(async move {
            let mut response = fut.await?;
            let result = computer.compute(&config, response.headers());
            if !result.is_empty() {
                tracing::debug!(headers = result.len(), "applying security headers");
                result.merge_into(response.headers_mut());
            }
            Ok(response)
        })
    }
}
