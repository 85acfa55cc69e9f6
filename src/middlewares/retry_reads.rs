use async_trait::async_trait;
use reqwest::{Method, Request, Response};
use reqwest_middleware::{Middleware, Next};
use reqwest_retry::RetryTransientMiddleware;
use retry_policies::{RetryDecision, RetryPolicy};
use std::{
    fmt::{Debug, Formatter},
    sync::Arc,
};
use task_local_extensions::Extensions;

/// Retries transient failures (network errors, `5xx`, `408`, `429`) of read requests.
///
/// Only `GET`, `HEAD` and `OPTIONS` requests go through the retry policy. Everything else,
/// notably the token `POST`, is sent exactly once.
pub struct RetryReadsMiddleware {
    inner: RetryTransientMiddleware<DynRetryPolicy>,
}

impl RetryReadsMiddleware {
    pub fn new(retry_policy: DynRetryPolicy) -> Self {
        Self {
            inner: RetryTransientMiddleware::new_with_policy(retry_policy),
        }
    }
}

fn is_read(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD || *method == Method::OPTIONS
}

#[async_trait]
impl Middleware for RetryReadsMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        if !is_read(req.method()) {
            tracing::trace!("Not retrying {} {}", req.method(), req.url().path());
            return next.run(req, extensions).await;
        }

        self.inner.handle(req, extensions, next).await
    }
}

/// Object-safe handle on a retry policy, so the client builder can accept any policy.
#[derive(Clone)]
pub struct DynRetryPolicy(pub Arc<dyn RetryPolicy + Send + Sync + 'static>);

impl RetryPolicy for DynRetryPolicy {
    fn should_retry(&self, n_past_retries: u32) -> RetryDecision {
        self.0.should_retry(n_past_retries)
    }
}

impl Debug for DynRetryPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynRetryPolicy").finish_non_exhaustive()
    }
}
