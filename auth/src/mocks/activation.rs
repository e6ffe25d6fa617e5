//! Mock finalization API for testing.

use super::lock;
use crate::error::CommitError;
use crate::providers::{ActivationApi, ActivationRequest, ActivationResponse};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug)]
struct Inner {
    result: Mutex<Result<ActivationResponse, CommitError>>,
    delay: Mutex<Duration>,
    requests: Mutex<Vec<(String, ActivationRequest)>>,
}

/// Mock finalization API.
///
/// Records every request together with the bearer token it carried.
#[derive(Debug, Clone)]
pub struct MockActivationApi {
    inner: Arc<Inner>,
}

impl MockActivationApi {
    /// Create an API that accepts every request.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                result: Mutex::new(Ok(ActivationResponse {
                    body: serde_json::json!({ "success": true }),
                })),
                delay: Mutex::new(Duration::ZERO),
                requests: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Reject requests with `status` and `message`.
    #[must_use]
    pub fn with_rejection(self, status: u16, message: impl Into<String>) -> Self {
        self.set_rejection(status, message);
        self
    }

    /// Fail requests before any response arrives.
    #[must_use]
    pub fn with_transport_failure(self, reason: impl Into<String>) -> Self {
        self.set_transport_failure(reason);
        self
    }

    /// Delay every request.
    #[must_use]
    pub fn with_delay(self, delay: Duration) -> Self {
        *lock(&self.inner.delay) = delay;
        self
    }

    /// Reject subsequent requests.
    pub fn set_rejection(&self, status: u16, message: impl Into<String>) {
        *lock(&self.inner.result) = Err(CommitError::Rejected {
            status,
            message: message.into(),
        });
    }

    /// Fail subsequent requests before any response arrives.
    pub fn set_transport_failure(&self, reason: impl Into<String>) {
        *lock(&self.inner.result) = Err(CommitError::Transport(reason.into()));
    }

    /// Accept subsequent requests.
    pub fn set_success(&self) {
        *lock(&self.inner.result) = Ok(ActivationResponse::default());
    }

    /// Number of requests received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        lock(&self.inner.requests).len()
    }

    /// Requests received, with their bearer tokens.
    #[must_use]
    pub fn requests(&self) -> Vec<(String, ActivationRequest)> {
        lock(&self.inner.requests).clone()
    }
}

impl Default for MockActivationApi {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivationApi for MockActivationApi {
    fn activate_account(
        &self,
        access_token: &str,
        request: &ActivationRequest,
    ) -> impl Future<Output = Result<ActivationResponse, CommitError>> + Send {
        let inner = Arc::clone(&self.inner);
        lock(&inner.requests).push((access_token.to_string(), request.clone()));

        async move {
            let delay = *lock(&inner.delay);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            lock(&inner.result).clone()
        }
    }
}
