//! # Mock Transport
//!
//! Utilities for testing the gateway and the API clients without a backend.
//!
//! [`MockTransport`] implements [`Transport`] entirely in memory. Register what each call
//! should answer with the expectation builder, run the code under test, then call
//! [`MockTransport::verify`] to make sure every expectation was used.
//!
//! # Example
//! ```ignore
//! let mock = MockTransport::new();
//! mock.expect_get("/api/auth/me").return_data(user);
//! mock.expect_get("/api/problems").return_code(codes::EXPIRED_TOKEN, "expired");
//!
//! let gateway = Gateway::builder(config).transport(Arc::new(mock.clone())).build()?;
//! // Use gateway in tests...
//! mock.verify();
//! ```
//!
//! Expectations are matched by method and path, first registered first used, so concurrent
//! callers hitting different paths don't depend on scheduling order.

use crate::gateway::envelope::Envelope;
use crate::gateway::transport::{HttpRequest, HttpResponse, Method, Transport, TransportError};
use crate::ui::{Notice, Notifier};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

#[derive(Debug, Clone)]
enum Reply {
    Response(HttpResponse),
    Failure(TransportError),
}

#[derive(Debug)]
struct Expectation {
    method: Method,
    path: String,
    delay: Option<Duration>,
    reply: Reply,
}

/// An in-memory transport with expectation tracking.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect(&self, method: Method, path: impl Into<String>) -> ExpectationBuilder {
        ExpectationBuilder {
            method,
            path: path.into(),
            delay: None,
            expectations: self.expectations.clone(),
        }
    }

    pub fn expect_get(&self, path: impl Into<String>) -> ExpectationBuilder {
        self.expect(Method::Get, path)
    }

    pub fn expect_post(&self, path: impl Into<String>) -> ExpectationBuilder {
        self.expect(Method::Post, path)
    }

    pub fn expect_put(&self, path: impl Into<String>) -> ExpectationBuilder {
        self.expect(Method::Put, path)
    }

    pub fn expect_delete(&self, path: impl Into<String>) -> ExpectationBuilder {
        self.expect(Method::Delete, path)
    }

    /// Every request that reached the transport, in arrival order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap_or_else(PoisonError::into_inner);
        if !exps.is_empty() {
            let left: Vec<_> = exps.iter().map(|e| format!("{} {}", e.method, e.path)).collect();
            panic!("Not all expectations were met. {} remaining: {:?}", exps.len(), left);
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).push(request.clone());

        let expectation = {
            let mut exps = self.expectations.lock().unwrap_or_else(PoisonError::into_inner);
            let position = exps
                .iter()
                .position(|e| e.method == request.method && e.path == request.path);
            match position.and_then(|i| exps.remove(i)) {
                Some(expectation) => expectation,
                None => panic!("Unexpected request: {} {}", request.method, request.path),
            }
        };

        if let Some(delay) = expectation.delay {
            tokio::time::sleep(delay).await;
        }

        match expectation.reply {
            Reply::Response(response) => Ok(response),
            Reply::Failure(error) => Err(error),
        }
    }
}

/// Builder for a single expectation.
pub struct ExpectationBuilder {
    method: Method,
    path: String,
    delay: Option<Duration>,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl ExpectationBuilder {
    /// Holds the reply back for `delay` (virtual time under a paused clock).
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Replies with a success envelope around `data`.
    pub fn return_data<T: Serialize>(self, data: T) {
        self.return_envelope(Envelope::success(data));
    }

    /// Replies with a failed envelope (HTTP 200, non-success code).
    pub fn return_code(self, code: i32, message: &str) {
        self.return_envelope(Envelope::<()>::failure(code, message));
    }

    pub fn return_envelope<T: Serialize>(self, envelope: Envelope<T>) {
        let body = serde_json::to_vec(&envelope).expect("mock envelope serializes");
        self.return_status(200, body);
    }

    /// Replies with a raw status and body.
    pub fn return_status(self, status: u16, body: impl Into<Vec<u8>>) {
        self.push(Reply::Response(HttpResponse {
            status,
            body: body.into(),
        }));
    }

    /// Fails as if the backend could not be reached.
    pub fn return_unreachable(self) {
        self.push(Reply::Failure(TransportError::Unreachable(
            "connection refused".to_owned(),
        )));
    }

    pub fn return_timeout(self) {
        self.push(Reply::Failure(TransportError::Timeout));
    }

    fn push(self, reply: Reply) {
        let mut exps = self.expectations.lock().unwrap_or_else(PoisonError::into_inner);
        exps.push_back(Expectation {
            method: self.method,
            path: self.path,
            delay: self.delay,
            reply,
        });
    }
}

// =============================================================================
// NOTICE RECORDING
// =============================================================================

/// A [`Notifier`] that keeps every notice for later assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn count(&self) -> usize {
        self.notices.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap_or_else(PoisonError::into_inner).push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn get(path: &str) -> HttpRequest {
        HttpRequest {
            method: Method::Get,
            path: path.to_owned(),
            query: Vec::new(),
            body: None,
            bearer: None,
        }
    }

    #[tokio::test]
    async fn test_mock_transport_with_expectations() {
        let mock = MockTransport::new();
        mock.expect_get("/api/a").return_data(json!({ "n": 1 }));
        mock.expect_get("/api/b").return_unreachable();

        // Out of registration order: matching is by path.
        let b = mock.send(get("/api/b")).await;
        assert!(matches!(b, Err(TransportError::Unreachable(_))));

        let a = mock.send(get("/api/a")).await.unwrap();
        let envelope: Envelope = serde_json::from_slice(&a.body).unwrap();
        assert_eq!(envelope.data, Some(json!({ "n": 1 })));

        assert_eq!(mock.request_count(), 2);
        mock.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "Not all expectations were met")]
    async fn test_verify_reports_unused_expectations() {
        let mock = MockTransport::new();
        mock.expect_post("/api/auth/login").return_status(500, "");
        mock.verify();
    }
}
