//! # Request Gateway
//!
//! Every outbound call goes through [`Gateway::dispatch`]. In order, it:
//!
//! 1. Rejects the call locally if an auth failure just opened the suppression window
//!    (allow-listed login/registration paths still go out).
//! 2. Registers the call's [`RequestKey`]; an identical call already in flight is rejected
//!    as a duplicate and never reaches the network.
//! 3. Attaches `Authorization: Bearer <token>` when a session exists.
//! 4. Sends it through the [`Transport`] under the configured timeout ceiling.
//! 5. Unwraps the [`Envelope`], or classifies the failure and reacts to it.
//!
//! ## Architecture Note
//! All mutable state (in-flight keys, debounce timestamps, the session) lives in one context
//! built once by [`GatewayBuilder`]. [`Gateway`] is a cheap handle onto that context: clone
//! it into every client that needs to make calls. There are no module-level singletons.
//!
//! ## Failure Reactions
//! - **Auth / permission codes** (envelope code or HTTP status, same table) run the debounced
//!   auth-failure path: clear the session, notify, redirect to login unless already there.
//! - **Other classified codes** notify at warning or error level unless marked silent.
//! - **No response** (unreachable, timeout) notifies a generic connectivity error. The session
//!   is left alone.
//! - **Duplicate / suppressed** rejections are logged at debug level and nothing else.

use crate::codes::{self, classify, Classification};
use crate::config::GatewayConfig;
use crate::gateway::auth_guard::AuthGuard;
use crate::gateway::envelope::Envelope;
use crate::gateway::error::GatewayError;
use crate::gateway::pending::{PendingRequests, RequestKey};
use crate::gateway::transport::{
    HttpRequest, HttpResponse, Method, ReqwestTransport, Transport, TransportError,
};
use crate::session::{MemoryStorage, SessionStore};
use crate::ui::{HistoryNavigator, Navigator, Notice, NoticeLevel, Notifier, Route, TracingNotifier};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, error, instrument, warn};

// =============================================================================
// 1. THE REQUEST
// =============================================================================

/// A logical API call before auth and transport details are added.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<Value>,
    pub body: Option<Value>,
    /// Path recorded in spans and logs instead of `path`, for paths that carry secrets.
    pub log_path: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            body: None,
            log_path: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_query<Q: Serialize + ?Sized>(mut self, query: &Q) -> Result<Self, GatewayError> {
        self.query = Some(serde_json::to_value(query).map_err(GatewayError::Encode)?);
        Ok(self)
    }

    pub fn with_body<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, GatewayError> {
        self.body = Some(serde_json::to_value(body).map_err(GatewayError::Encode)?);
        Ok(self)
    }

    /// Records `template` (e.g. `/api/auth/validate/{token}`) in spans instead of the real path.
    pub fn with_log_path(mut self, template: impl Into<String>) -> Self {
        self.log_path = Some(template.into());
        self
    }

    pub fn display_path(&self) -> &str {
        self.log_path.as_deref().unwrap_or(&self.path)
    }

    pub fn key(&self) -> RequestKey {
        RequestKey::new(
            self.method,
            &self.path,
            self.query.as_ref(),
            self.body.as_ref(),
        )
    }
}

/// Flattens a JSON object into query pairs. Nulls are skipped and arrays are comma-joined.
fn query_pairs(query: Option<&Value>) -> Vec<(String, String)> {
    let Some(Value::Object(map)) = query else {
        return Vec::new();
    };
    map.iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), query_value(v)))
        .collect()
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(query_value).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

/// Body shape of non-2xx responses; only the message is of interest.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

// =============================================================================
// 2. THE GATEWAY CONTEXT
// =============================================================================

struct GatewayInner {
    config: GatewayConfig,
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    pending: PendingRequests,
    auth_guard: AuthGuard,
}

/// Handle onto the shared gateway context.
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<GatewayInner>,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("base_url", &self.inner.config.base_url)
            .field("in_flight", &self.inner.pending.len())
            .finish_non_exhaustive()
    }
}

/// Assembles a [`Gateway`]. Anything not supplied gets a headless default.
pub struct GatewayBuilder {
    config: GatewayConfig,
    transport: Option<Arc<dyn Transport>>,
    session: Option<Arc<SessionStore>>,
    navigator: Option<Arc<dyn Navigator>>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl GatewayBuilder {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            transport: None,
            session: None,
            navigator: None,
            notifier: None,
        }
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn session(mut self, session: Arc<SessionStore>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Builds the context. Without an explicit transport a reqwest client is created.
    pub fn build(self) -> Result<Gateway, TransportError> {
        let config = self.config;
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(config.base_url.clone(), config.timeout)?),
        };
        let session = self
            .session
            .unwrap_or_else(|| Arc::new(SessionStore::restore(Arc::new(MemoryStorage::new()))));
        let navigator = self.navigator.unwrap_or_else(|| {
            Arc::new(HistoryNavigator::new(
                Route::new("home", "/"),
                config.login_route.clone(),
            ))
        });
        let notifier = self
            .notifier
            .unwrap_or_else(|| Arc::new(TracingNotifier));
        let auth_guard = AuthGuard::new(config.auth_debounce, config.allow_list.clone());

        Ok(Gateway {
            inner: Arc::new(GatewayInner {
                config,
                transport,
                session,
                navigator,
                notifier,
                pending: PendingRequests::new(),
                auth_guard,
            }),
        })
    }
}

// =============================================================================
// 3. DISPATCH
// =============================================================================

impl Gateway {
    pub fn builder(config: GatewayConfig) -> GatewayBuilder {
        GatewayBuilder::new(config)
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.inner.session
    }

    pub fn pending(&self) -> &PendingRequests {
        &self.inner.pending
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.inner.navigator
    }

    /// Closes the auth-failure suppression window after a successful login.
    pub fn end_auth_suppression(&self) {
        self.inner.auth_guard.reset();
    }

    pub fn notify(&self, level: NoticeLevel, message: impl Into<String>) {
        self.inner.notifier.notify(Notice::new(level, message));
    }

    /// Sends `request` and returns the unwrapped envelope payload.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.display_path()))]
    pub async fn dispatch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, GatewayError> {
        let inner = &self.inner;

        if inner.auth_guard.is_suppressed(&request.path, Instant::now()) {
            debug!("Request suppressed after auth failure");
            return Err(GatewayError::Suppressed {
                path: request.display_path().to_owned(),
            });
        }

        // Held until this function returns, on every path.
        let _pending = if inner.config.deduplicate {
            let key = request.key();
            match inner.pending.try_acquire(key.clone()) {
                Some(guard) => Some(guard),
                None => {
                    debug!("Duplicate request ignored");
                    return Err(GatewayError::Duplicate { key: key.to_string() });
                }
            }
        } else {
            None
        };

        let http = HttpRequest {
            method: request.method,
            query: query_pairs(request.query.as_ref()),
            path: request.path,
            body: request.body,
            bearer: inner.session.token(),
        };

        let response =
            match tokio::time::timeout(inner.config.timeout, inner.transport.send(http)).await {
                Ok(Ok(response)) => response,
                Ok(Err(TransportError::Timeout)) | Err(_) => {
                    return Err(self.connectivity_failure(GatewayError::Timeout(inner.config.timeout)))
                }
                Ok(Err(e)) => return Err(self.connectivity_failure(GatewayError::Network(e.to_string()))),
            };

        self.unwrap_response(response)
    }

    fn unwrap_response<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, GatewayError> {
        if !response.is_success() {
            let server_message = serde_json::from_slice::<ErrorBody>(&response.body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| format!("Request failed with status {}", response.status));
            let classification = classify(i32::from(response.status), Some(&server_message));
            return Err(self.fail(classification));
        }

        let envelope: Envelope = serde_json::from_slice(&response.body).map_err(|e| {
            error!(error = %e, "Response is not an envelope");
            self.notify(NoticeLevel::Error, codes::FALLBACK_MESSAGE);
            GatewayError::Decode(e)
        })?;

        if !envelope.is_success() {
            let classification = classify(envelope.code, Some(&envelope.message));
            return Err(self.fail(classification));
        }

        envelope.into_data().map_err(|e| {
            error!(error = %e, "Payload does not match the expected type");
            GatewayError::Decode(e)
        })
    }

    fn fail(&self, c: Classification) -> GatewayError {
        warn!(code = c.code, kind = %c.kind, message = %c.message, "Request failed");
        if c.is_auth_failure() {
            self.handle_auth_failure(&c);
        } else if !c.silent {
            self.notify(notice_level(&c), c.message.clone());
        }
        GatewayError::Api {
            code: c.code,
            kind: c.kind,
            message: c.message,
        }
    }

    /// Clears the session and sends the user to login, at most once per debounce window.
    fn handle_auth_failure(&self, c: &Classification) {
        let inner = &self.inner;
        if !inner.auth_guard.trip(Instant::now()) {
            debug!(code = c.code, "Auth failure debounced");
            return;
        }

        if c.clear_auth {
            inner.session.clear();
        }
        if !c.silent {
            self.notify(notice_level(c), c.message.clone());
        }
        if c.redirect_to_login {
            let route = inner.navigator.current_route();
            if route.name != inner.config.login_route {
                inner.navigator.redirect_to_login(&route.full_path);
            }
        }
    }

    fn connectivity_failure(&self, err: GatewayError) -> GatewayError {
        error!(error = %err, "No response from backend");
        self.notify(NoticeLevel::Error, codes::NETWORK_MESSAGE);
        err
    }

    // --- Verb helpers ---

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        self.dispatch(ApiRequest::get(path)).await
    }

    pub async fn get_with<T, Q>(&self, path: &str, query: &Q) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = ApiRequest::get(path).with_query(query)?;
        self.dispatch(request).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = ApiRequest::post(path).with_body(body)?;
        self.dispatch(request).await
    }

    /// POST with query parameters and no body.
    pub async fn post_with<T, Q>(&self, path: &str, query: &Q) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = ApiRequest::post(path).with_query(query)?;
        self.dispatch(request).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = ApiRequest::put(path).with_body(body)?;
        self.dispatch(request).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        self.dispatch(ApiRequest::delete(path)).await
    }
}

fn notice_level(c: &Classification) -> NoticeLevel {
    if c.warning {
        NoticeLevel::Warning
    } else {
        NoticeLevel::Error
    }
}
