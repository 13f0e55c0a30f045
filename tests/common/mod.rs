//! Shared wiring for the integration tests: a gateway over a [`MockTransport`] with every
//! side effect observable.

#![allow(dead_code)]

use judge_gateway::config::GatewayConfig;
use judge_gateway::gateway::mock::{MockTransport, RecordingNotifier};
use judge_gateway::gateway::Gateway;
use judge_gateway::model::AuthUser;
use judge_gateway::session::{MemoryStorage, SessionError, SessionStore, Storage, TOKEN_KEY};
use judge_gateway::ui::{HistoryNavigator, Route};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Memory storage that counts how often the token record is removed.
#[derive(Debug, Default)]
pub struct CountingStorage {
    inner: MemoryStorage,
    token_removals: AtomicUsize,
}

impl CountingStorage {
    pub fn token_removals(&self) -> usize {
        self.token_removals.load(Ordering::SeqCst)
    }
}

impl Storage for CountingStorage {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        if key == TOKEN_KEY {
            self.token_removals.fetch_add(1, Ordering::SeqCst);
        }
        self.inner.remove(key)
    }
}

pub struct Harness {
    pub gateway: Gateway,
    pub mock: MockTransport,
    pub storage: Arc<CountingStorage>,
    pub navigator: Arc<HistoryNavigator>,
    pub notifier: RecordingNotifier,
}

impl Harness {
    pub fn new(config: GatewayConfig) -> Self {
        Self::on_route(config, Route::new("problems", "/problems?page=2"))
    }

    /// Builds the harness with the user currently on `start`.
    pub fn on_route(config: GatewayConfig, start: Route) -> Self {
        let mock = MockTransport::new();
        let storage = Arc::new(CountingStorage::default());
        let navigator = Arc::new(HistoryNavigator::new(start, config.login_route.clone()));
        let notifier = RecordingNotifier::new();

        let gateway = Gateway::builder(config)
            .transport(Arc::new(mock.clone()))
            .session(Arc::new(SessionStore::restore(storage.clone())))
            .navigator(navigator.clone())
            .notifier(Arc::new(notifier.clone()))
            .build()
            .expect("mock gateway builds");

        Self {
            gateway,
            mock,
            storage,
            navigator,
            notifier,
        }
    }

    /// Same as [`Harness::new`] with a stored session for `alice`.
    pub fn logged_in(config: GatewayConfig) -> Self {
        let harness = Self::new(config);
        harness
            .gateway
            .session()
            .set_token("t-1")
            .expect("token stored");
        harness
            .gateway
            .session()
            .set_user(alice())
            .expect("user stored");
        harness
    }
}

pub fn alice() -> AuthUser {
    AuthUser {
        user_id: Some(1),
        username: Some("alice".into()),
        email: Some("alice@example.com".into()),
        status: Some(1),
        ..AuthUser::default()
    }
}
