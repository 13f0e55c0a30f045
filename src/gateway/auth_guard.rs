//! # Auth-Failure Debounce
//!
//! When a token expires, every view on screen tends to fail at once. Without a guard each
//! failure would clear the session and push the login page again. [`AuthGuard`] lets the side
//! effects run once per window, and for the same window blocks new outbound requests except
//! the ones needed to log back in.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Paths that stay reachable while requests are suppressed.
pub const DEFAULT_ALLOW_LIST: &[&str] = &[
    "/api/auth/login",
    "/api/auth/register",
    "/api/auth/send-code",
    "/api/auth/validate",
    "login",
];

#[derive(Debug, Default)]
struct GuardState {
    last_failure: Option<Instant>,
    suppress_until: Option<Instant>,
}

#[derive(Debug)]
pub struct AuthGuard {
    window: Duration,
    allow_list: Vec<String>,
    state: Mutex<GuardState>,
}

impl AuthGuard {
    pub fn new(window: Duration, allow_list: Vec<String>) -> Self {
        Self {
            window,
            allow_list,
            state: Mutex::new(GuardState::default()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Records an auth failure at `now`.
    ///
    /// Returns `true` when the caller should run the clear/redirect side effects, which is
    /// at most once per window. A winning trip also opens the suppression window.
    pub fn trip(&self, now: Instant) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(last) = state.last_failure {
            if now.saturating_duration_since(last) < self.window {
                return false;
            }
        }
        state.last_failure = Some(now);
        state.suppress_until = Some(now + self.window);
        true
    }

    /// True when a request to `path` must be rejected locally.
    pub fn is_suppressed(&self, path: &str, now: Instant) -> bool {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match state.suppress_until {
            Some(until) if now < until => !self.is_allowed(path),
            _ => false,
        }
    }

    /// Forgets the last failure and closes any open suppression window.
    ///
    /// Called once a fresh login has succeeded: the new token is not the one that failed.
    pub fn reset(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state = GuardState::default();
    }

    fn is_allowed(&self, path: &str) -> bool {
        self.allow_list.iter().any(|entry| path.contains(entry.as_str()))
    }
}
