//! # Session Store
//!
//! Holds the bearer token and the cached user profile, and mirrors every change into
//! [`Storage`]. Lifecycle:
//!
//! - **Created** by a successful login ([`SessionStore::set_token`]).
//! - **Never refreshed**: a new token only comes from logging in again.
//! - **Destroyed** by logout or by any auth-failure classification ([`SessionStore::clear`]).

use super::{SessionError, Storage, TOKEN_KEY, USER_KEY};
use crate::model::AuthUser;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Snapshot of the current authentication state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthSession {
    pub token: Option<String>,
    pub user: Option<AuthUser>,
}

impl AuthSession {
    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }
}

pub struct SessionStore {
    storage: Arc<dyn Storage>,
    state: RwLock<AuthSession>,
}

impl SessionStore {
    /// Restores whatever session the storage holds.
    ///
    /// A user record that no longer parses is removed; the token is kept.
    pub fn restore(storage: Arc<dyn Storage>) -> Self {
        let token = storage.get(TOKEN_KEY).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read stored token");
            None
        });

        let user = match storage.get(USER_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<AuthUser>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(error = %e, "Discarding unreadable stored user");
                    if let Err(e) = storage.remove(USER_KEY) {
                        warn!(error = %e, "Failed to remove stored user");
                    }
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read stored user");
                None
            }
        };

        debug!(has_token = token.is_some(), has_user = user.is_some(), "Session restored");
        Self {
            storage,
            state: RwLock::new(AuthSession { token, user }),
        }
    }

    pub fn snapshot(&self) -> AuthSession {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .clone()
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_logged_in()
    }

    /// Username of the cached profile, or a generic label.
    pub fn display_name(&self) -> String {
        self.user()
            .and_then(|u| u.username)
            .unwrap_or_else(|| "User".to_owned())
    }

    pub fn set_token(&self, token: &str) -> Result<(), SessionError> {
        self.storage.set(TOKEN_KEY, token)?;
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .token = Some(token.to_owned());
        info!("Session token stored");
        Ok(())
    }

    pub fn set_user(&self, user: AuthUser) -> Result<(), SessionError> {
        self.storage.set(USER_KEY, &serde_json::to_string(&user)?)?;
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .user = Some(user);
        Ok(())
    }

    /// Drops token and profile from memory and storage.
    ///
    /// Runs on failure paths, so storage errors are logged instead of returned.
    pub fn clear(&self) {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.token = None;
            state.user = None;
        }
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                warn!(key, error = %e, "Failed to remove session record");
            }
        }
        info!("Session cleared");
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("logged_in", &self.is_logged_in())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStorage;

    fn alice() -> AuthUser {
        AuthUser {
            user_id: Some(1),
            username: Some("alice".into()),
            email: Some("alice@example.com".into()),
            status: Some(1),
            ..AuthUser::default()
        }
    }

    #[test]
    fn test_set_and_restore_round_trip() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let store = SessionStore::restore(storage.clone());
        assert!(!store.is_logged_in());
        assert_eq!(store.display_name(), "User");

        store.set_token("t-1").unwrap();
        store.set_user(alice()).unwrap();

        let restored = SessionStore::restore(storage);
        assert_eq!(restored.token().as_deref(), Some("t-1"));
        assert_eq!(restored.display_name(), "alice");
    }

    #[test]
    fn test_unreadable_user_is_discarded() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage.set(TOKEN_KEY, "t-1").unwrap();
        storage.set(USER_KEY, "{broken").unwrap();

        let store = SessionStore::restore(storage.clone());
        assert!(store.is_logged_in());
        assert!(store.user().is_none());
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
    }

    #[test]
    fn test_clear_removes_both_records() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let store = SessionStore::restore(storage.clone());
        store.set_token("t-1").unwrap();
        store.set_user(alice()).unwrap();

        store.clear();
        assert_eq!(store.snapshot(), AuthSession::default());
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
    }
}
