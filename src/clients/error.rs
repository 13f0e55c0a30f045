//! Error types for the API clients.

use crate::codes;
use crate::gateway::GatewayError;
use crate::session::SessionError;
use thiserror::Error;

/// Errors that can occur during login, registration and session calls.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A form failed local validation; nothing was sent.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The session could not be persisted.
    #[error(transparent)]
    Storage(#[from] SessionError),
}

impl AuthError {
    /// True when the underlying call was a duplicate or suppressed rejection.
    pub fn is_flow_control(&self) -> bool {
        matches!(self, AuthError::Gateway(e) if e.is_flow_control())
    }

    /// True when the server rejected the credentials or the token itself.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::Gateway(e)
                if matches!(e.kind(), Some(codes::ErrorKind::Auth | codes::ErrorKind::Permission))
        )
    }
}

/// Errors that can occur during user management calls.
#[derive(Debug, Error)]
pub enum UserError {
    /// The requested user does not exist.
    #[error("User not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Gateway(GatewayError),
}

impl From<GatewayError> for UserError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Api {
                code: codes::NOT_FOUND,
                message,
                ..
            } => UserError::NotFound(message),
            other => UserError::Gateway(other),
        }
    }
}
