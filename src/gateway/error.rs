//! # Gateway Errors
//!
//! Two variants are not failures at all: [`GatewayError::Duplicate`] and
//! [`GatewayError::Suppressed`] are local flow-control signals. Callers should drop them
//! silently; [`GatewayError::is_flow_control`] tells them apart from everything else.

use crate::codes::ErrorKind;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// An identical request is already in flight.
    #[error("Duplicate request ignored: {key}")]
    Duplicate { key: String },

    /// Blocked locally during the window that follows an auth failure.
    #[error("Request suppressed after authentication failure: {path}")]
    Suppressed { path: String },

    /// The backend answered with a non-success envelope code or HTTP status.
    #[error("{message}")]
    Api {
        code: i32,
        kind: ErrorKind,
        message: String,
    },

    /// No response was received.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Could not encode request: {0}")]
    Encode(#[source] serde_json::Error),
}

impl GatewayError {
    /// True for duplicate and suppressed rejections.
    pub fn is_flow_control(&self) -> bool {
        matches!(
            self,
            GatewayError::Duplicate { .. } | GatewayError::Suppressed { .. }
        )
    }

    /// Taxonomy of the failure, or `None` for flow-control signals and local codec errors.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            GatewayError::Api { kind, .. } => Some(*kind),
            GatewayError::Network(_) | GatewayError::Timeout(_) => Some(ErrorKind::Network),
            GatewayError::Decode(_) => Some(ErrorKind::System),
            _ => None,
        }
    }

    /// The backend code for classified failures.
    pub fn code(&self) -> Option<i32> {
        match self {
            GatewayError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}
