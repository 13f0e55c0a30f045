//! The request gateway: one context that every backend call passes through.
//!
//! # Main Components
//!
//! - [`Gateway`] - Dispatches calls: auth header, dedup, envelope unwrapping, failure handling
//! - [`Envelope`] - Typed `{code, message, data, timestamp}` wire wrapper
//! - [`PendingRequests`] - In-flight request keys with guaranteed release
//! - [`AuthGuard`] - Auth-failure debounce and the suppression window
//! - [`Transport`] - Network seam, implemented by [`ReqwestTransport`]
//! - [`GatewayError`] - Failures and flow-control signals
//!
//! # Testing
//!
//! See [`mock`] module for a transport that answers from registered expectations.

pub mod auth_guard;
pub mod core;
pub mod envelope;
pub mod error;
pub mod mock;
pub mod pending;
pub mod transport;

// Re-export core types for convenience
pub use auth_guard::AuthGuard;
pub use self::core::{ApiRequest, Gateway, GatewayBuilder};
pub use envelope::Envelope;
pub use error::GatewayError;
pub use pending::{PendingGuard, PendingRequests, RequestKey};
pub use transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport, TransportError};
