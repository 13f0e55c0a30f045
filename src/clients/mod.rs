//! Typed wrappers around [`Gateway`](crate::gateway::Gateway), one per backend area.

pub mod api_client;
pub mod auth_client;
pub mod error;
pub mod user_client;

pub use api_client::*;
pub use auth_client::*;
pub use error::*;
pub use user_client::*;
