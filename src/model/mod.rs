//! Data transfer objects exchanged with the backend.

pub mod auth;
pub mod page;
pub mod user;

pub use auth::*;
pub use page::*;
pub use user::*;
