//! Authentication session state and its durable storage.

pub mod error;
pub mod storage;
pub mod store;

pub use error::*;
pub use storage::*;
pub use store::*;
