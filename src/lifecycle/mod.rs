//! Process-level wiring: one gateway context, the clients built on it, and logging setup.

pub mod client_system;
pub mod tracing;

pub use client_system::*;
