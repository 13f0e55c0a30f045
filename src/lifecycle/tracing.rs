//! # Observability & Tracing
//!
//! The [`setup_tracing`] function initializes structured logging with the `tracing` crate.
//!
//! ## Configuration
//!
//! - **Configurable log levels** via the `RUST_LOG` environment variable
//! - **Compact format** that shows spans inline (`dispatch{method=get path=/api/auth/me}`)
//! - **No module prefix** (`with_target(false)`); the span fields already say where a line
//!   came from
//!
//! ## What Gets Traced
//!
//! - **Dispatch**: one span per gateway call carrying `method` and `path`
//! - **Failures**: classified failures at `warn` with `code` and `kind`; no-response
//!   failures at `error`
//! - **Flow control**: duplicate and suppressed rejections at `debug` only
//! - **Session**: token stored, session cleared, profile restored
//!
//! ## Usage Examples
//!
//! ```bash
//! # Compact logs (default)
//! RUST_LOG=info cargo run
//!
//! # Include duplicate/suppressed rejections and client request spans
//! RUST_LOG=debug cargo run
//!
//! # Gateway only
//! RUST_LOG=judge_gateway::gateway=debug cargo run
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
