#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Judge Gateway
//!
//! > **An authenticated request gateway for the online-judge backend.**
//!
//! Every call the judge client and the back-office console make goes through one
//! [`Gateway`](gateway::Gateway). It attaches the bearer token, unwraps the backend's
//! `{code, message, data, timestamp}` envelope into the type the caller asked for, classifies
//! failures, drops duplicate in-flight requests, and makes sure an expired login triggers one
//! redirect instead of dozens.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### One Context, Explicitly Built
//! The in-flight key set, the debounce timestamps, and the session record all live in a single
//! context built once per process by [`GatewayBuilder`](gateway::GatewayBuilder). Clients hold a
//! cheap [`Gateway`](gateway::Gateway) handle onto it. There is no hidden global state.
//!
//! ### Typed at the Boundary
//! Responses are read as an [`Envelope`](gateway::Envelope) first. Only a success code lets the
//! payload through, and only after it deserializes into the caller's type.
//!
//! ### Flow Control Is Not Failure
//! A duplicate request, or one blocked right after an auth failure, comes back as
//! [`GatewayError::Duplicate`](gateway::GatewayError::Duplicate) or
//! [`GatewayError::Suppressed`](gateway::GatewayError::Suppressed). Neither is shown to the user
//! nor logged as an error; [`is_flow_control`](gateway::GatewayError::is_flow_control) lets
//! callers swallow them.
//!
//! ## 👩‍💻 Architecture Notes
//!
//! ### 1. Guaranteed Key Release
//! A request's pending key is owned by a guard that removes it on drop. Success, failure,
//! timeout, or a cancelled future: the key always goes away.
//!
//! ### 2. One Classification Table
//! Envelope codes and HTTP statuses go through the same [`classify`](codes::classify). A `401`
//! status with an empty body and an in-envelope `401` code take the same path.
//!
//! ### 3. Debounced Auth Failure
//! The first auth failure in a window clears the session and redirects to login. Failures in
//! the same window are ignored, and new requests are blocked except for the login and
//! registration endpoints.
//!
//! ### 4. Observability
//! We use `tracing` everywhere with structured fields. See [`lifecycle::tracing`].
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`gateway`])
//! - **Role**: dispatch, dedup, debounce, envelope unwrapping, transport seam.
//! - **Key items**: [`Gateway`](gateway::Gateway), [`Envelope`](gateway::Envelope),
//!   [`MockTransport`](gateway::mock::MockTransport).
//!
//! ### 2. The Rules ([`codes`])
//! - **Role**: numeric codes to taxonomy, message, and reaction flags.
//!
//! ### 3. The State ([`session`])
//! - **Role**: token and profile, persisted through a [`Storage`](session::Storage) backend.
//!
//! ### 4. The Interface ([`clients`])
//! - **Role**: typed per-area wrappers over the gateway.
//! - **Key items**: [`AuthClient`](clients::AuthClient), [`UserClient`](clients::UserClient).
//!
//! ### 5. The Orchestrator ([`lifecycle`])
//! - **Role**: builds the one gateway context and wires the clients onto it.
//! - **Key items**: [`ClientSystem`](lifecycle::ClientSystem).
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Resume a saved session, or log in with the given credentials
//! JUDGE_API_BASE_URL=http://localhost:8080 JUDGE_USERNAME=alice JUDGE_PASSWORD=secret1 \
//!     RUST_LOG=info cargo run
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```

pub mod clients;
pub mod codes;
pub mod config;
pub mod gateway;
pub mod lifecycle;
pub mod model;
pub mod session;
pub mod ui;
