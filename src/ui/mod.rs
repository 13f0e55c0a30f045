//! Seams to the presentation layer: where the user is, and how they are told things.
//!
//! The gateway reacts to failures by notifying and by redirecting to the login view. It
//! does both through these traits so the same gateway drives a GUI shell, a CLI, or a test.

pub mod navigator;
pub mod notifier;

pub use navigator::*;
pub use notifier::*;
