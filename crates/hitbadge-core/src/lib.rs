//! hitbadge core: runtime-free badge primitives, counter keys, and error types.
//!
//! This crate defines the page identity, count and style value types, the
//! canonical counter key layout, and the SVG renderer shared by the gateway
//! and tooling. It carries no transport or runtime dependencies so the
//! rendering and key logic can be tested in isolation.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `HitBadgeError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod badge;
pub mod error;
pub mod keys;
pub mod svg;

/// Shared result type.
pub use error::{HitBadgeError, Result};
