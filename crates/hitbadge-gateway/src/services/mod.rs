//! Request-level services.

pub mod badge;

pub use badge::{BadgeService, CountMode, RenderedBadge};
