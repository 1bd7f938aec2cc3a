//! hitbadge gateway library entry.
//!
//! This crate wires the config loader, counter store adapter, badge service,
//! HTTP transport and ops endpoints into a badge server. It is intended to be
//! consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod router;
pub mod server;
pub mod services;
pub mod store;
pub mod transport;
