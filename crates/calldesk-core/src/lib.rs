//! Core data-access and view-derivation layer for the calldesk admin client.
//!
//! This crate is intentionally framework-agnostic. The backend, the blast
//! dispatcher, the settings sink and user notifications live behind ports
//! (traits) implemented in adapter crates or in `simulated`.

pub mod blast;
pub mod call_logs;
pub mod config;
pub mod csv_export;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod notify;
pub mod ports;
pub mod registry;
pub mod seed;
pub mod settings;
pub mod simulated;
pub mod store;

pub use errors::{Error, Result};
