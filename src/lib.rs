//! AI/Tech Daily: market movers dashboard and private deal-flow CRM.
//!
//! The client side (`state`, `services`, `filters`, `i18n`, `shell`) runs
//! against any `backend::Backend`. The `functions` module is the HTTP server
//! for the privileged proxy calls, started by the `aitech-daily` binary.

pub mod backend;
pub mod error;
pub mod filters;
pub mod functions;
pub mod i18n;
pub mod integrations;
mod migrations;
pub mod notification;
pub mod preferences;
pub mod query_cache;
pub mod services;
pub mod shell;
pub mod state;
pub mod styling;
pub mod types;
