//! HTTP server for textcal: accounts, cookie sessions and calendar events.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
