//! HTTP server wiring: config, state, routes and middleware.

pub mod api;
pub mod app;
pub mod config;
pub mod logging;
pub mod state;
