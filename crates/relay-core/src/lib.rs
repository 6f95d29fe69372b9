//! Core Relay library (config, relay service API, session controller).

pub mod api;
pub mod config;
pub mod controller;
pub mod driver;
pub mod logging;
pub mod page;
pub mod report;
pub mod session;
