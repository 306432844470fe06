//! LogCentral producer process
//!
//! Forwards `TAG message` lines read from stdin to the central log service
//! and serves health, status and metrics over HTTP.

pub mod api;
pub mod config;
pub mod forward;
