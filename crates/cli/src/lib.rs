//! LogCentral tool CLI
//!
//! Connects to the central service as a tool to stream records matching a
//! filter, and lists the tags and components the service knows about.

pub mod cli;
pub mod commands;
pub mod config;
pub mod output;
