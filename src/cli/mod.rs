//! CLI command handlers

pub mod commands;

pub use commands::{charts, clean, inspect, resolve_config, run, serve, watch, Overrides};
