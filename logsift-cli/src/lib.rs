//! logsift CLI library: argument parsing, settings resolution and run modes.
//!
//! The binary in `main.rs` is a thin wrapper; everything here is usable from
//! integration tests without spawning a process.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod settings;
