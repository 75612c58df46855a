//! Command-line interface for strategy-brain.
//!
//! Provides commands for full and streaming pipeline runs, single stages,
//! JSON extraction and provider status.

mod commands;

pub use commands::{parse_cli, run, run_with_cli, Cli};
