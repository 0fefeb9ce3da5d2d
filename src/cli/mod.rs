//! CLI module for mockbase
//!
//! Provides command-line interface for:
//! - tables: list tables, key columns and row counts
//! - query: one-shot PostgREST-style query

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{query, run, run_command, tables, TableSummary};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_json, write_json_to};
