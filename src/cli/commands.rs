//! CLI command implementations
//!
//! Each command builds its own client from the configuration, runs, and
//! writes one JSON document to stdout. Nothing persists between runs.

use std::path::Path;

use serde::Serialize;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::write_json;
use crate::client::Client;
use crate::config::ClientConfig;
use crate::query::{QueryParams, Response};

/// One line of the `tables` report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub table: String,
    pub key: String,
    pub rows: usize,
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Tables { config } => write_json(&tables(config.as_deref())?),
        Command::Query {
            config,
            table,
            params,
            single,
        } => write_json(&query(config.as_deref(), &table, &params, single)?),
    }
}

/// Every known table with its key column and row count
pub fn tables(config_path: Option<&Path>) -> CliResult<Vec<TableSummary>> {
    let client = build_client(config_path)?;
    let store = client.store();

    store
        .table_names()
        .map_err(|e| CliError::query_error(e.to_string()))?
        .into_iter()
        .map(|table| -> CliResult<TableSummary> {
            let rows = store
                .row_count(&table)
                .map_err(|e| CliError::query_error(e.to_string()))?;
            Ok(TableSummary {
                key: store.key_for(&table).to_string(),
                table,
                rows,
            })
        })
        .collect()
}

/// Runs one PostgREST-style query.
///
/// `params` are `key=value` strings; the envelope is returned as is,
/// error included.
pub fn query(
    config_path: Option<&Path>,
    table: &str,
    params: &[String],
    single: bool,
) -> CliResult<Response> {
    let client = build_client(config_path)?;

    let pairs = params
        .iter()
        .map(|p| {
            p.split_once('=')
                .ok_or_else(|| CliError::query_error(format!("Expected KEY=VALUE, got '{}'", p)))
        })
        .collect::<CliResult<Vec<_>>>()?;
    let params = QueryParams::parse(pairs)?;

    let mut builder = params.apply(client.from(table).select(params.columns()));
    if single {
        builder = builder.single();
    }

    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(|e| CliError::io_error(format!("Failed to create tokio runtime: {}", e)))?;

    Ok(rt.block_on(async { builder.await }))
}

fn build_client(config_path: Option<&Path>) -> CliResult<Client> {
    let config = match config_path {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };
    Ok(Client::new(config)?)
}
