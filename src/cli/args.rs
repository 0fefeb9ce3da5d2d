//! CLI argument definitions using clap
//!
//! Commands:
//! - mockbase tables [--config <path>]
//! - mockbase query [--config <path>] --table <name> [--param k=v]... [--single]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// mockbase - in-memory table engine with fixture data
#[derive(Parser, Debug)]
#[command(name = "mockbase")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List tables and their row counts
    Tables {
        /// Path to configuration file (built-in defaults when absent)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Run one query and print the response envelope
    Query {
        /// Path to configuration file (built-in defaults when absent)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Table to read
        #[arg(long)]
        table: String,

        /// Query parameter, e.g. `id_prova=eq.1` or `order=ano.desc`
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,

        /// Resolve to the first row or null
        #[arg(long)]
        single: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_command() {
        let cli = Cli::try_parse_from([
            "mockbase", "query", "--table", "provas", "--param", "ano=gte.2022", "--param",
            "order=ano.desc", "--single",
        ])
        .unwrap();

        match cli.command {
            Command::Query {
                config,
                table,
                params,
                single,
            } => {
                assert!(config.is_none());
                assert_eq!(table, "provas");
                assert_eq!(params, vec!["ano=gte.2022", "order=ano.desc"]);
                assert!(single);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_query_requires_table() {
        assert!(Cli::try_parse_from(["mockbase", "query"]).is_err());
    }
}
