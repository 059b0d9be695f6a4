//! Command-line interface definition for the XMLMC client
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for zone lookup and one-shot method invocation.

use clap::{Parser, Subcommand};

/// xmlmc - XMLMC API client
///
/// Resolve instance endpoints and invoke XMLMC methods from the shell.
#[derive(Parser, Debug, Clone)]
#[command(name = "xmlmc")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Resolve an instance name and print its zone info as JSON
    Zone {
        /// Instance name
        instance: String,
    },

    /// Invoke a method and print the response body
    Invoke {
        /// Instance name or full endpoint URL
        #[arg(short, long)]
        server: String,

        /// Service name, e.g. `session`
        #[arg(long)]
        service: String,

        /// Method name, e.g. `getSessionInfo`
        #[arg(short, long)]
        method: String,

        /// Parameter as `name=value`; repeat for several
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// API key (overrides config and XMLMC_API_KEY)
        #[arg(long, env = "XMLMC_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Request a JSON response
        #[arg(long)]
        json: bool,

        /// Print the request envelope to stderr before sending
        #[arg(long)]
        show_request: bool,
    },
}

/// Parse a `name=value` parameter argument.
///
/// Only the first `=` separates; the value may contain further `=`.
pub fn parse_param(arg: &str) -> std::result::Result<(String, String), String> {
    match arg.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        Some(_) => Err(format!("parameter name is empty in '{}'", arg)),
        None => Err(format!("expected name=value, got '{}'", arg)),
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
