//! xmlmc - XMLMC API client
//!
#![doc = "xmlmc - XMLMC API client"]
#![doc = "Main entry point for the xmlmc command-line tool."]

use anyhow::Result;

use xmlmc::cli::{Cli, Commands};
use xmlmc::commands;
use xmlmc::commands::invoke::InvokeOptions;
use xmlmc::config::ClientConfig;
use xmlmc::logging::{init_logging, startup_subscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = tracing::subscriber::with_default(startup_subscriber(), || {
        ClientConfig::load(config_path)
    })?;

    init_logging(&config.logging, cli.verbose)?;

    // Validate configuration
    config.validate()?;

    match cli.command {
        Commands::Zone { instance } => {
            tracing::debug!("Resolving zone info for {}", instance);
            commands::zone::run_zone(&config, &instance).await?;
            Ok(())
        }
        Commands::Invoke {
            server,
            service,
            method,
            params,
            api_key,
            json,
            show_request,
        } => {
            let options = InvokeOptions {
                server,
                service,
                method,
                params,
                api_key,
                json,
                show_request,
            };
            commands::invoke::run_invoke(&config, &options).await?;
            Ok(())
        }
    }
}
