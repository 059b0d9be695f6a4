//! Logging setup for the command-line front end
//!
//! Events go to stderr so that response bodies printed on stdout stay
//! clean. JSON or human-readable output, with optional file output.

use crate::config::LoggingConfig;
use anyhow::Result;
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive used by `--verbose`.
pub const VERBOSE_FILTER: &str = "xmlmc=debug";

/// Build the event filter.
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects
/// [`VERBOSE_FILTER`] and the configured level applies.
///
/// # Errors
///
/// Returns error if the configured level is not a valid filter directive
pub fn build_filter(config: &LoggingConfig, verbose: bool) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let directive = if verbose {
        VERBOSE_FILTER
    } else {
        config.level.as_str()
    };
    Ok(EnvFilter::try_new(directive)?)
}

/// Subscriber for the window before [`init_logging`] runs.
///
/// Configuration loading happens before the configured subscriber can be
/// built; scope it with [`tracing::subscriber::with_default`] so its
/// warnings reach stderr.
///
/// # Examples
///
/// ```no_run
/// use xmlmc::config::ClientConfig;
/// use xmlmc::logging::startup_subscriber;
///
/// let config = tracing::subscriber::with_default(startup_subscriber(), || {
///     ClientConfig::load("config/config.yaml")
/// })
/// .unwrap();
/// ```
pub fn startup_subscriber() -> impl tracing::Subscriber + Send + Sync {
    startup_subscriber_with_writer(std::io::stderr)
}

fn startup_subscriber_with_writer<W>(writer: W) -> impl tracing::Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_max_level(Level::WARN)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .finish()
}

/// Initialize the global tracing subscriber.
///
/// # Errors
///
/// Returns error if the filter is invalid, the log file cannot be opened,
/// or a global subscriber is already installed
///
/// # Examples
///
/// ```no_run
/// use xmlmc::config::LoggingConfig;
/// use xmlmc::logging::init_logging;
///
/// init_logging(&LoggingConfig::default(), false).unwrap();
/// ```
pub fn init_logging(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let env_filter = build_filter(config, verbose)?;
    let registry = tracing_subscriber::registry().with(env_filter);

    if config.json_format {
        let stderr_layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(std::io::stderr);

        if let Some(file_path) = &config.file_path {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_path)?;

            let file_layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_writer(Arc::new(file));

            registry.with(stderr_layer).with(file_layer).try_init()?;
        } else {
            registry.with(stderr_layer).try_init()?;
        }
    } else {
        let stderr_layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_writer(std::io::stderr);

        if let Some(file_path) = &config.file_path {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_path)?;

            let file_layer = fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .with_writer(Arc::new(file));

            registry.with(stderr_layer).with(file_layer).try_init()?;
        } else {
            registry.with(stderr_layer).try_init()?;
        }
    }

    Ok(())
}
