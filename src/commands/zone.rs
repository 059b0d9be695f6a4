//! `xmlmc zone` handler

use crate::config::ClientConfig;
use crate::error::Result;
use crate::zone::{ZoneInfo, ZoneResolver};

/// Resolve `instance` using the configured lookup hosts.
///
/// # Errors
///
/// Returns the resolver error when neither host yields a zone-info document
pub async fn lookup_zone(config: &ClientConfig, instance: &str) -> Result<ZoneInfo> {
    let resolver = ZoneResolver::new(&config.zone);
    resolver.resolve(instance).await
}

/// Resolve `instance` and print its zone info as pretty JSON.
///
/// # Errors
///
/// Returns error if resolution or serialization fails
pub async fn run_zone(config: &ClientConfig, instance: &str) -> Result<()> {
    let info = lookup_zone(config, instance).await?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}
