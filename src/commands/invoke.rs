//! `xmlmc invoke` handler

use crate::client::XmlmcInstance;
use crate::config::ClientConfig;
use crate::error::Result;

/// Arguments of a single invocation.
#[derive(Debug, Clone, Default)]
pub struct InvokeOptions {
    /// Instance name or endpoint URL
    pub server: String,
    /// Service name
    pub service: String,
    /// Method name
    pub method: String,
    /// Simple parameters, sent in order
    pub params: Vec<(String, String)>,
    /// API key overriding the configured one
    pub api_key: Option<String>,
    /// Request a JSON response
    pub json: bool,
    /// Print the envelope to stderr before sending
    pub show_request: bool,
}

/// Build and send one call, returning the response body.
///
/// # Errors
///
/// Returns parameter validation errors before any I/O, and invocation
/// errors from [`XmlmcInstance::invoke`]
pub async fn execute_invoke(config: &ClientConfig, options: &InvokeOptions) -> Result<String> {
    let mut conn = XmlmcInstance::with_config(&options.server, config).await;

    if let Some(key) = &options.api_key {
        conn.set_api_key(key.as_str());
    }
    if options.json {
        conn.set_json_response(true);
    }

    for (name, value) in &options.params {
        conn.set_param(name, value)?;
    }

    if options.show_request {
        eprintln!(
            "{}",
            conn.build_method_call(&options.service, &options.method)?
        );
    }

    tracing::info!(
        server = %conn.server_url(),
        service = %options.service,
        method = %options.method,
        "Invoking method"
    );

    conn.invoke(&options.service, &options.method).await
}

/// Run the invocation and print the body to stdout.
///
/// # Errors
///
/// Same as [`execute_invoke`]
pub async fn run_invoke(config: &ClientConfig, options: &InvokeOptions) -> Result<()> {
    let body = execute_invoke(config, options).await?;
    println!("{}", body);
    Ok(())
}
