//! xmlmc - client library for the XMLMC API
//!
//! XMLMC is an XML-over-HTTP RPC protocol: every call is an HTTP POST of a
//! `<methodCall>` envelope to `<endpoint>/<service>/?method=<method>`, and
//! the response body is returned to the caller uninterpreted.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `client`: `XmlmcInstance`, construction, invocation and accessors
//! - `params`: Parameter fragment builder and XML text escaping
//! - `zone`: Instance-name to endpoint resolution with host fallback
//! - `session`: Endpoint and per-session state
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `logging`: tracing subscriber setup for the binary
//! - `cli` / `commands`: Command-line interface and handlers
//!
//! # Example
//!
//! ```no_run
//! use xmlmc::XmlmcInstance;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut conn = XmlmcInstance::new("hornbill").await;
//!     conn.set_api_key("my-api-key");
//!     conn.open_element("options")?;
//!     conn.set_param("limit", "10")?;
//!     conn.close_element("options")?;
//!     let body = conn.invoke("session", "getSessionInfo").await?;
//!     println!("{}", body);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod params;
pub mod session;
pub mod zone;

// Re-export commonly used types
pub use client::{InvokeResponse, XmlmcInstance};
pub use config::ClientConfig;
pub use error::{Result, XmlmcError};
pub use params::{ParamAttribute, ParamBuilder};
pub use zone::{ZoneInfo, ZoneResolver};

#[cfg(test)]
pub mod test_utils;
