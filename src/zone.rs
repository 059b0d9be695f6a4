//! Instance zone lookup
//!
//! Maps a bare instance name to its API endpoint and release stream by
//! fetching the instance's zone-info document:
//!
//! ```text
//! GET <primary>/instances/<id>/zoneinfo
//! GET <secondary>/instances/<id>/zoneinfo   (only if the primary fails)
//! ```
//!
//! The primary host is abandoned on a transport error or any non-200
//! status. The secondary host is tried exactly once. Results are never
//! cached; every call goes to the network.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ZoneConfig;
use crate::error::{Result, XmlmcError};

/// Zone-info document served per instance.
///
/// # Examples
///
/// ```
/// use xmlmc::zone::ZoneInfo;
///
/// let json = r#"{
///     "zoneinfo": {
///         "name": "hornbill",
///         "zone": "eur",
///         "message": "",
///         "endpoint": "https://eurapi.example.com/hornbill/",
///         "releaseStream": "stable"
///     }
/// }"#;
///
/// let info: ZoneInfo = serde_json::from_str(json).unwrap();
/// assert_eq!(info.endpoint(), "https://eurapi.example.com/hornbill/");
/// assert_eq!(info.release_stream(), "stable");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneInfo {
    /// Zone details for the instance
    pub zoneinfo: ZoneDetails,
}

/// Body of the `zoneinfo` object.
///
/// Only `endpoint` and `release_stream` drive client behaviour; the other
/// fields are informational.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneDetails {
    /// Instance name
    #[serde(default)]
    pub name: String,
    /// Hosting zone
    #[serde(default)]
    pub zone: String,
    /// Free-form message from the lookup service
    #[serde(default)]
    pub message: String,
    /// API endpoint for the instance
    #[serde(default)]
    pub endpoint: String,
    /// Release stream the instance runs
    #[serde(default, rename = "releaseStream")]
    pub release_stream: String,
}

impl ZoneInfo {
    /// Resolved API endpoint, empty if the lookup returned none
    pub fn endpoint(&self) -> &str {
        &self.zoneinfo.endpoint
    }

    /// Release stream, empty if the lookup returned none
    pub fn release_stream(&self) -> &str {
        &self.zoneinfo.release_stream
    }
}

/// Resolves instance names against the zone lookup hosts.
#[derive(Debug, Clone)]
pub struct ZoneResolver {
    http: reqwest::Client,
    primary_url: String,
    secondary_url: String,
    timeout: Option<Duration>,
}

impl ZoneResolver {
    /// Construct a resolver from zone configuration.
    ///
    /// No network I/O is performed at construction time.
    pub fn new(config: &ZoneConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Construct a resolver that shares an existing HTTP client.
    ///
    /// A lookup timeout of zero disables the per-request deadline.
    pub fn with_client(http: reqwest::Client, config: &ZoneConfig) -> Self {
        Self {
            http,
            primary_url: config.primary_url.trim_end_matches('/').to_string(),
            secondary_url: config.secondary_url.trim_end_matches('/').to_string(),
            timeout: (config.timeout_seconds > 0)
                .then(|| Duration::from_secs(config.timeout_seconds)),
        }
    }

    /// `<base>/instances/<id>/zoneinfo` with `instance_id` percent-encoded
    /// as a single path segment.
    fn lookup_url(base: &str, instance_id: &str) -> std::result::Result<String, XmlmcError> {
        let mut url = url::Url::parse(base).map_err(|e| {
            XmlmcError::RequestConstruction(format!("invalid zone host {}: {}", base, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                XmlmcError::RequestConstruction(format!("zone host {} cannot take a path", base))
            })?
            .pop_if_empty()
            .extend(["instances", instance_id, "zoneinfo"]);
        Ok(url.to_string())
    }

    /// Fetch the zone-info document for `instance_id`.
    ///
    /// # Errors
    ///
    /// - [`XmlmcError::Validation`] if `instance_id` is empty
    /// - [`XmlmcError::Network`] if neither host returns a 200 response
    /// - [`XmlmcError::Decode`] if the body is not a zone-info document
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use xmlmc::config::ZoneConfig;
    /// use xmlmc::zone::ZoneResolver;
    ///
    /// # async fn example() -> xmlmc::error::Result<()> {
    /// let resolver = ZoneResolver::new(&ZoneConfig::default());
    /// let info = resolver.resolve("hornbill").await?;
    /// println!("endpoint: {}", info.endpoint());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn resolve(&self, instance_id: &str) -> Result<ZoneInfo> {
        if instance_id.is_empty() {
            return Err(XmlmcError::Validation("instanceid not provided".to_string()).into());
        }

        let response = match self.lookup(&self.primary_url, instance_id).await {
            Ok(response) => response,
            Err(reason) => {
                tracing::warn!(
                    instance = instance_id,
                    reason = %reason,
                    host = %self.secondary_url,
                    "Primary zone host failed, falling back"
                );
                self.lookup(&self.secondary_url, instance_id).await.map_err(|reason| {
                    tracing::error!("Error Loading Zone Info File: {}", reason);
                    reason
                })?
            }
        };

        let body = response
            .text()
            .await
            .map_err(|e| XmlmcError::network(format!("failed to read zone info body: {}", e)))?;

        let info: ZoneInfo = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Error Decoding Zone Info File: {}", e);
            XmlmcError::Decode(format!("invalid zone info for {}: {}", instance_id, e))
        })?;

        tracing::debug!(
            instance = instance_id,
            endpoint = %info.endpoint(),
            stream = %info.release_stream(),
            "Resolved zone info"
        );
        Ok(info)
    }

    /// Resolve `instance_id` and return only its endpoint.
    ///
    /// Returns `None` when resolution fails or the document carries no
    /// endpoint; the failure is logged rather than returned.
    pub async fn endpoint_from_name(&self, instance_id: &str) -> Option<String> {
        if instance_id.is_empty() {
            return None;
        }
        match self.resolve(instance_id).await {
            Ok(info) if !info.endpoint().is_empty() => Some(info.zoneinfo.endpoint),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(instance = instance_id, "Zone lookup failed: {}", e);
                None
            }
        }
    }

    async fn lookup(
        &self,
        base: &str,
        instance_id: &str,
    ) -> std::result::Result<reqwest::Response, XmlmcError> {
        let url = Self::lookup_url(base, instance_id)?;
        tracing::debug!(instance = instance_id, url = %url, "Looking up zone info");
        self.fetch(&url).await
    }

    /// GET `url`, accepting only a 200 response.
    async fn fetch(&self, url: &str) -> std::result::Result<reqwest::Response, XmlmcError> {
        let mut request = self.http.get(url);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        let response = request
            .send()
            .await
            .map_err(|e| XmlmcError::network(format!("zone lookup {} failed: {}", url, e)))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(XmlmcError::Network {
                message: format!("zone lookup {} returned HTTP {}", url, status.as_u16()),
                status: Some(status.as_u16()),
            });
        }
        Ok(response)
    }
}
