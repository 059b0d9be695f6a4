//! Endpoint and per-session state carried by an XMLMC instance

use std::time::Duration;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECONDS: i64 = 30;

/// Default user agent string for requests
pub const DEFAULT_USER_AGENT: &str = concat!("xmlmc-rs/", env!("CARGO_PKG_VERSION"));

/// Resolved service addresses of an instance.
///
/// Set once by the instance constructor and never re-resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoint {
    /// Base URL for XMLMC calls; empty when resolution failed
    pub rpc: String,
    /// Base URL for file transfer (DAV)
    pub file_transfer: String,
    /// Release stream reported by the zone lookup
    pub stream: Option<String>,
}

impl Endpoint {
    /// Endpoint for an explicit URL.
    ///
    /// The file transfer URL swaps the first `/xmlmc/` segment for `/dav/`
    /// and is identical to `url` when there is no such segment.
    pub fn from_url(url: &str) -> Self {
        Self {
            rpc: url.to_string(),
            file_transfer: url.replacen("/xmlmc/", "/dav/", 1),
            stream: None,
        }
    }

    /// Endpoint for a zone lookup result.
    pub fn from_zone(endpoint: &str, stream: &str) -> Self {
        let file_transfer = if endpoint.is_empty() {
            String::new()
        } else {
            format!("{}dav/", endpoint)
        };
        Self {
            rpc: endpoint.to_string(),
            file_transfer,
            stream: (!stream.is_empty()).then(|| stream.to_string()),
        }
    }

    /// Whether there is an address to send calls to.
    pub fn is_resolved(&self) -> bool {
        !self.rpc.is_empty()
    }
}

/// Mutable session and configuration fields of an instance.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Session cookie echoed on every call, rotated by the server
    pub session_id: String,
    /// API key sent as `Authorization: ESP-APIKEY <key>`
    pub api_key: Option<String>,
    /// Diagnostic tag embedded in the method call envelope
    pub trace: Option<String>,
    /// `User-Agent` header value
    pub user_agent: String,
    /// Request timeout in seconds; zero or negative disables it
    pub timeout_seconds: i64,
    /// Ask the server for JSON instead of XML responses
    pub json_response: bool,
    /// HTTP status of the last completed exchange, 0 before the first
    pub status_code: u16,
    /// Number of successful invocations
    pub count: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            session_id: String::new(),
            api_key: None,
            trace: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            json_response: false,
            status_code: 0,
            count: 0,
        }
    }
}

impl SessionState {
    /// Timeout to apply to a request, `None` when disabled.
    pub fn request_timeout(&self) -> Option<Duration> {
        u64::try_from(self.timeout_seconds)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Replace the session cookie with the first segment of a
    /// `Set-Cookie` value. Returns whether the cookie changed.
    pub fn rotate_cookie(&mut self, set_cookie: &str) -> bool {
        let first = set_cookie.split(';').next().unwrap_or_default().trim();
        if first.is_empty() {
            return false;
        }
        self.session_id = first.to_string();
        true
    }
}
