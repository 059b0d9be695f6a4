//! XMLMC instance: construction, invocation and session accessors
//!
//! An [`XmlmcInstance`] is created once per logical connection and reused
//! for many calls. Each call follows the same cycle:
//!
//! 1. Parameters are accumulated with the builder methods
//!    ([`XmlmcInstance::set_param`], [`XmlmcInstance::open_element`], ...).
//! 2. [`XmlmcInstance::invoke`] wraps them in a `<methodCall>` envelope and
//!    POSTs it to `<endpoint>/<service>/?method=<method>`.
//! 3. On a 200 response the session cookie is rotated from `Set-Cookie`,
//!    the call counter is incremented and the parameters are cleared.
//!
//! A non-200 response records its status and returns an error without
//! touching the parameters, so the caller can retry with the same input.
//!
//! Every method that talks to the network takes `&mut self`; an instance can
//! only be driven by one caller at a time. Use one instance per session.

use std::sync::OnceLock;

use regex::Regex;
use reqwest::header::{
    HeaderMap, HeaderValue, InvalidHeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, COOKIE,
    SET_COOKIE, USER_AGENT,
};

use crate::config::ClientConfig;
use crate::error::{Result, XmlmcError};
use crate::params::{escape_text, ParamAttribute, ParamBuilder};
use crate::session::{Endpoint, SessionState};
use crate::zone::ZoneResolver;

/// Request body content type for XMLMC calls.
pub const XMLMC_CONTENT_TYPE: &str = "text/xmlmc";

/// `Accept` value sent when JSON responses are requested.
pub const JSON_ACCEPT: &str = "text/json";

/// The single status code the platform uses for success.
const SUCCESS_STATUS: u16 = 200;

fn endpoint_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)^(?:http|https)://[\w\-]+(?:\.[\w\-]+)+(?:[\w\-.,@?^=%&:/~+#]*[\w\-@?^=%&/~+#])?",
        )
        .expect("endpoint pattern is valid")
    })
}

/// Whether `server` is a full `http(s)://host...` URL rather than an
/// instance name.
///
/// The scheme is matched case-insensitively and the host must contain at
/// least one dot.
pub fn is_endpoint_url(server: &str) -> bool {
    endpoint_url_pattern().is_match(server)
}

fn invalid_header(name: &'static str) -> impl Fn(InvalidHeaderValue) -> XmlmcError {
    move |e| XmlmcError::RequestConstruction(format!("invalid {} header: {}", name, e))
}

/// Raw outcome of a successful call.
#[derive(Debug, Clone)]
pub struct InvokeResponse {
    /// Response body, returned verbatim
    pub body: String,
    /// Response headers
    pub headers: HeaderMap,
    /// HTTP status code (always 200 for a returned response)
    pub status: u16,
}

/// A connection to one XMLMC instance.
///
/// # Examples
///
/// ```no_run
/// use xmlmc::XmlmcInstance;
///
/// # async fn example() -> xmlmc::error::Result<()> {
/// let mut conn = XmlmcInstance::new("https://eurapi.example.com/test/xmlmc/").await;
/// conn.set_api_key("my-api-key");
/// conn.set_param("userId", "admin")?;
/// let body = conn.invoke("session", "userLogon").await?;
/// println!("{body}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct XmlmcInstance {
    http: reqwest::Client,
    endpoint: Endpoint,
    resolution_error: Option<anyhow::Error>,
    params: ParamBuilder,
    session: SessionState,
    strict_elements: bool,
}

impl XmlmcInstance {
    /// Create an instance with default configuration.
    ///
    /// `server` is either a full endpoint URL, used as-is, or an instance
    /// name that is resolved through the zone lookup hosts. A failed lookup
    /// does not fail construction: the endpoint stays empty and the error is
    /// available from [`XmlmcInstance::resolution_error`].
    pub async fn new(server: &str) -> Self {
        Self::with_config(server, &ClientConfig::default()).await
    }

    /// Create an instance using `config` for defaults and zone lookup.
    pub async fn with_config(server: &str, config: &ClientConfig) -> Self {
        let http = reqwest::Client::new();

        let (endpoint, resolution_error) = if is_endpoint_url(server) {
            (Endpoint::from_url(server), None)
        } else {
            let resolver = ZoneResolver::with_client(http.clone(), &config.zone);
            match resolver.resolve(server).await {
                Ok(info) => (
                    Endpoint::from_zone(info.endpoint(), info.release_stream()),
                    None,
                ),
                Err(e) => {
                    tracing::warn!(instance = server, "Unable to resolve instance: {}", e);
                    (Endpoint::default(), Some(e))
                }
            }
        };

        let session = SessionState {
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            trace: config.trace.clone().filter(|t| !t.is_empty()),
            user_agent: config.user_agent.clone(),
            timeout_seconds: config.timeout_seconds,
            json_response: config.json_response,
            ..SessionState::default()
        };

        tracing::debug!(server, endpoint = %endpoint.rpc, "Created XMLMC instance");

        Self {
            http,
            endpoint,
            resolution_error,
            params: ParamBuilder::new(),
            session,
            strict_elements: config.strict_elements,
        }
    }

    // -----------------------------------------------------------------------
    // Envelope builder
    // -----------------------------------------------------------------------

    /// Add a `<name>value</name>` parameter. See [`ParamBuilder::set_param`].
    ///
    /// # Errors
    ///
    /// Returns a validation or encoding error; parameters are unchanged.
    pub fn set_param(&mut self, name: &str, value: &str) -> Result<()> {
        self.params.set_param(name, value)
    }

    /// Add a parameter with attributes. See
    /// [`ParamBuilder::set_param_with_attributes`].
    ///
    /// # Errors
    ///
    /// Returns a validation or encoding error; parameters are unchanged.
    pub fn set_param_with_attributes(
        &mut self,
        name: &str,
        value: &str,
        attributes: &[ParamAttribute],
    ) -> Result<()> {
        self.params.set_param_with_attributes(name, value, attributes)
    }

    /// Append an opening tag for a complex parameter.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid name.
    pub fn open_element(&mut self, name: &str) -> Result<()> {
        self.params.open_element(name)
    }

    /// Append a closing tag for a complex parameter.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid name.
    pub fn close_element(&mut self, name: &str) -> Result<()> {
        self.params.close_element(name)
    }

    /// Parameters that would be sent, wrapped in `<params>`.
    pub fn get_param(&self) -> String {
        self.params.get_param()
    }

    /// Discard all accumulated parameters.
    pub fn clear_param(&mut self) {
        self.params.clear_param();
    }

    /// The parameter builder.
    pub fn params(&self) -> &ParamBuilder {
        &self.params
    }

    /// Mutable access to the parameter builder.
    pub fn params_mut(&mut self) -> &mut ParamBuilder {
        &mut self.params
    }

    // -----------------------------------------------------------------------
    // Invocation
    // -----------------------------------------------------------------------

    /// Full request body for a call to `service`/`method` with the current
    /// parameters.
    ///
    /// # Errors
    ///
    /// Returns an encoding error if the trace tag cannot be escaped.
    pub fn build_method_call(&self, service: &str, method: &str) -> Result<String> {
        let mut envelope = format!("<methodCall service=\"{}\" method=\"{}\"", service, method);
        if let Some(trace) = &self.session.trace {
            envelope.push_str(" trace=\"");
            envelope.push_str(&escape_text(trace)?);
            envelope.push('"');
        }
        envelope.push('>');
        if !self.params.is_empty() {
            envelope.push_str("<params>");
            envelope.push_str(self.params.fragment());
            envelope.push_str("</params>");
        }
        envelope.push_str("</methodCall>");
        Ok(envelope)
    }

    /// Target URL for a call to `service`/`method`.
    ///
    /// # Errors
    ///
    /// Returns [`XmlmcError::RequestConstruction`] if the instance has no
    /// endpoint or the joined URL does not parse.
    pub fn request_url(&self, service: &str, method: &str) -> Result<String> {
        if !self.endpoint.is_resolved() {
            let reason = match &self.resolution_error {
                Some(e) => format!("instance has no endpoint: {}", e),
                None => "instance has no endpoint".to_string(),
            };
            return Err(XmlmcError::RequestConstruction(reason).into());
        }

        let target = format!("{}/{}/?method={}", self.endpoint.rpc, service, method);
        url::Url::parse(&target).map_err(|e| {
            XmlmcError::RequestConstruction(format!("invalid request URL {}: {}", target, e))
        })?;
        Ok(target)
    }

    fn request_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(XMLMC_CONTENT_TYPE));
        if let Some(key) = &self.session.api_key {
            let value = HeaderValue::from_str(&format!("ESP-APIKEY {}", key))
                .map_err(invalid_header("Authorization"))?;
            headers.insert(AUTHORIZATION, value);
        }
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.session.user_agent).map_err(invalid_header("User-Agent"))?,
        );
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&self.session.session_id).map_err(invalid_header("Cookie"))?,
        );
        if self.session.json_response {
            headers.insert(ACCEPT, HeaderValue::from_static(JSON_ACCEPT));
        }
        Ok(headers)
    }

    /// Call `method` on `service` and return body, headers and status.
    ///
    /// # Errors
    ///
    /// - [`XmlmcError::Validation`] if strict element checking is enabled
    ///   and the parameters are unbalanced
    /// - [`XmlmcError::RequestConstruction`] if the request cannot be built
    /// - [`XmlmcError::Network`] on transport failure or a non-200 status;
    ///   the status is still recorded and readable via
    ///   [`XmlmcInstance::status_code`]
    pub async fn invoke_get_response(
        &mut self,
        service: &str,
        method: &str,
    ) -> Result<InvokeResponse> {
        if self.strict_elements && !self.params.is_balanced() {
            return Err(XmlmcError::Validation(format!(
                "parameters have unbalanced elements (unclosed: {:?})",
                self.params.unclosed_elements()
            ))
            .into());
        }

        let body = self.build_method_call(service, method)?;
        let url = self.request_url(service, method)?;
        let headers = self.request_headers()?;

        tracing::debug!(service, method, url = %url, "Invoking XMLMC method");

        let mut request = self.http.post(&url).headers(headers).body(body);
        if let Some(timeout) = self.session.request_timeout() {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(service, method, "XMLMC request failed: {}", e);
            XmlmcError::network(format!("request to {} failed: {}", url, e))
        })?;

        let status = response.status().as_u16();
        self.session.status_code = status;

        if status != SUCCESS_STATUS {
            tracing::warn!(service, method, status, "XMLMC call returned non-success status");
            // Drain so the connection can be reused.
            let _ = response.bytes().await;
            return Err(XmlmcError::http_status(status).into());
        }

        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| XmlmcError::network(format!("Cant read the body of the response: {}", e)))?;

        if let Some(set_cookie) = headers.get(SET_COOKIE).and_then(|v| v.to_str().ok()) {
            if self.session.rotate_cookie(set_cookie) {
                tracing::debug!("Session cookie rotated");
            }
        }

        self.session.count += 1;
        self.params.clear_param();

        tracing::debug!(
            service,
            method,
            bytes = body.len(),
            count = self.session.count,
            "XMLMC call succeeded"
        );

        Ok(InvokeResponse {
            body,
            headers,
            status,
        })
    }

    /// Call `method` on `service` and return the response body.
    ///
    /// # Errors
    ///
    /// Same as [`XmlmcInstance::invoke_get_response`].
    pub async fn invoke(&mut self, service: &str, method: &str) -> Result<String> {
        self.invoke_get_response(service, method)
            .await
            .map(|response| response.body)
    }

    // -----------------------------------------------------------------------
    // Session and configuration accessors
    // -----------------------------------------------------------------------

    /// Current session cookie, empty before the server has issued one.
    pub fn session_id(&self) -> &str {
        &self.session.session_id
    }

    /// Replace the session cookie.
    pub fn set_session_id(&mut self, session_id: impl Into<String>) {
        self.session.session_id = session_id.into();
    }

    /// Configured API key.
    pub fn api_key(&self) -> Option<&str> {
        self.session.api_key.as_deref()
    }

    /// Set the API key; an empty key removes it.
    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        let api_key = api_key.into();
        self.session.api_key = (!api_key.is_empty()).then_some(api_key);
    }

    /// Trace tag sent in the envelope.
    pub fn trace(&self) -> Option<&str> {
        self.session.trace.as_deref()
    }

    /// Set the trace tag; an empty tag removes it.
    pub fn set_trace(&mut self, trace: impl Into<String>) {
        let trace = trace.into();
        self.session.trace = (!trace.is_empty()).then_some(trace);
    }

    /// `User-Agent` header value.
    pub fn user_agent(&self) -> &str {
        &self.session.user_agent
    }

    /// Set the `User-Agent` header value.
    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) {
        self.session.user_agent = user_agent.into();
    }

    /// Request timeout in seconds.
    pub fn timeout(&self) -> i64 {
        self.session.timeout_seconds
    }

    /// Set the request timeout in seconds. Zero or negative disables it.
    pub fn set_timeout(&mut self, seconds: i64) {
        self.session.timeout_seconds = seconds;
    }

    /// Whether JSON responses are requested.
    pub fn json_response(&self) -> bool {
        self.session.json_response
    }

    /// Request JSON (`true`) or XML (`false`) responses.
    pub fn set_json_response(&mut self, json: bool) {
        self.session.json_response = json;
    }

    /// Reject calls whose element open/close calls are unbalanced.
    pub fn set_strict_elements(&mut self, strict: bool) {
        self.strict_elements = strict;
    }

    /// HTTP status of the last exchange, 0 before the first call.
    pub fn status_code(&self) -> u16 {
        self.session.status_code
    }

    /// Number of successful calls made through this instance.
    pub fn count(&self) -> u64 {
        self.session.count
    }

    /// Endpoint used for calls, empty if resolution failed.
    pub fn server_url(&self) -> &str {
        &self.endpoint.rpc
    }

    /// File-transfer (DAV) endpoint.
    pub fn file_transfer_url(&self) -> &str {
        &self.endpoint.file_transfer
    }

    /// Release stream reported by the zone lookup.
    pub fn server_stream(&self) -> Option<&str> {
        self.endpoint.stream.as_deref()
    }

    /// Resolved endpoint details.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Session state snapshot.
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Error from instance-name resolution, if it failed.
    pub fn resolution_error(&self) -> Option<&anyhow::Error> {
        self.resolution_error.as_ref()
    }
}
