//! Thin JSON-over-HTTP client shared by every API module
//!
//! Each API module builds an [`ApiClient`] for its origin and issues
//! requests relative to it. Non-2xx responses become [`ApiError::Http`]
//! unless the request opts into `resolve_on_http_error`.

use crate::error::{ApiError, Result};
use fbctl_core::types::NetworkConfig;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

/// Settings shared by all clients of one CLI invocation
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// OAuth bearer token; requests go out unauthenticated without one
    pub access_token: Option<String>,

    /// User agent string
    pub user_agent: String,

    /// Per-request timeout
    pub timeout: Duration,
}

impl ClientOptions {
    /// Build options from the runtime network section
    pub fn from_network(network: &NetworkConfig, access_token: Option<String>) -> Self {
        Self {
            access_token,
            user_agent: network.user_agent.clone(),
            timeout: Duration::from_secs(network.http_timeout_secs),
        }
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self::from_network(&NetworkConfig::default(), None)
    }
}

/// Body of an outgoing request
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Bytes(Vec<u8>),
}

/// A request relative to a client's origin
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    /// Return error responses instead of failing
    pub resolve_on_http_error: bool,
}

impl ApiRequest {
    /// Start a request with the given method and path
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: RequestBody::Empty,
            resolve_on_http_error: false,
        }
    }

    /// Add a query parameter
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Attach a JSON body
    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::invalid(format!("Failed to encode request body: {}", e)))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    /// Attach a raw byte body
    pub fn bytes(mut self, body: Vec<u8>) -> Self {
        self.body = RequestBody::Bytes(body);
        self
    }

    /// Return non-2xx responses to the caller instead of failing
    pub fn resolve_on_http_error(mut self) -> Self {
        self.resolve_on_http_error = true;
        self
    }
}

/// Undecoded response
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
    url: String,
}

impl RawResponse {
    /// Decode the body as JSON; an empty body decodes as `null`
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let text = if self.body.trim().is_empty() {
            "null"
        } else {
            self.body.as_str()
        };
        serde_json::from_str(text).map_err(|source| ApiError::Decode {
            url: self.url.clone(),
            source,
        })
    }

    /// A response header as a string
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

/// Decoded response
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: T,
}

/// Client bound to one API origin
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    url_prefix: String,
    api_version: Option<String>,
    access_token: Option<String>,
}

impl ApiClient {
    /// Create a client for `url_prefix` (e.g. `https://firebase.googleapis.com`)
    pub fn new(url_prefix: impl Into<String>, options: &ClientOptions) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(&options.user_agent)
            .timeout(options.timeout)
            .build()
            .map_err(|e| ApiError::invalid(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
            api_version: None,
            access_token: options.access_token.clone(),
        })
    }

    /// Prefix every path with `/{version}`
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Send requests without the bearer token (signed upload URLs)
    pub fn without_auth(mut self) -> Self {
        self.access_token = None;
        self
    }

    /// Absolute URL for a path relative to this client
    pub fn url(&self, path: &str) -> String {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        match &self.api_version {
            Some(v) => format!("{}/{}{}", self.url_prefix, v, path),
            None => format!("{}{}", self.url_prefix, path),
        }
    }

    fn url_with_query(&self, path: &str, query: &[(String, String)]) -> Result<String> {
        let raw = self.url(path);
        if query.is_empty() {
            return Ok(raw);
        }
        let mut url = Url::parse(&raw)
            .map_err(|e| ApiError::invalid(format!("Invalid URL {}: {}", raw, e)))?;
        url.query_pairs_mut().extend_pairs(query);
        Ok(url.to_string())
    }

    /// Send a request and return the undecoded response
    pub async fn send(&self, req: ApiRequest) -> Result<RawResponse> {
        let url = self.url_with_query(&req.path, &req.query)?;
        debug!(">>> {} {}", req.method, url);

        let mut builder = self.http.request(req.method.clone(), &url);
        if let Some(token) = &self.access_token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        for (key, value) in &req.headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|_| ApiError::invalid(format!("Invalid header name: {}", key)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| ApiError::invalid(format!("Invalid value for header {}", key)))?;
            builder = builder.header(name, value);
        }
        builder = match req.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Bytes(bytes) => builder.body(bytes),
        };

        let response = builder.send().await.map_err(|source| ApiError::Transport {
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(|source| ApiError::Transport {
            url: url.clone(),
            source,
        })?;
        debug!("<<< {} {}", status.as_u16(), url);
        trace!("<<< body: {}", body);

        if !status.is_success() && !req.resolve_on_http_error {
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: error_message(&body, status),
                body,
            });
        }

        Ok(RawResponse {
            status,
            headers,
            body,
            url,
        })
    }

    /// Send a request and decode the JSON body
    pub async fn request<T: DeserializeOwned>(&self, req: ApiRequest) -> Result<ApiResponse<T>> {
        let raw = self.send(req).await?;
        let body = raw.json()?;
        Ok(ApiResponse {
            status: raw.status,
            headers: raw.headers,
            body,
        })
    }

    /// GET and decode
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>> {
        self.request(ApiRequest::new(Method::GET, path)).await
    }

    /// POST a JSON body and decode
    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse<T>> {
        self.request(ApiRequest::new(Method::POST, path).json(body)?)
            .await
    }

    /// PATCH a JSON body with query parameters and decode
    pub async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        query: &[(&str, &str)],
    ) -> Result<ApiResponse<T>> {
        let mut req = ApiRequest::new(Method::PATCH, path).json(body)?;
        for (key, value) in query {
            req = req.query(*key, *value);
        }
        self.request(req).await
    }

    /// GET without failing on error statuses
    pub async fn get_raw(&self, path: &str) -> Result<RawResponse> {
        self.send(ApiRequest::new(Method::GET, path).resolve_on_http_error())
            .await
    }

    /// DELETE and decode
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>> {
        self.request(ApiRequest::new(Method::DELETE, path)).await
    }
}

/// Best human-readable message for an error response
///
/// Google APIs return `{"error": {"message": ...}}`; anything else falls
/// back to the raw body or the status reason.
fn error_message(body: &str, status: StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(msg) = value
            .pointer("/error/message")
            .and_then(|m| m.as_str())
            .or_else(|| value.get("error").and_then(|e| e.as_str()))
        {
            return msg.to_string();
        }
    }
    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        body.to_string()
    }
}
