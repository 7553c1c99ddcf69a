//! HTTP transport for instance discovery
//!
//! Discovery only ever needs a single `GET`, so the transport seam is a small
//! async trait. [`ReqwestHttpClient`] is the production implementation; tests
//! and embedders can substitute their own (for example to route through a
//! proxy-aware client or to record requests).
//!
//! ## Security Configuration
//!
//! The default client:
//! - does NOT follow redirects
//! - enforces the configured request timeout
//! - caps response bodies at `max_response_size`

use async_trait::async_trait;
use http::HeaderMap;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::ResolverConfig;

/// Response type returned by [`HttpClient::get`]
pub type HttpResponse = http::Response<Vec<u8>>;

/// Maximum number of body bytes kept in an unexpected-status error
const ERROR_BODY_EXCERPT: usize = 512;

/// Transport-level failures
#[derive(Debug, Clone, Error)]
pub enum HttpError {
    /// Request could not be sent or the connection failed
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// Request did not complete within the transport timeout
    #[error("HTTP request timed out")]
    Timeout,

    /// Server answered with a non-success status
    #[error("HTTP {status}: {body}")]
    UnexpectedStatus {
        /// Status code returned by the server
        status: u16,
        /// Leading part of the response body
        body: String,
    },

    /// Response body exceeded the configured limit
    #[error("Response size limit exceeded: {size} bytes (max: {limit} bytes)")]
    ResponseTooLarge {
        /// Observed or announced size
        size: u64,
        /// Configured limit
        limit: usize,
    },

    /// Response body is not valid JSON
    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),

    /// Request URL could not be built
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    /// Request header value could not be built
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

impl HttpError {
    /// Build an [`HttpError::UnexpectedStatus`] from a response, keeping a
    /// bounded excerpt of its body for diagnostics.
    pub fn unexpected_status(response: &HttpResponse) -> Self {
        let body = response.body();
        let excerpt = &body[..body.len().min(ERROR_BODY_EXCERPT)];
        Self::UnexpectedStatus {
            status: response.status().as_u16(),
            body: String::from_utf8_lossy(excerpt).into_owned(),
        }
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(e.to_string())
        }
    }
}

/// Minimal HTTP capability needed by instance discovery.
///
/// Implementations return any HTTP response as `Ok`; status interpretation is
/// left to the caller. Timeouts and cancellation are the implementation's
/// responsibility.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue a `GET` request with the given headers.
    async fn get(&self, url: &Url, headers: HeaderMap) -> Result<HttpResponse, HttpError>;
}

/// [`HttpClient`] backed by `reqwest`
#[derive(Clone)]
pub struct ReqwestHttpClient {
    inner: reqwest::Client,
    max_response_size: usize,
}

impl ReqwestHttpClient {
    /// Create a client with the timeout, user agent and size limit from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Request`] if the underlying client cannot be built
    /// (for example when no TLS backend is available).
    pub fn new(config: &ResolverConfig) -> Result<Self, HttpError> {
        let inner = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| HttpError::Request(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            inner,
            max_response_size: config.max_response_size,
        })
    }

    /// Wrap an existing reqwest client.
    ///
    /// # Warning
    /// Ensure the client is configured with `redirect::Policy::none()` and a
    /// timeout; discovery does not add either on its own.
    pub fn from_client(client: reqwest::Client, max_response_size: usize) -> Self {
        Self {
            inner: client,
            max_response_size,
        }
    }
}

impl std::fmt::Debug for ReqwestHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestHttpClient")
            .field("inner", &"<reqwest::Client>")
            .field("max_response_size", &self.max_response_size)
            .finish()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &Url, headers: HeaderMap) -> Result<HttpResponse, HttpError> {
        debug!("GET {}", url);

        let response = self
            .inner
            .get(url.as_str())
            .headers(headers)
            .send()
            .await?;

        if let Some(content_length) = response.content_length()
            && content_length > self.max_response_size as u64
        {
            return Err(HttpError::ResponseTooLarge {
                size: content_length,
                limit: self.max_response_size,
            });
        }

        let status = response.status();
        let response_headers = response.headers().clone();

        let body = response.bytes().await?;
        if body.len() > self.max_response_size {
            return Err(HttpError::ResponseTooLarge {
                size: body.len() as u64,
                limit: self.max_response_size,
            });
        }

        let mut builder = http::Response::builder().status(status);
        if let Some(target) = builder.headers_mut() {
            *target = response_headers;
        }

        builder
            .body(body.to_vec())
            .map_err(|e| HttpError::Request(format!("Failed to assemble response: {e}")))
    }
}
