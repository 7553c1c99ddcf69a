//! Common test utilities for integration tests
//!
//! Provides a wiremock-backed instance discovery server for exercising the
//! reqwest transport end to end, and a scripted in-memory [`HttpClient`] for
//! counting requests without sockets.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use authority_resolver::{
    AuthorityResolver, HttpClient, HttpError, HttpResponse, ReqwestHttpClient, ResolverConfig,
    WellKnownHostRegistry,
};
use http::HeaderMap;
use serde_json::json;
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

/// Host registered as well known in test registries
pub const WELL_KNOWN_HOST: &str = "login.example.com";

/// Host that is only trusted after dynamic discovery
pub const SOVEREIGN_HOST: &str = "sovereign.cloud.example";

/// Path of the instance discovery endpoint
pub const DISCOVERY_PATH: &str = "/common/discovery/instance";

/// Registry containing only [`WELL_KNOWN_HOST`]
pub fn test_registry() -> Arc<WellKnownHostRegistry> {
    Arc::new(WellKnownHostRegistry::with_hosts([WELL_KNOWN_HOST]))
}

/// Mock instance discovery service
pub struct MockDiscoveryServer {
    pub server: MockServer,
}

impl MockDiscoveryServer {
    /// Start a new mock discovery server
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Resolver configuration pointing discovery at this server
    pub fn config(&self, request_timeout: Duration) -> ResolverConfig {
        ResolverConfig {
            instance_discovery_template: format!(
                "{}{}?authorization_endpoint={{authorize_endpoint}}&api-version=1.0",
                self.server.uri(),
                DISCOVERY_PATH
            ),
            request_timeout,
            ..ResolverConfig::default()
        }
    }

    /// Resolver using the reqwest transport against this server
    pub fn resolver(&self, request_timeout: Duration) -> AuthorityResolver {
        let config = self.config(request_timeout);
        let http_client = ReqwestHttpClient::new(&config).expect("Failed to build HTTP client");
        AuthorityResolver::with_http_client(config, test_registry(), Arc::new(http_client))
            .expect("Invalid resolver configuration")
    }

    /// Mock a successful discovery for `authority`
    pub async fn mock_discovery_success(
        &self,
        authority: &str,
        tenant_discovery_endpoint: &str,
    ) {
        Mock::given(method("GET"))
            .and(path(DISCOVERY_PATH))
            .and(query_param("authorization_endpoint", authority))
            .and(query_param("api-version", "1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tenant_discovery_endpoint": tenant_discovery_endpoint,
            })))
            .mount(&self.server)
            .await;
    }

    /// Mock a discovery response with an arbitrary status and JSON body
    pub async fn mock_discovery_response(&self, status: u16, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(DISCOVERY_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mock a discovery response that arrives after `delay`
    pub async fn mock_discovery_delay(&self, delay: Duration) {
        Mock::given(method("GET"))
            .and(path(DISCOVERY_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "tenant_discovery_endpoint": "https://late.example/t" }))
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// Number of requests received so far
    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or_default()
    }
}

/// Scripted response for [`ScriptedHttpClient`]
pub enum Scripted {
    /// Respond with a status and body
    Respond(u16, String),
    /// Fail at the transport level
    Fail(HttpError),
}

/// In-memory [`HttpClient`] answering from a script and counting calls
#[derive(Default)]
pub struct ScriptedHttpClient {
    script: Mutex<VecDeque<Scripted>>,
    calls: AtomicUsize,
    urls: Mutex<Vec<Url>>,
}

impl ScriptedHttpClient {
    /// Client with the given script; requests beyond the script fail
    pub fn new(script: impl IntoIterator<Item = Scripted>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            ..Self::default()
        })
    }

    /// Number of requests issued
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requested URLs in order
    pub fn urls(&self) -> Vec<Url> {
        self.urls.lock().unwrap().clone()
    }

    /// Resolver backed by this client and [`test_registry`]
    pub fn resolver(self: &Arc<Self>) -> AuthorityResolver {
        AuthorityResolver::with_http_client(
            ResolverConfig::default(),
            test_registry(),
            Arc::clone(self) as Arc<dyn HttpClient>,
        )
        .expect("Invalid resolver configuration")
    }
}

#[async_trait]
impl HttpClient for ScriptedHttpClient {
    async fn get(&self, url: &Url, _headers: HeaderMap) -> Result<HttpResponse, HttpError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.clone());

        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Respond(status, body)) => Ok(http::Response::builder()
                .status(status)
                .body(body.into_bytes())
                .unwrap()),
            Some(Scripted::Fail(err)) => Err(err),
            None => Err(HttpError::Request("no scripted response".to_string())),
        }
    }
}

/// [`HttpClient`] whose requests never complete
#[derive(Default)]
pub struct StalledHttpClient {
    calls: AtomicUsize,
}

impl StalledHttpClient {
    /// Number of requests started
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Resolver backed by this client and [`test_registry`]
    pub fn resolver(self: &Arc<Self>) -> AuthorityResolver {
        AuthorityResolver::with_http_client(
            ResolverConfig::default(),
            test_registry(),
            Arc::clone(self) as Arc<dyn HttpClient>,
        )
        .expect("Invalid resolver configuration")
    }
}

#[async_trait]
impl HttpClient for StalledHttpClient {
    async fn get(&self, _url: &Url, _headers: HeaderMap) -> Result<HttpResponse, HttpError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}

/// Successful discovery body for `endpoint`
pub fn discovery_body(endpoint: &str) -> String {
    json!({ "tenant_discovery_endpoint": endpoint }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_server_startup() {
        let mock = MockDiscoveryServer::start().await;
        let config = mock.config(Duration::from_secs(1));
        assert!(config.instance_discovery_template.contains(DISCOVERY_PATH));
        assert_eq!(mock.request_count().await, 0);
    }

    #[tokio::test]
    async fn test_scripted_client_runs_out() {
        let client = ScriptedHttpClient::new([]);
        let url = Url::parse("https://example.com").unwrap();
        assert!(client.get(&url, HeaderMap::new()).await.is_err());
        assert_eq!(client.calls(), 1);
    }
}
