//! Client configuration options.

use std::time::Duration;

use url::Url;

use crate::{Error, Result};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.twitter.com";

/// Configuration for the Twitter client.
///
/// Requests are never retried. A 429 surfaces as
/// [`Error::RateLimited`](crate::Error::RateLimited) carrying the window
/// reset, and waiting is up to the caller.
///
/// # Example
///
/// ```
/// use twitter_api_rs::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_timeout(Duration::from_secs(60))
///     .with_user_agent("my-app/1.0");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root that endpoint paths are joined onto
    pub base_url: String,
    /// Total timeout for a REST request. Streaming connections are exempt.
    pub timeout: Duration,
    /// Timeout for establishing a connection
    pub connect_timeout: Duration,
    /// User-Agent header value
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("twitter-api-rs/{} (Rust)", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the client at another API root, e.g. a local mock server.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url)?;
        if url.cannot_be_a_base() {
            return Err(Error::Config(format!("not a base URL: {}", base_url)));
        }
        self.base_url = url.as_str().trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Set the REST request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// HTTP client builder carrying the connect timeout and User-Agent.
    ///
    /// No total timeout is set here; REST calls set it per request so that
    /// streams are not cut off.
    pub(crate) fn http_builder(&self) -> reqwest::ClientBuilder {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .user_agent(&self.user_agent)
    }

    /// Resolve an endpoint path such as `/2/tweets/20` against the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        ))?)
    }
}
