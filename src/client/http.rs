//! HTTP client implementation for the Twitter API v2.

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};

use crate::api::{TweetsService, UsersService};
use crate::auth::AuthProvider;
use crate::Result;

use super::config::ClientConfig;
use super::envelope::{parse_envelope, ResponseEnvelope};
use super::paginated::{BoxFuture, Paginator};
use super::rate_limit::{RateLimitTracker, RequestOptions};

#[cfg(feature = "streaming")]
use crate::streaming::JsonLineStream;
#[cfg(feature = "streaming")]
use crate::Error;

/// Placeholder for requests without a query string.
pub(crate) const NO_QUERY: Option<&()> = None;
/// Placeholder for requests without a JSON body.
pub(crate) const NO_BODY: Option<&()> = None;

/// The main client for interacting with the Twitter API v2.
///
/// This client provides access to the API through service structs. The
/// client attaches credentials, tracks rate limits, and decodes every
/// response into a [`ResponseEnvelope`].
///
/// # Example
///
/// ```no_run
/// use twitter_api_rs::{BearerToken, RequestOptions, TweetId, TwitterClient};
///
/// # async fn example() -> twitter_api_rs::Result<()> {
/// let client = TwitterClient::new(BearerToken::new("AAAA..."))?;
///
/// let options = RequestOptions::new().on_rate_limit(|rl| {
///     println!("{} requests left until {:?}", rl.remaining, rl.reset_at());
/// });
/// let envelope = client
///     .tweets()
///     .find_tweet_by_id(&TweetId::new("20"), None, options)
///     .await?;
///
/// if let Some(tweet) = envelope.data {
///     println!("{}", tweet.text);
/// }
/// # Ok(())
/// # }
/// ```
pub struct TwitterClient {
    pub(crate) inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    pub(crate) http: reqwest::Client,
    pub(crate) auth: Arc<dyn AuthProvider>,
    pub(crate) config: ClientConfig,
}

impl TwitterClient {
    /// Create a client with default configuration.
    pub fn new(auth: impl AuthProvider + 'static) -> Result<Self> {
        Self::with_config(auth, ClientConfig::default())
    }

    /// Create a client with custom configuration.
    pub fn with_config(auth: impl AuthProvider + 'static, config: ClientConfig) -> Result<Self> {
        Self::with_shared_auth(Arc::new(auth), config)
    }

    /// Create a client around a credential shared with other clients.
    pub fn with_shared_auth(auth: Arc<dyn AuthProvider>, config: ClientConfig) -> Result<Self> {
        let http = config.http_builder().build()?;

        Ok(Self {
            inner: Arc::new(ClientInner { http, auth, config }),
        })
    }

    /// Get the tweets service.
    pub fn tweets(&self) -> TweetsService {
        TweetsService::new(self.inner.clone())
    }

    /// Get the users service.
    pub fn users(&self) -> UsersService {
        UsersService::new(self.inner.clone())
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }
}

impl ClientInner {
    /// Build, authorize and send one request.
    ///
    /// The credential is resolved after the URL is final; if it fails,
    /// nothing is sent.
    async fn send<Q, B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
        bounded: bool,
    ) -> Result<reqwest::Response>
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let url = self.config.endpoint(path)?;
        let mut builder = self.http.request(method, url);
        if let Some(query) = query {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        if bounded {
            builder = builder.timeout(self.config.timeout);
        }

        let mut request = builder.build()?;
        let authorization = self
            .auth
            .authorization(request.method(), request.url())
            .await?;
        request.headers_mut().insert(AUTHORIZATION, authorization);

        tracing::debug!(method = %request.method(), path, "sending request");
        Ok(self.http.execute(request).await?)
    }

    /// Make a REST request and decode its envelope.
    pub(crate) async fn request<T, Q, B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
        tracker: &RateLimitTracker,
    ) -> Result<ResponseEnvelope<T>>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let response = self.send(method, path, query, body, true).await?;
        let status = response.status();
        let rate_limit = tracker.observe(response.headers());
        tracing::debug!(
            status = status.as_u16(),
            remaining = rate_limit.map(|rl| rl.remaining),
            "received response"
        );

        let bytes = response.bytes().await?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), path, "request failed");
        }
        parse_envelope(status, &bytes, rate_limit)
    }

    /// Start a paginated GET, fetching the first page now.
    ///
    /// Each page repeats `query` with `pagination_token` set to the previous
    /// page's `next_token`.
    pub(crate) async fn paginate<T, Q>(
        self: &Arc<Self>,
        path: String,
        query: Q,
        options: RequestOptions,
    ) -> Result<Paginator<T>>
    where
        T: DeserializeOwned + Send + 'static,
        Q: Serialize + Send + Sync + 'static,
    {
        let inner = Arc::clone(self);
        let query = Arc::new(query);

        let fetch_page = move |token: Option<String>, tracker: RateLimitTracker| {
            let inner = inner.clone();
            let query = query.clone();
            let path = path.clone();
            let fut: BoxFuture<'static, Result<ResponseEnvelope<T>>> = Box::pin(async move {
                let page = PageQuery {
                    query: &*query,
                    pagination_token: token.as_deref(),
                };
                inner
                    .request(Method::GET, &path, Some(&page), NO_BODY, &tracker)
                    .await
            });
            fut
        };

        Paginator::start(fetch_page, RateLimitTracker::from(&options)).await
    }

    /// Open a streaming GET.
    ///
    /// The connect response is shown to the rate-limit observer. A non-2xx
    /// status is read fully and returned as an error; no stream is created.
    #[cfg(feature = "streaming")]
    pub(crate) async fn stream<T, Q>(
        &self,
        path: &str,
        query: Option<&Q>,
        tracker: &RateLimitTracker,
    ) -> Result<JsonLineStream<T>>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self.send(Method::GET, path, query, NO_BODY, false).await?;
        let status = response.status();
        let rate_limit = tracker.observe(response.headers());

        if !status.is_success() {
            let bytes = response.bytes().await?;
            tracing::warn!(status = status.as_u16(), path, "stream connect failed");
            return Err(Error::from_api_response(status.as_u16(), &bytes, rate_limit));
        }

        tracing::debug!(path, "stream opened");
        Ok(JsonLineStream::from_response(response))
    }
}

/// Caller query plus the continuation token, sent as `pagination_token`.
#[derive(Serialize)]
struct PageQuery<'a, Q> {
    #[serde(flatten)]
    query: &'a Q,
    #[serde(skip_serializing_if = "Option::is_none")]
    pagination_token: Option<&'a str>,
}

impl Clone for TwitterClient {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl std::fmt::Debug for TwitterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterClient")
            .field("config", &self.inner.config)
            .finish()
    }
}
