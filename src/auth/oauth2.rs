//! OAuth2 user-context authentication (authorization code with PKCE).

use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use reqwest::header::HeaderValue;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use url::Url;

use super::{bearer_header, AuthProvider};
use crate::client::{BoxFuture, ClientConfig};
use crate::{Error, Result};

const AUTHORIZE_URL: &str = "https://twitter.com/i/oauth2/authorize";
const DEFAULT_API_BASE_URL: &str = "https://api.twitter.com";
const TOKEN_PATH: &str = "/2/oauth2/token";
const REVOKE_PATH: &str = "/2/oauth2/revoke";

/// Refresh this long before the access token expires.
const REFRESH_BUFFER_SECS: i64 = 60;

/// Permission scopes for user-context tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Scope {
    TweetRead,
    TweetWrite,
    TweetModerateWrite,
    UsersRead,
    FollowsRead,
    FollowsWrite,
    OfflineAccess,
    SpaceRead,
    MuteRead,
    MuteWrite,
    LikeRead,
    LikeWrite,
    ListRead,
    ListWrite,
    BlockRead,
    BlockWrite,
    BookmarkRead,
    BookmarkWrite,
}

impl Scope {
    /// Wire name of the scope.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::TweetRead => "tweet.read",
            Scope::TweetWrite => "tweet.write",
            Scope::TweetModerateWrite => "tweet.moderate.write",
            Scope::UsersRead => "users.read",
            Scope::FollowsRead => "follows.read",
            Scope::FollowsWrite => "follows.write",
            Scope::OfflineAccess => "offline.access",
            Scope::SpaceRead => "space.read",
            Scope::MuteRead => "mute.read",
            Scope::MuteWrite => "mute.write",
            Scope::LikeRead => "like.read",
            Scope::LikeWrite => "like.write",
            Scope::ListRead => "list.read",
            Scope::ListWrite => "list.write",
            Scope::BlockRead => "block.read",
            Scope::BlockWrite => "block.write",
            Scope::BookmarkRead => "bookmark.read",
            Scope::BookmarkWrite => "bookmark.write",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// PKCE challenge method.
#[derive(Clone)]
pub enum CodeChallenge {
    /// Generate a random verifier and send its SHA-256 digest.
    S256,
    /// Use the given string as both verifier and challenge.
    Plain(String),
}

/// Static settings of an OAuth2 client application.
#[derive(Clone)]
pub struct OAuth2UserConfig {
    /// Application client id
    pub client_id: String,
    /// Client secret, for confidential clients
    pub client_secret: Option<SecretString>,
    /// Redirect URI registered for the application
    pub callback: String,
    /// Requested scopes
    pub scopes: Vec<Scope>,
    /// Base URL for token endpoints
    pub api_base_url: String,
    /// Authorization page URL
    pub authorize_url: String,
}

impl OAuth2UserConfig {
    /// Configuration for a public client.
    pub fn new(
        client_id: impl Into<String>,
        callback: impl Into<String>,
        scopes: impl IntoIterator<Item = Scope>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            callback: callback.into(),
            scopes: scopes.into_iter().collect(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            authorize_url: AUTHORIZE_URL.to_string(),
        }
    }

    /// Make this a confidential client; token requests use HTTP Basic auth.
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(SecretString::from(secret.into()));
        self
    }

    /// Override the base URL of the token endpoints.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

impl fmt::Debug for OAuth2UserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2UserConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .field("callback", &self.callback)
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// A user access token, exportable for persistence.
#[derive(Clone, Serialize, Deserialize)]
pub struct OAuth2Token {
    /// Bearer access token
    pub access_token: String,
    /// Refresh token, granted with the `offline.access` scope
    pub refresh_token: Option<String>,
    /// Access token expiry
    pub expires_at: Option<DateTime<Utc>>,
    /// Granted scopes, space separated
    pub scope: Option<String>,
}

impl fmt::Debug for OAuth2Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2Token")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .finish()
    }
}

/// OAuth2 user-context credential.
///
/// Walks the authorization-code flow and then acts as an [`AuthProvider`],
/// refreshing the access token shortly before it expires when a refresh
/// token is available.
///
/// # Thread Safety
///
/// `OAuth2User` is cheap to clone and shares its token between clones.
/// Reads are concurrent; a refresh holds the write lock so only one runs
/// at a time.
#[derive(Clone)]
pub struct OAuth2User {
    config: Arc<OAuth2UserConfig>,
    http: reqwest::Client,
    inner: Arc<RwLock<OAuth2UserInner>>,
}

#[derive(Default)]
struct OAuth2UserInner {
    code_verifier: Option<SecretString>,
    access_token: Option<SecretString>,
    refresh_token: Option<SecretString>,
    expires_at: Option<DateTime<Utc>>,
    scope: Option<String>,
}

impl OAuth2UserInner {
    fn store(&mut self, response: TokenResponse) {
        self.access_token = Some(SecretString::from(response.access_token));
        if let Some(refresh) = response.refresh_token {
            self.refresh_token = Some(SecretString::from(refresh));
        }
        // An out-of-range lifetime is kept as "no expiry".
        self.expires_at = response
            .expires_in
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime));
        self.scope = response.scope;
    }

    fn expires_within(&self, buffer: Duration) -> bool {
        self.expires_at
            .is_some_and(|expires_at| Utc::now() + buffer >= expires_at)
    }
}

impl OAuth2User {
    /// Create a provider with no token yet.
    ///
    /// Token requests use the default [`ClientConfig`] timeouts and
    /// User-Agent.
    pub fn new(config: OAuth2UserConfig) -> Result<Self> {
        Self::with_client_config(config, &ClientConfig::default())
    }

    /// Create a provider whose token requests follow `client_config`.
    ///
    /// Only the timeouts and User-Agent are used; token endpoints live under
    /// [`OAuth2UserConfig::api_base_url`].
    pub fn with_client_config(
        config: OAuth2UserConfig,
        client_config: &ClientConfig,
    ) -> Result<Self> {
        let http = client_config
            .http_builder()
            .timeout(client_config.timeout)
            .build()?;
        Ok(Self {
            config: Arc::new(config),
            http,
            inner: Arc::new(RwLock::new(OAuth2UserInner::default())),
        })
    }

    /// Create a provider from a previously exported token.
    pub fn with_token(config: OAuth2UserConfig, token: OAuth2Token) -> Result<Self> {
        let user = Self::new(config)?;
        let inner = OAuth2UserInner {
            code_verifier: None,
            access_token: Some(SecretString::from(token.access_token)),
            refresh_token: token.refresh_token.map(SecretString::from),
            expires_at: token.expires_at,
            scope: token.scope,
        };
        Ok(Self {
            inner: Arc::new(RwLock::new(inner)),
            ..user
        })
    }

    /// Build the URL the user must visit to grant access.
    ///
    /// The PKCE verifier is remembered for the following
    /// [`request_access_token`](Self::request_access_token).
    pub async fn generate_auth_url(&self, state: &str, challenge: CodeChallenge) -> Result<Url> {
        let (verifier, challenge, method) = match challenge {
            CodeChallenge::S256 => {
                let verifier = generate_verifier();
                let challenge = s256_challenge(&verifier);
                (verifier, challenge, "s256")
            }
            CodeChallenge::Plain(verifier) => (verifier.clone(), verifier, "plain"),
        };

        let scopes = self
            .config
            .scopes
            .iter()
            .map(Scope::as_str)
            .collect::<Vec<_>>()
            .join(" ");

        let mut url = Url::parse(&self.config.authorize_url)?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", self.config.client_id.as_str())
            .append_pair("redirect_uri", self.config.callback.as_str())
            .append_pair("state", state)
            .append_pair("code_challenge", &challenge)
            .append_pair("code_challenge_method", method)
            .append_pair("scope", &scopes);

        self.inner.write().await.code_verifier = Some(SecretString::from(verifier));
        Ok(url)
    }

    /// Exchange an authorization code for tokens.
    pub async fn request_access_token(&self, code: &str) -> Result<OAuth2Token> {
        let mut inner = self.inner.write().await;
        let verifier = inner.code_verifier.as_ref().ok_or_else(|| {
            Error::Authentication(
                "no PKCE verifier; call generate_auth_url before request_access_token".to_string(),
            )
        })?;

        let response = self
            .token_request(
                TOKEN_PATH,
                &[
                    ("code", code),
                    ("grant_type", "authorization_code"),
                    ("code_verifier", verifier.expose_secret()),
                    ("client_id", self.config.client_id.as_str()),
                    ("redirect_uri", self.config.callback.as_str()),
                ],
            )
            .await?;

        inner.store(response);
        inner.code_verifier = None;
        tracing::debug!("obtained user access token");
        export(&inner)
    }

    /// Exchange the refresh token for a new access token.
    pub async fn refresh_access_token(&self) -> Result<OAuth2Token> {
        let mut inner = self.inner.write().await;
        self.refresh_locked(&mut inner).await?;
        export(&inner)
    }

    /// Revoke the current access token and forget it.
    pub async fn revoke_access_token(&self) -> Result<()> {
        let mut inner = self.inner.write().await;
        let token = inner
            .access_token
            .as_ref()
            .ok_or_else(|| Error::Authentication("no access token to revoke".to_string()))?;

        let url = format!("{}{}", self.config.api_base_url, REVOKE_PATH);
        let response = self
            .with_client_auth(self.http.post(&url))
            .form(&[
                ("token", token.expose_secret()),
                ("token_type_hint", "access_token"),
                ("client_id", self.config.client_id.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Authentication(format!(
                "Token revocation failed ({}): {}",
                status, body
            )));
        }

        inner.access_token = None;
        inner.expires_at = None;
        Ok(())
    }

    /// Current token, if any.
    pub async fn token(&self) -> Option<OAuth2Token> {
        export(&*self.inner.read().await).ok()
    }

    /// Check if the access token will expire within the given buffer period.
    pub async fn expires_within(&self, buffer: Duration) -> bool {
        self.inner.read().await.expires_within(buffer)
    }

    /// Refresh the token if it is about to expire and can be refreshed.
    async fn ensure_valid(&self) -> Result<()> {
        let buffer = Duration::seconds(REFRESH_BUFFER_SECS);
        {
            let inner = self.inner.read().await;
            if !inner.expires_within(buffer) || inner.refresh_token.is_none() {
                return Ok(());
            }
        }

        let mut inner = self.inner.write().await;
        // Another task may have refreshed while we waited for the lock.
        if inner.expires_within(buffer) && inner.refresh_token.is_some() {
            self.refresh_locked(&mut inner).await?;
        }
        Ok(())
    }

    async fn refresh_locked(&self, inner: &mut OAuth2UserInner) -> Result<()> {
        let refresh_token = inner
            .refresh_token
            .as_ref()
            .ok_or_else(|| Error::Authentication("no refresh token; request offline.access".to_string()))?;

        let response = self
            .token_request(
                TOKEN_PATH,
                &[
                    ("refresh_token", refresh_token.expose_secret()),
                    ("grant_type", "refresh_token"),
                    ("client_id", self.config.client_id.as_str()),
                ],
            )
            .await?;

        inner.store(response);
        tracing::debug!("refreshed user access token");
        Ok(())
    }

    async fn token_request(&self, path: &str, params: &[(&str, &str)]) -> Result<TokenResponse> {
        let url = format!("{}{}", self.config.api_base_url, path);
        let response = self
            .with_client_auth(self.http.post(&url))
            .form(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Authentication(format!(
                "Token exchange failed ({}): {}",
                status, body
            )));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| Error::parse(e, &body))
    }

    fn with_client_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.client_secret {
            Some(secret) => request.basic_auth(&self.config.client_id, Some(secret.expose_secret())),
            None => request,
        }
    }
}

impl AuthProvider for OAuth2User {
    fn authorization<'a>(
        &'a self,
        _method: &'a Method,
        _url: &'a Url,
    ) -> BoxFuture<'a, Result<HeaderValue>> {
        Box::pin(async move {
            self.ensure_valid().await?;
            let inner = self.inner.read().await;
            let token = inner.access_token.as_ref().ok_or_else(|| {
                Error::Authentication(
                    "no user access token; complete the authorization flow first".to_string(),
                )
            })?;
            bearer_header(token.expose_secret())
        })
    }
}

impl fmt::Debug for OAuth2User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2User")
            .field("config", &self.config)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

fn export(inner: &OAuth2UserInner) -> Result<OAuth2Token> {
    let access_token = inner
        .access_token
        .as_ref()
        .ok_or_else(|| Error::Authentication("no access token".to_string()))?;
    Ok(OAuth2Token {
        access_token: access_token.expose_secret().to_string(),
        refresh_token: inner
            .refresh_token
            .as_ref()
            .map(|t| t.expose_secret().to_string()),
        expires_at: inner.expires_at,
        scope: inner.scope.clone(),
    })
}

/// 32 random bytes, base64url encoded: a 43 character verifier.
fn generate_verifier() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn s256_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[allow(dead_code)]
    token_type: Option<String>,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
    scope: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OAuth2UserConfig {
        OAuth2UserConfig::new(
            "client-id",
            "https://example.com/cb",
            [Scope::TweetRead, Scope::UsersRead, Scope::OfflineAccess],
        )
    }

    fn query(url: &Url, key: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[tokio::test]
    async fn test_auth_url_s256() {
        let user = OAuth2User::new(config()).unwrap();
        let url = user.generate_auth_url("xyz", CodeChallenge::S256).await.unwrap();

        assert!(url.as_str().starts_with(AUTHORIZE_URL));
        assert_eq!(query(&url, "response_type").as_deref(), Some("code"));
        assert_eq!(query(&url, "client_id").as_deref(), Some("client-id"));
        assert_eq!(query(&url, "redirect_uri").as_deref(), Some("https://example.com/cb"));
        assert_eq!(query(&url, "state").as_deref(), Some("xyz"));
        assert_eq!(query(&url, "code_challenge_method").as_deref(), Some("s256"));
        assert_eq!(
            query(&url, "scope").as_deref(),
            Some("tweet.read users.read offline.access")
        );

        let inner = user.inner.read().await;
        let verifier = inner.code_verifier.as_ref().unwrap().expose_secret().to_string();
        assert_eq!(verifier.len(), 43);
        assert_eq!(query(&url, "code_challenge"), Some(s256_challenge(&verifier)));
    }

    #[tokio::test]
    async fn test_auth_url_plain() {
        let user = OAuth2User::new(config()).unwrap();
        let url = user
            .generate_auth_url("s", CodeChallenge::Plain("challenge".into()))
            .await
            .unwrap();
        assert_eq!(query(&url, "code_challenge").as_deref(), Some("challenge"));
        assert_eq!(query(&url, "code_challenge_method").as_deref(), Some("plain"));
    }

    #[test]
    fn test_s256_known_vector() {
        // RFC 7636, appendix B
        assert_eq!(
            s256_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[tokio::test]
    async fn test_token_request_requires_verifier() {
        let err = OAuth2User::new(config())
            .unwrap()
            .request_access_token("code")
            .await
            .unwrap_err();
        assert!(err.is_auth_error());
    }

    #[tokio::test]
    async fn test_authorization_without_token_fails() {
        let url = Url::parse("https://api.twitter.com/2/users/me").unwrap();
        let err = OAuth2User::new(config())
            .unwrap()
            .authorization(&Method::GET, &url)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));
    }

    #[test]
    fn test_out_of_range_lifetime_never_expires() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token":"a","token_type":"bearer","expires_in":9223372036854775807}"#,
        )
        .unwrap();
        let mut inner = OAuth2UserInner::default();
        inner.store(response);
        assert!(inner.expires_at.is_none());
        assert!(!inner.expires_within(Duration::seconds(REFRESH_BUFFER_SECS)));

        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"b","expires_in":7200}"#).unwrap();
        inner.store(response);
        assert!(inner.expires_at.is_some_and(|at| at > Utc::now()));
    }

    #[tokio::test]
    async fn test_imported_token_is_used() {
        let user = OAuth2User::with_token(
            config(),
            OAuth2Token {
                access_token: "user-token".into(),
                refresh_token: None,
                expires_at: Some(Utc::now() + Duration::hours(2)),
                scope: None,
            },
        )
        .unwrap();
        let url = Url::parse("https://api.twitter.com/2/users/me").unwrap();
        let value = user.authorization(&Method::GET, &url).await.unwrap();
        assert_eq!(value.to_str().unwrap(), "Bearer user-token");
        assert!(!user.expires_within(Duration::seconds(60)).await);
        assert_eq!(user.token().await.unwrap().access_token, "user-token");
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let token = OAuth2Token {
            access_token: "super-secret-token".into(),
            refresh_token: Some("refresh-secret".into()),
            expires_at: None,
            scope: None,
        };
        let debug_str = format!("{token:?}");
        assert!(!debug_str.contains("super-secret-token"));
        assert!(!debug_str.contains("refresh-secret"));

        let debug_str = format!("{:?}", config().with_client_secret("client-secret"));
        assert!(!debug_str.contains("client-secret"));
        assert!(debug_str.contains("REDACTED"));
    }
}
