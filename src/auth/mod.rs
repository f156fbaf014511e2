//! Credentials attached to every outgoing request.
//!
//! Two providers are included:
//!
//! 1. **[`BearerToken`]**: app-only OAuth2 bearer token
//! 2. **[`OAuth2User`]**: OAuth2 user context (authorization code + PKCE),
//!    with automatic refresh
//!
//! Both implement [`AuthProvider`], the seam the client calls once per
//! request to obtain the `Authorization` header.
//!
//! # App-only
//!
//! ```no_run
//! use twitter_api_rs::{BearerToken, TwitterClient};
//!
//! # fn example() -> twitter_api_rs::Result<()> {
//! let client = TwitterClient::new(BearerToken::from_env()?)?;
//! # Ok(())
//! # }
//! ```
//!
//! # User context
//!
//! ```no_run
//! use twitter_api_rs::auth::{CodeChallenge, OAuth2User, OAuth2UserConfig, Scope};
//!
//! # async fn example() -> twitter_api_rs::Result<()> {
//! let user = OAuth2User::new(OAuth2UserConfig::new(
//!     "client-id",
//!     "https://example.com/callback",
//!     [Scope::TweetRead, Scope::UsersRead, Scope::OfflineAccess],
//! ))?;
//!
//! let url = user.generate_auth_url("state", CodeChallenge::S256).await?;
//! println!("Visit {url}");
//!
//! // ...after the redirect delivers `code`:
//! user.request_access_token("code").await?;
//! # Ok(())
//! # }
//! ```

mod bearer;
mod oauth2;

pub use bearer::BearerToken;
pub use oauth2::{CodeChallenge, OAuth2Token, OAuth2User, OAuth2UserConfig, Scope};

use reqwest::header::HeaderValue;
use reqwest::Method;
use url::Url;

use crate::client::BoxFuture;
use crate::{Error, Result};

/// Supplies the `Authorization` header for a request.
///
/// Called once per request, after the URL (including its query) is final
/// and before the request is sent. A failure aborts the request with no
/// network traffic.
pub trait AuthProvider: Send + Sync {
    /// Produce the header value for `method` on `url`.
    fn authorization<'a>(&'a self, method: &'a Method, url: &'a Url)
        -> BoxFuture<'a, Result<HeaderValue>>;
}

/// Format a `Bearer` header, rejecting empty or non-visible-ASCII tokens.
pub(crate) fn bearer_header(token: &str) -> Result<HeaderValue> {
    if token.trim().is_empty() {
        return Err(Error::Authentication("access token is empty".to_string()));
    }
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| Error::Authentication("access token is not a valid header value".to_string()))?;
    value.set_sensitive(true);
    Ok(value)
}
