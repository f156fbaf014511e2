//! App-only bearer token.

use reqwest::header::HeaderValue;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use super::{bearer_header, AuthProvider};
use crate::client::BoxFuture;
use crate::{Error, Result};

/// Environment variable read by [`BearerToken::from_env`].
pub const BEARER_TOKEN_ENV: &str = "TWITTER_BEARER_TOKEN";

/// App-only OAuth2 bearer token.
///
/// The token is read-only once created and may be shared freely between
/// clients and tasks.
#[derive(Clone)]
pub struct BearerToken {
    token: SecretString,
}

impl BearerToken {
    /// Wrap a bearer token.
    ///
    /// An empty token is accepted here but fails every request with
    /// [`Error::Authentication`] before anything is sent.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
        }
    }

    /// Read the token from `TWITTER_BEARER_TOKEN`.
    pub fn from_env() -> Result<Self> {
        std::env::var(BEARER_TOKEN_ENV)
            .map(Self::new)
            .map_err(|_| Error::Config(format!("{BEARER_TOKEN_ENV} is not set")))
    }
}

impl AuthProvider for BearerToken {
    fn authorization<'a>(
        &'a self,
        _method: &'a Method,
        _url: &'a Url,
    ) -> BoxFuture<'a, Result<HeaderValue>> {
        Box::pin(async move { bearer_header(self.token.expose_secret()) })
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerToken")
            .field("token", &"[REDACTED]")
            .finish()
    }
}
