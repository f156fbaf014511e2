//! Error types for the Twitter API client.
//!
//! Every fallible operation in this crate returns [`Result`]. Partial
//! failures (an envelope carrying both `data` and `errors`) are *not*
//! errors; inspect [`ResponseEnvelope::errors`](crate::ResponseEnvelope)
//! for those.

use serde_json::Value;
use thiserror::Error;

use crate::client::RateLimit;

/// A specialized `Result` type for Twitter API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for all Twitter API operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The transport failed to send the request or read the response.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A body or stream line was not valid JSON, or did not match the
    /// expected shape.
    #[error("Parse error: {source}")]
    Parse {
        /// Underlying decode error
        #[source]
        source: serde_json::Error,
        /// The offending text, lossily decoded as UTF-8
        raw: String,
    },

    /// The API answered with a non-2xx status.
    #[error("API error: status={status}, title={title:?}, detail={detail:?}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Short problem title from the error body, if any
        title: Option<String>,
        /// Longer problem description from the error body, if any
        detail: Option<String>,
        /// Parsed error body, or the raw text as a JSON string
        body: Value,
    },

    /// The credential was rejected (401 or 403).
    #[error("Unauthorized ({status}): {message}")]
    Unauthorized {
        /// HTTP status code
        status: u16,
        /// Human-readable message extracted from the body
        message: String,
        /// Parsed error body, or the raw text as a JSON string
        body: Value,
    },

    /// The credential is missing, empty, or could not be obtained.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limited by the API (429).
    #[error("Rate limited; window reset at {:?}", .rate_limit.as_ref().map(|r| r.reset))]
    RateLimited {
        /// Rate-limit window reported alongside the 429, if complete
        rate_limit: Option<RateLimit>,
        /// Parsed error body, or the raw text as a JSON string
        body: Value,
    },

    /// Invalid input provided to a function
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status code carried by this error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } | Error::Unauthorized { status, .. } => Some(*status),
            Error::RateLimited { .. } => Some(429),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if the failure is potentially transient.
    ///
    /// The client itself never retries; this is a hint for callers that
    /// implement their own policy.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(e) => e.is_timeout() || e.is_connect(),
            Error::RateLimited { .. } => true,
            Error::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is an authentication-related error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Authentication(_) | Error::Unauthorized { .. })
    }

    /// Returns `true` if this error indicates a client-side issue.
    pub fn is_client_error(&self) -> bool {
        match self {
            Error::Api { status, .. } => (400..500).contains(status),
            Error::Unauthorized { .. } | Error::RateLimited { .. } => true,
            Error::InvalidInput(_) | Error::Config(_) | Error::UrlParse(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if this error indicates a server-side issue.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Api { status, .. } if *status >= 500)
    }

    pub(crate) fn parse(source: serde_json::Error, raw: &[u8]) -> Self {
        Error::Parse {
            source,
            raw: String::from_utf8_lossy(raw).into_owned(),
        }
    }

    /// Build an error from a non-2xx response.
    ///
    /// The body is decoded as JSON when possible and kept verbatim otherwise.
    pub(crate) fn from_api_response(
        status: u16,
        raw: &[u8],
        rate_limit: Option<RateLimit>,
    ) -> Self {
        let body = serde_json::from_slice::<Value>(raw)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(raw).into_owned()));

        let title = body.get("title").and_then(Value::as_str).map(String::from);
        let detail = body.get("detail").and_then(Value::as_str).map(String::from);

        match status {
            429 => Error::RateLimited { rate_limit, body },
            401 | 403 => {
                let message = detail
                    .or(title)
                    .or_else(|| {
                        body.get("errors")
                            .and_then(|e| e.get(0))
                            .and_then(|e| e.get("message"))
                            .and_then(Value::as_str)
                            .map(String::from)
                    })
                    .unwrap_or_else(|| "credential rejected".to_string());
                Error::Unauthorized {
                    status,
                    message,
                    body,
                }
            }
            _ => Error::Api {
                status,
                title,
                detail,
                body,
            },
        }
    }
}
