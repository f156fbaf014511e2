//! HTTP client and service layer for the Twitter API v2.
//!
//! This module provides the main entry point [`TwitterClient`] together with
//! the three pieces every call flows through:
//!
//! - [`RateLimitTracker`]: reads the `x-rate-limit-*` headers of each
//!   response and reports them to the caller's observer;
//! - [`ResponseEnvelope`]: the decoded `{data, includes, meta, errors}` body;
//! - [`Paginator`]: follows `meta.next_token` across pages.
//!
//! # Example
//!
//! ```no_run
//! use twitter_api_rs::{BearerToken, RequestOptions, TwitterClient};
//!
//! # async fn example() -> twitter_api_rs::Result<()> {
//! let client = TwitterClient::new(BearerToken::from_env()?)?;
//!
//! let me = client.users().find_my_user(None, RequestOptions::new()).await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod envelope;
mod http;
pub mod paginated;
mod rate_limit;

pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use envelope::{ErrorDetail, Meta, ResponseEnvelope};
pub use http::TwitterClient;
pub use paginated::{BoxFuture, Paginator};
pub use rate_limit::{RateLimit, RateLimitObserver, RateLimitTracker, RequestOptions};
pub(crate) use http::{ClientInner, NO_BODY, NO_QUERY};
