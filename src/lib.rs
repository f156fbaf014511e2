//! # twitter-api-rs
//!
//! An async Rust client for the Twitter API v2.
//!
//! Every call goes through the same small core:
//!
//! - **Rate limits**: the `x-rate-limit-*` headers of each response are
//!   parsed into a [`RateLimit`] and handed to an optional per-call observer
//! - **Envelopes**: bodies decode into [`ResponseEnvelope`], where `data` and
//!   `errors` may coexist (a partial success is not an error)
//! - **Pagination**: list endpoints return a [`Paginator`] that follows
//!   `meta.next_token` lazily
//! - **Streaming**: sampled and filtered streams decode CRLF-delimited JSON
//!   into a [`Stream`](futures_util::Stream) of items, skipping keep-alives
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use twitter_api_rs::{BearerToken, RequestOptions, TweetId, TwitterClient};
//!
//! #[tokio::main]
//! async fn main() -> twitter_api_rs::Result<()> {
//!     let client = TwitterClient::new(BearerToken::from_env()?)?;
//!
//!     let options = RequestOptions::new().on_rate_limit(|rl| {
//!         println!("{}/{} requests left", rl.remaining, rl.limit);
//!     });
//!     let envelope = client
//!         .tweets()
//!         .find_tweet_by_id(&TweetId::new("20"), None, options)
//!         .await?;
//!
//!     if let Some(tweet) = envelope.data {
//!         println!("{}", tweet.text);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Pagination
//!
//! ```rust,no_run
//! use futures_util::StreamExt;
//! use twitter_api_rs::{BearerToken, RequestOptions, TwitterClient, UserId};
//!
//! #[tokio::main]
//! async fn main() -> twitter_api_rs::Result<()> {
//!     let client = TwitterClient::new(BearerToken::from_env()?)?;
//!
//!     let mut followers = client
//!         .users()
//!         .followers(&UserId::new("2244994945"), None, RequestOptions::new())
//!         .await?
//!         .items();
//!
//!     while let Some(user) = followers.next().await {
//!         println!("@{}", user?.username);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! Transport failures, non-2xx statuses, rejected credentials, rate limiting
//! and undecodable bodies are distinct [`Error`] variants. The client never
//! retries; a 429 carries the window reset so callers can decide when to try
//! again.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod models;
#[cfg(feature = "streaming")]
pub mod streaming;

// Re-export primary types at crate root for convenience
pub use auth::{AuthProvider, BearerToken, OAuth2User};
pub use client::{
    ClientConfig, ErrorDetail, Meta, Paginator, RateLimit, RateLimitObserver, RateLimitTracker,
    RequestOptions, ResponseEnvelope, TwitterClient,
};
pub use error::{Error, Result};
pub use models::{TweetId, UserId};

#[cfg(feature = "streaming")]
pub use streaming::JsonLineStream;

/// Prelude module for convenient imports.
///
/// ```rust
/// use twitter_api_rs::prelude::*;
/// ```
pub mod prelude {
    pub use crate::auth::{AuthProvider, BearerToken, OAuth2User, OAuth2UserConfig, Scope};
    pub use crate::client::{
        ClientConfig, Paginator, RateLimit, RequestOptions, ResponseEnvelope, TwitterClient,
    };
    pub use crate::error::{Error, Result};
    pub use crate::models::{
        // Ids
        TweetId, UserId,
        // Payloads
        CreateTweetRequest, StreamRule, StreamedTweet, Tweet, User,
        // Queries
        FieldsQuery, FollowersQuery, SearchRecentQuery, StreamQuery, UserTimelineQuery,
    };
    #[cfg(feature = "streaming")]
    pub use crate::streaming::JsonLineStream;
}
