//! Rate-limit bookkeeping.
//!
//! Every v2 response carries three headers describing the caller's quota
//! for the endpoint:
//!
//! | header                   | meaning                              |
//! |--------------------------|--------------------------------------|
//! | `x-rate-limit-limit`     | requests allowed per window          |
//! | `x-rate-limit-remaining` | requests left in the current window  |
//! | `x-rate-limit-reset`     | window end, in epoch **seconds**     |
//!
//! [`RateLimit::from_headers`] turns them into a [`RateLimit`] with the reset
//! normalized to epoch milliseconds, and [`RequestOptions`] carries the
//! caller's observer that a [`RateLimitTracker`] invokes once per response.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};

const LIMIT_HEADER: &str = "x-rate-limit-limit";
const REMAINING_HEADER: &str = "x-rate-limit-remaining";
const RESET_HEADER: &str = "x-rate-limit-reset";

/// Quota window reported by a single response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RateLimit {
    /// Requests allowed per window
    pub limit: u64,
    /// Requests left in the current window
    pub remaining: u64,
    /// Window end, in epoch milliseconds
    pub reset: i64,
}

impl RateLimit {
    /// Extract the rate-limit window from response headers.
    ///
    /// Returns `None` unless all three headers are present and hold decimal
    /// integers. Header names are matched case-insensitively.
    ///
    /// ```
    /// use reqwest::header::HeaderMap;
    /// use twitter_api_rs::RateLimit;
    ///
    /// let mut headers = HeaderMap::new();
    /// headers.insert("x-rate-limit-limit", "450".parse().unwrap());
    /// headers.insert("x-rate-limit-remaining", "449".parse().unwrap());
    /// headers.insert("x-rate-limit-reset", "1700000000".parse().unwrap());
    ///
    /// let rl = RateLimit::from_headers(&headers).unwrap();
    /// assert_eq!(rl.reset, 1_700_000_000_000);
    /// ```
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let limit = headers.get(LIMIT_HEADER)?;
        let remaining = headers.get(REMAINING_HEADER)?;
        let reset = headers.get(RESET_HEADER)?;

        let parsed = (|| {
            let limit = limit.to_str().ok()?.trim().parse::<u64>().ok()?;
            let remaining = remaining.to_str().ok()?.trim().parse::<u64>().ok()?;
            let reset_secs = reset.to_str().ok()?.trim().parse::<i64>().ok()?;
            Some(RateLimit {
                limit,
                remaining,
                reset: reset_secs.checked_mul(1000)?,
            })
        })();

        if parsed.is_none() {
            tracing::warn!(
                ?limit,
                ?remaining,
                ?reset,
                "ignoring malformed rate-limit headers"
            );
        }
        parsed
    }

    /// The window end as a timestamp.
    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.reset)
    }

    /// Returns `true` once the window has no requests left.
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

/// Callback receiving the rate-limit window of each response.
pub type RateLimitObserver = Arc<dyn Fn(&RateLimit) + Send + Sync>;

/// Per-call options accepted by every endpoint method.
///
/// # Example
///
/// ```
/// use twitter_api_rs::RequestOptions;
///
/// let options = RequestOptions::new().on_rate_limit(|rl| {
///     println!("{} of {} requests left", rl.remaining, rl.limit);
/// });
/// ```
#[derive(Clone, Default)]
pub struct RequestOptions {
    /// Observer invoked once per response that carries rate-limit headers
    pub rate_limit: Option<RateLimitObserver>,
}

impl RequestOptions {
    /// Options with no observer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a rate-limit observer.
    pub fn on_rate_limit<F>(mut self, observer: F) -> Self
    where
        F: Fn(&RateLimit) + Send + Sync + 'static,
    {
        self.rate_limit = Some(Arc::new(observer));
        self
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("rate_limit", &self.rate_limit.as_ref().map(|_| "<observer>"))
            .finish()
    }
}

/// Applies [`RateLimit::from_headers`] to each response and forwards the
/// result to the caller's observer.
///
/// The tracker is cheap to clone; a paginator hands the same tracker to every
/// page fetch so one observer sees the whole sequence.
#[derive(Clone, Default)]
pub struct RateLimitTracker {
    observer: Option<RateLimitObserver>,
}

impl RateLimitTracker {
    /// Create a tracker around an optional observer.
    pub fn new(observer: Option<RateLimitObserver>) -> Self {
        Self { observer }
    }

    /// Parse the headers of one response, invoking the observer synchronously
    /// when all three rate-limit headers are present.
    pub fn observe(&self, headers: &HeaderMap) -> Option<RateLimit> {
        let rate_limit = RateLimit::from_headers(headers);
        if let (Some(observer), Some(rl)) = (&self.observer, &rate_limit) {
            observer(rl);
        }
        rate_limit
    }
}

impl fmt::Debug for RateLimitTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimitTracker")
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl From<&RequestOptions> for RateLimitTracker {
    fn from(options: &RequestOptions) -> Self {
        Self::new(options.rate_limit.clone())
    }
}
