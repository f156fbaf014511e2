//! Primitive types and newtypes for type-safe API interactions.
//!
//! Twitter ids are 64-bit integers, but the v2 API transmits them as
//! strings. These wrappers keep them as strings and prevent mixing a tweet
//! id with a user id at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A strongly-typed tweet id.
///
/// # Example
///
/// ```
/// use twitter_api_rs::TweetId;
///
/// let id = TweetId::new("20");
/// println!("Tweet: {}", id);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TweetId(String);

impl TweetId {
    /// Create a new tweet id from a string.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the tweet id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TweetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for TweetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for TweetId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TweetId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<u64> for TweetId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// A strongly-typed user id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create a new user id.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the user id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}
