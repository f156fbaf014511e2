//! Query-string parameters for v2 endpoints.
//!
//! Field selections and other list parameters are sent as comma-separated
//! values, e.g. `tweet.fields=created_at,author_id`.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use super::primitives::TweetId;

fn comma_separated<S: Serializer>(values: &[String], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&values.join(","))
}

fn owned<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(Into::into).collect()
}

/// Which optional fields and expansions to include in a response.
///
/// # Example
///
/// ```
/// use twitter_api_rs::models::FieldsQuery;
///
/// let fields = FieldsQuery::new()
///     .tweet_fields(["created_at", "author_id"])
///     .expansions(["author_id"])
///     .user_fields(["username"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldsQuery {
    /// `tweet.fields`
    #[serde(
        rename = "tweet.fields",
        serialize_with = "comma_separated",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tweet_fields: Vec<String>,
    /// `user.fields`
    #[serde(
        rename = "user.fields",
        serialize_with = "comma_separated",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub user_fields: Vec<String>,
    /// `media.fields`
    #[serde(
        rename = "media.fields",
        serialize_with = "comma_separated",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub media_fields: Vec<String>,
    /// `poll.fields`
    #[serde(
        rename = "poll.fields",
        serialize_with = "comma_separated",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub poll_fields: Vec<String>,
    /// `place.fields`
    #[serde(
        rename = "place.fields",
        serialize_with = "comma_separated",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub place_fields: Vec<String>,
    /// `expansions`
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "Vec::is_empty")]
    pub expansions: Vec<String>,
}

impl FieldsQuery {
    /// Request no optional fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `tweet.fields`.
    pub fn tweet_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tweet_fields = owned(fields);
        self
    }

    /// Set `user.fields`.
    pub fn user_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.user_fields = owned(fields);
        self
    }

    /// Set `media.fields`.
    pub fn media_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.media_fields = owned(fields);
        self
    }

    /// Set `poll.fields`.
    pub fn poll_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.poll_fields = owned(fields);
        self
    }

    /// Set `place.fields`.
    pub fn place_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.place_fields = owned(fields);
        self
    }

    /// Set `expansions`.
    pub fn expansions<I, S>(mut self, expansions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expansions = owned(expansions);
        self
    }
}

/// Parameters of `GET /2/tweets/search/recent`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchRecentQuery {
    /// Search expression, e.g. `from:TwitterDev -is:retweet`
    pub query: String,
    /// Results per page, 10 to 100
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    /// Oldest creation time to match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    /// Newest creation time to match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Only tweets newer than this id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since_id: Option<TweetId>,
    /// Only tweets older than this id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until_id: Option<TweetId>,
    /// `recency` or `relevancy`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<String>,
    /// Field selection
    #[serde(flatten)]
    pub fields: FieldsQuery,
}

impl SearchRecentQuery {
    /// Search for `query` with default parameters.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Set the page size.
    pub fn max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Set the field selection.
    pub fn fields(mut self, fields: FieldsQuery) -> Self {
        self.fields = fields;
        self
    }
}

/// Parameters of `GET /2/users/:id/tweets`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserTimelineQuery {
    /// Results per page, 5 to 100
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    /// Oldest creation time to return
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    /// Newest creation time to return
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Only tweets newer than this id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since_id: Option<TweetId>,
    /// Only tweets older than this id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until_id: Option<TweetId>,
    /// Tweet kinds to leave out: `retweets`, `replies`
    #[serde(serialize_with = "comma_separated", skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    /// Field selection
    #[serde(flatten)]
    pub fields: FieldsQuery,
}

/// Parameters of the follower and following lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FollowersQuery {
    /// Results per page, 1 to 1000
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    /// Field selection
    #[serde(flatten)]
    pub fields: FieldsQuery,
}

/// Parameters of the sampled and filtered streams.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreamQuery {
    /// Minutes of missed tweets to replay after a reconnect (1 to 5)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backfill_minutes: Option<u32>,
    /// Field selection
    #[serde(flatten)]
    pub fields: FieldsQuery,
}
