//! Tweet, stream rule and tweet-creation models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::primitives::{TweetId, UserId};
use crate::client::ErrorDetail;
use crate::{Error, Result};

/// A tweet as returned by v2 endpoints.
///
/// Only `id` and `text` are always present; everything else depends on the
/// `tweet.fields` requested. Fields this struct does not model are kept in
/// [`Tweet::extra`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tweet {
    /// Unique tweet id
    pub id: TweetId,
    /// Tweet body
    pub text: String,
    /// Author of the tweet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<UserId>,
    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Id of the tweet that started the conversation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<TweetId>,
    /// Author of the tweet this one replies to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to_user_id: Option<UserId>,
    /// BCP47 language tag detected by Twitter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// Ids of every revision of this tweet, oldest first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edit_history_tweet_ids: Vec<TweetId>,
    /// Tweets this one quotes, replies to, or retweets
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub referenced_tweets: Vec<ReferencedTweet>,
    /// Engagement counters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_metrics: Option<TweetPublicMetrics>,
    /// Whether the content may be sensitive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub possibly_sensitive: Option<bool>,
    /// Any other fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A tweet this tweet quotes, replies to, or retweets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferencedTweet {
    /// `quoted`, `replied_to` or `retweeted`
    #[serde(rename = "type")]
    pub kind: String,
    /// Referenced tweet id
    pub id: TweetId,
}

/// Engagement counters of a tweet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct TweetPublicMetrics {
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub reply_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub quote_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impression_count: Option<u64>,
}

/// One object of a filtered or sampled stream.
///
/// Stream lines share the envelope layout, plus the rules a filtered-stream
/// tweet matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamedTweet {
    /// The tweet, absent for operational messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Tweet>,
    /// Objects referenced by `expansions`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub includes: Option<Value>,
    /// Filtered-stream rules that selected this tweet
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matching_rules: Vec<MatchingRule>,
    /// Operational messages, e.g. a disconnect notice
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ErrorDetail>>,
}

/// Reference to the rule a streamed tweet matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingRule {
    /// Rule id
    pub id: String,
    /// Rule tag, if one was set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// A filtered-stream rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRule {
    /// Server-assigned id; absent in requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Rule expression, e.g. `cat has:images`
    pub value: String,
    /// Label echoed back on matches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl StreamRule {
    /// A new rule to submit.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            id: None,
            value: value.into(),
            tag: None,
        }
    }

    /// Attach a tag, echoed back in [`MatchingRule::tag`].
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// Body of a filtered-stream rule update.
///
/// A single request either adds or deletes rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AddOrDeleteRulesRequest {
    /// Rules to add
    #[serde(rename = "add")]
    Add(Vec<StreamRule>),
    /// Rules to delete
    #[serde(rename = "delete")]
    Delete(DeleteRules),
}

impl AddOrDeleteRulesRequest {
    /// Add the given rules.
    pub fn add(rules: impl IntoIterator<Item = StreamRule>) -> Self {
        Self::Add(rules.into_iter().collect())
    }

    /// Delete rules by id.
    pub fn delete_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Delete(DeleteRules {
            ids: ids.into_iter().map(Into::into).collect(),
            values: Vec::new(),
        })
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let empty = match self {
            Self::Add(rules) => rules.is_empty(),
            Self::Delete(delete) => delete.ids.is_empty() && delete.values.is_empty(),
        };
        if empty {
            return Err(Error::InvalidInput("rule update lists no rules".to_string()));
        }
        Ok(())
    }
}

/// Rules to delete, by id or by value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteRules {
    /// Rule ids
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<String>,
    /// Rule expressions
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

/// Body of `POST /2/tweets`.
///
/// # Example
///
/// ```
/// use twitter_api_rs::models::CreateTweetRequest;
/// use twitter_api_rs::TweetId;
///
/// let reply = CreateTweetRequest::new("Hello back!")
///     .in_reply_to(TweetId::new("1445880548472328192"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateTweetRequest {
    /// Tweet body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Reply target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<Reply>,
    /// Tweet to quote
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_tweet_id: Option<TweetId>,
    /// Poll to attach
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll: Option<Poll>,
    /// `everyone`, `mentionedUsers` or `following`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_settings: Option<String>,
    /// Restrict to super followers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub for_super_followers_only: Option<bool>,
}

impl CreateTweetRequest {
    /// A plain text tweet.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Post as a reply.
    pub fn in_reply_to(mut self, tweet_id: TweetId) -> Self {
        self.reply = Some(Reply {
            in_reply_to_tweet_id: tweet_id,
            exclude_reply_user_ids: Vec::new(),
        });
        self
    }

    /// Quote another tweet.
    pub fn quote(mut self, tweet_id: TweetId) -> Self {
        self.quote_tweet_id = Some(tweet_id);
        self
    }

    /// Attach a poll.
    pub fn with_poll<I, S>(mut self, options: I, duration_minutes: u32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.poll = Some(Poll {
            options: options.into_iter().map(Into::into).collect(),
            duration_minutes,
        });
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let has_text = self.text.as_deref().is_some_and(|t| !t.trim().is_empty());
        if !has_text && self.quote_tweet_id.is_none() {
            return Err(Error::InvalidInput(
                "tweet needs text or a quoted tweet".to_string(),
            ));
        }
        if let Some(poll) = &self.poll {
            if !(2..=4).contains(&poll.options.len()) {
                return Err(Error::InvalidInput(format!(
                    "poll needs 2 to 4 options, got {}",
                    poll.options.len()
                )));
            }
        }
        Ok(())
    }
}

/// Reply target of a new tweet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    /// Tweet to reply to
    pub in_reply_to_tweet_id: TweetId,
    /// Users to leave out of the auto-populated mentions
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude_reply_user_ids: Vec<UserId>,
}

/// Poll attached to a new tweet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Poll {
    /// Choices, 2 to 4
    pub options: Vec<String>,
    /// How long the poll stays open
    pub duration_minutes: u32,
}

/// `data` of a successful `POST /2/tweets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct CreatedTweet {
    pub id: TweetId,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edit_history_tweet_ids: Vec<TweetId>,
}

/// `data` of a successful `DELETE /2/tweets/:id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedTweet {
    /// Whether the tweet was deleted
    pub deleted: bool,
}
