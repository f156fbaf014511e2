//! Tweets service: lookup, manage, search, timelines and streams.

use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;

use super::path_segment;
use crate::client::{
    ClientInner, Paginator, RateLimitTracker, RequestOptions, ResponseEnvelope, NO_BODY, NO_QUERY,
};
use crate::models::{
    AddOrDeleteRulesRequest, CreateTweetRequest, CreatedTweet, DeletedTweet, FieldsQuery,
    SearchRecentQuery, StreamRule, Tweet, TweetId, UserId, UserTimelineQuery,
};
use crate::{Error, Result};

#[cfg(feature = "streaming")]
use crate::models::{StreamQuery, StreamedTweet};
#[cfg(feature = "streaming")]
use crate::streaming::JsonLineStream;

/// Most ids a multi-tweet lookup accepts.
const MAX_LOOKUP_IDS: usize = 100;

/// Service for tweet operations.
///
/// # Example
///
/// ```no_run
/// use futures_util::StreamExt;
/// use twitter_api_rs::models::SearchRecentQuery;
/// use twitter_api_rs::RequestOptions;
///
/// # async fn example(client: twitter_api_rs::TwitterClient) -> twitter_api_rs::Result<()> {
/// let mut tweets = client
///     .tweets()
///     .search_recent(SearchRecentQuery::new("from:TwitterDev"), RequestOptions::new())
///     .await?
///     .items();
///
/// while let Some(tweet) = tweets.next().await {
///     println!("{}", tweet?.text);
/// }
/// # Ok(())
/// # }
/// ```
pub struct TweetsService {
    inner: Arc<ClientInner>,
}

impl TweetsService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// Look up a single tweet.
    pub async fn find_tweet_by_id(
        &self,
        id: &TweetId,
        fields: Option<FieldsQuery>,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope<Tweet>> {
        let id = path_segment(id.as_str(), "tweet id")?;
        self.inner
            .request(
                Method::GET,
                &format!("/2/tweets/{}", id),
                fields.as_ref(),
                NO_BODY,
                &RateLimitTracker::from(&options),
            )
            .await
    }

    /// Look up up to 100 tweets at once.
    ///
    /// Ids that cannot be found are reported in the envelope's `errors`
    /// while the others are returned in `data`.
    pub async fn find_tweets_by_id(
        &self,
        ids: &[TweetId],
        fields: Option<FieldsQuery>,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope<Vec<Tweet>>> {
        if ids.is_empty() || ids.len() > MAX_LOOKUP_IDS {
            return Err(Error::InvalidInput(format!(
                "expected 1 to {} tweet ids, got {}",
                MAX_LOOKUP_IDS,
                ids.len()
            )));
        }

        #[derive(Serialize)]
        struct Query {
            ids: String,
            #[serde(flatten)]
            fields: FieldsQuery,
        }
        let query = Query {
            ids: ids.iter().map(TweetId::as_str).collect::<Vec<_>>().join(","),
            fields: fields.unwrap_or_default(),
        };

        self.inner
            .request(
                Method::GET,
                "/2/tweets",
                Some(&query),
                NO_BODY,
                &RateLimitTracker::from(&options),
            )
            .await
    }

    /// Post a tweet on behalf of the authenticated user.
    pub async fn create_tweet(
        &self,
        request: CreateTweetRequest,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope<CreatedTweet>> {
        request.validate()?;
        self.inner
            .request(
                Method::POST,
                "/2/tweets",
                NO_QUERY,
                Some(&request),
                &RateLimitTracker::from(&options),
            )
            .await
    }

    /// Delete a tweet of the authenticated user.
    pub async fn delete_tweet(
        &self,
        id: &TweetId,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope<DeletedTweet>> {
        let id = path_segment(id.as_str(), "tweet id")?;
        self.inner
            .request(
                Method::DELETE,
                &format!("/2/tweets/{}", id),
                NO_QUERY,
                NO_BODY,
                &RateLimitTracker::from(&options),
            )
            .await
    }

    /// Search tweets from the last seven days.
    ///
    /// The first page is fetched before this returns.
    pub async fn search_recent(
        &self,
        query: SearchRecentQuery,
        options: RequestOptions,
    ) -> Result<Paginator<Vec<Tweet>>> {
        if query.query.trim().is_empty() {
            return Err(Error::InvalidInput("search query is empty".to_string()));
        }
        self.inner
            .paginate("/2/tweets/search/recent".to_string(), query, options)
            .await
    }

    /// Tweets authored by a user, newest first.
    ///
    /// The first page is fetched before this returns.
    pub async fn user_timeline(
        &self,
        user_id: &UserId,
        query: Option<UserTimelineQuery>,
        options: RequestOptions,
    ) -> Result<Paginator<Vec<Tweet>>> {
        let user_id = path_segment(user_id.as_str(), "user id")?;
        self.inner
            .paginate(
                format!("/2/users/{}/tweets", user_id),
                query.unwrap_or_default(),
                options,
            )
            .await
    }

    /// Connect to the 1% sampled stream.
    #[cfg(feature = "streaming")]
    pub async fn sample_stream(
        &self,
        query: Option<StreamQuery>,
        options: RequestOptions,
    ) -> Result<JsonLineStream<StreamedTweet>> {
        self.inner
            .stream("/2/tweets/sample/stream", query.as_ref(), &RateLimitTracker::from(&options))
            .await
    }

    /// Connect to the filtered stream, delivering tweets that match the
    /// current rules.
    #[cfg(feature = "streaming")]
    pub async fn search_stream(
        &self,
        query: Option<StreamQuery>,
        options: RequestOptions,
    ) -> Result<JsonLineStream<StreamedTweet>> {
        self.inner
            .stream("/2/tweets/search/stream", query.as_ref(), &RateLimitTracker::from(&options))
            .await
    }

    /// List the filtered-stream rules.
    pub async fn get_stream_rules(
        &self,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope<Vec<StreamRule>>> {
        self.inner
            .request(
                Method::GET,
                "/2/tweets/search/stream/rules",
                NO_QUERY,
                NO_BODY,
                &RateLimitTracker::from(&options),
            )
            .await
    }

    /// Add or delete filtered-stream rules.
    ///
    /// With `dry_run`, the rules are validated but not applied.
    pub async fn add_or_delete_rules(
        &self,
        request: AddOrDeleteRulesRequest,
        dry_run: bool,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope<Vec<StreamRule>>> {
        request.validate()?;

        #[derive(Serialize)]
        struct Query {
            dry_run: bool,
        }
        let query = Query { dry_run };

        self.inner
            .request(
                Method::POST,
                "/2/tweets/search/stream/rules",
                dry_run.then_some(&query),
                Some(&request),
                &RateLimitTracker::from(&options),
            )
            .await
    }
}
