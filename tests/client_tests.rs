//! Integration tests for twitter-api-rs against a local mock server.
//!
//! Every test starts its own `httpmock::MockServer` and points the client at
//! it through `ClientConfig::with_base_url`, so no credentials or network
//! access are needed.
//!
//! Run with: cargo test --test client_tests

use std::sync::{Arc, Mutex, Once};

use chrono::Utc;
use futures_util::StreamExt;
use httpmock::Method::{DELETE, GET, POST};
use httpmock::MockServer;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use twitter_api_rs::auth::{CodeChallenge, OAuth2Token, OAuth2User, OAuth2UserConfig, Scope};
use twitter_api_rs::models::{CreateTweetRequest, FollowersQuery, SearchRecentQuery};
use twitter_api_rs::prelude::*;

static INIT: Once = Once::new();

/// Initialize logging for tests
fn init_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

fn config(server: &MockServer) -> ClientConfig {
    ClientConfig::default()
        .with_base_url(&server.base_url())
        .expect("mock server URL is a valid base")
}

fn client(server: &MockServer, token: &str) -> TwitterClient {
    init_logging();
    TwitterClient::with_config(BearerToken::new(token), config(server)).expect("client builds")
}

/// Options whose observer records every window it is shown.
fn recording_options() -> (RequestOptions, Arc<Mutex<Vec<RateLimit>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let options = RequestOptions::new().on_rate_limit(move |rl| sink.lock().unwrap().push(*rl));
    (options, seen)
}

fn user(id: &str) -> Value {
    json!({"id": id, "name": format!("User {id}"), "username": format!("user_{id}")})
}

// =============================================================================
// REST requests
// =============================================================================

#[tokio::test]
async fn test_rest_request_reports_rate_limit() {
    let server = MockServer::start_async().await;
    let reset_secs = Utc::now().timestamp() + 15 * 60;
    let user_agent = format!("twitter-api-rs/{} (Rust)", env!("CARGO_PKG_VERSION"));

    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/2/tweets/20")
                .header("authorization", "Bearer test-token")
                .header("user-agent", user_agent.as_str());
            then.status(200)
                .header("x-rate-limit-limit", "450")
                .header("x-rate-limit-remaining", "449")
                .header("x-rate-limit-reset", reset_secs.to_string())
                .json_body(json!({"data": {"id": "20", "text": "just setting up my twttr"}}));
        })
        .await;

    let (options, seen) = recording_options();
    let envelope = client(&server, "test-token")
        .tweets()
        .find_tweet_by_id(&TweetId::new("20"), None, options)
        .await
        .unwrap();

    mock.assert_async().await;
    let tweet = envelope.data.unwrap();
    assert_eq!(tweet.id, TweetId::new("20"));
    assert_eq!(tweet.text, "just setting up my twttr");
    assert!(envelope.errors.is_none());

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].limit, 450);
    assert_eq!(seen[0].remaining, 449);
    assert_eq!(seen[0].reset, reset_secs * 1000);
}

#[tokio::test]
async fn test_missing_rate_limit_headers_skip_observer() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/2/users/me");
            then.status(200)
                .header("x-rate-limit-limit", "75")
                .json_body(json!({"data": user("1")}));
        })
        .await;

    let (options, seen) = recording_options();
    let envelope = client(&server, "t")
        .users()
        .find_my_user(None, options)
        .await
        .unwrap();

    assert_eq!(envelope.data.unwrap().username, "user_1");
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_partial_success_is_not_an_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/2/tweets")
                .query_param("ids", "20,1")
                .query_param("tweet.fields", "created_at,lang");
            then.status(200).json_body(json!({
                "data": [{"id": "20", "text": "just setting up my twttr", "lang": "en"}],
                "errors": [{
                    "value": "1",
                    "detail": "Could not find tweet with ids: [1].",
                    "title": "Not Found Error",
                    "resource_type": "tweet",
                    "parameter": "ids",
                    "type": "https://api.twitter.com/2/problems/resource-not-found"
                }]
            }));
        })
        .await;

    let fields = twitter_api_rs::models::FieldsQuery::new().tweet_fields(["created_at", "lang"]);
    let envelope = client(&server, "t")
        .tweets()
        .find_tweets_by_id(&[TweetId::new("20"), TweetId::new("1")], Some(fields), RequestOptions::new())
        .await
        .unwrap();

    assert!(envelope.is_partial());
    assert_eq!(envelope.data.as_ref().unwrap()[0].lang.as_deref(), Some("en"));
    assert_eq!(envelope.errors.as_ref().unwrap()[0].value.as_deref(), Some("1"));
}

#[tokio::test]
async fn test_create_and_delete_tweet() {
    let server = MockServer::start_async().await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/2/tweets")
                .header("content-type", "application/json")
                .json_body(json!({"text": "hello world"}));
            then.status(201).json_body(json!({
                "data": {"id": "1445880548472328192", "text": "hello world", "edit_history_tweet_ids": ["1445880548472328192"]}
            }));
        })
        .await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/2/tweets/1445880548472328192");
            then.status(200).json_body(json!({"data": {"deleted": true}}));
        })
        .await;

    let tweets = client(&server, "user-token").tweets();
    let created = tweets
        .create_tweet(CreateTweetRequest::new("hello world"), RequestOptions::new())
        .await
        .unwrap()
        .into_data()
        .unwrap();
    let deleted = tweets
        .delete_tweet(&created.id, RequestOptions::new())
        .await
        .unwrap()
        .into_data()
        .unwrap();

    create.assert_async().await;
    delete.assert_async().await;
    assert!(deleted.deleted);
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn test_unauthorized_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/2/users/me");
            then.status(401).json_body(json!({
                "title": "Unauthorized",
                "type": "about:blank",
                "status": 401,
                "detail": "Unauthorized"
            }));
        })
        .await;

    let err = client(&server, "revoked")
        .users()
        .find_my_user(None, RequestOptions::new())
        .await
        .unwrap_err();

    assert!(err.is_auth_error());
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn test_server_error_keeps_raw_body() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/2/users/2244994945");
            then.status(500).body("upstream exploded");
        })
        .await;

    let err = client(&server, "t")
        .users()
        .find_user_by_id(&UserId::new("2244994945"), None, RequestOptions::new())
        .await
        .unwrap_err();

    match err {
        Error::Api { status, body, .. } => {
            assert_eq!(status, 500);
            assert_eq!(body, Value::String("upstream exploded".into()));
        }
        other => panic!("Expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limited_observes_before_failing() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/2/users/by/username/TwitterDev");
            then.status(429)
                .header("x-rate-limit-limit", "300")
                .header("x-rate-limit-remaining", "0")
                .header("x-rate-limit-reset", "1700000900")
                .json_body(json!({"title": "Too Many Requests", "detail": "Too Many Requests", "status": 429}));
        })
        .await;

    let (options, seen) = recording_options();
    let err = client(&server, "t")
        .users()
        .find_user_by_username("@TwitterDev", None, options)
        .await
        .unwrap_err();

    match err {
        Error::RateLimited { rate_limit, .. } => {
            assert_eq!(rate_limit.unwrap().reset, 1_700_000_900_000);
        }
        other => panic!("Expected RateLimited, got {other:?}"),
    }
    assert_eq!(seen.lock().unwrap().len(), 1);
    assert!(seen.lock().unwrap()[0].is_exhausted());
}

#[tokio::test]
async fn test_empty_token_sends_nothing() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/2/users/me");
            then.status(200).json_body(json!({"data": user("1")}));
        })
        .await;

    let err = client(&server, "")
        .users()
        .find_my_user(None, RequestOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Authentication(_)));
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn test_invalid_json_on_success_is_parse_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/2/tweets/search/stream/rules");
            then.status(200).body("<html>maintenance</html>");
        })
        .await;

    let err = client(&server, "t")
        .tweets()
        .get_stream_rules(RequestOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Parse { ref raw, .. } if raw.contains("maintenance")));
}

// =============================================================================
// Pagination
// =============================================================================

#[tokio::test]
async fn test_followers_follow_next_token() {
    let server = MockServer::start_async().await;
    let first = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/2/users/2244994945/followers")
                .query_param("max_results", "2");
            then.status(200)
                .header("x-rate-limit-limit", "15")
                .header("x-rate-limit-remaining", "14")
                .header("x-rate-limit-reset", "1700000900")
                .json_body(json!({
                    "data": [user("1"), user("2")],
                    "meta": {"result_count": 2, "next_token": "T"}
                }));
        })
        .await;

    let (options, seen) = recording_options();
    let query = FollowersQuery {
        max_results: Some(2),
        ..Default::default()
    };
    let mut pages = client(&server, "t")
        .users()
        .followers(&UserId::new("2244994945"), Some(query), options)
        .await
        .unwrap();

    // Only the first page is fetched until iteration begins.
    assert_eq!(first.hits_async().await, 1);
    assert_eq!(pages.first().unwrap().next_token(), Some("T"));
    first.delete_async().await;

    let second = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/2/users/2244994945/followers")
                .query_param("max_results", "2")
                .query_param("pagination_token", "T");
            then.status(200)
                .header("x-rate-limit-limit", "15")
                .header("x-rate-limit-remaining", "13")
                .header("x-rate-limit-reset", "1700000900")
                .json_body(json!({"data": [user("3")], "meta": {"result_count": 1}}));
        })
        .await;

    let page1 = pages.next().await.unwrap().unwrap();
    assert_eq!(page1.data.unwrap().len(), 2);
    assert_eq!(second.hits_async().await, 0);

    let page2 = pages.next().await.unwrap().unwrap();
    assert_eq!(page2.data.unwrap()[0].id, UserId::new("3"));
    assert!(pages.next().await.is_none());
    assert!(!pages.has_more());

    second.assert_async().await;
    let remaining: Vec<u64> = seen.lock().unwrap().iter().map(|rl| rl.remaining).collect();
    assert_eq!(remaining, vec![14, 13]);
}

#[tokio::test]
async fn test_search_items_stop_after_failed_page() {
    let server = MockServer::start_async().await;
    let first = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/2/tweets/search/recent")
                .query_param("query", "from:TwitterDev");
            then.status(200).json_body(json!({
                "data": [{"id": "1", "text": "a"}, {"id": "2", "text": "b"}],
                "meta": {"next_token": "N2"}
            }));
        })
        .await;

    let paginator = client(&server, "t")
        .tweets()
        .search_recent(SearchRecentQuery::new("from:TwitterDev"), RequestOptions::new())
        .await
        .unwrap();
    first.delete_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/2/tweets/search/recent")
                .query_param("pagination_token", "N2");
            then.status(503).body("Service Unavailable");
        })
        .await;

    let results: Vec<_> = paginator.items().collect().await;
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().text, "a");
    assert_eq!(results[1].as_ref().unwrap().text, "b");
    assert_eq!(results[2].as_ref().unwrap_err().status(), Some(503));
}

#[tokio::test]
async fn test_first_page_failure_surfaces_from_call() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/2/users/42/following");
            then.status(404).json_body(json!({"title": "Not Found Error"}));
        })
        .await;

    let err = client(&server, "t")
        .users()
        .following(&UserId::new("42"), None, RequestOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
}

// =============================================================================
// Streaming
// =============================================================================

#[tokio::test]
async fn test_sample_stream_skips_keep_alive() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/2/tweets/sample/stream")
                .header("authorization", "Bearer t");
            then.status(200)
                .body("{\"data\":{\"id\":\"20\",\"text\":\"just setting up my twttr\"}}\r\n\r\n");
        })
        .await;

    let mut stream = client(&server, "t")
        .tweets()
        .sample_stream(None, RequestOptions::new())
        .await
        .unwrap();

    let item = stream.next().await.unwrap().unwrap();
    assert_eq!(item.data.unwrap().text, "just setting up my twttr");
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_stream_connect_reports_rate_limit() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/2/tweets/sample/stream");
            then.status(200)
                .header("x-rate-limit-limit", "50")
                .header("x-rate-limit-remaining", "49")
                .header("x-rate-limit-reset", "1700000900")
                .body("{\"data\":{\"id\":\"20\",\"text\":\"hello\"}}\r\n");
        })
        .await;

    let (options, seen) = recording_options();
    let items: Vec<_> = client(&server, "t")
        .tweets()
        .sample_stream(None, options)
        .await
        .unwrap()
        .collect()
        .await;

    mock.assert_async().await;
    assert_eq!(items.len(), 1);
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].limit, 50);
    assert_eq!(seen[0].remaining, 49);
    assert_eq!(seen[0].reset, 1_700_000_900_000);
}

#[tokio::test]
async fn test_search_stream_matching_rules() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/2/tweets/search/stream")
                .query_param("tweet.fields", "author_id");
            then.status(200).body(concat!(
                "{\"data\":{\"id\":\"1\",\"text\":\"cat\",\"author_id\":\"9\"},\"matching_rules\":[{\"id\":\"r1\",\"tag\":\"cats\"}]}\r\n",
                "\r\n",
                "{\"data\":{\"id\":\"2\",\"text\":\"another cat\"},\"matching_rules\":[{\"id\":\"r1\",\"tag\":\"cats\"}]}\r\n",
            ));
        })
        .await;

    let query = StreamQuery {
        fields: FieldsQuery::new().tweet_fields(["author_id"]),
        ..Default::default()
    };
    let items: Vec<_> = client(&server, "t")
        .tweets()
        .search_stream(Some(query), RequestOptions::new())
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(items.len(), 2);
    let first = items[0].as_ref().unwrap();
    assert_eq!(first.matching_rules[0].tag.as_deref(), Some("cats"));
    assert_eq!(first.data.as_ref().unwrap().author_id, Some(UserId::new("9")));
}

#[tokio::test]
async fn test_stream_connect_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/2/tweets/sample/stream");
            then.status(429)
                .header("x-rate-limit-limit", "50")
                .header("x-rate-limit-remaining", "0")
                .header("x-rate-limit-reset", "1700000900")
                .json_body(json!({"title": "ConnectionException", "detail": "This stream is currently at the maximum allowed connection limit."}));
        })
        .await;

    let (options, seen) = recording_options();
    let err = client(&server, "t")
        .tweets()
        .sample_stream(None, options)
        .await
        .unwrap_err();
    assert_eq!(seen.lock().unwrap().len(), 1);
    match err {
        Error::RateLimited { rate_limit, body } => {
            assert_eq!(rate_limit.unwrap().remaining, 0);
            assert_eq!(body["title"], "ConnectionException");
        }
        other => panic!("Expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn test_add_stream_rules_dry_run() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/2/tweets/search/stream/rules")
                .query_param("dry_run", "true")
                .json_body(json!({"add": [{"value": "cat has:images", "tag": "cats"}]}));
            then.status(200).json_body(json!({
                "data": [{"id": "1", "value": "cat has:images", "tag": "cats"}],
                "meta": {"sent": "2022-01-01T00:00:00.000Z", "summary": {"created": 1, "not_created": 0}}
            }));
        })
        .await;

    let request = twitter_api_rs::models::AddOrDeleteRulesRequest::add([
        StreamRule::new("cat has:images").with_tag("cats"),
    ]);
    let envelope = client(&server, "t")
        .tweets()
        .add_or_delete_rules(request, true, RequestOptions::new())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(envelope.data.unwrap()[0].id.as_deref(), Some("1"));
    assert!(envelope.meta.unwrap().extra.contains_key("summary"));
}

// =============================================================================
// OAuth2 user context
// =============================================================================

fn oauth_config(server: &MockServer) -> OAuth2UserConfig {
    OAuth2UserConfig::new(
        "client-id",
        "https://example.com/callback",
        [Scope::TweetRead, Scope::UsersRead, Scope::OfflineAccess],
    )
    .with_api_base_url(server.base_url())
}

#[tokio::test]
async fn test_oauth2_code_exchange_then_request() {
    init_logging();
    let server = MockServer::start_async().await;
    let token = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/2/oauth2/token")
                .header(
                    "user-agent",
                    format!("twitter-api-rs/{} (Rust)", env!("CARGO_PKG_VERSION")),
                )
                .x_www_form_urlencoded_tuple("grant_type", "authorization_code")
                .x_www_form_urlencoded_tuple("code", "auth-code")
                .x_www_form_urlencoded_tuple("client_id", "client-id")
                .x_www_form_urlencoded_tuple("redirect_uri", "https://example.com/callback");
            then.status(200).json_body(json!({
                "token_type": "bearer",
                "expires_in": 7200,
                "access_token": "user-access",
                "refresh_token": "user-refresh",
                "scope": "tweet.read users.read offline.access"
            }));
        })
        .await;
    let me = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/2/users/me")
                .header("authorization", "Bearer user-access");
            then.status(200).json_body(json!({"data": user("7")}));
        })
        .await;

    let auth = OAuth2User::new(oauth_config(&server)).unwrap();
    auth.generate_auth_url("state", CodeChallenge::S256).await.unwrap();
    let exported = auth.request_access_token("auth-code").await.unwrap();
    assert_eq!(exported.refresh_token.as_deref(), Some("user-refresh"));

    let client = TwitterClient::with_config(auth, config(&server)).unwrap();
    let envelope = client.users().find_my_user(None, RequestOptions::new()).await.unwrap();

    token.assert_async().await;
    me.assert_async().await;
    assert_eq!(envelope.data.unwrap().id, UserId::new("7"));
}

#[tokio::test]
async fn test_oauth2_refreshes_expiring_token() {
    init_logging();
    let server = MockServer::start_async().await;
    let refresh = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/2/oauth2/token")
                .x_www_form_urlencoded_tuple("grant_type", "refresh_token")
                .x_www_form_urlencoded_tuple("refresh_token", "old-refresh");
            then.status(200).json_body(json!({
                "token_type": "bearer",
                "expires_in": 7200,
                "access_token": "fresh-access",
                "refresh_token": "new-refresh"
            }));
        })
        .await;
    let me = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/2/users/me")
                .header("authorization", "Bearer fresh-access");
            then.status(200).json_body(json!({"data": user("7")}));
        })
        .await;

    let auth = OAuth2User::with_token(
        oauth_config(&server),
        OAuth2Token {
            access_token: "stale-access".into(),
            refresh_token: Some("old-refresh".into()),
            expires_at: Some(Utc::now() + chrono::Duration::seconds(10)),
            scope: None,
        },
    )
    .unwrap();
    let client = TwitterClient::with_config(auth.clone(), config(&server)).unwrap();
    client.users().find_my_user(None, RequestOptions::new()).await.unwrap();
    client.users().find_my_user(None, RequestOptions::new()).await.unwrap();

    refresh.assert_hits_async(1).await;
    me.assert_hits_async(2).await;
    assert_eq!(auth.token().await.unwrap().refresh_token.as_deref(), Some("new-refresh"));
}

#[tokio::test]
async fn test_oauth2_failed_exchange() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/2/oauth2/token");
            then.status(400).json_body(json!({"error": "invalid_request"}));
        })
        .await;

    let auth = OAuth2User::new(oauth_config(&server)).unwrap();
    auth.generate_auth_url("s", CodeChallenge::Plain("verifier".into()))
        .await
        .unwrap();
    let err = auth.request_access_token("bad-code").await.unwrap_err();
    assert!(err.is_auth_error());
}
