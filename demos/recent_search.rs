//! Search recent tweets and walk every page, printing the rate-limit window
//! after each request.
//!
//! Run with: TWITTER_BEARER_TOKEN=... cargo run --example recent_search -- "from:TwitterDev"

use futures_util::StreamExt;
use twitter_api_rs::models::{FieldsQuery, SearchRecentQuery};
use twitter_api_rs::{BearerToken, RequestOptions, TwitterClient};

#[tokio::main]
async fn main() -> twitter_api_rs::Result<()> {
    tracing_subscriber::fmt::init();

    let query = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "from:TwitterDev -is:retweet".to_string());

    let client = TwitterClient::new(BearerToken::from_env()?)?;

    let options = RequestOptions::new().on_rate_limit(|rl| {
        println!(
            "[rate limit] {}/{} left, resets at {:?}",
            rl.remaining,
            rl.limit,
            rl.reset_at()
        );
    });

    let search = SearchRecentQuery::new(&query)
        .max_results(10)
        .fields(FieldsQuery::new().tweet_fields(["created_at", "author_id"]));

    println!("=== Recent tweets matching {:?} ===", query);
    let mut pages = client.tweets().search_recent(search, options).await?;

    let mut page_number = 0;
    while let Some(page) = pages.next().await {
        let page = page?;
        page_number += 1;
        println!("--- page {} ---", page_number);

        for tweet in page.data.unwrap_or_default() {
            println!("{} {:?}: {}", tweet.id, tweet.created_at, tweet.text);
        }
        if let Some(errors) = page.errors {
            for error in errors {
                println!("partial error: {:?} {:?}", error.title, error.detail);
            }
        }

        // Keep the demo cheap on quota.
        if page_number == 3 {
            break;
        }
    }

    Ok(())
}
