//! Print tweets from the 1% sampled stream until Ctrl-C or a limit is hit.
//!
//! Run with: TWITTER_BEARER_TOKEN=... cargo run --example sample_stream

use futures_util::StreamExt;
use twitter_api_rs::{BearerToken, RequestOptions, TwitterClient};

const MAX_TWEETS: usize = 25;

#[tokio::main]
async fn main() -> twitter_api_rs::Result<()> {
    tracing_subscriber::fmt::init();

    let client = TwitterClient::new(BearerToken::from_env()?)?;

    println!("Connecting to the sampled stream...");
    let options = RequestOptions::new().on_rate_limit(|rl| {
        println!("{}/{} connections left this window", rl.remaining, rl.limit);
    });
    let mut stream = client.tweets().sample_stream(None, options).await?;
    println!("Connected!\n");

    let mut received = 0;
    loop {
        tokio::select! {
            item = stream.next() => match item {
                Some(Ok(item)) => {
                    if let Some(tweet) = item.data {
                        received += 1;
                        println!("[{}] {}: {}", received, tweet.id, tweet.text);
                    }
                    if received >= MAX_TWEETS {
                        break;
                    }
                }
                Some(Err(e)) => {
                    eprintln!("Stream error: {}", e);
                    break;
                }
                None => {
                    println!("Stream ended by server");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                println!("Interrupted");
                break;
            }
        }
    }

    stream.close();
    println!("Received {} tweets", received);
    Ok(())
}
