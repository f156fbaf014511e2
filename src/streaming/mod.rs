//! Streaming endpoints.
//!
//! Filtered and sampled stream endpoints keep a connection open and deliver
//! one JSON object per CRLF-terminated line, interleaved with blank
//! keep-alive lines. [`JsonLineStream`] turns such a body into a
//! [`Stream`](futures_util::Stream) of decoded items.
//!
//! ```no_run
//! use futures_util::StreamExt;
//!
//! # async fn example(client: twitter_api_rs::TwitterClient) -> twitter_api_rs::Result<()> {
//! let mut stream = client
//!     .tweets()
//!     .search_stream(None, twitter_api_rs::RequestOptions::new())
//!     .await?;
//!
//! // Stop after ten tweets; dropping the stream closes the connection.
//! let mut seen = 0;
//! while let Some(item) = stream.next().await {
//!     println!("{:?}", item?.data);
//!     seen += 1;
//!     if seen == 10 {
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod decoder;

pub use decoder::{ByteStream, JsonLineStream};
