//! CRLF-delimited JSON decoding over a chunked byte source.

use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::stream::{Stream, StreamExt};
use serde::de::DeserializeOwned;

use crate::{Error, Result};

/// Boxed source of body chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

const DELIMITER: &[u8] = b"\r\n";

/// A lazy, single-pass sequence of JSON objects read from a streaming body.
///
/// Chunks of any size are buffered until a CRLF completes a line; each
/// complete line is decoded as one `T`. Blank lines are keep-alives and are
/// dropped silently.
///
/// Termination:
/// - the source ends: the sequence ends, and an unterminated trailing
///   fragment is discarded;
/// - a line is not valid JSON, or the source fails: that error is yielded
///   once and the sequence ends;
/// - [`close`](Self::close) or drop: the source, and with it the connection,
///   is released immediately.
///
/// # Example
///
/// ```no_run
/// use futures_util::StreamExt;
///
/// # async fn example(client: twitter_api_rs::TwitterClient) -> twitter_api_rs::Result<()> {
/// let mut stream = client
///     .tweets()
///     .sample_stream(None, twitter_api_rs::RequestOptions::new())
///     .await?;
///
/// while let Some(item) = stream.next().await {
///     let item = item?;
///     if let Some(tweet) = item.data {
///         println!("{}: {}", tweet.id, tweet.text);
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct JsonLineStream<T> {
    source: Option<ByteStream>,
    buffer: Vec<u8>,
    /// Prefix of `buffer` already known to hold no delimiter.
    scanned: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> JsonLineStream<T> {
    /// Wrap a chunk source.
    pub fn new<S>(source: S) -> Self
    where
        S: Stream<Item = Result<Bytes>> + Send + 'static,
    {
        Self {
            source: Some(Box::pin(source)),
            buffer: Vec::new(),
            scanned: 0,
            _marker: PhantomData,
        }
    }

    /// Decode the body of an already-accepted streaming response.
    pub(crate) fn from_response(response: reqwest::Response) -> Self {
        Self::new(response.bytes_stream().map(|chunk| chunk.map_err(Error::from)))
    }

    /// Get the next decoded item.
    pub async fn next_item(&mut self) -> Option<Result<T>> {
        self.next().await
    }

    /// Stop reading and release the underlying connection.
    ///
    /// Buffered, not yet decoded data is discarded.
    pub fn close(&mut self) {
        if self.source.is_some() {
            tracing::debug!("stream closed by consumer");
        }
        self.shutdown();
    }

    /// Returns `true` once no further items can be produced.
    pub fn is_closed(&self) -> bool {
        self.source.is_none() && self.buffer.is_empty()
    }

    fn shutdown(&mut self) {
        self.source = None;
        self.buffer.clear();
        self.scanned = 0;
    }

    /// Split one complete line off the front of the buffer, without its
    /// delimiter.
    fn take_line(&mut self) -> Option<Vec<u8>> {
        // A CR at the end of the previous scan may pair with a new LF.
        let from = self.scanned.saturating_sub(DELIMITER.len() - 1);
        match self.buffer[from..]
            .windows(DELIMITER.len())
            .position(|w| w == DELIMITER)
        {
            Some(pos) => {
                let end = from + pos;
                let mut line: Vec<u8> = self.buffer.drain(..end + DELIMITER.len()).collect();
                line.truncate(end);
                self.scanned = 0;
                Some(line)
            }
            None => {
                self.scanned = self.buffer.len();
                None
            }
        }
    }
}

impl<T: DeserializeOwned> Stream for JsonLineStream<T> {
    type Item = Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        loop {
            while let Some(line) = this.take_line() {
                if line.iter().all(u8::is_ascii_whitespace) {
                    tracing::trace!("keep-alive");
                    continue;
                }
                return match serde_json::from_slice::<T>(&line) {
                    Ok(item) => Poll::Ready(Some(Ok(item))),
                    Err(e) => {
                        this.shutdown();
                        Poll::Ready(Some(Err(Error::parse(e, &line))))
                    }
                };
            }

            let Some(source) = this.source.as_mut() else {
                return Poll::Ready(None);
            };

            match source.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => this.buffer.extend_from_slice(&chunk),
                Poll::Ready(Some(Err(e))) => {
                    this.shutdown();
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(None) => {
                    if !this.buffer.iter().all(u8::is_ascii_whitespace) {
                        tracing::debug!(
                            bytes = this.buffer.len(),
                            "discarding unterminated trailing data"
                        );
                    }
                    tracing::debug!("stream ended by peer");
                    this.shutdown();
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl<T> std::fmt::Debug for JsonLineStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLineStream")
            .field("open", &self.source.is_some())
            .field("buffered", &self.buffer.len())
            .finish()
    }
}
