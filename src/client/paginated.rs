//! Token-driven pagination over envelope responses.
//!
//! A [`Paginator`] fetches the first page eagerly, so awaiting an endpoint
//! method behaves like a plain request, and then lazily follows
//! `meta.next_token` when iterated as a [`Stream`].

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::stream::{self, Stream, StreamExt};

use super::envelope::ResponseEnvelope;
use super::rate_limit::RateLimitTracker;
use crate::Result;

/// Type alias for a boxed future used internally.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

type FetchPage<T> = Box<
    dyn Fn(Option<String>, RateLimitTracker) -> BoxFuture<'static, Result<ResponseEnvelope<T>>>
        + Send
        + Sync,
>;

/// A lazy sequence of envelope pages.
///
/// The first page is fetched by [`Paginator::start`] and cached; iteration
/// yields it before requesting anything else. Every further page is fetched
/// only when polled, strictly one at a time, with the previous page's
/// `next_token` as its pagination token. The sequence ends after a page
/// without a `next_token`, or after the first failed fetch.
///
/// # Example
///
/// ```no_run
/// use futures_util::StreamExt;
/// use twitter_api_rs::{RequestOptions, UserId};
///
/// # async fn example(client: twitter_api_rs::TwitterClient) -> twitter_api_rs::Result<()> {
/// let mut pages = client
///     .users()
///     .followers(&UserId::new("2244994945"), None, RequestOptions::new())
///     .await?;
///
/// while let Some(page) = pages.next().await {
///     let page = page?;
///     println!("{} followers", page.data.map(|d| d.len()).unwrap_or(0));
/// }
/// # Ok(())
/// # }
/// ```
pub struct Paginator<T> {
    /// Function fetching one page for an optional token.
    fetch_page: FetchPage<T>,
    /// Tracker handed to every fetch.
    tracker: RateLimitTracker,
    /// First page, until it has been yielded.
    first: Option<ResponseEnvelope<T>>,
    /// Token for the next fetch, None once exhausted.
    next_token: Option<String>,
    /// Current in-flight fetch future.
    pending_fetch: Option<BoxFuture<'static, Result<ResponseEnvelope<T>>>>,
}

impl<T: Send + 'static> Paginator<T> {
    /// Fetch the first page and build the paginator around it.
    ///
    /// A failure of the first fetch is returned here; no paginator exists in
    /// that case.
    pub async fn start<F>(fetch_page: F, tracker: RateLimitTracker) -> Result<Self>
    where
        F: Fn(Option<String>, RateLimitTracker) -> BoxFuture<'static, Result<ResponseEnvelope<T>>>
            + Send
            + Sync
            + 'static,
    {
        let first = fetch_page(None, tracker.clone()).await?;
        let next_token = first.next_token().map(String::from);
        tracing::debug!(has_next = next_token.is_some(), "fetched first page");

        Ok(Self {
            fetch_page: Box::new(fetch_page),
            tracker,
            first: Some(first),
            next_token,
            pending_fetch: None,
        })
    }

    /// The first page, until iteration has yielded it.
    pub fn first(&self) -> Option<&ResponseEnvelope<T>> {
        self.first.as_ref()
    }

    /// Consume the paginator, keeping only the first page.
    ///
    /// Returns `None` if iteration already yielded it.
    pub fn into_first(self) -> Option<ResponseEnvelope<T>> {
        self.first
    }

    /// Returns `true` if more pages may follow what has been yielded so far.
    pub fn has_more(&self) -> bool {
        self.first.is_some() || self.next_token.is_some() || self.pending_fetch.is_some()
    }

    /// Fetch the next page.
    pub async fn next_page(&mut self) -> Option<Result<ResponseEnvelope<T>>> {
        self.next().await
    }
}

impl<U: Send + 'static> Paginator<Vec<U>> {
    /// Flatten list pages into individual items.
    ///
    /// Pages are still fetched lazily; a page without `data` contributes
    /// nothing. A failed fetch is yielded once and ends the sequence.
    pub fn items(self) -> impl Stream<Item = Result<U>> + Send {
        self.flat_map(|page| {
            let batch: Vec<Result<U>> = match page {
                Ok(envelope) => envelope
                    .data
                    .unwrap_or_default()
                    .into_iter()
                    .map(Ok)
                    .collect(),
                Err(e) => vec![Err(e)],
            };
            stream::iter(batch)
        })
    }
}

impl<T> Stream for Paginator<T> {
    type Item = Result<ResponseEnvelope<T>>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        loop {
            if let Some(first) = this.first.take() {
                return Poll::Ready(Some(Ok(first)));
            }

            if let Some(ref mut fut) = this.pending_fetch {
                match fut.as_mut().poll(cx) {
                    Poll::Ready(Ok(page)) => {
                        this.pending_fetch = None;
                        this.next_token = page.next_token().map(String::from);
                        tracing::debug!(has_next = this.next_token.is_some(), "fetched page");
                        return Poll::Ready(Some(Ok(page)));
                    }
                    Poll::Ready(Err(e)) => {
                        this.pending_fetch = None;
                        this.next_token = None;
                        return Poll::Ready(Some(Err(e)));
                    }
                    Poll::Pending => return Poll::Pending,
                }
            }

            if let Some(token) = this.next_token.take() {
                this.pending_fetch = Some((this.fetch_page)(Some(token), this.tracker.clone()));
                continue;
            }

            return Poll::Ready(None);
        }
    }
}

impl<T> Unpin for Paginator<T> {}

impl<T> std::fmt::Debug for Paginator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paginator")
            .field("first_cached", &self.first.is_some())
            .field("next_token", &self.next_token)
            .field("fetching", &self.pending_fetch.is_some())
            .finish()
    }
}
