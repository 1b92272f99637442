//! Token-following pagination shared by every `*.list` endpoint.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};
use tokio_stream::Stream;

/// One page of a YouTube list response, reduced to what pagination needs.
#[derive(Debug)]
pub struct Page<T> {
    pub items: VecDeque<T>,
    /// Absent on the last page.
    pub next_page_token: Option<String>,
}

type PendingPage<'a, F, T> = Pin<Box<dyn Future<Output = eyre::Result<(F, Page<T>)>> + Send + 'a>>;

/// A stream over every item of a paginated listing.
///
/// The fetcher is called with `None` for the first page and then with each
/// `nextPageToken` in turn until a page comes back without one. Pages are only
/// requested once the items of the previous page have been consumed, so
/// dropping the stream early saves the remaining API calls.
///
/// An error fetching a page is yielded once and ends the stream.
pub struct PagedStream<'a, T, F> {
    buffered: VecDeque<T>,
    in_flight: Option<PendingPage<'a, F, T>>,
    exhausted: bool,
}

impl<'a, T, F, Fut> PagedStream<'a, T, F>
where
    F: Fn(Option<String>) -> Fut + Send + 'a,
    Fut: Future<Output = eyre::Result<Page<T>>> + Send + 'a,
{
    pub fn new(fetcher: F) -> Self {
        Self {
            buffered: VecDeque::new(),
            in_flight: Some(Self::fetch(fetcher, None)),
            exhausted: false,
        }
    }

    fn fetch(fetcher: F, page_token: Option<String>) -> PendingPage<'a, F, T> {
        Box::pin(async move {
            let page = fetcher(page_token).await?;
            Ok((fetcher, page))
        })
    }
}

impl<T: Unpin, F> Unpin for PagedStream<'_, T, F> {}

impl<'a, T: Unpin, F, Fut> Stream for PagedStream<'a, T, F>
where
    F: Fn(Option<String>) -> Fut + Send + 'a,
    Fut: Future<Output = eyre::Result<Page<T>>> + Send + 'a,
{
    type Item = eyre::Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(item) = self.buffered.pop_front() {
                return Poll::Ready(Some(Ok(item)));
            }
            if self.exhausted {
                return Poll::Ready(None);
            }
            let Some(pending) = self.in_flight.as_mut() else {
                self.exhausted = true;
                return Poll::Ready(None);
            };
            match pending.as_mut().poll(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Err(e)) => {
                    self.in_flight = None;
                    self.exhausted = true;
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(Ok((fetcher, page))) => {
                    self.buffered.extend(page.items);
                    match page.next_page_token {
                        Some(token) => self.in_flight = Some(Self::fetch(fetcher, Some(token))),
                        None => {
                            self.in_flight = None;
                            self.exhausted = true;
                        }
                    }
                    // an empty page with a token just means "keep going"
                }
            }
        }
    }
}

/// Paging details for lists of resources.
///
/// See: <https://developers.google.com/youtube/v3/docs/pageInfo>
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct PageInfo {
    /// The total number of results in the result set.
    #[serde(rename = "totalResults", default)]
    pub total_results: u32,
    /// The number of results included in the API response.
    #[serde(rename = "resultsPerPage", default)]
    pub results_per_page: u32,
}
