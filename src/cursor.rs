//! Paging cursor over the Data API find protocol.
//!
//! The server hands back one page of results plus a continuation token; the
//! cursor drives repeated fetches through a [`PageFetcher`] and exposes the
//! concatenated result stream. Paging state transitions live in one place
//! ([`PageSource`]), shared by the blocking and async paths, so both yield
//! the same pages in the same order and terminate on the same condition.

use crate::error::{Error, Result};
use async_trait::async_trait;
use futures::stream::{self, Stream};
use std::collections::VecDeque;
use tracing::debug;

/// One fetched page: a result batch, the continuation token for the next
/// page (absent on the final page), and first-page-only sort metadata.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub next_page_state: Option<String>,
    pub sort_vector: Option<Vec<f32>>,
}

/// The external collaborator that retrieves a page given a continuation
/// token. `fetch` suspends on network I/O; `fetch_blocking` is a dedicated
/// synchronous mode for callers without an async runtime, never a block-on
/// wrapper around the async path.
#[async_trait]
pub trait PageFetcher<T>: Send {
    async fn fetch(&mut self, page_state: Option<&str>) -> Result<Page<T>>;

    fn fetch_blocking(&mut self, page_state: Option<&str>) -> Result<Page<T>>;
}

/// Paging state machine: Unstarted -> Fetching -> HasPage -> ... -> Exhausted.
struct PageSource<T> {
    fetcher: Box<dyn PageFetcher<T>>,
    started: bool,
    exhausted: bool,
    page_state: Option<String>,
    sort_vector: Option<Vec<f32>>,
}

impl<T> PageSource<T> {
    fn new(fetcher: Box<dyn PageFetcher<T>>) -> Self {
        Self {
            fetcher,
            started: false,
            exhausted: false,
            page_state: None,
            sort_vector: None,
        }
    }

    /// Fold a fetched page into the paging state. This is the only place
    /// the state machine advances, for both execution modes. Exhaustion is
    /// declared when a fetched page carries no continuation token.
    fn absorb(&mut self, page: Page<T>) -> Vec<T> {
        if !self.started {
            self.started = true;
            self.sort_vector = page.sort_vector;
        }
        match page.next_page_state {
            Some(state) => self.page_state = Some(state),
            None => {
                self.page_state = None;
                self.exhausted = true;
            }
        }
        page.results
    }

    /// Next non-empty batch, or `None` once the terminal page was fetched.
    /// Empty non-terminal pages are skipped by fetching again.
    async fn next_batch(&mut self) -> Result<Option<Vec<T>>> {
        loop {
            if self.exhausted {
                return Ok(None);
            }
            let state = self.page_state.clone();
            debug!(page_state = state.as_deref(), "fetching page");
            let page = self.fetcher.fetch(state.as_deref()).await?;
            let batch = self.absorb(page);
            if !batch.is_empty() {
                return Ok(Some(batch));
            }
        }
    }

    fn next_batch_blocking(&mut self) -> Result<Option<Vec<T>>> {
        loop {
            if self.exhausted {
                return Ok(None);
            }
            let state = self.page_state.clone();
            debug!(page_state = state.as_deref(), "fetching page (blocking)");
            let page = self.fetcher.fetch_blocking(state.as_deref())?;
            let batch = self.absorb(page);
            if !batch.is_empty() {
                return Ok(Some(batch));
            }
        }
    }
}

/// A single-owner, single-consumer cursor over the logical result stream.
///
/// Elements are pulled one at a time with [`next`](FindCursor::next) (async)
/// or [`next_blocking`](FindCursor::next_blocking); dropping the cursor
/// between elements cancels the iteration and discards its paging state.
pub struct FindCursor<T> {
    source: PageSource<T>,
    buffer: VecDeque<T>,
    wants_sort_vector: bool,
}

impl<T> FindCursor<T> {
    /// Wrap a page fetcher. `wants_sort_vector` mirrors the request's
    /// `includeSortVector` flag and gates the metadata accessor.
    pub fn new(fetcher: Box<dyn PageFetcher<T>>, wants_sort_vector: bool) -> Self {
        Self {
            source: PageSource::new(fetcher),
            buffer: VecDeque::new(),
            wants_sort_vector,
        }
    }

    /// Next element, fetching the next page when the buffer runs dry.
    pub async fn next(&mut self) -> Result<Option<T>> {
        if let Some(item) = self.buffer.pop_front() {
            return Ok(Some(item));
        }
        match self.source.next_batch().await? {
            Some(batch) => {
                self.buffer = batch.into();
                Ok(self.buffer.pop_front())
            }
            None => Ok(None),
        }
    }

    /// Blocking twin of [`next`](FindCursor::next).
    pub fn next_blocking(&mut self) -> Result<Option<T>> {
        if let Some(item) = self.buffer.pop_front() {
            return Ok(Some(item));
        }
        match self.source.next_batch_blocking()? {
            Some(batch) => {
                self.buffer = batch.into();
                Ok(self.buffer.pop_front())
            }
            None => Ok(None),
        }
    }

    /// Whether at least one page has been fetched.
    pub fn started(&self) -> bool {
        self.source.started
    }

    /// Whether the terminal page has been fetched.
    pub fn exhausted(&self) -> bool {
        self.source.exhausted && self.buffer.is_empty()
    }

    /// The sort vector echoed back on the first page.
    ///
    /// Usage errors, distinct from the server simply not returning one:
    /// reading before the first fetch, or without having requested the
    /// vector via `includeSortVector`.
    pub fn sort_vector(&self) -> Result<Option<&[f32]>> {
        if !self.wants_sort_vector {
            return Err(Error::MetadataNotRequested {
                metadata: "sort vector",
                flag: "includeSortVector",
            });
        }
        if !self.source.started {
            return Err(Error::CursorNotStarted("the sort vector"));
        }
        Ok(self.source.sort_vector.as_deref())
    }

    /// Drain the remaining elements into a `Vec` (async).
    pub async fn collect(mut self) -> Result<Vec<T>> {
        let mut out = Vec::new();
        while let Some(item) = self.next().await? {
            out.push(item);
        }
        Ok(out)
    }

    /// Drain the remaining elements into a `Vec` (blocking).
    pub fn collect_blocking(mut self) -> Result<Vec<T>> {
        let mut out = Vec::new();
        while let Some(item) = self.next_blocking()? {
            out.push(item);
        }
        Ok(out)
    }

    /// Adapt to a `futures::Stream`. The stream is fused after the first
    /// error; dropping it mid-iteration is the cancellation path.
    pub fn into_stream(self) -> impl Stream<Item = Result<T>>
    where
        T: Send + 'static,
    {
        stream::unfold((self, false), |(mut cursor, done)| async move {
            if done {
                return None;
            }
            match cursor.next().await {
                Ok(Some(item)) => Some((Ok(item), (cursor, false))),
                Ok(None) => None,
                Err(e) => Some((Err(e), (cursor, true))),
            }
        })
    }

    /// Adapt to a blocking `Iterator` for callers without a runtime.
    pub fn into_blocking_iter(self) -> BlockingIter<T> {
        BlockingIter {
            cursor: self,
            done: false,
        }
    }
}

/// Blocking iterator adapter over a [`FindCursor`]. Fused after the first
/// error or the end of the result stream.
pub struct BlockingIter<T> {
    cursor: FindCursor<T>,
    done: bool,
}

impl<T> Iterator for BlockingIter<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.cursor.next_blocking() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
