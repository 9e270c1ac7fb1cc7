//! Fluent find queries over a collection.
//!
//! Every option mutator clones the underlying options and returns a fresh
//! query, so deriving variants from one base query is safe and a cursor
//! that has started paging is never retouched.

use crate::command::CommandExecutor;
use crate::cursor::{FindCursor, Page, PageFetcher};
use crate::error::Result;
use crate::filter::Filter;
use crate::options::FindOptions;
use crate::projection::Projection;
use crate::protocol::{self, ApiResponse};
use crate::sort::Sort;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

/// A lazily-executed find query. Build it up with the option mutators, then
/// call [`run`](FindQuery::run) to start a cursor; `run` can be called any
/// number of times, each cursor paging independently.
pub struct FindQuery<T = Value> {
    executor: Arc<dyn CommandExecutor>,
    collection: String,
    options: FindOptions,
    _result: PhantomData<fn() -> T>,
}

impl<T> FindQuery<T> {
    pub(crate) fn new(
        executor: Arc<dyn CommandExecutor>,
        collection: String,
        options: FindOptions,
    ) -> Self {
        Self {
            executor,
            collection,
            options,
            _result: PhantomData,
        }
    }

    fn derive(&self, mutate: impl FnOnce(&mut FindOptions)) -> Self {
        let mut options = self.options.clone();
        mutate(&mut options);
        Self {
            executor: Arc::clone(&self.executor),
            collection: self.collection.clone(),
            options,
            _result: PhantomData,
        }
    }

    pub fn filter(&self, filter: Filter) -> Self {
        self.derive(|o| o.filter = Some(filter))
    }

    pub fn sort(&self, sort: Sort) -> Self {
        self.derive(|o| o.sort = sort)
    }

    pub fn project(&self, projection: Projection) -> Self {
        self.derive(|o| o.projection = Some(projection))
    }

    pub fn skip(&self, n: u64) -> Self {
        self.derive(|o| o.skip = Some(n))
    }

    pub fn limit(&self, n: u64) -> Self {
        self.derive(|o| o.limit = Some(n))
    }

    pub fn include_similarity(&self, flag: bool) -> Self {
        self.derive(|o| o.include_similarity = Some(flag))
    }

    pub fn include_sort_vector(&self, flag: bool) -> Self {
        self.derive(|o| o.include_sort_vector = Some(flag))
    }

    /// The current options snapshot, primarily for payload inspection.
    pub fn options(&self) -> &FindOptions {
        &self.options
    }
}

impl<T: DeserializeOwned + Send + 'static> FindQuery<T> {
    /// Start a cursor over the result stream. The cursor owns a fork of the
    /// options with the page state reset, so it always pages from the start.
    pub fn run(&self) -> FindCursor<T> {
        let wants_sort_vector = self.options.include_sort_vector.unwrap_or(false);
        let fetcher = FindPageFetcher::<T> {
            executor: Arc::clone(&self.executor),
            collection: self.collection.clone(),
            options: self.options.fork(),
            _result: PhantomData,
        };
        FindCursor::new(Box::new(fetcher), wants_sort_vector)
    }
}

/// Page fetcher backing [`FindQuery::run`]: compiles the owned options fork
/// into a `find` payload per page and decodes the response batch.
struct FindPageFetcher<T> {
    executor: Arc<dyn CommandExecutor>,
    collection: String,
    options: FindOptions,
    _result: PhantomData<fn() -> T>,
}

fn decode_page<T: DeserializeOwned>(response: ApiResponse) -> Result<Page<T>> {
    let sort_vector = response.sort_vector();
    let data = response.data.unwrap_or_default();
    let mut results = Vec::with_capacity(data.documents.len());
    for document in data.documents {
        results.push(serde_json::from_value(document)?);
    }
    Ok(Page {
        results,
        next_page_state: data.next_page_state,
        sort_vector,
    })
}

impl<T> FindPageFetcher<T> {
    fn payload(&mut self, page_state: Option<&str>) -> Value {
        self.options.page_state = page_state.map(str::to_string);
        self.options.to_payload(protocol::CMD_FIND)
    }
}

#[async_trait]
impl<T: DeserializeOwned + Send + 'static> PageFetcher<T> for FindPageFetcher<T> {
    async fn fetch(&mut self, page_state: Option<&str>) -> Result<Page<T>> {
        let payload = self.payload(page_state);
        let response = self.executor.execute(&self.collection, payload).await?;
        decode_page(response)
    }

    fn fetch_blocking(&mut self, page_state: Option<&str>) -> Result<Page<T>> {
        let payload = self.payload(page_state);
        let response = self.executor.execute_blocking(&self.collection, payload)?;
        decode_page(response)
    }
}
