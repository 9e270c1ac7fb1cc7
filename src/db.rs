//! Client entry points: a database handle and per-collection query access.

use crate::command::{CommandExecutor, HttpCommandExecutor};
use crate::cursor::FindCursor;
use crate::error::Result;
use crate::filter::Filter;
use crate::find::FindQuery;
use crate::options::FindOptions;
use crate::rerank::RerankQuery;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Handle to one Data API database (endpoint + keyspace).
#[derive(Clone)]
pub struct Database {
    executor: Arc<dyn CommandExecutor>,
}

impl Database {
    /// Connect over HTTP with a token.
    pub fn connect(
        base_url: impl Into<String>,
        keyspace: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self::with_executor(Arc::new(HttpCommandExecutor::new(base_url, keyspace, token)))
    }

    /// Use a custom executor, e.g. a stub in tests.
    pub fn with_executor(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }

    pub fn collection(&self, name: impl Into<String>) -> Collection {
        Collection {
            executor: Arc::clone(&self.executor),
            name: name.into(),
        }
    }
}

/// Handle to one collection, from which queries are built.
#[derive(Clone)]
pub struct Collection {
    executor: Arc<dyn CommandExecutor>,
    name: String,
}

impl Collection {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start a find query with empty options.
    pub fn find<T: DeserializeOwned + Send + 'static>(&self) -> FindQuery<T> {
        FindQuery::new(
            Arc::clone(&self.executor),
            self.name.clone(),
            FindOptions::new(),
        )
    }

    /// Start a hybrid rerank query with empty options.
    pub fn find_and_rerank<T: DeserializeOwned + Send + 'static>(&self) -> RerankQuery<T> {
        RerankQuery::new(
            Arc::clone(&self.executor),
            self.name.clone(),
            FindOptions::new(),
        )
    }

    /// Fetch at most one document matching `filter`.
    pub async fn find_one<T: DeserializeOwned + Send + 'static>(
        &self,
        filter: Filter,
    ) -> Result<Option<T>> {
        let mut cursor: FindCursor<T> = self.find().filter(filter).limit(1).run();
        cursor.next().await
    }

    /// Blocking twin of [`find_one`](Collection::find_one).
    pub fn find_one_blocking<T: DeserializeOwned + Send + 'static>(
        &self,
        filter: Filter,
    ) -> Result<Option<T>> {
        let mut cursor: FindCursor<T> = self.find().filter(filter).limit(1).run();
        cursor.next_blocking()
    }

    /// Untyped find, yielding raw JSON documents.
    pub fn find_raw(&self) -> FindQuery<Value> {
        self.find()
    }
}
