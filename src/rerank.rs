//! Hybrid lexical + vector queries with server-side reranking.
//!
//! Unlike [`FindQuery`](crate::FindQuery), a rerank query is single-shot:
//! one `findAndRerank` round-trip returns the already re-ordered results,
//! optionally annotated with per-result component scores.

use crate::command::CommandExecutor;
use crate::error::{Error, Result};
use crate::filter::Filter;
use crate::options::{FindOptions, HybridLimits};
use crate::projection::Projection;
use crate::protocol::{self, ApiResponse};
use crate::sort::Sort;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::marker::PhantomData;
use std::sync::Arc;

/// A document returned by a rerank query, paired with its component scores
/// when score reporting was requested.
#[derive(Debug, Clone)]
pub struct RerankedDocument<T> {
    pub document: T,
    scores: Option<Map<String, Value>>,
}

impl<T> RerankedDocument<T> {
    /// Per-branch score map for this result.
    ///
    /// A usage error unless the query enabled
    /// [`include_scores`](RerankQuery::include_scores) before running.
    pub fn scores(&self) -> Result<&Map<String, Value>> {
        self.scores.as_ref().ok_or(Error::MetadataNotRequested {
            metadata: "rerank scores",
            flag: "includeScores",
        })
    }
}

/// Fluent builder for a `findAndRerank` query. Mutators clone the options,
/// as with [`FindQuery`](crate::FindQuery).
pub struct RerankQuery<T = Value> {
    executor: Arc<dyn CommandExecutor>,
    collection: String,
    options: FindOptions,
    _result: PhantomData<fn() -> T>,
}

impl<T> RerankQuery<T> {
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

    /// Hybrid sort feeding the two retrieval branches; see [`Sort::hybrid`].
    pub fn sort(&self, sort: Sort) -> Self {
        self.derive(|o| o.sort = sort)
    }

    pub fn project(&self, projection: Projection) -> Self {
        self.derive(|o| o.projection = Some(projection))
    }

    pub fn limit(&self, n: u64) -> Self {
        self.derive(|o| o.limit = Some(n))
    }

    /// The field the reranker model scores against.
    pub fn rerank_on(&self, field: impl Into<String>) -> Self {
        let field = field.into();
        self.derive(|o| o.rerank_on = Some(field))
    }

    /// Rerank query string, when it differs from the hybrid sort query.
    pub fn rerank_query(&self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.derive(|o| o.rerank_query = Some(query))
    }

    /// Candidate-count limits for the lexical and vector branches.
    pub fn hybrid_limits(&self, limits: HybridLimits) -> Self {
        self.derive(|o| o.hybrid_limits = Some(limits))
    }

    /// Ask the server to report per-result component scores.
    pub fn include_scores(&self, flag: bool) -> Self {
        self.derive(|o| o.include_scores = Some(flag))
    }

    pub fn options(&self) -> &FindOptions {
        &self.options
    }

    fn payload(&self) -> Value {
        self.options.to_payload(protocol::CMD_FIND_AND_RERANK)
    }
}

fn decode_reranked<T: DeserializeOwned>(
    response: ApiResponse,
    scores_requested: bool,
) -> Result<Vec<RerankedDocument<T>>> {
    let scores = if scores_requested {
        let scores = response.rerank_scores().ok_or_else(|| {
            Error::Protocol("scores were requested but the response carries none".to_string())
        })?;
        Some(scores)
    } else {
        None
    };

    let data = response.data.unwrap_or_default();

    // Scores pair with documents by position; a length mismatch means the
    // server broke the contract and must not be papered over.
    if let Some(scores) = &scores {
        if scores.len() != data.documents.len() {
            return Err(Error::Protocol(format!(
                "rerank response has {} documents but {} score entries",
                data.documents.len(),
                scores.len()
            )));
        }
    }

    let mut score_iter = scores.map(Vec::into_iter);
    let mut results = Vec::with_capacity(data.documents.len());
    for document in data.documents {
        let document = serde_json::from_value(document)?;
        let scores = score_iter.as_mut().and_then(Iterator::next);
        results.push(RerankedDocument { document, scores });
    }
    Ok(results)
}

impl<T: DeserializeOwned + Send + 'static> RerankQuery<T> {
    /// Execute the query: exactly one round-trip, no paging.
    pub async fn run(&self) -> Result<Vec<RerankedDocument<T>>> {
        let scores_requested = self.options.include_scores.unwrap_or(false);
        let response = self
            .executor
            .execute(&self.collection, self.payload())
            .await?;
        decode_reranked(response, scores_requested)
    }

    /// Blocking twin of [`run`](RerankQuery::run).
    pub fn run_blocking(&self) -> Result<Vec<RerankedDocument<T>>> {
        let scores_requested = self.options.include_scores.unwrap_or(false);
        let response = self
            .executor
            .execute_blocking(&self.collection, self.payload())?;
        decode_reranked(response, scores_requested)
    }
}
