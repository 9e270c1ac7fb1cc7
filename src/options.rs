//! Per-request find options: filter, sort, projection and paging controls,
//! bundled into one clonable aggregate shared by every find variant.

use crate::filter::Filter;
use crate::projection::Projection;
use crate::protocol;
use crate::sort::Sort;
use serde_json::{json, Map, Value};

/// Result-count limits for the two branches of a hybrid query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HybridLimits {
    /// One limit applied to both branches.
    Overall(u64),
    /// Distinct per-branch limits.
    PerBranch { vector: u64, lexical: u64 },
}

impl HybridLimits {
    fn to_value(self) -> Value {
        match self {
            HybridLimits::Overall(n) => json!(n),
            HybridLimits::PerBranch { vector, lexical } => json!({
                protocol::FIELD_VECTOR: vector,
                protocol::FIELD_LEXICAL: lexical,
            }),
        }
    }
}

/// Options for a single find or rerank request.
///
/// Cloning is a deep copy (everything here is owned data); [`fork`] is the
/// clone a cursor pages through, with the page state reset so every cursor
/// starts its own paging sequence.
///
/// [`fork`]: FindOptions::fork
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FindOptions {
    pub filter: Option<Filter>,
    pub sort: Sort,
    pub projection: Option<Projection>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub include_similarity: Option<bool>,
    pub include_sort_vector: Option<bool>,
    pub page_state: Option<String>,
    // Hybrid / rerank capabilities, absent for plain finds.
    pub rerank_on: Option<String>,
    pub rerank_query: Option<String>,
    pub include_scores: Option<bool>,
    pub hybrid_limits: Option<HybridLimits>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deep copy with the paging position reset. A cursor exclusively owns
    /// the fork it pages through; the template is never mutated.
    pub fn fork(&self) -> Self {
        let mut forked = self.clone();
        forked.page_state = None;
        forked
    }

    /// Assemble the request payload `{command: {filter?, sort?, projection?,
    /// options: {...}}}`, omitting everything unset. Pure function.
    pub fn to_payload(&self, command: &str) -> Value {
        let mut body = Map::new();

        if let Some(filter) = &self.filter {
            body.insert(protocol::KEY_FILTER.to_string(), filter.to_value());
        }
        if !self.sort.is_empty() {
            body.insert(protocol::KEY_SORT.to_string(), self.sort.to_value());
        }
        if let Some(projection) = &self.projection {
            if !projection.is_empty() {
                body.insert(protocol::KEY_PROJECTION.to_string(), projection.to_value());
            }
        }

        let mut opts = Map::new();
        if let Some(skip) = self.skip {
            opts.insert(protocol::KEY_SKIP.to_string(), json!(skip));
        }
        if let Some(limit) = self.limit {
            opts.insert(protocol::KEY_LIMIT.to_string(), json!(limit));
        }
        if let Some(flag) = self.include_similarity {
            opts.insert(protocol::KEY_INCLUDE_SIMILARITY.to_string(), json!(flag));
        }
        if let Some(flag) = self.include_sort_vector {
            opts.insert(protocol::KEY_INCLUDE_SORT_VECTOR.to_string(), json!(flag));
        }
        if let Some(state) = &self.page_state {
            opts.insert(protocol::KEY_PAGE_STATE.to_string(), json!(state));
        }
        if let Some(target) = &self.rerank_on {
            opts.insert(protocol::KEY_RERANK_ON.to_string(), json!(target));
        }
        if let Some(query) = &self.rerank_query {
            opts.insert(protocol::KEY_RERANK_QUERY.to_string(), json!(query));
        }
        if let Some(flag) = self.include_scores {
            opts.insert(protocol::KEY_INCLUDE_SCORES.to_string(), json!(flag));
        }
        if let Some(limits) = self.hybrid_limits {
            opts.insert(protocol::KEY_HYBRID_LIMITS.to_string(), limits.to_value());
        }
        if !opts.is_empty() {
            body.insert(protocol::KEY_OPTIONS.to_string(), Value::Object(opts));
        }

        let mut payload = Map::new();
        payload.insert(command.to_string(), Value::Object(body));
        Value::Object(payload)
    }
}
