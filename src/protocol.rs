//! Wire vocabulary and response envelope for the HazelDB Data API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Comparison operator tags.
pub const OP_EQ: &str = "$eq";
pub const OP_NE: &str = "$ne";
pub const OP_GT: &str = "$gt";
pub const OP_GTE: &str = "$gte";
pub const OP_LT: &str = "$lt";
pub const OP_LTE: &str = "$lte";
pub const OP_IN: &str = "$in";
pub const OP_NIN: &str = "$nin";
pub const OP_EXISTS: &str = "$exists";
pub const OP_ALL: &str = "$all";
pub const OP_SIZE: &str = "$size";
pub const OP_CONTAINS: &str = "$contains";
pub const OP_CONTAINS_KEY: &str = "$containsKey";
pub const OP_CONTAINS_ENTRY: &str = "$containsEntry";

/// Logical combinator tags.
pub const OP_AND: &str = "$and";
pub const OP_OR: &str = "$or";
pub const OP_NOT: &str = "$not";

/// Top-level payload keys.
pub const KEY_FILTER: &str = "filter";
pub const KEY_SORT: &str = "sort";
pub const KEY_PROJECTION: &str = "projection";
pub const KEY_OPTIONS: &str = "options";

/// Nested option keys.
pub const KEY_SKIP: &str = "skip";
pub const KEY_LIMIT: &str = "limit";
pub const KEY_INCLUDE_SIMILARITY: &str = "includeSimilarity";
pub const KEY_INCLUDE_SORT_VECTOR: &str = "includeSortVector";
pub const KEY_PAGE_STATE: &str = "pageState";

/// Rerank option keys.
pub const KEY_RERANK_ON: &str = "rerankOn";
pub const KEY_RERANK_QUERY: &str = "rerankQuery";
pub const KEY_INCLUDE_SCORES: &str = "includeScores";
pub const KEY_HYBRID_LIMITS: &str = "hybridLimits";

/// Command names.
pub const CMD_FIND: &str = "find";
pub const CMD_FIND_AND_RERANK: &str = "findAndRerank";

/// Special sort/field markers.
pub const FIELD_ID: &str = "_id";
pub const FIELD_VECTOR: &str = "$vector";
pub const FIELD_VECTORIZE: &str = "$vectorize";
pub const FIELD_LEXICAL: &str = "$lexical";
pub const FIELD_HYBRID: &str = "$hybrid";
pub const FIELD_SIMILARITY: &str = "$similarity";
pub const FIELD_SORT_VECTOR: &str = "$sortVector";

/// Pseudo-fields a projection may only touch through the special-field methods.
pub const SPECIAL_PROJECTION_FIELDS: &[&str] = &[
  FIELD_ID,
  FIELD_SIMILARITY,
  FIELD_SORT_VECTOR,
  FIELD_LEXICAL,
  FIELD_VECTORIZE,
];

/// Opaque document identifier, serialized in its canonical string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(Uuid);

impl DocumentId {
  pub fn new() -> Self {
    Self(Uuid::new_v4())
  }

  pub fn from_uuid(id: Uuid) -> Self {
    Self(id)
  }
}

impl Default for DocumentId {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Display for DocumentId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl Serialize for DocumentId {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.0.to_string())
  }
}

impl<'de> Deserialize<'de> for DocumentId {
  fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let s = String::deserialize(deserializer)?;
    Uuid::parse_str(&s)
      .map(DocumentId)
      .map_err(serde::de::Error::custom)
  }
}

impl From<DocumentId> for Value {
  fn from(id: DocumentId) -> Value {
    Value::String(id.to_string())
  }
}

/// One page of results plus continuation state.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ResponseData {
  #[serde(default)]
  pub documents: Vec<Value>,
  #[serde(rename = "nextPageState", skip_serializing_if = "Option::is_none")]
  pub next_page_state: Option<String>,
}

/// Server-reported command failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
  pub message: String,
  #[serde(rename = "errorCode", skip_serializing_if = "Option::is_none")]
  pub error_code: Option<String>,
}

/// Response envelope returned by the command executor.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiResponse {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data: Option<ResponseData>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status: Option<Map<String, Value>>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub errors: Vec<ApiError>,
}

impl ApiResponse {
  /// Sort vector echoed back by the server on a first-page fetch.
  pub fn sort_vector(&self) -> Option<Vec<f32>> {
    let status = self.status.as_ref()?;
    let values = status.get("sortVector")?.as_array()?;
    values
      .iter()
      .map(|v| v.as_f64().map(|f| f as f32))
      .collect()
  }

  /// Per-result score maps for a rerank response, in result order.
  pub fn rerank_scores(&self) -> Option<Vec<Map<String, Value>>> {
    let status = self.status.as_ref()?;
    let values = status.get("rerankScores")?.as_array()?;
    values
      .iter()
      .map(|v| v.as_object().cloned())
      .collect()
  }
}
