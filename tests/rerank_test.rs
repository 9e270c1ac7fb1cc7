//! HazelDB Rust SDK - Rerank query tests

use async_trait::async_trait;
use hazeldb::protocol::{ApiResponse, ResponseData};
use hazeldb::{CommandExecutor, Database, Error, HybridLimits, Result, Sort};
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Returns one canned rerank response and records every payload it sees.
struct RerankExecutor {
    response: ApiResponse,
    payloads: Mutex<Vec<Value>>,
    calls: AtomicUsize,
}

impl RerankExecutor {
    fn new(response: ApiResponse) -> Self {
        Self {
            response,
            payloads: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    fn respond(&self, payload: Value) -> ApiResponse {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().unwrap().push(payload);
        self.response.clone()
    }
}

#[async_trait]
impl CommandExecutor for RerankExecutor {
    async fn execute(&self, _collection: &str, payload: Value) -> Result<ApiResponse> {
        Ok(self.respond(payload))
    }

    fn execute_blocking(&self, _collection: &str, payload: Value) -> Result<ApiResponse> {
        Ok(self.respond(payload))
    }
}

fn scored_response(doc_count: usize, score_count: usize) -> ApiResponse {
    let documents = (0..doc_count).map(|i| json!({"rank": i})).collect();
    let scores: Vec<Value> = (0..score_count)
        .map(|i| json!({"$rerank": 1.0 - i as f64 / 10.0, "$vector": 0.5}))
        .collect();
    let mut status = Map::new();
    status.insert("rerankScores".to_string(), json!(scores));
    ApiResponse {
        data: Some(ResponseData {
            documents,
            next_page_state: None,
        }),
        status: Some(status),
        errors: vec![],
    }
}

#[tokio::test]
async fn test_positional_zip() {
    let executor = Arc::new(RerankExecutor::new(scored_response(3, 3)));
    let db = Database::with_executor(executor.clone());

    let results = db
        .collection("products")
        .find_and_rerank::<Value>()
        .sort(Sort::new().hybrid("mug"))
        .include_scores(true)
        .run()
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    for (i, result) in results.iter().enumerate() {
        // document[i] pairs with score[i], by position.
        assert_eq!(result.document["rank"], json!(i));
        let scores = result.scores().unwrap();
        assert_eq!(scores["$rerank"], json!(1.0 - i as f64 / 10.0));
    }
    assert_eq!(executor.calls.load(Ordering::SeqCst), 1, "rerank is single-shot");
}

#[tokio::test]
async fn test_mismatched_score_count_is_contract_violation() {
    let executor = Arc::new(RerankExecutor::new(scored_response(3, 2)));
    let db = Database::with_executor(executor);

    let err = db
        .collection("products")
        .find_and_rerank::<Value>()
        .include_scores(true)
        .run()
        .await
        .unwrap_err();

    match err {
        Error::Protocol(msg) => {
            assert!(msg.contains("3 documents"));
            assert!(msg.contains("2 score entries"));
        }
        other => panic!("expected protocol error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_scores_without_include_flag_is_usage_error() {
    let executor = Arc::new(RerankExecutor::new(scored_response(2, 2)));
    let db = Database::with_executor(executor);

    let results = db
        .collection("products")
        .find_and_rerank::<Value>()
        .run()
        .await
        .unwrap();

    assert!(matches!(
        results[0].scores(),
        Err(Error::MetadataNotRequested { .. })
    ));
}

#[tokio::test]
async fn test_requested_scores_missing_from_response() {
    let mut response = scored_response(2, 2);
    response.status = None;
    let executor = Arc::new(RerankExecutor::new(response));
    let db = Database::with_executor(executor);

    let err = db
        .collection("products")
        .find_and_rerank::<Value>()
        .include_scores(true)
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Protocol(_)));
}

#[tokio::test]
async fn test_rerank_payload_keys() {
    let executor = Arc::new(RerankExecutor::new(scored_response(0, 0)));
    let db = Database::with_executor(executor.clone());

    db.collection("products")
        .find_and_rerank::<Value>()
        .sort(Sort::new().hybrid_split("vector query", "lexical query"))
        .rerank_on("description")
        .rerank_query("rerank query")
        .hybrid_limits(HybridLimits::PerBranch {
            vector: 50,
            lexical: 20,
        })
        .include_scores(true)
        .limit(10)
        .run()
        .await
        .unwrap();

    let payloads = executor.payloads.lock().unwrap();
    let body = &payloads[0]["findAndRerank"];
    assert_eq!(
        body["sort"],
        json!({"$hybrid": {"$vectorize": "vector query", "$lexical": "lexical query"}})
    );
    assert_eq!(body["options"]["rerankOn"], json!("description"));
    assert_eq!(body["options"]["rerankQuery"], json!("rerank query"));
    assert_eq!(
        body["options"]["hybridLimits"],
        json!({"$vector": 50, "$lexical": 20})
    );
    assert_eq!(body["options"]["includeScores"], json!(true));
    assert_eq!(body["options"]["limit"], json!(10));
}

#[test]
fn test_blocking_run_matches_async() {
    let executor = Arc::new(RerankExecutor::new(scored_response(2, 2)));
    let db = Database::with_executor(executor);

    let results = db
        .collection("products")
        .find_and_rerank::<Value>()
        .include_scores(true)
        .run_blocking()
        .unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[1].scores().is_ok());
}
