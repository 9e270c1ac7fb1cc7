//! HazelDB Rust SDK - Cursor and paging engine tests

use async_trait::async_trait;
use futures::StreamExt;
use hazeldb::protocol::{ApiResponse, ResponseData};
use hazeldb::{field, CommandExecutor, Database, Error, FindCursor, Page, PageFetcher, Result};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Replays a fixed page script, asserting the continuation token the cursor
/// hands back matches what the previous page announced.
struct ScriptedFetcher {
    script: VecDeque<(Option<&'static str>, Page<i32>)>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedFetcher {
    fn new(script: Vec<(Option<&'static str>, Page<i32>)>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                script: script.into(),
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }

    fn serve(&mut self, page_state: Option<&str>) -> Result<Page<i32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (expected_state, page) = self
            .script
            .pop_front()
            .expect("cursor fetched past the end of the script");
        assert_eq!(page_state, expected_state, "unexpected continuation token");
        Ok(page)
    }
}

#[async_trait]
impl PageFetcher<i32> for ScriptedFetcher {
    async fn fetch(&mut self, page_state: Option<&str>) -> Result<Page<i32>> {
        self.serve(page_state)
    }

    fn fetch_blocking(&mut self, page_state: Option<&str>) -> Result<Page<i32>> {
        self.serve(page_state)
    }
}

fn page(results: Vec<i32>, next: Option<&str>) -> Page<i32> {
    Page {
        results,
        next_page_state: next.map(str::to_string),
        sort_vector: None,
    }
}

fn three_pages_then_empty() -> Vec<(Option<&'static str>, Page<i32>)> {
    vec![
        (None, page(vec![1, 2], Some("s1"))),
        (Some("s1"), page(vec![3, 4], Some("s2"))),
        (Some("s2"), page(vec![5], Some("s3"))),
        (Some("s3"), page(vec![], None)),
    ]
}

#[tokio::test]
async fn test_async_enumeration_terminates_on_null_token() {
    let (fetcher, calls) = ScriptedFetcher::new(three_pages_then_empty());
    let mut cursor = FindCursor::new(Box::new(fetcher), false);

    let mut seen = Vec::new();
    while let Some(item) = cursor.next().await.unwrap() {
        seen.push(item);
    }

    assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert!(cursor.exhausted());

    // Exhausted cursors answer without calling the fetcher again.
    assert!(cursor.next().await.unwrap().is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[test]
fn test_blocking_enumeration_matches_async() {
    let (fetcher, calls) = ScriptedFetcher::new(three_pages_then_empty());
    let mut cursor = FindCursor::new(Box::new(fetcher), false);

    let mut seen = Vec::new();
    while let Some(item) = cursor.next_blocking().unwrap() {
        seen.push(item);
    }

    assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[test]
fn test_final_page_may_carry_data() {
    // A page with results and no token is the last one; no extra fetch.
    let (fetcher, calls) = ScriptedFetcher::new(vec![
        (None, page(vec![1, 2], Some("s1"))),
        (Some("s1"), page(vec![3], None)),
    ]);
    let cursor = FindCursor::new(Box::new(fetcher), false);

    let seen = cursor.collect_blocking().unwrap();
    assert_eq!(seen, vec![1, 2, 3]);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_empty_intermediate_page_is_skipped() {
    let (fetcher, _) = ScriptedFetcher::new(vec![
        (None, page(vec![], Some("s1"))),
        (Some("s1"), page(vec![7], None)),
    ]);
    let mut cursor = FindCursor::new(Box::new(fetcher), false);
    assert_eq!(cursor.next_blocking().unwrap(), Some(7));
    assert_eq!(cursor.next_blocking().unwrap(), None);
}

#[tokio::test]
async fn test_stream_adapter() {
    let (fetcher, _) = ScriptedFetcher::new(three_pages_then_empty());
    let cursor = FindCursor::new(Box::new(fetcher), false);

    let items: Vec<i32> = cursor
        .into_stream()
        .map(|item| item.unwrap())
        .collect()
        .await;
    assert_eq!(items, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_blocking_iter_adapter() {
    let (fetcher, _) = ScriptedFetcher::new(three_pages_then_empty());
    let cursor = FindCursor::new(Box::new(fetcher), false);

    let items: Vec<i32> = cursor
        .into_blocking_iter()
        .map(|item| item.unwrap())
        .collect();
    assert_eq!(items, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_sort_vector_guards() {
    let script = vec![(
        None,
        Page {
            results: vec![1],
            next_page_state: None,
            sort_vector: Some(vec![0.1, 0.9]),
        },
    )];

    // Not requested: usage error regardless of cursor state.
    let (fetcher, _) = ScriptedFetcher::new(script.clone());
    let cursor = FindCursor::new(Box::new(fetcher), false);
    assert!(matches!(
        cursor.sort_vector(),
        Err(Error::MetadataNotRequested { .. })
    ));

    // Requested but not yet fetched: a distinct usage error.
    let (fetcher, _) = ScriptedFetcher::new(script);
    let mut cursor = FindCursor::new(Box::new(fetcher), true);
    assert!(matches!(cursor.sort_vector(), Err(Error::CursorNotStarted(_))));

    // After the first fetch the vector is available.
    cursor.next_blocking().unwrap();
    assert_eq!(cursor.sort_vector().unwrap(), Some(&[0.1, 0.9][..]));
}

#[test]
fn test_sort_vector_is_first_page_only() {
    let (fetcher, _) = ScriptedFetcher::new(vec![
        (
            None,
            Page {
                results: vec![1],
                next_page_state: Some("s1".to_string()),
                sort_vector: Some(vec![1.0]),
            },
        ),
        (
            Some("s1"),
            Page {
                results: vec![2],
                next_page_state: None,
                sort_vector: Some(vec![9.0]),
            },
        ),
    ]);
    let mut cursor = FindCursor::new(Box::new(fetcher), true);
    while cursor.next_blocking().unwrap().is_some() {}
    assert_eq!(cursor.sort_vector().unwrap(), Some(&[1.0][..]));
}

#[test]
fn test_fetch_error_propagates_and_fuses() {
    struct FailingFetcher {
        served: bool,
    }

    #[async_trait]
    impl PageFetcher<i32> for FailingFetcher {
        async fn fetch(&mut self, page_state: Option<&str>) -> Result<Page<i32>> {
            self.fetch_blocking(page_state)
        }

        fn fetch_blocking(&mut self, _page_state: Option<&str>) -> Result<Page<i32>> {
            if self.served {
                return Err(Error::Server("boom".to_string()));
            }
            self.served = true;
            Ok(page(vec![1], Some("s1")))
        }
    }

    let cursor = FindCursor::new(Box::new(FailingFetcher { served: false }), false);
    let mut iter = cursor.into_blocking_iter();
    assert_eq!(iter.next().unwrap().unwrap(), 1);
    assert!(matches!(iter.next(), Some(Err(Error::Server(_)))));
    assert!(iter.next().is_none(), "iterator must fuse after an error");
}

/// Serves `find` payloads keyed by the pageState they carry, recording the
/// order of observed tokens.
struct PagedExecutor {
    observed: Mutex<Vec<Option<String>>>,
}

impl PagedExecutor {
    fn respond(&self, payload: &Value) -> ApiResponse {
        let state = payload["find"]["options"]["pageState"]
            .as_str()
            .map(str::to_string);
        self.observed.lock().unwrap().push(state.clone());
        match state.as_deref() {
            None => ApiResponse {
                data: Some(ResponseData {
                    documents: vec![json!({"n": 1}), json!({"n": 2})],
                    next_page_state: Some("p1".to_string()),
                }),
                ..Default::default()
            },
            Some("p1") => ApiResponse {
                data: Some(ResponseData {
                    documents: vec![json!({"n": 3})],
                    next_page_state: None,
                }),
                ..Default::default()
            },
            other => panic!("unexpected page state {other:?}"),
        }
    }
}

#[async_trait]
impl CommandExecutor for PagedExecutor {
    async fn execute(&self, _collection: &str, payload: Value) -> Result<ApiResponse> {
        Ok(self.respond(&payload))
    }

    fn execute_blocking(&self, _collection: &str, payload: Value) -> Result<ApiResponse> {
        Ok(self.respond(&payload))
    }
}

#[tokio::test]
async fn test_find_query_pages_through_executor() {
    let executor = Arc::new(PagedExecutor {
        observed: Mutex::new(Vec::new()),
    });
    let db = Database::with_executor(executor.clone());
    let query = db
        .collection("things")
        .find::<Value>()
        .filter(field("n").unwrap().gte(0));

    let numbers: Vec<i64> = query
        .run()
        .collect()
        .await
        .unwrap()
        .iter()
        .map(|doc| doc["n"].as_i64().unwrap())
        .collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert_eq!(
        *executor.observed.lock().unwrap(),
        vec![None, Some("p1".to_string())]
    );
}

#[tokio::test]
async fn test_abandoned_cursor_leaves_fresh_runs_clean() {
    let executor = Arc::new(PagedExecutor {
        observed: Mutex::new(Vec::new()),
    });
    let db = Database::with_executor(executor.clone());
    let query = db.collection("things").find::<Value>();

    // Consume one element, then drop the cursor mid-page.
    {
        let mut cursor = query.run();
        assert!(cursor.next().await.unwrap().is_some());
    }

    // A fresh cursor from the same query starts paging from the beginning.
    let seen = query.run().collect().await.unwrap();
    assert_eq!(seen.len(), 3);
    let observed = executor.observed.lock().unwrap();
    assert_eq!(
        *observed,
        vec![None, None, Some("p1".to_string())],
        "second run must restart from a null page state"
    );
}

#[tokio::test]
async fn test_fluent_derivation_does_not_mutate_base() {
    let executor = Arc::new(PagedExecutor {
        observed: Mutex::new(Vec::new()),
    });
    let db = Database::with_executor(executor);
    let base = db.collection("things").find::<Value>();

    let limited = base.limit(1);
    let skipped = base.skip(2);

    assert_eq!(base.options().limit, None);
    assert_eq!(base.options().skip, None);
    assert_eq!(limited.options().limit, Some(1));
    assert_eq!(skipped.options().skip, Some(2));
}
