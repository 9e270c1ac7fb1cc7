//! HazelDB Rust Client SDK
//!
//! A client for the HazelDB Data API, a JSON-over-HTTP document/table
//! service. Queries are built from typed filter, sort and projection
//! expressions and compiled to the API's query-operator grammar; results
//! come back through a paging cursor usable from async and blocking code.
//!
//! # Example
//!
//! ```no_run
//! use hazeldb::{field, Database, Sort};
//!
//! #[tokio::main]
//! async fn main() -> hazeldb::Result<()> {
//!     let db = Database::connect("https://db.example.com/api/json/v1", "app", "token");
//!     let users = db.collection("users");
//!
//!     // Compose a filter with typed field paths
//!     let adults = field("age")?.gte(21) & field("active")?.eq(true);
//!
//!     let mut cursor = users
//!         .find::<serde_json::Value>()
//!         .filter(adults)
//!         .sort(Sort::new().descending(field("age")?))
//!         .limit(50)
//!         .run();
//!
//!     while let Some(user) = cursor.next().await? {
//!         println!("{user}");
//!     }
//!
//!     Ok(())
//! }
//! ```

mod command;
mod cursor;
mod db;
mod error;
mod filter;
mod find;
mod options;
mod path;
mod projection;
pub mod protocol;
mod rerank;
mod sort;

pub use command::{CommandExecutor, HttpCommandExecutor};
pub use cursor::{BlockingIter, FindCursor, Page, PageFetcher};
pub use db::{Collection, Database};
pub use error::{Error, Result};
pub use filter::{and, not, or, Filter, Operator};
pub use find::FindQuery;
pub use options::{FindOptions, HybridLimits};
pub use path::{field, FieldPath};
pub use projection::{Projection, Slice};
pub use protocol::{ApiError, ApiResponse, DocumentId, ResponseData};
pub use rerank::{RerankQuery, RerankedDocument};
pub use sort::{Sort, SortValue};
