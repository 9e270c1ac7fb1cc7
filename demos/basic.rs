//! Basic example demonstrating HazelDB Rust SDK usage.

use hazeldb::{and, field, Database, HybridLimits, Projection, Sort};
use serde_json::Value;

#[tokio::main]
async fn main() -> hazeldb::Result<()> {
  // Connect to a Data API endpoint
  let db = Database::connect("https://db.example.com/api/json/v1", "app", "hzl_token");
  let products = db.collection("products");

  // Filtered, sorted, projected find with paging handled by the cursor
  let cheap_in_stock = and(vec![
    field("price")?.lte(25),
    field("stock.count")?.gt(0),
  ]);

  let mut cursor = products
    .find::<Value>()
    .filter(cheap_in_stock)
    .sort(Sort::new().ascending(field("price")?))
    .project(Projection::new().include(field("name")?)?.include(field("price")?)?)
    .limit(100)
    .run();

  while let Some(product) = cursor.next().await? {
    println!("{product}");
  }

  // Vector similarity search, asking for the sort vector back
  let mut similar = products
    .find::<Value>()
    .sort(Sort::new().vectorize("sturdy travel mug"))
    .include_similarity(true)
    .include_sort_vector(true)
    .limit(5)
    .run();

  while let Some(product) = similar.next().await? {
    println!("similar: {product}");
  }
  println!("sort vector: {:?}", similar.sort_vector()?);

  // Hybrid lexical + vector query, reranked server-side
  let reranked = products
    .find_and_rerank::<Value>()
    .sort(Sort::new().hybrid("insulated mug"))
    .rerank_on("description")
    .hybrid_limits(HybridLimits::PerBranch { vector: 50, lexical: 20 })
    .include_scores(true)
    .limit(10)
    .run()
    .await?;

  for result in &reranked {
    println!("{} scores={:?}", result.document, result.scores()?);
  }

  Ok(())
}
