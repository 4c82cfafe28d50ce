//! Relevance ranking: BM25 lexical scoring plus URL-structure boosts.

pub mod bm25;
pub mod rerank;

pub use bm25::Bm25Okapi;
pub use rerank::{rank, smart_merge_strings, RerankOptions};
