//! Search orchestration: fetch context, crawl rounds and the search pipeline.
//!
//! [`fetch_context`] owns the page fetcher on its own thread,
//! [`crawl`] runs retry/timeout/cancellation for one page, and [`search`]
//! fans a query out over all enabled engines, merges and ranks the results.

pub mod crawl;
mod delivery;
pub mod fetch_context;
pub mod merge;
pub mod search;

pub use crawl::CrawlOrchestrator;
pub use fetch_context::{is_fetch_context, FetchHandle, PageFetcher};
