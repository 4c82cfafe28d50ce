//! # scrubber-search
//!
//! Search-engine result scraping and reranking, with no API keys.
//!
//! A query is sent to several public search engines, every result page is
//! reduced to a clean list of candidate URLs, and the candidates are
//! reranked by a composite of BM25 relevance and URL-structure signals
//! before any of them is fetched in full.
//!
//! ## Design
//!
//! - Engines are a closed enum with a table of query templates and CSS
//!   extraction rules, falling back to every link on the page
//! - Hrefs go through one sanitation pipeline: wrapper links, case
//!   variants and non-web URLs are dropped, the rest sorted and deduplicated
//! - All page fetches go through one fetch context: a dedicated thread that
//!   owns the [`PageFetcher`], fed over a channel
//! - Each fetch runs a retry/timeout/cancellation state machine that
//!   delivers exactly one outcome
//! - Merged snippets are cached in memory with a configurable TTL
//!
//! ## Security
//!
//! - No API keys or secrets to leak
//! - No network listeners: this is a library, not a server
//! - Search queries are logged only at trace level

pub mod cache;
pub mod config;
pub mod content;
pub mod engine;
pub mod engines;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod rank;
pub mod sanitize;
pub mod types;

pub use config::SearchConfig;
pub use content::extract_document;
pub use engine::{EngineProfile, ExtractionRule, ItemScope};
pub use error::{Result, SearchError};
pub use http::HttpFetcher;
pub use orchestrator::{CrawlOrchestrator, FetchHandle, PageFetcher};
pub use rank::{rank, RerankOptions};
pub use sanitize::{sanitize_hrefs, CaseVariantPolicy};
pub use types::{BoostedSearchSnippet, Document, ScrubResult, SearchEngine, SearchSnippet};

/// Search the web through `crawler`, returning ranked snippets.
///
/// Queries every engine enabled in `config`, merges the candidates, ranks
/// them and returns at most `config.max_results`. A blank query returns an
/// empty list without touching the network.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` is invalid. Engines that
/// fail or time out are not errors; they just contribute no results.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> scrubber_search::Result<()> {
/// use scrubber_search::{CrawlOrchestrator, FetchHandle, SearchConfig};
///
/// let config = SearchConfig::default();
/// let crawler = CrawlOrchestrator::from_config(FetchHandle::spawn_http(&config)?, &config);
/// for result in scrubber_search::search("rust ownership", &config, &crawler).await? {
///     println!("{:.3} {}", result.final_score, result.url());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(
    query: &str,
    config: &SearchConfig,
    crawler: &CrawlOrchestrator,
) -> Result<Vec<BoostedSearchSnippet>> {
    config.validate()?;
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }
    orchestrator::search::orchestrate_search(query, config, crawler).await
}

/// Search with [`SearchConfig::default()`] over a fresh HTTP fetch context.
///
/// # Errors
///
/// Same as [`search`], plus [`SearchError::Http`] or
/// [`SearchError::Runtime`] if the fetch context cannot be started.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> scrubber_search::Result<()> {
/// let results = scrubber_search::search_default("weather today").await?;
/// for result in &results {
///     println!("{}", result.url());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search_default(query: &str) -> Result<Vec<BoostedSearchSnippet>> {
    let config = SearchConfig::default();
    let crawler = CrawlOrchestrator::from_config(FetchHandle::spawn_http(&config)?, &config);
    search(query, &config, &crawler).await
}
