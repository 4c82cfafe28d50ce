//! Search pipeline: concurrent multi-engine fan-out, merge, cache, rank.
//!
//! For every enabled engine the query URL is built and fetched through the
//! crawl orchestrator; each result page is parsed into snippets. Snippets
//! from all engines are merged by URL, cached, ranked and truncated.

use futures::future::join_all;

use super::crawl::CrawlOrchestrator;
use super::merge::merge_snippets;
use crate::cache::{self, CacheKey};
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::rank::rank;
use crate::types::{BoostedSearchSnippet, SearchEngine, SearchSnippet};

/// Run the whole pipeline for `query`.
///
/// # Pipeline
///
/// 1. Look up merged snippets in the cache (when `cache_ttl_seconds > 0`)
/// 2. Otherwise fan out to every enabled engine with [`join_all`]
/// 3. Merge snippets across engines by URL and cache them if any were found
/// 4. Rank with [`SearchConfig::rerank_options_for`]
/// 5. Truncate to `config.max_results`
///
/// An engine whose page cannot be fetched or parsed contributes nothing.
/// If no engine contributes, the result is an empty list, not an error.
///
/// # Errors
///
/// Returns [`SearchError::Config`] when `config` is invalid.
pub async fn orchestrate_search(
    query: &str,
    config: &SearchConfig,
    crawler: &CrawlOrchestrator,
) -> Result<Vec<BoostedSearchSnippet>, SearchError> {
    config.validate()?;
    tracing::trace!(query, "search requested");

    let snippets = cached_or_collect(query, config, crawler).await;
    let options = config.rerank_options_for(query);
    let mut ranked = rank(&snippets, &options);
    ranked.truncate(config.max_results);

    tracing::debug!(
        candidates = snippets.len(),
        returned = ranked.len(),
        "search ranked"
    );
    Ok(ranked)
}

/// Fetch every enabled engine's result page and merge the snippets,
/// without caching or ranking.
pub async fn collect_snippets(
    query: &str,
    config: &SearchConfig,
    crawler: &CrawlOrchestrator,
) -> Vec<SearchSnippet> {
    let engines = config.enabled_engines();
    let pages = engines
        .iter()
        .map(|engine| query_engine(*engine, query, crawler));
    let per_engine = join_all(pages).await;
    merge_snippets(per_engine.into_iter().flatten())
}

async fn cached_or_collect(
    query: &str,
    config: &SearchConfig,
    crawler: &CrawlOrchestrator,
) -> Vec<SearchSnippet> {
    let ttl = config.cache_ttl_seconds;
    if ttl == 0 {
        return collect_snippets(query, config, crawler).await;
    }

    let key = CacheKey::new(query, &config.enabled_engines());
    if let Some(hit) = cache::get(&key, ttl).await {
        tracing::debug!(count = hit.len(), "snippet cache hit");
        return hit;
    }

    let snippets = collect_snippets(query, config, crawler).await;
    if !snippets.is_empty() {
        cache::insert(key, snippets.clone(), ttl).await;
    }
    snippets
}

async fn query_engine(
    engine: SearchEngine,
    query: &str,
    crawler: &CrawlOrchestrator,
) -> Vec<SearchSnippet> {
    let Some(url) = engine.build_query(query) else {
        tracing::warn!(%engine, "could not build result page URL");
        return Vec::new();
    };

    match crawler.scrub(url).await {
        Some(page) => {
            tracing::trace!(%engine, bytes = page.html.len(), "result page fetched");
            let snippets = engine.extract_snippets(&page.html);
            tracing::debug!(%engine, count = snippets.len(), "engine returned snippets");
            snippets
        }
        None => {
            tracing::debug!(%engine, "no result page");
            Vec::new()
        }
    }
}
