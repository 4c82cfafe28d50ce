//! Process-wide TTL cache of merged search snippets.
//!
//! Holds the merged, *unranked* snippets for a query so that ranking with
//! different options never needs another round of result-page fetches.
//! Keyed by the normalised query and the set of engines that were asked.
//! Backed by [`moka`] for async-friendly eviction.

use std::sync::OnceLock;
use std::time::Duration;

use moka::future::Cache;

use crate::types::{SearchEngine, SearchSnippet};

/// Maximum number of cached snippet sets.
const MAX_CACHE_ENTRIES: u64 = 100;

/// Lazily initialised on first access. The TTL of the first caller sticks.
static CACHE: OnceLock<Cache<CacheKey, Vec<SearchSnippet>>> = OnceLock::new();

/// Normalised query plus the sorted, deduplicated engine set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    query: String,
    engines: Vec<SearchEngine>,
}

impl CacheKey {
    /// Build a key. The query is trimmed and lowercased; engine order and
    /// repeats do not matter.
    pub fn new(query: &str, engines: &[SearchEngine]) -> Self {
        let mut engines = engines.to_vec();
        engines.sort();
        engines.dedup();
        Self {
            query: query.trim().to_lowercase(),
            engines,
        }
    }
}

fn get_or_init_cache(ttl_seconds: u64) -> &'static Cache<CacheKey, Vec<SearchSnippet>> {
    CACHE.get_or_init(|| {
        Cache::builder()
            .max_capacity(MAX_CACHE_ENTRIES)
            .time_to_live(Duration::from_secs(ttl_seconds))
            .build()
    })
}

/// Cached snippets for `key`, if any.
pub async fn get(key: &CacheKey, ttl_seconds: u64) -> Option<Vec<SearchSnippet>> {
    get_or_init_cache(ttl_seconds).get(key).await
}

/// Store `snippets` under `key`.
pub async fn insert(key: CacheKey, snippets: Vec<SearchSnippet>, ttl_seconds: u64) {
    get_or_init_cache(ttl_seconds).insert(key, snippets).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn snippet(raw: &str) -> SearchSnippet {
        SearchSnippet::new(SearchEngine::Google, Url::parse(raw).expect("valid test URL"))
    }

    #[test]
    fn key_ignores_engine_order_and_repeats() {
        let a = CacheKey::new("rust", &[SearchEngine::Google, SearchEngine::Bing]);
        let b = CacheKey::new(
            "rust",
            &[SearchEngine::Bing, SearchEngine::Google, SearchEngine::Bing],
        );
        assert_eq!(a, b);
    }

    #[test]
    fn key_differs_by_engine_set() {
        let a = CacheKey::new("rust", &[SearchEngine::Google]);
        let b = CacheKey::new("rust", &[SearchEngine::Google, SearchEngine::Yahoo]);
        assert_ne!(a, b);
    }

    #[test]
    fn key_normalises_query() {
        let a = CacheKey::new("  RUST Programming ", &[SearchEngine::Google]);
        let b = CacheKey::new("rust programming", &[SearchEngine::Google]);
        assert_eq!(a, b);
        assert_ne!(a, CacheKey::new("python", &[SearchEngine::Google]));
    }

    #[tokio::test]
    async fn miss_returns_none() {
        let key = CacheKey::new("cache_test_miss_xyz", &[SearchEngine::DuckDuckGo]);
        assert!(get(&key, 600).await.is_none());
    }

    #[tokio::test]
    async fn insert_then_get_and_overwrite() {
        let key = CacheKey::new("cache_test_roundtrip", &[SearchEngine::Yahoo]);

        insert(key.clone(), vec![snippet("https://old.com/")], 600).await;
        insert(key.clone(), vec![snippet("https://new.com/")], 600).await;

        let cached = get(&key, 600).await.expect("should be cached");
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].url.as_str(), "https://new.com/");
    }
}
