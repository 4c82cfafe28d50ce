//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] controls which engines are queried, the retry and
//! timeout policy for each result-page fetch, caching and ranking. Every
//! field has a default, so a partial TOML or JSON document deserializes.

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::rank::RerankOptions;
use crate::types::SearchEngine;

/// Configuration for a web search operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Engines never queried. Empty means every engine is enabled.
    pub disabled_engines: Vec<SearchEngine>,
    /// Maximum number of ranked results returned.
    pub max_results: usize,
    /// Fetch attempts per result page. A fast empty page consumes one.
    pub retry: u32,
    /// Wait per attempt in seconds. Running out abandons that page.
    pub timeout_seconds: u64,
    /// How long merged snippets stay cached. 0 disables caching.
    pub cache_ttl_seconds: u64,
    /// Custom User-Agent string. If `None`, rotates through a built-in list
    /// of realistic browser User-Agents.
    pub user_agent: Option<String>,
    /// Use the query itself as the BM25 question when `rerank.question` is
    /// not set.
    pub bm25_rerank: bool,
    /// Reranker tuning.
    pub rerank: RerankOptions,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            disabled_engines: Vec::new(),
            max_results: 20,
            retry: 3,
            timeout_seconds: 8,
            cache_ttl_seconds: 600,
            user_agent: None,
            bm25_rerank: true,
            rerank: RerankOptions::default(),
        }
    }
}

impl SearchConfig {
    /// Engines to query, in declaration order.
    pub fn enabled_engines(&self) -> Vec<SearchEngine> {
        SearchEngine::all()
            .iter()
            .copied()
            .filter(|engine| !self.disabled_engines.contains(engine))
            .collect()
    }

    /// Whether `engine` may be queried.
    pub fn is_enabled(&self, engine: SearchEngine) -> bool {
        !self.disabled_engines.contains(&engine)
    }

    /// Rerank options for `query`, filling in the question when
    /// `bm25_rerank` is on and none was configured.
    pub fn rerank_options_for(&self, query: &str) -> RerankOptions {
        let mut options = self.rerank.clone();
        if self.bm25_rerank && options.question.is_none() {
            let query = query.trim();
            if !query.is_empty() {
                options.question = Some(query.to_owned());
            }
        }
        options
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `max_results` must be greater than 0
    /// - `timeout_seconds` must be greater than 0
    /// - at least one engine must stay enabled
    /// - `rerank.min_boost` must be <= `rerank.max_boost`
    /// - `rerank.keep_k_per_hostname`, when set, must be greater than 0
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_results == 0 {
            return Err(SearchError::Config(
                "max_results must be greater than 0".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.enabled_engines().is_empty() {
            return Err(SearchError::Config(
                "at least one engine must be enabled".into(),
            ));
        }
        if self.rerank.min_boost > self.rerank.max_boost {
            return Err(SearchError::Config(
                "rerank min_boost must be <= max_boost".into(),
            ));
        }
        if self.rerank.keep_k_per_hostname == Some(0) {
            return Err(SearchError::Config(
                "rerank keep_k_per_hostname must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
