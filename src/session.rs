//! Search sessions: rank results, then capture the best pages as documents.
//!
//! A [`Scrubber`] owns one crawl orchestrator (and therefore one fetch
//! context) for its lifetime. Search-engine pages and result pages go
//! through the same orchestrator, so cancelling the session stops both.

use futures_util::stream::{self, StreamExt};
use scrubber_search::content::extract_document_with_limit;
use scrubber_search::{
    BoostedSearchSnippet, CrawlOrchestrator, Document, FetchHandle, SearchConfig,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::config::{DocumentConfig, ScrubberConfig};
use crate::error::Result;

/// Everything one query produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// The query as given.
    pub query: String,
    /// Ranked results, best first.
    pub results: Vec<BoostedSearchSnippet>,
    /// Documents captured from the top results, in rank order. Pages that
    /// failed to load or had no readable text are absent.
    pub documents: Vec<Document>,
}

impl Report {
    /// Document captured for `result`, if any.
    pub fn document_for(&self, result: &BoostedSearchSnippet) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.url == *result.url())
    }
}

/// A search session bound to one crawl orchestrator.
#[derive(Debug, Clone)]
pub struct Scrubber {
    config: ScrubberConfig,
    crawler: CrawlOrchestrator,
}

impl Scrubber {
    /// Validate `config` and start a session over the HTTP fetcher.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or the fetch context cannot
    /// be started.
    pub fn new(config: ScrubberConfig) -> Result<Self> {
        config.validate()?;
        let handle = FetchHandle::spawn_http(&config.search)?;
        let crawler = CrawlOrchestrator::from_config(handle, &config.search);
        Ok(Self { config, crawler })
    }

    /// Start a session over an existing orchestrator.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid.
    pub fn with_crawler(config: ScrubberConfig, crawler: CrawlOrchestrator) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, crawler })
    }

    pub fn config(&self) -> &ScrubberConfig {
        &self.config
    }

    pub fn search_config(&self) -> &SearchConfig {
        &self.config.search
    }

    pub fn crawler(&self) -> &CrawlOrchestrator {
        &self.crawler
    }

    /// Token that cancels every fetch this session has not started yet.
    pub fn cancel_token(&self) -> &CancellationToken {
        self.crawler.cancel_token()
    }

    pub fn cancel(&self) {
        self.crawler.cancel();
    }

    /// Rank results for `query` without capturing any documents.
    ///
    /// # Errors
    ///
    /// Returns an error only for an invalid search configuration.
    pub async fn search(&self, query: &str) -> Result<Vec<BoostedSearchSnippet>> {
        Ok(scrubber_search::search(query, &self.config.search, &self.crawler).await?)
    }

    /// Search, then capture documents for the top results.
    ///
    /// # Errors
    ///
    /// Returns an error only for an invalid search configuration.
    pub async fn run(&self, query: &str) -> Result<Report> {
        let results = self.search(query).await?;
        let documents = self.capture_documents(&results).await;
        tracing::info!(
            results = results.len(),
            documents = documents.len(),
            "search session complete"
        );
        Ok(Report {
            query: query.to_owned(),
            results,
            documents,
        })
    }

    /// Fetch the first `documents.fetch_top` results and extract readable
    /// documents from them, keeping rank order.
    pub async fn capture_documents(&self, results: &[BoostedSearchSnippet]) -> Vec<Document> {
        let DocumentConfig {
            fetch_top,
            concurrency,
            max_chars,
        } = self.config.documents;
        if fetch_top == 0 || self.crawler.is_cancelled() {
            return Vec::new();
        }

        stream::iter(results.iter().take(fetch_top))
            .map(|result| self.capture(result, max_chars))
            .buffered(concurrency.max(1))
            .filter_map(|doc| async move { doc })
            .collect()
            .await
    }

    async fn capture(&self, result: &BoostedSearchSnippet, max_chars: usize) -> Option<Document> {
        let page = self.crawler.scrub(result.url().clone()).await?;
        let document = extract_document_with_limit(
            &page.html,
            &page.final_url,
            Some(result.snippet.engine),
            max_chars,
        );
        if document.is_none() {
            tracing::debug!(bytes = page.html.len(), "page had no readable text");
        }
        document
    }
}
