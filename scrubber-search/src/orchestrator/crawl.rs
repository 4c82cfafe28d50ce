//! Crawl orchestrator: retry, timeout and cancellation for one page fetch.
//!
//! Each call runs a small state machine over the shared fetch context:
//!
//! ```text
//! round = 0
//! while round < retry && !cancelled && !delivered:
//!     round += 1; submit one attempt; wait up to timeout
//!     timed out    → abandon the whole call, deliver None
//!     usable page  → deliver it, stop
//!     nothing      → next round
//! deliver None if nothing was delivered
//! ```
//!
//! Only a fast empty answer is retried. A timeout ends the call; the
//! abandoned attempt keeps running on the fetch context and its late
//! answer is discarded.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::delivery::Delivery;
use super::fetch_context::{is_fetch_context, FetchHandle};
use crate::config::SearchConfig;
use crate::types::ScrubResult;

/// Default attempts per call.
pub const DEFAULT_RETRY: u32 = 3;
/// Default wait per attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

/// Runs fetch calls against a [`FetchHandle`].
///
/// Clones share the fetch context and the cancellation token, so cancelling
/// any clone stops new rounds in all of them.
#[derive(Debug, Clone)]
pub struct CrawlOrchestrator {
    fetcher: FetchHandle,
    retry: u32,
    timeout: Duration,
    cancel: CancellationToken,
}

impl CrawlOrchestrator {
    /// Orchestrator with [`DEFAULT_RETRY`] and [`DEFAULT_TIMEOUT`].
    pub fn new(fetcher: FetchHandle) -> Self {
        Self {
            fetcher,
            retry: DEFAULT_RETRY,
            timeout: DEFAULT_TIMEOUT,
            cancel: CancellationToken::new(),
        }
    }

    /// Orchestrator using the retry and timeout from `config`.
    pub fn from_config(fetcher: FetchHandle, config: &SearchConfig) -> Self {
        Self::new(fetcher)
            .with_retry(config.retry)
            .with_timeout(Duration::from_secs(config.timeout_seconds))
    }

    #[must_use]
    pub fn with_retry(mut self, retry: u32) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Share an externally owned cancellation token.
    #[must_use]
    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Stop starting new rounds. Rounds already waiting finish normally.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn retry(&self) -> u32 {
        self.retry
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The fetch context this orchestrator submits to.
    pub fn fetcher(&self) -> &FetchHandle {
        &self.fetcher
    }

    /// Fetch `url` with the configured retry and timeout.
    pub async fn scrub(&self, url: Url) -> Option<ScrubResult> {
        self.scrub_with(url, self.retry, self.timeout).await
    }

    /// Fetch `url` with an explicit retry count and per-attempt timeout.
    ///
    /// # Panics
    ///
    /// Panics when awaited on the fetch context thread.
    pub async fn scrub_with(&self, url: Url, retry: u32, timeout: Duration) -> Option<ScrubResult> {
        let (result_tx, result_rx) = tokio::sync::oneshot::channel();
        let delivery = Delivery::new(move |result| {
            let _ = result_tx.send(result);
        });
        self.run_rounds(url, retry, timeout, &delivery).await;
        result_rx.await.ok().flatten()
    }

    /// Run a call in the background and hand its outcome to `on_complete`,
    /// exactly once, on the worker that ran it.
    ///
    /// Must be called from within a tokio runtime other than the fetch
    /// context.
    pub fn spawn_scrub<F>(
        &self,
        url: Url,
        retry: u32,
        timeout: Duration,
        on_complete: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(Option<ScrubResult>) + Send + 'static,
    {
        let this = self.clone();
        tokio::spawn(async move {
            let delivery = Delivery::new(on_complete);
            this.run_rounds(url, retry, timeout, &delivery).await;
        })
    }

    async fn run_rounds<F>(&self, url: Url, retry: u32, timeout: Duration, delivery: &Delivery<F>)
    where
        F: FnOnce(Option<ScrubResult>),
    {
        assert!(
            !is_fetch_context(),
            "crawl rounds must not be awaited on the fetch context"
        );

        let mut round = 0;
        while round < retry && !self.cancel.is_cancelled() && !delivery.is_delivered() {
            round += 1;
            let pending = self.fetcher.submit(url.clone());

            match tokio::time::timeout(timeout, pending).await {
                Err(_) => {
                    tracing::warn!(
                        round,
                        timeout_ms = timeout.as_millis() as u64,
                        "fetch attempt timed out, abandoning call"
                    );
                    delivery.deliver(None);
                }
                Ok(Ok(Some(result))) => {
                    tracing::debug!(round, bytes = result.html.len(), "fetch attempt succeeded");
                    delivery.deliver(Some(result));
                }
                Ok(Ok(None)) => {
                    tracing::debug!(round, "fetch attempt returned nothing usable");
                }
                Ok(Err(_)) => {
                    tracing::debug!(round, "fetch context dropped the attempt");
                }
            }
        }

        if self.cancel.is_cancelled() && !delivery.is_delivered() {
            tracing::debug!(round, "crawl cancelled");
        }
        delivery.deliver(None);
    }
}
