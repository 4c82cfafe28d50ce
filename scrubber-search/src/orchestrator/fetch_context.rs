//! The fetch context: one dedicated thread that owns the page fetcher.
//!
//! A [`PageFetcher`] may be slow, flaky and not `Send`. It is built on, and
//! never leaves, a named OS thread running a current-thread runtime with a
//! local task set. Callers hold a cheap, cloneable [`FetchHandle`] and
//! submit URLs over an unbounded channel; every answer comes back through a
//! oneshot, so waiting and continuations happen on the caller's task.
//!
//! ```text
//! caller task ──submit(url)──► [ channel ] ──► fetch context thread
//!      ▲                                          │ spawn_local(fetch)
//!      └──────────── oneshot reply ◄──────────────┘
//! ```

use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;

use tokio::sync::{mpsc, oneshot};
use url::Url;

use crate::error::SearchError;
use crate::types::ScrubResult;

/// Name of the thread that owns the fetcher.
pub const FETCH_THREAD_NAME: &str = "scrubber-fetch";

thread_local! {
    static ON_FETCH_CONTEXT: Cell<bool> = const { Cell::new(false) };
}

/// Something that can turn a URL into page HTML.
///
/// Implementations run only on the fetch context, so they are free to hold
/// `Rc`, `RefCell` or other thread-confined state. `None` means the page is
/// not usable: a failed request, a bad status or an empty body.
pub trait PageFetcher: 'static {
    /// Fetch `url`.
    fn fetch(&self, url: Url) -> impl Future<Output = Option<ScrubResult>>;
}

/// `true` when called from the fetch context thread.
pub fn is_fetch_context() -> bool {
    ON_FETCH_CONTEXT.with(Cell::get)
}

struct FetchRequest {
    url: Url,
    response_tx: oneshot::Sender<Option<ScrubResult>>,
}

/// Submission side of a fetch context.
///
/// Clones share the same context. The context thread exits once every
/// handle has been dropped and in-flight fetches have been abandoned.
#[derive(Debug, Clone)]
pub struct FetchHandle {
    request_tx: mpsc::UnboundedSender<FetchRequest>,
}

impl FetchHandle {
    /// Start a fetch context whose fetcher is built by `make` on the
    /// context thread itself.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Runtime`] if the runtime or the thread cannot
    /// be created.
    pub fn spawn<M, F>(make: M) -> Result<Self, SearchError>
    where
        M: FnOnce() -> F + Send + 'static,
        F: PageFetcher,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SearchError::Runtime(format!("failed to build fetch runtime: {e}")))?;

        let (request_tx, request_rx) = mpsc::unbounded_channel::<FetchRequest>();

        std::thread::Builder::new()
            .name(FETCH_THREAD_NAME.to_owned())
            .spawn(move || {
                ON_FETCH_CONTEXT.with(|flag| flag.set(true));
                let local = tokio::task::LocalSet::new();
                local.block_on(&runtime, serve(make(), request_rx));
                tracing::debug!("fetch context stopped");
            })
            .map_err(|e| SearchError::Runtime(format!("failed to spawn fetch thread: {e}")))?;

        Ok(Self { request_tx })
    }

    /// Queue a fetch of `url` and return the receiver for its answer.
    ///
    /// Dropping the receiver abandons the answer but not the fetch. If the
    /// context has stopped, the receiver resolves to an error immediately.
    pub fn submit(&self, url: Url) -> oneshot::Receiver<Option<ScrubResult>> {
        let (response_tx, response_rx) = oneshot::channel();
        if self
            .request_tx
            .send(FetchRequest { url, response_tx })
            .is_err()
        {
            tracing::error!("fetch context is gone, request dropped");
        }
        response_rx
    }

    /// Submit `url` and wait for the answer. A stopped context reads as
    /// `None`.
    pub async fn fetch(&self, url: Url) -> Option<ScrubResult> {
        self.submit(url).await.ok().flatten()
    }

    /// `true` once the context thread has stopped accepting requests.
    pub fn is_closed(&self) -> bool {
        self.request_tx.is_closed()
    }
}

async fn serve<F: PageFetcher>(fetcher: F, mut request_rx: mpsc::UnboundedReceiver<FetchRequest>) {
    let fetcher = Rc::new(fetcher);
    while let Some(FetchRequest { url, response_tx }) = request_rx.recv().await {
        let fetcher = Rc::clone(&fetcher);
        tokio::task::spawn_local(async move {
            tracing::trace!(%url, "fetching");
            let result = fetcher.fetch(url).await;
            // The caller may have timed out and gone away.
            let _ = response_tx.send(result);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::sync::{Arc, Mutex};
    use std::thread::ThreadId;

    struct Recording {
        calls: Arc<Mutex<Vec<(ThreadId, bool)>>>,
        // Not Send: proves the fetcher never has to leave its thread.
        served: Rc<RefCell<usize>>,
    }

    impl PageFetcher for Recording {
        async fn fetch(&self, url: Url) -> Option<ScrubResult> {
            *self.served.borrow_mut() += 1;
            if let Ok(mut calls) = self.calls.lock() {
                calls.push((std::thread::current().id(), is_fetch_context()));
            }
            Some(ScrubResult {
                html: format!("<p>{}</p>", self.served.borrow()),
                final_url: url,
            })
        }
    }

    fn url(s: &str) -> Url {
        Url::parse(s).expect("valid test URL")
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn every_fetch_runs_on_the_single_fetch_thread() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&calls);
        let handle = FetchHandle::spawn(move || Recording {
            calls: recorded,
            served: Rc::new(RefCell::new(0)),
        })
        .expect("spawn fetch context");

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let handle = handle.clone();
                tokio::spawn(async move { handle.fetch(url(&format!("https://a.com/{i}"))).await })
            })
            .collect();
        for task in tasks {
            let result = task.await.expect("task");
            assert!(result.is_some());
        }

        let calls = calls.lock().expect("lock");
        assert_eq!(calls.len(), 16);
        let first = calls[0].0;
        assert!(calls.iter().all(|(thread, on_ctx)| *thread == first && *on_ctx));
        assert_ne!(first, std::thread::current().id());
    }

    #[tokio::test]
    async fn caller_is_not_the_fetch_context() {
        assert!(!is_fetch_context());
    }

    #[tokio::test]
    async fn fetch_returns_final_url() {
        let handle = FetchHandle::spawn(|| Recording {
            calls: Arc::new(Mutex::new(Vec::new())),
            served: Rc::new(RefCell::new(0)),
        })
        .expect("spawn fetch context");

        let result = handle.fetch(url("https://b.com/page")).await.expect("page");
        assert_eq!(result.final_url.as_str(), "https://b.com/page");
        assert_eq!(result.html, "<p>1</p>");
    }

    struct Never;

    impl PageFetcher for Never {
        async fn fetch(&self, _url: Url) -> Option<ScrubResult> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn abandoned_answer_does_not_block_later_requests() {
        let handle = FetchHandle::spawn(|| Never).expect("spawn fetch context");
        let first = handle.submit(url("https://a.com/"));
        drop(first);
        let second = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            handle.submit(url("https://b.com/")),
        )
        .await;
        assert!(second.is_err(), "fetch never completes, so the wait times out");
        assert!(!handle.is_closed());
    }
}
