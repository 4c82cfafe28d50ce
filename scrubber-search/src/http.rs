//! Default page fetcher over HTTP.
//!
//! Provides a configured [`reqwest::Client`] with browser-like headers,
//! cookie support and rotating User-Agent strings, and [`HttpFetcher`], the
//! [`PageFetcher`] built on it.

use std::time::Duration;

use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use url::Url;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::orchestrator::fetch_context::{FetchHandle, PageFetcher};
use crate::types::ScrubResult;

/// Realistic browser User-Agent strings, rotated per client.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Maximum redirects followed per request.
const MAX_REDIRECTS: usize = 10;

/// Build a [`reqwest::Client`] configured for result-page scraping.
///
/// The client has:
/// - Cookie store enabled (for consent pages)
/// - Timeout from config
/// - Random User-Agent from built-in rotation list (or custom if configured)
/// - Browser-like `Accept` headers, brotli and gzip decompression
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(config: &SearchConfig) -> Result<reqwest::Client, SearchError> {
    let ua = match config.user_agent {
        Some(ref custom) => custom.clone(),
        None => random_user_agent().to_owned(),
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(ua)
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        // USER_AGENTS is a non-empty const array, choose only returns None on empty slices
        .unwrap_or(USER_AGENTS[0])
}

/// [`PageFetcher`] that GETs the page with a [`reqwest::Client`].
///
/// Transport errors, non-2xx statuses and empty bodies all read as `None`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Fetcher with a client built from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the client cannot be constructed.
    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        build_client(config).map(Self::new)
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: Url) -> Option<ScrubResult> {
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(host = url.host_str(), error = %e, "request failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(host = url.host_str(), %status, "non-success status");
            return None;
        }

        let final_url = response.url().clone();
        let html = match response.text().await {
            Ok(html) => html,
            Err(e) => {
                tracing::debug!(host = url.host_str(), error = %e, "failed to read body");
                return None;
            }
        };
        if html.trim().is_empty() {
            tracing::debug!(host = url.host_str(), "empty body");
            return None;
        }

        tracing::trace!(host = final_url.host_str(), bytes = html.len(), "page fetched");
        Some(ScrubResult { html, final_url })
    }
}

impl FetchHandle {
    /// Start a fetch context backed by an [`HttpFetcher`] built from
    /// `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the client cannot be built, or
    /// [`SearchError::Runtime`] if the context cannot be started.
    pub fn spawn_http(config: &SearchConfig) -> Result<Self, SearchError> {
        let fetcher = HttpFetcher::from_config(config)?;
        Self::spawn(move || fetcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> HttpFetcher {
        HttpFetcher::from_config(&SearchConfig::default()).expect("client")
    }

    fn at(server: &MockServer, p: &str) -> Url {
        Url::parse(&format!("{}{p}", server.uri())).expect("mock URL")
    }

    #[test]
    fn random_user_agent_returns_valid_ua() {
        let ua = random_user_agent();
        assert!(USER_AGENTS.contains(&ua));
        assert!(ua.contains("Mozilla/5.0"));
    }

    #[test]
    fn build_client_with_default_config() {
        assert!(build_client(&SearchConfig::default()).is_ok());
    }

    #[test]
    fn build_client_with_custom_ua() {
        let config = SearchConfig {
            user_agent: Some("CustomBot/1.0".into()),
            ..Default::default()
        };
        assert!(build_client(&config).is_ok());
    }

    #[tokio::test]
    async fn ok_page_is_returned() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>hello</p>"))
            .mount(&server)
            .await;

        let result = fetcher().fetch(at(&server, "/page")).await.expect("page");
        assert_eq!(result.html, "<p>hello</p>");
        assert_eq!(result.final_url, at(&server, "/page"));
    }

    #[tokio::test]
    async fn redirect_reports_final_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/new"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>moved</p>"))
            .mount(&server)
            .await;

        let result = fetcher().fetch(at(&server, "/old")).await.expect("page");
        assert_eq!(result.final_url, at(&server, "/new"));
        assert_eq!(result.html, "<p>moved</p>");
    }

    #[tokio::test]
    async fn error_status_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        assert!(fetcher().fetch(at(&server, "/search")).await.is_none());
    }

    #[tokio::test]
    async fn blank_body_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("  \n "))
            .mount(&server)
            .await;

        assert!(fetcher().fetch(at(&server, "/empty")).await.is_none());
    }

    #[tokio::test]
    async fn unreachable_host_is_none() {
        let url = Url::parse("http://127.0.0.1:9/").expect("valid URL");
        assert!(fetcher().fetch(url).await.is_none());
    }

    #[tokio::test]
    async fn spawn_http_serves_through_fetch_context() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ctx"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>ctx</p>"))
            .expect(1)
            .mount(&server)
            .await;

        let handle = FetchHandle::spawn_http(&SearchConfig::default()).expect("fetch context");
        let result = handle.fetch(at(&server, "/ctx")).await.expect("page");
        assert_eq!(result.html, "<p>ctx</p>");
    }
}
