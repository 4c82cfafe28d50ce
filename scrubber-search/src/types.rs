//! Core types for search snippets, boosted results and engine identification.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// A discovered result URL plus optional metadata, before ranking.
///
/// Snippets are only ever built from URLs that passed the sanitizer, so
/// `url` is always absolute `http`/`https` with a non-empty host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSnippet {
    /// Which search engine produced this URL.
    pub engine: SearchEngine,
    /// The candidate result URL.
    pub url: Url,
    /// Title text, usually the anchor text of the result link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Longer description text, when one is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Externally supplied prior (for example provider rank). Only the
    /// frequency boost reads it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl SearchSnippet {
    /// Create a snippet with just an engine and a URL.
    pub fn new(engine: SearchEngine, url: Url) -> Self {
        Self {
            engine,
            url,
            title: None,
            description: None,
            weight: None,
        }
    }

    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the prior weight.
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }
}

/// A snippet with its computed score components and composite score.
///
/// Produced exclusively by [`crate::rank::rank`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostedSearchSnippet {
    /// The snippet that was scored.
    #[serde(flatten)]
    pub snippet: SearchSnippet,
    /// Contribution of the snippet's prior weight.
    pub freq_boost: f64,
    /// Contribution of hostname recurrence among candidates.
    pub hostname_boost: f64,
    /// Contribution of recurring path prefixes, decayed by depth.
    pub path_boost: f64,
    /// Normalised BM25 relevance against the question, or 0.
    pub bm25_rerank_boost: f64,
    /// Clamped sum of all boosts.
    pub final_score: f64,
}

impl BoostedSearchSnippet {
    /// The scored URL.
    pub fn url(&self) -> &Url {
        &self.snippet.url
    }

    /// Host of the scored URL, or `""` when it has none.
    pub fn hostname(&self) -> &str {
        self.snippet.url.host_str().unwrap_or_default()
    }
}

/// Outcome of one successful page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrubResult {
    /// Page HTML as returned by the fetch capability.
    pub html: String,
    /// URL after redirects.
    pub final_url: Url,
}

/// Supported search engines.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngine {
    /// Google: best results but aggressive bot detection.
    Google,
    /// DuckDuckGo: privacy-aligned, React result page.
    DuckDuckGo,
    /// Yahoo: Bing-backed index with its own markup.
    Yahoo,
    /// Bing: decent fallback engine.
    Bing,
}

impl SearchEngine {
    /// Returns the human-readable name of this engine.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::DuckDuckGo => "DuckDuckGo",
            Self::Yahoo => "Yahoo",
            Self::Bing => "Bing",
        }
    }

    /// Returns the lowercase identifier used in configuration files.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::DuckDuckGo => "duckduckgo",
            Self::Yahoo => "yahoo",
            Self::Bing => "bing",
        }
    }

    /// Returns the prior weight for results from this engine.
    /// Higher weight means results from this engine start with a larger
    /// frequency boost.
    pub fn weight(&self) -> f64 {
        match self {
            Self::Google => 1.2,
            Self::DuckDuckGo => 1.0,
            Self::Yahoo => 0.9,
            Self::Bing => 0.8,
        }
    }

    /// Returns all available engine variants.
    pub fn all() -> &'static [SearchEngine] {
        &[Self::Google, Self::DuckDuckGo, Self::Yahoo, Self::Bing]
    }

    /// Looks an engine up by its identifier or display name, ignoring case.
    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.trim();
        Self::all()
            .iter()
            .copied()
            .find(|engine| engine.id().eq_ignore_ascii_case(id) || engine.name().eq_ignore_ascii_case(id))
    }
}

impl fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Readable document captured from a fetched page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Page title, or the host name when the page has none.
    pub title: String,
    /// Page URL, percent-decoded when that still parses.
    pub url: Url,
    /// The raw HTML.
    pub raw_document: String,
    /// Readable text with boilerplate stripped.
    pub text_document: String,
    /// `og:image` preview, when present and absolute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_image_url: Option<Url>,
    /// Engine whose result led to this page, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<SearchEngine>,
}
