//! Composite reranking of search snippets.
//!
//! Each snippet's score is the sum of four boosts, clamped into
//! `[min_boost, max_boost]`:
//!
//! - **hostname**: share of candidates on the same host
//! - **path**: share of candidates under each path prefix, decayed by depth
//! - **frequency**: the snippet's prior weight over the candidate count
//! - **bm25**: normalised BM25 relevance of title + description against the
//!   question, when a question is set

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::bm25::Bm25Okapi;
use crate::types::{BoostedSearchSnippet, SearchSnippet};

/// Tuning for one ranking call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankOptions {
    /// Multiplier on `weight / N`.
    pub freq_factor: f64,
    /// Multiplier on the hostname share.
    pub hostname_boost_factor: f64,
    /// Multiplier on each path prefix share.
    pub path_boost_factor: f64,
    /// Per-depth decay applied to path prefix shares.
    pub decay_factor: f64,
    /// Reserved weight for the BM25 boost. Stored but not applied; the BM25
    /// boost is the raw normalised score.
    pub bm25_rerank_factor: f64,
    /// Lower clamp for `final_score`.
    pub min_boost: f64,
    /// Upper clamp for `final_score`.
    pub max_boost: f64,
    /// Question to score titles and descriptions against.
    pub question: Option<String>,
    /// Keep at most this many results per hostname.
    pub keep_k_per_hostname: Option<usize>,
}

impl Default for RerankOptions {
    fn default() -> Self {
        Self {
            freq_factor: 0.5,
            hostname_boost_factor: 0.5,
            path_boost_factor: 0.4,
            decay_factor: 0.8,
            bm25_rerank_factor: 0.8,
            min_boost: 0.0,
            max_boost: 5.0,
            question: None,
            keep_k_per_hostname: None,
        }
    }
}

impl RerankOptions {
    /// Set the BM25 question.
    #[must_use]
    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }

    /// Cap the number of results per hostname.
    #[must_use]
    pub fn with_keep_k_per_hostname(mut self, k: usize) -> Self {
        self.keep_k_per_hostname = Some(k);
        self
    }
}

/// Score and order `snippets`.
///
/// Output is sorted by `final_score` descending; equal scores keep their
/// input order. Without a hostname cap the output is a permutation of the
/// input.
pub fn rank(snippets: &[SearchSnippet], options: &RerankOptions) -> Vec<BoostedSearchSnippet> {
    if snippets.is_empty() {
        return Vec::new();
    }

    let counts = UrlPartCounts::collect(snippets);
    let bm25_scores = options
        .question
        .as_deref()
        .map(|question| bm25_by_url(snippets, question))
        .unwrap_or_default();

    let mut boosted: Vec<BoostedSearchSnippet> = snippets
        .iter()
        .map(|snippet| {
            let host = snippet.url.host_str().unwrap_or_default();
            let hostname_boost =
                counts.share(counts.hosts.get(host)) * options.hostname_boost_factor;
            let path_boost = path_boost(snippet.url.path(), &counts, options);
            let freq_boost = snippet.weight.unwrap_or(0.0) / counts.total * options.freq_factor;
            let bm25_rerank_boost = bm25_scores
                .get(snippet.url.as_str())
                .copied()
                .unwrap_or(0.0);

            let sum = hostname_boost + path_boost + freq_boost + bm25_rerank_boost;
            let final_score = sum.max(options.min_boost).min(options.max_boost);

            BoostedSearchSnippet {
                snippet: snippet.clone(),
                freq_boost,
                hostname_boost,
                path_boost,
                bm25_rerank_boost,
                final_score,
            }
        })
        .collect();

    sort_by_score(&mut boosted);

    match options.keep_k_per_hostname {
        Some(k) => keep_k_per_hostname(boosted, k),
        None => boosted,
    }
}

/// Merge two strings, splicing on the longest suffix/prefix overlap.
///
/// If one contains the other the longer one wins; with no overlap the two
/// are concatenated. An absent side yields the other, or `""` when both are
/// absent. Overlap is measured in characters.
pub fn smart_merge_strings(first: Option<&str>, second: Option<&str>) -> String {
    let (first, second) = match (first, second) {
        (None, None) => return String::new(),
        (Some(only), None) | (None, Some(only)) => return only.to_owned(),
        (Some(a), Some(b)) => (a, b),
    };

    if first.contains(second) {
        return first.to_owned();
    }
    if second.contains(first) {
        return second.to_owned();
    }

    let first_chars: Vec<char> = first.chars().collect();
    let second_chars: Vec<char> = second.chars().collect();
    let max_overlap = first_chars.len().min(second_chars.len());

    let overlap = (1..=max_overlap)
        .rev()
        .find(|&len| first_chars[first_chars.len() - len..] == second_chars[..len])
        .unwrap_or(0);

    let mut merged: String = first_chars[..first_chars.len() - overlap].iter().collect();
    merged.push_str(second);
    merged
}

struct UrlPartCounts {
    hosts: HashMap<String, usize>,
    path_prefixes: HashMap<String, usize>,
    total: f64,
}

impl UrlPartCounts {
    fn collect(snippets: &[SearchSnippet]) -> Self {
        let mut hosts: HashMap<String, usize> = HashMap::new();
        let mut path_prefixes: HashMap<String, usize> = HashMap::new();

        for snippet in snippets {
            let host = snippet.url.host_str().unwrap_or_default();
            *hosts.entry(host.to_owned()).or_insert(0) += 1;
            for prefix in path_prefixes_of(snippet.url.path()) {
                *path_prefixes.entry(prefix).or_insert(0) += 1;
            }
        }

        Self {
            hosts,
            path_prefixes,
            total: snippets.len() as f64,
        }
    }

    fn share(&self, count: Option<&usize>) -> f64 {
        if self.total > 0.0 {
            count.copied().unwrap_or(0) as f64 / self.total
        } else {
            0.0
        }
    }
}

/// `/a/b/c` → `["/a", "/a/b", "/a/b/c"]`. Empty segments are skipped.
fn path_prefixes_of(path: &str) -> Vec<String> {
    let mut prefix = String::new();
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            prefix.push('/');
            prefix.push_str(segment);
            prefix.clone()
        })
        .collect()
}

fn path_boost(path: &str, counts: &UrlPartCounts, options: &RerankOptions) -> f64 {
    path_prefixes_of(path)
        .iter()
        .enumerate()
        .map(|(depth, prefix)| {
            counts.share(counts.path_prefixes.get(prefix))
                * options.decay_factor.powi(depth as i32)
                * options.path_boost_factor
        })
        .sum()
}

/// Normalised BM25 score per URL string. A URL that appears twice takes the
/// later snippet's score.
fn bm25_by_url(snippets: &[SearchSnippet], question: &str) -> HashMap<String, f64> {
    let corpus: Vec<String> = snippets
        .iter()
        .map(|s| smart_merge_strings(s.title.as_deref(), s.description.as_deref()))
        .collect();

    let mut bm25 = Bm25Okapi::new();
    bm25.fit(&corpus);
    let normalized = Bm25Okapi::normalize(&bm25.score(question));

    snippets
        .iter()
        .zip(normalized)
        .map(|(snippet, score)| (snippet.url.as_str().to_owned(), score))
        .collect()
}

fn sort_by_score(snippets: &mut [BoostedSearchSnippet]) {
    snippets.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

fn keep_k_per_hostname(
    mut snippets: Vec<BoostedSearchSnippet>,
    k: usize,
) -> Vec<BoostedSearchSnippet> {
    sort_by_score(&mut snippets);

    let mut seen: HashMap<String, usize> = HashMap::new();
    snippets
        .into_iter()
        .filter(|snippet| {
            let count = seen.entry(snippet.hostname().to_owned()).or_insert(0);
            if *count < k {
                *count += 1;
                true
            } else {
                false
            }
        })
        .collect()
}
