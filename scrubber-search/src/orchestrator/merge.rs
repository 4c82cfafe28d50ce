//! Cross-engine snippet merging.
//!
//! Engines often return the same page. Merging keeps one snippet per URL so
//! the reranker's hostname and path counts reflect distinct pages, while the
//! summed prior weight still rewards URLs that several engines agree on.

use std::collections::HashMap;

use crate::types::SearchSnippet;

/// Merge snippets from several engines by exact URL.
///
/// The first occurrence of a URL fixes its position and engine. Weights are
/// summed across occurrences, and the first non-empty title and description
/// are kept.
pub fn merge_snippets<I>(snippets: I) -> Vec<SearchSnippet>
where
    I: IntoIterator<Item = SearchSnippet>,
{
    let mut merged: Vec<SearchSnippet> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for snippet in snippets {
        match index.get(snippet.url.as_str()) {
            Some(&at) => {
                let kept = &mut merged[at];
                kept.weight = match (kept.weight, snippet.weight) {
                    (Some(a), Some(b)) => Some(a + b),
                    (a, b) => a.or(b),
                };
                if kept.title.is_none() {
                    kept.title = snippet.title;
                }
                if kept.description.is_none() {
                    kept.description = snippet.description;
                }
            }
            None => {
                index.insert(snippet.url.as_str().to_owned(), merged.len());
                merged.push(snippet);
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SearchEngine;
    use url::Url;

    fn snippet(engine: SearchEngine, raw: &str) -> SearchSnippet {
        SearchSnippet::new(engine, Url::parse(raw).expect("valid test URL"))
    }

    #[test]
    fn unique_urls_pass_through_in_order() {
        let merged = merge_snippets([
            snippet(SearchEngine::Google, "https://b.com/"),
            snippet(SearchEngine::Bing, "https://a.com/"),
        ]);
        let urls: Vec<&str> = merged.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls, ["https://b.com/", "https://a.com/"]);
    }

    #[test]
    fn duplicate_urls_sum_weights_and_keep_first_engine() {
        let merged = merge_snippets([
            snippet(SearchEngine::Google, "https://a.com/x").with_weight(1.2),
            snippet(SearchEngine::Bing, "https://b.com/").with_weight(0.8),
            snippet(SearchEngine::Bing, "https://a.com/x").with_weight(0.8),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].engine, SearchEngine::Google);
        let weight = merged[0].weight.expect("weight");
        assert!((weight - 2.0).abs() < 1e-12);
    }

    #[test]
    fn missing_weight_is_taken_from_later_duplicate() {
        let merged = merge_snippets([
            snippet(SearchEngine::Yahoo, "https://a.com/"),
            snippet(SearchEngine::Bing, "https://a.com/").with_weight(0.8),
        ]);
        assert_eq!(merged[0].weight, Some(0.8));
    }

    #[test]
    fn first_available_title_and_description_win() {
        let merged = merge_snippets([
            snippet(SearchEngine::Google, "https://a.com/"),
            snippet(SearchEngine::Bing, "https://a.com/")
                .with_title("From Bing")
                .with_description("bing text"),
            snippet(SearchEngine::Yahoo, "https://a.com/").with_title("From Yahoo"),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].title.as_deref(), Some("From Bing"));
        assert_eq!(merged[0].description.as_deref(), Some("bing text"));
    }

    #[test]
    fn urls_differing_only_by_trailing_slash_stay_separate() {
        let merged = merge_snippets([
            snippet(SearchEngine::Google, "https://a.com/docs"),
            snippet(SearchEngine::Bing, "https://a.com/docs/"),
        ]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn empty_input_returns_empty() {
        assert!(merge_snippets(Vec::new()).is_empty());
    }
}
