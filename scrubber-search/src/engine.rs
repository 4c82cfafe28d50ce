//! Table-driven search engine adapters.
//!
//! Every [`SearchEngine`] maps to one [`EngineProfile`]: a query URL
//! template plus an [`ExtractionRule`] describing where the organic result
//! links live in that engine's HTML. The rules are plain data, so adding an
//! engine means adding a variant and a profile; the extraction walk and the
//! sanitizer never change.
//!
//! Extraction never fails. A selector that does not parse or a container
//! that is missing simply contributes no links, and when the engine rule
//! finds nothing at all every `a[href]` on the page is used instead.

use std::collections::HashMap;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::engines::PROFILES;
use crate::sanitize::{parse_web_url, sanitize_hrefs};
use crate::types::{SearchEngine, SearchSnippet};

/// Placeholder replaced by the percent-encoded keyword in query templates.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Selector used when an engine rule yields no links.
const FALLBACK_LINK_SELECTOR: &str = "a[href]";

/// Static description of one search engine.
#[derive(Debug, Clone, Copy)]
pub struct EngineProfile {
    /// Engine this profile describes.
    pub engine: SearchEngine,
    /// Result page URL with a [`QUERY_PLACEHOLDER`] for the keyword.
    pub query_template: &'static str,
    /// Where organic result links live in the result page.
    pub rule: ExtractionRule,
}

/// Which elements inside a result container count as one result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemScope {
    /// Every direct child element of the container.
    Children,
    /// Every descendant matching this selector.
    Descendants(&'static str),
}

/// CSS-selector recipe for pulling result links out of a result page.
///
/// For each element matching `container`, each item in `items` contributes
/// at most one link: the first match of `link`. When `preferred_link` is set
/// and also matches inside the item, that element is used instead, but only
/// items that contain a `link` match are considered at all.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionRule {
    pub container: &'static str,
    pub items: ItemScope,
    pub link: &'static str,
    pub preferred_link: Option<&'static str>,
}

/// A link pulled from a result page, before sanitation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResultLink {
    href: String,
    text: String,
}

impl EngineProfile {
    /// Build the result page URL for `keyword`.
    ///
    /// Returns `None` only when the substituted template is not a valid URL.
    pub fn build_query(&self, keyword: &str) -> Option<Url> {
        let encoded = urlencoding::encode(keyword);
        let raw = self.query_template.replace(QUERY_PLACEHOLDER, &encoded);
        Url::parse(&raw).ok()
    }

    /// Extract sanitized, deduplicated result URLs from a result page.
    pub fn extract_result_urls(&self, html: &str) -> Vec<Url> {
        let links = self.extract_links(html);
        sanitize_hrefs(links.iter().map(|link| link.href.as_str()))
    }

    /// Extract result URLs as snippets.
    ///
    /// The title is the anchor text of the link the URL came from. The
    /// weight is the engine prior decayed by the URL's position in the
    /// sanitized output.
    pub fn extract_snippets(&self, html: &str) -> Vec<SearchSnippet> {
        let links = self.extract_links(html);

        let mut titles: HashMap<String, String> = HashMap::new();
        for link in &links {
            if link.text.is_empty() {
                continue;
            }
            if let Some(url) = parse_web_url(link.href.trim()) {
                titles
                    .entry(url.as_str().to_owned())
                    .or_insert_with(|| link.text.clone());
            }
        }

        sanitize_hrefs(links.iter().map(|link| link.href.as_str()))
            .into_iter()
            .enumerate()
            .map(|(position, url)| {
                let title = titles.get(url.as_str()).cloned();
                SearchSnippet {
                    engine: self.engine,
                    url,
                    title,
                    description: None,
                    weight: Some(self.engine.weight() * position_decay(position)),
                }
            })
            .collect()
    }

    fn extract_links(&self, html: &str) -> Vec<ResultLink> {
        let document = Html::parse_document(html);

        let links = self.rule.collect(&document);
        if !links.is_empty() {
            tracing::debug!(engine = %self.engine, count = links.len(), "result links extracted");
            return links;
        }

        let fallback = collect_all_anchors(&document);
        tracing::debug!(
            engine = %self.engine,
            count = fallback.len(),
            "engine rule matched nothing, using every anchor"
        );
        fallback
    }
}

impl ExtractionRule {
    fn collect(&self, document: &Html) -> Vec<ResultLink> {
        let (Some(container_sel), Some(link_sel)) = (selector(self.container), selector(self.link))
        else {
            return Vec::new();
        };
        let preferred_sel = self.preferred_link.and_then(selector);
        let item_sel = match self.items {
            ItemScope::Children => None,
            ItemScope::Descendants(items) => match selector(items) {
                Some(sel) => Some(sel),
                None => return Vec::new(),
            },
        };

        let mut links = Vec::new();
        for container in document.select(&container_sel) {
            let items: Vec<ElementRef<'_>> = match &item_sel {
                None => container.children().filter_map(ElementRef::wrap).collect(),
                Some(sel) => container.select(sel).collect(),
            };

            for item in items {
                let Some(first) = first_match(item, &link_sel) else {
                    continue;
                };
                let chosen = preferred_sel
                    .as_ref()
                    .and_then(|sel| first_match(item, sel))
                    .unwrap_or(first);
                if let Some(link) = result_link(chosen) {
                    links.push(link);
                }
            }
        }
        links
    }
}

impl SearchEngine {
    /// The static profile for this engine.
    pub fn profile(&self) -> &'static EngineProfile {
        &PROFILES[*self as usize]
    }

    /// See [`EngineProfile::build_query`].
    pub fn build_query(&self, keyword: &str) -> Option<Url> {
        self.profile().build_query(keyword)
    }

    /// See [`EngineProfile::extract_result_urls`].
    pub fn extract_result_urls(&self, html: &str) -> Vec<Url> {
        self.profile().extract_result_urls(html)
    }

    /// See [`EngineProfile::extract_snippets`].
    pub fn extract_snippets(&self, html: &str) -> Vec<SearchSnippet> {
        self.profile().extract_snippets(html)
    }
}

/// Position decay for result priors: 1.0 at the top, about 0.5 at position 9.
pub fn position_decay(position: usize) -> f64 {
    1.0 / (1.0 + position as f64 * 0.1)
}

fn collect_all_anchors(document: &Html) -> Vec<ResultLink> {
    let Some(anchor_sel) = selector(FALLBACK_LINK_SELECTOR) else {
        return Vec::new();
    };
    document.select(&anchor_sel).filter_map(result_link).collect()
}

/// First element matching `sel` in `item`'s subtree, `item` itself included.
fn first_match<'a>(item: ElementRef<'a>, sel: &Selector) -> Option<ElementRef<'a>> {
    if sel.matches(&item) {
        return Some(item);
    }
    item.select(sel).next()
}

fn result_link(element: ElementRef<'_>) -> Option<ResultLink> {
    let href = element.value().attr("href")?;
    if href.is_empty() {
        return None;
    }
    let text = element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ");
    Some(ResultLink {
        href: href.to_owned(),
        text,
    })
}

fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(sel) => Some(sel),
        Err(e) => {
            tracing::warn!(selector = css, error = ?e, "invalid extraction selector");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_PROFILE: EngineProfile = EngineProfile {
        engine: SearchEngine::Google,
        query_template: "https://search.example/find?q={query}&hl=en",
        rule: ExtractionRule {
            container: "#results",
            items: ItemScope::Children,
            link: "a.hit",
            preferred_link: None,
        },
    };

    #[test]
    fn profiles_table_is_indexed_by_engine() {
        for engine in SearchEngine::all() {
            assert_eq!(engine.profile().engine, *engine);
        }
    }

    #[test]
    fn every_template_has_placeholder() {
        for engine in SearchEngine::all() {
            assert!(
                engine.profile().query_template.contains(QUERY_PLACEHOLDER),
                "{engine} template lacks placeholder"
            );
        }
    }

    #[test]
    fn build_query_percent_encodes_keyword() {
        let url = TEST_PROFILE
            .build_query("rust & tokio/async?")
            .expect("valid query url");
        assert_eq!(
            url.as_str(),
            "https://search.example/find?q=rust%20%26%20tokio%2Fasync%3F&hl=en"
        );
        let q = url
            .query_pairs()
            .find(|(k, _)| k == "q")
            .map(|(_, v)| v.into_owned());
        assert_eq!(q.as_deref(), Some("rust & tokio/async?"));
    }

    #[test]
    fn build_query_fails_for_broken_template() {
        let broken = EngineProfile {
            query_template: "not a url {query}",
            ..TEST_PROFILE
        };
        assert!(broken.build_query("x").is_none());
    }

    #[test]
    fn rule_extracts_one_link_per_child() {
        let html = r#"<html><body><div id="results">
            <div><a class="hit" href="https://one.com/a">One</a><a class="hit" href="https://one.com/b">B</a></div>
            <div><a class="hit" href="https://two.com/">Two</a></div>
            <div><span>no link here</span></div>
        </div><a href="https://ignored.com/">ignored</a></body></html>"#;
        let urls = TEST_PROFILE.extract_result_urls(html);
        let urls: Vec<&str> = urls.iter().map(Url::as_str).collect();
        assert_eq!(urls, ["https://one.com/a", "https://two.com/"]);
    }

    #[test]
    fn item_that_is_itself_the_link_counts() {
        let html = r#"<html><body><div id="results">
            <a class="hit" href="https://direct.com/x">Direct</a>
            <div><a class="hit" href="https://nested.com/y">Nested</a></div>
        </div></body></html>"#;
        let snippets = TEST_PROFILE.extract_snippets(html);
        let urls: Vec<&str> = snippets.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls, ["https://direct.com/x", "https://nested.com/y"]);
        assert_eq!(snippets[0].title.as_deref(), Some("Direct"));
    }

    #[test]
    fn preferred_link_may_be_the_item_itself() {
        let profile = EngineProfile {
            rule: ExtractionRule {
                container: "#results",
                items: ItemScope::Descendants(".title"),
                link: "[href]",
                preferred_link: Some("a.title"),
            },
            ..TEST_PROFILE
        };
        let html = r#"<html><body><div id="results">
            <a class="title" href="https://anchor-item.com/">Anchor item</a>
            <h3 class="title"><a href="https://heading-item.com/">Heading item</a></h3>
        </div></body></html>"#;
        let urls = profile.extract_result_urls(html);
        let urls: Vec<&str> = urls.iter().map(Url::as_str).collect();
        assert_eq!(urls, ["https://anchor-item.com/", "https://heading-item.com/"]);
    }

    #[test]
    fn falls_back_to_every_anchor_when_rule_matches_nothing() {
        let html = r#"<html><body>
            <a href="https://x.com/1">x</a>
            <p><a href="https://y.com/2">y</a></p>
            <a href="/local">local</a>
        </body></html>"#;
        let urls = TEST_PROFILE.extract_result_urls(html);
        let urls: Vec<&str> = urls.iter().map(Url::as_str).collect();
        assert_eq!(urls, ["https://x.com/1", "https://y.com/2"]);
    }

    #[test]
    fn garbage_html_yields_empty() {
        assert!(TEST_PROFILE.extract_result_urls("<<<>>> not html at all").is_empty());
        assert!(TEST_PROFILE.extract_result_urls("").is_empty());
    }

    #[test]
    fn invalid_selector_contributes_nothing() {
        let broken = EngineProfile {
            rule: ExtractionRule {
                container: "div[[[",
                ..TEST_PROFILE.rule
            },
            ..TEST_PROFILE
        };
        let html = r#"<html><body><a href="https://fallback.com/">f</a></body></html>"#;
        let urls = broken.extract_result_urls(html);
        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0].as_str(), "https://fallback.com/");
    }

    #[test]
    fn snippets_carry_anchor_text_and_decayed_weight() {
        let html = r#"<html><body><div id="results">
            <div><a class="hit" href="https://b.com/">  Second
                 result </a></div>
            <div><a class="hit" href="https://a.com/">First result</a></div>
        </div></body></html>"#;
        let snippets = TEST_PROFILE.extract_snippets(html);
        assert_eq!(snippets.len(), 2);
        // Sanitizer output is sorted, so a.com comes first.
        assert_eq!(snippets[0].url.as_str(), "https://a.com/");
        assert_eq!(snippets[0].title.as_deref(), Some("First result"));
        assert_eq!(snippets[1].title.as_deref(), Some("Second result"));
        let w0 = snippets[0].weight.expect("weight");
        let w1 = snippets[1].weight.expect("weight");
        assert!((w0 - 1.2).abs() < 1e-12);
        assert!((w1 - 1.2 / 1.1).abs() < 1e-12);
        assert!(snippets.iter().all(|s| s.engine == SearchEngine::Google));
    }

    #[test]
    fn position_decay_values() {
        assert!((position_decay(0) - 1.0).abs() < f64::EPSILON);
        assert!((position_decay(5) - 1.0 / 1.5).abs() < f64::EPSILON);
        let scores: Vec<f64> = (0..10).map(position_decay).collect();
        for pair in scores.windows(2) {
            assert!(pair[1] < pair[0]);
        }
    }
}
