//! Href sanitation and deduplication for result pages.
//!
//! Turns the raw `href` values scraped from a result page into a sorted,
//! deduplicated list of absolute `http`/`https` URLs. Every stage works on
//! the complete output of the stage before it, never on a list that is
//! being mutated in place.
//!
//! ```text
//! trim/drop relative ──► drop wrappers ──► drop case variants ──► set + sort ──► parse
//!                              ▲                                                    │
//!                              └────────── until the parsed set stops changing ◄────┘
//! ```
//!
//! Parsing lowercases schemes and hosts and fills in empty paths, which can
//! reveal wrapper or case pairs the raw strings hid. The filters rerun over
//! the serialised URLs until nothing changes, so the output is a fixed point.

use std::collections::BTreeSet;

use url::Url;

use crate::types::SearchSnippet;

/// What to do with hrefs that differ only by letter case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseVariantPolicy {
    /// Drop every member of a case-variant group, including the one that
    /// would otherwise be the legitimate URL. This is the long-standing
    /// behaviour and the default.
    #[default]
    DropAll,
    /// Keep the lexically smallest member of each case-variant group.
    KeepFirst,
}

/// Sanitize hrefs with the default [`CaseVariantPolicy::DropAll`] policy.
///
/// Malformed or non-web hrefs are dropped silently; this never fails.
///
/// # Examples
///
/// ```
/// use scrubber_search::sanitize::sanitize_hrefs;
///
/// let urls = sanitize_hrefs([
///     "https://a.com/x",
///     "https://proxy.com/go?u=https://a.com/x",
///     "/relative",
///     "mailto:someone@a.com",
/// ]);
/// let urls: Vec<&str> = urls.iter().map(|u| u.as_str()).collect();
/// assert_eq!(urls, ["https://a.com/x"]);
/// ```
pub fn sanitize_hrefs<I, S>(hrefs: I) -> Vec<Url>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    sanitize_hrefs_with(hrefs, CaseVariantPolicy::default())
}

/// Sanitize hrefs with an explicit case-variant policy.
pub fn sanitize_hrefs_with<I, S>(hrefs: I, policy: CaseVariantPolicy) -> Vec<Url>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let candidates = trim_and_drop_relative(hrefs);
    let mut urls = parse_all(&filter_pass(&candidates, policy));

    loop {
        let serialised: Vec<String> = urls.iter().map(|url| url.as_str().to_owned()).collect();
        let settled = filter_pass(&serialised, policy);
        if settled.iter().eq(serialised.iter()) {
            return urls;
        }
        urls = parse_all(&settled);
    }
}

fn filter_pass(snapshot: &[String], policy: CaseVariantPolicy) -> BTreeSet<String> {
    let unwrapped = drop_wrapping_links(snapshot);
    let uncased = match policy {
        CaseVariantPolicy::DropAll => drop_case_variants(&unwrapped),
        CaseVariantPolicy::KeepFirst => keep_first_case_variant(&unwrapped),
    };
    uncased.into_iter().collect()
}

fn parse_all(raw: &BTreeSet<String>) -> Vec<Url> {
    raw.iter().filter_map(|href| parse_web_url(href)).collect()
}

/// Parse `raw` as an absolute `http`/`https` URL with a non-empty host.
pub fn parse_web_url(raw: &str) -> Option<Url> {
    let url = Url::parse(raw).ok()?;
    let is_web = matches!(url.scheme(), "http" | "https");
    let has_host = url.host_str().is_some_and(|host| !host.is_empty());
    (is_web && has_host).then_some(url)
}

/// Keep only snippets whose URL is an absolute `http`/`https` URL with a
/// host, logging a warning for each one dropped.
///
/// Snippets built by the engine adapters always pass. This is for snippets
/// that arrive from elsewhere, such as deserialised JSON.
pub fn retain_web_snippets(snippets: Vec<SearchSnippet>) -> Vec<SearchSnippet> {
    snippets
        .into_iter()
        .filter(|snippet| {
            let keep = parse_web_url(snippet.url.as_str()).is_some();
            if !keep {
                tracing::warn!(url = %snippet.url, "dropping snippet without a web URL");
            }
            keep
        })
        .collect()
}

fn trim_and_drop_relative<I, S>(hrefs: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    hrefs
        .into_iter()
        .map(|href| href.as_ref().trim().to_owned())
        .filter(|href| !href.is_empty())
        .filter(|href| !href.starts_with('/') && !href.starts_with('#'))
        .collect()
}

/// Drop any href that embeds a different href from the same set.
///
/// Redirectors and translation proxies carry the real target in their query
/// string, so the wrapper goes and the embedded URL stays. With three or more
/// mutually overlapping hrefs this can discard more than one would like.
fn drop_wrapping_links(snapshot: &[String]) -> Vec<String> {
    snapshot
        .iter()
        .filter(|candidate| {
            !snapshot
                .iter()
                .any(|inner| inner != *candidate && candidate.contains(inner.as_str()))
        })
        .cloned()
        .collect()
}

/// Drop every href that has a case-insensitive twin in `snapshot`.
///
/// Both members of the pair go. The predicate reads the unmodified snapshot,
/// so `["https://A.com/p", "https://a.com/p"]` becomes `[]`.
fn drop_case_variants(snapshot: &[String]) -> Vec<String> {
    snapshot
        .iter()
        .filter(|candidate| {
            let lowered = candidate.to_lowercase();
            !snapshot
                .iter()
                .any(|other| other != *candidate && other.to_lowercase() == lowered)
        })
        .cloned()
        .collect()
}

fn keep_first_case_variant(snapshot: &[String]) -> Vec<String> {
    snapshot
        .iter()
        .filter(|candidate| {
            let lowered = candidate.to_lowercase();
            !snapshot.iter().any(|other| {
                other.as_str() < candidate.as_str() && other.to_lowercase() == lowered
            })
        })
        .cloned()
        .collect()
}
