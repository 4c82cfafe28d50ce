//! Readable document extraction from captured page HTML.
//!
//! Removes non-content elements (scripts, styles, navigation), finds the
//! main content area and returns a [`Document`] with clean text, a title
//! and an optional preview image. Nothing here fails loudly: a page with no
//! usable title or text yields `None`.

use scraper::{Html, Selector};
use url::Url;

use crate::types::{Document, SearchEngine};

/// Default maximum characters of extracted text.
pub const DEFAULT_MAX_CHARS: usize = 100_000;

/// Appended to text cut at the character limit.
const TRUNCATION_MARKER: &str = "\n\n[Content truncated]";

/// Elements removed, with their content, before text extraction.
const BOILERPLATE_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "aside", "noscript", "svg", "iframe", "template",
];

/// Extract a [`Document`] from `html` fetched at `url`, keeping at most
/// [`DEFAULT_MAX_CHARS`] characters of text.
pub fn extract_document(html: &str, url: &Url, engine: Option<SearchEngine>) -> Option<Document> {
    extract_document_with_limit(html, url, engine, DEFAULT_MAX_CHARS)
}

/// Same as [`extract_document`] with a custom character limit.
///
/// Returns `None` when the page has neither a title nor a host to stand in
/// for one, or when no readable text remains after stripping boilerplate.
pub fn extract_document_with_limit(
    html: &str,
    url: &Url,
    engine: Option<SearchEngine>,
    max_chars: usize,
) -> Option<Document> {
    let raw = Html::parse_document(html);

    let mut title = extract_title(&raw);
    if title.is_empty() {
        title = url.host_str().unwrap_or_default().to_owned();
    }
    if title.is_empty() {
        return None;
    }

    let cleaned = Html::parse_document(&strip_boilerplate_tags(html));
    let text = normalise_whitespace(&extract_main_text(&cleaned));
    if text.is_empty() {
        return None;
    }

    Some(Document {
        title,
        url: decoded_url(url),
        raw_document: html.to_owned(),
        text_document: truncate_to_limit(&text, max_chars),
        preview_image_url: extract_preview_image(&raw),
        engine,
    })
}

fn extract_title(document: &Html) -> String {
    let Ok(selector) = Selector::parse("title") else {
        return String::new();
    };
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<Vec<_>>().join(" "))
        .map(|title| normalise_whitespace(&title).replace('\n', " "))
        .unwrap_or_default()
}

/// `og:image` content when it parses as an absolute URL.
fn extract_preview_image(document: &Html) -> Option<Url> {
    let selector = Selector::parse(r#"meta[property="og:image"]"#).ok()?;
    let content = document.select(&selector).next()?.value().attr("content")?;
    Url::parse(content.trim()).ok()
}

/// Text of the first non-empty content root, most specific first.
fn extract_main_text(document: &Html) -> String {
    let content_selectors = ["article", "main", "[role=\"main\"]", "body"];

    for selector_str in &content_selectors {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let text = element.text().collect::<Vec<_>>().join(" ");
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return trimmed.to_owned();
            }
        }
    }

    String::new()
}

/// Percent-decoded form of `url`, or `url` itself when decoding breaks it.
fn decoded_url(url: &Url) -> Url {
    urlencoding::decode(url.as_str())
        .ok()
        .and_then(|decoded| Url::parse(&decoded).ok())
        .unwrap_or_else(|| url.clone())
}

fn strip_boilerplate_tags(html: &str) -> String {
    BOILERPLATE_TAGS
        .iter()
        .fold(html.to_owned(), |acc, tag| strip_tag(&acc, tag))
}

/// Remove every `<tag ...>...</tag>` span, matching the tag name
/// case-insensitively. An unclosed tag loses only its opening tag.
fn strip_tag(html: &str, tag: &str) -> String {
    // ASCII lowercasing keeps byte offsets aligned with `html`.
    let lower = html.to_ascii_lowercase();
    let open_tag = format!("<{tag}");
    let close_tag = format!("</{tag}>");

    let mut result = String::with_capacity(html.len());
    let mut pos = 0;
    while let Some(offset) = lower[pos..].find(&open_tag) {
        let start = pos + offset;
        let after_tag = start + open_tag.len();

        // `<nav` must not match `<navigate`.
        let boundary = lower.as_bytes().get(after_tag).copied();
        if !matches!(boundary, None | Some(b' ' | b'>' | b'/' | b'\n' | b'\r' | b'\t')) {
            result.push_str(&html[pos..after_tag]);
            pos = after_tag;
            continue;
        }

        result.push_str(&html[pos..start]);
        pos = match lower[start..].find(&close_tag) {
            Some(offset) => start + offset + close_tag.len(),
            None => lower[start..]
                .find('>')
                .map_or(html.len(), |offset| start + offset + 1),
        };
    }
    result.push_str(&html[pos..]);
    result
}

/// Collapse runs of spaces to one and runs of 3+ newlines to 2, trimming
/// every line.
fn normalise_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_was_space = false;
    let mut newline_count: u32 = 0;

    for ch in text.chars() {
        if ch == '\n' || ch == '\r' {
            newline_count += 1;
            prev_was_space = false;
            if newline_count <= 2 {
                result.push('\n');
            }
        } else if ch.is_whitespace() {
            newline_count = 0;
            if !prev_was_space {
                result.push(' ');
                prev_was_space = true;
            }
        } else {
            newline_count = 0;
            prev_was_space = false;
            result.push(ch);
        }
    }

    result
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_owned()
}

fn truncate_to_limit(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => {
            let mut truncated = text[..end].to_owned();
            truncated.push_str(TRUNCATION_MARKER);
            truncated
        }
        None => text.to_owned(),
    }
}
