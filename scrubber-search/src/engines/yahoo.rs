//! Yahoo: Bing-backed index with its own markup.
//!
//! Results live under `#main-algo`; every `.title` block inside it
//! contributes the first element carrying an `href`. Yahoo's
//! `r.search.yahoo.com` redirectors embed the target URL verbatim, so the
//! sanitizer's containment filter unwraps them when the direct link is also
//! on the page.

use crate::engine::{EngineProfile, ExtractionRule, ItemScope};
use crate::types::SearchEngine;

pub(crate) const PROFILE: EngineProfile = EngineProfile {
    engine: SearchEngine::Yahoo,
    query_template: "https://search.yahoo.com/search?q={query}",
    rule: ExtractionRule {
        container: "#main-algo",
        items: ItemScope::Descendants(".title"),
        link: "[href]",
        preferred_link: None,
    },
};
