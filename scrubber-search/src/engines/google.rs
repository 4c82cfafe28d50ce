//! Google: best results but aggressive bot detection.
//!
//! Organic results are the direct children of `#rso`; each contributes the
//! first element carrying an `href`.

use crate::engine::{EngineProfile, ExtractionRule, ItemScope};
use crate::types::SearchEngine;

pub(crate) const PROFILE: EngineProfile = EngineProfile {
    engine: SearchEngine::Google,
    query_template: "https://www.google.com/search?q={query}",
    rule: ExtractionRule {
        container: "#rso",
        items: ItemScope::Children,
        link: "[href]",
        preferred_link: None,
    },
};
