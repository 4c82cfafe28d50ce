//! DuckDuckGo: privacy-aligned, React-rendered result page.
//!
//! Each direct child of `.react-results--main` is one result; the title
//! anchor is tagged `data-testid="result-title-a"`. Ads carry no such
//! anchor and are skipped.

use crate::engine::{EngineProfile, ExtractionRule, ItemScope};
use crate::types::SearchEngine;

pub(crate) const PROFILE: EngineProfile = EngineProfile {
    engine: SearchEngine::DuckDuckGo,
    query_template: "https://www.duckduckgo.com/?q={query}",
    rule: ExtractionRule {
        container: ".react-results--main",
        items: ItemScope::Children,
        link: "[data-testid=result-title-a]",
        preferred_link: None,
    },
};
