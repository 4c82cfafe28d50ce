//! Bing: decent fallback with Microsoft's index.
//!
//! Organic results are `li.b_algo` inside `ol#b_results`. A result only
//! counts when it carries the site badge link (`div.b_tpcn a[href]`); its
//! header link in `div.b_algoheader` is preferred when present, otherwise
//! the badge link is used.

use crate::engine::{EngineProfile, ExtractionRule, ItemScope};
use crate::types::SearchEngine;

pub(crate) const PROFILE: EngineProfile = EngineProfile {
    engine: SearchEngine::Bing,
    query_template: "https://www.bing.com/search?q={query}",
    rule: ExtractionRule {
        container: "ol#b_results",
        items: ItemScope::Descendants("li.b_algo"),
        link: "div.b_tpcn a[href]",
        preferred_link: Some("div.b_algoheader a[href]"),
    },
};
