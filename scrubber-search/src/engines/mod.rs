//! Search engine profiles.
//!
//! Each module provides the [`EngineProfile`] for one engine: its query
//! template and the extraction rule for its result page. [`PROFILES`] is
//! the lookup table behind [`crate::SearchEngine::profile`] and must stay in
//! enum declaration order.

use crate::engine::EngineProfile;

pub mod bing;
pub mod duckduckgo;
pub mod google;
pub mod yahoo;

/// All engine profiles, indexed by `SearchEngine as usize`.
pub(crate) static PROFILES: [EngineProfile; 4] = [
    google::PROFILE,
    duckduckgo::PROFILE,
    yahoo::PROFILE,
    bing::PROFILE,
];
