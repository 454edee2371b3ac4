use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dedup::DEFAULT_MAX_EDIT_DISTANCE;
use crate::infinitive::DEFAULT_FREQUENCY_CUTOFF;
use crate::personal::DEFAULT_MAX_PERSONAL_WORDS;

/// Tuning knobs of an [`Extractor`](crate::Extractor). Every field has a
/// default, so a partial JSON object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Conjugation entries rarer than this are never matched.
    pub frequency_cutoff: u32,
    /// Also drop words within `max_edit_distance` of an earlier word.
    pub approx_dedup: bool,
    pub max_edit_distance: usize,
    /// Personal pictogram names longer than this (in words) are ignored.
    pub max_personal_words: usize,
    /// Upper bound for each catalog search.
    pub search_timeout_ms: u64,
    /// Search the catalog for tokens the lexicon does not cover.
    pub search_fallback: bool,
}

impl ExtractorConfig {
    pub fn search_timeout(&self) -> Duration {
        Duration::from_millis(self.search_timeout_ms)
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            frequency_cutoff: DEFAULT_FREQUENCY_CUTOFF,
            approx_dedup: false,
            max_edit_distance: DEFAULT_MAX_EDIT_DISTANCE,
            max_personal_words: DEFAULT_MAX_PERSONAL_WORDS,
            search_timeout_ms: 3000,
            search_fallback: true,
        }
    }
}
