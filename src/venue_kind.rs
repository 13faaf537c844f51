//! Venue-kind detection by indicator vocabulary.

use serde::Serialize;
use std::fmt;

const CONFERENCE_INDICATORS: &[&str] = &[
    "conference", "workshop", "symposium", "proceedings", "cvpr", "iccv", "eccv", "neurips", "nips",
    "icml", "iclr", "aaai", "ijcai", "sigcomm", "nsdi", "osdi", "sosp", "stoc", "focs", "soda",
    "sigmod", "vldb", "icde",
];

const JOURNAL_INDICATORS: &[&str] = &[
    "journal", "review", "letters", "magazine", "transactions", "annals", "bulletin", "quarterly",
    "monthly", "annual review",
];

const PREPRINT_INDICATORS: &[&str] = &["arxiv", "biorxiv", "medrxiv", "preprint"];

/// Coarse kind of a publication venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VenueKind {
    Journal,
    Conference,
    Preprint,
    Unknown,
}

impl fmt::Display for VenueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VenueKind::Journal => "journal",
            VenueKind::Conference => "conference",
            VenueKind::Preprint => "preprint",
            VenueKind::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Classify a venue string.
///
/// Conference indicators are checked first, then journal, then preprint;
/// anything else non-empty is assumed to be a journal.
pub fn detect(venue: &str) -> VenueKind {
    let venue = venue.trim().to_lowercase();
    if venue.is_empty() {
        return VenueKind::Unknown;
    }

    let has = |terms: &[&str]| terms.iter().any(|t| venue.contains(t));
    if has(CONFERENCE_INDICATORS) {
        VenueKind::Conference
    } else if has(JOURNAL_INDICATORS) {
        VenueKind::Journal
    } else if has(PREPRINT_INDICATORS) {
        VenueKind::Preprint
    } else {
        VenueKind::Journal
    }
}
