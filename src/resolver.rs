//! Venue resolution: raw venue string → registry entry.
//!
//! Resolution order:
//!
//! 1. conference table (after venue normalization), which always wins;
//! 2. exact journal key;
//! 3. scored candidates (substring, acronym, word overlap, special patterns),
//!    best by `(score, key_len)` with ties broken on the smallest key, and
//!    accepted only at or above `min_accept_score`.

use crate::config::MatchThresholds;
use crate::domain::{ClassificationMethod, Domain};
use crate::registry::VenueRegistry;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Words that never count towards a meaningful word overlap.
const OVERLAP_STOP_WORDS: &[&str] = &[
    "journal",
    "of",
    "the",
    "and",
    "for",
    "in",
    "on",
    "international",
    "society",
    "research",
];

/// Hand-specified patterns: (substring, domain, canonical key).
const SPECIAL_PATTERNS: &[(&str, Domain, &str)] = &[
    ("royal statistical society", Domain::Statistics, "journal of the royal statistical society"),
    ("american statistical association", Domain::Statistics, "journal of the american statistical association"),
    ("biometrika", Domain::Statistics, "biometrika"),
    ("statistica sinica", Domain::Statistics, "statistica sinica"),
    ("annals of statistics", Domain::Statistics, "annals of statistics"),
    ("journal of econometrics", Domain::Statistics, "journal of econometrics"),
    ("econometric theory", Domain::Statistics, "econometric theory"),
    ("bernoulli", Domain::Statistics, "bernoulli"),
    ("arxiv", Domain::Preprints, "arxiv"),
    ("biorxiv", Domain::Preprints, "biorxiv"),
    ("medrxiv", Domain::Preprints, "medrxiv"),
    ("ssrn", Domain::Preprints, "ssrn"),
    ("neurips", Domain::ComputerScienceAi, "neurips"),
    ("nips", Domain::ComputerScienceAi, "neurips"),
    ("icml", Domain::ComputerScienceAi, "icml"),
    ("iclr", Domain::ComputerScienceAi, "iclr"),
    ("cvpr", Domain::ComputerScienceAi, "cvpr"),
    ("iccv", Domain::ComputerScienceAi, "iccv"),
    ("ijcai", Domain::ComputerScienceAi, "ijcai"),
    ("aaai", Domain::ComputerScienceAi, "aaai"),
];

/// How a candidate (or final match) was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Conference,
    Exact,
    ExactSubstring,
    ReverseSubstring,
    Acronym,
    WordOverlap,
    SpecialPattern,
}

/// A scored registry candidate for one venue string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchCandidate {
    pub score: u32,
    pub key_len: usize,
    pub key: String,
    pub domains: Vec<Domain>,
    pub kind: MatchKind,
}

impl MatchCandidate {
    /// Best-first ordering: higher score, then longer key, then smaller key.
    fn rank(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then(other.key_len.cmp(&self.key_len))
            .then_with(|| self.key.cmp(&other.key))
    }
}

/// An accepted resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VenueMatch {
    pub domains: Vec<Domain>,
    pub matched_key: String,
    pub method: ClassificationMethod,
    pub kind: MatchKind,
    pub score: u32,
}

/// Full trace of a resolution, for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub venue: String,
    /// Candidates best-first; empty for conference or exact hits
    pub candidates: Vec<MatchCandidate>,
    pub accepted: Option<VenueMatch>,
}

/// Resolves venue strings against a shared registry.
#[derive(Debug, Clone)]
pub struct VenueResolver {
    registry: Arc<VenueRegistry>,
    thresholds: MatchThresholds,
}

impl VenueResolver {
    pub fn new(registry: Arc<VenueRegistry>, thresholds: MatchThresholds) -> Self {
        Self {
            registry,
            thresholds,
        }
    }

    pub fn registry(&self) -> &Arc<VenueRegistry> {
        &self.registry
    }

    pub fn thresholds(&self) -> &MatchThresholds {
        &self.thresholds
    }

    /// Resolve a venue, or `None` when nothing clears the threshold.
    pub fn resolve(&self, raw_venue: &str) -> Option<VenueMatch> {
        self.explain(raw_venue).accepted
    }

    /// Resolve a venue and keep every scored candidate.
    pub fn explain(&self, raw_venue: &str) -> Resolution {
        let venue = raw_venue.trim();
        let venue_lower = venue.to_lowercase();
        let mut resolution = Resolution {
            venue: venue.to_string(),
            candidates: Vec::new(),
            accepted: None,
        };
        if venue_lower.is_empty() {
            return resolution;
        }

        if let Some(conference) = self.registry.conferences().lookup(venue) {
            info!(venue = %venue, conference = %conference.entry.name, "Conference match");
            resolution.accepted = Some(VenueMatch {
                domains: vec![conference.entry.domain],
                matched_key: conference.key.to_string(),
                method: ClassificationMethod::Conference,
                kind: MatchKind::Conference,
                score: self.thresholds.exact_substring_score,
            });
            return resolution;
        }

        if let Some(domains) = self.registry.lookup(&venue_lower) {
            info!(venue = %venue, "Direct journal match");
            resolution.accepted = Some(VenueMatch {
                domains: domains.to_vec(),
                matched_key: venue_lower,
                method: ClassificationMethod::Venue,
                kind: MatchKind::Exact,
                score: self.thresholds.exact_substring_score,
            });
            return resolution;
        }

        let mut candidates = self.candidates(&venue_lower);
        candidates.sort_by(MatchCandidate::rank);

        if let Some(best) = candidates.first() {
            if best.score >= self.thresholds.min_accept_score {
                info!(
                    venue = %venue_lower,
                    key = %best.key,
                    score = best.score,
                    kind = ?best.kind,
                    "Accepted journal match"
                );
                resolution.accepted = Some(VenueMatch {
                    domains: best.domains.clone(),
                    matched_key: best.key.clone(),
                    method: ClassificationMethod::Venue,
                    kind: best.kind,
                    score: best.score,
                });
            } else {
                debug!(
                    venue = %venue_lower,
                    key = %best.key,
                    score = best.score,
                    "Rejected low-quality journal match"
                );
            }
        } else {
            debug!(venue = %venue_lower, "No journal candidates");
        }

        resolution.candidates = candidates;
        resolution
    }

    /// Score every registry key against a lowercased venue.
    fn candidates(&self, venue_lower: &str) -> Vec<MatchCandidate> {
        let t = &self.thresholds;
        let venue_len = char_len(venue_lower);
        let venue_clean = venue_lower
            .replace(['(', ')', ',', '.'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        let venue_words: BTreeSet<&str> = venue_clean
            .split_whitespace()
            .filter(|w| char_len(w) > 2)
            .collect();

        let mut candidates = Vec::new();
        for (key, domains) in self.registry.journals() {
            let key_len = char_len(key);
            let candidate = |score, key_len, kind| MatchCandidate {
                score,
                key_len,
                key: key.to_string(),
                domains: domains.to_vec(),
                kind,
            };

            if key_len >= t.substring_min_len && venue_lower.contains(key) {
                candidates.push(candidate(t.exact_substring_score, key_len, MatchKind::ExactSubstring));
            } else if venue_len >= t.substring_min_len && key.contains(venue_lower) {
                candidates.push(candidate(
                    t.reverse_substring_score,
                    venue_len,
                    MatchKind::ReverseSubstring,
                ));
            }

            if key_len <= t.acronym_max_len && contains_word(venue_lower, key) {
                candidates.push(candidate(t.acronym_score, key_len, MatchKind::Acronym));
            }

            if key_len >= t.word_overlap_min_key_len {
                if let Some(score) = self.word_overlap_score(key, &venue_words) {
                    candidates.push(candidate(score, key_len, MatchKind::WordOverlap));
                }
            }
        }

        for (pattern, domain, key) in SPECIAL_PATTERNS {
            if venue_lower.contains(pattern) {
                candidates.push(MatchCandidate {
                    score: t.special_pattern_score,
                    key_len: char_len(pattern),
                    key: key.to_string(),
                    domains: vec![*domain],
                    kind: MatchKind::SpecialPattern,
                });
            }
        }

        candidates
    }

    fn word_overlap_score(&self, key: &str, venue_words: &BTreeSet<&str>) -> Option<u32> {
        let t = &self.thresholds;
        let key_words: BTreeSet<&str> = key.split_whitespace().filter(|w| char_len(w) > 2).collect();
        if key_words.len() < t.word_overlap_min_key_words {
            return None;
        }

        let shared: Vec<&str> = key_words.intersection(venue_words).copied().collect();
        let ratio = shared.len() as f64 / key_words.len() as f64;
        let strong = (ratio >= t.word_overlap_ratio && shared.len() >= t.word_overlap_min_shared)
            || (ratio >= t.word_overlap_high_ratio && shared.len() >= t.word_overlap_high_min_shared);
        if !strong {
            return None;
        }

        let meaningful = shared
            .iter()
            .filter(|w| !OVERLAP_STOP_WORDS.contains(w))
            .count();
        if meaningful < t.word_overlap_min_meaningful {
            return None;
        }

        Some(t.word_overlap_base + (ratio * t.word_overlap_scale) as u32)
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Whether `needle` occurs in `haystack` delimited by regex-style word
/// boundaries at both ends.
pub(crate) fn contains_word(haystack: &str, needle: &str) -> bool {
    let (Some(first), Some(last)) = (needle.chars().next(), needle.chars().next_back()) else {
        return false;
    };

    haystack.match_indices(needle).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        let left_ok = before.is_some_and(is_word_char) != is_word_char(first);
        let right_ok = after.is_some_and(is_word_char) != is_word_char(last);
        left_ok && right_ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> VenueResolver {
        VenueResolver::new(Arc::new(VenueRegistry::builtin()), MatchThresholds::default())
    }

    #[test]
    fn test_contains_word() {
        assert!(contains_word("ieee tpami 2020", "tpami"));
        assert!(contains_word("tpami", "tpami"));
        assert!(!contains_word("tpamix", "tpami"));
        assert!(!contains_word("cellular biology", "cell"));
        assert!(contains_word("cell, reports", "cell"));
        assert!(!contains_word("anything", ""));
    }

    #[test]
    fn test_tpami_abbreviation() {
        let m = resolver()
            .resolve("IEEE Trans. Pattern Anal. Mach. Intell.")
            .expect("tpami abbreviation");
        assert_eq!(m.domains, vec![Domain::ComputerScienceAi]);
        assert_eq!(m.kind, MatchKind::Exact);

        let m = resolver()
            .resolve("IEEE Transactions on Pattern Analysis and Machine Intelligence 44 (3)")
            .expect("tpami full name");
        assert_eq!(m.domains, vec![Domain::ComputerScienceAi]);
        assert_eq!(m.matched_key, "ieee transactions on pattern analysis and machine intelligence");
        assert_eq!(m.kind, MatchKind::ExactSubstring);
    }

    #[test]
    fn test_conference_wins() {
        let m = resolver().resolve("CVPR 2022").expect("cvpr");
        assert_eq!(m.method, ClassificationMethod::Conference);
        assert_eq!(m.domains, vec![Domain::ComputerScienceAi]);
        assert_eq!(m.matched_key, "cvpr");
    }

    #[test]
    fn test_acronym_and_special_pattern() {
        let m = resolver().resolve("JASA, vol. 12").expect("jasa acronym");
        assert_eq!(m.kind, MatchKind::Acronym);
        assert_eq!(m.domains, vec![Domain::Statistics]);

        let m = resolver()
            .resolve("Journal of the Royal Statistical Society: Series B (Statistical Methodology)")
            .expect("jrss");
        assert_eq!(m.domains, vec![Domain::Statistics]);
    }

    #[test]
    fn test_word_overlap() {
        // "of" is too short to count and "and" is missing, so 4 of 5 key words are shared
        let m = resolver()
            .resolve("Journal Mathematical Analysis Applications")
            .expect("overlap match");
        assert_eq!(m.kind, MatchKind::WordOverlap);
        assert_eq!(m.matched_key, "journal of mathematical analysis and applications");
        assert_eq!(m.score, 84);
        assert_eq!(m.domains, vec![Domain::Mathematics]);
    }

    #[test]
    fn test_generic_word_overlap_rejected() {
        let resolution = resolver().explain("International Journal of Research");
        assert!(resolution.accepted.is_none());
    }

    #[test]
    fn test_below_threshold_is_none() {
        let mut thresholds = MatchThresholds::default();
        thresholds.min_accept_score = 101;
        let resolver = VenueResolver::new(Arc::new(VenueRegistry::builtin()), thresholds);
        let resolution = resolver.explain("Some Workshop on Biometrika Methods");
        assert!(resolution.accepted.is_none());
        assert!(!resolution.candidates.is_empty());
    }

    #[test]
    fn test_ties_break_on_smallest_key() {
        let a = MatchCandidate {
            score: 90,
            key_len: 4,
            key: "beta".to_string(),
            domains: vec![],
            kind: MatchKind::Acronym,
        };
        let b = MatchCandidate {
            key: "alfa".to_string(),
            ..a.clone()
        };
        let mut v = vec![a, b];
        v.sort_by(MatchCandidate::rank);
        assert_eq!(v[0].key, "alfa");
    }

    #[test]
    fn test_empty_venue() {
        assert!(resolver().resolve("   ").is_none());
    }
}
