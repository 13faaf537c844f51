//! Research-domain taxonomy and classification provenance tags.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Size of the canonical top-level domain set used as the
/// interdisciplinarity denominator.
pub const CANONICAL_DOMAIN_COUNT: usize = 9;

/// A top-level research domain.
///
/// Serialized as its human-readable label, e.g. `"Computer Science and AI"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Domain {
    #[serde(rename = "Statistics and Probability")]
    Statistics,
    #[serde(rename = "Computer Science and AI")]
    ComputerScienceAi,
    #[serde(rename = "Mathematics")]
    Mathematics,
    #[serde(rename = "Bioinformatics and Genetics")]
    Bioinformatics,
    #[serde(rename = "Economics and Finance")]
    Economics,
    #[serde(rename = "Medicine and Health Sciences")]
    Medicine,
    #[serde(rename = "Environmental and Earth Sciences")]
    Environmental,
    #[serde(rename = "Physics and Chemistry")]
    PhysicsChemistry,
    #[serde(rename = "Engineering")]
    Engineering,
    #[serde(rename = "Social Sciences")]
    SocialSciences,
    #[serde(rename = "Preprints & Working Papers")]
    Preprints,
}

impl Domain {
    /// Every domain, in declaration order.
    pub const ALL: [Domain; 11] = [
        Domain::Statistics,
        Domain::ComputerScienceAi,
        Domain::Mathematics,
        Domain::Bioinformatics,
        Domain::Economics,
        Domain::Medicine,
        Domain::Environmental,
        Domain::PhysicsChemistry,
        Domain::Engineering,
        Domain::SocialSciences,
        Domain::Preprints,
    ];

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Domain::Statistics => "Statistics and Probability",
            Domain::ComputerScienceAi => "Computer Science and AI",
            Domain::Mathematics => "Mathematics",
            Domain::Bioinformatics => "Bioinformatics and Genetics",
            Domain::Economics => "Economics and Finance",
            Domain::Medicine => "Medicine and Health Sciences",
            Domain::Environmental => "Environmental and Earth Sciences",
            Domain::PhysicsChemistry => "Physics and Chemistry",
            Domain::Engineering => "Engineering",
            Domain::SocialSciences => "Social Sciences",
            Domain::Preprints => "Preprints & Working Papers",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Domain {
    type Err = String;

    /// Accepts the display label case-insensitively, with `&` and `and`
    /// treated alike ("Statistics & Probability" parses).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_label(s);
        Domain::ALL
            .into_iter()
            .find(|d| normalize_label(d.label()) == wanted)
            .ok_or_else(|| format!("unknown domain label '{}'", s.trim()))
    }
}

fn normalize_label(s: &str) -> String {
    s.to_lowercase()
        .replace('&', " and ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// How a publication's domains were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationMethod {
    /// Journal registry match
    Venue,
    /// Keyword fallback over title and venue
    Keyword,
    /// Conference registry match, or a venue that reads as a conference
    Conference,
    /// Preprint server
    Preprint,
}

impl fmt::Display for ClassificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClassificationMethod::Venue => "venue",
            ClassificationMethod::Keyword => "keyword",
            ClassificationMethod::Conference => "conference",
            ClassificationMethod::Preprint => "preprint",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_round_trip_through_from_str() {
        for domain in Domain::ALL {
            assert_eq!(domain.label().parse::<Domain>(), Ok(domain));
        }
    }

    #[test]
    fn test_from_str_accepts_ampersand_variant() {
        assert_eq!(
            "Statistics & Probability".parse::<Domain>(),
            Ok(Domain::Statistics)
        );
        assert_eq!(
            "  computer science AND ai ".parse::<Domain>(),
            Ok(Domain::ComputerScienceAi)
        );
        assert!("Alchemy".parse::<Domain>().is_err());
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&Domain::Preprints).expect("serialize");
        assert_eq!(json, "\"Preprints & Working Papers\"");
        let method = serde_json::to_string(&ClassificationMethod::Conference).expect("serialize");
        assert_eq!(method, "\"conference\"");
    }
}
