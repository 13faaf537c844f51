//! Conference registry and its on-disk store.
//!
//! Conferences are matched before any journal: a venue like
//! `"Proceedings of the IEEE Conference on Computer Vision and Pattern Recognition 2019"`
//! normalizes to a string that hits the CVPR alias list.

use crate::domain::Domain;
use crate::error::{Result, ScholarError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// A known conference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConferenceEntry {
    pub name: String,
    pub domain: Domain,
    #[serde(default = "unknown_rank")]
    pub rank: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

fn unknown_rank() -> String {
    "Unknown".to_string()
}

/// Boilerplate removed before comparing venue strings.
static BOILERPLATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:proceedings of|proc\.|conference on|international|acm|ieee)(?:\s|$)|\b(?:19|20)\d{2}\b")
        .expect("valid boilerplate regex")
});

static PUNCT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s&\-]").expect("valid punctuation regex"));

/// Normalize a venue string for conference comparison.
///
/// Lowercases, strips boilerplate tokens and 4-digit years, replaces
/// punctuation with spaces and collapses whitespace: `"CVPR 2022"` → `"cvpr"`.
pub fn normalize_venue(venue: &str) -> String {
    let lower = venue.to_lowercase();
    let stripped = BOILERPLATE_RE.replace_all(&lower, " ");
    let stripped = PUNCT_RE.replace_all(&stripped, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Result of a conference lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct ConferenceMatch<'a> {
    pub key: &'a str,
    pub entry: &'a ConferenceEntry,
}

/// Conference table keyed by short normalized key (`"cvpr"`).
#[derive(Debug, Clone, PartialEq)]
pub struct ConferenceRegistry {
    conferences: BTreeMap<String, ConferenceEntry>,
    /// Minimum length of the contained string in a partial alias match
    alias_min_len: usize,
}

impl Default for ConferenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConferenceRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            conferences: BTreeMap::new(),
            alias_min_len: 8,
        }
    }

    /// Registry seeded with the built-in conference list.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for (key, name, domain, rank, aliases) in BUILTIN_CONFERENCES {
            registry.add(
                key,
                ConferenceEntry {
                    name: name.to_string(),
                    domain: *domain,
                    rank: rank.to_string(),
                    aliases: aliases.iter().map(|a| a.to_string()).collect(),
                },
            );
        }
        registry
    }

    /// Override the partial alias length guard.
    pub fn with_alias_min_len(mut self, len: usize) -> Self {
        self.alias_min_len = len;
        self
    }

    /// Insert or replace a conference. Keys and aliases are stored lowercased.
    pub fn add(&mut self, key: &str, mut entry: ConferenceEntry) {
        entry.aliases = entry.aliases.iter().map(|a| a.trim().to_lowercase()).collect();
        self.conferences.insert(key.trim().to_lowercase(), entry);
    }

    pub fn len(&self) -> usize {
        self.conferences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conferences.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConferenceEntry)> {
        self.conferences.iter()
    }

    /// Find the conference a raw venue string refers to.
    pub fn lookup(&self, venue: &str) -> Option<ConferenceMatch<'_>> {
        let venue_lower = venue.trim().to_lowercase();
        let normalized = normalize_venue(venue);
        if normalized.is_empty() {
            return None;
        }

        if let Some((key, entry)) = self.conferences.get_key_value(&normalized) {
            return Some(ConferenceMatch { key, entry });
        }

        for (key, entry) in &self.conferences {
            let exact = entry
                .aliases
                .iter()
                .any(|alias| *alias == venue_lower || normalize_venue(alias) == normalized);
            if exact {
                return Some(ConferenceMatch { key, entry });
            }
        }

        // Longest contained string wins; ties keep key order
        let mut best: Option<(usize, &String, &ConferenceEntry, &String)> = None;
        let normalized_len = normalized.chars().count();
        for (key, entry) in &self.conferences {
            for alias in &entry.aliases {
                let alias_len = alias.chars().count();
                let contained = if alias_len >= self.alias_min_len
                    && (venue_lower.contains(alias.as_str()) || normalized.contains(alias.as_str()))
                {
                    alias_len
                } else if normalized_len >= self.alias_min_len && alias.contains(normalized.as_str()) {
                    normalized_len
                } else {
                    continue;
                };
                if best.map_or(true, |(len, ..)| contained > len) {
                    best = Some((contained, key, entry, alias));
                }
            }
        }

        best.map(|(_, key, entry, alias)| {
            debug!(venue = %venue_lower, alias = %alias, "Partial conference alias match");
            ConferenceMatch { key, entry }
        })
    }

    /// Count conferences per domain and per rank.
    pub fn stats(&self) -> ConferenceStats {
        let mut domains: BTreeMap<String, usize> = BTreeMap::new();
        let mut ranks: BTreeMap<String, usize> = BTreeMap::new();
        for entry in self.conferences.values() {
            *domains.entry(entry.domain.label().to_string()).or_default() += 1;
            *ranks.entry(entry.rank.clone()).or_default() += 1;
        }
        ConferenceStats {
            total_conferences: self.conferences.len(),
            domains,
            ranks,
        }
    }
}

/// Summary counts for a conference registry.
#[derive(Debug, Clone, Serialize)]
pub struct ConferenceStats {
    pub total_conferences: usize,
    pub domains: BTreeMap<String, usize>,
    pub ranks: BTreeMap<String, usize>,
}

/// On-disk form of the conference table.
#[derive(Debug, Serialize, Deserialize)]
struct ConferenceFile {
    conferences: HashMap<String, ConferenceEntry>,
    #[serde(default)]
    last_updated: Option<String>,
}

/// Default store path: `~/.scholarlens_conferences.json`
fn default_store_path() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|p| p.join(".scholarlens_conferences.json"))
        .ok_or_else(|| ScholarError::Config("Cannot determine home directory".to_string()))
}

/// Loads and saves the conference table as JSON.
pub struct ConferenceStore {
    path: PathBuf,
}

impl ConferenceStore {
    /// Create a store at the default path
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: default_store_path()?,
        })
    }

    /// Create a store at a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load the stored table.
    ///
    /// Falls back to the built-in list when the file is missing, unreadable,
    /// or empty.
    pub fn load(&self) -> ConferenceRegistry {
        if !self.path.exists() {
            debug!("Conference store not found: {:?}", self.path);
            return ConferenceRegistry::builtin();
        }

        let parsed = std::fs::read_to_string(&self.path)
            .map_err(ScholarError::from)
            .and_then(|content| Ok(serde_json::from_str::<ConferenceFile>(&content)?));

        match parsed {
            Ok(file) if !file.conferences.is_empty() => {
                let mut registry = ConferenceRegistry::new();
                for (key, entry) in file.conferences {
                    registry.add(&key, entry);
                }
                info!("Loaded {} conferences from {:?}", registry.len(), self.path);
                registry
            }
            Ok(_) => {
                warn!("Conference store {:?} is empty, using built-in list", self.path);
                ConferenceRegistry::builtin()
            }
            Err(e) => {
                warn!("Failed to load conference store: {}", e);
                ConferenceRegistry::builtin()
            }
        }
    }

    /// Save a table to the store.
    pub fn save(&self, registry: &ConferenceRegistry) -> Result<()> {
        let file = ConferenceFile {
            conferences: registry
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            last_updated: Some(chrono::Local::now().to_rfc3339()),
        };
        let content = serde_json::to_string_pretty(&file)?;
        std::fs::write(&self.path, content)?;
        info!("Saved {} conferences to {:?}", registry.len(), self.path);
        Ok(())
    }

    /// Remove the stored table
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            info!("Cleared conference store at {:?}", self.path);
        }
        Ok(())
    }
}

type BuiltinConference = (&'static str, &'static str, Domain, &'static str, &'static [&'static str]);

const BUILTIN_CONFERENCES: &[BuiltinConference] = &[
    ("cvpr", "Computer Vision and Pattern Recognition", Domain::ComputerScienceAi, "A*",
        &["computer vision and pattern recognition", "cvpr", "ieee conference on computer vision and pattern recognition"]),
    ("iccv", "International Conference on Computer Vision", Domain::ComputerScienceAi, "A*",
        &["iccv", "international conference on computer vision"]),
    ("eccv", "European Conference on Computer Vision", Domain::ComputerScienceAi, "A*",
        &["eccv", "european conference on computer vision"]),
    ("neurips", "Conference on Neural Information Processing Systems", Domain::ComputerScienceAi, "A*",
        &["neurips", "nips", "neural information processing systems",
          "advances in neural information processing systems",
          "conference on neural information processing systems"]),
    ("icml", "International Conference on Machine Learning", Domain::ComputerScienceAi, "A*",
        &["icml", "international conference on machine learning"]),
    ("iclr", "International Conference on Learning Representations", Domain::ComputerScienceAi, "A*",
        &["iclr", "international conference on learning representations"]),
    ("aaai", "AAAI Conference on Artificial Intelligence", Domain::ComputerScienceAi, "A*",
        &["aaai", "association for the advancement of artificial intelligence"]),
    ("ijcai", "International Joint Conference on Artificial Intelligence", Domain::ComputerScienceAi, "A*",
        &["ijcai", "international joint conference on artificial intelligence"]),
    ("acl", "Annual Meeting of the Association for Computational Linguistics", Domain::ComputerScienceAi, "A*",
        &["acl", "association for computational linguistics"]),
    ("emnlp", "Conference on Empirical Methods in Natural Language Processing", Domain::ComputerScienceAi, "A",
        &["emnlp", "empirical methods in natural language processing"]),
    ("naacl", "North American Chapter of the Association for Computational Linguistics", Domain::ComputerScienceAi, "A",
        &["naacl", "north american chapter of the association for computational linguistics"]),
    ("sigmod", "ACM SIGMOD International Conference on Management of Data", Domain::ComputerScienceAi, "A*",
        &["sigmod", "acm sigmod"]),
    ("vldb", "Very Large Data Bases", Domain::ComputerScienceAi, "A*",
        &["vldb", "very large data bases"]),
    ("icde", "IEEE International Conference on Data Engineering", Domain::ComputerScienceAi, "A*",
        &["icde", "ieee international conference on data engineering"]),
    ("sosp", "ACM Symposium on Operating Systems Principles", Domain::ComputerScienceAi, "A*",
        &["sosp", "symposium on operating systems principles"]),
    ("osdi", "USENIX Symposium on Operating Systems Design and Implementation", Domain::ComputerScienceAi, "A*",
        &["osdi", "operating systems design and implementation"]),
    ("nsdi", "USENIX Symposium on Networked Systems Design and Implementation", Domain::ComputerScienceAi, "A*",
        &["nsdi", "networked systems design and implementation"]),
    ("sigcomm", "ACM SIGCOMM Conference", Domain::ComputerScienceAi, "A*",
        &["sigcomm", "acm sigcomm"]),
    ("stoc", "ACM Symposium on Theory of Computing", Domain::ComputerScienceAi, "A*",
        &["stoc", "symposium on theory of computing"]),
    ("focs", "IEEE Symposium on Foundations of Computer Science", Domain::ComputerScienceAi, "A*",
        &["focs", "foundations of computer science"]),
    ("soda", "ACM-SIAM Symposium on Discrete Algorithms", Domain::ComputerScienceAi, "A*",
        &["soda", "symposium on discrete algorithms"]),
    ("siggraph", "ACM SIGGRAPH Conference", Domain::ComputerScienceAi, "A*",
        &["siggraph", "acm siggraph"]),
    ("chi", "ACM Conference on Human Factors in Computing Systems", Domain::ComputerScienceAi, "A*",
        &["chi", "human factors in computing systems"]),
    ("ccs", "ACM Conference on Computer and Communications Security", Domain::ComputerScienceAi, "A*",
        &["ccs", "computer and communications security"]),
    ("sp", "IEEE Symposium on Security and Privacy", Domain::ComputerScienceAi, "A*",
        &["sp", "ieee security and privacy", "oakland"]),
    ("usenix_security", "USENIX Security Symposium", Domain::ComputerScienceAi, "A*",
        &["usenix security", "usenix security symposium"]),
    ("icse", "International Conference on Software Engineering", Domain::ComputerScienceAi, "A*",
        &["icse", "international conference on software engineering"]),
    ("fse", "ACM SIGSOFT Symposium on Foundations of Software Engineering", Domain::ComputerScienceAi, "A*",
        &["fse", "foundations of software engineering"]),
    ("aistats", "International Conference on Artificial Intelligence and Statistics", Domain::Statistics, "A",
        &["aistats", "artificial intelligence and statistics"]),
    ("recomb", "Research in Computational Molecular Biology", Domain::Bioinformatics, "A",
        &["recomb", "research in computational molecular biology"]),
    ("ismb", "Intelligent Systems for Molecular Biology", Domain::Bioinformatics, "A",
        &["ismb", "intelligent systems for molecular biology"]),
];

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_normalize_venue() {
        assert_eq!(normalize_venue("CVPR 2022"), "cvpr");
        assert_eq!(
            normalize_venue("Proceedings of the IEEE International Conference on Computer Vision, 2017"),
            "the computer vision"
        );
        assert_eq!(normalize_venue("  ICML  "), "icml");
    }

    #[test]
    fn test_lookup_by_key_after_normalization() {
        let registry = ConferenceRegistry::builtin();
        let m = registry.lookup("CVPR 2022").expect("cvpr should match");
        assert_eq!(m.key, "cvpr");
        assert_eq!(m.entry.domain, Domain::ComputerScienceAi);
    }

    #[test]
    fn test_lookup_by_alias() {
        let registry = ConferenceRegistry::builtin();
        let m = registry
            .lookup("Advances in Neural Information Processing Systems 35")
            .expect("neurips alias");
        assert_eq!(m.key, "neurips");

        let m = registry
            .lookup("Proceedings of the IEEE/CVF Conference on Computer Vision and Pattern Recognition")
            .expect("cvpr alias inside venue");
        assert_eq!(m.key, "cvpr");
    }

    #[test]
    fn test_proceedings_strings_match_full_aliases() {
        let registry = ConferenceRegistry::builtin();
        let m = registry
            .lookup("Proceedings of the IEEE International Conference on Computer Vision")
            .expect("iccv proceedings");
        assert_eq!(m.key, "iccv");

        let m = registry
            .lookup("Proceedings of the IEEE international conference on computer vision, 1026-1034")
            .expect("iccv with pages");
        assert_eq!(m.key, "iccv");

        let m = registry
            .lookup("Proceedings of the International Conference on Machine Learning")
            .expect("icml proceedings");
        assert_eq!(m.key, "icml");
    }

    #[test]
    fn test_longest_alias_wins() {
        let registry = ConferenceRegistry::builtin();
        let m = registry
            .lookup("Proceedings of the 2019 Conference of the North American Chapter of the Association for Computational Linguistics")
            .expect("naacl");
        assert_eq!(m.key, "naacl");
    }

    #[test]
    fn test_journals_sharing_topic_words_are_not_conferences() {
        let registry = ConferenceRegistry::builtin();
        assert!(registry.lookup("International Journal of Computer Vision").is_none());
        assert!(registry.lookup("Journal of Machine Learning Research").is_none());
    }

    #[test]
    fn test_short_alias_never_matches_partially() {
        let registry = ConferenceRegistry::builtin();
        // "sp" and "chi" are aliases but too short for containment matches
        assert!(registry.lookup("Journal of Spatial Chemistry").is_none());
        assert!(registry.lookup("Annals of Statistics").is_none());
    }

    #[test]
    fn test_store_round_trip_and_fallback() -> Result<()> {
        let missing = ConferenceStore::with_path(PathBuf::from("/nonexistent/conferences.json"));
        assert_eq!(missing.load().len(), ConferenceRegistry::builtin().len());

        let temp = NamedTempFile::new()?;
        let store = ConferenceStore::with_path(temp.path().to_path_buf());
        let mut registry = ConferenceRegistry::new();
        registry.add(
            "KDD",
            ConferenceEntry {
                name: "Knowledge Discovery and Data Mining".to_string(),
                domain: Domain::ComputerScienceAi,
                rank: "A*".to_string(),
                aliases: vec!["SIGKDD".to_string()],
            },
        );
        store.save(&registry)?;

        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        let m = loaded.lookup("sigkdd").expect("alias stored lowercased");
        assert_eq!(m.key, "kdd");
        Ok(())
    }

    #[test]
    fn test_stats_counts_domains() {
        let stats = ConferenceRegistry::builtin().stats();
        assert_eq!(stats.total_conferences, 31);
        assert_eq!(stats.domains.get("Bioinformatics and Genetics"), Some(&2));
        assert_eq!(stats.domains.get("Statistics and Probability"), Some(&1));
    }
}
