//! Engine configuration.
//!
//! Every threshold used by the venue matcher lives here rather than as a
//! hard constant, so it can be tuned from TOML:
//!
//! ```toml
//! [matching]
//! min_accept_score = 80
//! word_overlap_high_ratio = 0.9
//!
//! [data]
//! scimago_path = "scimago_journals.json"
//!
//! [enrichment]
//! enabled = true
//! timeout_secs = 30
//! ```
//!
//! Files cascade: platform config dir `scholarlens/config.toml`, then
//! `.scholarlens.toml` in the working directory, then an explicit path.
//! Later files override earlier ones key by key.

use crate::error::{Result, ScholarError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the per-directory override file.
pub const LOCAL_CONFIG_FILE: &str = ".scholarlens.toml";

/// Scoring and acceptance thresholds for venue resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchThresholds {
    /// Winning candidate must score at least this much
    pub min_accept_score: u32,
    /// Score when a registry key occurs inside the venue
    pub exact_substring_score: u32,
    /// Score when the venue occurs inside a registry key
    pub reverse_substring_score: u32,
    /// Minimum length of the contained string for either substring rule
    pub substring_min_len: usize,
    /// Score for a whole-word acronym hit
    pub acronym_score: u32,
    /// Keys at most this long are treated as acronyms
    pub acronym_max_len: usize,
    /// Score for a hand-specified venue pattern
    pub special_pattern_score: u32,
    /// Word-overlap base score
    pub word_overlap_base: u32,
    /// Word-overlap score added per unit of overlap ratio
    pub word_overlap_scale: f64,
    /// Keys shorter than this never take part in word overlap
    pub word_overlap_min_key_len: usize,
    /// Keys need at least this many significant words
    pub word_overlap_min_key_words: usize,
    /// Ratio required together with `word_overlap_min_shared`
    pub word_overlap_ratio: f64,
    /// Shared words required at `word_overlap_ratio`
    pub word_overlap_min_shared: usize,
    /// Ratio required together with `word_overlap_high_min_shared`
    pub word_overlap_high_ratio: f64,
    /// Shared words required at `word_overlap_high_ratio`
    pub word_overlap_high_min_shared: usize,
    /// Shared words that must survive stop-word removal
    pub word_overlap_min_meaningful: usize,
    /// Partial conference alias matches need this many characters
    pub conference_alias_min_len: usize,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            min_accept_score: 80,
            exact_substring_score: 100,
            reverse_substring_score: 95,
            substring_min_len: 10,
            acronym_score: 90,
            acronym_max_len: 8,
            special_pattern_score: 85,
            word_overlap_base: 60,
            word_overlap_scale: 30.0,
            word_overlap_min_key_len: 15,
            word_overlap_min_key_words: 3,
            word_overlap_ratio: 0.8,
            word_overlap_min_shared: 3,
            word_overlap_high_ratio: 0.9,
            word_overlap_high_min_shared: 2,
            word_overlap_min_meaningful: 2,
            conference_alias_min_len: 8,
        }
    }
}

/// Locations of reference data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// SCImago journal database (`.json`) or CSV export (`.csv`)
    pub scimago_path: Option<PathBuf>,
    /// Persisted conference table
    pub conference_path: Option<PathBuf>,
}

/// Semantic Scholar enrichment settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub enabled: bool,
    /// Deadline for the whole enrichment pass
    pub timeout_secs: u64,
    /// Maximum number of papers looked up
    pub sample_size: usize,
    /// Multiplier applied to domains confirmed by the lookup
    pub boost: f64,
    /// Pause between consecutive requests
    pub request_delay_ms: u64,
    /// Minimum Jaccard similarity between our title and the returned one
    pub min_title_similarity: f64,
    pub api_key: Option<String>,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_secs: 60,
            sample_size: 30,
            boost: 1.2,
            request_delay_ms: 200,
            min_title_similarity: 0.7,
            api_key: None,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub matching: MatchThresholds,
    pub data: DataConfig,
    pub enrichment: EnrichmentConfig,
}

/// Platform config path: `<config_dir>/scholarlens/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("scholarlens").join("config.toml"))
}

impl EngineConfig {
    /// Load the cascaded configuration.
    ///
    /// Missing cascade files are skipped. An explicit path must exist and
    /// parse.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut merged = toml::Table::new();

        let cascade = config_path()
            .into_iter()
            .chain(std::iter::once(PathBuf::from(LOCAL_CONFIG_FILE)));
        for path in cascade {
            if path.exists() {
                debug!(path = ?path, "Reading config file");
                merge_tables(&mut merged, read_table(&path)?);
            }
        }

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ScholarError::Config(format!(
                    "config file {:?} does not exist",
                    path
                )));
            }
            merge_tables(&mut merged, read_table(path)?);
        }

        let config: EngineConfig = toml::Value::Table(merged).try_into()?;
        info!(
            min_accept_score = config.matching.min_accept_score,
            enrichment = config.enrichment.enabled,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Parse a configuration from TOML text, filling gaps with defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

fn read_table(path: &Path) -> Result<toml::Table> {
    let content = std::fs::read_to_string(path)?;
    Ok(content.parse::<toml::Table>()?)
}

/// Merge `overlay` into `base`; nested tables merge key by key, everything
/// else is replaced.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_documented_constants() {
        let t = MatchThresholds::default();
        assert_eq!(t.min_accept_score, 80);
        assert_eq!(t.word_overlap_ratio, 0.8);
        assert_eq!(t.word_overlap_min_shared, 3);
        assert_eq!(t.word_overlap_high_ratio, 0.9);
        assert_eq!(t.word_overlap_high_min_shared, 2);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() -> Result<()> {
        let config = EngineConfig::from_toml_str(
            "[matching]\nmin_accept_score = 70\n[enrichment]\nenabled = true\n",
        )?;
        assert_eq!(config.matching.min_accept_score, 70);
        assert_eq!(config.matching.acronym_max_len, 8);
        assert!(config.enrichment.enabled);
        assert_eq!(config.enrichment.timeout_secs, 60);
        Ok(())
    }

    #[test]
    fn test_merge_tables_is_key_by_key() -> Result<()> {
        let mut base: toml::Table = "[matching]\nmin_accept_score = 70\nacronym_score = 91\n"
            .parse()
            .map_err(ScholarError::from)?;
        let overlay: toml::Table = "[matching]\nmin_accept_score = 75\n"
            .parse()
            .map_err(ScholarError::from)?;
        merge_tables(&mut base, overlay);
        let config: EngineConfig = toml::Value::Table(base).try_into()?;
        assert_eq!(config.matching.min_accept_score, 75);
        assert_eq!(config.matching.acronym_score, 91);
        Ok(())
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let result = EngineConfig::load(Some(Path::new("/nonexistent/scholarlens.toml")));
        assert!(matches!(result, Err(ScholarError::Config(_))));
    }

    #[test]
    fn test_explicit_file_is_applied() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "[data]\nscimago_path = \"db.json\"")?;
        file.flush()?;
        let config = EngineConfig::load(Some(file.path()))?;
        assert_eq!(config.data.scimago_path, Some(PathBuf::from("db.json")));
        Ok(())
    }
}
