//! Reference-data loading.
//!
//! Two on-disk shapes are understood:
//!
//! - the journal database JSON:
//!   `{"metadata": {...}, "journals": {"<title>": {"subject": ..., "categories": ...}}}`
//! - the SCImago CSV export: `;`-delimited with `Title` and `Categories` columns.
//!
//! A missing or unreadable dataset is never fatal: [`build_registry`] logs a
//! warning and falls back to the built-in journal table.

use crate::conferences::ConferenceStore;
use crate::config::{DataConfig, MatchThresholds};
use crate::error::{Result, ScholarError};
use crate::registry::{BulkJournal, RegistryBuilder, VenueRegistry};
use crate::subjects;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// Dataset metadata block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseMetadata {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub download_date: Option<String>,
    #[serde(default)]
    pub total_journals: Option<usize>,
    #[serde(default)]
    pub subject_areas: Vec<String>,
}

/// One journal in the JSON database.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseJournal {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub categories: String,
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default)]
    pub sjr: Option<String>,
    #[serde(default)]
    pub h_index: Option<String>,
}

/// The journal database JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JournalDatabase {
    #[serde(default)]
    pub metadata: DatabaseMetadata,
    pub journals: BTreeMap<String, DatabaseJournal>,
}

impl JournalDatabase {
    /// Bulk records for [`RegistryBuilder::with_bulk`].
    pub fn into_records(self) -> Vec<BulkJournal> {
        self.journals
            .into_iter()
            .map(|(title, journal)| BulkJournal {
                title,
                categories: journal.categories,
                subject: journal.subject,
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct ScimagoCsvRow {
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Categories", default)]
    categories: String,
    #[serde(rename = "Rank", default)]
    rank: String,
    #[serde(rename = "SJR", default)]
    sjr: String,
    #[serde(rename = "H index", default)]
    h_index: String,
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// Read a JSON journal database.
pub fn read_database(path: &Path) -> Result<JournalDatabase> {
    let content = std::fs::read_to_string(path)?;
    let database: JournalDatabase = serde_json::from_str(&content)?;
    info!(
        source = database.metadata.source.as_deref().unwrap_or("Unknown"),
        year = database.metadata.year.as_deref().unwrap_or("Unknown"),
        journals = database.journals.len(),
        subject_areas = database.metadata.subject_areas.len(),
        "Read journal database"
    );
    Ok(database)
}

/// Read a SCImago CSV export into database form.
///
/// Rows without a title or without categories are skipped.
pub fn read_scimago_csv(path: &Path) -> Result<JournalDatabase> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut journals = BTreeMap::new();
    let mut subject_areas = std::collections::BTreeSet::new();
    for row in reader.deserialize::<ScimagoCsvRow>() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                warn!(error = %e, "Skipping malformed SCImago row");
                continue;
            }
        };
        let title = row.title.trim().to_lowercase();
        if title.is_empty() || row.categories.trim().is_empty() {
            continue;
        }
        let subject = subjects::extract_subjects(&row.categories).into_iter().next();
        if let Some(subject) = &subject {
            subject_areas.insert(subject.clone());
        }
        let non_empty = |s: String| (!s.is_empty()).then_some(s);
        journals.insert(
            title,
            DatabaseJournal {
                subject,
                categories: row.categories,
                rank: non_empty(row.rank),
                sjr: non_empty(row.sjr),
                h_index: non_empty(row.h_index),
            },
        );
    }

    if journals.is_empty() {
        return Err(ScholarError::Parse(format!(
            "no journal rows with Title and Categories in {:?}",
            path
        )));
    }

    info!(journals = journals.len(), "Read SCImago CSV export");
    Ok(JournalDatabase {
        metadata: DatabaseMetadata {
            source: Some("SCImago Journal Rank".to_string()),
            year: None,
            download_date: Some(chrono::Local::now().to_rfc3339()),
            total_journals: Some(journals.len()),
            subject_areas: subject_areas.into_iter().collect(),
        },
        journals,
    })
}

/// Read either dataset shape, chosen by file extension.
pub fn read_dataset(path: &Path) -> Result<JournalDatabase> {
    if is_csv(path) {
        read_scimago_csv(path)
    } else {
        read_database(path)
    }
}

/// Write a database as pretty JSON.
pub fn write_database(database: &JournalDatabase, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(database)?;
    std::fs::write(path, content)?;
    info!(journals = database.journals.len(), "Wrote journal database to {:?}", path);
    Ok(())
}

/// Build the process-wide registry from configured data.
///
/// Missing or broken files degrade to built-in tables with a warning.
pub fn build_registry(data: &DataConfig, thresholds: &MatchThresholds) -> VenueRegistry {
    let builder = RegistryBuilder::new();

    let builder = match data.scimago_path.as_deref() {
        Some(path) => match read_dataset(path) {
            Ok(database) => builder.with_bulk(database.into_records()),
            Err(e) => {
                warn!("Failed to load journal dataset {:?}, using fallback table: {}", path, e);
                builder.with_fallback()
            }
        },
        None => builder.with_fallback(),
    };

    let conferences = match data.conference_path.as_ref() {
        Some(path) => ConferenceStore::with_path(path.clone()).load(),
        None => match ConferenceStore::new() {
            Ok(store) => store.load(),
            Err(e) => {
                warn!("Conference store unavailable: {}", e);
                crate::conferences::ConferenceRegistry::builtin()
            }
        },
    };

    builder
        .with_conferences(conferences.with_alias_min_len(thresholds.conference_alias_min_len))
        .build()
}
