//! Publication records and researcher profiles.
//!
//! These are the engine's only inputs. A profile can be read from a JSON
//! document (`{"name": ..., "publications": [...]}`) or from a CSV export with
//! `title, authors, venue, year, citations` columns.

use crate::error::{Result, ScholarError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// A single publication as scraped from a profile page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    /// Article title
    pub title: String,
    /// Raw author string, possibly truncated ("A. Smith, B. Jones, ...")
    #[serde(default, alias = "author")]
    pub authors: String,
    /// Journal/Conference venue
    #[serde(default)]
    pub venue: Option<String>,
    /// Publication year
    #[serde(default)]
    pub year: Option<i32>,
    /// Number of citations
    #[serde(default, alias = "citations")]
    pub citation_count: u64,
}

impl Publication {
    /// Venue text, empty when absent.
    pub fn venue_str(&self) -> &str {
        self.venue.as_deref().unwrap_or("").trim()
    }
}

/// A researcher profile: display name plus publication list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    /// Display name of the profile owner
    pub name: String,
    /// Raw publication records
    #[serde(default)]
    pub publications: Vec<Publication>,
}

/// CSV row; every field is read as text so malformed numbers degrade instead
/// of failing the whole file.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    title: String,
    #[serde(default, alias = "author")]
    authors: String,
    #[serde(default)]
    venue: String,
    #[serde(default)]
    year: String,
    #[serde(default, alias = "citation_count")]
    citations: String,
}

impl From<CsvRow> for Publication {
    fn from(row: CsvRow) -> Self {
        let venue = row.venue.trim();
        Publication {
            title: row.title.trim().to_string(),
            authors: row.authors.trim().to_string(),
            venue: (!venue.is_empty()).then(|| venue.to_string()),
            year: row.year.trim().parse().ok(),
            citation_count: row.citations.trim().parse().unwrap_or(0),
        }
    }
}

/// Load a profile from a JSON or CSV file, chosen by extension.
///
/// CSV files carry no owner name, so `name` must be supplied (it also
/// overrides the name stored in a JSON profile when given).
pub fn load_profile(path: &Path, name: Option<&str>) -> Result<Profile> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    let mut profile = if is_csv {
        Profile {
            name: String::new(),
            publications: read_publications_csv(path)?,
        }
    } else {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str::<Profile>(&content)?
    };

    if let Some(name) = name {
        profile.name = name.to_string();
    }

    if profile.name.trim().is_empty() {
        return Err(ScholarError::Validation(format!(
            "profile {:?} has no owner name; pass --name",
            path
        )));
    }

    info!(
        name = %profile.name,
        publications = profile.publications.len(),
        "Loaded profile"
    );
    Ok(profile)
}

/// Read publications from a CSV file with a header row.
pub fn read_publications_csv(path: &Path) -> Result<Vec<Publication>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut publications = Vec::new();
    for (idx, row) in reader.deserialize::<CsvRow>().enumerate() {
        match row {
            Ok(row) if !row.title.trim().is_empty() => publications.push(row.into()),
            Ok(_) => debug!(row = idx + 1, "Skipping row without title"),
            Err(e) => warn!(row = idx + 1, error = %e, "Skipping malformed CSV row"),
        }
    }
    Ok(publications)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_json_aliases() {
        let json = r#"{
            "name": "Kaiming He",
            "publications": [
                {"title": "Deep Residual Learning", "author": "K He, X Zhang",
                 "venue": "CVPR 2016", "year": 2016, "citations": 200000}
            ]
        }"#;
        let profile: Profile = serde_json::from_str(json).expect("parse profile");
        let publication = &profile.publications[0];
        assert_eq!(publication.authors, "K He, X Zhang");
        assert_eq!(publication.citation_count, 200000);
        assert_eq!(publication.venue_str(), "CVPR 2016");
    }

    #[test]
    fn test_load_csv_profile_is_lenient() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile()?;
        writeln!(file, "title,authors,venue,year,citations")?;
        writeln!(file, "Paper A,\"A Smith, B Jones\",Biometrika,2019,12")?;
        writeln!(file, "Paper B,C Doe,,unknown,")?;
        writeln!(file, ",Nobody,Nowhere,2020,1")?;
        file.flush()?;

        let profile = load_profile(file.path(), Some("A Smith"))?;
        assert_eq!(profile.publications.len(), 2);
        assert_eq!(profile.publications[0].year, Some(2019));
        assert_eq!(profile.publications[0].citation_count, 12);
        assert_eq!(profile.publications[1].venue, None);
        assert_eq!(profile.publications[1].year, None);
        assert_eq!(profile.publications[1].citation_count, 0);
        Ok(())
    }

    #[test]
    fn test_csv_without_name_is_rejected() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile()?;
        writeln!(file, "title,authors,venue,year,citations")?;
        file.flush()?;
        assert!(matches!(
            load_profile(file.path(), None),
            Err(ScholarError::Validation(_))
        ));
        Ok(())
    }

    #[test]
    fn test_json_profile_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        write!(
            file,
            r#"{{"name": "Jane Roe", "publications": [{{"title": "T", "authors": "Jane Roe"}}]}}"#
        )?;
        file.flush()?;
        let profile = load_profile(file.path(), None)?;
        assert_eq!(profile.name, "Jane Roe");
        assert_eq!(profile.publications[0].citation_count, 0);
        Ok(())
    }
}
