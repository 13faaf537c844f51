//! Venue registry: journal key → research domains, plus the conference table.
//!
//! The registry is assembled by [`RegistryBuilder`] in two phases. Phase one
//! loads either a bulk subject dataset or the built-in fallback table. Phase
//! two writes the critical journal table over whatever phase one produced, so
//! a handful of flagship journals can never be misclassified by noisy bulk
//! data. After [`RegistryBuilder::build`] the registry is immutable and meant
//! to be shared behind an `Arc`.

use crate::conferences::ConferenceRegistry;
use crate::domain::Domain;
use crate::subjects;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

static BUILD_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Where phase one of the load came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RegistrySource {
    /// Bulk subject dataset with this many journal records
    Bulk { journals: usize },
    /// Built-in curated table
    Fallback,
}

/// One record of a bulk subject dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkJournal {
    pub title: String,
    /// `"Subject1 (Q1); Subject2 (Q2)"`
    pub categories: String,
    /// Primary subject, used only when no category maps to a domain
    pub subject: Option<String>,
}

/// Immutable venue registry.
#[derive(Debug, Clone)]
pub struct VenueRegistry {
    journals: BTreeMap<String, Vec<Domain>>,
    conferences: ConferenceRegistry,
    version: u64,
    source: RegistrySource,
}

impl VenueRegistry {
    /// Registry built from the fallback table and built-in conferences.
    pub fn builtin() -> Self {
        RegistryBuilder::new().with_fallback().build()
    }

    /// Domains of an exact journal key (lowercased).
    pub fn lookup(&self, key: &str) -> Option<&[Domain]> {
        self.journals.get(key).map(Vec::as_slice)
    }

    /// Journal entries in key order.
    pub fn journals(&self) -> impl Iterator<Item = (&str, &[Domain])> {
        self.journals.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn conferences(&self) -> &ConferenceRegistry {
        &self.conferences
    }

    pub fn journal_count(&self) -> usize {
        self.journals.len()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn source(&self) -> RegistrySource {
        self.source
    }

    pub fn stats(&self) -> RegistryStats {
        let mut journals_per_domain: BTreeMap<String, usize> = BTreeMap::new();
        for domains in self.journals.values() {
            for domain in domains {
                *journals_per_domain.entry(domain.label().to_string()).or_default() += 1;
            }
        }
        RegistryStats {
            version: self.version,
            source: self.source,
            journals: self.journals.len(),
            conferences: self.conferences.len(),
            journals_per_domain,
        }
    }
}

/// Registry summary for `scholarlens registry` and logs.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryStats {
    pub version: u64,
    pub source: RegistrySource,
    pub journals: usize,
    pub conferences: usize,
    pub journals_per_domain: BTreeMap<String, usize>,
}

/// Builder for [`VenueRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    journals: BTreeMap<String, Vec<Domain>>,
    conferences: Option<ConferenceRegistry>,
    source: Option<RegistrySource>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Phase one from a bulk subject dataset.
    ///
    /// Categories are mapped subject by subject; journals that end up with no
    /// domain are skipped.
    pub fn with_bulk<I>(mut self, records: I) -> Self
    where
        I: IntoIterator<Item = BulkJournal>,
    {
        let mut seen = 0usize;
        let mut skipped = 0usize;
        for record in records {
            seen += 1;
            let key = record.title.trim().to_lowercase();
            if key.is_empty() {
                skipped += 1;
                continue;
            }

            let mut domains = subjects::domains_for_categories(&record.categories, &key);
            if domains.is_empty() {
                if let Some(domain) = record
                    .subject
                    .as_deref()
                    .and_then(|s| subjects::map_subject(s, &key))
                {
                    domains.push(domain);
                }
            }

            if domains.is_empty() {
                debug!(journal = %key, categories = %record.categories, "No domain for journal, skipping");
                skipped += 1;
                continue;
            }
            self.journals.insert(key, domains);
        }

        info!(records = seen, skipped, kept = self.journals.len(), "Loaded bulk journal dataset");
        self.source = Some(RegistrySource::Bulk { journals: seen });
        self
    }

    /// Phase one from the built-in fallback table.
    pub fn with_fallback(mut self) -> Self {
        for (name, domain) in FALLBACK_JOURNALS {
            self.journals.insert(name.to_string(), vec![*domain]);
        }
        info!(journals = self.journals.len(), "Loaded fallback journal table");
        self.source = Some(RegistrySource::Fallback);
        self
    }

    /// Replace the conference table (defaults to the built-in list).
    pub fn with_conferences(mut self, conferences: ConferenceRegistry) -> Self {
        self.conferences = Some(conferences);
        self
    }

    /// Apply the critical overrides and freeze the registry.
    pub fn build(mut self) -> VenueRegistry {
        for (name, domain) in CRITICAL_JOURNALS {
            self.journals.insert(name.to_string(), vec![*domain]);
        }

        let version = BUILD_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
        let registry = VenueRegistry {
            journals: self.journals,
            conferences: self.conferences.unwrap_or_else(ConferenceRegistry::builtin),
            version,
            source: self.source.unwrap_or(RegistrySource::Fallback),
        };
        info!(
            version,
            journals = registry.journal_count(),
            conferences = registry.conferences.len(),
            critical = CRITICAL_JOURNALS.len(),
            "Venue registry built"
        );
        registry
    }
}

/// Journals that must always resolve to these domains.
const CRITICAL_JOURNALS: &[(&str, Domain)] = &[
    ("ieee transactions on pattern analysis and machine intelligence", Domain::ComputerScienceAi),
    ("ieee trans pattern anal mach intell", Domain::ComputerScienceAi),
    ("ieee trans. pattern anal. mach. intell.", Domain::ComputerScienceAi),
    ("tpami", Domain::ComputerScienceAi),
    ("pattern analysis and machine intelligence", Domain::ComputerScienceAi),
    ("journal of machine learning research", Domain::ComputerScienceAi),
    ("jmlr", Domain::ComputerScienceAi),
    ("machine learning", Domain::ComputerScienceAi),
    ("neural networks", Domain::ComputerScienceAi),
    ("artificial intelligence", Domain::ComputerScienceAi),
    ("pattern recognition", Domain::ComputerScienceAi),
    ("ieee transactions on image processing", Domain::ComputerScienceAi),
    ("ieee transactions on neural networks and learning systems", Domain::ComputerScienceAi),
    ("international journal of computer vision", Domain::ComputerScienceAi),
    ("ijcv", Domain::ComputerScienceAi),
    ("computer vision and image understanding", Domain::ComputerScienceAi),
    ("journal of artificial intelligence research", Domain::ComputerScienceAi),
    ("jair", Domain::ComputerScienceAi),
    ("communications of the acm", Domain::ComputerScienceAi),
    ("acm computing surveys", Domain::ComputerScienceAi),
    ("ieee transactions on computers", Domain::ComputerScienceAi),
    ("ieee transactions on software engineering", Domain::ComputerScienceAi),
    ("acm transactions on graphics", Domain::ComputerScienceAi),
    ("ieee computer", Domain::ComputerScienceAi),
    ("journal of the american statistical association", Domain::Statistics),
    ("jasa", Domain::Statistics),
    ("biometrika", Domain::Statistics),
    ("annals of statistics", Domain::Statistics),
    ("journal of the royal statistical society", Domain::Statistics),
    ("statistical science", Domain::Statistics),
];

/// Curated table used when no bulk dataset is available.
const FALLBACK_JOURNALS: &[(&str, Domain)] = &[
    // Statistics
    ("journal of the american statistical association", Domain::Statistics),
    ("biometrika", Domain::Statistics),
    ("annals of statistics", Domain::Statistics),
    ("journal of the royal statistical society", Domain::Statistics),
    ("journal of the royal statistical society series b", Domain::Statistics),
    ("journal of the royal statistical society series c", Domain::Statistics),
    ("statistical science", Domain::Statistics),
    ("biostatistics", Domain::Statistics),
    ("statistics in medicine", Domain::Statistics),
    ("electronic journal of statistics", Domain::Statistics),
    ("electronic journal of probability", Domain::Statistics),
    ("electronic communications in probability", Domain::Statistics),
    ("journal of statistical planning and inference", Domain::Statistics),
    ("computational statistics and data analysis", Domain::Statistics),
    ("computational statistics", Domain::Statistics),
    ("statistics and computing", Domain::Statistics),
    ("journal of computational and graphical statistics", Domain::Statistics),
    ("canadian journal of statistics", Domain::Statistics),
    ("scandinavian journal of statistics", Domain::Statistics),
    ("journal of multivariate analysis", Domain::Statistics),
    ("journal of nonparametric statistics", Domain::Statistics),
    ("journal of time series analysis", Domain::Statistics),
    ("bernoulli", Domain::Statistics),
    ("probability theory and related fields", Domain::Statistics),
    ("stochastic processes and their applications", Domain::Statistics),
    ("bayesian analysis", Domain::Statistics),
    ("spatial statistics", Domain::Statistics),
    ("econometrics and statistics", Domain::Statistics),
    ("chemometrics and intelligent laboratory systems", Domain::Statistics),
    ("journal of statistical software", Domain::Statistics),
    ("annals of applied statistics", Domain::Statistics),
    ("journal of business and economic statistics", Domain::Statistics),
    ("statistical methods in medical research", Domain::Statistics),
    ("test", Domain::Statistics),
    // Mathematics
    ("electronic journal of differential equations", Domain::Mathematics),
    ("journal of differential equations", Domain::Mathematics),
    ("nonlinear analysis", Domain::Mathematics),
    ("advances in mathematics", Domain::Mathematics),
    ("journal of mathematical analysis and applications", Domain::Mathematics),
    ("proceedings of the american mathematical society", Domain::Mathematics),
    ("transactions of the american mathematical society", Domain::Mathematics),
    ("communications in mathematical physics", Domain::Mathematics),
    ("journal of functional analysis", Domain::Mathematics),
    ("calculus of variations and partial differential equations", Domain::Mathematics),
    // Computer science and AI
    ("journal of machine learning research", Domain::ComputerScienceAi),
    ("machine learning", Domain::ComputerScienceAi),
    ("neural networks", Domain::ComputerScienceAi),
    ("artificial intelligence", Domain::ComputerScienceAi),
    ("pattern recognition", Domain::ComputerScienceAi),
    ("communications of the acm", Domain::ComputerScienceAi),
    ("ieee transactions on computers", Domain::ComputerScienceAi),
    ("ieee transactions on software engineering", Domain::ComputerScienceAi),
    ("acm computing surveys", Domain::ComputerScienceAi),
    ("ieee transactions on pattern analysis and machine intelligence", Domain::ComputerScienceAi),
    ("ieee trans pattern anal mach intell", Domain::ComputerScienceAi),
    ("ieee trans. pattern anal. mach. intell.", Domain::ComputerScienceAi),
    ("tpami", Domain::ComputerScienceAi),
    ("pattern analysis and machine intelligence", Domain::ComputerScienceAi),
    ("ieee transactions on image processing", Domain::ComputerScienceAi),
    ("ieee transactions on neural networks and learning systems", Domain::ComputerScienceAi),
    ("ieee transactions on evolutionary computation", Domain::ComputerScienceAi),
    ("ieee transactions on cybernetics", Domain::ComputerScienceAi),
    ("ieee transactions on automation science and engineering", Domain::ComputerScienceAi),
    ("ieee transactions on robotics", Domain::ComputerScienceAi),
    ("ieee transactions on systems man and cybernetics", Domain::ComputerScienceAi),
    ("ieee computer graphics and applications", Domain::ComputerScienceAi),
    ("ieee transactions on visualization and computer graphics", Domain::ComputerScienceAi),
    ("ieee transactions on multimedia", Domain::ComputerScienceAi),
    ("ieee transactions on knowledge and data engineering", Domain::ComputerScienceAi),
    ("ieee transactions on parallel and distributed systems", Domain::ComputerScienceAi),
    ("ieee transactions on mobile computing", Domain::ComputerScienceAi),
    ("journal of artificial intelligence research", Domain::ComputerScienceAi),
    ("jair", Domain::ComputerScienceAi),
    ("international journal of computer vision", Domain::ComputerScienceAi),
    ("ijcv", Domain::ComputerScienceAi),
    ("computer vision and image understanding", Domain::ComputerScienceAi),
    ("cviu", Domain::ComputerScienceAi),
    ("ieee computer", Domain::ComputerScienceAi),
    ("acm transactions on graphics", Domain::ComputerScienceAi),
    ("acm transactions on computer systems", Domain::ComputerScienceAi),
    ("acm transactions on programming languages and systems", Domain::ComputerScienceAi),
    // Bioinformatics and genetics
    ("bioinformatics", Domain::Bioinformatics),
    ("nature genetics", Domain::Bioinformatics),
    ("genome research", Domain::Bioinformatics),
    ("genome biology", Domain::Bioinformatics),
    ("nucleic acids research", Domain::Bioinformatics),
    ("plos computational biology", Domain::Bioinformatics),
    ("bmc bioinformatics", Domain::Bioinformatics),
    ("nature biotechnology", Domain::Bioinformatics),
    // Environmental and earth sciences
    ("ecology", Domain::Environmental),
    ("journal of ecology", Domain::Environmental),
    ("conservation biology", Domain::Environmental),
    ("ecological applications", Domain::Environmental),
    ("global change biology", Domain::Environmental),
    ("environmental science & technology", Domain::Environmental),
    ("remote sensing", Domain::Environmental),
    ("ieee transactions on geoscience and remote sensing", Domain::Environmental),
    ("remote sensing of environment", Domain::Environmental),
    // Economics and finance
    ("american economic review", Domain::Economics),
    ("journal of political economy", Domain::Economics),
    ("quarterly journal of economics", Domain::Economics),
    ("econometrica", Domain::Economics),
    ("journal of finance", Domain::Economics),
    ("review of financial studies", Domain::Economics),
    // Social sciences
    ("psychological science", Domain::SocialSciences),
    ("journal of personality and social psychology", Domain::SocialSciences),
    ("american journal of sociology", Domain::SocialSciences),
    ("social forces", Domain::SocialSciences),
    // Medicine and health
    ("new england journal of medicine", Domain::Medicine),
    ("lancet", Domain::Medicine),
    ("jama", Domain::Medicine),
    ("nature medicine", Domain::Medicine),
    ("cell", Domain::Medicine),
    ("science", Domain::Medicine),
    ("journal of physical activity and health", Domain::Medicine),
    ("jmir research protocols", Domain::Medicine),
    ("preventive medicine", Domain::Medicine),
    ("american journal of preventive medicine", Domain::Medicine),
    // Preprint servers
    ("arxiv", Domain::Preprints),
    ("biorxiv", Domain::Preprints),
    ("medrxiv", Domain::Preprints),
    ("ssrn", Domain::Preprints),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn bulk(title: &str, categories: &str) -> BulkJournal {
        BulkJournal {
            title: title.to_string(),
            categories: categories.to_string(),
            subject: None,
        }
    }

    #[test]
    fn test_builtin_registry_has_fallback_and_critical() {
        let registry = VenueRegistry::builtin();
        assert_eq!(registry.source(), RegistrySource::Fallback);
        assert_eq!(registry.lookup("tpami"), Some(&[Domain::ComputerScienceAi][..]));
        assert_eq!(registry.lookup("arxiv"), Some(&[Domain::Preprints][..]));
        assert_eq!(registry.lookup("nature"), None);
        assert_eq!(registry.conferences().len(), 31);
    }

    #[test]
    fn test_critical_overrides_bulk_data() {
        let registry = RegistryBuilder::new()
            .with_bulk(vec![
                bulk("Machine Learning", "Software (Q1); Artificial Intelligence (Q1)"),
                bulk("Annals of Statistics", "Medicine (Q1)"),
                bulk("Genes & Cancer", "Oncology (Q2); Genetics (Q3)"),
            ])
            .build();
        assert_eq!(registry.lookup("annals of statistics"), Some(&[Domain::Statistics][..]));
        assert_eq!(
            registry.lookup("genes & cancer"),
            Some(&[Domain::Medicine, Domain::Bioinformatics][..])
        );
        assert_eq!(registry.source(), RegistrySource::Bulk { journals: 3 });
    }

    #[test]
    fn test_bulk_skips_unmapped_journals() {
        let registry = RegistryBuilder::new()
            .with_bulk(vec![
                bulk("Poetry Quarterly", "Literature and Literary Theory (Q1)"),
                BulkJournal {
                    title: "Odd Fellow".to_string(),
                    categories: String::new(),
                    subject: Some("Economics".to_string()),
                },
            ])
            .build();
        assert_eq!(registry.lookup("poetry quarterly"), None);
        assert_eq!(registry.lookup("odd fellow"), Some(&[Domain::Economics][..]));
    }

    #[test]
    fn test_versions_increase() {
        let a = VenueRegistry::builtin();
        let b = VenueRegistry::builtin();
        assert!(b.version() > a.version());
    }

    #[test]
    fn test_stats_counts_domains() {
        let stats = VenueRegistry::builtin().stats();
        assert_eq!(stats.conferences, 31);
        assert!(stats.journals > 100);
        assert_eq!(stats.journals_per_domain.get("Preprints & Working Papers"), Some(&4));
    }
}
