//! Domain aggregation over a publication list.
//!
//! Each publication is classified independently (in parallel), then the
//! per-paper results are folded in input order so the distribution is
//! identical however the work was scheduled.

use crate::domain::{ClassificationMethod, Domain, CANONICAL_DOMAIN_COUNT};
use crate::keywords::KeywordClassifier;
use crate::publication::Publication;
use crate::resolver::VenueResolver;
use crate::venue_kind::{self, VenueKind};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Domains assigned to one publication.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainAssignment {
    /// Position in the input list
    pub index: usize,
    pub title: String,
    pub year: Option<i32>,
    pub citations: u64,
    pub venue: String,
    pub venue_kind: VenueKind,
    pub method: ClassificationMethod,
    /// Never empty
    pub domains: Vec<Domain>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_key: Option<String>,
}

impl DomainAssignment {
    /// Weight each domain receives from this paper.
    pub fn weight(&self) -> f64 {
        1.0 / self.domains.len() as f64
    }
}

/// One domain's share of the profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainShare {
    pub domain: Domain,
    /// Rounded to one decimal
    pub percentage: f64,
    pub weight: f64,
    pub papers: usize,
}

/// How papers were classified.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassificationStats {
    pub venue_classified: usize,
    pub conference_classified: usize,
    pub preprint_classified: usize,
    pub keyword_classified: usize,
    pub unclassified: usize,
    /// Sum of all paper weights; equals the number of classified papers
    pub total_weight: f64,
    /// Percentage of classified papers resolved without the keyword fallback
    pub venue_coverage: f64,
}

/// Domain distribution of a profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DomainDistribution {
    /// Descending by percentage; ties keep first-encountered order
    pub shares: Vec<DomainShare>,
    pub primary: Option<Domain>,
    pub interdisciplinary_score: f64,
    pub papers_by_domain: BTreeMap<Domain, Vec<usize>>,
    pub assignments: Vec<DomainAssignment>,
    pub stats: ClassificationStats,
}

impl DomainDistribution {
    pub fn percentage(&self, domain: Domain) -> Option<f64> {
        self.shares
            .iter()
            .find(|s| s.domain == domain)
            .map(|s| s.percentage)
    }

    /// Assignments that include `domain`.
    pub fn papers_in(&self, domain: Domain) -> impl Iterator<Item = &DomainAssignment> {
        self.papers_by_domain
            .get(&domain)
            .into_iter()
            .flatten()
            .filter_map(|&i| self.assignments.iter().find(|a| a.index == i))
    }

    /// Re-sort shares and refresh `primary` after percentages changed.
    pub(crate) fn reorder(&mut self) {
        self.shares
            .sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
        self.primary = self.shares.first().map(|s| s.domain);
    }
}

/// Round to one decimal place.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Classifies publications and aggregates their domains.
#[derive(Debug, Clone)]
pub struct DomainAggregator {
    resolver: VenueResolver,
    keywords: KeywordClassifier,
}

impl DomainAggregator {
    pub fn new(resolver: VenueResolver) -> Self {
        Self {
            resolver,
            keywords: KeywordClassifier::new(),
        }
    }

    pub fn resolver(&self) -> &VenueResolver {
        &self.resolver
    }

    /// Classify a single publication; `None` when neither the venue nor the
    /// keywords say anything.
    pub fn classify(&self, index: usize, publication: &Publication) -> Option<DomainAssignment> {
        let venue = publication.venue_str();

        let (mut domains, mut method, matched_key) = match self.resolver.resolve(venue) {
            Some(m) => (m.domains, m.method, Some(m.matched_key)),
            None => (Vec::new(), ClassificationMethod::Keyword, None),
        };

        if domains.is_empty() {
            match self.keywords.classify(&publication.title, venue) {
                Some(domain) => {
                    debug!(title = %publication.title, venue = %venue, domain = %domain, "Keyword fallback");
                    domains.push(domain);
                    method = ClassificationMethod::Keyword;
                }
                None => {
                    debug!(title = %publication.title, venue = %venue, "Unclassified publication");
                    return None;
                }
            }
        }

        let kind = if method == ClassificationMethod::Conference {
            VenueKind::Conference
        } else {
            venue_kind::detect(venue)
        };
        match kind {
            VenueKind::Preprint => method = ClassificationMethod::Preprint,
            VenueKind::Conference if method == ClassificationMethod::Venue => {
                method = ClassificationMethod::Conference
            }
            _ => {}
        }

        Some(DomainAssignment {
            index,
            title: publication.title.clone(),
            year: publication.year,
            citations: publication.citation_count,
            venue: if venue.is_empty() { "Unknown".to_string() } else { venue.to_string() },
            venue_kind: kind,
            method,
            domains,
            matched_key,
        })
    }

    /// Aggregate the domain distribution of a publication list.
    pub fn aggregate(&self, publications: &[Publication]) -> DomainDistribution {
        let results: Vec<Option<DomainAssignment>> = publications
            .par_iter()
            .enumerate()
            .map(|(i, p)| self.classify(i, p))
            .collect();

        let mut stats = ClassificationStats::default();
        let mut weights: Vec<(Domain, f64, usize)> = Vec::new();
        let mut papers_by_domain: BTreeMap<Domain, Vec<usize>> = BTreeMap::new();
        let mut assignments = Vec::new();

        for result in results {
            let Some(assignment) = result else {
                stats.unclassified += 1;
                continue;
            };

            match assignment.method {
                ClassificationMethod::Venue => stats.venue_classified += 1,
                ClassificationMethod::Conference => stats.conference_classified += 1,
                ClassificationMethod::Preprint => stats.preprint_classified += 1,
                ClassificationMethod::Keyword => stats.keyword_classified += 1,
            }

            let weight = assignment.weight();
            for &domain in &assignment.domains {
                match weights.iter_mut().find(|(d, _, _)| *d == domain) {
                    Some(entry) => {
                        entry.1 += weight;
                        entry.2 += 1;
                    }
                    None => weights.push((domain, weight, 1)),
                }
                papers_by_domain.entry(domain).or_default().push(assignment.index);
            }
            assignments.push(assignment);
        }

        let total: f64 = weights.iter().map(|(_, w, _)| w).sum();
        stats.total_weight = total;
        let classified = assignments.len();
        if classified > 0 {
            let resolved = classified - stats.keyword_classified;
            stats.venue_coverage = round1(resolved as f64 / classified as f64 * 100.0);
        }

        let shares = weights
            .iter()
            .map(|&(domain, weight, papers)| DomainShare {
                domain,
                percentage: if total > 0.0 { round1(weight / total * 100.0) } else { 0.0 },
                weight,
                papers,
            })
            .collect();

        let mut distribution = DomainDistribution {
            shares,
            primary: None,
            interdisciplinary_score: weights.len() as f64 / CANONICAL_DOMAIN_COUNT as f64,
            papers_by_domain,
            assignments,
            stats,
        };
        distribution.reorder();

        info!(
            publications = publications.len(),
            classified,
            unclassified = distribution.stats.unclassified,
            domains = distribution.shares.len(),
            primary = ?distribution.primary,
            "Domain distribution computed"
        );
        distribution
    }
}
