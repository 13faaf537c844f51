//! Full profile report: every analysis in one pass.

use crate::aggregate::{DomainAggregator, DomainDistribution};
use crate::authorship::{AuthorPositionResolver, AuthorshipStats};
use crate::citations::{BasicMetrics, CitationAnalysis};
use crate::collaboration::{self, CollaborationAnalysis};
use crate::config::EngineConfig;
use crate::enrichment::{EnrichmentSummary, FieldOfStudyClient};
use crate::productivity::{ProductivityAnalysis, VenueAnalysis};
use crate::publication::Profile;
use crate::registry::VenueRegistry;
use crate::resolver::VenueResolver;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Everything computed for a profile.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileReport {
    pub name: String,
    pub basic_metrics: BasicMetrics,
    pub authorship: AuthorshipStats,
    pub research_areas: DomainDistribution,
    pub citations: Option<CitationAnalysis>,
    pub collaboration: CollaborationAnalysis,
    pub productivity: Option<ProductivityAnalysis>,
    pub venues: VenueAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<EnrichmentSummary>,
    pub registry_version: u64,
    pub analysis_timestamp: DateTime<Utc>,
}

/// Runs the analyses against one shared registry.
#[derive(Debug, Clone)]
pub struct ProfileAnalyzer {
    aggregator: DomainAggregator,
    config: EngineConfig,
}

impl ProfileAnalyzer {
    pub fn new(registry: Arc<VenueRegistry>, config: EngineConfig) -> Self {
        let resolver = VenueResolver::new(registry, config.matching.clone());
        Self {
            aggregator: DomainAggregator::new(resolver),
            config,
        }
    }

    pub fn aggregator(&self) -> &DomainAggregator {
        &self.aggregator
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Offline analysis; never fails.
    pub fn analyze(&self, profile: &Profile) -> ProfileReport {
        let publications = &profile.publications;
        info!(name = %profile.name, publications = publications.len(), "Analyzing profile");

        let report = ProfileReport {
            name: profile.name.clone(),
            basic_metrics: BasicMetrics::compute(publications),
            authorship: AuthorPositionResolver::new(&profile.name).analyze(publications),
            research_areas: self.aggregator.aggregate(publications),
            citations: CitationAnalysis::from_publications(publications),
            collaboration: collaboration::analyze(publications),
            productivity: ProductivityAnalysis::from_publications(publications),
            venues: VenueAnalysis::from_publications(publications),
            enrichment: None,
            registry_version: self.aggregator.resolver().registry().version(),
            analysis_timestamp: Utc::now(),
        };

        info!(
            name = %report.name,
            h_index = report.basic_metrics.h_index,
            primary = ?report.research_areas.primary,
            "Profile analysis complete"
        );
        report
    }

    /// Offline analysis, then field-of-study enrichment when enabled.
    ///
    /// A failed or timed-out enrichment keeps the offline distribution.
    pub async fn analyze_with_enrichment(&self, profile: &Profile) -> ProfileReport {
        let mut report = self.analyze(profile);
        let enrichment = &self.config.enrichment;
        if !enrichment.enabled || profile.publications.is_empty() {
            return report;
        }

        let client = match FieldOfStudyClient::new(enrichment) {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "Enrichment unavailable, keeping offline distribution");
                return report;
            }
        };

        let mut distribution = report.research_areas.clone();
        match client
            .enrich(&mut distribution, &profile.publications, enrichment)
            .await
        {
            Ok(summary) => {
                report.research_areas = distribution;
                report.enrichment = Some(summary);
            }
            Err(e) => warn!(error = %e, "Enrichment failed, keeping offline distribution"),
        }
        report
    }
}
