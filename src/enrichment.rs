//! Optional field-of-study enrichment via the Semantic Scholar search API.
//!
//! A representative sample of the profile (most cited half plus most recent
//! half) is looked up by title. Fields of study reported for the sample boost
//! the matching domains of an already computed distribution.
//!
//! API Details:
//! - Search endpoint: GET /graph/v1/paper/search?query=...&limit=1
//! - Rate limit: 1 req/s (unauthenticated), higher with API key

use crate::aggregate::{round1, DomainDistribution};
use crate::config::EnrichmentConfig;
use crate::domain::Domain;
use crate::error::{Result, ScholarError};
use crate::publication::Publication;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Semantic Scholar API base URL
const SS_API_BASE: &str = "https://api.semanticscholar.org/graph/v1";

/// Titles shorter than this are not worth a search
const MIN_TITLE_LEN: usize = 10;

const MAX_RETRIES: u32 = 3;

/// A paper as returned by the search endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaperFields {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "fieldsOfStudy", default)]
    pub fields_of_study: Option<Vec<String>>,
    #[serde(rename = "citationCount", default)]
    pub citation_count: Option<u64>,
    #[serde(default)]
    pub year: Option<i32>,
}

impl PaperFields {
    /// Most specific field (the API lists it last).
    pub fn primary_field(&self) -> Option<&str> {
        self.fields_of_study
            .as_ref()
            .and_then(|f| f.last())
            .map(String::as_str)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<PaperFields>,
}

/// Field counts over the looked-up sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SampleClassification {
    /// Primary field → papers; papers not found are counted as "Unclassified"
    pub field_counts: BTreeMap<String, usize>,
    pub api_success_count: usize,
    pub sample_size: usize,
}

/// What enrichment did to a distribution.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnrichmentSummary {
    pub sample_size: usize,
    pub api_success_count: usize,
    pub api_success_rate: f64,
    pub boosted_domains: Vec<Domain>,
}

/// Map a Semantic Scholar field of study onto a domain.
pub fn field_domain(field: &str) -> Option<Domain> {
    match field {
        "Computer Science" => Some(Domain::ComputerScienceAi),
        "Mathematics" => Some(Domain::Mathematics),
        "Statistics" => Some(Domain::Statistics),
        "Biology" => Some(Domain::Bioinformatics),
        "Medicine" => Some(Domain::Medicine),
        "Environmental Science" => Some(Domain::Environmental),
        "Economics" => Some(Domain::Economics),
        "Psychology" => Some(Domain::SocialSciences),
        "Engineering" => Some(Domain::Engineering),
        _ => None,
    }
}

/// Jaccard similarity of the lowercased whitespace-separated word sets.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let a_lower = a.to_lowercase();
    let b_lower = b.to_lowercase();
    let left: HashSet<&str> = a_lower.split_whitespace().collect();
    let right: HashSet<&str> = b_lower.split_whitespace().collect();
    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    left.intersection(&right).count() as f64 / union as f64
}

/// Most cited half plus most recent half, de-duplicated by title.
///
/// Lists no longer than `max` are returned whole.
pub fn representative_sample(publications: &[Publication], max: usize) -> Vec<&Publication> {
    if publications.len() <= max {
        return publications.iter().collect();
    }
    let half = max / 2;

    let mut by_citations: Vec<&Publication> = publications.iter().collect();
    by_citations.sort_by(|a, b| b.citation_count.cmp(&a.citation_count));
    let mut by_year: Vec<&Publication> = publications.iter().collect();
    by_year.sort_by(|a, b| b.year.unwrap_or(0).cmp(&a.year.unwrap_or(0)));

    let mut seen = HashSet::new();
    by_citations
        .into_iter()
        .take(half)
        .chain(by_year.into_iter().take(half))
        .filter(|&p| !p.title.is_empty() && seen.insert(p.title.as_str()))
        .take(max)
        .collect()
}

/// Boost domains confirmed by the sample, then re-normalize to 100.
///
/// Returns the domains that were boosted. A sample without a single
/// successful lookup changes nothing.
pub fn apply_field_boosts(
    distribution: &mut DomainDistribution,
    sample: &SampleClassification,
    boost: f64,
) -> Vec<Domain> {
    let mut boosted = Vec::new();
    if sample.api_success_count == 0 {
        return boosted;
    }

    for field in sample.field_counts.keys() {
        let Some(domain) = field_domain(field) else {
            continue;
        };
        if boosted.contains(&domain) {
            continue;
        }
        if let Some(share) = distribution.shares.iter_mut().find(|s| s.domain == domain) {
            share.percentage = round1((share.percentage * boost).min(100.0));
            boosted.push(domain);
        }
    }

    let total: f64 = distribution.shares.iter().map(|s| s.percentage).sum();
    if total > 0.0 {
        for share in &mut distribution.shares {
            share.percentage = round1(share.percentage / total * 100.0);
        }
    }
    distribution.reorder();
    boosted
}

/// Run `future` under a deadline.
pub async fn with_deadline<T, F>(timeout_secs: u64, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(Duration::from_secs(timeout_secs), future).await {
        Ok(result) => result,
        Err(_) => Err(ScholarError::Timeout(timeout_secs)),
    }
}

/// Semantic Scholar search client with an in-memory title cache.
pub struct FieldOfStudyClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    request_delay: Duration,
    min_title_similarity: f64,
    cache: Mutex<HashMap<String, Option<PaperFields>>>,
}

impl FieldOfStudyClient {
    pub fn new(config: &EnrichmentConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| ScholarError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: SS_API_BASE.to_string(),
            api_key: config.api_key.clone(),
            request_delay: Duration::from_millis(config.request_delay_ms),
            min_title_similarity: config.min_title_similarity,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Point the client at another API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Look up one title.
    ///
    /// Returns `None` when the title is too short, nothing is found, or the
    /// best hit's title is not similar enough to ours.
    pub async fn search_title(&self, title: &str) -> Result<Option<PaperFields>> {
        let clean = title.replace('"', "");
        let clean = clean.trim();
        if clean.chars().count() < MIN_TITLE_LEN {
            return Ok(None);
        }

        let url = format!("{}/paper/search", self.base_url);
        let mut backoff = Duration::from_secs(1);

        for attempt in 0..MAX_RETRIES {
            let mut request = self.client.get(&url).query(&[
                ("query", clean),
                ("limit", "1"),
                ("fields", "title,fieldsOfStudy,citationCount,year"),
            ]);
            if let Some(key) = &self.api_key {
                request = request.header("x-api-key", key);
            }

            let response = request.send().await?;
            let status = response.status();

            if status.as_u16() == 429 {
                warn!(attempt = attempt + 1, "Rate limited, waiting...");
                tokio::time::sleep(backoff).await;
                backoff *= 2;
                continue;
            }
            if !status.is_success() {
                let error_text = response.text().await.unwrap_or_default();
                return Err(ScholarError::Api {
                    code: status.as_u16() as i32,
                    message: format!("Semantic Scholar API error: {} - {}", status, error_text),
                });
            }

            let body: SearchResponse = response.json().await.map_err(|e| {
                ScholarError::Parse(format!("Failed to parse Semantic Scholar response: {}", e))
            })?;

            let hit = body
                .data
                .into_iter()
                .next()
                .filter(|paper| title_similarity(title, &paper.title) > self.min_title_similarity);
            return Ok(hit);
        }

        Err(ScholarError::RateLimited(backoff.as_secs()))
    }

    /// Look up a sample, pausing between uncached requests.
    ///
    /// Per-title failures count as "not found"; they do not abort the sample.
    pub async fn classify_sample(&self, sample: &[&Publication]) -> SampleClassification {
        let mut result = SampleClassification {
            sample_size: sample.len(),
            ..Default::default()
        };

        let mut requested = false;
        for publication in sample {
            let title = publication.title.as_str();
            if title.is_empty() {
                continue;
            }

            let cached = self.cache.lock().ok().and_then(|c| c.get(title).cloned());
            let paper = match cached {
                Some(hit) => {
                    debug!(title = %title, "Cache hit");
                    hit
                }
                None => {
                    if requested {
                        tokio::time::sleep(self.request_delay).await;
                    }
                    requested = true;
                    let hit = match self.search_title(title).await {
                        Ok(hit) => hit,
                        Err(e) => {
                            warn!(title = %title, error = %e, "Title lookup failed");
                            None
                        }
                    };
                    if let Ok(mut cache) = self.cache.lock() {
                        cache.insert(title.to_string(), hit.clone());
                    }
                    hit
                }
            };

            match paper.as_ref().and_then(PaperFields::primary_field) {
                Some(field) => {
                    result.api_success_count += 1;
                    *result.field_counts.entry(field.to_string()).or_default() += 1;
                    debug!(title = %title, field = %field, "Classified by field of study");
                }
                None => {
                    *result.field_counts.entry("Unclassified".to_string()).or_default() += 1;
                }
            }
        }

        info!(
            classified = result.api_success_count,
            sample = result.sample_size,
            "Field-of-study lookup complete"
        );
        result
    }

    /// Sample, look up, and boost `distribution` within the configured deadline.
    ///
    /// On timeout or error the distribution is left untouched.
    pub async fn enrich(
        &self,
        distribution: &mut DomainDistribution,
        publications: &[Publication],
        config: &EnrichmentConfig,
    ) -> Result<EnrichmentSummary> {
        let sample = representative_sample(publications, config.sample_size);
        info!(sample = sample.len(), "Enriching with Semantic Scholar fields of study");

        let classification = with_deadline(config.timeout_secs, async {
            Ok(self.classify_sample(&sample).await)
        })
        .await?;

        let boosted_domains = apply_field_boosts(distribution, &classification, config.boost);
        Ok(EnrichmentSummary {
            sample_size: classification.sample_size,
            api_success_count: classification.api_success_count,
            api_success_rate: if classification.sample_size > 0 {
                round1(classification.api_success_count as f64 / classification.sample_size as f64 * 100.0)
            } else {
                0.0
            },
            boosted_domains,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::DomainShare;

    fn share(domain: Domain, percentage: f64) -> DomainShare {
        DomainShare {
            domain,
            percentage,
            weight: 0.0,
            papers: 0,
        }
    }

    #[test]
    fn test_title_similarity() {
        assert_eq!(title_similarity("Deep Residual Learning", "deep residual learning"), 1.0);
        assert_eq!(title_similarity("", "x"), 0.0);
        let s = title_similarity("a b c d", "a b c e");
        assert!((s - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_representative_sample() {
        let pubs: Vec<Publication> = (0..40)
            .map(|i| Publication {
                title: format!("paper {}", i),
                citation_count: i as u64,
                year: Some(2000 + (i % 5) as i32),
                ..Default::default()
            })
            .collect();
        let sample = representative_sample(&pubs, 10);
        assert!(sample.len() <= 10);
        assert_eq!(sample[0].citation_count, 39);
        let titles: HashSet<&str> = sample.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles.len(), sample.len());

        assert_eq!(representative_sample(&pubs[..5], 10).len(), 5);
    }

    #[test]
    fn test_boosts_renormalize() {
        let mut distribution = DomainDistribution {
            shares: vec![share(Domain::Statistics, 60.0), share(Domain::ComputerScienceAi, 40.0)],
            primary: Some(Domain::Statistics),
            ..Default::default()
        };
        let mut field_counts = BTreeMap::new();
        field_counts.insert("Computer Science".to_string(), 3);
        field_counts.insert("Physics".to_string(), 1);
        let sample = SampleClassification {
            field_counts,
            api_success_count: 4,
            sample_size: 4,
        };

        let boosted = apply_field_boosts(&mut distribution, &sample, 1.2);
        assert_eq!(boosted, vec![Domain::ComputerScienceAi]);
        // 60 and 48 re-normalized over 108
        assert_eq!(distribution.percentage(Domain::Statistics), Some(55.6));
        assert_eq!(distribution.percentage(Domain::ComputerScienceAi), Some(44.4));
        let sum: f64 = distribution.shares.iter().map(|s| s.percentage).sum();
        assert!((sum - 100.0).abs() <= 0.1);
    }

    #[test]
    fn test_no_successes_no_change() {
        let mut distribution = DomainDistribution {
            shares: vec![share(Domain::Statistics, 100.0)],
            ..Default::default()
        };
        let before = distribution.clone();
        let boosted = apply_field_boosts(&mut distribution, &SampleClassification::default(), 1.2);
        assert!(boosted.is_empty());
        assert_eq!(distribution, before);
    }

    #[test]
    fn test_field_domain() {
        assert_eq!(field_domain("Psychology"), Some(Domain::SocialSciences));
        assert_eq!(field_domain("Physics"), None);
    }

    #[tokio::test]
    async fn test_deadline_elapses() {
        let result: Result<()> = with_deadline(0, std::future::pending()).await;
        assert!(matches!(result, Err(ScholarError::Timeout(0))));

        let ok = with_deadline(5, async { Ok(7) }).await;
        assert_eq!(ok.ok(), Some(7));
    }

    #[tokio::test]
    async fn test_short_titles_skip_network() -> Result<()> {
        let client = FieldOfStudyClient::new(&EnrichmentConfig::default())?
            .with_base_url("http://127.0.0.1:9");
        assert_eq!(client.search_title("Short").await?, None);
        Ok(())
    }
}
