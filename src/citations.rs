//! Citation metrics.

use crate::publication::Publication;
use serde::Serialize;

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Largest `h` such that at least `h` papers have `h` or more citations.
pub fn h_index(citations: &[u64]) -> usize {
    let mut sorted = citations.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted
        .iter()
        .enumerate()
        .take_while(|&(i, &c)| c >= (i + 1) as u64)
        .count()
}

/// Papers with at least ten citations.
pub fn i10_index(citations: &[u64]) -> usize {
    citations.iter().filter(|&&c| c >= 10).count()
}

/// Mean citations, 0 for an empty list.
pub fn average(citations: &[u64]) -> f64 {
    if citations.is_empty() {
        return 0.0;
    }
    citations.iter().sum::<u64>() as f64 / citations.len() as f64
}

/// Median citations, 0 for an empty list.
pub fn median(citations: &[u64]) -> f64 {
    if citations.is_empty() {
        return 0.0;
    }
    let mut sorted = citations.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
    } else {
        sorted[mid] as f64
    }
}

/// Papers bucketed by citation count.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CitationDistribution {
    /// 100 or more
    pub highly_cited: usize,
    /// 10 to 99
    pub moderately_cited: usize,
    /// 1 to 9
    pub lowly_cited: usize,
    pub uncited: usize,
}

impl CitationDistribution {
    pub fn from_counts(citations: &[u64]) -> Self {
        let mut dist = Self::default();
        for &c in citations {
            match c {
                0 => dist.uncited += 1,
                1..=9 => dist.lowly_cited += 1,
                10..=99 => dist.moderately_cited += 1,
                _ => dist.highly_cited += 1,
            }
        }
        dist
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopPaper {
    pub title: String,
    pub citations: u64,
    pub year: Option<i32>,
}

/// Citation profile of a publication list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitationAnalysis {
    pub total_citations: u64,
    pub avg_citations: f64,
    pub median_citations: f64,
    pub max_citations: u64,
    pub distribution: CitationDistribution,
    /// Ten most cited, ties in input order
    pub top_papers: Vec<TopPaper>,
}

impl CitationAnalysis {
    /// `None` for an empty list.
    pub fn from_publications(publications: &[Publication]) -> Option<Self> {
        if publications.is_empty() {
            return None;
        }
        let citations: Vec<u64> = publications.iter().map(|p| p.citation_count).collect();

        let mut ranked: Vec<&Publication> = publications.iter().collect();
        ranked.sort_by(|a, b| b.citation_count.cmp(&a.citation_count));
        let top_papers = ranked
            .into_iter()
            .take(10)
            .map(|p| TopPaper {
                title: p.title.clone(),
                citations: p.citation_count,
                year: p.year,
            })
            .collect();

        Some(Self {
            total_citations: citations.iter().sum(),
            avg_citations: round2(average(&citations)),
            median_citations: median(&citations),
            max_citations: citations.iter().copied().max().unwrap_or(0),
            distribution: CitationDistribution::from_counts(&citations),
            top_papers,
        })
    }
}

/// Headline numbers for a profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BasicMetrics {
    pub total_publications: usize,
    pub total_citations: u64,
    pub h_index: usize,
    pub i10_index: usize,
    pub avg_citations_per_paper: f64,
    /// Inclusive span between first and latest publication year
    pub years_active: u32,
    pub publications_per_year: f64,
    pub first_publication_year: Option<i32>,
    pub latest_publication_year: Option<i32>,
}

impl BasicMetrics {
    pub fn compute(publications: &[Publication]) -> Self {
        let citations: Vec<u64> = publications.iter().map(|p| p.citation_count).collect();
        let years: Vec<i32> = publications.iter().filter_map(|p| p.year).collect();
        let first = years.iter().copied().min();
        let latest = years.iter().copied().max();
        let years_active = match (first, latest) {
            (Some(f), Some(l)) => (l - f + 1).max(0) as u32,
            _ => 0,
        };

        Self {
            total_publications: publications.len(),
            total_citations: citations.iter().sum(),
            h_index: h_index(&citations),
            i10_index: i10_index(&citations),
            avg_citations_per_paper: round2(average(&citations)),
            years_active,
            publications_per_year: if years_active > 0 {
                round2(publications.len() as f64 / years_active as f64)
            } else {
                0.0
            },
            first_publication_year: first,
            latest_publication_year: latest,
        }
    }
}
