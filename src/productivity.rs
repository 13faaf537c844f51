//! Output over time and venue usage.

use crate::aggregate::round1;
use crate::publication::Publication;
use serde::Serialize;
use std::collections::BTreeMap;

/// Years compared at each end of the career for the trend.
const TREND_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductivityAnalysis {
    pub publications_by_year: BTreeMap<i32, usize>,
    pub citations_by_year: BTreeMap<i32, u64>,
    pub total_active_years: usize,
    /// (year, publications); earliest year wins ties
    pub most_productive_year: (i32, usize),
    pub productivity_trend: Trend,
    pub recent_avg_per_year: f64,
    pub career_avg_per_year: f64,
}

impl ProductivityAnalysis {
    /// `None` when no publication carries a year.
    pub fn from_publications(publications: &[Publication]) -> Option<Self> {
        let mut by_year: BTreeMap<i32, usize> = BTreeMap::new();
        let mut citations_by_year: BTreeMap<i32, u64> = BTreeMap::new();
        for publication in publications {
            if let Some(year) = publication.year {
                *by_year.entry(year).or_default() += 1;
                *citations_by_year.entry(year).or_default() += publication.citation_count;
            }
        }
        if by_year.is_empty() {
            return None;
        }

        let counts: Vec<usize> = by_year.values().copied().collect();
        let window = TREND_WINDOW.min(counts.len());
        let mean = |slice: &[usize]| slice.iter().sum::<usize>() as f64 / slice.len() as f64;
        let early_avg = mean(&counts[..window]);
        let recent_avg = mean(&counts[counts.len() - window..]);
        let trend = if recent_avg > early_avg {
            Trend::Increasing
        } else if recent_avg < early_avg {
            Trend::Decreasing
        } else {
            Trend::Stable
        };

        let mut most_productive = (0, 0);
        for (&year, &n) in &by_year {
            if n > most_productive.1 {
                most_productive = (year, n);
            }
        }

        Some(Self {
            total_active_years: by_year.len(),
            most_productive_year: most_productive,
            productivity_trend: trend,
            recent_avg_per_year: round1(recent_avg),
            career_avg_per_year: round1(mean(&counts)),
            publications_by_year: by_year,
            citations_by_year,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VenueImpact {
    pub venue: String,
    pub publications: usize,
    pub total_citations: u64,
    pub avg_citations: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VenueAnalysis {
    pub total_unique_venues: usize,
    /// Ten venues with the most publications, ties in first-seen order
    pub top_venues: Vec<VenueImpact>,
    /// Every venue in first-seen order
    pub venue_impact: Vec<VenueImpact>,
    /// Unique venues per publication
    pub venue_diversity: f64,
}

impl VenueAnalysis {
    pub fn from_publications(publications: &[Publication]) -> Self {
        let mut impact: Vec<VenueImpact> = Vec::new();
        for publication in publications {
            let venue = publication.venue_str();
            if venue.is_empty() {
                continue;
            }
            match impact.iter_mut().find(|v| v.venue == venue) {
                Some(entry) => {
                    entry.publications += 1;
                    entry.total_citations += publication.citation_count;
                }
                None => impact.push(VenueImpact {
                    venue: venue.to_string(),
                    publications: 1,
                    total_citations: publication.citation_count,
                    avg_citations: 0.0,
                }),
            }
        }
        for entry in &mut impact {
            entry.avg_citations = round1(entry.total_citations as f64 / entry.publications as f64);
        }

        let mut top = impact.clone();
        top.sort_by(|a, b| b.publications.cmp(&a.publications));
        top.truncate(10);

        Self {
            total_unique_venues: impact.len(),
            top_venues: top,
            venue_diversity: if publications.is_empty() {
                0.0
            } else {
                impact.len() as f64 / publications.len() as f64
            },
            venue_impact: impact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn publication(year: Option<i32>, venue: &str, citations: u64) -> Publication {
        Publication {
            title: "t".to_string(),
            year,
            venue: Some(venue.to_string()),
            citation_count: citations,
            ..Default::default()
        }
    }

    #[test]
    fn test_productivity_trend() {
        let mut pubs = Vec::new();
        for (year, n) in [(2010, 1), (2011, 1), (2012, 2), (2013, 1), (2014, 1), (2015, 3), (2016, 4)] {
            for _ in 0..n {
                pubs.push(publication(Some(year), "V", 1));
            }
        }
        pubs.push(publication(None, "V", 100));

        let analysis = ProductivityAnalysis::from_publications(&pubs).expect("years");
        assert_eq!(analysis.total_active_years, 7);
        assert_eq!(analysis.most_productive_year, (2016, 4));
        assert_eq!(analysis.productivity_trend, Trend::Increasing);
        assert_eq!(analysis.recent_avg_per_year, 2.2);
        assert_eq!(analysis.career_avg_per_year, 1.9);
        assert_eq!(analysis.citations_by_year.get(&2016), Some(&4));
    }

    #[test]
    fn test_no_years() {
        assert!(ProductivityAnalysis::from_publications(&[publication(None, "V", 1)]).is_none());
    }

    #[test]
    fn test_single_year_is_stable() {
        let analysis =
            ProductivityAnalysis::from_publications(&[publication(Some(2020), "V", 1)]).expect("years");
        assert_eq!(analysis.productivity_trend, Trend::Stable);
    }

    #[test]
    fn test_venue_analysis() {
        let analysis = VenueAnalysis::from_publications(&[
            publication(None, "Biometrika", 10),
            publication(None, "JASA", 2),
            publication(None, "Biometrika", 20),
            publication(None, "", 5),
        ]);
        assert_eq!(analysis.total_unique_venues, 2);
        assert_eq!(analysis.top_venues[0].venue, "Biometrika");
        assert_eq!(analysis.top_venues[0].avg_citations, 15.0);
        assert_eq!(analysis.venue_diversity, 0.5);
    }
}
