//! Co-author analysis.
//!
//! The profile owner is taken to be the most frequent parsed author across
//! the whole list. Author tokens are compared verbatim, so "K He" and
//! "Kaiming He" count as different people.

use crate::aggregate::round1;
use crate::authorship::{parse_authors, AuthorToken, ParsedAuthors};
use crate::publication::Publication;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

const TOP_COLLABORATORS: usize = 15;
const CORE_COLLABORATOR_MIN_PAPERS: usize = 3;
/// Distinct co-author links needed to count as highly connected
const HIGHLY_CONNECTED_MIN_LINKS: usize = 6;

/// A paper shared with one co-author.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharedPaper {
    pub title: String,
    pub year: Option<i32>,
    pub citations: u64,
    pub venue: String,
    pub total_authors: usize,
    pub truncated: bool,
}

/// Per co-author summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Collaborator {
    pub name: String,
    pub collaboration_count: usize,
    pub total_citations: u64,
    pub avg_citations: f64,
    pub years_active: Vec<i32>,
    /// Inclusive span of shared years, 0 when no year is known
    pub collaboration_span: u32,
    pub avg_team_size: f64,
    pub papers: Vec<SharedPaper>,
}

/// Co-author graph: two co-authors are linked when they share a paper.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollaborationNetwork {
    /// Linked pairs as a percentage of all possible pairs, one decimal
    pub network_density: f64,
    pub total_collaborators: usize,
    pub highly_connected: usize,
}

impl CollaborationNetwork {
    fn from_teams(teams: &[Vec<&str>]) -> Self {
        let mut links: HashMap<&str, BTreeSet<&str>> = HashMap::new();
        for team in teams {
            for &a in team {
                let neighbours = links.entry(a).or_default();
                neighbours.extend(team.iter().copied().filter(|&b| b != a));
            }
        }

        let n = links.len();
        let possible = n * n.saturating_sub(1) / 2;
        let edges = links.values().map(BTreeSet::len).sum::<usize>() / 2;
        Self {
            network_density: if possible > 0 { round1(edges as f64 / possible as f64 * 100.0) } else { 0.0 },
            total_collaborators: n,
            highly_connected: links.values().filter(|l| l.len() >= HIGHLY_CONNECTED_MIN_LINKS).count(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollaborationAnalysis {
    pub profile_owner: Option<String>,
    pub total_unique_collaborators: usize,
    pub collaborative_papers: usize,
    pub solo_papers: usize,
    /// Percentage of papers with more than one visible author
    pub collaboration_rate: f64,
    pub avg_authors_per_paper: f64,
    /// Co-author appearances per collaborative paper
    pub collaboration_intensity: f64,
    /// Visible team size → number of papers
    pub team_size_distribution: BTreeMap<usize, usize>,
    pub core_collaborators: usize,
    pub occasional_collaborators: usize,
    /// Most frequent co-authors, ties in order of first appearance
    pub top_collaborators: Vec<Collaborator>,
    pub network: CollaborationNetwork,
    pub truncated_papers: usize,
    pub truncation_rate: f64,
}

/// Build the collaboration summary for a publication list.
pub fn analyze(publications: &[Publication]) -> CollaborationAnalysis {
    let parsed: Vec<ParsedAuthors> = publications.iter().map(|p| parse_authors(&p.authors)).collect();

    let owner = most_frequent_author(&parsed);
    let is_owner = |name: &str| owner.as_deref() == Some(name);

    let mut team_sizes: BTreeMap<usize, usize> = BTreeMap::new();
    let mut order: Vec<String> = Vec::new();
    let mut shared: HashMap<String, Vec<SharedPaper>> = HashMap::new();
    let mut appearances: HashMap<String, usize> = HashMap::new();
    let mut coauthor_mentions = 0usize;
    let mut truncated_papers = 0usize;
    let mut teams: Vec<Vec<&str>> = Vec::new();

    for (publication, authors) in publications.iter().zip(&parsed) {
        if authors.truncated {
            truncated_papers += 1;
        }
        let team = authors.len();

        for token in &authors.tokens {
            if !is_owner(token.as_str()) {
                coauthor_mentions += 1;
                *appearances.entry(token.to_string()).or_default() += 1;
            }
        }

        if team <= 1 {
            continue;
        }
        *team_sizes.entry(team).or_default() += 1;
        teams.push(
            authors
                .tokens
                .iter()
                .filter(|t| !is_owner(t.as_str()))
                .map(AuthorToken::as_str)
                .collect(),
        );

        for token in authors.tokens.iter().filter(|t| !is_owner(t.as_str())) {
            let papers = shared.entry(token.to_string()).or_insert_with(|| {
                order.push(token.to_string());
                Vec::new()
            });
            papers.push(SharedPaper {
                title: publication.title.clone(),
                year: publication.year,
                citations: publication.citation_count,
                venue: publication.venue_str().to_string(),
                total_authors: team,
                truncated: authors.truncated,
            });
        }
    }

    let mut collaborators: Vec<Collaborator> = order
        .iter()
        .filter_map(|name| shared.remove(name).map(|papers| collaborator(name, papers)))
        .collect();
    collaborators.sort_by(|a, b| b.collaboration_count.cmp(&a.collaboration_count));
    collaborators.truncate(TOP_COLLABORATORS);

    let total = publications.len();
    let collaborative_papers: usize = team_sizes.values().sum();
    let percent = |n: usize| if total > 0 { round1(n as f64 / total as f64 * 100.0) } else { 0.0 };

    CollaborationAnalysis {
        profile_owner: owner.clone(),
        total_unique_collaborators: appearances.len(),
        collaborative_papers,
        solo_papers: total - collaborative_papers,
        collaboration_rate: percent(collaborative_papers),
        avg_authors_per_paper: if total > 0 { round1(coauthor_mentions as f64 / total as f64) } else { 0.0 },
        collaboration_intensity: if collaborative_papers > 0 {
            round1(coauthor_mentions as f64 / collaborative_papers as f64)
        } else {
            0.0
        },
        team_size_distribution: team_sizes,
        core_collaborators: appearances.values().filter(|&&n| n >= CORE_COLLABORATOR_MIN_PAPERS).count(),
        occasional_collaborators: appearances.values().filter(|&&n| n == 1).count(),
        top_collaborators: collaborators,
        network: CollaborationNetwork::from_teams(&teams),
        truncated_papers,
        truncation_rate: percent(truncated_papers),
    }
}

fn most_frequent_author(parsed: &[ParsedAuthors]) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for token in parsed.iter().flat_map(|p| &p.tokens) {
        match counts.iter_mut().find(|(name, _)| *name == token.as_str()) {
            Some(entry) => entry.1 += 1,
            None => counts.push((token.as_str(), 1)),
        }
    }
    // max_by_key keeps the last maximum; keep the first instead
    let mut best: Option<(&str, usize)> = None;
    for (name, n) in counts {
        if best.map_or(true, |(_, b)| n > b) {
            best = Some((name, n));
        }
    }
    best.map(|(name, _)| name.to_string())
}

fn collaborator(name: &str, papers: Vec<SharedPaper>) -> Collaborator {
    let count = papers.len();
    let total_citations: u64 = papers.iter().map(|p| p.citations).sum();
    let years: BTreeSet<i32> = papers.iter().filter_map(|p| p.year).collect();
    let span = match (years.first(), years.last()) {
        (Some(first), Some(last)) => (last - first + 1) as u32,
        _ => 0,
    };
    let team_total: usize = papers.iter().map(|p| p.total_authors).sum();

    Collaborator {
        name: name.to_string(),
        collaboration_count: count,
        total_citations,
        avg_citations: round1(total_citations as f64 / count as f64),
        years_active: years.into_iter().collect(),
        collaboration_span: span,
        avg_team_size: round1(team_total as f64 / count as f64),
        papers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn publication(authors: &str, year: i32, citations: u64) -> Publication {
        Publication {
            title: format!("{} {}", authors, year),
            authors: authors.to_string(),
            year: Some(year),
            citation_count: citations,
            ..Default::default()
        }
    }

    #[test]
    fn test_owner_is_most_frequent_author() {
        let analysis = analyze(&[
            publication("C Brown, A Smith", 2018, 10),
            publication("A Smith, C Brown, B Jones", 2020, 4),
            publication("C Brown", 2021, 1),
            publication("D Lee, C Brown, ...", 2022, 0),
        ]);
        assert_eq!(analysis.profile_owner.as_deref(), Some("C Brown"));
        assert_eq!(analysis.collaborative_papers, 3);
        assert_eq!(analysis.solo_papers, 1);
        assert_eq!(analysis.collaboration_rate, 75.0);
        assert_eq!(analysis.truncated_papers, 1);
        assert_eq!(analysis.truncation_rate, 25.0);
        assert_eq!(analysis.total_unique_collaborators, 3);
        assert_eq!(analysis.team_size_distribution.get(&2), Some(&2));
        assert_eq!(analysis.team_size_distribution.get(&3), Some(&1));

        let smith = &analysis.top_collaborators[0];
        assert_eq!(smith.name, "A Smith");
        assert_eq!(smith.collaboration_count, 2);
        assert_eq!(smith.total_citations, 14);
        assert_eq!(smith.collaboration_span, 3);
        assert_eq!(smith.avg_team_size, 2.5);
        assert_eq!(analysis.occasional_collaborators, 2);

        // Smith–Jones is the only co-author link among Smith, Jones and Lee
        assert_eq!(analysis.network.total_collaborators, 3);
        assert_eq!(analysis.network.network_density, 33.3);
        assert_eq!(analysis.network.highly_connected, 0);
    }

    #[test]
    fn test_network_highly_connected() {
        let analysis = analyze(&[
            publication("O Wner, A A, B B, C C, D D, E E, F F", 2020, 0),
            publication("O Wner, A A", 2021, 0),
            publication("O Wner, G G", 2021, 0),
        ]);
        let network = &analysis.network;
        assert_eq!(network.total_collaborators, 7);
        // A..F form a complete graph of 15 links out of 21 possible
        assert_eq!(network.network_density, 71.4);
        assert_eq!(network.highly_connected, 0);

        let analysis = analyze(&[
            publication("O Wner, A A, B B, C C, D D, E E, F F, G G", 2020, 0),
            publication("O Wner", 2021, 0),
        ]);
        assert_eq!(analysis.network.highly_connected, 7);
        assert_eq!(analysis.network.network_density, 100.0);
    }

    #[test]
    fn test_empty_profile() {
        let analysis = analyze(&[]);
        assert_eq!(analysis.profile_owner, None);
        assert_eq!(analysis.collaboration_rate, 0.0);
        assert!(analysis.top_collaborators.is_empty());
    }
}
