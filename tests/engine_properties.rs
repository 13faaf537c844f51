//! End-to-end properties of the classification engine over the built-in tables.

use scholarlens::aggregate::DomainAggregator;
use scholarlens::authorship::{parse_authors, resolve_role, AuthorPositionResolver, AuthorRole};
use scholarlens::citations::h_index;
use scholarlens::config::MatchThresholds;
use scholarlens::domain::{ClassificationMethod, Domain};
use scholarlens::publication::Publication;
use scholarlens::registry::{BulkJournal, RegistryBuilder, VenueRegistry};
use scholarlens::resolver::VenueResolver;
use std::sync::Arc;

fn resolver() -> VenueResolver {
    VenueResolver::new(Arc::new(VenueRegistry::builtin()), MatchThresholds::default())
}

fn publication(title: &str, authors: &str, venue: &str, citations: u64) -> Publication {
    Publication {
        title: title.to_string(),
        authors: authors.to_string(),
        venue: (!venue.is_empty()).then(|| venue.to_string()),
        year: Some(2020),
        citation_count: citations,
    }
}

fn mixed_profile() -> Vec<Publication> {
    vec![
        publication("Sparse Bayesian regression", "J Doe, A Smith", "Biometrika", 50),
        publication("Residual networks", "A Smith, J Doe", "CVPR 2022", 900),
        publication("Variational inference at scale", "J Doe", "Journal of Machine Learning Research", 30),
        publication("Deep learning for computer vision", "B Lee, J Doe, C Wu", "Some Workshop", 4),
        publication("Preprint on priors", "J Doe", "arXiv preprint arXiv:2101.00001", 0),
        publication("On poetry", "J Doe", "Lit Review", 1),
        publication("Genome-wide association statistics", "J Doe, D Kim", "Bioinformatics", 12),
    ]
}

#[test]
fn test_weights_and_percentages_sum() {
    let distribution = DomainAggregator::new(resolver()).aggregate(&mixed_profile());

    for assignment in &distribution.assignments {
        assert!(!assignment.domains.is_empty());
    }
    let weights: f64 = distribution.shares.iter().map(|s| s.weight).sum();
    assert!((weights - distribution.assignments.len() as f64).abs() < 1e-9);

    let percentages: f64 = distribution.shares.iter().map(|s| s.percentage).sum();
    assert!((percentages - 100.0).abs() <= 0.1, "sum was {}", percentages);
    assert!(
        (distribution.stats.total_weight - distribution.assignments.len() as f64).abs() < 1e-9
    );
}

#[test]
fn test_multi_domain_journal_splits_weight() {
    let journal = |title: &str, categories: &str| BulkJournal {
        title: title.to_string(),
        categories: categories.to_string(),
        subject: None,
    };
    let registry = RegistryBuilder::new()
        .with_bulk(vec![
            journal("Genes & Cancer", "Oncology (Q1); Genetics (Q2)"),
            journal("Biometrika", "Statistics and Probability (Q1)"),
        ])
        .build();
    assert_eq!(
        registry.lookup("genes & cancer"),
        Some(&[Domain::Medicine, Domain::Bioinformatics][..])
    );

    let aggregator = DomainAggregator::new(VenueResolver::new(
        Arc::new(registry),
        MatchThresholds::default(),
    ));
    let distribution = aggregator.aggregate(&[
        publication("Tumour expression profiles", "J Doe", "Genes & Cancer", 3),
        publication("Shrinkage estimators", "J Doe", "Biometrika", 9),
    ]);

    let split = &distribution.assignments[0];
    assert_eq!(split.domains, vec![Domain::Medicine, Domain::Bioinformatics]);
    assert_eq!(split.weight(), 0.5);

    let share = |domain: Domain| {
        distribution
            .shares
            .iter()
            .find(|s| s.domain == domain)
            .map(|s| (s.weight, s.percentage, s.papers))
    };
    assert_eq!(share(Domain::Statistics), Some((1.0, 50.0, 1)));
    assert_eq!(share(Domain::Medicine), Some((0.5, 25.0, 1)));
    assert_eq!(share(Domain::Bioinformatics), Some((0.5, 25.0, 1)));
    assert_eq!(distribution.primary, Some(Domain::Statistics));
    assert_eq!(distribution.stats.total_weight, 2.0);
}

#[test]
fn test_h_index_examples() {
    assert_eq!(h_index(&[10, 8, 5, 4, 3]), 4);
    assert_eq!(h_index(&[25, 8, 5, 3, 3]), 3);
    assert_eq!(h_index(&[0, 0, 0]), 0);
    assert_eq!(h_index(&[]), 0);
}

#[test]
fn test_single_author_counts_three_times() {
    let stats = AuthorPositionResolver::new("Jane Doe")
        .analyze(&[publication("Solo work", "J Doe", "Biometrika", 7)]);
    assert_eq!(stats.count(AuthorRole::SingleAuthor), 1);
    assert_eq!(stats.count(AuthorRole::FirstAuthor), 1);
    assert_eq!(stats.count(AuthorRole::LastAuthor), 1);
    assert_eq!(stats.records[0].role, AuthorRole::SingleAuthor);
}

#[test]
fn test_two_author_second_is_also_last() {
    let stats = AuthorPositionResolver::new("Jane Doe")
        .analyze(&[publication("Pair work", "A Smith, J Doe", "Biometrika", 3)]);
    assert_eq!(stats.count(AuthorRole::SecondAuthor), 1);
    assert_eq!(stats.count(AuthorRole::LastAuthor), 1);
    assert_eq!(stats.count(AuthorRole::FirstAuthor), 0);
}

#[test]
fn test_truncated_lists_never_yield_last() {
    let parsed = parse_authors("A Smith, B Lee, J Doe, ...");
    assert!(parsed.truncated);
    assert_eq!(resolve_role("Jane Doe", &parsed.tokens, parsed.truncated), AuthorRole::MiddleAuthor);

    let parsed = parse_authors("J Doe, A Smith, et al.");
    assert_eq!(resolve_role("Jane Doe", &parsed.tokens, parsed.truncated), AuthorRole::FirstAuthor);

    let parsed = parse_authors("A Smith, J Doe, B Lee");
    assert_eq!(resolve_role("Jane Doe", &parsed.tokens, parsed.truncated), AuthorRole::SecondAuthor);

    let parsed = parse_authors("A Smith, B Lee, J Doe");
    assert_eq!(resolve_role("Jane Doe", &parsed.tokens, parsed.truncated), AuthorRole::LastAuthor);
}

#[test]
fn test_known_venues() {
    let resolver = resolver();

    let m = resolver
        .resolve("IEEE Trans. Pattern Anal. Mach. Intell.")
        .expect("tpami");
    assert_eq!(m.domains, vec![Domain::ComputerScienceAi]);

    let m = resolver.resolve("CVPR 2022").expect("cvpr");
    assert_eq!(m.method, ClassificationMethod::Conference);
    assert_eq!(m.domains, vec![Domain::ComputerScienceAi]);
}

#[test]
fn test_keyword_fallback_for_unknown_venues() {
    let aggregator = DomainAggregator::new(resolver());
    let assignment = aggregator
        .classify(0, &publication("Deep learning for computer vision", "", "", 0))
        .expect("keyword classified");
    assert_eq!(assignment.method, ClassificationMethod::Keyword);
    assert_eq!(assignment.domains, vec![Domain::ComputerScienceAi]);
}

#[test]
fn test_aggregate_is_idempotent() {
    let aggregator = DomainAggregator::new(resolver());
    let publications = mixed_profile();
    let first = serde_json::to_string(&aggregator.aggregate(&publications)).expect("serialize");
    let second = serde_json::to_string(&aggregator.aggregate(&publications)).expect("serialize");
    assert_eq!(first, second);
}
