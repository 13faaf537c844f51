//! Mapping of bulk-dataset subject categories onto research domains.
//!
//! SCImago-style category strings look like
//! `"Statistics and Probability (Q1); Statistics, Probability and Uncertainty (Q1)"`.

use crate::domain::Domain;

/// Statistics journals whose bulk subject classification is unreliable.
const STATISTICS_JOURNALS: &[&str] = &[
    "biometrika",
    "biometrics",
    "biostatistics",
    "statistical science",
    "annals of statistics",
    "journal of the american statistical association",
    "journal of the royal statistical society",
    "statistics and computing",
    "computational statistics and data analysis",
    "electronic journal of statistics",
    "scandinavian journal of statistics",
    "canadian journal of statistics",
    "journal of multivariate analysis",
    "journal of time series analysis",
    "journal of nonparametric statistics",
    "bernoulli",
    "test",
    "journal of statistical planning and inference",
    "statistics in medicine",
    "statistical methods in medical research",
    "journal of computational and graphical statistics",
];

const GENETICS_JOURNALS: &[&str] = &["plos genetics", "nature genetics", "genome biology", "genomics"];

/// Ordered substring rules; the first rule with a hit decides.
const SUBJECT_RULES: &[(Domain, &[&str])] = &[
    (
        Domain::Statistics,
        &["statistics", "probability", "econometrics", "biostatistics", "statistical", "stochastic"],
    ),
    (
        Domain::ComputerScienceAi,
        &[
            "artificial intelligence",
            "machine learning",
            "computer vision",
            "pattern recognition",
            "neural networks",
            "deep learning",
            "computer science",
            "software",
            "algorithms",
            "computational theory",
            "computer graphics",
            "human-computer interaction",
            "computer networks",
            "computer security",
            "databases",
            "programming languages",
        ],
    ),
    (
        Domain::Mathematics,
        &[
            "mathematics",
            "mathematical",
            "algebra",
            "geometry",
            "topology",
            "analysis",
            "number theory",
            "logic",
            "discrete mathematics",
            "applied mathematics",
            "computational mathematics",
        ],
    ),
    (
        Domain::Bioinformatics,
        &[
            "bioinformatics",
            "computational biology",
            "genetics",
            "genomics",
            "molecular biology",
            "cell biology",
            "biochemistry",
            "biotechnology",
        ],
    ),
    (
        Domain::Economics,
        &["economics", "finance", "business", "accounting", "management", "marketing", "organizational"],
    ),
    (
        Domain::Medicine,
        &[
            "medicine",
            "medical",
            "health",
            "clinical",
            "epidemiology",
            "public health",
            "nursing",
            "pharmacy",
            "oncology",
            "cardiology",
            "surgery",
            "psychiatry",
            "radiology",
            "pathology",
        ],
    ),
    (
        Domain::Environmental,
        &[
            "environmental",
            "ecology",
            "climate",
            "atmospheric",
            "oceanography",
            "geology",
            "geography",
            "earth sciences",
            "sustainability",
            "conservation",
            "biodiversity",
        ],
    ),
    (
        Domain::PhysicsChemistry,
        &["physics", "chemistry", "materials", "chemical", "physical", "quantum", "condensed matter"],
    ),
    (
        Domain::Engineering,
        &["engineering", "mechanical", "electrical", "civil", "aerospace", "industrial"],
    ),
    (
        Domain::SocialSciences,
        &[
            "psychology",
            "sociology",
            "anthropology",
            "political science",
            "social sciences",
            "education",
            "linguistics",
            "communication",
        ],
    ),
];

/// Split a categories string into subject names, dropping quartile suffixes.
pub fn extract_subjects(categories: &str) -> Vec<String> {
    categories
        .split(';')
        .filter_map(|category| {
            let subject = category.split('(').next().unwrap_or("").trim();
            (!subject.is_empty()).then(|| subject.to_string())
        })
        .collect()
}

/// Map one subject of `journal` (lowercased key) to a domain.
///
/// Named-journal overrides take precedence over the subject text. Returns
/// `None` when no rule recognises the subject.
pub fn map_subject(subject: &str, journal: &str) -> Option<Domain> {
    if STATISTICS_JOURNALS.contains(&journal) {
        return Some(Domain::Statistics);
    }
    if GENETICS_JOURNALS.contains(&journal) {
        return Some(Domain::Bioinformatics);
    }

    let subject = subject.to_lowercase();
    SUBJECT_RULES
        .iter()
        .find(|(_, terms)| terms.iter().any(|t| subject.contains(t)))
        .map(|(domain, _)| *domain)
}

/// All domains for a journal's categories string, de-duplicated in order of
/// first appearance.
pub fn domains_for_categories(categories: &str, journal: &str) -> Vec<Domain> {
    let mut domains = Vec::new();
    for subject in extract_subjects(categories) {
        if let Some(domain) = map_subject(&subject, journal) {
            if !domains.contains(&domain) {
                domains.push(domain);
            }
        }
    }
    domains
}
