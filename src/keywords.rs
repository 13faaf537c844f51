//! Keyword fallback classifier over title and venue text.

use crate::domain::Domain;
use once_cell::sync::Lazy;
use regex::Regex;

/// Venue vocabulary that marks a mathematics venue (unless it also says
/// "statistics").
const MATHEMATICS_VENUE_TERMS: &[&str] = &[
    "differential equations",
    "mathematical analysis",
    "pure mathematics",
    "applied mathematics",
    "mathematics",
    "mathematical",
];

const STATISTICS_VENUE_TERMS: &[&str] = &[
    "statistics",
    "statistical",
    "probability",
    "stochastic",
    "bernoulli",
    "biometrika",
    "biostatistics",
];

/// Text that marks a paper as clearly CS/AI.
const CS_AI_INDICATORS: &[&str] = &[
    "computer vision",
    "pattern recognition",
    "machine learning",
    "deep learning",
    "neural network",
    "artificial intelligence",
    "image processing",
    "computer graphics",
    "robotics",
    "natural language processing",
    "nlp",
    "computer science",
];

const CS_AI_BOOST: f64 = 2.0;
const STATISTICS_PENALTY: f64 = 0.2;

/// Keyword lists in tie-break order.
const KEYWORD_TABLE: &[(Domain, &[&str])] = &[
    (
        Domain::Statistics,
        &[
            "statistical", "statistics", "probability", "inference", "estimation", "hypothesis",
            "regression", "anova", "bayesian", "frequentist", "multivariate", "correlation",
            "variance", "distribution", "bootstrap", "monte carlo", "sampling", "likelihood",
            "significance", "p-value", "change-point", "change point", "high-dimensional",
            "dimensional", "homogeneity", "detection", "test", "testing", "linear models",
            "differential abundance", "compositional data", "linda", "asymptotic",
            "limit theorem", "martingale", "stochastic", "random process", "time series analysis",
            "statistical method", "statistical theory", "confidence interval", "hypothesis test",
            "nonparametric", "semiparametric", "wild bootstrap", "spectral theory",
        ],
    ),
    (
        Domain::Mathematics,
        &[
            "mathematics", "mathematical", "theorem", "proof", "algebra", "geometry", "topology",
            "analysis", "differential equations", "partial differential", "ordinary differential",
            "calculus", "optimization", "numerical analysis", "linear algebra", "abstract algebra",
            "number theory", "combinatorics", "graph theory", "logic", "set theory",
            "measure theory", "functional analysis", "real analysis", "complex analysis",
            "harmonic analysis", "approximation theory", "discrete mathematics",
            "applied mathematics", "pure mathematics",
        ],
    ),
    (
        Domain::ComputerScienceAi,
        &[
            "machine learning", "deep learning", "neural network", "artificial intelligence",
            "classification", "clustering", "supervised", "unsupervised", "reinforcement",
            "feature selection", "random forest", "svm", "support vector", "gradient", "algorithm",
            "training", "prediction", "tensorflow", "pytorch", "computer vision",
            "pattern recognition", "image processing", "image analysis", "object detection",
            "face recognition", "visual", "image classification", "software", "programming",
            "computer science",
        ],
    ),
    (
        Domain::Bioinformatics,
        &[
            "bioinformatics", "genomics", "proteomics", "microbiome", "rna", "dna", "gene",
            "genome", "sequencing", "gene expression", "biological data", "molecular biology",
            "biomarker", "pathway", "transcriptome", "chromosome", "mutation", "variant", "snp",
            "genome-wide", "phylogenetic",
        ],
    ),
    (
        Domain::Environmental,
        &[
            "environmental", "ecology", "climate", "ecosystem", "biodiversity", "conservation",
            "sustainability", "pollution", "carbon", "species", "ecological", "habitat",
            "earth sciences", "geology",
        ],
    ),
    (
        Domain::Economics,
        &[
            "econometrics", "economics", "financial markets", "economic growth", "gdp",
            "economic policy", "finance", "financial crisis", "stock market", "trading",
            "investment", "portfolio", "asset pricing", "monetary policy", "fiscal policy",
            "labor economics", "development economics", "international trade",
        ],
    ),
    (
        Domain::SocialSciences,
        &[
            "psychology", "sociology", "survey", "social", "behavioral", "demographic",
            "population", "policy", "human", "community", "education", "anthropology",
            "political science",
        ],
    ),
    (
        Domain::Medicine,
        &[
            "medicine", "medical", "health", "clinical", "epidemiology", "public health",
            "biomedical", "therapeutic", "treatment",
        ],
    ),
];

/// Keywords this short only count as whole words.
const WHOLE_WORD_MAX_LEN: usize = 3;

#[derive(Debug)]
enum Matcher {
    Word(Regex),
    Substring(&'static str),
}

impl Matcher {
    fn new(keyword: &'static str) -> Self {
        if keyword.chars().count() <= WHOLE_WORD_MAX_LEN {
            let pattern = format!(r"\b{}\b", regex::escape(keyword));
            Matcher::Word(Regex::new(&pattern).expect("escaped keyword is a valid regex"))
        } else {
            Matcher::Substring(keyword)
        }
    }

    fn is_match(&self, text: &str) -> bool {
        match self {
            Matcher::Word(re) => re.is_match(text),
            Matcher::Substring(keyword) => text.contains(keyword),
        }
    }
}

#[derive(Debug)]
struct Keyword {
    matcher: Matcher,
    weight: f64,
}

#[derive(Debug)]
struct DomainRule {
    domain: Domain,
    keywords: Vec<Keyword>,
}

static DEFAULT_RULES: Lazy<Vec<DomainRule>> = Lazy::new(|| {
    KEYWORD_TABLE
        .iter()
        .map(|(domain, keywords)| DomainRule {
            domain: *domain,
            keywords: keywords
                .iter()
                .map(|k| Keyword {
                    matcher: Matcher::new(k),
                    weight: k.split_whitespace().count() as f64,
                })
                .collect(),
        })
        .collect()
});

static CS_AI_MATCHERS: Lazy<Vec<Matcher>> =
    Lazy::new(|| CS_AI_INDICATORS.iter().map(|k| Matcher::new(k)).collect());

/// Per-domain scores for one piece of text, in table order.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordScores {
    pub scores: Vec<(Domain, f64)>,
    pub cs_ai_text: bool,
}

impl KeywordScores {
    /// Highest positive score; ties go to the earlier table entry.
    pub fn best(&self) -> Option<Domain> {
        let mut best: Option<(Domain, f64)> = None;
        for &(domain, score) in &self.scores {
            if score > 0.0 && best.map_or(true, |(_, s)| score > s) {
                best = Some((domain, score));
            }
        }
        best.map(|(domain, _)| domain)
    }
}

/// Keyword fallback classifier.
///
/// Stateless apart from precompiled matchers; cheap to construct and share.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a publication from its title and venue.
    pub fn classify(&self, title: &str, venue: &str) -> Option<Domain> {
        let venue_lower = venue.trim().to_lowercase();
        if let Some(domain) = venue_override(&venue_lower) {
            return Some(domain);
        }
        self.score(title, &venue_lower).best()
    }

    /// Raw scores without the venue overrides.
    pub fn score(&self, title: &str, venue: &str) -> KeywordScores {
        let text = format!("{} {}", title, venue).to_lowercase();
        let cs_ai_text = CS_AI_MATCHERS.iter().any(|m| m.is_match(&text));

        let scores = DEFAULT_RULES
            .iter()
            .map(|rule| {
                let mut score: f64 = rule
                    .keywords
                    .iter()
                    .filter(|k| k.matcher.is_match(&text))
                    .map(|k| k.weight)
                    .sum();
                if cs_ai_text {
                    match rule.domain {
                        Domain::ComputerScienceAi if score > 0.0 => score *= CS_AI_BOOST,
                        Domain::Statistics => score *= STATISTICS_PENALTY,
                        _ => {}
                    }
                }
                (rule.domain, score)
            })
            .collect();

        KeywordScores { scores, cs_ai_text }
    }
}

fn venue_override(venue_lower: &str) -> Option<Domain> {
    if venue_lower.is_empty() {
        return None;
    }
    let has = |terms: &[&str]| terms.iter().any(|t| venue_lower.contains(t));
    if has(MATHEMATICS_VENUE_TERMS) && !venue_lower.contains("statistics") {
        Some(Domain::Mathematics)
    } else if has(STATISTICS_VENUE_TERMS) {
        Some(Domain::Statistics)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_learning_titles_go_to_cs() {
        let classifier = KeywordClassifier::new();
        assert_eq!(
            classifier.classify("Deep learning for computer vision", ""),
            Some(Domain::ComputerScienceAi)
        );
        assert_eq!(
            classifier.classify("A deep learning approach to image classification", "Unknown Venue"),
            Some(Domain::ComputerScienceAi)
        );
    }

    #[test]
    fn test_cs_text_dampens_statistics() {
        let scores = KeywordClassifier::new().score(
            "Bayesian regression via machine learning",
            "",
        );
        assert!(scores.cs_ai_text);
        let stats = scores.scores[0].1;
        assert!((stats - 0.4).abs() < 1e-9);
        assert_eq!(scores.best(), Some(Domain::ComputerScienceAi));
    }

    #[test]
    fn test_venue_overrides() {
        let classifier = KeywordClassifier::new();
        assert_eq!(
            classifier.classify("Gene networks", "Journal of Applied Mathematics"),
            Some(Domain::Mathematics)
        );
        assert_eq!(
            classifier.classify("Deep nets", "Mathematical Statistics Letters"),
            Some(Domain::Statistics)
        );
        assert_eq!(
            classifier.classify("Anything", "Stochastic Systems"),
            Some(Domain::Statistics)
        );
    }

    #[test]
    fn test_short_keywords_need_whole_words() {
        let classifier = KeywordClassifier::new();
        // "dna" inside "hydnag" must not fire
        assert_eq!(classifier.classify("The hydnag effect", ""), None);
        assert_eq!(classifier.classify("DNA repair", ""), Some(Domain::Bioinformatics));
    }

    #[test]
    fn test_ties_follow_table_order() {
        // one statistics hit and one mathematics hit
        let classifier = KeywordClassifier::new();
        assert_eq!(classifier.classify("bootstrap theorem", ""), Some(Domain::Statistics));
    }

    #[test]
    fn test_nothing_matches() {
        assert_eq!(KeywordClassifier::new().classify("On poetry", "Lit Review"), None);
    }
}
