//! Author-string parsing and owner position resolution.
//!
//! Author strings come in as rendered on profile pages:
//! `"K He, X Zhang, S Ren, J Sun"`, `"A Smith and B Jones"`,
//! `"J Doe, R Roe, ..."`.  A truncated list hides its tail, so the last
//! visible author of a truncated list is reported as a middle author.

use crate::publication::Publication;
use crate::resolver::contains_word;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

static TRUNCATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\.\.\.|…|\bet\s+al\b|\band\s+others\b|\band\s+more\b|\+\s*\d+\s*more\b|\+\s*more\b|\+\s*others\b|\betc\b",
    )
    .expect("valid truncation regex")
});

static SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",|;|\s+and\s+").expect("valid separator regex"));

static HONORIFIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:Dr\.?|Prof\.?|Mr\.?|Ms\.?|Mrs\.?)\s+").expect("valid honorific regex"));

static SUFFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+(?:Jr\.?|Sr\.?|III?|IV)$").expect("valid suffix regex"));

const MARKER_REMNANTS: &[&str] = &["...", "…", "et al", "et al.", "and others", "and more", "etc"];

/// Surnames too generic to identify anyone on their own.
const GENERIC_SURNAMES: &[&str] = &["the", "and", "for", "with", "from", "van", "de", "la", "le"];

/// One author name as it appeared in the list, cleaned of honorifics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AuthorToken(String);

impl AuthorToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parsed author list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedAuthors {
    pub tokens: Vec<AuthorToken>,
    /// The rendered list hid some authors
    pub truncated: bool,
}

impl ParsedAuthors {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Split a raw author string into cleaned tokens.
pub fn parse_authors(raw: &str) -> ParsedAuthors {
    if raw.trim().is_empty() {
        return ParsedAuthors::default();
    }

    let (visible, truncated) = match TRUNCATION_RE.find(raw) {
        Some(m) => (&raw[..m.start()], true),
        None => (raw, false),
    };
    let visible = visible.trim().trim_end_matches(',').trim();

    let tokens = SEPARATOR_RE
        .split(visible)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .filter_map(|token| {
            let token = HONORIFIC_RE.replace(token, "");
            let token = SUFFIX_RE.replace(&token, "");
            let token = token.trim();
            let keep = !token.is_empty() && !MARKER_REMNANTS.contains(&token);
            keep.then(|| AuthorToken(token.to_string()))
        })
        .collect();

    ParsedAuthors { tokens, truncated }
}

/// The profile owner's position on a paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorRole {
    FirstAuthor,
    SecondAuthor,
    LastAuthor,
    MiddleAuthor,
    SingleAuthor,
    Unknown,
}

impl AuthorRole {
    pub const ALL: [AuthorRole; 6] = [
        AuthorRole::FirstAuthor,
        AuthorRole::SecondAuthor,
        AuthorRole::LastAuthor,
        AuthorRole::MiddleAuthor,
        AuthorRole::SingleAuthor,
        AuthorRole::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AuthorRole::FirstAuthor => "first_author",
            AuthorRole::SecondAuthor => "second_author",
            AuthorRole::LastAuthor => "last_author",
            AuthorRole::MiddleAuthor => "middle_author",
            AuthorRole::SingleAuthor => "single_author",
            AuthorRole::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AuthorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owner display name split into the forms the matcher tries.
#[derive(Debug, Clone)]
struct OwnerName {
    full: String,
    first: Option<String>,
    last: Option<String>,
}

impl OwnerName {
    fn new(display: &str) -> Self {
        let full = display.trim().to_lowercase();
        let parts: Vec<&str> = full.split_whitespace().collect();
        let (first, last) = if parts.len() >= 2 {
            (
                parts.first().map(|s| s.to_string()),
                parts.last().map(|s| s.to_string()),
            )
        } else {
            (None, None)
        };
        Self { full, first, last }
    }

    fn matches(&self, author: &str) -> bool {
        let author = author.trim().to_lowercase();
        if author.contains(&self.full) {
            return true;
        }
        let (Some(first), Some(last)) = (&self.first, &self.last) else {
            return false;
        };

        if author.contains(&format!("{}, {}", last, first)) || author.contains(&format!("{} {}", first, last)) {
            return true;
        }

        if let Some(initial) = first.chars().next() {
            let forms = [
                format!("{} {}", initial, last),
                format!("{}. {}", initial, last),
                format!("{}, {}", last, initial),
                format!("{}, {}.", last, initial),
            ];
            if forms.iter().any(|form| contains_word(&author, form)) {
                return true;
            }
        }

        last.chars().count() >= 3 && !GENERIC_SURNAMES.contains(&last.as_str()) && contains_word(&author, last)
    }
}

/// Find the owner's role in a parsed author list.
pub fn resolve_role(owner: &str, tokens: &[AuthorToken], truncated: bool) -> AuthorRole {
    role_for(&OwnerName::new(owner), tokens, truncated)
}

fn role_for(owner: &OwnerName, tokens: &[AuthorToken], truncated: bool) -> AuthorRole {
    if tokens.is_empty() {
        return AuthorRole::Unknown;
    }
    if tokens.len() == 1 && !truncated {
        return AuthorRole::SingleAuthor;
    }
    if owner.full.is_empty() {
        return AuthorRole::Unknown;
    }

    let Some(index) = tokens.iter().position(|t| owner.matches(t.as_str())) else {
        return AuthorRole::Unknown;
    };

    match index {
        0 => AuthorRole::FirstAuthor,
        1 => AuthorRole::SecondAuthor,
        i if i == tokens.len() - 1 && !truncated => AuthorRole::LastAuthor,
        _ => AuthorRole::MiddleAuthor,
    }
}

/// Owner role on one publication.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorshipRecord {
    pub index: usize,
    pub title: String,
    pub year: Option<i32>,
    pub citation_count: u64,
    pub role: AuthorRole,
    pub author_count: usize,
    pub truncated: bool,
}

/// Paper reference stored under a role bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaperRef {
    pub title: String,
    pub year: Option<i32>,
    pub citations: u64,
}

/// Aggregates for one role bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoleStats {
    pub count: usize,
    pub citations: u64,
    pub papers: Vec<PaperRef>,
    /// Share of all publications, one decimal
    pub percentage: f64,
    /// One decimal
    pub avg_citations: f64,
}

/// Authorship statistics for a profile.
///
/// Bucket counts overlap on purpose: a single-author paper is also counted
/// as first and last author, and second author of a two-author paper is also
/// counted as last author.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuthorshipStats {
    pub roles: BTreeMap<AuthorRole, RoleStats>,
    pub records: Vec<AuthorshipRecord>,
}

impl AuthorshipStats {
    pub fn role(&self, role: AuthorRole) -> Option<&RoleStats> {
        self.roles.get(&role)
    }

    pub fn count(&self, role: AuthorRole) -> usize {
        self.roles.get(&role).map_or(0, |s| s.count)
    }
}

/// Resolves the owner's role across a profile.
#[derive(Debug, Clone)]
pub struct AuthorPositionResolver {
    owner: OwnerName,
    display: String,
}

impl AuthorPositionResolver {
    pub fn new(owner: &str) -> Self {
        Self {
            owner: OwnerName::new(owner),
            display: owner.trim().to_string(),
        }
    }

    /// Role on one publication.
    pub fn record(&self, index: usize, publication: &Publication) -> AuthorshipRecord {
        let parsed = parse_authors(&publication.authors);
        let role = role_for(&self.owner, &parsed.tokens, parsed.truncated);
        if role == AuthorRole::Unknown && parsed.len() > 1 {
            warn!(
                title = %publication.title,
                owner = %self.display,
                authors = ?parsed.tokens.iter().take(3).map(AuthorToken::as_str).collect::<Vec<_>>(),
                "Could not determine author position"
            );
        }
        AuthorshipRecord {
            index,
            title: publication.title.clone(),
            year: publication.year,
            citation_count: publication.citation_count,
            role,
            author_count: parsed.len(),
            truncated: parsed.truncated,
        }
    }

    /// Role statistics over all publications.
    pub fn analyze(&self, publications: &[Publication]) -> AuthorshipStats {
        let mut roles: BTreeMap<AuthorRole, RoleStats> =
            AuthorRole::ALL.iter().map(|&r| (r, RoleStats::default())).collect();
        let mut records = Vec::with_capacity(publications.len());

        for (index, publication) in publications.iter().enumerate() {
            let record = self.record(index, publication);
            let paper = PaperRef {
                title: record.title.clone(),
                year: record.year,
                citations: record.citation_count,
            };

            let mut credit = |role: AuthorRole| {
                let stats = roles.entry(role).or_default();
                stats.count += 1;
                stats.citations += record.citation_count;
                stats.papers.push(paper.clone());
            };

            credit(record.role);
            match record.role {
                AuthorRole::SingleAuthor => {
                    credit(AuthorRole::FirstAuthor);
                    credit(AuthorRole::LastAuthor);
                }
                AuthorRole::SecondAuthor if record.author_count == 2 && !record.truncated => {
                    credit(AuthorRole::LastAuthor);
                }
                _ => {}
            }
            records.push(record);
        }

        let total = publications.len();
        for stats in roles.values_mut() {
            if total > 0 {
                stats.percentage = crate::aggregate::round1(stats.count as f64 / total as f64 * 100.0);
            }
            if stats.count > 0 {
                stats.avg_citations = crate::aggregate::round1(stats.citations as f64 / stats.count as f64);
            }
        }

        AuthorshipStats { roles, records }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(parsed: &ParsedAuthors) -> Vec<&str> {
        parsed.tokens.iter().map(AuthorToken::as_str).collect()
    }

    fn publication(authors: &str, citations: u64) -> Publication {
        Publication {
            title: format!("paper by {}", authors),
            authors: authors.to_string(),
            citation_count: citations,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_separators_and_honorifics() {
        let parsed = parse_authors("Dr. Jane Roe; John Doe Jr. and Prof Ada Lovelace, Carl Gauss III");
        assert_eq!(tokens(&parsed), vec!["Jane Roe", "John Doe", "Ada Lovelace", "Carl Gauss"]);
        assert!(!parsed.truncated);
    }

    #[test]
    fn test_parse_truncation_markers() {
        for raw in [
            "A Smith, B Jones, ...",
            "A Smith, B Jones …",
            "A Smith, B Jones et al.",
            "A Smith, B Jones and others",
            "A Smith, B Jones, + 12 more",
            "A Smith, B Jones + others",
            "A Smith, B Jones, etc",
        ] {
            let parsed = parse_authors(raw);
            assert!(parsed.truncated, "{raw}");
            assert_eq!(tokens(&parsed), vec!["A Smith", "B Jones"], "{raw}");
        }
    }

    #[test]
    fn test_etc_inside_a_name_is_not_truncation() {
        let parsed = parse_authors("R Betcher, S Hetcher");
        assert!(!parsed.truncated);
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_owner_match_forms() {
        let authors = |raw: &str| parse_authors(raw).tokens;
        assert_eq!(resolve_role("Kaiming He", &authors("K He, X Zhang, S Ren"), false), AuthorRole::FirstAuthor);
        assert_eq!(resolve_role("Kaiming He", &authors("X Zhang and Dr Kaiming He"), false), AuthorRole::SecondAuthor);
        assert_eq!(
            resolve_role("Jian Sun", &authors("K He, X Zhang, S Ren, J. Sun"), false),
            AuthorRole::LastAuthor
        );
        assert_eq!(
            resolve_role("Shaoqing Ren", &authors("K He, X Zhang, Ren S, J Sun"), false),
            AuthorRole::MiddleAuthor
        );
        // two-letter surname only matches through initials
        assert_eq!(resolve_role("Kaiming He", &authors("X Zhang, Y He, Z Li"), false), AuthorRole::Unknown);
    }

    #[test]
    fn test_generic_surname_does_not_match_alone() {
        let authors = parse_authors("A Smith, Q Van, B Jones").tokens;
        assert_eq!(resolve_role("Maria Van", &authors, false), AuthorRole::Unknown);
    }

    #[test]
    fn test_truncated_tail_is_middle() {
        let parsed = parse_authors("A Smith, B Jones, C Brown, ...");
        let role = resolve_role("Carol Brown", &parsed.tokens, parsed.truncated);
        assert_eq!(role, AuthorRole::MiddleAuthor);

        let parsed = parse_authors("C Brown et al.");
        assert_eq!(
            resolve_role("Carol Brown", &parsed.tokens, parsed.truncated),
            AuthorRole::FirstAuthor
        );
    }

    #[test]
    fn test_empty_and_blank_owner() {
        assert_eq!(resolve_role("Carol Brown", &[], false), AuthorRole::Unknown);
        let parsed = parse_authors("A Smith, B Jones");
        assert_eq!(resolve_role("  ", &parsed.tokens, false), AuthorRole::Unknown);
    }

    #[test]
    fn test_duplication_rules() {
        let resolver = AuthorPositionResolver::new("Carol Brown");
        let stats = resolver.analyze(&[
            publication("Carol Brown", 10),
            publication("A Smith, C Brown", 4),
            publication("A Smith, C Brown, ...", 2),
            publication("A Smith, B Jones", 0),
        ]);
        assert_eq!(stats.count(AuthorRole::SingleAuthor), 1);
        assert_eq!(stats.count(AuthorRole::FirstAuthor), 1);
        assert_eq!(stats.count(AuthorRole::SecondAuthor), 2);
        assert_eq!(stats.count(AuthorRole::LastAuthor), 2);
        assert_eq!(stats.count(AuthorRole::Unknown), 1);

        let last = stats.role(AuthorRole::LastAuthor).expect("bucket");
        assert_eq!(last.citations, 14);
        assert_eq!(last.avg_citations, 7.0);
        assert_eq!(last.percentage, 50.0);
    }
}
