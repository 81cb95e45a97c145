//! Fact Store: the normalized index of identity-bearing facts.
//!
//! A fact is an organization, a position title or a project name. Everything
//! else in a record (bullets, dates, locations, skills, summary) is wording the
//! model is allowed to rephrase, so it never enters the index.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::models::content::{ContentRecord, Entry, ProfileText};

/// Characters the renderer escapes. They only carry formatting, never identity.
const FORMATTING_CHARS: &[char] = &['\\', '&', '%', '#', '_', '{', '}', '$', '~', '^'];

/// Lowercases, blanks out formatting characters and collapses whitespace.
///
/// Idempotent: `normalize(&normalize(s)) == normalize(s)`.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    lowered
        .split(|c: char| c.is_whitespace() || FORMATTING_CHARS.contains(&c))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn link_command() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\(?:href|url)\s*\{[^}]*\}").expect("valid regex"))
}

fn command_name() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\[A-Za-z]+\*?").expect("valid regex"))
}

/// Reduces a LaTeX fragment to the text a reader would see.
///
/// Link targets are dropped, command names are dropped, arguments are kept:
/// `\textbf{Tailor} \href{https://x}{Demo}` becomes `{Tailor} {Demo}`.
pub fn plain_text(markup: &str) -> String {
    let without_links = link_command().replace_all(markup, " ");
    command_name().replace_all(&without_links, " ").into_owned()
}

/// Normalized identity of an entry's position. Project names and raw
/// positions may carry markup; they are reduced to plain text first.
pub(crate) fn position_key(entry: &Entry, is_project: bool) -> String {
    if is_project || entry.raw_position {
        normalize(&plain_text(&entry.position))
    } else {
        normalize(&entry.position)
    }
}

/// A set of normalized facts extracted from a structured record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactSet {
    facts: HashSet<String>,
    /// Entry counts of the record the set came from. `None` when the set was
    /// assembled from loose facts.
    max_experience: Option<usize>,
    max_projects: Option<usize>,
}

impl FactSet {
    /// Builds a set from loose fact strings. Each one is normalized.
    #[cfg(test)]
    pub fn from_facts<I, S>(facts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let facts = facts
            .into_iter()
            .map(|f| normalize(f.as_ref()))
            .filter(|f| !f.is_empty())
            .collect();
        Self {
            facts,
            max_experience: None,
            max_projects: None,
        }
    }

    /// The normalized union of every organization, position and project name.
    pub fn from_record(record: &ContentRecord) -> Self {
        let mut facts = HashSet::new();
        let sections = [
            (record.experience_entries(), false),
            (record.project_entries(), true),
        ];
        for (entries, is_project) in sections {
            for entry in entries {
                let organization = normalize(&entry.organization);
                if !organization.is_empty() {
                    facts.insert(organization);
                }
                let position = position_key(entry, is_project);
                if !position.is_empty() {
                    facts.insert(position);
                }
            }
        }
        Self {
            facts,
            max_experience: Some(record.experience_entries().len()),
            max_projects: Some(record.project_entries().len()),
        }
    }

    /// Exact membership of an already-normalized value.
    pub fn contains(&self, normalized: &str) -> bool {
        self.facts.contains(normalized)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn max_experience(&self) -> Option<usize> {
        self.max_experience
    }

    pub fn max_projects(&self) -> Option<usize> {
        self.max_projects
    }
}

/// The normalized profile text. Facts cannot be enumerated from prose, so
/// lookups are containment checks against the whole corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileCorpus {
    text: String,
}

impl ProfileCorpus {
    pub fn new(profile: &ProfileText) -> Self {
        Self {
            text: normalize(profile.as_str()),
        }
    }

    /// Containment of an already-normalized value on word boundaries: the
    /// match may not start or end in the middle of an alphanumeric run.
    pub fn contains(&self, normalized: &str) -> bool {
        if normalized.is_empty() {
            return true;
        }
        let mut from = 0;
        while let Some(offset) = self.text[from..].find(normalized) {
            let start = from + offset;
            let end = start + normalized.len();
            let before = self.text[..start].chars().next_back();
            let after = self.text[end..].chars().next();
            if !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
            {
                return true;
            }
            from = start + self.text[start..].chars().next().map_or(1, char::len_utf8);
        }
        false
    }
}

/// Where candidate facts are checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactStore {
    Facts(FactSet),
    Profile(ProfileCorpus),
}

/// Trusted source a store is built from.
#[derive(Debug, Clone, Copy)]
pub enum FactSource<'a> {
    Record(&'a ContentRecord),
    Profile(&'a ProfileText),
}

impl FactStore {
    /// Indexes a trusted source. Never fails; the result may be empty.
    pub fn build(source: FactSource<'_>) -> Self {
        match source {
            FactSource::Record(record) => FactStore::Facts(FactSet::from_record(record)),
            FactSource::Profile(profile) => FactStore::Profile(ProfileCorpus::new(profile)),
        }
    }

    /// Membership (facts) or containment (profile) of a normalized value.
    pub fn contains(&self, normalized: &str) -> bool {
        match self {
            FactStore::Facts(set) => set.contains(normalized),
            FactStore::Profile(corpus) => corpus.contains(normalized),
        }
    }
}

impl From<FactSet> for FactStore {
    fn from(set: FactSet) -> Self {
        FactStore::Facts(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases_and_collapses_whitespace() {
        assert_eq!(normalize("  Acme   Corp\n"), "acme corp");
        assert_eq!(normalize("Senior\tEngineer"), "senior engineer");
    }

    #[test]
    fn test_normalize_strips_formatting_characters() {
        assert_eq!(normalize("R&D Lab"), "r d lab");
        assert_eq!(normalize("R & D Lab"), "r d lab");
        assert_eq!(normalize("data_platform"), "data platform");
        assert_eq!(normalize("{Tailor}"), "tailor");
        assert_eq!(normalize("100% $Growth$ #1 ~ ^"), "100 growth 1");
    }

    #[test]
    fn test_normalize_keeps_identity_punctuation() {
        assert_eq!(normalize("Acme, Inc."), "acme, inc.");
        assert_eq!(normalize("C++ / Rust"), "c++ / rust");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "",
            "   ",
            "Acme Corp",
            "  Weird__Spacing &&  Stuff  ",
            "\\textbf{Bold} \\href{x}{y}",
            "ÉCOLE Polytechnique",
            "İstanbul Teknik",
            "tabs\tand\nnewlines\r\n",
            "$$$",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_plain_text_drops_commands_and_link_targets() {
        let raw = r"\textbf{Tailor} \href{https://github.com/me/tailor}{GitHub}";
        assert_eq!(normalize(&plain_text(raw)), "tailor github");
        assert_eq!(normalize(&plain_text("No markup here")), "no markup here");
        assert_eq!(normalize(&plain_text(r"\emph*{Star}")), "star");
    }

    fn entry(position: &str, organization: &str) -> Entry {
        Entry {
            position: position.to_string(),
            organization: organization.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_fact_set_from_record_collects_identity_fields_only() {
        let record = ContentRecord {
            summary: Some("Led Globex migration".to_string()),
            experience: Some(vec![Entry {
                date: "2020".to_string(),
                location: "Remote".to_string(),
                bullets: vec!["Worked with Initech".to_string()],
                ..entry("Senior Engineer", "Acme Corp")
            }]),
            projects: Some(vec![Entry {
                raw_position: true,
                ..entry(r"\textbf{Tailor}", "")
            }]),
            ..Default::default()
        };
        let set = FactSet::from_record(&record);
        assert_eq!(set.len(), 3);
        assert!(set.contains("acme corp"));
        assert!(set.contains("senior engineer"));
        assert!(set.contains("tailor"));
        assert!(!set.contains("globex"));
        assert!(!set.contains("remote"));
        assert_eq!(set.max_experience(), Some(1));
        assert_eq!(set.max_projects(), Some(1));
    }

    #[test]
    fn test_fact_set_from_empty_record_is_empty() {
        let set = FactSet::from_record(&ContentRecord::default());
        assert!(set.is_empty());
        assert_eq!(set.max_experience(), Some(0));
    }

    #[test]
    fn test_fact_set_from_facts_normalizes() {
        let set = FactSet::from_facts(["ACME  Corp", "", "Senior Engineer"]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("acme corp"));
        assert_eq!(set.max_experience(), None);
    }

    #[test]
    fn test_profile_corpus_whole_word_containment() {
        let corpus = ProfileCorpus::new(&ProfileText::new(
            "I spent four years at ACME Corp as a Senior   Engineer.\nBefore that: R&D intern.",
        ));
        assert!(corpus.contains("acme corp"));
        assert!(corpus.contains("senior engineer"));
        assert!(corpus.contains("r d intern."));
        assert!(!corpus.contains("acme corporation"));
        assert!(!corpus.contains("cme"));
        assert!(!corpus.contains("acme corp as a senior engineers"));
        assert!(corpus.contains(""));
    }

    #[test]
    fn test_fact_store_build_dispatches_on_source() {
        let record = ContentRecord {
            experience: Some(vec![entry("Engineer", "Acme")]),
            ..Default::default()
        };
        let store = FactStore::build(FactSource::Record(&record));
        assert!(matches!(store, FactStore::Facts(_)));
        assert!(store.contains("acme"));

        let profile = ProfileText::new("Engineer at Acme");
        let store = FactStore::build(FactSource::Profile(&profile));
        assert!(matches!(store, FactStore::Profile(_)));
        assert!(store.contains("engineer at acme"));
    }
}
