use serde::{Deserialize, Serialize};

use crate::models::content::{ContentRecord, Entry};
use crate::tailoring::facts::{normalize, position_key, FactStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Experience,
    Projects,
}

/// A candidate value with no counterpart in the trusted source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub section: Section,
    /// `organization`, `position`, `project`, or the section name for an
    /// entry-count excess.
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub ok: bool,
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    /// `field=value` pairs separated by `; `, for log lines and warnings.
    pub fn describe(&self) -> String {
        self.violations
            .iter()
            .map(|v| format!("{}={}", v.field, v.value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Checks every identity-bearing field of `candidate` against the trusted store.
///
/// Checked: organization and position of each experience entry, organization
/// and name of each project. Blank values pass. All violations are collected
/// in document order; one bad field never hides the rest.
///
/// Bullets, dates, locations, skills and summary are not checked: they are
/// the wording the model is allowed to change.
pub fn validate(candidate: &ContentRecord, trusted: &FactStore) -> ValidationResult {
    let mut violations = Vec::new();

    check_entries(
        candidate.experience_entries(),
        Section::Experience,
        trusted,
        &mut violations,
    );
    check_entries(
        candidate.project_entries(),
        Section::Projects,
        trusted,
        &mut violations,
    );

    if let FactStore::Facts(set) = trusted {
        check_count(
            candidate.experience_entries().len(),
            set.max_experience(),
            Section::Experience,
            &mut violations,
        );
        check_count(
            candidate.project_entries().len(),
            set.max_projects(),
            Section::Projects,
            &mut violations,
        );
    }

    ValidationResult {
        ok: violations.is_empty(),
        violations,
    }
}

fn check_entries(
    entries: &[Entry],
    section: Section,
    trusted: &FactStore,
    violations: &mut Vec<Violation>,
) {
    let is_project = section == Section::Projects;
    let position_field = if is_project { "project" } else { "position" };

    for entry in entries {
        let organization = normalize(&entry.organization);
        if !organization.is_empty() && !trusted.contains(&organization) {
            violations.push(Violation {
                section,
                field: "organization".to_string(),
                value: entry.organization.clone(),
            });
        }

        let position = position_key(entry, is_project);
        if !position.is_empty() && !trusted.contains(&position) {
            violations.push(Violation {
                section,
                field: position_field.to_string(),
                value: entry.position.clone(),
            });
        }
    }
}

/// A tailored record may drop entries, never add them.
fn check_count(
    actual: usize,
    allowed: Option<usize>,
    section: Section,
    violations: &mut Vec<Violation>,
) {
    let Some(allowed) = allowed else {
        return;
    };
    if actual > allowed {
        let field = match section {
            Section::Experience => "experience",
            Section::Projects => "projects",
        };
        violations.push(Violation {
            section,
            field: field.to_string(),
            value: format!("{actual} entries (base has {allowed})"),
        });
    }
}
