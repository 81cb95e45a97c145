use serde::{Deserialize, Serialize};

/// Resume content in the schema shared by the content loader, the model output
/// parser and the renderer.
///
/// Every field is optional. An absent section is omitted from the rendered
/// document; it is never an error. Unknown keys are rejected at every level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<SkillGroup>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<Vec<Entry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<Entry>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SkillGroup {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub items: String,
}

/// One experience or project entry.
///
/// For projects, `position` holds the project name. `raw_position` marks a
/// position that already contains LaTeX markup and must not be escaped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Entry {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub position: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub organization: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub date: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub location: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bullets: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub raw_position: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl ContentRecord {
    /// True when the record carries nothing that would render.
    pub fn is_empty(&self) -> bool {
        self.summary.as_deref().map_or(true, |s| s.trim().is_empty())
            && self.skills.as_ref().map_or(true, Vec::is_empty)
            && self.experience_entries().is_empty()
            && self.project_entries().is_empty()
    }

    pub fn experience_entries(&self) -> &[Entry] {
        self.experience.as_deref().unwrap_or_default()
    }

    pub fn project_entries(&self) -> &[Entry] {
        self.projects.as_deref().unwrap_or_default()
    }

    /// Serializes the record back to YAML in schema order.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Freeform background text. Treated as an opaque corpus of facts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileText(pub String);

impl ProfileText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// Everything the caller trusts: the base record, plus an optional profile.
///
/// The base record is always the last line of defense. When a profile is
/// present tailoring tries it first and degrades to the base record.
#[derive(Debug, Clone, Default)]
pub struct TrustedInput {
    pub base: ContentRecord,
    pub profile: Option<ProfileText>,
}

impl TrustedInput {
    pub fn from_base(base: ContentRecord) -> Self {
        Self {
            base,
            profile: None,
        }
    }

    pub fn with_profile(mut self, profile: ProfileText) -> Self {
        self.profile = Some(profile);
        self
    }

    /// The profile, if one was supplied and it is not blank.
    pub fn usable_profile(&self) -> Option<&ProfileText> {
        self.profile.as_ref().filter(|p| !p.is_blank())
    }
}
