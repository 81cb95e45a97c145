//! LaTeX renderer: turns a `ContentRecord` into Awesome-CV section markup.
//!
//! Pure string building. Sections appear in the order Summary, Skills,
//! Experience, Projects, each only when present in the record.

use crate::models::content::{ContentRecord, Entry, SkillGroup};

const RULE: &str = "%--------------------------------------------------";

/// Escapes LaTeX special characters in plain text. Backslash goes first so
/// the escapes it produces are not escaped again.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash "),
            '&' => out.push_str("\\&"),
            '%' => out.push_str("\\%"),
            '#' => out.push_str("\\#"),
            '_' => out.push_str("\\_"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '$' => out.push_str("\\$"),
            '~' => out.push_str("\\textasciitilde "),
            '^' => out.push_str("\\textasciicircum "),
            other => out.push(other),
        }
    }
    out
}

fn section_header(comment: &str, title: &str) -> String {
    format!("{RULE}\n% {comment}\n{RULE}\n\\cvsection{{{title}}}\n")
}

pub fn render_summary(summary: &str) -> String {
    format!(
        "{}\n\\begin{{cvparagraph}}\n{}\n\\end{{cvparagraph}}\n",
        section_header("Summary", "Summary"),
        escape_latex(summary.trim())
    )
}

pub fn render_skills(skills: &[SkillGroup]) -> String {
    let mut lines = vec![
        section_header("Skills", "Skills"),
        "\\begin{cvskills}".to_string(),
    ];
    for skill in skills {
        lines.push(format!(
            "\\cvskill{{{}}}{{{}}}",
            escape_latex(&skill.category),
            escape_latex(&skill.items)
        ));
    }
    lines.push("\\end{cvskills}\n".to_string());
    lines.join("\n")
}

/// One `\cventry`: position, organization, date, location, items.
pub fn render_entry(entry: &Entry) -> String {
    let position = if entry.raw_position {
        entry.position.clone()
    } else {
        escape_latex(&entry.position)
    };
    let items = entry
        .bullets
        .iter()
        .map(|b| format!("\\item {}", escape_latex(b)))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "\\cventry\n{{{position}}}\n{{{}}}\n{{{}}}\n{{{}}}\n{{\n\\begin{{cvitems}}\n{items}\n\\end{{cvitems}}\n}}\n",
        escape_latex(&entry.organization),
        escape_latex(&entry.date),
        escape_latex(&entry.location),
    )
}

fn render_entries(title: &str, entries: &[Entry]) -> String {
    let mut parts = vec![section_header(title, title)];
    parts.extend(entries.iter().map(render_entry));
    parts.join("\n")
}

/// Renders every present section, separated by blank lines.
pub fn render_sections(record: &ContentRecord) -> String {
    let mut sections = Vec::new();
    if let Some(summary) = &record.summary {
        sections.push(render_summary(summary));
    }
    if let Some(skills) = &record.skills {
        sections.push(render_skills(skills));
    }
    if let Some(experience) = &record.experience {
        sections.push(render_entries("Experience", experience));
    }
    if let Some(projects) = &record.projects {
        sections.push(render_entries("Projects", projects));
    }
    sections.join("\n")
}
