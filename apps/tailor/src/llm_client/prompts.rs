// Shared prompt fragments.
// Each feature that calls a model keeps its own prompts.rs next to it;
// this file holds the pieces every such prompt must carry.

/// The no-fabrication rule. Every tailoring prompt starts with it.
pub const NO_FABRICATION_INSTRUCTION: &str = "\
    CRITICAL: Your output must contain ONLY information that appears in the trusted content. \
    Do NOT invent job titles, companies, dates, technologies, projects, or achievements. \
    You may rephrase, reorder, shorten, and emphasize; you may NOT add new facts. \
    Keep every organization name and every job title exactly as written.";

/// Describes the output schema the parser accepts.
pub const CONTENT_SCHEMA_INSTRUCTION: &str = "\
    Output valid YAML only, with the top-level keys: summary, skills, experience, projects. \
    Use the same structure as the resume content: skills is a list of {category, items} \
    where items is a single comma-separated string; experience and projects are lists of \
    {position, organization, date, location, bullets}. \
    Preserve raw_position: true on entries that have it and leave their position text untouched. \
    Do NOT add any other keys.";
