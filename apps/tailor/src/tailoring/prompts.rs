// Prompt templates for tailoring.
// Reuses the cross-cutting fragments from llm_client::prompts.

/// System prompt for tailoring. Replace `{no_fabrication}` and `{schema}`.
pub const TAILOR_SYSTEM_TEMPLATE: &str = "You are a resume tailor. \
{no_fabrication} \
{schema}";

/// Tailoring prompt with a job description.
/// Replace: {trusted_label}, {job_description}, {trusted_content}
pub const TAILOR_PROMPT_TEMPLATE: &str = r#"{trusted_label}:
```
{trusted_content}
```

Job description:
```
{job_description}
```

Produce tailored resume YAML that matches the job description while using ONLY the facts above. Output nothing but the YAML (you may wrap it in a ```yaml ... ``` code block)."#;

/// Polishing prompt, used when no job description is given.
/// Replace: {trusted_label}, {trusted_content}
pub const POLISH_PROMPT_TEMPLATE: &str = r#"{trusted_label}:
```
{trusted_content}
```

Produce a polished version of this resume as YAML. Use ONLY the facts above; do not add any new information. Output nothing but the YAML (you may wrap it in a ```yaml ... ``` code block)."#;

pub const BASE_CONTENT_LABEL: &str = "Base resume content (YAML)";

pub const PROFILE_CONTENT_LABEL: &str =
    "Candidate profile (free text; the only source of facts you may use)";
