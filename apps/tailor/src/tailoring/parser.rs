//! Output Parser: turns raw model text into a `ContentRecord`.
//!
//! A document is accepted whole or rejected whole. There is no partial
//! recovery: a malformed or off-schema reply is a `ParseError`.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::models::content::ContentRecord;

#[derive(Debug, Error)]
#[error("model output is not a valid content record: {reason}")]
pub struct ParseError {
    pub reason: String,
    /// The unmodified model reply, kept for diagnostics.
    pub raw: String,
}

fn fenced_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)```(?:yaml|yml)?[ \t]*\r?\n(.*?)```").expect("valid regex")
    })
}

/// Returns the body of the first ```yaml / ``` fence, or the whole text.
pub fn extract_yaml(text: &str) -> &str {
    let text = text.trim();
    match fenced_block().captures(text).and_then(|c| c.get(1)) {
        Some(body) => body.as_str().trim(),
        None => text,
    }
}

pub fn parse(raw: &str) -> Result<ContentRecord, ParseError> {
    let body = extract_yaml(raw);
    if body.is_empty() {
        return Err(ParseError {
            reason: "empty output".to_string(),
            raw: raw.to_string(),
        });
    }

    serde_yaml::from_str::<ContentRecord>(body).map_err(|e| ParseError {
        reason: e.to_string(),
        raw: raw.to_string(),
    })
}
