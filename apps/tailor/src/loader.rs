//! Loaders for the trusted content and the job description.
//!
//! These run at the process boundary: file and network errors surface here as
//! `anyhow` errors with context, before any tailoring starts.

use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use regex::Regex;
use tracing::info;

use crate::models::content::{ContentRecord, ProfileText};

const JD_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn load_content(path: &Path) -> Result<ContentRecord> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read content file {}", path.display()))?;
    parse_content(&text).with_context(|| format!("Invalid content file {}", path.display()))
}

/// An empty or whitespace-only document is an empty record.
pub fn parse_content(text: &str) -> Result<ContentRecord> {
    if text.trim().is_empty() {
        return Ok(ContentRecord::default());
    }
    Ok(serde_yaml::from_str(text)?)
}

pub async fn load_profile(path: &Path) -> Result<ProfileText> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read profile file {}", path.display()))?;
    Ok(ProfileText::new(text))
}

pub fn is_url(source: &str) -> bool {
    let source = source.trim();
    source.starts_with("http://") || source.starts_with("https://")
}

/// Loads a job description from a local file or an `http(s)://` URL.
pub async fn load_job_description(source: &str) -> Result<String> {
    let source = source.trim();
    if source.is_empty() {
        bail!("Job description source is empty");
    }
    if is_url(source) {
        fetch_job_description(source).await
    } else {
        let path = Path::new(source);
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read job description {}", path.display()))?;
        Ok(job_description_from_file_text(&text))
    }
}

/// A YAML document with a `description` key yields that value; anything else
/// is used verbatim.
pub fn job_description_from_file_text(text: &str) -> String {
    if let Ok(serde_yaml::Value::Mapping(map)) = serde_yaml::from_str::<serde_yaml::Value>(text) {
        if let Some(description) = map.get("description") {
            return match description {
                serde_yaml::Value::String(s) => s.trim().to_string(),
                other => serde_yaml::to_string(other)
                    .map(|s| s.trim().to_string())
                    .unwrap_or_else(|_| text.trim().to_string()),
            };
        }
    }
    text.trim().to_string()
}

async fn fetch_job_description(url: &str) -> Result<String> {
    info!(url = %url, "Fetching job description");
    let response = reqwest::Client::new()
        .get(url)
        .timeout(JD_FETCH_TIMEOUT)
        .send()
        .await
        .with_context(|| format!("Failed to fetch job description from {url}"))?
        .error_for_status()
        .with_context(|| format!("Job description URL {url} returned an error"))?;

    let is_html = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("html"));
    let body = response
        .text()
        .await
        .context("Failed to read job description body")?;

    if is_html || looks_like_html(&body) {
        Ok(html_to_text(&body))
    } else {
        Ok(body.trim().to_string())
    }
}

fn looks_like_html(body: &str) -> bool {
    let head: String = body.trim_start().chars().take(256).collect::<String>().to_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

fn script_or_style() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<(script|style|noscript)\b.*?</(script|style|noscript)\s*>")
            .expect("valid regex")
    })
}

fn block_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)</?(p|div|br|li|ul|ol|h[1-6]|tr|section|article)\b[^>]*>")
            .expect("valid regex")
    })
}

fn any_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"))
}

/// Strips markup from a fetched page, keeping one line per block element.
pub fn html_to_text(html: &str) -> String {
    let text = script_or_style().replace_all(html, " ");
    let text = block_tag().replace_all(&text, "\n");
    let text = any_tag().replace_all(&text, " ");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        // Last, so an escaped entity such as `&amp;lt;` stays literal.
        .replace("&amp;", "&");

    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
