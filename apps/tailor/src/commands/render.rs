//! `resume-tailor render`: render content to LaTeX without calling a model.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::commands::write_output;
use crate::loader::load_content;
use crate::render::render_sections;

pub async fn run(content: &Path, output: Option<PathBuf>) -> Result<()> {
    let record = load_content(content).await?;
    if record.is_empty() {
        info!(path = %content.display(), "Content is empty; nothing to render");
    }
    write_output(output.as_deref(), &render_sections(&record)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_render_writes_sections() {
        let dir = tempfile::tempdir().unwrap();
        let content = dir.path().join("content.yaml");
        std::fs::write(
            &content,
            "skills:\n  - category: Languages\n    items: Rust, C++\n",
        )
        .unwrap();
        let output = dir.path().join("resume.tex");

        run(&content, Some(output.clone())).await.unwrap();

        let tex = std::fs::read_to_string(output).unwrap();
        assert!(tex.contains("\\cvskill{Languages}{Rust, C++}"));
        assert!(!tex.contains("\\cvsection{Summary}"));
    }

    #[tokio::test]
    async fn test_render_rejects_invalid_content() {
        let dir = tempfile::tempdir().unwrap();
        let content = dir.path().join("content.yaml");
        std::fs::write(&content, "experience: not-a-list\n").unwrap();
        assert!(run(&content, None).await.is_err());
    }
}
