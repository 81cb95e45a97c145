pub mod render;
pub mod serve;
pub mod tailor;

use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;

/// Writes `text` to `path`, or to stdout when no path is given.
pub(crate) async fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            tokio::fs::write(path, text)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(text.as_bytes()).await?;
            stdout.flush().await?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_output_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/resume.tex");
        write_output(Some(path.as_path()), "\\cvsection{Summary}").await.unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "\\cvsection{Summary}");
    }
}
