//! `resume-tailor tailor`: tailor trusted content to one or more job descriptions.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::commands::write_output;
use crate::llm_client::BackendConfig;
use crate::loader::{is_url, load_content, load_job_description, load_profile};
use crate::models::content::TrustedInput;
use crate::render::render_sections;
use crate::tailoring::orchestrator::tailor;
use crate::tailoring::{Tailor, TailoringResult};

#[derive(Debug, Args)]
pub struct TailorArgs {
    /// Base resume content (YAML)
    #[arg(short, long)]
    pub content: PathBuf,

    /// Free-form profile text to tailor from before falling back to the base content
    #[arg(short, long)]
    pub profile: Option<PathBuf>,

    /// Job description file or http(s) URL; repeat to tailor for several jobs
    #[arg(short, long = "job")]
    pub jobs: Vec<String>,

    /// Output .tex file for a single job (stdout when omitted)
    #[arg(short, long, conflicts_with = "output_dir")]
    pub output: Option<PathBuf>,

    /// Directory receiving one .tex file per job
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Also write the tailored content back as YAML (single job only)
    #[arg(long)]
    pub emit_yaml: Option<PathBuf>,
}

pub async fn run(args: TailorArgs, backend: BackendConfig) -> Result<()> {
    let mut input = TrustedInput::from_base(load_content(&args.content).await?);
    if let Some(path) = &args.profile {
        input = input.with_profile(load_profile(path).await?);
    }

    info!(
        backend = %backend.kind,
        model = %backend.model,
        jobs = args.jobs.len(),
        "Tailoring resume"
    );

    if args.jobs.len() > 1 || args.output_dir.is_some() {
        let Some(dir) = &args.output_dir else {
            bail!("--output-dir is required when tailoring for more than one job");
        };
        if args.emit_yaml.is_some() {
            bail!("--emit-yaml takes a single --job");
        }
        let shared = Tailor::from_config(backend);
        return run_batch(Arc::new(input), &args.jobs, dir, shared).await;
    }

    let job_description = match args.jobs.first() {
        Some(source) => load_job_description(source).await?,
        None => {
            info!("No job description given; polishing the content as-is");
            String::new()
        }
    };

    let span = info_span!("tailor", request_id = %Uuid::new_v4());
    let result = tailor(&input, &job_description, &backend)
        .instrument(span)
        .await;
    report(&result);

    if let Some(path) = &args.emit_yaml {
        let yaml = result
            .record
            .to_yaml()
            .context("Failed to serialize tailored content")?;
        write_output(Some(path.as_path()), &yaml).await?;
    }
    write_output(args.output.as_deref(), &render_sections(&result.record)).await
}

/// Runs every job concurrently against the shared input. One job failing to
/// load does not stop the others; the command fails at the end if any did.
async fn run_batch(
    input: Arc<TrustedInput>,
    jobs: &[String],
    dir: &Path,
    tailor: Tailor,
) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut set = tokio::task::JoinSet::new();
    for (index, source) in jobs.iter().enumerate() {
        let input = Arc::clone(&input);
        let tailor = tailor.clone();
        let source = source.clone();
        let path = dir.join(output_file_name(index, &source));
        let span = info_span!("tailor", request_id = %Uuid::new_v4(), job = %source);

        set.spawn(
            async move {
                let job_description = load_job_description(&source).await?;
                let result = tailor.tailor(&input, &job_description).await;
                report(&result);
                write_output(Some(path.as_path()), &render_sections(&result.record)).await?;
                Ok::<_, anyhow::Error>(path)
            }
            .instrument(span),
        );
    }

    let mut failed = 0usize;
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(Ok(path)) => info!(path = %path.display(), "Wrote tailored resume"),
            Ok(Err(e)) => {
                failed += 1;
                error!(error = %format!("{e:#}"), "Job failed");
            }
            Err(e) => {
                failed += 1;
                error!(%e, "Tailoring task failed");
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} jobs failed", jobs.len());
    }
    Ok(())
}

fn report(result: &TailoringResult) {
    for warning in &result.warnings {
        warn!(warning = %warning, "Tailoring fallback");
    }
    info!(source = ?result.source, "Tailoring finished");
}

/// `NN-<slug>.tex`, numbered in `--job` order so names never collide.
fn output_file_name(index: usize, source: &str) -> String {
    let stem = if is_url(source) {
        source
            .trim()
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string()
    } else {
        Path::new(source.trim())
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    };

    let slug = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        format!("{:02}-job.tex", index + 1)
    } else {
        format!("{:02}-{slug}.tex", index + 1)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::llm_client::test_support::closed_port_url;

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name(0, "jobs/Rust Engineer.txt"), "01-rust-engineer.tex");
        assert_eq!(
            output_file_name(1, "https://jobs.example.com/postings/42/"),
            "02-42.tex"
        );
        assert_eq!(output_file_name(9, ""), "10-job.tex");
    }

    async fn offline_backend() -> BackendConfig {
        BackendConfig::local("llama3.2", closed_port_url().await)
    }

    fn write_file(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(text.as_bytes()).unwrap();
        path
    }

    const CONTENT: &str =
        "summary: Engineer\nexperience:\n  - position: Engineer\n    organization: Acme\n";

    #[tokio::test]
    async fn test_single_job_with_backend_down_writes_base_content() {
        let dir = tempfile::tempdir().unwrap();
        let content = write_file(dir.path(), "content.yaml", CONTENT);
        let job = write_file(dir.path(), "job.txt", "Rust role");
        let output = dir.path().join("out.tex");
        let yaml = dir.path().join("out.yaml");

        let args = TailorArgs {
            content,
            profile: None,
            jobs: vec![job.to_string_lossy().to_string()],
            output: Some(output.clone()),
            output_dir: None,
            emit_yaml: Some(yaml.clone()),
        };
        run(args, offline_backend().await).await.unwrap();

        let tex = std::fs::read_to_string(output).unwrap();
        assert!(tex.contains("\\cvsection{Experience}"));
        assert!(tex.contains("{Acme}"));
        let emitted = std::fs::read_to_string(yaml).unwrap();
        assert!(emitted.contains("organization: Acme"));
    }

    #[tokio::test]
    async fn test_batch_writes_one_file_per_job() {
        let dir = tempfile::tempdir().unwrap();
        let content = write_file(dir.path(), "content.yaml", CONTENT);
        let first = write_file(dir.path(), "backend.txt", "Backend role");
        let second = write_file(dir.path(), "platform.yaml", "description: Platform role");
        let out_dir = dir.path().join("out");

        let args = TailorArgs {
            content,
            profile: None,
            jobs: vec![
                first.to_string_lossy().to_string(),
                second.to_string_lossy().to_string(),
            ],
            output: None,
            output_dir: Some(out_dir.clone()),
            emit_yaml: None,
        };
        run(args, offline_backend().await).await.unwrap();

        assert!(out_dir.join("01-backend.tex").exists());
        assert!(out_dir.join("02-platform.tex").exists());
    }

    #[tokio::test]
    async fn test_batch_requires_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let content = write_file(dir.path(), "content.yaml", CONTENT);
        let args = TailorArgs {
            content,
            profile: None,
            jobs: vec!["a.txt".to_string(), "b.txt".to_string()],
            output: None,
            output_dir: None,
            emit_yaml: None,
        };
        let err = run(args, offline_backend().await).await.unwrap_err();
        assert!(err.to_string().contains("--output-dir"));
    }

    #[tokio::test]
    async fn test_batch_reports_failed_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let content = write_file(dir.path(), "content.yaml", CONTENT);
        let good = write_file(dir.path(), "good.txt", "Rust role");
        let missing = dir.path().join("missing.txt");
        let out_dir = dir.path().join("out");

        let args = TailorArgs {
            content,
            profile: None,
            jobs: vec![
                good.to_string_lossy().to_string(),
                missing.to_string_lossy().to_string(),
            ],
            output: None,
            output_dir: Some(out_dir.clone()),
            emit_yaml: None,
        };
        let err = run(args, offline_backend().await).await.unwrap_err();
        assert!(err.to_string().contains("1 of 2 jobs failed"));
        assert!(out_dir.join("01-good.tex").exists());
    }
}
