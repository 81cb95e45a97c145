//! Resume Tailor: rewrites resume content for a job description with a local or
//! remote LLM, and refuses any output that introduces employers, job titles or
//! projects absent from the trusted input.
//!
//! Commands:
//! - `tailor`  Tailor content to one or more job descriptions and render LaTeX
//! - `render`  Render content to LaTeX without a model
//! - `serve`   Start the HTTP API

mod commands;
mod config;
mod errors;
mod llm_client;
mod loader;
mod models;
mod render;
mod routes;
mod state;
mod tailoring;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::commands::tailor::TailorArgs;
use crate::config::Config;
use crate::llm_client::BackendKind;

#[derive(Parser)]
#[command(
    name = "resume-tailor",
    about = "Tailor resume content to a job description without fabricating facts",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// LLM backend: local (Ollama) or remote (OpenAI-compatible). Overrides RESUME_LLM_BACKEND
    #[arg(long, global = true)]
    backend: Option<BackendKind>,

    /// Model name; defaults per backend. Overrides RESUME_LLM_MODEL
    #[arg(long, global = true)]
    model: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Tailor content to job descriptions and render LaTeX
    Tailor(TailorArgs),

    /// Render content to LaTeX without calling a model
    Render {
        /// Resume content (YAML)
        #[arg(short, long)]
        content: PathBuf,

        /// Output .tex file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start the HTTP API server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first so RUST_LOG from .env applies to logging
    let config = Config::from_env()?;
    let cli = Cli::parse();
    let config = config.with_overrides(cli.backend, cli.model.clone());

    // Initialize structured logging on stderr; stdout may carry LaTeX
    let level = if cli.verbose { "debug" } else { config.rust_log.as_str() };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting Resume Tailor v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Tailor(args) => commands::tailor::run(args, config.backend_config()).await?,
        Commands::Render { content, output } => commands::render::run(&content, output).await?,
        Commands::Serve { port } => commands::serve::run(config, port).await?,
    }

    Ok(())
}
