//! `resume-tailor serve`: start the HTTP API.

use std::net::SocketAddr;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

pub async fn run(config: Config, port_override: Option<u16>) -> Result<()> {
    let port = port_override.unwrap_or(config.port);
    let state = AppState::new(&config);
    info!(
        backend = %config.backend,
        model = %config.model_name(),
        "LLM backend configured"
    );

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
