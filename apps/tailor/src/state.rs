use crate::config::Config;
use crate::tailoring::Tailor;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// One tailor serves every request; it holds no per-request state.
    pub tailor: Tailor,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            tailor: Tailor::from_config(config.backend_config()),
        }
    }
}
