use crate::config::Config;
use crate::extraction::service::ExtractionService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Local pipeline plus the rate-limited remote fallback.
    pub extraction: ExtractionService,
}
