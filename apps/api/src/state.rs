use std::sync::Arc;

use crate::analysis::session::SessionRegistry;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Live analysis sessions plus the extractor/analyzer they are built with.
    pub sessions: Arc<SessionRegistry>,
    /// Whether an analysis API key was present at startup.
    pub analysis_configured: bool,
}
