use std::sync::Arc;

use crate::assistant::Assistant;
use crate::config::Config;
use crate::matching::MatchEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Conversational assistant; owns the in-memory session store, so it
    /// must be constructed exactly once.
    pub assistant: Arc<Assistant>,
    /// Resume/job match scorer with bounded batch concurrency.
    pub matcher: MatchEngine,
    /// Kept for handlers that need runtime settings; nothing reads it yet.
    #[allow(dead_code)]
    pub config: Config,
}
