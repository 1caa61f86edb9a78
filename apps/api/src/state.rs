use std::sync::Arc;

use crate::llm_client::ModelRouter;
use crate::render::PageConfig;
use crate::scoring::TfIdfScorer;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Walks the configured Gemini candidates in order.
    pub router: ModelRouter,
    /// Built once at startup; scoring never recompiles the tokenizer.
    pub scorer: Arc<TfIdfScorer>,
    pub sessions: SessionStore,
    /// Letter page, 40pt margins.
    pub page_config: PageConfig,
}
