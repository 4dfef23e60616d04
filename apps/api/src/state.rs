use std::sync::Arc;

use crate::cache::ProfileCache;
use crate::llm_client::retry::RetryPolicy;
use crate::llm_client::ModelInvoker;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Gemini client in production; swapped for stubs in tests.
    pub llm: Arc<dyn ModelInvoker>,
    /// Pluggable profile cache. Redis when REDIS_URL is set, in-memory otherwise.
    pub cache: Arc<dyn ProfileCache>,
    pub retry: RetryPolicy,
}
