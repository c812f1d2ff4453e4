use std::sync::Arc;

use crate::config::Config;
use crate::merge::DocumentMerger;
use crate::resume::scratch::ScratchDir;
use crate::resume::templates::TemplateCatalog;

/// Shared application state injected into all route handlers via Axum extractors.
/// Immutable after startup; each request gets a cheap clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable merge backend. Local rendering by default; remote via MERGE_BACKEND.
    pub merger: Arc<dyn DocumentMerger>,
    pub templates: TemplateCatalog,
    pub scratch: ScratchDir,
}
