pub mod api;
pub mod classifier;
pub mod config;
pub mod error;
pub mod extractor;
pub mod llm;
pub mod summary;

use std::sync::Arc;
use extractor::PageFetcher;
use llm::SummaryModel;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub fetcher: PageFetcher,
    pub model: Arc<dyn SummaryModel>,
}
