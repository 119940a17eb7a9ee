//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use studylens_core::extract::FileProcessor;
use studylens_core::ports::{QuestionAnsweringService, StorageService, SummarizationService};
use studylens_core::youtube::YoutubeResolver;

/// The shared application state, created once at startup and passed to all
/// handlers. Every collaborator is injected here; nothing is a global.
pub struct AppState {
    pub config: Arc<Config>,
    pub storage: Arc<dyn StorageService>,
    pub summarizer: Arc<dyn SummarizationService>,
    pub answerer: Arc<dyn QuestionAnsweringService>,
    pub extractor: FileProcessor,
    pub resolver: YoutubeResolver,
}
