use crate::recorder::RecordingManager;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<RecordingManager>,
}

impl AppState {
    pub fn new(manager: Arc<RecordingManager>) -> Self {
        Self { manager }
    }
}
