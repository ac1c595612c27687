//! Shared application state.

use std::sync::Arc;

use voxpipe_pipeline::Pipeline;

/// State handed to every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}
