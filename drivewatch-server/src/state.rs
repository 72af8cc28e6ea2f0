use std::sync::Arc;

use drivewatch_core::Engine;

use crate::config::Config;

/// Shared handles threaded through every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(engine: Arc<Engine>, config: Arc<Config>) -> Self {
        Self { engine, config }
    }
}
