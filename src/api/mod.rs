pub mod extract;
pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::ml::InferenceService;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub inference: Arc<InferenceService>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(inference: Arc<InferenceService>) -> Self {
        Self {
            inference,
            started_at: Instant::now(),
        }
    }
}
