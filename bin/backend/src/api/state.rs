use std::sync::Arc;

use axum::extract::FromRef;
use tonelift_core::ToneTransformer;
use tonelift_core::speech::RecognitionConfig;

#[derive(Clone, FromRef)]
pub struct AppState {
    /// Released when the last clone of the state is dropped.
    pub transformer: Arc<ToneTransformer>,
    pub recognition: RecognitionConfig,
}

impl AppState {
    pub fn new(transformer: ToneTransformer) -> Self {
        Self {
            transformer: Arc::new(transformer),
            recognition: RecognitionConfig::default(),
        }
    }
}
