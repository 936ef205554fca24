use std::sync::Arc;

use crate::capability::AiHost;
use crate::model::{
    Formality, Situation, TransformOptions, TransformRequest, TransformResponse,
};
use crate::transformer::ToneTransformer;

const SERVICE_MISSING: &str = "AI service not available";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub text: String,
    pub situation: Situation,
    pub formality: Formality,
    pub custom_context: String,
}

impl FormState {
    fn to_request(&self) -> TransformRequest {
        let custom = self.custom_context.trim();
        TransformRequest::new(
            self.text.clone(),
            TransformOptions {
                situation: self.situation,
                formality: self.formality,
                additional_context: (!custom.is_empty()).then(|| custom.to_string()),
            },
        )
    }
}

/// What the view shows. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState<'a> {
    /// The AI capability is missing; nothing else is rendered.
    Unsupported,
    Idle,
    Loading,
    Error(&'a str),
    Result(&'a TransformResponse),
}

/// Headless tone-transformer view. Owns the AI adapter for as long as it is
/// mounted.
pub struct ToneWorkbench {
    pub form: FormState,
    transformer: Option<ToneTransformer>,
    loading: bool,
    error: Option<String>,
    result: Option<TransformResponse>,
}

impl ToneWorkbench {
    /// Mounts the view and initializes the AI adapter against `host`.
    pub async fn mount(host: Arc<dyn AiHost>, temperature: Option<f32>) -> Self {
        let mut transformer = ToneTransformer::new(host);
        let available = transformer.initialize(temperature).await;
        let transformer = available.then_some(transformer);

        Self {
            form: FormState::default(),
            transformer,
            loading: false,
            error: None,
            result: None,
        }
    }

    pub fn is_ai_available(&self) -> bool {
        self.transformer.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn can_submit(&self) -> bool {
        !self.loading && self.is_ai_available() && !self.form.text.trim().is_empty()
    }

    /// Replaces the message with a dictated transcript.
    pub fn apply_transcript(&mut self, transcript: String) {
        self.form.text = transcript;
    }

    pub async fn submit(&mut self) {
        self.loading = true;
        self.error = None;

        let outcome = self.run_transform().await;
        match outcome {
            Ok(response) => self.result = Some(response),
            Err(message) => self.error = Some(message),
        }

        self.loading = false;
    }

    async fn run_transform(&self) -> Result<TransformResponse, String> {
        let Some(transformer) = self.transformer.as_ref() else {
            return Err(SERVICE_MISSING.to_string());
        };

        let request = self.form.to_request();
        request.validate().map_err(|e| e.to_string())?;

        transformer
            .transform_text(&request.text, &request.options)
            .await
            .map_err(|e| e.to_string())
    }

    pub fn render_state(&self) -> RenderState<'_> {
        if self.transformer.is_none() {
            return RenderState::Unsupported;
        }
        if self.loading {
            return RenderState::Loading;
        }
        if let Some(error) = self.error.as_deref() {
            return RenderState::Error(error);
        }
        match self.result.as_ref() {
            Some(result) => RenderState::Result(result),
            None => RenderState::Idle,
        }
    }

    pub fn result(&self) -> Option<&TransformResponse> {
        self.result.as_ref()
    }

    /// Releases the AI adapter. Dropping the workbench does the same.
    pub fn unmount(mut self) {
        if let Some(mut transformer) = self.transformer.take() {
            transformer.destroy();
        }
    }
}
