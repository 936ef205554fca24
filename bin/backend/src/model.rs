use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tonelift_core::speech::{RecognitionConfig, RecognitionEvent};
use tonelift_core::{Formality, Importance, Situation, TransformOptions};
use validator::{Validate, ValidationError};

pub const MAX_TEXT_CHARS: u64 = 10_000;
pub const MAX_CONTEXT_CHARS: u64 = 2_000;

fn not_blank(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::new("blank")
            .with_message("Please enter some text to transform".into()));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TransformBody {
    #[validate(length(max = MAX_TEXT_CHARS), custom(function = "not_blank"))]
    pub text: String,
    #[serde(default)]
    pub situation: Situation,
    #[serde(default)]
    pub formality: Formality,
    #[serde(default)]
    #[validate(length(max = MAX_CONTEXT_CHARS))]
    pub additional_context: Option<String>,
}

impl TransformBody {
    pub fn options(&self) -> TransformOptions {
        TransformOptions {
            situation: self.situation,
            formality: self.formality,
            additional_context: self.additional_context.clone(),
        }
    }
}

/// Fields of the legacy multipart endpoint, checked against the same limits
/// as [`TransformBody`].
#[derive(Debug, Validate)]
pub struct LegacyForm {
    #[validate(length(max = MAX_TEXT_CHARS), custom(function = "not_blank"))]
    pub text: String,
    #[validate(nested)]
    pub context: LegacyContext,
}

/// JSON carried in the `context` field of the legacy multipart endpoint.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LegacyContext {
    #[serde(default)]
    pub situation: Option<Situation>,
    #[serde(default)]
    pub formality: Option<Formality>,
    #[serde(default)]
    pub importance: Option<Importance>,
    #[serde(default, alias = "additional_context")]
    #[validate(length(max = MAX_CONTEXT_CHARS))]
    pub additional_context: Option<String>,
}

impl From<LegacyContext> for TransformOptions {
    fn from(ctx: LegacyContext) -> Self {
        let formality = ctx
            .formality
            .or(ctx.importance.map(Formality::from))
            .unwrap_or_default();
        TransformOptions {
            situation: ctx.situation.unwrap_or_default(),
            formality,
            additional_context: ctx.additional_context.filter(|s| !s.trim().is_empty()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RootStatus {
    pub status: &'static str,
    pub ai_ready: bool,
    pub endpoints: BTreeMap<&'static str, &'static str>,
}

#[derive(Debug, Serialize)]
pub struct SituationInfo {
    pub id: Situation,
    pub label: &'static str,
    pub template: &'static str,
}

impl From<Situation> for SituationInfo {
    fn from(situation: Situation) -> Self {
        Self {
            id: situation,
            label: situation.label(),
            template: situation.template(),
        }
    }
}

/// Messages a browser sends over the speech websocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpeechClientMessage {
    /// User pressed the record button.
    Start,
    /// User pressed stop.
    Stop,
    /// Recognizer callbacks, forwarded verbatim.
    RecognizerStart,
    Result(RecognitionEvent),
    Error { error: String },
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpeechServerMessage {
    /// Tells the browser to drive its recognizer.
    Command {
        action: RecognizerAction,
        #[serde(skip_serializing_if = "Option::is_none")]
        config: Option<RecognitionConfig>,
    },
    Listening { value: bool },
    Interim { text: String },
    Transcript { text: String },
    Error { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecognizerAction {
    Start,
    Stop,
}
