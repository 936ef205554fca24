//! Dictation: drives a host speech recognizer and turns its finalized results
//! into a single transcript.
//!
//! Interim results are kept for local display only. The caller receives text
//! exactly once, from [`SpeechCapture::stop`], after the user ends recording.

use serde::{Deserialize, Serialize};

use crate::errors::SpeechError;

pub const DEFAULT_LOCALE: &str = "en-US";
const LISTENING_PLACEHOLDER: &str = "Listening...";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionConfig {
    pub continuous: bool,
    pub interim_results: bool,
    pub lang: String,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            continuous: true,
            interim_results: true,
            lang: DEFAULT_LOCALE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionResult {
    pub transcript: String,
    #[serde(default)]
    pub is_final: bool,
}

/// One result event from the recognizer. Only `results[result_index]` is
/// new in this event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionEvent {
    pub result_index: usize,
    pub results: Vec<RecognitionResult>,
}

pub trait SpeechRecognizer: Send {
    fn start(&mut self, config: &RecognitionConfig) -> Result<(), SpeechError>;

    fn stop(&mut self);
}

pub struct SpeechCapture<R> {
    recognizer: Option<R>,
    config: RecognitionConfig,
    listening: bool,
    transcript: String,
    interim: String,
    error: Option<String>,
}

impl<R: SpeechRecognizer> SpeechCapture<R> {
    pub fn new(recognizer: Option<R>) -> Self {
        Self::with_config(recognizer, RecognitionConfig::default())
    }

    pub fn with_config(recognizer: Option<R>, config: RecognitionConfig) -> Self {
        let error = recognizer
            .is_none()
            .then(|| SpeechError::Unsupported.to_string());
        Self {
            recognizer,
            config,
            listening: false,
            transcript: String::new(),
            interim: String::new(),
            error,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.recognizer.is_some()
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn config(&self) -> &RecognitionConfig {
        &self.config
    }

    /// Text to show while recording.
    pub fn display_text(&self) -> &str {
        if !self.transcript.is_empty() {
            self.transcript.trim()
        } else if !self.interim.is_empty() {
            &self.interim
        } else {
            LISTENING_PLACEHOLDER
        }
    }

    /// Asks the recognizer to start. Returns `false` when it could not be
    /// started; the reason is then available from [`SpeechCapture::error`].
    pub fn start(&mut self) -> bool {
        let Some(recognizer) = self.recognizer.as_mut() else {
            self.error = Some("Speech recognition not initialized".to_string());
            return false;
        };
        match recognizer.start(&self.config) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "speech recognition failed to start");
                self.error = Some(format!("Error starting recognition: {e}"));
                false
            }
        }
    }

    /// Stops recording and hands back the trimmed transcript, if any.
    pub fn stop(&mut self) -> Option<String> {
        if let Some(recognizer) = self.recognizer.as_mut() {
            recognizer.stop();
        }
        self.listening = false;
        self.interim.clear();

        let transcript = std::mem::take(&mut self.transcript);
        let transcript = transcript.trim();
        (!transcript.is_empty()).then(|| transcript.to_string())
    }

    /// Starts when idle, stops (and emits) when listening.
    pub fn toggle(&mut self) -> Option<String> {
        if self.listening {
            self.stop()
        } else {
            self.start();
            None
        }
    }

    pub fn on_start(&mut self) {
        self.listening = true;
        self.error = None;
    }

    pub fn on_end(&mut self) {
        self.listening = false;
    }

    pub fn on_error(&mut self, code: &str) {
        tracing::warn!(code, "speech recognition error");
        self.error = Some(format!("Error occurred in recognition: {code}"));
        self.listening = false;
    }

    pub fn on_result(&mut self, event: &RecognitionEvent) {
        let Some(result) = event.results.get(event.result_index) else {
            tracing::debug!(index = event.result_index, "result index out of range");
            return;
        };

        if result.is_final {
            self.transcript.push(' ');
            self.transcript.push_str(&result.transcript);
            self.interim.clear();
        } else {
            self.interim = result.transcript.clone();
        }
    }
}
