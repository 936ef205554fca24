use thiserror::Error;

/// Failures raised by a host AI capability (rewriter, language model or the
/// host itself).
#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("AI capability unavailable: {0}")]
    Unavailable(String),

    #[error("failed to reach AI host: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("AI host returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("AI host returned no content")]
    EmptyCompletion,

    #[error("AI host reported invalid capabilities: {0}")]
    InvalidCapabilities(String),
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("AI service not initialized")]
    NotInitialized,

    #[error("Please enter some text to transform")]
    EmptyInput,

    #[error(transparent)]
    Capability(#[from] CapabilityError),
}

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Speech recognition not supported in this browser")]
    Unsupported,

    #[error("{0}")]
    Start(String),
}
