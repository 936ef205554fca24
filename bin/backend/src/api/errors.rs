use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tonelift_core::{CapabilityError, TransformError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Validation(#[from] validator::ValidationErrors),

    #[error(transparent)]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Transform(#[from] TransformError),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::InvalidInput(_) | Error::Validation(_) | Error::Multipart(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::Transform(TransformError::EmptyInput) => StatusCode::BAD_REQUEST,
            Error::Transform(TransformError::NotInitialized)
            | Error::Transform(TransformError::Capability(CapabilityError::Unavailable(_))) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Error::Transform(TransformError::Capability(_)) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            Error::Transform(TransformError::EmptyInput).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::Transform(TransformError::NotInitialized).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            Error::Transform(TransformError::Capability(CapabilityError::EmptyCompletion))
                .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            Error::InvalidInput("Invalid context format".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
