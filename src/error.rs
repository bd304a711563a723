use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Message shown when the model artifact cannot be fetched or decoded
pub const MODEL_LOAD_MESSAGE: &str = "Failed to load the model. Please contact support.";

/// Message shown when the loaded model has no probability output
pub const CAPABILITY_MESSAGE: &str = "This model does not support probability prediction.";

/// Message shown when the predictor call fails
pub const INFERENCE_MESSAGE: &str = "An error occurred during prediction. Please try again later.";

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Model fetch or deserialization failed
    #[error("Model load error: {0}")]
    ModelLoad(String),

    /// Loaded predictor lacks probability prediction
    #[error("Capability error: {0}")]
    Capability(String),

    /// Predictor call failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ModelLoad(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Capability(_) => StatusCode::NOT_IMPLEMENTED,
            AppError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &str {
        match self {
            AppError::ModelLoad(_) => "MODEL_LOAD_ERROR",
            AppError::Capability(_) => "CAPABILITY_ERROR",
            AppError::Inference(_) => "INFERENCE_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to the person using the form.
    ///
    /// Model and inference failures collapse to fixed generic text; the
    /// detail stays in the logs. Validation errors are the user's own input
    /// and are echoed back.
    pub fn user_message(&self) -> String {
        match self {
            AppError::ModelLoad(_) => MODEL_LOAD_MESSAGE.to_string(),
            AppError::Capability(_) => CAPABILITY_MESSAGE.to_string(),
            AppError::Inference(_) => INFERENCE_MESSAGE.to_string(),
            AppError::Validation(_) => self.to_string(),
            _ => "Internal server error".to_string(),
        }
    }
}

/// Convert AppError to HTTP response
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        tracing::error!(
            error_code = error_code,
            status_code = status.as_u16(),
            detail = %self,
            "Request error"
        );

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.user_message(),
                "status": status.as_u16(),
            }
        }));

        (status, body).into_response()
    }
}

/// Conversion from serde_json::Error
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Conversion from validator::ValidationErrors
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Conversion from config::ConfigError
impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;
