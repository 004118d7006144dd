use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bridge_core::{AuthError, HttpError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SttError>;

/// Transcription pipeline errors with appropriate HTTP status codes
#[derive(Debug, Error)]
pub enum SttError {
    /// Missing or invalid form fields
    #[error("{0}")]
    InvalidRequest(String),

    /// Uploaded file exceeds the configured maximum
    #[error("File too large. Maximum size is {max_size} bytes")]
    FileTooLarge { max_size: u64 },

    /// Resolved media type is not on the allow-list
    #[error("Unsupported file type. Allowed types: {}", allowed.join(", "))]
    UnsupportedFileType { allowed: Vec<String> },

    /// Missing or malformed Authorization header
    #[error(transparent)]
    Unauthorized(#[from] AuthError),

    /// Policy or transcription endpoint failed or could not be reached
    #[error("External service error: {service}: {}", upstream_detail(*status, message))]
    ExternalService {
        service: &'static str,
        /// `None` when the request never got a response
        status: Option<u16>,
        message: String,
    },

    /// Object-store upload failed
    #[error("File upload failed: {0}")]
    Upload(String),

    /// Contract violation or unexpected internal state
    ///
    /// The detail is logged, never shown to callers.
    #[error("Internal server error: {0}")]
    Internal(String),
}

fn upstream_detail(status: Option<u16>, message: &str) -> String {
    match status {
        Some(status) => format!("Status: {status}, Body: {message}"),
        None => message.to_owned(),
    }
}

impl SttError {
    pub(crate) fn external(service: &'static str, status: u16, body: String) -> Self {
        Self::ExternalService {
            service,
            status: Some(status),
            message: body,
        }
    }

    pub(crate) fn unreachable(service: &'static str, err: &reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("request timed out: {err}")
        } else {
            err.to_string()
        };

        Self::ExternalService {
            service,
            status: None,
            message,
        }
    }
}

impl HttpError for SttError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::FileTooLarge { .. } | Self::UnsupportedFileType { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::ExternalService { .. } => StatusCode::BAD_GATEWAY,
            Self::Upload(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::InvalidRequest(_) | Self::FileTooLarge { .. } | Self::UnsupportedFileType { .. } => {
                "invalid_request_error"
            }
            Self::Unauthorized(_) => "authentication_error",
            Self::ExternalService { .. } => "api_error",
            Self::Upload(_) => "upload_error",
            Self::Internal(_) => "internal_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for SttError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.error_body())).into_response()
    }
}
