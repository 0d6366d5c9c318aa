// File: src/error.rs
// Purpose: Rejections raised before any action handler runs

#[cfg(feature = "server")]
use axum::http::StatusCode;
#[cfg(feature = "server")]
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Why a submission (or a registry) was rejected.
///
/// Validation failures are not errors: they come back as a normal response
/// carrying the field error map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("Missing _action field")]
    MissingIntent,

    #[error("Unknown action: {0}")]
    UnknownIntent(String),

    #[error("Unsupported form encoding: {0}")]
    UnsupportedMediaType(String),

    #[error("Invalid form body: {0}")]
    InvalidBody(String),

    #[error("Duplicate action: {0}")]
    DuplicateIntent(String),
}

#[cfg(feature = "server")]
impl ActionError {
    pub fn status(&self) -> StatusCode {
        match self {
            ActionError::MissingIntent
            | ActionError::UnknownIntent(_)
            | ActionError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ActionError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ActionError::DuplicateIntent(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(feature = "server")]
impl IntoResponse for ActionError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
