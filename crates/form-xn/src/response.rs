// File: src/response.rs
// Purpose: Response for submissions that failed validation

use crate::validation::{ErrorDisplay, FieldErrors};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

/// `200 OK` with `{"errors": {...}}`.
///
/// Told apart from success by payload shape only, so the page can render the
/// messages inline instead of hitting an error boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors {
    errors: FieldErrors,
    display: ErrorDisplay,
}

impl ValidationErrors {
    pub fn new(errors: FieldErrors) -> Self {
        Self {
            errors,
            display: ErrorDisplay::default(),
        }
    }

    pub fn display(mut self, display: ErrorDisplay) -> Self {
        self.display = display;
        self
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// JSON body as sent to the client
    pub fn body(&self) -> serde_json::Value {
        serde_json::json!({ "errors": self.errors.to_json(self.display) })
    }
}

impl IntoResponse for ValidationErrors {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_body_first_message() {
        let errors = FieldErrors::new()
            .with("title", "Title is required")
            .with("title", "Too short");
        assert_eq!(
            ValidationErrors::new(errors).body(),
            serde_json::json!({ "errors": { "title": "Title is required" } })
        );
    }

    #[test]
    fn test_body_all_messages() {
        let errors = FieldErrors::single("title", "Title is required");
        assert_eq!(
            ValidationErrors::new(errors).display(ErrorDisplay::All).body(),
            serde_json::json!({ "errors": { "title": ["Title is required"] } })
        );
    }

    #[test]
    fn test_status_is_ok() {
        let response = ValidationErrors::new(FieldErrors::single("x", "bad")).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );
    }
}
