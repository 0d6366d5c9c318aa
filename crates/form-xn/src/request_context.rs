// File: src/request_context.rs
// Purpose: What an action handler receives once its intent has been resolved

use crate::query::{FormData, QueryParams};
use crate::response::ValidationErrors;
use crate::validation::{ErrorDisplay, FieldErrors};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};

/// Arguments for a handler registered without a validator.
///
/// `request` is the original request head; its body has already been read
/// into `form`.
#[derive(Debug)]
pub struct ActionArgs {
    /// Resolved intent name
    pub intent: String,
    /// Original request head (method, URI, headers, extensions)
    pub request: Parts,
    /// Every submitted entry, intent included
    pub form: FormData,
    /// Submitted fields other than the intent, last write wins
    pub query: QueryParams,
}

impl ActionArgs {
    pub fn header(&self, name: &str) -> Option<&str> {
        header_str(&self.request.headers, name)
    }

    /// Check if the client asked for a JSON response
    pub fn accepts_json(&self) -> bool {
        accepts_json(&self.request.headers)
    }
}

/// Context for a handler registered with a validator.
///
/// Only ever built from data that passed validation.
#[derive(Debug)]
pub struct ValidatedContext<T> {
    /// Typed output of the validator
    pub data: T,
    pub intent: String,
    pub request: Parts,
    pub form: FormData,
    pub query: QueryParams,
}

impl<T> ValidatedContext<T> {
    pub fn header(&self, name: &str) -> Option<&str> {
        header_str(&self.request.headers, name)
    }

    /// Check if the client asked for a JSON response
    pub fn accepts_json(&self) -> bool {
        accepts_json(&self.request.headers)
    }
}

/// A submission its validator rejected, as seen by an
/// [`on_invalid`](crate::ActionsBuilder::on_invalid) hook.
#[derive(Debug)]
pub struct InvalidSubmission {
    pub intent: String,
    pub request: Parts,
    pub form: FormData,
    pub query: QueryParams,
    /// Every message the validator reported
    pub errors: FieldErrors,
    pub(crate) display: ErrorDisplay,
}

impl InvalidSubmission {
    pub fn header(&self, name: &str) -> Option<&str> {
        header_str(&self.request.headers, name)
    }

    /// Check if the client asked for a JSON response
    pub fn accepts_json(&self) -> bool {
        accepts_json(&self.request.headers)
    }

    /// The JSON error payload the dispatcher sends when no hook is set
    pub fn into_validation_errors(self) -> ValidationErrors {
        ValidationErrors::new(self.errors).display(self.display)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name)?.to_str().ok()
}

/// True when the `Accept` header mentions JSON.
pub fn accepts_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|accept| accept.to_str().ok())
        .map(|accept| accept.contains("application/json"))
        .unwrap_or(false)
}
