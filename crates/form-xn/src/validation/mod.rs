// File: src/validation/mod.rs
// Purpose: Validator adapter contract and the normalized validation result

use crate::query::QueryParams;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap};

#[cfg(feature = "garde")]
pub mod garde_schema;
#[cfg(feature = "nutype")]
pub mod nutype_schema;

#[cfg(feature = "garde")]
pub use garde_schema::{garde_validator, GardeValidator};
#[cfg(feature = "nutype")]
pub use nutype_schema::{nutype_validator, NutypeValidator};

/// Key under which errors that are not scoped to a field are filed.
pub const FORM_ERROR_KEY: &str = "_form";

/// Field path to every message reported for it.
///
/// Nested paths are dot-joined. Messages keep the order the engine reported
/// them in; nothing is truncated at this layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single error, convenient for hand-written validators.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Record a message. An empty field path files it under [`FORM_ERROR_KEY`].
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        let field = if field.is_empty() {
            FORM_ERROR_KEY.to_string()
        } else {
            field
        };
        self.errors.entry(field).or_default().push(message.into());
    }

    /// Builder form of [`FieldErrors::add`].
    pub fn with(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.add(field, message);
        self
    }

    /// Every message for a field
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    /// First message for a field
    pub fn first(&self, field: &str) -> Option<&str> {
        self.errors
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    /// Errors not attached to any field
    pub fn form_errors(&self) -> &[String] {
        self.get(FORM_ERROR_KEY).unwrap_or_default()
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of fields with at least one error
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.errors
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    /// One display message per field, first message wins.
    pub fn first_messages(&self) -> BTreeMap<String, String> {
        self.errors
            .iter()
            .filter_map(|(field, messages)| {
                messages.first().map(|message| (field.clone(), message.clone()))
            })
            .collect()
    }

    /// JSON shape of the error map for the given display mode.
    pub fn to_json(&self, display: ErrorDisplay) -> JsonValue {
        match display {
            ErrorDisplay::First => serde_json::json!(self.first_messages()),
            ErrorDisplay::All => serde_json::json!(self.errors),
        }
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.errors
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut errors = Self::new();
        for (field, message) in iter {
            errors.add(field, message);
        }
        errors
    }
}

impl From<HashMap<String, Vec<String>>> for FieldErrors {
    fn from(map: HashMap<String, Vec<String>>) -> Self {
        let mut errors = Self::new();
        for (field, messages) in map {
            for message in messages {
                errors.add(field.clone(), message);
            }
        }
        errors
    }
}

/// How many messages per field a rendered error map carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorDisplay {
    /// `{"title": "Title is required"}`
    #[default]
    First,
    /// `{"title": ["Title is required", "..."]}`
    All,
}

/// Outcome of running a validator: typed data or a field error map.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult<T> {
    Success(T),
    Failure(FieldErrors),
}

impl<T> ValidationResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ValidationResult::Success(_))
    }

    /// Errors of a failed result
    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            ValidationResult::Success(_) => None,
            ValidationResult::Failure(errors) => Some(errors),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ValidationResult<U> {
        match self {
            ValidationResult::Success(data) => ValidationResult::Success(f(data)),
            ValidationResult::Failure(errors) => ValidationResult::Failure(errors),
        }
    }

    pub fn into_result(self) -> Result<T, FieldErrors> {
        match self {
            ValidationResult::Success(data) => Ok(data),
            ValidationResult::Failure(errors) => Err(errors),
        }
    }
}

impl<T> From<Result<T, FieldErrors>> for ValidationResult<T> {
    fn from(result: Result<T, FieldErrors>) -> Self {
        match result {
            Ok(data) => ValidationResult::Success(data),
            Err(errors) => ValidationResult::Failure(errors),
        }
    }
}

/// The one method the dispatcher and the client form depend on.
///
/// Implementations never panic on bad input: every failure, including the
/// wrapped engine's own decode errors, comes back as
/// [`ValidationResult::Failure`].
///
/// Plain closures are validators too:
///
/// ```
/// use form_xn::{FieldErrors, QueryParams, SafeValidator, ValidationResult};
///
/// let title_required = |input: &QueryParams| match input.get("title") {
///     Some(title) if !title.is_empty() => ValidationResult::Success(title.to_string()),
///     _ => ValidationResult::Failure(FieldErrors::single("title", "Title is required")),
/// };
///
/// let input = QueryParams::new().with("title", "");
/// assert!(!title_required.safe_parse(&input).is_success());
/// ```
pub trait SafeValidator<T>: Send + Sync {
    fn safe_parse(&self, input: &QueryParams) -> ValidationResult<T>;
}

impl<T, F> SafeValidator<T> for F
where
    F: Fn(&QueryParams) -> ValidationResult<T> + Send + Sync,
{
    fn safe_parse(&self, input: &QueryParams) -> ValidationResult<T> {
        self(input)
    }
}

/// Decode the flat string record into `T`.
///
/// Strings are coerced to numbers and booleans where `T` asks for them. A
/// value that fails to decode is filed under its field path, a missing field
/// under its own name, anything else under [`FORM_ERROR_KEY`]. Decoding stops
/// at the first rejected field.
pub fn decode_fields<T: DeserializeOwned>(input: &QueryParams) -> Result<T, FieldErrors> {
    let encoded = input.to_query_string();
    let deserializer =
        serde_urlencoded::Deserializer::new(form_urlencoded::parse(encoded.as_bytes()));

    serde_path_to_error::deserialize(deserializer).map_err(|e| {
        let path = e.path().to_string();
        let message = e.inner().to_string();
        match missing_field(&message) {
            Some(field) => FieldErrors::single(field, required_message(field)),
            None if path == "." => FieldErrors::single(FORM_ERROR_KEY, message),
            None => FieldErrors::single(path, message),
        }
    })
}

fn missing_field(message: &str) -> Option<&str> {
    message
        .strip_prefix("missing field `")
        .and_then(|rest| rest.strip_suffix('`'))
}

/// `title` → `Title is required`
fn required_message(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => format!("{}{} is required", first.to_uppercase(), chars.as_str()),
        None => "Field is required".to_string(),
    }
}

/// Run an engine call, turning a panic inside it into a form-level failure.
pub(crate) fn catch_engine_panic<T>(
    engine: impl FnOnce() -> ValidationResult<T>,
) -> ValidationResult<T> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(engine)).unwrap_or_else(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        tracing::error!(%reason, "validator panicked");
        ValidationResult::Failure(FieldErrors::single(
            FORM_ERROR_KEY,
            format!("Validation failed: {}", reason),
        ))
    })
}
