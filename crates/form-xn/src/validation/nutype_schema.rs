//! Adapter for records built from [`nutype`] newtypes.
//!
//! Each field of `T` is a nutype whose `Deserialize` impl runs its sanitizers
//! and validators, so decoding the flat record is the validation step. A
//! rejected value is filed under its field path. nutype's own messages name
//! the type rather than the field, so forms usually override them per field.
//!
//! ```ignore
//! use nutype::nutype;
//! use serde::Deserialize;
//!
//! #[nutype(sanitize(trim), validate(not_empty), derive(Debug, Deserialize))]
//! struct Title(String);
//!
//! #[derive(Deserialize)]
//! struct TodoInput {
//!     title: Title,
//! }
//!
//! let validator = form_xn::nutype_validator::<TodoInput>()
//!     .message("title", "Title is required");
//! ```

use super::{catch_engine_panic, decode_fields, FieldErrors, SafeValidator, ValidationResult};
use crate::query::QueryParams;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

/// Validates by decoding the record into a struct of nutype fields.
pub struct NutypeValidator<T> {
    messages: HashMap<String, String>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> NutypeValidator<T> {
    pub fn new() -> Self {
        Self {
            messages: HashMap::new(),
            _marker: PhantomData,
        }
    }

    /// Report `message` instead of the engine's text when `field` is rejected.
    pub fn message(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.messages.insert(field.into(), message.into());
        self
    }

    fn relabel(&self, errors: FieldErrors) -> FieldErrors {
        if self.messages.is_empty() {
            return errors;
        }
        let mut relabeled = FieldErrors::new();
        for (field, messages) in errors.iter() {
            match self.messages.get(field) {
                Some(message) => relabeled.add(field, message.clone()),
                None => {
                    for message in messages {
                        relabeled.add(field, message.clone());
                    }
                }
            }
        }
        relabeled
    }
}

impl<T> Default for NutypeValidator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for NutypeValidator<T> {
    fn clone(&self) -> Self {
        Self {
            messages: self.messages.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for NutypeValidator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NutypeValidator")
            .field("schema", &std::any::type_name::<T>())
            .field("messages", &self.messages)
            .finish()
    }
}

impl<T> SafeValidator<T> for NutypeValidator<T>
where
    T: DeserializeOwned,
{
    fn safe_parse(&self, input: &QueryParams) -> ValidationResult<T> {
        catch_engine_panic(|| decode_fields::<T>(input).map_err(|e| self.relabel(e)).into())
    }
}

/// Shorthand for [`NutypeValidator::new`].
pub fn nutype_validator<T>() -> NutypeValidator<T> {
    NutypeValidator::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::FORM_ERROR_KEY;
    use nutype::nutype;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    #[nutype(
        sanitize(trim),
        validate(not_empty, len_char_max = 20),
        derive(Debug, Clone, PartialEq, Deserialize)
    )]
    struct Title(String);

    #[nutype(
        validate(greater_or_equal = 1, less_or_equal = 5),
        derive(Debug, Clone, Copy, PartialEq, Deserialize)
    )]
    struct Priority(u8);

    fn panicking_check(_value: &str) -> bool {
        panic!("lookup table missing")
    }

    #[nutype(validate(predicate = panicking_check), derive(Debug, Deserialize))]
    struct Fragile(String);

    #[derive(Debug, Deserialize)]
    struct TodoInput {
        title: Title,
        priority: Priority,
    }

    #[derive(Debug, Deserialize)]
    struct FragileInput {
        #[allow(dead_code)]
        code: Fragile,
    }

    fn todo(title: &str, priority: &str) -> QueryParams {
        QueryParams::new().with("title", title).with("priority", priority)
    }

    #[test]
    fn test_nutype_success_sanitizes() {
        let data = nutype_validator::<TodoInput>()
            .safe_parse(&todo("  Buy milk ", "2"))
            .into_result()
            .unwrap();
        assert_eq!(data.title.into_inner(), "Buy milk");
        assert_eq!(data.priority.into_inner(), 2);
    }

    #[test]
    fn test_nutype_rejection_filed_under_field() {
        let errors = nutype_validator::<TodoInput>()
            .safe_parse(&todo("   ", "2"))
            .into_result()
            .unwrap_err();
        assert!(errors.has("title"));
        assert!(!errors.has(FORM_ERROR_KEY));
    }

    #[test]
    fn test_nutype_message_override() {
        let validator = nutype_validator::<TodoInput>()
            .message("title", "Title is required")
            .message("priority", "Pick a priority from 1 to 5");

        let errors = validator.safe_parse(&todo("", "1")).into_result().unwrap_err();
        assert_eq!(errors.get("title"), Some(&["Title is required".to_string()][..]));

        let errors = validator.safe_parse(&todo("x", "9")).into_result().unwrap_err();
        assert_eq!(errors.first("priority"), Some("Pick a priority from 1 to 5"));
    }

    #[test]
    fn test_nutype_uncoercible_value() {
        let errors = nutype_validator::<TodoInput>()
            .safe_parse(&todo("x", "high"))
            .into_result()
            .unwrap_err();
        assert!(errors.has("priority"));
    }

    #[test]
    fn test_nutype_missing_field() {
        let input = QueryParams::new().with("priority", "1");
        let errors = nutype_validator::<TodoInput>()
            .safe_parse(&input)
            .into_result()
            .unwrap_err();
        assert_eq!(errors.first("title"), Some("Title is required"));
    }

    #[test]
    fn test_nutype_panicking_predicate_is_caught() {
        let input = QueryParams::new().with("code", "x");
        let errors = nutype_validator::<FragileInput>()
            .safe_parse(&input)
            .into_result()
            .unwrap_err();
        assert!(errors.has(FORM_ERROR_KEY));
    }
}
