// File: src/todo.rs
// Purpose: Todo input schema shared by the server actions and the browser

use crate::registry::ClientForms;
use form_xn::{garde_validator, ActionForm};
use garde::Validate;
use serde::Deserialize;

/// Submitted fields for adding or renaming a todo
#[derive(Debug, Deserialize, Validate)]
pub struct TodoInput {
    #[garde(custom(title_present), length(chars, max = 200))]
    pub title: String,
}

fn title_present(value: &str, _ctx: &()) -> garde::Result {
    if value.trim().is_empty() {
        return Err(garde::Error::new("Title is required"));
    }
    Ok(())
}

/// Forms the todo page validates before submitting
pub fn client_forms() -> ClientForms {
    ClientForms::new()
        .form(ActionForm::new("addTodo").validator(garde_validator::<TodoInput>()))
        .form(ActionForm::new("updateTodo").validator(garde_validator::<TodoInput>()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use form_xn::{QueryParams, SafeValidator};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blank_title_is_rejected() {
        let errors = garde_validator::<TodoInput>()
            .safe_parse(&QueryParams::new().with("title", "  "))
            .into_result()
            .unwrap_err();
        assert_eq!(errors.first("title"), Some("Title is required"));
    }

    #[test]
    fn test_long_title_is_rejected() {
        let errors = garde_validator::<TodoInput>()
            .safe_parse(&QueryParams::new().with("title", "x".repeat(201)))
            .into_result()
            .unwrap_err();
        assert!(errors.has("title"));
    }

    #[test]
    fn test_missing_title_is_required() {
        let errors = garde_validator::<TodoInput>()
            .safe_parse(&QueryParams::new())
            .into_result()
            .unwrap_err();
        assert_eq!(errors.first("title"), Some("Title is required"));
    }
}
