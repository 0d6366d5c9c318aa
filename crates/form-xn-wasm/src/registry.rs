// File: src/registry.rs
// Purpose: Intent to client-side form lookup used by the submit listener

use form_xn::{ActionForm, FieldValue, FormState, SubmitDecision, INTENT_FIELD};
use std::collections::HashMap;

/// Validated forms the page can contain, keyed by intent.
#[derive(Debug, Default, Clone)]
pub struct ClientForms {
    forms: HashMap<String, ActionForm>,
}

impl ClientForms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a form under its intent. A later form for the same intent wins.
    pub fn form(mut self, form: ActionForm) -> Self {
        self.forms.insert(form.action().intent().to_string(), form);
        self
    }

    pub fn get(&self, intent: &str) -> Option<&ActionForm> {
        self.forms.get(intent)
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    /// Run the submit check for the form with `intent`.
    ///
    /// The `_action` entry is dropped so the validator sees the same record
    /// the server does. Forms nobody registered always proceed.
    pub fn submit<I, K, V>(&self, intent: &str, state: &mut FormState, fields: I) -> SubmitDecision
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let Some(form) = self.forms.get(intent) else {
            state.clear();
            return SubmitDecision::Proceed;
        };
        let fields = fields
            .into_iter()
            .map(|(key, value)| -> (String, FieldValue) { (key.into(), value.into()) })
            .filter(|(key, _)| key != INTENT_FIELD);
        form.handle_submit(state, fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::todo::client_forms;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_registered_intents() {
        let forms = client_forms();
        assert_eq!(forms.len(), 2);
        assert!(forms.get("addTodo").is_some_and(ActionForm::has_validator));
        assert!(forms.get("updateTodo").is_some());
        assert!(forms.get("deleteTodo").is_none());
    }

    #[test]
    fn test_submit_blank_title_is_prevented() {
        let forms = client_forms();
        let mut state = FormState::new();

        let decision = forms.submit("addTodo", &mut state, [("_action", "addTodo"), ("title", "  ")]);

        assert_eq!(decision, SubmitDecision::Prevent);
        assert_eq!(state.errors().get("title"), Some("Title is required"));
    }

    #[test]
    fn test_submit_update_with_composed_id() {
        let forms = client_forms();
        let mut state = FormState::new();

        let decision = forms.submit(
            "updateTodo",
            &mut state,
            [("_action", "updateTodo"), ("id", "7"), ("title", "Buy oat milk")],
        );
        assert_eq!(decision, SubmitDecision::Proceed);
        assert!(state.errors().is_empty());
    }

    #[test]
    fn test_unregistered_form_proceeds_and_clears() {
        let forms = client_forms();
        let mut state = FormState::new();
        forms.submit("addTodo", &mut state, [("title", "")]);
        assert!(!state.errors().is_empty());

        let decision = forms.submit("deleteTodo", &mut state, [("id", "7")]);
        assert_eq!(decision, SubmitDecision::Proceed);
        assert!(state.errors().is_empty());
    }

    #[test]
    fn test_file_parts_do_not_satisfy_text_rules() {
        let forms = client_forms();
        let mut state = FormState::new();
        let fields = vec![("title", FieldValue::File { name: "todo.txt".to_string() })];
        assert_eq!(forms.submit("addTodo", &mut state, fields), SubmitDecision::Prevent);
    }
}
