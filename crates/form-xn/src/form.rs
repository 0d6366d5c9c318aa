// File: src/form.rs
// Purpose: Client-side form wrapper mirroring server validation before submit

use crate::intent::FormAction;
use crate::query::{QueryParams, INTENT_FIELD};
use crate::validation::{FieldErrors, SafeValidator};
use maud::{html, Markup};
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::debug;

/// Value of one form control at submit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    /// File inputs never take part in client-side validation
    File { name: String },
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

/// What the browser should do with a submit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitDecision {
    /// Let the native submission happen
    Proceed,
    /// Prevent the default submission; errors were published
    Prevent,
}

/// Error context for one form instance: field name to a display message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientErrors {
    messages: BTreeMap<String, String>,
}

impl ClientErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the first message of every field.
    pub fn from_field_errors(errors: &FieldErrors) -> Self {
        Self {
            messages: errors.first_messages(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.messages.get(field).map(String::as_str)
    }

    pub fn has(&self, field: &str) -> bool {
        self.messages.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.messages
            .iter()
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }
}

/// Per-instance state: the published errors and the record set they belong to.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    errors: ClientErrors,
    records: Option<u64>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State showing errors the server sent back with a re-rendered page.
    pub fn with_errors(errors: ClientErrors) -> Self {
        Self {
            errors,
            records: None,
        }
    }

    /// Read-only view handed to descendants while rendering
    pub fn errors(&self) -> &ClientErrors {
        &self.errors
    }

    pub fn clear(&mut self) {
        self.errors = ClientErrors::new();
    }

    /// Note the record set driving the form; errors are cleared when it changes.
    ///
    /// Returns true if the record set changed.
    pub fn sync_records<R: Hash + ?Sized>(&mut self, records: &R) -> bool {
        let fingerprint = fingerprint(records);
        if self.records == Some(fingerprint) {
            return false;
        }
        let changed = self.records.is_some();
        self.records = Some(fingerprint);
        if changed {
            self.clear();
        }
        changed
    }

    /// Replace the shown errors.
    pub fn publish(&mut self, errors: ClientErrors) {
        self.errors = errors;
    }
}

fn fingerprint<R: Hash + ?Sized>(records: &R) -> u64 {
    let mut hasher = DefaultHasher::new();
    records.hash(&mut hasher);
    hasher.finish()
}

/// Object-safe view of a validator: only pass/fail matters on the client.
trait FieldCheck: Send + Sync {
    fn check(&self, input: &QueryParams) -> Result<(), FieldErrors>;
}

struct Checked<V, T> {
    validator: V,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<V: SafeValidator<T>, T> FieldCheck for Checked<V, T> {
    fn check(&self, input: &QueryParams) -> Result<(), FieldErrors> {
        self.validator.safe_parse(input).into_result().map(|_| ())
    }
}

/// A form bound to one action, optionally validated before it is sent.
///
/// Renders the hidden `_action` field plus one hidden field per action
/// parameter so the dispatcher can recover them. The form element is marked
/// `data-form-xn` so the browser bindings can find and mount it.
///
/// ```
/// use form_xn::{ActionForm, FormAction, FormState};
///
/// let form = ActionForm::new(FormAction::new("deleteTodo").param("id", 42));
/// let markup = form.render(&FormState::new(), |_errors| form_xn::html! {
///     button type="submit" { "X" }
/// });
/// let html = markup.into_string();
/// assert!(html.contains(r#"name="_action" value="deleteTodo""#));
/// assert!(html.contains(r#"name="id" value="42""#));
/// ```
#[derive(Clone)]
pub struct ActionForm {
    action: FormAction,
    validator: Option<Arc<dyn FieldCheck>>,
    target: Option<String>,
    records: Option<u64>,
}

impl ActionForm {
    pub fn new(action: impl Into<FormAction>) -> Self {
        Self {
            action: action.into(),
            validator: None,
            target: None,
            records: None,
        }
    }

    /// Validate on submit with the same validator the server uses.
    pub fn validator<V, T>(mut self, validator: V) -> Self
    where
        V: SafeValidator<T> + 'static,
        T: 'static,
    {
        self.validator = Some(Arc::new(Checked {
            validator,
            _marker: std::marker::PhantomData,
        }));
        self
    }

    /// URL the form posts to; defaults to the current page.
    pub fn target(mut self, url: impl Into<String>) -> Self {
        self.target = Some(url.into());
        self
    }

    /// Record set the form was rendered for, published as `data-records`.
    /// Mounted forms drop their errors when it changes.
    pub fn records<R: Hash + ?Sized>(mut self, records: &R) -> Self {
        self.records = Some(fingerprint(records));
        self
    }

    pub fn action(&self) -> &FormAction {
        &self.action
    }

    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    /// Hidden fields injected into the form, intent first.
    pub fn hidden_fields(&self) -> Vec<(&str, &str)> {
        std::iter::once((INTENT_FIELD, self.action.intent()))
            .chain(self.action.params().iter())
            .collect()
    }

    /// Handle a submit attempt.
    ///
    /// Clears previous errors, then validates the text-valued controls. On
    /// failure the first message per field is published to `state` and the
    /// submission must be prevented.
    pub fn handle_submit<I, K, V>(&self, state: &mut FormState, fields: I) -> SubmitDecision
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        state.clear();

        let Some(validator) = &self.validator else {
            return SubmitDecision::Proceed;
        };

        let record: QueryParams = fields
            .into_iter()
            .filter_map(|(key, value)| match value.into() {
                FieldValue::Text(text) => Some((key.into(), text)),
                FieldValue::File { .. } => None,
            })
            .collect();

        match validator.check(&record) {
            Ok(()) => SubmitDecision::Proceed,
            Err(errors) => {
                debug!(intent = self.action.intent(), fields = errors.len(), "blocked submission");
                state.publish(ClientErrors::from_field_errors(&errors));
                SubmitDecision::Prevent
            }
        }
    }

    /// Render the form element around `content`, which receives the errors.
    pub fn render<F>(&self, state: &FormState, content: F) -> Markup
    where
        F: FnOnce(&ClientErrors) -> Markup,
    {
        let records = self.records.map(|r| format!("{:016x}", r));
        html! {
            form method="post" action=[self.target.as_deref()]
                data-form-xn data-intent=(self.action.intent())
                data-validated[self.has_validator()] data-records=[records] {
                @for (name, value) in self.hidden_fields() {
                    input type="hidden" name=(name) value=(value);
                }
                (content(state.errors()))
            }
        }
    }
}

impl std::fmt::Debug for ActionForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionForm")
            .field("action", &self.action.to_string())
            .field("validated", &self.has_validator())
            .field("target", &self.target)
            .field("records", &self.records)
            .finish()
    }
}

/// Message slot for one field. Hidden while the field has no error so the
/// browser bindings can fill it in place.
pub fn field_error(errors: &ClientErrors, field: &str) -> Markup {
    let message = errors.get(field);
    html! {
        p.field-error data-field=(field) hidden[message.is_none()] {
            (message.unwrap_or_default())
        }
    }
}
