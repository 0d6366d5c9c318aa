// form-xn - intent-based form actions for Axum + Maud
// Many forms on one page, one POST endpoint, one validator shared by server and client

pub mod query;
pub mod intent;
pub mod validation;

// Server side
#[cfg(feature = "server")]
pub mod actions;
#[cfg(feature = "server")]
pub mod request_context;
#[cfg(feature = "server")]
pub mod response;
pub mod error;
pub mod config;

// Client side
pub mod form;

pub use query::{FormData, QueryParams, INTENT_FIELD};
pub use intent::{build_form_action, FormAction};
pub use validation::{
    decode_fields, ErrorDisplay, FieldErrors, SafeValidator, ValidationResult, FORM_ERROR_KEY,
};
#[cfg(feature = "garde")]
pub use validation::{garde_validator, GardeValidator};
#[cfg(feature = "nutype")]
pub use validation::{nutype_validator, NutypeValidator};

#[cfg(feature = "server")]
pub use actions::{handle_actions, read_form, ActionHandler, Actions, ActionsBuilder, Resolved};
#[cfg(feature = "server")]
pub use request_context::{accepts_json, ActionArgs, InvalidSubmission, ValidatedContext};
#[cfg(feature = "server")]
pub use response::ValidationErrors;
pub use error::ActionError;
pub use config::Config;

pub use form::{field_error, ActionForm, ClientErrors, FieldValue, FormState, SubmitDecision};

// Re-export Maud for form content
pub use maud::{html, Markup, PreEscaped, DOCTYPE};
