// File: src/pages.rs
// Purpose: Todo page, rendered as HTML or served as JSON

use crate::todos::{Todo, TodoInput, TodoStore};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Json, Response};
use form_xn::{
    accepts_json, build_form_action, field_error, garde_validator, ActionForm, ClientErrors,
    FormState, InvalidSubmission,
};
use maud::{html, Markup, PreEscaped, DOCTYPE};
use serde::Deserialize;
use uuid::Uuid;

/// Loads the browser bindings, which mount every validated form
const CLIENT_SCRIPT: &str = "import init from '/pkg/form_xn_wasm.js';\ninit();";

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// Todo currently shown in edit mode
    pub edit: Option<String>,
}

/// A submission the server turned down, shown again with its messages
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    pub intent: String,
    /// Todo being renamed, for `updateTodo`
    pub todo: Option<Uuid>,
    /// Title as submitted
    pub title: String,
    pub errors: ClientErrors,
}

impl Rejected {
    pub fn from_submission(invalid: &InvalidSubmission) -> Self {
        Self {
            intent: invalid.intent.clone(),
            todo: invalid.query.get_as::<Uuid>("id"),
            title: invalid.query.get("title").unwrap_or_default().to_string(),
            errors: ClientErrors::from_field_errors(&invalid.errors),
        }
    }

    fn state(&self) -> FormState {
        FormState::with_errors(self.errors.clone())
    }
}

pub async fn index(
    State(store): State<TodoStore>,
    Query(query): Query<PageQuery>,
    headers: HeaderMap,
) -> Response {
    let todos = store.list().await;
    if accepts_json(&headers) {
        return Json(todos).into_response();
    }

    let editing = query.edit.as_deref().and_then(|id| id.parse::<Uuid>().ok());
    Html(render_page(&todos, editing, None).into_string()).into_response()
}

/// Page for a plain form post that failed validation
pub async fn rejected(store: &TodoStore, invalid: &InvalidSubmission) -> Response {
    let todos = store.list().await;
    let rejected = Rejected::from_submission(invalid);
    let editing = rejected.todo.filter(|_| rejected.intent == "updateTodo");
    Html(render_page(&todos, editing, Some(&rejected)).into_string()).into_response()
}

pub fn render_page(todos: &[Todo], editing: Option<Uuid>, rejected: Option<&Rejected>) -> Markup {
    let add_form = ActionForm::new("addTodo")
        .validator(garde_validator::<TodoInput>())
        .records(todos);
    let add_rejected = rejected.filter(|r| r.intent == "addTodo");
    let add_state = add_rejected.map(Rejected::state).unwrap_or_default();
    let add_title = add_rejected.map(|r| r.title.as_str()).unwrap_or_default();

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                title { "Todos" }
                script type="module" { (PreEscaped(CLIENT_SCRIPT)) }
            }
            body {
                main {
                    h1 { "My Todos" }
                    (add_form.render(&add_state, |errors| html! {
                        (title_fields(add_title, errors))
                        button type="submit" { "Add" }
                    }))
                    ul {
                        @for todo in todos {
                            li id=(todo.id.to_string()) {
                                @if editing == Some(todo.id) {
                                    (edit_form(todo, rejected))
                                } @else {
                                    (todo_item(todo))
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn todo_item(todo: &Todo) -> Markup {
    let delete = ActionForm::new(format!("deleteTodo?id={}", todo.id));
    html! {
        a.edit href=(format!("/?edit={}", todo.id)) {
            span { "✎" }
            p { (todo.title) }
        }
        (delete.render(&FormState::new(), |_| html! {
            button type="submit" { "X" }
        }))
    }
}

fn edit_form(todo: &Todo, rejected: Option<&Rejected>) -> Markup {
    let action = build_form_action("updateTodo", [("id", Some(todo.id))]);
    let form = ActionForm::new(action)
        .validator(garde_validator::<TodoInput>())
        .records(todo);

    let rejected = rejected.filter(|r| r.intent == "updateTodo" && r.todo == Some(todo.id));
    let state = rejected.map(Rejected::state).unwrap_or_default();
    let title = rejected.map_or(todo.title.as_str(), |r| r.title.as_str());

    form.render(&state, |errors| html! {
        (title_fields(title, errors))
        button type="submit" { "Update" }
        a.cancel href="/" { "Cancel" }
    })
}

fn title_fields(title: &str, errors: &ClientErrors) -> Markup {
    html! {
        textarea name="title" { (title) }
        (field_error(errors, "title"))
    }
}
