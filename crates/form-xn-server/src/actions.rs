// File: src/actions.rs
// Purpose: Todo actions registered on the single POST endpoint

use crate::pages;
use crate::todos::{TodoInput, TodoStore};
use axum::response::{IntoResponse, Json, Redirect, Response};
use form_xn::config::FormsConfig;
use form_xn::{
    garde_validator, ActionArgs, ActionError, Actions, InvalidSubmission, QueryParams,
    ValidatedContext,
};
use tracing::info;
use uuid::Uuid;

pub fn todo_actions(store: &TodoStore, forms: &FormsConfig) -> Result<Actions, ActionError> {
    let add = store.clone();
    let update = store.clone();
    let delete = store.clone();
    let invalid = store.clone();

    Actions::builder()
        .config(forms)
        .validated(
            "addTodo",
            garde_validator::<TodoInput>(),
            move |ctx: ValidatedContext<TodoInput>| {
                let store = add.clone();
                async move {
                    let todo = store.add(ctx.data.title.clone()).await;
                    info!(id = %todo.id, "added todo");
                    respond(&store, ctx.accepts_json()).await
                }
            },
        )
        .validated(
            "updateTodo",
            garde_validator::<TodoInput>(),
            move |ctx: ValidatedContext<TodoInput>| {
                let store = update.clone();
                async move {
                    if let Some(id) = todo_id(&ctx.query) {
                        if store.rename(id, ctx.data.title.clone()).await {
                            info!(%id, "updated todo");
                        }
                    }
                    respond(&store, ctx.accepts_json()).await
                }
            },
        )
        .action("deleteTodo", move |args: ActionArgs| {
            let store = delete.clone();
            async move {
                if let Some(id) = todo_id(&args.query) {
                    if store.remove(id).await {
                        info!(%id, "deleted todo");
                    }
                }
                respond(&store, args.accepts_json()).await
            }
        })
        .on_invalid(move |submission: InvalidSubmission| {
            let store = invalid.clone();
            async move {
                if submission.accepts_json() {
                    submission.into_validation_errors().into_response()
                } else {
                    pages::rejected(&store, &submission).await
                }
            }
        })
        .build()
}

fn todo_id(query: &QueryParams) -> Option<Uuid> {
    query.get_as::<Uuid>("id")
}

/// Current list as JSON, or back to the page for plain form posts
async fn respond(store: &TodoStore, json: bool) -> Response {
    if json {
        Json(store.list().await).into_response()
    } else {
        Redirect::to("/").into_response()
    }
}
