mod actions;
mod pages;
mod todos;

use anyhow::Context;
use axum::extract::FromRef;
use axum::routing::get;
use axum::Router;
use form_xn::{handle_actions, Actions, Config};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_livereload::LiveReloadLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::todos::TodoStore;

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    store: TodoStore,
    actions: Actions,
}

impl FromRef<AppState> for TodoStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Actions {
    fn from_ref(state: &AppState) -> Self {
        state.actions.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("form_xn=debug,form_xn_server=info,tower_http=info")),
        )
        .init();

    let mut config = Config::load_default().unwrap_or_else(|e| {
        warn!("Failed to load config: {:#}, using defaults", e);
        Config::default()
    });
    apply_env_overrides(&mut config);

    let store = TodoStore::seeded();
    let app = build_app(store, &config).context("Failed to register actions")?;

    let app = if config.dev.live_reload {
        info!("Live reload: enabled");
        app.layer(LiveReloadLayer::new())
    } else {
        app
    };

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

/// `FORM_XN_PORT` and `LIVE_RELOAD` win over the config file
fn apply_env_overrides(config: &mut Config) {
    if let Some(port) = std::env::var("FORM_XN_PORT").ok().and_then(|v| v.parse().ok()) {
        config.server.port = port;
    }
    if let Some(enabled) = std::env::var("LIVE_RELOAD").ok().and_then(|v| v.parse().ok()) {
        config.dev.live_reload = enabled;
    }
}

fn build_app(store: TodoStore, config: &Config) -> Result<Router, form_xn::ActionError> {
    let actions = actions::todo_actions(&store, &config.forms)?;
    info!(intents = ?actions.intents(), "registered actions");

    let state = AppState { store, actions };

    Ok(Router::new()
        .route("/", get(pages::index).post(handle_actions))
        .nest_service("/pkg", ServeDir::new(&config.server.pkg_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::{json, Value};
    use crate::todos::Todo;

    fn server(store: &TodoStore) -> TestServer {
        let app = build_app(store.clone(), &Config::default()).unwrap();
        TestServer::new(app).unwrap()
    }

    fn json_accept() -> HeaderValue {
        HeaderValue::from_static("application/json")
    }

    #[tokio::test]
    async fn test_index_renders_html() {
        let store = TodoStore::new();
        store.add("Buy milk").await;

        let response = server(&store).get("/").await;

        response.assert_status_ok();
        let html = response.text();
        assert!(html.contains("Buy milk"));
        assert!(html.contains(r#"value="addTodo""#));
    }

    #[tokio::test]
    async fn test_index_serves_json_when_asked() {
        let store = TodoStore::new();
        let todo = store.add("Buy milk").await;

        let response = server(&store)
            .get("/")
            .add_header(header::ACCEPT, json_accept())
            .await;

        let todos: Vec<Todo> = response.json();
        assert_eq!(todos, vec![todo]);
    }

    #[tokio::test]
    async fn test_add_empty_title_returns_errors() {
        let store = TodoStore::new();

        let response = server(&store)
            .post("/")
            .add_header(header::ACCEPT, json_accept())
            .form(&[("_action", "addTodo"), ("title", "")])
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>(),
            json!({ "errors": { "title": "Title is required" } })
        );
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_plain_post_with_empty_title_rerenders_page() {
        let store = TodoStore::new();
        store.add("Buy milk").await;

        let response = server(&store)
            .post("/")
            .form(&[("_action", "addTodo"), ("title", " ")])
            .await;

        response.assert_status_ok();
        let html = response.text();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<p class="field-error" data-field="title">Title is required</p>"#));
        assert!(html.contains("Buy milk"));
        assert_eq!(store.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_plain_post_with_empty_rename_reopens_edit_form() {
        let store = TodoStore::new();
        let todo = store.add("Buy milk").await;
        let action = form_xn::build_form_action("updateTodo", [("id", Some(todo.id))]);

        let response = server(&store)
            .post("/")
            .form(&[("_action", action.as_str()), ("title", "")])
            .await;

        let html = response.text();
        assert!(html.contains(r#"value="updateTodo""#));
        assert!(html.contains("Title is required"));
        assert_eq!(store.get(todo.id).await.unwrap().title, "Buy milk");
    }

    #[tokio::test]
    async fn test_multipart_post_is_dispatched() {
        let store = TodoStore::new();
        let form = axum_test::multipart::MultipartForm::new()
            .add_text("_action", "addTodo")
            .add_text("title", "Buy milk");

        server(&store)
            .post("/")
            .add_header(header::ACCEPT, json_accept())
            .multipart(form)
            .await
            .assert_status_ok();

        assert_eq!(store.list().await[0].title, "Buy milk");
    }

    #[tokio::test]
    async fn test_missing_client_bundle_is_not_found() {
        let store = TodoStore::new();
        let config = Config {
            server: form_xn::config::ServerConfig {
                pkg_dir: "definitely/not/here".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let app = build_app(store, &config).unwrap();

        TestServer::new(app)
            .unwrap()
            .get("/pkg/form_xn_wasm.js")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_add_returns_list_as_json() {
        let store = TodoStore::new();

        let response = server(&store)
            .post("/")
            .add_header(header::ACCEPT, json_accept())
            .form(&[("_action", "addTodo"), ("title", "Buy milk")])
            .await;

        let todos: Vec<Todo> = response.json();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].title, "Buy milk");
    }

    #[tokio::test]
    async fn test_plain_form_post_redirects_home() {
        let store = TodoStore::new();

        let response = server(&store)
            .post("/")
            .form(&[("_action", "addTodo"), ("title", "Buy milk")])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header(header::LOCATION), "/");
        assert_eq!(store.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_update_uses_composed_id() {
        let store = TodoStore::new();
        let todo = store.add("Buy milk").await;
        let action = form_xn::build_form_action("updateTodo", [("id", Some(todo.id))]);

        server(&store)
            .post("/")
            .add_header(header::ACCEPT, json_accept())
            .form(&[("_action", action.as_str()), ("title", "Buy oat milk")])
            .await
            .assert_status_ok();

        assert_eq!(store.get(todo.id).await.unwrap().title, "Buy oat milk");
    }

    #[tokio::test]
    async fn test_delete_removes_todo() {
        let store = TodoStore::new();
        let todo = store.add("Buy milk").await;
        let action = format!("deleteTodo?id={}", todo.id);

        server(&store)
            .post("/")
            .add_header(header::ACCEPT, json_accept())
            .form(&[("_action", action.as_str())])
            .await
            .assert_status_ok();

        assert!(store.list().await.is_empty());
    }

    #[rstest]
    #[case::unknown_intent(&[("_action", "nope"), ("title", "x")], "Unknown action: nope")]
    #[case::missing_intent(&[("title", "x")], "Missing _action field")]
    #[tokio::test]
    async fn test_rejected_submissions_change_nothing(
        #[case] fields: &[(&str, &str)],
        #[case] message: &str,
    ) {
        let store = TodoStore::new();

        let response = server(&store).post("/").form(&fields).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.text(), message);
        assert!(store.list().await.is_empty());
    }
}
