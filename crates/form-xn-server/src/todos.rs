// File: src/todos.rs
// Purpose: In-memory todo list

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
}

/// Input schema, shared with the browser bindings
pub use form_xn_wasm::todo::TodoInput;

/// Shared todo list. Clones point at the same list.
#[derive(Debug, Clone, Default)]
pub struct TodoStore {
    todos: Arc<RwLock<Vec<Todo>>>,
}

impl TodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with one example todo
    pub fn seeded() -> Self {
        let store = Self::new();
        if let Ok(mut todos) = store.todos.try_write() {
            todos.push(Todo {
                id: Uuid::new_v4(),
                title: "Try submitting an empty title".to_string(),
            });
        }
        store
    }

    pub async fn list(&self) -> Vec<Todo> {
        self.todos.read().await.clone()
    }

    pub async fn get(&self, id: Uuid) -> Option<Todo> {
        self.todos.read().await.iter().find(|t| t.id == id).cloned()
    }

    pub async fn add(&self, title: impl Into<String>) -> Todo {
        let todo = Todo {
            id: Uuid::new_v4(),
            title: title.into(),
        };
        self.todos.write().await.push(todo.clone());
        todo
    }

    /// Rename a todo; unknown ids are ignored
    pub async fn rename(&self, id: Uuid, title: impl Into<String>) -> bool {
        let mut todos = self.todos.write().await;
        match todos.iter_mut().find(|t| t.id == id) {
            Some(todo) => {
                todo.title = title.into();
                true
            }
            None => false,
        }
    }

    /// Remove a todo; unknown ids are ignored
    pub async fn remove(&self, id: Uuid) -> bool {
        let mut todos = self.todos.write().await;
        let before = todos.len();
        todos.retain(|t| t.id != id);
        todos.len() != before
    }
}
