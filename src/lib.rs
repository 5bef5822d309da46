//! NoteVault library: the note workspace, its persistence and the web layer.
//!
//! This module wires the application modules together and exposes the
//! router so tests and the binary build the same app.

use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tower_http::trace::TraceLayer;

pub mod assistant;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod notes;
pub mod storage;
pub mod store;
pub mod tabs;
pub mod templates;
pub mod workspace;

use assistant::CompletionProvider;
use storage::Storage;
use workspace::Workspace;

// ============================================================================
// Application State
// ============================================================================

pub struct AppState {
    workspace: Mutex<Workspace>,
    pub assistant: Arc<dyn CompletionProvider>,
}

impl AppState {
    pub fn new(storage: &Storage, assistant: Arc<dyn CompletionProvider>) -> Self {
        Self {
            workspace: Mutex::new(Workspace::open(storage)),
            assistant,
        }
    }

    /// Lock the workspace for one operation.
    ///
    /// A panic inside a previous operation leaves the collections in a
    /// consistent state (every mutation is a single slot write), so a
    /// poisoned lock is recovered rather than propagated.
    pub fn workspace(&self) -> MutexGuard<'_, Workspace> {
        self.workspace.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Pages
        .route("/", get(handlers::index))
        .route("/notes", get(handlers::notes_page))
        .route("/notes/{id}", get(handlers::view_note))
        // Notes
        .route("/api/state", get(handlers::snapshot))
        .route("/api/notes", post(handlers::create_note))
        .route("/api/notes/unsaved", post(handlers::create_unsaved_note))
        .route(
            "/api/notes/{id}",
            patch(handlers::update_note).delete(handlers::delete_note),
        )
        .route("/api/notes/{id}/content", post(handlers::edit_content))
        .route("/api/notes/{id}/title", post(handlers::rename_note))
        .route("/api/notes/{id}/save", post(handlers::save_note))
        .route("/api/notes/{id}/location", post(handlers::save_location))
        .route("/api/notes/{id}/apply", post(handlers::apply_generated))
        .route("/api/notes/{id}/export", get(handlers::export_note))
        .route("/api/notes/{id}/preview", get(handlers::preview_note))
        // Clipboard and folders
        .route("/api/notes/{id}/copy", post(handlers::copy_note))
        .route("/api/notes/{id}/cut", post(handlers::cut_note))
        .route("/api/folders", post(handlers::create_folder))
        .route("/api/folders/{id}/cut", post(handlers::cut_folder))
        .route("/api/paste", post(handlers::paste))
        // Tabs
        .route("/api/tabs/{id}/close", post(handlers::close_tab))
        .route("/api/pending-close/{action}", post(handlers::resolve_close))
        // Search and settings
        .route("/api/search", get(handlers::search))
        .route(
            "/api/settings",
            get(handlers::get_settings).patch(handlers::update_settings),
        )
        // Assistant
        .route("/api/assistant/prompts/{tool}", get(handlers::tool_prompt))
        .route("/api/chat", post(handlers::chat))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
