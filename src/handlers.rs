//! HTTP route handlers for the web application.
//!
//! Page routes render the server-side HTML; `/api` routes are the JSON
//! surface the page script uses. Every handler takes the workspace lock for
//! the duration of one operation and never holds it across an await.

use crate::assistant::{AssistantTool, CompletionRequest};
use crate::models::{
    AssistantContext, ChatMessage, ClipboardKind, Note, NoteExcerpt, NoteUpdate, SettingsUpdate,
    ROOT_FOLDER,
};
use crate::notes::{export_filename, render_preview, search_notes, ExportFormat, SearchResult};
use crate::tabs::CloseRequest;
use crate::templates::{render_app, ViewMode};
use crate::workspace::{Navigation, SaveOutcome, Snapshot};
use crate::AppState;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use futures_util::TryStreamExt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

// ============================================================================
// Pages
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub view: ViewMode,
    #[serde(default)]
    pub ai: bool,
}

pub async fn index(State(state): State<Arc<AppState>>) -> Redirect {
    let ws = state.workspace();
    let target = match ws.active_note_id() {
        Some(id) => Navigation::Note(id.to_string()),
        None => ws.fallback(),
    };
    Redirect::to(&target.path())
}

/// The active note, or the empty state when no note is active.
pub async fn notes_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Response {
    let ws = state.workspace();
    if let Some(id) = ws.active_note_id() {
        return Redirect::to(&Navigation::Note(id.to_string()).path()).into_response();
    }
    Html(render_app(&ws, query.view, query.ai)).into_response()
}

pub async fn view_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Response {
    let mut ws = state.workspace();
    if !ws.select(&id) {
        let target = ws.fallback();
        info!(id, redirect = %target.path(), "unknown note requested");
        return Redirect::to(&target.path()).into_response();
    }
    Html(render_app(&ws, query.view, query.ai)).into_response()
}

// ============================================================================
// State and Notes
// ============================================================================

pub async fn snapshot(State(state): State<Arc<AppState>>) -> Json<Snapshot> {
    let snapshot = state.workspace().snapshot();
    Json(snapshot)
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateNoteRequest {
    #[serde(default)]
    pub folder: Option<String>,
}

pub async fn create_note(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateNoteRequest>,
) -> Json<Note> {
    let folder = req.folder.unwrap_or_else(|| ROOT_FOLDER.to_string());
    let note = state.workspace().create_note(&folder);
    Json(note)
}

pub async fn create_unsaved_note(State(state): State<Arc<AppState>>) -> Json<Note> {
    let note = state.workspace().create_unsaved_note();
    Json(note)
}

/// Partial update. Unknown ids answer `null`.
pub async fn update_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<NoteUpdate>,
) -> Json<Option<Note>> {
    let mut ws = state.workspace();
    ws.update_note(&id, update);
    Json(ws.note(&id).cloned())
}

#[derive(Debug, Serialize)]
pub struct NavigationResponse {
    pub navigation: Navigation,
    pub redirect: String,
}

impl From<Navigation> for NavigationResponse {
    fn from(navigation: Navigation) -> Self {
        let redirect = navigation.path();
        Self {
            navigation,
            redirect,
        }
    }
}

pub async fn delete_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<NavigationResponse> {
    let navigation = state.workspace().delete_note(&id);
    Json(navigation.into())
}

#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    pub content: String,
}

pub async fn edit_content(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ContentRequest>,
) -> Json<Option<Note>> {
    let mut ws = state.workspace();
    ws.edit_content(&id, &req.content);
    Json(ws.note(&id).cloned())
}

#[derive(Debug, Deserialize)]
pub struct TitleRequest {
    pub title: String,
}

pub async fn rename_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<TitleRequest>,
) -> Json<Option<Note>> {
    let mut ws = state.workspace();
    ws.rename_note(&id, &req.title);
    Json(ws.note(&id).cloned())
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub outcome: SaveOutcome,
}

pub async fn save_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<SaveResponse> {
    let outcome = state.workspace().save_note(&id);
    Json(SaveResponse { outcome })
}

#[derive(Debug, Deserialize)]
pub struct LocationRequest {
    pub folder: String,
}

pub async fn save_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<LocationRequest>,
) -> Json<SaveResponse> {
    let outcome = state.workspace().save_note_location(&id, &req.folder);
    Json(SaveResponse { outcome })
}

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub text: String,
}

/// Append assistant output to the note.
pub async fn apply_generated(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ApplyRequest>,
) -> Json<Option<Note>> {
    let mut ws = state.workspace();
    ws.apply_generated(&id, &req.text);
    Json(ws.note(&id).cloned())
}

// ============================================================================
// Clipboard and Folders
// ============================================================================

pub async fn copy_note(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> StatusCode {
    state.workspace().copy_note(&id);
    StatusCode::NO_CONTENT
}

pub async fn cut_note(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> StatusCode {
    state.workspace().cut_note(&id);
    StatusCode::NO_CONTENT
}

pub async fn cut_folder(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> StatusCode {
    state.workspace().cut_folder(&id);
    StatusCode::NO_CONTENT
}

#[derive(Debug, Deserialize)]
pub struct PasteRequest {
    pub folder: String,
}

/// Paste whatever the clipboard holds into `folder`.
pub async fn paste(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PasteRequest>,
) -> Response {
    let mut ws = state.workspace();
    let Some(kind) = ws.store().clipboard().map(|entry| entry.kind) else {
        return (StatusCode::BAD_REQUEST, "Clipboard is empty").into_response();
    };
    match kind {
        ClipboardKind::Note => {
            let pasted = ws.paste_note(&req.folder);
            Json(json!({ "note": pasted })).into_response()
        }
        ClipboardKind::Folder => {
            let moved = ws.paste_folder(&req.folder);
            if !moved {
                warn!(target_folder = %req.folder, "folder paste rejected");
            }
            Json(json!({ "moved": moved })).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateFolderRequest {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
}

pub async fn create_folder(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateFolderRequest>,
) -> Response {
    let name = req.name.trim();
    if name.is_empty() || name.contains('/') {
        return (StatusCode::BAD_REQUEST, "Invalid folder name").into_response();
    }
    let folder = state.workspace().create_folder(name, req.parent.as_deref());
    Json(folder).into_response()
}

// ============================================================================
// Tabs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CloseResponse {
    pub result: CloseRequest,
    pub redirect: String,
}

pub async fn close_tab(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<CloseResponse> {
    let mut ws = state.workspace();
    let result = ws.close_tab(&id);
    let redirect = match ws.active_note_id() {
        Some(active) => Navigation::Note(active.to_string()),
        None => Navigation::Empty,
    }
    .path();
    Json(CloseResponse { result, redirect })
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CloseAction {
    Save,
    Discard,
    Cancel,
}

#[derive(Debug, Serialize)]
pub struct ResolveCloseResponse {
    pub outcome: Option<SaveOutcome>,
    pub redirect: String,
}

/// Resolve the tab held open by the unsaved-changes dialog.
pub async fn resolve_close(
    State(state): State<Arc<AppState>>,
    Path(action): Path<CloseAction>,
) -> Json<ResolveCloseResponse> {
    let mut ws = state.workspace();
    let outcome = match action {
        CloseAction::Save => ws.save_and_close(),
        CloseAction::Discard => {
            ws.discard_and_close();
            None
        }
        CloseAction::Cancel => {
            ws.cancel_close();
            None
        }
    };
    // A note saved without a location is still where the dialog must open.
    let redirect = match (outcome, ws.pending_location(), ws.active_note_id()) {
        (Some(SaveOutcome::LocationRequired), Some(pending), _) => {
            Navigation::Note(pending.to_string())
        }
        (_, _, Some(active)) => Navigation::Note(active.to_string()),
        _ => Navigation::Empty,
    }
    .path();
    Json(ResolveCloseResponse { outcome, redirect })
}

// ============================================================================
// Reads: export, preview, search
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: ExportFormat,
}

pub async fn export_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Response {
    let ws = state.workspace();
    let Some(note) = ws.note(&id) else {
        return (StatusCode::NOT_FOUND, "Note not found").into_response();
    };
    let filename = export_filename(note, query.format);
    let disposition = format!(
        "attachment; filename*=UTF-8''{}",
        urlencoding::encode(&filename)
    );
    (
        [
            (header::CONTENT_TYPE, query.format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        note.content.clone(),
    )
        .into_response()
}

pub async fn preview_note(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let ws = state.workspace();
    let Some(note) = ws.note(&id) else {
        return (StatusCode::NOT_FOUND, "Note not found").into_response();
    };
    let notes_map: HashMap<String, Note> = ws
        .store()
        .notes()
        .iter()
        .map(|n| (n.id.clone(), n.clone()))
        .collect();
    Html(render_preview(note, &notes_map)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<SearchResult>> {
    let ws = state.workspace();
    Json(search_notes(ws.store().notes(), &query.q))
}

// ============================================================================
// Settings
// ============================================================================

pub async fn get_settings(State(state): State<Arc<AppState>>) -> Response {
    let settings = state.workspace().settings().clone();
    Json(settings).into_response()
}

pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SettingsUpdate>,
) -> Response {
    if update.font_size == Some(0) {
        return (StatusCode::BAD_REQUEST, "Font size must be positive").into_response();
    }
    let settings = state.workspace().update_settings(update);
    Json(settings).into_response()
}

// ============================================================================
// Assistant
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PromptQuery {
    pub note: String,
}

/// The canned prompt for a panel tool, filled in with the note's title.
pub async fn tool_prompt(
    State(state): State<Arc<AppState>>,
    Path(tool): Path<AssistantTool>,
    Query(query): Query<PromptQuery>,
) -> Response {
    let ws = state.workspace();
    let Some(note) = ws.note(&query.note) else {
        return (StatusCode::NOT_FOUND, "Note not found").into_response();
    };
    Json(json!({ "prompt": tool.prompt(&note.title) })).into_response()
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub data: AssistantContext,
}

fn chat_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Failed to process chat request" })),
    )
        .into_response()
}

/// Stream an assistant reply as plain text.
///
/// When the client sends no note context, the workspace's notes are used.
pub async fn chat(State(state): State<Arc<AppState>>, Json(req): Json<ChatRequest>) -> Response {
    let mut context = req.data;
    if context.notes.is_empty() {
        let ws = state.workspace();
        context.notes = ws.store().notes().iter().map(NoteExcerpt::from).collect();
    }

    let request = CompletionRequest::new(&req.messages, context);
    info!(
        provider = state.assistant.name(),
        turns = req.messages.len(),
        "chat request"
    );

    match state.assistant.complete(request).await {
        Ok(stream) => {
            let stream = stream.inspect_err(|e| error!(error = %e, "chat stream failed"));
            (
                [
                    (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                    (header::CACHE_CONTROL, "no-cache"),
                ],
                Body::from_stream(stream),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "chat request failed");
            chat_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::{CompletionProvider, MockProvider, TextStream};
    use crate::error::AssistantError;
    use crate::storage::Storage;
    use async_trait::async_trait;
    use axum::body::to_bytes;
    use std::time::Duration;

    struct FailingProvider;

    #[async_trait]
    impl CompletionProvider for FailingProvider {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn complete(&self, _request: CompletionRequest) -> Result<TextStream, AssistantError> {
            Err(AssistantError::Upstream {
                status: 503,
                body: "unavailable".into(),
            })
        }
    }

    fn app_state(provider: Arc<dyn CompletionProvider>) -> Arc<AppState> {
        let storage = Storage::temporary().unwrap();
        Arc::new(AppState::new(&storage, provider))
    }

    fn mock_state() -> Arc<AppState> {
        app_state(Arc::new(MockProvider::new(Duration::ZERO)))
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
    }

    fn chat_body(text: &str) -> ChatRequest {
        ChatRequest {
            messages: vec![ChatMessage {
                role: crate::models::Role::User,
                content: text.into(),
            }],
            data: AssistantContext::default(),
        }
    }

    #[tokio::test]
    async fn test_unknown_note_redirects_to_first() {
        let state = mock_state();
        let response = view_note(
            State(state),
            Path("ghost".to_string()),
            Query(PageQuery::default()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/notes/welcome");
    }

    #[tokio::test]
    async fn test_view_note_selects() {
        let state = mock_state();
        let response = view_note(
            State(state.clone()),
            Path("welcome".to_string()),
            Query(PageQuery::default()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.workspace().active_note_id(), Some("welcome"));
        assert!(body_string(response).await.contains("Welcome to NoteVault"));
    }

    #[tokio::test]
    async fn test_notes_page_renders_empty_state() {
        let state = mock_state();
        let response = notes_page(State(state), Query(PageQuery::default())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("No Note Selected"));
    }

    #[tokio::test]
    async fn test_export_sets_filename() {
        let state = mock_state();
        let response = export_note(
            State(state),
            Path("welcome".to_string()),
            Query(ExportQuery {
                format: ExportFormat::Txt,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert_eq!(
            disposition,
            "attachment; filename*=UTF-8''Welcome%20to%20NoteVault.txt"
        );
        assert!(body_string(response).await.starts_with("# Welcome to NoteVault"));
    }

    #[tokio::test]
    async fn test_export_unknown_is_404() {
        let state = mock_state();
        let response = export_note(
            State(state),
            Path("ghost".to_string()),
            Query(ExportQuery::default()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_returns_redirect() {
        let state = mock_state();
        let id = state.workspace().create_note("/").id;
        let Json(response) = delete_note(State(state.clone()), Path(id.clone())).await;
        assert!(state.workspace().note(&id).is_none());
        assert_eq!(response.navigation, Navigation::Note("welcome".into()));
        assert_eq!(response.redirect, "/notes/welcome");
    }

    #[tokio::test]
    async fn test_close_dirty_tab_then_discard() {
        let state = mock_state();
        let id = state.workspace().create_note("/").id;
        let Json(edited) = edit_content(
            State(state.clone()),
            Path(id.clone()),
            Json(ContentRequest {
                content: "changed".into(),
            }),
        )
        .await;
        assert_eq!(edited.unwrap().content, "# Untitled Note\n\nchanged");

        let Json(closed) = close_tab(State(state.clone()), Path(id.clone())).await;
        assert_eq!(closed.result, CloseRequest::ConfirmationRequired);

        let Json(resolved) = resolve_close(State(state.clone()), Path(CloseAction::Discard)).await;
        assert_eq!(resolved.outcome, None);
        assert_eq!(resolved.redirect, "/notes");
        let ws = state.workspace();
        assert!(!ws.tabs().is_open(&id));
        assert!(ws.note(&id).is_some());
    }

    #[tokio::test]
    async fn test_paste_with_empty_clipboard() {
        let state = mock_state();
        let response = paste(
            State(state),
            Json(PasteRequest {
                folder: "/".into(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_folder_rejects_blank_name() {
        let state = mock_state();
        let response = create_folder(
            State(state),
            Json(CreateFolderRequest {
                name: "  ".into(),
                parent: None,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_tool_prompt_uses_title() {
        let state = mock_state();
        let response = tool_prompt(
            State(state),
            Path(AssistantTool::Summarize),
            Query(PromptQuery {
                note: "welcome".into(),
            }),
        )
        .await;
        assert!(body_string(response)
            .await
            .contains("titled \\\"Welcome to NoteVault\\\""));
    }

    #[tokio::test]
    async fn test_chat_streams_mock_text() {
        let state = mock_state();
        let response = chat(State(state), Json(chat_body("hello"))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let text = body_string(response).await;
        assert!(crate::assistant::MOCK_RESPONSES.contains(&text.as_str()));
    }

    #[tokio::test]
    async fn test_chat_failure_is_500_json() {
        let state = app_state(Arc::new(FailingProvider));
        let response = chat(State(state), Json(chat_body("hello"))).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_string(response).await,
            r#"{"error":"Failed to process chat request"}"#
        );
    }
}
