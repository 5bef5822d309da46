//! The main application page: toolbar, tabs, editor or preview, and the
//! assistant side panel.

use crate::assistant::{AssistantTool, WELCOME_MESSAGE};
use crate::notes::{html_escape, render_preview, script_json, strip_title_header};
use crate::workspace::Workspace;
use serde::Deserialize;
use std::collections::HashMap;

use super::components::{base_html, dialogs, sidebar, tab_bar};
use super::script::APP_SCRIPT;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Edit,
    Preview,
}

impl ViewMode {
    fn as_str(self) -> &'static str {
        match self {
            ViewMode::Edit => "edit",
            ViewMode::Preview => "preview",
        }
    }
}

fn view_link(id: &str, view: ViewMode, show_ai: bool) -> String {
    format!(
        "/notes/{}?view={}&ai={}",
        urlencoding::encode(id),
        view.as_str(),
        show_ai
    )
}

fn assistant_panel() -> String {
    let tools: String = [
        (AssistantTool::Summarize, "Summarize"),
        (AssistantTool::Expand, "Expand"),
        (AssistantTool::Ideas, "Related ideas"),
        (AssistantTool::Outline, "Create outline"),
    ]
    .iter()
    .map(|(tool, label)| {
        let name = serde_json::to_value(tool)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        format!(
            r#"<button class="btn secondary" onclick="runTool(&quot;{}&quot;)">{}</button>"#,
            name, label
        )
    })
    .collect();

    format!(
        r#"<section class="assistant">
            <div class="messages" id="chat-messages">
                <div class="message assistant">{welcome}</div>
            </div>
            <div class="tools">{tools}</div>
            <form onsubmit="return sendChat(event)">
                <input type="text" id="chat-input" placeholder="Ask me anything about your notes..." autocomplete="off">
                <button class="btn" type="submit" id="chat-send">Send</button>
            </form>
        </section>"#,
        welcome = html_escape(WELCOME_MESSAGE),
        tools = tools,
    )
}

fn settings_dialog(ws: &Workspace) -> String {
    let settings = ws.settings();
    let families: String = [("font-sans", "Sans"), ("font-serif", "Serif"), ("font-mono", "Mono")]
        .iter()
        .map(|(value, label)| {
            let selected = if settings.font_family == *value {
                " selected"
            } else {
                ""
            };
            format!(r#"<option value="{}"{}>{}</option>"#, value, selected, label)
        })
        .collect();

    format!(
        r#"<div class="dialog-overlay" id="settings-dialog">
            <div class="dialog">
                <h2>Settings</h2>
                <label>Font size <input type="number" id="font-size" min="10" max="32" value="{size}"></label>
                <label>Font <select id="font-family">{families}</select></label>
                <div class="row">
                    <button class="btn secondary" onclick="closeDialog('settings-dialog')">Cancel</button>
                    <button class="btn" onclick="saveSettings()">Save</button>
                </div>
            </div>
        </div>"#,
        size = settings.font_size,
        families = families,
    )
}

fn page_state(ws: &Workspace) -> String {
    let state = serde_json::json!({
        "activeNoteId": ws.active_note_id(),
        "pendingClose": ws.pending_close(),
        "pendingLocation": ws.pending_location(),
        "hasUnsavedChanges": ws.tabs().has_unsaved_changes(),
        "welcome": WELCOME_MESSAGE,
    });
    format!(
        r#"<script id="notevault-state" type="application/json">{}</script>"#,
        script_json(&state)
    )
}

/// The full page for the active note, or the empty state when there is none.
pub fn render_app(ws: &Workspace, view: ViewMode, show_ai: bool) -> String {
    let main = match ws.active_note() {
        Some(note) => {
            let dirty = ws.tabs().is_dirty(&note.id);
            let pane = match view {
                ViewMode::Edit => format!(
                    r#"<div class="editor">
                        <input class="title-input" id="title-input" value="{title}">
                        <textarea id="content-input" spellcheck="false">{content}</textarea>
                    </div>"#,
                    title = html_escape(&note.title),
                    content = html_escape(&strip_title_header(&note.title, &note.content)),
                ),
                ViewMode::Preview => {
                    let notes_map: HashMap<String, _> = ws
                        .store()
                        .notes()
                        .iter()
                        .map(|n| (n.id.clone(), n.clone()))
                        .collect();
                    format!(
                        r#"<div class="preview">{}</div>"#,
                        render_preview(note, &notes_map)
                    )
                }
            };
            let assistant = if show_ai { assistant_panel() } else { String::new() };

            format!(
                r#"<div class="toolbar">
                    <span class="title">{title}</span>
                    <button class="btn" id="save-button" onclick="saveActive()"{disabled}>Save</button>
                    <a class="btn secondary" href="{edit}">Edit</a>
                    <a class="btn secondary" href="{preview}">Preview</a>
                    <a class="btn secondary" href="/api/notes/{id}/export?format=md">.md</a>
                    <a class="btn secondary" href="/api/notes/{id}/export?format=txt">.txt</a>
                    <a class="btn secondary" href="{ai}">{ai_label}</a>
                    <button class="btn secondary" onclick="openDialog('settings-dialog')">Settings</button>
                </div>
                {tabs}
                <div class="workspace">{pane}{assistant}</div>"#,
                title = html_escape(&note.title),
                disabled = if dirty { "" } else { " disabled" },
                edit = view_link(&note.id, ViewMode::Edit, show_ai),
                preview = view_link(&note.id, ViewMode::Preview, show_ai),
                id = html_escape(&note.id),
                ai = view_link(&note.id, view, !show_ai),
                ai_label = if show_ai { "Hide AI" } else { "AI" },
                tabs = tab_bar(ws),
                pane = pane,
                assistant = assistant,
            )
        }
        None => format!(
            r#"{tabs}<div class="empty-state">
                <h2>No Note Selected</h2>
                <p>Select a note from the sidebar or create a new one to get started</p>
                <button class="btn" onclick="newUnsavedNote()">Create New Note</button>
            </div>"#,
            tabs = tab_bar(ws),
        ),
    };

    let title = ws
        .active_note()
        .map(|n| n.title.clone())
        .unwrap_or_else(|| "NoteVault".to_string());

    let body = format!(
        r#"<div class="app">{sidebar}<main class="main">{main}</main></div>
        {dialogs}
        {settings}
        {state}
        <script>{script}</script>"#,
        sidebar = sidebar(ws),
        main = main,
        dialogs = dialogs(ws),
        settings = settings_dialog(ws),
        state = page_state(ws),
        script = APP_SCRIPT,
    );

    base_html(&title, &body, ws.settings())
}
