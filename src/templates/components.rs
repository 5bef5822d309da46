//! Shared HTML components: base page, sidebar, tab bar and dialogs.

use crate::models::{ClipboardKind, ClipboardOp, Folder, Note, Settings, ROOT_FOLDER, UNSAVED_FOLDER};
use crate::notes::{html_escape, js_string};
use crate::tabs::TabState;
use crate::workspace::Workspace;

use super::styles::STYLE;

// ============================================================================
// Base HTML Template
// ============================================================================

pub fn base_html(title: &str, body: &str, settings: &Settings) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{style}</style>
</head>
<body class="{font_family}" style="font-size: {font_size}px">
{body}
</body>
</html>"#,
        title = html_escape(title),
        style = STYLE,
        font_family = html_escape(&settings.font_family),
        font_size = settings.font_size,
        body = body,
    )
}

// ============================================================================
// Sidebar
// ============================================================================

fn note_item(note: &Note, active_id: Option<&str>) -> String {
    let class = if Some(note.id.as_str()) == active_id {
        "note-link active"
    } else {
        "note-link"
    };
    format!(
        r#"<li><a class="{class}" href="/notes/{id}">{title}</a>
            <span class="actions">
                <button onclick="copyNote({id_js})">copy</button>
                <button onclick="cutNote({id_js})">cut</button>
                <button onclick="deleteNote({id_js})">delete</button>
            </span></li>"#,
        class = class,
        id = html_escape(&note.id),
        id_js = js_string(&note.id),
        title = html_escape(&note.title),
    )
}

fn folder_tree(ws: &Workspace, path: &str, active_id: Option<&str>) -> String {
    let store = ws.store();
    let mut html = String::from("<ul>");

    for folder in store.child_folders(path) {
        html.push_str(&folder_item(ws, folder, active_id));
    }
    for note in store.notes_in(path) {
        html.push_str(&note_item(note, active_id));
    }

    html.push_str("</ul>");
    html
}

fn folder_item(ws: &Workspace, folder: &Folder, active_id: Option<&str>) -> String {
    format!(
        r#"<li><span><span class="folder-name">{name}/</span>
            <span class="actions">
                <button onclick="newNote({path_js})">+ note</button>
                <button onclick="newFolder({path_js})">+ folder</button>
                <button onclick="pasteInto({path_js})">paste</button>
                <button onclick="cutFolder({id_js})">cut</button>
            </span></span>{children}</li>"#,
        name = html_escape(&folder.name),
        path_js = js_string(&folder.path),
        id_js = js_string(&folder.id),
        children = folder_tree(ws, &folder.path, active_id),
    )
}

fn clipboard_status(ws: &Workspace) -> String {
    let Some(entry) = ws.store().clipboard() else {
        return String::new();
    };
    let label = match entry.kind {
        ClipboardKind::Note => ws
            .note(&entry.id)
            .map(|n| n.title.clone())
            .unwrap_or_else(|| entry.id.clone()),
        ClipboardKind::Folder => ws
            .store()
            .folder(&entry.id)
            .map(|f| f.path.clone())
            .unwrap_or_else(|| entry.id.clone()),
    };
    let op = match entry.operation {
        ClipboardOp::Copy => "Copied",
        ClipboardOp::Cut => "Cut",
    };
    format!(
        r#"<div class="clipboard">{}: {}</div>"#,
        op,
        html_escape(&label)
    )
}

/// Each registered tag with the notes carrying it. Unused tags are skipped.
fn tag_groups(ws: &Workspace, active_id: Option<&str>) -> String {
    let store = ws.store();
    let groups: String = store
        .tags()
        .iter()
        .filter_map(|tag| {
            let tagged = store.notes_tagged(&tag.name);
            if tagged.is_empty() {
                return None;
            }
            let items: String = tagged.iter().map(|n| note_item(n, active_id)).collect();
            Some(format!(
                r#"<div class="tag-group"><span class="tag">#{name}</span> <span class="count">{count}</span><ul>{items}</ul></div>"#,
                name = html_escape(&tag.name),
                count = tagged.len(),
                items = items,
            ))
        })
        .collect();

    if groups.is_empty() {
        r#"<div class="clipboard">No tags found</div>"#.to_string()
    } else {
        groups
    }
}

pub fn sidebar(ws: &Workspace) -> String {
    let active_id = ws.active_note_id();
    let store = ws.store();

    let unplaced: String = store
        .notes_in(UNSAVED_FOLDER)
        .into_iter()
        .map(|n| note_item(n, active_id))
        .collect();
    let unplaced_html = if unplaced.is_empty() {
        String::new()
    } else {
        format!("<h3>Unsaved location</h3><ul>{}</ul>", unplaced)
    };

    let tags = tag_groups(ws, active_id);

    format!(
        r#"<aside class="sidebar">
            <form class="search-box" onsubmit="return runSearch(event)">
                <input type="text" id="search-input" placeholder="Search notes...">
            </form>
            <ul id="search-results"></ul>
            {clipboard}
            <h3>
                Notes
                <span class="actions" style="visibility: visible">
                    <button onclick="newNote(&quot;/&quot;)">+ note</button>
                    <button onclick="newFolder(&quot;/&quot;)">+ folder</button>
                    <button onclick="pasteInto(&quot;/&quot;)">paste</button>
                </span>
            </h3>
            {tree}
            {unplaced}
            <h3>Tags</h3>
            {tags}
        </aside>"#,
        clipboard = clipboard_status(ws),
        tree = folder_tree(ws, ROOT_FOLDER, active_id),
        unplaced = unplaced_html,
        tags = tags,
    )
}

// ============================================================================
// Tab Bar
// ============================================================================

pub fn tab_bar(ws: &Workspace) -> String {
    let active_id = ws.active_note_id();
    let mut html = String::from(r#"<div class="tab-bar">"#);

    for (note, state) in ws.open_tabs() {
        let active = if Some(note.id.as_str()) == active_id {
            " active"
        } else {
            ""
        };
        let dirty = if state == TabState::Dirty {
            r#"<span class="dirty" title="Unsaved changes">&#9679;</span>"#
        } else {
            ""
        };
        html.push_str(&format!(
            r#"<div class="tab{active}"><a href="/notes/{id}">{title}</a>{dirty}<button onclick="closeTab({id_js})" title="Close">&times;</button></div>"#,
            active = active,
            id = html_escape(&note.id),
            id_js = js_string(&note.id),
            title = html_escape(&note.title),
            dirty = dirty,
        ));
    }

    html.push_str(r#"<button class="tab" onclick="newUnsavedNote()" title="New tab">+</button></div>"#);
    html
}

// ============================================================================
// Dialogs
// ============================================================================

pub fn dialogs(ws: &Workspace) -> String {
    let options: String = ws
        .store()
        .folders()
        .iter()
        .map(|f| {
            format!(
                r#"<option value="{path}">{path}</option>"#,
                path = html_escape(&f.path)
            )
        })
        .collect();

    format!(
        r#"<div class="dialog-overlay" id="unsaved-dialog">
            <div class="dialog">
                <h2>Unsaved changes</h2>
                <p>This note has unsaved changes. Save before closing?</p>
                <div class="row">
                    <button class="btn secondary" onclick="cancelClose()">Cancel</button>
                    <button class="btn secondary" onclick="resolveClose('discard')">Discard</button>
                    <button class="btn" onclick="resolveClose('save')">Save</button>
                </div>
            </div>
        </div>
        <div class="dialog-overlay" id="location-dialog">
            <div class="dialog">
                <h2>Choose a location</h2>
                <select id="location-select">{options}</select>
                <div class="row">
                    <button class="btn secondary" onclick="closeDialog('location-dialog')">Cancel</button>
                    <button class="btn" onclick="saveLocation()">Save</button>
                </div>
            </div>
        </div>"#,
        options = options,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NoteUpdate;
    use crate::storage::Storage;

    #[test]
    fn test_tag_groups_list_notes_with_counts() {
        let mut ws = Workspace::open(&Storage::temporary().unwrap());
        let id = ws.create_note("/").id;
        ws.update_note(&id, NoteUpdate::content("#welcome #solo"));
        ws.update_note(&id, NoteUpdate::title("Tagged"));

        let html = tag_groups(&ws, None);
        assert!(html.contains(r##"<span class="tag">#welcome</span> <span class="count">2</span>"##));
        assert!(html.contains(r##"<span class="tag">#solo</span> <span class="count">1</span>"##));
        assert!(html.contains(&format!(r#"href="/notes/{}">Tagged</a>"#, id)));

        // "solo" stays registered but drops out once no note carries it.
        ws.update_note(&id, NoteUpdate::content("#welcome"));
        let html = tag_groups(&ws, None);
        assert!(!html.contains("#solo"));
        assert!(ws.store().tags().iter().any(|t| t.name == "solo"));
    }

    #[test]
    fn test_tag_groups_empty() {
        let mut ws = Workspace::open(&Storage::temporary().unwrap());
        ws.delete_note("welcome");
        assert!(tag_groups(&ws, None).contains("No tags found"));
    }
}
