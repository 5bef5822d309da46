//! The root application object.
//!
//! A [`Workspace`] exclusively owns every collection: the note store, the tab
//! tracker, the settings slot and the pending dialog state. Everything else
//! reads snapshots and calls the operations below; nothing else mutates.

use crate::models::{
    ClipboardEntry, ClipboardKind, ClipboardOp, Folder, Note, NoteUpdate, Settings,
    SettingsUpdate, Tag, ROOT_FOLDER, UNSAVED_FOLDER,
};
use crate::notes::{ensure_title_header, retitle_content};
use crate::storage::{Slot, Storage, SETTINGS_KEY};
use crate::store::NoteStore;
use crate::tabs::{CloseRequest, TabState, TabTracker};
use serde::Serialize;
use tracing::{debug, info};

/// Where the UI should be showing after an operation.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum Navigation {
    Note(String),
    Empty,
}

impl Navigation {
    pub fn path(&self) -> String {
        match self {
            Navigation::Note(id) => format!("/notes/{}", urlencoding::encode(id)),
            Navigation::Empty => "/notes".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SaveOutcome {
    Saved,
    LocationRequired,
    NotFound,
}

/// One entry of the tab bar.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TabSummary {
    pub id: String,
    pub title: String,
    pub state: TabState,
}

/// Serializable view of the whole workspace.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub notes: Vec<Note>,
    pub folders: Vec<Folder>,
    pub tags: Vec<Tag>,
    pub open_note_ids: Vec<String>,
    pub unsaved_note_ids: Vec<String>,
    pub tabs: Vec<TabSummary>,
    pub active_note_id: Option<String>,
    pub clipboard: Option<ClipboardEntry>,
    pub settings: Settings,
    pub pending_close: Option<String>,
    pub pending_location: Option<String>,
    pub has_unsaved_changes: bool,
}

pub struct Workspace {
    store: NoteStore,
    tabs: TabTracker,
    settings: Slot<Settings>,
    active: Option<String>,
    pending_close: Option<String>,
    pending_location: Option<String>,
}

impl Workspace {
    pub fn open(storage: &Storage) -> Self {
        Self {
            store: NoteStore::open(storage),
            tabs: TabTracker::new(),
            settings: storage.slot(SETTINGS_KEY, Settings::default()),
            active: None,
            pending_close: None,
            pending_location: None,
        }
    }

    // ========================================================================
    // Read access
    // ========================================================================

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    pub fn tabs(&self) -> &TabTracker {
        &self.tabs
    }

    pub fn settings(&self) -> &Settings {
        self.settings.get()
    }

    pub fn note(&self, id: &str) -> Option<&Note> {
        self.store.get(id)
    }

    pub fn active_note(&self) -> Option<&Note> {
        self.active.as_deref().and_then(|id| self.store.get(id))
    }

    pub fn active_note_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Open tabs resolved to their current notes, with their clean/dirty state.
    pub fn open_tabs(&self) -> Vec<(&Note, TabState)> {
        self.tabs
            .open_ids()
            .iter()
            .filter_map(|id| self.store.get(id))
            .map(|note| (note, self.tabs.state(&note.id)))
            .collect()
    }

    pub fn pending_close(&self) -> Option<&str> {
        self.pending_close.as_deref()
    }

    pub fn pending_location(&self) -> Option<&str> {
        self.pending_location.as_deref()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            notes: self.store.notes().to_vec(),
            folders: self.store.folders().to_vec(),
            tags: self.store.tags().to_vec(),
            open_note_ids: self.tabs.open_ids().to_vec(),
            unsaved_note_ids: self.tabs.unsaved_ids().to_vec(),
            tabs: self
                .open_tabs()
                .into_iter()
                .map(|(note, state)| TabSummary {
                    id: note.id.clone(),
                    title: note.title.clone(),
                    state,
                })
                .collect(),
            active_note_id: self.active.clone(),
            clipboard: self.store.clipboard().cloned(),
            settings: self.settings.get().clone(),
            pending_close: self.pending_close.clone(),
            pending_location: self.pending_location.clone(),
            has_unsaved_changes: self.tabs.has_unsaved_changes(),
        }
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Make `id` the active note and open it as a tab.
    pub fn select(&mut self, id: &str) -> bool {
        if !self.store.contains(id) {
            return false;
        }
        self.tabs.open(id);
        self.active = Some(id.to_string());
        true
    }

    /// Target for a request that names no existing note.
    pub fn fallback(&self) -> Navigation {
        match self.store.notes().first() {
            Some(note) => Navigation::Note(note.id.clone()),
            None => Navigation::Empty,
        }
    }

    fn current(&self) -> Navigation {
        match &self.active {
            Some(id) => Navigation::Note(id.clone()),
            None => Navigation::Empty,
        }
    }

    /// After the active tab went away: last open tab, else nothing.
    fn fall_back_to_open_tab(&mut self) {
        self.active = self.tabs.last_open().map(str::to_string);
    }

    // ========================================================================
    // Notes
    // ========================================================================

    pub fn create_note(&mut self, folder: &str) -> Note {
        let note = self.store.create_note(folder);
        self.select(&note.id);
        note
    }

    /// New note with no location yet; it starts dirty and asks for a folder.
    pub fn create_unsaved_note(&mut self) -> Note {
        let note = self.store.create_note(UNSAVED_FOLDER);
        self.tabs.mark_dirty(&note.id);
        self.pending_location = Some(note.id.clone());
        self.select(&note.id);
        note
    }

    pub fn update_note(&mut self, id: &str, update: NoteUpdate) -> bool {
        let updated = self.store.update_note(id, update);
        if updated {
            self.tabs.mark_dirty(id);
        }
        updated
    }

    pub fn save_note(&mut self, id: &str) -> SaveOutcome {
        let Some(note) = self.store.get(id) else {
            return SaveOutcome::NotFound;
        };
        if !note.has_location() {
            debug!(id, "save deferred until a location is chosen");
            self.pending_location = Some(id.to_string());
            return SaveOutcome::LocationRequired;
        }
        self.tabs.mark_clean(id);
        self.store.touch(id);
        info!(id, "saved note");
        SaveOutcome::Saved
    }

    pub fn save_note_location(&mut self, id: &str, folder: &str) -> SaveOutcome {
        self.update_note(id, NoteUpdate::folder(folder));
        if self.pending_location.as_deref() == Some(id) {
            self.pending_location = None;
        }
        self.save_note(id)
    }

    /// Remove a note everywhere and return where the UI should go next.
    pub fn delete_note(&mut self, id: &str) -> Navigation {
        if self.store.delete_note(id).is_none() {
            return self.current();
        }
        self.tabs.discard(id);
        if self.pending_close.as_deref() == Some(id) {
            self.pending_close = None;
        }
        if self.pending_location.as_deref() == Some(id) {
            self.pending_location = None;
        }

        if self.active.as_deref() == Some(id) {
            self.active = self
                .tabs
                .last_open()
                .map(str::to_string)
                .or_else(|| self.store.notes().first().map(|n| n.id.clone()));
            if let Some(next) = self.active.clone() {
                self.tabs.open(&next);
            }
        }
        self.current()
    }

    /// Editor content change. The title header is kept at the top.
    pub fn edit_content(&mut self, id: &str, content: &str) -> bool {
        let Some(note) = self.store.get(id) else {
            return false;
        };
        let content = ensure_title_header(&note.title, content);
        self.update_note(id, NoteUpdate::content(content))
    }

    /// Rename a note and rewrite its leading `# title` line if present.
    pub fn rename_note(&mut self, id: &str, title: &str) -> bool {
        let Some(note) = self.store.get(id) else {
            return false;
        };
        let retitled = retitle_content(&note.title, title, &note.content);
        self.update_note(
            id,
            NoteUpdate {
                title: Some(title.to_string()),
                content: retitled,
                ..Default::default()
            },
        )
    }

    /// Append assistant output to a note, separated by a blank line.
    pub fn apply_generated(&mut self, id: &str, text: &str) -> bool {
        let Some(note) = self.store.get(id) else {
            return false;
        };
        let content = format!("{}\n\n{}", note.content, text);
        self.update_note(id, NoteUpdate::content(content))
    }

    // ========================================================================
    // Tabs
    // ========================================================================

    /// Close a tab, or hold it pending save/discard if it is dirty.
    pub fn close_tab(&mut self, id: &str) -> CloseRequest {
        let result = self.tabs.request_close(id);
        match result {
            CloseRequest::Closed => {
                if self.active.as_deref() == Some(id) {
                    self.fall_back_to_open_tab();
                }
            }
            CloseRequest::ConfirmationRequired => {
                self.pending_close = Some(id.to_string());
            }
            CloseRequest::NotOpen => {}
        }
        result
    }

    /// Resolve a pending close by saving first.
    pub fn save_and_close(&mut self) -> Option<SaveOutcome> {
        let id = self.pending_close.take()?;
        let outcome = self.save_note(&id);
        self.finish_close(&id);
        Some(outcome)
    }

    /// Resolve a pending close by dropping the edits flag.
    pub fn discard_and_close(&mut self) -> bool {
        let Some(id) = self.pending_close.take() else {
            return false;
        };
        self.tabs.mark_clean(&id);
        self.finish_close(&id);
        true
    }

    pub fn cancel_close(&mut self) {
        self.pending_close = None;
    }

    fn finish_close(&mut self, id: &str) {
        self.tabs.close(id);
        if self.active.as_deref() == Some(id) {
            self.fall_back_to_open_tab();
        }
    }

    // ========================================================================
    // Folders and clipboard
    // ========================================================================

    pub fn create_folder(&mut self, name: &str, parent: Option<&str>) -> Folder {
        self.store.create_folder(name, parent.unwrap_or(ROOT_FOLDER))
    }

    pub fn copy_note(&mut self, id: &str) {
        self.store.copy_note(id);
    }

    pub fn cut_note(&mut self, id: &str) {
        self.store.cut_note(id);
    }

    pub fn cut_folder(&mut self, id: &str) {
        self.store.cut_folder(id);
    }

    /// Paste a copied or cut note into `target`.
    ///
    /// A copy leaves the clipboard in place; a move clears it.
    pub fn paste_note(&mut self, target: &str) -> Option<Note> {
        let entry = self.store.clipboard()?.clone();
        if entry.kind != ClipboardKind::Note {
            return None;
        }
        self.store.get(&entry.id)?;

        match entry.operation {
            ClipboardOp::Copy => self.store.duplicate_note(&entry.id, target),
            ClipboardOp::Cut => {
                self.update_note(&entry.id, NoteUpdate::folder(target));
                self.store.clear_clipboard();
                self.store.get(&entry.id).cloned()
            }
        }
    }

    /// Paste a cut folder into `target`. The clipboard is cleared either way.
    pub fn paste_folder(&mut self, target: &str) -> bool {
        let Some(entry) = self.store.clipboard().cloned() else {
            return false;
        };
        if entry.kind != ClipboardKind::Folder {
            return false;
        }
        let moved = self.store.move_folder(&entry.id, target);
        self.store.clear_clipboard();
        moved
    }

    // ========================================================================
    // Settings
    // ========================================================================

    pub fn update_settings(&mut self, update: SettingsUpdate) -> Settings {
        self.settings.update(|settings| {
            if let Some(size) = update.font_size {
                settings.font_size = size;
            }
            if let Some(family) = update.font_family {
                settings.font_family = family;
            }
            settings.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace() -> Workspace {
        let storage = Storage::temporary().unwrap();
        Workspace::open(&storage)
    }

    #[test]
    fn test_create_note_becomes_active_tab() {
        let mut ws = workspace();
        let note = ws.create_note("/");
        assert_eq!(note.title, "Untitled Note");
        assert_eq!(note.content, "# Untitled Note");
        assert_eq!(ws.active_note_id(), Some(note.id.as_str()));
        assert_eq!(ws.tabs().state(&note.id), TabState::Clean);
    }

    #[test]
    fn test_tags_example() {
        let mut ws = workspace();
        let id = ws.create_note("/").id;
        ws.update_note(&id, NoteUpdate::content("#foo #bar #foo"));
        assert_eq!(ws.note(&id).unwrap().tags, vec!["foo", "bar"]);
        assert_eq!(ws.tabs().state(&id), TabState::Dirty);
    }

    #[test]
    fn test_update_unknown_marks_nothing() {
        let mut ws = workspace();
        assert!(!ws.update_note("ghost", NoteUpdate::title("x")));
        assert!(!ws.tabs().has_unsaved_changes());
    }

    #[test]
    fn test_unsaved_note_requires_location() {
        let mut ws = workspace();
        let note = ws.create_unsaved_note();
        assert_eq!(note.folder, UNSAVED_FOLDER);
        assert!(ws.tabs().is_dirty(&note.id));
        assert_eq!(ws.pending_location(), Some(note.id.as_str()));

        assert_eq!(ws.save_note(&note.id), SaveOutcome::LocationRequired);
        assert!(ws.tabs().is_dirty(&note.id));

        assert_eq!(ws.save_note_location(&note.id, "/projects"), SaveOutcome::Saved);
        assert_eq!(ws.note(&note.id).unwrap().folder, "/projects");
        assert!(!ws.tabs().is_dirty(&note.id));
        assert_eq!(ws.pending_location(), None);
    }

    #[test]
    fn test_save_refreshes_timestamp_and_cleans() {
        let mut ws = workspace();
        let id = ws.create_note("/").id;
        ws.update_note(&id, NoteUpdate::content("x"));
        let before = ws.note(&id).unwrap().updated_at;
        assert_eq!(ws.save_note(&id), SaveOutcome::Saved);
        assert!(ws.note(&id).unwrap().updated_at >= before);
        assert_eq!(ws.tabs().state(&id), TabState::Clean);
        assert_eq!(ws.save_note("ghost"), SaveOutcome::NotFound);
    }

    #[test]
    fn test_delete_only_open_note_falls_back_to_remaining() {
        let mut ws = workspace();
        let a = ws.create_note("/").id;
        let b = ws.create_note("/").id;
        ws.close_tab(&a);
        ws.close_tab(&b);
        let c = ws.create_note("/").id;
        assert_eq!(ws.tabs().open_ids(), &[c.clone()]);

        // welcome, a, b remain after deleting c
        let nav = ws.delete_note(&c);
        match nav {
            Navigation::Note(id) => assert!(ws.note(&id).is_some()),
            Navigation::Empty => panic!("expected a remaining note"),
        }
        assert!(ws.note(&c).is_none());
    }

    #[test]
    fn test_delete_prefers_last_open_tab() {
        let mut ws = workspace();
        let a = ws.create_note("/").id;
        let b = ws.create_note("/").id;
        ws.select(&a);
        let c = ws.create_note("/").id;
        ws.select(&c);
        assert_eq!(ws.delete_note(&c), Navigation::Note(b.clone()));
    }

    #[test]
    fn test_delete_last_note_goes_empty() {
        let mut ws = workspace();
        ws.select("welcome");
        assert_eq!(ws.delete_note("welcome"), Navigation::Empty);
        assert!(ws.active_note().is_none());
        assert_eq!(ws.fallback(), Navigation::Empty);
    }

    #[test]
    fn test_delete_clears_dirty_and_tab() {
        let mut ws = workspace();
        let id = ws.create_note("/").id;
        ws.update_note(&id, NoteUpdate::content("dirty"));
        ws.delete_note(&id);
        assert!(!ws.tabs().is_open(&id));
        assert!(!ws.tabs().has_unsaved_changes());
    }

    #[test]
    fn test_close_dirty_tab_keeps_note() {
        let mut ws = workspace();
        let id = ws.create_note("/").id;
        ws.update_note(&id, NoteUpdate::content("edit"));
        assert_eq!(ws.close_tab(&id), CloseRequest::ConfirmationRequired);
        assert_eq!(ws.pending_close(), Some(id.as_str()));
        assert!(ws.tabs().is_open(&id));

        assert!(ws.discard_and_close());
        assert!(!ws.tabs().is_open(&id));
        assert_eq!(ws.note(&id).unwrap().content, "edit");
        assert_eq!(ws.pending_close(), None);
    }

    #[test]
    fn test_save_and_close() {
        let mut ws = workspace();
        let first = ws.create_note("/").id;
        let id = ws.create_note("/").id;
        ws.update_note(&id, NoteUpdate::content("edit"));
        ws.close_tab(&id);
        assert_eq!(ws.save_and_close(), Some(SaveOutcome::Saved));
        assert!(!ws.tabs().is_open(&id));
        assert!(!ws.tabs().is_dirty(&id));
        assert_eq!(ws.active_note_id(), Some(first.as_str()));
        assert_eq!(ws.save_and_close(), None);
    }

    #[test]
    fn test_close_clean_active_tab_falls_back() {
        let mut ws = workspace();
        let a = ws.create_note("/").id;
        let b = ws.create_note("/").id;
        assert_eq!(ws.close_tab(&b), CloseRequest::Closed);
        assert_eq!(ws.active_note_id(), Some(a.as_str()));
        assert_eq!(ws.close_tab(&a), CloseRequest::Closed);
        assert_eq!(ws.active_note_id(), None);
        assert!(ws.note(&a).is_some());
    }

    #[test]
    fn test_reselect_does_not_reorder_tabs() {
        let mut ws = workspace();
        let a = ws.create_note("/").id;
        let b = ws.create_note("/").id;
        ws.select(&a);
        assert_eq!(ws.tabs().open_ids(), &[a, b]);
    }

    #[test]
    fn test_open_tabs_reflect_renames() {
        let mut ws = workspace();
        let id = ws.create_note("/").id;
        ws.rename_note(&id, "Plans");
        let open = ws.open_tabs();
        assert_eq!(open[0].0.title, "Plans");
        assert_eq!(open[0].0.content, "# Plans");
        assert_eq!(open[0].1, TabState::Dirty);
    }

    #[test]
    fn test_snapshot_lists_tab_states() {
        let mut ws = workspace();
        let a = ws.create_note("/").id;
        let b = ws.create_note("/").id;
        ws.edit_content(&b, "draft");
        let tabs = ws.snapshot().tabs;
        assert_eq!(
            tabs.iter().map(|t| (t.id.as_str(), t.state)).collect::<Vec<_>>(),
            vec![(a.as_str(), TabState::Clean), (b.as_str(), TabState::Dirty)]
        );
        assert_eq!(tabs[1].title, "Untitled Note");
    }

    #[test]
    fn test_edit_content_keeps_title_header() {
        let mut ws = workspace();
        let id = ws.create_note("/").id;
        ws.edit_content(&id, "just text #idea");
        let note = ws.note(&id).unwrap();
        assert_eq!(note.content, "# Untitled Note\n\njust text #idea");
        assert_eq!(note.tags, vec!["idea"]);
    }

    #[test]
    fn test_paste_after_copy() {
        let mut ws = workspace();
        let id = ws.create_note("/").id;
        ws.update_note(&id, NoteUpdate::content("# Untitled Note\nbody"));
        let source = ws.note(&id).unwrap().clone();
        let count = ws.store().notes().len();

        ws.copy_note(&id);
        let copy = ws.paste_note("/archive").unwrap();

        assert_eq!(ws.note(&id).unwrap(), &source);
        assert_eq!(ws.store().notes().len(), count + 1);
        assert_ne!(copy.id, id);
        assert_eq!(copy.title, "Untitled Note (Copy)");
        assert_eq!(copy.folder, "/archive");
        assert!(ws.store().clipboard().is_some());
    }

    #[test]
    fn test_paste_after_cut() {
        let mut ws = workspace();
        let id = ws.create_note("/").id;
        ws.save_note(&id);
        let source = ws.note(&id).unwrap().clone();
        let count = ws.store().notes().len();

        ws.cut_note(&id);
        let moved = ws.paste_note("/archive").unwrap();

        assert_eq!(moved.id, id);
        assert_eq!(moved.folder, "/archive");
        assert_eq!(moved.title, source.title);
        assert_eq!(moved.content, source.content);
        assert_eq!(moved.tags, source.tags);
        assert_eq!(ws.store().notes().len(), count);
        assert!(ws.store().clipboard().is_none());
    }

    #[test]
    fn test_cut_paste_same_folder_clears_clipboard() {
        let mut ws = workspace();
        let id = ws.create_note("/").id;
        ws.cut_note(&id);
        ws.paste_note("/");
        assert!(ws.store().clipboard().is_none());
    }

    #[test]
    fn test_paste_missing_source_is_noop() {
        let mut ws = workspace();
        ws.copy_note("ghost");
        let count = ws.store().notes().len();
        assert!(ws.paste_note("/").is_none());
        assert_eq!(ws.store().notes().len(), count);
    }

    #[test]
    fn test_cut_and_paste_folder() {
        let mut ws = workspace();
        let a = ws.create_folder("a", None);
        ws.create_folder("dest", None);
        let note = ws.create_note("/a");
        ws.cut_folder(&a.id);
        assert!(ws.paste_note("/dest").is_none());
        assert!(ws.paste_folder("/dest"));
        assert_eq!(ws.note(&note.id).unwrap().folder, "/dest/a");
        assert!(ws.store().clipboard().is_none());
    }

    #[test]
    fn test_apply_generated() {
        let mut ws = workspace();
        let id = ws.create_note("/").id;
        ws.apply_generated(&id, "extra");
        assert_eq!(ws.note(&id).unwrap().content, "# Untitled Note\n\nextra");
    }

    #[test]
    fn test_update_settings_is_partial() {
        let mut ws = workspace();
        let settings = ws.update_settings(SettingsUpdate {
            font_size: Some(18),
            font_family: None,
        });
        assert_eq!(settings.font_size, 18);
        assert_eq!(settings.font_family, "font-sans");
        assert_eq!(ws.settings(), &settings);
    }

    #[test]
    fn test_state_persists_across_reopen() {
        let storage = Storage::temporary().unwrap();
        let id = {
            let mut ws = Workspace::open(&storage);
            let id = ws.create_note("/").id;
            ws.update_note(&id, NoteUpdate::content("#kept"));
            ws.create_folder("work", None);
            id
        };
        let ws = Workspace::open(&storage);
        assert_eq!(ws.note(&id).unwrap().tags, vec!["kept"]);
        assert!(ws.store().folders().iter().any(|f| f.path == "/work"));
        assert!(ws.store().tags().iter().any(|t| t.name == "kept"));
        // Tabs and dirty flags are session state.
        assert!(ws.tabs().open_ids().is_empty());
    }
}
