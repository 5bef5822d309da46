//! Note, folder and tag collections.
//!
//! The store owns the three persisted collections and the single-slot
//! clipboard. It knows nothing about tabs, dirty flags or navigation; those
//! are layered on top by [`crate::workspace::Workspace`].

use crate::models::{
    child_path, generate_id, parent_path, ClipboardEntry, ClipboardKind, ClipboardOp, Folder,
    Note, NoteUpdate, Tag, ROOT_FOLDER,
};
use crate::notes::{extract_tags, new_tag_names};
use crate::storage::{Slot, Storage, FOLDERS_KEY, NOTES_KEY, TAGS_KEY};
use chrono::Utc;
use tracing::{debug, info};

const WELCOME_CONTENT: &str = "# Welcome to NoteVault

This is a simple markdown note-taking app.

## Features

- Markdown editing with live preview
- Folders and tags for organization
- AI Assistant side panel

## How to use

1. Create new notes using the + button next to folders
2. Edit your notes in the editor
3. Switch to preview mode to see the rendered markdown
4. Organize your notes in the sidebar
5. Use the AI assistant to help with your notes

## Linking

You can link to other notes using double brackets: [[welcome]]

## Tags

You can add tags to your notes using #tag syntax.
";

// ============================================================================
// Seeds
// ============================================================================

pub fn seed_notes() -> Vec<Note> {
    let now = Utc::now();
    vec![Note {
        id: "welcome".to_string(),
        title: "Welcome to NoteVault".to_string(),
        content: WELCOME_CONTENT.to_string(),
        created_at: now,
        updated_at: now,
        folder: ROOT_FOLDER.to_string(),
        tags: vec!["welcome".to_string(), "tutorial".to_string()],
    }]
}

pub fn seed_folders() -> Vec<Folder> {
    vec![Folder::root()]
}

pub fn seed_tags() -> Vec<Tag> {
    ["welcome", "tutorial"]
        .iter()
        .map(|name| Tag {
            id: name.to_string(),
            name: name.to_string(),
        })
        .collect()
}

// ============================================================================
// Store
// ============================================================================

pub struct NoteStore {
    notes: Slot<Vec<Note>>,
    folders: Slot<Vec<Folder>>,
    tags: Slot<Vec<Tag>>,
    clipboard: Option<ClipboardEntry>,
}

impl NoteStore {
    pub fn open(storage: &Storage) -> Self {
        Self {
            notes: storage.slot(NOTES_KEY, seed_notes()),
            folders: storage.slot(FOLDERS_KEY, seed_folders()),
            tags: storage.slot(TAGS_KEY, seed_tags()),
            clipboard: None,
        }
    }

    pub fn notes(&self) -> &[Note] {
        self.notes.get()
    }

    pub fn folders(&self) -> &[Folder] {
        self.folders.get()
    }

    pub fn tags(&self) -> &[Tag] {
        self.tags.get()
    }

    pub fn clipboard(&self) -> Option<&ClipboardEntry> {
        self.clipboard.as_ref()
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.get().iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    fn fresh_note_id(&self) -> String {
        loop {
            let id = generate_id();
            if !self.contains(&id) {
                return id;
            }
        }
    }

    // ------------------------------------------------------------------------
    // Notes
    // ------------------------------------------------------------------------

    /// Append a placeholder note in `folder`.
    pub fn create_note(&mut self, folder: &str) -> Note {
        let note = Note::untitled(self.fresh_note_id(), folder);
        self.notes.update(|notes| notes.push(note.clone()));
        info!(id = %note.id, folder, "created note");
        note
    }

    /// Apply the present fields of `update`. Returns false for an unknown id.
    pub fn update_note(&mut self, id: &str, update: NoteUpdate) -> bool {
        let Some(existing) = self.get(id) else {
            debug!(id, "update for unknown note ignored");
            return false;
        };

        let derived = update.content.as_deref().map(extract_tags);
        let tags = update
            .tags
            .clone()
            .or(derived)
            .unwrap_or_else(|| existing.tags.clone());
        if update.content.is_some() || update.tags.is_some() {
            self.register_tags(&tags);
        }

        self.notes.update(|notes| {
            if let Some(note) = notes.iter_mut().find(|n| n.id == id) {
                if let Some(title) = update.title {
                    note.title = title;
                }
                if let Some(content) = update.content {
                    note.content = content;
                }
                if let Some(folder) = update.folder {
                    note.folder = folder;
                }
                note.tags = tags;
                note.updated_at = Utc::now();
            }
        });
        true
    }

    /// Refresh `updated_at`. Returns false for an unknown id.
    pub fn touch(&mut self, id: &str) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.notes.update(|notes| {
            if let Some(note) = notes.iter_mut().find(|n| n.id == id) {
                note.updated_at = Utc::now();
            }
        });
        true
    }

    pub fn delete_note(&mut self, id: &str) -> Option<Note> {
        let idx = self.notes.get().iter().position(|n| n.id == id)?;
        let removed = self.notes.update(|notes| notes.remove(idx));
        info!(id, "deleted note");
        Some(removed)
    }

    /// Union `names` into the global tag registry.
    fn register_tags(&mut self, names: &[String]) {
        let fresh: Vec<Tag> = new_tag_names(self.tags.get(), names)
            .into_iter()
            .map(|name| Tag {
                id: generate_id(),
                name: name.clone(),
            })
            .collect();
        if !fresh.is_empty() {
            debug!(count = fresh.len(), "registering new tags");
            self.tags.update(|tags| tags.extend(fresh));
        }
    }

    // ------------------------------------------------------------------------
    // Folders
    // ------------------------------------------------------------------------

    /// Append a folder called `name` under `parent`. Paths are not deduplicated.
    pub fn create_folder(&mut self, name: &str, parent: &str) -> Folder {
        let folder = Folder {
            id: generate_id(),
            name: name.to_string(),
            path: child_path(parent, name),
        };
        self.folders.update(|folders| folders.push(folder.clone()));
        info!(path = %folder.path, "created folder");
        folder
    }

    pub fn folder(&self, id: &str) -> Option<&Folder> {
        self.folders.get().iter().find(|f| f.id == id)
    }

    /// Folders whose parent is `path`.
    pub fn child_folders(&self, path: &str) -> Vec<&Folder> {
        self.folders
            .get()
            .iter()
            .filter(|f| f.path != ROOT_FOLDER && parent_path(&f.path).as_deref() == Some(path))
            .collect()
    }

    pub fn notes_in(&self, path: &str) -> Vec<&Note> {
        self.notes.get().iter().filter(|n| n.folder == path).collect()
    }

    /// Notes carrying the tag `name`, in collection order.
    pub fn notes_tagged(&self, name: &str) -> Vec<&Note> {
        self.notes
            .get()
            .iter()
            .filter(|n| n.tags.iter().any(|t| t == name))
            .collect()
    }

    // ------------------------------------------------------------------------
    // Clipboard
    // ------------------------------------------------------------------------

    pub fn copy_note(&mut self, id: &str) {
        self.set_clipboard(ClipboardKind::Note, id, ClipboardOp::Copy);
    }

    pub fn cut_note(&mut self, id: &str) {
        self.set_clipboard(ClipboardKind::Note, id, ClipboardOp::Cut);
    }

    pub fn cut_folder(&mut self, id: &str) {
        self.set_clipboard(ClipboardKind::Folder, id, ClipboardOp::Cut);
    }

    fn set_clipboard(&mut self, kind: ClipboardKind, id: &str, operation: ClipboardOp) {
        self.clipboard = Some(ClipboardEntry {
            kind,
            id: id.to_string(),
            operation,
        });
    }

    pub fn clear_clipboard(&mut self) {
        self.clipboard = None;
    }

    /// Duplicate a note into `folder` with a fresh id and a " (Copy)" title.
    pub fn duplicate_note(&mut self, id: &str, folder: &str) -> Option<Note> {
        let source = self.get(id)?;
        let now = Utc::now();
        let copy = Note {
            id: self.fresh_note_id(),
            title: format!("{} (Copy)", source.title),
            folder: folder.to_string(),
            created_at: now,
            updated_at: now,
            ..source.clone()
        };
        self.notes.update(|notes| notes.push(copy.clone()));
        info!(source = id, id = %copy.id, folder, "duplicated note");
        Some(copy)
    }

    /// Re-root the folder `id` and everything beneath it under `target`.
    ///
    /// Returns false when the folder is unknown, is the root, or `target` lies
    /// inside the subtree being moved.
    pub fn move_folder(&mut self, id: &str, target: &str) -> bool {
        let Some(folder) = self.folder(id) else {
            return false;
        };
        let old_path = folder.path.clone();
        if old_path == ROOT_FOLDER || is_within(target, &old_path) {
            return false;
        }
        let new_path = child_path(target, &folder.name);

        self.folders.update(|folders| {
            for f in folders.iter_mut() {
                if let Some(moved) = rebase(&f.path, &old_path, &new_path) {
                    f.path = moved;
                }
            }
        });
        let now = Utc::now();
        self.notes.update(|notes| {
            for n in notes.iter_mut() {
                if let Some(moved) = rebase(&n.folder, &old_path, &new_path) {
                    n.folder = moved;
                    n.updated_at = now;
                }
            }
        });
        info!(from = %old_path, to = %new_path, "moved folder");
        true
    }
}

/// Whether `path` equals `ancestor` or lies beneath it.
fn is_within(path: &str, ancestor: &str) -> bool {
    path == ancestor
        || path
            .strip_prefix(ancestor)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn rebase(path: &str, old: &str, new: &str) -> Option<String> {
    if is_within(path, old) {
        Some(format!("{}{}", new, &path[old.len()..]))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> NoteStore {
        let storage = Storage::temporary().unwrap();
        NoteStore::open(&storage)
    }

    #[test]
    fn test_seeded_on_first_open() {
        let store = store();
        assert_eq!(store.notes().len(), 1);
        assert_eq!(store.notes()[0].id, "welcome");
        assert_eq!(store.folders(), &[Folder::root()][..]);
        assert_eq!(store.tags().len(), 2);
    }

    #[test]
    fn test_create_update_delete_keeps_unique_ids() {
        let mut store = store();
        let mut created = Vec::new();
        for _ in 0..20 {
            created.push(store.create_note("/").id);
        }
        for id in created.iter().step_by(3) {
            assert!(store.update_note(id, NoteUpdate::content("#x body")));
        }
        let deleted: Vec<_> = created.iter().skip(1).step_by(2).cloned().collect();
        for id in &deleted {
            assert!(store.delete_note(id).is_some());
        }

        let mut expected: Vec<_> = created
            .iter()
            .filter(|id| !deleted.contains(*id))
            .cloned()
            .collect();
        expected.insert(0, "welcome".to_string());
        let actual: Vec<_> = store.notes().iter().map(|n| n.id.clone()).collect();
        assert_eq!(actual, expected);

        let unique: std::collections::HashSet<_> = actual.iter().collect();
        assert_eq!(unique.len(), actual.len());
    }

    #[test]
    fn test_update_derives_tags_and_registers_them() {
        let mut store = store();
        let id = store.create_note("/").id;
        store.update_note(&id, NoteUpdate::content("#foo #bar #foo"));
        assert_eq!(store.get(&id).unwrap().tags, vec!["foo", "bar"]);
        let names: Vec<_> = store.tags().iter().map(|t| t.name.as_str()).collect();
        assert!(names.contains(&"foo"));
        assert!(names.contains(&"bar"));

        // Re-deriving from the same content changes nothing.
        let before = store.tags().len();
        store.update_note(&id, NoteUpdate::content("#foo #bar #foo"));
        assert_eq!(store.get(&id).unwrap().tags, vec!["foo", "bar"]);
        assert_eq!(store.tags().len(), before);
    }

    #[test]
    fn test_explicit_tags_override_derived() {
        let mut store = store();
        let id = store.create_note("/").id;
        store.update_note(
            &id,
            NoteUpdate {
                content: Some("#derived".into()),
                tags: Some(vec!["manual".into()]),
                ..Default::default()
            },
        );
        assert_eq!(store.get(&id).unwrap().tags, vec!["manual"]);
    }

    #[test]
    fn test_update_only_touches_present_fields() {
        let mut store = store();
        let id = store.create_note("/").id;
        store.update_note(&id, NoteUpdate::content("#keep"));
        store.update_note(&id, NoteUpdate::title("Renamed"));
        let note = store.get(&id).unwrap();
        assert_eq!(note.title, "Renamed");
        assert_eq!(note.content, "#keep");
        assert_eq!(note.folder, "/");
        assert_eq!(note.tags, vec!["keep"]);
    }

    #[test]
    fn test_update_unknown_is_noop() {
        let mut store = store();
        let before = store.notes().to_vec();
        assert!(!store.update_note("nope", NoteUpdate::title("x")));
        assert_eq!(store.notes(), &before[..]);
    }

    #[test]
    fn test_create_folder_paths() {
        let mut store = store();
        let work = store.create_folder("work", "/");
        let year = store.create_folder("2024", &work.path);
        assert_eq!(work.path, "/work");
        assert_eq!(year.path, "/work/2024");
        // Duplicates are allowed.
        store.create_folder("work", "/");
        assert_eq!(store.child_folders("/").len(), 2);
        assert_eq!(store.child_folders("/work").len(), 1);
    }

    #[test]
    fn test_notes_tagged() {
        let mut store = store();
        let a = store.create_note("/").id;
        let b = store.create_note("/work").id;
        store.update_note(&a, NoteUpdate::content("#rust #idea"));
        store.update_note(&b, NoteUpdate::content("#rust"));

        let rust: Vec<_> = store.notes_tagged("rust").iter().map(|n| n.id.clone()).collect();
        assert_eq!(rust, vec![a.clone(), b]);
        assert_eq!(store.notes_tagged("idea").len(), 1);
        assert_eq!(store.notes_tagged("Rust").len(), 0);

        // Registered tags outlive the notes that used them.
        store.update_note(&a, NoteUpdate::content("plain"));
        assert!(store.notes_tagged("idea").is_empty());
        assert!(store.tags().iter().any(|t| t.name == "idea"));
    }

    #[test]
    fn test_duplicate_note() {
        let mut store = store();
        let id = store.create_note("/").id;
        store.update_note(&id, NoteUpdate::content("body #t"));
        let copy = store.duplicate_note(&id, "/other").unwrap();
        assert_ne!(copy.id, id);
        assert_eq!(copy.title, "Untitled Note (Copy)");
        assert_eq!(copy.folder, "/other");
        assert_eq!(copy.content, "body #t");
        assert_eq!(copy.tags, vec!["t"]);
        assert_eq!(store.get(&id).unwrap().folder, "/");
    }

    #[test]
    fn test_move_folder_rebases_subtree() {
        let mut store = store();
        let a = store.create_folder("a", "/");
        let b = store.create_folder("b", "/a");
        let dest = store.create_folder("dest", "/");
        let note = store.create_note("/a/b");
        let outside = store.create_note("/ab");

        assert!(store.move_folder(&a.id, &dest.path));
        assert_eq!(store.folder(&a.id).unwrap().path, "/dest/a");
        assert_eq!(store.folder(&b.id).unwrap().path, "/dest/a/b");
        assert_eq!(store.get(&note.id).unwrap().folder, "/dest/a/b");
        assert_eq!(store.get(&outside.id).unwrap().folder, "/ab");
    }

    #[test]
    fn test_move_folder_into_itself_rejected() {
        let mut store = store();
        let a = store.create_folder("a", "/");
        store.create_folder("b", "/a");
        assert!(!store.move_folder(&a.id, "/a/b"));
        assert!(!store.move_folder(&a.id, "/a"));
        assert!(!store.move_folder("root", "/a"));
        assert_eq!(store.folder(&a.id).unwrap().path, "/a");
    }

    #[test]
    fn test_clipboard_holds_one_entry() {
        let mut store = store();
        store.copy_note("one");
        store.cut_note("two");
        let entry = store.clipboard().unwrap();
        assert_eq!(entry.id, "two");
        assert_eq!(entry.operation, ClipboardOp::Cut);
        store.clear_clipboard();
        assert!(store.clipboard().is_none());
    }
}
