//! Data models for the notes application.
//!
//! This module contains the core data structures shared by the store, the
//! tab tracker, the assistant panel and the HTTP layer: notes, folders, tags,
//! settings, partial updates and the clipboard.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Folder value meaning "location not chosen yet".
pub const UNSAVED_FOLDER: &str = "unsaved";

/// The implicit root folder path.
pub const ROOT_FOLDER: &str = "/";

pub const DEFAULT_NOTE_TITLE: &str = "Untitled Note";

// ============================================================================
// Core Note Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub folder: String,
    pub tags: Vec<String>,
}

impl Note {
    /// A fresh placeholder note in `folder`.
    pub fn untitled(id: String, folder: &str) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: DEFAULT_NOTE_TITLE.to_string(),
            content: format!("# {}", DEFAULT_NOTE_TITLE),
            created_at: now,
            updated_at: now,
            folder: folder.to_string(),
            tags: Vec::new(),
        }
    }

    pub fn has_location(&self) -> bool {
        self.folder != UNSAVED_FOLDER
    }
}

/// Partial update for a note. Each field is applied only when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NoteUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl NoteUpdate {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn folder(folder: impl Into<String>) -> Self {
        Self {
            folder: Some(folder.into()),
            ..Default::default()
        }
    }
}

// ============================================================================
// Folders and Tags
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub path: String,
}

impl Folder {
    pub fn root() -> Self {
        Self {
            id: "root".to_string(),
            name: ROOT_FOLDER.to_string(),
            path: ROOT_FOLDER.to_string(),
        }
    }
}

/// Parent of a slash-delimited folder path: "/a" -> "/", "/a/b" -> "/a".
pub fn parent_path(path: &str) -> Option<String> {
    if path == ROOT_FOLDER {
        return None;
    }
    match path.rfind('/') {
        Some(0) => Some(ROOT_FOLDER.to_string()),
        Some(idx) => Some(path[..idx].to_string()),
        None => Some(ROOT_FOLDER.to_string()),
    }
}

/// Path of a child folder called `name` under `parent`.
pub fn child_path(parent: &str, name: &str) -> String {
    if parent == ROOT_FOLDER {
        format!("/{}", name)
    } else {
        format!("{}/{}", parent, name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    pub id: String,
    pub name: String,
}

// ============================================================================
// Settings
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub font_size: u32,
    pub font_family: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            font_size: 16,
            font_family: "font-sans".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[serde(default)]
    pub font_size: Option<u32>,
    #[serde(default)]
    pub font_family: Option<String>,
}

// ============================================================================
// Clipboard
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClipboardKind {
    Note,
    Folder,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClipboardOp {
    Copy,
    Cut,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClipboardEntry {
    #[serde(rename = "type")]
    pub kind: ClipboardKind,
    pub id: String,
    pub operation: ClipboardOp,
}

// ============================================================================
// Assistant
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NoteExcerpt {
    pub id: String,
    pub title: String,
    pub content: String,
}

impl From<&Note> for NoteExcerpt {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id.clone(),
            title: note.title.clone(),
            content: note.content.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssistantContext {
    #[serde(default)]
    pub notes: Vec<NoteExcerpt>,
    #[serde(default)]
    pub current_note_id: Option<String>,
}

// ============================================================================
// Id Generation
// ============================================================================

/// Random lowercase alphanumeric identifier.
pub fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(12)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_path() {
        assert_eq!(parent_path("/"), None);
        assert_eq!(parent_path("/work"), Some("/".to_string()));
        assert_eq!(parent_path("/work/2024"), Some("/work".to_string()));
    }

    #[test]
    fn test_child_path() {
        assert_eq!(child_path("/", "work"), "/work");
        assert_eq!(child_path("/work", "2024"), "/work/2024");
    }

    #[test]
    fn test_note_serializes_camel_case() {
        let note = Note::untitled("abc".into(), "/");
        let json = serde_json::to_value(&note).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert_eq!(json["content"], "# Untitled Note");
    }

    #[test]
    fn test_clipboard_entry_wire_format() {
        let entry = ClipboardEntry {
            kind: ClipboardKind::Note,
            id: "n1".into(),
            operation: ClipboardOp::Cut,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "note");
        assert_eq!(json["operation"], "cut");
    }

    #[test]
    fn test_generate_id_shape() {
        let id = generate_id();
        assert_eq!(id.len(), 12);
        assert!(id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_ne!(generate_id(), id);
    }
}
