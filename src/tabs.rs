//! Open tabs and the unsaved-changes flag.
//!
//! Tabs are stored as note ids in the order they were opened and resolved
//! against the note collection on read, so a tab always shows the current
//! title and content of its note.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TabState {
    NotOpen,
    Clean,
    Dirty,
}

/// Result of asking to close a tab.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CloseRequest {
    Closed,
    ConfirmationRequired,
    NotOpen,
}

#[derive(Debug, Default)]
pub struct TabTracker {
    open: Vec<String>,
    unsaved: Vec<String>,
}

impl TabTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_ids(&self) -> &[String] {
        &self.open
    }

    pub fn unsaved_ids(&self) -> &[String] {
        &self.unsaved
    }

    pub fn is_open(&self, id: &str) -> bool {
        self.open.iter().any(|o| o == id)
    }

    pub fn is_dirty(&self, id: &str) -> bool {
        self.unsaved.iter().any(|u| u == id)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        !self.unsaved.is_empty()
    }

    pub fn state(&self, id: &str) -> TabState {
        match (self.is_open(id), self.is_dirty(id)) {
            (false, _) => TabState::NotOpen,
            (true, false) => TabState::Clean,
            (true, true) => TabState::Dirty,
        }
    }

    /// Append `id` unless it is already open. Reselecting does not reorder.
    pub fn open(&mut self, id: &str) {
        if !self.is_open(id) {
            self.open.push(id.to_string());
        }
    }

    pub fn mark_dirty(&mut self, id: &str) {
        if !self.is_dirty(id) {
            self.unsaved.push(id.to_string());
        }
    }

    pub fn mark_clean(&mut self, id: &str) {
        self.unsaved.retain(|u| u != id);
    }

    /// Close a clean tab immediately; a dirty one needs save or discard first.
    pub fn request_close(&mut self, id: &str) -> CloseRequest {
        if !self.is_open(id) {
            CloseRequest::NotOpen
        } else if self.is_dirty(id) {
            CloseRequest::ConfirmationRequired
        } else {
            self.close(id);
            CloseRequest::Closed
        }
    }

    /// Drop the tab regardless of its dirty flag.
    pub fn close(&mut self, id: &str) {
        self.open.retain(|o| o != id);
    }

    /// Drop the tab and its pending edits flag.
    pub fn discard(&mut self, id: &str) {
        self.mark_clean(id);
        self.close(id);
    }

    pub fn last_open(&self) -> Option<&str> {
        self.open.last().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_dedupes_and_keeps_order() {
        let mut tabs = TabTracker::new();
        tabs.open("a");
        tabs.open("b");
        tabs.open("a");
        assert_eq!(tabs.open_ids(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_state_machine() {
        let mut tabs = TabTracker::new();
        assert_eq!(tabs.state("a"), TabState::NotOpen);
        tabs.open("a");
        assert_eq!(tabs.state("a"), TabState::Clean);
        tabs.mark_dirty("a");
        assert_eq!(tabs.state("a"), TabState::Dirty);
        tabs.mark_clean("a");
        assert_eq!(tabs.state("a"), TabState::Clean);
    }

    #[test]
    fn test_close_clean_tab_is_immediate() {
        let mut tabs = TabTracker::new();
        tabs.open("a");
        assert_eq!(tabs.request_close("a"), CloseRequest::Closed);
        assert!(!tabs.is_open("a"));
        assert_eq!(tabs.request_close("a"), CloseRequest::NotOpen);
    }

    #[test]
    fn test_close_dirty_tab_needs_confirmation() {
        let mut tabs = TabTracker::new();
        tabs.open("a");
        tabs.mark_dirty("a");
        assert_eq!(tabs.request_close("a"), CloseRequest::ConfirmationRequired);
        assert!(tabs.is_open("a"));

        tabs.discard("a");
        assert_eq!(tabs.state("a"), TabState::NotOpen);
        assert!(!tabs.has_unsaved_changes());
    }
}
