//! Note content processing.
//!
//! This module handles everything derived from a note's markdown text:
//! - Tag extraction (`#word` tokens)
//! - Title header sync between the title field and the leading `# title` line
//! - Wiki-link (`[[note-id]]`) resolution and markdown rendering
//! - Sidebar search
//! - Export file naming

use crate::models::{Note, Tag};
use pulldown_cmark::{Options, Parser};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

// ============================================================================
// Tag Extraction
// ============================================================================

fn tag_regex() -> &'static Regex {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    TAG_RE.get_or_init(|| Regex::new(r"#(\w+)").expect("tag pattern is valid"))
}

/// Extract tag names from markdown text.
///
/// A tag is `#` followed by one or more word characters. The result holds each
/// case-sensitive tag body once, in order of first occurrence.
pub fn extract_tags(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tag_regex()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Tags in `names` that are missing from `registry`.
pub fn new_tag_names<'a>(registry: &[Tag], names: &'a [String]) -> Vec<&'a String> {
    names
        .iter()
        .filter(|name| !registry.iter().any(|t| &t.name == *name))
        .collect()
}

// ============================================================================
// Title Header Sync
// ============================================================================

pub fn title_header(title: &str) -> String {
    format!("# {}", title)
}

/// Make sure editor content still begins with the note's title header.
pub fn ensure_title_header(title: &str, content: &str) -> String {
    let header = title_header(title);
    if content.starts_with(&header) {
        content.to_string()
    } else {
        format!("{}\n\n{}", header, content)
    }
}

/// Editor text for a note: the content without its leading title header.
pub fn strip_title_header(title: &str, content: &str) -> String {
    match content.strip_prefix(&title_header(title)) {
        Some(rest) => rest.trim().to_string(),
        None => content.to_string(),
    }
}

/// Rewrite the leading title header after a rename.
///
/// Returns `None` when the content does not start with the old header.
pub fn retitle_content(old_title: &str, new_title: &str, content: &str) -> Option<String> {
    let old_header = title_header(old_title);
    content
        .strip_prefix(&old_header)
        .map(|rest| format!("{}{}", title_header(new_title), rest))
}

// ============================================================================
// Wiki Links
// ============================================================================

fn wikilink_regex() -> &'static Regex {
    static LINK_RE: OnceLock<Regex> = OnceLock::new();
    LINK_RE.get_or_init(|| Regex::new(r"\[\[(.*?)\]\]").expect("wikilink pattern is valid"))
}

/// Replace `[[note-id]]` with a link to the note. Unknown ids are left as-is.
pub fn process_wikilinks(content: &str, notes: &HashMap<String, Note>) -> String {
    wikilink_regex()
        .replace_all(content, |caps: &regex::Captures| match notes.get(&caps[1]) {
            Some(note) => format!(
                r#"<a href="/notes/{}" title="{}">{}</a>"#,
                urlencoding::encode(&note.id),
                html_escape(&note.title),
                html_escape(&note.title)
            ),
            None => caps[0].to_string(),
        })
        .into_owned()
}

// ============================================================================
// Text Escaping
// ============================================================================

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// A JS string literal safe to place inside a double-quoted HTML attribute.
pub fn js_string(s: &str) -> String {
    html_escape(&serde_json::Value::String(s.to_string()).to_string())
}

/// JSON for an inline `<script>` data block.
pub fn script_json(value: &serde_json::Value) -> String {
    value.to_string().replace("</", "<\\/")
}

// ============================================================================
// Markdown Rendering
// ============================================================================

pub fn render_markdown(content: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

    let parser = Parser::new_ext(content, options);
    let mut html_output = String::new();
    pulldown_cmark::html::push_html(&mut html_output, parser);
    // Raw HTML in markdown is untrusted
    ammonia::clean(&html_output)
}

/// Render a note for the preview pane, resolving wiki links first.
pub fn render_preview(note: &Note, notes: &HashMap<String, Note>) -> String {
    render_markdown(&process_wikilinks(&note.content, notes))
}

// ============================================================================
// Search
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase", tag = "field", content = "text")]
pub enum SearchMatch {
    Title(String),
    Tag(String),
    Line(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub matches: Vec<SearchMatch>,
}

/// Case-insensitive match against title, content and tags.
pub fn search_notes(notes: &[Note], query: &str) -> Vec<SearchResult> {
    use rayon::prelude::*;

    let query_lower = query.to_lowercase();
    if query_lower.is_empty() {
        return Vec::new();
    }

    notes
        .par_iter()
        .filter_map(|note| {
            let mut matches = Vec::new();

            if note.title.to_lowercase().contains(&query_lower) {
                matches.push(SearchMatch::Title(note.title.clone()));
            }

            for tag in &note.tags {
                if tag.to_lowercase().contains(&query_lower) {
                    matches.push(SearchMatch::Tag(tag.clone()));
                }
            }

            for line in note.content.lines() {
                if line.to_lowercase().contains(&query_lower) {
                    matches.push(SearchMatch::Line(line.to_string()));
                }
            }

            if matches.is_empty() {
                None
            } else {
                Some(SearchResult {
                    id: note.id.clone(),
                    title: note.title.clone(),
                    matches,
                })
            }
        })
        .collect()
}

// ============================================================================
// Export
// ============================================================================

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Txt,
    #[default]
    Md,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Md => "md",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Txt => "text/plain; charset=utf-8",
            ExportFormat::Md => "text/markdown; charset=utf-8",
        }
    }
}

pub fn export_filename(note: &Note, format: ExportFormat) -> String {
    format!("{}.{}", note.title, format.extension())
}
