//! AI assistant: prompt assembly and completion providers.
//!
//! The panel sends the conversation plus a context blob describing the
//! user's notes. Here that becomes a [`CompletionRequest`], handed to a
//! [`CompletionProvider`] which answers with a stream of text fragments.
//!
//! Two providers exist:
//! - [`GeminiProvider`] streams from Google's `streamGenerateContent` endpoint
//! - [`MockProvider`] types out one of a few canned answers, used when no API
//!   key is configured

use crate::config::Config;
use crate::error::AssistantError;
use crate::models::{AssistantContext, ChatMessage, Role};
use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub type TextStream = BoxStream<'static, Result<String, AssistantError>>;

pub const WELCOME_MESSAGE: &str =
    "Hi! I'm your AI assistant. I can help you with your notes. What would you like to do?";

/// Characters of each note included in the context preamble.
pub const EXCERPT_CHARS: usize = 500;

pub const MOCK_RESPONSES: [&str; 5] = [
    "I'm a mock AI assistant. The real assistant requires a Google AI API key.",
    "This is a simulated response. To enable the full AI assistant, please add your GOOGLE_AI_API_KEY to the environment variables.",
    "I can't actually analyze your notes without the API key, but the UI is fully functional.",
    "You can explore the AI assistant interface, but responses are pre-defined without the API key.",
    "This is a placeholder response. The real AI would provide helpful insights about your notes.",
];

// ============================================================================
// Prompt Assembly
// ============================================================================

/// One-click prompts offered by the panel's tools tab.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AssistantTool {
    Summarize,
    Expand,
    Ideas,
    Outline,
}

impl AssistantTool {
    pub fn prompt(self, note_title: &str) -> String {
        match self {
            AssistantTool::Summarize => format!(
                "Please summarize the current note titled \"{}\" into a concise paragraph.",
                note_title
            ),
            AssistantTool::Expand => format!(
                "Please expand on the current note titled \"{}\" with more details and examples.",
                note_title
            ),
            AssistantTool::Ideas => format!(
                "Based on my note titled \"{}\", suggest 5 related ideas or topics I could explore.",
                note_title
            ),
            AssistantTool::Outline => format!(
                "Create a detailed outline for a comprehensive note on the topic of \"{}\".",
                note_title
            ),
        }
    }
}

fn excerpt(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Describe the user's notes for the model, marking the one being edited.
pub fn build_context_preamble(context: &AssistantContext) -> String {
    let mut out = String::from(
        "You are a helpful assistant inside a markdown note-taking app. \
         Use the user's notes below as context when answering.\n",
    );

    let current = context
        .current_note_id
        .as_deref()
        .and_then(|id| context.notes.iter().find(|n| n.id == id));
    if let Some(note) = current {
        out.push_str(&format!(
            "\nThe user is currently viewing the note \"{}\" (id: {}).\n",
            note.title, note.id
        ));
    }

    if !context.notes.is_empty() {
        out.push_str("\nNotes:\n");
        for note in &context.notes {
            out.push_str(&format!(
                "\n### {} (id: {})\n{}\n",
                note.title,
                note.id,
                excerpt(&note.content, EXCERPT_CHARS)
            ));
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Context preamble followed by the latest user message.
    pub prompt: String,
    /// Earlier turns, oldest first.
    pub conversation: Vec<ChatMessage>,
    pub context: AssistantContext,
}

impl CompletionRequest {
    /// Split `messages` into history and the latest user turn.
    pub fn new(messages: &[ChatMessage], context: AssistantContext) -> Self {
        let latest = messages.iter().rposition(|m| m.role == Role::User);
        let (conversation, question) = match latest {
            Some(idx) => (messages[..idx].to_vec(), messages[idx].content.as_str()),
            None => (messages.to_vec(), ""),
        };
        let prompt = format!(
            "{}\nUser message:\n{}",
            build_context_preamble(&context),
            question
        );
        Self {
            prompt,
            conversation,
            context,
        }
    }
}

// ============================================================================
// Providers
// ============================================================================

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn complete(&self, request: CompletionRequest) -> Result<TextStream, AssistantError>;
}

pub fn provider_from_config(config: &Config) -> Arc<dyn CompletionProvider> {
    match &config.api_key {
        Some(key) => Arc::new(GeminiProvider::new(
            key.clone(),
            config.model.clone(),
            config.api_base.clone(),
        )),
        None => Arc::new(MockProvider::new(config.mock_delay)),
    }
}

// ----------------------------------------------------------------------------
// Mock
// ----------------------------------------------------------------------------

pub struct MockProvider {
    delay: Duration,
}

impl MockProvider {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Emit `text` one character at a time, pausing after each.
    pub fn type_out(text: &'static str, delay: Duration) -> TextStream {
        stream::unfold(text.chars(), move |mut chars| async move {
            let c = chars.next()?;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Some((Ok(c.to_string()), chars))
        })
        .boxed()
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<TextStream, AssistantError> {
        let text = MOCK_RESPONSES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(MOCK_RESPONSES[0]);
        debug!(len = text.len(), "streaming mock response");
        Ok(Self::type_out(text, self.delay))
    }
}

// ----------------------------------------------------------------------------
// Gemini
// ----------------------------------------------------------------------------

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiChunk {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
}

fn gemini_content(role: &str, text: String) -> GeminiContent {
    GeminiContent {
        role: Some(role.to_string()),
        parts: vec![GeminiPart { text: Some(text) }],
    }
}

fn gemini_request(request: CompletionRequest) -> GeminiRequest {
    let mut contents: Vec<GeminiContent> = request
        .conversation
        .into_iter()
        .filter(|m| m.role != Role::System && !m.content.is_empty())
        .map(|m| {
            let role = match m.role {
                Role::Assistant => "model",
                _ => "user",
            };
            gemini_content(role, m.content)
        })
        .collect();
    contents.push(gemini_content("user", request.prompt));
    GeminiRequest { contents }
}

/// Incremental decoder for the `alt=sse` response body.
///
/// Bytes are buffered until a full line is available, so multi-byte
/// characters split across chunks decode correctly.
#[derive(Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) -> Vec<Result<String, AssistantError>> {
        self.buffer.extend_from_slice(bytes);
        let mut out = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            if let Some(text) = Self::decode_line(line.trim_end()) {
                out.push(text);
            }
        }
        out
    }

    fn decode_line(line: &str) -> Option<Result<String, AssistantError>> {
        let data = line.strip_prefix("data:")?.trim();
        if data.is_empty() || data == "[DONE]" {
            return None;
        }
        let chunk: GeminiChunk = match serde_json::from_str(data) {
            Ok(chunk) => chunk,
            Err(e) => return Some(Err(e.into())),
        };
        let text: String = chunk
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(Ok(text))
        }
    }
}

pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String, api_base: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            api_base,
        }
    }

    fn endpoint(&self) -> Result<url::Url, AssistantError> {
        let mut url = url::Url::parse(&self.api_base)?.join(&format!(
            "v1beta/models/{}:streamGenerateContent",
            self.model
        ))?;
        url.query_pairs_mut()
            .append_pair("alt", "sse")
            .append_pair("key", &self.api_key);
        Ok(url)
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<TextStream, AssistantError> {
        let body = gemini_request(request);
        info!(model = %self.model, turns = body.contents.len(), "requesting completion");

        let response = self
            .client
            .post(self.endpoint()?)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let texts = response
            .bytes_stream()
            .scan(SseDecoder::new(), |decoder, chunk| {
                let items = match chunk {
                    Ok(bytes) => decoder.push(&bytes),
                    Err(e) => vec![Err(AssistantError::from(e))],
                };
                futures_util::future::ready(Some(items))
            })
            .flat_map(stream::iter);
        Ok(texts.boxed())
    }
}
