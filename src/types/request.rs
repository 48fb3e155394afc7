//! Request types for model calls.

use serde::{Deserialize, Serialize};

/// What the model is asked to do with the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Translate,
    Explain,
    Chat,
}

impl Mode {
    /// Stable lowercase name, used in fingerprints and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Translate => "translate",
            Mode::Explain => "explain",
            Mode::Chat => "chat",
        }
    }
}

/// Role of a conversation turn supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One prior turn of a chat conversation.
///
/// History is caller-supplied and forwarded verbatim; the caller is
/// responsible for truncation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ChatTurn {
    /// Create a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

/// A fully-shaped model request.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub mode: Mode,
    pub text: String,
    /// Image URLs to inline; only the first 3 are fetched.
    pub image_urls: Vec<String>,
    /// ISO 639-1 target language code.
    pub target_lang: String,
    /// Prior conversation turns, chat mode only.
    pub history: Vec<ChatTurn>,
}

impl LlmRequest {
    /// Single-shot request without history.
    pub fn new(mode: Mode, text: impl Into<String>, target_lang: impl Into<String>) -> Self {
        Self {
            mode,
            text: text.into(),
            image_urls: Vec::new(),
            target_lang: target_lang.into(),
            history: Vec::new(),
        }
    }

    /// Attach image URLs.
    pub fn with_images(mut self, image_urls: Vec<String>) -> Self {
        self.image_urls = image_urls;
        self
    }

    /// Attach conversation history.
    pub fn with_history(mut self, history: Vec<ChatTurn>) -> Self {
        self.history = history;
        self
    }
}
