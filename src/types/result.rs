//! Model result types, one variant per mode.

use serde::{Deserialize, Serialize};

use crate::types::Mode;
use crate::{Result, SkaldError};

/// Translation result, as the model emits it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Translation {
    #[serde(default)]
    pub source_lang: String,
    #[serde(default)]
    pub target_lang: String,
    /// True when the text was already in the target language and was
    /// returned untouched.
    #[serde(default)]
    pub unchanged: bool,
    #[serde(default)]
    pub translated: String,
    #[serde(default)]
    pub notes: Vec<String>,
}

/// One glossary entry in an explanation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub term: String,
    pub meaning: String,
}

/// Explanation result, as the model emits it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Explanation {
    #[serde(default)]
    pub source_lang: String,
    #[serde(default)]
    pub target_lang: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub eli5: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub glossary: Vec<GlossaryEntry>,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_reply: Option<String>,
    #[serde(default)]
    pub limits: Vec<String>,
}

/// Chat reply result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub content: String,
}

/// A model result, discriminated by the mode that produced it.
///
/// The discriminant is explicit rather than sniffed from optional
/// fields, so cached entries round-trip losslessly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LlmResult {
    Translation(Translation),
    Explanation(Explanation),
    Chat(ChatReply),
}

impl LlmResult {
    /// Parse a normalized model reply for the given mode.
    ///
    /// The reply must already have passed through
    /// [`extract_json_object`](crate::extract::extract_json_object).
    /// A reply that does not even start with `{` means the normalizer
    /// found no object at all; anything else that fails to parse is a
    /// malformed reply. Both are fatal for the call and never retried.
    pub fn from_reply(mode: Mode, reply: &str) -> Result<Self> {
        if !reply.starts_with('{') {
            return Err(SkaldError::NoJsonPayload);
        }
        let parse = |e: serde_json::Error| SkaldError::MalformedReply(e.to_string());
        match mode {
            Mode::Translate => Ok(LlmResult::Translation(
                serde_json::from_str(reply).map_err(parse)?,
            )),
            Mode::Explain => Ok(LlmResult::Explanation(
                serde_json::from_str(reply).map_err(parse)?,
            )),
            Mode::Chat => Ok(LlmResult::Chat(serde_json::from_str(reply).map_err(parse)?)),
        }
    }

    /// The translated text, when this is a translation.
    pub fn translated(&self) -> Option<&str> {
        match self {
            LlmResult::Translation(t) if !t.translated.is_empty() => Some(&t.translated),
            _ => None,
        }
    }

    /// The summary, when this is an explanation.
    pub fn summary(&self) -> Option<&str> {
        match self {
            LlmResult::Explanation(e) if !e.summary.is_empty() => Some(&e.summary),
            _ => None,
        }
    }
}
