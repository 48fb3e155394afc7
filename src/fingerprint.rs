//! Content fingerprinting for the result cache.
//!
//! A fingerprint is a pure function of the semantically relevant request
//! fields; identical inputs always yield the identical key, so at most
//! one model call is made per distinct content within the cache TTL
//! (two concurrent misses may race, which is harmless — the value is
//! idempotent per input).

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::types::{LlmResult, Mode};

/// Quote snippets are clipped to fit a compose box.
const QUOTE_MAX_CHARS: usize = 240;

/// Canonical serialization input. Field order is fixed by the struct,
/// so the digest is stable across processes and platforms.
#[derive(Serialize)]
struct FingerprintInput<'a> {
    mode: &'a str,
    #[serde(rename = "targetLang")]
    target_lang: &'a str,
    text: &'a str,
    #[serde(rename = "imageUrls")]
    image_urls: &'a [String],
}

/// Derive the cache key for a request's content.
///
/// SHA-256 over the canonical JSON of `{mode, targetLang, text,
/// imageUrls}`, rendered as lowercase hex.
pub fn fingerprint(mode: Mode, target_lang: &str, text: &str, image_urls: &[String]) -> String {
    let input = FingerprintInput {
        mode: mode.as_str(),
        target_lang,
        text,
        image_urls,
    };
    // Serialization of a plain struct with string fields cannot fail.
    let canonical = serde_json::to_string(&input).unwrap_or_default();
    let digest = Sha256::digest(canonical.as_bytes());
    hex::encode(digest)
}

/// Build the pre-filled text for a share/quote action.
///
/// Prefers the translation, falls back to a `TL;DR:`-prefixed summary,
/// else empty. Clipped to 240 characters after prefixing.
pub fn build_quote_text(result: &LlmResult) -> String {
    if let Some(translated) = result.translated() {
        return clip(translated);
    }
    if let Some(summary) = result.summary() {
        return clip(&format!("TL;DR: {summary}"));
    }
    String::new()
}

fn clip(text: &str) -> String {
    text.chars().take(QUOTE_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChatReply, Explanation, Translation};

    fn translation(text: &str) -> LlmResult {
        LlmResult::Translation(Translation {
            source_lang: "en".into(),
            target_lang: "vi".into(),
            unchanged: false,
            translated: text.into(),
            notes: vec![],
        })
    }

    #[test]
    fn fingerprint_deterministic() {
        let urls = vec!["https://a.example/x.png".to_string()];
        let k1 = fingerprint(Mode::Translate, "vi", "hello", &urls);
        let k2 = fingerprint(Mode::Translate, "vi", "hello", &urls);
        assert_eq!(k1, k2);
        assert_eq!(k1.len(), 64);
        assert!(k1.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn fingerprint_sensitive_to_each_field() {
        let urls = vec!["https://a.example/x.png".to_string()];
        let base = fingerprint(Mode::Translate, "vi", "hello", &urls);
        assert_ne!(base, fingerprint(Mode::Explain, "vi", "hello", &urls));
        assert_ne!(base, fingerprint(Mode::Translate, "en", "hello", &urls));
        assert_ne!(base, fingerprint(Mode::Translate, "vi", "hello!", &urls));
        assert_ne!(base, fingerprint(Mode::Translate, "vi", "hello", &[]));
    }

    #[test]
    fn fingerprint_sensitive_to_url_order() {
        let a = vec!["https://a.example/1.png".to_string(), "https://a.example/2.png".to_string()];
        let b = vec!["https://a.example/2.png".to_string(), "https://a.example/1.png".to_string()];
        assert_ne!(
            fingerprint(Mode::Translate, "vi", "x", &a),
            fingerprint(Mode::Translate, "vi", "x", &b)
        );
    }

    #[test]
    fn quote_prefers_translation() {
        let quote = build_quote_text(&translation("xin chào thế giới"));
        assert_eq!(quote, "xin chào thế giới");
    }

    #[test]
    fn quote_clips_long_translation() {
        let long = "a".repeat(500);
        assert_eq!(build_quote_text(&translation(&long)).chars().count(), 240);
    }

    #[test]
    fn quote_falls_back_to_prefixed_summary() {
        let result = LlmResult::Explanation(Explanation {
            summary: "a post about rollups".into(),
            ..Default::default()
        });
        assert_eq!(build_quote_text(&result), "TL;DR: a post about rollups");
    }

    #[test]
    fn quote_empty_for_chat() {
        let result = LlmResult::Chat(ChatReply { content: "hi".into() });
        assert_eq!(build_quote_text(&result), "");
    }
}
