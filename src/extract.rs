//! Best-effort extraction of a JSON object from model output.
//!
//! Models asked for "strict JSON" still wrap replies in markdown fences
//! or surround them with prose. [`extract_json_object`] strips that
//! packaging and returns the span most likely to be a single JSON
//! object. It never validates the result — parse failures are the
//! caller's to classify (see [`SkaldError::MalformedReply`]).
//!
//! [`SkaldError::MalformedReply`]: crate::SkaldError::MalformedReply

/// Isolate the JSON object inside a raw model reply.
///
/// Removes all ```` ``` ````/```` ```json ```` fence markers, trims
/// whitespace, and slices from the first `{` to the last `}` when both
/// exist in that order. Without braces the trimmed text is returned
/// unchanged, which will fail JSON parsing downstream — an accepted
/// failure path, not one this function prevents.
///
/// Idempotent: applying it to its own output is a no-op.
pub fn extract_json_object(raw: &str) -> String {
    let cleaned = raw.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();

    match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(first), Some(last)) if first < last => cleaned[first..=last].to_string(),
        _ => cleaned.to_string(),
    }
}
