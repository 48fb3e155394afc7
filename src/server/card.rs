//! Server-rendered SVG cards for the frame image endpoints.
//!
//! Cards are fixed-size 1200×630 documents built from a result payload
//! carried in the image URL. The payload is parsed defensively: any
//! shape that deserializes is rendered, anything else falls back to the
//! generic cover card.

use html_escape::encode_text;
use serde::Deserialize;

const WIDTH: u32 = 1200;
const HEIGHT: u32 = 630;

/// Body text is clipped before wrapping.
const BODY_MAX_CHARS: usize = 300;
/// Rough character budget per wrapped line at the body font size.
const LINE_WIDTH: usize = 56;
const MAX_BODY_LINES: usize = 6;

/// The result fields a card knows how to show. All optional so a
/// payload from any mode (or an older build) still renders.
#[derive(Debug, Default, Deserialize)]
pub struct CardPayload {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub translated: Option<String>,
    #[serde(default)]
    pub eli5: Option<String>,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub unchanged: bool,
}

/// Render the result card: title, wrapped body, up to two key points.
pub fn render_result_card(payload: &CardPayload) -> String {
    let title = payload.summary.clone().unwrap_or_else(|| {
        if payload.unchanged {
            "Original".to_string()
        } else {
            "Translation".to_string()
        }
    });
    let body = payload
        .translated
        .as_deref()
        .or(payload.eli5.as_deref())
        .or(payload.summary.as_deref())
        .unwrap_or("Processing…");
    let body: String = body.chars().take(BODY_MAX_CHARS).collect();

    let mut lines = String::new();
    for (i, line) in wrap(&body, LINE_WIDTH)
        .into_iter()
        .take(MAX_BODY_LINES)
        .enumerate()
    {
        let y = 170 + i * 44;
        lines.push_str(&format!(
            "  <text x=\"48\" y=\"{y}\" font-size=\"28\" fill=\"#334155\">{}</text>\n",
            encode_text(&line)
        ));
    }

    let key_points = if payload.key_points.is_empty() {
        String::new()
    } else {
        let joined = payload
            .key_points
            .iter()
            .take(2)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" • ");
        format!(
            "  <text x=\"48\" y=\"560\" font-size=\"20\" fill=\"#64748b\">• {}</text>\n",
            encode_text(&joined)
        )
    };

    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{HEIGHT}\" \
         viewBox=\"0 0 {WIDTH} {HEIGHT}\" font-family=\"system-ui, sans-serif\">\n  \
         <rect width=\"{WIDTH}\" height=\"{HEIGHT}\" fill=\"#f8fafc\"/>\n  \
         <text x=\"48\" y=\"96\" font-size=\"36\" font-weight=\"700\" fill=\"#1e293b\">{}</text>\n\
         {lines}{key_points}</svg>",
        encode_text(&title)
    )
}

/// Render the static cover card, also used as the fallback when a
/// payload fails to parse.
pub fn render_cover_card() -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{HEIGHT}\" \
         viewBox=\"0 0 {WIDTH} {HEIGHT}\" font-family=\"system-ui, sans-serif\">\n  \
         <rect width=\"{WIDTH}\" height=\"{HEIGHT}\" fill=\"#0f172a\"/>\n  \
         <text x=\"600\" y=\"280\" font-size=\"72\" font-weight=\"800\" fill=\"#ffffff\" \
         text-anchor=\"middle\">Skald</text>\n  \
         <text x=\"600\" y=\"360\" font-size=\"36\" fill=\"#64748b\" \
         text-anchor=\"middle\">Translate &amp; explain Farcaster casts</text>\n</svg>"
    )
}

/// Greedy word wrap on a character budget. A single overlong word gets
/// its own line rather than being split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation_payload_renders_translated_body() {
        let payload: CardPayload =
            serde_json::from_str(r#"{"translated": "xin chào thế giới", "unchanged": false}"#)
                .unwrap();
        let svg = render_result_card(&payload);
        assert!(svg.contains("Translation"));
        assert!(svg.contains("xin chào thế giới"));
    }

    #[test]
    fn unchanged_payload_titles_original() {
        let payload: CardPayload =
            serde_json::from_str(r#"{"translated": "gm", "unchanged": true}"#).unwrap();
        assert!(render_result_card(&payload).contains(">Original</text>"));
    }

    #[test]
    fn explanation_payload_prefers_summary_title_and_eli5_body() {
        let payload: CardPayload = serde_json::from_str(
            r#"{"summary": "a post about rollups", "eli5": "bundling many things into one",
                "key_points": ["cheaper", "faster", "ignored third point"]}"#,
        )
        .unwrap();
        let svg = render_result_card(&payload);
        assert!(svg.contains("a post about rollups"));
        assert!(svg.contains("bundling many things into one"));
        assert!(svg.contains("cheaper • faster"));
        assert!(!svg.contains("ignored third point"));
    }

    #[test]
    fn tagged_result_json_parses_as_payload() {
        // The og payload is the serialized LlmResult; unknown fields
        // like the discriminant are ignored.
        let payload: CardPayload = serde_json::from_str(
            r#"{"kind": "translation", "source_lang": "en", "translated": "chào"}"#,
        )
        .unwrap();
        assert!(render_result_card(&payload).contains("chào"));
    }

    #[test]
    fn text_is_escaped_for_svg() {
        let payload = CardPayload {
            translated: Some("1 < 2 && \"quotes\"".into()),
            ..Default::default()
        };
        let svg = render_result_card(&payload);
        assert!(svg.contains("1 &lt; 2 &amp;&amp;"));
    }

    #[test]
    fn empty_payload_renders_placeholder_body() {
        let svg = render_result_card(&CardPayload::default());
        assert!(svg.contains("Processing…"));
    }

    #[test]
    fn wrap_respects_width_and_keeps_overlong_words() {
        let lines = wrap("one two three fourfourfourfour", 9);
        assert_eq!(lines, vec!["one two", "three", "fourfourfourfour"]);
    }
}
