//! Frame protocol types and meta-tag rendering.
//!
//! A frame is a stateless request/response handshake: the client posts
//! `{fid, castId?, inputText?, buttonIndex}` and always receives an
//! HTML document whose meta-tags describe an image, a post-back URL,
//! labeled buttons, and an optional text input. There is no server-side
//! session; the button index alone selects the next transition.

use html_escape::encode_double_quoted_attribute;
use serde::Deserialize;

/// Inbound frame post body, as social clients send it.
#[derive(Debug, Deserialize)]
pub struct FramePostBody {
    #[serde(rename = "untrustedData")]
    pub untrusted_data: UntrustedData,
}

/// The client-asserted part of a frame post. Signature verification of
/// `trustedData` is out of scope; the fields are taken at face value.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UntrustedData {
    pub fid: u64,
    #[serde(default)]
    pub cast_id: Option<CastId>,
    #[serde(default)]
    pub input_text: Option<String>,
    /// 1-based index of the pressed button; 2 selects explain mode.
    #[serde(default)]
    pub button_index: Option<u8>,
}

/// Reference to the cast the frame was rendered under.
#[derive(Debug, Deserialize)]
pub struct CastId {
    pub fid: u64,
    pub hash: String,
}

/// A labeled frame button.
#[derive(Debug, Clone)]
pub struct FrameButton {
    pub label: String,
    /// `post_redirect` buttons carry an external target URL.
    pub target: Option<String>,
}

impl FrameButton {
    /// A plain post-back button.
    pub fn post(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: None,
        }
    }

    /// A button that redirects the client to an external URL.
    pub fn post_redirect(label: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: Some(target.into()),
        }
    }
}

/// One renderable frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: String,
    pub post_url: Option<String>,
    pub buttons: Vec<FrameButton>,
    /// Placeholder text; present iff the frame accepts input.
    pub input: Option<String>,
}

impl Frame {
    /// Render the frame as an HTML document with `fc:frame` meta-tags.
    pub fn render(&self) -> String {
        let mut metas = Vec::new();
        metas.push("<meta property=\"fc:frame\" content=\"vNext\" />".to_string());
        metas.push(meta("fc:frame:image", &self.image));

        if let Some(post_url) = &self.post_url {
            metas.push(meta("fc:frame:post_url", post_url));
        }
        if let Some(placeholder) = &self.input {
            metas.push(meta("fc:frame:input:text", placeholder));
        }
        for (idx, button) in self.buttons.iter().enumerate() {
            let index = idx + 1;
            metas.push(meta(&format!("fc:frame:button:{index}"), &button.label));
            if let Some(target) = &button.target {
                metas.push(meta(
                    &format!("fc:frame:button:{index}:action"),
                    "post_redirect",
                ));
                metas.push(meta(&format!("fc:frame:button:{index}:target"), target));
            }
        }

        metas.push(meta("og:title", "Skald"));
        metas.push(meta("og:image", &self.image));

        format!(
            "<!DOCTYPE html>\n<html>\n  <head>\n    <meta charset=\"utf-8\">\n    \
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n    \
             <title>Skald</title>\n    {}\n  </head>\n  <body>\n    \
             <h1>Skald</h1>\n    <p>Open this frame in a Farcaster client to use it.</p>\n  \
             </body>\n</html>",
            metas.join("\n    ")
        )
    }
}

fn meta(property: &str, content: &str) -> String {
    format!(
        "<meta property=\"{}\" content=\"{}\" />",
        encode_double_quoted_attribute(property),
        encode_double_quoted_attribute(content)
    )
}
