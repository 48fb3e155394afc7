//! Cast content as returned by the content API.

use serde::Deserialize;

/// A media or link attachment on a cast. Older casts carry bare URL
/// strings, newer ones objects with an optional `url` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Embed {
    Url(String),
    Object {
        #[serde(default)]
        url: Option<String>,
    },
}

impl Embed {
    /// The embed's URL, if it has one.
    pub fn url(&self) -> Option<&str> {
        match self {
            Embed::Url(u) => Some(u),
            Embed::Object { url } => url.as_deref(),
        }
    }
}

/// A cast as consumed from the content API. Fetched fresh on every
/// request; only derived results are cached, never the cast itself.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Cast {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub embeds: Vec<Embed>,
    /// Parent reference for replies/quotes. The content API has used
    /// both casings over time.
    #[serde(default, alias = "parentHash")]
    pub parent_hash: Option<String>,
}

/// Raster/vector suffixes treated as inlineable images.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "svg"];

fn is_image_url(url: &str) -> bool {
    // Suffix check on the path, ignoring any query string.
    let path = url.split('?').next().unwrap_or(url);
    let ext = match path.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => return false,
    };
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

/// Text and embed URLs derived from a cast, split into image and
/// non-image URLs. Recomputed each time; no identity.
#[derive(Debug, Clone, Default)]
pub struct Assets {
    pub text: String,
    pub image_urls: Vec<String>,
    pub other_urls: Vec<String>,
}

impl Assets {
    /// Derive assets from a cast.
    pub fn from_cast(cast: &Cast) -> Self {
        let mut image_urls = Vec::new();
        let mut other_urls = Vec::new();
        for url in cast.embeds.iter().filter_map(Embed::url) {
            if is_image_url(url) {
                image_urls.push(url.to_string());
            } else {
                other_urls.push(url.to_string());
            }
        }
        Self {
            text: cast.text.clone(),
            image_urls,
            other_urls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cast_with_embeds(embeds: &[&str]) -> Cast {
        Cast {
            text: "gm".into(),
            embeds: embeds.iter().map(|u| Embed::Url((*u).to_string())).collect(),
            parent_hash: None,
        }
    }

    #[test]
    fn splits_image_and_other_urls() {
        let cast = cast_with_embeds(&[
            "https://i.imgur.com/abc.png",
            "https://example.com/article",
            "https://cdn.example.com/photo.JPEG?w=600",
        ]);
        let assets = Assets::from_cast(&cast);
        assert_eq!(
            assets.image_urls,
            vec![
                "https://i.imgur.com/abc.png",
                "https://cdn.example.com/photo.JPEG?w=600"
            ]
        );
        assert_eq!(assets.other_urls, vec!["https://example.com/article"]);
    }

    #[test]
    fn object_embeds_without_url_are_skipped() {
        let cast = Cast {
            text: String::new(),
            embeds: vec![Embed::Object { url: None }],
            parent_hash: None,
        };
        let assets = Assets::from_cast(&cast);
        assert!(assets.image_urls.is_empty());
        assert!(assets.other_urls.is_empty());
    }

    #[test]
    fn deserializes_mixed_embed_shapes() {
        let json = r#"{
            "text": "quoted",
            "embeds": ["https://a.example/x.gif", {"url": "https://b.example/y"}],
            "parentHash": "0xparent"
        }"#;
        let cast: Cast = serde_json::from_str(json).unwrap();
        assert_eq!(cast.parent_hash.as_deref(), Some("0xparent"));
        let assets = Assets::from_cast(&cast);
        assert_eq!(assets.image_urls, vec!["https://a.example/x.gif"]);
        assert_eq!(assets.other_urls, vec!["https://b.example/y"]);
    }

    #[test]
    fn snake_case_parent_hash_also_accepted() {
        let json = r#"{"text": "", "embeds": [], "parent_hash": "0xdeadbeef"}"#;
        let cast: Cast = serde_json::from_str(json).unwrap();
        assert_eq!(cast.parent_hash.as_deref(), Some("0xdeadbeef"));
    }

    #[test]
    fn extensionless_urls_are_not_images() {
        assert!(!is_image_url("https://example.com/page"));
        assert!(is_image_url("https://example.com/a.webp"));
        assert!(!is_image_url("https://example.com/a.webp2"));
    }
}
