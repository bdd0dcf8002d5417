//! Request body of `images:annotate`.

use base64::Engine as _;
use serde::Serialize;

/// Feature set requested for every image, with per-feature result caps.
pub const FEATURES: [Feature; 4] = [
    Feature::new("OBJECT_LOCALIZATION", 10),
    Feature::new("LABEL_DETECTION", 20),
    Feature::new("TEXT_DETECTION", 50),
    Feature::new("LOGO_DETECTION", 10),
];

/// Where the image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Raw image bytes, sent inline as base64.
    Bytes(Vec<u8>),
    /// A `gs://` or `https://` URI the API fetches itself.
    Uri(String),
}

impl ImageSource {
    /// Short description for logs; never includes image content.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            ImageSource::Bytes(bytes) => format!("{} inline bytes", bytes.len()),
            ImageSource::Uri(uri) => uri.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub max_results: u32,
}

impl Feature {
    #[must_use]
    pub const fn new(kind: &'static str, max_results: u32) -> Self {
        Self { kind, max_results }
    }
}

#[derive(Debug, Serialize)]
pub struct AnnotateRequest {
    pub requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Serialize)]
pub struct AnnotateImageRequest {
    pub image: Image,
    pub features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
pub struct Image {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ImageUri>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUri {
    pub image_uri: String,
}

impl AnnotateRequest {
    /// One-image request asking for all of [`FEATURES`].
    #[must_use]
    pub fn single(image: &ImageSource) -> Self {
        let image = match image {
            ImageSource::Bytes(bytes) => Image {
                content: Some(base64::engine::general_purpose::STANDARD.encode(bytes)),
                source: None,
            },
            ImageSource::Uri(uri) => Image {
                content: None,
                source: Some(ImageUri {
                    image_uri: uri.clone(),
                }),
            },
        };
        Self {
            requests: vec![AnnotateImageRequest {
                image,
                features: FEATURES.to_vec(),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_bytes_are_base64_encoded() {
        let body =
            serde_json::to_value(AnnotateRequest::single(&ImageSource::Bytes(b"abc".to_vec())))
                .unwrap();
        assert_eq!(body["requests"][0]["image"]["content"], "YWJj");
        assert!(body["requests"][0]["image"].get("source").is_none());
    }

    #[test]
    fn uri_source_uses_image_uri() {
        let body = serde_json::to_value(AnnotateRequest::single(&ImageSource::Uri(
            "gs://bucket/shelf.jpg".to_string(),
        )))
        .unwrap();
        assert_eq!(
            body["requests"][0]["image"]["source"]["imageUri"],
            "gs://bucket/shelf.jpg"
        );
        assert!(body["requests"][0]["image"].get("content").is_none());
    }

    #[test]
    fn all_four_features_are_requested() {
        let body =
            serde_json::to_value(AnnotateRequest::single(&ImageSource::Bytes(Vec::new()))).unwrap();
        let features = body["requests"][0]["features"].as_array().unwrap();
        let pairs: Vec<(&str, u64)> = features
            .iter()
            .map(|f| (f["type"].as_str().unwrap(), f["maxResults"].as_u64().unwrap()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("OBJECT_LOCALIZATION", 10),
                ("LABEL_DETECTION", 20),
                ("TEXT_DETECTION", 50),
                ("LOGO_DETECTION", 10),
            ]
        );
    }

    #[test]
    fn describe_never_includes_bytes() {
        assert_eq!(
            ImageSource::Bytes(vec![0; 2048]).describe(),
            "2048 inline bytes"
        );
    }
}
