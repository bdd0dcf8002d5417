//! Response shapes of the `images:annotate` vision endpoint.
//!
//! Only the fields the detection summarizer reads are modelled. Unknown
//! fields are ignored and absent or `null` lists decode as empty, so partial
//! responses never fail to parse.

use serde::{Deserialize, Deserializer, Serialize};

/// Top-level envelope: one entry per requested image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotateResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotateImageResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub localized_object_annotations: Vec<LocalizedObjectAnnotation>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub label_annotations: Vec<EntityAnnotation>,
    /// First element, when present, is the full OCR text of the image.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text_annotations: Vec<EntityAnnotation>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub logo_annotations: Vec<EntityAnnotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Status>,
}

impl AnnotateImageResponse {
    /// Full OCR text, or the empty string when no text was found.
    #[must_use]
    pub fn full_text(&self) -> &str {
        self.text_annotations
            .first()
            .map_or("", |t| t.description.as_str())
    }
}

/// Label, text or logo hit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityAnnotation {
    #[serde(default)]
    pub description: String,
    /// Text annotations carry no score; they decode as `0.0`.
    #[serde(default)]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_poly: Option<BoundingPoly>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalizedObjectAnnotation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mid: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingPoly {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub vertices: Vec<Vertex>,
}

/// Pixel vertex. The API omits zero-valued coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    #[serde(default)]
    pub x: i64,
    #[serde(default)]
    pub y: i64,
}

/// Per-image error reported inside an otherwise successful envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "vision API error {}: {}", self.code, self.message)
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
