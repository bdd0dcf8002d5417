//! Brand detection over vision annotation responses.
//!
//! Detection is gated on the target brand: only logo annotations and OCR
//! text matching [`BrandKeywords`] count. Generic objects and labels
//! ("Snack", "Packaging", a competitor's logo) never trigger a detection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::keywords::BrandKeywords;
use crate::vision::{AnnotateImageResponse, AnnotateResponse, BoundingPoly, EntityAnnotation};

const NO_RESULTS_ERROR: &str = "No analysis results received";

/// A logo annotation that matched the brand's logo keywords.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoMatch {
    pub description: String,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_poly: Option<BoundingPoly>,
}

impl From<&EntityAnnotation> for LogoMatch {
    fn from(logo: &EntityAnnotation) -> Self {
        Self {
            description: logo.description.clone(),
            score: logo.score,
            bounding_poly: logo.bounding_poly.clone(),
        }
    }
}

/// One counted brand sighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    Logo,
    Text,
    /// Accepted when reading stored results; never produced here.
    Object,
    None,
}

impl DetectionMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DetectionMethod::Logo => "logo",
            DetectionMethod::Text => "text",
            DetectionMethod::Object => "object",
            DetectionMethod::None => "none",
        }
    }
}

impl std::fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of one analyzed image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiDetectionResult {
    pub product_detected: bool,
    pub product_count: usize,
    /// Mean score of `detections`; `0.0` when there are none.
    pub confidence: f64,
    pub detection_method: DetectionMethod,
    #[serde(default)]
    pub matched_logos: Vec<LogoMatch>,
    #[serde(default)]
    pub detections: Vec<Detection>,
    #[serde(default)]
    pub extracted_text: String,
    pub processed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AiDetectionResult {
    /// The conservative negative result, carrying `error`.
    #[must_use]
    pub fn failed(error: impl Into<String>, processed_at: DateTime<Utc>) -> Self {
        Self {
            product_detected: false,
            product_count: 0,
            confidence: 0.0,
            detection_method: DetectionMethod::None,
            matched_logos: Vec::new(),
            detections: Vec::new(),
            extracted_text: String::new(),
            processed_at,
            error: Some(error.into()),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Summarize one image response, stamped with the current time.
#[must_use]
pub fn summarize_detection(
    response: &AnnotateImageResponse,
    keywords: &BrandKeywords,
) -> AiDetectionResult {
    summarize_detection_at(response, keywords, Utc::now())
}

/// Summarize one image response.
///
/// The product is detected when any logo matches a logo keyword or the OCR
/// transcript contains a text keyword. Each matched logo becomes one
/// detection named `"Brand Logo: <description>"`; a text-only match is
/// detected with a count of zero.
#[must_use]
pub fn summarize_detection_at(
    response: &AnnotateImageResponse,
    keywords: &BrandKeywords,
    processed_at: DateTime<Utc>,
) -> AiDetectionResult {
    let extracted_text = response.full_text().to_string();

    let matched_logos: Vec<LogoMatch> = response
        .logo_annotations
        .iter()
        .filter(|logo| keywords.matches_logo(&logo.description))
        .map(LogoMatch::from)
        .collect();
    let text_match = keywords.matches_text(&extracted_text);
    let product_detected = text_match || !matched_logos.is_empty();

    let detections: Vec<Detection> = if product_detected {
        matched_logos
            .iter()
            .map(|logo| Detection {
                name: format!("Brand Logo: {}", logo.description),
                score: logo.score,
            })
            .collect()
    } else {
        Vec::new()
    };

    let detection_method = if !matched_logos.is_empty() {
        DetectionMethod::Logo
    } else if text_match {
        DetectionMethod::Text
    } else {
        DetectionMethod::None
    };

    let confidence = mean_score(&detections);

    tracing::debug!(
        brand = %keywords.brand,
        logos = response.logo_annotations.len(),
        matched_logos = matched_logos.len(),
        text_match,
        method = %detection_method,
        "summarized detection"
    );

    AiDetectionResult {
        product_detected,
        product_count: detections.len(),
        confidence,
        detection_method,
        matched_logos,
        detections,
        extracted_text,
        processed_at,
        error: None,
    }
}

/// Summarize the first image of a full `{ "responses": [...] }` envelope,
/// stamped with the current time.
#[must_use]
pub fn summarize_envelope(envelope: &AnnotateResponse, keywords: &BrandKeywords) -> AiDetectionResult {
    summarize_envelope_at(envelope, keywords, Utc::now())
}

/// Summarize the first image of a full envelope.
///
/// An empty envelope, or a per-image error reported by the API, yields the
/// negative result with `error` set.
#[must_use]
pub fn summarize_envelope_at(
    envelope: &AnnotateResponse,
    keywords: &BrandKeywords,
    processed_at: DateTime<Utc>,
) -> AiDetectionResult {
    let Some(first) = envelope.responses.first() else {
        tracing::warn!("vision envelope contained no responses");
        return AiDetectionResult::failed(NO_RESULTS_ERROR, processed_at);
    };
    if let Some(status) = &first.error {
        tracing::warn!(code = status.code, message = %status.message, "vision API reported an image error");
        return AiDetectionResult::failed(status.to_string(), processed_at);
    }
    summarize_detection_at(first, keywords, processed_at)
}

#[allow(clippy::cast_precision_loss)]
fn mean_score(detections: &[Detection]) -> f64 {
    if detections.is_empty() {
        return 0.0;
    }
    detections.iter().map(|d| d.score).sum::<f64>() / detections.len() as f64
}

#[cfg(test)]
#[path = "detection_test.rs"]
mod tests;
