use chrono::Utc;
use shopaudit_core::{summarize_envelope_at, AiDetectionResult, BrandKeywords};

use crate::client::VisionClient;
use crate::types::ImageSource;

impl VisionClient {
    /// Annotate one image and summarize brand presence.
    ///
    /// Never fails: transport and API errors become the negative result with
    /// `error` set, so a batch of images can be analyzed independently.
    pub async fn analyze(&self, image: &ImageSource, keywords: &BrandKeywords) -> AiDetectionResult {
        match self.annotate(image).await {
            Ok(envelope) => {
                let result = summarize_envelope_at(&envelope, keywords, Utc::now());
                tracing::info!(
                    image = %image.describe(),
                    detected = result.product_detected,
                    count = result.product_count,
                    method = %result.detection_method,
                    "image analyzed"
                );
                result
            }
            Err(e) => {
                tracing::error!(image = %image.describe(), error = %e, "image analysis failed");
                AiDetectionResult::failed(e.to_string(), Utc::now())
            }
        }
    }
}
