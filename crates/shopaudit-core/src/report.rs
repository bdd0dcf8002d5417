//! Shop-level aggregation of per-visit GPS validations and detections.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::detection::{AiDetectionResult, DetectionMethod};
use crate::geo::Coordinates;
use crate::gps::{validate_visit_at, GpsValidationResult, ValidationStatus};
use crate::normalize;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitGpsValidation {
    pub visit_id: Option<String>,
    pub validation: GpsValidationResult,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpsStatusCounts {
    pub valid: usize,
    pub invalid: usize,
    pub partial: usize,
    pub no_data: usize,
}

impl GpsStatusCounts {
    pub fn record(&mut self, status: ValidationStatus) {
        match status {
            ValidationStatus::Valid => self.valid += 1,
            ValidationStatus::Invalid => self.invalid += 1,
            ValidationStatus::Partial => self.partial += 1,
            ValidationStatus::NoData => self.no_data += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.valid + self.invalid + self.partial + self.no_data
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopGpsReport {
    pub shop_coordinates: Option<Coordinates>,
    pub radius_threshold_meters: f64,
    pub total_visits: usize,
    pub counts: GpsStatusCounts,
    pub visits: Vec<VisitGpsValidation>,
}

/// Validate every visit attached to a raw shop record.
#[must_use]
pub fn gps_report(shop: &Value, radius_threshold_meters: f64) -> ShopGpsReport {
    gps_report_at(shop, radius_threshold_meters, Utc::now())
}

/// Validate every visit attached to a raw shop record, stamping each result
/// with `computed_at`.
///
/// The shop and its visits go through [`normalize`] first. A shop without
/// coordinates still yields one `no_data` entry per visit.
#[must_use]
pub fn gps_report_at(
    shop: &Value,
    radius_threshold_meters: f64,
    computed_at: DateTime<Utc>,
) -> ShopGpsReport {
    let shop_coordinates = normalize::shop_coordinates(shop);
    let mut counts = GpsStatusCounts::default();

    let visits: Vec<VisitGpsValidation> = normalize::shop_visits(shop)
        .iter()
        .map(|visit| {
            let validation = validate_visit_at(
                shop_coordinates,
                &normalize::visit_location(visit),
                radius_threshold_meters,
                computed_at,
            );
            counts.record(validation.validation_status);
            VisitGpsValidation {
                visit_id: normalize::visit_id(visit),
                validation,
            }
        })
        .collect();

    tracing::debug!(
        shop_id = ?normalize::visit_id(shop),
        visits = visits.len(),
        valid = counts.valid,
        partial = counts.partial,
        invalid = counts.invalid,
        no_data = counts.no_data,
        "built shop GPS report"
    );

    ShopGpsReport {
        shop_coordinates,
        radius_threshold_meters,
        total_visits: visits.len(),
        counts,
        visits,
    }
}

/// Detection outcome for one visit; `None` when the visit was never analyzed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitDetection {
    pub visit_id: Option<String>,
    pub detection: Option<AiDetectionResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionSummary {
    pub total_visits: usize,
    /// Visits where the product was detected.
    pub visits_with_ai: usize,
    /// Sum of `productCount` across visits.
    pub total_product_detected: usize,
    /// Mean confidence over visits where the product was detected.
    pub average_confidence: f64,
    pub detection_methods: Vec<DetectionMethod>,
    pub last_detection: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopDetectionReport {
    pub summary: DetectionSummary,
    pub visits: Vec<VisitDetection>,
}

impl ShopDetectionReport {
    #[must_use]
    pub fn new(visits: Vec<VisitDetection>) -> Self {
        Self {
            summary: detection_report(&visits),
            visits,
        }
    }
}

/// Aggregate per-visit detections into a dashboard summary.
///
/// Failed analyses count towards `total_visits` only. `detection_methods`
/// lists each method that detected the product at least once, sorted.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn detection_report(results: &[VisitDetection]) -> DetectionSummary {
    let analyzed: Vec<&AiDetectionResult> = results
        .iter()
        .filter_map(|visit| visit.detection.as_ref())
        .filter(|detection| !detection.is_error())
        .collect();

    let detected: Vec<&AiDetectionResult> = analyzed
        .iter()
        .copied()
        .filter(|detection| detection.product_detected)
        .collect();

    let average_confidence = if detected.is_empty() {
        0.0
    } else {
        detected.iter().map(|d| d.confidence).sum::<f64>() / detected.len() as f64
    };

    let detection_methods: Vec<DetectionMethod> = detected
        .iter()
        .map(|d| d.detection_method)
        .filter(|m| *m != DetectionMethod::None)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    DetectionSummary {
        total_visits: results.len(),
        visits_with_ai: detected.len(),
        total_product_detected: analyzed.iter().map(|d| d.product_count).sum(),
        average_confidence,
        detection_methods,
        last_detection: analyzed.iter().map(|d| d.processed_at).max(),
    }
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
