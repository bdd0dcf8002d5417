//! GPS validation of field visits against a shop's registered location.
//!
//! A visit records device coordinates at named moments ([`VisitEvent`]).
//! Each validated event is classified by its haversine distance from the shop,
//! and the per-event outcomes fold into one [`ValidationStatus`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::{haversine_distance_m, Coordinates};

/// Acceptable GPS drift for an on-site visit.
pub const DEFAULT_RADIUS_THRESHOLD_M: f64 = 30.0;

/// Named moment during a field audit at which device GPS is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VisitEvent {
    StartAudit,
    PhotoClick,
    /// Recorded by the mobile app but not part of validation.
    ProceedClick,
}

impl VisitEvent {
    /// Events that take part in visit validation, in reporting order.
    pub const VALIDATED: [VisitEvent; 2] = [VisitEvent::StartAudit, VisitEvent::PhotoClick];

    pub const ALL: [VisitEvent; 3] = [
        VisitEvent::StartAudit,
        VisitEvent::PhotoClick,
        VisitEvent::ProceedClick,
    ];

    /// Wire name, as used in `visitLocation` payloads.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            VisitEvent::StartAudit => "startAudit",
            VisitEvent::PhotoClick => "photoClick",
            VisitEvent::ProceedClick => "proceedClick",
        }
    }

    #[must_use]
    pub fn snake_name(self) -> &'static str {
        match self {
            VisitEvent::StartAudit => "start_audit",
            VisitEvent::PhotoClick => "photo_click",
            VisitEvent::ProceedClick => "proceed_click",
        }
    }
}

impl std::fmt::Display for VisitEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coordinates captured for one event. Either half may be missing when the
/// device failed to get a fix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLocation {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl EventLocation {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    /// The usable point, if both halves are present and in range.
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        let point = Coordinates::new(self.latitude?, self.longitude?);
        if point.is_valid() {
            Some(point)
        } else {
            tracing::debug!(?point, "ignoring out-of-range visit coordinates");
            None
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.latitude.is_none() && self.longitude.is_none()
    }
}

/// All GPS samples recorded during one visit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitLocation {
    #[serde(default)]
    pub start_audit: Option<EventLocation>,
    #[serde(default)]
    pub photo_click: Option<EventLocation>,
    #[serde(default)]
    pub proceed_click: Option<EventLocation>,
}

impl VisitLocation {
    #[must_use]
    pub fn event(&self, event: VisitEvent) -> Option<&EventLocation> {
        match event {
            VisitEvent::StartAudit => self.start_audit.as_ref(),
            VisitEvent::PhotoClick => self.photo_click.as_ref(),
            VisitEvent::ProceedClick => self.proceed_click.as_ref(),
        }
    }

    /// Replace the sample for `event`. Empty samples are stored as absent.
    pub fn set_event(&mut self, event: VisitEvent, location: EventLocation) {
        let slot = match event {
            VisitEvent::StartAudit => &mut self.start_audit,
            VisitEvent::PhotoClick => &mut self.photo_click,
            VisitEvent::ProceedClick => &mut self.proceed_click,
        };
        *slot = (!location.is_empty()).then_some(location);
    }

    #[must_use]
    pub fn with_event(mut self, event: VisitEvent, latitude: f64, longitude: f64) -> Self {
        self.set_event(event, EventLocation::new(latitude, longitude));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Valid,
    Invalid,
    Partial,
    NoData,
}

impl ValidationStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationStatus::Valid => "valid",
            ValidationStatus::Invalid => "invalid",
            ValidationStatus::Partial => "partial",
            ValidationStatus::NoData => "no_data",
        }
    }

    /// A partial visit still counts: at least one event was on site.
    #[must_use]
    pub fn is_passing(self) -> bool {
        matches!(self, ValidationStatus::Valid | ValidationStatus::Partial)
    }

    fn classify(valid_count: usize, total_count: usize) -> Self {
        if total_count == 0 {
            ValidationStatus::NoData
        } else if valid_count == total_count {
            ValidationStatus::Valid
        } else if valid_count == 0 {
            ValidationStatus::Invalid
        } else {
            ValidationStatus::Partial
        }
    }
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of validating one visit. Derived data: recompute it rather than
/// treating a stored copy as authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpsValidationResult {
    pub is_valid: bool,
    pub validation_status: ValidationStatus,
    pub shop_coordinates: Option<Coordinates>,
    /// `None` for events without usable coordinates.
    pub per_event_distance_meters: BTreeMap<VisitEvent, Option<f64>>,
    pub per_event_valid: BTreeMap<VisitEvent, bool>,
    pub radius_threshold_meters: f64,
    pub computed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GpsValidationResult {
    fn no_data(radius_threshold_meters: f64, computed_at: DateTime<Utc>, error: &str) -> Self {
        Self {
            is_valid: false,
            validation_status: ValidationStatus::NoData,
            shop_coordinates: None,
            per_event_distance_meters: VisitEvent::VALIDATED
                .iter()
                .map(|&e| (e, None))
                .collect(),
            per_event_valid: VisitEvent::VALIDATED.iter().map(|&e| (e, false)).collect(),
            radius_threshold_meters,
            computed_at,
            error: Some(error.to_string()),
        }
    }

    #[must_use]
    pub fn distance(&self, event: VisitEvent) -> Option<f64> {
        self.per_event_distance_meters.get(&event).copied().flatten()
    }

    #[must_use]
    pub fn event_valid(&self, event: VisitEvent) -> bool {
        self.per_event_valid.get(&event).copied().unwrap_or(false)
    }
}

/// Validate a visit against the shop location, stamped with the current time.
///
/// See [`validate_visit_at`].
#[must_use]
pub fn validate_visit(
    shop: Option<Coordinates>,
    visit: &VisitLocation,
    radius_threshold_meters: f64,
) -> GpsValidationResult {
    validate_visit_at(shop, visit, radius_threshold_meters, Utc::now())
}

/// Validate a visit against the shop location.
///
/// Every event in [`VisitEvent::VALIDATED`] with usable coordinates is
/// measured; an event is on site when its distance is within
/// `radius_threshold_meters` (inclusive). Events without data are left out
/// of both the valid and total counts.
///
/// Missing or out-of-range shop coordinates, and a negative or non-finite
/// radius, produce a `no_data` result carrying `error`. Never panics.
#[must_use]
pub fn validate_visit_at(
    shop: Option<Coordinates>,
    visit: &VisitLocation,
    radius_threshold_meters: f64,
    computed_at: DateTime<Utc>,
) -> GpsValidationResult {
    if !radius_threshold_meters.is_finite() || radius_threshold_meters < 0.0 {
        return GpsValidationResult::no_data(
            radius_threshold_meters,
            computed_at,
            "Invalid radius threshold",
        );
    }
    let Some(shop) = shop else {
        return GpsValidationResult::no_data(
            radius_threshold_meters,
            computed_at,
            "Shop coordinates not available",
        );
    };
    if !shop.is_valid() {
        return GpsValidationResult::no_data(
            radius_threshold_meters,
            computed_at,
            "Shop coordinates out of range",
        );
    }

    let mut per_event_distance_meters = BTreeMap::new();
    let mut per_event_valid = BTreeMap::new();
    let mut valid_count = 0usize;
    let mut total_count = 0usize;

    for event in VisitEvent::VALIDATED {
        let distance = visit
            .event(event)
            .and_then(EventLocation::coordinates)
            .map(|point| haversine_distance_m(shop, point));
        let on_site = distance.is_some_and(|d| d <= radius_threshold_meters);

        if distance.is_some() {
            total_count += 1;
        }
        if on_site {
            valid_count += 1;
        }
        per_event_distance_meters.insert(event, distance);
        per_event_valid.insert(event, on_site);
    }

    let validation_status = ValidationStatus::classify(valid_count, total_count);

    GpsValidationResult {
        is_valid: validation_status.is_passing(),
        validation_status,
        shop_coordinates: Some(shop),
        per_event_distance_meters,
        per_event_valid,
        radius_threshold_meters,
        computed_at,
        error: None,
    }
}

#[cfg(test)]
#[path = "gps_test.rs"]
mod tests;
