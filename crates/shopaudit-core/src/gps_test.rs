use chrono::TimeZone;

use super::*;

const SHOP: Coordinates = Coordinates::new(30.0, 69.0);

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
}

fn validate(shop: Option<Coordinates>, visit: &VisitLocation) -> GpsValidationResult {
    validate_visit_at(shop, visit, DEFAULT_RADIUS_THRESHOLD_M, fixed_time())
}

#[test]
fn both_events_on_site_is_valid() {
    let visit = VisitLocation::default()
        .with_event(VisitEvent::StartAudit, 30.0, 69.0)
        .with_event(VisitEvent::PhotoClick, 30.0001, 69.0);
    let result = validate(Some(SHOP), &visit);

    assert_eq!(result.validation_status, ValidationStatus::Valid);
    assert!(result.is_valid);
    assert!(result.event_valid(VisitEvent::StartAudit));
    assert!(result.event_valid(VisitEvent::PhotoClick));
    assert_eq!(result.distance(VisitEvent::StartAudit), Some(0.0));
    assert!(result.error.is_none());
}

#[test]
fn one_event_off_site_is_partial_and_still_passes() {
    let visit = VisitLocation::default()
        .with_event(VisitEvent::StartAudit, 30.0, 69.0)
        .with_event(VisitEvent::PhotoClick, 30.001, 69.0);
    let result = validate(Some(SHOP), &visit);

    assert_eq!(result.validation_status, ValidationStatus::Partial);
    assert!(result.is_valid);
    assert!(result.event_valid(VisitEvent::StartAudit));
    assert!(!result.event_valid(VisitEvent::PhotoClick));
    let photo = result.distance(VisitEvent::PhotoClick).unwrap();
    assert!((photo - 111.19).abs() < 0.01, "got {photo}");
}

#[test]
fn all_events_off_site_is_invalid() {
    let visit = VisitLocation::default()
        .with_event(VisitEvent::StartAudit, 30.01, 69.0)
        .with_event(VisitEvent::PhotoClick, 30.0, 69.01);
    let result = validate(Some(SHOP), &visit);

    assert_eq!(result.validation_status, ValidationStatus::Invalid);
    assert!(!result.is_valid);
}

#[test]
fn missing_events_do_not_count_against_the_visit() {
    let visit = VisitLocation::default().with_event(VisitEvent::PhotoClick, 30.0, 69.0);
    let result = validate(Some(SHOP), &visit);

    assert_eq!(result.validation_status, ValidationStatus::Valid);
    assert_eq!(result.distance(VisitEvent::StartAudit), None);
    assert!(!result.event_valid(VisitEvent::StartAudit));
}

#[test]
fn half_present_event_is_treated_as_missing() {
    let mut visit = VisitLocation::default().with_event(VisitEvent::PhotoClick, 30.0, 69.0);
    visit.set_event(
        VisitEvent::StartAudit,
        EventLocation {
            latitude: Some(30.0),
            longitude: None,
        },
    );
    let result = validate(Some(SHOP), &visit);

    assert_eq!(result.validation_status, ValidationStatus::Valid);
    assert_eq!(result.distance(VisitEvent::StartAudit), None);
}

#[test]
fn out_of_range_event_coordinates_are_ignored() {
    let visit = VisitLocation::default()
        .with_event(VisitEvent::StartAudit, 120.0, 69.0)
        .with_event(VisitEvent::PhotoClick, 30.0, 69.0);
    let result = validate(Some(SHOP), &visit);

    assert_eq!(result.validation_status, ValidationStatus::Valid);
    assert_eq!(result.distance(VisitEvent::StartAudit), None);
}

#[test]
fn no_event_data_is_no_data_without_error() {
    let result = validate(Some(SHOP), &VisitLocation::default());

    assert_eq!(result.validation_status, ValidationStatus::NoData);
    assert!(!result.is_valid);
    assert!(result.error.is_none());
    assert_eq!(result.shop_coordinates, Some(SHOP));
}

#[test]
fn proceed_click_is_not_validated() {
    let visit = VisitLocation::default().with_event(VisitEvent::ProceedClick, 30.0, 69.0);
    let result = validate(Some(SHOP), &visit);

    assert_eq!(result.validation_status, ValidationStatus::NoData);
    assert!(!result
        .per_event_distance_meters
        .contains_key(&VisitEvent::ProceedClick));
}

#[test]
fn missing_shop_coordinates_is_no_data_with_error() {
    let visit = VisitLocation::default().with_event(VisitEvent::StartAudit, 30.0, 69.0);
    let result = validate(None, &visit);

    assert_eq!(result.validation_status, ValidationStatus::NoData);
    assert!(!result.is_valid);
    assert_eq!(
        result.error.as_deref(),
        Some("Shop coordinates not available")
    );
    assert!(result.shop_coordinates.is_none());
    assert_eq!(result.distance(VisitEvent::StartAudit), None);
}

#[test]
fn out_of_range_shop_coordinates_is_no_data_with_error() {
    let visit = VisitLocation::default().with_event(VisitEvent::StartAudit, 30.0, 69.0);
    let result = validate(Some(Coordinates::new(95.0, 69.0)), &visit);

    assert_eq!(result.validation_status, ValidationStatus::NoData);
    assert_eq!(
        result.error.as_deref(),
        Some("Shop coordinates out of range")
    );
}

#[test]
fn negative_radius_is_rejected() {
    let visit = VisitLocation::default().with_event(VisitEvent::StartAudit, 30.0, 69.0);
    let result = validate_visit_at(Some(SHOP), &visit, -5.0, fixed_time());

    assert_eq!(result.validation_status, ValidationStatus::NoData);
    assert_eq!(result.error.as_deref(), Some("Invalid radius threshold"));
}

#[test]
fn radius_boundary_is_inclusive() {
    let visit = VisitLocation::default().with_event(VisitEvent::PhotoClick, 30.001, 69.0);
    let at_boundary = validate_visit_at(Some(SHOP), &visit, 111.19, fixed_time());
    let just_below = validate_visit_at(Some(SHOP), &visit, 111.18, fixed_time());

    assert_eq!(at_boundary.validation_status, ValidationStatus::Valid);
    assert_eq!(just_below.validation_status, ValidationStatus::Invalid);
}

#[test]
fn validation_is_deterministic_for_fixed_time() {
    let visit = VisitLocation::default()
        .with_event(VisitEvent::StartAudit, 30.000_2, 69.000_1)
        .with_event(VisitEvent::PhotoClick, 30.002, 69.0);
    assert_eq!(validate(Some(SHOP), &visit), validate(Some(SHOP), &visit));
}

#[test]
fn result_serializes_with_camel_case_keys() {
    let visit = VisitLocation::default().with_event(VisitEvent::StartAudit, 30.0, 69.0);
    let json = serde_json::to_value(validate(Some(SHOP), &visit)).unwrap();

    assert_eq!(json["isValid"], true);
    assert_eq!(json["validationStatus"], "valid");
    assert_eq!(json["perEventDistanceMeters"]["startAudit"], 0.0);
    assert!(json["perEventDistanceMeters"]["photoClick"].is_null());
    assert_eq!(json["perEventValid"]["photoClick"], false);
    assert_eq!(json["radiusThresholdMeters"], 30.0);
    assert!(json.get("error").is_none());
}

#[test]
fn visit_location_deserializes_from_camel_case() {
    let visit: VisitLocation = serde_json::from_str(
        r#"{"startAudit": {"latitude": 30.0, "longitude": 69.0}, "photoClick": {"latitude": null}}"#,
    )
    .unwrap();

    assert_eq!(
        visit.event(VisitEvent::StartAudit).and_then(EventLocation::coordinates),
        Some(SHOP)
    );
    assert_eq!(
        visit.event(VisitEvent::PhotoClick).and_then(EventLocation::coordinates),
        None
    );
    assert!(visit.event(VisitEvent::ProceedClick).is_none());
}

#[test]
fn status_strings_are_snake_case() {
    assert_eq!(ValidationStatus::NoData.as_str(), "no_data");
    assert_eq!(
        serde_json::to_value(ValidationStatus::NoData).unwrap(),
        "no_data"
    );
    assert_eq!(VisitEvent::PhotoClick.to_string(), "photoClick");
    assert_eq!(VisitEvent::PhotoClick.snake_name(), "photo_click");
}

#[test]
fn antipodal_event_keeps_a_numeric_distance() {
    let visit = VisitLocation::default().with_event(VisitEvent::StartAudit, 82.0, 0.0);
    let result = validate(Some(Coordinates::new(-82.0, -180.0)), &visit);

    assert_eq!(result.validation_status, ValidationStatus::Invalid);
    let distance = result.distance(VisitEvent::StartAudit).unwrap();
    assert!(distance.is_finite(), "got {distance}");

    let json = serde_json::to_value(&result).unwrap();
    assert!(json["perEventDistanceMeters"]["startAudit"].is_number());
}
