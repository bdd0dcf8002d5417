//! Boundary adapter from backend JSON payloads to canonical types.
//!
//! Shop and visit records reach us in several historical shapes. All
//! shape-sniffing happens here; [`crate::gps`] and [`crate::report`] only see
//! [`Coordinates`] and [`VisitLocation`].

use serde_json::Value;

use crate::geo::Coordinates;
use crate::gps::{EventLocation, VisitEvent, VisitLocation};

/// Coordinate field pairs tried, in order, at the top level of a shop record.
const SHOP_COORDINATE_FIELDS: &[(&str, &str)] =
    &[("gps_n", "gps_e"), ("lat", "lng"), ("latitude", "longitude")];

/// Read a JSON number, or a string holding one.
#[must_use]
pub fn value_as_f64(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
        .filter(|v| v.is_finite())
}

fn field_f64(obj: &Value, key: &str) -> Option<f64> {
    obj.get(key).and_then(value_as_f64)
}

fn first_f64(obj: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| field_f64(obj, key))
}

/// Extract the registered shop location.
///
/// Tries a nested `coordinates` object (`lat`/`lng`, `lat`/`lon`,
/// `latitude`/`longitude`) first, then top-level `gps_n`/`gps_e`,
/// `lat`/`lng` and `latitude`/`longitude`. Returns `None` when no pair is
/// complete. Range checking is left to the validator.
#[must_use]
pub fn shop_coordinates(shop: &Value) -> Option<Coordinates> {
    if let Some(nested) = shop.get("coordinates").filter(|c| c.is_object()) {
        let lat = first_f64(nested, &["lat", "latitude"]);
        let lng = first_f64(nested, &["lng", "lon", "longitude"]);
        if let (Some(lat), Some(lng)) = (lat, lng) {
            return Some(Coordinates::new(lat, lng));
        }
    }

    let found = SHOP_COORDINATE_FIELDS
        .iter()
        .find_map(|(lat_key, lng_key)| {
            Some(Coordinates::new(
                field_f64(shop, lat_key)?,
                field_f64(shop, lng_key)?,
            ))
        });
    if found.is_none() {
        tracing::debug!(shop_id = ?visit_id(shop), "shop record has no usable coordinates");
    }
    found
}

/// Extract the GPS samples of one visit record.
///
/// Each half of each event is resolved independently, first match wins:
/// `startAuditLat`, `start_audit_lat`, `startAuditLocation.lat`, then
/// `visitLocation.startAudit.latitude` (or the snake-case
/// `visit_location.start_audit.latitude`). Same pattern for `Lng`/`longitude`
/// and for the other events.
#[must_use]
pub fn visit_location(visit: &Value) -> VisitLocation {
    let nested = visit
        .get("visitLocation")
        .or_else(|| visit.get("visit_location"))
        .filter(|v| v.is_object());

    let mut location = VisitLocation::default();
    for event in VisitEvent::ALL {
        let sample = EventLocation {
            latitude: event_component(visit, nested, event, Component::Latitude),
            longitude: event_component(visit, nested, event, Component::Longitude),
        };
        location.set_event(event, sample);
    }
    location
}

#[derive(Clone, Copy)]
enum Component {
    Latitude,
    Longitude,
}

impl Component {
    fn camel_suffix(self) -> &'static str {
        match self {
            Component::Latitude => "Lat",
            Component::Longitude => "Lng",
        }
    }

    fn short(self) -> &'static str {
        match self {
            Component::Latitude => "lat",
            Component::Longitude => "lng",
        }
    }

    fn long(self) -> &'static str {
        match self {
            Component::Latitude => "latitude",
            Component::Longitude => "longitude",
        }
    }
}

fn event_component(
    visit: &Value,
    nested: Option<&Value>,
    event: VisitEvent,
    component: Component,
) -> Option<f64> {
    let camel = event.as_str();
    let snake = event.snake_name();

    field_f64(visit, &format!("{camel}{}", component.camel_suffix()))
        .or_else(|| field_f64(visit, &format!("{snake}_{}", component.short())))
        .or_else(|| {
            visit
                .get(format!("{camel}Location"))
                .and_then(|loc| first_f64(loc, &[component.short(), component.long()]))
        })
        .or_else(|| {
            let nested = nested?;
            nested
                .get(camel)
                .or_else(|| nested.get(snake))
                .and_then(|sample| first_f64(sample, &[component.long(), component.short()]))
        })
}

/// The record id: `_id` or `id`, string or number.
#[must_use]
pub fn visit_id(record: &Value) -> Option<String> {
    let raw = record.get("_id").or_else(|| record.get("id"))?;
    match raw {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The visit records attached to a shop: `visitImages` or `visit_images`.
#[must_use]
pub fn shop_visits(shop: &Value) -> &[Value] {
    shop.get("visitImages")
        .or_else(|| shop.get("visit_images"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
