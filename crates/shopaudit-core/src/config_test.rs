use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_test() {
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_is_rejected() {
    let result = parse_environment("staging");
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHOPAUDIT_ENV"),
        "expected InvalidEnvVar(SHOPAUDIT_ENV), got: {result:?}"
    );
}

#[test]
fn build_app_config_succeeds_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should be valid");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert!(cfg.keywords_path.is_none());
    assert!((cfg.gps_radius_m - 30.0).abs() < f64::EPSILON);
    assert!(cfg.vision_api_key.is_none());
    assert_eq!(cfg.vision_base_url, "https://vision.googleapis.com");
    assert_eq!(cfg.vision_request_timeout_secs, 30);
    assert_eq!(cfg.vision_max_retries, 3);
    assert_eq!(cfg.vision_retry_backoff_base_ms, 1000);
    assert_eq!(cfg.rate_limit_max_requests, 120);
    assert_eq!(cfg.rate_limit_window_secs, 60);
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = HashMap::new();
    map.insert("SHOPAUDIT_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHOPAUDIT_BIND_ADDR"),
        "expected InvalidEnvVar(SHOPAUDIT_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn gps_radius_override() {
    let mut map = HashMap::new();
    map.insert("SHOPAUDIT_GPS_RADIUS_M", "50.5");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!((cfg.gps_radius_m - 50.5).abs() < f64::EPSILON);
}

#[test]
fn gps_radius_negative_is_rejected() {
    let mut map = HashMap::new();
    map.insert("SHOPAUDIT_GPS_RADIUS_M", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHOPAUDIT_GPS_RADIUS_M"),
        "expected InvalidEnvVar(SHOPAUDIT_GPS_RADIUS_M), got: {result:?}"
    );
}

#[test]
fn gps_radius_not_a_number_is_rejected() {
    let mut map = HashMap::new();
    map.insert("SHOPAUDIT_GPS_RADIUS_M", "thirty");
    assert!(build_app_config(lookup_from_map(&map)).is_err());
}

#[test]
fn gps_radius_nan_is_rejected() {
    let mut map = HashMap::new();
    map.insert("SHOPAUDIT_GPS_RADIUS_M", "NaN");
    assert!(build_app_config(lookup_from_map(&map)).is_err());
}

#[test]
fn keywords_path_is_read_when_set() {
    let mut map = HashMap::new();
    map.insert("SHOPAUDIT_KEYWORDS_PATH", "./config/keywords.yaml");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.keywords_path.as_deref(),
        Some(std::path::Path::new("./config/keywords.yaml"))
    );
}

#[test]
fn blank_vision_api_key_is_treated_as_absent() {
    let mut map = HashMap::new();
    map.insert("VISION_API_KEY", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.vision_api_key.is_none());
}

#[test]
fn vision_api_key_is_redacted_in_debug() {
    let mut map = HashMap::new();
    map.insert("VISION_API_KEY", "super-secret-key");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("super-secret-key"));
    assert!(rendered.contains("[redacted]"));
}

#[test]
fn vision_max_retries_invalid() {
    let mut map = HashMap::new();
    map.insert("SHOPAUDIT_VISION_MAX_RETRIES", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHOPAUDIT_VISION_MAX_RETRIES"),
        "expected InvalidEnvVar(SHOPAUDIT_VISION_MAX_RETRIES), got: {result:?}"
    );
}

#[test]
fn vision_request_timeout_override() {
    let mut map = HashMap::new();
    map.insert("SHOPAUDIT_VISION_REQUEST_TIMEOUT_SECS", "60");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.vision_request_timeout_secs, 60);
}

#[test]
fn rate_limit_override() {
    let mut map = HashMap::new();
    map.insert("SHOPAUDIT_RATE_LIMIT_MAX_REQUESTS", "10");
    map.insert("SHOPAUDIT_RATE_LIMIT_WINDOW_SECS", "5");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.rate_limit_max_requests, 10);
    assert_eq!(cfg.rate_limit_window_secs, 5);
}
