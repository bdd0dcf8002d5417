use clap::Parser;
use shopaudit_core::AppConfig;
use shopaudit_vision::ImageSource;

use super::{Cli, Commands};
use crate::detect::{image_source, DetectCommands};
use crate::gps::{resolve_radius, GpsCommands};

fn config() -> AppConfig {
    AppConfig {
        env: shopaudit_core::Environment::Test,
        bind_addr: "127.0.0.1:0".parse().expect("addr"),
        log_level: "info".to_string(),
        keywords_path: None,
        gps_radius_m: 30.0,
        vision_api_key: None,
        vision_base_url: "https://vision.googleapis.com".to_string(),
        vision_request_timeout_secs: 5,
        vision_max_retries: 0,
        vision_retry_backoff_base_ms: 0,
        rate_limit_max_requests: 120,
        rate_limit_window_secs: 60,
    }
}

#[test]
fn no_subcommand_parses() {
    let cli = Cli::try_parse_from(["shopaudit-cli"]).expect("parse");
    assert!(cli.command.is_none());
}

#[test]
fn gps_validate_accepts_negative_coordinates() {
    let cli = Cli::try_parse_from([
        "shopaudit-cli",
        "gps",
        "validate",
        "--shop-lat",
        "-33.8688",
        "--shop-lng",
        "151.2093",
        "--start-lat",
        "-33.8689",
        "--start-lng",
        "151.2093",
        "--radius",
        "50",
    ])
    .expect("parse");

    match cli.command {
        Some(Commands::Gps {
            command:
                GpsCommands::Validate {
                    shop_lat,
                    start_lat,
                    photo_lat,
                    radius,
                    ..
                },
        }) => {
            assert!((shop_lat + 33.8688).abs() < f64::EPSILON);
            assert_eq!(start_lat, Some(-33.8689));
            assert_eq!(photo_lat, None);
            assert_eq!(radius, Some(50.0));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn gps_validate_requires_shop_coordinates() {
    let result = Cli::try_parse_from(["shopaudit-cli", "gps", "validate", "--shop-lat", "30.0"]);
    assert!(result.is_err());
}

#[test]
fn gps_validate_requires_both_halves_of_an_event() {
    let result = Cli::try_parse_from([
        "shopaudit-cli",
        "gps",
        "validate",
        "--shop-lat",
        "30.0",
        "--shop-lng",
        "69.0",
        "--photo-lat",
        "30.0",
    ]);
    assert!(result.is_err());
}

#[test]
fn gps_report_takes_a_path() {
    let cli = Cli::try_parse_from(["shopaudit-cli", "gps", "report", "shop.json"]).expect("parse");
    assert!(matches!(
        cli.command,
        Some(Commands::Gps {
            command: GpsCommands::Report { radius: None, .. }
        })
    ));
}

#[test]
fn detect_summarize_with_keywords_file() {
    let cli = Cli::try_parse_from([
        "shopaudit-cli",
        "detect",
        "summarize",
        "response.json",
        "--keywords",
        "config/keywords.yaml",
    ])
    .expect("parse");
    assert!(matches!(
        cli.command,
        Some(Commands::Detect {
            command: DetectCommands::Summarize {
                keywords: Some(_),
                ..
            }
        })
    ));
}

#[test]
fn detect_analyze_takes_many_images() {
    let cli = Cli::try_parse_from([
        "shopaudit-cli",
        "detect",
        "analyze",
        "shelf-1.jpg",
        "gs://bucket/shelf-2.jpg",
        "--concurrency",
        "2",
    ])
    .expect("parse");

    match cli.command {
        Some(Commands::Detect {
            command:
                DetectCommands::Analyze {
                    images,
                    concurrency,
                    ..
                },
        }) => {
            assert_eq!(images.len(), 2);
            assert_eq!(concurrency, 2);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn detect_analyze_requires_an_image() {
    let result = Cli::try_parse_from(["shopaudit-cli", "detect", "analyze"]);
    assert!(result.is_err());
}

#[test]
fn radius_flag_overrides_config_default() {
    let config = config();
    assert!((resolve_radius(None, &config).unwrap() - 30.0).abs() < f64::EPSILON);
    assert!((resolve_radius(Some(75.0), &config).unwrap() - 75.0).abs() < f64::EPSILON);
    assert!(resolve_radius(Some(-5.0), &config).is_err());
    assert!(resolve_radius(Some(f64::NAN), &config).is_err());
}

#[test]
fn remote_images_are_passed_by_uri() {
    let source = image_source("gs://bucket/shelf.jpg").expect("source");
    assert_eq!(source, ImageSource::Uri("gs://bucket/shelf.jpg".to_string()));
}

#[test]
fn missing_local_image_is_an_error() {
    let err = image_source("/definitely/not/here.jpg").unwrap_err();
    assert!(err.to_string().contains("failed to read image"));
}
