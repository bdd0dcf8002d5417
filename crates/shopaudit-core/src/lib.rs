//! Core domain logic for retail shop audits.
//!
//! Everything in this crate is synchronous and side-effect free apart from
//! configuration loading. Visit authenticity is decided by [`gps`], brand
//! presence on shelf photos by [`detection`]. Raw backend payloads must pass
//! through [`normalize`] before reaching either.

pub mod app_config;
pub mod config;
pub mod detection;
pub mod geo;
pub mod gps;
pub mod keywords;
pub mod normalize;
pub mod report;
pub mod vision;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use detection::{
    summarize_detection, summarize_detection_at, summarize_envelope, summarize_envelope_at,
    AiDetectionResult, Detection, DetectionMethod, LogoMatch,
};
pub use geo::{haversine_distance_m, Coordinates, EARTH_RADIUS_METERS};
pub use gps::{
    validate_visit, validate_visit_at, EventLocation, GpsValidationResult, ValidationStatus,
    VisitEvent, VisitLocation, DEFAULT_RADIUS_THRESHOLD_M,
};
pub use keywords::{load_keywords, load_keywords_or_default, BrandKeywords};
pub use report::{
    detection_report, gps_report, gps_report_at, DetectionSummary, GpsStatusCounts,
    ShopDetectionReport, ShopGpsReport, VisitDetection, VisitGpsValidation,
};
pub use vision::{AnnotateImageResponse, AnnotateResponse};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read keywords file {path}: {source}")]
    KeywordsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse keywords file: {0}")]
    KeywordsFileParse(#[from] serde_yaml::Error),

    #[error("keywords validation failed: {0}")]
    Validation(String),
}
