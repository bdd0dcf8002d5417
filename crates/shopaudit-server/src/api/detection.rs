use axum::{extract::State, Extension, Json};
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use shopaudit_core::{
    summarize_envelope, summarize_envelope_at, AiDetectionResult, AnnotateResponse,
    ShopDetectionReport, VisitDetection,
};
use shopaudit_vision::ImageSource;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeRequest {
    pub image_base64: Option<String>,
    pub image_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ReportRequest {
    pub visits: Vec<ReportVisit>,
}

/// One stored visit: the raw vision envelope, if the visit was analyzed.
#[derive(Debug, Deserialize)]
pub(super) struct ReportVisit {
    pub visit_id: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub response: Option<AnnotateResponse>,
}

pub(super) async fn summarize(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(envelope): Json<AnnotateResponse>,
) -> Json<ApiResponse<AiDetectionResult>> {
    ApiResponse::new(summarize_envelope(&envelope, &state.keywords), req_id.0)
}

pub(super) async fn analyze(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<ApiResponse<AiDetectionResult>>, ApiError> {
    let Some(vision) = state.vision.as_ref() else {
        return Err(ApiError::new(
            req_id.0,
            "vision_unavailable",
            "vision API key is not configured",
        ));
    };

    let image = parse_image_source(&req_id.0, body)?;
    let result = vision.analyze(&image, &state.keywords).await;

    Ok(ApiResponse::new(result, req_id.0))
}

pub(super) async fn report(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ReportRequest>,
) -> Json<ApiResponse<ShopDetectionReport>> {
    let now = Utc::now();
    let visits = body
        .visits
        .into_iter()
        .map(|visit| VisitDetection {
            visit_id: visit.visit_id,
            detection: visit.response.map(|envelope| {
                summarize_envelope_at(
                    &envelope,
                    &state.keywords,
                    visit.processed_at.unwrap_or(now),
                )
            }),
        })
        .collect();

    ApiResponse::new(ShopDetectionReport::new(visits), req_id.0)
}

fn parse_image_source(req_id: &str, body: AnalyzeRequest) -> Result<ImageSource, ApiError> {
    let image_base64 = body.image_base64.filter(|s| !s.trim().is_empty());
    let image_uri = body.image_uri.filter(|s| !s.trim().is_empty());

    match (image_base64, image_uri) {
        (Some(encoded), None) => base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map(ImageSource::Bytes)
            .map_err(|e| {
                ApiError::new(
                    req_id,
                    "validation_error",
                    format!("image_base64 is not valid base64: {e}"),
                )
            }),
        (None, Some(uri)) => Ok(ImageSource::Uri(uri)),
        _ => Err(ApiError::new(
            req_id,
            "validation_error",
            "provide exactly one of image_base64 or image_uri",
        )),
    }
}
