use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use shopaudit_core::{gps_report, normalize, validate_visit, GpsValidationResult, ShopGpsReport};

use crate::middleware::RequestId;

use super::{resolve_radius, ApiError, ApiResponse, AppState};

/// Raw backend records; any supported field naming is accepted.
#[derive(Debug, Deserialize)]
pub(super) struct ValidateRequest {
    pub shop: serde_json::Value,
    pub visit: serde_json::Value,
    pub radius_threshold_m: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ShopReportRequest {
    pub shop: serde_json::Value,
    pub radius_threshold_m: Option<f64>,
}

pub(super) async fn validate(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ValidateRequest>,
) -> Result<Json<ApiResponse<GpsValidationResult>>, ApiError> {
    let radius = resolve_radius(&req_id.0, body.radius_threshold_m, &state.config)?;

    let result = validate_visit(
        normalize::shop_coordinates(&body.shop),
        &normalize::visit_location(&body.visit),
        radius,
    );
    tracing::debug!(
        visit_id = ?normalize::visit_id(&body.visit),
        status = %result.validation_status,
        "validated visit"
    );

    Ok(ApiResponse::new(result, req_id.0))
}

pub(super) async fn shop_report(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ShopReportRequest>,
) -> Result<Json<ApiResponse<ShopGpsReport>>, ApiError> {
    let radius = resolve_radius(&req_id.0, body.radius_threshold_m, &state.config)?;
    Ok(ApiResponse::new(gps_report(&body.shop, radius), req_id.0))
}
