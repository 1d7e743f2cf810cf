//! # REST API for Promotions
//!
//! Preview who a class would promote and where to, then promote a selection.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use shared::PromoteRequest;
use tracing::{error, info};

use super::error_response;
use super::mappers::parse_class;
use super::mappers::promotion_mapper::PromotionMapper;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PreviewParams {
    pub class: String,
}

/// Create a router for promotion APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(promote_students))
        .route("/preview", get(preview_promotion))
}

pub async fn preview_promotion(
    State(state): State<AppState>,
    Query(params): Query<PreviewParams>,
) -> impl IntoResponse {
    info!("GET /api/promotions/preview - class: {}", params.class);

    let class = match parse_class(&params.class) {
        Ok(class) => class,
        Err(e) => return error_response(e),
    };
    match state.promotion_service.preview(class).await {
        Ok(preview) => (StatusCode::OK, Json(preview)).into_response(),
        Err(e) => {
            error!("Failed to preview promotion of {}: {}", class, e);
            error_response(e)
        }
    }
}

/// Promote the selected students; per-student failures are in the outcome
pub async fn promote_students(
    State(state): State<AppState>,
    Json(request): Json<PromoteRequest>,
) -> impl IntoResponse {
    info!("POST /api/promotions - request: {:?}", request);

    let command = match PromotionMapper::to_command(request) {
        Ok(command) => command,
        Err(e) => return error_response(e),
    };
    match state.promotion_service.promote(command).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => {
            error!("Failed to promote students: {}", e);
            error_response(e)
        }
    }
}
