//! # REST API for Printable Documents
//!
//! Fee vouchers hang off `/api/challans/:id` and admission forms off
//! `/api/students/:id`. Each document is available as structured JSON and as
//! text from the configured renderer.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::{error, info};

use super::{error_response, today};
use crate::domain::models::{ChallanId, StudentId};
use crate::AppState;

/// Voucher routes, merged into the challan router
pub fn challan_router() -> Router<AppState> {
    Router::new()
        .route("/:id/voucher", get(get_voucher))
        .route("/:id/voucher.txt", get(print_voucher))
}

/// Admission form routes, merged into the student router
pub fn student_router() -> Router<AppState> {
    Router::new()
        .route("/:id/admission-form", get(get_admission_form))
        .route("/:id/admission-form.txt", get(print_admission_form))
}

pub async fn get_voucher(
    State(state): State<AppState>,
    Path(id): Path<ChallanId>,
) -> impl IntoResponse {
    info!("GET /api/challans/{}/voucher", id);

    match state.voucher_service.voucher(id, today()).await {
        Ok(voucher) => (StatusCode::OK, Json(voucher)).into_response(),
        Err(e) => {
            error!("Failed to build voucher for challan {}: {}", id, e);
            error_response(e)
        }
    }
}

pub async fn print_voucher(
    State(state): State<AppState>,
    Path(id): Path<ChallanId>,
) -> impl IntoResponse {
    info!("GET /api/challans/{}/voucher.txt", id);

    match state.voucher_service.voucher(id, today()).await {
        Ok(voucher) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, state.renderer.content_type())],
            state.renderer.render_voucher(&voucher),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to print voucher for challan {}: {}", id, e);
            error_response(e)
        }
    }
}

pub async fn get_admission_form(
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
) -> impl IntoResponse {
    info!("GET /api/students/{}/admission-form", id);

    match state.voucher_service.admission_form(id).await {
        Ok(form) => (StatusCode::OK, Json(form)).into_response(),
        Err(e) => {
            error!("Failed to build admission form for student {}: {}", id, e);
            error_response(e)
        }
    }
}

pub async fn print_admission_form(
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
) -> impl IntoResponse {
    info!("GET /api/students/{}/admission-form.txt", id);

    match state.voucher_service.admission_form(id).await {
        Ok(form) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, state.renderer.content_type())],
            state.renderer.render_admission_form(&form),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to print admission form for student {}: {}", id, e);
            error_response(e)
        }
    }
}
