//! # REST API for Reports
//!
//! Read-only report endpoints under `/api/reports` plus the class fee
//! screen under `/api/classes/:class/fees`. Date ranges are inclusive
//! `YYYY-MM-DD` query parameters.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{error, info};

use super::mappers::{parse_class, parse_date};
use super::{error_response, today};
use crate::domain::LedgerResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PostingSheetParams {
    pub month: u32,
    pub year: i32,
}

#[derive(Debug, Deserialize)]
pub struct DateRangeParams {
    pub start: String,
    pub end: String,
}

impl DateRangeParams {
    fn parse(&self) -> LedgerResult<(NaiveDate, NaiveDate)> {
        Ok((parse_date("start", &self.start)?, parse_date("end", &self.end)?))
    }
}

/// Create a router for report APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/fee-summary", get(fee_summary))
        .route("/defaulters", get(classwise_defaulters))
        .route("/posting-sheet", get(posting_sheet))
        .route("/collections", get(collection_summary))
        .route("/admissions", get(new_admissions))
        .route("/struck-off", get(struck_off))
        .route("/passed-out", get(passed_out))
        .route("/dashboard", get(dashboard))
}

/// Create a router for per-class views
pub fn class_router() -> Router<AppState> {
    Router::new().route("/:class/fees", get(class_fees))
}

pub async fn fee_summary(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/reports/fee-summary");

    match state.report_service.fee_summary().await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(e) => {
            error!("Failed to build fee summary: {}", e);
            error_response(e)
        }
    }
}

pub async fn classwise_defaulters(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/reports/defaulters");

    match state.report_service.classwise_defaulters().await {
        Ok(grouped) => (StatusCode::OK, Json(grouped)).into_response(),
        Err(e) => {
            error!("Failed to build defaulters list: {}", e);
            error_response(e)
        }
    }
}

pub async fn posting_sheet(
    State(state): State<AppState>,
    Query(params): Query<PostingSheetParams>,
) -> impl IntoResponse {
    info!(
        "GET /api/reports/posting-sheet - {}/{}",
        params.month, params.year
    );

    match state
        .report_service
        .posting_sheet(params.month, params.year)
        .await
    {
        Ok(grouped) => (StatusCode::OK, Json(grouped)).into_response(),
        Err(e) => {
            error!("Failed to build posting sheet: {}", e);
            error_response(e)
        }
    }
}

pub async fn collection_summary(
    State(state): State<AppState>,
    Query(params): Query<DateRangeParams>,
) -> impl IntoResponse {
    info!("GET /api/reports/collections - {:?}", params);

    let (start, end) = match params.parse() {
        Ok(range) => range,
        Err(e) => return error_response(e),
    };
    match state.report_service.collection_summary(start, end).await {
        Ok(days) => (StatusCode::OK, Json(days)).into_response(),
        Err(e) => {
            error!("Failed to build collection summary: {}", e);
            error_response(e)
        }
    }
}

pub async fn new_admissions(
    State(state): State<AppState>,
    Query(params): Query<DateRangeParams>,
) -> impl IntoResponse {
    info!("GET /api/reports/admissions - {:?}", params);

    let (start, end) = match params.parse() {
        Ok(range) => range,
        Err(e) => return error_response(e),
    };
    match state.report_service.new_admissions(start, end).await {
        Ok(students) => (StatusCode::OK, Json(students)).into_response(),
        Err(e) => {
            error!("Failed to list new admissions: {}", e);
            error_response(e)
        }
    }
}

pub async fn struck_off(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/reports/struck-off");

    match state.report_service.struck_off().await {
        Ok(students) => (StatusCode::OK, Json(students)).into_response(),
        Err(e) => {
            error!("Failed to list struck-off students: {}", e);
            error_response(e)
        }
    }
}

pub async fn passed_out(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/reports/passed-out");

    match state.report_service.passed_out().await {
        Ok(students) => (StatusCode::OK, Json(students)).into_response(),
        Err(e) => {
            error!("Failed to list passed-out students: {}", e);
            error_response(e)
        }
    }
}

pub async fn dashboard(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/reports/dashboard");

    match state.report_service.dashboard().await {
        Ok(dashboard) => (StatusCode::OK, Json(dashboard)).into_response(),
        Err(e) => {
            error!("Failed to build dashboard: {}", e);
            error_response(e)
        }
    }
}

/// The class fee screen, classified against today's date
pub async fn class_fees(
    State(state): State<AppState>,
    Path(class): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/classes/{}/fees", class);

    let class = match parse_class(&class) {
        Ok(class) => class,
        Err(e) => return error_response(e),
    };
    match state.report_service.class_fee_view(class, today()).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => {
            error!("Failed to build fee view for {}: {}", class, e);
            error_response(e)
        }
    }
}
