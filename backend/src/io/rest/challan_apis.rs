//! # REST API for Challans
//!
//! Issuing single challans, class-wide generation from the fee template,
//! lookup and payment. Voucher routes are merged in from `voucher_apis`.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use shared::{BulkChallanRequest, CreateChallanRequest, PayChallanRequest};
use tracing::{error, info};

use super::mappers::challan_mapper::ChallanMapper;
use super::mappers::{date_or, parse_date};
use super::{error_response, today, voucher_apis};
use crate::domain::models::ChallanId;
use crate::domain::{LedgerError, LedgerResult};
use crate::AppState;

/// Create a router for challan related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_challan))
        .route("/bulk", post(generate_bulk))
        .route("/:id", get(get_challan))
        .route("/:id/pay", post(pay_challan))
        .merge(voucher_apis::challan_router())
}

/// Issue one challan and return it with its items
pub async fn create_challan(
    State(state): State<AppState>,
    Json(request): Json<CreateChallanRequest>,
) -> impl IntoResponse {
    info!("POST /api/challans - request: {:?}", request);

    let dates = date_or("issue_date", request.issue_date.as_deref(), today())
        .and_then(|issue| Ok((issue, parse_date("due_date", &request.due_date)?)));
    let (issue_date, due_date) = match dates {
        Ok(dates) => dates,
        Err(e) => return error_response(e),
    };

    let created = state
        .challan_service
        .create_challan(
            request.student_id,
            issue_date,
            due_date,
            ChallanMapper::fee_lines_to_domain(request.items),
            request.arrears,
            request.fine,
        )
        .await;
    let result = match created {
        Ok(id) => state.challan_service.challan_with_items(id).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(challan) => (StatusCode::CREATED, Json(challan)).into_response(),
        Err(e) => {
            error!("Failed to create challan: {}", e);
            error_response(e)
        }
    }
}

/// Generate challans for a list of students, issued today
pub async fn generate_bulk(
    State(state): State<AppState>,
    Json(request): Json<BulkChallanRequest>,
) -> impl IntoResponse {
    info!(
        "POST /api/challans/bulk - {} students",
        request.student_ids.len()
    );

    let command = ChallanMapper::to_bulk_command(request, &state.settings, today());
    match state.challan_service.generate_bulk(command).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => {
            error!("Failed to generate challans: {}", e);
            error_response(e)
        }
    }
}

pub async fn get_challan(
    State(state): State<AppState>,
    Path(id): Path<ChallanId>,
) -> impl IntoResponse {
    info!("GET /api/challans/{}", id);

    match state.challan_service.challan_with_items(id).await {
        Ok(challan) => (StatusCode::OK, Json(challan)).into_response(),
        Err(e) => {
            error!("Failed to get challan {}: {}", id, e);
            error_response(e)
        }
    }
}

/// Mark a challan paid. An empty body pays today; a body that is not a
/// valid request is refused, since payment cannot be undone.
pub async fn pay_challan(
    State(state): State<AppState>,
    Path(id): Path<ChallanId>,
    body: Bytes,
) -> impl IntoResponse {
    let request = match parse_pay_request(&body) {
        Ok(request) => request,
        Err(e) => {
            error!("Rejected payment request for challan {}: {}", id, e);
            return error_response(e);
        }
    };
    info!("POST /api/challans/{}/pay - request: {:?}", id, request);

    let payment_date = match date_or("payment_date", request.payment_date.as_deref(), today()) {
        Ok(date) => date,
        Err(e) => return error_response(e),
    };

    match state.challan_service.pay_challan(id, payment_date).await {
        Ok(challan) => (StatusCode::OK, Json(challan)).into_response(),
        Err(e) => {
            error!("Failed to pay challan {}: {}", id, e);
            error_response(e)
        }
    }
}

fn parse_pay_request(body: &[u8]) -> LedgerResult<PayChallanRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(PayChallanRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| LedgerError::validation(format!("invalid payment request: {}", e)))
}

#[cfg(test)]
mod tests {
    use crate::io::rest::test_support::{admit, body_json, issue, send, setup_test_app};
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_create_challan_freezes_total() {
        let app = setup_test_app().await;
        let ali = admit(&app, "Ali Khan", "Grade 3").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/challans",
            Some(json!({
                "student_id": ali,
                "issue_date": "2026-10-01",
                "due_date": "2026-10-16",
                "items": [
                    { "description": "Tuition Fee", "amount": 5000.0 },
                    { "description": "Lab Fee", "amount": 750.0 }
                ],
                "arrears": 1000.0,
                "fine": 250.0
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let created: Value = body_json(&body);
        assert_eq!(created["challan"]["total_amount"], 7000.0);
        assert_eq!(created["challan"]["status"], "Unpaid");
        assert_eq!(created["items"].as_array().unwrap().len(), 2);

        let id = created["challan"]["id"].as_i64().unwrap();
        let (status, body) = send(&app, Method::GET, &format!("/api/challans/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body_json::<Value>(&body)["challan"]["total_amount"], 7000.0);
    }

    #[tokio::test]
    async fn test_create_challan_errors() {
        let app = setup_test_app().await;
        let ali = admit(&app, "Ali Khan", "Grade 3").await;

        let unknown_student = json!({
            "student_id": 999,
            "issue_date": "2026-10-01",
            "due_date": "2026-10-16",
            "items": [{ "description": "Tuition Fee", "amount": 5000.0 }]
        });
        let (status, _) = send(&app, Method::POST, "/api/challans", Some(unknown_student)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let negative_line = json!({
            "student_id": ali,
            "due_date": "2026-12-31",
            "items": [{ "description": "Refund", "amount": -100.0 }]
        });
        let (status, _) = send(&app, Method::POST, "/api/challans", Some(negative_line)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let bad_date = json!({
            "student_id": ali,
            "due_date": "16/10/2026",
            "items": [{ "description": "Tuition Fee", "amount": 5000.0 }]
        });
        let (status, _) = send(&app, Method::POST, "/api/challans", Some(bad_date)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_pay_challan_once() {
        let app = setup_test_app().await;
        let ali = admit(&app, "Ali Khan", "Grade 3").await;
        let id = issue(&app, ali, "2026-10-01", "2026-10-16").await;
        let uri = format!("/api/challans/{}/pay", id);

        let (status, body) = send(
            &app,
            Method::POST,
            &uri,
            Some(json!({ "payment_date": "2026-10-10" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let paid: Value = body_json(&body);
        assert_eq!(paid["status"], "Paid");
        assert_eq!(paid["payment_date"], "2026-10-10");

        let (status, _) = send(
            &app,
            Method::POST,
            &uri,
            Some(json!({ "payment_date": "2026-10-12" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, body) = send(&app, Method::GET, &format!("/api/challans/{}", id), None).await;
        assert_eq!(body_json::<Value>(&body)["challan"]["payment_date"], "2026-10-10");

        let (status, _) = send(&app, Method::POST, "/api/challans/999/pay", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bulk_generation_reports_failures() {
        let app = setup_test_app().await;
        let ali = admit(&app, "Ali Khan", "Grade 3").await;
        let sara = admit(&app, "Sara Ahmed", "Grade 3").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/challans/bulk",
            Some(json!({ "student_ids": [ali, 999, sara] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let outcome: Value = body_json(&body);
        assert_eq!(outcome["succeeded"].as_array().unwrap().len(), 2);
        assert_eq!(outcome["failed"][0]["student_id"], 999);

        let (_, body) = send(&app, Method::GET, &format!("/api/students/{}/challans", sara), None).await;
        let challans: Vec<Value> = body_json(&body);
        assert_eq!(challans.len(), 1);
        assert_eq!(challans[0]["total_amount"], 5000.0);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/challans/bulk",
            Some(json!({ "student_ids": [ali], "items": [] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_payment_is_refused() {
        let app = setup_test_app().await;
        let ali = admit(&app, "Ali Khan", "Grade 3").await;
        let id = issue(&app, ali, "2020-01-01", "2020-01-16").await;
        let uri = format!("/api/challans/{}/pay", id);

        let (status, _) = send(
            &app,
            Method::POST,
            &uri,
            Some(json!({ "payment_date": 20261010 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Method::POST,
            &uri,
            Some(json!({ "payment_date": "10/10/2026" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = send(&app, Method::GET, &format!("/api/challans/{}", id), None).await;
        let challan: Value = body_json(&body);
        assert_eq!(challan["challan"]["status"], "Unpaid");
        assert_eq!(challan["challan"]["payment_date"], Value::Null);

        let (status, body) = send(&app, Method::POST, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body_json::<Value>(&body)["status"], "Paid");
    }
}
