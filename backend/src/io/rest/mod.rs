//! # REST API Interface Layer
//!
//! HTTP endpoints for the fee ledger. Handlers translate JSON into domain
//! calls through the mappers and translate [`LedgerError`] into status codes:
//!
//! | error                 | status |
//! |-----------------------|--------|
//! | `NotFound`            | 404    |
//! | `Validation`          | 400    |
//! | `ConstraintViolation` | 409    |
//! | `AlreadyPaid`         | 409    |
//! | `Storage`             | 500    |
//!
//! Error bodies are `{"error": "<message>"}`.

pub mod challan_apis;
pub mod mappers;
pub mod promotion_apis;
pub mod report_apis;
pub mod student_apis;
pub mod voucher_apis;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Router,
};
use chrono::NaiveDate;
use shared::ErrorResponse;

use crate::domain::LedgerError;
use crate::AppState;

/// All API routes, unlayered and without state
pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/api/students", student_apis::router())
        .nest("/api/challans", challan_apis::router())
        .nest("/api/classes", report_apis::class_router())
        .nest("/api/reports", report_apis::router())
        .nest("/api/promotions", promotion_apis::router())
}

/// The office's calendar date, used wherever a request omits a date
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn status_for(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::NotFound { .. } => StatusCode::NOT_FOUND,
        LedgerError::Validation(_) => StatusCode::BAD_REQUEST,
        LedgerError::ConstraintViolation(_) | LedgerError::AlreadyPaid(_) => StatusCode::CONFLICT,
        LedgerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_response(err: LedgerError) -> Response {
    let status = status_for(&err);
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
        Router,
    };
    use serde::de::DeserializeOwned;
    use serde_json::Value;
    use tower::util::ServiceExt; // for `oneshot`

    use crate::config::LedgerSettings;
    use crate::storage::DbConnection;
    use crate::{build_state, create_router};

    pub async fn setup_test_app() -> Router {
        let db = DbConnection::in_memory()
            .await
            .expect("Failed to create test database");
        create_router(build_state(db, LedgerSettings::default()))
    }

    pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    pub fn body_json<T: DeserializeOwned>(bytes: &[u8]) -> T {
        serde_json::from_slice(bytes).expect("response should be JSON")
    }

    /// Admit a student over the API and return the assigned id
    pub async fn admit(app: &Router, name: &str, class: &str) -> i64 {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/students",
            Some(serde_json::json!({ "full_name": name, "class": class })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body_json::<Value>(&body)["id"].as_i64().unwrap()
    }

    /// Issue a single-line challan over the API and return its id
    pub async fn issue(app: &Router, student_id: i64, issue_date: &str, due_date: &str) -> i64 {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/challans",
            Some(serde_json::json!({
                "student_id": student_id,
                "issue_date": issue_date,
                "due_date": due_date,
                "items": [{ "description": "Tuition Fee", "amount": 5000.0 }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body_json::<Value>(&body)["challan"]["id"].as_i64().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_statuses() {
        assert_eq!(
            status_for(&LedgerError::challan_not_found(1)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&LedgerError::validation("bad")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_for(&LedgerError::AlreadyPaid(1)), StatusCode::CONFLICT);
        assert_eq!(
            status_for(&LedgerError::ConstraintViolation("fk".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&LedgerError::Storage(anyhow::anyhow!("disk full"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
