//! # REST API for the Student Directory
//!
//! Admissions, edits, search, administrative deletes and a student's
//! challan history.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Deserialize;
use shared::StudentPayload;
use tracing::{error, info};

use super::error_response;
use super::mappers::student_mapper::StudentMapper;
use super::voucher_apis;
use crate::domain::models::StudentId;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    pub cascade: bool,
}

/// Create a router for student related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_students).post(admit_student))
        .route(
            "/:id",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route("/:id/challans", get(list_student_challans))
        .merge(voucher_apis::student_router())
}

/// List students, optionally filtered by a name substring
pub async fn list_students(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    info!("GET /api/students - search: {:?}", params.search);

    match state.student_service.search(params.search.as_deref()).await {
        Ok(students) => (StatusCode::OK, Json(students)).into_response(),
        Err(e) => {
            error!("Failed to list students: {}", e);
            error_response(e)
        }
    }
}

pub async fn admit_student(
    State(state): State<AppState>,
    Json(payload): Json<StudentPayload>,
) -> impl IntoResponse {
    info!("POST /api/students - request: {:?}", payload);

    let student = match StudentMapper::to_domain(payload) {
        Ok(student) => student,
        Err(e) => return error_response(e),
    };

    match state.student_service.admit(student).await {
        Ok(student) => (StatusCode::CREATED, Json(student)).into_response(),
        Err(e) => {
            error!("Failed to admit student: {}", e);
            error_response(e)
        }
    }
}

pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
) -> impl IntoResponse {
    info!("GET /api/students/{}", id);

    match state.student_service.get(id).await {
        Ok(student) => (StatusCode::OK, Json(student)).into_response(),
        Err(e) => {
            error!("Failed to get student {}: {}", id, e);
            error_response(e)
        }
    }
}

pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
    Json(payload): Json<StudentPayload>,
) -> impl IntoResponse {
    info!("PUT /api/students/{} - request: {:?}", id, payload);

    let student = match StudentMapper::to_domain(payload) {
        Ok(student) => student,
        Err(e) => return error_response(e),
    };

    match state.student_service.update(id, student).await {
        Ok(student) => (StatusCode::OK, Json(student)).into_response(),
        Err(e) => {
            error!("Failed to update student {}: {}", id, e);
            error_response(e)
        }
    }
}

/// Delete a student; `?cascade=true` also removes its challans
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
    Query(params): Query<DeleteParams>,
) -> impl IntoResponse {
    info!("DELETE /api/students/{} - cascade: {}", id, params.cascade);

    match state.student_service.delete(id, params.cascade).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Failed to delete student {}: {}", id, e);
            error_response(e)
        }
    }
}

/// A student's challans, most recent first
pub async fn list_student_challans(
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
) -> impl IntoResponse {
    info!("GET /api/students/{}/challans", id);

    match state.challan_service.challans_for_student(id).await {
        Ok(challans) => (StatusCode::OK, Json(challans)).into_response(),
        Err(e) => {
            error!("Failed to list challans of student {}: {}", id, e);
            error_response(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::io::rest::test_support::{admit, body_json, issue, send, setup_test_app};
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_admit_and_fetch_student() {
        let app = setup_test_app().await;
        let id = admit(&app, "Ali Khan", "Grade 3").await;

        let (status, body) = send(&app, Method::GET, &format!("/api/students/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        let student: Value = body_json(&body);
        assert_eq!(student["full_name"], "Ali Khan");
        assert_eq!(student["class"], "Grade 3");
        assert_eq!(student["status"], "Active");
    }

    #[tokio::test]
    async fn test_admit_rejects_unknown_class() {
        let app = setup_test_app().await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/students",
            Some(json!({ "full_name": "Ali Khan", "class": "Grade 13" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: Value = body_json(&body);
        assert!(error["error"].as_str().unwrap().contains("Grade 13"));
    }

    #[tokio::test]
    async fn test_search_and_update() {
        let app = setup_test_app().await;
        let ali = admit(&app, "Ali Khan", "Grade 3").await;
        admit(&app, "Sara Ahmed", "Grade 5").await;

        let (status, body) = send(&app, Method::GET, "/api/students?search=khan", None).await;
        assert_eq!(status, StatusCode::OK);
        let found: Vec<Value> = body_json(&body);
        assert_eq!(found.len(), 1);

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/api/students/{}", ali),
            Some(json!({ "full_name": "Ali Khan", "class": "Grade 3", "status": "Withdrawn" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body_json::<Value>(&body)["status"], "Withdrawn");

        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/students/999",
            Some(json!({ "full_name": "Nobody", "class": "Prep" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_requires_cascade_when_challans_exist() {
        let app = setup_test_app().await;
        let ali = admit(&app, "Ali Khan", "Grade 3").await;
        issue(&app, ali, "2026-10-01", "2026-10-16").await;

        let uri = format!("/api/students/{}", ali);
        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(&app, Method::DELETE, &format!("{}?cascade=true", uri), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, Method::GET, &format!("{}/challans", uri), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
