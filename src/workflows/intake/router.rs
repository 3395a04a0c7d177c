use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicationId, ApplicationStatus, BorrowerId, RecordId};
use super::payload::{ApplicationPayload, EmploymentPayload, LiabilityPayload, ResidencePayload};
use super::repository::{ApplicationRepository, RepositoryError};
use super::service::{IntakeServiceError, LoanIntakeService};

/// Router builder exposing HTTP endpoints for intake, lookup, status
/// transitions, and partial record updates.
pub fn intake_router<R>(service: Arc<LoanIntakeService<R>>) -> Router
where
    R: ApplicationRepository + 'static,
{
    Router::new()
        .route("/api/v1/applications", post(submit_handler::<R>))
        .route("/api/v1/applications/:application_id", get(get_handler::<R>))
        .route(
            "/api/v1/applications/:application_id/status",
            patch(status_handler::<R>),
        )
        .route(
            "/api/v1/applications/:application_id/borrowers/:borrower_id/employment/:record_id",
            put(employment_handler::<R>),
        )
        .route(
            "/api/v1/applications/:application_id/borrowers/:borrower_id/residences/:record_id",
            put(residence_handler::<R>),
        )
        .route(
            "/api/v1/applications/:application_id/liabilities/:record_id",
            put(liability_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<LoanIntakeService<R>>>,
    Json(payload): Json<ApplicationPayload>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    match service.submit(payload) {
        Ok(record) => (StatusCode::CREATED, Json(record.summary_view())).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn get_handler<R>(
    State(service): State<Arc<LoanIntakeService<R>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let id = ApplicationId(application_id);
    match service.get(&id) {
        Ok(record) => (StatusCode::OK, Json(record.aggregate)).into_response(),
        Err(err) => service_error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct StatusChangeRequest {
    status: String,
}

pub(crate) async fn status_handler<R>(
    State(service): State<Arc<LoanIntakeService<R>>>,
    Path(application_id): Path<String>,
    Json(request): Json<StatusChangeRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let next: ApplicationStatus = match request.status.parse() {
        Ok(status) => status,
        Err(err) => {
            let payload = json!({ "error": format!("{err}") });
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
        }
    };

    let id = ApplicationId(application_id);
    match service.update_status(&id, next) {
        Ok(record) => (StatusCode::OK, Json(record.summary_view())).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn employment_handler<R>(
    State(service): State<Arc<LoanIntakeService<R>>>,
    Path((application_id, borrower_id, record_id)): Path<(String, u64, u64)>,
    Json(payload): Json<EmploymentPayload>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let id = ApplicationId(application_id);
    match service.update_employment(&id, BorrowerId(borrower_id), RecordId(record_id), payload) {
        Ok(record) => (StatusCode::OK, Json(record.summary_view())).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn residence_handler<R>(
    State(service): State<Arc<LoanIntakeService<R>>>,
    Path((application_id, borrower_id, record_id)): Path<(String, u64, u64)>,
    Json(payload): Json<ResidencePayload>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let id = ApplicationId(application_id);
    match service.update_residence(&id, BorrowerId(borrower_id), RecordId(record_id), payload) {
        Ok(record) => (StatusCode::OK, Json(record.summary_view())).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn liability_handler<R>(
    State(service): State<Arc<LoanIntakeService<R>>>,
    Path((application_id, record_id)): Path<(String, u64)>,
    Json(payload): Json<LiabilityPayload>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let id = ApplicationId(application_id);
    match service.update_liability(&id, RecordId(record_id), payload) {
        Ok(record) => (StatusCode::OK, Json(record.summary_view())).into_response(),
        Err(err) => service_error_response(err),
    }
}

/// Status codes live at this boundary; the core only produces violations.
fn service_error_response(err: IntakeServiceError) -> Response {
    match err {
        IntakeServiceError::Rejected(violations) => {
            (StatusCode::BAD_REQUEST, Json(violations)).into_response()
        }
        IntakeServiceError::Structural(violation) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(vec![violation])).into_response()
        }
        IntakeServiceError::InvalidTransition { from, to } => {
            let payload = json!({
                "error": format!("invalid status transition from {from} to {to}"),
            });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        IntakeServiceError::BorrowerNotFound | IntakeServiceError::RecordNotFound => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        IntakeServiceError::Repository(RepositoryError::NotFound) => {
            let payload = json!({ "error": "application not found" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        IntakeServiceError::Repository(RepositoryError::Conflict) => {
            let payload = json!({ "error": "application already exists" });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        other => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
