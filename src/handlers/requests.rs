use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::request::ReviewStatus;
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::requests::CreateRequestInput;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct RequestListQuery {
    pub requester_id: Option<Uuid>,
    pub incident_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ReviewRequestBody {
    pub review_status: String,
}

pub fn request_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_requests).post(create_request))
        .route(
            "/:id",
            get(get_request).delete(delete_request),
        )
        .route("/:id/review", put(review_request))
}

/// Publish a request together with its type-specific detail rows
#[utoipa::path(
    post,
    path = "/api/v1/requests",
    request_body = CreateRequestInput,
    responses(
        (status = 201, description = "Request created"),
        (status = 400, description = "Missing detail rows for the request type", body = crate::errors::ErrorResponse)
    ),
    tag = "requests"
)]
pub async fn create_request(
    State(state): State<AppState>,
    Json(payload): Json<CreateRequestInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let request = state.services.requests.create_request(payload).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn get_request(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let request = state
        .services
        .requests
        .get_request(request_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Request {} not found", request_id)))?;
    Ok((StatusCode::OK, Json(request)))
}

pub async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<RequestListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let requests = state
        .services
        .requests
        .list_requests(query.requester_id, query.incident_id)
        .await?;
    Ok((StatusCode::OK, Json(requests)))
}

pub async fn review_request(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
    Json(payload): Json<ReviewRequestBody>,
) -> Result<impl IntoResponse, ServiceError> {
    let review_status = ReviewStatus::from_str(&payload.review_status).ok_or_else(|| {
        ServiceError::ValidationError(format!(
            "Unknown review status: {}",
            payload.review_status
        ))
    })?;
    let request = state
        .services
        .requests
        .review_request(request_id, review_status)
        .await?;
    Ok((StatusCode::OK, Json(request)))
}

pub async fn delete_request(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let request = state.services.requests.delete_request(request_id).await?;
    Ok((StatusCode::OK, Json(request)))
}
