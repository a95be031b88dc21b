use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::accepts::{BulkAcceptItem, CreateAcceptInput};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkAcceptRequest {
    pub accepter_id: Uuid,
    pub items: Vec<BulkAcceptItem>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct AcceptListQuery {
    pub request_id: Option<Uuid>,
    pub accepter_id: Option<Uuid>,
}

pub fn accept_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_accepts).post(create_accept))
        .route("/bulk", post(bulk_accept))
        .route(
            "/:request_id/:accepter_id",
            axum::routing::delete(cancel_accept),
        )
}

/// Record a single claim against a request
#[utoipa::path(
    post,
    path = "/api/v1/accepts",
    request_body = CreateAcceptInput,
    responses(
        (status = 201, description = "Claim recorded"),
        (status = 404, description = "Request not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Duplicate claim or request already fulfilled", body = crate::errors::ErrorResponse),
        (status = 422, description = "Quantity exceeds remaining need", body = crate::errors::ErrorResponse)
    ),
    tag = "accepts"
)]
pub async fn create_accept(
    State(state): State<AppState>,
    Json(payload): Json<CreateAcceptInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let accept = state.services.accepts.create_accept(payload).await?;
    Ok((StatusCode::CREATED, Json(accept)))
}

/// Submit many claims at once; per-item failures are isolated
#[utoipa::path(
    post,
    path = "/api/v1/accepts/bulk",
    request_body = BulkAcceptRequest,
    responses(
        (status = 201, description = "Batch processed; check errors for partial failures",
            body = crate::services::accepts::BulkAcceptOutcome),
        (status = 400, description = "Empty batch", body = crate::errors::ErrorResponse)
    ),
    tag = "accepts"
)]
pub async fn bulk_accept(
    State(state): State<AppState>,
    Json(payload): Json<BulkAcceptRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let outcome = state
        .services
        .accepts
        .bulk_accept(payload.accepter_id, payload.items)
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// Cancel a claim; the request's progress drops back by the claimed quantity.
pub async fn cancel_accept(
    State(state): State<AppState>,
    Path((request_id, accepter_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ServiceError> {
    let accept = state
        .services
        .accepts
        .cancel_accept(request_id, accepter_id)
        .await?;
    Ok((StatusCode::OK, Json(accept)))
}

pub async fn list_accepts(
    State(state): State<AppState>,
    Query(query): Query<AcceptListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let accepts = match (query.request_id, query.accepter_id) {
        (Some(request_id), _) => state.services.accepts.list_by_request(request_id).await?,
        (None, Some(accepter_id)) => state.services.accepts.list_by_accepter(accepter_id).await?,
        (None, None) => {
            return Err(ServiceError::ValidationError(
                "Provide request_id or accepter_id".to_string(),
            ));
        }
    };
    Ok((StatusCode::OK, Json(accepts)))
}
