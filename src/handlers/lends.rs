use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::lends::{CreateLendInput, ReturnByItemInput};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct LendListQuery {
    pub user_id: Option<Uuid>,
    pub inventory_id: Option<Uuid>,
    pub outstanding: Option<bool>,
}

pub fn lend_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_lends).post(create_lend))
        .route("/:id/return", put(return_lend))
        .route("/return-item", post(return_by_item))
}

/// Borrow stock from a warehouse
#[utoipa::path(
    post,
    path = "/api/v1/lends",
    request_body = CreateLendInput,
    responses(
        (status = 201, description = "Lend created"),
        (status = 404, description = "No stock row for the item", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock", body = crate::errors::ErrorResponse)
    ),
    tag = "lends"
)]
pub async fn create_lend(
    State(state): State<AppState>,
    Json(payload): Json<CreateLendInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let lend = state.services.lends.lend(payload).await?;
    Ok((StatusCode::CREATED, Json(lend)))
}

/// Return a lend by id
#[utoipa::path(
    put,
    path = "/api/v1/lends/{id}/return",
    params(("id" = Uuid, Path, description = "Lend ID")),
    responses(
        (status = 200, description = "Lend returned"),
        (status = 404, description = "Lend not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Already returned", body = crate::errors::ErrorResponse)
    ),
    tag = "lends"
)]
pub async fn return_lend(
    State(state): State<AppState>,
    Path(lend_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let lend = state.services.lends.return_item(lend_id).await?;
    Ok((StatusCode::OK, Json(lend)))
}

pub async fn return_by_item(
    State(state): State<AppState>,
    Json(payload): Json<ReturnByItemInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let lend = state.services.lends.return_by_item(payload).await?;
    Ok((StatusCode::OK, Json(lend)))
}

pub async fn list_lends(
    State(state): State<AppState>,
    Query(query): Query<LendListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let lends = if let Some(user_id) = query.user_id {
        state.services.lends.list_by_user(user_id).await?
    } else if let Some(inventory_id) = query.inventory_id {
        state.services.lends.list_by_inventory(inventory_id).await?
    } else if query.outstanding.unwrap_or(false) {
        state.services.lends.list_outstanding().await?
    } else {
        return Err(ServiceError::ValidationError(
            "Provide user_id, inventory_id or outstanding=true".to_string(),
        ));
    };
    Ok((StatusCode::OK, Json(lends)))
}
