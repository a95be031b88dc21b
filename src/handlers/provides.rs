use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::provides::CreateProvideInput;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ProvideListQuery {
    pub user_id: Uuid,
}

pub fn provide_routes() -> Router<AppState> {
    Router::new().route("/", get(list_provides).post(create_provide))
}

/// Donate stock into a warehouse
#[utoipa::path(
    post,
    path = "/api/v1/provides",
    request_body = CreateProvideInput,
    responses(
        (status = 201, description = "Donation recorded"),
        (status = 400, description = "Missing target inventory", body = crate::errors::ErrorResponse)
    ),
    tag = "provides"
)]
pub async fn create_provide(
    State(state): State<AppState>,
    Json(payload): Json<CreateProvideInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let provide = state.services.provides.provide(payload).await?;
    Ok((StatusCode::CREATED, Json(provide)))
}

pub async fn list_provides(
    State(state): State<AppState>,
    Query(query): Query<ProvideListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let provides = state.services.provides.list_by_user(query.user_id).await?;
    Ok((StatusCode::OK, Json(provides)))
}
