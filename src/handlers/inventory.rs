use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::inventory_item::StockStatus;
use crate::errors::ServiceError;
use crate::handlers::AppState;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RestockRequest {
    pub item_id: Uuid,
    pub qty: i32,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct StockListQuery {
    pub status: Option<String>,
}

pub fn inventory_routes() -> Router<AppState> {
    Router::new().route("/:id/items", get(list_warehouse_items).post(restock))
}

fn parse_status(raw: Option<&str>) -> Result<Option<StockStatus>, ServiceError> {
    match raw {
        None => Ok(None),
        Some(s) => StockStatus::from_str(s)
            .map(Some)
            .ok_or_else(|| ServiceError::ValidationError(format!("Unknown stock status: {}", s))),
    }
}

/// List a warehouse's stock joined with catalog metadata
#[utoipa::path(
    get,
    path = "/api/v1/inventories/{id}/items",
    params(
        ("id" = Uuid, Path, description = "Inventory (warehouse) ID"),
        StockListQuery
    ),
    responses(
        (status = 200, description = "Stock rows returned",
            body = [crate::services::inventory::WarehouseStockRow]),
        (status = 400, description = "Unknown status filter", body = crate::errors::ErrorResponse)
    ),
    tag = "inventories"
)]
pub async fn list_warehouse_items(
    State(state): State<AppState>,
    Path(inventory_id): Path<Uuid>,
    Query(query): Query<StockListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let status = parse_status(query.status.as_deref())?;
    let rows = state
        .services
        .inventory
        .list_by_warehouse(inventory_id, status)
        .await?;
    Ok((StatusCode::OK, Json(rows)))
}

/// Direct restock into a warehouse slot.
pub async fn restock(
    State(state): State<AppState>,
    Path(inventory_id): Path<Uuid>,
    Json(payload): Json<RestockRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let status = parse_status(payload.status.as_deref())?.unwrap_or(StockStatus::Available);
    let row = state
        .services
        .inventory
        .add_stock(inventory_id, payload.item_id, payload.qty, status)
        .await?;
    Ok((StatusCode::CREATED, Json(row)))
}
