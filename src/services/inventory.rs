//! Inventory Ledger
//!
//! Owns the per-warehouse, per-item stock rows. Every quantity movement in
//! the system (lend, return, provide, restock) lands here, either through
//! the service methods or through the crate-internal credit/debit helpers
//! that other services call inside their own transactions.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::{lock_for_update, DbPool};
use crate::entities::inventory_item::{self, Entity as InventoryItems, StockStatus};
use crate::entities::item::{self, Entity as Items};
use crate::entities::item_category::Entity as ItemCategories;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Stock row joined with catalog metadata for display.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WarehouseStockRow {
    pub inventory_id: Uuid,
    pub item_id: Uuid,
    pub item_name: String,
    pub unit: Option<String>,
    pub category_name: Option<String>,
    pub status: String,
    pub qty: i32,
    pub updated_at: DateTime<Utc>,
}

/// Credits `qty` to the `(inventory, item, status)` slot, creating the row if
/// it does not exist yet. Runs on the caller's connection so lend/provide can
/// fold the credit into their own atomic unit.
pub(crate) async fn credit_stock<C: ConnectionTrait>(
    conn: &C,
    inventory_id: Uuid,
    item_id: Uuid,
    qty: i32,
    status: StockStatus,
) -> Result<inventory_item::Model, ServiceError> {
    let existing = InventoryItems::find_by_id((inventory_id, item_id, status.as_str().to_string()))
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?;

    match existing {
        Some(row) => {
            let new_qty = row.qty + qty;
            let mut active: inventory_item::ActiveModel = row.into();
            active.qty = Set(new_qty);
            active.updated_at = Set(Utc::now());
            active.update(conn).await.map_err(ServiceError::db_error)
        }
        None => {
            let row = inventory_item::ActiveModel {
                inventory_id: Set(inventory_id),
                item_id: Set(item_id),
                status: Set(status.as_str().to_string()),
                qty: Set(qty),
                updated_at: Set(Utc::now()),
            };
            row.insert(conn).await.map_err(ServiceError::db_error)
        }
    }
}

/// Debits `qty` from the `(inventory, item, status)` slot under an exclusive
/// row lock. Fails with `NotFound` when the slot does not exist and with
/// `InsufficientStock` when the debit would drive the quantity negative;
/// in both cases nothing has been written.
pub(crate) async fn debit_stock<C: ConnectionTrait>(
    conn: &C,
    inventory_id: Uuid,
    item_id: Uuid,
    qty: i32,
    status: StockStatus,
) -> Result<inventory_item::Model, ServiceError> {
    let select = InventoryItems::find()
        .filter(inventory_item::Column::InventoryId.eq(inventory_id))
        .filter(inventory_item::Column::ItemId.eq(item_id))
        .filter(inventory_item::Column::Status.eq(status.as_str()));

    let row = lock_for_update(conn.get_database_backend(), select)
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| {
            ServiceError::NotFound(format!(
                "No {} stock for item {} at inventory {}",
                status.as_str(),
                item_id,
                inventory_id
            ))
        })?;

    if row.qty < qty {
        return Err(ServiceError::InsufficientStock(format!(
            "Requested {} of item {} but only {} {} at inventory {}",
            qty,
            item_id,
            row.qty,
            status.as_str(),
            inventory_id
        )));
    }

    let new_qty = row.qty - qty;
    let mut active: inventory_item::ActiveModel = row.into();
    active.qty = Set(new_qty);
    active.updated_at = Set(Utc::now());
    active.update(conn).await.map_err(ServiceError::db_error)
}

/// Service owning warehouse stock rows.
#[derive(Clone)]
pub struct InventoryService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl InventoryService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Adds stock to a warehouse slot, creating the row on first receipt.
    #[instrument(skip(self))]
    pub async fn add_stock(
        &self,
        inventory_id: Uuid,
        item_id: Uuid,
        qty: i32,
        status: StockStatus,
    ) -> Result<inventory_item::Model, ServiceError> {
        if qty <= 0 {
            return Err(ServiceError::ValidationError(
                "Quantity must be positive".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let row = db
            .transaction::<_, inventory_item::Model, ServiceError>(move |txn| {
                Box::pin(
                    async move { credit_stock(txn, inventory_id, item_id, qty, status).await },
                )
            })
            .await
            .map_err(ServiceError::from)?;

        info!(
            inventory_id = %inventory_id,
            item_id = %item_id,
            qty = qty,
            new_qty = row.qty,
            "Stock added"
        );

        if let Err(e) = self
            .event_sender
            .send(Event::StockAdded {
                inventory_id,
                item_id,
                qty,
                new_qty: row.qty,
            })
            .await
        {
            warn!(error = %e, "Failed to send stock added event");
        }

        Ok(row)
    }

    /// Removes stock from a warehouse slot. The debit happens under an
    /// exclusive row lock so two concurrent removals can never both succeed
    /// past zero.
    #[instrument(skip(self))]
    pub async fn remove_stock(
        &self,
        inventory_id: Uuid,
        item_id: Uuid,
        qty: i32,
        status: StockStatus,
    ) -> Result<inventory_item::Model, ServiceError> {
        if qty <= 0 {
            return Err(ServiceError::ValidationError(
                "Quantity must be positive".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let row = db
            .transaction::<_, inventory_item::Model, ServiceError>(move |txn| {
                Box::pin(async move { debit_stock(txn, inventory_id, item_id, qty, status).await })
            })
            .await
            .map_err(ServiceError::from)?;

        info!(
            inventory_id = %inventory_id,
            item_id = %item_id,
            qty = qty,
            new_qty = row.qty,
            "Stock removed"
        );

        if let Err(e) = self
            .event_sender
            .send(Event::StockRemoved {
                inventory_id,
                item_id,
                qty,
                new_qty: row.qty,
            })
            .await
        {
            warn!(error = %e, "Failed to send stock removed event");
        }

        Ok(row)
    }

    /// Point read of a single stock slot.
    #[instrument(skip(self))]
    pub async fn get_stock(
        &self,
        inventory_id: Uuid,
        item_id: Uuid,
        status: StockStatus,
    ) -> Result<Option<inventory_item::Model>, ServiceError> {
        let db = &*self.db_pool;
        InventoryItems::find_by_id((inventory_id, item_id, status.as_str().to_string()))
            .one(db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Lists a warehouse's stock joined with catalog metadata. Read-only
    /// projection; not a concurrency-sensitive path.
    #[instrument(skip(self))]
    pub async fn list_by_warehouse(
        &self,
        inventory_id: Uuid,
        status_filter: Option<StockStatus>,
    ) -> Result<Vec<WarehouseStockRow>, ServiceError> {
        let db = &*self.db_pool;

        let mut query =
            InventoryItems::find().filter(inventory_item::Column::InventoryId.eq(inventory_id));
        if let Some(status) = status_filter {
            query = query.filter(inventory_item::Column::Status.eq(status.as_str()));
        }

        let stock_rows = query.all(db).await.map_err(ServiceError::db_error)?;
        if stock_rows.is_empty() {
            return Ok(Vec::new());
        }

        let item_ids: Vec<Uuid> = stock_rows.iter().map(|row| row.item_id).collect();
        let items: HashMap<Uuid, (item::Model, Option<String>)> = Items::find()
            .filter(item::Column::ItemId.is_in(item_ids))
            .find_also_related(ItemCategories)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?
            .into_iter()
            .map(|(item, category)| {
                let category_name = category.map(|c| c.category_name);
                (item.item_id, (item, category_name))
            })
            .collect();

        Ok(stock_rows
            .into_iter()
            .map(|row| {
                let (item_name, unit, category_name) = match items.get(&row.item_id) {
                    Some((item, category_name)) => (
                        item.item_name.clone(),
                        item.unit.clone(),
                        category_name.clone(),
                    ),
                    None => (String::new(), None, None),
                };
                WarehouseStockRow {
                    inventory_id: row.inventory_id,
                    item_id: row.item_id,
                    item_name,
                    unit,
                    category_name,
                    status: row.status,
                    qty: row.qty,
                    updated_at: row.updated_at,
                }
            })
            .collect())
    }
}
