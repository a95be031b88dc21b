//! Lend/Return Manager
//!
//! Moves quantity out of the Inventory Ledger into a loan record and back.
//! A lend debits the warehouse's available slot and creates the loan in one
//! atomic unit; a return stamps `returned_at` exactly once and credits the
//! same slot back in another.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::{lock_for_update, DbPool};
use crate::entities::inventory_item::StockStatus;
use crate::entities::item::Entity as Items;
use crate::entities::lend::{self, Entity as Lends};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::inventory::{credit_stock, debit_stock};

/// Payload for borrowing stock from a warehouse.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateLendInput {
    pub user_id: Uuid,
    pub item_id: Uuid,
    #[validate(range(min = 1))]
    pub qty: i32,
    pub from_inventory_id: Uuid,
}

/// Payload for returning by `(user, item, warehouse)` instead of lend id.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReturnByItemInput {
    pub user_id: Uuid,
    pub item_id: Uuid,
    pub from_inventory_id: Uuid,
}

/// Lend row joined with the item's display name.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LendRecord {
    pub lend_id: Uuid,
    pub user_id: Uuid,
    pub item_id: Uuid,
    pub item_name: Option<String>,
    pub qty: i32,
    pub from_inventory_id: Uuid,
    pub lend_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

impl From<(lend::Model, Option<crate::entities::item::Model>)> for LendRecord {
    fn from((lend, item): (lend::Model, Option<crate::entities::item::Model>)) -> Self {
        Self {
            lend_id: lend.lend_id,
            user_id: lend.user_id,
            item_id: lend.item_id,
            item_name: item.map(|i| i.item_name),
            qty: lend.qty,
            from_inventory_id: lend.from_inventory_id,
            lend_at: lend.lend_at,
            returned_at: lend.returned_at,
        }
    }
}

/// Stamps the return and credits the stock back, on the caller's
/// transaction. The lend row must already be locked.
async fn complete_return<C: ConnectionTrait>(
    conn: &C,
    row: lend::Model,
) -> Result<lend::Model, ServiceError> {
    if row.returned_at.is_some() {
        return Err(ServiceError::AlreadyReturned(format!(
            "Lend {} was already returned",
            row.lend_id
        )));
    }

    let now = Utc::now();
    let from_inventory_id = row.from_inventory_id;
    let item_id = row.item_id;
    let qty = row.qty;

    let mut active: lend::ActiveModel = row.into();
    active.returned_at = Set(Some(now));
    let updated = active.update(conn).await.map_err(ServiceError::db_error)?;

    credit_stock(conn, from_inventory_id, item_id, qty, StockStatus::Available).await?;

    Ok(updated)
}

#[derive(Clone)]
pub struct LendService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl LendService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Borrows stock: locks the available slot, verifies quantity, debits it
    /// and creates the loan. All four steps commit together or not at all.
    #[instrument(skip(self, input), fields(user_id = %input.user_id, item_id = %input.item_id, qty = input.qty))]
    pub async fn lend(&self, input: CreateLendInput) -> Result<lend::Model, ServiceError> {
        input.validate()?;

        let db = &*self.db_pool;
        let lend_id = Uuid::new_v4();

        let created = db
            .transaction::<_, lend::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    debit_stock(
                        txn,
                        input.from_inventory_id,
                        input.item_id,
                        input.qty,
                        StockStatus::Available,
                    )
                    .await?;

                    let row = lend::ActiveModel {
                        lend_id: Set(lend_id),
                        user_id: Set(input.user_id),
                        item_id: Set(input.item_id),
                        qty: Set(input.qty),
                        from_inventory_id: Set(input.from_inventory_id),
                        lend_at: Set(Utc::now()),
                        returned_at: Set(None),
                    };
                    row.insert(txn).await.map_err(ServiceError::db_error)
                })
            })
            .await
            .map_err(ServiceError::from)?;

        info!(lend_id = %lend_id, "Stock lent");

        if let Err(e) = self
            .event_sender
            .send(Event::StockLent {
                lend_id,
                inventory_id: created.from_inventory_id,
                item_id: created.item_id,
                qty: created.qty,
            })
            .await
        {
            warn!(error = %e, lend_id = %lend_id, "Failed to send stock lent event");
        }

        Ok(created)
    }

    /// Returns a loan by id. `returned_at` is set exactly once; a second call
    /// fails with `AlreadyReturned` and the ledger is credited exactly once.
    #[instrument(skip(self))]
    pub async fn return_item(&self, lend_id: Uuid) -> Result<lend::Model, ServiceError> {
        let db = &*self.db_pool;

        let returned = db
            .transaction::<_, lend::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let select = Lends::find().filter(lend::Column::LendId.eq(lend_id));
                    let row = lock_for_update(txn.get_database_backend(), select)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Lend {} not found", lend_id))
                        })?;

                    complete_return(txn, row).await
                })
            })
            .await
            .map_err(ServiceError::from)?;

        info!(lend_id = %lend_id, "Stock returned");
        self.send_returned_event(&returned).await;

        Ok(returned)
    }

    /// Returns the oldest outstanding loan for `(user, item, warehouse)`.
    #[instrument(skip(self, input), fields(user_id = %input.user_id, item_id = %input.item_id))]
    pub async fn return_by_item(&self, input: ReturnByItemInput) -> Result<lend::Model, ServiceError> {
        let db = &*self.db_pool;

        let returned = db
            .transaction::<_, lend::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let select = Lends::find()
                        .filter(lend::Column::UserId.eq(input.user_id))
                        .filter(lend::Column::ItemId.eq(input.item_id))
                        .filter(lend::Column::FromInventoryId.eq(input.from_inventory_id))
                        .filter(lend::Column::ReturnedAt.is_null())
                        .order_by_asc(lend::Column::LendAt);

                    let row = lock_for_update(txn.get_database_backend(), select)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "No outstanding lend of item {} by user {} from inventory {}",
                                input.item_id, input.user_id, input.from_inventory_id
                            ))
                        })?;

                    complete_return(txn, row).await
                })
            })
            .await
            .map_err(ServiceError::from)?;

        info!(lend_id = %returned.lend_id, "Stock returned by item");
        self.send_returned_event(&returned).await;

        Ok(returned)
    }

    async fn send_returned_event(&self, lend: &lend::Model) {
        let returned_at = match lend.returned_at {
            Some(ts) => ts,
            None => return,
        };
        if let Err(e) = self
            .event_sender
            .send(Event::StockReturned {
                lend_id: lend.lend_id,
                inventory_id: lend.from_inventory_id,
                item_id: lend.item_id,
                qty: lend.qty,
                returned_at,
            })
            .await
        {
            warn!(error = %e, lend_id = %lend.lend_id, "Failed to send stock returned event");
        }
    }

    /// A user's lending history, newest first.
    #[instrument(skip(self))]
    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<LendRecord>, ServiceError> {
        let db = &*self.db_pool;
        let rows = Lends::find()
            .filter(lend::Column::UserId.eq(user_id))
            .order_by_desc(lend::Column::LendAt)
            .find_also_related(Items)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(rows.into_iter().map(LendRecord::from).collect())
    }

    /// All loans not yet returned.
    #[instrument(skip(self))]
    pub async fn list_outstanding(&self) -> Result<Vec<LendRecord>, ServiceError> {
        let db = &*self.db_pool;
        let rows = Lends::find()
            .filter(lend::Column::ReturnedAt.is_null())
            .order_by_desc(lend::Column::LendAt)
            .find_also_related(Items)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(rows.into_iter().map(LendRecord::from).collect())
    }

    /// Loans taken from a specific warehouse (for its owner's view).
    #[instrument(skip(self))]
    pub async fn list_by_inventory(
        &self,
        inventory_id: Uuid,
    ) -> Result<Vec<LendRecord>, ServiceError> {
        let db = &*self.db_pool;
        let rows = Lends::find()
            .filter(lend::Column::FromInventoryId.eq(inventory_id))
            .order_by_desc(lend::Column::LendAt)
            .find_also_related(Items)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(rows.into_iter().map(LendRecord::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outstanding_is_derived_from_returned_at() {
        let lend = lend::Model {
            lend_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            item_id: Uuid::new_v4(),
            qty: 2,
            from_inventory_id: Uuid::new_v4(),
            lend_at: Utc::now(),
            returned_at: None,
        };
        assert!(lend.is_outstanding());

        let returned = lend::Model {
            returned_at: Some(Utc::now()),
            ..lend
        };
        assert!(!returned.is_outstanding());
    }
}
