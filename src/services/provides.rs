//! Provide (Donation) Manager
//!
//! Records donations and credits the receiving warehouse. The ledger write
//! is an upsert rather than a lock-and-check: a donation only ever increases
//! stock, so it cannot underflow.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::inventory_item::StockStatus;
use crate::entities::item::Entity as Items;
use crate::entities::provide::{self, Entity as Provides};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::inventory::credit_stock;

/// Donation payload. `inventory_id` is optional in the wire format but a
/// donation without a target warehouse is rejected before any write.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProvideInput {
    pub user_id: Uuid,
    pub item_id: Uuid,
    #[validate(range(min = 1))]
    pub qty: i32,
    pub inventory_id: Option<Uuid>,
}

/// Provide row joined with the item's display name and unit.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProvideRecord {
    pub provide_id: Uuid,
    pub user_id: Uuid,
    pub item_id: Uuid,
    pub item_name: Option<String>,
    pub unit: Option<String>,
    pub qty: i32,
    pub inventory_id: Uuid,
    pub provide_date: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ProvideService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl ProvideService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Records a donation: inserts the log row and credits the warehouse's
    /// available slot in one transaction. If either write fails, neither is
    /// visible.
    #[instrument(skip(self, input), fields(user_id = %input.user_id, item_id = %input.item_id, qty = input.qty))]
    pub async fn provide(&self, input: CreateProvideInput) -> Result<provide::Model, ServiceError> {
        input.validate()?;
        let inventory_id = input.inventory_id.ok_or_else(|| {
            ServiceError::ValidationError("A donation requires a target inventory".to_string())
        })?;

        let db = &*self.db_pool;
        let provide_id = Uuid::new_v4();

        let created = db
            .transaction::<_, provide::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let row = provide::ActiveModel {
                        provide_id: Set(provide_id),
                        user_id: Set(input.user_id),
                        item_id: Set(input.item_id),
                        qty: Set(input.qty),
                        inventory_id: Set(inventory_id),
                        provide_date: Set(Utc::now()),
                    };
                    let created = row.insert(txn).await.map_err(ServiceError::db_error)?;

                    credit_stock(
                        txn,
                        inventory_id,
                        input.item_id,
                        input.qty,
                        StockStatus::Available,
                    )
                    .await?;

                    Ok(created)
                })
            })
            .await
            .map_err(ServiceError::from)?;

        info!(provide_id = %provide_id, inventory_id = %inventory_id, "Donation recorded");

        if let Err(e) = self
            .event_sender
            .send(Event::StockProvided {
                provide_id,
                inventory_id,
                item_id: created.item_id,
                qty: created.qty,
            })
            .await
        {
            warn!(error = %e, provide_id = %provide_id, "Failed to send stock provided event");
        }

        Ok(created)
    }

    /// A user's donation history, newest first.
    #[instrument(skip(self))]
    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<ProvideRecord>, ServiceError> {
        let db = &*self.db_pool;
        let rows = Provides::find()
            .filter(provide::Column::UserId.eq(user_id))
            .order_by_desc(provide::Column::ProvideDate)
            .find_also_related(Items)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(rows
            .into_iter()
            .map(|(provide, item)| {
                let (item_name, unit) = match item {
                    Some(item) => (Some(item.item_name), item.unit),
                    None => (None, None),
                };
                ProvideRecord {
                    provide_id: provide.provide_id,
                    user_id: provide.user_id,
                    item_id: provide.item_id,
                    item_name,
                    unit,
                    qty: provide.qty,
                    inventory_id: provide.inventory_id,
                    provide_date: provide.provide_date,
                }
            })
            .collect())
    }
}
