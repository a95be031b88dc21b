//! Request Progress Tracker
//!
//! Owns the request row: its required/current quantity pair and the derived
//! fulfillment status. Progress mutations go through [`apply_progress`],
//! which every caller runs inside the same transaction that records the
//! claim change, so displayed progress never diverges from the set of
//! recorded claims.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::db::{lock_for_update, DbPool};
use crate::entities::request::{self, Entity as Requests, RequestStatus, RequestType, ReviewStatus};
use crate::entities::request_equipment::{self, Entity as RequestEquipments};
use crate::entities::request_item::{self, Entity as RequestItems};
use crate::entities::request_skill::{self, Entity as RequestSkills};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Result of moving a request's progress counter.
pub(crate) struct ProgressUpdate {
    pub request: request::Model,
    pub was_completed: bool,
    pub now_completed: bool,
}

/// Applies `qty_delta` to a request's `current_qty` under an exclusive row
/// lock and re-derives its status. Runs on the caller's connection so the
/// progress write commits (or rolls back) together with whatever produced
/// the delta.
///
/// Overrun policy: a positive delta that would push `current_qty` past
/// `required_qty` is rejected with `QuantityExceedsRemaining` before any
/// write. A request that is already completed rejects further positive
/// deltas with `RequestAlreadyFulfilled`.
pub(crate) async fn apply_progress<C: ConnectionTrait>(
    conn: &C,
    request_id: Uuid,
    qty_delta: i32,
) -> Result<ProgressUpdate, ServiceError> {
    let select = Requests::find().filter(request::Column::RequestId.eq(request_id));
    let row = lock_for_update(conn.get_database_backend(), select)
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("Request {} not found", request_id)))?;

    let was_completed = row.status == RequestStatus::Completed.as_str();

    if qty_delta > 0 {
        if was_completed {
            return Err(ServiceError::RequestAlreadyFulfilled(format!(
                "Request {} is already fulfilled",
                request_id
            )));
        }
        if row.current_qty + qty_delta > row.required_qty {
            return Err(ServiceError::QuantityExceedsRemaining(format!(
                "Request {} has {} of {} pledged; cannot absorb {} more",
                request_id, row.current_qty, row.required_qty, qty_delta
            )));
        }
    }

    let new_current = (row.current_qty + qty_delta).max(0);
    let new_status = RequestStatus::derive(new_current, row.required_qty);
    let now_completed = new_status == RequestStatus::Completed;

    let mut active: request::ActiveModel = row.into();
    active.current_qty = Set(new_current);
    active.status = Set(new_status.as_str().to_string());
    active.updated_at = Set(Some(Utc::now()));

    let updated = active.update(conn).await.map_err(ServiceError::db_error)?;

    Ok(ProgressUpdate {
        request: updated,
        was_completed,
        now_completed,
    })
}

/// Material line in a create-request payload.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct RequestItemInput {
    pub item_id: Uuid,
    #[validate(range(min = 1))]
    pub qty: i32,
}

/// Equipment line in a create-request payload.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct RequestEquipmentInput {
    #[validate(length(min = 1))]
    pub equipment_name: String,
    #[validate(range(min = 1))]
    pub qty: i32,
}

/// Payload for creating a request together with its type-specific detail
/// rows. `required_qty` is derived from the details: the sum of material or
/// equipment quantities, or `headcount` for humanpower requests.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateRequestInput {
    pub requester_id: Uuid,
    pub incident_id: Option<Uuid>,
    pub r#type: String,
    #[validate(range(min = 1, max = 5))]
    pub urgency: i32,
    pub address: Option<String>,
    #[serde(default)]
    pub items: Vec<RequestItemInput>,
    #[serde(default)]
    pub equipments: Vec<RequestEquipmentInput>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub headcount: Option<i32>,
}

#[derive(Clone)]
pub struct RequestService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl RequestService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a request and its detail rows in one transaction.
    #[instrument(skip(self, input), fields(requester_id = %input.requester_id, request_type = %input.r#type))]
    pub async fn create_request(
        &self,
        input: CreateRequestInput,
    ) -> Result<request::Model, ServiceError> {
        input.validate()?;
        for item in &input.items {
            item.validate()?;
        }
        for equipment in &input.equipments {
            equipment.validate()?;
        }

        let request_type = RequestType::from_str(&input.r#type).ok_or_else(|| {
            ServiceError::ValidationError(format!("Unknown request type: {}", input.r#type))
        })?;

        let required_qty = match request_type {
            RequestType::Material => {
                if input.items.is_empty() {
                    return Err(ServiceError::ValidationError(
                        "A material request needs at least one item".to_string(),
                    ));
                }
                input.items.iter().map(|i| i.qty).sum()
            }
            RequestType::Tool => {
                if input.equipments.is_empty() {
                    return Err(ServiceError::ValidationError(
                        "A tool request needs at least one equipment line".to_string(),
                    ));
                }
                input.equipments.iter().map(|e| e.qty).sum()
            }
            RequestType::Humanpower => match input.headcount {
                Some(headcount) if headcount > 0 => headcount,
                _ => {
                    return Err(ServiceError::ValidationError(
                        "A humanpower request needs a positive headcount".to_string(),
                    ));
                }
            },
        };

        let db = &*self.db_pool;
        let request_id = Uuid::new_v4();
        let now = Utc::now();

        let created = db
            .transaction::<_, request::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let base = request::ActiveModel {
                        request_id: Set(request_id),
                        requester_id: Set(input.requester_id),
                        incident_id: Set(input.incident_id),
                        r#type: Set(request_type.as_str().to_string()),
                        required_qty: Set(required_qty),
                        current_qty: Set(0),
                        status: Set(RequestStatus::NotCompleted.as_str().to_string()),
                        urgency: Set(input.urgency),
                        review_status: Set(Some(ReviewStatus::Unverified.as_str().to_string())),
                        address: Set(input.address),
                        created_at: Set(now),
                        updated_at: Set(None),
                    };
                    let created = base.insert(txn).await.map_err(ServiceError::db_error)?;

                    for item in input.items {
                        request_item::ActiveModel {
                            request_id: Set(request_id),
                            item_id: Set(item.item_id),
                            qty: Set(item.qty),
                        }
                        .insert(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    }

                    for equipment in input.equipments {
                        request_equipment::ActiveModel {
                            equipment_id: Set(Uuid::new_v4()),
                            request_id: Set(request_id),
                            equipment_name: Set(equipment.equipment_name),
                            qty: Set(equipment.qty),
                        }
                        .insert(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    }

                    for skill_tag in input.skills {
                        request_skill::ActiveModel {
                            request_id: Set(request_id),
                            skill_tag: Set(skill_tag),
                        }
                        .insert(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    }

                    Ok(created)
                })
            })
            .await
            .map_err(ServiceError::from)?;

        info!(request_id = %request_id, required_qty = required_qty, "Request created");

        if let Err(e) = self.event_sender.send(Event::RequestCreated(request_id)).await {
            warn!(error = %e, request_id = %request_id, "Failed to send request created event");
        }

        Ok(created)
    }

    /// Moves a request's progress counter in its own transaction. Claim
    /// paths do not use this wrapper; they run [`apply_progress`] inside the
    /// transaction that records the claim.
    #[instrument(skip(self))]
    pub async fn record_progress(
        &self,
        request_id: Uuid,
        qty_delta: i32,
    ) -> Result<request::Model, ServiceError> {
        let db = &*self.db_pool;
        let update = db
            .transaction::<_, ProgressUpdate, ServiceError>(move |txn| {
                Box::pin(async move { apply_progress(txn, request_id, qty_delta).await })
            })
            .await
            .map_err(ServiceError::from)?;

        self.emit_progress_events(&update).await;
        Ok(update.request)
    }

    pub(crate) async fn emit_progress_events(&self, update: &ProgressUpdate) {
        let request_id = update.request.request_id;
        if !update.was_completed && update.now_completed {
            if let Err(e) = self
                .event_sender
                .send(Event::RequestCompleted(request_id))
                .await
            {
                warn!(error = %e, request_id = %request_id, "Failed to send request completed event");
            }
        } else if update.was_completed && !update.now_completed {
            if let Err(e) = self
                .event_sender
                .send(Event::RequestReopened(request_id))
                .await
            {
                warn!(error = %e, request_id = %request_id, "Failed to send request reopened event");
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn get_request(
        &self,
        request_id: Uuid,
    ) -> Result<Option<request::Model>, ServiceError> {
        let db = &*self.db_pool;
        Requests::find_by_id(request_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Lists requests, optionally filtered by requester or incident, newest
    /// first.
    #[instrument(skip(self))]
    pub async fn list_requests(
        &self,
        requester_id: Option<Uuid>,
        incident_id: Option<Uuid>,
    ) -> Result<Vec<request::Model>, ServiceError> {
        let db = &*self.db_pool;

        let mut query = Requests::find();
        if let Some(requester_id) = requester_id {
            query = query.filter(request::Column::RequesterId.eq(requester_id));
        }
        if let Some(incident_id) = incident_id {
            query = query.filter(request::Column::IncidentId.eq(incident_id));
        }

        query
            .order_by_desc(request::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Lists the material detail rows of a request.
    #[instrument(skip(self))]
    pub async fn list_request_items(
        &self,
        request_id: Uuid,
    ) -> Result<Vec<request_item::Model>, ServiceError> {
        let db = &*self.db_pool;
        RequestItems::find()
            .filter(request_item::Column::RequestId.eq(request_id))
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Sets a request's review status.
    #[instrument(skip(self))]
    pub async fn review_request(
        &self,
        request_id: Uuid,
        review_status: ReviewStatus,
    ) -> Result<request::Model, ServiceError> {
        let db = &*self.db_pool;

        let row = Requests::find_by_id(request_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Request {} not found", request_id)))?;

        let mut active: request::ActiveModel = row.into();
        active.review_status = Set(Some(review_status.as_str().to_string()));
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(db).await.map_err(ServiceError::db_error)?;
        info!(request_id = %request_id, review_status = review_status.as_str(), "Request reviewed");
        Ok(updated)
    }

    /// Deletes a request together with its detail rows and claims.
    #[instrument(skip(self))]
    pub async fn delete_request(&self, request_id: Uuid) -> Result<request::Model, ServiceError> {
        let db = &*self.db_pool;

        let deleted = db
            .transaction::<_, request::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let row = Requests::find_by_id(request_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Request {} not found", request_id))
                        })?;

                    crate::entities::request_accept::Entity::delete_many()
                        .filter(
                            crate::entities::request_accept::Column::RequestId.eq(request_id),
                        )
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    RequestItems::delete_many()
                        .filter(request_item::Column::RequestId.eq(request_id))
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    RequestEquipments::delete_many()
                        .filter(request_equipment::Column::RequestId.eq(request_id))
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    RequestSkills::delete_many()
                        .filter(request_skill::Column::RequestId.eq(request_id))
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    row.clone()
                        .delete(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    Ok(row)
                })
            })
            .await
            .map_err(ServiceError::from)?;

        info!(request_id = %request_id, "Request deleted");

        if let Err(e) = self.event_sender.send(Event::RequestDeleted(request_id)).await {
            warn!(error = %e, request_id = %request_id, "Failed to send request deleted event");
        }

        Ok(deleted)
    }
}
