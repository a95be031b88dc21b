//! Accept (Claim) Manager
//!
//! Records pledges against requests and drives the Request Progress Tracker.
//! Single accepts are one atomic unit each; bulk accept is a batch of
//! independent atomic units where one item's failure never rolls back or
//! blocks the others.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set, SqlErr,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::request_accept::{self, Entity as RequestAccepts};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::requests::{apply_progress, ProgressUpdate, RequestService};

/// Payload for a single claim. The claim UI speaks camelCase; this is the
/// shape it sends.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAcceptInput {
    pub request_id: Uuid,
    pub accepter_id: Uuid,
    #[validate(range(min = 1))]
    pub qty: i32,
    pub eta: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub source: Option<String>,
}

/// One entry of a bulk claim submission.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkAcceptItem {
    pub request_id: Uuid,
    #[validate(range(min = 1))]
    pub qty: i32,
    pub eta: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub source: Option<String>,
}

/// Per-item failure in a bulk submission, keyed by the failing request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkAcceptError {
    pub request_id: Uuid,
    pub error: String,
}

/// Caller-facing summary of a bulk submission. `successful` counts created
/// claims; callers must check `errors` even when the call as a whole
/// succeeded, since a partially satisfied batch still returns 201.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkAcceptOutcome {
    #[schema(value_type = Vec<Object>)]
    pub results: Vec<request_accept::Model>,
    pub successful: usize,
    pub total_items: usize,
    pub errors: Vec<BulkAcceptError>,
}

#[derive(Clone)]
pub struct AcceptService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
    requests: RequestService,
}

impl AcceptService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender, requests: RequestService) -> Self {
        Self {
            db_pool,
            event_sender,
            requests,
        }
    }

    /// Records one claim. In a single transaction the request row is locked
    /// and its progress advanced (rejecting fulfilled/overrun requests), then
    /// the accept row is inserted; a second claim for the same
    /// `(request, accepter)` pair surfaces as `DuplicateClaim` and leaves the
    /// progress counter untouched.
    #[instrument(skip(self, input), fields(request_id = %input.request_id, accepter_id = %input.accepter_id))]
    pub async fn create_accept(
        &self,
        input: CreateAcceptInput,
    ) -> Result<request_accept::Model, ServiceError> {
        input.validate()?;

        let db = &*self.db_pool;
        let request_id = input.request_id;
        let accepter_id = input.accepter_id;
        let qty = input.qty;

        let (accept, progress) = db
            .transaction::<_, (request_accept::Model, ProgressUpdate), ServiceError>(
                move |txn| {
                    Box::pin(async move {
                        let existing = RequestAccepts::find_by_id((request_id, accepter_id))
                            .one(txn)
                            .await
                            .map_err(ServiceError::db_error)?;
                        if existing.is_some() {
                            return Err(ServiceError::DuplicateClaim(format!(
                                "User {} has already claimed request {}",
                                accepter_id, request_id
                            )));
                        }

                        let progress = apply_progress(txn, request_id, qty).await?;

                        let accept = request_accept::ActiveModel {
                            request_id: Set(request_id),
                            accepter_id: Set(accepter_id),
                            qty: Set(qty),
                            eta: Set(input.eta),
                            description: Set(input.description),
                            source: Set(input.source),
                            created_at: Set(Utc::now()),
                        };

                        let accept = accept.insert(txn).await.map_err(|e| {
                            match e.sql_err() {
                                Some(SqlErr::UniqueConstraintViolation(_)) => {
                                    ServiceError::DuplicateClaim(format!(
                                        "User {} has already claimed request {}",
                                        accepter_id, request_id
                                    ))
                                }
                                _ => ServiceError::DatabaseError(e),
                            }
                        })?;

                        Ok((accept, progress))
                    })
                },
            )
            .await
            .map_err(ServiceError::from)?;

        info!(
            request_id = %request_id,
            accepter_id = %accepter_id,
            qty = qty,
            current_qty = progress.request.current_qty,
            "Claim recorded"
        );

        if let Err(e) = self
            .event_sender
            .send(Event::ClaimCreated {
                request_id,
                accepter_id,
                qty,
            })
            .await
        {
            warn!(error = %e, request_id = %request_id, "Failed to send claim created event");
        }
        self.requests.emit_progress_events(&progress).await;

        Ok(accept)
    }

    /// Cancels a claim and reverses its progress delta symmetrically: the
    /// request's `current_qty` drops by the claim's qty and a completed
    /// request reopens when progress falls below the requirement.
    #[instrument(skip(self))]
    pub async fn cancel_accept(
        &self,
        request_id: Uuid,
        accepter_id: Uuid,
    ) -> Result<request_accept::Model, ServiceError> {
        let db = &*self.db_pool;

        let (accept, progress) = db
            .transaction::<_, (request_accept::Model, ProgressUpdate), ServiceError>(
                move |txn| {
                    Box::pin(async move {
                        let accept = RequestAccepts::find_by_id((request_id, accepter_id))
                            .one(txn)
                            .await
                            .map_err(ServiceError::db_error)?
                            .ok_or_else(|| {
                                ServiceError::NotFound(format!(
                                    "No claim by user {} on request {}",
                                    accepter_id, request_id
                                ))
                            })?;

                        accept
                            .clone()
                            .delete(txn)
                            .await
                            .map_err(ServiceError::db_error)?;

                        let progress = apply_progress(txn, request_id, -accept.qty).await?;

                        Ok((accept, progress))
                    })
                },
            )
            .await
            .map_err(ServiceError::from)?;

        info!(
            request_id = %request_id,
            accepter_id = %accepter_id,
            qty = accept.qty,
            current_qty = progress.request.current_qty,
            "Claim cancelled"
        );

        if let Err(e) = self
            .event_sender
            .send(Event::ClaimCancelled {
                request_id,
                accepter_id,
                qty: accept.qty,
            })
            .await
        {
            warn!(error = %e, request_id = %request_id, "Failed to send claim cancelled event");
        }
        self.requests.emit_progress_events(&progress).await;

        Ok(accept)
    }

    /// Submits many claims in one call. Each entry runs as its own atomic
    /// unit; failures are collected per request id and do not stop the batch.
    #[instrument(skip(self, items), fields(accepter_id = %accepter_id, total_items = items.len()))]
    pub async fn bulk_accept(
        &self,
        accepter_id: Uuid,
        items: Vec<BulkAcceptItem>,
    ) -> Result<BulkAcceptOutcome, ServiceError> {
        if items.is_empty() {
            return Err(ServiceError::ValidationError(
                "Bulk accept requires at least one item".to_string(),
            ));
        }

        let total_items = items.len();
        let mut results = Vec::new();
        let mut errors = Vec::new();

        for item in items {
            let request_id = item.request_id;
            let input = CreateAcceptInput {
                request_id,
                accepter_id,
                qty: item.qty,
                eta: item.eta,
                description: item.description,
                source: item.source,
            };

            match self.create_accept(input).await {
                Ok(accept) => results.push(accept),
                Err(e) => {
                    warn!(
                        request_id = %request_id,
                        accepter_id = %accepter_id,
                        error = %e,
                        "Bulk accept item failed"
                    );
                    errors.push(BulkAcceptError {
                        request_id,
                        error: e.response_message(),
                    });
                }
            }
        }

        info!(
            accepter_id = %accepter_id,
            successful = results.len(),
            failed = errors.len(),
            "Bulk accept completed"
        );

        Ok(BulkAcceptOutcome {
            successful: results.len(),
            total_items,
            results,
            errors,
        })
    }

    /// Lists claims on a request, newest first.
    #[instrument(skip(self))]
    pub async fn list_by_request(
        &self,
        request_id: Uuid,
    ) -> Result<Vec<request_accept::Model>, ServiceError> {
        let db = &*self.db_pool;
        RequestAccepts::find()
            .filter(request_accept::Column::RequestId.eq(request_id))
            .order_by_desc(request_accept::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Lists a user's claims, newest first.
    #[instrument(skip(self))]
    pub async fn list_by_accepter(
        &self,
        accepter_id: Uuid,
    ) -> Result<Vec<request_accept::Model>, ServiceError> {
        let db = &*self.db_pool;
        RequestAccepts::find()
            .filter(request_accept::Column::AccepterId.eq(accepter_id))
            .order_by_desc(request_accept::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }
}
