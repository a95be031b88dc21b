use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of resource a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    Material,
    Tool,
    Humanpower,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Material => "material",
            RequestType::Tool => "tool",
            RequestType::Humanpower => "humanpower",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "material" => Some(RequestType::Material),
            "tool" => Some(RequestType::Tool),
            "humanpower" => Some(RequestType::Humanpower),
            _ => None,
        }
    }
}

/// Fulfillment status derived from `current_qty` vs `required_qty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    NotCompleted,
    Completed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::NotCompleted => "not_completed",
            RequestStatus::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "not_completed" => Some(RequestStatus::NotCompleted),
            "completed" => Some(RequestStatus::Completed),
            _ => None,
        }
    }

    /// The status a request should carry for the given progress counters.
    pub fn derive(current_qty: i32, required_qty: i32) -> Self {
        if current_qty >= required_qty {
            RequestStatus::Completed
        } else {
            RequestStatus::NotCompleted
        }
    }
}

/// Moderation state set by reviewers; orthogonal to fulfillment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewStatus {
    Unverified,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Unverified => "unverified",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "unverified" => Some(ReviewStatus::Unverified),
            "approved" => Some(ReviewStatus::Approved),
            "rejected" => Some(ReviewStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub request_id: Uuid,
    pub requester_id: Uuid,
    pub incident_id: Option<Uuid>,
    pub r#type: String,
    pub required_qty: i32,
    pub current_qty: i32,
    pub status: String,
    pub urgency: i32,
    pub review_status: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::request_accept::Entity")]
    RequestAccepts,
    #[sea_orm(has_many = "super::request_item::Entity")]
    RequestItems,
}

impl Related<super::request_accept::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RequestAccepts.def()
    }
}

impl Related<super::request_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RequestItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
