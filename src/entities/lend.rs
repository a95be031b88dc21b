use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A temporary transfer of stock to a borrower. Outstanding while
/// `returned_at` is null; terminal once it is set.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lends")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub lend_id: Uuid,
    pub user_id: Uuid,
    pub item_id: Uuid,
    pub qty: i32,
    pub from_inventory_id: Uuid,
    pub lend_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

impl Model {
    pub fn is_outstanding(&self) -> bool {
        self.returned_at.is_none()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::ItemId"
    )]
    Item,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
