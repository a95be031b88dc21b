use std::sync::Arc;

use relief_api::db::{self, DbConfig, DbPool};
use relief_api::entities::{item, item_category};
use relief_api::events::{process_events, EventSender};
use relief_api::handlers::AppServices;
use relief_api::services::requests::{CreateRequestInput, RequestItemInput};
use sea_orm::{ActiveModelTrait, Set};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Brings up a fresh in-memory database with migrations applied and all
/// services wired against it. One connection keeps every query on the same
/// in-memory store.
pub async fn setup() -> (Arc<DbPool>, AppServices) {
    let db_cfg = DbConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        ..Default::default()
    };
    let pool = db::establish_connection_with_config(&db_cfg)
        .await
        .expect("Failed to connect to test database");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let db_arc = Arc::new(pool);
    let (tx, rx) = mpsc::channel(100);
    let sender = EventSender::new(tx);
    tokio::spawn(process_events(rx));

    let services = AppServices::new(db_arc.clone(), sender);
    (db_arc, services)
}

pub async fn seed_category(db: &DbPool, name: &str) -> Uuid {
    let category_id = Uuid::new_v4();
    item_category::ActiveModel {
        category_id: Set(category_id),
        category_name: Set(name.to_string()),
    }
    .insert(db)
    .await
    .expect("Failed to seed category");
    category_id
}

pub async fn seed_item(db: &DbPool, name: &str, category_id: Option<Uuid>) -> Uuid {
    let item_id = Uuid::new_v4();
    item::ActiveModel {
        item_id: Set(item_id),
        item_name: Set(name.to_string()),
        unit: Set(Some("piece".to_string())),
        category_id: Set(category_id),
    }
    .insert(db)
    .await
    .expect("Failed to seed item");
    item_id
}

/// A material request for a single item with the given quantity.
pub fn material_request(item_id: Uuid, qty: i32) -> CreateRequestInput {
    CreateRequestInput {
        requester_id: Uuid::new_v4(),
        incident_id: None,
        r#type: "material".to_string(),
        urgency: 3,
        address: Some("12 Riverside Rd".to_string()),
        items: vec![RequestItemInput { item_id, qty }],
        equipments: vec![],
        skills: vec![],
        headcount: None,
    }
}
