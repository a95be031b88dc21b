mod common;

use assert_matches::assert_matches;
use relief_api::entities::inventory_item::StockStatus;
use relief_api::errors::ServiceError;
use relief_api::services::lends::{CreateLendInput, ReturnByItemInput};
use relief_api::services::provides::CreateProvideInput;
use uuid::Uuid;

use common::{seed_category, seed_item, setup};

#[tokio::test]
async fn ledger_upsert_and_debit() {
    let (db, services) = setup().await;
    let item_id = seed_item(&db, "Bottled water", None).await;
    let warehouse = Uuid::new_v4();

    // First credit creates the row
    let row = services
        .inventory
        .add_stock(warehouse, item_id, 10, StockStatus::Available)
        .await
        .expect("add stock");
    assert_eq!(row.qty, 10);

    // Second credit increments it
    let row = services
        .inventory
        .add_stock(warehouse, item_id, 5, StockStatus::Available)
        .await
        .expect("add stock again");
    assert_eq!(row.qty, 15);

    // Debit within bounds
    let row = services
        .inventory
        .remove_stock(warehouse, item_id, 6, StockStatus::Available)
        .await
        .expect("remove stock");
    assert_eq!(row.qty, 9);

    // Debit past zero fails and leaves the row untouched
    let err = services
        .inventory
        .remove_stock(warehouse, item_id, 10, StockStatus::Available)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InsufficientStock(_));

    let row = services
        .inventory
        .get_stock(warehouse, item_id, StockStatus::Available)
        .await
        .expect("get stock")
        .expect("row exists");
    assert_eq!(row.qty, 9);
}

#[tokio::test]
async fn debit_of_missing_slot_is_not_found() {
    let (db, services) = setup().await;
    let item_id = seed_item(&db, "Tarpaulin", None).await;

    let err = services
        .inventory
        .remove_stock(Uuid::new_v4(), item_id, 1, StockStatus::Available)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn statuses_are_separate_slots() {
    let (db, services) = setup().await;
    let item_id = seed_item(&db, "Generator", None).await;
    let warehouse = Uuid::new_v4();

    services
        .inventory
        .add_stock(warehouse, item_id, 4, StockStatus::Available)
        .await
        .expect("available stock");
    services
        .inventory
        .add_stock(warehouse, item_id, 2, StockStatus::Unavailable)
        .await
        .expect("unavailable stock");

    let all = services
        .inventory
        .list_by_warehouse(warehouse, None)
        .await
        .expect("list");
    assert_eq!(all.len(), 2);

    let available = services
        .inventory
        .list_by_warehouse(warehouse, Some(StockStatus::Available))
        .await
        .expect("list available");
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].qty, 4);
}

#[tokio::test]
async fn warehouse_listing_joins_catalog_metadata() {
    let (db, services) = setup().await;
    let category_id = seed_category(&db, "Food & Water").await;
    let item_id = seed_item(&db, "Instant noodles", Some(category_id)).await;
    let warehouse = Uuid::new_v4();

    services
        .inventory
        .add_stock(warehouse, item_id, 30, StockStatus::Available)
        .await
        .expect("add stock");

    let rows = services
        .inventory
        .list_by_warehouse(warehouse, None)
        .await
        .expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].item_name, "Instant noodles");
    assert_eq!(rows[0].unit.as_deref(), Some("piece"));
    assert_eq!(rows[0].category_name.as_deref(), Some("Food & Water"));
}

// The lend scenario: ledger starts at 10, a lend of 4 drops it to 6,
// a lend of 7 fails without changing it, the return restores 10.
#[tokio::test]
async fn lend_and_return_round_trip() {
    let (db, services) = setup().await;
    let item_id = seed_item(&db, "Chainsaw", None).await;
    let warehouse = Uuid::new_v4();
    let borrower = Uuid::new_v4();
    let other_borrower = Uuid::new_v4();

    services
        .inventory
        .add_stock(warehouse, item_id, 10, StockStatus::Available)
        .await
        .expect("seed stock");

    let lend = services
        .lends
        .lend(CreateLendInput {
            user_id: borrower,
            item_id,
            qty: 4,
            from_inventory_id: warehouse,
        })
        .await
        .expect("lend 4");
    assert!(lend.returned_at.is_none());

    let stock = services
        .inventory
        .get_stock(warehouse, item_id, StockStatus::Available)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stock.qty, 6);

    let err = services
        .lends
        .lend(CreateLendInput {
            user_id: other_borrower,
            item_id,
            qty: 7,
            from_inventory_id: warehouse,
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InsufficientStock(_));

    let stock = services
        .inventory
        .get_stock(warehouse, item_id, StockStatus::Available)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stock.qty, 6);

    let returned = services
        .lends
        .return_item(lend.lend_id)
        .await
        .expect("return");
    assert!(returned.returned_at.is_some());

    let stock = services
        .inventory
        .get_stock(warehouse, item_id, StockStatus::Available)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stock.qty, 10);
}

#[tokio::test]
async fn return_is_not_idempotent() {
    let (db, services) = setup().await;
    let item_id = seed_item(&db, "Rope", None).await;
    let warehouse = Uuid::new_v4();

    services
        .inventory
        .add_stock(warehouse, item_id, 5, StockStatus::Available)
        .await
        .expect("seed stock");

    let lend = services
        .lends
        .lend(CreateLendInput {
            user_id: Uuid::new_v4(),
            item_id,
            qty: 2,
            from_inventory_id: warehouse,
        })
        .await
        .expect("lend");

    services
        .lends
        .return_item(lend.lend_id)
        .await
        .expect("first return succeeds");

    let err = services.lends.return_item(lend.lend_id).await.unwrap_err();
    assert_matches!(err, ServiceError::AlreadyReturned(_));

    // Credited exactly once
    let stock = services
        .inventory
        .get_stock(warehouse, item_id, StockStatus::Available)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stock.qty, 5);
}

#[tokio::test]
async fn return_of_unknown_lend_is_not_found() {
    let (_db, services) = setup().await;

    let err = services.lends.return_item(Uuid::new_v4()).await.unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn return_by_item_resolves_oldest_outstanding_lend() {
    let (db, services) = setup().await;
    let item_id = seed_item(&db, "Shovel", None).await;
    let warehouse = Uuid::new_v4();
    let borrower = Uuid::new_v4();

    services
        .inventory
        .add_stock(warehouse, item_id, 6, StockStatus::Available)
        .await
        .expect("seed stock");

    let first = services
        .lends
        .lend(CreateLendInput {
            user_id: borrower,
            item_id,
            qty: 1,
            from_inventory_id: warehouse,
        })
        .await
        .expect("first lend");
    services
        .lends
        .lend(CreateLendInput {
            user_id: borrower,
            item_id,
            qty: 2,
            from_inventory_id: warehouse,
        })
        .await
        .expect("second lend");

    let returned = services
        .lends
        .return_by_item(ReturnByItemInput {
            user_id: borrower,
            item_id,
            from_inventory_id: warehouse,
        })
        .await
        .expect("return by item");
    assert_eq!(returned.lend_id, first.lend_id);

    let outstanding = services.lends.list_outstanding().await.expect("outstanding");
    assert_eq!(outstanding.len(), 1);
    assert_eq!(outstanding[0].qty, 2);
}

#[tokio::test]
async fn donation_requires_target_inventory() {
    let (db, services) = setup().await;
    let item_id = seed_item(&db, "Blanket", None).await;

    let err = services
        .provides
        .provide(CreateProvideInput {
            user_id: Uuid::new_v4(),
            item_id,
            qty: 3,
            inventory_id: None,
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn donation_credits_the_warehouse() {
    let (db, services) = setup().await;
    let item_id = seed_item(&db, "Blanket", None).await;
    let warehouse = Uuid::new_v4();
    let donor = Uuid::new_v4();

    // First donation creates the slot
    services
        .provides
        .provide(CreateProvideInput {
            user_id: donor,
            item_id,
            qty: 3,
            inventory_id: Some(warehouse),
        })
        .await
        .expect("first donation");

    // Second donation tops it up
    services
        .provides
        .provide(CreateProvideInput {
            user_id: donor,
            item_id,
            qty: 2,
            inventory_id: Some(warehouse),
        })
        .await
        .expect("second donation");

    let stock = services
        .inventory
        .get_stock(warehouse, item_id, StockStatus::Available)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stock.qty, 5);

    let history = services
        .provides
        .list_by_user(donor)
        .await
        .expect("donation history");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].item_name.as_deref(), Some("Blanket"));
}

#[tokio::test]
async fn interleaved_debits_never_oversell() {
    let (db, services) = setup().await;
    let item_id = seed_item(&db, "Water filter", None).await;
    let warehouse = Uuid::new_v4();

    services
        .inventory
        .add_stock(warehouse, item_id, 10, StockStatus::Available)
        .await
        .expect("seed stock");

    // 20 debit attempts of 1 against a pool of 10: exactly 10 must succeed.
    let mut successes = 0;
    for i in 0..20 {
        let result = services
            .lends
            .lend(CreateLendInput {
                user_id: Uuid::new_v4(),
                item_id,
                qty: 1,
                from_inventory_id: warehouse,
            })
            .await;
        match result {
            Ok(_) => successes += 1,
            Err(ServiceError::InsufficientStock(_)) => {}
            Err(e) => panic!("unexpected error on attempt {}: {}", i, e),
        }
    }
    assert_eq!(successes, 10);

    let stock = services
        .inventory
        .get_stock(warehouse, item_id, StockStatus::Available)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stock.qty, 0);
}

// Requires a real Postgres and row locks to be meaningful.
// Run with: cargo test -- --ignored concurrent_lends
#[tokio::test]
#[ignore]
async fn concurrent_lends_never_oversell() {
    let database_url = std::env::var("APP__DATABASE_URL").expect("APP__DATABASE_URL must be set");
    let pool = relief_api::db::establish_connection(&database_url)
        .await
        .expect("db connect");
    relief_api::db::run_migrations(&pool).await.expect("migrations");

    let db = std::sync::Arc::new(pool);
    let (tx, rx) = tokio::sync::mpsc::channel(100);
    let sender = relief_api::events::EventSender::new(tx);
    tokio::spawn(relief_api::events::process_events(rx));
    let services = relief_api::handlers::AppServices::new(db.clone(), sender);

    let item_id = seed_item(&db, "Flashlight", None).await;
    let warehouse = Uuid::new_v4();
    services
        .inventory
        .add_stock(warehouse, item_id, 10, StockStatus::Available)
        .await
        .expect("seed stock");

    let mut tasks = vec![];
    for _ in 0..20 {
        let lends = services.lends.clone();
        tasks.push(tokio::spawn(async move {
            lends
                .lend(CreateLendInput {
                    user_id: Uuid::new_v4(),
                    item_id,
                    qty: 1,
                    from_inventory_id: warehouse,
                })
                .await
                .is_ok()
        }));
    }

    let mut successes = 0;
    for task in tasks {
        if task.await.unwrap_or(false) {
            successes += 1;
        }
    }
    assert_eq!(successes, 10, "exactly 10 lends should succeed");
}
