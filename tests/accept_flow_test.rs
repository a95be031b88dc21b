mod common;

use assert_matches::assert_matches;
use relief_api::entities::request::RequestStatus;
use relief_api::errors::ServiceError;
use relief_api::services::accepts::{BulkAcceptItem, CreateAcceptInput};
use uuid::Uuid;

use common::{material_request, seed_item, setup};

fn claim(request_id: Uuid, accepter_id: Uuid, qty: i32) -> CreateAcceptInput {
    CreateAcceptInput {
        request_id,
        accepter_id,
        qty,
        eta: None,
        description: None,
        source: None,
    }
}

#[tokio::test]
async fn claims_accumulate_until_completion() {
    let (db, services) = setup().await;
    let item_id = seed_item(&db, "Rice bag", None).await;

    let request = services
        .requests
        .create_request(material_request(item_id, 10))
        .await
        .expect("create request");
    assert_eq!(request.required_qty, 10);
    assert_eq!(request.current_qty, 0);

    services
        .accepts
        .create_accept(claim(request.request_id, Uuid::new_v4(), 4))
        .await
        .expect("first claim");
    services
        .accepts
        .create_accept(claim(request.request_id, Uuid::new_v4(), 6))
        .await
        .expect("second claim");

    let request = services
        .requests
        .get_request(request.request_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(request.current_qty, 10);
    assert_eq!(request.status, RequestStatus::Completed.as_str());

    // A completed request absorbs nothing more
    let err = services
        .accepts
        .create_accept(claim(request.request_id, Uuid::new_v4(), 1))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::RequestAlreadyFulfilled(_));
}

#[tokio::test]
async fn overrun_claims_are_rejected_before_any_write() {
    let (db, services) = setup().await;
    let item_id = seed_item(&db, "Tent", None).await;

    let request = services
        .requests
        .create_request(material_request(item_id, 5))
        .await
        .expect("create request");

    services
        .accepts
        .create_accept(claim(request.request_id, Uuid::new_v4(), 3))
        .await
        .expect("claim within bounds");

    let accepter = Uuid::new_v4();
    let err = services
        .accepts
        .create_accept(claim(request.request_id, accepter, 3))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::QuantityExceedsRemaining(_));

    // Progress untouched, no claim row left behind
    let request = services
        .requests
        .get_request(request.request_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(request.current_qty, 3);
    let claims = services
        .accepts
        .list_by_accepter(accepter)
        .await
        .expect("claims by rejected accepter");
    assert!(claims.is_empty());
}

#[tokio::test]
async fn duplicate_claim_is_rejected_without_progress_change() {
    let (db, services) = setup().await;
    let item_id = seed_item(&db, "First aid kit", None).await;

    let request = services
        .requests
        .create_request(material_request(item_id, 10))
        .await
        .expect("create request");
    let accepter = Uuid::new_v4();

    services
        .accepts
        .create_accept(claim(request.request_id, accepter, 4))
        .await
        .expect("first claim");

    let err = services
        .accepts
        .create_accept(claim(request.request_id, accepter, 2))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::DuplicateClaim(_));

    let request = services
        .requests
        .get_request(request.request_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(request.current_qty, 4);
}

#[tokio::test]
async fn claim_on_unknown_request_is_not_found() {
    let (_db, services) = setup().await;

    let err = services
        .accepts
        .create_accept(claim(Uuid::new_v4(), Uuid::new_v4(), 1))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn bulk_accept_isolates_per_item_failures() {
    let (db, services) = setup().await;
    let item_id = seed_item(&db, "Sleeping bag", None).await;
    let accepter = Uuid::new_v4();

    let first = services
        .requests
        .create_request(material_request(item_id, 5))
        .await
        .expect("first request");
    let second = services
        .requests
        .create_request(material_request(item_id, 5))
        .await
        .expect("second request");
    let third = services
        .requests
        .create_request(material_request(item_id, 5))
        .await
        .expect("third request");

    // Pre-existing claim makes item #2 of the batch a duplicate
    services
        .accepts
        .create_accept(claim(second.request_id, accepter, 1))
        .await
        .expect("pre-existing claim");

    let entry = |request_id, qty| BulkAcceptItem {
        request_id,
        qty,
        eta: None,
        description: None,
        source: None,
    };

    let outcome = services
        .accepts
        .bulk_accept(
            accepter,
            vec![
                entry(first.request_id, 2),
                entry(second.request_id, 2),
                entry(third.request_id, 3),
            ],
        )
        .await
        .expect("bulk accept");

    assert_eq!(outcome.total_items, 3);
    assert_eq!(outcome.successful, 2);
    assert_eq!(outcome.results.len(), 2);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].request_id, second.request_id);

    // Items #1 and #3 landed despite the failure in the middle
    let first = services
        .requests
        .get_request(first.request_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.current_qty, 2);
    let third = services
        .requests
        .get_request(third.request_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(third.current_qty, 3);
    // Item #2 kept only its original pledge
    let second = services
        .requests
        .get_request(second.request_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second.current_qty, 1);
}

#[tokio::test]
async fn empty_bulk_batch_is_rejected() {
    let (_db, services) = setup().await;

    let err = services
        .accepts
        .bulk_accept(Uuid::new_v4(), vec![])
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn cancel_reverses_progress_and_reopens_completed_requests() {
    let (db, services) = setup().await;
    let item_id = seed_item(&db, "Face mask", None).await;

    let request = services
        .requests
        .create_request(material_request(item_id, 6))
        .await
        .expect("create request");
    let first_accepter = Uuid::new_v4();
    let second_accepter = Uuid::new_v4();

    services
        .accepts
        .create_accept(claim(request.request_id, first_accepter, 4))
        .await
        .expect("first claim");
    services
        .accepts
        .create_accept(claim(request.request_id, second_accepter, 2))
        .await
        .expect("completing claim");

    let completed = services
        .requests
        .get_request(request.request_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(completed.status, RequestStatus::Completed.as_str());

    let cancelled = services
        .accepts
        .cancel_accept(request.request_id, first_accepter)
        .await
        .expect("cancel");
    assert_eq!(cancelled.qty, 4);

    let reopened = services
        .requests
        .get_request(request.request_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reopened.current_qty, 2);
    assert_eq!(reopened.status, RequestStatus::NotCompleted.as_str());

    // The freed capacity can be claimed again
    services
        .accepts
        .create_accept(claim(request.request_id, Uuid::new_v4(), 4))
        .await
        .expect("reclaim freed capacity");
}

#[tokio::test]
async fn cancel_of_unknown_claim_is_not_found() {
    let (db, services) = setup().await;
    let item_id = seed_item(&db, "Helmet", None).await;

    let request = services
        .requests
        .create_request(material_request(item_id, 3))
        .await
        .expect("create request");

    let err = services
        .accepts
        .cancel_accept(request.request_id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn claim_listings_cover_both_sides() {
    let (db, services) = setup().await;
    let item_id = seed_item(&db, "Lantern", None).await;
    let accepter = Uuid::new_v4();

    let first = services
        .requests
        .create_request(material_request(item_id, 5))
        .await
        .expect("first request");
    let second = services
        .requests
        .create_request(material_request(item_id, 5))
        .await
        .expect("second request");

    services
        .accepts
        .create_accept(claim(first.request_id, accepter, 1))
        .await
        .expect("claim one");
    services
        .accepts
        .create_accept(claim(second.request_id, accepter, 2))
        .await
        .expect("claim two");

    let by_request = services
        .accepts
        .list_by_request(first.request_id)
        .await
        .expect("by request");
    assert_eq!(by_request.len(), 1);
    assert_eq!(by_request[0].accepter_id, accepter);

    let by_accepter = services
        .accepts
        .list_by_accepter(accepter)
        .await
        .expect("by accepter");
    assert_eq!(by_accepter.len(), 2);
}
