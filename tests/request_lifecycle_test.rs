mod common;

use assert_matches::assert_matches;
use relief_api::entities::request::{RequestStatus, ReviewStatus};
use relief_api::errors::ServiceError;
use relief_api::services::requests::{
    CreateRequestInput, RequestEquipmentInput, RequestItemInput,
};
use uuid::Uuid;

use common::{material_request, seed_item, setup};

#[tokio::test]
async fn material_request_carries_its_detail_rows() {
    let (db, services) = setup().await;
    let rice = seed_item(&db, "Rice bag", None).await;
    let water = seed_item(&db, "Bottled water", None).await;

    let input = CreateRequestInput {
        requester_id: Uuid::new_v4(),
        incident_id: Some(Uuid::new_v4()),
        r#type: "material".to_string(),
        urgency: 5,
        address: None,
        items: vec![
            RequestItemInput {
                item_id: rice,
                qty: 20,
            },
            RequestItemInput {
                item_id: water,
                qty: 30,
            },
        ],
        equipments: vec![],
        skills: vec![],
        headcount: None,
    };

    let request = services
        .requests
        .create_request(input)
        .await
        .expect("create request");
    assert_eq!(request.required_qty, 50);
    assert_eq!(request.status, RequestStatus::NotCompleted.as_str());
    assert_eq!(
        request.review_status.as_deref(),
        Some(ReviewStatus::Unverified.as_str())
    );

    let details = services
        .requests
        .list_request_items(request.request_id)
        .await
        .expect("detail rows");
    assert_eq!(details.len(), 2);
}

#[tokio::test]
async fn material_request_without_items_is_rejected() {
    let (_db, services) = setup().await;

    let input = CreateRequestInput {
        requester_id: Uuid::new_v4(),
        incident_id: None,
        r#type: "material".to_string(),
        urgency: 2,
        address: None,
        items: vec![],
        equipments: vec![],
        skills: vec![],
        headcount: None,
    };

    let err = services.requests.create_request(input).await.unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn tool_and_humanpower_requests_derive_required_qty() {
    let (_db, services) = setup().await;

    let tool_request = services
        .requests
        .create_request(CreateRequestInput {
            requester_id: Uuid::new_v4(),
            incident_id: None,
            r#type: "tool".to_string(),
            urgency: 4,
            address: None,
            items: vec![],
            equipments: vec![
                RequestEquipmentInput {
                    equipment_name: "Water pump".to_string(),
                    qty: 2,
                },
                RequestEquipmentInput {
                    equipment_name: "Excavator".to_string(),
                    qty: 1,
                },
            ],
            skills: vec![],
            headcount: None,
        })
        .await
        .expect("tool request");
    assert_eq!(tool_request.required_qty, 3);

    let rescue_request = services
        .requests
        .create_request(CreateRequestInput {
            requester_id: Uuid::new_v4(),
            incident_id: None,
            r#type: "humanpower".to_string(),
            urgency: 5,
            address: None,
            items: vec![],
            equipments: vec![],
            skills: vec!["first-aid".to_string(), "swift-water".to_string()],
            headcount: Some(8),
        })
        .await
        .expect("humanpower request");
    assert_eq!(rescue_request.required_qty, 8);
}

#[tokio::test]
async fn humanpower_request_needs_positive_headcount() {
    let (_db, services) = setup().await;

    let err = services
        .requests
        .create_request(CreateRequestInput {
            requester_id: Uuid::new_v4(),
            incident_id: None,
            r#type: "humanpower".to_string(),
            urgency: 3,
            address: None,
            items: vec![],
            equipments: vec![],
            skills: vec![],
            headcount: None,
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn unknown_request_type_is_rejected() {
    let (_db, services) = setup().await;

    let mut input = material_request(Uuid::new_v4(), 5);
    input.r#type = "rescue".to_string();

    let err = services.requests.create_request(input).await.unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn progress_wrapper_moves_counters_and_status() {
    let (db, services) = setup().await;
    let item_id = seed_item(&db, "Canned food", None).await;

    let request = services
        .requests
        .create_request(material_request(item_id, 4))
        .await
        .expect("create request");

    let updated = services
        .requests
        .record_progress(request.request_id, 4)
        .await
        .expect("record progress");
    assert_eq!(updated.current_qty, 4);
    assert_eq!(updated.status, RequestStatus::Completed.as_str());

    // Negative delta reopens
    let updated = services
        .requests
        .record_progress(request.request_id, -1)
        .await
        .expect("reverse progress");
    assert_eq!(updated.current_qty, 3);
    assert_eq!(updated.status, RequestStatus::NotCompleted.as_str());
}

#[tokio::test]
async fn review_status_is_orthogonal_to_fulfillment() {
    let (db, services) = setup().await;
    let item_id = seed_item(&db, "Soap", None).await;

    let request = services
        .requests
        .create_request(material_request(item_id, 2))
        .await
        .expect("create request");

    let reviewed = services
        .requests
        .review_request(request.request_id, ReviewStatus::Approved)
        .await
        .expect("review");
    assert_eq!(
        reviewed.review_status.as_deref(),
        Some(ReviewStatus::Approved.as_str())
    );
    assert_eq!(reviewed.status, RequestStatus::NotCompleted.as_str());
}

#[tokio::test]
async fn listing_filters_by_requester_and_incident() {
    let (db, services) = setup().await;
    let item_id = seed_item(&db, "Gloves", None).await;
    let requester = Uuid::new_v4();
    let incident = Uuid::new_v4();

    let mut input = material_request(item_id, 2);
    input.requester_id = requester;
    input.incident_id = Some(incident);
    services
        .requests
        .create_request(input)
        .await
        .expect("targeted request");
    services
        .requests
        .create_request(material_request(item_id, 2))
        .await
        .expect("unrelated request");

    let by_requester = services
        .requests
        .list_requests(Some(requester), None)
        .await
        .expect("by requester");
    assert_eq!(by_requester.len(), 1);

    let by_incident = services
        .requests
        .list_requests(None, Some(incident))
        .await
        .expect("by incident");
    assert_eq!(by_incident.len(), 1);

    let all = services
        .requests
        .list_requests(None, None)
        .await
        .expect("all requests");
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn delete_cascades_to_details_and_claims() {
    let (db, services) = setup().await;
    let item_id = seed_item(&db, "Boots", None).await;
    let accepter = Uuid::new_v4();

    let request = services
        .requests
        .create_request(material_request(item_id, 5))
        .await
        .expect("create request");
    services
        .accepts
        .create_accept(relief_api::services::accepts::CreateAcceptInput {
            request_id: request.request_id,
            accepter_id: accepter,
            qty: 2,
            eta: None,
            description: None,
            source: None,
        })
        .await
        .expect("claim");

    services
        .requests
        .delete_request(request.request_id)
        .await
        .expect("delete request");

    assert!(services
        .requests
        .get_request(request.request_id)
        .await
        .unwrap()
        .is_none());
    let details = services
        .requests
        .list_request_items(request.request_id)
        .await
        .expect("details");
    assert!(details.is_empty());
    let claims = services
        .accepts
        .list_by_request(request.request_id)
        .await
        .expect("claims");
    assert!(claims.is_empty());

    // Deleting again reports the absence
    let err = services
        .requests
        .delete_request(request.request_id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}
