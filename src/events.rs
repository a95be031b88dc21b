use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Domain events emitted after a fulfillment transaction commits. Consumers
/// only ever observe committed state; an event is never sent for a rolled
/// back unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    RequestCreated(Uuid),
    RequestDeleted(Uuid),
    RequestCompleted(Uuid),
    RequestReopened(Uuid),

    ClaimCreated {
        request_id: Uuid,
        accepter_id: Uuid,
        qty: i32,
    },
    ClaimCancelled {
        request_id: Uuid,
        accepter_id: Uuid,
        qty: i32,
    },

    StockAdded {
        inventory_id: Uuid,
        item_id: Uuid,
        qty: i32,
        new_qty: i32,
    },
    StockRemoved {
        inventory_id: Uuid,
        item_id: Uuid,
        qty: i32,
        new_qty: i32,
    },
    StockLent {
        lend_id: Uuid,
        inventory_id: Uuid,
        item_id: Uuid,
        qty: i32,
    },
    StockReturned {
        lend_id: Uuid,
        inventory_id: Uuid,
        item_id: Uuid,
        qty: i32,
        returned_at: DateTime<Utc>,
    },
    StockProvided {
        provide_id: Uuid,
        inventory_id: Uuid,
        item_id: Uuid,
        qty: i32,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Drains the event channel and records each committed event. This is the
/// single consumer; notification fan-out would hang off this loop.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::RequestCompleted(request_id) => {
                info!(request_id = %request_id, "Request fully fulfilled");
            }
            Event::RequestReopened(request_id) => {
                warn!(request_id = %request_id, "Completed request reopened by claim cancellation");
            }
            Event::StockRemoved {
                inventory_id,
                item_id,
                new_qty,
                ..
            } if *new_qty == 0 => {
                warn!(inventory_id = %inventory_id, item_id = %item_id, "Stock slot drained to zero");
            }
            other => {
                info!(event = ?other, "Processed event");
            }
        }
    }

    info!("Event channel closed; stopping event processing loop");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_to_receiver() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        let request_id = Uuid::new_v4();

        sender
            .send(Event::RequestCompleted(request_id))
            .await
            .expect("send should succeed");

        match rx.recv().await {
            Some(Event::RequestCompleted(id)) => assert_eq!(id, request_id),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_fails_after_receiver_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        let result = sender.send(Event::RequestDeleted(Uuid::new_v4())).await;
        assert!(result.is_err());
    }
}
