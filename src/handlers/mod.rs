pub mod accepts;
pub mod inventory;
pub mod lends;
pub mod provides;
pub mod requests;

use std::sync::Arc;

use crate::db::DbPool;
use crate::events::EventSender;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub inventory: Arc<crate::services::inventory::InventoryService>,
    pub lends: Arc<crate::services::lends::LendService>,
    pub provides: Arc<crate::services::provides::ProvideService>,
    pub requests: Arc<crate::services::requests::RequestService>,
    pub accepts: Arc<crate::services::accepts::AcceptService>,
}

impl AppServices {
    /// Wires every service against the shared pool and event channel.
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        let inventory = Arc::new(crate::services::inventory::InventoryService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let lends = Arc::new(crate::services::lends::LendService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let provides = Arc::new(crate::services::provides::ProvideService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let requests_service =
            crate::services::requests::RequestService::new(db_pool.clone(), event_sender.clone());
        let accepts = Arc::new(crate::services::accepts::AcceptService::new(
            db_pool,
            event_sender,
            requests_service.clone(),
        ));

        Self {
            inventory,
            lends,
            provides,
            requests: Arc::new(requests_service),
            accepts,
        }
    }
}
