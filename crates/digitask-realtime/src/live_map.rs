//! Live map reconciler: the REST snapshot of field users and warehouses,
//! moved along by `location_message` frames from the tracking stream.

use std::sync::Arc;

use chrono::Utc;
use digitask_api::{BackendApi, LiveMapSnapshot, LiveMapUser, Warehouse};
use digitask_common::{ApiError, UserId};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::protocol::LocationMessage;

#[derive(Clone)]
pub struct LiveMap {
    backend: Arc<dyn BackendApi>,
    state: Arc<RwLock<LiveMapSnapshot>>,
}

impl LiveMap {
    pub fn new(backend: Arc<dyn BackendApi>) -> Self {
        Self {
            backend,
            state: Arc::new(RwLock::new(LiveMapSnapshot::default())),
        }
    }

    pub async fn load(&self) -> Result<(), ApiError> {
        match self.backend.live_map().await {
            Ok(snapshot) => {
                info!(
                    users = snapshot.users.len(),
                    warehouses = snapshot.warehouses.len(),
                    "Live map loaded"
                );
                *self.state.write().await = snapshot;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to load live map");
                Err(e)
            }
        }
    }

    /// Move a known user. Unknown users are ignored until the next load.
    pub async fn apply(&self, message: &LocationMessage) -> bool {
        let mut state = self.state.write().await;
        let Some(user) = state.users.iter_mut().find(|u| u.user_id == message.user_id) else {
            debug!(user = %message.user_id, "Location for user not on the map");
            return false;
        };
        user.latitude = Some(message.latitude);
        user.longitude = Some(message.longitude);
        user.is_online = message.is_online;
        user.last_seen = Some(Utc::now());
        true
    }

    pub async fn users(&self) -> Vec<LiveMapUser> {
        self.state.read().await.users.clone()
    }

    pub async fn user(&self, id: UserId) -> Option<LiveMapUser> {
        self.state
            .read()
            .await
            .users
            .iter()
            .find(|u| u.user_id == id)
            .cloned()
    }

    pub async fn warehouses(&self) -> Vec<Warehouse> {
        self.state.read().await.warehouses.clone()
    }

    pub async fn online_count(&self) -> usize {
        self.state
            .read()
            .await
            .users
            .iter()
            .filter(|u| u.is_online)
            .count()
    }

    pub async fn clear(&self) {
        *self.state.write().await = LiveMapSnapshot::default();
    }
}
