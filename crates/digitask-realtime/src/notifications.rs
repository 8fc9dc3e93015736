//! Notification reconciler.
//!
//! Merges the REST unread count and list with live pushes from
//! `/ws/notifications/` and the user's "mark all read" action. Races
//! between those channels are kept: a push that lands while mark-all-read
//! is in flight is wiped by its success, and a refetch overwrites the
//! local count.

use std::sync::Arc;

use digitask_api::{BackendApi, NotificationItem};
use digitask_common::{ApiError, Notice, NoticeBoard, NotificationId};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::dedup::DedupWindow;
use crate::protocol::{ChatNotification, NotificationInbound};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loaded,
}

/// Read-only view of the reconciled notification state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationSnapshot {
    pub state: LoadState,
    pub unread_count: u64,
    /// Newest first.
    pub items: Vec<NotificationItem>,
    pub chat_unread_count: u64,
    pub last_chat_notification: Option<ChatNotification>,
}

struct NotificationState {
    snapshot: NotificationSnapshot,
    seen: DedupWindow<NotificationId>,
}

#[derive(Clone)]
pub struct NotificationReconciler {
    backend: Arc<dyn BackendApi>,
    notices: NoticeBoard,
    state: Arc<RwLock<NotificationState>>,
}

impl NotificationReconciler {
    pub fn new(backend: Arc<dyn BackendApi>, notices: NoticeBoard, dedup_window: usize) -> Self {
        Self {
            backend,
            notices,
            state: Arc::new(RwLock::new(NotificationState {
                snapshot: NotificationSnapshot::default(),
                seen: DedupWindow::new(dedup_window),
            })),
        }
    }

    pub async fn snapshot(&self) -> NotificationSnapshot {
        self.state.read().await.snapshot.clone()
    }

    pub async fn unread_count(&self) -> u64 {
        self.state.read().await.snapshot.unread_count
    }

    pub async fn items(&self) -> Vec<NotificationItem> {
        self.state.read().await.snapshot.items.clone()
    }

    /// Fetch the unread count and the list. Whatever succeeds is applied;
    /// the state becomes `Loaded` only when both do.
    pub async fn load(&self) -> Result<(), ApiError> {
        let (count, items) = tokio::join!(
            self.backend.unread_notification_count(),
            self.backend.notifications()
        );

        let mut state = self.state.write().await;
        let mut first_error = None;
        match count {
            Ok(count) => state.snapshot.unread_count = count,
            Err(e) => {
                warn!(error = %e, "Failed to fetch unread notification count");
                first_error.get_or_insert(e);
            }
        }
        match items {
            Ok(items) => {
                for item in &items {
                    state.seen.insert(item.id);
                }
                state.snapshot.items = items;
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch notifications");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                state.snapshot.state = LoadState::Loaded;
                info!(
                    unread = state.snapshot.unread_count,
                    items = state.snapshot.items.len(),
                    "Notifications loaded"
                );
                Ok(())
            }
        }
    }

    /// Apply a live notification. Returns `false` for a repeated id.
    pub async fn on_push(&self, item: NotificationItem) -> bool {
        let mut state = self.state.write().await;
        if !state.seen.insert(item.id) {
            debug!(id = %item.id, "Duplicate notification push ignored");
            return false;
        }
        state.snapshot.unread_count += 1;
        info!(id = %item.id, title = %item.title, "Notification received");
        state.snapshot.items.insert(0, item);
        true
    }

    pub async fn on_chat_notification(&self, notification: ChatNotification) {
        debug!(group = %notification.group_id, "Chat notification received");
        self.state.write().await.snapshot.last_chat_notification = Some(notification);
    }

    pub async fn on_unread_count(&self, count: u64) {
        debug!(count, "Chat unread count pushed");
        self.state.write().await.snapshot.chat_unread_count = count;
    }

    /// Route one inbound frame. Chat notifications are handed back so the
    /// caller can forward them to the chat reconciler.
    pub async fn apply(&self, frame: NotificationInbound) -> Option<ChatNotification> {
        match frame {
            NotificationInbound::Notification { notification } => {
                self.on_push(notification).await;
                None
            }
            NotificationInbound::Chat { chat_notification } => {
                self.on_chat_notification(chat_notification.clone()).await;
                Some(chat_notification)
            }
            NotificationInbound::UnreadCount { count, .. } => {
                self.on_unread_count(count).await;
                None
            }
        }
    }

    /// Mark everything read on the server, then clear local state.
    ///
    /// Once loaded, an already-empty state returns `Ok` without a request.
    /// Before the first load the local zero says nothing about the server,
    /// so the request is always sent.
    /// On failure a notice is raised and the error returned.
    pub async fn mark_all_read(&self) -> Result<(), ApiError> {
        {
            let state = self.state.read().await;
            if state.snapshot.state == LoadState::Loaded
                && state.snapshot.unread_count == 0
                && state.snapshot.items.is_empty()
            {
                debug!("Nothing to mark read");
                return Ok(());
            }
        }

        match self.backend.mark_notifications_read().await {
            Ok(()) => {
                let mut state = self.state.write().await;
                state.snapshot.unread_count = 0;
                state.snapshot.items.clear();
                info!("All notifications marked read");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Mark all read failed");
                self.notices.push(Notice::error(
                    "Could not mark notifications as read",
                    e.to_string(),
                ));
                Err(e)
            }
        }
    }

    /// Overwrite the local count with the server's. Failures are logged.
    pub async fn refetch_count(&self) {
        match self.backend.unread_notification_count().await {
            Ok(count) => {
                self.state.write().await.snapshot.unread_count = count;
                debug!(count, "Unread notification count refreshed");
            }
            Err(e) => warn!(error = %e, "Failed to refresh unread notification count"),
        }
    }

    /// Forget everything (logout).
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.snapshot = NotificationSnapshot::default();
        state.seen.clear();
    }
}
