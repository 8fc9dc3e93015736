use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use digitask_api::{BackendApi, ChatGroupDetail, ChatGroupSummary, LastMessage};
use digitask_common::{ApiError, AuthSession, GroupId, Notice, NoticeBoard, RealtimeError};
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{debug, info, warn};

use crate::connection::{
    ConnectionHandle, ConnectionSettings, ConnectionStatus, Connector, StreamEvent, StreamKind,
};
use crate::events::RealtimeUpdate;
use crate::protocol::{ChatInbound, ChatNotification, ChatOutbound};

use super::types::{ascending, contains_id, ChatMessage};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct OpenGroup {
    id: GroupId,
    generation: u64,
    /// Ascending by creation time; history first, then the live tail.
    messages: Vec<ChatMessage>,
    /// Last history page successfully fetched.
    page: u32,
    has_more: bool,
    loading: bool,
}

impl OpenGroup {
    fn new(id: GroupId, generation: u64) -> Self {
        Self {
            id,
            generation,
            messages: Vec::new(),
            page: 0,
            has_more: false,
            loading: true,
        }
    }
}

#[derive(Debug, Default)]
struct ChatState {
    groups: Vec<ChatGroupSummary>,
    open: Option<OpenGroup>,
}

struct Inner {
    backend: Arc<dyn BackendApi>,
    auth: AuthSession,
    connector: Arc<dyn Connector>,
    settings: ConnectionSettings,
    notices: NoticeBoard,
    updates: broadcast::Sender<RealtimeUpdate>,
    state: RwLock<ChatState>,
    /// The single open group socket.
    socket: Mutex<Option<ConnectionHandle>>,
    /// Bumped on every group switch; frames tagged with an older value are
    /// dropped.
    generation: AtomicU64,
}

impl Inner {
    fn lock_socket(&self) -> MutexGuard<'_, Option<ConnectionHandle>> {
        self.socket.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct ChatReconciler {
    inner: Arc<Inner>,
}

impl ChatReconciler {
    pub fn new(
        backend: Arc<dyn BackendApi>,
        auth: AuthSession,
        connector: Arc<dyn Connector>,
        settings: ConnectionSettings,
        notices: NoticeBoard,
        updates: broadcast::Sender<RealtimeUpdate>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                auth,
                connector,
                settings,
                notices,
                updates,
                state: RwLock::new(ChatState::default()),
                socket: Mutex::new(None),
                generation: AtomicU64::new(0),
            }),
        }
    }

    // -- reads --------------------------------------------------------------

    pub async fn groups(&self) -> Vec<ChatGroupSummary> {
        self.inner.state.read().await.groups.clone()
    }

    pub async fn group(&self, id: GroupId) -> Option<ChatGroupSummary> {
        self.inner
            .state
            .read()
            .await
            .groups
            .iter()
            .find(|g| g.id == id)
            .cloned()
    }

    pub async fn total_unread(&self) -> u32 {
        self.inner
            .state
            .read()
            .await
            .groups
            .iter()
            .map(|g| g.unread_count)
            .sum()
    }

    pub async fn open_group(&self) -> Option<GroupId> {
        self.inner.state.read().await.open.as_ref().map(|o| o.id)
    }

    /// The open group's messages, oldest first.
    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.inner
            .state
            .read()
            .await
            .open
            .as_ref()
            .map(|o| o.messages.clone())
            .unwrap_or_default()
    }

    pub async fn has_more(&self) -> bool {
        self.inner
            .state
            .read()
            .await
            .open
            .as_ref()
            .is_some_and(|o| o.has_more)
    }

    pub async fn is_loading(&self) -> bool {
        self.inner
            .state
            .read()
            .await
            .open
            .as_ref()
            .is_some_and(|o| o.loading)
    }

    pub async fn current_page(&self) -> Option<u32> {
        self.inner.state.read().await.open.as_ref().map(|o| o.page)
    }

    pub fn socket_status(&self) -> Option<ConnectionStatus> {
        self.inner.lock_socket().as_ref().map(ConnectionHandle::status)
    }

    // -- summary list -------------------------------------------------------

    /// Replace the summary list with the server's. Failures are logged.
    pub async fn refresh_groups(&self) -> Result<(), ApiError> {
        match self.inner.backend.chat_groups().await {
            Ok(groups) => {
                debug!(count = groups.len(), "Chat groups refreshed");
                self.inner.state.write().await.groups = groups;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to refresh chat groups");
                Err(e)
            }
        }
    }

    /// A chat push from the notification stream.
    ///
    /// The open group only gets its `last_message` updated; any other group
    /// also gets exactly one more unread.
    pub async fn on_chat_notification(&self, notification: ChatNotification) {
        let mut state = self.inner.state.write().await;
        let open = state.open.as_ref().map(|o| o.id);
        let group = notification.group_id;

        let position = state.groups.iter().position(|g| g.id == group);
        let Some(index) = position else {
            drop(state);
            debug!(%group, "Chat notification for unknown group; refreshing list");
            let this = self.clone();
            tokio::spawn(async move {
                let _ = this.refresh_groups().await;
            });
            return;
        };

        let summary = &mut state.groups[index];
        summary.last_message = Some(LastMessage {
            content: notification.message_content,
            sender_name: notification.sender_name,
            created_at: notification.created_at,
        });
        if open != Some(group) {
            summary.unread_count += 1;
            debug!(%group, unread = summary.unread_count, "Chat unread incremented");
        }
    }

    // -- open group ---------------------------------------------------------

    /// Switch to `group`: close the previous socket, reset the list, open
    /// the new socket, load page 1, then mark read and refresh summaries.
    ///
    /// If page 1 fails the group stays open with the cursor at 0, and the
    /// next `load_more` fetches page 1 again.
    pub async fn select_group(&self, group: GroupId) -> Result<(), ApiError> {
        let (generation, events) = {
            let mut socket = self.inner.lock_socket();
            if let Some(previous) = socket.take() {
                previous.close();
            }
            let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
            let (handle, events) = ConnectionHandle::connect::<ChatInbound>(
                StreamKind::ChatGroup(group),
                &self.inner.settings,
                &self.inner.auth,
                Arc::clone(&self.inner.connector),
            );
            *socket = Some(handle);
            (generation, events)
        };

        {
            let mut state = self.inner.state.write().await;
            if !self.inner.is_current(generation) {
                debug!(%group, "Group selection superseded");
                return Ok(());
            }
            state.open = Some(OpenGroup::new(group, generation));
        }
        tokio::spawn(pump_group_events(
            Arc::downgrade(&self.inner),
            group,
            generation,
            events,
        ));
        info!(%group, "Chat group opened");

        let me = self.inner.auth.user_id();
        let first_page = self.inner.backend.group_messages(group, 1).await;
        {
            let mut state = self.inner.state.write().await;
            let Some(open) = state
                .open
                .as_mut()
                .filter(|o| o.generation == generation)
            else {
                debug!(%group, "Dropping first page of a group no longer open");
                return Ok(());
            };
            open.loading = false;
            match first_page {
                Ok(page) => {
                    open.page = 1;
                    open.has_more = page.has_next();
                    let mut messages = ascending(page.results, me);
                    // Live frames that beat the first page stay after history.
                    let live: Vec<ChatMessage> = open
                        .messages
                        .drain(..)
                        .filter(|m| !contains_id(&messages, m.id))
                        .collect();
                    messages.extend(live);
                    open.messages = messages;
                    debug!(%group, count = open.messages.len(), has_more = open.has_more, "First page loaded");
                }
                Err(e) => {
                    // Page 1 stays pending so `load_more` retries it.
                    open.has_more = true;
                    warn!(%group, error = %e, "Failed to load chat history");
                    return Err(e);
                }
            }
        }

        self.mark_read_and_refresh(group).await;
        Ok(())
    }

    /// Fetch the next older page and prepend it.
    ///
    /// Returns `Ok(false)` without a request when no group is open, a fetch
    /// is already running, or the server reported no further pages. The
    /// cursor advances only on success.
    pub async fn load_more(&self) -> Result<bool, ApiError> {
        let (group, generation, next_page) = {
            let mut state = self.inner.state.write().await;
            let Some(open) = state.open.as_mut() else {
                return Ok(false);
            };
            if open.loading || !open.has_more {
                return Ok(false);
            }
            open.loading = true;
            (open.id, open.generation, open.page + 1)
        };

        let result = self.inner.backend.group_messages(group, next_page).await;
        let me = self.inner.auth.user_id();

        {
            let mut state = self.inner.state.write().await;
            let Some(open) = state
                .open
                .as_mut()
                .filter(|o| o.generation == generation)
            else {
                return Ok(false);
            };
            open.loading = false;
            match result {
                Ok(page) => {
                    open.page = next_page;
                    open.has_more = page.has_next();
                    let mut older: Vec<ChatMessage> = ascending(page.results, me)
                        .into_iter()
                        .filter(|m| !contains_id(&open.messages, m.id))
                        .collect();
                    let added = older.len();
                    older.append(&mut open.messages);
                    open.messages = older;
                    debug!(%group, page = next_page, added, "Older messages loaded");
                }
                Err(e) => {
                    warn!(%group, page = next_page, error = %e, "Failed to load older messages");
                    return Err(e);
                }
            }
        }

        if next_page == 1 {
            self.mark_read_and_refresh(group).await;
        }
        Ok(true)
    }

    /// Apply a live frame to the open group.
    pub async fn on_live_message(&self, frame: ChatInbound) {
        let generation = self.inner.generation.load(Ordering::SeqCst);
        apply_live_message(&self.inner, generation, frame).await;
    }

    /// Send `text` on the open group's socket. No local echo: the message
    /// shows up when the server broadcasts it back.
    pub fn send_message(&self, text: &str) -> Result<(), RealtimeError> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let sender = self.inner.lock_socket().as_ref().map(ConnectionHandle::sender);
        let result = match sender {
            Some(sender) => sender.send_json(&ChatOutbound {
                message: text.to_string(),
            }),
            None => Err(RealtimeError::NotConnected),
        };
        if let Err(e) = &result {
            warn!(error = %e, "Chat message not sent");
            self.inner.notices.push(Notice::error(
                "Message not sent",
                "The chat connection is not open. Try again in a moment.",
            ));
        }
        result
    }

    /// Leave the open group and close its socket.
    pub async fn close_group(&self) {
        let previous = {
            let mut socket = self.inner.lock_socket();
            self.inner.generation.fetch_add(1, Ordering::SeqCst);
            socket.take()
        };
        if let Some(handle) = previous {
            handle.close();
        }
        if let Some(open) = self.inner.state.write().await.open.take() {
            info!(group = %open.id, "Chat group closed");
        }
    }

    /// Detail (members, owner, permissions) of the open group.
    pub async fn group_detail(&self) -> Result<Option<ChatGroupDetail>, ApiError> {
        let Some(group) = self.open_group().await else {
            return Ok(None);
        };
        self.inner.backend.chat_group_detail(group).await.map(Some)
    }

    /// Close the open group and forget the summary list (logout).
    pub async fn clear(&self) {
        self.close_group().await;
        self.inner.state.write().await.groups.clear();
    }

    async fn mark_read_and_refresh(&self, group: GroupId) {
        mark_read_and_refresh(&self.inner, group).await;
    }
}

// ---------------------------------------------------------------------------
// Background
// ---------------------------------------------------------------------------

async fn mark_read_and_refresh(inner: &Arc<Inner>, group: GroupId) {
    match inner.backend.mark_group_read(group).await {
        Ok(()) => {
            let mut state = inner.state.write().await;
            if let Some(summary) = state.groups.iter_mut().find(|g| g.id == group) {
                summary.unread_count = 0;
            }
        }
        Err(e) => warn!(%group, error = %e, "Failed to mark chat group read"),
    }
    let reconciler = ChatReconciler {
        inner: Arc::clone(inner),
    };
    let _ = reconciler.refresh_groups().await;
}

async fn apply_live_message(inner: &Arc<Inner>, generation: u64, frame: ChatInbound) {
    let message = ChatMessage::from_live(frame, inner.auth.user_id());
    let group = {
        let mut state = inner.state.write().await;
        let ChatState { groups, open } = &mut *state;
        let Some(open) = open.as_mut().filter(|o| o.generation == generation) else {
            debug!("Dropping live message for a group no longer open");
            return;
        };
        if contains_id(&open.messages, message.id) {
            debug!(group = %open.id, "Duplicate live message ignored");
            return;
        }
        open.messages.push(message.clone());
        if let Some(summary) = groups.iter_mut().find(|g| g.id == open.id) {
            summary.last_message = Some(message.to_last_message());
        }
        open.id
    };

    let _ = inner.updates.send(RealtimeUpdate::ChatMessage {
        group,
        message: message.clone(),
    });

    if message.id.is_some() {
        let inner = Arc::clone(inner);
        tokio::spawn(async move {
            mark_read_and_refresh(&inner, group).await;
        });
    }
}

/// Feeds one group socket's events into the reconciler until the group is
/// switched away from or the socket closes.
async fn pump_group_events(
    inner: Weak<Inner>,
    group: GroupId,
    generation: u64,
    mut events: mpsc::Receiver<StreamEvent<ChatInbound>>,
) {
    while let Some(event) = events.recv().await {
        let Some(inner) = inner.upgrade() else {
            break;
        };
        if !inner.is_current(generation) {
            debug!(%group, "Dropping event from previously open group");
            break;
        }
        let status = match event {
            StreamEvent::Message(frame) => {
                apply_live_message(&inner, generation, frame).await;
                continue;
            }
            other => match other.status() {
                Some(status) => status,
                None => continue,
            },
        };
        let _ = inner.updates.send(RealtimeUpdate::StreamStatus {
            stream: StreamKind::ChatGroup(group),
            status,
        });
        if status == ConnectionStatus::Closed {
            break;
        }
    }
}
