//! In-memory fakes shared by the unit tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use digitask_api::{
    BackendApi, ChatGroupDetail, ChatGroupSummary, HistoryMessage, LiveMapSnapshot, MessagePage,
    NotificationItem, NotificationType, UserSummary,
};
use digitask_common::{ApiError, GroupId, MessageId, NotificationId, RealtimeError, UserId};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::connection::{ConnectionSettings, Connector, FrameSink, FrameStream};
use crate::location::{LocationError, LocationProvider, PresenceSample, WatchOptions};

pub(crate) fn settings() -> ConnectionSettings {
    ConnectionSettings {
        ws_base: "ws://backend.test".into(),
        reconnect_delay: Duration::from_millis(5000),
        connect_timeout: Duration::from_secs(15),
        event_buffer: 64,
    }
}

pub(crate) fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_714_557_600 + secs, 0).unwrap()
}

/// Let spawned tasks run until they block again.
pub(crate) async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

// ---------------------------------------------------------------------------
// Connector
// ---------------------------------------------------------------------------

/// The server side of one accepted mock socket. Dropping it closes the
/// client's stream.
pub(crate) struct MockServer {
    pub url: String,
    to_client: mpsc::UnboundedSender<Result<String, RealtimeError>>,
    from_client: mpsc::UnboundedReceiver<String>,
}

impl MockServer {
    pub fn push(&self, frame: &str) {
        let _ = self.to_client.send(Ok(frame.to_string()));
    }

    /// Simulate a close frame or transport error without dropping the server.
    pub fn close_with(&self, error: RealtimeError) {
        let _ = self.to_client.send(Err(error));
    }

    pub fn push_json(&self, value: serde_json::Value) {
        self.push(&value.to_string());
    }

    /// Next frame the client sent, if one is already waiting.
    pub fn try_recv(&mut self) -> Option<serde_json::Value> {
        let text = self.from_client.try_recv().ok()?;
        serde_json::from_str(&text).ok()
    }

    pub async fn recv(&mut self) -> Option<serde_json::Value> {
        let text = self.from_client.recv().await?;
        serde_json::from_str(&text).ok()
    }
}

#[derive(Default)]
struct ConnectorState {
    attempts: Vec<(String, Instant)>,
    refuse: bool,
}

pub(crate) struct MockConnector {
    state: Mutex<ConnectorState>,
    servers_tx: mpsc::UnboundedSender<MockServer>,
    servers_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<MockServer>>,
}

impl MockConnector {
    pub fn new() -> Arc<Self> {
        let (servers_tx, servers_rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            state: Mutex::new(ConnectorState::default()),
            servers_tx,
            servers_rx: tokio::sync::Mutex::new(servers_rx),
        })
    }

    fn lock(&self) -> MutexGuard<'_, ConnectorState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Make subsequent connects fail.
    pub fn set_refuse(&self, refuse: bool) {
        self.lock().refuse = refuse;
    }

    pub fn attempts(&self) -> Vec<(String, Instant)> {
        self.lock().attempts.clone()
    }

    pub fn attempt_count(&self) -> usize {
        self.lock().attempts.len()
    }

    /// Wait for the next accepted socket.
    pub async fn accept(&self) -> MockServer {
        self.servers_rx
            .lock()
            .await
            .recv()
            .await
            .expect("connector dropped")
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, url: &str) -> Result<(FrameSink, FrameStream), RealtimeError> {
        {
            let mut state = self.lock();
            state.attempts.push((url.to_string(), Instant::now()));
            if state.refuse {
                return Err(RealtimeError::Connect("connection refused".into()));
            }
        }

        let (to_client, client_rx) = mpsc::unbounded_channel::<Result<String, RealtimeError>>();
        let (client_tx, from_client) = mpsc::unbounded_channel::<String>();

        let sink = futures_util::sink::unfold(client_tx, |tx, text: String| async move {
            tx.send(text).map_err(|_| RealtimeError::Closed)?;
            Ok::<_, RealtimeError>(tx)
        });
        let stream = futures_util::stream::unfold(client_rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });

        let _ = self.servers_tx.send(MockServer {
            url: url.to_string(),
            to_client,
            from_client,
        });
        Ok((Box::pin(sink), Box::pin(stream)))
    }
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

#[derive(Default)]
pub(crate) struct BackendState {
    pub me: Option<UserSummary>,
    pub unread_count: u64,
    pub notifications: Vec<NotificationItem>,
    pub fail_mark_notifications: bool,
    pub groups: Vec<ChatGroupSummary>,
    pub pages: HashMap<(GroupId, u32), MessagePage>,
    pub failing_pages: HashSet<(GroupId, u32)>,
    pub page_delay: Option<Duration>,
    pub live_map: LiveMapSnapshot,
    pub calls: Vec<String>,
}

#[derive(Default)]
pub(crate) struct MockBackend {
    state: Mutex<BackendState>,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut BackendState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        f(&mut state)
    }

    pub fn calls(&self) -> Vec<String> {
        self.with(|s| s.calls.clone())
    }

    pub fn count_calls(&self, name: &str) -> usize {
        self.with(|s| s.calls.iter().filter(|c| c.as_str() == name).count())
    }

    fn record(&self, call: String) {
        self.with(|s| s.calls.push(call));
    }
}

#[async_trait]
impl BackendApi for MockBackend {
    async fn me(&self) -> Result<UserSummary, ApiError> {
        self.record("me".into());
        self.with(|s| s.me.clone()).ok_or(ApiError::Unauthorized("no user".into()))
    }

    async fn unread_notification_count(&self) -> Result<u64, ApiError> {
        self.record("unread_notification_count".into());
        Ok(self.with(|s| s.unread_count))
    }

    async fn notifications(&self) -> Result<Vec<NotificationItem>, ApiError> {
        self.record("notifications".into());
        Ok(self.with(|s| s.notifications.clone()))
    }

    async fn mark_notifications_read(&self) -> Result<(), ApiError> {
        self.record("mark_notifications_read".into());
        self.with(|s| {
            if s.fail_mark_notifications {
                return Err(ApiError::Status {
                    status: 500,
                    message: "server error".into(),
                });
            }
            s.unread_count = 0;
            s.notifications.clear();
            Ok(())
        })
    }

    async fn chat_groups(&self) -> Result<Vec<ChatGroupSummary>, ApiError> {
        self.record("chat_groups".into());
        Ok(self.with(|s| s.groups.clone()))
    }

    async fn chat_group_detail(&self, group: GroupId) -> Result<ChatGroupDetail, ApiError> {
        self.record(format!("chat_group_detail:{group}"));
        let owner = user(1, "Owner");
        self.with(|s| s.groups.iter().find(|g| g.id == group).cloned())
            .map(|g| ChatGroupDetail {
                id: g.id,
                name: g.name,
                owner,
                image: None,
                members: Vec::new(),
                created_at: ts(0),
                is_active: true,
                only_owner_can_send: false,
            })
            .ok_or(ApiError::Status {
                status: 404,
                message: "Not found.".into(),
            })
    }

    async fn group_messages(&self, group: GroupId, page: u32) -> Result<MessagePage, ApiError> {
        self.record(format!("group_messages:{group}:{page}"));
        if let Some(delay) = self.with(|s| s.page_delay) {
            tokio::time::sleep(delay).await;
        }
        self.with(|s| {
            if s.failing_pages.contains(&(group, page)) {
                return Err(ApiError::Network("connection reset".into()));
            }
            s.pages.get(&(group, page)).cloned().ok_or(ApiError::Status {
                status: 404,
                message: "Invalid page.".into(),
            })
        })
    }

    async fn mark_group_read(&self, group: GroupId) -> Result<(), ApiError> {
        self.record(format!("mark_group_read:{group}"));
        self.with(|s| {
            if let Some(g) = s.groups.iter_mut().find(|g| g.id == group) {
                g.unread_count = 0;
            }
        });
        Ok(())
    }

    async fn live_map(&self) -> Result<LiveMapSnapshot, ApiError> {
        self.record("live_map".into());
        Ok(self.with(|s| s.live_map.clone()))
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub(crate) fn user(id: i64, first_name: &str) -> UserSummary {
    UserSummary {
        id: UserId(id),
        email: format!("user{id}@digitask.test"),
        first_name: first_name.into(),
        last_name: String::new(),
        avatar: None,
    }
}

pub(crate) fn notification(id: i64) -> NotificationItem {
    NotificationItem {
        id: NotificationId(id),
        title: format!("Task {id}"),
        message: "A task was assigned to you".into(),
        notification_type: NotificationType::TaskAssigned,
        created_at: ts(id),
        related_task: None,
    }
}

pub(crate) fn group(id: i64, name: &str, unread: u32) -> ChatGroupSummary {
    ChatGroupSummary {
        id: GroupId(id),
        name: name.into(),
        image: None,
        last_message: None,
        unread_count: unread,
    }
}

pub(crate) fn history(group: i64, id: i64, sender: i64) -> HistoryMessage {
    HistoryMessage {
        id: MessageId(id),
        group: GroupId(group),
        sender: user(sender, "Sender"),
        content: format!("message {id}"),
        created_at: ts(id),
        is_me: false,
    }
}

/// A page of history in backend order (newest first) for ids `ids`.
pub(crate) fn page(group: i64, ids: &[i64], has_next: bool) -> MessagePage {
    let mut results: Vec<HistoryMessage> = ids.iter().map(|&id| history(group, id, 2)).collect();
    results.sort_by(|a, b| b.id.cmp(&a.id));
    MessagePage {
        next: has_next.then(|| format!("http://backend.test/api/chat/messages/?group={group}")),
        results,
    }
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// Location provider driven by the test through an mpsc sender.
pub(crate) struct ChannelProvider {
    pending: Mutex<VecDeque<mpsc::Receiver<Result<PresenceSample, LocationError>>>>,
    pub options: Mutex<Option<WatchOptions>>,
}

impl ChannelProvider {
    pub fn new() -> (Self, mpsc::Sender<Result<PresenceSample, LocationError>>) {
        let (tx, rx) = mpsc::channel(16);
        let provider = Self {
            pending: Mutex::new(VecDeque::from([rx])),
            options: Mutex::new(None),
        };
        (provider, tx)
    }
}

impl LocationProvider for ChannelProvider {
    fn watch(&self, options: WatchOptions) -> mpsc::Receiver<Result<PresenceSample, LocationError>> {
        *self.options.lock().unwrap_or_else(|p| p.into_inner()) = Some(options);
        self.pending
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .pop_front()
            .unwrap_or_else(|| mpsc::channel(1).1)
    }
}

pub(crate) fn sample(latitude: f64, longitude: f64) -> PresenceSample {
    PresenceSample {
        latitude,
        longitude,
        captured_at: Utc::now(),
    }
}
