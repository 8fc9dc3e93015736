//! Composition root: one auth session, one backend, one connector, and the
//! reconcilers fed by the tracking and notification streams.

use std::sync::Arc;

use digitask_api::BackendApi;
use digitask_common::{AuthSession, NoticeBoard, RealtimeError};
use digitask_config::DigitaskConfig;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::chat::ChatReconciler;
use crate::connection::{
    ConnectionHandle, ConnectionSettings, ConnectionStatus, Connector, StreamEvent, StreamKind,
};
use crate::events::RealtimeUpdate;
use crate::live_map::LiveMap;
use crate::location::{LocationProvider, LocationPublisher, WatchOptions};
use crate::notifications::NotificationReconciler;
use crate::protocol::{NotificationInbound, TrackingInbound};

const UPDATE_CAPACITY: usize = 256;
const NOTICE_CAPACITY: usize = 16;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub connection: ConnectionSettings,
    pub dedup_window: usize,
    pub watch: WatchOptions,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            connection: ConnectionSettings::default(),
            dedup_window: 256,
            watch: WatchOptions::default(),
        }
    }
}

impl SessionOptions {
    pub fn from_config(config: &DigitaskConfig) -> Result<Self, RealtimeError> {
        Ok(Self {
            connection: ConnectionSettings::from_config(config)?,
            dedup_window: config.realtime.dedup_window,
            watch: WatchOptions::from(&config.location),
        })
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct RealtimeSession {
    auth: AuthSession,
    backend: Arc<dyn BackendApi>,
    connector: Arc<dyn Connector>,
    options: SessionOptions,
    notices: NoticeBoard,
    updates: broadcast::Sender<RealtimeUpdate>,
    notifications: NotificationReconciler,
    chat: ChatReconciler,
    live_map: LiveMap,
    tracking: Option<ConnectionHandle>,
    notification_stream: Option<ConnectionHandle>,
    publisher: Option<LocationPublisher>,
    tasks: Vec<JoinHandle<()>>,
}

impl RealtimeSession {
    pub fn new(
        auth: AuthSession,
        backend: Arc<dyn BackendApi>,
        connector: Arc<dyn Connector>,
        options: SessionOptions,
    ) -> Self {
        let notices = NoticeBoard::new(NOTICE_CAPACITY);
        let (updates, _) = broadcast::channel(UPDATE_CAPACITY);
        let notifications =
            NotificationReconciler::new(Arc::clone(&backend), notices.clone(), options.dedup_window);
        let chat = ChatReconciler::new(
            Arc::clone(&backend),
            auth.clone(),
            Arc::clone(&connector),
            options.connection.clone(),
            notices.clone(),
            updates.clone(),
        );
        let live_map = LiveMap::new(Arc::clone(&backend));
        Self {
            auth,
            backend,
            connector,
            options,
            notices,
            updates,
            notifications,
            chat,
            live_map,
            tracking: None,
            notification_stream: None,
            publisher: None,
            tasks: Vec::new(),
        }
    }

    pub fn auth(&self) -> &AuthSession {
        &self.auth
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn notifications(&self) -> &NotificationReconciler {
        &self.notifications
    }

    pub fn chat(&self) -> &ChatReconciler {
        &self.chat
    }

    pub fn live_map(&self) -> &LiveMap {
        &self.live_map
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeUpdate> {
        self.updates.subscribe()
    }

    pub fn tracking_status(&self) -> ConnectionStatus {
        self.tracking
            .as_ref()
            .map_or(ConnectionStatus::Closed, ConnectionHandle::status)
    }

    pub fn notification_status(&self) -> ConnectionStatus {
        self.notification_stream
            .as_ref()
            .map_or(ConnectionStatus::Closed, ConnectionHandle::status)
    }

    pub fn is_publishing_location(&self) -> bool {
        self.publisher
            .as_ref()
            .is_some_and(LocationPublisher::is_running)
    }

    /// Open the tracking and notification streams and load REST state.
    ///
    /// With a `provider`, device location is published on the tracking
    /// stream. REST failures here are logged; streams keep retrying.
    pub async fn start(
        &mut self,
        provider: Option<&dyn LocationProvider>,
    ) -> Result<(), RealtimeError> {
        if !self.auth.is_authenticated() {
            return Err(RealtimeError::NotAuthenticated);
        }
        if self.tracking.is_some() {
            debug!("Realtime session already started");
            return Ok(());
        }

        match self.backend.me().await {
            Ok(user) => {
                info!(user = %user.id, name = %user.display_name(), "Signed in");
                self.auth.set_user(user.to_current_user());
            }
            Err(e) => warn!(error = %e, "Could not resolve current user"),
        }

        let (tracking, tracking_events) = ConnectionHandle::connect::<TrackingInbound>(
            StreamKind::Tracking,
            &self.options.connection,
            &self.auth,
            Arc::clone(&self.connector),
        );
        self.tasks.push(tokio::spawn(route_tracking(
            tracking_events,
            self.live_map.clone(),
            self.updates.clone(),
        )));
        if let Some(provider) = provider {
            self.publisher = Some(LocationPublisher::start(
                provider,
                self.options.watch,
                tracking.sender(),
            ));
        }
        self.tracking = Some(tracking);

        let (notification_stream, notification_events) =
            ConnectionHandle::connect::<NotificationInbound>(
                StreamKind::Notifications,
                &self.options.connection,
                &self.auth,
                Arc::clone(&self.connector),
            );
        self.tasks.push(tokio::spawn(route_notifications(
            notification_events,
            self.notifications.clone(),
            self.chat.clone(),
            self.updates.clone(),
        )));
        self.notification_stream = Some(notification_stream);

        let _ = self.notifications.load().await;
        let _ = self.live_map.load().await;
        let _ = self.chat.refresh_groups().await;

        info!("Realtime session started");
        Ok(())
    }

    /// Stop the location watch, close every socket, and clear the token.
    pub async fn logout(&mut self) {
        self.close_streams();
        self.chat.clear().await;
        self.auth.logout();
        self.notifications.clear().await;
        self.live_map.clear().await;
        info!("Logged out");
    }

    fn close_streams(&mut self) {
        if let Some(mut publisher) = self.publisher.take() {
            publisher.stop();
        }
        if let Some(tracking) = self.tracking.take() {
            tracking.close();
        }
        if let Some(stream) = self.notification_stream.take() {
            stream.close();
        }
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for RealtimeSession {
    fn drop(&mut self) {
        self.close_streams();
    }
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

async fn route_tracking(
    mut events: mpsc::Receiver<StreamEvent<TrackingInbound>>,
    live_map: LiveMap,
    updates: broadcast::Sender<RealtimeUpdate>,
) {
    while let Some(event) = events.recv().await {
        match event {
            StreamEvent::Message(TrackingInbound::LocationMessage(message)) => {
                live_map.apply(&message).await;
                let _ = updates.send(RealtimeUpdate::Location(message));
            }
            other => {
                if matches!(other, StreamEvent::Opened) {
                    info!("Presence: online");
                } else if matches!(other, StreamEvent::Disconnected | StreamEvent::Closed) {
                    info!("Presence: offline");
                }
                if let Some(status) = other.status() {
                    let _ = updates.send(RealtimeUpdate::StreamStatus {
                        stream: StreamKind::Tracking,
                        status,
                    });
                }
            }
        }
    }
}

async fn route_notifications(
    mut events: mpsc::Receiver<StreamEvent<NotificationInbound>>,
    notifications: NotificationReconciler,
    chat: ChatReconciler,
    updates: broadcast::Sender<RealtimeUpdate>,
) {
    while let Some(event) = events.recv().await {
        match event {
            StreamEvent::Message(frame) => {
                let update = match &frame {
                    NotificationInbound::Notification { notification } => {
                        RealtimeUpdate::Notification(notification.clone())
                    }
                    NotificationInbound::Chat { chat_notification } => {
                        RealtimeUpdate::ChatNotification(chat_notification.clone())
                    }
                    NotificationInbound::UnreadCount { count, .. } => {
                        RealtimeUpdate::ChatUnreadCount(*count)
                    }
                };
                if let Some(chat_notification) = notifications.apply(frame).await {
                    chat.on_chat_notification(chat_notification).await;
                }
                let _ = updates.send(update);
                let _ = updates.send(RealtimeUpdate::UnreadCount(
                    notifications.unread_count().await,
                ));
            }
            other => {
                if matches!(other, StreamEvent::Opened) {
                    notifications.refetch_count().await;
                }
                if let Some(status) = other.status() {
                    let _ = updates.send(RealtimeUpdate::StreamStatus {
                        stream: StreamKind::Notifications,
                        status,
                    });
                }
            }
        }
    }
}
