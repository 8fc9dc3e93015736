//! Stream kinds, connection status, settings, and per-stream events.

use std::fmt;
use std::time::Duration;

use digitask_common::{GroupId, RealtimeError};
use digitask_config::DigitaskConfig;

// ---------------------------------------------------------------------------
// Stream Kind
// ---------------------------------------------------------------------------

/// The logical WebSocket channels the backend exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Tracking,
    Notifications,
    ChatGroup(GroupId),
}

impl StreamKind {
    pub fn path(&self) -> String {
        match self {
            StreamKind::Tracking => "/ws/tracking/".to_string(),
            StreamKind::Notifications => "/ws/notifications/".to_string(),
            StreamKind::ChatGroup(id) => format!("/ws/chat/groups/{id}/"),
        }
    }

    /// Full endpoint including the `?token=` query parameter.
    pub(crate) fn url(&self, ws_base: &str, token: &str) -> String {
        format!("{}?token={token}", self.redacted_url(ws_base))
    }

    /// Endpoint without the query string; safe to log.
    pub fn redacted_url(&self, ws_base: &str) -> String {
        format!("{}{}", ws_base.trim_end_matches('/'), self.path())
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Tracking => write!(f, "tracking"),
            StreamKind::Notifications => write!(f, "notifications"),
            StreamKind::ChatGroup(id) => write!(f, "chat_group:{id}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Idle,
    Connecting,
    Open,
    RetryScheduled,
    Closed,
}

impl ConnectionStatus {
    pub fn is_open(self) -> bool {
        self == ConnectionStatus::Open
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    /// `ws://host[:port]` or `wss://host[:port]`, no trailing slash required.
    pub ws_base: String,
    pub reconnect_delay: Duration,
    pub connect_timeout: Duration,
    pub event_buffer: usize,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            ws_base: "ws://127.0.0.1:8000".into(),
            reconnect_delay: Duration::from_millis(5000),
            connect_timeout: Duration::from_secs(15),
            event_buffer: 256,
        }
    }
}

impl ConnectionSettings {
    pub fn from_config(config: &DigitaskConfig) -> Result<Self, RealtimeError> {
        let ws_base = config.server.resolved_ws_base().ok_or_else(|| {
            RealtimeError::Connect(
                "no usable WebSocket base: set server.ws_base_url or a valid api_base_url".into(),
            )
        })?;
        Ok(Self {
            ws_base,
            reconnect_delay: config.realtime.reconnect_delay(),
            connect_timeout: config.realtime.connect_timeout(),
            event_buffer: config.realtime.event_buffer.max(1),
        })
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// What a stream's consumer observes, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent<M> {
    Opened,
    Message(M),
    /// The socket dropped; a retry is about to be scheduled.
    Disconnected,
    RetryScheduled {
        delay: Duration,
    },
    /// Terminal: no further events follow.
    Closed,
}

impl<M> StreamEvent<M> {
    /// The connection status this event announces, if any.
    pub fn status(&self) -> Option<ConnectionStatus> {
        match self {
            StreamEvent::Opened => Some(ConnectionStatus::Open),
            StreamEvent::RetryScheduled { .. } => Some(ConnectionStatus::RetryScheduled),
            StreamEvent::Closed => Some(ConnectionStatus::Closed),
            StreamEvent::Message(_) | StreamEvent::Disconnected => None,
        }
    }
}
