//! Reconciled changes published to session subscribers.

use digitask_api::NotificationItem;
use digitask_common::GroupId;

use crate::chat::ChatMessage;
use crate::connection::{ConnectionStatus, StreamKind};
use crate::protocol::{ChatNotification, LocationMessage};

#[derive(Debug, Clone, PartialEq)]
pub enum RealtimeUpdate {
    StreamStatus {
        stream: StreamKind,
        status: ConnectionStatus,
    },
    Notification(NotificationItem),
    UnreadCount(u64),
    ChatUnreadCount(u64),
    ChatNotification(ChatNotification),
    ChatMessage {
        group: GroupId,
        message: ChatMessage,
    },
    Location(LocationMessage),
}
