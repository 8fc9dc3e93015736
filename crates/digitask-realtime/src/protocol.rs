//! Wire frames for the three WebSocket streams.
//!
//! Inbound frames are closed enums decoded with serde; anything that does
//! not match is rejected by the decoder and dropped by the connection loop.

use chrono::{DateTime, Utc};
use digitask_api::NotificationItem;
use digitask_common::{GroupId, MessageId, UserId};
use serde::{Deserialize, Serialize};

use crate::location::PresenceSample;

// ---------------------------------------------------------------------------
// Tracking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrackingOutbound {
    LocationUpdate { latitude: f64, longitude: f64 },
}

impl From<&PresenceSample> for TrackingOutbound {
    fn from(sample: &PresenceSample) -> Self {
        TrackingOutbound::LocationUpdate {
            latitude: sample.latitude,
            longitude: sample.longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrackingInbound {
    LocationMessage(LocationMessage),
}

/// Another user's position, broadcast to everyone on the tracking stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationMessage {
    pub user_id: UserId,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "online")]
    pub is_online: bool,
}

fn online() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// A chat message pushed to every group member except the sender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatNotification {
    pub group_id: GroupId,
    pub message_content: String,
    pub sender_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum UnreadCountTag {
    #[serde(rename = "unread_count")]
    UnreadCount,
}

/// Frames on `/ws/notifications/`. Distinguished by shape: the backend
/// tags both pushes `notification_message` and varies the payload key.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NotificationInbound {
    Notification {
        notification: NotificationItem,
    },
    Chat {
        chat_notification: ChatNotification,
    },
    UnreadCount {
        #[serde(rename = "type")]
        tag: UnreadCountTag,
        count: u64,
    },
}

// ---------------------------------------------------------------------------
// Chat group
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatOutbound {
    pub message: String,
}

/// A live message on `/ws/chat/groups/{id}/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatInbound {
    #[serde(default)]
    pub id: Option<MessageId>,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub sender_id: UserId,
    /// Sender's display name.
    #[serde(default)]
    pub sender: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use digitask_api::NotificationType;
    use digitask_common::NotificationId;
    use serde_json::json;

    #[test]
    fn location_update_wire_shape() {
        let frame = TrackingOutbound::LocationUpdate {
            latitude: 40.4093,
            longitude: 49.8671,
        };
        assert_eq!(
            serde_json::to_value(&frame).unwrap(),
            json!({"type": "location_update", "latitude": 40.4093, "longitude": 49.8671})
        );
    }

    #[test]
    fn location_message_decodes() {
        let frame: TrackingInbound = serde_json::from_value(json!({
            "type": "location_message", "user_id": 4,
            "latitude": 40.1, "longitude": 49.2, "is_online": true
        }))
        .unwrap();
        let TrackingInbound::LocationMessage(msg) = frame;
        assert_eq!(msg.user_id, UserId(4));
        assert!(msg.is_online);
    }

    #[test]
    fn unknown_tracking_type_is_rejected() {
        let result = serde_json::from_value::<TrackingInbound>(json!({
            "type": "something_else", "user_id": 4
        }));
        assert!(result.is_err());
    }

    #[test]
    fn task_notification_decodes() {
        let frame: NotificationInbound = serde_json::from_value(json!({
            "type": "notification_message",
            "notification": {
                "id": 11, "title": "Task assigned", "message": "Install router",
                "notification_type": "task_assigned",
                "created_at": "2024-05-01T10:00:00+00:00", "related_task": 5
            }
        }))
        .unwrap();
        match frame {
            NotificationInbound::Notification { notification } => {
                assert_eq!(notification.id, NotificationId(11));
                assert_eq!(notification.notification_type, NotificationType::TaskAssigned);
            }
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn chat_notification_decodes() {
        let frame: NotificationInbound = serde_json::from_value(json!({
            "type": "notification_message",
            "chat_notification": {
                "group_id": 2, "message_content": "hello", "sender_name": "Rauf",
                "created_at": "2024-05-01T10:00:00.512000+00:00"
            }
        }))
        .unwrap();
        assert!(matches!(
            frame,
            NotificationInbound::Chat { ref chat_notification } if chat_notification.group_id == GroupId(2)
        ));
    }

    #[test]
    fn unread_count_decodes() {
        let frame: NotificationInbound =
            serde_json::from_value(json!({"type": "unread_count", "count": 3})).unwrap();
        assert!(matches!(frame, NotificationInbound::UnreadCount { count: 3, .. }));
    }

    #[test]
    fn unrelated_notification_frame_is_rejected() {
        assert!(serde_json::from_value::<NotificationInbound>(json!({"type": "other"})).is_err());
        assert!(
            serde_json::from_value::<NotificationInbound>(json!({"type": "unread_count"})).is_err()
        );
    }

    #[test]
    fn chat_frame_decodes_with_and_without_id() {
        let frame: ChatInbound = serde_json::from_value(json!({
            "id": 99, "message": "on site", "created_at": "2024-05-01T10:00:00+00:00",
            "sender_id": 7, "sender": "Aysel M"
        }))
        .unwrap();
        assert_eq!(frame.id, Some(MessageId(99)));

        let frame: ChatInbound = serde_json::from_value(json!({
            "message": "no id", "created_at": "2024-05-01T10:00:00+00:00", "sender_id": 7
        }))
        .unwrap();
        assert_eq!(frame.id, None);
        assert_eq!(frame.sender, "");
    }

    #[test]
    fn chat_outbound_wire_shape() {
        let frame = ChatOutbound {
            message: "hello".into(),
        };
        assert_eq!(serde_json::to_string(&frame).unwrap(), r#"{"message":"hello"}"#);
    }
}
