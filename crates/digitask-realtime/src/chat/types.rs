use chrono::{DateTime, Utc};
use digitask_api::{HistoryMessage, LastMessage};
use digitask_common::{MessageId, UserId};

use crate::protocol::ChatInbound;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSender {
    pub id: UserId,
    pub display_name: String,
}

/// A displayed chat message, normalized from either a history page or a
/// live frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Absent on live frames from older servers.
    pub id: Option<MessageId>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub sender: MessageSender,
    pub is_mine: bool,
}

impl ChatMessage {
    pub fn from_history(message: HistoryMessage, me: Option<UserId>) -> Self {
        let is_mine = me.map_or(message.is_me, |me| message.sender.id == me);
        Self {
            id: Some(message.id),
            sender: MessageSender {
                id: message.sender.id,
                display_name: message.sender.display_name(),
            },
            content: message.content,
            created_at: message.created_at,
            is_mine,
        }
    }

    pub fn from_live(frame: ChatInbound, me: Option<UserId>) -> Self {
        Self {
            id: frame.id,
            is_mine: me == Some(frame.sender_id),
            sender: MessageSender {
                id: frame.sender_id,
                display_name: frame.sender,
            },
            content: frame.message,
            created_at: frame.created_at,
        }
    }

    pub(crate) fn to_last_message(&self) -> LastMessage {
        LastMessage {
            content: self.content.clone(),
            sender_name: self.sender.display_name.clone(),
            created_at: self.created_at,
        }
    }
}

/// Ascending list of a history page (which arrives newest first).
pub(crate) fn ascending(page: Vec<HistoryMessage>, me: Option<UserId>) -> Vec<ChatMessage> {
    page.into_iter()
        .rev()
        .map(|message| ChatMessage::from_history(message, me))
        .collect()
}

pub(crate) fn contains_id(messages: &[ChatMessage], id: Option<MessageId>) -> bool {
    id.is_some_and(|id| messages.iter().any(|m| m.id == Some(id)))
}
