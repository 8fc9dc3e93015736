//! Response bodies of the REST endpoints the realtime client reads.

use chrono::{DateTime, Utc};
use digitask_common::{
    CurrentUser, GroupId, MessageId, NotificationId, TaskId, UserId, WarehouseId,
};
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

/// A list endpoint body: either a plain array or a paginated envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Plain(Vec<T>),
    Paginated { results: Vec<T> },
}

impl<T> Listing<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Paginated { results } => results,
            Listing::Plain(items) => items,
        }
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl UserSummary {
    /// Full name, falling back to the email when both name parts are blank.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }

    pub fn to_current_user(&self) -> CurrentUser {
        CurrentUser {
            id: self.id,
            display_name: self.display_name(),
        }
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// Kind of a task notification. Anything the client does not know becomes
/// [`NotificationType::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NotificationType {
    TaskCreated,
    TaskAssigned,
    TaskCompleted,
    Other,
}

impl From<String> for NotificationType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "task_created" => NotificationType::TaskCreated,
            "task_assigned" => NotificationType::TaskAssigned,
            "task_completed" => NotificationType::TaskCompleted,
            _ => NotificationType::Other,
        }
    }
}

impl From<NotificationType> for String {
    fn from(value: NotificationType) -> Self {
        value.as_str().to_string()
    }
}

impl NotificationType {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationType::TaskCreated => "task_created",
            NotificationType::TaskAssigned => "task_assigned",
            NotificationType::TaskCompleted => "task_completed",
            NotificationType::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationItem {
    pub id: NotificationId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    pub notification_type: NotificationType,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub related_task: Option<TaskId>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UnreadCountBody {
    pub unread_count: u64,
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastMessage {
    pub content: String,
    #[serde(rename = "sender")]
    pub sender_name: String,
    pub created_at: DateTime<Utc>,
}

/// One row of the chat group list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatGroupSummary {
    pub id: GroupId,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub last_message: Option<LastMessage>,
    #[serde(default)]
    pub unread_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMember {
    pub id: i64,
    pub user: UserSummary,
    pub joined_at: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub can_send_messages: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatGroupDetail {
    pub id: GroupId,
    pub name: String,
    pub owner: UserSummary,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub members: Vec<GroupMember>,
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub only_owner_can_send: bool,
}

/// A stored chat message as returned by the history endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub id: MessageId,
    pub group: GroupId,
    pub sender: UserSummary,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_me: bool,
}

/// One page of history, newest message first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePage {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub results: Vec<HistoryMessage>,
}

impl MessagePage {
    pub fn has_next(&self) -> bool {
        self.next.as_deref().is_some_and(|n| !n.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Live map
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveTask {
    pub id: TaskId,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub customer_lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub customer_lng: Option<f64>,
    #[serde(default)]
    pub customer_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveMapUser {
    pub user_id: UserId,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(default)]
    pub active_tasks: Vec<ActiveTask>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: WarehouseId,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub lng: Option<f64>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveMapSnapshot {
    #[serde(default)]
    pub users: Vec<LiveMapUser>,
    #[serde(default)]
    pub warehouses: Vec<Warehouse>,
}

fn default_true() -> bool {
    true
}

/// Coordinates come back as JSON numbers, decimal strings, or null.
fn lenient_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().parse::<f64>().ok(),
        None => None,
    })
}
