//! REST side of the Digitask client.
//!
//! The realtime reconcilers only ever talk to the backend through the
//! [`BackendApi`] trait, so tests can swap in an in-memory fake. The
//! production implementation is [`HttpBackend`], a thin `reqwest` client
//! that authenticates with the bearer token held by an `AuthSession`.

pub mod client;
pub mod error_body;
pub mod models;

use async_trait::async_trait;
use digitask_common::{ApiError, GroupId};

pub use client::HttpBackend;
pub use models::{
    ActiveTask, ChatGroupDetail, ChatGroupSummary, GroupMember, HistoryMessage, LastMessage,
    Listing, LiveMapSnapshot, LiveMapUser, MessagePage, NotificationItem, NotificationType,
    UserSummary, Warehouse,
};

/// Every backend call the realtime client needs.
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// `GET users/me/`
    async fn me(&self) -> Result<UserSummary, ApiError>;

    /// `GET notifications/unread_count/`
    async fn unread_notification_count(&self) -> Result<u64, ApiError>;

    /// `GET notifications/`
    async fn notifications(&self) -> Result<Vec<NotificationItem>, ApiError>;

    /// `POST notifications/mark_read/`
    async fn mark_notifications_read(&self) -> Result<(), ApiError>;

    /// `GET chat/groups/`
    async fn chat_groups(&self) -> Result<Vec<ChatGroupSummary>, ApiError>;

    /// `GET chat/groups/{id}/`
    async fn chat_group_detail(&self, group: GroupId) -> Result<ChatGroupDetail, ApiError>;

    /// `GET chat/messages/?group={id}&page={n}`, newest first.
    async fn group_messages(&self, group: GroupId, page: u32) -> Result<MessagePage, ApiError>;

    /// `POST chat/messages/mark-read/`
    async fn mark_group_read(&self, group: GroupId) -> Result<(), ApiError>;

    /// `GET live-map/`
    async fn live_map(&self) -> Result<LiveMapSnapshot, ApiError>;
}
