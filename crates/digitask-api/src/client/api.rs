//! BackendApi trait implementation for HttpBackend.

use async_trait::async_trait;
use digitask_common::{ApiError, GroupId};
use serde_json::json;

use crate::models::{
    ChatGroupDetail, ChatGroupSummary, Listing, LiveMapSnapshot, MessagePage, NotificationItem,
    UnreadCountBody, UserSummary,
};
use crate::BackendApi;

use super::http::HttpBackend;

#[async_trait]
impl BackendApi for HttpBackend {
    async fn me(&self) -> Result<UserSummary, ApiError> {
        self.get_json("users/me/").await
    }

    async fn unread_notification_count(&self) -> Result<u64, ApiError> {
        let body: UnreadCountBody = self.get_json("notifications/unread_count/").await?;
        Ok(body.unread_count)
    }

    async fn notifications(&self) -> Result<Vec<NotificationItem>, ApiError> {
        let listing: Listing<NotificationItem> = self.get_json("notifications/").await?;
        Ok(listing.into_vec())
    }

    async fn mark_notifications_read(&self) -> Result<(), ApiError> {
        self.post_json("notifications/mark_read/", &json!({})).await
    }

    async fn chat_groups(&self) -> Result<Vec<ChatGroupSummary>, ApiError> {
        let listing: Listing<ChatGroupSummary> = self.get_json("chat/groups/").await?;
        Ok(listing.into_vec())
    }

    async fn chat_group_detail(&self, group: GroupId) -> Result<ChatGroupDetail, ApiError> {
        self.get_json(&format!("chat/groups/{group}/")).await
    }

    async fn group_messages(&self, group: GroupId, page: u32) -> Result<MessagePage, ApiError> {
        self.get_json(&format!("chat/messages/?group={group}&page={page}"))
            .await
    }

    async fn mark_group_read(&self, group: GroupId) -> Result<(), ApiError> {
        self.post_json("chat/messages/mark-read/", &json!({ "group_id": group }))
            .await
    }

    async fn live_map(&self) -> Result<LiveMapSnapshot, ApiError> {
        self.get_json("live-map/").await
    }
}
