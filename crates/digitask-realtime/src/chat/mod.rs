//! Chat stream reconciler.
//!
//! Keeps the open group's message list (history pages plus the live tail
//! from `/ws/chat/groups/{id}/`) and the cross-group summary list updated
//! from chat notifications.

mod reconciler;
mod types;

pub use reconciler::ChatReconciler;
pub use types::{ChatMessage, MessageSender};
