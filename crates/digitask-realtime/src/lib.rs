pub mod chat;
pub mod connection;
pub mod dedup;
pub mod events;
pub mod live_map;
pub mod location;
pub mod notifications;
pub mod protocol;
pub mod session;

#[cfg(test)]
mod testing;

pub use chat::{ChatMessage, ChatReconciler, MessageSender};
pub use connection::{
    ConnectionHandle, ConnectionSender, ConnectionSettings, ConnectionStatus, Connector,
    StreamEvent, StreamKind, TungsteniteConnector,
};
pub use dedup::DedupWindow;
pub use events::RealtimeUpdate;
pub use live_map::LiveMap;
pub use location::{
    LocationError, LocationProvider, LocationPublisher, PresenceSample, WatchOptions,
};
pub use notifications::{LoadState, NotificationReconciler, NotificationSnapshot};
pub use protocol::{
    ChatInbound, ChatNotification, ChatOutbound, LocationMessage, NotificationInbound,
    TrackingInbound, TrackingOutbound,
};
pub use session::{RealtimeSession, SessionOptions};
