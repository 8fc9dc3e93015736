//! WebSocket connection manager.
//!
//! One background task per stream owns the socket and its retry timer.
//! The task is an explicit state machine:
//!
//! ```text
//! Idle -> Connecting -> Open -> RetryScheduled -> Connecting -> ...
//!            \______________________/
//!                     (connect failed)
//! any state -> Closed   (close(), handle dropped, or no token when a retry fires)
//! ```
//!
//! A dropped stream is retried after a fixed delay, and only if the shared
//! `AuthSession` still holds a token when the timer fires.

mod client;
mod driver;
mod transport;
mod types;

pub use client::{ConnectionHandle, ConnectionSender};
pub use transport::{Connector, FrameSink, FrameStream, TungsteniteConnector};
pub use types::{ConnectionSettings, ConnectionStatus, StreamEvent, StreamKind};
