//! Public handle for one managed stream.

use std::sync::Arc;

use digitask_common::{AuthSession, RealtimeError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::driver::{connection_loop, LoopContext};
use super::transport::Connector;
use super::types::{ConnectionSettings, ConnectionStatus, StreamEvent, StreamKind};

// ---------------------------------------------------------------------------
// Sender
// ---------------------------------------------------------------------------

/// Cheap clone of a handle's send side, for collaborators such as the
/// location publisher. Does not keep the connection alive.
#[derive(Debug, Clone)]
pub struct ConnectionSender {
    kind: StreamKind,
    status: watch::Receiver<ConnectionStatus>,
    outbound: mpsc::Sender<String>,
    cancel: CancellationToken,
}

impl ConnectionSender {
    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    pub fn status(&self) -> ConnectionStatus {
        if self.cancel.is_cancelled() {
            ConnectionStatus::Closed
        } else {
            *self.status.borrow()
        }
    }

    pub fn is_open(&self) -> bool {
        self.status().is_open()
    }

    /// Serialize `payload` and hand it to the socket. Fails with
    /// `NotConnected` unless the stream is open; nothing is queued.
    pub fn send_json<T: Serialize + ?Sized>(&self, payload: &T) -> Result<(), RealtimeError> {
        if !self.is_open() {
            return Err(RealtimeError::NotConnected);
        }
        let text =
            serde_json::to_string(payload).map_err(|e| RealtimeError::Encode(e.to_string()))?;
        self.outbound
            .try_send(text)
            .map_err(|_| RealtimeError::NotConnected)
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Owns one stream's background task. Closing or dropping the handle
/// closes the socket and cancels any pending reconnect.
#[derive(Debug)]
pub struct ConnectionHandle {
    sender: ConnectionSender,
}

impl ConnectionHandle {
    /// Start managing `kind`. Returns the handle and the stream's events.
    ///
    /// Without a token nothing is spawned: the handle starts `Closed` and
    /// the receiver yields a single `Closed` event.
    pub fn connect<M>(
        kind: StreamKind,
        settings: &ConnectionSettings,
        auth: &AuthSession,
        connector: Arc<dyn Connector>,
    ) -> (Self, mpsc::Receiver<StreamEvent<M>>)
    where
        M: DeserializeOwned + Send + 'static,
    {
        let buffer = settings.event_buffer.max(1);
        let (event_tx, event_rx) = mpsc::channel(buffer);
        let (outbound_tx, outbound_rx) = mpsc::channel(buffer);
        let cancel = CancellationToken::new();

        if !auth.is_authenticated() {
            info!(stream = %kind, "No auth token; stream not opened");
            let (_status_tx, status_rx) = watch::channel(ConnectionStatus::Closed);
            let _ = event_tx.try_send(StreamEvent::Closed);
            cancel.cancel();
            let handle = Self {
                sender: ConnectionSender {
                    kind,
                    status: status_rx,
                    outbound: outbound_tx,
                    cancel,
                },
            };
            return (handle, event_rx);
        }

        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Idle);
        let ctx = LoopContext {
            kind,
            settings: settings.clone(),
            auth: auth.clone(),
            connector,
            status_tx,
            event_tx,
            outbound_rx,
            cancel: cancel.clone(),
        };
        tokio::spawn(connection_loop(ctx));

        let handle = Self {
            sender: ConnectionSender {
                kind,
                status: status_rx,
                outbound: outbound_tx,
                cancel,
            },
        };
        (handle, event_rx)
    }

    pub fn kind(&self) -> StreamKind {
        self.sender.kind
    }

    pub fn status(&self) -> ConnectionStatus {
        self.sender.status()
    }

    pub fn is_open(&self) -> bool {
        self.sender.is_open()
    }

    /// Watch the raw status published by the background task.
    pub fn subscribe_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.sender.status.clone()
    }

    pub fn sender(&self) -> ConnectionSender {
        self.sender.clone()
    }

    pub fn send_json<T: Serialize + ?Sized>(&self, payload: &T) -> Result<(), RealtimeError> {
        self.sender.send_json(payload)
    }

    /// Close the socket and cancel any pending reconnect. Idempotent.
    pub fn close(&self) {
        if self.sender.cancel.is_cancelled() {
            return;
        }
        debug!(stream = %self.sender.kind, "Closing stream");
        self.sender.cancel.cancel();
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        self.close();
    }
}
