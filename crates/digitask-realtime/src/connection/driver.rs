//! Background connection loop with fixed-delay reconnect.

use std::sync::Arc;

use digitask_common::{AuthSession, RealtimeError};
use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::transport::{Connector, FrameSink, FrameStream};
use super::types::{ConnectionSettings, ConnectionStatus, StreamEvent, StreamKind};

/// Everything the loop task owns.
pub(crate) struct LoopContext<M> {
    pub(crate) kind: StreamKind,
    pub(crate) settings: ConnectionSettings,
    pub(crate) auth: AuthSession,
    pub(crate) connector: Arc<dyn Connector>,
    pub(crate) status_tx: watch::Sender<ConnectionStatus>,
    pub(crate) event_tx: mpsc::Sender<StreamEvent<M>>,
    pub(crate) outbound_rx: mpsc::Receiver<String>,
    pub(crate) cancel: CancellationToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    /// Peer closed or the transport failed; schedule a retry.
    Dropped,
    /// `close()` was called or the handle went away.
    Cancelled,
}

// ---------------------------------------------------------------------------
// Connection Loop
// ---------------------------------------------------------------------------

pub(crate) async fn connection_loop<M>(mut ctx: LoopContext<M>)
where
    M: DeserializeOwned + Send + 'static,
{
    let kind = ctx.kind;
    let endpoint = kind.redacted_url(&ctx.settings.ws_base);

    loop {
        // Checked on the first attempt and every time a retry fires.
        let Some(token) = ctx.auth.token() else {
            info!(stream = %kind, "No auth token; not connecting");
            break;
        };

        ctx.status_tx.send_replace(ConnectionStatus::Connecting);
        info!(stream = %kind, url = %endpoint, "Connecting");

        let url = kind.url(&ctx.settings.ws_base, &token);
        let attempt = tokio::select! {
            _ = ctx.cancel.cancelled() => break,
            result = tokio::time::timeout(ctx.settings.connect_timeout, ctx.connector.connect(&url)) => result,
        };

        match attempt {
            Ok(Ok((sink, stream))) => {
                ctx.status_tx.send_replace(ConnectionStatus::Open);
                info!(stream = %kind, "Stream open");
                emit(&ctx, StreamEvent::Opened).await;

                let end = run_session(&mut ctx, sink, stream).await;
                if end == SessionEnd::Cancelled {
                    break;
                }
                emit(&ctx, StreamEvent::Disconnected).await;
            }
            Ok(Err(e)) => {
                warn!(stream = %kind, error = %e, "Connect failed");
            }
            Err(_elapsed) => {
                warn!(
                    stream = %kind,
                    timeout_ms = ctx.settings.connect_timeout.as_millis() as u64,
                    "Connect timed out"
                );
            }
        }

        // Fixed delay, one timer, owned by this task.
        let delay = ctx.settings.reconnect_delay;
        ctx.status_tx.send_replace(ConnectionStatus::RetryScheduled);
        info!(stream = %kind, delay_ms = delay.as_millis() as u64, "Reconnect scheduled");
        emit(&ctx, StreamEvent::RetryScheduled { delay }).await;

        tokio::select! {
            _ = ctx.cancel.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }

        // Sends are only accepted while open; anything left over is stale.
        while ctx.outbound_rx.try_recv().is_ok() {}
    }

    ctx.status_tx.send_replace(ConnectionStatus::Closed);
    let _ = ctx.event_tx.try_send(StreamEvent::Closed);
    info!(stream = %kind, "Stream closed");
}

async fn emit<M>(ctx: &LoopContext<M>, event: StreamEvent<M>) {
    tokio::select! {
        _ = ctx.cancel.cancelled() => {}
        _ = ctx.event_tx.send(event) => {}
    }
}

// ---------------------------------------------------------------------------
// Open Session
// ---------------------------------------------------------------------------

async fn run_session<M>(
    ctx: &mut LoopContext<M>,
    mut sink: FrameSink,
    mut stream: FrameStream,
) -> SessionEnd
where
    M: DeserializeOwned + Send + 'static,
{
    let kind = ctx.kind;
    loop {
        tokio::select! {
            _ = ctx.cancel.cancelled() => {
                let _ = sink.close().await;
                return SessionEnd::Cancelled;
            }
            outbound = ctx.outbound_rx.recv() => match outbound {
                Some(text) => {
                    if let Err(e) = sink.send(text).await {
                        warn!(stream = %kind, error = %e, "Send failed");
                        return SessionEnd::Dropped;
                    }
                }
                None => {
                    let _ = sink.close().await;
                    return SessionEnd::Cancelled;
                }
            },
            frame = stream.next() => match frame {
                Some(Ok(text)) => match serde_json::from_str::<M>(&text) {
                    Ok(message) => {
                        tokio::select! {
                            _ = ctx.cancel.cancelled() => {
                                let _ = sink.close().await;
                                return SessionEnd::Cancelled;
                            }
                            result = ctx.event_tx.send(StreamEvent::Message(message)) => {
                                if result.is_err() {
                                    debug!(stream = %kind, "Event receiver gone; dropping frame");
                                }
                            }
                        }
                    }
                    Err(e) => {
                        warn!(stream = %kind, error = %e, "Dropping malformed frame");
                    }
                },
                Some(Err(RealtimeError::Closed)) | None => {
                    info!(stream = %kind, "Stream closed by server");
                    return SessionEnd::Dropped;
                }
                Some(Err(e)) => {
                    warn!(stream = %kind, error = %e, "Stream error");
                    return SessionEnd::Dropped;
                }
            },
        }
    }
}
