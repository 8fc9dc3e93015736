//! Pluggable socket transport.

use std::pin::Pin;

use async_trait::async_trait;
use digitask_common::RealtimeError;
use futures_util::{future, Sink, SinkExt, Stream, StreamExt};
use tokio_tungstenite::tungstenite::Message as WsMessage;

/// Outbound half of a connected socket, carrying JSON text frames.
pub type FrameSink = Pin<Box<dyn Sink<String, Error = RealtimeError> + Send>>;

/// Inbound half of a connected socket. Ends (or yields `Closed`) when the
/// peer closes.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String, RealtimeError>> + Send>>;

/// Opens text-frame sockets. The production implementation is
/// [`TungsteniteConnector`]; tests use an in-memory one.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn connect(&self, url: &str) -> Result<(FrameSink, FrameStream), RealtimeError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteConnector;

#[async_trait]
impl Connector for TungsteniteConnector {
    async fn connect(&self, url: &str) -> Result<(FrameSink, FrameStream), RealtimeError> {
        let (ws_stream, _response) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| RealtimeError::Connect(e.to_string()))?;
        let (ws_write, ws_read) = ws_stream.split();

        let sink = ws_write
            .sink_map_err(|e| RealtimeError::Transport(e.to_string()))
            .with(|text: String| {
                future::ready(Ok::<_, RealtimeError>(WsMessage::Text(text.into())))
            });

        let stream = ws_read.filter_map(|msg| {
            future::ready(match msg {
                Ok(WsMessage::Text(text)) => Some(Ok(text.to_string())),
                Ok(WsMessage::Close(_)) => Some(Err(RealtimeError::Closed)),
                // Pings are answered by tungstenite itself.
                Ok(_) => None,
                Err(e) => Some(Err(RealtimeError::Transport(e.to_string()))),
            })
        });

        Ok((Box::pin(sink), Box::pin(stream)))
    }
}
