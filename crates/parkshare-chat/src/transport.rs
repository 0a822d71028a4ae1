//! Transport seam: how the manager obtains a socket for one booking.
//!
//! The manager only sees a [`Connection`]: a sink of outbound text frames
//! and a stream of inbound frames. [`TungsteniteConnector`] provides the
//! real WebSocket; tests plug in an in-memory connector.

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::{future, Sink, SinkExt, Stream, StreamExt};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::debug;
use url::Url;

use crate::error::ChatError;

/// Close code and reason sent by the peer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CloseInfo {
    pub code: u16,
    pub reason: String,
}

/// One inbound unit from the socket, with control frames already filtered out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundFrame {
    Text(String),
    Binary(Vec<u8>),
    Close(Option<CloseInfo>),
}

pub type FrameSink = Pin<Box<dyn Sink<String, Error = ChatError> + Send>>;
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<InboundFrame, ChatError>> + Send>>;

/// An established socket, split into its write and read halves.
pub struct Connection {
    pub sink: FrameSink,
    pub stream: FrameStream,
}

/// Opens the socket for a fully-built chat URL (token included).
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &Url) -> Result<Connection, ChatError>;
}

/// WebSocket connector backed by `tokio-tungstenite` (ws:// and wss://).
#[derive(Debug, Default, Clone, Copy)]
pub struct TungsteniteConnector;

#[async_trait]
impl Connector for TungsteniteConnector {
    async fn connect(&self, url: &Url) -> Result<Connection, ChatError> {
        let (ws_stream, response) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| ChatError::Transport(format!("handshake failed: {e}")))?;
        debug!(status = %response.status(), "chat websocket handshake complete");

        let (write, read) = ws_stream.split();

        let sink = write
            .with(|text: String| {
                future::ready(Ok::<_, tokio_tungstenite::tungstenite::Error>(WsMessage::text(text)))
            })
            .sink_map_err(|e| ChatError::Transport(e.to_string()));

        let stream = read.filter_map(|item| future::ready(map_ws_message(item)));

        Ok(Connection {
            sink: Box::pin(sink),
            stream: Box::pin(stream),
        })
    }
}

/// Translate a tungstenite read result; `None` for ping/pong and raw frames.
fn map_ws_message(
    item: Result<WsMessage, tokio_tungstenite::tungstenite::Error>,
) -> Option<Result<InboundFrame, ChatError>> {
    match item {
        Ok(WsMessage::Text(text)) => Some(Ok(InboundFrame::Text(text.to_string()))),
        Ok(WsMessage::Binary(data)) => Some(Ok(InboundFrame::Binary(data.to_vec()))),
        Ok(WsMessage::Close(frame)) => Some(Ok(InboundFrame::Close(frame.map(|f| CloseInfo {
            code: u16::from(f.code),
            reason: f.reason.to_string(),
        })))),
        Ok(_) => None,
        Err(e) => Some(Err(ChatError::Transport(e.to_string()))),
    }
}
