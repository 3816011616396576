// src/connection.rs

use crate::error::TransportError;
use futures_util::{Sink, SinkExt};
use tokio::{net::TcpStream, sync::mpsc, task::JoinHandle};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream,
    tungstenite::{Error as WsError, Message},
};

/// The client side of a websocket to the chat server.
pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Path the chat server serves its websocket on.
pub const WS_PATH: &str = "/ws";

/// Builds the websocket endpoint for a server `host` (`name` or `name:port`).
pub fn endpoint_for_host(host: &str) -> String {
    format!("ws://{host}{WS_PATH}")
}

/// Outbound half of a connection: accepts text frames, fire-and-forget.
pub trait FrameSink {
    fn send_text(&self, text: String) -> Result<(), TransportError>;
}

/// Queues frames for the writer task spawned by [`spawn_writer`].
#[derive(Clone, Debug)]
pub struct FrameSender {
    tx: mpsc::UnboundedSender<Message>,
}

impl FrameSink for FrameSender {
    fn send_text(&self, text: String) -> Result<(), TransportError> {
        self.tx
            .send(Message::text(text))
            .map_err(|_| TransportError::Closed)
    }
}

/// Spawns the task that owns the write half of the websocket.
///
/// The task ends when every [`FrameSender`] is dropped (sending a close frame)
/// or when a write fails; sends after that return [`TransportError::Closed`].
pub fn spawn_writer<S>(sink: S) -> (FrameSender, JoinHandle<()>)
where
    S: Sink<Message, Error = WsError> + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_frames(sink, rx));
    (FrameSender { tx }, writer)
}

async fn write_frames<S>(mut sink: S, mut rx: mpsc::UnboundedReceiver<Message>)
where
    S: Sink<Message, Error = WsError> + Unpin,
{
    while let Some(message) = rx.recv().await {
        if let Err(e) = sink.send(message).await {
            log::debug!("Failed to write frame, stopping writer: {}", e);
            return;
        }
    }
    if let Err(e) = sink.close().await {
        log::trace!("Close after last frame failed: {}", e);
    }
}

/// What one item read from the websocket means to a session.
#[derive(Debug)]
pub enum ConnectionEvent {
    /// A text frame to decode.
    Frame(String),
    /// The peer closed the connection, or the stream ended.
    Closed(Option<String>),
    /// The transport failed.
    Error(WsError),
}

/// Maps one read from the websocket stream. Control and binary frames map to `None`.
pub fn classify(item: Option<Result<Message, WsError>>) -> Option<ConnectionEvent> {
    match item {
        Some(Ok(Message::Text(text))) => Some(ConnectionEvent::Frame(text.as_str().to_owned())),
        Some(Ok(Message::Close(frame))) => Some(ConnectionEvent::Closed(
            frame.map(|f| f.reason.as_str().to_owned()),
        )),
        Some(Ok(other)) => {
            log::trace!("Ignoring non-text frame: {:?}", other);
            None
        }
        Some(Err(e)) => Some(ConnectionEvent::Error(e)),
        None => Some(ConnectionEvent::Closed(None)),
    }
}
