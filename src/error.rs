// src/error.rs

use thiserror::Error;

/// Errors raised while the session handles inbound traffic.
#[derive(Debug, Error)]
pub enum SessionError {
    /// An inbound frame was not a valid tagged record.
    #[error("malformed frame: {0}")]
    MalformedFrame(#[from] serde_json::Error),
    /// The session already owns a connection.
    #[error("connection already attached")]
    AlreadyAttached,
}

/// Why a chat message was not sent.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SendError {
    /// The receiver or message field was empty; the user has been alerted.
    #[error("receiver and message are required")]
    EmptyField,
    /// There is no open connection to send on.
    #[error("no open connection")]
    NotConnected,
}

/// Errors from the outbound half of the connection.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The writer side of the connection is gone.
    #[error("connection closed")]
    Closed,
    /// The action could not be encoded.
    #[error("encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors that end the client process.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
