// src/config.rs

use crate::connection::endpoint_for_host;
use clap::Parser;
use std::time::Duration;

/// Command-line chat client for a single chat server connection.
#[derive(Parser, Debug, Clone)]
#[command(name = "chat-client", version, about)]
pub struct ClientConfig {
    /// Server host, optionally with a port. The client connects to ws://<host>/ws.
    #[arg(long, env = "CHAT_HOST", default_value = "localhost:8080")]
    pub host: String,

    /// Pre-fills the receiver field.
    #[arg(long, env = "CHAT_RECEIVER")]
    pub receiver: Option<String>,

    /// How long to wait for the final `left` frame to flush on exit.
    #[arg(long, default_value_t = 250)]
    pub unload_grace_ms: u64,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            receiver: None,
            unload_grace_ms: 250,
        }
    }

    pub fn endpoint(&self) -> String {
        endpoint_for_host(&self.host)
    }

    pub fn unload_grace(&self) -> Duration {
        Duration::from_millis(self.unload_grace_ms)
    }
}
