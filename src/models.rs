// src/models.rs

use serde::{Deserialize, Deserializer, Serialize};

/// An action sent from this client to the chat server.
/// Serialized into JSON text, one record per frame.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")] // `action` selects the variant
pub enum ClientAction {
    /// The client is going away.
    Left,
    /// A chat message addressed to `receiver`.
    Broadcast { receiver: String, message: String },
}

impl ClientAction {
    /// Encodes the action as a single text frame.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// An event sent from the server to this client.
/// Deserialized from incoming JSON text.
///
/// The server writes every field of its response on every frame, so a
/// `broadcast` also carries `"connected_users": null` and a `list_users`
/// carries `"message": ""`. Fields a variant does not name are ignored.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Full snapshot of the connected users, in display order.
    ListUsers {
        #[serde(default, deserialize_with = "null_as_empty")]
        connected_users: Vec<String>,
    },
    /// A message to append to the transcript.
    Broadcast {
        #[serde(default)]
        message: String,
    },
    /// The server failed to handle one of our actions.
    Error {
        #[serde(default)]
        message: String,
    },
    /// Any other tag, including the empty tag of the connect greeting.
    #[serde(other)]
    Unknown,
}

impl ServerEvent {
    /// Decodes one inbound text frame.
    pub fn from_frame(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

// A nil slice on the server side arrives as `null`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
