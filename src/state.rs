// src/state.rs

use std::fmt;

/// Lifecycle of the one connection a session owns.
///
/// `Closed` is terminal: a closed connection never reopens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Uninitialized,
    Open,
    Closed,
}

impl ConnectionState {
    /// State after the handshake completes. A closed connection stays closed.
    pub fn opened(self) -> Self {
        match self {
            Self::Uninitialized | Self::Open => Self::Open,
            Self::Closed => Self::Closed,
        }
    }

    /// State after a close or an error. Both end the connection.
    pub fn closed(self) -> Self {
        Self::Closed
    }

    pub fn is_open(self) -> bool {
        self == Self::Open
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Open => "open",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// A single-line text input the user types into.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputField {
    value: String,
}

impl InputField {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

/// The two fields a chat message is composed from.
/// The message field is cleared after each send; the receiver field is kept.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Composer {
    pub receiver: InputField,
    pub message: InputField,
}

/// The user gesture behind a submit intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitTrigger {
    /// Enter pressed in the message field.
    EnterKey,
    /// The send control was clicked.
    SendButton,
}

impl SubmitTrigger {
    /// Whether the input field's own handling of the gesture is suppressed.
    pub fn suppresses_default(self) -> bool {
        matches!(self, Self::EnterKey)
    }
}
