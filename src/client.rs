// src/client.rs

use crate::{
    config::ClientConfig,
    connection::{ConnectionEvent, FrameSender, WsStream, classify, spawn_writer},
    session::Session,
    state::{Composer, SubmitTrigger},
    view::ChatView,
};
use futures_util::stream::{SplitStream, StreamExt};
use std::time::Duration;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, Message},
};

/// Something the user did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserIntent {
    SetReceiver(String),
    SetMessage(String),
    Submit(SubmitTrigger),
    /// The user is leaving; the session is torn down.
    Unload,
}

/// A session wired to a live websocket.
pub struct ChatClient<V: ChatView> {
    session: Session<V, FrameSender>,
    inbound: Option<SplitStream<WsStream>>,
    writer: Option<JoinHandle<()>>,
    unload_grace: Duration,
}

impl<V: ChatView> ChatClient<V> {
    /// Opens the one connection this client will ever have.
    ///
    /// A failed handshake is logged and leaves the session closed; the client
    /// still runs so that sends abort the usual way.
    pub async fn initialize(config: &ClientConfig, view: V) -> Self {
        let mut composer = Composer::default();
        if let Some(receiver) = &config.receiver {
            composer.receiver.set(receiver.as_str());
        }
        let endpoint = config.endpoint();
        log::debug!("Connecting to websocket '{}'...", endpoint);

        let (session, inbound, writer) = match connect_async(endpoint.as_str()).await {
            Ok((ws_stream, _)) => {
                let (write, read) = ws_stream.split();
                let (sender, writer) = spawn_writer(write);
                let mut session = Session::with_connection(view, composer, sender);
                session.on_open();
                (session, Some(read), Some(writer))
            }
            Err(e) => {
                let mut session = Session::with_composer(view, composer);
                session.on_error(&e);
                (session, None, None)
            }
        };

        Self {
            session,
            inbound,
            writer,
            unload_grace: config.unload_grace(),
        }
    }

    pub fn session(&self) -> &Session<V, FrameSender> {
        &self.session
    }

    /// Processes inbound frames and user intents one at a time until the user
    /// unloads (or the intent channel closes), then tears down and returns the view.
    pub async fn run(mut self, mut intents: mpsc::UnboundedReceiver<UserIntent>) -> V {
        loop {
            tokio::select! {
                item = next_frame(&mut self.inbound) => self.handle_connection(item),
                intent = intents.recv() => match intent {
                    Some(UserIntent::Unload) | None => break,
                    Some(intent) => self.apply(intent),
                },
            }
        }
        self.shutdown().await
    }

    fn handle_connection(&mut self, item: Option<Result<Message, WsError>>) {
        match classify(item) {
            Some(ConnectionEvent::Frame(text)) => {
                if let Err(e) = self.session.on_message(&text) {
                    log::error!("[{}] Dropping inbound frame: {}", self.session.id(), e);
                }
            }
            Some(ConnectionEvent::Closed(reason)) => {
                self.session.on_close(reason.as_deref());
                self.inbound = None;
            }
            Some(ConnectionEvent::Error(e)) => {
                self.session.on_error(&e);
                self.inbound = None;
            }
            None => {}
        }
    }

    fn apply(&mut self, intent: UserIntent) {
        match intent {
            UserIntent::SetReceiver(value) => self.session.composer_mut().receiver.set(value),
            UserIntent::SetMessage(value) => self.session.composer_mut().message.set(value),
            UserIntent::Submit(trigger) => {
                let submission = self.session.submit(trigger);
                log::trace!(
                    "[{}] Submit via {:?}: {:?} (suppress default: {})",
                    self.session.id(),
                    trigger,
                    submission.outcome,
                    submission.suppress_default
                );
            }
            UserIntent::Unload => {}
        }
    }

    async fn shutdown(self) -> V {
        let Self {
            session,
            writer,
            unload_grace,
            ..
        } = self;
        let view = session.unload();
        // The writer flushes `left` and closes once the last sender is gone.
        if let Some(writer) = writer {
            if tokio::time::timeout(unload_grace, writer).await.is_err() {
                log::debug!("Writer still busy after {:?}, abandoning it", unload_grace);
            }
        }
        view
    }
}

async fn next_frame(inbound: &mut Option<SplitStream<WsStream>>) -> Option<Result<Message, WsError>> {
    match inbound {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}
