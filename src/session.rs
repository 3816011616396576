// src/session.rs

use crate::{
    connection::FrameSink,
    error::{SendError, SessionError, TransportError},
    models::{ClientAction, ServerEvent},
    state::{Composer, ConnectionState, SubmitTrigger},
    view::ChatView,
};
use std::fmt::Display;
use uuid::Uuid;

/// Text of the alert shown when a required field is empty.
pub const EMPTY_FIELDS_ALERT: &str = "fill out user and message fields";

/// Result of a submit intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Submission {
    pub outcome: Result<(), SendError>,
    /// True when the input field's own handling of the gesture must be skipped.
    pub suppress_default: bool,
}

/// Owns the connection to the chat server and everything that flows over it.
///
/// The session is driven by callbacks (`on_open`, `on_message`, `submit`, ...)
/// invoked one at a time by the event loop. It never blocks and never retries.
pub struct Session<V, S> {
    id: Uuid,
    state: ConnectionState,
    sink: Option<S>,
    view: V,
    composer: Composer,
}

impl<V: ChatView, S: FrameSink> Session<V, S> {
    pub fn new(view: V) -> Self {
        Self::with_composer(view, Composer::default())
    }

    pub fn with_composer(view: V, composer: Composer) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: ConnectionState::Uninitialized,
            sink: None,
            view,
            composer,
        }
    }

    /// A session that owns `sink` from the start, still waiting for `on_open`.
    pub fn with_connection(view: V, composer: Composer, sink: S) -> Self {
        Self {
            sink: Some(sink),
            ..Self::with_composer(view, composer)
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn composer_mut(&mut self) -> &mut Composer {
        &mut self.composer
    }

    /// Installs the connection object. A session holds at most one, ever.
    pub fn attach(&mut self, sink: S) -> Result<(), SessionError> {
        if self.sink.is_some() || self.state != ConnectionState::Uninitialized {
            return Err(SessionError::AlreadyAttached);
        }
        self.sink = Some(sink);
        Ok(())
    }

    pub fn on_open(&mut self) {
        if self.state == ConnectionState::Closed {
            log::warn!("[{}] Ignoring open on a closed connection", self.id);
            return;
        }
        self.state = self.state.opened();
        log::info!("[{}] Successfully connected", self.id);
    }

    pub fn on_close(&mut self, reason: Option<&str>) {
        self.state = self.state.closed();
        match reason {
            Some(reason) if !reason.is_empty() => {
                log::info!("[{}] Connection closed: {}", self.id, reason)
            }
            _ => log::info!("[{}] Connection closed", self.id),
        }
    }

    /// Logs a transport error. The connection is not repaired.
    pub fn on_error(&mut self, error: &dyn Display) {
        self.state = self.state.closed();
        log::error!("[{}] Error occurred: {}", self.id, error);
    }

    /// Decodes one inbound text frame and applies it to the view.
    pub fn on_message(&mut self, text: &str) -> Result<(), SessionError> {
        let event = ServerEvent::from_frame(text)?;
        self.dispatch(event);
        Ok(())
    }

    pub fn dispatch(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::ListUsers { connected_users } => {
                log::debug!("[{}] Action is list_users ({} users)", self.id, connected_users.len());
                self.view.replace_roster(&connected_users);
            }
            ServerEvent::Broadcast { message } => {
                log::debug!("[{}] Action is broadcast: {}", self.id, message);
                self.view.append_transcript(&format!("{}<br>", message));
            }
            ServerEvent::Error { message } => {
                log::warn!("[{}] Server reported an error: {}", self.id, message);
            }
            ServerEvent::Unknown => {
                log::debug!("[{}] Ignoring frame with unrecognized action", self.id);
            }
        }
    }

    /// Handles a submit gesture. Both triggers share the same checks.
    pub fn submit(&mut self, trigger: SubmitTrigger) -> Submission {
        Submission {
            outcome: self.send_message(),
            suppress_default: trigger.suppresses_default(),
        }
    }

    /// Sends the composed message to the receiver and clears the message field.
    ///
    /// Empty fields raise one alert. A missing or non-open connection aborts
    /// with a log line only, as does a transport failure; nothing is retried.
    pub fn send_message(&mut self) -> Result<(), SendError> {
        if self.composer.receiver.is_empty() || self.composer.message.is_empty() {
            self.view.alert(EMPTY_FIELDS_ALERT);
            return Err(SendError::EmptyField);
        }
        let sink = match &self.sink {
            Some(sink) if self.state.is_open() => sink,
            _ => {
                log::info!("[{}] No connection ({})", self.id, self.state);
                return Err(SendError::NotConnected);
            }
        };
        let action = ClientAction::Broadcast {
            receiver: self.composer.receiver.value().to_string(),
            message: self.composer.message.value().to_string(),
        };
        if let Err(e) = send_action(sink, &action) {
            log::warn!("[{}] Send failed, dropping message: {}", self.id, e);
            return Err(SendError::NotConnected);
        }
        self.composer.message.clear();
        Ok(())
    }

    /// Tears the session down: one best-effort `left`, then the connection is dropped.
    pub fn unload(mut self) -> V {
        log::info!("[{}] Leaving...", self.id);
        match &self.sink {
            Some(sink) => {
                if let Err(e) = send_action(sink, &ClientAction::Left) {
                    log::debug!("[{}] Could not send left: {}", self.id, e);
                }
            }
            None => log::debug!("[{}] Could not send left: no connection", self.id),
        }
        self.state = self.state.closed();
        self.sink = None;
        self.view
    }
}

fn send_action<S: FrameSink>(sink: &S, action: &ClientAction) -> Result<(), TransportError> {
    sink.send_text(action.to_frame()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::MemoryView;
    use pretty_assertions::assert_eq;
    use std::{cell::RefCell, rc::Rc};

    /// Records frames; fails every send once `closed` is set.
    #[derive(Clone, Default)]
    struct RecordingSink {
        frames: Rc<RefCell<Vec<String>>>,
        closed: Rc<RefCell<bool>>,
    }

    impl FrameSink for RecordingSink {
        fn send_text(&self, text: String) -> Result<(), TransportError> {
            if *self.closed.borrow() {
                return Err(TransportError::Closed);
            }
            self.frames.borrow_mut().push(text);
            Ok(())
        }
    }

    fn open_session() -> (Session<MemoryView, RecordingSink>, RecordingSink) {
        let sink = RecordingSink::default();
        let mut session = Session::new(MemoryView::default());
        session.attach(sink.clone()).unwrap();
        session.on_open();
        (session, sink)
    }

    fn roster(users: &[&str]) -> String {
        serde_json::json!({ "action": "list_users", "connected_users": users }).to_string()
    }

    #[test]
    fn roster_is_replaced_by_each_snapshot() {
        let (mut session, _) = open_session();
        session.on_message(&roster(&["amy", "bob"])).unwrap();
        session.on_message(&roster(&["zed", "amy", "zed"])).unwrap();
        assert_eq!(session.view().roster, vec!["zed", "amy", "zed"]);
        session.on_message(&roster(&[])).unwrap();
        assert!(session.view().roster.is_empty());
    }

    #[test]
    fn broadcasts_append_to_transcript() {
        let (mut session, _) = open_session();
        session
            .on_message(r#"{"action":"broadcast","message":"<strong>amy</strong>: hi"}"#)
            .unwrap();
        session.on_message(r#"{"action":"broadcast","message":"second"}"#).unwrap();
        assert_eq!(
            session.view().transcript,
            "<strong>amy</strong>: hi<br>second<br>"
        );
    }

    #[test]
    fn unknown_and_error_frames_leave_view_untouched() {
        let (mut session, _) = open_session();
        session.on_message(&roster(&["amy"])).unwrap();
        let before = session.view().clone();
        session
            .on_message(r#"{"action":"","message":"<em>Connected</em>","connected_users":null}"#)
            .unwrap();
        session.on_message(r#"{"action":"error","message":"db down"}"#).unwrap();
        session.on_message(r#"{"action":"typing"}"#).unwrap();
        assert_eq!(session.view(), &before);
    }

    #[test]
    fn malformed_frame_is_an_error_without_side_effects() {
        let (mut session, _) = open_session();
        assert!(matches!(
            session.on_message("{not json"),
            Err(SessionError::MalformedFrame(_))
        ));
        assert_eq!(session.view(), &MemoryView::default());
        assert!(session.state().is_open());
    }

    #[test]
    fn empty_fields_alert_once_and_send_nothing() {
        let (mut session, sink) = open_session();
        session.composer_mut().message.set("hi");
        assert_eq!(session.send_message(), Err(SendError::EmptyField));
        assert_eq!(session.view().alerts, vec![EMPTY_FIELDS_ALERT]);

        session.composer_mut().receiver.set("bob");
        session.composer_mut().message.clear();
        assert_eq!(session.send_message(), Err(SendError::EmptyField));
        assert_eq!(session.view().alerts.len(), 2);
        assert!(sink.frames.borrow().is_empty());
    }

    #[test]
    fn send_emits_one_broadcast_and_keeps_receiver() {
        let (mut session, sink) = open_session();
        session.composer_mut().receiver.set("bob");
        session.composer_mut().message.set("hi");
        assert_eq!(session.send_message(), Ok(()));
        assert_eq!(
            *sink.frames.borrow(),
            vec![r#"{"action":"broadcast","receiver":"bob","message":"hi"}"#.to_string()]
        );
        assert_eq!(session.composer().message.value(), "");
        assert_eq!(session.composer().receiver.value(), "bob");
    }

    #[test]
    fn both_triggers_share_checks_but_only_enter_suppresses() {
        let (mut session, sink) = open_session();
        let rejected = session.submit(SubmitTrigger::SendButton);
        assert_eq!(rejected.outcome, Err(SendError::EmptyField));
        assert!(!rejected.suppress_default);

        session.composer_mut().receiver.set("bob");
        session.composer_mut().message.set("one");
        let enter = session.submit(SubmitTrigger::EnterKey);
        assert_eq!(enter.outcome, Ok(()));
        assert!(enter.suppress_default);

        session.composer_mut().message.set("two");
        assert_eq!(session.submit(SubmitTrigger::SendButton).outcome, Ok(()));
        assert_eq!(sink.frames.borrow().len(), 2);
    }

    #[test]
    fn send_without_connection_aborts_silently() {
        let mut session: Session<MemoryView, RecordingSink> = Session::new(MemoryView::default());
        session.composer_mut().receiver.set("bob");
        session.composer_mut().message.set("hi");
        assert_eq!(session.send_message(), Err(SendError::NotConnected));
        assert!(session.view().alerts.is_empty());
        assert_eq!(session.composer().message.value(), "hi");
    }

    #[test]
    fn send_after_close_aborts_silently() {
        let (mut session, sink) = open_session();
        session.on_close(None);
        *sink.closed.borrow_mut() = true;
        session.composer_mut().receiver.set("bob");
        session.composer_mut().message.set("hi");
        assert_eq!(session.send_message(), Err(SendError::NotConnected));
        assert!(session.view().alerts.is_empty());
        assert!(sink.frames.borrow().is_empty());
    }

    #[test]
    fn transport_failure_while_open_is_converted() {
        let (mut session, sink) = open_session();
        *sink.closed.borrow_mut() = true;
        session.composer_mut().receiver.set("bob");
        session.composer_mut().message.set("hi");
        assert_eq!(session.send_message(), Err(SendError::NotConnected));
        assert_eq!(session.composer().message.value(), "hi");
    }

    #[test]
    fn error_collapses_to_closed_and_never_reopens() {
        let (mut session, _) = open_session();
        session.on_error(&"reset by peer");
        assert_eq!(session.state(), ConnectionState::Closed);
        session.on_open();
        assert_eq!(session.state(), ConnectionState::Closed);
    }

    #[test]
    fn session_built_with_connection_waits_for_open() {
        let sink = RecordingSink::default();
        let mut session =
            Session::with_connection(MemoryView::default(), Composer::default(), sink.clone());
        assert_eq!(session.state(), ConnectionState::Uninitialized);
        assert!(matches!(
            session.attach(RecordingSink::default()),
            Err(SessionError::AlreadyAttached)
        ));

        session.composer_mut().receiver.set("bob");
        session.composer_mut().message.set("hi");
        assert_eq!(session.send_message(), Err(SendError::NotConnected));
        session.on_open();
        assert_eq!(session.send_message(), Ok(()));
        assert_eq!(sink.frames.borrow().len(), 1);
    }

    #[test]
    fn second_attach_is_refused() {
        let (mut session, _) = open_session();
        assert!(matches!(
            session.attach(RecordingSink::default()),
            Err(SessionError::AlreadyAttached)
        ));
    }

    #[test]
    fn unload_sends_left_whatever_the_state() {
        let (session, sink) = open_session();
        session.unload();
        assert_eq!(*sink.frames.borrow(), vec![r#"{"action":"left"}"#.to_string()]);

        let (mut session, sink) = open_session();
        session.on_close(Some("bye"));
        session.unload();
        assert_eq!(*sink.frames.borrow(), vec![r#"{"action":"left"}"#.to_string()]);

        let session: Session<MemoryView, RecordingSink> = Session::new(MemoryView::default());
        assert_eq!(session.unload(), MemoryView::default());
    }
}
