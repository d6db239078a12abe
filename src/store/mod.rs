//! Single source of truth for one courtroom session.
//!
//! State lives in immutable [`TrialState`] snapshots. Every change is one
//! [`Action`] applied by the pure [`reduce`] function, so consumers never see a
//! half-applied transition.

pub mod action;
pub mod reducer;
pub mod state;

use std::sync::Arc;

use serde_json::Value;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

pub use action::{Action, LogLine, NodeProgress, SessionIds};
pub use reducer::reduce;
pub use state::{
    ActiveNode, InterruptState, Message, MessageId, Role, TrialPhase, TrialState,
    BOOTSTRAP_MESSAGE, BOOTSTRAP_MESSAGE_ID, SYSTEM_NAME,
};

const MESSAGE_TIME_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]");

/// Source of wall-clock time for message and log stamps.
pub type Clock = fn() -> OffsetDateTime;

/// Local time, or UTC when the local offset cannot be determined.
pub fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

#[derive(Debug)]
pub struct TrialStore {
    state: Arc<TrialState>,
    next_message_id: u64,
    clock: Clock,
}

impl TrialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(local_now)
    }

    #[must_use]
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            state: Arc::new(TrialState::initial()),
            next_message_id: BOOTSTRAP_MESSAGE_ID.0 + 1,
            clock,
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn state(&self) -> Arc<TrialState> {
        Arc::clone(&self.state)
    }

    pub fn now(&self) -> OffsetDateTime {
        (self.clock)()
    }

    pub fn dispatch(&mut self, action: Action) -> Arc<TrialState> {
        tracing::trace!(transition = action.name(), "applying transition");
        self.state = reduce(&self.state, action);
        Arc::clone(&self.state)
    }

    /// Applies a transition given by name and JSON payload.
    ///
    /// Unknown names and undecodable payloads leave the state untouched; the
    /// returned snapshot is then the same `Arc` as before the call.
    pub fn dispatch_named(&mut self, name: &str, payload: Value) -> Arc<TrialState> {
        match Action::from_named(name, payload, self.now()) {
            Some(action) => self.dispatch(action),
            None => {
                tracing::warn!(transition = name, "ignoring unrecognized transition");
                Arc::clone(&self.state)
            }
        }
    }

    /// Appends a transcript entry stamped with the current time.
    pub fn add_message(
        &mut self,
        role: Role,
        name: impl Into<String>,
        content: impl Into<String>,
        is_self: bool,
        node_name: Option<&str>,
    ) -> MessageId {
        let id = MessageId(self.next_message_id);
        self.next_message_id += 1;

        let timestamp = self
            .now()
            .format(MESSAGE_TIME_FORMAT)
            .unwrap_or_default();

        self.dispatch(Action::AddMessage(Message {
            id,
            role,
            name: name.into(),
            content: content.into(),
            is_self,
            timestamp,
            node_name: node_name.map(str::to_string),
        }));
        id
    }

    /// Appends an operational log line and mirrors it to tracing.
    pub fn add_log(&mut self, text: impl Into<String>) {
        let text = text.into();
        tracing::info!(target: "court_session::oplog", "{text}");
        let at = self.now();
        self.dispatch(Action::AddLog(LogLine { at, text }));
    }
}

impl Default for TrialStore {
    fn default() -> Self {
        Self::new()
    }
}
