use court_protocol::{Evidence, Rounds};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::store::state::{ActiveNode, InterruptState, Message, TrialPhase};

/// Payload of `NODE_EXECUTED`. Applied as one atomic update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeProgress {
    pub node_name: String,
    pub progress: f64,
    #[serde(default)]
    pub phase: Option<TrialPhase>,
    #[serde(default)]
    pub focus: Option<Vec<String>>,
    #[serde(default)]
    pub rounds: Option<Rounds>,
    pub active_node: ActiveNode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIds {
    pub session_id: String,
    pub thread_id: String,
}

/// Operational log line; the store stamps `at` before dispatch so the reducer
/// stays free of clock reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub at: OffsetDateTime,
    pub text: String,
}

/// Closed set of state transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AddMessage(Message),
    AddLog(LogLine),
    SetConnecting(bool),
    SessionCreated(SessionIds),
    NodeExecuted(NodeProgress),
    InterruptRequest(InterruptState),
    RestoreInterrupt(InterruptState),
    ClearInterrupt,
    TrialCompleted,
    ConnectionError,
    Disconnected,
    SetEvidenceList(Vec<Evidence>),
    Reset,
}

impl Action {
    /// Transition name as used by [`Action::from_named`].
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddMessage(_) => "ADD_MESSAGE",
            Self::AddLog(_) => "ADD_LOG",
            Self::SetConnecting(_) => "SET_CONNECTING",
            Self::SessionCreated(_) => "SESSION_CREATED",
            Self::NodeExecuted(_) => "NODE_EXECUTED",
            Self::InterruptRequest(_) => "INTERRUPT_REQUEST",
            Self::RestoreInterrupt(_) => "RESTORE_INTERRUPT",
            Self::ClearInterrupt => "CLEAR_INTERRUPT",
            Self::TrialCompleted => "TRIAL_COMPLETED",
            Self::ConnectionError => "CONNECTION_ERROR",
            Self::Disconnected => "DISCONNECTED",
            Self::SetEvidenceList(_) => "SET_EVIDENCE_LIST",
            Self::Reset => "RESET",
        }
    }

    /// Builds an action from a transition name and JSON payload.
    ///
    /// Returns `None` for names outside the closed set and for payloads that
    /// do not decode. `ADD_LOG` takes the log text as payload and is stamped
    /// with `now`.
    pub fn from_named(name: &str, payload: Value, now: OffsetDateTime) -> Option<Self> {
        let action = match name {
            "ADD_MESSAGE" => Self::AddMessage(decode(payload)?),
            "ADD_LOG" => Self::AddLog(LogLine {
                at: now,
                text: decode(payload)?,
            }),
            "SET_CONNECTING" => Self::SetConnecting(decode(payload)?),
            "SESSION_CREATED" => Self::SessionCreated(decode(payload)?),
            "NODE_EXECUTED" => Self::NodeExecuted(decode(payload)?),
            "INTERRUPT_REQUEST" => Self::InterruptRequest(decode(payload)?),
            "RESTORE_INTERRUPT" => Self::RestoreInterrupt(decode(payload)?),
            "CLEAR_INTERRUPT" => Self::ClearInterrupt,
            "TRIAL_COMPLETED" => Self::TrialCompleted,
            "CONNECTION_ERROR" => Self::ConnectionError,
            "DISCONNECTED" => Self::Disconnected,
            "SET_EVIDENCE_LIST" => Self::SetEvidenceList(decode(payload)?),
            "RESET" => Self::Reset,
            _ => return None,
        };

        Some(action)
    }
}

fn decode<T: DeserializeOwned>(payload: Value) -> Option<T> {
    serde_json::from_value(payload).ok()
}
