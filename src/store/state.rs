use std::fmt;

use court_protocol::{Evidence, InputType, InterruptRequest, Rounds};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable identity of one transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(pub u64);

/// Id reserved for the bootstrap system message present in every fresh state.
pub const BOOTSTRAP_MESSAGE_ID: MessageId = MessageId(0);

pub const SYSTEM_NAME: &str = "System";
pub const BOOTSTRAP_MESSAGE: &str = "系统已就绪。请配置案件信息并开始庭审。";

/// Speaking role used to style a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Judge,
    Prosecutor,
    Defense,
    Clerk,
    System,
    User,
}

/// Courtroom participant currently on stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveNode {
    Standby,
    Judge,
    Prosecutor,
    Defense,
    Clerk,
    Verdict,
}

/// Procedural phase of the trial.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialPhase {
    /// Not started yet.
    Preparation,
    Opening,
    Investigation,
    Debate,
    Sentencing,
    Ended,
    /// Phase label reported by the backend outside the fixed set.
    Reported(String),
}

impl TrialPhase {
    /// Maps a display label back to its phase, keeping unknown labels verbatim.
    pub fn from_label(label: &str) -> Self {
        match label {
            "准备阶段" => Self::Preparation,
            "开庭阶段" => Self::Opening,
            "法庭调查" => Self::Investigation,
            "法庭辩论" => Self::Debate,
            "宣判阶段" => Self::Sentencing,
            "已结束" => Self::Ended,
            other => Self::Reported(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Preparation => "准备阶段",
            Self::Opening => "开庭阶段",
            Self::Investigation => "法庭调查",
            Self::Debate => "法庭辩论",
            Self::Sentencing => "宣判阶段",
            Self::Ended => "已结束",
            Self::Reported(label) => label,
        }
    }
}

impl fmt::Display for TrialPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One transcript entry. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub name: String,
    pub content: String,
    /// True when this client produced the entry as an optimistic echo.
    pub is_self: bool,
    /// Display-only `HH:MM`.
    pub timestamp: String,
    pub node_name: Option<String>,
}

/// Live "backend is waiting for the human" state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterruptState {
    pub is_interrupted: bool,
    pub node_name: Option<String>,
    pub input_type: Option<InputType>,
    pub prompt: String,
    pub options: Option<Vec<String>>,
    pub metadata: Option<Value>,
}

impl InterruptState {
    /// The empty form installed whenever no interrupt is outstanding.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the node awaiting an answer, if an interrupt is live.
    #[must_use]
    pub fn pending_node(&self) -> Option<&str> {
        if self.is_interrupted {
            self.node_name.as_deref()
        } else {
            None
        }
    }
}

impl From<InterruptRequest> for InterruptState {
    fn from(request: InterruptRequest) -> Self {
        Self {
            is_interrupted: true,
            node_name: Some(request.node_name),
            input_type: Some(request.input_type),
            prompt: request.prompt,
            options: request.options,
            metadata: request.metadata,
        }
    }
}

/// Entire observable session state. Snapshots are immutable and shared as
/// `Arc<TrialState>`; every change goes through the reducer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialState {
    pub messages: Vec<Message>,
    pub is_connected: bool,
    pub is_connecting: bool,
    pub session_id: Option<String>,
    pub thread_id: Option<String>,
    pub current_phase: TrialPhase,
    pub rounds: Rounds,
    pub current_speaker: String,
    pub active_node: ActiveNode,
    pub is_turn_to_speak: bool,
    pub interrupt_state: InterruptState,
    pub progress: f64,
    pub focus: Vec<String>,
    pub evidence_list: Vec<Evidence>,
    /// Most recent first.
    pub logs: Vec<String>,
    /// Last interrupt request, kept for re-arming after an error.
    pub last_interrupt_req: Option<InterruptState>,
}

impl TrialState {
    /// State of a fresh page load.
    #[must_use]
    pub fn initial() -> Self {
        Self {
            messages: vec![Message {
                id: BOOTSTRAP_MESSAGE_ID,
                role: Role::System,
                name: SYSTEM_NAME.to_string(),
                content: BOOTSTRAP_MESSAGE.to_string(),
                is_self: false,
                timestamp: "00:00".to_string(),
                node_name: None,
            }],
            is_connected: false,
            is_connecting: false,
            session_id: None,
            thread_id: None,
            current_phase: TrialPhase::Preparation,
            rounds: Rounds::default(),
            current_speaker: String::new(),
            active_node: ActiveNode::Standby,
            is_turn_to_speak: false,
            interrupt_state: InterruptState::empty(),
            progress: 0.0,
            focus: Vec::new(),
            evidence_list: Vec::new(),
            logs: Vec::new(),
            last_interrupt_req: None,
        }
    }

    #[must_use]
    pub fn is_awaiting_input(&self) -> bool {
        self.interrupt_state.is_interrupted
    }

    #[must_use]
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

impl Default for TrialState {
    fn default() -> Self {
        Self::initial()
    }
}
