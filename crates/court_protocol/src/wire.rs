use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Error code the backend uses for transport-level failures.
///
/// This is the only code that forces the client into a disconnected state;
/// every other code is informational.
pub const TRANSPORT_ERROR_CODE: &str = "WEBSOCKET_ERROR";

/// Case configuration sent to the backend when a trial starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseInfo {
    pub r#abstract: String,
    pub prosecutor_title: String,
    pub prosecutor_name: String,
    pub statement_charge: String,
    pub crime: String,
    pub defendant_name: String,
    pub defendant_birthdate: String,
    pub defendant_birthplace: String,
    pub defendant_ethnicity: String,
    pub defendant_education: String,
    pub defendant_occupation: String,
    pub defendant_employer: String,
    pub defendant_residence: String,
    #[serde(rename = "defendant_ID_number")]
    pub defendant_id_number: String,
    pub defendant_legal_record: String,
    pub detention_date: String,
    pub indictment_date: String,
    pub attorney_name: String,
    pub court_name: String,
    pub judge_name: String,
    pub judge_name_2: String,
    pub clerk_name: String,
    pub case_id: String,
}

/// Side that supplied a piece of evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceProvider {
    Prosecutor,
    Defendant,
}

/// One entry of the authoritative evidence roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub id: String,
    pub name: String,
    pub content: String,
    pub provider: EvidenceProvider,
}

impl Evidence {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
        provider: EvidenceProvider,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            content: content.into(),
            provider,
        }
    }
}

/// Bounded per-step counters reported alongside node progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rounds {
    pub pros_question_rounds: u32,
    pub pros_evidence_rounds: u32,
    pub pros_focus_rounds: u32,
}

/// Dialogue line carried in a node-executed delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl WireMessage {
    #[must_use]
    pub fn named(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            content: content.into(),
            kind: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCreated {
    #[serde(default)]
    pub message: String,
    pub thread_id: String,
}

/// Progress report for one executed orchestration node.
///
/// `messages` is the incremental delta produced by this node only, never the
/// full history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeExecuted {
    pub node_name: String,
    #[serde(default)]
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounds: Option<Rounds>,
    #[serde(default)]
    pub messages: Vec<WireMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_count: Option<u64>,
}

/// Shape of the input an interrupt asks the human for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    Boolean,
    String,
    Evidence,
    /// Tag from a newer backend this client does not know how to render.
    Unknown,
}

impl InputType {
    pub fn parse(value: &str) -> Self {
        match value {
            "boolean" => Self::Boolean,
            "string" => Self::String,
            "evidence" => Self::Evidence,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Evidence => "evidence",
            Self::Unknown => "unknown",
        }
    }
}

impl Serialize for InputType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for InputType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = std::string::String::deserialize(deserializer)?;
        Ok(Self::parse(&tag))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterruptRequest {
    pub node_name: String,
    #[serde(default)]
    pub prompt: String,
    pub input_type: InputType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl ErrorEvent {
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Returns true when the error reports a broken transport rather than a
    /// protocol-level condition.
    #[must_use]
    pub fn is_transport_failure(&self) -> bool {
        self.code == TRANSPORT_ERROR_CODE
    }
}

/// Inbound protocol event, one variant per transport callback.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Open,
    SessionCreated(SessionCreated),
    NodeExecuted(NodeExecuted),
    InterruptRequest(InterruptRequest),
    TrialCompleted(Value),
    Error(ErrorEvent),
    Close,
}

impl ServerEvent {
    /// Returns the stable event name used in logs and wire frames.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::SessionCreated(_) => "session_created",
            Self::NodeExecuted(_) => "node_executed",
            Self::InterruptRequest(_) => "interrupt_request",
            Self::TrialCompleted(_) => "trial_completed",
            Self::Error(_) => "error",
            Self::Close => "close",
        }
    }
}

/// Evidence chosen in an evidence-selection response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EvidenceSelection {
    One(Evidence),
    Many(Vec<Evidence>),
}

/// Structured answer to an evidence interrupt. `current_evidence: None`
/// means the human declined to present evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceSubmission {
    pub current_evidence: Option<EvidenceSelection>,
    #[serde(default)]
    pub messages: String,
}

/// Human response to a live interrupt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserInput {
    Bool(bool),
    Text(String),
    Evidence(EvidenceSubmission),
}

impl From<bool> for UserInput {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<String> for UserInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for UserInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<EvidenceSubmission> for UserInput {
    fn from(value: EvidenceSubmission) -> Self {
        Self::Evidence(value)
    }
}
