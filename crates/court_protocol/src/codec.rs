use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;
use crate::wire::{
    CaseInfo, ErrorEvent, Evidence, InterruptRequest, NodeExecuted, ServerEvent, SessionCreated,
    UserInput,
};

/// Inbound wire frame: `{"type": "<event>", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerFrame {
    SessionCreated(SessionCreated),
    NodeExecuted(NodeExecuted),
    InterruptRequest(InterruptRequest),
    TrialCompleted(Value),
    Error(ErrorEvent),
}

impl From<ServerFrame> for ServerEvent {
    fn from(frame: ServerFrame) -> Self {
        match frame {
            ServerFrame::SessionCreated(data) => Self::SessionCreated(data),
            ServerFrame::NodeExecuted(data) => Self::NodeExecuted(data),
            ServerFrame::InterruptRequest(data) => Self::InterruptRequest(data),
            ServerFrame::TrialCompleted(data) => Self::TrialCompleted(data),
            ServerFrame::Error(data) => Self::Error(data),
        }
    }
}

/// Outbound wire frame sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientCommand {
    StartTrial {
        case_info: CaseInfo,
        evidence_list: Vec<Evidence>,
    },
    UserInput {
        node_name: String,
        input: UserInput,
    },
}

/// Decodes one inbound text frame into the event the transport should emit.
pub fn decode_server_frame(text: &str) -> Result<ServerEvent, ProtocolError> {
    serde_json::from_str::<ServerFrame>(text)
        .map(ServerEvent::from)
        .map_err(ProtocolError::Decode)
}

pub fn encode_client_command(command: &ClientCommand) -> Result<String, ProtocolError> {
    serde_json::to_string(command).map_err(ProtocolError::Encode)
}
