//! Offline replay of recorded inbound frames through a full session.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use court_protocol::{
    decode_server_frame, CaseInfo, EvidenceSubmission, InputType, ProtocolError, ServerEvent,
    UserInput,
};
use court_protocol_mock::MockTransport;
use thiserror::Error;

use crate::config::SessionConfig;
use crate::session::{CourtSession, HostOps, UserRole};
use crate::store::{InterruptState, TrialState, TrialStore};

/// Evidence message sent when the replay declines to present evidence.
pub const QUIT_EVIDENCE_MESSAGE: &str = "放弃举证";
pub const DEFAULT_TEXT_ANSWER: &str = "无";

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("usage: court_replay <frames.jsonl>")]
    Usage,
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid frame on line {line}: {source}")]
    Frame {
        line: usize,
        #[source]
        source: ProtocolError,
    },
}

/// Decodes one frame per non-blank line.
pub fn parse_frames(text: &str) -> Result<Vec<ServerEvent>, ReplayError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            decode_server_frame(line).map_err(|source| ReplayError::Frame {
                line: index + 1,
                source,
            })
        })
        .collect()
}

pub fn load_frames(path: &Path) -> Result<Vec<ServerEvent>, ReplayError> {
    let text = fs::read_to_string(path).map_err(|source| ReplayError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_frames(&text)
}

/// Neutral answer for a live interrupt, or `None` for input types the replay
/// cannot answer.
pub fn auto_response(interrupt: &InterruptState) -> Option<UserInput> {
    match interrupt.input_type? {
        InputType::Boolean => Some(UserInput::Bool(false)),
        InputType::String => Some(UserInput::from(DEFAULT_TEXT_ANSWER)),
        InputType::Evidence => Some(UserInput::Evidence(EvidenceSubmission {
            current_evidence: None,
            messages: QUIT_EVIDENCE_MESSAGE.to_string(),
        })),
        InputType::Unknown => None,
    }
}

/// Headless host: declines confirmations and records alerts.
#[derive(Debug, Default)]
pub struct ReplayHost {
    pub alerts: Vec<String>,
}

impl HostOps for ReplayHost {
    fn confirm(&mut self, _prompt: &str) -> bool {
        false
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn request_render(&mut self) {}
}

#[derive(Debug)]
pub struct ReplayReport {
    pub state: Arc<TrialState>,
    pub applied: usize,
    pub responses: usize,
    pub alerts: Vec<String>,
}

/// Runs `frames` through a session backed by a scripted transport.
pub fn replay(frames: Vec<ServerEvent>, config: &SessionConfig) -> ReplayReport {
    replay_with_store(frames, config, TrialStore::new())
}

pub fn replay_with_store(
    frames: Vec<ServerEvent>,
    config: &SessionConfig,
    store: TrialStore,
) -> ReplayReport {
    let (transport, _handle) = MockTransport::with_script(frames);
    let mut session = CourtSession::with_store(transport, config.clone(), store);
    let mut host = ReplayHost::default();

    session.connect(&mut host, UserRole::DefenseAi, &CaseInfo::default(), Vec::new());

    let mut applied = 0;
    let mut responses = 0;
    while session.pump_one() {
        applied += 1;

        if !config.replay_auto_respond {
            continue;
        }
        let state = session.state();
        if let Some(input) = auto_response(&state.interrupt_state) {
            if session.respond_to_interrupt(input) {
                responses += 1;
            }
        }
    }

    tracing::info!(applied, responses, "replay finished");
    ReplayReport {
        state: session.state(),
        applied,
        responses,
        alerts: host.alerts,
    }
}

/// Plain-text transcript followed by the operational log, oldest first.
pub fn render_report(report: &ReplayReport) -> String {
    let state = &report.state;
    let mut out = String::new();

    out.push_str("== transcript ==\n");
    for message in &state.messages {
        let marker = if message.is_self { "*" } else { " " };
        out.push_str(&format!(
            "{marker}[{}] {}: {}\n",
            message.timestamp, message.name, message.content
        ));
    }

    out.push_str(&format!(
        "== state ==\nphase: {}\nprogress: {:.1}\nconnected: {}\n",
        state.current_phase, state.progress, state.is_connected
    ));

    out.push_str("== log ==\n");
    for line in state.logs.iter().rev() {
        out.push_str(line);
        out.push('\n');
    }

    out
}
