//! Session facade: the only surface a presentation layer drives.
//!
//! `CourtSession` owns the transport, the store, the dedup ledger and the
//! event sink of the current connection. Inbound events queue in the sink
//! until [`CourtSession::pump`] applies them, so they are processed one at a
//! time and in arrival order regardless of when the transport emits them.

use std::sync::Arc;

use court_protocol::{CaseInfo, CourtTransport, EventSink, Evidence, ServerEvent, UserInput};

use crate::config::SessionConfig;
use crate::reconcile::{apply_event, DedupLedger, Fingerprint};
use crate::store::{Action, MessageId, Role, TrialState, TrialStore, SYSTEM_NAME};

pub const DISCONNECT_CONFIRM_PROMPT: &str = "断开当前会话？";
pub const CONNECT_FAILURE_ALERT: &str = "连接失败，请确保后端服务正在运行。";
pub const RETRY_NOTICE: &str =
    "⚠️ 系统提示：您已触发【重试】操作，正在恢复上一次的输入请求，请重新提交...";

pub const OBJECTION_LABEL: &str = "✅ 是 / 有异议";
pub const NO_OBJECTION_LABEL: &str = "❌ 否 / 无异议";
pub const EVIDENCE_SUBMITTED_LABEL: &str = "已提交证据";

/// Speaker title the backend uses when it reflects the human's input back.
pub const BACKEND_DEFENSE_SPEAKER: &str = "辩护代理人";

/// UI-side effects the session needs from its host.
pub trait HostOps {
    /// Asks the user a yes/no question.
    fn confirm(&mut self, prompt: &str) -> bool;
    /// Shows a blocking notice.
    fn alert(&mut self, message: &str);
    fn request_render(&mut self);
}

/// Seat the human picked before connecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserRole {
    ProsecutorAi,
    DefenseAi,
    JudgeAi,
    Observer,
}

impl UserRole {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ProsecutorAi => "Prosecutor AI",
            Self::DefenseAi => "Defense AI",
            Self::JudgeAi => "Judge AI",
            Self::Observer => "Observer",
        }
    }

    /// Role label the backend expects, if this seat has one.
    pub fn backend_role(&self) -> Option<&'static str> {
        match self {
            Self::ProsecutorAi => Some("原告律师"),
            Self::DefenseAi => Some("被告律师"),
            Self::JudgeAi => Some("法官"),
            Self::Observer => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// Transport opened and the trial start request was sent.
    Started,
    /// Already connected; the user confirmed the disconnect toggle.
    Disconnected,
    /// Already connected; the user declined the disconnect toggle.
    Kept,
    /// A connect is still in flight.
    AlreadyConnecting,
    Failed(String),
}

/// Text shown in the transcript for the human's own answer.
pub fn echo_text(input: &UserInput) -> String {
    match input {
        UserInput::Bool(true) => OBJECTION_LABEL.to_string(),
        UserInput::Bool(false) => NO_OBJECTION_LABEL.to_string(),
        UserInput::Text(text) => text.clone(),
        UserInput::Evidence(submission) if submission.messages.is_empty() => {
            EVIDENCE_SUBMITTED_LABEL.to_string()
        }
        UserInput::Evidence(submission) => submission.messages.clone(),
    }
}

/// Display name of the optimistic echo.
pub fn echo_speaker(attorney_name: &str) -> String {
    format!("用户 ({attorney_name})")
}

/// Every speaker-name form the backend is known to use when it reflects an
/// answer back, fingerprinted against `echo`.
pub fn echo_fingerprints(attorney_name: &str, echo: &str) -> [Fingerprint; 4] {
    [
        Fingerprint::new(&echo_speaker(attorney_name), echo),
        Fingerprint::new("", echo),
        Fingerprint::new(BACKEND_DEFENSE_SPEAKER, echo),
        Fingerprint::new(&format!("{BACKEND_DEFENSE_SPEAKER}{attorney_name}"), echo),
    ]
}

pub struct CourtSession<T: CourtTransport> {
    transport: T,
    store: TrialStore,
    ledger: DedupLedger,
    sink: Option<EventSink>,
    config: SessionConfig,
    attorney_name: String,
}

impl<T: CourtTransport> CourtSession<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, SessionConfig::default())
    }

    pub fn with_config(transport: T, config: SessionConfig) -> Self {
        Self::with_store(transport, config, TrialStore::new())
    }

    pub fn with_store(transport: T, config: SessionConfig, store: TrialStore) -> Self {
        let attorney_name = config.default_attorney_name.clone();
        Self {
            transport,
            store,
            ledger: DedupLedger::new(),
            sink: None,
            config,
            attorney_name,
        }
    }

    pub fn state(&self) -> Arc<TrialState> {
        self.store.state()
    }

    pub fn ledger(&self) -> &DedupLedger {
        &self.ledger
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Attorney name used for the optimistic echo of the current session.
    pub fn attorney_name(&self) -> &str {
        &self.attorney_name
    }

    pub fn add_message(
        &mut self,
        role: Role,
        name: impl Into<String>,
        content: impl Into<String>,
        is_self: bool,
        node_name: Option<&str>,
    ) -> MessageId {
        self.store.add_message(role, name, content, is_self, node_name)
    }

    pub fn add_log(&mut self, text: impl Into<String>) {
        self.store.add_log(text);
    }

    /// Opens a session, or toggles an open one off after confirmation.
    ///
    /// Never returns an error: failures are logged, alerted through `host`
    /// and recorded as a connection error in state.
    pub fn connect(
        &mut self,
        host: &mut dyn HostOps,
        role: UserRole,
        case_info: &CaseInfo,
        evidence_list: Vec<Evidence>,
    ) -> ConnectOutcome {
        let state = self.store.state();

        if state.is_connected {
            let outcome = if host.confirm(DISCONNECT_CONFIRM_PROMPT) {
                self.disconnect();
                ConnectOutcome::Disconnected
            } else {
                ConnectOutcome::Kept
            };
            host.request_render();
            return outcome;
        }

        if state.is_connecting {
            tracing::debug!("connect ignored while a handshake is in flight");
            return ConnectOutcome::AlreadyConnecting;
        }

        tracing::info!(
            role = role.label(),
            backend_role = role.backend_role().unwrap_or("none"),
            case_id = %case_info.case_id,
            "connecting court session"
        );

        self.attorney_name = if case_info.attorney_name.trim().is_empty() {
            self.config.default_attorney_name.clone()
        } else {
            case_info.attorney_name.clone()
        };

        if self.sink.is_some() || self.transport.is_connected() {
            tracing::debug!("closing previous channel before reconnecting");
            self.retire_connection();
        }

        self.store.dispatch(Action::SetConnecting(true));
        self.store.add_log("建立 WebSocket 连接中...");
        self.store.dispatch(Action::SetEvidenceList(evidence_list.clone()));

        let outcome = match self.open_and_start(case_info, &evidence_list) {
            Ok(()) => {
                self.store.add_log("发送开始庭审请求...");
                ConnectOutcome::Started
            }
            Err(error) => {
                let message = error.to_string();
                tracing::warn!(error = %message, "court session connect failed");
                self.store.add_log(format!("连接失败: {message}"));
                host.alert(CONNECT_FAILURE_ALERT);
                self.retire_connection();
                self.store.dispatch(Action::ConnectionError);
                ConnectOutcome::Failed(message)
            }
        };

        host.request_render();
        outcome
    }

    fn open_and_start(
        &mut self,
        case_info: &CaseInfo,
        evidence_list: &[Evidence],
    ) -> Result<(), court_protocol::TransportError> {
        let sink = EventSink::new();
        self.sink = Some(sink.clone());

        self.transport.connect(sink)?;
        self.pump();
        self.transport.start_trial(case_info, evidence_list)
    }

    pub fn disconnect(&mut self) {
        self.retire_connection();
        self.store.dispatch(Action::Disconnected);
        self.store.add_log("已断开。");
    }

    /// Tears down the transport and returns to the initial state.
    pub fn clear_session(&mut self) {
        self.retire_connection();
        self.store.dispatch(Action::Reset);
        self.ledger.clear();
        self.store.add_log("会话已清除。");
    }

    fn retire_connection(&mut self) {
        self.transport.disconnect();
        if let Some(sink) = self.sink.take() {
            let dropped = sink.pending();
            if dropped > 0 {
                tracing::debug!(dropped, "dropping events from retired connection");
            }
        }
    }

    /// Free-form chat entry. Only accepted while an interrupt is live.
    pub fn send_message(&mut self, content: &str, role: UserRole) -> bool {
        if content.trim().is_empty() {
            return false;
        }

        if !self.store.state().interrupt_state.is_interrupted {
            self.store.add_log("警告: 当前不需要输入");
            return false;
        }

        tracing::debug!(role = role.label(), "chat entry answers live interrupt");
        self.respond_to_interrupt(content)
    }

    /// Answers the live interrupt and echoes the answer into the transcript.
    ///
    /// Returns false, with a log line and no other state change, when no
    /// interrupt is live or the transport rejects the send.
    pub fn respond_to_interrupt(&mut self, input: impl Into<UserInput>) -> bool {
        let input = input.into();
        let state = self.store.state();
        let Some(node_name) = state.interrupt_state.pending_node() else {
            self.store.add_log("错误: 没有活动的中断请求");
            return false;
        };

        if let Err(error) = self.transport.send_user_input(node_name, &input) {
            tracing::warn!(node = node_name, %error, "sending user input failed");
            self.store.add_log(format!("发送输入失败: {error}"));
            return false;
        }
        self.store.add_log(format!("已响应中断: {node_name}"));

        let echo = echo_text(&input);
        self.ledger.seed(echo_fingerprints(&self.attorney_name, &echo));
        self.store.add_message(
            Role::Defense,
            echo_speaker(&self.attorney_name),
            echo,
            true,
            Some(node_name),
        );
        self.store.dispatch(Action::ClearInterrupt);
        true
    }

    /// Re-arms the last interrupt request without a backend round-trip.
    pub fn retry(&mut self) -> bool {
        let Some(last) = self.store.state().last_interrupt_req.clone() else {
            self.store.add_log("没有可重试的操作");
            return false;
        };

        self.store.dispatch(Action::RestoreInterrupt(last));
        self.store.add_log("用户触发重试，已恢复上次中断请求");
        self.store.add_message(Role::System, SYSTEM_NAME, RETRY_NOTICE, false, None);
        true
    }

    /// Applies every queued event of the current connection in FIFO order.
    /// Returns how many were applied.
    pub fn pump(&mut self) -> usize {
        let Some(sink) = self.sink.clone() else {
            return 0;
        };

        let events = sink.drain();
        let applied = events.len();
        for event in events {
            apply_event(&mut self.store, &mut self.ledger, event);
        }
        applied
    }

    /// Applies the oldest queued event, if any.
    pub fn pump_one(&mut self) -> bool {
        let Some(event) = self.sink.as_ref().and_then(EventSink::pop) else {
            return false;
        };

        apply_event(&mut self.store, &mut self.ledger, event);
        true
    }

    /// Applies a single event directly, bypassing the sink.
    pub fn handle_event(&mut self, event: ServerEvent) {
        apply_event(&mut self.store, &mut self.ledger, event);
    }
}
