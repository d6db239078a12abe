//! Adapts inbound protocol events into store transitions.
//!
//! The store knows nothing about speakers, fingerprints or phase tables; that
//! knowledge lives here. Each handler writes one operational log line, applies
//! its transitions and appends any transcript entries, in that order.

pub mod classify;
pub mod ledger;

use court_protocol::{ErrorEvent, InterruptRequest, NodeExecuted, ServerEvent, SessionCreated};
use serde_json::Value;

use crate::store::{Action, InterruptState, NodeProgress, Role, SessionIds, TrialStore, SYSTEM_NAME};

pub use classify::{
    classify_node, classify_speaker, extract_speaker_name, phase_for_node, resolve_phase,
    NODE_KEYWORDS, NODE_PHASES, SPEAKER_PREFIXES,
};
pub use ledger::{DedupLedger, Fingerprint, FINGERPRINT_PREFIX_CHARS};

pub const CONNECTED_NOTICE: &str = "已连接到法庭会话，庭审即将开始...";
pub const COMPLETED_NOTICE: &str = "🎉 庭审已完成！";
pub const ERROR_SPEAKER: &str = "Error";

/// Routes one inbound event to its handler.
pub fn apply_event(store: &mut TrialStore, ledger: &mut DedupLedger, event: ServerEvent) {
    tracing::debug!(event = event.name(), "applying server event");

    match event {
        ServerEvent::Open => on_open(store),
        ServerEvent::SessionCreated(data) => on_session_created(store, ledger, data),
        ServerEvent::NodeExecuted(data) => {
            on_node_executed(store, ledger, data);
        }
        ServerEvent::InterruptRequest(data) => on_interrupt_request(store, data),
        ServerEvent::TrialCompleted(data) => on_trial_completed(store, data),
        ServerEvent::Error(data) => on_error(store, data),
        ServerEvent::Close => on_close(store),
    }
}

pub fn on_open(store: &mut TrialStore) {
    store.add_log("WebSocket 连接已建立");
}

/// Starts a fresh fingerprint space and marks the session live.
pub fn on_session_created(store: &mut TrialStore, ledger: &mut DedupLedger, data: SessionCreated) {
    ledger.clear();

    let short_id: String = data.thread_id.chars().take(8).collect();
    store.dispatch(Action::SessionCreated(SessionIds {
        session_id: data.thread_id.clone(),
        thread_id: data.thread_id,
    }));
    store.add_log(format!("会话创建成功: {short_id}..."));
    store.add_message(Role::System, SYSTEM_NAME, CONNECTED_NOTICE, false, None);
}

/// Applies node progress, then admits the event's message delta in order.
///
/// Only defense-attributed lines are checked against the ledger; lines from
/// every other speaker are always admitted. Returns the number of lines
/// appended to the transcript.
pub fn on_node_executed(
    store: &mut TrialStore,
    ledger: &mut DedupLedger,
    data: NodeExecuted,
) -> usize {
    let node_name = data.node_name;
    store.add_log(format!("节点执行: {node_name} (进度: {:.1}%)", data.progress));

    store.dispatch(Action::NodeExecuted(NodeProgress {
        node_name: node_name.clone(),
        progress: data.progress,
        phase: resolve_phase(&node_name, data.current_phase.as_deref()),
        focus: data.focus,
        rounds: data.rounds,
        active_node: classify_node(&node_name),
    }));

    if data.messages.is_empty() {
        return 0;
    }

    let mut admitted = 0;
    for message in data.messages {
        let wire_name = message.name.as_deref();
        let role = classify_speaker(wire_name);
        let display_name = extract_speaker_name(&message.content, wire_name);

        if role == Role::Defense {
            let candidates = DedupLedger::candidates(
                wire_name.unwrap_or_default(),
                &message.content,
                data.message_count,
            );
            if !ledger.admit(&candidates) {
                tracing::debug!(
                    node = %node_name,
                    fingerprint = ?candidates.last(),
                    "discarding duplicate human-side line"
                );
                continue;
            }
        }

        store.add_message(role, display_name, message.content, false, Some(&node_name));
        admitted += 1;
    }

    if let Some(count) = data.message_count {
        ledger.advance_to(count);
    }

    admitted
}

/// Installs the live interrupt and shows its prompt in the transcript.
pub fn on_interrupt_request(store: &mut TrialStore, data: InterruptRequest) {
    store.add_log(format!(
        "中断请求: {} (类型: {})",
        data.node_name,
        data.input_type.as_str()
    ));

    let prompt = data.prompt.clone();
    store.dispatch(Action::InterruptRequest(InterruptState::from(data)));
    store.add_message(Role::System, SYSTEM_NAME, prompt, false, None);
}

pub fn on_trial_completed(store: &mut TrialStore, _data: Value) {
    store.add_log("庭审已完成");
    store.dispatch(Action::TrialCompleted);
    store.add_message(Role::System, SYSTEM_NAME, COMPLETED_NOTICE, false, None);
}

/// Surfaces a server-reported error. Only the transport failure code changes
/// connection state.
pub fn on_error(store: &mut TrialStore, data: ErrorEvent) {
    tracing::warn!(code = %data.code, message = %data.message, "server reported error");
    store.add_log(format!("错误: {} - {}", data.code, data.message));
    store.add_message(
        Role::System,
        ERROR_SPEAKER,
        format!("❌ 错误: {}", data.message),
        false,
        None,
    );

    if data.is_transport_failure() {
        store.dispatch(Action::ConnectionError);
    }
}

pub fn on_close(store: &mut TrialStore) {
    store.add_log("WebSocket 连接已关闭");
    store.dispatch(Action::Disconnected);
}
