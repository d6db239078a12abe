use std::sync::Arc;

use time::format_description::FormatItem;
use time::macros::format_description;

use crate::reconcile::classify::classify_node;
use crate::store::action::{Action, LogLine, NodeProgress};
use crate::store::state::{ActiveNode, InterruptState, TrialPhase, TrialState};

const LOG_TIME_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second]");

/// Applies one transition and returns the next snapshot.
///
/// Pure: the same snapshot and action always produce an equal result, and the
/// input snapshot is never modified.
pub fn reduce(state: &Arc<TrialState>, action: Action) -> Arc<TrialState> {
    let mut next = TrialState::clone(state);

    match action {
        Action::AddMessage(message) => next.messages.push(message),
        Action::AddLog(line) => next.logs.insert(0, format_log_line(&line)),
        Action::SetConnecting(connecting) => {
            next.is_connecting = connecting;
            if connecting {
                next.is_connected = false;
            }
        }
        Action::SessionCreated(ids) => {
            next.is_connected = true;
            next.is_connecting = false;
            next.session_id = Some(ids.session_id);
            next.thread_id = Some(ids.thread_id);
            next.active_node = ActiveNode::Judge;
            next.progress = 0.0;
        }
        Action::NodeExecuted(progress) => apply_node_progress(&mut next, progress),
        Action::InterruptRequest(interrupt) => {
            next.last_interrupt_req = Some(interrupt.clone());
            install_interrupt(&mut next, interrupt);
        }
        Action::RestoreInterrupt(interrupt) => install_interrupt(&mut next, interrupt),
        Action::ClearInterrupt => {
            next.interrupt_state = InterruptState::empty();
            next.is_turn_to_speak = false;
        }
        Action::TrialCompleted => {
            next.current_phase = TrialPhase::Ended;
            next.active_node = ActiveNode::Verdict;
            next.progress = 100.0;
            next.is_turn_to_speak = false;
            next.interrupt_state = InterruptState::empty();
        }
        Action::ConnectionError => {
            next.is_connected = false;
            next.is_connecting = false;
            next.active_node = ActiveNode::Standby;
        }
        Action::Disconnected => {
            next.is_connected = false;
            next.is_connecting = false;
            next.session_id = None;
            next.thread_id = None;
            next.active_node = ActiveNode::Standby;
        }
        Action::SetEvidenceList(evidence_list) => next.evidence_list = evidence_list,
        Action::Reset => next = TrialState::initial(),
    }

    Arc::new(next)
}

fn apply_node_progress(state: &mut TrialState, update: NodeProgress) {
    state.progress = advance_progress(state.progress, update.progress);
    if let Some(phase) = update.phase {
        state.current_phase = phase;
    }
    if let Some(focus) = update.focus {
        state.focus = focus;
    }
    if let Some(rounds) = update.rounds {
        state.rounds = rounds;
    }
    state.active_node = update.active_node;
    state.current_speaker = update.node_name;
    state.is_turn_to_speak = false;
}

fn install_interrupt(state: &mut TrialState, interrupt: InterruptState) {
    state.active_node = classify_node(interrupt.node_name.as_deref().unwrap_or_default());
    state.interrupt_state = interrupt;
    state.is_turn_to_speak = true;
}

/// Progress is clamped to 0..=100 and never moves backwards within a run.
fn advance_progress(current: f64, reported: f64) -> f64 {
    if !reported.is_finite() {
        return current;
    }

    reported.clamp(0.0, 100.0).max(current)
}

fn format_log_line(line: &LogLine) -> String {
    match line.at.format(LOG_TIME_FORMAT) {
        Ok(stamp) => format!("[{stamp}] {}", line.text),
        Err(_) => line.text.clone(),
    }
}
