
use court_protocol::{
    EvidenceProvider, EvidenceSelection, EvidenceSubmission, InputType, ServerEvent, UserInput,
    WireMessage,
};
use court_protocol_mock::MockTransport;
use court_session::session::{CONNECT_FAILURE_ALERT, DISCONNECT_CONFIRM_PROMPT, RETRY_NOTICE};
use court_session::{ActiveNode, ConnectOutcome, Evidence, Role, TrialPhase, TrialState, UserRole};
use fixture::{
    case_info, connected_session, evidence_list, interrupt, new_session, node_executed,
    session_created, session_with, stamped, transport_error, HostSpy,
};
use pretty_assertions::assert_eq;

#[test]
fn connect_opens_transport_and_starts_trial() {
    let (mut session, handle) = new_session();
    let mut host = HostSpy::default();

    let outcome = session.connect(&mut host, UserRole::DefenseAi, &case_info(), evidence_list());

    assert_eq!(outcome, ConnectOutcome::Started);
    assert_eq!(handle.connect_calls(), 1);
    assert_eq!(handle.started_trials(), vec![(case_info(), evidence_list())]);
    assert_eq!(host.render_requests, 1);

    let state = session.state();
    assert!(state.is_connecting);
    assert!(!state.is_connected);
    assert_eq!(state.evidence_list, evidence_list());
    assert_eq!(
        state.logs,
        vec![
            stamped("发送开始庭审请求..."),
            stamped("WebSocket 连接已建立"),
            stamped("建立 WebSocket 连接中..."),
        ]
    );
}

#[test]
fn connect_then_interrupt_then_respond_false() {
    let (mut session, handle, _host) = connected_session();
    handle.emit(interrupt("defense_objection", InputType::Boolean, "异议？"));
    session.pump();

    let state = session.state();
    assert!(state.is_connected);
    assert_eq!(state.session_id.as_deref(), Some("t1"));
    assert!(state.is_turn_to_speak);
    assert_eq!(state.interrupt_state.node_name.as_deref(), Some("defense_objection"));

    assert!(session.respond_to_interrupt(false));

    assert_eq!(
        handle.sent_inputs(),
        vec![("defense_objection".to_string(), UserInput::Bool(false))]
    );
    let state = session.state();
    assert!(!state.is_turn_to_speak);
    assert!(!state.interrupt_state.is_interrupted);
    let last = state.last_message().expect("echo appended");
    assert!(last.is_self);
    assert_eq!(last.role, Role::Defense);
    assert_eq!(last.name, "用户 (陈律师)");
    assert_eq!(last.content, "❌ 否 / 无异议");
    assert_eq!(state.logs[0], stamped("已响应中断: defense_objection"));
}

#[test]
fn transport_error_keeps_history_and_logs_it() {
    let (mut session, handle, _host) = connected_session();
    handle.emit(transport_error("socket lost"));
    session.pump();

    let state = session.state();
    assert!(!state.is_connected);
    assert!(!state.is_connecting);
    assert_eq!(state.active_node, ActiveNode::Standby);
    assert!(state
        .logs
        .iter()
        .any(|line| line.contains("错误: WEBSOCKET_ERROR - socket lost")));
    assert!(state.messages.len() > 1);
    let last = state.last_message().expect("error line");
    assert_eq!(last.name, "Error");
    assert_eq!(last.content, "❌ 错误: socket lost");
}

#[test]
fn own_answer_is_not_shown_twice_when_backend_reflects_it() {
    let (mut session, handle, _host) = connected_session();
    handle.emit(interrupt("defense_objection", InputType::Boolean, "异议？"));
    session.pump();
    assert!(session.respond_to_interrupt(true));
    let before = session.state().messages.len();

    handle.emit(ServerEvent::NodeExecuted(node_executed(
        "defense_objection",
        18.0,
        vec![
            WireMessage::named("辩护代理人陈律师", "✅ 是 / 有异议"),
            WireMessage::named("审判长", "请辩护人陈述异议理由。"),
        ],
        Some(6),
    )));
    session.pump();

    let state = session.state();
    assert_eq!(state.messages.len(), before + 1);
    let contents: Vec<_> = state
        .messages
        .iter()
        .filter(|message| message.content == "✅ 是 / 有异议")
        .collect();
    assert_eq!(contents.len(), 1);
    assert!(contents[0].is_self);
    assert_eq!(state.last_message().map(|m| m.role), Some(Role::Judge));
}

#[test]
fn trial_completion_forces_full_progress() {
    let (mut session, handle, _host) = connected_session();
    handle.emit(ServerEvent::NodeExecuted(node_executed(
        "defense_final_statement",
        97.3,
        Vec::new(),
        None,
    )));
    session.pump();
    assert_eq!(session.state().progress, 97.3);

    handle.emit(ServerEvent::TrialCompleted(serde_json::json!({"verdict": "有期徒刑一年"})));
    session.pump();

    let state = session.state();
    assert_eq!(state.progress, 100.0);
    assert_eq!(state.current_phase, TrialPhase::Ended);
    assert_eq!(state.active_node, ActiveNode::Verdict);
    assert_eq!(state.last_message().map(|m| m.content.as_str()), Some("🎉 庭审已完成！"));
}

#[test]
fn retry_rearms_last_interrupt_after_it_was_cleared() {
    let (mut session, handle, _host) = connected_session();
    handle.emit(interrupt("defense_reply", InputType::String, "请回答公诉人的问题。"));
    session.pump();
    assert!(session.send_message("我当时没有看到行人。", UserRole::DefenseAi));
    assert!(!session.state().is_turn_to_speak);

    assert!(session.retry());

    let state = session.state();
    assert!(state.is_turn_to_speak);
    assert_eq!(state.interrupt_state.node_name.as_deref(), Some("defense_reply"));
    assert_eq!(state.interrupt_state, state.last_interrupt_req.clone().expect("ledger kept"));
    assert_eq!(state.last_message().map(|m| m.content.as_str()), Some(RETRY_NOTICE));
    assert_eq!(state.logs[0], stamped("用户触发重试，已恢复上次中断请求"));
}

#[test]
fn retry_without_previous_interrupt_only_logs() {
    let (mut session, _handle, _host) = connected_session();
    let messages_before = session.state().messages.len();

    assert!(!session.retry());

    let state = session.state();
    assert!(!state.is_turn_to_speak);
    assert_eq!(state.messages.len(), messages_before);
    assert_eq!(state.logs[0], stamped("没有可重试的操作"));
}

#[test]
fn connect_failure_alerts_and_records_connection_error() {
    let (transport, handle) = MockTransport::failing("backend offline");
    let mut session = session_with(transport);
    let mut host = HostSpy::default();
    session.add_message(Role::System, "System", "kept", false, None);

    let outcome = session.connect(&mut host, UserRole::Observer, &case_info(), evidence_list());

    assert_eq!(
        outcome,
        ConnectOutcome::Failed("handshake failed: backend offline".to_string())
    );
    assert_eq!(host.alerts, vec![CONNECT_FAILURE_ALERT.to_string()]);
    assert_eq!(handle.started_trials().len(), 0);

    let state = session.state();
    assert!(!state.is_connected);
    assert!(!state.is_connecting);
    assert_eq!(state.active_node, ActiveNode::Standby);
    assert_eq!(state.logs[0], stamped("连接失败: handshake failed: backend offline"));
    assert_eq!(state.last_message().map(|m| m.content.as_str()), Some("kept"));
}

#[test]
fn failed_trial_start_closes_the_half_open_channel() {
    let (transport, handle) = MockTransport::new();
    let mut session = session_with(transport.with_start_failure("start rejected"));
    let mut host = HostSpy::default();

    let outcome = session.connect(&mut host, UserRole::DefenseAi, &case_info(), evidence_list());

    assert_eq!(
        outcome,
        ConnectOutcome::Failed("send failed: start rejected".to_string())
    );
    assert_eq!(host.alerts, vec![CONNECT_FAILURE_ALERT.to_string()]);
    assert_eq!(handle.connect_calls(), 1);
    assert_eq!(handle.disconnect_calls(), 1);
    assert!(handle.sink().is_none());

    assert!(!handle.emit(session_created("late")));
    assert_eq!(session.pump(), 0);
    let state = session.state();
    assert!(!state.is_connected);
    assert!(!state.is_connecting);
    assert_eq!(state.thread_id, None);
}

#[test]
fn reconnect_after_transport_error_closes_previous_channel() {
    let (mut session, handle, mut host) = connected_session();
    handle.emit(transport_error("connection reset"));
    session.pump();
    assert!(!session.state().is_connected);
    let stale_sink = handle.sink().expect("old channel still open");

    let outcome = session.connect(&mut host, UserRole::DefenseAi, &case_info(), evidence_list());

    assert_eq!(outcome, ConnectOutcome::Started);
    assert_eq!(handle.connect_calls(), 2);
    assert_eq!(handle.disconnect_calls(), 1);

    stale_sink.emit(session_created("t1-late"));
    handle.emit(session_created("t2"));
    assert_eq!(session.pump(), 1);
    assert_eq!(session.state().thread_id.as_deref(), Some("t2"));
}

#[test]
fn first_connect_does_not_close_anything() {
    let (mut session, handle) = new_session();
    let mut host = HostSpy::default();

    session.connect(&mut host, UserRole::DefenseAi, &case_info(), evidence_list());

    assert_eq!(handle.connect_calls(), 1);
    assert_eq!(handle.disconnect_calls(), 0);
}

#[test]
fn events_can_be_applied_directly_without_a_connection() {
    let (mut session, handle) = new_session();

    session.handle_event(session_created("t9"));
    session.handle_event(ServerEvent::NodeExecuted(node_executed(
        "judge_open",
        4.0,
        vec![WireMessage::named("审判长", "现在开庭。")],
        Some(1),
    )));

    let state = session.state();
    assert!(state.is_connected);
    assert_eq!(state.thread_id.as_deref(), Some("t9"));
    assert_eq!(state.progress, 4.0);
    assert_eq!(state.last_message().map(|m| m.role), Some(Role::Judge));
    assert_eq!(handle.connect_calls(), 0);
}

#[test]
fn connect_while_connected_toggles_after_confirmation() {
    let (mut session, handle, _host) = connected_session();

    let mut declining = HostSpy::confirming(false);
    let outcome = session.connect(
        &mut declining,
        UserRole::DefenseAi,
        &case_info(),
        evidence_list(),
    );
    assert_eq!(outcome, ConnectOutcome::Kept);
    assert!(session.state().is_connected);
    assert_eq!(handle.disconnect_calls(), 0);

    let mut accepting = HostSpy::confirming(true);
    let outcome = session.connect(
        &mut accepting,
        UserRole::DefenseAi,
        &case_info(),
        evidence_list(),
    );

    assert_eq!(outcome, ConnectOutcome::Disconnected);
    assert_eq!(accepting.confirm_prompts, vec![DISCONNECT_CONFIRM_PROMPT.to_string()]);
    assert_eq!(handle.connect_calls(), 1);
    assert_eq!(handle.disconnect_calls(), 1);
    let state = session.state();
    assert!(!state.is_connected);
    assert_eq!(state.thread_id, None);
    assert_eq!(state.logs[0], stamped("已断开。"));
}

#[test]
fn second_connect_during_handshake_is_ignored() {
    let (mut session, handle) = new_session();
    let mut host = HostSpy::default();
    session.connect(&mut host, UserRole::DefenseAi, &case_info(), evidence_list());

    let outcome = session.connect(&mut host, UserRole::DefenseAi, &case_info(), evidence_list());

    assert_eq!(outcome, ConnectOutcome::AlreadyConnecting);
    assert_eq!(handle.connect_calls(), 1);
}

#[test]
fn send_message_requires_content_and_live_interrupt() {
    let (mut session, handle, _host) = connected_session();
    let logs_before = session.state().logs.len();

    assert!(!session.send_message("   ", UserRole::DefenseAi));
    assert_eq!(session.state().logs.len(), logs_before);

    assert!(!session.send_message("我有话要说", UserRole::DefenseAi));
    assert_eq!(session.state().logs[0], stamped("警告: 当前不需要输入"));
    assert!(handle.sent_inputs().is_empty());

    handle.emit(interrupt("defense_statement", InputType::String, "请发表辩护意见。"));
    session.pump();
    assert!(session.send_message("被告人系初犯，请求从轻处罚。", UserRole::DefenseAi));
    assert_eq!(
        handle.sent_inputs(),
        vec![(
            "defense_statement".to_string(),
            UserInput::from("被告人系初犯，请求从轻处罚。")
        )]
    );
}

#[test]
fn respond_without_interrupt_is_rejected_with_log() {
    let (mut session, handle, _host) = connected_session();
    let before = session.state();

    assert!(!session.respond_to_interrupt(true));

    let after = session.state();
    assert_eq!(after.logs[0], stamped("错误: 没有活动的中断请求"));
    assert_eq!(after.messages, before.messages);
    assert!(handle.sent_inputs().is_empty());
}

#[test]
fn rejected_send_keeps_interrupt_live() {
    let (transport, handle) = MockTransport::new();
    let mut session = session_with(transport.with_send_failure("socket closed"));
    let mut host = HostSpy::default();
    session.connect(&mut host, UserRole::DefenseAi, &case_info(), evidence_list());
    handle.emit(interrupt("defense_reply", InputType::String, "回答"));
    session.pump();

    assert!(!session.respond_to_interrupt("无"));

    let state = session.state();
    assert!(state.is_turn_to_speak);
    assert!(state.interrupt_state.is_interrupted);
    assert_eq!(state.logs[0], stamped("发送输入失败: send failed: socket closed"));
    assert!(session.ledger().is_empty());
}

#[test]
fn evidence_answer_echoes_its_message() {
    let (mut session, handle, _host) = connected_session();
    handle.emit(interrupt("defense_show_evidence", InputType::Evidence, "请出示证据。"));
    session.pump();

    let chosen = Evidence::new("E016", "监控录像", "案发路口监控", EvidenceProvider::Defendant);
    let submission = EvidenceSubmission {
        current_evidence: Some(EvidenceSelection::Many(vec![chosen])),
        messages: "出示案发路口监控录像".to_string(),
    };
    assert!(session.respond_to_interrupt(submission.clone()));

    assert_eq!(
        handle.sent_inputs(),
        vec![("defense_show_evidence".to_string(), UserInput::Evidence(submission))]
    );
    assert_eq!(
        session.state().last_message().map(|m| m.content.as_str()),
        Some("出示案发路口监控录像")
    );
}

#[test]
fn echo_falls_back_to_configured_attorney_name() {
    let (mut session, handle) = new_session();
    let mut host = HostSpy::default();
    let mut info = case_info();
    info.attorney_name = String::new();
    session.connect(&mut host, UserRole::DefenseAi, &info, Vec::new());
    handle.emit(interrupt("defense_objection", InputType::Boolean, "异议？"));
    session.pump();

    session.respond_to_interrupt(true);

    assert_eq!(session.attorney_name(), "辩护代理人");
    assert_eq!(
        session.state().last_message().map(|m| m.name.as_str()),
        Some("用户 (辩护代理人)")
    );
}

#[test]
fn clear_session_resets_state_and_drops_late_events() {
    let (mut session, handle, _host) = connected_session();
    handle.emit(interrupt("defense_objection", InputType::Boolean, "异议？"));
    session.pump();
    session.respond_to_interrupt(false);
    let stale_sink = handle.sink().expect("live connection sink");

    session.clear_session();
    stale_sink.emit(interrupt("defense_reply", InputType::String, "迟到的请求"));

    assert_eq!(session.pump(), 0);
    assert!(session.ledger().is_empty());
    assert_eq!(handle.disconnect_calls(), 1);

    let state = session.state();
    let expected = TrialState {
        logs: vec![stamped("会话已清除。")],
        ..TrialState::initial()
    };
    assert_eq!(*state, expected);
}

#[test]
fn disconnect_marks_session_closed() {
    let (mut session, handle, _host) = connected_session();

    session.disconnect();

    let state = session.state();
    assert!(!state.is_connected);
    assert_eq!(state.session_id, None);
    assert_eq!(state.active_node, ActiveNode::Standby);
    assert_eq!(state.logs[0], stamped("已断开。"));
    assert!(!handle.emit(ServerEvent::Close));
}
