//! Name classification tables for speakers, nodes and phases.
//!
//! The backend's naming conventions live here as data. Adding a new speaker
//! title or node name is a table edit.

use std::sync::OnceLock;

use regex::Regex;

use crate::store::state::{ActiveNode, Role, TrialPhase, SYSTEM_NAME};

/// Speaker-name prefixes in match order. The first prefix that matches wins.
pub const SPEAKER_PREFIXES: &[(&str, Role)] = &[
    ("书记员", Role::Clerk),
    ("审判长", Role::Judge),
    ("法官", Role::Judge),
    ("公诉人", Role::Prosecutor),
    ("检察员", Role::Prosecutor),
    ("被告人", Role::Defense),
    ("被告", Role::Defense),
    ("辩护人", Role::Defense),
    ("辩护代理人", Role::Defense),
    ("辩护", Role::Defense),
];

/// Node-name substrings in match order. `pros_focus` resolves to the
/// prosecutor because `pros` is checked before `focus`.
pub const NODE_KEYWORDS: &[(&str, ActiveNode)] = &[
    ("pros", ActiveNode::Prosecutor),
    ("prosecutor", ActiveNode::Prosecutor),
    ("defense", ActiveNode::Defense),
    ("defendant", ActiveNode::Defense),
    ("judge", ActiveNode::Judge),
    ("focus", ActiveNode::Judge),
    ("verdict", ActiveNode::Judge),
    ("clerk", ActiveNode::Clerk),
];

/// Phase label of every node in the courtroom graph.
pub const NODE_PHASES: &[(&str, &str)] = &[
    ("clerk_rules", "开庭阶段"),
    ("judge_open", "开庭阶段"),
    ("judge_check", "开庭阶段"),
    ("right_notify", "开庭阶段"),
    ("pros_indictment", "开庭阶段"),
    ("defense_defense_object_control", "开庭阶段"),
    ("defense_objection", "开庭阶段"),
    ("pros_question", "法庭调查"),
    ("defense_reply", "法庭调查"),
    ("defense_question_control", "法庭调查"),
    ("defense_question", "法庭调查"),
    ("pros_summary", "法庭调查"),
    ("defense_summary", "法庭调查"),
    ("judge_start_evidence", "法庭调查"),
    ("pros_evidence_decision", "法庭调查"),
    ("pros_show_evidence", "法庭调查"),
    ("defense_cross", "法庭调查"),
    ("judge_confirm", "法庭调查"),
    ("defense_evidence_control", "法庭调查"),
    ("defense_show_evidence", "法庭调查"),
    ("pros_cross", "法庭调查"),
    ("judge_start_debate", "法庭辩论"),
    ("pros_statement", "法庭辩论"),
    ("defense_self_statement", "法庭辩论"),
    ("defense_statement", "法庭辩论"),
    ("judge_summary", "法庭辩论"),
    ("focus", "法庭辩论"),
    ("pros_focus", "法庭辩论"),
    ("defense_focus", "法庭辩论"),
    ("pros_sumup", "法庭辩论"),
    ("defense_sumup", "法庭辩论"),
    ("defense_final_statement", "法庭辩论"),
    ("judge_verdict", "宣判阶段"),
];

/// Titles recognised in a `<title>...：` header when a line has no speaker name.
const HEADER_TITLES: &[&str] = &["审判长", "公诉人", "被告人", "辩护人", "书记员"];

/// Infers the display role of a transcript line from its wire speaker name.
pub fn classify_speaker(name: Option<&str>) -> Role {
    let Some(name) = name.filter(|name| !name.is_empty()) else {
        return Role::System;
    };

    SPEAKER_PREFIXES
        .iter()
        .find(|(prefix, _)| name.starts_with(prefix))
        .map_or(Role::System, |(_, role)| *role)
}

/// Maps a node name to the participant currently on stage.
pub fn classify_node(node_name: &str) -> ActiveNode {
    NODE_KEYWORDS
        .iter()
        .find(|(keyword, _)| node_name.contains(keyword))
        .map_or(ActiveNode::Standby, |(_, node)| *node)
}

/// Looks up the phase of a known node.
pub fn phase_for_node(node_name: &str) -> Option<TrialPhase> {
    NODE_PHASES
        .iter()
        .find(|(node, _)| *node == node_name)
        .map(|(_, label)| TrialPhase::from_label(label))
}

/// Phase for a node-executed event: the table wins, then the server's label.
pub fn resolve_phase(node_name: &str, reported: Option<&str>) -> Option<TrialPhase> {
    phase_for_node(node_name).or_else(|| {
        reported
            .filter(|label| !label.is_empty())
            .map(TrialPhase::from_label)
    })
}

fn header_regexes() -> &'static [Regex] {
    static CACHED: OnceLock<Vec<Regex>> = OnceLock::new();
    CACHED.get_or_init(|| {
        HEADER_TITLES
            .iter()
            .map(|title| {
                Regex::new(&format!("^({title}[^：:]*)[：:]"))
                    .expect("speaker header regex must compile")
            })
            .collect()
    })
}

/// Display name for a transcript line. Uses `name` when present, otherwise a
/// leading speaker header in `content`, otherwise `System`.
pub fn extract_speaker_name(content: &str, name: Option<&str>) -> String {
    if let Some(name) = name.filter(|name| !name.is_empty()) {
        return name.to_string();
    }

    header_regexes()
        .iter()
        .find_map(|regex| regex.captures(content))
        .and_then(|captures| captures.get(1))
        .map_or_else(|| SYSTEM_NAME.to_string(), |found| found.as_str().to_string())
}
