//! Environment configuration.

use std::env;

/// Attorney name used for the optimistic echo when the case names none.
pub const DEFAULT_ATTORNEY_NAME: &str = "辩护代理人";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub default_attorney_name: String,
    pub log_filter: String,
    pub log_json: bool,
    pub replay_auto_respond: bool,
}

impl SessionConfig {
    pub fn from_env() -> Self {
        Self {
            default_attorney_name: env_string_opt("COURT_SESSION_ATTORNEY_NAME")
                .unwrap_or_else(|| DEFAULT_ATTORNEY_NAME.to_string()),
            log_filter: env_string_opt("COURT_SESSION_LOG")
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            log_json: env_flag("COURT_SESSION_LOG_JSON"),
            replay_auto_respond: env_flag("COURT_REPLAY_AUTO_RESPOND"),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_attorney_name: DEFAULT_ATTORNEY_NAME.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            log_json: false,
            replay_auto_respond: false,
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
