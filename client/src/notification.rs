//! Diagnostics reported by the session manager

use showbot_protocol::BattleDecision;

use crate::session::SessionState;

/// Error categories on the notification channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Decision,
    Lifecycle,
    Analyzer,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionNotification {
    /// A battle moved to a new lifecycle state
    Lifecycle { battle: String, state: SessionState },
    /// A decision was sent; `command` is the `/choose` line as sent
    Decision {
        battle: String,
        decision: BattleDecision,
        command: String,
    },
    Error {
        battle: Option<String>,
        kind: ErrorKind,
        message: String,
    },
}

impl SessionNotification {
    pub fn battle(&self) -> Option<&str> {
        match self {
            SessionNotification::Lifecycle { battle, .. }
            | SessionNotification::Decision { battle, .. } => Some(battle),
            SessionNotification::Error { battle, .. } => battle.as_deref(),
        }
    }
}
