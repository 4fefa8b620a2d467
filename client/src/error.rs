use showbot_decision::DecisionError;
use thiserror::Error;

use crate::notification::ErrorKind;

/// Failures inside a battle session. None of them stop the manager.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Line could not be parsed: {0}")]
    Parse(#[from] showbot_protocol::ParseError),

    #[error("Decision failed: {0}")]
    Decision(#[from] DecisionError),

    #[error("Lifecycle failure: {0:#}")]
    Lifecycle(anyhow::Error),

    #[error("Analyzer failure: {0:#}")]
    Analyzer(anyhow::Error),

    #[error("Session manager stopped")]
    Disconnected,
}

impl SessionError {
    /// Category reported on the notification channel
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Parse(_) => ErrorKind::Parse,
            SessionError::Decision(_) => ErrorKind::Decision,
            SessionError::Analyzer(_) => ErrorKind::Analyzer,
            SessionError::Lifecycle(_) | SessionError::Disconnected => ErrorKind::Lifecycle,
        }
    }
}
