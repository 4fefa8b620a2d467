use thiserror::Error;

/// Why a decision could not be produced
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecisionError {
    #[error("No request to answer")]
    NoRequest,

    #[error("No legal choice for slot {0}")]
    NoLegalChoice(usize),

    #[error("Decision cancelled")]
    Cancelled,

    #[error("Algorithm failed: {0}")]
    Algorithm(String),

    #[error("Decision has {got} choices but the request needs {expected}")]
    SlotMismatch { expected: usize, got: usize },
}
