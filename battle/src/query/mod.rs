//! Query helpers for battle decision making
//!
//! Typing questions over the tracked state, used by the decision
//! algorithms when scoring moves and switches.

mod matchup;

pub use matchup::current_types;
