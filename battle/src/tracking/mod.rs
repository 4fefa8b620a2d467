//! Battle state tracking from server messages

mod battle;
mod updater;

pub use battle::Battle;
