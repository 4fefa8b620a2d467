//! Battle sessions for Pokemon Showdown bots.
//!
//! Feeds protocol frames into per-battle [`BattleSession`]s, waits for each
//! burst of events to settle and answers the outstanding request with the
//! configured [`DecisionAlgorithm`](showbot_decision::DecisionAlgorithm).
//!
//! ```text
//! showbot-protocol (wire format)
//!        │
//!        ▼
//! showbot-battle (domain types + tracking)
//!        │
//!        ▼
//! showbot-decision (choice algorithms)
//!        │
//!        └─> showbot-client (battle sessions) ← THIS CRATE
//! ```
//!
//! # Main Types
//!
//! - [`SessionManager`] - task owning every session: debounce timers,
//!   single-flight cancellable decisions, teardown
//! - [`SessionHandle`] - cloneable input side of a running manager
//! - [`SessionConfig`] / [`ManagerOptions`] - per-format algorithm and
//!   analyzer choice, manager-wide tuning
//! - [`SessionNotification`] - lifecycle changes, decisions sent and errors
//!
//! # Example Usage
//!
//! ```
//! use std::sync::Arc;
//!
//! use showbot_client::{ManagerOptions, SessionConfig, SessionManager, fixed};
//! use showbot_decision::RandomAlgorithm;
//! use tokio::sync::mpsc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> anyhow::Result<()> {
//! let (outbound, mut choices) = mpsc::unbounded_channel();
//! let (notifications, _events) = mpsc::unbounded_channel();
//! let configure = fixed(SessionConfig::new(Arc::new(RandomAlgorithm::from_entropy())));
//! let (handle, manager) =
//!     SessionManager::spawn(ManagerOptions::default(), configure, outbound, notifications);
//!
//! handle.feed_frame(">battle-gen9randombattle-1\n|init|battle\n|gametype|singles")?;
//! // Choices arrive on `choices` as `ClientMessage`s ready for the socket
//! drop(handle);
//! manager.await?;
//! assert!(choices.try_recv().is_err());
//! # Ok(())
//! # }
//! ```

pub mod config;
mod error;
pub mod format;
mod handle;
mod manager;
pub mod notification;
pub mod session;

pub use config::{
    AnalyzerFactory, Configure, DEFAULT_HISTORY_DEPTH, ManagerOptions, SessionConfig, fixed,
};
pub use error::SessionError;
pub use format::{FormatDetails, FormatEntry, FormatTable};
pub use handle::SessionHandle;
pub use manager::SessionManager;
pub use notification::{ErrorKind, SessionNotification};
pub use session::{BattleSession, SessionSnapshot, SessionState};

pub use showbot_protocol::{ClientCommand, ClientMessage};
