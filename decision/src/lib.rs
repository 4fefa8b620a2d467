//! Decision making for Pokemon Showdown battles.
//!
//! Turns a tracked [`Battle`](showbot_battle::Battle) and its outstanding
//! request into a [`BattleDecision`](showbot_protocol::BattleDecision).
//!
//! ```text
//! showbot-protocol (wire format)
//!        │
//!        ▼
//! showbot-battle (domain types + tracking)
//!        │
//!        ▼
//! showbot-decision (choice algorithms) ← THIS CRATE
//!        │
//!        └─> showbot-client (battle sessions)
//! ```
//!
//! # Main Types
//!
//! - [`DecisionAlgorithm`] - the one contract every algorithm implements;
//!   [`RandomAlgorithm`], [`StaticAlgorithm`], [`GenericAlgorithm`] and
//!   [`DamageMaxAlgorithm`] ship with the crate
//! - [`DecisionContext`] - owned snapshot an algorithm decides from, with a
//!   [`CancelToken`] checked at every slot
//! - [`LegalChoices`] - well-formed choices per slot for a request
//! - [`DamageEstimator`], [`hit_chance`], [`SwitchEvaluator`] - scoring
//!   building blocks
//! - [`TargetResolver`] - target rules and the signed wire encoding
//! - [`Analyzer`] - derived knowledge kept alongside the battle
//!
//! # Example Usage
//!
//! ```
//! use showbot_battle::Battle;
//! use showbot_decision::{DecisionAlgorithm, DecisionContext, DecisionError, StaticAlgorithm};
//!
//! let context = DecisionContext::new(Battle::new("battle-gen9ou-1"));
//! // Nothing to answer yet
//! assert_eq!(StaticAlgorithm.decide(&context), Err(DecisionError::NoRequest));
//! ```

pub mod accuracy;
pub mod algorithms;
pub mod analyzer;
pub mod context;
pub mod damage;
pub mod dex;
mod error;
pub mod evaluate;
pub mod legal;
pub mod stats;
pub mod targeting;
pub mod view;

pub use accuracy::hit_chance;
pub use algorithms::{
    DamageMaxAlgorithm, DecisionAlgorithm, GenericAlgorithm, GenericOptions, RandomAlgorithm,
    StaticAlgorithm,
};
pub use analyzer::{Analyzer, AnalyzerKnowledge, RevealAnalyzer};
pub use context::{CancelToken, DecisionContext, DecisionHistory, HistoryEntry};
pub use damage::{DamageEstimator, DamageOptions, DamageRange, DamageUnit, StatEstimate};
pub use dex::{Dex, MoveData, SpeciesData, StaticDex};
pub use error::DecisionError;
pub use evaluate::SwitchEvaluator;
pub use legal::{ChoiceBuilder, LegalChoices};
pub use stats::{StandardStatsCalculator, StatsCalculator};
pub use targeting::{FieldPosition, MoveTarget, Relation, TargetResolver};
pub use view::Combatant;
