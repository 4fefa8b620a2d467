//! Battle state reconstruction for Pokemon Showdown.
//!
//! Folds the typed events produced by `showbot-protocol` into a [`Battle`]:
//! who is on the field, what is known about every roster member, and the
//! side and field conditions in play.
//!
//! ```text
//! showbot-protocol (wire format)
//!        │
//!        ▼
//! showbot-battle (domain types + tracking) ← THIS CRATE
//!        │
//!        ├─> showbot-decision (choice algorithms)
//!        └─> showbot-client (battle sessions)
//! ```
//!
//! # Main Types
//!
//! - [`Battle`] - the tracked aggregate; feed it with [`Battle::apply_event`]
//! - [`PlayerState`] - one player's roster, active slots and side conditions
//! - [`SidePokemon`] / [`ActivePokemon`] - what is known about a roster member
//!   and the combat state of whatever occupies a slot
//! - [`BattleGlobalStatus`] - generation, rules, weather and field conditions
//! - [`Type`], [`Status`], [`Volatile`], [`StatStages`] - domain vocabulary
//!
//! # Example Usage
//!
//! ```
//! use showbot_battle::Battle;
//! use showbot_protocol::parse_battle_line;
//!
//! let mut battle = Battle::new("battle-gen9ou-1");
//! for line in ["|gametype|singles", "|switch|p2a: Dragonite|Dragonite, M|100/100", "|turn|1"] {
//!     if let Ok(Some(event)) = parse_battle_line(line) {
//!         battle.apply_event(&event);
//!     }
//! }
//! assert_eq!(battle.turn, 1);
//! assert_eq!(battle.all_active().count(), 1);
//! ```

pub mod query;
pub mod tracking;
pub mod types;

pub use tracking::Battle;
pub use types::{
    ActivePokemon, BattleGlobalCondition, BattleGlobalStatus, GimmickUse, ItemLoss,
    LATEST_GENERATION, MoveKnowledge, PlayerState, SideCondition, SideConditionKind, SidePokemon,
    StatKnowledge, StatRange, StatStages, Status, TYPE_CHART, Terrain, TraitKnowledge, Type,
    Volatile, VolatileData, Weather,
};

pub use showbot_protocol::{GameType, Player, Stat};
