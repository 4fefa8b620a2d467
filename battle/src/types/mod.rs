//! Domain types for battle state tracking

mod conditions;
mod field;
mod pokemon;
mod pokemon_type;
mod side;
mod stats;
mod status;

pub use conditions::{BattleGlobalCondition, SideCondition, SideConditionKind, Terrain, Weather};
pub use field::{BattleGlobalStatus, LATEST_GENERATION};
pub use pokemon::{
    ActivePokemon, GimmickUse, ItemLoss, MoveKnowledge, SidePokemon, TraitKnowledge,
};
pub use pokemon_type::{TYPE_CHART, Type};
pub use side::{PlayerState, TeamPreviewPokemon};
pub use stats::{StatKnowledge, StatRange, StatStages};
pub use status::{Status, Volatile, VolatileData};
