//! Roster knowledge and on-field combat state

use std::collections::{BTreeMap, BTreeSet};

use showbot_protocol::{HpCondition, Player, PokemonDetails, PokemonIdent, to_id};

use super::pokemon_type::Type;
use super::stats::{StatKnowledge, StatStages};
use super::status::{Status, Volatile, VolatileData};

/// Knowledge about a single-valued trait (item or ability).
///
/// `revealed` means the server showed it; `locked` means it came from our own
/// request and inference must never overwrite it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraitKnowledge {
    pub id: Option<String>,
    pub name: Option<String>,
    pub revealed: bool,
    pub locked: bool,
}

impl TraitKnowledge {
    pub fn is_known(&self) -> bool {
        self.id.is_some()
    }

    /// Record a deduction; ignored once the value is revealed or locked
    pub fn infer(&mut self, name: &str) {
        if !self.revealed && !self.locked {
            self.set(name);
        }
    }

    /// Record a value the server explicitly showed
    pub fn reveal(&mut self, name: &str) {
        if !self.locked {
            self.set(name);
        }
        self.revealed = true;
    }

    /// Authoritative value from a request
    pub fn lock(&mut self, name: &str) {
        self.set(name);
        self.locked = true;
    }

    fn set(&mut self, name: &str) {
        self.id = Some(to_id(name));
        self.name = Some(name.to_string());
    }

    /// Whether the known value is `id`
    pub fn is(&self, id: &str) -> bool {
        self.id.as_deref() == Some(id)
    }
}

/// How a held item went away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemLoss {
    /// Eaten or used up by its own effect
    Consumed,
    /// Knocked off, stolen or burned
    Removed,
}

/// Per-battle special actions that can be observed on a pokemon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GimmickUse {
    Mega,
    Primal,
    UltraBurst,
    ZMove,
    Dynamax,
    Terastallize,
}

/// A known move and its PP
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveKnowledge {
    pub id: String,
    pub name: String,
    pub pp: Option<u32>,
    pub max_pp: Option<u32>,
    /// Seen used in battle (as opposed to only listed in our request)
    pub revealed: bool,
    pub disabled: bool,
}

impl MoveKnowledge {
    pub fn new(name: &str) -> Self {
        Self {
            id: to_id(name),
            name: name.to_string(),
            pp: None,
            max_pp: None,
            revealed: false,
            disabled: false,
        }
    }
}

/// Persistent knowledge about one roster member.
///
/// `index` is the position in the player's team and never changes.
#[derive(Debug, Clone, PartialEq)]
pub struct SidePokemon {
    pub index: usize,
    pub player: Player,
    pub name: String,
    /// Seen on the field (or in our own request)
    pub revealed: bool,
    pub active: bool,
    pub slot: Option<usize>,
    pub details: PokemonDetails,
    pub condition: HpCondition,
    pub stats: Option<StatKnowledge>,
    /// Known moves by id
    pub moves: BTreeMap<String, MoveKnowledge>,
    pub item: TraitKnowledge,
    pub ability: TraitKnowledge,
    pub item_loss: Option<ItemLoss>,
    /// Last item held before it was lost (Recycle, Harvest)
    pub lost_item: Option<String>,
    pub terastallized: Option<Type>,
    pub gimmick: Option<GimmickUse>,
}

impl SidePokemon {
    pub fn new(index: usize, player: Player, name: &str, details: PokemonDetails) -> Self {
        Self {
            index,
            player,
            name: name.to_string(),
            revealed: false,
            active: false,
            slot: None,
            details,
            condition: HpCondition {
                hp: 100,
                max_hp: 100,
                status: None,
                fainted: false,
            },
            stats: None,
            moves: BTreeMap::new(),
            item: TraitKnowledge::default(),
            ability: TraitKnowledge::default(),
            item_loss: None,
            lost_item: None,
            terastallized: None,
            gimmick: None,
        }
    }

    /// Ident as the server would write it for this pokemon
    pub fn ident(&self) -> PokemonIdent {
        PokemonIdent::new(self.player, self.slot, self.name.clone())
    }

    /// Same nickname and compatible details
    pub fn matches(&self, name: &str, details: Option<&PokemonDetails>) -> bool {
        to_id(&self.name) == to_id(name) && details.is_none_or(|d| self.details.matches(d))
    }

    pub fn species_id(&self) -> String {
        self.details.species_id()
    }

    pub fn status(&self) -> Option<Status> {
        self.condition.status.as_deref().and_then(Status::parse)
    }

    pub fn is_fainted(&self) -> bool {
        self.condition.fainted
    }

    /// HP as a percent of max, whatever scale the server used
    pub fn hp_percent(&self) -> f64 {
        self.condition.percent()
    }

    /// Apply an HP condition line; a missing status clears the old one
    pub fn set_condition(&mut self, condition: &HpCondition) {
        self.condition = condition.clone();
    }

    pub fn set_status(&mut self, status: Option<&str>) {
        self.condition.status = status.map(str::to_string);
    }

    pub fn faint(&mut self) {
        self.condition.hp = 0;
        self.condition.fainted = true;
        self.condition.status = None;
    }

    /// Record a move seen in battle and deduct PP if it is tracked
    pub fn use_move(&mut self, name: &str, deduct_pp: bool) {
        let entry = self
            .moves
            .entry(to_id(name))
            .or_insert_with(|| MoveKnowledge::new(name));
        entry.revealed = true;
        if deduct_pp && let Some(pp) = entry.pp.as_mut() {
            *pp = pp.saturating_sub(1);
        }
    }

    pub fn lose_item(&mut self, item: &str, loss: ItemLoss) {
        self.item.reveal(item);
        self.lost_item = Some(item.to_string());
        self.item.id = Some(String::new());
        self.item.name = None;
        self.item_loss = Some(loss);
    }

    /// Item currently held, if known and not lost
    pub fn held_item(&self) -> Option<&str> {
        self.item.id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Combat state of a pokemon occupying a battle slot.
///
/// Created on switch-in and dropped when another pokemon takes the slot;
/// fainting alone does not remove it.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivePokemon {
    /// Index into the owning player's team
    pub pokemon: usize,
    pub slot: usize,
    pub boosts: StatStages,
    pub volatiles: BTreeSet<Volatile>,
    pub volatile_data: BTreeMap<Volatile, VolatileData>,
    /// Effect ids lasting until end of turn (Protect, Roost...)
    pub single_turn: BTreeSet<String>,
    /// Effect ids lasting until the next move (Destiny Bond, Grudge...)
    pub single_move: BTreeSet<String>,
    pub last_move: Option<String>,
    /// Consecutive uses of `last_move`
    pub move_repeat: u32,
    pub hit_count: u32,
    pub switched_in_turn: u32,
    /// Temporary forme from `-formechange`
    pub forme: Option<String>,
    /// Temporary ability (Trace, Skill Swap); an empty string means suppressed
    pub ability_override: Option<String>,
}

impl ActivePokemon {
    pub fn new(pokemon: usize, slot: usize, turn: u32) -> Self {
        Self {
            pokemon,
            slot,
            boosts: StatStages::new(),
            volatiles: BTreeSet::new(),
            volatile_data: BTreeMap::new(),
            single_turn: BTreeSet::new(),
            single_move: BTreeSet::new(),
            last_move: None,
            move_repeat: 0,
            hit_count: 0,
            switched_in_turn: turn,
            forme: None,
            ability_override: None,
        }
    }

    pub fn has_volatile(&self, volatile: &Volatile) -> bool {
        self.volatiles.contains(volatile)
    }

    pub fn add_volatile(&mut self, volatile: Volatile, data: Option<VolatileData>) {
        match data {
            Some(data) => {
                self.volatile_data.insert(volatile.clone(), data);
            }
            None => {
                self.volatile_data.remove(&volatile);
            }
        }
        self.volatiles.insert(volatile);
    }

    pub fn remove_volatile(&mut self, volatile: &Volatile) -> bool {
        self.volatile_data.remove(volatile);
        self.volatiles.remove(volatile)
    }

    pub fn volatile_data(&self, volatile: &Volatile) -> Option<&VolatileData> {
        self.volatile_data.get(volatile)
    }

    /// Types forced by Soak, Burn Up and friends, if any
    pub fn type_override(&self) -> Option<&[Type]> {
        match self.volatile_data.get(&Volatile::TypeChange) {
            Some(VolatileData::TypeChange { types }) => Some(types),
            _ => None,
        }
    }

    /// Type added by Forest's Curse or Trick-or-Treat
    pub fn added_type(&self) -> Option<Type> {
        match self.volatile_data.get(&Volatile::TypeAdd) {
            Some(VolatileData::TypeAdd { added }) => Some(*added),
            _ => None,
        }
    }

    /// Record a move and track consecutive uses
    pub fn record_move(&mut self, move_id: &str) {
        if self.last_move.as_deref() == Some(move_id) {
            self.move_repeat += 1;
        } else {
            self.last_move = Some(move_id.to_string());
            self.move_repeat = 1;
        }
        self.hit_count = 0;
        self.single_move.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pokemon() -> SidePokemon {
        SidePokemon::new(
            0,
            Player::P1,
            "Toxapex",
            PokemonDetails::parse("Toxapex, F"),
        )
    }

    #[test]
    fn test_trait_knowledge_precedence() {
        let mut item = TraitKnowledge::default();
        item.infer("Leftovers");
        assert!(item.is("leftovers"));
        assert!(!item.revealed);

        item.reveal("Black Sludge");
        item.infer("Rocky Helmet");
        assert!(item.is("blacksludge"));

        let mut ability = TraitKnowledge::default();
        ability.lock("Regenerator");
        ability.reveal("Mummy");
        assert!(ability.is("regenerator"));
        assert!(ability.revealed);
    }

    #[test]
    fn test_use_move_deducts_tracked_pp() {
        let mut pex = pokemon();
        pex.use_move("Recover", true);
        assert_eq!(pex.moves["recover"].pp, None);
        if let Some(recover) = pex.moves.get_mut("recover") {
            recover.pp = Some(8);
        }
        pex.use_move("Recover", true);
        assert_eq!(pex.moves["recover"].pp, Some(7));
        assert!(pex.moves["recover"].revealed);
    }

    #[test]
    fn test_lose_item() {
        let mut pex = pokemon();
        pex.lose_item("Sitrus Berry", ItemLoss::Consumed);
        assert_eq!(pex.held_item(), None);
        assert_eq!(pex.lost_item.as_deref(), Some("Sitrus Berry"));
        assert_eq!(pex.item_loss, Some(ItemLoss::Consumed));
        assert!(pex.item.revealed);
    }

    #[test]
    fn test_faint_clears_status() {
        let mut pex = pokemon();
        pex.set_status(Some("tox"));
        assert_eq!(pex.status(), Some(Status::BadPoison));
        pex.faint();
        assert!(pex.is_fainted());
        assert_eq!(pex.status(), None);
    }

    #[test]
    fn test_move_repeat_counter() {
        let mut active = ActivePokemon::new(0, 0, 1);
        active.single_move.insert("destinybond".to_string());
        active.record_move("protect");
        active.record_move("protect");
        assert_eq!(active.move_repeat, 2);
        assert!(active.single_move.is_empty());
        active.record_move("toxic");
        assert_eq!(active.move_repeat, 1);
    }

    #[test]
    fn test_volatile_payload_follows_volatile() {
        let mut active = ActivePokemon::new(0, 0, 1);
        active.add_volatile(
            Volatile::TypeChange,
            Some(VolatileData::TypeChange {
                types: vec![Type::Water],
            }),
        );
        assert_eq!(active.type_override(), Some(&[Type::Water][..]));
        assert!(active.remove_volatile(&Volatile::TypeChange));
        assert_eq!(active.type_override(), None);
    }
}
