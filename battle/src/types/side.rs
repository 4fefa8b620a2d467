//! Player state: roster, active slots and side conditions

use std::collections::{BTreeMap, BTreeSet};

use showbot_protocol::{Effect, Player, PokemonDetails, PokemonIdent, to_id};

use super::conditions::SideCondition;
use super::pokemon::{ActivePokemon, GimmickUse, SidePokemon};

/// A roster member shown during team preview
#[derive(Debug, Clone, PartialEq)]
pub struct TeamPreviewPokemon {
    pub details: PokemonDetails,
    pub has_item: bool,
}

/// One player's view of the battle
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub player: Player,
    pub name: String,
    pub avatar: String,
    pub rating: Option<u32>,
    pub team_size: Option<u8>,
    pub team_preview: Vec<TeamPreviewPokemon>,
    /// Roster; a member's index never changes once assigned
    pub team: Vec<SidePokemon>,
    /// Occupants keyed by battle slot
    pub active: BTreeMap<usize, ActivePokemon>,
    pub times_fainted: u32,
    /// Side conditions keyed by condition id
    pub side_conditions: BTreeMap<String, SideCondition>,
    /// Per-battle gimmicks this player has already spent
    pub gimmicks: BTreeSet<GimmickUse>,
}

impl PlayerState {
    pub fn new(player: Player) -> Self {
        Self {
            player,
            name: String::new(),
            avatar: String::new(),
            rating: None,
            team_size: None,
            team_preview: Vec::new(),
            team: Vec::new(),
            active: BTreeMap::new(),
            times_fainted: 0,
            side_conditions: BTreeMap::new(),
            gimmicks: BTreeSet::new(),
        }
    }

    /// Find a roster member by nickname and (optionally) compatible details
    pub fn find_pokemon(&self, name: &str, details: Option<&PokemonDetails>) -> Option<usize> {
        self.team
            .iter()
            .position(|p| p.matches(name, details))
    }

    /// Find a roster member or add a newly discovered one
    pub fn find_or_insert_pokemon(&mut self, name: &str, details: &PokemonDetails) -> usize {
        if let Some(index) = self.find_pokemon(name, Some(details)) {
            return index;
        }
        let index = self.team.len();
        self.team
            .push(SidePokemon::new(index, self.player, name, details.clone()));
        index
    }

    /// Resolve an ident to a roster index.
    ///
    /// An ident with a slot prefers that slot's occupant; otherwise the
    /// roster is searched by name.
    pub fn resolve(&self, ident: &PokemonIdent) -> Option<usize> {
        if let Some(active) = ident.slot.and_then(|slot| self.active.get(&slot)) {
            let occupant = self.team.get(active.pokemon)?;
            if ident.name.is_empty() || to_id(&occupant.name) == ident.id() {
                return Some(active.pokemon);
            }
        }
        if ident.name.is_empty() {
            return None;
        }
        self.find_pokemon(&ident.name, None)
    }

    /// Active state for an ident's slot (or wherever the named pokemon is)
    pub fn active_for(&self, ident: &PokemonIdent) -> Option<&ActivePokemon> {
        let index = self.resolve(ident)?;
        self.active.values().find(|a| a.pokemon == index)
    }

    pub fn active_for_mut(&mut self, ident: &PokemonIdent) -> Option<&mut ActivePokemon> {
        let index = self.resolve(ident)?;
        self.active.values_mut().find(|a| a.pokemon == index)
    }

    /// Put a roster member into a slot, dropping the previous occupant's
    /// combat state
    pub fn switch_in(&mut self, slot: usize, index: usize, turn: u32) {
        if let Some(previous) = self.active.remove(&slot)
            && let Some(outgoing) = self.team.get_mut(previous.pokemon)
        {
            outgoing.active = false;
            outgoing.slot = None;
        }
        // The same pokemon cannot be in two slots
        self.active.retain(|_, a| a.pokemon != index);
        if let Some(incoming) = self.team.get_mut(index) {
            incoming.active = true;
            incoming.revealed = true;
            incoming.slot = Some(slot);
        }
        self.active.insert(slot, ActivePokemon::new(index, slot, turn));
    }

    /// Exchange the occupants of two slots (doubles/triples `|swap|`)
    pub fn swap_slots(&mut self, a: usize, b: usize) {
        let first = self.active.remove(&a);
        let second = self.active.remove(&b);
        for (slot, entry) in [(b, first), (a, second)] {
            if let Some(mut entry) = entry {
                entry.slot = slot;
                if let Some(pokemon) = self.team.get_mut(entry.pokemon) {
                    pokemon.slot = Some(slot);
                }
                self.active.insert(slot, entry);
            }
        }
    }

    /// Active occupants with their roster entries, ordered by slot
    pub fn active_pokemon(&self) -> impl Iterator<Item = (&ActivePokemon, &SidePokemon)> {
        self.active
            .values()
            .filter_map(|a| self.team.get(a.pokemon).map(|p| (a, p)))
    }

    /// `-sidestart`; stacking hazards gain a layer
    pub fn start_side_condition(
        &mut self,
        condition: &Effect,
        turn: u32,
        set_by: Option<PokemonIdent>,
    ) {
        match self.side_conditions.get_mut(&condition.id) {
            Some(existing) => {
                existing.add_layer();
            }
            None => {
                self.side_conditions.insert(
                    condition.id.clone(),
                    SideCondition::new(condition, turn, set_by),
                );
            }
        }
    }

    pub fn end_side_condition(&mut self, condition: &Effect) -> bool {
        self.side_conditions.remove(&condition.id).is_some()
    }

    pub fn has_hazards(&self) -> bool {
        self.side_conditions
            .values()
            .any(|c| c.kind().is_some_and(|k| k.is_hazard()))
    }

    pub fn has_screens(&self) -> bool {
        self.side_conditions
            .values()
            .any(|c| c.kind().is_some_and(|k| k.is_screen()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn side() -> PlayerState {
        let mut side = PlayerState::new(Player::P2);
        side.find_or_insert_pokemon("Garchomp", &PokemonDetails::parse("Garchomp, M"));
        side.find_or_insert_pokemon("Rotom", &PokemonDetails::parse("Rotom-Wash"));
        side.find_or_insert_pokemon("Clefable", &PokemonDetails::parse("Clefable, F"));
        side
    }

    #[test]
    fn test_find_or_insert_is_stable() {
        let mut side = side();
        let again = side.find_or_insert_pokemon("Rotom", &PokemonDetails::parse("Rotom-Wash"));
        assert_eq!(again, 1);
        assert_eq!(side.team.len(), 3);

        // Same nickname, different species: a different pokemon
        let other = side.find_or_insert_pokemon("Rotom", &PokemonDetails::parse("Rotom-Heat"));
        assert_eq!(other, 3);
        assert_eq!(side.team[3].index, 3);
    }

    #[test]
    fn test_switch_in_replaces_occupant() {
        let mut side = side();
        side.switch_in(0, 0, 1);
        if let Some(active) = side.active.get_mut(&0) {
            active.boosts.set(showbot_protocol::Stat::Atk, 2);
        }
        side.switch_in(0, 2, 3);

        assert_eq!(side.active.len(), 1);
        assert_eq!(side.active[&0].pokemon, 2);
        assert!(side.active[&0].boosts.is_clear());
        assert!(!side.team[0].active);
        assert!(side.team[2].active);
        assert_eq!(side.team[2].slot, Some(0));
    }

    #[test]
    fn test_resolve_prefers_slot() {
        let mut side = side();
        side.switch_in(1, 1, 1);
        let ident = PokemonIdent::parse("p2b: Rotom").unwrap();
        assert_eq!(side.resolve(&ident), Some(1));
        let benched = PokemonIdent::parse("p2: Clefable").unwrap();
        assert_eq!(side.resolve(&benched), Some(2));
        let unknown = PokemonIdent::parse("p2a: Zapdos").unwrap();
        assert_eq!(side.resolve(&unknown), None);
    }

    #[test]
    fn test_swap_slots() {
        let mut side = side();
        side.switch_in(0, 0, 1);
        side.switch_in(1, 1, 1);
        side.swap_slots(0, 1);
        assert_eq!(side.active[&0].pokemon, 1);
        assert_eq!(side.active[&1].pokemon, 0);
        assert_eq!(side.team[0].slot, Some(1));
        assert_eq!(side.active[&1].slot, 1);
    }

    #[test]
    fn test_side_conditions() {
        let mut side = side();
        let spikes = Effect::parse("Spikes");
        side.start_side_condition(&spikes, 1, None);
        side.start_side_condition(&spikes, 2, None);
        assert_eq!(side.side_conditions["spikes"].layers, 2);
        assert!(side.has_hazards());
        assert!(!side.has_screens());

        assert!(side.end_side_condition(&spikes));
        assert!(!side.has_hazards());
    }
}
