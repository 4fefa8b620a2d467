//! Read-only views over tracked pokemon

use showbot_battle::query::current_types;
use showbot_battle::{ActivePokemon, Battle, PlayerState, SidePokemon, StatStages, Type, Volatile};

use crate::dex::Dex;

/// A pokemon as the estimators see it: roster knowledge plus, when it is
/// on the field, its slot state and side
#[derive(Debug, Clone, Copy)]
pub struct Combatant<'a> {
    pub pokemon: &'a SidePokemon,
    pub active: Option<&'a ActivePokemon>,
    pub side: Option<&'a PlayerState>,
}

impl<'a> Combatant<'a> {
    /// A benched or previewed pokemon with no slot state
    pub fn new(pokemon: &'a SidePokemon) -> Self {
        Self {
            pokemon,
            active: None,
            side: None,
        }
    }

    pub fn on_field(side: &'a PlayerState, active: &'a ActivePokemon) -> Option<Self> {
        Some(Self {
            pokemon: side.team.get(active.pokemon)?,
            active: Some(active),
            side: Some(side),
        })
    }

    /// A roster member of `side`, with slot state if it is out
    pub fn of(side: &'a PlayerState, pokemon: &'a SidePokemon) -> Self {
        Self {
            pokemon,
            active: side.active.values().find(|a| a.pokemon == pokemon.index),
            side: Some(side),
        }
    }

    pub fn boosts(&self) -> StatStages {
        self.active.map(|a| a.boosts).unwrap_or_default()
    }

    /// Effective ability id; `None` when unknown or suppressed
    pub fn ability(&self) -> Option<&'a str> {
        if let Some(shown) = self.active.and_then(|a| a.ability_override.as_deref()) {
            return (!shown.is_empty()).then_some(shown);
        }
        self.pokemon.ability.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn has_ability(&self, id: &str) -> bool {
        self.ability()
            .is_some_and(|ability| showbot_protocol::to_id(ability) == id)
    }

    pub fn item(&self) -> Option<&'a str> {
        self.pokemon.held_item()
    }

    pub fn has_volatile(&self, volatile: &Volatile) -> bool {
        self.active.is_some_and(|a| a.has_volatile(volatile))
    }

    /// Current typing; empty when the species is unknown to the dex
    pub fn types(&self, dex: &dyn Dex) -> Vec<Type> {
        let species = self
            .active
            .and_then(|a| a.forme.as_deref())
            .unwrap_or(&self.pokemon.details.species);
        let base = dex
            .species_or_base(species)
            .map(|s| s.types.to_vec())
            .unwrap_or_default();
        current_types(self.pokemon, self.active, &base)
    }
}

/// Every occupied slot of the given players, ordered by slot
pub fn active_combatants<'a>(
    players: impl Iterator<Item = &'a PlayerState>,
) -> Vec<Combatant<'a>> {
    players
        .flat_map(|side| {
            side.active
                .values()
                .filter_map(move |active| Combatant::on_field(side, active))
        })
        .collect()
}

/// Opposing pokemon still standing on the field
pub fn opposing_active(battle: &Battle) -> Vec<Combatant<'_>> {
    active_combatants(battle.opponents())
        .into_iter()
        .filter(|c| !c.pokemon.is_fainted())
        .collect()
}

#[cfg(test)]
mod tests {
    use showbot_battle::Player;
    use showbot_protocol::parse_battle_line;

    use super::*;

    #[test]
    fn test_free_for_all_opposes_every_other_player() {
        let mut battle = Battle::new("battle-gen9freeforallrandombattle-1");
        for line in [
            "|gametype|freeforall",
            "|switch|p1a: Garchomp|Garchomp, M|100/100",
            "|switch|p2a: Heatran|Heatran, M|100/100",
            "|switch|p3a: Gengar|Gengar, M|100/100",
            "|switch|p4a: Clefable|Clefable, F|100/100",
        ] {
            let event = parse_battle_line(line).unwrap().unwrap();
            battle.apply_event(&event);
        }
        battle.set_main_player(Player::P1);

        let foes: Vec<&str> = opposing_active(&battle)
            .iter()
            .map(|c| c.pokemon.name.as_str())
            .collect();
        assert_eq!(foes, vec!["Heatran", "Gengar", "Clefable"]);
    }
}
