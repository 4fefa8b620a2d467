//! Battle-wide status: format metadata and field conditions

use std::collections::{BTreeMap, BTreeSet};

use showbot_protocol::{Effect, GameType, PokemonIdent, to_id};

use super::conditions::{BattleGlobalCondition, Terrain, Weather};

/// Generation assumed until a `|gen|` line arrives
pub const LATEST_GENERATION: u8 = 9;

/// Abilities whose presence changes the whole field while their holder is out
const GLOBAL_ABILITIES: [&str; 5] = [
    "neutralizinggas",
    "fairyaura",
    "darkaura",
    "aurabreak",
    "cloudnine",
];

/// Global battle status
#[derive(Debug, Clone, PartialEq)]
pub struct BattleGlobalStatus {
    pub generation: u8,
    pub game_type: GameType,
    pub tier: String,
    pub rated: bool,
    /// Rule names (the part before ':' in `|rule|`)
    pub rules: BTreeSet<String>,
    pub sleep_clause: bool,
    /// Inverse battle: type effectiveness is reversed
    pub inverse: bool,
    pub team_preview: bool,
    pub team_preview_size: Option<u8>,
    /// At most one weather at a time
    pub weather: Option<BattleGlobalCondition>,
    /// Terrains, rooms, gravity... keyed by condition id
    pub field_conditions: BTreeMap<String, BattleGlobalCondition>,
    /// Ability ids currently affecting the field
    pub ability_effects: BTreeSet<String>,
}

impl Default for BattleGlobalStatus {
    fn default() -> Self {
        Self {
            generation: LATEST_GENERATION,
            game_type: GameType::Singles,
            tier: String::new(),
            rated: false,
            rules: BTreeSet::new(),
            sleep_clause: false,
            inverse: false,
            team_preview: false,
            team_preview_size: None,
            weather: None,
            field_conditions: BTreeMap::new(),
            ability_effects: BTreeSet::new(),
        }
    }
}

impl BattleGlobalStatus {
    /// Active slots per player under the current game type
    pub fn active_size(&self) -> usize {
        self.game_type.active_size()
    }

    /// Record a `|rule|NAME: description` line
    pub fn apply_rule(&mut self, rule: &str) {
        let name = rule.split(':').next().unwrap_or(rule).trim();
        match to_id(name).as_str() {
            "sleepclausemod" | "sleepclause" => self.sleep_clause = true,
            "inversemod" => self.inverse = true,
            _ => {}
        }
        self.rules.insert(name.to_string());
    }

    pub fn has_rule(&self, rule: &str) -> bool {
        let id = to_id(rule);
        self.rules.iter().any(|r| to_id(r) == id)
    }

    /// `-weather|NAME`: "none" clears, `[upkeep]` keeps the existing entry
    pub fn set_weather(
        &mut self,
        name: &str,
        upkeep: bool,
        turn: u32,
        set_by: Option<PokemonIdent>,
    ) {
        let effect = Effect::parse(name);
        if effect.id.is_empty() || effect.id == "none" {
            self.weather = None;
            return;
        }
        if upkeep && self.weather.as_ref().is_some_and(|w| w.id == effect.id) {
            return;
        }
        self.weather = Some(BattleGlobalCondition::new(&effect, turn, set_by));
    }

    pub fn weather_kind(&self) -> Option<Weather> {
        self.weather.as_ref().and_then(|w| Weather::parse(&w.id))
    }

    /// `-fieldstart`; a new terrain replaces the old one
    pub fn start_field(&mut self, effect: &Effect, turn: u32, set_by: Option<PokemonIdent>) {
        if Terrain::parse(&effect.id).is_some() {
            self.field_conditions
                .retain(|id, _| Terrain::parse(id).is_none());
        }
        self.field_conditions.insert(
            effect.id.clone(),
            BattleGlobalCondition::new(effect, turn, set_by),
        );
    }

    pub fn end_field(&mut self, effect: &Effect) -> bool {
        self.field_conditions.remove(&effect.id).is_some()
    }

    pub fn has_field(&self, id: &str) -> bool {
        self.field_conditions.contains_key(id)
    }

    pub fn terrain(&self) -> Option<Terrain> {
        self.field_conditions.keys().find_map(|id| Terrain::parse(id))
    }

    pub fn trick_room(&self) -> bool {
        self.has_field("trickroom")
    }

    /// Note an ability reveal; only field-wide abilities are kept
    pub fn note_ability(&mut self, ability_id: &str) {
        if GLOBAL_ABILITIES.contains(&ability_id) {
            self.ability_effects.insert(ability_id.to_string());
        }
    }

    pub fn clear_ability(&mut self, ability_id: &str) {
        self.ability_effects.remove(ability_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules() {
        let mut status = BattleGlobalStatus::default();
        status.apply_rule("Sleep Clause Mod: Limit one foe put to sleep");
        status.apply_rule("Inverse Mod: Type chart is inverted");
        assert!(status.sleep_clause);
        assert!(status.inverse);
        assert!(status.has_rule("sleep clause mod"));
        assert!(!status.has_rule("Species Clause"));
    }

    #[test]
    fn test_single_weather() {
        let mut status = BattleGlobalStatus::default();
        status.set_weather("RainDance", false, 1, None);
        status.set_weather("RainDance", true, 2, None);
        assert_eq!(status.weather.as_ref().map(|w| w.turn), Some(1));

        status.set_weather("Sandstorm", false, 3, None);
        assert_eq!(status.weather_kind(), Some(Weather::Sand));

        status.set_weather("none", false, 4, None);
        assert!(status.weather.is_none());
    }

    #[test]
    fn test_terrain_replaces_terrain() {
        let mut status = BattleGlobalStatus::default();
        status.start_field(&Effect::parse("move: Electric Terrain"), 1, None);
        status.start_field(&Effect::parse("move: Trick Room"), 1, None);
        status.start_field(&Effect::parse("move: Psychic Terrain"), 2, None);

        assert_eq!(status.terrain(), Some(Terrain::Psychic));
        assert!(status.trick_room());
        assert_eq!(status.field_conditions.len(), 2);

        assert!(status.end_field(&Effect::parse("move: Trick Room")));
        assert!(!status.trick_room());
    }

    #[test]
    fn test_active_size_follows_game_type() {
        let mut status = BattleGlobalStatus::default();
        assert_eq!(status.active_size(), 1);
        status.game_type = GameType::Triples;
        assert_eq!(status.active_size(), 3);
        status.game_type = GameType::Multi;
        assert_eq!(status.active_size(), 1);
    }
}
