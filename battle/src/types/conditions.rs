//! Weather, terrain, field and side conditions

use showbot_protocol::{Effect, PokemonIdent, to_id};

/// Weather kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weather {
    Sun,
    Rain,
    Sand,
    Hail,
    Snow,
    /// Desolate Land
    HarshSun,
    /// Primordial Sea
    HeavyRain,
    /// Delta Stream
    StrongWinds,
}

impl Weather {
    /// Parse a `-weather` argument ("SunnyDay", "RainDance", "none")
    pub fn parse(s: &str) -> Option<Self> {
        match to_id(s).as_str() {
            "sunnyday" => Some(Weather::Sun),
            "raindance" => Some(Weather::Rain),
            "sandstorm" => Some(Weather::Sand),
            "hail" => Some(Weather::Hail),
            "snow" | "snowscape" => Some(Weather::Snow),
            "desolateland" => Some(Weather::HarshSun),
            "primordialsea" => Some(Weather::HeavyRain),
            "deltastream" => Some(Weather::StrongWinds),
            _ => None,
        }
    }

    /// Primal weather cannot be replaced by ordinary weather
    pub fn is_primal(&self) -> bool {
        matches!(
            self,
            Weather::HarshSun | Weather::HeavyRain | Weather::StrongWinds
        )
    }
}

/// Terrain kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terrain {
    Electric,
    Grassy,
    Misty,
    Psychic,
}

impl Terrain {
    pub fn parse(s: &str) -> Option<Self> {
        match to_id(s.strip_prefix("move:").unwrap_or(s)).as_str() {
            "electricterrain" => Some(Terrain::Electric),
            "grassyterrain" => Some(Terrain::Grassy),
            "mistyterrain" => Some(Terrain::Misty),
            "psychicterrain" => Some(Terrain::Psychic),
            _ => None,
        }
    }
}

/// Classification of well-known side conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SideConditionKind {
    Reflect,
    LightScreen,
    AuroraVeil,
    Spikes,
    ToxicSpikes,
    StealthRock,
    StickyWeb,
    Tailwind,
    Safeguard,
    Mist,
    LuckyChant,
}

impl SideConditionKind {
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "reflect" => Some(SideConditionKind::Reflect),
            "lightscreen" => Some(SideConditionKind::LightScreen),
            "auroraveil" => Some(SideConditionKind::AuroraVeil),
            "spikes" => Some(SideConditionKind::Spikes),
            "toxicspikes" => Some(SideConditionKind::ToxicSpikes),
            "stealthrock" => Some(SideConditionKind::StealthRock),
            "stickyweb" => Some(SideConditionKind::StickyWeb),
            "tailwind" => Some(SideConditionKind::Tailwind),
            "safeguard" => Some(SideConditionKind::Safeguard),
            "mist" => Some(SideConditionKind::Mist),
            "luckychant" => Some(SideConditionKind::LuckyChant),
            _ => None,
        }
    }

    pub fn max_layers(&self) -> u8 {
        match self {
            SideConditionKind::Spikes => 3,
            SideConditionKind::ToxicSpikes => 2,
            _ => 1,
        }
    }

    pub fn is_screen(&self) -> bool {
        matches!(
            self,
            SideConditionKind::Reflect
                | SideConditionKind::LightScreen
                | SideConditionKind::AuroraVeil
        )
    }

    pub fn is_hazard(&self) -> bool {
        matches!(
            self,
            SideConditionKind::Spikes
                | SideConditionKind::ToxicSpikes
                | SideConditionKind::StealthRock
                | SideConditionKind::StickyWeb
        )
    }

    /// Typical number of turns before the simulator ends it
    fn estimated_duration(&self) -> Option<u32> {
        match self {
            SideConditionKind::Reflect
            | SideConditionKind::LightScreen
            | SideConditionKind::AuroraVeil
            | SideConditionKind::Safeguard
            | SideConditionKind::Mist
            | SideConditionKind::LuckyChant => Some(5),
            SideConditionKind::Tailwind => Some(4),
            _ => None,
        }
    }
}

/// A battle-wide timed condition: weather, terrain, rooms, gravity...
///
/// The duration is only an estimate; a condition ends when the server says so.
#[derive(Debug, Clone, PartialEq)]
pub struct BattleGlobalCondition {
    pub id: String,
    pub name: String,
    /// Turn on which the condition started
    pub turn: u32,
    pub estimated_duration: Option<u32>,
    pub set_by: Option<PokemonIdent>,
}

impl BattleGlobalCondition {
    pub fn new(effect: &Effect, turn: u32, set_by: Option<PokemonIdent>) -> Self {
        let estimated_duration = match effect.id.as_str() {
            "electricterrain" | "grassyterrain" | "mistyterrain" | "psychicterrain"
            | "trickroom" | "magicroom" | "wonderroom" | "gravity" | "sunnyday"
            | "raindance" | "sandstorm" | "hail" | "snow" | "snowscape" => Some(5),
            "mudsport" | "watersport" => Some(5),
            _ => None,
        };
        Self {
            id: effect.id.clone(),
            name: effect.name.clone(),
            turn,
            estimated_duration,
            set_by,
        }
    }

    /// Turns until the estimated end, if the condition has a known duration
    pub fn turns_left(&self, current_turn: u32) -> Option<u32> {
        self.estimated_duration
            .map(|duration| (self.turn + duration).saturating_sub(current_turn))
    }
}

/// A per-player condition: hazards, screens, Tailwind...
#[derive(Debug, Clone, PartialEq)]
pub struct SideCondition {
    pub id: String,
    pub name: String,
    pub turn: u32,
    pub estimated_duration: Option<u32>,
    pub set_by: Option<PokemonIdent>,
    pub layers: u8,
}

impl SideCondition {
    pub fn new(effect: &Effect, turn: u32, set_by: Option<PokemonIdent>) -> Self {
        Self {
            id: effect.id.clone(),
            name: effect.name.clone(),
            turn,
            estimated_duration: SideConditionKind::from_id(&effect.id)
                .and_then(|kind| kind.estimated_duration()),
            set_by,
            layers: 1,
        }
    }

    pub fn kind(&self) -> Option<SideConditionKind> {
        SideConditionKind::from_id(&self.id)
    }

    /// Add a hazard layer; returns false when already at the maximum
    pub fn add_layer(&mut self) -> bool {
        let max = self.kind().map_or(1, |kind| kind.max_layers());
        if self.layers < max {
            self.layers += 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_parse() {
        assert_eq!(Weather::parse("SunnyDay"), Some(Weather::Sun));
        assert_eq!(Weather::parse("RainDance"), Some(Weather::Rain));
        assert_eq!(Weather::parse("DesolateLand"), Some(Weather::HarshSun));
        assert_eq!(Weather::parse("none"), None);
        assert!(Weather::StrongWinds.is_primal());
        assert!(!Weather::Sand.is_primal());
    }

    #[test]
    fn test_terrain_parse() {
        assert_eq!(
            Terrain::parse("move: Grassy Terrain"),
            Some(Terrain::Grassy)
        );
        assert_eq!(Terrain::parse("Electric Terrain"), Some(Terrain::Electric));
        assert_eq!(Terrain::parse("Trick Room"), None);
    }

    #[test]
    fn test_side_condition_layers() {
        let mut spikes = SideCondition::new(&Effect::parse("Spikes"), 3, None);
        assert_eq!(spikes.kind(), Some(SideConditionKind::Spikes));
        assert!(spikes.add_layer());
        assert!(spikes.add_layer());
        assert!(!spikes.add_layer());
        assert_eq!(spikes.layers, 3);

        let mut rocks = SideCondition::new(&Effect::parse("move: Stealth Rock"), 1, None);
        assert!(!rocks.add_layer());
        assert!(rocks.kind().is_some_and(|k| k.is_hazard()));
    }

    #[test]
    fn test_estimated_duration() {
        let reflect = SideCondition::new(&Effect::parse("Reflect"), 2, None);
        assert_eq!(reflect.estimated_duration, Some(5));

        let room = BattleGlobalCondition::new(&Effect::parse("move: Trick Room"), 4, None);
        assert_eq!(room.turns_left(6), Some(3));
        assert_eq!(room.turns_left(12), Some(0));
    }
}
