//! Status conditions (volatile and non-volatile)

use showbot_protocol::{Effect, PokemonIdent, to_id};

use super::pokemon_type::Type;

/// Non-volatile status conditions (persist through switching)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    Burn,
    Freeze,
    Paralysis,
    Poison,
    BadPoison,
    Sleep,
}

impl Status {
    /// Parse the protocol token ("brn", "tox", ...); "fnt" is not a status
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "brn" => Some(Status::Burn),
            "frz" => Some(Status::Freeze),
            "par" => Some(Status::Paralysis),
            "psn" => Some(Status::Poison),
            "tox" => Some(Status::BadPoison),
            "slp" => Some(Status::Sleep),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Burn => "brn",
            Status::Freeze => "frz",
            Status::Paralysis => "par",
            Status::Poison => "psn",
            Status::BadPoison => "tox",
            Status::Sleep => "slp",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Volatile conditions: slot-scoped, cleared when the pokemon leaves the field
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Volatile {
    Trapped,
    PartialTrap,
    Confusion,
    Taunt,
    Encore,
    Disable,
    Torment,
    Attract,
    FocusEnergy,
    LeechSeed,
    Curse,
    PerishSong,
    Substitute,
    Yawn,
    MustRecharge,
    TwoTurnMove,
    LockedMove,
    MagnetRise,
    Telekinesis,
    SmackDown,
    Ingrain,
    AquaRing,
    FlashFire,
    SlowStart,
    GastroAcid,
    Imprison,
    Transform,
    Stockpile,
    TypeChange,
    TypeAdd,
    Illusion,
    Dynamax,
    Octolock,
    TarShot,
    NoRetreat,
    SaltCure,
    ChoiceLock,
    Other(String),
}

impl Volatile {
    /// Classify an effect from `-start`/`-end` ("move: Taunt", "confusion", "perish3")
    pub fn from_effect(effect: &Effect) -> Self {
        Self::from_id(&effect.id)
    }

    pub fn from_id(id: &str) -> Self {
        let id = to_id(id);
        match id.as_str() {
            "trapped" | "meanlook" | "spiderweb" | "block" => Volatile::Trapped,
            "partiallytrapped" | "bind" | "wrap" | "firespin" | "clamp" | "whirlpool"
            | "sandtomb" | "magmastorm" | "infestation" | "snaptrap" | "thundercage" => {
                Volatile::PartialTrap
            }
            "confusion" => Volatile::Confusion,
            "taunt" => Volatile::Taunt,
            "encore" => Volatile::Encore,
            "disable" => Volatile::Disable,
            "torment" => Volatile::Torment,
            "attract" => Volatile::Attract,
            "focusenergy" => Volatile::FocusEnergy,
            "leechseed" => Volatile::LeechSeed,
            "curse" => Volatile::Curse,
            "perishsong" | "perish0" | "perish1" | "perish2" | "perish3" => Volatile::PerishSong,
            "substitute" => Volatile::Substitute,
            "yawn" => Volatile::Yawn,
            "mustrecharge" => Volatile::MustRecharge,
            "twoturnmove" => Volatile::TwoTurnMove,
            "lockedmove" => Volatile::LockedMove,
            "magnetrise" => Volatile::MagnetRise,
            "telekinesis" => Volatile::Telekinesis,
            "smackdown" => Volatile::SmackDown,
            "ingrain" => Volatile::Ingrain,
            "aquaring" => Volatile::AquaRing,
            "flashfire" => Volatile::FlashFire,
            "slowstart" => Volatile::SlowStart,
            "gastroacid" => Volatile::GastroAcid,
            "imprison" => Volatile::Imprison,
            "transform" => Volatile::Transform,
            "stockpile" | "stockpile1" | "stockpile2" | "stockpile3" => Volatile::Stockpile,
            "typechange" => Volatile::TypeChange,
            "typeadd" => Volatile::TypeAdd,
            "illusion" => Volatile::Illusion,
            "dynamax" => Volatile::Dynamax,
            "octolock" => Volatile::Octolock,
            "tarshot" => Volatile::TarShot,
            "noretreat" => Volatile::NoRetreat,
            "saltcure" => Volatile::SaltCure,
            "choicelock" => Volatile::ChoiceLock,
            _ => Volatile::Other(id),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Volatile::Other(_))
    }
}

/// Parameters carried by a volatile, keyed by the volatile it belongs to.
/// Only the payload matching the volatile is ever stored.
#[derive(Debug, Clone, PartialEq)]
pub enum VolatileData {
    /// Move id locked by Disable
    Disable { move_id: String },
    Stockpile { layers: u8 },
    /// Whom the pokemon transformed into
    Transform { into: PokemonIdent },
    PerishSong { count: u8 },
    TypeChange { types: Vec<Type> },
    TypeAdd { added: Type },
    /// Turns confused so far
    Confusion { turns: u8 },
    /// Substitute up; HP is unknown for the opponent
    Substitute,
    Encore { move_id: String },
    ChoiceLock { move_id: String },
    /// The species shown before an Illusion broke
    Illusion { shown_species: String },
}

impl VolatileData {
    /// Payload for a `-start` line, from the effect and its trailing args
    pub fn from_start(volatile: &Volatile, effect: &Effect, extra: &[String]) -> Option<Self> {
        let first = extra.first().map(String::as_str).unwrap_or_default();
        match volatile {
            Volatile::Disable => Some(VolatileData::Disable {
                move_id: to_id(strip_move_prefix(first)),
            }),
            Volatile::Encore => Some(VolatileData::Encore {
                move_id: to_id(strip_move_prefix(first)),
            }),
            Volatile::Stockpile => {
                let layers = effect
                    .id
                    .trim_start_matches("stockpile")
                    .parse()
                    .unwrap_or(1);
                Some(VolatileData::Stockpile { layers })
            }
            Volatile::PerishSong => {
                let count = effect.id.trim_start_matches("perish").parse().unwrap_or(3);
                Some(VolatileData::PerishSong { count })
            }
            Volatile::TypeChange => Some(VolatileData::TypeChange {
                types: Type::parse_list(first),
            }),
            Volatile::TypeAdd => Type::parse(first).map(|added| VolatileData::TypeAdd { added }),
            Volatile::Confusion => Some(VolatileData::Confusion { turns: 0 }),
            Volatile::Substitute => Some(VolatileData::Substitute),
            _ => None,
        }
    }
}

fn strip_move_prefix(s: &str) -> &str {
    s.strip_prefix("move:").map(str::trim).unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!(Status::parse("brn"), Some(Status::Burn));
        assert_eq!(Status::parse("tox"), Some(Status::BadPoison));
        assert_eq!(Status::parse("fnt"), None);
        assert_eq!(Status::Sleep.to_string(), "slp");
    }

    #[test]
    fn test_volatile_from_effect() {
        assert_eq!(
            Volatile::from_effect(&Effect::parse("move: Taunt")),
            Volatile::Taunt
        );
        assert_eq!(
            Volatile::from_effect(&Effect::parse("perish2")),
            Volatile::PerishSong
        );
        assert_eq!(
            Volatile::from_effect(&Effect::parse("ability: Flash Fire")),
            Volatile::FlashFire
        );
        let unknown = Volatile::from_effect(&Effect::parse("Glaive Rush"));
        assert_eq!(unknown, Volatile::Other("glaiverush".to_string()));
        assert!(!unknown.is_known());
    }

    #[test]
    fn test_volatile_data_payloads() {
        let disable = Effect::parse("Disable");
        assert_eq!(
            VolatileData::from_start(&Volatile::Disable, &disable, &["Earthquake".to_string()]),
            Some(VolatileData::Disable {
                move_id: "earthquake".to_string()
            })
        );

        let stockpile = Effect::parse("stockpile2");
        assert_eq!(
            VolatileData::from_start(&Volatile::Stockpile, &stockpile, &[]),
            Some(VolatileData::Stockpile { layers: 2 })
        );

        let typechange = Effect::parse("typechange");
        assert_eq!(
            VolatileData::from_start(
                &Volatile::TypeChange,
                &typechange,
                &["Water/Ground".to_string()]
            ),
            Some(VolatileData::TypeChange {
                types: vec![Type::Water, Type::Ground]
            })
        );

        assert_eq!(
            VolatileData::from_start(&Volatile::Taunt, &Effect::parse("Taunt"), &[]),
            None
        );
    }
}
