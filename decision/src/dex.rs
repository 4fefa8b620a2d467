//! Move and species data
//!
//! A representative table is compiled in with `phf`; a fuller table can be
//! loaded from JSON at runtime and takes precedence over the built-in one.

use std::borrow::Cow;
use std::collections::HashMap;

use anyhow::{Context, Result};
use phf::phf_map;
use serde::{Deserialize, Serialize};
use showbot_battle::Type;
use showbot_protocol::to_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

/// Move properties the decision rules care about
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MoveFlags {
    /// Spends a turn charging before it hits (Solar Beam, Meteor Beam)
    pub charge: bool,
    /// User must recharge next turn (Hyper Beam)
    pub recharge: bool,
    /// User faints (Explosion)
    pub self_destruct: bool,
    /// Hits a few turns later (Future Sight)
    pub future_move: bool,
    /// Protects the user this turn
    pub protect: bool,
    pub contact: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveData {
    pub name: Cow<'static, str>,
    #[serde(rename = "type")]
    pub move_type: Type,
    pub category: MoveCategory,
    #[serde(default)]
    pub base_power: u32,
    /// Percent chance to hit; `None` never misses
    #[serde(default)]
    pub accuracy: Option<u8>,
    #[serde(default)]
    pub priority: i8,
    #[serde(default)]
    pub flags: MoveFlags,
}

impl MoveData {
    pub fn is_status(&self) -> bool {
        self.category == MoveCategory::Status
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: u16,
    pub atk: u16,
    pub def: u16,
    pub spa: u16,
    pub spd: u16,
    pub spe: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesData {
    pub name: Cow<'static, str>,
    pub types: Cow<'static, [Type]>,
    pub base_stats: BaseStats,
}

/// Read-only game data lookup by id
pub trait Dex: Send + Sync {
    fn get_move(&self, id: &str) -> Option<&MoveData>;
    fn get_species(&self, id: &str) -> Option<&SpeciesData>;

    /// Species data for a forme, falling back to the base species
    /// ("Rotom-Wash" before "Rotom")
    fn species_or_base(&self, species: &str) -> Option<&SpeciesData> {
        self.get_species(&to_id(species)).or_else(|| {
            let (base, _) = species.split_once('-')?;
            self.get_species(&to_id(base))
        })
    }
}

/// Built-in tables plus anything loaded from JSON
#[derive(Debug, Clone, Default)]
pub struct StaticDex {
    moves: HashMap<String, MoveData>,
    species: HashMap<String, SpeciesData>,
}

#[derive(Debug, Default, Deserialize)]
struct DexFile {
    #[serde(default)]
    moves: HashMap<String, MoveData>,
    #[serde(default)]
    species: HashMap<String, SpeciesData>,
}

impl StaticDex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `{"moves": {id: ...}, "species": {id: ...}}`; entries shadow the
    /// built-in table
    pub fn from_json(json: &str) -> Result<Self> {
        let file: DexFile = serde_json::from_str(json).context("Failed to parse dex JSON")?;
        Ok(Self {
            moves: file.moves.into_iter().map(|(k, v)| (to_id(&k), v)).collect(),
            species: file
                .species
                .into_iter()
                .map(|(k, v)| (to_id(&k), v))
                .collect(),
        })
    }
}

impl Dex for StaticDex {
    fn get_move(&self, id: &str) -> Option<&MoveData> {
        self.moves.get(id).or_else(|| MOVES.get(id))
    }

    fn get_species(&self, id: &str) -> Option<&SpeciesData> {
        self.species.get(id).or_else(|| SPECIES.get(id))
    }
}

const NO_FLAGS: MoveFlags = MoveFlags {
    charge: false,
    recharge: false,
    self_destruct: false,
    future_move: false,
    protect: false,
    contact: false,
};

const CONTACT: MoveFlags = MoveFlags {
    contact: true,
    ..NO_FLAGS
};

const fn attack(
    name: &'static str,
    move_type: Type,
    category: MoveCategory,
    base_power: u32,
    accuracy: Option<u8>,
    flags: MoveFlags,
) -> MoveData {
    MoveData {
        name: Cow::Borrowed(name),
        move_type,
        category,
        base_power,
        accuracy,
        priority: 0,
        flags,
    }
}

const fn priority(mut data: MoveData, priority: i8) -> MoveData {
    data.priority = priority;
    data
}

const fn status(name: &'static str, move_type: Type, accuracy: Option<u8>) -> MoveData {
    attack(name, move_type, MoveCategory::Status, 0, accuracy, NO_FLAGS)
}

const fn protect(name: &'static str, move_type: Type) -> MoveData {
    priority(
        attack(
            name,
            move_type,
            MoveCategory::Status,
            0,
            None,
            MoveFlags {
                protect: true,
                ..NO_FLAGS
            },
        ),
        4,
    )
}

const CHARGE: MoveFlags = MoveFlags {
    charge: true,
    ..NO_FLAGS
};
const RECHARGE: MoveFlags = MoveFlags {
    recharge: true,
    ..NO_FLAGS
};
const SELF_DESTRUCT: MoveFlags = MoveFlags {
    self_destruct: true,
    ..NO_FLAGS
};
const FUTURE: MoveFlags = MoveFlags {
    future_move: true,
    ..NO_FLAGS
};

use MoveCategory::{Physical, Special};

static MOVES: phf::Map<&'static str, MoveData> = phf_map! {
    "bodypress" => attack("Body Press", Type::Fighting, Physical, 80, Some(100), CONTACT),
    "bravebird" => attack("Brave Bird", Type::Flying, Physical, 120, Some(100), CONTACT),
    "closecombat" => attack("Close Combat", Type::Fighting, Physical, 120, Some(100), CONTACT),
    "dracometeor" => attack("Draco Meteor", Type::Dragon, Special, 130, Some(90), NO_FLAGS),
    "dragonclaw" => attack("Dragon Claw", Type::Dragon, Physical, 80, Some(100), CONTACT),
    "earthquake" => attack("Earthquake", Type::Ground, Physical, 100, Some(100), NO_FLAGS),
    "extremespeed" => priority(attack("Extreme Speed", Type::Normal, Physical, 80, Some(100), CONTACT), 2),
    "fireblast" => attack("Fire Blast", Type::Fire, Special, 110, Some(85), NO_FLAGS),
    "flamethrower" => attack("Flamethrower", Type::Fire, Special, 90, Some(100), NO_FLAGS),
    "flashcannon" => attack("Flash Cannon", Type::Steel, Special, 80, Some(100), NO_FLAGS),
    "flareblitz" => attack("Flare Blitz", Type::Fire, Physical, 120, Some(100), CONTACT),
    "focusblast" => attack("Focus Blast", Type::Fighting, Special, 120, Some(70), NO_FLAGS),
    "hurricane" => attack("Hurricane", Type::Flying, Special, 110, Some(70), NO_FLAGS),
    "hydropump" => attack("Hydro Pump", Type::Water, Special, 110, Some(80), NO_FLAGS),
    "icebeam" => attack("Ice Beam", Type::Ice, Special, 90, Some(100), NO_FLAGS),
    "iceshard" => priority(attack("Ice Shard", Type::Ice, Physical, 40, Some(100), NO_FLAGS), 1),
    "ironhead" => attack("Iron Head", Type::Steel, Physical, 80, Some(100), CONTACT),
    "knockoff" => attack("Knock Off", Type::Dark, Physical, 65, Some(100), CONTACT),
    "makeitrain" => attack("Make It Rain", Type::Steel, Special, 120, Some(100), NO_FLAGS),
    "moonblast" => attack("Moonblast", Type::Fairy, Special, 95, Some(100), NO_FLAGS),
    "outrage" => attack("Outrage", Type::Dragon, Physical, 120, Some(100), CONTACT),
    "psychic" => attack("Psychic", Type::Psychic, Special, 90, Some(100), NO_FLAGS),
    "quickattack" => priority(attack("Quick Attack", Type::Normal, Physical, 40, Some(100), CONTACT), 1),
    "rockslide" => attack("Rock Slide", Type::Rock, Physical, 75, Some(90), NO_FLAGS),
    "shadowball" => attack("Shadow Ball", Type::Ghost, Special, 80, Some(100), NO_FLAGS),
    "sludgebomb" => attack("Sludge Bomb", Type::Poison, Special, 90, Some(100), NO_FLAGS),
    "stoneedge" => attack("Stone Edge", Type::Rock, Physical, 100, Some(80), NO_FLAGS),
    "suckerpunch" => priority(attack("Sucker Punch", Type::Dark, Physical, 70, Some(100), CONTACT), 1),
    "surf" => attack("Surf", Type::Water, Special, 90, Some(100), NO_FLAGS),
    "thunder" => attack("Thunder", Type::Electric, Special, 110, Some(70), NO_FLAGS),
    "thunderbolt" => attack("Thunderbolt", Type::Electric, Special, 90, Some(100), NO_FLAGS),
    "uturn" => attack("U-turn", Type::Bug, Physical, 70, Some(100), CONTACT),
    "voltswitch" => attack("Volt Switch", Type::Electric, Special, 70, Some(100), NO_FLAGS),
    "energyball" => attack("Energy Ball", Type::Grass, Special, 90, Some(100), NO_FLAGS),
    "gigadrain" => attack("Giga Drain", Type::Grass, Special, 75, Some(100), NO_FLAGS),
    "blizzard" => attack("Blizzard", Type::Ice, Special, 110, Some(70), NO_FLAGS),
    "headlongrush" => attack("Headlong Rush", Type::Ground, Physical, 120, Some(100), CONTACT),
    "kowtowcleave" => attack("Kowtow Cleave", Type::Dark, Physical, 85, None, CONTACT),
    "wickedblow" => attack("Wicked Blow", Type::Dark, Physical, 75, Some(100), CONTACT),
    "swift" => attack("Swift", Type::Normal, Special, 60, None, NO_FLAGS),
    "tackle" => attack("Tackle", Type::Normal, Physical, 40, Some(100), CONTACT),
    "struggle" => attack("Struggle", Type::Normal, Physical, 50, None, CONTACT),

    "hyperbeam" => attack("Hyper Beam", Type::Normal, Special, 150, Some(90), RECHARGE),
    "gigaimpact" => attack("Giga Impact", Type::Normal, Physical, 150, Some(90), MoveFlags { recharge: true, contact: true, ..NO_FLAGS }),
    "solarbeam" => attack("Solar Beam", Type::Grass, Special, 120, Some(100), CHARGE),
    "solarblade" => attack("Solar Blade", Type::Grass, Physical, 125, Some(100), MoveFlags { charge: true, contact: true, ..NO_FLAGS }),
    "meteorbeam" => attack("Meteor Beam", Type::Rock, Special, 120, Some(90), CHARGE),
    "skyattack" => attack("Sky Attack", Type::Flying, Physical, 140, Some(90), CHARGE),
    "explosion" => attack("Explosion", Type::Normal, Physical, 250, Some(100), SELF_DESTRUCT),
    "selfdestruct" => attack("Self-Destruct", Type::Normal, Physical, 200, Some(100), SELF_DESTRUCT),
    "mistyexplosion" => attack("Misty Explosion", Type::Fairy, Special, 100, Some(100), SELF_DESTRUCT),
    "futuresight" => attack("Future Sight", Type::Psychic, Special, 120, Some(100), FUTURE),
    "doomdesire" => attack("Doom Desire", Type::Steel, Special, 140, Some(100), FUTURE),

    "protect" => protect("Protect", Type::Normal),
    "detect" => protect("Detect", Type::Fighting),
    "kingsshield" => protect("King's Shield", Type::Steel),
    "spikyshield" => protect("Spiky Shield", Type::Grass),
    "banefulbunker" => protect("Baneful Bunker", Type::Poison),
    "silktrap" => protect("Silk Trap", Type::Bug),

    "dragondance" => status("Dragon Dance", Type::Dragon, None),
    "swordsdance" => status("Swords Dance", Type::Normal, None),
    "nastyplot" => status("Nasty Plot", Type::Dark, None),
    "roost" => status("Roost", Type::Flying, None),
    "recover" => status("Recover", Type::Normal, None),
    "stealthrock" => status("Stealth Rock", Type::Rock, None),
    "spikes" => status("Spikes", Type::Ground, None),
    "toxic" => status("Toxic", Type::Poison, Some(90)),
    "thunderwave" => status("Thunder Wave", Type::Electric, Some(90)),
    "willowisp" => status("Will-O-Wisp", Type::Fire, Some(85)),
    "spore" => status("Spore", Type::Grass, Some(100)),
    "sleeptalk" => status("Sleep Talk", Type::Normal, None),
    "defog" => status("Defog", Type::Flying, None),
    "haze" => status("Haze", Type::Ice, None),
    "leechseed" => status("Leech Seed", Type::Grass, Some(90)),
    "substitute" => status("Substitute", Type::Normal, None),
    "calmmind" => status("Calm Mind", Type::Psychic, None),
    "softboiled" => status("Soft-Boiled", Type::Normal, None),
    "ragepowder" => status("Rage Powder", Type::Bug, None),
    "fakeout" => priority(attack("Fake Out", Type::Normal, Physical, 40, Some(100), CONTACT), 3),
    "partingshot" => status("Parting Shot", Type::Dark, Some(100)),
};

const fn species(name: &'static str, types: &'static [Type], base_stats: [u16; 6]) -> SpeciesData {
    let [hp, atk, def, spa, spd, spe] = base_stats;
    SpeciesData {
        name: Cow::Borrowed(name),
        types: Cow::Borrowed(types),
        base_stats: BaseStats {
            hp,
            atk,
            def,
            spa,
            spd,
            spe,
        },
    }
}

static SPECIES: phf::Map<&'static str, SpeciesData> = phf_map! {
    "amoonguss" => species("Amoonguss", &[Type::Grass, Type::Poison], [114, 85, 70, 85, 80, 30]),
    "blastoise" => species("Blastoise", &[Type::Water], [79, 83, 100, 85, 105, 78]),
    "blissey" => species("Blissey", &[Type::Normal], [255, 10, 10, 75, 135, 55]),
    "chandelure" => species("Chandelure", &[Type::Ghost, Type::Fire], [60, 55, 90, 145, 90, 80]),
    "charizard" => species("Charizard", &[Type::Fire, Type::Flying], [78, 84, 78, 109, 85, 100]),
    "clefable" => species("Clefable", &[Type::Fairy], [95, 70, 73, 95, 90, 60]),
    "clodsire" => species("Clodsire", &[Type::Poison, Type::Ground], [130, 75, 60, 45, 100, 20]),
    "corviknight" => species("Corviknight", &[Type::Flying, Type::Steel], [98, 87, 105, 53, 85, 67]),
    "dragapult" => species("Dragapult", &[Type::Dragon, Type::Ghost], [88, 120, 75, 100, 75, 142]),
    "dragonite" => species("Dragonite", &[Type::Dragon, Type::Flying], [91, 134, 95, 100, 100, 80]),
    "ferrothorn" => species("Ferrothorn", &[Type::Grass, Type::Steel], [74, 94, 131, 54, 116, 20]),
    "garchomp" => species("Garchomp", &[Type::Dragon, Type::Ground], [108, 130, 95, 80, 85, 102]),
    "gengar" => species("Gengar", &[Type::Ghost, Type::Poison], [60, 65, 60, 130, 75, 110]),
    "gholdengo" => species("Gholdengo", &[Type::Steel, Type::Ghost], [87, 60, 95, 133, 91, 84]),
    "greattusk" => species("Great Tusk", &[Type::Ground, Type::Fighting], [115, 131, 131, 53, 53, 87]),
    "heatran" => species("Heatran", &[Type::Fire, Type::Steel], [91, 90, 106, 130, 106, 77]),
    "incineroar" => species("Incineroar", &[Type::Fire, Type::Dark], [95, 115, 90, 80, 90, 60]),
    "ironvaliant" => species("Iron Valiant", &[Type::Fairy, Type::Fighting], [74, 130, 90, 120, 60, 116]),
    "kingambit" => species("Kingambit", &[Type::Dark, Type::Steel], [100, 135, 120, 60, 85, 50]),
    "landorustherian" => species("Landorus-Therian", &[Type::Ground, Type::Flying], [89, 145, 90, 105, 80, 91]),
    "magikarp" => species("Magikarp", &[Type::Water], [20, 10, 55, 15, 20, 80]),
    "pikachu" => species("Pikachu", &[Type::Electric], [35, 55, 40, 50, 50, 90]),
    "rotom" => species("Rotom", &[Type::Electric, Type::Ghost], [50, 50, 77, 95, 77, 91]),
    "rotomwash" => species("Rotom-Wash", &[Type::Electric, Type::Water], [50, 65, 107, 105, 107, 86]),
    "skarmory" => species("Skarmory", &[Type::Steel, Type::Flying], [65, 80, 140, 40, 70, 70]),
    "toxapex" => species("Toxapex", &[Type::Poison, Type::Water], [50, 63, 152, 53, 142, 35]),
    "tyranitar" => species("Tyranitar", &[Type::Rock, Type::Dark], [100, 134, 110, 95, 100, 61]),
    "urshifu" => species("Urshifu", &[Type::Fighting, Type::Dark], [100, 130, 100, 63, 60, 97]),
    "venusaur" => species("Venusaur", &[Type::Grass, Type::Poison], [80, 82, 83, 100, 100, 80]),
    "zoroarkhisui" => species("Zoroark-Hisui", &[Type::Normal, Type::Ghost], [55, 100, 60, 125, 60, 110]),
};
