//! Shared value types for battle protocol messages

use std::fmt;

use crate::ParseError;

/// Normalize a display name into a protocol id ("Speed Boost" -> "speedboost")
pub fn to_id(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Permissive integer parsing: anything unparsable becomes zero
pub fn parse_int<T: std::str::FromStr + Default>(s: &str) -> T {
    s.trim().parse().unwrap_or_default()
}

/// Player in a battle (p1, p2, p3, p4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Player {
    P1,
    P2,
    P3,
    P4,
}

impl Player {
    pub const ALL: [Player; 4] = [Player::P1, Player::P2, Player::P3, Player::P4];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "p1" => Some(Player::P1),
            "p2" => Some(Player::P2),
            "p3" => Some(Player::P3),
            "p4" => Some(Player::P4),
            _ => None,
        }
    }

    /// Parse the player prefix of a longer token ("p2a", "p2: Name")
    pub fn parse_prefix(s: &str) -> Option<Self> {
        s.get(..2).and_then(Self::parse)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Player::P1 => "p1",
            Player::P2 => "p2",
            Player::P3 => "p3",
            Player::P4 => "p4",
        }
    }

    /// Zero-based index (p1 -> 0)
    pub fn index(&self) -> usize {
        match self {
            Player::P1 => 0,
            Player::P2 => 1,
            Player::P3 => 2,
            Player::P4 => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Players on the same team share parity (p1/p3 vs p2/p4)
    pub fn is_ally_of(&self, other: Player) -> bool {
        self.index() % 2 == other.index() % 2
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pokemon identifier in the form "POSITION: NAME" (e.g., "p1a: Pikachu")
///
/// An ident without a position letter ("p1: Pikachu") refers to a pokemon
/// that is not on the field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PokemonIdent {
    /// Player who owns this pokemon
    pub player: Player,
    /// Battle slot (a=0, b=1, c=2) when the pokemon is active
    pub slot: Option<usize>,
    /// Pokemon's name/nickname
    pub name: String,
}

impl PokemonIdent {
    pub fn new(player: Player, slot: Option<usize>, name: impl Into<String>) -> Self {
        Self {
            player,
            slot,
            name: name.into(),
        }
    }

    /// Parse a pokemon ID string like "p1a: Pikachu" or "p1: Pikachu"
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (pos_part, name) = match s.split_once(':') {
            Some((pos, name)) => (pos.trim(), name.trim()),
            None => (s, ""),
        };

        let player = Player::parse_prefix(pos_part)?;
        let slot = match pos_part.len() {
            2 => None,
            3 => {
                let letter = pos_part.chars().nth(2)?;
                if !letter.is_ascii_lowercase() {
                    return None;
                }
                Some(position_to_slot(letter))
            }
            _ => return None,
        };

        Some(PokemonIdent {
            player,
            slot,
            name: name.to_string(),
        })
    }

    /// Whether the ident names an on-field position
    pub fn is_active(&self) -> bool {
        self.slot.is_some()
    }

    /// Protocol id of the name (for identity comparisons)
    pub fn id(&self) -> String {
        to_id(&self.name)
    }

    /// Position token ("p1a", or "p1" when not active)
    pub fn position(&self) -> String {
        match self.slot {
            Some(slot) => format!("{}{}", self.player, slot_to_position(slot)),
            None => self.player.as_str().to_string(),
        }
    }
}

impl fmt::Display for PokemonIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.position())
        } else {
            write!(f, "{}: {}", self.position(), self.name)
        }
    }
}

/// Convert a position letter to a slot index ('a' -> 0)
pub fn position_to_slot(pos: char) -> usize {
    (pos as u32).saturating_sub('a' as u32) as usize
}

/// Convert a slot index to its position letter (0 -> 'a')
pub fn slot_to_position(slot: usize) -> char {
    char::from_u32('a' as u32 + slot as u32).unwrap_or('a')
}

/// Pokemon gender as shown in the details string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Gender {
    M,
    F,
    #[default]
    N,
}

/// Pokemon details string (species, level, gender, shiny, tera)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PokemonDetails {
    pub species: String,
    pub level: u8,
    pub gender: Gender,
    pub shiny: bool,
    pub tera_type: Option<String>,
}

impl Default for PokemonDetails {
    fn default() -> Self {
        Self {
            species: String::new(),
            level: 100,
            gender: Gender::N,
            shiny: false,
            tera_type: None,
        }
    }
}

impl PokemonDetails {
    /// Parse a details string like "Pikachu, L50, M, shiny" or "Arceus-*"
    pub fn parse(s: &str) -> Self {
        let mut details = PokemonDetails::default();
        let mut parts = s.split(',').map(str::trim);

        if let Some(species) = parts.next() {
            details.species = species.to_string();
        }

        for part in parts {
            if let Some(level_str) = part.strip_prefix('L') {
                details.level = level_str.parse().unwrap_or(100);
            } else if part == "M" {
                details.gender = Gender::M;
            } else if part == "F" {
                details.gender = Gender::F;
            } else if part == "shiny" {
                details.shiny = true;
            } else if let Some(tera) = part.strip_prefix("tera:") {
                details.tera_type = Some(tera.to_string());
            }
        }

        details
    }

    /// Base species id, ignoring a trailing hidden-forme marker ("Urshifu-*")
    pub fn species_id(&self) -> String {
        to_id(self.species.trim_end_matches("-*"))
    }

    /// Whether two details strings can describe the same pokemon.
    /// Hidden formes ("Species-*") match any forme of the species.
    pub fn matches(&self, other: &PokemonDetails) -> bool {
        let base = |s: &str| to_id(s.split('-').next().unwrap_or(s));
        let same_species = self.species_id() == other.species_id()
            || ((self.species.ends_with("-*") || other.species.ends_with("-*"))
                && base(&self.species) == base(&other.species));
        same_species
            && self.level == other.level
            && (self.gender == other.gender
                || self.gender == Gender::N
                || other.gender == Gender::N)
    }
}

impl fmt::Display for PokemonDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.species)?;
        if self.level != 100 {
            write!(f, ", L{}", self.level)?;
        }
        match self.gender {
            Gender::M => f.write_str(", M")?,
            Gender::F => f.write_str(", F")?,
            Gender::N => {}
        }
        if self.shiny {
            f.write_str(", shiny")?;
        }
        if let Some(tera) = &self.tera_type {
            write!(f, ", tera:{}", tera)?;
        }
        Ok(())
    }
}

/// HP and status condition (e.g., "100/100", "50/100 slp", "0 fnt")
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HpCondition {
    /// Current HP (raw value for own pokemon, usually a percentage otherwise)
    pub hp: u32,
    /// Max HP; zero when the string carried no denominator
    pub max_hp: u32,
    /// Status condition token (slp, par, brn, psn, tox, frz)
    pub status: Option<String>,
    /// True iff hp is zero
    pub fainted: bool,
}

impl HpCondition {
    /// Parse an HP condition string. Never fails: malformed numbers become 0.
    pub fn parse(s: &str) -> Self {
        let mut parts = s.split_whitespace();
        let hp_part = parts.next().unwrap_or("");
        let status = parts
            .next()
            .filter(|s| *s != "fnt")
            .map(|s| s.to_string());

        let (hp, max_hp) = match hp_part.split_once('/') {
            Some((current, max)) => (parse_int(current), parse_int(max)),
            None => (parse_int(hp_part), 0),
        };

        HpCondition {
            hp,
            max_hp,
            status,
            fainted: hp == 0,
        }
    }

    /// HP as a percentage of max (falls back to the raw value when max is unknown)
    pub fn percent(&self) -> f64 {
        if self.max_hp == 0 {
            self.hp as f64
        } else {
            self.hp as f64 * 100.0 / self.max_hp as f64
        }
    }
}

impl fmt::Display for HpCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.max_hp == 0 {
            write!(f, "{}", self.hp)?;
        } else {
            write!(f, "{}/{}", self.hp, self.max_hp)?;
        }
        if self.fainted {
            f.write_str(" fnt")
        } else if let Some(status) = &self.status {
            write!(f, " {}", status)
        } else {
            Ok(())
        }
    }
}

/// What kind of thing caused an effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Item,
    Ability,
    Move,
    /// A bare effect with no source prefix (e.g. "confusion", "psn")
    Pure,
}

/// An effect reference such as "ability: Intimidate" or "item: Leftovers"
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Effect {
    pub kind: EffectKind,
    /// Normalized id ("speedboost")
    pub id: String,
    /// Display name as sent ("Speed Boost")
    pub name: String,
}

impl Effect {
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        let (kind, name) = if let Some(name) = s.strip_prefix("ability:") {
            (EffectKind::Ability, name.trim())
        } else if let Some(name) = s.strip_prefix("item:") {
            (EffectKind::Item, name.trim())
        } else if let Some(name) = s.strip_prefix("move:") {
            (EffectKind::Move, name.trim())
        } else {
            (EffectKind::Pure, s)
        };

        Effect {
            kind,
            id: to_id(name),
            name: name.to_string(),
        }
    }

    pub fn pure(name: impl Into<String>) -> Self {
        let name = name.into();
        Effect {
            kind: EffectKind::Pure,
            id: to_id(&name),
            name,
        }
    }

    pub fn is_ability(&self) -> bool {
        self.kind == EffectKind::Ability
    }

    pub fn is_item(&self) -> bool {
        self.kind == EffectKind::Item
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EffectKind::Ability => write!(f, "ability: {}", self.name),
            EffectKind::Item => write!(f, "item: {}", self.name),
            EffectKind::Move => write!(f, "move: {}", self.name),
            EffectKind::Pure => f.write_str(&self.name),
        }
    }
}

/// Game type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameType {
    #[default]
    Singles,
    Doubles,
    Triples,
    Multi,
    FreeForAll,
}

impl GameType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "singles" => Some(GameType::Singles),
            "doubles" => Some(GameType::Doubles),
            "triples" => Some(GameType::Triples),
            "multi" => Some(GameType::Multi),
            "freeforall" => Some(GameType::FreeForAll),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::Singles => "singles",
            GameType::Doubles => "doubles",
            GameType::Triples => "triples",
            GameType::Multi => "multi",
            GameType::FreeForAll => "freeforall",
        }
    }

    /// Number of active slots each player fields
    pub fn active_size(&self) -> usize {
        match self {
            GameType::Singles => 1,
            GameType::Doubles => 2,
            GameType::Triples => 3,
            GameType::Multi => 1,
            GameType::FreeForAll => 1,
        }
    }
}

/// Stat abbreviation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stat {
    Atk,
    Def,
    Spa,
    Spd,
    Spe,
    Accuracy,
    Evasion,
}

impl Stat {
    pub const ALL: [Stat; 7] = [
        Stat::Atk,
        Stat::Def,
        Stat::Spa,
        Stat::Spd,
        Stat::Spe,
        Stat::Accuracy,
        Stat::Evasion,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "atk" => Some(Stat::Atk),
            "def" => Some(Stat::Def),
            "spa" => Some(Stat::Spa),
            "spd" => Some(Stat::Spd),
            "spe" => Some(Stat::Spe),
            "accuracy" => Some(Stat::Accuracy),
            "evasion" => Some(Stat::Evasion),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stat::Atk => "atk",
            Stat::Def => "def",
            Stat::Spa => "spa",
            Stat::Spd => "spd",
            Stat::Spe => "spe",
            Stat::Accuracy => "accuracy",
            Stat::Evasion => "evasion",
        }
    }
}

/// Side of the field (for side conditions), e.g. "p1: Alice"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Side {
    pub player: Player,
    pub raw: String,
}

impl Side {
    pub fn parse(s: &str) -> Option<Self> {
        Some(Side {
            player: Player::parse_prefix(s.trim())?,
            raw: s.to_string(),
        })
    }
}

/// Helper to parse a required pokemon ident from message args
pub fn parse_pokemon(args: &[&str], index: usize) -> Result<PokemonIdent, ParseError> {
    args.get(index)
        .and_then(|s| PokemonIdent::parse(s))
        .ok_or_else(|| ParseError::MissingField(format!("pokemon at position {}", index)))
}

/// Helper to parse an optional pokemon ident from message args
pub fn parse_optional_pokemon(args: &[&str], index: usize) -> Option<PokemonIdent> {
    args.get(index).and_then(|s| PokemonIdent::parse(s))
}

/// Helper to parse PokemonDetails from message args
pub fn parse_details(args: &[&str], index: usize) -> PokemonDetails {
    args.get(index)
        .map(|s| PokemonDetails::parse(s))
        .unwrap_or_default()
}

/// Helper to parse an HP condition from message args (absent or empty -> None)
pub fn parse_condition(args: &[&str], index: usize) -> Option<HpCondition> {
    args.get(index)
        .filter(|s| !s.trim().is_empty())
        .map(|s| HpCondition::parse(s))
}

/// Helper to read a string arg (missing -> empty)
pub fn arg(args: &[&str], index: usize) -> String {
    args.get(index).map(|s| s.to_string()).unwrap_or_default()
}

/// Helper to read an optional non-empty string arg
pub fn optional_arg(args: &[&str], index: usize) -> Option<String> {
    args.get(index)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}
