//! Battle request types
//!
//! These types represent the JSON structure of |request| messages. Ident,
//! details and condition strings are translated into their typed forms while
//! deserializing and rendered back on serialization.

use super::battle::{HpCondition, Player, PokemonDetails, PokemonIdent};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A battle request asking the player to make a decision
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleRequest {
    /// Request ID for synchronization
    #[serde(default)]
    pub rqid: Option<u64>,

    /// Active pokemon and their available moves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<Vec<ActiveRequest>>,

    /// Information about the player's side/team
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<SideInfo>,

    /// Which slots need to switch (for doubles/triples)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_switch: Option<Vec<bool>>,

    /// Whether this is team preview
    #[serde(default)]
    pub team_preview: bool,

    /// Maximum number of pokemon to bring during team preview
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_chosen_team_size: Option<usize>,

    /// Whether we're waiting for opponent
    #[serde(default)]
    pub wait: bool,

    /// The choice cannot be cancelled once sent
    #[serde(default)]
    pub no_cancel: bool,
}

/// The shape of a request, by priority of the fields present
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RequestKind<'a> {
    TeamPreview,
    ForceSwitch(&'a [bool]),
    Active(&'a [ActiveRequest]),
    Wait,
}

impl BattleRequest {
    /// Parse a request from JSON
    pub fn parse(json: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(json.clone()).ok()
    }

    pub fn kind(&self) -> RequestKind<'_> {
        if self.wait {
            RequestKind::Wait
        } else if self.team_preview {
            RequestKind::TeamPreview
        } else if let Some(force) = self.force_switch.as_deref() {
            RequestKind::ForceSwitch(force)
        } else if let Some(active) = self.active.as_deref() {
            RequestKind::Active(active)
        } else {
            RequestKind::Wait
        }
    }

    /// Check if this request requires a decision
    pub fn needs_decision(&self) -> bool {
        !matches!(self.kind(), RequestKind::Wait)
    }

    /// Check if this is a force switch request
    pub fn is_force_switch(&self) -> bool {
        self.force_switch
            .as_ref()
            .map(|fs| fs.iter().any(|&b| b))
            .unwrap_or(false)
    }

    /// Player this request was sent to
    pub fn player(&self) -> Option<Player> {
        self.side.as_ref().and_then(SideInfo::player)
    }

    /// Roster of the requesting side (empty when absent)
    pub fn roster(&self) -> &[SidePokemon] {
        self.side
            .as_ref()
            .map(|s| s.pokemon.as_slice())
            .unwrap_or_default()
    }

    /// Get available pokemon to switch to, with their 1-based roster index
    pub fn available_switches(&self) -> Vec<(usize, &SidePokemon)> {
        self.roster()
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.active && !p.is_fainted())
            .map(|(i, p)| (i + 1, p))
            .collect()
    }
}

/// Information about an active pokemon in battle
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveRequest {
    /// Available moves
    #[serde(default)]
    pub moves: Vec<MoveSlot>,

    /// Whether the pokemon is trapped
    #[serde(default)]
    pub trapped: bool,

    /// Whether the pokemon might be trapped
    #[serde(default)]
    pub maybe_trapped: bool,

    /// Whether mega evolution is available
    #[serde(default)]
    pub can_mega_evo: bool,

    /// Whether ultra burst is available
    #[serde(default)]
    pub can_ultra_burst: bool,

    /// Z-move information (if available)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_z_move: Option<Vec<Option<ZMoveInfo>>>,

    /// Whether dynamax is available
    #[serde(default)]
    pub can_dynamax: bool,

    /// Gigantamax species (if available)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_gigantamax: Option<String>,

    /// Terastallization type (if available)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_terastallize: Option<String>,

    /// Max moves (when dynamax is available or active)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_moves: Option<MaxMoves>,
}

impl ActiveRequest {
    /// Get available (non-disabled, with PP) moves with their 1-based index
    pub fn available_moves(&self) -> Vec<(usize, &MoveSlot)> {
        self.moves
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_usable())
            .map(|(i, m)| (i + 1, m))
            .collect()
    }

    /// Check if the pokemon can switch out
    pub fn can_switch(&self) -> bool {
        !self.trapped
    }

    /// Z-move usable from the move at `index` (0-based)
    pub fn z_move(&self, index: usize) -> Option<&ZMoveInfo> {
        self.can_z_move
            .as_ref()
            .and_then(|moves| moves.get(index))
            .and_then(|z| z.as_ref())
    }
}

/// A move slot on an active pokemon
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveSlot {
    /// Display name of the move
    #[serde(rename = "move")]
    pub name: String,

    /// Move ID (lowercase, no spaces)
    pub id: String,

    /// Current PP (absent for locked moves like Struggle)
    #[serde(default)]
    pub pp: Option<u32>,

    /// Maximum PP
    #[serde(rename = "maxpp", default)]
    pub max_pp: Option<u32>,

    /// Target type (normal, self, allySide, etc.)
    #[serde(default)]
    pub target: Option<String>,

    /// Whether the move is disabled
    #[serde(default, deserialize_with = "bool_or_string")]
    pub disabled: bool,
}

impl MoveSlot {
    pub fn is_usable(&self) -> bool {
        !self.disabled && self.pp.is_none_or(|pp| pp > 0)
    }
}

/// Z-move information
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZMoveInfo {
    /// Z-move name
    #[serde(rename = "move")]
    pub name: String,

    /// Target type
    #[serde(default)]
    pub target: String,
}

/// Max move information (for dynamax)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxMoves {
    /// Available max moves
    #[serde(default)]
    pub max_moves: Vec<MaxMoveSlot>,

    /// Gigantamax species, when applicable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gigantamax: Option<String>,
}

/// A max move slot
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxMoveSlot {
    /// Max move name
    #[serde(rename = "move")]
    pub name: String,

    /// Target type
    #[serde(default)]
    pub target: String,
}

/// Information about the player's side
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideInfo {
    /// Player's display name
    #[serde(default)]
    pub name: String,

    /// Player ID (p1, p2, etc.)
    #[serde(default)]
    pub id: String,

    /// Pokemon on this side
    #[serde(default)]
    pub pokemon: Vec<SidePokemon>,
}

impl SideInfo {
    /// Get the player enum
    pub fn player(&self) -> Option<Player> {
        Player::parse(&self.id)
    }
}

/// A pokemon on the player's side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidePokemon {
    /// Pokemon identifier (e.g., "p1: Pikachu")
    #[serde(serialize_with = "ser_display", deserialize_with = "de_ident")]
    pub ident: PokemonIdent,

    /// Species, level, gender, shiny, tera
    #[serde(serialize_with = "ser_display", deserialize_with = "de_details")]
    pub details: PokemonDetails,

    /// Current condition (HP/MaxHP status)
    #[serde(serialize_with = "ser_display", deserialize_with = "de_condition")]
    pub condition: HpCondition,

    /// Whether this pokemon is currently active
    #[serde(default)]
    pub active: bool,

    /// Stats (atk, def, spa, spd, spe)
    #[serde(default)]
    pub stats: PokemonStats,

    /// Known move ids
    #[serde(default)]
    pub moves: Vec<String>,

    /// Base ability
    #[serde(default)]
    pub base_ability: String,

    /// Current ability
    #[serde(default)]
    pub ability: String,

    /// Held item
    #[serde(default)]
    pub item: String,

    /// Pokeball used
    #[serde(default)]
    pub pokeball: String,

    /// Terastallize type
    #[serde(default, alias = "teratype", skip_serializing_if = "Option::is_none")]
    pub tera_type: Option<String>,

    /// Whether already terastallized (the tera type when so)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terastallized: Option<String>,

    /// Tatsugiri commanding a Dondozo
    #[serde(default)]
    pub commanding: bool,

    /// Selected by Revival Blessing
    #[serde(default)]
    pub reviving: bool,
}

impl SidePokemon {
    /// Check if the pokemon is fainted
    pub fn is_fainted(&self) -> bool {
        self.condition.fainted
    }

    /// Get the species name from details
    pub fn species(&self) -> &str {
        &self.details.species
    }

    /// Current ability, falling back to the base ability
    pub fn current_ability(&self) -> &str {
        if self.ability.is_empty() {
            &self.base_ability
        } else {
            &self.ability
        }
    }
}

/// Pokemon stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PokemonStats {
    #[serde(default)]
    pub atk: u32,
    #[serde(default)]
    pub def: u32,
    #[serde(default)]
    pub spa: u32,
    #[serde(default)]
    pub spd: u32,
    #[serde(default)]
    pub spe: u32,
}

fn ser_display<T: std::fmt::Display, S: Serializer>(value: &T, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(value)
}

fn de_ident<'de, D: Deserializer<'de>>(d: D) -> Result<PokemonIdent, D::Error> {
    let raw = String::deserialize(d)?;
    PokemonIdent::parse(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid pokemon ident: {}", raw)))
}

fn de_details<'de, D: Deserializer<'de>>(d: D) -> Result<PokemonDetails, D::Error> {
    Ok(PokemonDetails::parse(&String::deserialize(d)?))
}

fn de_condition<'de, D: Deserializer<'de>>(d: D) -> Result<HpCondition, D::Error> {
    Ok(HpCondition::parse(&String::deserialize(d)?))
}

/// `disabled` is sometimes the name of the disabling effect instead of a bool
fn bool_or_string<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    Ok(match BoolOrString::deserialize(d)? {
        BoolOrString::Bool(b) => b,
        BoolOrString::String(s) => !s.is_empty(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTIVE_REQUEST: &str = r#"{
        "active": [{
            "moves": [
                {"move": "Brave Bird", "id": "bravebird", "pp": 24, "maxpp": 24, "target": "any", "disabled": false},
                {"move": "Roost", "id": "roost", "pp": 0, "maxpp": 8, "target": "self", "disabled": false},
                {"move": "U-turn", "id": "uturn", "pp": 32, "maxpp": 32, "target": "normal", "disabled": "Taunt"}
            ],
            "canTerastallize": "Flying"
        }],
        "side": {
            "name": "Alice",
            "id": "p1",
            "pokemon": [
                {"ident": "p1: Corviknight", "details": "Corviknight, F", "condition": "399/399", "active": true,
                 "stats": {"atk": 209, "def": 309, "spa": 127, "spd": 207, "spe": 152},
                 "moves": ["bravebird", "roost", "uturn"], "baseAbility": "pressure", "item": "leftovers",
                 "pokeball": "pokeball", "ability": "pressure", "teraType": "Flying", "terastallized": ""},
                {"ident": "p1: Clefable", "details": "Clefable, F", "condition": "0 fnt", "active": false,
                 "stats": {"atk": 100, "def": 200, "spa": 200, "spd": 200, "spe": 100},
                 "moves": ["moonblast"], "baseAbility": "magicguard", "item": "", "pokeball": "pokeball"},
                {"ident": "p1: Gholdengo", "details": "Gholdengo", "condition": "300/300", "active": false,
                 "stats": {"atk": 100, "def": 200, "spa": 300, "spd": 200, "spe": 200},
                 "moves": ["makeitrain"], "baseAbility": "goodasgold", "item": "choicescarf", "pokeball": "pokeball"}
            ]
        },
        "rqid": 3
    }"#;

    #[test]
    fn test_active_request_translation() {
        let request: BattleRequest = serde_json::from_str(ACTIVE_REQUEST).unwrap();
        assert_eq!(request.rqid, Some(3));
        assert_eq!(request.player(), Some(Player::P1));

        let RequestKind::Active(active) = request.kind() else {
            panic!("expected active request");
        };
        assert_eq!(active[0].moves.len(), 3);
        assert!(active[0].moves[2].disabled);
        assert_eq!(active[0].available_moves().len(), 1);
        assert_eq!(active[0].can_terastallize.as_deref(), Some("Flying"));

        let corviknight = &request.roster()[0];
        assert_eq!(corviknight.ident.name, "Corviknight");
        assert_eq!(corviknight.condition.hp, 399);
        assert_eq!(corviknight.stats.def, 309);
        assert_eq!(corviknight.tera_type.as_deref(), Some("Flying"));

        let switches = request.available_switches();
        assert_eq!(switches.len(), 1);
        assert_eq!(switches[0].0, 3);
    }

    #[test]
    fn test_force_switch_and_preview_kinds() {
        let request: BattleRequest =
            serde_json::from_str(r#"{"forceSwitch": [true, false], "rqid": 7}"#).unwrap();
        assert_eq!(request.kind(), RequestKind::ForceSwitch(&[true, false]));
        assert!(request.is_force_switch());

        let preview: BattleRequest =
            serde_json::from_str(r#"{"teamPreview": true, "maxChosenTeamSize": 4}"#).unwrap();
        assert_eq!(preview.kind(), RequestKind::TeamPreview);
        assert_eq!(preview.max_chosen_team_size, Some(4));

        let wait: BattleRequest = serde_json::from_str(r#"{"wait": true}"#).unwrap();
        assert!(!wait.needs_decision());
    }

    #[test]
    fn test_request_reserializes() {
        let request: BattleRequest = serde_json::from_str(ACTIVE_REQUEST).unwrap();
        let json = serde_json::to_string(&request).unwrap();
        let again: BattleRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(request, again);
    }

    #[test]
    fn test_invalid_ident_is_an_error() {
        let result = serde_json::from_str::<BattleRequest>(
            r#"{"side": {"pokemon": [{"ident": "Pikachu", "details": "Pikachu", "condition": "1/1"}]}}"#,
        );
        assert!(result.is_err());
    }
}
