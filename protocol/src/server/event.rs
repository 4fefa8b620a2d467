//! Typed battle events
//!
//! Major events structure the battle (switches, moves, turns, requests).
//! Minor events reveal knowledge as side effects (damage, boosts, reveals).

use super::battle::{
    Effect, GameType, HpCondition, Player, PokemonDetails, PokemonIdent, Side, Stat,
};
pub use super::knowledge::Knowledge;
use super::request::BattleRequest;

/// A single parsed battle protocol line
#[derive(Debug, Clone, PartialEq)]
pub enum BattleEvent {
    Major(MajorEvent),
    Minor(MinorEvent),
}

impl BattleEvent {
    /// Protocol message type of the event (`switch`, `-damage`...)
    pub fn msg_type(&self) -> &'static str {
        match self {
            BattleEvent::Major(major) => major.msg_type(),
            BattleEvent::Minor(minor) => minor.action.msg_type(),
        }
    }

    pub fn as_request(&self) -> Option<&BattleRequest> {
        match self {
            BattleEvent::Major(MajorEvent::Request(request)) => Some(request),
            _ => None,
        }
    }
}

impl From<MajorEvent> for BattleEvent {
    fn from(event: MajorEvent) -> Self {
        BattleEvent::Major(event)
    }
}

impl From<MinorEvent> for BattleEvent {
    fn from(event: MinorEvent) -> Self {
        BattleEvent::Minor(event)
    }
}

/// Turn-structuring events
#[derive(Debug, Clone, PartialEq)]
pub enum MajorEvent {
    // Initialization
    /// |gametype|GAMETYPE
    GameType(GameType),
    /// |gen|GENNUM
    Gen(u8),
    /// |tier|FORMATNAME
    Tier(String),
    /// |rule|RULE: DESCRIPTION
    Rule(String),
    /// |rated|MESSAGE
    Rated(Option<String>),
    /// |player|PLAYER|USERNAME|AVATAR|RATING
    Player {
        player: Player,
        username: String,
        avatar: String,
        rating: Option<u32>,
    },
    /// |teamsize|PLAYER|NUMBER
    TeamSize { player: Player, size: u8 },
    /// |clearpoke
    ClearPoke,
    /// |poke|PLAYER|DETAILS|ITEM
    Poke {
        player: Player,
        details: PokemonDetails,
        has_item: bool,
    },
    /// |teampreview|NUMBER
    TeamPreview(Option<u8>),
    /// |start
    Start,

    // Progress
    /// |turn|NUMBER
    Turn(u32),
    /// |upkeep
    Upkeep,
    /// |inactive|MESSAGE
    Inactive(String),
    /// |inactiveoff|MESSAGE
    InactiveOff(String),

    // Switching
    /// |switch|POKEMON|DETAILS|HP STATUS
    Switch {
        pokemon: PokemonIdent,
        details: PokemonDetails,
        condition: Option<HpCondition>,
    },
    /// |drag|POKEMON|DETAILS|HP STATUS
    Drag {
        pokemon: PokemonIdent,
        details: PokemonDetails,
        condition: Option<HpCondition>,
    },
    /// |replace|POKEMON|DETAILS|HP STATUS
    Replace {
        pokemon: PokemonIdent,
        details: PokemonDetails,
        condition: Option<HpCondition>,
    },
    /// |detailschange|POKEMON|DETAILS|HP STATUS
    DetailsChange {
        pokemon: PokemonIdent,
        details: PokemonDetails,
        condition: Option<HpCondition>,
    },
    /// |swap|POKEMON|POSITION
    Swap { pokemon: PokemonIdent, position: usize },
    /// |faint|POKEMON
    Faint(PokemonIdent),

    // Actions
    /// |move|POKEMON|MOVE|TARGET
    Move {
        pokemon: PokemonIdent,
        move_name: String,
        target: Option<PokemonIdent>,
        knowledge: Knowledge,
    },
    /// |cant|POKEMON|REASON|MOVE
    Cant {
        pokemon: PokemonIdent,
        reason: Effect,
        move_name: Option<String>,
        knowledge: Knowledge,
    },
    /// |callback|ARGS...
    Callback(Vec<String>),

    /// |request|JSON
    Request(Box<BattleRequest>),

    /// |win|USER, |tie, |prematureend, or a null request document
    BattleEnded { winner: Option<String>, tie: bool },
}

impl MajorEvent {
    pub fn msg_type(&self) -> &'static str {
        match self {
            MajorEvent::GameType(_) => "gametype",
            MajorEvent::Gen(_) => "gen",
            MajorEvent::Tier(_) => "tier",
            MajorEvent::Rule(_) => "rule",
            MajorEvent::Rated(_) => "rated",
            MajorEvent::Player { .. } => "player",
            MajorEvent::TeamSize { .. } => "teamsize",
            MajorEvent::ClearPoke => "clearpoke",
            MajorEvent::Poke { .. } => "poke",
            MajorEvent::TeamPreview(_) => "teampreview",
            MajorEvent::Start => "start",
            MajorEvent::Turn(_) => "turn",
            MajorEvent::Upkeep => "upkeep",
            MajorEvent::Inactive(_) => "inactive",
            MajorEvent::InactiveOff(_) => "inactiveoff",
            MajorEvent::Switch { .. } => "switch",
            MajorEvent::Drag { .. } => "drag",
            MajorEvent::Replace { .. } => "replace",
            MajorEvent::DetailsChange { .. } => "detailschange",
            MajorEvent::Swap { .. } => "swap",
            MajorEvent::Faint(_) => "faint",
            MajorEvent::Move { .. } => "move",
            MajorEvent::Cant { .. } => "cant",
            MajorEvent::Callback(_) => "callback",
            MajorEvent::Request(_) => "request",
            MajorEvent::BattleEnded { winner: Some(_), .. } => "win",
            MajorEvent::BattleEnded { .. } => "tie",
        }
    }

    /// Seconds left on the battle timer, when this is a time-low notice
    /// (30 seconds or less)
    pub fn time_low_seconds(&self) -> Option<u32> {
        let MajorEvent::Inactive(message) = self else {
            return None;
        };
        let seconds = seconds_before(message, " seconds left")
            .or_else(|| seconds_before(message, " sec this turn"))
            .or_else(|| seconds_before(message, " sec"))?;
        (seconds <= 30).then_some(seconds)
    }
}

/// Read the integer that immediately precedes `suffix` in `message`
fn seconds_before(message: &str, suffix: &str) -> Option<u32> {
    let end = message.find(suffix)?;
    let head = &message[..end];
    let start = head
        .rfind(|c: char| !c.is_ascii_digit())
        .map(|i| i + 1)
        .unwrap_or(0);
    head[start..].parse().ok()
}

/// A knowledge-revealing event together with its `[from]`/`[of]` attribution
#[derive(Debug, Clone, PartialEq)]
pub struct MinorEvent {
    pub action: MinorAction,
    pub knowledge: Knowledge,
}

impl MinorEvent {
    pub fn new(action: MinorAction) -> Self {
        MinorEvent {
            action,
            knowledge: Knowledge::default(),
        }
    }

    pub fn with_knowledge(action: MinorAction, knowledge: Knowledge) -> Self {
        MinorEvent { action, knowledge }
    }

    pub fn from_effect(&self) -> Option<&Effect> {
        self.knowledge.from_effect.as_ref()
    }

    pub fn of_pokemon(&self) -> Option<&PokemonIdent> {
        self.knowledge.of_pokemon.as_ref()
    }
}

/// Minor action payloads
#[derive(Debug, Clone, PartialEq)]
pub enum MinorAction {
    // HP
    /// |-damage|POKEMON|HP STATUS
    Damage {
        pokemon: PokemonIdent,
        condition: Option<HpCondition>,
    },
    /// |-heal|POKEMON|HP STATUS
    Heal {
        pokemon: PokemonIdent,
        condition: Option<HpCondition>,
    },
    /// |-sethp|POKEMON|HP
    SetHp {
        pokemon: PokemonIdent,
        condition: Option<HpCondition>,
    },

    // Boosts
    /// |-boost|POKEMON|STAT|AMOUNT
    Boost {
        pokemon: PokemonIdent,
        stat: Stat,
        amount: i8,
    },
    /// |-unboost|POKEMON|STAT|AMOUNT
    Unboost {
        pokemon: PokemonIdent,
        stat: Stat,
        amount: i8,
    },
    /// |-setboost|POKEMON|STAT|AMOUNT
    SetBoost {
        pokemon: PokemonIdent,
        stat: Stat,
        amount: i8,
    },
    /// |-swapboost|SOURCE|TARGET|STATS
    SwapBoost {
        source: PokemonIdent,
        target: PokemonIdent,
        stats: Vec<Stat>,
    },
    /// |-invertboost|POKEMON
    InvertBoost(PokemonIdent),
    /// |-clearboost|POKEMON
    ClearBoost(PokemonIdent),
    /// |-clearallboost
    ClearAllBoost,
    /// |-clearpositiveboost|TARGET|POKEMON|EFFECT
    ClearPositiveBoost {
        target: PokemonIdent,
        source: Option<PokemonIdent>,
        effect: Option<Effect>,
    },
    /// |-clearnegativeboost|POKEMON
    ClearNegativeBoost(PokemonIdent),
    /// |-copyboost|SOURCE|TARGET
    CopyBoost {
        source: PokemonIdent,
        target: PokemonIdent,
    },

    // Move outcomes
    /// |-crit|POKEMON
    Crit(PokemonIdent),
    /// |-supereffective|POKEMON
    SuperEffective(PokemonIdent),
    /// |-resisted|POKEMON
    Resisted(PokemonIdent),
    /// |-immune|POKEMON
    Immune(PokemonIdent),
    /// |-miss|SOURCE|TARGET
    Miss {
        source: PokemonIdent,
        target: Option<PokemonIdent>,
    },
    /// |-fail|POKEMON|ACTION
    Fail {
        pokemon: PokemonIdent,
        action: Option<String>,
    },
    /// |-block|POKEMON|EFFECT|MOVE|ATTACKER
    Block {
        pokemon: PokemonIdent,
        effect: Effect,
        move_name: Option<String>,
        attacker: Option<PokemonIdent>,
    },
    /// |-notarget|POKEMON
    NoTarget(Option<PokemonIdent>),
    /// |-prepare|ATTACKER|MOVE|DEFENDER
    Prepare {
        attacker: PokemonIdent,
        move_name: String,
        defender: Option<PokemonIdent>,
    },
    /// |-mustrecharge|POKEMON
    MustRecharge(PokemonIdent),
    /// |-hitcount|POKEMON|NUM
    HitCount { pokemon: PokemonIdent, count: u32 },

    // Status
    /// |-status|POKEMON|STATUS
    Status { pokemon: PokemonIdent, status: String },
    /// |-curestatus|POKEMON|STATUS
    CureStatus { pokemon: PokemonIdent, status: String },
    /// |-cureteam|POKEMON
    CureTeam(PokemonIdent),

    // Items and abilities
    /// |-item|POKEMON|ITEM
    Item { pokemon: PokemonIdent, item: String },
    /// |-enditem|POKEMON|ITEM
    EndItem { pokemon: PokemonIdent, item: String },
    /// |-ability|POKEMON|ABILITY
    Ability {
        pokemon: PokemonIdent,
        ability: String,
    },
    /// |-endability|POKEMON
    EndAbility {
        pokemon: PokemonIdent,
        ability: Option<String>,
    },

    // Forme changes and gimmicks
    /// |-transform|POKEMON|TARGET
    Transform {
        pokemon: PokemonIdent,
        target: PokemonIdent,
    },
    /// |-formechange|POKEMON|SPECIES|HP STATUS
    FormeChange {
        pokemon: PokemonIdent,
        species: String,
        condition: Option<HpCondition>,
    },
    /// |-mega|POKEMON|SPECIES|MEGASTONE
    Mega {
        pokemon: PokemonIdent,
        species: String,
        megastone: String,
    },
    /// |-primal|POKEMON
    Primal(PokemonIdent),
    /// |-burst|POKEMON|SPECIES|ITEM
    Burst {
        pokemon: PokemonIdent,
        species: String,
        item: String,
    },
    /// |-zpower|POKEMON
    ZPower(PokemonIdent),
    /// |-zbroken|POKEMON
    ZBroken(PokemonIdent),
    /// |-terastallize|POKEMON|TYPE
    Terastallize {
        pokemon: PokemonIdent,
        tera_type: String,
    },

    // Volatile effects
    /// |-start|POKEMON|EFFECT|EXTRA...
    Start {
        pokemon: PokemonIdent,
        effect: Effect,
        extra: Vec<String>,
    },
    /// |-end|POKEMON|EFFECT|EXTRA...
    End {
        pokemon: PokemonIdent,
        effect: Effect,
        extra: Vec<String>,
    },
    /// |-singleturn|POKEMON|EFFECT
    SingleTurn { pokemon: PokemonIdent, effect: Effect },
    /// |-singlemove|POKEMON|EFFECT
    SingleMove { pokemon: PokemonIdent, effect: Effect },
    /// |-activate|POKEMON|EFFECT|EXTRA...
    Activate {
        pokemon: Option<PokemonIdent>,
        effect: Effect,
        extra: Vec<String>,
    },

    // Side and field
    /// |-sidestart|SIDE|CONDITION
    SideStart { side: Side, condition: Effect },
    /// |-sideend|SIDE|CONDITION
    SideEnd { side: Side, condition: Effect },
    /// |-swapsideconditions
    SwapSideConditions,
    /// |-weather|WEATHER
    Weather(String),
    /// |-fieldstart|CONDITION
    FieldStart(Effect),
    /// |-fieldend|CONDITION
    FieldEnd(Effect),
    /// |-fieldactivate|EFFECT
    FieldActivate(Effect),

    // Miscellaneous
    /// |-center
    Center,
    /// |-combine
    Combine,
    /// |-waiting|SOURCE|TARGET
    Waiting {
        source: PokemonIdent,
        target: Option<PokemonIdent>,
    },
    /// |-nothing
    Nothing,
    /// |-hint|MESSAGE
    Hint(String),
    /// |-message|MESSAGE
    Message(String),
}

impl MinorAction {
    pub fn msg_type(&self) -> &'static str {
        match self {
            MinorAction::Damage { .. } => "-damage",
            MinorAction::Heal { .. } => "-heal",
            MinorAction::SetHp { .. } => "-sethp",
            MinorAction::Boost { .. } => "-boost",
            MinorAction::Unboost { .. } => "-unboost",
            MinorAction::SetBoost { .. } => "-setboost",
            MinorAction::SwapBoost { .. } => "-swapboost",
            MinorAction::InvertBoost(_) => "-invertboost",
            MinorAction::ClearBoost(_) => "-clearboost",
            MinorAction::ClearAllBoost => "-clearallboost",
            MinorAction::ClearPositiveBoost { .. } => "-clearpositiveboost",
            MinorAction::ClearNegativeBoost(_) => "-clearnegativeboost",
            MinorAction::CopyBoost { .. } => "-copyboost",
            MinorAction::Crit(_) => "-crit",
            MinorAction::SuperEffective(_) => "-supereffective",
            MinorAction::Resisted(_) => "-resisted",
            MinorAction::Immune(_) => "-immune",
            MinorAction::Miss { .. } => "-miss",
            MinorAction::Fail { .. } => "-fail",
            MinorAction::Block { .. } => "-block",
            MinorAction::NoTarget(_) => "-notarget",
            MinorAction::Prepare { .. } => "-prepare",
            MinorAction::MustRecharge(_) => "-mustrecharge",
            MinorAction::HitCount { .. } => "-hitcount",
            MinorAction::Status { .. } => "-status",
            MinorAction::CureStatus { .. } => "-curestatus",
            MinorAction::CureTeam(_) => "-cureteam",
            MinorAction::Item { .. } => "-item",
            MinorAction::EndItem { .. } => "-enditem",
            MinorAction::Ability { .. } => "-ability",
            MinorAction::EndAbility { .. } => "-endability",
            MinorAction::Transform { .. } => "-transform",
            MinorAction::FormeChange { .. } => "-formechange",
            MinorAction::Mega { .. } => "-mega",
            MinorAction::Primal(_) => "-primal",
            MinorAction::Burst { .. } => "-burst",
            MinorAction::ZPower(_) => "-zpower",
            MinorAction::ZBroken(_) => "-zbroken",
            MinorAction::Terastallize { .. } => "-terastallize",
            MinorAction::Start { .. } => "-start",
            MinorAction::End { .. } => "-end",
            MinorAction::SingleTurn { .. } => "-singleturn",
            MinorAction::SingleMove { .. } => "-singlemove",
            MinorAction::Activate { .. } => "-activate",
            MinorAction::SideStart { .. } => "-sidestart",
            MinorAction::SideEnd { .. } => "-sideend",
            MinorAction::SwapSideConditions => "-swapsideconditions",
            MinorAction::Weather(_) => "-weather",
            MinorAction::FieldStart(_) => "-fieldstart",
            MinorAction::FieldEnd(_) => "-fieldend",
            MinorAction::FieldActivate(_) => "-fieldactivate",
            MinorAction::Center => "-center",
            MinorAction::Combine => "-combine",
            MinorAction::Waiting { .. } => "-waiting",
            MinorAction::Nothing => "-nothing",
            MinorAction::Hint(_) => "-hint",
            MinorAction::Message(_) => "-message",
        }
    }
}
