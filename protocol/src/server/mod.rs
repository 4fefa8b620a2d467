pub mod battle;
mod battle_init;
mod battle_major;
mod battle_minor;
mod battle_progress;
pub mod event;
pub mod global;
pub mod knowledge;
mod render;
pub mod request;
pub mod room;
mod tests;

use std::str::FromStr;

use crate::ParseError;
use event::{BattleEvent, Knowledge, MajorEvent, MinorEvent};
pub use global::GlobalMessage;
use knowledge::split_knowledge;
pub use render::render;
pub use room::RoomMessage;

#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    Battle(BattleEvent),
    Room(RoomMessage),
    Global(GlobalMessage),
    Raw(String),
}

/// A websocket frame: an optional `>ROOMID` header and the lines that follow
#[derive(Debug, Clone, PartialEq)]
pub struct ServerFrame {
    pub room_id: Option<String>,
    pub lines: Vec<String>,
}

impl ServerFrame {
    /// Parse every line of the frame; each line succeeds or fails on its own
    pub fn messages(&self) -> impl Iterator<Item = Result<ServerMessage, ParseError>> + '_ {
        self.lines.iter().map(|line| parse_server_message(line))
    }
}

/// Split a complete WebSocket frame into its room id and non-empty lines
pub fn parse_server_frame(frame: &str) -> ServerFrame {
    let mut lines = frame.lines().peekable();
    let mut room_id = None;

    if let Some(room) = lines.peek().and_then(|first| first.strip_prefix('>')) {
        room_id = Some(room.trim().to_string());
        lines.next();
    }

    let lines = lines
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.to_string())
        .collect();

    ServerFrame { room_id, lines }
}

/// Parse a single line from the server into a ServerMessage
pub fn parse_server_message(line: &str) -> Result<ServerMessage, ParseError> {
    let line = line.trim_end_matches(['\r', '\n']);

    if !line.starts_with('|') {
        return Ok(ServerMessage::Raw(line.to_string()));
    }

    let parts: Vec<&str> = line.split('|').collect();
    let args = parts.get(2..).unwrap_or_default();

    match parts.get(1).copied().unwrap_or_default() {
        "init" => room::parse_init(args).map(ServerMessage::Room),
        "deinit" => Ok(ServerMessage::Room(RoomMessage::DeInit)),
        "noinit" => room::parse_noinit(args).map(ServerMessage::Room),
        "title" => room::parse_title(args).map(ServerMessage::Room),
        "error" => room::parse_error(args).map(ServerMessage::Room),
        "updateuser" => global::parse_updateuser(args).map(ServerMessage::Global),
        "formats" => global::parse_formats(args).map(ServerMessage::Global),
        _ => Ok(match parse_battle_line(line)? {
            Some(event) => ServerMessage::Battle(event),
            None => ServerMessage::Raw(line.to_string()),
        }),
    }
}

type MajorParser = fn(&[&str], &Knowledge) -> Result<MajorEvent, ParseError>;
type MinorParser = fn(&[&str], &Knowledge) -> Result<event::MinorAction, ParseError>;

fn major_parser(msg_type: &str) -> Option<MajorParser> {
    let parser: MajorParser = match msg_type {
        // Initialization
        "player" => battle_init::parse_player,
        "teamsize" => battle_init::parse_teamsize,
        "gametype" => battle_init::parse_gametype,
        "gen" => battle_init::parse_gen,
        "tier" => battle_init::parse_tier,
        "rated" => battle_init::parse_rated,
        "rule" => battle_init::parse_rule,
        "clearpoke" => battle_init::parse_clearpoke,
        "poke" => battle_init::parse_poke,
        "teampreview" => battle_init::parse_teampreview,
        "start" => battle_init::parse_start,

        // Progress
        "request" => battle_progress::parse_request,
        "inactive" => battle_progress::parse_inactive,
        "inactiveoff" => battle_progress::parse_inactiveoff,
        "upkeep" => battle_progress::parse_upkeep,
        "turn" => battle_progress::parse_turn,
        "win" => battle_progress::parse_win,
        "tie" | "prematureend" => battle_progress::parse_tie,

        // Actions
        "move" => battle_major::parse_move,
        "switch" => battle_major::parse_switch,
        "drag" => battle_major::parse_drag,
        "replace" => battle_major::parse_replace,
        "detailschange" => battle_major::parse_detailschange,
        "swap" => battle_major::parse_swap,
        "faint" => battle_major::parse_faint,
        "cant" => battle_major::parse_cant,
        "callback" => battle_major::parse_callback,

        _ => return None,
    };
    Some(parser)
}

fn minor_parser(msg_type: &str) -> Option<MinorParser> {
    let parser: MinorParser = match msg_type {
        "-fail" => battle_minor::parse_fail,
        "-block" => battle_minor::parse_block,
        "-notarget" => battle_minor::parse_notarget,
        "-miss" => battle_minor::parse_miss,
        "-damage" => battle_minor::parse_damage,
        "-heal" => battle_minor::parse_heal,
        "-sethp" => battle_minor::parse_sethp,
        "-status" => battle_minor::parse_status,
        "-curestatus" => battle_minor::parse_curestatus,
        "-cureteam" => battle_minor::parse_cureteam,
        "-boost" => battle_minor::parse_boost,
        "-unboost" => battle_minor::parse_unboost,
        "-setboost" => battle_minor::parse_setboost,
        "-swapboost" => battle_minor::parse_swapboost,
        "-invertboost" => battle_minor::parse_invertboost,
        "-clearboost" => battle_minor::parse_clearboost,
        "-clearallboost" => battle_minor::parse_clearallboost,
        "-clearpositiveboost" => battle_minor::parse_clearpositiveboost,
        "-clearnegativeboost" => battle_minor::parse_clearnegativeboost,
        "-copyboost" => battle_minor::parse_copyboost,
        "-weather" => battle_minor::parse_weather,
        "-fieldstart" => battle_minor::parse_fieldstart,
        "-fieldend" => battle_minor::parse_fieldend,
        "-fieldactivate" => battle_minor::parse_fieldactivate,
        "-sidestart" => battle_minor::parse_sidestart,
        "-sideend" => battle_minor::parse_sideend,
        "-swapsideconditions" => battle_minor::parse_swapsideconditions,
        "-start" => battle_minor::parse_start,
        "-end" => battle_minor::parse_end,
        "-crit" => battle_minor::parse_crit,
        "-supereffective" => battle_minor::parse_supereffective,
        "-resisted" => battle_minor::parse_resisted,
        "-immune" => battle_minor::parse_immune,
        "-item" => battle_minor::parse_item,
        "-enditem" => battle_minor::parse_enditem,
        "-ability" => battle_minor::parse_ability,
        "-endability" => battle_minor::parse_endability,
        "-transform" => battle_minor::parse_transform,
        "-formechange" => battle_minor::parse_formechange,
        "-mega" => battle_minor::parse_mega,
        "-primal" => battle_minor::parse_primal,
        "-burst" => battle_minor::parse_burst,
        "-zpower" => battle_minor::parse_zpower,
        "-zbroken" => battle_minor::parse_zbroken,
        "-terastallize" => battle_minor::parse_terastallize,
        "-activate" => battle_minor::parse_activate,
        "-hint" => battle_minor::parse_hint,
        "-center" => battle_minor::parse_center,
        "-message" => battle_minor::parse_message,
        "-combine" => battle_minor::parse_combine,
        "-waiting" => battle_minor::parse_waiting,
        "-prepare" => battle_minor::parse_prepare,
        "-mustrecharge" => battle_minor::parse_mustrecharge,
        "-nothing" => battle_minor::parse_nothing,
        "-hitcount" => battle_minor::parse_hitcount,
        "-singlemove" => battle_minor::parse_singlemove,
        "-singleturn" => battle_minor::parse_singleturn,
        _ => return None,
    };
    Some(parser)
}

/// Parse one battle protocol line into a typed event.
///
/// Returns `Ok(None)` for lines that are not battle events (unknown message
/// types, chat, plain text). Malformed battle lines are a `ParseError`.
pub fn parse_battle_line(line: &str) -> Result<Option<BattleEvent>, ParseError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Err(ParseError::EmptyMessage);
    }

    let Some(body) = line.strip_prefix('|') else {
        return Ok(None);
    };

    let parts: Vec<&str> = body.split('|').collect();
    let msg_type = parts[0];
    let (positional, tags) = split_knowledge(msg_type, &parts[1..]);
    let knowledge = Knowledge::from_tags(tags);

    if msg_type.starts_with('-') {
        let Some(parser) = minor_parser(msg_type) else {
            return Ok(None);
        };
        let action = parser(positional, &knowledge)?;
        Ok(Some(BattleEvent::Minor(MinorEvent::with_knowledge(
            action, knowledge,
        ))))
    } else {
        let Some(parser) = major_parser(msg_type) else {
            return Ok(None);
        };
        Ok(Some(BattleEvent::Major(parser(positional, &knowledge)?)))
    }
}

impl FromStr for BattleEvent {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        parse_battle_line(line)?.ok_or_else(|| ParseError::UnknownMessage(line.to_string()))
    }
}
