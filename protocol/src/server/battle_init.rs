//! Battle initialization message parsers
//!
//! These messages are sent at the start of a battle to set up the game state.

use super::battle::{GameType, Player, arg, optional_arg, parse_details, parse_int};
use super::event::{Knowledge, MajorEvent};
use crate::ParseError;

fn parse_player_arg(args: &[&str], index: usize) -> Result<Player, ParseError> {
    args.get(index)
        .and_then(|s| Player::parse_prefix(s.trim()))
        .ok_or_else(|| ParseError::MissingField("player".to_string()))
}

/// Parse |player|PLAYER|USERNAME|AVATAR|RATING
pub fn parse_player(args: &[&str], _kw: &Knowledge) -> Result<MajorEvent, ParseError> {
    let player = parse_player_arg(args, 0)?;
    let username = arg(args, 1);
    let avatar = arg(args, 2);
    let rating = args.get(3).and_then(|s| s.parse().ok());

    Ok(MajorEvent::Player {
        player,
        username,
        avatar,
        rating,
    })
}

/// Parse |teamsize|PLAYER|NUMBER
pub fn parse_teamsize(args: &[&str], _kw: &Knowledge) -> Result<MajorEvent, ParseError> {
    let player = parse_player_arg(args, 0)?;
    let size = parse_int(&arg(args, 1));

    Ok(MajorEvent::TeamSize { player, size })
}

/// Parse |gametype|GAMETYPE
pub fn parse_gametype(args: &[&str], _kw: &Knowledge) -> Result<MajorEvent, ParseError> {
    let raw = arg(args, 0);
    let game_type = GameType::parse(&raw)
        .ok_or_else(|| ParseError::InvalidFormat(format!("unknown game type: {}", raw)))?;

    Ok(MajorEvent::GameType(game_type))
}

/// Parse |gen|GENNUM
pub fn parse_gen(args: &[&str], _kw: &Knowledge) -> Result<MajorEvent, ParseError> {
    Ok(MajorEvent::Gen(parse_int(&arg(args, 0))))
}

/// Parse |tier|FORMATNAME
pub fn parse_tier(args: &[&str], _kw: &Knowledge) -> Result<MajorEvent, ParseError> {
    Ok(MajorEvent::Tier(args.join("|")))
}

/// Parse |rated| or |rated|MESSAGE
pub fn parse_rated(args: &[&str], _kw: &Knowledge) -> Result<MajorEvent, ParseError> {
    Ok(MajorEvent::Rated(optional_arg(args, 0)))
}

/// Parse |rule|RULE: DESCRIPTION
pub fn parse_rule(args: &[&str], _kw: &Knowledge) -> Result<MajorEvent, ParseError> {
    Ok(MajorEvent::Rule(args.join("|")))
}

/// Parse |clearpoke
pub fn parse_clearpoke(_args: &[&str], _kw: &Knowledge) -> Result<MajorEvent, ParseError> {
    Ok(MajorEvent::ClearPoke)
}

/// Parse |poke|PLAYER|DETAILS|ITEM
pub fn parse_poke(args: &[&str], _kw: &Knowledge) -> Result<MajorEvent, ParseError> {
    let player = parse_player_arg(args, 0)?;
    let details = parse_details(args, 1);
    let has_item = args.get(2).map(|s| *s == "item").unwrap_or(false);

    Ok(MajorEvent::Poke {
        player,
        details,
        has_item,
    })
}

/// Parse |teampreview or |teampreview|NUMBER
pub fn parse_teampreview(args: &[&str], _kw: &Knowledge) -> Result<MajorEvent, ParseError> {
    let count = args.first().and_then(|s| s.parse().ok());
    Ok(MajorEvent::TeamPreview(count))
}

/// Parse |start
pub fn parse_start(_args: &[&str], _kw: &Knowledge) -> Result<MajorEvent, ParseError> {
    Ok(MajorEvent::Start)
}
