//! Battle progress message parsers
//!
//! These messages track the flow and state of a battle.

use super::battle::{arg, parse_int};
use super::event::{Knowledge, MajorEvent};
use super::request::BattleRequest;
use crate::ParseError;
use serde_json::Value;

/// Parse |request|REQUEST (JSON)
///
/// A `null` document means the battle ended without a winner.
pub fn parse_request(args: &[&str], _kw: &Knowledge) -> Result<MajorEvent, ParseError> {
    let json_str = args.join("|");
    if json_str.trim().is_empty() {
        return Err(ParseError::MissingField("request document".to_string()));
    }

    let value: Value = serde_json::from_str(&json_str)?;
    if value.is_null() {
        return Ok(MajorEvent::BattleEnded {
            winner: None,
            tie: true,
        });
    }

    let request: BattleRequest = serde_json::from_value(value)?;
    Ok(MajorEvent::Request(Box::new(request)))
}

/// Parse |inactive|MESSAGE
pub fn parse_inactive(args: &[&str], _kw: &Knowledge) -> Result<MajorEvent, ParseError> {
    Ok(MajorEvent::Inactive(args.join("|")))
}

/// Parse |inactiveoff|MESSAGE
pub fn parse_inactiveoff(args: &[&str], _kw: &Knowledge) -> Result<MajorEvent, ParseError> {
    Ok(MajorEvent::InactiveOff(args.join("|")))
}

/// Parse |upkeep
pub fn parse_upkeep(_args: &[&str], _kw: &Knowledge) -> Result<MajorEvent, ParseError> {
    Ok(MajorEvent::Upkeep)
}

/// Parse |turn|NUMBER
pub fn parse_turn(args: &[&str], _kw: &Knowledge) -> Result<MajorEvent, ParseError> {
    Ok(MajorEvent::Turn(parse_int(&arg(args, 0))))
}

/// Parse |win|USER
pub fn parse_win(args: &[&str], _kw: &Knowledge) -> Result<MajorEvent, ParseError> {
    Ok(MajorEvent::BattleEnded {
        winner: Some(args.join("|")),
        tie: false,
    })
}

/// Parse |tie and |prematureend
pub fn parse_tie(_args: &[&str], _kw: &Knowledge) -> Result<MajorEvent, ParseError> {
    Ok(MajorEvent::BattleEnded {
        winner: None,
        tie: true,
    })
}
