//! Major battle action message parsers
//!
//! These are the primary actions in battle: moves, switches, faints, etc.

use super::battle::{
    Effect, arg, optional_arg, parse_condition, parse_details, parse_int,
    parse_optional_pokemon, parse_pokemon,
};
use super::event::{Knowledge, MajorEvent};
use crate::ParseError;

/// Parse |move|POKEMON|MOVE|TARGET with optional tags
pub fn parse_move(args: &[&str], kw: &Knowledge) -> Result<MajorEvent, ParseError> {
    let pokemon = parse_pokemon(args, 0)?;
    let move_name = arg(args, 1);
    let target = parse_optional_pokemon(args, 2);

    Ok(MajorEvent::Move {
        pokemon,
        move_name,
        target,
        knowledge: kw.clone(),
    })
}

/// Parse |switch|POKEMON|DETAILS|HP STATUS
pub fn parse_switch(args: &[&str], _kw: &Knowledge) -> Result<MajorEvent, ParseError> {
    Ok(MajorEvent::Switch {
        pokemon: parse_pokemon(args, 0)?,
        details: parse_details(args, 1),
        condition: parse_condition(args, 2),
    })
}

/// Parse |drag|POKEMON|DETAILS|HP STATUS
pub fn parse_drag(args: &[&str], _kw: &Knowledge) -> Result<MajorEvent, ParseError> {
    Ok(MajorEvent::Drag {
        pokemon: parse_pokemon(args, 0)?,
        details: parse_details(args, 1),
        condition: parse_condition(args, 2),
    })
}

/// Parse |replace|POKEMON|DETAILS|HP STATUS (Illusion ending)
pub fn parse_replace(args: &[&str], _kw: &Knowledge) -> Result<MajorEvent, ParseError> {
    Ok(MajorEvent::Replace {
        pokemon: parse_pokemon(args, 0)?,
        details: parse_details(args, 1),
        condition: parse_condition(args, 2),
    })
}

/// Parse |detailschange|POKEMON|DETAILS|HP STATUS
pub fn parse_detailschange(args: &[&str], _kw: &Knowledge) -> Result<MajorEvent, ParseError> {
    Ok(MajorEvent::DetailsChange {
        pokemon: parse_pokemon(args, 0)?,
        details: parse_details(args, 1),
        condition: parse_condition(args, 2),
    })
}

/// Parse |swap|POKEMON|POSITION
pub fn parse_swap(args: &[&str], _kw: &Knowledge) -> Result<MajorEvent, ParseError> {
    let pokemon = parse_pokemon(args, 0)?;
    let position = parse_int(&arg(args, 1));

    Ok(MajorEvent::Swap { pokemon, position })
}

/// Parse |faint|POKEMON
pub fn parse_faint(args: &[&str], _kw: &Knowledge) -> Result<MajorEvent, ParseError> {
    Ok(MajorEvent::Faint(parse_pokemon(args, 0)?))
}

/// Parse |cant|POKEMON|REASON or |cant|POKEMON|REASON|MOVE
pub fn parse_cant(args: &[&str], kw: &Knowledge) -> Result<MajorEvent, ParseError> {
    let pokemon = parse_pokemon(args, 0)?;
    let reason = Effect::parse(&arg(args, 1));
    let move_name = optional_arg(args, 2);

    Ok(MajorEvent::Cant {
        pokemon,
        reason,
        move_name,
        knowledge: kw.clone(),
    })
}

/// Parse |callback|ARGS...
pub fn parse_callback(args: &[&str], _kw: &Knowledge) -> Result<MajorEvent, ParseError> {
    Ok(MajorEvent::Callback(
        args.iter().map(|s| s.to_string()).collect(),
    ))
}
