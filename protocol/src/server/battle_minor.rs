//! Minor battle action message parsers
//!
//! These are secondary effects in battle: damage, stat changes, status, etc.
//! In the official client, they're usually displayed in smaller font.

use super::battle::{
    Effect, Side, Stat, arg, optional_arg, parse_condition, parse_int, parse_optional_pokemon,
    parse_pokemon,
};
use super::event::{Knowledge, MinorAction};
use crate::ParseError;

fn parse_stat(args: &[&str], index: usize) -> Result<Stat, ParseError> {
    let raw = arg(args, index);
    Stat::parse(&raw).ok_or_else(|| ParseError::InvalidFormat(format!("unknown stat: {}", raw)))
}

fn parse_side(args: &[&str], index: usize) -> Result<Side, ParseError> {
    args.get(index)
        .and_then(|s| Side::parse(s))
        .ok_or_else(|| ParseError::MissingField(format!("side at position {}", index)))
}

fn parse_effect(args: &[&str], index: usize) -> Effect {
    Effect::parse(&arg(args, index))
}

/// Remaining args from `from` on, without trailing empties
fn rest(args: &[&str], from: usize) -> Vec<String> {
    let mut extra: Vec<String> = args.iter().skip(from).map(|s| s.to_string()).collect();
    while extra.last().is_some_and(|s| s.is_empty()) {
        extra.pop();
    }
    extra
}

/// Parse |-fail|POKEMON|ACTION
pub fn parse_fail(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::Fail {
        pokemon: parse_pokemon(args, 0)?,
        action: optional_arg(args, 1),
    })
}

/// Parse |-block|POKEMON|EFFECT|MOVE|ATTACKER
pub fn parse_block(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::Block {
        pokemon: parse_pokemon(args, 0)?,
        effect: parse_effect(args, 1),
        move_name: optional_arg(args, 2),
        attacker: parse_optional_pokemon(args, 3),
    })
}

/// Parse |-notarget|POKEMON
pub fn parse_notarget(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::NoTarget(parse_optional_pokemon(args, 0)))
}

/// Parse |-miss|SOURCE|TARGET
pub fn parse_miss(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::Miss {
        source: parse_pokemon(args, 0)?,
        target: parse_optional_pokemon(args, 1),
    })
}

/// Parse |-damage|POKEMON|HP STATUS
pub fn parse_damage(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::Damage {
        pokemon: parse_pokemon(args, 0)?,
        condition: parse_condition(args, 1),
    })
}

/// Parse |-heal|POKEMON|HP STATUS
pub fn parse_heal(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::Heal {
        pokemon: parse_pokemon(args, 0)?,
        condition: parse_condition(args, 1),
    })
}

/// Parse |-sethp|POKEMON|HP
pub fn parse_sethp(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::SetHp {
        pokemon: parse_pokemon(args, 0)?,
        condition: parse_condition(args, 1),
    })
}

/// Parse |-status|POKEMON|STATUS
pub fn parse_status(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::Status {
        pokemon: parse_pokemon(args, 0)?,
        status: arg(args, 1),
    })
}

/// Parse |-curestatus|POKEMON|STATUS
pub fn parse_curestatus(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::CureStatus {
        pokemon: parse_pokemon(args, 0)?,
        status: arg(args, 1),
    })
}

/// Parse |-cureteam|POKEMON
pub fn parse_cureteam(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::CureTeam(parse_pokemon(args, 0)?))
}

/// Parse |-boost|POKEMON|STAT|AMOUNT
pub fn parse_boost(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::Boost {
        pokemon: parse_pokemon(args, 0)?,
        stat: parse_stat(args, 1)?,
        amount: parse_int(&arg(args, 2)),
    })
}

/// Parse |-unboost|POKEMON|STAT|AMOUNT
pub fn parse_unboost(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::Unboost {
        pokemon: parse_pokemon(args, 0)?,
        stat: parse_stat(args, 1)?,
        amount: parse_int(&arg(args, 2)),
    })
}

/// Parse |-setboost|POKEMON|STAT|AMOUNT
pub fn parse_setboost(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::SetBoost {
        pokemon: parse_pokemon(args, 0)?,
        stat: parse_stat(args, 1)?,
        amount: parse_int(&arg(args, 2)),
    })
}

/// Parse |-swapboost|SOURCE|TARGET|STATS
///
/// An empty stat list means every stat was swapped.
pub fn parse_swapboost(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    let stats = args
        .get(2)
        .map(|s| s.split(',').filter_map(Stat::parse).collect())
        .unwrap_or_default();

    Ok(MinorAction::SwapBoost {
        source: parse_pokemon(args, 0)?,
        target: parse_pokemon(args, 1)?,
        stats,
    })
}

/// Parse |-invertboost|POKEMON
pub fn parse_invertboost(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::InvertBoost(parse_pokemon(args, 0)?))
}

/// Parse |-clearboost|POKEMON
pub fn parse_clearboost(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::ClearBoost(parse_pokemon(args, 0)?))
}

/// Parse |-clearallboost
pub fn parse_clearallboost(_args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::ClearAllBoost)
}

/// Parse |-clearpositiveboost|TARGET|POKEMON|EFFECT
pub fn parse_clearpositiveboost(
    args: &[&str],
    _kw: &Knowledge,
) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::ClearPositiveBoost {
        target: parse_pokemon(args, 0)?,
        source: parse_optional_pokemon(args, 1),
        effect: optional_arg(args, 2).map(|s| Effect::parse(&s)),
    })
}

/// Parse |-clearnegativeboost|POKEMON
pub fn parse_clearnegativeboost(
    args: &[&str],
    _kw: &Knowledge,
) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::ClearNegativeBoost(parse_pokemon(args, 0)?))
}

/// Parse |-copyboost|SOURCE|TARGET
pub fn parse_copyboost(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::CopyBoost {
        source: parse_pokemon(args, 0)?,
        target: parse_pokemon(args, 1)?,
    })
}

/// Parse |-weather|WEATHER
pub fn parse_weather(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::Weather(arg(args, 0)))
}

/// Parse |-fieldstart|CONDITION
pub fn parse_fieldstart(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::FieldStart(parse_effect(args, 0)))
}

/// Parse |-fieldend|CONDITION
pub fn parse_fieldend(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::FieldEnd(parse_effect(args, 0)))
}

/// Parse |-fieldactivate|EFFECT
pub fn parse_fieldactivate(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::FieldActivate(parse_effect(args, 0)))
}

/// Parse |-sidestart|SIDE|CONDITION
pub fn parse_sidestart(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::SideStart {
        side: parse_side(args, 0)?,
        condition: parse_effect(args, 1),
    })
}

/// Parse |-sideend|SIDE|CONDITION
pub fn parse_sideend(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::SideEnd {
        side: parse_side(args, 0)?,
        condition: parse_effect(args, 1),
    })
}

/// Parse |-swapsideconditions
pub fn parse_swapsideconditions(
    _args: &[&str],
    _kw: &Knowledge,
) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::SwapSideConditions)
}

/// Parse |-start|POKEMON|EFFECT|EXTRA...
pub fn parse_start(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::Start {
        pokemon: parse_pokemon(args, 0)?,
        effect: parse_effect(args, 1),
        extra: rest(args, 2),
    })
}

/// Parse |-end|POKEMON|EFFECT|EXTRA...
pub fn parse_end(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::End {
        pokemon: parse_pokemon(args, 0)?,
        effect: parse_effect(args, 1),
        extra: rest(args, 2),
    })
}

/// Parse |-crit|POKEMON
pub fn parse_crit(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::Crit(parse_pokemon(args, 0)?))
}

/// Parse |-supereffective|POKEMON
pub fn parse_supereffective(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::SuperEffective(parse_pokemon(args, 0)?))
}

/// Parse |-resisted|POKEMON
pub fn parse_resisted(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::Resisted(parse_pokemon(args, 0)?))
}

/// Parse |-immune|POKEMON
pub fn parse_immune(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::Immune(parse_pokemon(args, 0)?))
}

/// Parse |-item|POKEMON|ITEM
pub fn parse_item(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::Item {
        pokemon: parse_pokemon(args, 0)?,
        item: arg(args, 1),
    })
}

/// Parse |-enditem|POKEMON|ITEM
pub fn parse_enditem(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::EndItem {
        pokemon: parse_pokemon(args, 0)?,
        item: arg(args, 1),
    })
}

/// Parse |-ability|POKEMON|ABILITY
pub fn parse_ability(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::Ability {
        pokemon: parse_pokemon(args, 0)?,
        ability: arg(args, 1),
    })
}

/// Parse |-endability|POKEMON
pub fn parse_endability(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::EndAbility {
        pokemon: parse_pokemon(args, 0)?,
        ability: optional_arg(args, 1),
    })
}

/// Parse |-transform|POKEMON|SPECIES
pub fn parse_transform(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::Transform {
        pokemon: parse_pokemon(args, 0)?,
        target: parse_pokemon(args, 1)?,
    })
}

/// Parse |-formechange|POKEMON|SPECIES|HP STATUS
pub fn parse_formechange(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::FormeChange {
        pokemon: parse_pokemon(args, 0)?,
        species: arg(args, 1),
        condition: parse_condition(args, 2),
    })
}

/// Parse |-mega|POKEMON|SPECIES|MEGASTONE
pub fn parse_mega(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::Mega {
        pokemon: parse_pokemon(args, 0)?,
        species: arg(args, 1),
        megastone: arg(args, 2),
    })
}

/// Parse |-primal|POKEMON
pub fn parse_primal(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::Primal(parse_pokemon(args, 0)?))
}

/// Parse |-burst|POKEMON|SPECIES|ITEM
pub fn parse_burst(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::Burst {
        pokemon: parse_pokemon(args, 0)?,
        species: arg(args, 1),
        item: arg(args, 2),
    })
}

/// Parse |-zpower|POKEMON
pub fn parse_zpower(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::ZPower(parse_pokemon(args, 0)?))
}

/// Parse |-zbroken|POKEMON
pub fn parse_zbroken(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::ZBroken(parse_pokemon(args, 0)?))
}

/// Parse |-terastallize|POKEMON|TYPE
pub fn parse_terastallize(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::Terastallize {
        pokemon: parse_pokemon(args, 0)?,
        tera_type: arg(args, 1),
    })
}

/// Parse |-activate|EFFECT or |-activate|POKEMON|EFFECT|EXTRA...
pub fn parse_activate(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    let pokemon = parse_optional_pokemon(args, 0);
    let effect_index = if pokemon.is_some() || args.first().is_some_and(|s| s.is_empty()) {
        1
    } else {
        0
    };

    Ok(MinorAction::Activate {
        pokemon,
        effect: parse_effect(args, effect_index),
        extra: rest(args, effect_index + 1),
    })
}

/// Parse |-hint|MESSAGE
pub fn parse_hint(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::Hint(args.join("|")))
}

/// Parse |-center
pub fn parse_center(_args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::Center)
}

/// Parse |-message|MESSAGE
pub fn parse_message(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::Message(args.join("|")))
}

/// Parse |-combine
pub fn parse_combine(_args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::Combine)
}

/// Parse |-waiting|SOURCE|TARGET
pub fn parse_waiting(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::Waiting {
        source: parse_pokemon(args, 0)?,
        target: parse_optional_pokemon(args, 1),
    })
}

/// Parse |-prepare|ATTACKER|MOVE|DEFENDER
pub fn parse_prepare(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::Prepare {
        attacker: parse_pokemon(args, 0)?,
        move_name: arg(args, 1),
        defender: parse_optional_pokemon(args, 2),
    })
}

/// Parse |-mustrecharge|POKEMON
pub fn parse_mustrecharge(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::MustRecharge(parse_pokemon(args, 0)?))
}

/// Parse |-nothing
pub fn parse_nothing(_args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::Nothing)
}

/// Parse |-hitcount|POKEMON|NUM
pub fn parse_hitcount(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::HitCount {
        pokemon: parse_pokemon(args, 0)?,
        count: parse_int(&arg(args, 1)),
    })
}

/// Parse |-singlemove|POKEMON|MOVE
pub fn parse_singlemove(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::SingleMove {
        pokemon: parse_pokemon(args, 0)?,
        effect: parse_effect(args, 1),
    })
}

/// Parse |-singleturn|POKEMON|MOVE
pub fn parse_singleturn(args: &[&str], _kw: &Knowledge) -> Result<MinorAction, ParseError> {
    Ok(MinorAction::SingleTurn {
        pokemon: parse_pokemon(args, 0)?,
        effect: parse_effect(args, 1),
    })
}
