//! Rendering typed events back into canonical protocol lines

use super::event::{BattleEvent, Knowledge, MajorEvent, MinorAction};

/// Join a message type, its positional args and knowledge into one line.
/// Trailing empty positionals are dropped.
fn line(msg_type: &str, mut args: Vec<String>, knowledge: Option<&Knowledge>) -> String {
    while args.last().is_some_and(|s| s.is_empty()) {
        args.pop();
    }
    if let Some(knowledge) = knowledge {
        args.extend(knowledge.to_args());
    }

    let mut out = format!("|{}", msg_type);
    for arg in args {
        out.push('|');
        out.push_str(&arg);
    }
    out
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

/// Render an event as the protocol line that would produce it
pub fn render(event: &BattleEvent) -> String {
    match event {
        BattleEvent::Major(major) => render_major(major),
        BattleEvent::Minor(minor) => line(
            minor.action.msg_type(),
            minor_args(&minor.action),
            Some(&minor.knowledge),
        ),
    }
}

fn render_major(event: &MajorEvent) -> String {
    let msg_type = event.msg_type();
    let (args, knowledge): (Vec<String>, Option<&Knowledge>) = match event {
        MajorEvent::GameType(game_type) => (vec![game_type.as_str().to_string()], None),
        MajorEvent::Gen(generation) => (vec![generation.to_string()], None),
        MajorEvent::Tier(tier) => (vec![tier.clone()], None),
        MajorEvent::Rule(rule) => (vec![rule.clone()], None),
        MajorEvent::Rated(message) => (vec![opt(message)], None),
        MajorEvent::Player {
            player,
            username,
            avatar,
            rating,
        } => (
            vec![
                player.to_string(),
                username.clone(),
                avatar.clone(),
                opt(rating),
            ],
            None,
        ),
        MajorEvent::TeamSize { player, size } => (vec![player.to_string(), size.to_string()], None),
        MajorEvent::ClearPoke | MajorEvent::Start | MajorEvent::Upkeep => (Vec::new(), None),
        MajorEvent::Poke {
            player,
            details,
            has_item,
        } => (
            vec![
                player.to_string(),
                details.to_string(),
                if *has_item { "item".to_string() } else { String::new() },
            ],
            None,
        ),
        MajorEvent::TeamPreview(count) => (vec![opt(count)], None),
        MajorEvent::Turn(turn) => (vec![turn.to_string()], None),
        MajorEvent::Inactive(message) | MajorEvent::InactiveOff(message) => {
            (vec![message.clone()], None)
        }
        MajorEvent::Switch {
            pokemon,
            details,
            condition,
        }
        | MajorEvent::Drag {
            pokemon,
            details,
            condition,
        }
        | MajorEvent::Replace {
            pokemon,
            details,
            condition,
        }
        | MajorEvent::DetailsChange {
            pokemon,
            details,
            condition,
        } => (
            vec![pokemon.to_string(), details.to_string(), opt(condition)],
            None,
        ),
        MajorEvent::Swap { pokemon, position } => {
            (vec![pokemon.to_string(), position.to_string()], None)
        }
        MajorEvent::Faint(pokemon) => (vec![pokemon.to_string()], None),
        MajorEvent::Move {
            pokemon,
            move_name,
            target,
            knowledge,
        } => (
            vec![pokemon.to_string(), move_name.clone(), opt(target)],
            Some(knowledge),
        ),
        MajorEvent::Cant {
            pokemon,
            reason,
            move_name,
            knowledge,
        } => (
            vec![pokemon.to_string(), reason.to_string(), opt(move_name)],
            Some(knowledge),
        ),
        MajorEvent::Callback(args) => (args.clone(), None),
        MajorEvent::Request(request) => (
            vec![serde_json::to_string(request).unwrap_or_default()],
            None,
        ),
        MajorEvent::BattleEnded { winner, .. } => (vec![opt(winner)], None),
    };

    line(msg_type, args, knowledge)
}

fn minor_args(action: &MinorAction) -> Vec<String> {
    match action {
        MinorAction::Damage { pokemon, condition }
        | MinorAction::Heal { pokemon, condition }
        | MinorAction::SetHp { pokemon, condition } => {
            vec![pokemon.to_string(), opt(condition)]
        }
        MinorAction::Boost {
            pokemon,
            stat,
            amount,
        }
        | MinorAction::Unboost {
            pokemon,
            stat,
            amount,
        }
        | MinorAction::SetBoost {
            pokemon,
            stat,
            amount,
        } => vec![
            pokemon.to_string(),
            stat.as_str().to_string(),
            amount.to_string(),
        ],
        MinorAction::SwapBoost {
            source,
            target,
            stats,
        } => vec![
            source.to_string(),
            target.to_string(),
            stats
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        ],
        MinorAction::InvertBoost(pokemon)
        | MinorAction::ClearBoost(pokemon)
        | MinorAction::ClearNegativeBoost(pokemon)
        | MinorAction::Crit(pokemon)
        | MinorAction::SuperEffective(pokemon)
        | MinorAction::Resisted(pokemon)
        | MinorAction::Immune(pokemon)
        | MinorAction::MustRecharge(pokemon)
        | MinorAction::CureTeam(pokemon)
        | MinorAction::Primal(pokemon)
        | MinorAction::ZPower(pokemon)
        | MinorAction::ZBroken(pokemon) => vec![pokemon.to_string()],
        MinorAction::ClearAllBoost
        | MinorAction::SwapSideConditions
        | MinorAction::Center
        | MinorAction::Combine
        | MinorAction::Nothing => Vec::new(),
        MinorAction::ClearPositiveBoost {
            target,
            source,
            effect,
        } => vec![target.to_string(), opt(source), opt(effect)],
        MinorAction::CopyBoost { source, target } => vec![source.to_string(), target.to_string()],
        MinorAction::Miss { source, target } | MinorAction::Waiting { source, target } => {
            vec![source.to_string(), opt(target)]
        }
        MinorAction::Fail { pokemon, action } => vec![pokemon.to_string(), opt(action)],
        MinorAction::Block {
            pokemon,
            effect,
            move_name,
            attacker,
        } => vec![
            pokemon.to_string(),
            effect.to_string(),
            opt(move_name),
            opt(attacker),
        ],
        MinorAction::NoTarget(pokemon) => vec![opt(pokemon)],
        MinorAction::Prepare {
            attacker,
            move_name,
            defender,
        } => vec![attacker.to_string(), move_name.clone(), opt(defender)],
        MinorAction::HitCount { pokemon, count } => vec![pokemon.to_string(), count.to_string()],
        MinorAction::Status { pokemon, status } | MinorAction::CureStatus { pokemon, status } => {
            vec![pokemon.to_string(), status.clone()]
        }
        MinorAction::Item { pokemon, item } | MinorAction::EndItem { pokemon, item } => {
            vec![pokemon.to_string(), item.clone()]
        }
        MinorAction::Ability { pokemon, ability } => vec![pokemon.to_string(), ability.clone()],
        MinorAction::EndAbility { pokemon, ability } => vec![pokemon.to_string(), opt(ability)],
        MinorAction::Transform { pokemon, target } => vec![pokemon.to_string(), target.to_string()],
        MinorAction::FormeChange {
            pokemon,
            species,
            condition,
        } => vec![pokemon.to_string(), species.clone(), opt(condition)],
        MinorAction::Mega {
            pokemon,
            species,
            megastone: item,
        }
        | MinorAction::Burst {
            pokemon,
            species,
            item,
        } => vec![pokemon.to_string(), species.clone(), item.clone()],
        MinorAction::Terastallize { pokemon, tera_type } => {
            vec![pokemon.to_string(), tera_type.clone()]
        }
        MinorAction::Start {
            pokemon,
            effect,
            extra,
        }
        | MinorAction::End {
            pokemon,
            effect,
            extra,
        } => {
            let mut args = vec![pokemon.to_string(), effect.to_string()];
            args.extend(extra.iter().cloned());
            args
        }
        MinorAction::SingleTurn { pokemon, effect } | MinorAction::SingleMove { pokemon, effect } => {
            vec![pokemon.to_string(), effect.to_string()]
        }
        MinorAction::Activate {
            pokemon,
            effect,
            extra,
        } => {
            let mut args = Vec::new();
            if let Some(pokemon) = pokemon {
                args.push(pokemon.to_string());
            }
            args.push(effect.to_string());
            args.extend(extra.iter().cloned());
            args
        }
        MinorAction::SideStart { side, condition } | MinorAction::SideEnd { side, condition } => {
            vec![side.raw.clone(), condition.to_string()]
        }
        MinorAction::Weather(weather) => vec![weather.clone()],
        MinorAction::FieldStart(effect)
        | MinorAction::FieldEnd(effect)
        | MinorAction::FieldActivate(effect) => vec![effect.to_string()],
        MinorAction::Hint(message) | MinorAction::Message(message) => vec![message.clone()],
    }
}
