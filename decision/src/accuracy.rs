//! Hit chance estimation

use showbot_battle::{BattleGlobalStatus, StatStages, Type, Weather};
use showbot_protocol::Stat;

use crate::dex::{Dex, MoveCategory, MoveData};
use crate::view::Combatant;

/// Probability in [0, 1] that `data` used by `attacker` hits `defender`
pub fn hit_chance(
    dex: &dyn Dex,
    status: &BattleGlobalStatus,
    attacker: &Combatant<'_>,
    defender: &Combatant<'_>,
    move_id: &str,
    data: &MoveData,
) -> f64 {
    let Some(accuracy) = data.accuracy else {
        return 1.0;
    };
    if attacker.has_ability("noguard") || defender.has_ability("noguard") {
        return 1.0;
    }

    let weather = if status.ability_effects.contains("cloudnine") {
        None
    } else {
        status.weather_kind()
    };
    let sure_hit = match move_id {
        "thunder" | "hurricane" => {
            matches!(weather, Some(Weather::Rain | Weather::HeavyRain))
        }
        "blizzard" => matches!(weather, Some(Weather::Snow | Weather::Hail)),
        "toxic" => attacker.types(dex).contains(&Type::Poison),
        _ => false,
    };
    if sure_hit {
        return 1.0;
    }

    let mut chance = accuracy as f64 / 100.0;
    if matches!(move_id, "thunder" | "hurricane")
        && matches!(weather, Some(Weather::Sun | Weather::HarshSun))
    {
        chance = 0.5;
    }

    let stage = if attacker.has_ability("unaware") {
        attacker.boosts().get(Stat::Accuracy)
    } else if defender.has_ability("unaware") || attacker.has_ability("keeneye") {
        attacker.boosts().get(Stat::Accuracy) - defender.boosts().get(Stat::Evasion).min(0)
    } else {
        attacker.boosts().get(Stat::Accuracy) - defender.boosts().get(Stat::Evasion)
    };
    chance *= StatStages::accuracy_multiplier(stage.clamp(-6, 6));

    if attacker.has_ability("compoundeyes") {
        chance *= 1.3;
    }
    if attacker.has_ability("hustle") && data.category == MoveCategory::Physical {
        chance *= 0.8;
    }
    if attacker.item() == Some("widelens") {
        chance *= 1.1;
    }
    if matches!(defender.item(), Some("brightpowder" | "laxincense")) {
        chance *= 0.9;
    }
    match weather {
        Some(Weather::Sand) if defender.has_ability("sandveil") => chance *= 0.8,
        Some(Weather::Snow | Weather::Hail) if defender.has_ability("snowcloak") => chance *= 0.8,
        _ => {}
    }

    chance.clamp(0.0, 1.0)
}
