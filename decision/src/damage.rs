//! Damage estimation
//!
//! A compact version of the standard damage formula over partial knowledge.
//! Unknown stats are bounded by the [`StatsCalculator`]; which end of the
//! bound is used is chosen per side through [`DamageOptions`].
//!
//! Raw estimates are not trusted for decisions as-is: [`DamageEstimator::evaluate`]
//! applies the move exception rules on top.

use showbot_battle::{
    BattleGlobalStatus, StatKnowledge, StatRange, StatStages, Status, Terrain, Type, Volatile,
    Weather,
};
use showbot_protocol::Stat;

use crate::dex::{Dex, MoveCategory, MoveData};
use crate::stats::{StatsCalculator, stats_for};
use crate::view::Combatant;

/// Which end of a stat range to assume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatEstimate {
    Min,
    Mid,
    #[default]
    Max,
}

impl StatEstimate {
    fn pick(self, range: StatRange) -> u32 {
        match self {
            StatEstimate::Min => range.min,
            StatEstimate::Mid => range.mid(),
            StatEstimate::Max => range.max,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DamageUnit {
    #[default]
    Hp,
    /// Percent of the defender's max HP
    Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DamageOptions {
    pub attacker_stats: StatEstimate,
    pub defender_stats: StatEstimate,
    pub unit: DamageUnit,
}

impl DamageOptions {
    pub fn percent() -> Self {
        Self {
            unit: DamageUnit::Percent,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DamageRange {
    pub min: f64,
    pub max: f64,
}

impl DamageRange {
    pub const ZERO: DamageRange = DamageRange { min: 0.0, max: 0.0 };

    pub fn scale(self, factor: f64) -> Self {
        Self {
            min: self.min * factor,
            max: self.max * factor,
        }
    }

    pub fn mid(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn is_zero(&self) -> bool {
        self.max <= 0.0
    }
}

/// Abilities that absorb or ignore a whole attacking type
const TYPE_IMMUNITIES: [(&str, Type); 10] = [
    ("levitate", Type::Ground),
    ("eartheater", Type::Ground),
    ("flashfire", Type::Fire),
    ("wellbakedbody", Type::Fire),
    ("waterabsorb", Type::Water),
    ("stormdrain", Type::Water),
    ("dryskin", Type::Water),
    ("voltabsorb", Type::Electric),
    ("lightningrod", Type::Electric),
    ("sapsipper", Type::Grass),
];

const MOLD_BREAKERS: [&str; 3] = ["moldbreaker", "teravolt", "turboblaze"];

/// Charge moves that skip the charge turn in sun
const SOLAR_MOVES: [&str; 2] = ["solarbeam", "solarblade"];

pub struct DamageEstimator<'a> {
    dex: &'a dyn Dex,
    stats: &'a dyn StatsCalculator,
}

impl<'a> DamageEstimator<'a> {
    pub fn new(dex: &'a dyn Dex, stats: &'a dyn StatsCalculator) -> Self {
        Self { dex, stats }
    }

    pub fn dex(&self) -> &'a dyn Dex {
        self.dex
    }

    /// Raw damage roll range, or `None` when the move, or either pokemon's
    /// species, is unknown
    pub fn estimate(
        &self,
        status: &BattleGlobalStatus,
        attacker: &Combatant<'_>,
        defender: &Combatant<'_>,
        move_id: &str,
        options: &DamageOptions,
    ) -> Option<DamageRange> {
        let data = self.dex.get_move(move_id)?;
        let attacker_stats = stats_for(attacker.pokemon, self.dex, self.stats)?;
        let defender_stats = stats_for(defender.pokemon, self.dex, self.stats)?;
        if data.is_status() || data.base_power == 0 {
            return Some(DamageRange::ZERO);
        }

        let (attack_stat, defense_stat) = match data.category {
            MoveCategory::Physical if move_id == "bodypress" => (Stat::Def, Stat::Def),
            MoveCategory::Physical => (Stat::Atk, Stat::Def),
            _ => (Stat::Spa, Stat::Spd),
        };
        let attack = boosted(
            &attacker_stats,
            attack_stat,
            attacker.boosts().get(attack_stat),
            options.attacker_stats,
        );
        let defense = boosted(
            &defender_stats,
            defense_stat,
            defender.boosts().get(defense_stat),
            options.defender_stats,
        )
        .max(1.0);

        let level = attacker.pokemon.details.level as f64;
        let base = ((2.0 * level / 5.0 + 2.0).floor() * data.base_power as f64 * attack / defense
            / 50.0)
            .floor()
            + 2.0;

        let modifier = self.modifier(status, attacker, defender, move_id, data);
        let mut range = DamageRange {
            min: (base * 0.85).floor() * modifier,
            max: base * modifier,
        };

        if options.unit == DamageUnit::Percent {
            let max_hp = options.defender_stats.pick(defender_stats.hp).max(1) as f64;
            range = range.scale(100.0 / max_hp);
        }
        Some(range)
    }

    /// Estimate adjusted by the exception rules for greedy evaluation
    pub fn evaluate(
        &self,
        status: &BattleGlobalStatus,
        attacker: &Combatant<'_>,
        defender: &Combatant<'_>,
        move_id: &str,
        options: &DamageOptions,
    ) -> Option<DamageRange> {
        let range = self.estimate(status, attacker, defender, move_id, options)?;
        let data = self.dex.get_move(move_id)?;

        if data.flags.self_destruct
            || data.flags.future_move
            || attacker.has_volatile(&Volatile::MustRecharge)
        {
            return Some(DamageRange::ZERO);
        }

        if data.flags.charge && !attacker.has_volatile(&Volatile::TwoTurnMove) {
            if self.has_protection(defender) {
                return Some(DamageRange::ZERO);
            }
            let instant = attacker.item() == Some("powerherb")
                || (SOLAR_MOVES.contains(&move_id)
                    && matches!(
                        status.weather_kind(),
                        Some(Weather::Sun | Weather::HarshSun)
                    ));
            if !instant {
                return Some(range.scale(0.5));
            }
        }

        if data.flags.recharge {
            let remaining = self.remaining_hp(defender, options);
            if range.max < remaining {
                return Some(range.scale(0.5));
            }
        }

        Some(range)
    }

    /// Defender has revealed a protecting move
    fn has_protection(&self, defender: &Combatant<'_>) -> bool {
        defender.pokemon.moves.keys().any(|id| {
            self.dex
                .get_move(id)
                .is_some_and(|data| data.flags.protect)
        })
    }

    /// Defender's current HP in the unit the options produce
    fn remaining_hp(&self, defender: &Combatant<'_>, options: &DamageOptions) -> f64 {
        let percent = defender.pokemon.hp_percent();
        match options.unit {
            DamageUnit::Percent => percent,
            DamageUnit::Hp => {
                let max_hp = stats_for(defender.pokemon, self.dex, self.stats)
                    .map(|s| options.defender_stats.pick(s.hp))
                    .unwrap_or(defender.pokemon.condition.max_hp);
                percent / 100.0 * max_hp as f64
            }
        }
    }

    fn modifier(
        &self,
        status: &BattleGlobalStatus,
        attacker: &Combatant<'_>,
        defender: &Combatant<'_>,
        move_id: &str,
        data: &MoveData,
    ) -> f64 {
        let move_type = data.move_type;
        let mut modifier = 1.0;

        if !status.ability_effects.contains("cloudnine") {
            modifier *= match (status.weather_kind(), move_type) {
                (Some(Weather::Rain), Type::Water) | (Some(Weather::Sun), Type::Fire) => 1.5,
                (Some(Weather::Rain), Type::Fire) | (Some(Weather::Sun), Type::Water) => 0.5,
                (Some(Weather::HeavyRain), Type::Fire) | (Some(Weather::HarshSun), Type::Water) => {
                    0.0
                }
                (Some(Weather::HeavyRain), Type::Water) | (Some(Weather::HarshSun), Type::Fire) => {
                    1.5
                }
                _ => 1.0,
            };
        }

        modifier *= match (status.terrain(), move_type) {
            (Some(Terrain::Electric), Type::Electric)
            | (Some(Terrain::Grassy), Type::Grass)
            | (Some(Terrain::Psychic), Type::Psychic) => 1.3,
            (Some(Terrain::Misty), Type::Dragon) => 0.5,
            _ => 1.0,
        };

        let attacker_types = attacker.types(self.dex);
        if attacker_types.contains(&move_type) {
            let stab = if attacker.has_ability("adaptability") {
                2.0
            } else {
                1.5
            };
            let tera_boost = attacker.pokemon.terastallized == Some(move_type)
                && self
                    .dex
                    .species_or_base(&attacker.pokemon.details.species)
                    .is_some_and(|s| s.types.contains(&move_type));
            modifier *= if tera_boost { 2.0 } else { stab };
        }

        let effectiveness =
            move_type.effectiveness_against(&defender.types(self.dex), status.inverse) as f64;
        modifier *= effectiveness;

        let breaks_mold = MOLD_BREAKERS.iter().any(|a| attacker.has_ability(a));
        if !breaks_mold
            && TYPE_IMMUNITIES
                .iter()
                .any(|(ability, immune)| *immune == move_type && defender.has_ability(ability))
        {
            return 0.0;
        }

        if data.category == MoveCategory::Physical
            && attacker.pokemon.status() == Some(Status::Burn)
            && !attacker.has_ability("guts")
        {
            modifier *= 0.5;
        }

        match attacker.item() {
            Some("choiceband") if data.category == MoveCategory::Physical => modifier *= 1.5,
            Some("choicespecs") if data.category == MoveCategory::Special => modifier *= 1.5,
            Some("lifeorb") => modifier *= 1.3,
            Some("expertbelt") if effectiveness > 1.0 => modifier *= 1.2,
            _ => {}
        }

        if let Some(side) = defender.side {
            let screen = match data.category {
                MoveCategory::Physical => "reflect",
                _ => "lightscreen",
            };
            let screened = side.side_conditions.contains_key(screen)
                || side.side_conditions.contains_key("auroraveil");
            // Brick Break and friends shatter screens before hitting
            let breaks_screens = matches!(move_id, "brickbreak" | "psychicfangs" | "ragingbull");
            if screened && !breaks_screens {
                modifier *= 0.5;
            }
        }

        modifier
    }
}

fn boosted(stats: &StatKnowledge, stat: Stat, stage: i8, estimate: StatEstimate) -> f64 {
    let value = stats.get(stat).map(|r| estimate.pick(r)).unwrap_or(1);
    value as f64 * StatStages::multiplier(stage)
}
