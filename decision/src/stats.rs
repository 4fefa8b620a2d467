//! Stat bounds for pokemon whose spread is hidden

use showbot_battle::{SidePokemon, StatKnowledge, StatRange};

use crate::dex::{BaseStats, Dex, SpeciesData};

const MAX_EV: u32 = 252;
const MAX_IV: u32 = 31;

/// Derives stat knowledge from species data
pub trait StatsCalculator: Send + Sync {
    /// `known` wins wherever it is already exact
    fn stat_knowledge(
        &self,
        species: &SpeciesData,
        level: u8,
        known: Option<&StatKnowledge>,
    ) -> StatKnowledge;
}

/// Standard formula over every legal spread: 0-252 EVs, 0-31 IVs and a
/// hindering to boosting nature
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardStatsCalculator;

impl StandardStatsCalculator {
    pub fn hp(base: u16, iv: u32, ev: u32, level: u8) -> u32 {
        // Shedinja
        if base == 1 {
            return 1;
        }
        let level = level as u32;
        (2 * base as u32 + iv + ev / 4) * level / 100 + level + 10
    }

    pub fn stat(base: u16, iv: u32, ev: u32, level: u8, nature: f64) -> u32 {
        let level = level as u32;
        let raw = (2 * base as u32 + iv + ev / 4) * level / 100 + 5;
        (raw as f64 * nature).floor() as u32
    }

    fn range(base: u16, level: u8) -> StatRange {
        StatRange {
            min: Self::stat(base, 0, 0, level, 0.9),
            max: Self::stat(base, MAX_IV, MAX_EV, level, 1.1),
        }
    }

    fn hp_range(base: u16, level: u8) -> StatRange {
        StatRange {
            min: Self::hp(base, 0, 0, level),
            max: Self::hp(base, MAX_IV, MAX_EV, level),
        }
    }
}

impl StatsCalculator for StandardStatsCalculator {
    fn stat_knowledge(
        &self,
        species: &SpeciesData,
        level: u8,
        known: Option<&StatKnowledge>,
    ) -> StatKnowledge {
        let BaseStats {
            hp,
            atk,
            def,
            spa,
            spd,
            spe,
        } = species.base_stats;
        let derived = StatKnowledge {
            hp: Self::hp_range(hp, level),
            atk: Self::range(atk, level),
            def: Self::range(def, level),
            spa: Self::range(spa, level),
            spd: Self::range(spd, level),
            spe: Self::range(spe, level),
        };
        let Some(known) = known else {
            return derived;
        };

        let pick = |known: StatRange, derived: StatRange| {
            if known.is_exact() { known } else { derived }
        };
        StatKnowledge {
            hp: pick(known.hp, derived.hp),
            atk: pick(known.atk, derived.atk),
            def: pick(known.def, derived.def),
            spa: pick(known.spa, derived.spa),
            spd: pick(known.spd, derived.spd),
            spe: pick(known.spe, derived.spe),
        }
    }
}

/// Best stat knowledge available for a roster member: exact from our own
/// requests, otherwise bounds from its species
pub fn stats_for(
    pokemon: &SidePokemon,
    dex: &dyn Dex,
    calculator: &dyn StatsCalculator,
) -> Option<StatKnowledge> {
    if let Some(stats) = pokemon.stats
        && stats.is_exact()
    {
        return Some(stats);
    }
    let species = dex.species_or_base(&pokemon.details.species)?;
    Some(calculator.stat_knowledge(species, pokemon.details.level, pokemon.stats.as_ref()))
}
