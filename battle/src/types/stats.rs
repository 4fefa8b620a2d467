//! Stat stages and stat knowledge

use showbot_protocol::Stat;

const MIN_STAGE: i8 = -6;
const MAX_STAGE: i8 = 6;

fn stat_index(stat: Stat) -> usize {
    match stat {
        Stat::Atk => 0,
        Stat::Def => 1,
        Stat::Spa => 2,
        Stat::Spd => 3,
        Stat::Spe => 4,
        Stat::Accuracy => 5,
        Stat::Evasion => 6,
    }
}

/// Boost stages for every stat, always within -6..=+6
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatStages {
    stages: [i8; 7],
}

impl StatStages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, stat: Stat) -> i8 {
        self.stages[stat_index(stat)]
    }

    /// Set a stage, clamped to the legal range
    pub fn set(&mut self, stat: Stat, value: i8) {
        self.stages[stat_index(stat)] = value.clamp(MIN_STAGE, MAX_STAGE);
    }

    /// Apply a boost and return the change that actually took effect
    pub fn boost(&mut self, stat: Stat, amount: i8) -> i8 {
        let current = self.get(stat);
        let next = (current as i16 + amount as i16).clamp(MIN_STAGE as i16, MAX_STAGE as i16) as i8;
        self.set(stat, next);
        next - current
    }

    pub fn unboost(&mut self, stat: Stat, amount: i8) -> i8 {
        self.boost(stat, amount.saturating_neg())
    }

    pub fn clear(&mut self) {
        self.stages = [0; 7];
    }

    pub fn clear_positive(&mut self) {
        for stage in self.stages.iter_mut().filter(|s| **s > 0) {
            *stage = 0;
        }
    }

    pub fn clear_negative(&mut self) {
        for stage in self.stages.iter_mut().filter(|s| **s < 0) {
            *stage = 0;
        }
    }

    /// Topsy-Turvy
    pub fn invert(&mut self) {
        for stage in self.stages.iter_mut() {
            *stage = -*stage;
        }
    }

    /// Exchange the listed stats with another pokemon (Guard Swap, Heart Swap)
    pub fn swap_with(&mut self, other: &mut StatStages, stats: &[Stat]) {
        let stats: &[Stat] = if stats.is_empty() { &Stat::ALL } else { stats };
        for stat in stats {
            let i = stat_index(*stat);
            std::mem::swap(&mut self.stages[i], &mut other.stages[i]);
        }
    }

    pub fn is_clear(&self) -> bool {
        self.stages.iter().all(|s| *s == 0)
    }

    /// Multiplier for a battle stat (atk/def/spa/spd/spe): +1 = 1.5x, -1 = 2/3x
    pub fn multiplier(stage: i8) -> f64 {
        let stage = stage.clamp(MIN_STAGE, MAX_STAGE) as f64;
        if stage >= 0.0 {
            (2.0 + stage) / 2.0
        } else {
            2.0 / (2.0 - stage)
        }
    }

    /// Multiplier for accuracy and evasion: +1 = 4/3x, -1 = 3/4x
    pub fn accuracy_multiplier(stage: i8) -> f64 {
        let stage = stage.clamp(MIN_STAGE, MAX_STAGE) as f64;
        if stage >= 0.0 {
            (3.0 + stage) / 3.0
        } else {
            3.0 / (3.0 - stage)
        }
    }
}

/// What is known about one stat value: exact for our own pokemon, a range
/// otherwise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatRange {
    pub min: u32,
    pub max: u32,
}

impl StatRange {
    pub fn exact(value: u32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn is_exact(&self) -> bool {
        self.min == self.max
    }

    pub fn mid(&self) -> u32 {
        (self.min + self.max) / 2
    }
}

/// Stat knowledge for one pokemon (HP and the five battle stats)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatKnowledge {
    pub hp: StatRange,
    pub atk: StatRange,
    pub def: StatRange,
    pub spa: StatRange,
    pub spd: StatRange,
    pub spe: StatRange,
}

impl StatKnowledge {
    /// Look up a battle stat; accuracy and evasion have no base value
    pub fn get(&self, stat: Stat) -> Option<StatRange> {
        match stat {
            Stat::Atk => Some(self.atk),
            Stat::Def => Some(self.def),
            Stat::Spa => Some(self.spa),
            Stat::Spd => Some(self.spd),
            Stat::Spe => Some(self.spe),
            Stat::Accuracy | Stat::Evasion => None,
        }
    }

    pub fn is_exact(&self) -> bool {
        [self.hp, self.atk, self.def, self.spa, self.spd, self.spe]
            .iter()
            .all(StatRange::is_exact)
    }
}
