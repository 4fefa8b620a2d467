//! Battle decisions and their `/choose` encoding

use std::fmt;

/// One-per-battle special action attached to a move choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gimmick {
    Terastallize,
    Dynamax,
    ZMove,
    Ultra,
    Mega,
}

impl Gimmick {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gimmick::Terastallize => "terastallize",
            Gimmick::Dynamax => "dynamax",
            Gimmick::ZMove => "zmove",
            Gimmick::Ultra => "ultra",
            Gimmick::Mega => "mega",
        }
    }
}

/// Choice for a single active slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubDecision {
    /// Use the move at 1-based `index`. Negative targets are ally/self
    /// relative, positive targets are foe relative.
    Move {
        index: usize,
        target: Option<i8>,
        gimmick: Option<Gimmick>,
    },
    /// Switch to the roster member at 1-based index
    Switch(usize),
    /// Bring back a fainted roster member (Revival Blessing)
    Revive(usize),
    /// Move to the center slot (triples)
    Shift,
    /// Slot needs no action
    Pass,
    /// Let the server pick
    Wait,
}

impl SubDecision {
    pub fn move_index(index: usize) -> Self {
        SubDecision::Move {
            index,
            target: None,
            gimmick: None,
        }
    }
}

impl fmt::Display for SubDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubDecision::Move {
                index,
                target,
                gimmick,
            } => {
                write!(f, "move {}", index)?;
                if let Some(gimmick) = gimmick {
                    write!(f, " {}", gimmick.as_str())?;
                }
                if let Some(target) = target {
                    write!(f, " {}", target)?;
                }
                Ok(())
            }
            SubDecision::Switch(index) | SubDecision::Revive(index) => {
                write!(f, "switch {}", index)
            }
            SubDecision::Shift => f.write_str("shift"),
            SubDecision::Pass => f.write_str("pass"),
            SubDecision::Wait => f.write_str("default"),
        }
    }
}

/// A complete answer to one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattleDecision {
    /// Lead order for team preview (1-based roster indices)
    TeamOrder(Vec<usize>),
    /// Replacements for fainted or forced-out slots
    ForceSwitch(Vec<SubDecision>),
    /// One choice per active slot
    Active(Vec<SubDecision>),
}

impl BattleDecision {
    /// Number of slot choices carried
    pub fn len(&self) -> usize {
        match self {
            BattleDecision::TeamOrder(order) => order.len(),
            BattleDecision::ForceSwitch(choices) | BattleDecision::Active(choices) => {
                choices.len()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn choices(&self) -> &[SubDecision] {
        match self {
            BattleDecision::TeamOrder(_) => &[],
            BattleDecision::ForceSwitch(choices) | BattleDecision::Active(choices) => choices,
        }
    }

    /// Choice string without the `/choose` prefix ("move 1, switch 3")
    pub fn to_choice_string(&self) -> String {
        match self {
            BattleDecision::TeamOrder(order) => format!(
                "team {}",
                order
                    .iter()
                    .map(|i| i.to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            ),
            BattleDecision::ForceSwitch(choices) | BattleDecision::Active(choices) => choices
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}
