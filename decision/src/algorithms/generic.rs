use std::sync::Arc;

use showbot_battle::Type;
use showbot_protocol::{BattleDecision, SubDecision};

use super::{DecisionAlgorithm, chosen_move, pick_best, targets_of, user_at};
use crate::context::DecisionContext;
use crate::dex::{Dex, StaticDex};
use crate::error::DecisionError;
use crate::legal::LegalChoices;
use crate::view::{Combatant, opposing_active};

/// Tuning for [`GenericAlgorithm`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenericOptions {
    /// Effectiveness of an opponent's STAB at which the active pokemon is in
    /// a bad matchup
    pub switch_threshold: f32,
    /// Never switch a slot that switched on the previous decision
    pub avoid_consecutive_switch: bool,
    /// Attach available gimmicks to the chosen move
    pub use_gimmicks: bool,
}

impl Default for GenericOptions {
    fn default() -> Self {
        Self {
            switch_threshold: 2.0,
            avoid_consecutive_switch: true,
            use_gimmicks: false,
        }
    }
}

/// Rule-based play from type matchups: leave bad matchups, otherwise use
/// the strongest STAB or super effective move
pub struct GenericAlgorithm {
    dex: Arc<dyn Dex>,
    options: GenericOptions,
}

impl Default for GenericAlgorithm {
    fn default() -> Self {
        Self::new(Arc::new(StaticDex::new()), GenericOptions::default())
    }
}

impl GenericAlgorithm {
    pub fn new(dex: Arc<dyn Dex>, options: GenericOptions) -> Self {
        Self { dex, options }
    }

    /// Highest effectiveness any opposing STAB type has against `types`
    fn threat(&self, types: &[Type], opponents: &[Combatant<'_>], inverse: bool) -> f32 {
        opponents
            .iter()
            .flat_map(|opponent| opponent.types(self.dex.as_ref()))
            .map(|attacking| attacking.effectiveness_against(types, inverse))
            .fold(0.0, f32::max)
    }

    /// Best effectiveness of any damaging move in `moves` against `opponents`
    fn offense(&self, moves: &[String], opponents: &[Combatant<'_>], inverse: bool) -> f32 {
        moves
            .iter()
            .filter_map(|id| self.dex.get_move(id))
            .filter(|data| !data.is_status())
            .flat_map(|data| {
                opponents.iter().map(move |opponent| (data.move_type, opponent))
            })
            .map(|(move_type, opponent)| {
                move_type.effectiveness_against(&opponent.types(self.dex.as_ref()), inverse)
            })
            .fold(0.0, f32::max)
    }

    fn move_score(
        &self,
        context: &DecisionContext,
        slot: usize,
        choice: &SubDecision,
        user: Option<&Combatant<'_>>,
    ) -> f64 {
        let battle = &context.battle;
        let Some(data) = chosen_move(battle, slot, choice).and_then(|m| self.dex.get_move(&m.id))
        else {
            return 0.5;
        };
        if data.is_status() {
            return 1.0;
        }
        let stab = match user {
            Some(user) if user.types(self.dex.as_ref()).contains(&data.move_type) => 1.5,
            _ => 1.0,
        };
        let targets = targets_of(battle, slot, choice);
        let effectiveness = if targets.is_empty() {
            1.0
        } else {
            targets
                .iter()
                .map(|t| {
                    data.move_type
                        .effectiveness_against(&t.types(self.dex.as_ref()), battle.status.inverse)
                        as f64
                })
                .sum::<f64>()
        };
        let accuracy = data.accuracy.map_or(1.0, |a| a as f64 / 100.0);
        let gimmick = match choice {
            SubDecision::Move {
                gimmick: Some(_), ..
            } if self.options.use_gimmicks => 1.05,
            SubDecision::Move {
                gimmick: Some(_), ..
            } => 0.95,
            _ => 1.0,
        };
        data.base_power as f64 * stab * effectiveness * accuracy * gimmick
    }

    /// Matchup value of roster member `index` (1-based request index)
    fn switch_score(&self, context: &DecisionContext, index: usize) -> f64 {
        let battle = &context.battle;
        let (Some(me), Some(request)) = (battle.me(), battle.request.as_ref()) else {
            return 0.0;
        };
        let Some(member) = request.roster().get(index.saturating_sub(1)) else {
            return 0.0;
        };
        let Some(tracked) = me.resolve(&member.ident).and_then(|i| me.team.get(i)) else {
            return 0.0;
        };
        let candidate = Combatant::of(me, tracked);
        let opponents = opposing_active(battle);
        let inverse = battle.status.inverse;
        let moves: Vec<String> = tracked.moves.keys().cloned().collect();
        let types = candidate.types(self.dex.as_ref());
        self.offense(&moves, &opponents, inverse) as f64
            - self.threat(&types, &opponents, inverse) as f64
            + tracked.hp_percent() / 100.0
    }

    fn switched_last_time(&self, context: &DecisionContext, slot: usize) -> bool {
        context.history.last().is_some_and(|entry| {
            matches!(entry.decision, BattleDecision::Active(_))
                && matches!(entry.decision.choices().get(slot), Some(SubDecision::Switch(_)))
        })
    }

    fn in_bad_matchup(&self, context: &DecisionContext, user: &Combatant<'_>) -> bool {
        let battle = &context.battle;
        let opponents = opposing_active(battle);
        let inverse = battle.status.inverse;
        let types = user.types(self.dex.as_ref());
        let moves: Vec<String> = user.pokemon.moves.keys().cloned().collect();
        self.threat(&types, &opponents, inverse) >= self.options.switch_threshold
            && self.offense(&moves, &opponents, inverse) < self.options.switch_threshold
    }
}

impl DecisionAlgorithm for GenericAlgorithm {
    fn name(&self) -> &str {
        "generic"
    }

    fn decide(&self, context: &DecisionContext) -> Result<BattleDecision, DecisionError> {
        let legal = LegalChoices::for_battle(&context.battle)?;
        match &legal {
            LegalChoices::TeamPreview { chosen, .. } => {
                let team_size = context
                    .battle
                    .request
                    .as_ref()
                    .map_or(0, |r| r.roster().len());
                let mut order: Vec<(usize, f64)> = (1..=team_size)
                    .map(|index| (index, self.switch_score(context, index)))
                    .collect();
                order.sort_by(|a, b| b.1.total_cmp(&a.1));
                Ok(BattleDecision::TeamOrder(
                    order.into_iter().take(*chosen).map(|(i, _)| i).collect(),
                ))
            }
            LegalChoices::ForceSwitch(_) => pick_best(context, &legal, |_, choice| match choice {
                SubDecision::Switch(index) | SubDecision::Revive(index) => {
                    self.switch_score(context, *index)
                }
                _ => f64::MIN,
            }),
            LegalChoices::Active(_) => {
                let battle = &context.battle;
                pick_best(context, &legal, |slot, choice| {
                    let user = user_at(battle, slot);
                    match choice {
                        SubDecision::Move { .. } => {
                            self.move_score(context, slot, choice, user.as_ref())
                        }
                        SubDecision::Switch(index) => {
                            let leave = user
                                .as_ref()
                                .is_some_and(|u| self.in_bad_matchup(context, u));
                            let blocked = self.options.avoid_consecutive_switch
                                && self.switched_last_time(context, slot);
                            if leave && !blocked {
                                1000.0 + self.switch_score(context, *index)
                            } else {
                                -1.0
                            }
                        }
                        SubDecision::Pass => 0.0,
                        _ => -2.0,
                    }
                })
            }
        }
    }
}
