use std::collections::HashMap;
use std::sync::Arc;

use showbot_protocol::{BattleDecision, SubDecision};

use super::{DecisionAlgorithm, chosen_move, pick_best, targets_of, user_at};
use crate::context::DecisionContext;
use crate::damage::{DamageEstimator, DamageOptions};
use crate::dex::{Dex, StaticDex};
use crate::error::DecisionError;
use crate::evaluate::SwitchEvaluator;
use crate::legal::LegalChoices;
use crate::stats::{StandardStatsCalculator, StatsCalculator};

/// Share of a switch-in's score it is worth mid-turn; switching gives up
/// the attack
const SWITCH_FACTOR: f64 = 0.5;

/// Greedy expected-damage maximization
pub struct DamageMaxAlgorithm {
    dex: Arc<dyn Dex>,
    stats: Arc<dyn StatsCalculator>,
    options: DamageOptions,
}

impl Default for DamageMaxAlgorithm {
    fn default() -> Self {
        Self::new(Arc::new(StaticDex::new()), Arc::new(StandardStatsCalculator))
    }
}

impl DamageMaxAlgorithm {
    pub fn new(dex: Arc<dyn Dex>, stats: Arc<dyn StatsCalculator>) -> Self {
        Self {
            dex,
            stats,
            options: DamageOptions::percent(),
        }
    }

    pub fn with_options(mut self, options: DamageOptions) -> Self {
        self.options = options;
        self
    }

    fn evaluator(&self) -> SwitchEvaluator<'_> {
        SwitchEvaluator::new(DamageEstimator::new(self.dex.as_ref(), self.stats.as_ref()))
            .with_options(self.options)
    }

    /// Switch scores keyed by 1-based request roster index
    fn switch_scores(&self, context: &DecisionContext) -> HashMap<usize, f64> {
        let battle = &context.battle;
        let Some(request) = battle.request.as_ref() else {
            return HashMap::new();
        };
        let candidates = request.available_switches();
        self.evaluator()
            .rank_switches(battle, &context.knowledge, &candidates)
            .into_iter()
            .collect()
    }
}

impl DecisionAlgorithm for DamageMaxAlgorithm {
    fn name(&self) -> &str {
        "damagemax"
    }

    fn decide(&self, context: &DecisionContext) -> Result<BattleDecision, DecisionError> {
        let battle = &context.battle;
        let legal = LegalChoices::for_battle(battle)?;
        let evaluator = self.evaluator();

        match &legal {
            LegalChoices::TeamPreview { chosen, .. } => {
                let mut order = evaluator.rank_leads(battle, &context.knowledge);
                order.truncate(*chosen);
                Ok(BattleDecision::TeamOrder(order))
            }
            LegalChoices::ForceSwitch(_) => {
                let scores = self.switch_scores(context);
                pick_best(context, &legal, |_, choice| match choice {
                    SubDecision::Switch(index) => scores.get(index).copied().unwrap_or(0.0),
                    // Revival targets are fainted; any will do
                    SubDecision::Revive(_) => 0.0,
                    _ => f64::MIN,
                })
            }
            LegalChoices::Active(_) => {
                let scores = self.switch_scores(context);
                context.cancel.check()?;
                pick_best(context, &legal, |slot, choice| match choice {
                    SubDecision::Move { gimmick, .. } => {
                        let Some(user) = user_at(battle, slot) else {
                            return 0.0;
                        };
                        let Some(slot_move) = chosen_move(battle, slot, choice) else {
                            return 0.0;
                        };
                        let damage: f64 = targets_of(battle, slot, choice)
                            .iter()
                            .map(|target| {
                                evaluator.expected_damage(&battle.status, &user, target, &slot_move.id)
                            })
                            .sum();
                        // Hold gimmicks back unless they are all that is left
                        if gimmick.is_some() { damage * 0.99 } else { damage }
                    }
                    SubDecision::Switch(index) => {
                        scores.get(index).copied().unwrap_or(0.0) * SWITCH_FACTOR
                    }
                    SubDecision::Pass => 0.0,
                    _ => -1.0,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use showbot_battle::Battle;

    use super::*;
    use crate::algorithms::test_support::{feed, member, request, singles_battle};

    #[test]
    fn test_picks_highest_expected_damage() {
        let context = DecisionContext::new(singles_battle());
        assert_eq!(
            DamageMaxAlgorithm::default().decide(&context),
            Ok(BattleDecision::Active(vec![SubDecision::move_index(2)]))
        );
    }

    #[test]
    fn test_force_switch_brings_best_attacker() {
        let members = [
            member("p1: Corviknight", "Corviknight, F", "0 fnt", true, &["bravebird"]),
            member("p1: Magikarp", "Magikarp", "200/200", false, &["tackle"]),
            member("p1: Garchomp", "Garchomp, M", "357/357", false, &["earthquake"]),
        ];
        let line = request(r#""rqid": 8, "forceSwitch": [true]"#, &members);
        let mut battle = Battle::new("battle-gen9ou-5");
        feed(
            &mut battle,
            &[
                "|gametype|singles",
                "|switch|p1a: Corviknight|Corviknight, F|399/399",
                "|switch|p2a: Heatran|Heatran, M|100/100",
                "|turn|3",
                "|faint|p1a: Corviknight",
                &line,
            ],
        );
        let context = DecisionContext::new(battle);
        assert_eq!(
            DamageMaxAlgorithm::default().decide(&context),
            Ok(BattleDecision::ForceSwitch(vec![SubDecision::Switch(3)]))
        );
    }

    #[test]
    fn test_lead_order_truncated_to_chosen_size() {
        let members = [
            member("p1: Magikarp", "Magikarp", "200/200", false, &["tackle"]),
            member("p1: Garchomp", "Garchomp, M", "357/357", false, &["earthquake"]),
            member("p1: Corviknight", "Corviknight, F", "399/399", false, &["bravebird"]),
        ];
        let line = request(r#""rqid": 1, "teamPreview": true, "maxChosenTeamSize": 2"#, &members);
        let mut battle = Battle::new("battle-gen9vgc-6");
        feed(
            &mut battle,
            &[
                "|gametype|singles",
                "|clearpoke",
                "|poke|p2|Heatran, M|item",
                "|poke|p2|Gengar, M|item",
                "|teampreview|2",
                &line,
            ],
        );
        let context = DecisionContext::new(battle);
        assert_eq!(
            DamageMaxAlgorithm::default().decide(&context),
            Ok(BattleDecision::TeamOrder(vec![2, 3]))
        );
    }
}
