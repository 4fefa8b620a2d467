//! Switch-in and lead scoring
//!
//! A candidate is worth the sum, over every opposing pokemon it would face,
//! of the best accuracy-weighted damage (percent of the target's HP) its
//! moveset could deal.

use showbot_battle::{Battle, BattleGlobalStatus, PlayerState, SidePokemon};
use showbot_protocol::server::request::SidePokemon as RequestPokemon;

use crate::accuracy::hit_chance;
use crate::analyzer::AnalyzerKnowledge;
use crate::damage::{DamageEstimator, DamageOptions};
use crate::view::{Combatant, opposing_active};

pub struct SwitchEvaluator<'a> {
    estimator: DamageEstimator<'a>,
    options: DamageOptions,
}

impl<'a> SwitchEvaluator<'a> {
    pub fn new(estimator: DamageEstimator<'a>) -> Self {
        Self {
            estimator,
            options: DamageOptions::percent(),
        }
    }

    pub fn with_options(mut self, options: DamageOptions) -> Self {
        self.options = options;
        self
    }

    /// Expected percent damage of `move_id` against `defender`: exception
    /// adjusted mid roll times hit chance. Unknown moves are worth nothing.
    pub fn expected_damage(
        &self,
        status: &BattleGlobalStatus,
        attacker: &Combatant<'_>,
        defender: &Combatant<'_>,
        move_id: &str,
    ) -> f64 {
        let dex = self.estimator.dex();
        let Some(data) = dex.get_move(move_id) else {
            return 0.0;
        };
        let Some(range) = self
            .estimator
            .evaluate(status, attacker, defender, move_id, &self.options)
        else {
            return 0.0;
        };
        range.mid() * hit_chance(dex, status, attacker, defender, move_id, data)
    }

    /// Best expected damage over `moves`
    pub fn best_damage<'m>(
        &self,
        status: &BattleGlobalStatus,
        attacker: &Combatant<'_>,
        defender: &Combatant<'_>,
        moves: impl IntoIterator<Item = &'m str>,
    ) -> f64 {
        moves
            .into_iter()
            .map(|id| self.expected_damage(status, attacker, defender, id))
            .fold(0.0, f64::max)
    }

    /// Score of `candidate` against every pokemon in `opponents`
    pub fn score(
        &self,
        status: &BattleGlobalStatus,
        candidate: &Combatant<'_>,
        opponents: &[Combatant<'_>],
        knowledge: &AnalyzerKnowledge,
    ) -> f64 {
        let moves = moveset(candidate.pokemon, knowledge);
        opponents
            .iter()
            .map(|opponent| {
                self.best_damage(status, candidate, opponent, moves.iter().map(String::as_str))
            })
            .sum()
    }

    /// Request roster indices (1-based) of `candidates` ordered best first
    pub fn rank_switches(
        &self,
        battle: &Battle,
        knowledge: &AnalyzerKnowledge,
        candidates: &[(usize, &RequestPokemon)],
    ) -> Vec<(usize, f64)> {
        let Some(me) = battle.me() else {
            return candidates.iter().map(|(index, _)| (*index, 0.0)).collect();
        };
        let opponents = opposing_active(battle);
        let mut ranked: Vec<(usize, f64)> = candidates
            .iter()
            .map(|(index, pokemon)| {
                let score = tracked(me, pokemon)
                    .map(|tracked| {
                        self.score(&battle.status, &Combatant::of(me, tracked), &opponents, knowledge)
                    })
                    .unwrap_or(0.0);
                (*index, score)
            })
            .collect();
        sort_by_score(&mut ranked);
        ranked
    }

    /// Team order for preview: every roster member (1-based) ordered by
    /// score against the opponents' previewed teams
    pub fn rank_leads(&self, battle: &Battle, knowledge: &AnalyzerKnowledge) -> Vec<usize> {
        let roster = battle
            .request
            .as_ref()
            .map(|r| r.roster())
            .unwrap_or_default();
        let previewed: Vec<SidePokemon> = battle
            .opponents()
            .flat_map(preview_pokemon)
            .collect();
        let opponents: Vec<Combatant<'_>> = previewed.iter().map(Combatant::new).collect();

        let mut ranked: Vec<(usize, f64)> = roster
            .iter()
            .enumerate()
            .map(|(i, pokemon)| {
                let score = battle
                    .me()
                    .and_then(|me| tracked(me, pokemon))
                    .map(|tracked| {
                        self.score(&battle.status, &Combatant::new(tracked), &opponents, knowledge)
                    })
                    .unwrap_or(0.0);
                (i + 1, score)
            })
            .collect();
        sort_by_score(&mut ranked);
        ranked.into_iter().map(|(index, _)| index).collect()
    }
}

/// Known moves of a roster member, or the ones the analyzer saw it use
pub fn moveset(pokemon: &SidePokemon, knowledge: &AnalyzerKnowledge) -> Vec<String> {
    if !pokemon.moves.is_empty() {
        return pokemon.moves.keys().cloned().collect();
    }
    knowledge
        .revealed_moves(pokemon.player, &pokemon.species_id())
        .map(str::to_string)
        .collect()
}

/// Tracked roster entry for a request roster member
fn tracked<'s>(me: &'s PlayerState, pokemon: &RequestPokemon) -> Option<&'s SidePokemon> {
    let index = me.resolve(&pokemon.ident)?;
    me.team.get(index)
}

/// Previewed team of `side` as untracked roster entries
fn preview_pokemon(side: &PlayerState) -> Vec<SidePokemon> {
    side.team_preview
        .iter()
        .enumerate()
        .map(|(i, preview)| {
            SidePokemon::new(
                i,
                side.player,
                &preview.details.species,
                preview.details.clone(),
            )
        })
        .collect()
}

/// Highest score first; ties keep roster order
fn sort_by_score(ranked: &mut [(usize, f64)]) {
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
}
