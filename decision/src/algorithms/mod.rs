//! Decision algorithms
//!
//! Every algorithm answers the same question from a [`DecisionContext`]:
//! which [`BattleDecision`] to send for the outstanding request. They all
//! start from the [`LegalChoices`] of that request, so whatever they pick is
//! well-formed; they differ only in how they rank.

mod damage_max;
mod generic;
mod random;
mod static_choice;

pub use damage_max::DamageMaxAlgorithm;
pub use generic::{GenericAlgorithm, GenericOptions};
pub use random::RandomAlgorithm;
pub use static_choice::StaticAlgorithm;

use showbot_battle::Battle;
use showbot_protocol::server::request::{ActiveRequest, MoveSlot};
use showbot_protocol::{BattleDecision, SubDecision};

use crate::context::DecisionContext;
use crate::error::DecisionError;
use crate::legal::{ChoiceBuilder, LegalChoices};
use crate::targeting::{FieldPosition, Relation, TargetResolver};
use crate::view::Combatant;

pub trait DecisionAlgorithm: Send + Sync {
    fn name(&self) -> &str;

    fn decide(&self, context: &DecisionContext) -> Result<BattleDecision, DecisionError>;
}

/// Fill every slot with its highest scoring choice that is still
/// consistent with the slots before it
pub(crate) fn pick_best(
    context: &DecisionContext,
    legal: &LegalChoices,
    mut score: impl FnMut(usize, &SubDecision) -> f64,
) -> Result<BattleDecision, DecisionError> {
    let mut builder = ChoiceBuilder::default();
    for (slot, choices) in legal.slots().iter().enumerate() {
        context.cancel.check()?;
        let mut ranked: Vec<(f64, &SubDecision)> =
            choices.iter().map(|c| (score(slot, c), c)).collect();
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
        builder.push_first(ranked.into_iter().map(|(_, c)| c));
    }
    legal.decision(builder.finish())
}

/// Active request entry for `slot` of the outstanding request
pub(crate) fn active_request(battle: &Battle, slot: usize) -> Option<&ActiveRequest> {
    battle.request.as_ref()?.active.as_ref()?.get(slot)
}

/// Request move slot a move choice refers to
pub(crate) fn chosen_move<'b>(
    battle: &'b Battle,
    slot: usize,
    choice: &SubDecision,
) -> Option<&'b MoveSlot> {
    let SubDecision::Move { index, .. } = choice else {
        return None;
    };
    active_request(battle, slot)?.moves.get(index.checked_sub(1)?)
}

/// Our own pokemon in `slot`
pub(crate) fn user_at(battle: &Battle, slot: usize) -> Option<Combatant<'_>> {
    let me = battle.me()?;
    Combatant::on_field(me, me.active.get(&slot)?)
}

/// Pokemon a move choice would hit: the encoded target, or every standing
/// foe when the move takes none
pub(crate) fn targets_of<'b>(
    battle: &'b Battle,
    slot: usize,
    choice: &SubDecision,
) -> Vec<Combatant<'b>> {
    let Some(player) = battle.main_player() else {
        return Vec::new();
    };
    let resolver = TargetResolver::new(battle.status.game_type);
    let user = FieldPosition::new(player, slot);
    let at = |pos: FieldPosition| {
        let side = battle.player(pos.player)?;
        Combatant::on_field(side, side.active.get(&pos.slot)?)
    };

    match choice {
        SubDecision::Move {
            target: Some(location),
            ..
        } => resolver
            .decode(user, *location)
            .and_then(at)
            .into_iter()
            .collect(),
        SubDecision::Move { target: None, .. } => resolver
            .positions()
            .into_iter()
            .filter(|&pos| resolver.relation(user, pos) == Relation::Foe)
            .filter_map(at)
            .filter(|c| !c.pokemon.is_fainted())
            .collect(),
        _ => Vec::new(),
    }
}
