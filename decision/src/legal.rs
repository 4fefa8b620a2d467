//! Legal choice enumeration from a request

use std::collections::HashSet;

use showbot_battle::Battle;
use showbot_protocol::server::request::{ActiveRequest, RequestKind};
use showbot_protocol::{BattleDecision, BattleRequest, GameType, Gimmick, Player, SubDecision};

use crate::error::DecisionError;
use crate::targeting::{FieldPosition, MoveTarget, TargetResolver};

/// Everything the requesting side may answer, per slot
#[derive(Debug, Clone, PartialEq)]
pub enum LegalChoices {
    /// Pick `chosen` of `team_size` roster members, in order
    TeamPreview { team_size: usize, chosen: usize },
    ForceSwitch(Vec<Vec<SubDecision>>),
    Active(Vec<Vec<SubDecision>>),
}

impl LegalChoices {
    /// Legal choices for the battle's outstanding request
    pub fn for_battle(battle: &Battle) -> Result<Self, DecisionError> {
        let request = battle.request.as_ref().ok_or(DecisionError::NoRequest)?;
        let player = request
            .player()
            .or(battle.main_player())
            .ok_or(DecisionError::NoRequest)?;
        let occupied = occupied_positions(battle);
        Self::from_request(request, battle.status.game_type, player, &occupied)
    }

    /// `occupied` lists the positions holding a pokemon that can be targeted
    pub fn from_request(
        request: &BattleRequest,
        game_type: GameType,
        player: Player,
        occupied: &[FieldPosition],
    ) -> Result<Self, DecisionError> {
        let resolver = TargetResolver::new(game_type);
        match request.kind() {
            RequestKind::Wait => Err(DecisionError::NoRequest),
            RequestKind::TeamPreview => {
                let team_size = request.roster().len();
                let chosen = request
                    .max_chosen_team_size
                    .unwrap_or(team_size)
                    .min(team_size);
                Ok(LegalChoices::TeamPreview { team_size, chosen })
            }
            RequestKind::ForceSwitch(mask) => Ok(LegalChoices::ForceSwitch(
                mask.iter()
                    .enumerate()
                    .map(|(slot, &forced)| force_switch_choices(request, slot, forced))
                    .collect(),
            )),
            RequestKind::Active(active) => {
                let slots = active
                    .iter()
                    .enumerate()
                    .map(|(slot, active)| {
                        let user = FieldPosition::new(player, slot);
                        active_choices(request, active, &resolver, user, occupied)
                    })
                    .collect::<Vec<_>>();
                if let Some(slot) = slots.iter().position(Vec::is_empty) {
                    return Err(DecisionError::NoLegalChoice(slot));
                }
                Ok(LegalChoices::Active(slots))
            }
        }
    }

    /// Per-slot choices; empty for team preview
    pub fn slots(&self) -> &[Vec<SubDecision>] {
        match self {
            LegalChoices::TeamPreview { .. } => &[],
            LegalChoices::ForceSwitch(slots) | LegalChoices::Active(slots) => slots,
        }
    }

    /// Number of entries the answer must carry
    pub fn expected_len(&self) -> usize {
        match self {
            LegalChoices::TeamPreview { chosen, .. } => *chosen,
            _ => self.slots().len(),
        }
    }

    /// Wrap per-slot picks in the decision variant matching this request
    pub fn decision(&self, choices: Vec<SubDecision>) -> Result<BattleDecision, DecisionError> {
        let decision = match self {
            LegalChoices::TeamPreview { .. } => {
                return Err(DecisionError::Algorithm(
                    "team preview is answered with a team order".to_string(),
                ));
            }
            LegalChoices::ForceSwitch(_) => BattleDecision::ForceSwitch(choices),
            LegalChoices::Active(_) => BattleDecision::Active(choices),
        };
        self.validate(&decision)?;
        Ok(decision)
    }

    /// Check a complete decision: slot count, membership of each choice in
    /// its slot's legal set, no roster member switched in twice and no
    /// gimmick used twice
    pub fn validate(&self, decision: &BattleDecision) -> Result<(), DecisionError> {
        let expected = self.expected_len();
        if decision.len() != expected {
            return Err(DecisionError::SlotMismatch {
                expected,
                got: decision.len(),
            });
        }
        if let BattleDecision::TeamOrder(order) = decision {
            let LegalChoices::TeamPreview { team_size, .. } = self else {
                return Err(DecisionError::Algorithm("unexpected team order".to_string()));
            };
            let mut seen = HashSet::new();
            for &index in order {
                if index == 0 || index > *team_size || !seen.insert(index) {
                    return Err(DecisionError::Algorithm(format!(
                        "invalid team order entry {index}"
                    )));
                }
            }
            return Ok(());
        }

        let mut builder = ChoiceBuilder::default();
        for (slot, (choice, legal)) in decision.choices().iter().zip(self.slots()).enumerate() {
            // Pass stands in for a slot whose every option is already taken
            let exhausted = *choice == SubDecision::Pass && !legal.iter().any(|c| builder.allows(c));
            if !exhausted && (!legal.contains(choice) || !builder.allows(choice)) {
                return Err(DecisionError::NoLegalChoice(slot));
            }
            builder.push(choice.clone());
        }
        Ok(())
    }
}

/// Accumulates slot choices while keeping them mutually consistent
#[derive(Debug, Clone, Default)]
pub struct ChoiceBuilder {
    switched: HashSet<usize>,
    gimmicks: HashSet<Gimmick>,
    choices: Vec<SubDecision>,
}

impl ChoiceBuilder {
    /// Whether `choice` can join the choices already made
    pub fn allows(&self, choice: &SubDecision) -> bool {
        match choice {
            SubDecision::Switch(index) | SubDecision::Revive(index) => {
                !self.switched.contains(index)
            }
            SubDecision::Move {
                gimmick: Some(gimmick),
                ..
            } => !self.gimmicks.contains(gimmick),
            _ => true,
        }
    }

    pub fn push(&mut self, choice: SubDecision) {
        match &choice {
            SubDecision::Switch(index) | SubDecision::Revive(index) => {
                self.switched.insert(*index);
            }
            SubDecision::Move {
                gimmick: Some(gimmick),
                ..
            } => {
                self.gimmicks.insert(*gimmick);
            }
            _ => {}
        }
        self.choices.push(choice);
    }

    /// Add the first allowed choice of `legal` in the given preference
    /// order, or `pass` when every one of them conflicts
    pub fn push_first<'a>(&mut self, preferred: impl IntoIterator<Item = &'a SubDecision>) {
        let choice = preferred
            .into_iter()
            .find(|choice| self.allows(choice))
            .cloned()
            .unwrap_or(SubDecision::Pass);
        self.push(choice);
    }

    pub fn finish(self) -> Vec<SubDecision> {
        self.choices
    }
}

/// Non-fainted positions currently on the field
pub fn occupied_positions(battle: &Battle) -> Vec<FieldPosition> {
    battle
        .players
        .values()
        .flat_map(|side| {
            side.active_pokemon()
                .filter(|(_, pokemon)| !pokemon.is_fainted())
                .map(move |(active, _)| FieldPosition::new(side.player, active.slot))
        })
        .collect()
}

fn force_switch_choices(request: &BattleRequest, slot: usize, forced: bool) -> Vec<SubDecision> {
    if !forced {
        return vec![SubDecision::Pass];
    }
    let roster = request.roster();
    let choices: Vec<SubDecision> = if roster.get(slot).is_some_and(|p| p.reviving) {
        roster
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_fainted())
            .map(|(i, _)| SubDecision::Revive(i + 1))
            .collect()
    } else {
        request
            .available_switches()
            .into_iter()
            .map(|(index, _)| SubDecision::Switch(index))
            .collect()
    };
    if choices.is_empty() {
        vec![SubDecision::Pass]
    } else {
        choices
    }
}

fn active_choices(
    request: &BattleRequest,
    active: &ActiveRequest,
    resolver: &TargetResolver,
    user: FieldPosition,
    occupied: &[FieldPosition],
) -> Vec<SubDecision> {
    let pokemon = request.roster().get(user.slot);
    if pokemon.is_some_and(|p| p.is_fainted() || p.commanding) {
        return vec![SubDecision::Pass];
    }

    let mut choices = Vec::new();
    let mut moves = active.available_moves();
    // Everything disabled still leaves the first slot (the server substitutes Struggle)
    if moves.is_empty()
        && let Some(first) = active.moves.first()
    {
        moves.push((1, first));
    }

    for (index, slot) in moves {
        let move_target = MoveTarget::from_request(slot.target.as_deref());
        push_move(&mut choices, resolver, user, occupied, index, move_target, None);

        let gimmicks = [
            (active.can_terastallize.is_some(), Gimmick::Terastallize),
            (active.can_mega_evo, Gimmick::Mega),
            (active.can_ultra_burst, Gimmick::Ultra),
        ];
        for (_, gimmick) in gimmicks.into_iter().filter(|(available, _)| *available) {
            push_move(&mut choices, resolver, user, occupied, index, move_target, Some(gimmick));
        }
        if let Some(z) = active.z_move(index - 1) {
            let z_target = MoveTarget::parse(&z.target).unwrap_or(move_target);
            push_move(&mut choices, resolver, user, occupied, index, z_target, Some(Gimmick::ZMove));
        }
        if active.can_dynamax {
            let max_target = active
                .max_moves
                .as_ref()
                .and_then(|max| max.max_moves.get(index - 1))
                .and_then(|max| MoveTarget::parse(&max.target))
                .unwrap_or(move_target);
            push_move(&mut choices, resolver, user, occupied, index, max_target, Some(Gimmick::Dynamax));
        }
    }

    if active.can_switch() {
        choices.extend(
            request
                .available_switches()
                .into_iter()
                .map(|(index, _)| SubDecision::Switch(index)),
        );
    }

    if resolver.game_type() == GameType::Triples && user.slot != 1 {
        choices.push(SubDecision::Shift);
    }

    choices
}

fn push_move(
    choices: &mut Vec<SubDecision>,
    resolver: &TargetResolver,
    user: FieldPosition,
    occupied: &[FieldPosition],
    index: usize,
    move_target: MoveTarget,
    gimmick: Option<Gimmick>,
) {
    if !resolver.needs_target(move_target) {
        choices.push(SubDecision::Move {
            index,
            target: None,
            gimmick,
        });
        return;
    }

    let mut targets = resolver.valid_targets(user, move_target, occupied);
    if targets.is_empty() {
        targets.extend(resolver.default_target(user, move_target, occupied));
    }
    if targets.is_empty() {
        choices.push(SubDecision::Move {
            index,
            target: None,
            gimmick,
        });
        return;
    }
    choices.extend(targets.into_iter().map(|target| SubDecision::Move {
        index,
        target: Some(resolver.encode(user, target)),
        gimmick,
    }));
}
