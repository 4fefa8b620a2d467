//! Folding battle events into the battle state

use showbot_protocol::server::request::SidePokemon as RequestPokemon;
use showbot_protocol::{
    BattleEvent, BattleRequest, Effect, HpCondition, Knowledge, MajorEvent, MinorAction,
    MinorEvent, Player, PokemonDetails, PokemonIdent, to_id,
};
use tracing::{debug, trace, warn};

use super::battle::Battle;
use crate::types::{
    ActivePokemon, GimmickUse, ItemLoss, MoveKnowledge, SidePokemon, StatKnowledge, StatRange,
    TeamPreviewPokemon, Type, Volatile, VolatileData,
};

/// Effects that take an item away rather than use it up
const ITEM_REMOVING_MOVES: [&str; 6] = [
    "knockoff",
    "thief",
    "covet",
    "incinerate",
    "corrosivegas",
    "bugbite",
];

impl Battle {
    /// Apply one event. Never fails: references to unknown pokemon are logged
    /// and skipped, unknown players are created on first reference.
    pub fn apply_event(&mut self, event: &BattleEvent) {
        match event {
            BattleEvent::Major(major) => self.apply_major(major),
            BattleEvent::Minor(minor) => self.apply_minor(minor),
        }
    }

    fn apply_major(&mut self, event: &MajorEvent) {
        match event {
            // === Initialization ===
            MajorEvent::GameType(game_type) => self.status.game_type = *game_type,
            MajorEvent::Gen(generation) => self.status.generation = *generation,
            MajorEvent::Tier(tier) => self.status.tier = tier.clone(),
            MajorEvent::Rule(rule) => self.status.apply_rule(rule),
            MajorEvent::Rated(_) => self.status.rated = true,
            MajorEvent::Player {
                player,
                username,
                avatar,
                rating,
            } => {
                let state = self.player_entry(*player);
                // `|player|p1|` with no name is sent when a player leaves
                if !username.is_empty() {
                    state.name = username.clone();
                    state.avatar = avatar.clone();
                    state.rating = *rating;
                }
            }
            MajorEvent::TeamSize { player, size } => {
                self.player_entry(*player).team_size = Some(*size);
            }
            MajorEvent::ClearPoke => {
                self.status.team_preview = true;
                for player in self.players.values_mut() {
                    player.team_preview.clear();
                }
            }
            MajorEvent::Poke {
                player,
                details,
                has_item,
            } => {
                self.player_entry(*player)
                    .team_preview
                    .push(TeamPreviewPokemon {
                        details: details.clone(),
                        has_item: *has_item,
                    });
            }
            MajorEvent::TeamPreview(size) => {
                self.status.team_preview = true;
                self.status.team_preview_size = *size;
            }
            MajorEvent::Start => self.started = true,

            // === Progress ===
            MajorEvent::Turn(turn) => {
                self.turn = *turn;
                for player in self.players.values_mut() {
                    for active in player.active.values_mut() {
                        active.single_turn.clear();
                    }
                }
            }
            MajorEvent::Upkeep
            | MajorEvent::Inactive(_)
            | MajorEvent::InactiveOff(_)
            | MajorEvent::Callback(_) => {}
            MajorEvent::Request(request) => self.apply_request(request),
            MajorEvent::BattleEnded { winner, tie } => self.end_battle(winner.as_deref(), *tie),

            // === Switching ===
            MajorEvent::Switch {
                pokemon,
                details,
                condition,
            }
            | MajorEvent::Drag {
                pokemon,
                details,
                condition,
            } => self.switch_in(pokemon, details, condition.as_ref()),
            MajorEvent::Replace {
                pokemon,
                details,
                condition,
            } => self.replace(pokemon, details, condition.as_ref()),
            MajorEvent::DetailsChange {
                pokemon,
                details,
                condition,
            } => {
                match self.pokemon_mut(pokemon) {
                    Some(target) => {
                        target.details = details.clone();
                        if let Some(condition) = condition {
                            target.set_condition(condition);
                        }
                    }
                    None => miss("detailschange", pokemon),
                }
                if let Some(active) = self.active_mut(pokemon) {
                    active.forme = None;
                }
            }
            MajorEvent::Swap { pokemon, position } => {
                let Some(slot) = pokemon.slot else {
                    return miss("swap", pokemon);
                };
                self.player_entry(pokemon.player)
                    .swap_slots(slot, *position);
            }
            MajorEvent::Faint(pokemon) => {
                let player = self.player_entry(pokemon.player);
                match player.resolve(pokemon) {
                    Some(index) => {
                        player.team[index].faint();
                        player.times_fainted += 1;
                    }
                    None => miss("faint", pokemon),
                }
            }

            // === Actions ===
            MajorEvent::Move {
                pokemon,
                move_name,
                knowledge,
                ..
            } => self.use_move(pokemon, move_name, knowledge),
            MajorEvent::Cant {
                pokemon,
                reason,
                move_name,
                knowledge,
            } => {
                self.reveal_effect(Some(pokemon), Some(reason), None);
                self.reveal_knowledge(Some(pokemon), knowledge);
                if reason.id == "recharge"
                    && let Some(active) = self.active_mut(pokemon)
                {
                    active.remove_volatile(&Volatile::MustRecharge);
                }
                if let Some(name) = move_name
                    && let Some(target) = self.pokemon_mut(pokemon)
                {
                    target.use_move(name, false);
                }
            }
        }
    }

    fn apply_minor(&mut self, event: &MinorEvent) {
        let knowledge = &event.knowledge;
        let turn = self.turn;

        match &event.action {
            // === HP ===
            MinorAction::Damage { pokemon, condition }
            | MinorAction::Heal { pokemon, condition }
            | MinorAction::SetHp { pokemon, condition } => {
                if let Some(condition) = condition {
                    match self.pokemon_mut(pokemon) {
                        Some(target) => target.set_condition(condition),
                        None => miss(event.action.msg_type(), pokemon),
                    }
                }
                self.reveal_knowledge(Some(pokemon), knowledge);
            }

            // === Boosts ===
            MinorAction::Boost {
                pokemon,
                stat,
                amount,
            } => {
                self.with_active(pokemon, |a| {
                    a.boosts.boost(*stat, *amount);
                });
                self.reveal_knowledge(Some(pokemon), knowledge);
            }
            MinorAction::Unboost {
                pokemon,
                stat,
                amount,
            } => {
                self.with_active(pokemon, |a| {
                    a.boosts.unboost(*stat, *amount);
                });
                self.reveal_knowledge(Some(pokemon), knowledge);
            }
            MinorAction::SetBoost {
                pokemon,
                stat,
                amount,
            } => {
                self.with_active(pokemon, |a| a.boosts.set(*stat, *amount));
                self.reveal_knowledge(Some(pokemon), knowledge);
            }
            MinorAction::SwapBoost {
                source,
                target,
                stats,
            } => {
                let (Some(mut a), Some(mut b)) = (
                    self.active(source).map(|x| x.boosts),
                    self.active(target).map(|x| x.boosts),
                ) else {
                    return miss("-swapboost", source);
                };
                a.swap_with(&mut b, stats);
                self.with_active(source, |x| x.boosts = a);
                self.with_active(target, |x| x.boosts = b);
            }
            MinorAction::InvertBoost(pokemon) => self.with_active(pokemon, |a| a.boosts.invert()),
            MinorAction::ClearBoost(pokemon) => self.with_active(pokemon, |a| a.boosts.clear()),
            MinorAction::ClearAllBoost => {
                // Battle-wide, unlike every other clear
                for player in self.players.values_mut() {
                    for active in player.active.values_mut() {
                        active.boosts.clear();
                    }
                }
            }
            MinorAction::ClearPositiveBoost { target, .. } => {
                self.with_active(target, |a| a.boosts.clear_positive())
            }
            MinorAction::ClearNegativeBoost(pokemon) => {
                self.with_active(pokemon, |a| a.boosts.clear_negative())
            }
            MinorAction::CopyBoost { source, target } => {
                // SOURCE copies TARGET's boosts
                let Some(boosts) = self.active(target).map(|a| a.boosts) else {
                    return miss("-copyboost", target);
                };
                self.with_active(source, |a| a.boosts = boosts);
            }

            // === Move outcomes ===
            MinorAction::Crit(pokemon)
            | MinorAction::SuperEffective(pokemon)
            | MinorAction::Resisted(pokemon)
            | MinorAction::Immune(pokemon)
            | MinorAction::Fail { pokemon, .. } => self.reveal_knowledge(Some(pokemon), knowledge),
            MinorAction::Miss { source, .. } => self.reveal_knowledge(Some(source), knowledge),
            MinorAction::Block {
                pokemon, effect, ..
            } => {
                self.reveal_effect(Some(pokemon), Some(effect), None);
                self.reveal_knowledge(Some(pokemon), knowledge);
            }
            MinorAction::Prepare {
                attacker,
                move_name,
                ..
            } => {
                let move_id = to_id(move_name);
                self.with_active(attacker, |a| {
                    a.add_volatile(Volatile::TwoTurnMove, None);
                    a.single_move.insert(move_id);
                });
            }
            MinorAction::MustRecharge(pokemon) => {
                self.with_active(pokemon, |a| a.add_volatile(Volatile::MustRecharge, None))
            }
            MinorAction::HitCount { pokemon, count } => {
                self.with_active(pokemon, |a| a.hit_count = *count)
            }

            // === Status ===
            MinorAction::Status { pokemon, status } => {
                match self.pokemon_mut(pokemon) {
                    Some(target) => target.set_status(Some(status)),
                    None => miss("-status", pokemon),
                }
                self.reveal_knowledge(Some(pokemon), knowledge);
            }
            MinorAction::CureStatus { pokemon, .. } => {
                match self.pokemon_mut(pokemon) {
                    Some(target) => target.set_status(None),
                    None => miss("-curestatus", pokemon),
                }
                self.reveal_knowledge(Some(pokemon), knowledge);
            }
            MinorAction::CureTeam(pokemon) => {
                for member in self.player_entry(pokemon.player).team.iter_mut() {
                    member.set_status(None);
                }
                self.reveal_knowledge(Some(pokemon), knowledge);
            }

            // === Items and abilities ===
            MinorAction::Item { pokemon, item } => {
                match self.pokemon_mut(pokemon) {
                    Some(target) => {
                        target.item.reveal(item);
                        target.item_loss = None;
                    }
                    None => miss("-item", pokemon),
                }
                self.reveal_knowledge(Some(pokemon), &without_item_effect(knowledge));
            }
            MinorAction::EndItem { pokemon, item } => {
                let removed = knowledge.has("stealeat")
                    || knowledge
                        .from_effect
                        .as_ref()
                        .is_some_and(|e| ITEM_REMOVING_MOVES.contains(&e.id.as_str()));
                let loss = if removed {
                    ItemLoss::Removed
                } else {
                    ItemLoss::Consumed
                };
                match self.pokemon_mut(pokemon) {
                    Some(target) => target.lose_item(item, loss),
                    None => miss("-enditem", pokemon),
                }
                self.reveal_knowledge(Some(pokemon), &without_item_effect(knowledge));
            }
            MinorAction::Ability { pokemon, ability } => {
                self.reveal_ability(pokemon, ability, knowledge)
            }
            MinorAction::EndAbility { pokemon, ability } => {
                if let Some(ability) = ability
                    && let Some(target) = self.pokemon_mut(pokemon)
                {
                    target.ability.reveal(ability);
                }
                if let Some(ability) = ability {
                    self.status.clear_ability(&to_id(ability));
                }
                self.with_active(pokemon, |a| {
                    a.ability_override = Some(String::new());
                    a.add_volatile(Volatile::GastroAcid, None);
                });
            }

            // === Forme changes and gimmicks ===
            MinorAction::Transform { pokemon, target } => {
                let boosts = self.active(target).map(|a| a.boosts);
                let into = target.clone();
                self.with_active(pokemon, |a| {
                    if let Some(boosts) = boosts {
                        a.boosts = boosts;
                    }
                    a.add_volatile(Volatile::Transform, Some(VolatileData::Transform { into }));
                });
            }
            MinorAction::FormeChange {
                pokemon,
                species,
                condition,
            } => {
                if let Some(condition) = condition
                    && let Some(target) = self.pokemon_mut(pokemon)
                {
                    target.set_condition(condition);
                }
                let species = species.clone();
                self.with_active(pokemon, |a| a.forme = Some(species));
                self.reveal_knowledge(Some(pokemon), knowledge);
            }
            MinorAction::Mega {
                pokemon, megastone, ..
            } => {
                if let Some(target) = self.pokemon_mut(pokemon)
                    && !megastone.is_empty()
                {
                    target.item.reveal(megastone);
                }
                self.use_gimmick(pokemon, GimmickUse::Mega);
            }
            MinorAction::Primal(pokemon) => self.use_gimmick(pokemon, GimmickUse::Primal),
            MinorAction::Burst { pokemon, item, .. } => {
                if let Some(target) = self.pokemon_mut(pokemon)
                    && !item.is_empty()
                {
                    target.item.reveal(item);
                }
                self.use_gimmick(pokemon, GimmickUse::UltraBurst);
            }
            MinorAction::ZPower(pokemon) => self.use_gimmick(pokemon, GimmickUse::ZMove),
            MinorAction::ZBroken(_) => {}
            MinorAction::Terastallize { pokemon, tera_type } => {
                let tera = Type::parse(tera_type);
                if let Some(target) = self.pokemon_mut(pokemon) {
                    target.terastallized = tera;
                    target.details.tera_type = Some(tera_type.clone());
                }
                self.use_gimmick(pokemon, GimmickUse::Terastallize);
            }

            // === Volatiles ===
            MinorAction::Start {
                pokemon,
                effect,
                extra,
            } => self.start_volatile(pokemon, effect, extra, knowledge),
            MinorAction::End {
                pokemon, effect, ..
            } => {
                let volatile = Volatile::from_effect(effect);
                let disabled = match self.active(pokemon).and_then(|a| a.volatile_data(&volatile))
                {
                    Some(VolatileData::Disable { move_id }) => Some(move_id.clone()),
                    _ => None,
                };
                if let Some(move_id) = disabled
                    && let Some(target) = self.pokemon_mut(pokemon)
                    && let Some(known) = target.moves.get_mut(&move_id)
                {
                    known.disabled = false;
                }
                self.with_active(pokemon, |a| {
                    a.remove_volatile(&volatile);
                });
                self.reveal_effect(Some(pokemon), Some(effect), None);
                self.reveal_knowledge(Some(pokemon), knowledge);
            }
            MinorAction::SingleTurn { pokemon, effect } => {
                let id = effect.id.clone();
                self.with_active(pokemon, |a| {
                    a.single_turn.insert(id);
                });
                self.reveal_knowledge(Some(pokemon), knowledge);
            }
            MinorAction::SingleMove { pokemon, effect } => {
                let id = effect.id.clone();
                self.with_active(pokemon, |a| {
                    a.single_move.insert(id);
                });
                self.reveal_knowledge(Some(pokemon), knowledge);
            }
            MinorAction::Activate {
                pokemon, effect, ..
            } => {
                if let Some(pokemon) = pokemon {
                    if effect.id == "confusion" {
                        self.with_active(pokemon, |a| {
                            if let Some(VolatileData::Confusion { turns }) =
                                a.volatile_data.get_mut(&Volatile::Confusion)
                            {
                                *turns = turns.saturating_add(1);
                            }
                        });
                    }
                    self.reveal_effect(Some(pokemon), Some(effect), None);
                }
                self.reveal_knowledge(pokemon.as_ref(), knowledge);
            }

            // === Side and field ===
            MinorAction::SideStart { side, condition } => {
                let set_by = knowledge.of_pokemon.clone();
                self.player_entry(side.player)
                    .start_side_condition(condition, turn, set_by);
            }
            MinorAction::SideEnd { side, condition } => {
                if !self.player_entry(side.player).end_side_condition(condition) {
                    debug!(battle = %self.id, condition = %condition.id, "side condition was not tracked");
                }
            }
            MinorAction::SwapSideConditions => {
                for (a, b) in [(Player::P1, Player::P2), (Player::P3, Player::P4)] {
                    let first = self
                        .player_mut(a)
                        .map(|p| std::mem::take(&mut p.side_conditions))
                        .unwrap_or_default();
                    let second = self
                        .player_mut(b)
                        .map(|p| std::mem::take(&mut p.side_conditions))
                        .unwrap_or_default();
                    if let Some(p) = self.player_mut(a) {
                        p.side_conditions = second;
                    }
                    if let Some(p) = self.player_mut(b) {
                        p.side_conditions = first;
                    }
                }
            }
            MinorAction::Weather(name) => {
                let set_by = knowledge.of_pokemon.clone();
                self.status
                    .set_weather(name, knowledge.has("upkeep"), turn, set_by);
                self.reveal_knowledge(None, knowledge);
            }
            MinorAction::FieldStart(effect) => {
                let set_by = knowledge.of_pokemon.clone();
                self.status.start_field(effect, turn, set_by);
                self.reveal_knowledge(None, knowledge);
            }
            MinorAction::FieldEnd(effect) => {
                if !self.status.end_field(effect) {
                    debug!(battle = %self.id, condition = %effect.id, "field condition was not tracked");
                }
            }
            MinorAction::FieldActivate(_) => self.reveal_knowledge(None, knowledge),

            MinorAction::NoTarget(_)
            | MinorAction::Center
            | MinorAction::Combine
            | MinorAction::Waiting { .. }
            | MinorAction::Nothing
            | MinorAction::Hint(_)
            | MinorAction::Message(_) => {}
        }
    }

    fn with_active(
        &mut self,
        ident: &PokemonIdent,
        update: impl FnOnce(&mut ActivePokemon),
    ) {
        match self.active_mut(ident) {
            Some(active) => update(active),
            None => miss("active", ident),
        }
    }

    fn switch_in(
        &mut self,
        ident: &PokemonIdent,
        details: &PokemonDetails,
        condition: Option<&HpCondition>,
    ) {
        let turn = self.turn;
        let slot = ident.slot.unwrap_or(0);
        if slot >= self.active_size() {
            return miss("switch", ident);
        }
        let player = self.player_entry(ident.player);
        let index = player.find_or_insert_pokemon(&ident.name, details);

        let pokemon = &mut player.team[index];
        // A revealed hidden forme ("Urshifu-*" in preview) becomes concrete
        pokemon.details.species = details.species.clone();
        if details.tera_type.is_some() {
            pokemon.details.tera_type = details.tera_type.clone();
        }
        if let Some(condition) = condition {
            pokemon.set_condition(condition);
        }

        player.switch_in(slot, index, turn);
        trace!(player = %ident.player, slot, pokemon = %ident.name, "switched in");
    }

    /// Illusion broke: the slot keeps its combat state under a new identity
    fn replace(
        &mut self,
        ident: &PokemonIdent,
        details: &PokemonDetails,
        condition: Option<&HpCondition>,
    ) {
        let slot = ident.slot.unwrap_or(0);
        if slot >= self.active_size() {
            return miss("replace", ident);
        }
        let player = self.player_entry(ident.player);
        let Some(mut active) = player.active.remove(&slot) else {
            return miss("replace", ident);
        };

        let shown_species = match player.team.get_mut(active.pokemon) {
            Some(disguise) => {
                disguise.active = false;
                disguise.slot = None;
                disguise.revealed = false;
                disguise.details.species.clone()
            }
            None => String::new(),
        };

        let index = player.find_or_insert_pokemon(&ident.name, details);
        let pokemon = &mut player.team[index];
        pokemon.active = true;
        pokemon.revealed = true;
        pokemon.slot = Some(slot);
        pokemon.ability.infer("Illusion");
        if let Some(condition) = condition {
            pokemon.set_condition(condition);
        }

        active.pokemon = index;
        active.add_volatile(
            Volatile::Illusion,
            Some(VolatileData::Illusion { shown_species }),
        );
        player.active.insert(slot, active);
    }

    fn use_move(&mut self, ident: &PokemonIdent, move_name: &str, knowledge: &Knowledge) {
        let move_id = to_id(move_name);
        // Moves called through another effect (Sleep Talk, Magic Bounce...)
        // are not part of the user's moveset
        let called = knowledge
            .from_effect
            .as_ref()
            .is_some_and(|e| e.id != "lockedmove");
        if !called {
            match self.pokemon_mut(ident) {
                Some(pokemon) => pokemon.use_move(move_name, true),
                None => miss("move", ident),
            }
        }
        self.with_active(ident, |a| {
            a.record_move(&move_id);
            a.remove_volatile(&Volatile::TwoTurnMove);
        });
        self.reveal_knowledge(Some(ident), knowledge);
    }

    fn use_gimmick(&mut self, ident: &PokemonIdent, gimmick: GimmickUse) {
        let player = self.player_entry(ident.player);
        player.gimmicks.insert(gimmick);
        if let Some(index) = player.resolve(ident) {
            player.team[index].gimmick = Some(gimmick);
        }
    }

    fn start_volatile(
        &mut self,
        ident: &PokemonIdent,
        effect: &Effect,
        extra: &[String],
        knowledge: &Knowledge,
    ) {
        let volatile = Volatile::from_effect(effect);
        let data = VolatileData::from_start(&volatile, effect, extra);

        if let Some(VolatileData::Disable { move_id }) = &data
            && let Some(pokemon) = self.pokemon_mut(ident)
        {
            pokemon
                .moves
                .entry(move_id.clone())
                .or_insert_with(|| MoveKnowledge::new(move_id))
                .disabled = true;
        }
        if volatile == Volatile::Dynamax {
            self.use_gimmick(ident, GimmickUse::Dynamax);
        }

        self.with_active(ident, |a| a.add_volatile(volatile, data));
        self.reveal_effect(Some(ident), Some(effect), None);
        self.reveal_knowledge(Some(ident), knowledge);
    }

    /// `-ability`; with `[from] ability: Trace` the shown ability is borrowed
    fn reveal_ability(&mut self, ident: &PokemonIdent, ability: &str, knowledge: &Knowledge) {
        let ability_id = to_id(ability);
        self.status.note_ability(&ability_id);

        match knowledge.from_effect.as_ref().filter(|e| e.is_ability()) {
            Some(source) => {
                if let Some(pokemon) = self.pokemon_mut(ident) {
                    pokemon.ability.reveal(&source.name);
                }
                if let Some(of) = &knowledge.of_pokemon
                    && let Some(owner) = self.pokemon_mut(of)
                {
                    owner.ability.reveal(ability);
                }
                let shown = ability.to_string();
                self.with_active(ident, |a| a.ability_override = Some(shown));
            }
            None => match self.pokemon_mut(ident) {
                Some(pokemon) => pokemon.ability.reveal(ability),
                None => miss("-ability", ident),
            },
        }
    }

    /// An effect naming an item or ability of `subject` (or of `of` when given)
    fn reveal_effect(
        &mut self,
        subject: Option<&PokemonIdent>,
        effect: Option<&Effect>,
        of: Option<&PokemonIdent>,
    ) {
        let (Some(effect), Some(owner)) = (effect, of.or(subject)) else {
            return;
        };
        if !(effect.is_item() || effect.is_ability()) {
            return;
        }
        if effect.is_ability() {
            self.status.note_ability(&effect.id);
        }
        if let Some(pokemon) = self.pokemon_mut(owner) {
            if effect.is_item() {
                pokemon.item.reveal(&effect.name);
            } else {
                pokemon.ability.reveal(&effect.name);
            }
        }
    }

    /// `[from] item: X` / `[from] ability: X` belongs to the `[of]` pokemon,
    /// or to the subject when no `[of]` is given
    fn reveal_knowledge(&mut self, subject: Option<&PokemonIdent>, knowledge: &Knowledge) {
        self.reveal_effect(
            subject,
            knowledge.from_effect.as_ref(),
            knowledge.of_pokemon.as_ref(),
        );
    }

    fn apply_request(&mut self, request: &BattleRequest) {
        if let Some(player) = request.player()
            && !self.set_main_player(player)
        {
            warn!(battle = %self.id, %player, "request for a different player ignored");
            return;
        }

        if let Some(player) = request.player() {
            let active_requests = request.active.as_deref().unwrap_or_default();
            let mut active_requests = active_requests.iter();
            let state = self.player_entry(player);
            if let Some(side) = &request.side
                && state.name.is_empty()
            {
                state.name = side.name.clone();
            }

            for member in request.roster() {
                let moves = if member.active {
                    active_requests.next().map(|a| a.moves.as_slice())
                } else {
                    None
                };
                let index = state.find_or_insert_pokemon(&member.ident.name, &member.details);
                refresh_from_request(&mut state.team[index], member, moves.unwrap_or_default());
            }
        }

        self.request = Some(request.clone());
    }

    fn end_battle(&mut self, winner: Option<&str>, tie: bool) {
        self.ended = true;
        self.winner = winner.and_then(|name| {
            let id = to_id(name);
            self.players
                .values()
                .find(|p| to_id(&p.name) == id)
                .map(|p| p.player)
        });
        if winner.is_some() && self.winner.is_none() {
            debug!(battle = %self.id, winner = ?winner, "winner does not match a known player");
        }
        // Nobody we know won
        self.tie = tie || self.winner.is_none();
    }
}

/// Copy our own authoritative data into a roster entry
fn refresh_from_request(
    pokemon: &mut SidePokemon,
    member: &RequestPokemon,
    active_moves: &[showbot_protocol::server::request::MoveSlot],
) {
    pokemon.revealed = true;
    pokemon.details = member.details.clone();
    pokemon.set_condition(&member.condition);

    let stats = member.stats;
    pokemon.stats = Some(StatKnowledge {
        hp: StatRange::exact(member.condition.max_hp),
        atk: StatRange::exact(stats.atk),
        def: StatRange::exact(stats.def),
        spa: StatRange::exact(stats.spa),
        spd: StatRange::exact(stats.spd),
        spe: StatRange::exact(stats.spe),
    });

    for move_id in &member.moves {
        let id = to_id(move_id);
        let entry = pokemon
            .moves
            .entry(id.clone())
            .or_insert_with(|| MoveKnowledge::new(move_id));
        if let Some(slot) = active_moves.iter().find(|m| to_id(&m.id) == id) {
            entry.name = slot.name.clone();
            entry.pp = slot.pp;
            entry.max_pp = slot.max_pp;
            entry.disabled = slot.disabled;
        }
    }

    if !member.item.is_empty() {
        pokemon.item.lock(&member.item);
    } else if pokemon.item.is_known() {
        pokemon.item.id = Some(String::new());
        pokemon.item.name = None;
    }
    let ability = member.current_ability();
    if !ability.is_empty() {
        pokemon.ability.lock(ability);
    }
    if let Some(tera) = &member.terastallized {
        pokemon.terastallized = Type::parse(tera);
    }
    if member.tera_type.is_some() {
        pokemon.details.tera_type = member.tera_type.clone();
    }
}

/// Drop an item `[from]` that names the very item being shown or removed
fn without_item_effect(knowledge: &Knowledge) -> Knowledge {
    let mut knowledge = knowledge.clone();
    if knowledge.from_effect.as_ref().is_some_and(|e| e.is_item()) {
        knowledge.from_effect = None;
    }
    knowledge
}

fn miss(context: &str, ident: &PokemonIdent) {
    debug!(context, pokemon = %ident, "event references an unknown pokemon");
}

#[cfg(test)]
mod tests {
    use showbot_protocol::{GameType, Stat, parse_battle_line};

    use super::*;
    use crate::types::{Status, Weather};

    fn feed(battle: &mut Battle, lines: &[&str]) {
        for line in lines {
            let event = parse_battle_line(line)
                .expect("line parses")
                .expect("line is a battle event");
            battle.apply_event(&event);
        }
    }

    fn ident(s: &str) -> PokemonIdent {
        PokemonIdent::parse(s).expect("valid ident")
    }

    fn singles() -> Battle {
        let mut battle = Battle::new("battle-gen9ou-1");
        feed(
            &mut battle,
            &[
                "|player|p1|Alice|1|",
                "|player|p2|Bob|2|",
                "|gametype|singles",
                "|gen|9",
                "|switch|p1a: Corviknight|Corviknight, F|399/399",
                "|switch|p2a: Dragonite|Dragonite, M|100/100",
                "|turn|1",
            ],
        );
        battle
    }

    #[test]
    fn test_switch_creates_roster_and_active() {
        let battle = singles();
        assert_eq!(battle.status.game_type, GameType::Singles);
        assert_eq!(battle.status.generation, 9);

        let p1 = battle.player(Player::P1).unwrap();
        assert_eq!(p1.name, "Alice");
        assert_eq!(p1.active.len(), 1);
        let (_, corv) = p1.active_pokemon().next().unwrap();
        assert_eq!(corv.condition.hp, 399);
        assert_eq!(corv.condition.max_hp, 399);

        let p2 = battle.player(Player::P2).unwrap();
        assert_eq!(p2.team[0].condition.hp, 100);
        assert!(p2.team[0].active);
    }

    #[test]
    fn test_boosts_are_clamped() {
        let mut battle = singles();
        for _ in 0..5 {
            feed(&mut battle, &["|-boost|p2a: Dragonite|atk|2"]);
        }
        let drago = battle.active(&ident("p2a: Dragonite")).unwrap();
        assert_eq!(drago.boosts.get(Stat::Atk), 6);

        for _ in 0..10 {
            feed(&mut battle, &["|-unboost|p2a: Dragonite|atk|3"]);
        }
        let drago = battle.active(&ident("p2a: Dragonite")).unwrap();
        assert_eq!(drago.boosts.get(Stat::Atk), -6);
    }

    #[test]
    fn test_faint_keeps_active_until_replaced() {
        let mut battle = singles();
        feed(
            &mut battle,
            &["|-damage|p2a: Dragonite|0 fnt", "|faint|p2a: Dragonite"],
        );
        let p2 = battle.player(Player::P2).unwrap();
        assert_eq!(p2.active.len(), 1);
        assert!(p2.team[0].is_fainted());
        assert_eq!(p2.times_fainted, 1);

        feed(&mut battle, &["|switch|p2a: Gholdengo|Gholdengo|100/100"]);
        let p2 = battle.player(Player::P2).unwrap();
        assert_eq!(p2.active.len(), 1);
        assert_eq!(p2.active[&0].pokemon, 1);
        assert!(!p2.team[0].active);
    }

    #[test]
    fn test_switch_resets_slot_state() {
        let mut battle = singles();
        feed(
            &mut battle,
            &[
                "|-boost|p2a: Dragonite|atk|1",
                "|-start|p2a: Dragonite|confusion",
                "|switch|p2a: Gholdengo|Gholdengo|100/100",
                "|switch|p2a: Dragonite|Dragonite, M|88/100",
            ],
        );
        let p2 = battle.player(Player::P2).unwrap();
        assert_eq!(p2.team.len(), 2);
        let drago = &p2.active[&0];
        assert_eq!(drago.pokemon, 0);
        assert!(drago.boosts.is_clear());
        assert!(drago.volatiles.is_empty());
        assert_eq!(p2.team[0].condition.hp, 88);
    }

    #[test]
    fn test_clear_all_boost_is_battle_wide() {
        let mut battle = singles();
        feed(
            &mut battle,
            &[
                "|-boost|p1a: Corviknight|def|2",
                "|-boost|p2a: Dragonite|atk|1",
                "|-clearboost|p2a: Dragonite",
            ],
        );
        assert_eq!(
            battle
                .active(&ident("p1a: Corviknight"))
                .unwrap()
                .boosts
                .get(Stat::Def),
            2
        );

        feed(&mut battle, &["|-boost|p2a: Dragonite|atk|1", "|-clearallboost"]);
        assert!(battle.all_active().all(|(a, _)| a.boosts.is_clear()));
    }

    #[test]
    fn test_knowledge_reveals_ability_and_item() {
        let mut battle = singles();
        feed(
            &mut battle,
            &[
                "|-heal|p1a: Corviknight|399/399|[from] item: Leftovers",
                "|-damage|p2a: Dragonite|88/100|[from] item: Rocky Helmet|[of] p1a: Corviknight",
                "|-ability|p2a: Dragonite|Multiscale",
                "|-boost|p1a: Corviknight|spe|1|[from] ability: Speed Boost|[of] p1a: Corviknight",
            ],
        );
        let corv = battle.pokemon(&ident("p1a: Corviknight")).unwrap();
        // The later reveal wins: Rocky Helmet was attributed to it
        assert!(corv.item.is("rockyhelmet"));
        assert!(corv.ability.is("speedboost"));
        let drago = battle.pokemon(&ident("p2a: Dragonite")).unwrap();
        assert!(drago.ability.is("multiscale"));
        assert!(drago.item.id.is_none());
    }

    #[test]
    fn test_enditem_consumed_vs_removed() {
        let mut battle = singles();
        feed(
            &mut battle,
            &[
                "|-enditem|p2a: Dragonite|Lum Berry|[eat]",
                "|-enditem|p1a: Corviknight|Leftovers|[from] move: Knock Off|[of] p2a: Dragonite",
            ],
        );
        let drago = battle.pokemon(&ident("p2a: Dragonite")).unwrap();
        assert_eq!(drago.item_loss, Some(ItemLoss::Consumed));
        assert_eq!(drago.held_item(), None);
        let corv = battle.pokemon(&ident("p1a: Corviknight")).unwrap();
        assert_eq!(corv.item_loss, Some(ItemLoss::Removed));
        assert_eq!(corv.lost_item.as_deref(), Some("Leftovers"));
    }

    #[test]
    fn test_status_and_cureteam() {
        let mut battle = singles();
        feed(&mut battle, &["|-status|p2a: Dragonite|par"]);
        assert_eq!(
            battle.pokemon(&ident("p2a: Dragonite")).unwrap().status(),
            Some(Status::Paralysis)
        );
        feed(&mut battle, &["|-cureteam|p2a: Dragonite|[from] move: Heal Bell"]);
        assert_eq!(
            battle.pokemon(&ident("p2a: Dragonite")).unwrap().status(),
            None
        );
    }

    #[test]
    fn test_move_tracking() {
        let mut battle = singles();
        feed(
            &mut battle,
            &[
                "|move|p2a: Dragonite|Extreme Speed|p1a: Corviknight",
                "|move|p2a: Dragonite|Extreme Speed|p1a: Corviknight",
                "|-hitcount|p2a: Dragonite|2",
                "|move|p2a: Dragonite|Sleep Talk|p2a: Dragonite",
                "|move|p2a: Dragonite|Outrage|p1a: Corviknight|[from] move: Sleep Talk",
            ],
        );
        let drago = battle.pokemon(&ident("p2a: Dragonite")).unwrap();
        assert!(drago.moves.contains_key("extremespeed"));
        assert!(drago.moves.contains_key("sleeptalk"));
        assert!(!drago.moves.contains_key("outrage"));

        let active = battle.active(&ident("p2a: Dragonite")).unwrap();
        assert_eq!(active.last_move.as_deref(), Some("outrage"));
        assert_eq!(active.hit_count, 0);
    }

    #[test]
    fn test_volatiles_with_payload() {
        let mut battle = singles();
        feed(
            &mut battle,
            &[
                "|-start|p2a: Dragonite|Disable|Extreme Speed",
                "|-start|p1a: Corviknight|typechange|Water|[from] move: Soak",
                "|-start|p2a: Dragonite|perish3",
            ],
        );
        let drago = battle.active(&ident("p2a: Dragonite")).unwrap();
        assert_eq!(
            drago.volatile_data(&Volatile::Disable),
            Some(&VolatileData::Disable {
                move_id: "extremespeed".to_string()
            })
        );
        assert_eq!(
            drago.volatile_data(&Volatile::PerishSong),
            Some(&VolatileData::PerishSong { count: 3 })
        );
        assert!(
            battle.pokemon(&ident("p2a: Dragonite")).unwrap().moves["extremespeed"].disabled
        );

        let corv = battle.active(&ident("p1a: Corviknight")).unwrap();
        assert_eq!(corv.type_override(), Some(&[Type::Water][..]));

        feed(&mut battle, &["|-end|p2a: Dragonite|Disable"]);
        let drago = battle.active(&ident("p2a: Dragonite")).unwrap();
        assert!(!drago.has_volatile(&Volatile::Disable));
        assert!(
            !battle.pokemon(&ident("p2a: Dragonite")).unwrap().moves["extremespeed"].disabled
        );
    }

    #[test]
    fn test_side_and_field_conditions() {
        let mut battle = singles();
        feed(
            &mut battle,
            &[
                "|-sidestart|p1: Alice|move: Stealth Rock",
                "|-sidestart|p2: Bob|Spikes",
                "|-sidestart|p2: Bob|Spikes",
                "|-weather|RainDance|[from] ability: Drizzle|[of] p2a: Dragonite",
                "|-fieldstart|move: Grassy Terrain",
                "|-swapsideconditions",
            ],
        );
        let p1 = battle.player(Player::P1).unwrap();
        let p2 = battle.player(Player::P2).unwrap();
        assert_eq!(p1.side_conditions["spikes"].layers, 2);
        assert!(p2.side_conditions.contains_key("stealthrock"));
        assert_eq!(battle.status.weather_kind(), Some(Weather::Rain));
        assert!(
            battle
                .pokemon(&ident("p2a: Dragonite"))
                .unwrap()
                .ability
                .is("drizzle")
        );
        assert!(battle.status.has_field("grassyterrain"));

        feed(
            &mut battle,
            &[
                "|-weather|none",
                "|-fieldend|move: Grassy Terrain",
                "|-sideend|p1: Alice|Spikes",
            ],
        );
        assert!(battle.status.weather.is_none());
        assert!(battle.status.field_conditions.is_empty());
        assert!(battle.player(Player::P1).unwrap().side_conditions.is_empty());
    }

    #[test]
    fn test_replace_keeps_slot_state() {
        let mut battle = singles();
        feed(
            &mut battle,
            &[
                "|switch|p2a: Chandelure|Chandelure, M|100/100",
                "|-boost|p2a: Chandelure|spa|2",
                "|replace|p2a: Zoroark|Zoroark-Hisui, M|100/100",
            ],
        );
        let p2 = battle.player(Player::P2).unwrap();
        let zoroark = p2.find_pokemon("Zoroark", None).unwrap();
        let active = &p2.active[&0];
        assert_eq!(active.pokemon, zoroark);
        assert_eq!(active.boosts.get(Stat::Spa), 2);
        assert!(active.has_volatile(&Volatile::Illusion));

        let chandelure = &p2.team[p2.find_pokemon("Chandelure", None).unwrap()];
        assert!(!chandelure.active);
        assert!(!chandelure.revealed);
    }

    #[test]
    fn test_terastallize_and_mega_spend_gimmicks() {
        let mut battle = singles();
        feed(
            &mut battle,
            &[
                "|-terastallize|p2a: Dragonite|Normal",
                "|-mega|p1a: Corviknight|Corviknight|Corviknite",
            ],
        );
        let p2 = battle.player(Player::P2).unwrap();
        assert!(p2.gimmicks.contains(&GimmickUse::Terastallize));
        assert_eq!(p2.team[0].terastallized, Some(Type::Normal));
        let p1 = battle.player(Player::P1).unwrap();
        assert!(p1.gimmicks.contains(&GimmickUse::Mega));
        assert!(p1.team[0].item.is("corviknite"));
    }

    #[test]
    fn test_request_refreshes_main_roster() {
        let mut battle = singles();
        let request = r#"|request|{"active":[{"moves":[{"move":"Brave Bird","id":"bravebird","pp":24,"maxpp":24,"target":"any","disabled":false},{"move":"Roost","id":"roost","pp":8,"maxpp":16,"target":"self","disabled":false}]}],"side":{"name":"Alice","id":"p1","pokemon":[{"ident":"p1: Corviknight","details":"Corviknight, F","condition":"399/399","active":true,"stats":{"atk":207,"def":246,"spa":127,"spd":206,"spe":170},"moves":["bravebird","roost"],"baseAbility":"pressure","item":"leftovers","pokeball":"pokeball","ability":"pressure"},{"ident":"p1: Clodsire","details":"Clodsire, M","condition":"401/401","active":false,"stats":{"atk":186,"def":156,"spa":122,"spd":236,"spe":76},"moves":["earthquake"],"baseAbility":"unaware","item":"blacksludge","pokeball":"pokeball","ability":"unaware"}]},"rqid":3}"#;
        feed(&mut battle, &[request]);

        assert_eq!(battle.main_player(), Some(Player::P1));
        assert_eq!(battle.request.as_ref().and_then(|r| r.rqid), Some(3));

        let me = battle.me().unwrap();
        assert_eq!(me.team.len(), 2);
        let corv = &me.team[0];
        assert!(corv.item.locked);
        assert!(corv.ability.is("pressure"));
        assert_eq!(corv.moves["roost"].pp, Some(8));
        assert!(corv.stats.is_some_and(|s| s.is_exact() && s.hp.min == 399));
        assert!(!me.team[1].active);

        // A request for someone else never moves the perspective
        let other = request.replace(r#""id":"p1""#, r#""id":"p2""#);
        feed(&mut battle, &[other.as_str()]);
        assert_eq!(battle.main_player(), Some(Player::P1));
    }

    #[test]
    fn test_battle_end_resolves_winner() {
        let mut battle = singles();
        feed(&mut battle, &["|win|bob"]);
        assert!(battle.ended);
        assert_eq!(battle.winner, Some(Player::P2));
        assert!(!battle.tie);

        let mut tied = singles();
        feed(&mut tied, &["|tie"]);
        let mut aborted = singles();
        feed(&mut aborted, &["|prematureend"]);
        assert!(tied.ended && tied.tie && tied.winner.is_none());
        assert_eq!(tied.ended, aborted.ended);
        assert_eq!(tied.tie, aborted.tie);
        assert_eq!(tied.winner, aborted.winner);

        let mut unknown = singles();
        feed(&mut unknown, &["|win|Carol"]);
        assert!(unknown.ended && unknown.tie);
        assert_eq!(unknown.winner, None);
    }

    #[test]
    fn test_unknown_references_are_ignored() {
        let mut battle = Battle::new("battle-gen9ou-2");
        feed(
            &mut battle,
            &[
                "|-damage|p3a: Nobody|50/100",
                "|-boost|p4a: Ghost|atk|1",
                "|faint|p2a: Missing",
            ],
        );
        assert!(battle.player(Player::P2).is_some_and(|p| p.team.is_empty()));
        assert!(battle.player(Player::P3).is_none());
    }

    #[test]
    fn test_doubles_swap_and_active_size() {
        let mut battle = Battle::new("battle-gen9doublesou-1");
        feed(
            &mut battle,
            &[
                "|gametype|doubles",
                "|switch|p1a: Amoonguss|Amoonguss, F|100/100",
                "|switch|p1b: Incineroar|Incineroar, M|100/100",
                "|swap|p1a: Amoonguss|1",
            ],
        );
        assert_eq!(battle.active_size(), 2);
        let p1 = battle.player(Player::P1).unwrap();
        assert_eq!(p1.active.len(), 2);
        assert_eq!(p1.team[p1.active[&1].pokemon].name, "Amoonguss");
        assert_eq!(p1.team[p1.active[&0].pokemon].name, "Incineroar");
    }

    #[test]
    fn test_slots_beyond_active_size_are_ignored() {
        let mut battle = singles();
        feed(
            &mut battle,
            &[
                "|switch|p1b: Heatran|Heatran, M|386/386",
                "|replace|p2b: Zoroark|Zoroark, M",
            ],
        );
        for player in [Player::P1, Player::P2] {
            let side = battle.player(player).unwrap();
            assert_eq!(side.active.len(), 1);
            assert!(side.active.contains_key(&0));
        }
        let p1 = battle.player(Player::P1).unwrap();
        assert!(p1.team.iter().all(|p| p.name != "Heatran"));
    }
}
