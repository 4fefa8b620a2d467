//! Analyzers: derived knowledge built alongside the tracked battle
//!
//! An analyzer sees every event right after it was folded into the
//! [`Battle`]. It may be created late, in which case the session replays the
//! whole event log through it first.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use showbot_battle::Battle;
use showbot_protocol::{BattleEvent, MajorEvent, Player, PokemonIdent};

/// Collaborator fed with the event stream of one battle
pub trait Analyzer: Send {
    fn on_event(&mut self, battle: &Battle, event: &BattleEvent) -> Result<()>;

    /// Snapshot handed to decision algorithms
    fn knowledge(&self) -> AnalyzerKnowledge;

    fn destroy(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchRecord {
    pub turn: u32,
    pub player: Player,
    pub slot: usize,
    pub species: String,
    /// Dragged in by the opponent rather than chosen
    pub forced: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyzerKnowledge {
    /// Move ids seen per player and species id
    pub moves: BTreeMap<(Player, String), BTreeSet<String>>,
    pub switches: Vec<SwitchRecord>,
}

impl AnalyzerKnowledge {
    pub fn revealed_moves(&self, player: Player, species: &str) -> impl Iterator<Item = &str> {
        self.moves
            .get(&(player, species.to_string()))
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    pub fn switches_of(&self, player: Player) -> impl Iterator<Item = &SwitchRecord> {
        self.switches.iter().filter(move |s| s.player == player)
    }

    /// Switches `player` chose themselves on `turn`
    pub fn switched_on_turn(&self, player: Player, turn: u32) -> bool {
        self.switches_of(player)
            .any(|s| s.turn == turn && !s.forced)
    }
}

/// Default analyzer: remembers every move and switch it sees
#[derive(Debug, Default)]
pub struct RevealAnalyzer {
    knowledge: AnalyzerKnowledge,
}

impl RevealAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    fn species(battle: &Battle, ident: &PokemonIdent) -> Option<String> {
        battle.pokemon(ident).map(|p| p.species_id())
    }

    fn record_switch(&mut self, battle: &Battle, pokemon: &PokemonIdent, forced: bool) {
        let Some(species) = Self::species(battle, pokemon) else {
            tracing::debug!(battle = %battle.id, pokemon = %pokemon, "switch of untracked pokemon");
            return;
        };
        self.knowledge.switches.push(SwitchRecord {
            turn: battle.turn,
            player: pokemon.player,
            slot: pokemon.slot.unwrap_or_default(),
            species,
            forced,
        });
    }
}

impl Analyzer for RevealAnalyzer {
    fn on_event(&mut self, battle: &Battle, event: &BattleEvent) -> Result<()> {
        let BattleEvent::Major(major) = event else {
            return Ok(());
        };
        match major {
            MajorEvent::Switch { pokemon, .. } => self.record_switch(battle, pokemon, false),
            MajorEvent::Drag { pokemon, .. } => self.record_switch(battle, pokemon, true),
            MajorEvent::Move {
                pokemon,
                move_name,
                knowledge,
                ..
            } => {
                // Moves called through another move are not part of the moveset
                let called = knowledge
                    .from_effect
                    .as_ref()
                    .is_some_and(|effect| effect.id != "lockedmove");
                if called {
                    return Ok(());
                }
                if let Some(species) = Self::species(battle, pokemon) {
                    self.knowledge
                        .moves
                        .entry((pokemon.player, species))
                        .or_default()
                        .insert(showbot_protocol::to_id(move_name));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn knowledge(&self) -> AnalyzerKnowledge {
        self.knowledge.clone()
    }
}
