//! Battle - the aggregate rebuilt from the event stream

use std::collections::BTreeMap;

use showbot_protocol::{BattleRequest, GameType, Player, PokemonIdent};

use crate::types::{ActivePokemon, BattleGlobalStatus, PlayerState, SidePokemon};

/// A battle being tracked from server messages.
///
/// Built up one event at a time by [`Battle::apply_event`]. The perspective
/// owner (`main_player`) is learned from the first request and never changes
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Battle {
    pub id: String,
    pub turn: u32,
    pub status: BattleGlobalStatus,
    pub players: BTreeMap<Player, PlayerState>,
    main_player: Option<Player>,
    /// Latest request from the server
    pub request: Option<BattleRequest>,
    pub started: bool,
    pub ended: bool,
    pub winner: Option<Player>,
    pub tie: bool,
}

impl Battle {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            turn: 0,
            status: BattleGlobalStatus::default(),
            players: BTreeMap::new(),
            main_player: None,
            request: None,
            started: false,
            ended: false,
            winner: None,
            tie: false,
        }
    }

    pub fn main_player(&self) -> Option<Player> {
        self.main_player
    }

    /// Set the perspective owner. Returns false (and changes nothing) when a
    /// different player was already set.
    pub fn set_main_player(&mut self, player: Player) -> bool {
        match self.main_player {
            Some(current) => current == player,
            None => {
                self.main_player = Some(player);
                true
            }
        }
    }

    pub fn player(&self, player: Player) -> Option<&PlayerState> {
        self.players.get(&player)
    }

    pub fn player_mut(&mut self, player: Player) -> Option<&mut PlayerState> {
        self.players.get_mut(&player)
    }

    /// Get a player's state, creating it on first reference
    pub fn player_entry(&mut self, player: Player) -> &mut PlayerState {
        self.players
            .entry(player)
            .or_insert_with(|| PlayerState::new(player))
    }

    pub fn me(&self) -> Option<&PlayerState> {
        self.main_player.and_then(|p| self.player(p))
    }

    /// Players on the other team from the perspective owner. In free-for-all
    /// every other player is one.
    pub fn opponents(&self) -> impl Iterator<Item = &PlayerState> {
        let me = self.main_player;
        let ffa = self.status.game_type == GameType::FreeForAll;
        self.players.values().filter(move |p| {
            me.is_some_and(|me| p.player != me && (ffa || !p.player.is_ally_of(me)))
        })
    }

    /// Teammates of the perspective owner (multi battles), excluding themself
    pub fn allies(&self) -> impl Iterator<Item = &PlayerState> {
        let me = self.main_player;
        let ffa = self.status.game_type == GameType::FreeForAll;
        self.players.values().filter(move |p| {
            !ffa && me.is_some_and(|me| p.player != me && p.player.is_ally_of(me))
        })
    }

    /// Slots per player under the current game type
    pub fn active_size(&self) -> usize {
        self.status.active_size()
    }

    /// Roster entry an ident refers to
    pub fn pokemon(&self, ident: &PokemonIdent) -> Option<&SidePokemon> {
        let player = self.player(ident.player)?;
        player.team.get(player.resolve(ident)?)
    }

    pub fn pokemon_mut(&mut self, ident: &PokemonIdent) -> Option<&mut SidePokemon> {
        let player = self.players.get_mut(&ident.player)?;
        let index = player.resolve(ident)?;
        player.team.get_mut(index)
    }

    /// Active combat state an ident refers to
    pub fn active(&self, ident: &PokemonIdent) -> Option<&ActivePokemon> {
        self.player(ident.player)?.active_for(ident)
    }

    pub fn active_mut(&mut self, ident: &PokemonIdent) -> Option<&mut ActivePokemon> {
        self.players.get_mut(&ident.player)?.active_for_mut(ident)
    }

    /// Every occupied slot of every player
    pub fn all_active(&self) -> impl Iterator<Item = (&ActivePokemon, &SidePokemon)> {
        self.players.values().flat_map(|p| p.active_pokemon())
    }

    pub fn is_in_progress(&self) -> bool {
        self.turn > 0 && !self.ended
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_battle() {
        let battle = Battle::new("battle-gen9ou-1");
        assert_eq!(battle.turn, 0);
        assert!(!battle.ended);
        assert!(battle.main_player().is_none());
        assert_eq!(battle.active_size(), 1);
    }

    #[test]
    fn test_main_player_is_set_once() {
        let mut battle = Battle::new("battle-gen9ou-1");
        assert!(battle.set_main_player(Player::P2));
        assert!(battle.set_main_player(Player::P2));
        assert!(!battle.set_main_player(Player::P1));
        assert_eq!(battle.main_player(), Some(Player::P2));
    }

    #[test]
    fn test_opponents_and_allies() {
        let mut battle = Battle::new("battle-gen9multirandombattle-1");
        for player in Player::ALL {
            battle.player_entry(player).name = player.to_string();
        }
        assert_eq!(battle.opponents().count(), 0);

        battle.set_main_player(Player::P1);
        let opponents: Vec<_> = battle.opponents().map(|p| p.player).collect();
        assert_eq!(opponents, vec![Player::P2, Player::P4]);
        let allies: Vec<_> = battle.allies().map(|p| p.player).collect();
        assert_eq!(allies, vec![Player::P3]);
    }

    #[test]
    fn test_free_for_all_has_no_allies() {
        let mut battle = Battle::new("battle-gen9freeforallrandombattle-1");
        battle.status.game_type = GameType::FreeForAll;
        for player in Player::ALL {
            battle.player_entry(player).name = player.to_string();
        }
        battle.set_main_player(Player::P1);

        let opponents: Vec<_> = battle.opponents().map(|p| p.player).collect();
        assert_eq!(opponents, vec![Player::P2, Player::P3, Player::P4]);
        assert_eq!(battle.allies().count(), 0);
    }

    #[test]
    fn test_is_in_progress() {
        let mut battle = Battle::new("battle-gen9ou-1");
        assert!(!battle.is_in_progress());
        battle.turn = 1;
        assert!(battle.is_in_progress());
        battle.ended = true;
        assert!(!battle.is_in_progress());
    }
}
