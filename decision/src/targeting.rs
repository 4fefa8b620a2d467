//! Move target resolution and wire encoding
//!
//! Positions on the field are addressed as `(player, slot)`. On the wire a
//! chosen target is a signed location relative to the user: negative for the
//! user's own half of the field, positive for the opposing half. In four
//! player formats each half holds two players, the second one's slots
//! following the first's.

use showbot_protocol::{GameType, Player};

/// Target class of a move, as the request reports it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveTarget {
    Normal,
    Any,
    AdjacentAlly,
    AdjacentAllyOrSelf,
    AdjacentFoe,
    User,
    AllAdjacent,
    AllAdjacentFoes,
    Allies,
    AllySide,
    AllyTeam,
    FoeSide,
    All,
    RandomNormal,
    Scripted,
}

impl MoveTarget {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "normal" => MoveTarget::Normal,
            "any" => MoveTarget::Any,
            "adjacentAlly" => MoveTarget::AdjacentAlly,
            "adjacentAllyOrSelf" => MoveTarget::AdjacentAllyOrSelf,
            "adjacentFoe" => MoveTarget::AdjacentFoe,
            "self" => MoveTarget::User,
            "allAdjacent" => MoveTarget::AllAdjacent,
            "allAdjacentFoes" => MoveTarget::AllAdjacentFoes,
            "allies" => MoveTarget::Allies,
            "allySide" => MoveTarget::AllySide,
            "allyTeam" => MoveTarget::AllyTeam,
            "foeSide" => MoveTarget::FoeSide,
            "all" => MoveTarget::All,
            "randomNormal" => MoveTarget::RandomNormal,
            "scripted" => MoveTarget::Scripted,
            _ => return None,
        })
    }

    /// Request move target, `normal` when absent or unrecognized
    pub fn from_request(target: Option<&str>) -> Self {
        target.and_then(Self::parse).unwrap_or(MoveTarget::Normal)
    }

    /// Whether the user picks a single target for this move
    pub fn is_chosen(&self) -> bool {
        matches!(
            self,
            MoveTarget::Normal
                | MoveTarget::Any
                | MoveTarget::AdjacentAlly
                | MoveTarget::AdjacentAllyOrSelf
                | MoveTarget::AdjacentFoe
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    User,
    Ally,
    Foe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPosition {
    pub player: Player,
    pub slot: usize,
}

impl FieldPosition {
    pub fn new(player: Player, slot: usize) -> Self {
        Self { player, slot }
    }
}

/// Target rules for one game type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetResolver {
    game_type: GameType,
}

impl TargetResolver {
    pub fn new(game_type: GameType) -> Self {
        Self { game_type }
    }

    pub fn game_type(&self) -> GameType {
        self.game_type
    }

    fn active_size(&self) -> usize {
        self.game_type.active_size()
    }

    fn is_four_player(&self) -> bool {
        matches!(self.game_type, GameType::Multi | GameType::FreeForAll)
    }

    pub fn players(&self) -> &'static [Player] {
        if self.is_four_player() {
            &Player::ALL
        } else {
            &Player::ALL[..2]
        }
    }

    /// Slots on one half of the field
    pub fn per_half(&self) -> usize {
        self.active_size() * if self.is_four_player() { 2 } else { 1 }
    }

    /// Every position the format has, in player then slot order
    pub fn positions(&self) -> Vec<FieldPosition> {
        self.players()
            .iter()
            .flat_map(|&player| (0..self.active_size()).map(move |slot| FieldPosition::new(player, slot)))
            .collect()
    }

    /// Position within its half of the field, 0-based
    fn half_position(&self, pos: FieldPosition) -> usize {
        (pos.player.index() / 2) * self.active_size() + pos.slot
    }

    fn same_half(a: Player, b: Player) -> bool {
        a.index() % 2 == b.index() % 2
    }

    pub fn relation(&self, user: FieldPosition, target: FieldPosition) -> Relation {
        if user == target {
            return Relation::User;
        }
        let allied = match self.game_type {
            GameType::FreeForAll => user.player == target.player,
            _ => Self::same_half(user.player, target.player),
        };
        if allied { Relation::Ally } else { Relation::Foe }
    }

    pub fn is_adjacent(&self, a: FieldPosition, b: FieldPosition) -> bool {
        if a == b {
            return false;
        }
        if self.game_type == GameType::FreeForAll {
            return true;
        }
        let pa = self.half_position(a) as isize;
        let pb = self.half_position(b) as isize;
        if Self::same_half(a.player, b.player) {
            (pa - pb).abs() == 1
        } else {
            (pa + pb + 1 - self.per_half() as isize).abs() <= 1
        }
    }

    /// Signed wire location of `target` as seen from `user`
    pub fn encode(&self, user: FieldPosition, target: FieldPosition) -> i8 {
        let location = (self.half_position(target) + 1) as i8;
        if Self::same_half(user.player, target.player) {
            -location
        } else {
            location
        }
    }

    /// Inverse of [`encode`](Self::encode)
    pub fn decode(&self, user: FieldPosition, location: i8) -> Option<FieldPosition> {
        if location == 0 {
            return None;
        }
        let mut side = if location < 0 {
            user.player.index() % 2
        } else {
            (user.player.index() + 1) % 2
        };
        let mut offset = location.unsigned_abs() as usize;
        if offset > self.active_size() {
            offset -= self.active_size();
            side += 2;
        }
        let player = Player::from_index(side)?;
        (self.players().contains(&player) && offset <= self.active_size())
            .then(|| FieldPosition::new(player, offset - 1))
    }

    /// Whether `target` may be chosen for a move of class `move_target`
    pub fn is_valid_target(
        &self,
        user: FieldPosition,
        target: FieldPosition,
        move_target: MoveTarget,
    ) -> bool {
        let relation = self.relation(user, target);
        match move_target {
            MoveTarget::Normal => relation != Relation::User && self.is_adjacent(user, target),
            MoveTarget::Any => relation != Relation::User,
            MoveTarget::AdjacentAlly => {
                relation == Relation::Ally && self.is_adjacent(user, target)
            }
            MoveTarget::AdjacentAllyOrSelf => {
                relation == Relation::User
                    || (relation == Relation::Ally && self.is_adjacent(user, target))
            }
            MoveTarget::AdjacentFoe => {
                relation == Relation::Foe && self.is_adjacent(user, target)
            }
            _ => false,
        }
    }

    /// Whether the choice for this move must carry a target location
    pub fn needs_target(&self, move_target: MoveTarget) -> bool {
        self.per_half() >= 2 && move_target.is_chosen()
    }

    /// Candidates among `occupied` for a move of class `move_target`
    pub fn valid_targets(
        &self,
        user: FieldPosition,
        move_target: MoveTarget,
        occupied: &[FieldPosition],
    ) -> Vec<FieldPosition> {
        if !self.needs_target(move_target) {
            return Vec::new();
        }
        occupied
            .iter()
            .copied()
            .filter(|&target| self.is_valid_target(user, target, move_target))
            .collect()
    }

    /// Target used when nothing better is known: the first occupied valid
    /// position, preferring foes for attacking classes, falling back to any
    /// structurally valid position so the choice stays well-formed
    pub fn default_target(
        &self,
        user: FieldPosition,
        move_target: MoveTarget,
        occupied: &[FieldPosition],
    ) -> Option<FieldPosition> {
        if !self.needs_target(move_target) {
            return None;
        }
        let prefer_foe = matches!(
            move_target,
            MoveTarget::Normal | MoveTarget::Any | MoveTarget::AdjacentFoe
        );
        let pick = |candidates: Vec<FieldPosition>| {
            candidates
                .iter()
                .copied()
                .find(|&t| !prefer_foe || self.relation(user, t) == Relation::Foe)
                .or_else(|| candidates.first().copied())
        };
        pick(self.valid_targets(user, move_target, occupied))
            .or_else(|| pick(self.valid_targets(user, move_target, &self.positions())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(player: Player, slot: usize) -> FieldPosition {
        FieldPosition::new(player, slot)
    }

    #[test]
    fn test_parse_targets() {
        assert_eq!(MoveTarget::parse("adjacentAllyOrSelf"), Some(MoveTarget::AdjacentAllyOrSelf));
        assert_eq!(MoveTarget::parse("self"), Some(MoveTarget::User));
        assert_eq!(MoveTarget::parse("bogus"), None);
        assert_eq!(MoveTarget::from_request(None), MoveTarget::Normal);
        assert!(!MoveTarget::AllAdjacentFoes.is_chosen());
    }

    #[test]
    fn test_singles_never_targets() {
        let resolver = TargetResolver::new(GameType::Singles);
        let user = pos(Player::P1, 0);
        assert!(!resolver.needs_target(MoveTarget::Normal));
        assert_eq!(resolver.default_target(user, MoveTarget::Normal, &resolver.positions()), None);
        assert_eq!(resolver.encode(user, pos(Player::P2, 0)), 1);
        assert_eq!(resolver.encode(user, user), -1);
    }

    #[test]
    fn test_doubles_encoding_and_adjacency() {
        let resolver = TargetResolver::new(GameType::Doubles);
        let user = pos(Player::P1, 0);
        assert_eq!(resolver.encode(user, pos(Player::P2, 0)), 1);
        assert_eq!(resolver.encode(user, pos(Player::P2, 1)), 2);
        assert_eq!(resolver.encode(user, pos(Player::P1, 1)), -2);
        assert_eq!(resolver.relation(user, pos(Player::P1, 1)), Relation::Ally);
        assert!(resolver.is_adjacent(user, pos(Player::P2, 0)));
        assert!(resolver.is_adjacent(user, pos(Player::P2, 1)));

        let occupied = resolver.positions();
        assert_eq!(
            resolver.valid_targets(user, MoveTarget::AdjacentFoe, &occupied),
            vec![pos(Player::P2, 0), pos(Player::P2, 1)]
        );
        assert_eq!(
            resolver.valid_targets(user, MoveTarget::AdjacentAllyOrSelf, &occupied),
            vec![pos(Player::P1, 0), pos(Player::P1, 1)]
        );
        assert_eq!(
            resolver.default_target(user, MoveTarget::Normal, &occupied),
            Some(pos(Player::P2, 0))
        );
    }

    #[test]
    fn test_triples_far_corner_is_not_adjacent() {
        let resolver = TargetResolver::new(GameType::Triples);
        let left = pos(Player::P1, 0);
        // Facing slots mirror: p1 slot 0 faces p2 slot 2
        assert!(resolver.is_adjacent(left, pos(Player::P2, 2)));
        assert!(resolver.is_adjacent(left, pos(Player::P2, 1)));
        assert!(!resolver.is_adjacent(left, pos(Player::P2, 0)));
        assert!(!resolver.is_adjacent(left, pos(Player::P1, 2)));

        let occupied = resolver.positions();
        assert!(!resolver.is_valid_target(left, pos(Player::P2, 0), MoveTarget::Normal));
        assert!(resolver.is_valid_target(left, pos(Player::P2, 0), MoveTarget::Any));
        assert_eq!(resolver.valid_targets(left, MoveTarget::Normal, &occupied).len(), 3);
    }

    #[test]
    fn test_multi_places_partner_after_first_player() {
        let resolver = TargetResolver::new(GameType::Multi);
        let user = pos(Player::P1, 0);
        assert_eq!(resolver.per_half(), 2);
        assert_eq!(resolver.encode(user, pos(Player::P3, 0)), -2);
        assert_eq!(resolver.encode(user, pos(Player::P2, 0)), 1);
        assert_eq!(resolver.encode(user, pos(Player::P4, 0)), 2);
        assert_eq!(resolver.relation(user, pos(Player::P3, 0)), Relation::Ally);
        assert!(resolver.is_adjacent(user, pos(Player::P3, 0)));
        assert_eq!(resolver.decode(user, -2), Some(pos(Player::P3, 0)));
        assert_eq!(resolver.decode(pos(Player::P4, 0), 1), Some(pos(Player::P1, 0)));
    }

    #[test]
    fn test_free_for_all_everyone_else_is_a_foe() {
        let resolver = TargetResolver::new(GameType::FreeForAll);
        let user = pos(Player::P1, 0);
        let p3 = pos(Player::P3, 0);
        assert_eq!(resolver.relation(user, p3), Relation::Foe);
        assert!(resolver.is_adjacent(user, p3));
        // Parity still decides the sign on the wire
        assert_eq!(resolver.encode(user, p3), -2);

        let occupied = resolver.positions();
        assert_eq!(resolver.valid_targets(user, MoveTarget::AdjacentFoe, &occupied).len(), 3);
        assert!(resolver.valid_targets(user, MoveTarget::AdjacentAlly, &occupied).is_empty());
    }

    #[test]
    fn test_default_target_falls_back_to_empty_positions() {
        let resolver = TargetResolver::new(GameType::Doubles);
        let user = pos(Player::P1, 1);
        let occupied = [user];
        assert_eq!(
            resolver.default_target(user, MoveTarget::AdjacentFoe, &occupied),
            Some(pos(Player::P2, 0))
        );
        assert_eq!(resolver.default_target(user, MoveTarget::AllAdjacent, &occupied), None);
    }

    #[test]
    fn test_decode_roundtrips_every_position() {
        for game_type in [GameType::Doubles, GameType::Triples, GameType::Multi, GameType::FreeForAll] {
            let resolver = TargetResolver::new(game_type);
            for user in resolver.positions() {
                for target in resolver.positions() {
                    let loc = resolver.encode(user, target);
                    assert_eq!(resolver.decode(user, loc), Some(target), "{game_type:?}");
                }
            }
        }
    }
}
