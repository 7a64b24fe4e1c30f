//! The four object kinds that occupy board cells.
//!
//! A closed tagged variant replaces runtime type probing: the collision
//! resolver and the renderer classify occupants by pattern matching.

use tank_clash_core::{
    symbols, Action, Direction, PlayerId, Position, TankId, TankSnapshot,
};

/// Number of shell hits a wall absorbs before collapsing.
pub(crate) const WALL_MAX_HITS: u8 = 2;

/// Any object that can occupy a board cell.
#[derive(Debug)]
pub(crate) enum GameObject {
    Tank(Tank),
    Shell(Shell),
    Wall(Wall),
    Mine(Mine),
}

impl GameObject {
    #[allow(dead_code)]
    pub(crate) fn position(&self) -> Position {
        match self {
            Self::Tank(tank) => tank.position,
            Self::Shell(shell) => shell.position,
            Self::Wall(wall) => wall.position,
            Self::Mine(mine) => mine.position,
        }
    }

    pub(crate) fn set_position(&mut self, pos: Position) {
        match self {
            Self::Tank(tank) => tank.position = pos,
            Self::Shell(shell) => shell.position = pos,
            Self::Wall(wall) => wall.position = pos,
            Self::Mine(mine) => mine.position = pos,
        }
    }

    pub(crate) fn is_destroyed(&self) -> bool {
        match self {
            Self::Tank(tank) => tank.destroyed,
            Self::Shell(shell) => shell.destroyed,
            Self::Wall(wall) => wall.destroyed,
            Self::Mine(mine) => mine.destroyed,
        }
    }

    pub(crate) fn destroy(&mut self) {
        match self {
            Self::Tank(tank) => tank.destroy(),
            Self::Shell(shell) => shell.destroyed = true,
            Self::Wall(wall) => wall.destroyed = true,
            Self::Mine(mine) => mine.destroyed = true,
        }
    }

    pub(crate) fn symbol(&self) -> char {
        match self {
            Self::Tank(tank) => tank.player.symbol(),
            Self::Shell(_) => symbols::SHELL,
            Self::Wall(_) => symbols::WALL,
            Self::Mine(_) => symbols::MINE,
        }
    }

    pub(crate) fn as_tank(&self) -> Option<&Tank> {
        match self {
            Self::Tank(tank) => Some(tank),
            _ => None,
        }
    }

    pub(crate) fn as_tank_mut(&mut self) -> Option<&mut Tank> {
        match self {
            Self::Tank(tank) => Some(tank),
            _ => None,
        }
    }

    pub(crate) fn as_shell(&self) -> Option<&Shell> {
        match self {
            Self::Shell(shell) => Some(shell),
            _ => None,
        }
    }
}

/// A player-controlled tank and its action/cooldown state machine.
#[derive(Debug)]
pub(crate) struct Tank {
    pub(crate) id: TankId,
    pub(crate) player: PlayerId,
    pub(crate) index_in_player: u32,
    pub(crate) position: Position,
    pub(crate) facing: Direction,
    pub(crate) destroyed: bool,
    pub(crate) killed_this_round: bool,
    pub(crate) shells_left: u16,
    pub(crate) shoot_cooldown: u8,
    pub(crate) waiting_for_backward: bool,
    pub(crate) backward_delay: u8,
    pub(crate) last_action: Option<Action>,
    pub(crate) last_action_applied: bool,
}

impl Tank {
    pub(crate) fn new(
        id: TankId,
        player: PlayerId,
        index_in_player: u32,
        position: Position,
        shells: u16,
    ) -> Self {
        Self {
            id,
            player,
            index_in_player,
            position,
            facing: player.starting_facing(),
            destroyed: false,
            killed_this_round: false,
            shells_left: shells,
            shoot_cooldown: 0,
            waiting_for_backward: false,
            backward_delay: 0,
            last_action: None,
            last_action_applied: false,
        }
    }

    pub(crate) fn destroy(&mut self) {
        self.destroyed = true;
        self.killed_this_round = true;
    }

    /// Whether the previous recorded action was an executed backward move,
    /// which entitles the tank to continuous reverse.
    pub(crate) fn moved_backward_last(&self) -> bool {
        self.last_action == Some(Action::MoveBackward) && self.last_action_applied
    }

    pub(crate) fn record_action(&mut self, action: Action, applied: bool) {
        self.last_action = Some(action);
        self.last_action_applied = applied;
    }

    /// Decrements the shoot cooldown for a round whose taken action was not a
    /// successful shot. A fresh cooldown set this round is left untouched.
    pub(crate) fn tick_shoot_cooldown(&mut self) {
        self.shoot_cooldown = self.shoot_cooldown.saturating_sub(1);
    }

    pub(crate) fn snapshot(&self) -> TankSnapshot {
        TankSnapshot {
            id: self.id,
            player: self.player,
            index_in_player: self.index_in_player,
            position: self.position,
            facing: self.facing,
            alive: !self.destroyed,
            killed_this_round: self.killed_this_round,
            shells_left: self.shells_left,
            shoot_cooldown: self.shoot_cooldown,
            waiting_for_backward: self.waiting_for_backward,
            backward_delay: self.backward_delay,
            last_action: self.last_action,
            last_action_applied: self.last_action_applied,
        }
    }
}

/// A shell in flight.
#[derive(Debug)]
pub(crate) struct Shell {
    pub(crate) position: Position,
    pub(crate) facing: Direction,
    pub(crate) owner: PlayerId,
    pub(crate) destroyed: bool,
}

impl Shell {
    pub(crate) fn new(position: Position, facing: Direction, owner: PlayerId) -> Self {
        Self {
            position,
            facing,
            owner,
            destroyed: false,
        }
    }
}

/// A wall that collapses after absorbing two shell hits.
#[derive(Debug)]
pub(crate) struct Wall {
    pub(crate) position: Position,
    pub(crate) hits: u8,
    pub(crate) destroyed: bool,
}

impl Wall {
    pub(crate) fn new(position: Position) -> Self {
        Self {
            position,
            hits: 0,
            destroyed: false,
        }
    }

    /// Registers one shell hit; the wall collapses on the second.
    pub(crate) fn damage(&mut self) {
        self.hits = self.hits.saturating_add(1);
        if self.hits >= WALL_MAX_HITS {
            self.destroyed = true;
        }
    }
}

/// A mine that detonates under any tank.
#[derive(Debug)]
pub(crate) struct Mine {
    pub(crate) position: Position,
    pub(crate) destroyed: bool,
}

impl Mine {
    pub(crate) fn new(position: Position) -> Self {
        Self {
            position,
            destroyed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_survives_first_hit_and_collapses_on_second() {
        let mut wall = Wall::new(Position::new(0, 0));
        wall.damage();
        assert_eq!(wall.hits, 1);
        assert!(!wall.destroyed);
        wall.damage();
        assert!(wall.destroyed);
    }

    #[test]
    fn destroying_a_tank_marks_the_reporting_flag() {
        let mut tank = Tank::new(TankId::new(0), PlayerId::One, 0, Position::new(2, 2), 4);
        tank.destroy();
        assert!(tank.destroyed);
        assert!(tank.killed_this_round);
    }

    #[test]
    fn continuous_reverse_requires_an_applied_backward() {
        let mut tank = Tank::new(TankId::new(1), PlayerId::Two, 0, Position::new(0, 0), 4);
        tank.record_action(Action::MoveBackward, false);
        assert!(!tank.moved_backward_last());
        tank.record_action(Action::MoveBackward, true);
        assert!(tank.moved_backward_last());
    }
}
