#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state for Tank Clash.
//!
//! The board owns every game object through a generational arena and is
//! mutated exclusively via [`apply`], which executes one [`Command`] and
//! reports everything that happened through [`Event`] values. Reads go
//! through the [`query`] module, which hands out snapshots and symbol
//! renderings rather than live references.

mod arena;
mod collision;
mod objects;

use tank_clash_core::{
    symbols, Action, ActionOutcome, BoardSetup, Command, Direction, Event, GridDims,
    InitialObject, Position, TankId, TankOrder, BACKWARD_DELAY_ROUNDS,
    SHELL_CELLS_PER_ROUND, SHOOT_COOLDOWN_ROUNDS,
};

use arena::{Arena, ObjectId};
use objects::{GameObject, Mine, Shell, Tank, Wall};

/// Authoritative state of one battle.
#[derive(Debug)]
pub struct Board {
    dims: GridDims,
    arena: Arena,
    cells: Vec<Vec<ObjectId>>,
    in_flight: Vec<ObjectId>,
    tanks: Vec<(TankId, ObjectId)>,
}

impl Board {
    /// Builds the board from a fully parsed, validated setup.
    ///
    /// Tanks receive identifiers and per-player indices in the reading order
    /// of `setup.objects`, which the ingestion layer produces row-major.
    ///
    /// # Panics
    ///
    /// Panics on a degenerate grid or an object placed outside it; the
    /// ingestion layer guarantees well-formed setups, so either is a
    /// programming error.
    #[must_use]
    pub fn new(setup: &BoardSetup) -> Self {
        let dims = setup.config.dims;
        assert!(
            dims.rows() > 0 && dims.cols() > 0,
            "board dimensions must be at least 1x1",
        );

        let mut board = Self {
            dims,
            arena: Arena::new(),
            cells: vec![Vec::new(); dims.cell_count()],
            in_flight: Vec::new(),
            tanks: Vec::new(),
        };

        let mut next_tank = 0u32;
        let mut per_player = [0u32; 2];
        for &(pos, object) in &setup.objects {
            let index = dims
                .index_of(pos)
                .unwrap_or_else(|| panic!("initial object outside the board at {pos:?}"));
            let id = match object {
                InitialObject::Wall => board.arena.insert(GameObject::Wall(Wall::new(pos))),
                InitialObject::Mine => board.arena.insert(GameObject::Mine(Mine::new(pos))),
                InitialObject::Tank { player } => {
                    let tank_id = TankId::new(next_tank);
                    next_tank += 1;
                    let fleet_index = per_player[player.index()];
                    per_player[player.index()] += 1;
                    let id = board.arena.insert(GameObject::Tank(Tank::new(
                        tank_id,
                        player,
                        fleet_index,
                        pos,
                        setup.config.shells_per_tank,
                    )));
                    board.tanks.push((tank_id, id));
                    id
                }
            };
            board.cells[index].push(id);
        }
        board
    }

    fn cell_index(&self, pos: Position) -> usize {
        self.dims
            .index_of(pos)
            .unwrap_or_else(|| panic!("position {pos:?} outside the board"))
    }

    fn position_of_index(&self, index: usize) -> Position {
        let cols = self.dims.cols() as usize;
        Position::new((index / cols) as u32, (index % cols) as u32)
    }

    fn remove_from_cell(&mut self, pos: Position, id: ObjectId) {
        let index = self.cell_index(pos);
        let cell = &mut self.cells[index];
        let slot = cell
            .iter()
            .position(|&occupant| occupant == id)
            .unwrap_or_else(|| panic!("object handle missing from its cell at {pos:?}"));
        let _ = cell.remove(slot);
    }

    fn place_in_cell(&mut self, pos: Position, id: ObjectId) {
        let index = self.cell_index(pos);
        self.cells[index].push(id);
    }

    fn tank_object(&self, tank: TankId) -> Option<ObjectId> {
        self.tanks
            .iter()
            .find(|&&(id, _)| id == tank)
            .map(|&(_, object)| object)
    }

    fn tank_mut(&mut self, id: ObjectId) -> &mut Tank {
        self.arena
            .object_mut(id)
            .as_tank_mut()
            .unwrap_or_else(|| panic!("tank handle does not resolve to a tank"))
    }

    fn has_live_wall(&self, pos: Position) -> bool {
        let index = self.cell_index(pos);
        self.cells[index].iter().any(|&id| {
            matches!(self.arena.get(id), Some(GameObject::Wall(wall)) if !wall.destroyed)
        })
    }

    fn top_symbol(&self, pos: Position) -> char {
        let index = self.cell_index(pos);
        self.cells[index]
            .iter()
            .rev()
            .filter_map(|&id| self.arena.get(id))
            .find(|object| !object.is_destroyed())
            .map_or(symbols::EMPTY, GameObject::symbol)
    }

    fn resolve_collisions(&mut self, out_events: &mut Vec<Event>) {
        for index in 0..self.cells.len() {
            if self.cells[index].len() < 2 {
                continue;
            }
            let occupants = self.cells[index].clone();
            let at = self.position_of_index(index);
            collision::resolve_cell(&mut self.arena, at, &occupants, out_events);
        }
    }

    fn advance_shells(&mut self, out_events: &mut Vec<Event>) {
        let shells: Vec<ObjectId> = self.in_flight.clone();
        for id in shells {
            for _ in 0..SHELL_CELLS_PER_ROUND {
                let Some(object) = self.arena.get(id) else {
                    break;
                };
                if object.is_destroyed() {
                    break;
                }
                let Some(shell) = object.as_shell() else {
                    panic!("in-flight handle does not resolve to a shell");
                };
                let from = shell.position;
                let to = self.dims.step(from, shell.facing);

                self.remove_from_cell(from, id);
                self.arena.object_mut(id).set_position(to);
                self.place_in_cell(to, id);
                out_events.push(Event::ShellAdvanced { from, to });

                self.resolve_collisions(out_events);
            }
        }
        let arena = &self.arena;
        self.in_flight
            .retain(|&id| matches!(arena.get(id), Some(object) if !object.is_destroyed()));
    }

    fn apply_orders(&mut self, orders: &[TankOrder], out_events: &mut Vec<Event>) {
        for order in orders {
            let Some(object_id) = self.tank_object(order.tank) else {
                continue;
            };
            let (pos, facing, destroyed, waiting, cooldown, shells, continuous_reverse) = {
                let tank = self
                    .arena
                    .object(object_id)
                    .as_tank()
                    .unwrap_or_else(|| panic!("tank handle does not resolve to a tank"));
                (
                    tank.position,
                    tank.facing,
                    tank.destroyed,
                    tank.waiting_for_backward,
                    tank.shoot_cooldown,
                    tank.shells_left,
                    tank.moved_backward_last(),
                )
            };
            if destroyed {
                continue;
            }

            if waiting {
                self.resolve_waiting_tank(object_id, order, pos, facing, out_events);
                continue;
            }

            let applicable = match order.action {
                Action::MoveForward => !self.has_live_wall(self.dims.step(pos, facing)),
                Action::MoveBackward => {
                    !self.has_live_wall(self.dims.step(pos, facing.opposite()))
                }
                Action::Shoot => cooldown == 0 && shells > 0,
                _ => true,
            };
            if !applicable {
                self.finish_action(
                    object_id,
                    order.action,
                    ActionOutcome::Ignored,
                    out_events,
                );
                continue;
            }

            match order.action {
                Action::MoveForward => {
                    let to = self.dims.step(pos, facing);
                    self.move_tank(object_id, order.tank, pos, to, out_events);
                }
                Action::MoveBackward => {
                    if continuous_reverse {
                        let to = self.dims.step(pos, facing.opposite());
                        self.move_tank(object_id, order.tank, pos, to, out_events);
                    } else {
                        let tank = self.tank_mut(object_id);
                        tank.waiting_for_backward = true;
                        tank.backward_delay = BACKWARD_DELAY_ROUNDS;
                        out_events.push(Event::BackwardArmed { tank: order.tank });
                    }
                }
                Action::RotateLeft45
                | Action::RotateRight45
                | Action::RotateLeft90
                | Action::RotateRight90 => {
                    if let Some(steps) = order.action.rotation_steps() {
                        let tank = self.tank_mut(object_id);
                        tank.facing = tank.facing.rotated(steps);
                        let facing = tank.facing;
                        out_events.push(Event::TankRotated {
                            tank: order.tank,
                            facing,
                        });
                    }
                }
                Action::Shoot => {
                    let player = {
                        let tank = self.tank_mut(object_id);
                        tank.shells_left -= 1;
                        tank.shoot_cooldown = SHOOT_COOLDOWN_ROUNDS;
                        tank.player
                    };
                    let spawn_at = self.dims.step(pos, facing);
                    let shell_id = self
                        .arena
                        .insert(GameObject::Shell(Shell::new(spawn_at, facing, player)));
                    self.place_in_cell(spawn_at, shell_id);
                    self.in_flight.push(shell_id);
                    out_events.push(Event::ShellFired {
                        tank: order.tank,
                        player,
                        at: spawn_at,
                        facing,
                    });
                }
                Action::DoNothing | Action::GetBattleInfo => {}
            }
            self.finish_action(object_id, order.action, ActionOutcome::Applied, out_events);
        }
        self.resolve_collisions(out_events);
    }

    fn resolve_waiting_tank(
        &mut self,
        object_id: ObjectId,
        order: &TankOrder,
        pos: Position,
        facing: Direction,
        out_events: &mut Vec<Event>,
    ) {
        if order.action == Action::MoveForward {
            {
                let tank = self.tank_mut(object_id);
                tank.waiting_for_backward = false;
                tank.backward_delay = 0;
            }
            out_events.push(Event::BackwardCanceled { tank: order.tank });
            self.finish_action(
                object_id,
                Action::MoveForward,
                ActionOutcome::Applied,
                out_events,
            );
            return;
        }

        // The countdown runs regardless of the ignored request.
        let expired = {
            let tank = self.tank_mut(object_id);
            tank.backward_delay = tank.backward_delay.saturating_sub(1);
            tank.backward_delay == 0
        };
        if !expired {
            self.finish_action(object_id, order.action, ActionOutcome::Ignored, out_events);
            return;
        }

        let to = self.dims.step(pos, facing.opposite());
        {
            let tank = self.tank_mut(object_id);
            tank.waiting_for_backward = false;
        }
        if self.has_live_wall(to) {
            self.finish_action(
                object_id,
                Action::MoveBackward,
                ActionOutcome::Ignored,
                out_events,
            );
        } else {
            self.move_tank(object_id, order.tank, pos, to, out_events);
            self.finish_action(
                object_id,
                Action::MoveBackward,
                ActionOutcome::Applied,
                out_events,
            );
        }
    }

    fn move_tank(
        &mut self,
        object_id: ObjectId,
        tank: TankId,
        from: Position,
        to: Position,
        out_events: &mut Vec<Event>,
    ) {
        self.remove_from_cell(from, object_id);
        self.arena.object_mut(object_id).set_position(to);
        self.place_in_cell(to, object_id);
        out_events.push(Event::TankMoved { tank, from, to });
    }

    fn finish_action(
        &mut self,
        object_id: ObjectId,
        action: Action,
        outcome: ActionOutcome,
        out_events: &mut Vec<Event>,
    ) {
        let successful_shot = action == Action::Shoot && outcome == ActionOutcome::Applied;
        let tank_id = {
            let tank = self.tank_mut(object_id);
            tank.record_action(action, outcome == ActionOutcome::Applied);
            if !successful_shot && tank.shoot_cooldown > 0 {
                tank.tick_shoot_cooldown();
            }
            tank.id
        };
        out_events.push(Event::ActionResolved {
            tank: tank_id,
            action,
            outcome,
        });
    }

    fn purge(&mut self) {
        for index in 0..self.cells.len() {
            let occupants = std::mem::take(&mut self.cells[index]);
            let mut kept = Vec::with_capacity(occupants.len());
            for id in occupants {
                let destroyed = self
                    .arena
                    .get(id)
                    .map_or(true, GameObject::is_destroyed);
                if destroyed {
                    let _ = self.arena.remove(id);
                } else {
                    kept.push(id);
                }
            }
            self.cells[index] = kept;
        }
        let arena = &self.arena;
        self.in_flight.retain(|&id| arena.get(id).is_some());
        self.tanks.retain(|&(_, id)| arena.get(id).is_some());
    }
}

/// Applies the provided command to the board, mutating state deterministically.
pub fn apply(board: &mut Board, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::AdvanceShells => board.advance_shells(out_events),
        Command::ApplyOrders { orders } => board.apply_orders(&orders, out_events),
        Command::PurgeDestroyed => board.purge(),
    }
}

/// Query functions that provide read-only access to the board state.
pub mod query {
    use super::{Board, GameObject};
    use tank_clash_core::{
        symbols, GridDims, Position, SatelliteFrame, ShellSnapshot, TankId, TankView,
    };

    /// Dimensions of the battlefield.
    #[must_use]
    pub fn dims(board: &Board) -> GridDims {
        board.dims
    }

    /// Captures a read-only view of every tank still registered, including
    /// destroyed tanks that the end-of-round purge has not removed yet.
    #[must_use]
    pub fn tank_view(board: &Board) -> TankView {
        let snapshots = board
            .tanks
            .iter()
            .filter_map(|&(_, id)| board.arena.get(id))
            .filter_map(GameObject::as_tank)
            .map(super::Tank::snapshot)
            .collect();
        TankView::from_snapshots(snapshots)
    }

    /// Living tanks in canonical board-scan order: row-major over the grid,
    /// stack order within a cell.
    #[must_use]
    pub fn tanks_in_scan_order(board: &Board) -> Vec<TankId> {
        let mut order = Vec::new();
        for cell in &board.cells {
            for &id in cell {
                if let Some(GameObject::Tank(tank)) = board.arena.get(id) {
                    if !tank.destroyed {
                        order.push(tank.id);
                    }
                }
            }
        }
        order
    }

    /// Renders the board into a satellite frame for the tank at `own`,
    /// applying the layering priority and marking the requesting cell.
    #[must_use]
    pub fn satellite_frame(board: &Board, own: Position) -> SatelliteFrame {
        let mut cells = Vec::with_capacity(board.dims.cell_count());
        for index in 0..board.cells.len() {
            cells.push(board.top_symbol(board.position_of_index(index)));
        }
        if let Some(index) = board.dims.index_of(own) {
            cells[index] = symbols::SELF_MARKER;
        }
        SatelliteFrame::new(board.dims, cells)
    }

    /// Renders the board into plain text rows for the per-round dump.
    #[must_use]
    pub fn board_lines(board: &Board) -> Vec<String> {
        (0..board.dims.rows())
            .map(|row| {
                (0..board.dims.cols())
                    .map(|col| board.top_symbol(Position::new(row, col)))
                    .collect()
            })
            .collect()
    }

    /// Topmost live symbol at the probed cell.
    #[must_use]
    pub fn symbol_at(board: &Board, pos: Position) -> char {
        board.top_symbol(pos)
    }

    /// Number of shells currently tracked in flight.
    #[must_use]
    pub fn shells_in_flight(board: &Board) -> usize {
        board.in_flight.len()
    }

    /// Snapshots of the in-flight shells, in firing order.
    #[must_use]
    pub fn shell_view(board: &Board) -> Vec<ShellSnapshot> {
        board
            .in_flight
            .iter()
            .filter_map(|&id| board.arena.get(id))
            .filter_map(GameObject::as_shell)
            .map(|shell| ShellSnapshot {
                position: shell.position,
                facing: shell.facing,
                owner: shell.owner,
            })
            .collect()
    }

    /// Cumulative hits absorbed by a live wall at the probed cell, if any.
    #[must_use]
    pub fn wall_hits(board: &Board, pos: Position) -> Option<u8> {
        let index = board.cell_index(pos);
        board.cells[index].iter().find_map(|&id| {
            match board.arena.get(id) {
                Some(GameObject::Wall(wall)) if !wall.destroyed => Some(wall.hits),
                _ => None,
            }
        })
    }
}
