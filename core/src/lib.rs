#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tank Clash engine.
//!
//! This crate defines the vocabulary that connects the authoritative board,
//! the pure systems, and the adapters. Adapters and the match runner submit
//! [`Command`] values describing desired mutations, the board executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing what actually happened. Systems consume immutable views and a
//! tank's private [`BattleInfo`] and respond exclusively with [`Action`]
//! choices, never with direct board access.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Board symbols shared by rendering, satellite frames, and map files.
pub mod symbols {
    /// Wall cell.
    pub const WALL: char = '#';
    /// Mine cell.
    pub const MINE: char = '@';
    /// In-flight shell.
    pub const SHELL: char = '*';
    /// Empty cell.
    pub const EMPTY: char = ' ';
    /// The requesting tank's own cell inside a satellite frame.
    pub const SELF_MARKER: char = '%';
    /// Probe outside the battlefield inside a satellite frame.
    pub const OUT_OF_BOUNDS: char = '&';
}

/// Identifies one of the two competing players.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlayerId {
    /// The player whose tanks carry the `1` symbol.
    One,
    /// The player whose tanks carry the `2` symbol.
    Two,
}

impl PlayerId {
    /// Board symbol rendered for this player's tanks.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::One => '1',
            Self::Two => '2',
        }
    }

    /// The opposing player.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    /// Zero-based index usable for per-player tables.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }

    /// Initial facing assigned to this player's tanks at board creation.
    #[must_use]
    pub const fn starting_facing(self) -> Direction {
        match self {
            Self::One => Direction::West,
            Self::Two => Direction::East,
        }
    }

    /// Resolves a board symbol back to the owning player, if it is a tank digit.
    #[must_use]
    pub const fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '1' => Some(Self::One),
            '2' => Some(Self::Two),
            _ => None,
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One => write!(f, "1"),
            Self::Two => write!(f, "2"),
        }
    }
}

/// Unique identifier assigned to a tank for the lifetime of a match.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TankId(u32);

impl TankId {
    /// Creates a new tank identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Eight-way compass heading used for tank facings and shell travel.
///
/// The indices run clockwise from [`Direction::North`], matching the order in
/// which rotation steps are counted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing row indices.
    North,
    /// Diagonal toward decreasing rows and increasing columns.
    NorthEast,
    /// Toward increasing column indices.
    East,
    /// Diagonal toward increasing rows and columns.
    SouthEast,
    /// Toward increasing row indices.
    South,
    /// Diagonal toward increasing rows and decreasing columns.
    SouthWest,
    /// Toward decreasing column indices.
    West,
    /// Diagonal toward decreasing rows and columns.
    NorthWest,
}

impl Direction {
    /// Every heading in clockwise index order.
    pub const ALL: [Self; 8] = [
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
    ];

    /// Clockwise index of the heading, starting at north.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::North => 0,
            Self::NorthEast => 1,
            Self::East => 2,
            Self::SouthEast => 3,
            Self::South => 4,
            Self::SouthWest => 5,
            Self::West => 6,
            Self::NorthWest => 7,
        }
    }

    /// Heading for the provided clockwise index, reduced modulo 8.
    #[must_use]
    pub const fn from_index(value: u8) -> Self {
        Self::ALL[(value % 8) as usize]
    }

    /// Row and column delta of a single step along this heading.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (-1, 0),
            Self::NorthEast => (-1, 1),
            Self::East => (0, 1),
            Self::SouthEast => (1, 1),
            Self::South => (1, 0),
            Self::SouthWest => (1, -1),
            Self::West => (0, -1),
            Self::NorthWest => (-1, -1),
        }
    }

    /// The heading pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        Self::from_index(self.index() + 4)
    }

    /// Heading reached by rotating `steps` eighth-turns, clockwise positive.
    #[must_use]
    pub fn rotated(self, steps: i8) -> Self {
        let index = i16::from(self.index()) + i16::from(steps);
        Self::from_index(index.rem_euclid(8) as u8)
    }

    /// Signed number of eighth-turns from `self` to `other`, in `-4..=4`
    /// preferring the clockwise representation of a half turn.
    #[must_use]
    pub fn steps_to(self, other: Self) -> i8 {
        let diff = (i16::from(other.index()) - i16::from(self.index())).rem_euclid(8);
        if diff > 4 {
            (diff - 8) as i8
        } else {
            diff as i8
        }
    }
}

/// Location of a single grid cell expressed as row and column coordinates.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    row: u32,
    col: u32,
}

impl Position {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn col(&self) -> u32 {
        self.col
    }
}

/// Dimensions of the toroidal battlefield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDims {
    rows: u32,
    cols: u32,
}

impl GridDims {
    /// Creates a new dimension descriptor.
    #[must_use]
    pub const fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    /// Number of rows on the board.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns on the board.
    #[must_use]
    pub const fn cols(&self) -> u32 {
        self.cols
    }

    /// Total number of cells on the board.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let count = u64::from(self.rows) * u64::from(self.cols);
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    /// Reports whether the position names a cell inside the grid.
    #[must_use]
    pub const fn contains(&self, pos: Position) -> bool {
        pos.row() < self.rows && pos.col() < self.cols
    }

    /// Row-major index of the cell, or `None` outside the grid.
    #[must_use]
    pub fn index_of(&self, pos: Position) -> Option<usize> {
        if !self.contains(pos) {
            return None;
        }
        let row = usize::try_from(pos.row()).ok()?;
        let col = usize::try_from(pos.col()).ok()?;
        let width = usize::try_from(self.cols).ok()?;
        Some(row * width + col)
    }

    /// Position one step along `dir`, wrapping both axes toroidally.
    #[must_use]
    pub fn step(&self, pos: Position, dir: Direction) -> Position {
        self.offset_by(pos, dir, 1)
    }

    /// Position `steps` cells along `dir`, wrapping both axes toroidally.
    #[must_use]
    pub fn offset_by(&self, pos: Position, dir: Direction, steps: u32) -> Position {
        if self.rows == 0 || self.cols == 0 {
            return pos;
        }
        let (row_delta, col_delta) = dir.offset();
        let rows = i64::from(self.rows);
        let cols = i64::from(self.cols);
        let row = (i64::from(pos.row()) + i64::from(row_delta) * i64::from(steps))
            .rem_euclid(rows);
        let col = (i64::from(pos.col()) + i64::from(col_delta) * i64::from(steps))
            .rem_euclid(cols);
        Position::new(row as u32, col as u32)
    }

    /// Minimal signed row/column deltas from `from` to `to` on the torus.
    ///
    /// Each component lies in the half-open range `(-n/2, n/2]` for the
    /// corresponding axis length `n`.
    #[must_use]
    pub fn wrapped_delta(&self, from: Position, to: Position) -> (i32, i32) {
        (
            wrap_axis(from.row(), to.row(), self.rows),
            wrap_axis(from.col(), to.col(), self.cols),
        )
    }

    /// Toroidal Manhattan distance between two cells.
    #[must_use]
    pub fn toroidal_distance(&self, from: Position, to: Position) -> u32 {
        let (row_delta, col_delta) = self.wrapped_delta(from, to);
        row_delta.unsigned_abs() + col_delta.unsigned_abs()
    }
}

fn wrap_axis(from: u32, to: u32, len: u32) -> i32 {
    if len == 0 {
        return 0;
    }
    let len = i64::from(len);
    let mut delta = (i64::from(to) - i64::from(from)).rem_euclid(len);
    if delta > len / 2 {
        delta -= len;
    }
    delta as i32
}

/// One action a tank may request per round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Advance one cell along the current facing.
    MoveForward,
    /// Reverse one cell, subject to the two-round arming delay.
    MoveBackward,
    /// Rotate one eighth-turn counterclockwise.
    RotateLeft45,
    /// Rotate one eighth-turn clockwise.
    RotateRight45,
    /// Rotate one quarter-turn counterclockwise.
    RotateLeft90,
    /// Rotate one quarter-turn clockwise.
    RotateRight90,
    /// Fire a shell one cell ahead of the current facing.
    Shoot,
    /// Spend the round requesting a fresh battlefield snapshot.
    GetBattleInfo,
    /// Spend the round idle.
    DoNothing,
}

impl Action {
    /// Signed eighth-turn count for rotation actions, `None` otherwise.
    #[must_use]
    pub const fn rotation_steps(self) -> Option<i8> {
        match self {
            Self::RotateLeft45 => Some(-1),
            Self::RotateRight45 => Some(1),
            Self::RotateLeft90 => Some(-2),
            Self::RotateRight90 => Some(2),
            _ => None,
        }
    }

    /// Human-readable label used by the per-round action log.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MoveForward => "MoveForward",
            Self::MoveBackward => "MoveBackward",
            Self::RotateLeft45 => "RotateLeft45",
            Self::RotateRight45 => "RotateRight45",
            Self::RotateLeft90 => "RotateLeft90",
            Self::RotateRight90 => "RotateRight90",
            Self::Shoot => "Shoot",
            Self::GetBattleInfo => "GetBattleInfo",
            Self::DoNothing => "DoNothing",
        }
    }
}

/// Whether a requested action was executed or rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionOutcome {
    /// The action passed validation and was executed.
    Applied,
    /// The action failed validation and had no board effect.
    Ignored,
}

/// A single tank's requested action for one round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TankOrder {
    /// Tank issuing the request.
    pub tank: TankId,
    /// Requested action.
    pub action: Action,
}

/// Commands that express all permissible board mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances every in-flight shell two half-steps, resolving collisions
    /// after each half-step.
    AdvanceShells,
    /// Validates and applies one round of tank orders, supplied in canonical
    /// board-scan order, then runs a single collision pass.
    ApplyOrders {
        /// Requested actions, one per living tank.
        orders: Vec<TankOrder>,
    },
    /// Removes destroyed objects from the board and clears the
    /// killed-this-round reporting flags.
    PurgeDestroyed,
}

/// Events broadcast by the board after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A shell completed one half-step.
    ShellAdvanced {
        /// Cell the shell vacated.
        from: Position,
        /// Cell the shell entered.
        to: Position,
    },
    /// A shell was destroyed by a collision.
    ShellDestroyed {
        /// Cell where the shell died.
        at: Position,
    },
    /// A tank fired a shell.
    ShellFired {
        /// Tank that fired.
        tank: TankId,
        /// Owner of the firing tank.
        player: PlayerId,
        /// Cell the shell spawned into.
        at: Position,
        /// Heading of the spawned shell.
        facing: Direction,
    },
    /// A wall absorbed one shell hit.
    WallDamaged {
        /// Cell of the wall.
        at: Position,
        /// Cumulative hits absorbed so far.
        hits: u8,
    },
    /// A wall collapsed after its second hit.
    WallDestroyed {
        /// Cell of the wall.
        at: Position,
    },
    /// A mine detonated under a tank.
    MineDetonated {
        /// Cell of the mine.
        at: Position,
    },
    /// A tank was destroyed.
    TankDestroyed {
        /// Identifier of the destroyed tank.
        tank: TankId,
        /// Owner of the destroyed tank.
        player: PlayerId,
        /// Cell where the tank died.
        at: Position,
    },
    /// A tank moved between two cells.
    TankMoved {
        /// Identifier of the tank.
        tank: TankId,
        /// Cell the tank vacated.
        from: Position,
        /// Cell the tank entered.
        to: Position,
    },
    /// A tank rotated to a new facing.
    TankRotated {
        /// Identifier of the tank.
        tank: TankId,
        /// Facing after the rotation.
        facing: Direction,
    },
    /// A tank armed the delayed backward move.
    BackwardArmed {
        /// Identifier of the tank.
        tank: TankId,
    },
    /// A tank canceled a pending backward move by requesting forward motion.
    BackwardCanceled {
        /// Identifier of the tank.
        tank: TankId,
    },
    /// A requested action was validated and recorded.
    ActionResolved {
        /// Tank whose request was resolved.
        tank: TankId,
        /// Action recorded for the round (the armed backward displacement
        /// overwrites the original request when it fires).
        action: Action,
        /// Whether the action was executed or ignored.
        outcome: ActionOutcome,
    },
}

/// Immutable representation of a single tank's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TankSnapshot {
    /// Unique identifier assigned to the tank.
    pub id: TankId,
    /// Player that owns the tank.
    pub player: PlayerId,
    /// Zero-based index of the tank within its player's fleet.
    pub index_in_player: u32,
    /// Cell currently occupied by the tank (or its corpse).
    pub position: Position,
    /// Current facing.
    pub facing: Direction,
    /// Whether the tank is still alive.
    pub alive: bool,
    /// Whether the tank died during the current round.
    pub killed_this_round: bool,
    /// Shells remaining in the magazine.
    pub shells_left: u16,
    /// Rounds until the tank may shoot again.
    pub shoot_cooldown: u8,
    /// Whether a delayed backward move is armed.
    pub waiting_for_backward: bool,
    /// Rounds until the armed backward move fires.
    pub backward_delay: u8,
    /// Action recorded for the most recent round, if any.
    pub last_action: Option<Action>,
    /// Whether the most recent action was executed rather than ignored.
    pub last_action_applied: bool,
}

/// Read-only snapshot describing every tank on the board.
#[derive(Clone, Debug, Default)]
pub struct TankView {
    snapshots: Vec<TankSnapshot>,
}

impl TankView {
    /// Creates a new tank view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TankSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic id order.
    pub fn iter(&self) -> impl Iterator<Item = &TankSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot for a specific tank.
    #[must_use]
    pub fn get(&self, tank: TankId) -> Option<&TankSnapshot> {
        self.snapshots
            .binary_search_by_key(&tank, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TankSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of one in-flight shell used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShellSnapshot {
    /// Cell the shell currently occupies.
    pub position: Position,
    /// Heading the shell travels along.
    pub facing: Direction,
    /// Player whose tank fired the shell.
    pub owner: PlayerId,
}

/// Symbol-grid rendering of the board from one tank's point of view.
///
/// The requesting tank's own cell carries [`symbols::SELF_MARKER`]; probes
/// outside the battlefield answer [`symbols::OUT_OF_BOUNDS`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SatelliteFrame {
    dims: GridDims,
    cells: Vec<char>,
}

impl SatelliteFrame {
    /// Creates a frame from a row-major symbol buffer.
    ///
    /// # Panics
    ///
    /// Panics if the buffer length does not match the grid dimensions; a
    /// mismatched frame is a programming error, not recoverable input.
    #[must_use]
    pub fn new(dims: GridDims, cells: Vec<char>) -> Self {
        assert_eq!(
            cells.len(),
            dims.cell_count(),
            "satellite frame buffer must cover the whole grid",
        );
        Self { dims, cells }
    }

    /// Dimensions of the rendered board.
    #[must_use]
    pub const fn dims(&self) -> GridDims {
        self.dims
    }

    /// Symbol visible at the probed position.
    #[must_use]
    pub fn symbol_at(&self, pos: Position) -> char {
        match self.dims.index_of(pos) {
            Some(index) => self.cells[index],
            None => symbols::OUT_OF_BOUNDS,
        }
    }
}

/// Object remembered inside a tank's private battlefield memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Remembered {
    /// A wall was observed here.
    Wall,
    /// A mine was observed here.
    Mine,
    /// A tank was observed here.
    Tank {
        /// Owner of the observed tank.
        player: PlayerId,
    },
    /// A shell was observed here.
    Shell {
        /// Inferred heading, when the inference of the satellite extraction
        /// found exactly one consistent offset.
        facing: Option<Direction>,
    },
}

/// A believed opponent location inside a tank's snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpponentSighting {
    /// Cell where the opponent was observed.
    pub position: Position,
    /// Believed heading, if any inference applies.
    pub facing: Option<Direction>,
}

/// A tank's private, possibly stale, partial view of the battle.
///
/// The snapshot is refreshed only when the owning tank spends a round on
/// [`Action::GetBattleInfo`]; between refreshes every field is stale by
/// construction. It is mutated by exactly two parties: the per-player
/// satellite extraction on refresh, and the owning decision engine's
/// believed-state bookkeeping.
#[derive(Clone, Debug)]
pub struct BattleInfo {
    player: PlayerId,
    tank_index: u32,
    position: Option<Position>,
    facing: Direction,
    shells_left: u16,
    shells_initialized: bool,
    shoot_cooldown: u8,
    waiting_for_backward: bool,
    backward_delay: u8,
    moved_backward_last: bool,
    dims: Option<GridDims>,
    opponents: Vec<OpponentSighting>,
    remembered: BTreeMap<Position, Remembered>,
    rounds_since_refresh: u32,
    refreshed_once: bool,
}

impl BattleInfo {
    /// Creates the initial snapshot for a freshly created tank.
    #[must_use]
    pub fn new(player: PlayerId, tank_index: u32) -> Self {
        Self {
            player,
            tank_index,
            position: None,
            facing: player.starting_facing(),
            shells_left: 0,
            shells_initialized: false,
            shoot_cooldown: 0,
            waiting_for_backward: false,
            backward_delay: 0,
            moved_backward_last: false,
            dims: None,
            opponents: Vec::new(),
            remembered: BTreeMap::new(),
            rounds_since_refresh: 0,
            refreshed_once: false,
        }
    }

    /// Player that owns the tank this snapshot belongs to.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        self.player
    }

    /// Zero-based index of the owning tank within its player's fleet.
    #[must_use]
    pub const fn tank_index(&self) -> u32 {
        self.tank_index
    }

    /// Believed own position, absent until the first refresh.
    #[must_use]
    pub const fn position(&self) -> Option<Position> {
        self.position
    }

    /// Fixes the believed own position.
    pub fn set_position(&mut self, pos: Position) {
        self.position = Some(pos);
    }

    /// Believed facing.
    #[must_use]
    pub const fn facing(&self) -> Direction {
        self.facing
    }

    /// Updates the believed facing.
    pub fn set_facing(&mut self, facing: Direction) {
        self.facing = facing;
    }

    /// Believed number of shells remaining.
    #[must_use]
    pub const fn shells_left(&self) -> u16 {
        self.shells_left
    }

    /// Whether the shell count was seeded by a refresh yet.
    #[must_use]
    pub const fn shells_initialized(&self) -> bool {
        self.shells_initialized
    }

    /// Seeds the believed shell count on the first refresh.
    pub fn initialize_shells(&mut self, count: u16) {
        self.shells_left = count;
        self.shells_initialized = true;
    }

    /// Records a believed shot: one shell spent, cooldown restarted.
    pub fn note_shot(&mut self) {
        self.shells_left = self.shells_left.saturating_sub(1);
        self.shoot_cooldown = SHOOT_COOLDOWN_ROUNDS;
    }

    /// Believed rounds until shooting becomes possible again.
    #[must_use]
    pub const fn shoot_cooldown(&self) -> u8 {
        self.shoot_cooldown
    }

    /// Whether the believed shoot cooldown is still running.
    #[must_use]
    pub const fn is_waiting_to_shoot(&self) -> bool {
        self.shoot_cooldown > 0
    }

    /// Whether a delayed backward move is believed armed.
    #[must_use]
    pub const fn waiting_for_backward(&self) -> bool {
        self.waiting_for_backward
    }

    /// Believed rounds until the armed backward move fires.
    #[must_use]
    pub const fn backward_delay(&self) -> u8 {
        self.backward_delay
    }

    /// Arms the believed backward countdown.
    pub fn arm_backward(&mut self) {
        self.waiting_for_backward = true;
        self.backward_delay = BACKWARD_DELAY_ROUNDS;
    }

    /// Clears the believed backward countdown.
    pub fn clear_backward(&mut self) {
        self.waiting_for_backward = false;
        self.backward_delay = 0;
    }

    /// Whether the previous believed-applied action was a backward move.
    #[must_use]
    pub const fn moved_backward_last(&self) -> bool {
        self.moved_backward_last
    }

    /// Records whether the latest believed-applied action was backward.
    pub fn set_moved_backward_last(&mut self, moved: bool) {
        self.moved_backward_last = moved;
    }

    /// Ticks the believed shoot cooldown down by one round.
    pub fn tick_shoot_cooldown(&mut self) {
        self.shoot_cooldown = self.shoot_cooldown.saturating_sub(1);
    }

    /// Ticks the believed backward countdown down by one round.
    pub fn tick_backward_delay(&mut self) {
        self.backward_delay = self.backward_delay.saturating_sub(1);
    }

    /// Believed map dimensions, absent until the first refresh.
    #[must_use]
    pub const fn dims(&self) -> Option<GridDims> {
        self.dims
    }

    /// Seeds the believed map dimensions.
    pub fn set_dims(&mut self, dims: GridDims) {
        self.dims = Some(dims);
    }

    /// Believed opponent sightings from the latest refresh.
    #[must_use]
    pub fn opponents(&self) -> &[OpponentSighting] {
        &self.opponents
    }

    /// Replaces the believed opponent sightings.
    pub fn set_opponents(&mut self, opponents: Vec<OpponentSighting>) {
        self.opponents = opponents;
    }

    /// The remembered-object store, keyed by position.
    #[must_use]
    pub const fn remembered(&self) -> &BTreeMap<Position, Remembered> {
        &self.remembered
    }

    /// Mutable access to the remembered-object store for the owning
    /// extraction routine and decision-engine bookkeeping.
    pub fn remembered_mut(&mut self) -> &mut BTreeMap<Position, Remembered> {
        &mut self.remembered
    }

    /// Object remembered at the probed position, if any.
    #[must_use]
    pub fn remembered_at(&self, pos: Position) -> Option<Remembered> {
        self.remembered.get(&pos).copied()
    }

    /// Rounds elapsed since the latest refresh.
    #[must_use]
    pub const fn rounds_since_refresh(&self) -> u32 {
        self.rounds_since_refresh
    }

    /// Whether any refresh happened yet.
    #[must_use]
    pub const fn refreshed_once(&self) -> bool {
        self.refreshed_once
    }

    /// Advances the staleness counter by one round.
    pub fn note_round(&mut self) {
        self.rounds_since_refresh = self.rounds_since_refresh.saturating_add(1);
    }

    /// Resets the staleness counter after a completed refresh.
    pub fn mark_refreshed(&mut self) {
        self.rounds_since_refresh = 0;
        self.refreshed_once = true;
    }
}

/// Rounds a tank waits between shots.
pub const SHOOT_COOLDOWN_ROUNDS: u8 = 4;
/// Rounds between arming a backward move and its automatic displacement.
pub const BACKWARD_DELAY_ROUNDS: u8 = 2;
/// Cells an in-flight shell travels per round.
pub const SHELL_CELLS_PER_ROUND: u32 = 2;

/// Static match parameters shared by the board and the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Battlefield dimensions.
    pub dims: GridDims,
    /// Maximum number of rounds before the match ends in a tie.
    pub max_rounds: u32,
    /// Shells loaded into every tank at creation.
    pub shells_per_tank: u16,
    /// Consecutive both-players-dry rounds that end the match in a tie.
    pub stalemate_rounds: u32,
}

/// One object placed on the initial board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitialObject {
    /// A two-hit wall.
    Wall,
    /// A mine.
    Mine,
    /// A tank owned by the named player.
    Tank {
        /// Owner of the tank.
        player: PlayerId,
    },
}

/// Fully parsed, well-formed board description handed to the core.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSetup {
    /// Match parameters.
    pub config: BoardConfig,
    /// Objects and the cells they start in, in reading order.
    pub objects: Vec<(Position, InitialObject)>,
}

/// Why a finished match ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    /// One player destroyed the other's entire fleet.
    Victory {
        /// The surviving player.
        winner: PlayerId,
    },
    /// The configured round limit was reached.
    MaxRounds,
    /// Both fleets were destroyed.
    MutualElimination,
    /// Both players ran dry for the configured number of rounds.
    AmmoExhaustion {
        /// Consecutive dry rounds that triggered the cutoff.
        dry_rounds: u32,
    },
}

/// Final outcome of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// The winning player, or `None` for a tie.
    pub winner: Option<PlayerId>,
    /// Player One tanks alive at the end.
    pub player_one_tanks: u32,
    /// Player Two tanks alive at the end.
    pub player_two_tanks: u32,
    /// Number of completed rounds.
    pub rounds: u32,
    /// Why the match ended.
    pub reason: GameOverReason,
    /// Round limit the match ran under, echoed into tie reporting.
    pub max_rounds: u32,
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            GameOverReason::Victory { winner } => {
                let survivors = match winner {
                    PlayerId::One => self.player_one_tanks,
                    PlayerId::Two => self.player_two_tanks,
                };
                write!(f, "Player {winner} won with {survivors} tanks still alive")
            }
            GameOverReason::MaxRounds => write!(
                f,
                "Tie, reached max steps = {}, player 1 has {} tanks, player 2 has {} tanks",
                self.max_rounds, self.player_one_tanks, self.player_two_tanks,
            ),
            GameOverReason::MutualElimination => {
                write!(f, "Tie, both players have zero tanks")
            }
            GameOverReason::AmmoExhaustion { dry_rounds } => write!(
                f,
                "Tie, both players have zero shells for {dry_rounds} steps",
            ),
        }
    }
}
