#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Reactive and predictive tank decision making.
//!
//! Every tank owns one [`DecisionEngine`] driving its private [`BattleInfo`].
//! The engine never touches the live board: danger, alignment, and
//! interception are all computed against the remembered, possibly stale,
//! snapshot, which makes every prediction a best-effort heuristic rather
//! than a guarantee. Shared geometry and scoring helpers live as free
//! functions so both strategies draw from the same toolbox.

use tank_clash_core::{
    Action, BattleInfo, Direction, GridDims, OpponentSighting, PlayerId, Position,
    Remembered, SHELL_CELLS_PER_ROUND,
};

/// Rounds a snapshot may age before the engine spends a turn refreshing it.
const STALE_ROUNDS: u32 = 3;

/// The four rotation options evaluated by the escape scorer, in the fixed
/// order used for deterministic tie-breaking.
const ROTATIONS: [Action; 4] = [
    Action::RotateLeft45,
    Action::RotateLeft90,
    Action::RotateRight45,
    Action::RotateRight90,
];

/// Behavior selected for a tank at creation time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Reactive policy: refresh, dodge, shoot when aligned, close in.
    Baseline,
    /// Adds shell tracking, rotation scoring, and opponent interception.
    Predictive,
}

/// One tank's decision maker and the snapshot it reasons over.
#[derive(Debug)]
pub struct DecisionEngine {
    strategy: Strategy,
    info: BattleInfo,
}

impl DecisionEngine {
    /// Creates an engine for the named tank with the selected strategy.
    #[must_use]
    pub fn new(strategy: Strategy, player: PlayerId, tank_index: u32) -> Self {
        Self {
            strategy,
            info: BattleInfo::new(player, tank_index),
        }
    }

    /// Strategy the engine runs.
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Read access to the private snapshot.
    #[must_use]
    pub const fn battle_info(&self) -> &BattleInfo {
        &self.info
    }

    /// Mutable access for the per-player satellite refresh.
    pub fn battle_info_mut(&mut self) -> &mut BattleInfo {
        &mut self.info
    }

    /// Chooses the next action from the current snapshot.
    ///
    /// Bookkeeping only: the staleness counter advances, the predictive
    /// strategy coasts remembered shells along their known headings, and the
    /// believed own state mirrors whatever action was chosen.
    pub fn decide(&mut self) -> Action {
        self.info.note_round();
        if self.strategy == Strategy::Predictive {
            coast_remembered_shells(&mut self.info);
        }
        let action = match self.strategy {
            Strategy::Baseline => decide_baseline(&self.info),
            Strategy::Predictive => decide_predictive(&self.info),
        };
        note_own_action(&mut self.info, action);
        action
    }
}

fn decide_baseline(info: &BattleInfo) -> Action {
    let (Some(own), Some(dims)) = (info.position(), info.dims()) else {
        return Action::GetBattleInfo;
    };
    if !info.refreshed_once() || info.rounds_since_refresh() > STALE_ROUNDS {
        return Action::GetBattleInfo;
    }

    if will_be_hit_in(info, dims, own, 1) {
        if let Some(escape) = escape_move(info, dims, own) {
            return escape;
        }
        if !info.is_waiting_to_shoot() && info.shells_left() > 0 {
            return Action::Shoot;
        }
    }

    if let Some(opponent) = closest_opponent(info, dims, own) {
        if is_aligned(dims, own, opponent.position)
            && !info.is_waiting_to_shoot()
            && info.shells_left() > 0
        {
            return Action::Shoot;
        }
        if let Some(desired) = coarse_direction(dims, own, opponent.position) {
            if desired != info.facing() {
                return rotation_toward(info.facing(), desired);
            }
        }
    }

    if cell_is_free(info, dims.step(own, info.facing())) {
        return Action::MoveForward;
    }
    let rear = dims.step(own, info.facing().opposite());
    if cell_is_free(info, rear) && !will_be_hit_in(info, dims, rear, 1) {
        return Action::MoveBackward;
    }
    Action::RotateRight45
}

fn decide_predictive(info: &BattleInfo) -> Action {
    let (Some(own), Some(dims)) = (info.position(), info.dims()) else {
        return Action::GetBattleInfo;
    };
    if !info.refreshed_once() || info.rounds_since_refresh() > STALE_ROUNDS {
        return Action::GetBattleInfo;
    }

    // Follow through a fully armed reverse before anything else.
    if info.waiting_for_backward() && info.backward_delay() == 0 {
        return Action::MoveBackward;
    }

    let Some(opponent) = closest_opponent(info, dims, own) else {
        return Action::GetBattleInfo;
    };

    if will_be_hit_in(info, dims, own, 1) {
        if let Some(escape) = escape_move(info, dims, own) {
            return escape;
        }
        if !info.is_waiting_to_shoot() && info.shells_left() > 0 {
            return Action::Shoot;
        }
    }
    if will_be_hit_in(info, dims, own, 2) {
        return best_escape_rotation(info, dims, own);
    }

    if !info.is_waiting_to_shoot()
        && info.shells_left() > 0
        && aligns_with_predicted(dims, own, info.facing(), &opponent)
    {
        return Action::Shoot;
    }

    if let Some(desired) = coarse_direction(dims, own, opponent.position) {
        if desired != info.facing() {
            let rotate = rotation_toward(info.facing(), desired);
            let option = score_rotation(info, dims, own, rotate);
            let shoots_after = aligns_with_predicted(dims, own, desired, &opponent);
            if (option.can_move || shoots_after) && option.score > 0 {
                return rotate;
            }
        }
    }

    if own != opponent.position && cell_is_free(info, dims.step(own, info.facing())) {
        return Action::MoveForward;
    }

    best_escape_rotation(info, dims, own)
}

/// Mirrors the chosen action into the believed own state.
fn note_own_action(info: &mut BattleInfo, action: Action) {
    if info.waiting_for_backward() {
        if action == Action::MoveForward {
            info.clear_backward();
            info.set_moved_backward_last(false);
            info.tick_shoot_cooldown();
            return;
        }
        info.tick_backward_delay();
        if info.backward_delay() == 0 {
            info.clear_backward();
            believed_move(info, false);
            info.set_moved_backward_last(true);
        }
        info.tick_shoot_cooldown();
        return;
    }

    match action {
        Action::MoveForward => {
            believed_move(info, true);
            info.set_moved_backward_last(false);
        }
        Action::MoveBackward => {
            if info.moved_backward_last() {
                believed_move(info, false);
            } else {
                info.arm_backward();
                info.set_moved_backward_last(false);
            }
        }
        Action::Shoot => {
            info.note_shot();
            info.set_moved_backward_last(false);
            return;
        }
        Action::RotateLeft45
        | Action::RotateRight45
        | Action::RotateLeft90
        | Action::RotateRight90 => {
            if let Some(steps) = action.rotation_steps() {
                info.set_facing(info.facing().rotated(steps));
            }
            info.set_moved_backward_last(false);
        }
        Action::GetBattleInfo | Action::DoNothing => {}
    }
    info.tick_shoot_cooldown();
}

fn believed_move(info: &mut BattleInfo, forward: bool) {
    let (Some(pos), Some(dims)) = (info.position(), info.dims()) else {
        return;
    };
    let dir = if forward {
        info.facing()
    } else {
        info.facing().opposite()
    };
    let destination = dims.step(pos, dir);
    if !matches!(info.remembered_at(destination), Some(Remembered::Wall)) {
        info.set_position(destination);
    }
}

/// Advances every remembered shell with a known heading by one round of
/// travel, keeping the believed shell picture roughly in sync between
/// refreshes.
fn coast_remembered_shells(info: &mut BattleInfo) {
    let Some(dims) = info.dims() else {
        return;
    };
    let moving: Vec<(Position, Direction)> = info
        .remembered()
        .iter()
        .filter_map(|(&pos, object)| match object {
            Remembered::Shell { facing: Some(dir) } => Some((pos, *dir)),
            _ => None,
        })
        .collect();
    for (pos, _) in &moving {
        let _ = info.remembered_mut().remove(pos);
    }
    for (pos, dir) in moving {
        let destination = dims.offset_by(pos, dir, SHELL_CELLS_PER_ROUND);
        let _ = info
            .remembered_mut()
            .insert(destination, Remembered::Shell { facing: Some(dir) });
    }
}

/// Tests whether any remembered shell with a known heading reaches `target`
/// during round offset `t`.
///
/// Shells resolve collisions after each half-step, so both cells touched in
/// that round (offsets `2t-1` and `2t`) count as hits.
fn will_be_hit_in(info: &BattleInfo, dims: GridDims, target: Position, t: u32) -> bool {
    if t == 0 {
        return false;
    }
    info.remembered().iter().any(|(&pos, object)| {
        let Remembered::Shell { facing: Some(dir) } = object else {
            return false;
        };
        let reach = SHELL_CELLS_PER_ROUND * t;
        dims.offset_by(pos, *dir, reach - 1) == target
            || dims.offset_by(pos, *dir, reach) == target
    })
}

/// Picks a displacement out of a cell predicted to be hit, preferring
/// forward motion.
fn escape_move(info: &BattleInfo, dims: GridDims, own: Position) -> Option<Action> {
    let ahead = dims.step(own, info.facing());
    if cell_is_free(info, ahead) && !will_be_hit_in(info, dims, ahead, 1) {
        return Some(Action::MoveForward);
    }
    let rear = dims.step(own, info.facing().opposite());
    if cell_is_free(info, rear) && !will_be_hit_in(info, dims, rear, 1) {
        return Some(Action::MoveBackward);
    }
    None
}

/// Nearest believed opponent by toroidal Manhattan distance.
fn closest_opponent(
    info: &BattleInfo,
    dims: GridDims,
    own: Position,
) -> Option<OpponentSighting> {
    info.opponents()
        .iter()
        .copied()
        .min_by_key(|sighting| dims.toroidal_distance(own, sighting.position))
}

/// Whether two cells share a row or a column under minimal wrapped deltas.
fn is_aligned(dims: GridDims, own: Position, other: Position) -> bool {
    let (row_delta, col_delta) = dims.wrapped_delta(own, other);
    row_delta == 0 || col_delta == 0
}

/// Octant pointing from `from` toward `to`, or `None` for the same cell.
fn coarse_direction(dims: GridDims, from: Position, to: Position) -> Option<Direction> {
    let (row_delta, col_delta) = dims.wrapped_delta(from, to);
    let heading = match (row_delta.signum(), col_delta.signum()) {
        (0, 0) => return None,
        (-1, 0) => Direction::North,
        (-1, 1) => Direction::NorthEast,
        (0, 1) => Direction::East,
        (1, 1) => Direction::SouthEast,
        (1, 0) => Direction::South,
        (1, -1) => Direction::SouthWest,
        (0, -1) => Direction::West,
        _ => Direction::NorthWest,
    };
    Some(heading)
}

/// Heading from `from` to `to` when the cells are strictly aligned on a
/// row, column, or true diagonal; `None` otherwise.
fn strict_direction(dims: GridDims, from: Position, to: Position) -> Option<Direction> {
    let (row_delta, col_delta) = dims.wrapped_delta(from, to);
    if row_delta == 0 && col_delta == 0 {
        return None;
    }
    if row_delta != 0 && col_delta != 0 && row_delta.abs() != col_delta.abs() {
        return None;
    }
    coarse_direction(dims, from, to)
}

/// Single rotation step that closes the gap between two headings fastest.
fn rotation_toward(current: Direction, desired: Direction) -> Action {
    match current.steps_to(desired) {
        i8::MIN..=-2 => Action::RotateLeft90,
        -1 => Action::RotateLeft45,
        0 | 1 => Action::RotateRight45,
        _ => Action::RotateRight90,
    }
}

/// Whether nothing is remembered to occupy the cell.
fn cell_is_free(info: &BattleInfo, pos: Position) -> bool {
    info.remembered_at(pos).is_none()
}

#[derive(Clone, Copy, Debug)]
struct RotationOption {
    action: Action,
    score: i32,
    can_move: bool,
}

/// Scores one rotation by the safety and openness of the cell it would
/// point at: +2 when the cell is not hit next round, +1 when clear the
/// round after, and +2 plus an open-neighbor bonus when the post-rotation
/// forward move is actually possible.
fn score_rotation(
    info: &BattleInfo,
    dims: GridDims,
    own: Position,
    action: Action,
) -> RotationOption {
    let steps = action.rotation_steps().unwrap_or(0);
    let new_facing = info.facing().rotated(steps);
    let ahead = dims.step(own, new_facing);
    let can_move = cell_is_free(info, ahead);

    let mut score = 0;
    if !will_be_hit_in(info, dims, ahead, 1) {
        score += 2;
    }
    if !will_be_hit_in(info, dims, ahead, 2) {
        score += 1;
    }
    if can_move {
        score += 2 + open_neighbors(info, dims, ahead);
    }
    RotationOption {
        action,
        score,
        can_move,
    }
}

fn open_neighbors(info: &BattleInfo, dims: GridDims, pos: Position) -> i32 {
    Direction::ALL
        .iter()
        .filter(|&&dir| cell_is_free(info, dims.step(pos, dir)))
        .count() as i32
}

/// Highest-scoring escape rotation; ties prefer options that also permit
/// immediate forward movement, then the fixed evaluation order.
fn best_escape_rotation(info: &BattleInfo, dims: GridDims, own: Position) -> Action {
    let mut options: Vec<RotationOption> = ROTATIONS
        .iter()
        .map(|&action| score_rotation(info, dims, own, action))
        .collect();
    options.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.can_move.cmp(&a.can_move))
    });
    options[0].action
}

/// Whether firing along `facing` would intercept the opponent at its
/// current cell or at the next one or two cells of straight-ahead travel.
fn aligns_with_predicted(
    dims: GridDims,
    own: Position,
    facing: Direction,
    opponent: &OpponentSighting,
) -> bool {
    let mut predicted = vec![opponent.position];
    if let Some(dir) = opponent.facing {
        predicted.push(dims.offset_by(opponent.position, dir, 1));
        predicted.push(dims.offset_by(opponent.position, dir, 2));
    }
    predicted
        .into_iter()
        .any(|cell| strict_direction(dims, own, cell) == Some(facing))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_info(player: PlayerId, own: Position, dims: GridDims) -> BattleInfo {
        let mut info = BattleInfo::new(player, 0);
        info.set_position(own);
        info.set_dims(dims);
        info.initialize_shells(8);
        info.mark_refreshed();
        info
    }

    fn remember_shell(info: &mut BattleInfo, pos: Position, facing: Option<Direction>) {
        let _ = info
            .remembered_mut()
            .insert(pos, Remembered::Shell { facing });
    }

    #[test]
    fn shell_heading_for_own_cell_is_a_predicted_hit() {
        let dims = GridDims::new(5, 9);
        let own = Position::new(2, 4);
        let mut info = ready_info(PlayerId::One, own, dims);
        remember_shell(&mut info, Position::new(2, 6), Some(Direction::West));

        assert!(will_be_hit_in(&info, dims, own, 1));
        assert!(!will_be_hit_in(&info, dims, own, 2));
    }

    #[test]
    fn adjacent_shell_hits_on_the_half_step() {
        let dims = GridDims::new(5, 9);
        let own = Position::new(2, 4);
        let mut info = ready_info(PlayerId::One, own, dims);
        remember_shell(&mut info, Position::new(2, 5), Some(Direction::West));

        assert!(will_be_hit_in(&info, dims, own, 1));
    }

    #[test]
    fn unknown_heading_shells_are_not_predicted() {
        let dims = GridDims::new(5, 9);
        let own = Position::new(2, 4);
        let mut info = ready_info(PlayerId::One, own, dims);
        remember_shell(&mut info, Position::new(2, 6), None);

        assert!(!will_be_hit_in(&info, dims, own, 1));
    }

    #[test]
    fn alignment_respects_the_wrap_around() {
        let dims = GridDims::new(5, 5);
        assert!(is_aligned(dims, Position::new(0, 0), Position::new(0, 4)));
        assert!(is_aligned(dims, Position::new(4, 2), Position::new(0, 2)));
        assert!(!is_aligned(dims, Position::new(0, 0), Position::new(1, 2)));
    }

    #[test]
    fn coarse_direction_picks_the_short_way_around() {
        let dims = GridDims::new(5, 7);
        assert_eq!(
            coarse_direction(dims, Position::new(0, 0), Position::new(0, 6)),
            Some(Direction::West),
        );
        assert_eq!(
            coarse_direction(dims, Position::new(2, 2), Position::new(4, 4)),
            Some(Direction::SouthEast),
        );
    }

    #[test]
    fn strict_direction_requires_true_alignment() {
        let dims = GridDims::new(9, 9);
        assert_eq!(
            strict_direction(dims, Position::new(4, 4), Position::new(2, 2)),
            Some(Direction::NorthWest),
        );
        assert_eq!(
            strict_direction(dims, Position::new(4, 4), Position::new(2, 3)),
            None,
        );
    }

    #[test]
    fn rotation_toward_uses_the_shorter_arc() {
        assert_eq!(
            rotation_toward(Direction::North, Direction::NorthEast),
            Action::RotateRight45,
        );
        assert_eq!(
            rotation_toward(Direction::North, Direction::West),
            Action::RotateLeft90,
        );
        assert_eq!(
            rotation_toward(Direction::East, Direction::SouthEast),
            Action::RotateRight45,
        );
        assert_eq!(
            rotation_toward(Direction::East, Direction::West),
            Action::RotateRight90,
        );
    }

    #[test]
    fn scorer_prefers_the_survivable_rotation() {
        let dims = GridDims::new(7, 7);
        let own = Position::new(3, 3);
        let mut info = ready_info(PlayerId::One, own, dims);
        info.set_facing(Direction::North);
        // Rotating right toward the east lane walks into this shell.
        remember_shell(&mut info, Position::new(3, 6), Some(Direction::West));

        let best = best_escape_rotation(&info, dims, own);
        let east_score = score_rotation(&info, dims, own, Action::RotateRight90);
        let west_score = score_rotation(&info, dims, own, Action::RotateLeft90);
        assert!(west_score.score > east_score.score);
        assert_ne!(best, Action::RotateRight90);
    }

    #[test]
    fn interception_waits_for_a_predicted_crossing() {
        let dims = GridDims::new(9, 9);
        let own = Position::new(4, 1);
        // Three rows up and marching south: still out of reach this round
        // and the next two, so the engine holds fire.
        assert!(!aligns_with_predicted(
            dims,
            own,
            Direction::East,
            &OpponentSighting {
                position: Position::new(1, 4),
                facing: Some(Direction::South),
            },
        ));
        // One row up it crosses the firing lane within two moves.
        assert!(aligns_with_predicted(
            dims,
            own,
            Direction::East,
            &OpponentSighting {
                position: Position::new(3, 4),
                facing: Some(Direction::South),
            },
        ));
    }
}
