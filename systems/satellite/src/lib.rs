#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Partial-information extraction from satellite frames.
//!
//! A tank that spends a round on [`Action::GetBattleInfo`] receives a fresh
//! symbol rendering of the board. This system converts that rendering into
//! the tank's private [`BattleInfo`]: blank cells evict remembered objects,
//! visible symbols create or refresh them, and opposing tank digits feed the
//! opponent list. Memory is exactly the last observation, never a union of
//! history.
//!
//! [`Action::GetBattleInfo`]: tank_clash_core::Action::GetBattleInfo

use tank_clash_core::{
    symbols, BattleInfo, Direction, GridDims, OpponentSighting, PlayerId, Position,
    Remembered, SatelliteFrame, SHELL_CELLS_PER_ROUND,
};

/// Per-player service that refreshes a tank's snapshot from a frame.
#[derive(Clone, Copy, Debug)]
pub struct SatelliteExtractor {
    player: PlayerId,
    dims: GridDims,
    shells_per_tank: u16,
}

impl SatelliteExtractor {
    /// Creates the extractor for one player's fleet.
    #[must_use]
    pub const fn new(player: PlayerId, dims: GridDims, shells_per_tank: u16) -> Self {
        Self {
            player,
            dims,
            shells_per_tank,
        }
    }

    /// Player this extractor serves.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        self.player
    }

    /// Rebuilds the snapshot's believed world from the provided frame.
    pub fn refresh(&self, frame: &SatelliteFrame, info: &mut BattleInfo) {
        let elapsed = info.rounds_since_refresh();
        let previous_shells: Vec<Position> = info
            .remembered()
            .iter()
            .filter_map(|(&pos, object)| match object {
                Remembered::Shell { .. } => Some(pos),
                _ => None,
            })
            .collect();

        if !info.shells_initialized() {
            info.initialize_shells(self.shells_per_tank);
        }
        if info.dims().is_none() {
            info.set_dims(self.dims);
        }

        let mut opponents = Vec::new();
        for row in 0..self.dims.rows() {
            for col in 0..self.dims.cols() {
                let pos = Position::new(row, col);
                self.observe(frame.symbol_at(pos), pos, info, &mut opponents);
            }
        }
        info.set_opponents(opponents);

        if elapsed > 0 {
            infer_shell_directions(self.dims, &previous_shells, elapsed, info);
        }
        info.mark_refreshed();
    }

    fn observe(
        &self,
        symbol: char,
        pos: Position,
        info: &mut BattleInfo,
        opponents: &mut Vec<OpponentSighting>,
    ) {
        match symbol {
            symbols::SELF_MARKER => {
                info.set_position(pos);
                let _ = info.remembered_mut().remove(&pos);
            }
            symbols::WALL => {
                let _ = info.remembered_mut().insert(pos, Remembered::Wall);
            }
            symbols::MINE => {
                let _ = info.remembered_mut().insert(pos, Remembered::Mine);
            }
            symbols::SHELL => {
                let _ = info
                    .remembered_mut()
                    .insert(pos, Remembered::Shell { facing: None });
            }
            other => {
                if let Some(player) = PlayerId::from_symbol(other) {
                    let _ = info.remembered_mut().insert(pos, Remembered::Tank { player });
                    if player != self.player {
                        opponents.push(OpponentSighting {
                            position: pos,
                            facing: None,
                        });
                    }
                } else {
                    // Blank or unrecognized: whatever was remembered is gone.
                    let _ = info.remembered_mut().remove(&pos);
                }
            }
        }
    }
}

/// Assigns headings to freshly observed shells by projecting every shell
/// remembered before the refresh along all eight compass offsets.
///
/// Shells travel a fixed two cells per round, so a shell remembered at `p`
/// can only appear at `p + dir * 2 * elapsed` now. When exactly one offset
/// lands on a cell that currently shows a shell, that shell inherits the
/// projected heading; zero or several consistent offsets leave it unknown.
fn infer_shell_directions(
    dims: GridDims,
    previous_shells: &[Position],
    elapsed: u32,
    info: &mut BattleInfo,
) {
    let travelled = SHELL_CELLS_PER_ROUND * elapsed;
    for &old_pos in previous_shells {
        let mut candidate: Option<(Position, Direction)> = None;
        let mut ambiguous = false;
        for dir in Direction::ALL {
            let projected = dims.offset_by(old_pos, dir, travelled);
            if matches!(info.remembered_at(projected), Some(Remembered::Shell { .. })) {
                if candidate.is_some() {
                    ambiguous = true;
                    break;
                }
                candidate = Some((projected, dir));
            }
        }
        if ambiguous {
            continue;
        }
        if let Some((projected, dir)) = candidate {
            if let Some(Remembered::Shell { facing }) =
                info.remembered_mut().get_mut(&projected)
            {
                if facing.is_none() {
                    *facing = Some(dir);
                }
            }
        }
    }
}
