//! Deterministic random map generation.
//!
//! A fixed seed always yields the same map: cells are shuffled with a
//! ChaCha-seeded generator and the requested tanks, walls, and mines are
//! dealt from the front of the deck. Useful for quick matches and for
//! reproducing a battle from nothing but its seed.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use tank_clash_core::{
    BoardConfig, BoardSetup, GridDims, InitialObject, PlayerId, Position,
};

use crate::map_file::DEFAULT_STALEMATE_ROUNDS;

/// Parameters for one generated map.
#[derive(Clone, Copy, Debug)]
pub(crate) struct GenSpec {
    pub(crate) rows: u32,
    pub(crate) cols: u32,
    pub(crate) walls: usize,
    pub(crate) mines: usize,
    pub(crate) tanks_per_player: usize,
    pub(crate) max_steps: u32,
    pub(crate) num_shells: u16,
    pub(crate) seed: u64,
}

/// Deals objects onto a shuffled board.
///
/// Requested counts that exceed the number of cells are truncated rather
/// than rejected; a cramped map is still a playable map.
pub(crate) fn generate(spec: &GenSpec) -> BoardSetup {
    let dims = GridDims::new(spec.rows, spec.cols);
    let mut cells: Vec<Position> = (0..spec.rows)
        .flat_map(|row| (0..spec.cols).map(move |col| Position::new(row, col)))
        .collect();

    let mut rng = ChaCha8Rng::seed_from_u64(spec.seed);
    cells.shuffle(&mut rng);

    let mut deck = cells.into_iter();
    let mut objects: Vec<(Position, InitialObject)> = Vec::new();
    for player in [PlayerId::One, PlayerId::Two] {
        for _ in 0..spec.tanks_per_player {
            if let Some(pos) = deck.next() {
                objects.push((pos, InitialObject::Tank { player }));
            }
        }
    }
    for _ in 0..spec.walls {
        if let Some(pos) = deck.next() {
            objects.push((pos, InitialObject::Wall));
        }
    }
    for _ in 0..spec.mines {
        if let Some(pos) = deck.next() {
            objects.push((pos, InitialObject::Mine));
        }
    }
    // Board setups list objects in reading order, which also fixes tank
    // identifiers the same way a hand-written map would.
    objects.sort_by_key(|&(pos, _)| (pos.row(), pos.col()));

    BoardSetup {
        config: BoardConfig {
            dims,
            max_rounds: spec.max_steps,
            shells_per_tank: spec.num_shells,
            stalemate_rounds: DEFAULT_STALEMATE_ROUNDS,
        },
        objects,
    }
}
