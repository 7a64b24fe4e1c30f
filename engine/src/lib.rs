#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Round scheduling and match orchestration.
//!
//! [`MatchRunner`] drives one battle to completion: it advances shells,
//! polls every living tank's decision engine in canonical board-scan order,
//! hands the collected orders to the board, routes satellite refreshes, and
//! watches the game-over conditions. It also accumulates the two domain
//! outputs, the per-round action log and the board dumps, for the adapter
//! layer to write wherever it pleases.

use std::collections::HashMap;

use log::{debug, info};

use tank_clash_core::{
    Action, ActionOutcome, BoardConfig, BoardSetup, Command, Event, GameOverReason,
    MatchResult, PlayerId, TankId, TankOrder,
};
use tank_clash_system_decision::{DecisionEngine, Strategy};
use tank_clash_system_satellite::SatelliteExtractor;
use tank_clash_world::{self as world, query, Board};

/// Assigns one decision strategy per tank at creation time, keyed by the
/// owning player and the tank's index within that player's fleet.
#[derive(Clone, Copy, Debug)]
pub struct StrategyFactory {
    player_one: Strategy,
    player_two: Strategy,
}

impl StrategyFactory {
    /// A factory that hands every tank of a player the same strategy.
    #[must_use]
    pub const fn uniform(player_one: Strategy, player_two: Strategy) -> Self {
        Self {
            player_one,
            player_two,
        }
    }

    /// Creates the decision engine for one tank.
    #[must_use]
    pub fn create(&self, player: PlayerId, tank_index: u32) -> DecisionEngine {
        let strategy = match player {
            PlayerId::One => self.player_one,
            PlayerId::Two => self.player_two,
        };
        DecisionEngine::new(strategy, player, tank_index)
    }
}

#[derive(Debug)]
struct Unit {
    tank: TankId,
    player: PlayerId,
    engine: DecisionEngine,
}

#[derive(Debug)]
enum MatchState {
    Running,
    Over(MatchResult),
}

/// Drives one battle from setup to a final [`MatchResult`].
#[derive(Debug)]
pub struct MatchRunner {
    board: Board,
    config: BoardConfig,
    units: Vec<Unit>,
    extractors: [SatelliteExtractor; 2],
    alive: [u32; 2],
    ammo: [u32; 2],
    round: u32,
    dry_rounds: u32,
    state: MatchState,
    round_log: Vec<String>,
    board_dumps: Vec<String>,
}

impl MatchRunner {
    /// Builds the runner, wires a decision engine to every tank, and
    /// resolves boards that are decided before the first round.
    #[must_use]
    pub fn new(setup: &BoardSetup, factory: &StrategyFactory) -> Self {
        let board = Board::new(setup);
        let units: Vec<Unit> = query::tank_view(&board)
            .iter()
            .map(|snapshot| Unit {
                tank: snapshot.id,
                player: snapshot.player,
                engine: factory.create(snapshot.player, snapshot.index_in_player),
            })
            .collect();
        let dims = setup.config.dims;
        let shells = setup.config.shells_per_tank;

        let mut runner = Self {
            board,
            config: setup.config,
            units,
            extractors: [
                SatelliteExtractor::new(PlayerId::One, dims, shells),
                SatelliteExtractor::new(PlayerId::Two, dims, shells),
            ],
            alive: [0, 0],
            ammo: [0, 0],
            round: 0,
            dry_rounds: 0,
            state: MatchState::Running,
            round_log: Vec::new(),
            board_dumps: Vec::new(),
        };
        runner.update_counters();
        runner.push_board_dump();

        // A board that gives either player no tanks is decided before any
        // round runs.
        if runner.alive[0] == 0 || runner.alive[1] == 0 {
            let result = runner.build_result(if runner.alive == [0, 0] {
                GameOverReason::MutualElimination
            } else if runner.alive[1] == 0 {
                GameOverReason::Victory {
                    winner: PlayerId::One,
                }
            } else {
                GameOverReason::Victory {
                    winner: PlayerId::Two,
                }
            });
            runner.state = MatchState::Over(result);
        }
        runner
    }

    /// Runs rounds until the game-over state machine fires.
    pub fn run(&mut self) -> MatchResult {
        while matches!(self.state, MatchState::Running) {
            self.step_round();
        }
        let result = match &self.state {
            MatchState::Over(result) => *result,
            MatchState::Running => unreachable!("loop exits only once the match is over"),
        };
        info!("match over after {} rounds: {result}", self.round);
        result
    }

    /// Executes one round of the pipeline; a no-op once the match is over.
    pub fn step_round(&mut self) {
        if !matches!(self.state, MatchState::Running) {
            return;
        }

        let roster = query::tanks_in_scan_order(&self.board);
        let mut events = Vec::new();

        world::apply(&mut self.board, Command::AdvanceShells, &mut events);
        self.update_counters();

        if let Some(reason) = self.game_over_reason() {
            // Shell flight decided the match; no actions are collected.
            let result = self.build_result(reason);
            self.state = MatchState::Over(result);
            world::apply(&mut self.board, Command::PurgeDestroyed, &mut Vec::new());
            self.push_board_dump();
            return;
        }

        let mut orders = Vec::new();
        for &tank in &roster {
            let Some(unit) = self.units.iter_mut().find(|unit| unit.tank == tank) else {
                continue;
            };
            let still_alive = query::tank_view(&self.board)
                .get(tank)
                .map_or(false, |snapshot| snapshot.alive);
            if !still_alive {
                continue;
            }
            orders.push(TankOrder {
                tank,
                action: unit.engine.decide(),
            });
        }
        world::apply(
            &mut self.board,
            Command::ApplyOrders { orders },
            &mut events,
        );
        self.update_counters();
        self.route_refreshes(&events);

        let line = self.format_round_line(&roster, &events);
        debug!("round {}: {line}", self.round + 1);
        self.round_log.push(line);

        world::apply(&mut self.board, Command::PurgeDestroyed, &mut Vec::new());
        self.push_board_dump();
        self.round += 1;

        if self.ammo == [0, 0] {
            self.dry_rounds += 1;
        } else {
            self.dry_rounds = 0;
        }
        if let Some(reason) = self.game_over_reason() {
            let result = self.build_result(reason);
            self.state = MatchState::Over(result);
        }
    }

    /// Final result, available once the state machine left `Running`.
    #[must_use]
    pub fn result(&self) -> Option<MatchResult> {
        match &self.state {
            MatchState::Over(result) => Some(*result),
            MatchState::Running => None,
        }
    }

    /// One comma-joined action line per completed round.
    #[must_use]
    pub fn round_log(&self) -> &[String] {
        &self.round_log
    }

    /// Rendered board states: the initial board plus one per round.
    #[must_use]
    pub fn board_dumps(&self) -> &[String] {
        &self.board_dumps
    }

    /// Number of completed rounds.
    #[must_use]
    pub const fn rounds_played(&self) -> u32 {
        self.round
    }

    fn update_counters(&mut self) {
        let view = query::tank_view(&self.board);
        self.alive = [0, 0];
        self.ammo = [0, 0];
        for snapshot in view.iter() {
            if snapshot.alive {
                self.alive[snapshot.player.index()] += 1;
                self.ammo[snapshot.player.index()] += u32::from(snapshot.shells_left);
            }
        }
    }

    fn game_over_reason(&self) -> Option<GameOverReason> {
        match self.alive {
            [0, 0] => Some(GameOverReason::MutualElimination),
            [_, 0] => Some(GameOverReason::Victory {
                winner: PlayerId::One,
            }),
            [0, _] => Some(GameOverReason::Victory {
                winner: PlayerId::Two,
            }),
            _ => {
                if self.round >= self.config.max_rounds {
                    Some(GameOverReason::MaxRounds)
                } else if self.dry_rounds >= self.config.stalemate_rounds {
                    Some(GameOverReason::AmmoExhaustion {
                        dry_rounds: self.dry_rounds,
                    })
                } else {
                    None
                }
            }
        }
    }

    fn build_result(&self, reason: GameOverReason) -> MatchResult {
        MatchResult {
            winner: match reason {
                GameOverReason::Victory { winner } => Some(winner),
                _ => None,
            },
            player_one_tanks: self.alive[0],
            player_two_tanks: self.alive[1],
            rounds: self.round,
            reason,
            max_rounds: self.config.max_rounds,
        }
    }

    /// Re-renders a satellite frame for every tank whose applied action this
    /// round was a battle-info request, and refreshes its private snapshot
    /// through the owning player's extractor.
    fn route_refreshes(&mut self, events: &[Event]) {
        let requesters: Vec<TankId> = events
            .iter()
            .filter_map(|event| match event {
                Event::ActionResolved {
                    tank,
                    action: Action::GetBattleInfo,
                    outcome: ActionOutcome::Applied,
                } => Some(*tank),
                _ => None,
            })
            .collect();
        for tank in requesters {
            let Some(position) = query::tank_view(&self.board)
                .get(tank)
                .filter(|snapshot| snapshot.alive)
                .map(|snapshot| snapshot.position)
            else {
                continue;
            };
            let frame = query::satellite_frame(&self.board, position);
            let Some(unit) = self.units.iter_mut().find(|unit| unit.tank == tank) else {
                continue;
            };
            let extractor = self.extractors[unit.player.index()];
            extractor.refresh(&frame, unit.engine.battle_info_mut());
        }
    }

    fn format_round_line(&self, roster: &[TankId], events: &[Event]) -> String {
        let mut resolved: HashMap<TankId, (Action, ActionOutcome)> = HashMap::new();
        for event in events {
            if let Event::ActionResolved {
                tank,
                action,
                outcome,
            } = event
            {
                let _ = resolved.insert(*tank, (*action, *outcome));
            }
        }

        let view = query::tank_view(&self.board);
        let entries: Vec<String> = roster
            .iter()
            .map(|tank| {
                let killed = view
                    .get(*tank)
                    .map_or(true, |snapshot| snapshot.killed_this_round);
                match resolved.get(tank) {
                    Some((action, outcome)) => {
                        let mut entry = action.label().to_string();
                        if *outcome == ActionOutcome::Ignored {
                            entry.push_str(" (ignored)");
                        }
                        if killed {
                            entry.push_str(" (killed)");
                        }
                        entry
                    }
                    None => "killed".to_string(),
                }
            })
            .collect();
        entries.join(", ")
    }

    fn push_board_dump(&mut self) {
        self.board_dumps
            .push(query::board_lines(&self.board).join("\n"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tank_clash_core::{GridDims, InitialObject, Position};

    fn base_setup(objects: Vec<(Position, InitialObject)>) -> BoardSetup {
        BoardSetup {
            config: BoardConfig {
                dims: GridDims::new(5, 5),
                max_rounds: 50,
                shells_per_tank: 4,
                stalemate_rounds: 40,
            },
            objects,
        }
    }

    fn both_baseline() -> StrategyFactory {
        StrategyFactory::uniform(Strategy::Baseline, Strategy::Baseline)
    }

    #[test]
    fn lone_player_wins_before_the_first_round() {
        let setup = base_setup(vec![(
            Position::new(2, 2),
            InitialObject::Tank {
                player: PlayerId::One,
            },
        )]);
        let mut runner = MatchRunner::new(&setup, &both_baseline());
        let result = runner.run();

        assert_eq!(result.winner, Some(PlayerId::One));
        assert_eq!(result.rounds, 0);
        assert_eq!(result.to_string(), "Player 1 won with 1 tanks still alive");
        assert!(runner.round_log().is_empty());
    }

    #[test]
    fn empty_board_is_an_immediate_tie() {
        let setup = base_setup(Vec::new());
        let mut runner = MatchRunner::new(&setup, &both_baseline());
        let result = runner.run();

        assert_eq!(result.winner, None);
        assert_eq!(result.reason, GameOverReason::MutualElimination);
    }
}
