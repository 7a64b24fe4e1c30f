use tank_clash_core::{
    Action, BattleInfo, Direction, GridDims, OpponentSighting, PlayerId, Position,
    Remembered,
};
use tank_clash_system_decision::{DecisionEngine, Strategy};

fn seed_snapshot(info: &mut BattleInfo, own: Position, dims: GridDims) {
    info.set_position(own);
    info.set_dims(dims);
    info.initialize_shells(8);
    info.mark_refreshed();
}

fn seed_opponent(info: &mut BattleInfo, position: Position, facing: Option<Direction>) {
    info.set_opponents(vec![OpponentSighting { position, facing }]);
    let opponent = info.player().opponent();
    let _ = info.remembered_mut().insert(
        position,
        Remembered::Tank {
            player: opponent,
        },
    );
}

#[test]
fn uninitialized_engine_requests_battle_info() {
    let mut engine = DecisionEngine::new(Strategy::Baseline, PlayerId::One, 0);
    assert_eq!(engine.decide(), Action::GetBattleInfo);

    let mut predictive = DecisionEngine::new(Strategy::Predictive, PlayerId::Two, 0);
    assert_eq!(predictive.decide(), Action::GetBattleInfo);
}

#[test]
fn stale_snapshot_triggers_a_refresh() {
    let dims = GridDims::new(9, 9);
    let mut engine = DecisionEngine::new(Strategy::Baseline, PlayerId::One, 0);
    seed_snapshot(engine.battle_info_mut(), Position::new(4, 4), dims);
    seed_opponent(engine.battle_info_mut(), Position::new(4, 0), None);

    // Fresh snapshot: the engine acts on it for three rounds.
    for _ in 0..3 {
        assert_ne!(engine.decide(), Action::GetBattleInfo);
    }
    // The fourth round without a refresh crosses the staleness threshold.
    assert_eq!(engine.decide(), Action::GetBattleInfo);
}

#[test]
fn aligned_opponent_draws_fire() {
    let dims = GridDims::new(9, 9);
    let mut engine = DecisionEngine::new(Strategy::Baseline, PlayerId::One, 0);
    seed_snapshot(engine.battle_info_mut(), Position::new(4, 4), dims);
    seed_opponent(engine.battle_info_mut(), Position::new(4, 0), None);

    assert_eq!(engine.decide(), Action::Shoot);
    // The believed cooldown now gates the follow-up shot.
    assert!(engine.battle_info().is_waiting_to_shoot());
    assert_eq!(engine.battle_info().shells_left(), 7);
    assert_ne!(engine.decide(), Action::Shoot);
}

#[test]
fn unaligned_opponent_prompts_a_rotation() {
    let dims = GridDims::new(9, 9);
    let mut engine = DecisionEngine::new(Strategy::Baseline, PlayerId::One, 0);
    seed_snapshot(engine.battle_info_mut(), Position::new(4, 4), dims);
    // Opponent to the north-east of an initially west-facing tank.
    seed_opponent(engine.battle_info_mut(), Position::new(1, 6), None);

    let action = engine.decide();
    assert!(matches!(
        action,
        Action::RotateRight45 | Action::RotateRight90 | Action::RotateLeft45 | Action::RotateLeft90,
    ));
    // The believed facing tracked the rotation.
    assert_ne!(engine.battle_info().facing(), Direction::West);
}

#[test]
fn incoming_shell_forces_an_escape() {
    let dims = GridDims::new(9, 9);
    let mut engine = DecisionEngine::new(Strategy::Baseline, PlayerId::One, 0);
    seed_snapshot(engine.battle_info_mut(), Position::new(4, 4), dims);
    seed_opponent(engine.battle_info_mut(), Position::new(4, 0), None);
    let _ = engine.battle_info_mut().remembered_mut().insert(
        Position::new(4, 6),
        Remembered::Shell {
            facing: Some(Direction::West),
        },
    );

    // Facing west, the forward cell (4,3) is clear of the shell's track.
    assert_eq!(engine.decide(), Action::MoveForward);
    assert_eq!(engine.battle_info().position(), Some(Position::new(4, 3)));
}

#[test]
fn cornered_tank_shoots_back() {
    let dims = GridDims::new(3, 9);
    let mut engine = DecisionEngine::new(Strategy::Baseline, PlayerId::One, 0);
    seed_snapshot(engine.battle_info_mut(), Position::new(1, 4), dims);
    seed_opponent(engine.battle_info_mut(), Position::new(1, 0), None);
    // Walls ahead and behind, shell incoming along the row.
    let _ = engine
        .battle_info_mut()
        .remembered_mut()
        .insert(Position::new(1, 3), Remembered::Wall);
    let _ = engine
        .battle_info_mut()
        .remembered_mut()
        .insert(Position::new(1, 5), Remembered::Wall);
    let _ = engine.battle_info_mut().remembered_mut().insert(
        Position::new(1, 6),
        Remembered::Shell {
            facing: Some(Direction::West),
        },
    );

    assert_eq!(engine.decide(), Action::Shoot);
}

#[test]
fn predictive_engine_tracks_coasting_shells() {
    let dims = GridDims::new(9, 9);
    let mut engine = DecisionEngine::new(Strategy::Predictive, PlayerId::One, 0);
    seed_snapshot(engine.battle_info_mut(), Position::new(4, 4), dims);
    seed_opponent(engine.battle_info_mut(), Position::new(0, 0), None);
    // A known shell four cells out is no threat this round, but after one
    // round of coasting it closes to two cells and the engine reacts.
    let _ = engine.battle_info_mut().remembered_mut().insert(
        Position::new(4, 8),
        Remembered::Shell {
            facing: Some(Direction::West),
        },
    );

    let first = engine.decide();
    assert_ne!(first, Action::GetBattleInfo);
    assert!(matches!(
        engine.battle_info().remembered_at(Position::new(4, 6)),
        Some(Remembered::Shell { .. }),
    ));
}

#[test]
fn predictive_engine_holds_fire_until_interception() {
    let dims = GridDims::new(9, 9);
    let mut engine = DecisionEngine::new(Strategy::Predictive, PlayerId::Two, 0);
    seed_snapshot(engine.battle_info_mut(), Position::new(4, 1), dims);
    // Player Two faces east; the opponent crosses the lane from one row up.
    seed_opponent(
        engine.battle_info_mut(),
        Position::new(3, 4),
        Some(Direction::South),
    );

    assert_eq!(engine.decide(), Action::Shoot);
}

#[test]
fn predictive_engine_follows_through_an_armed_reverse() {
    let dims = GridDims::new(9, 9);
    let mut engine = DecisionEngine::new(Strategy::Predictive, PlayerId::One, 0);
    seed_snapshot(engine.battle_info_mut(), Position::new(4, 4), dims);
    seed_opponent(engine.battle_info_mut(), Position::new(0, 4), None);
    engine.battle_info_mut().arm_backward();
    engine.battle_info_mut().tick_backward_delay();
    engine.battle_info_mut().tick_backward_delay();

    assert_eq!(engine.decide(), Action::MoveBackward);
}

#[test]
fn engine_with_no_ammo_never_chooses_shoot() {
    let dims = GridDims::new(9, 9);
    let mut engine = DecisionEngine::new(Strategy::Baseline, PlayerId::One, 0);
    seed_snapshot(engine.battle_info_mut(), Position::new(4, 4), dims);
    engine.battle_info_mut().initialize_shells(0);
    seed_opponent(engine.battle_info_mut(), Position::new(4, 0), None);

    for _ in 0..6 {
        let action = engine.decide();
        assert_ne!(action, Action::Shoot);
        if action == Action::GetBattleInfo {
            engine.battle_info_mut().mark_refreshed();
        }
    }
}
