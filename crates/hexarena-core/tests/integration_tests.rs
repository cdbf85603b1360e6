//! Integration tests for the Hexarena engine.
//!
//! These drive complete games from setup through to victory using the
//! rule-based deciders for every seat.

use hexarena_core::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Run the full two-round setup phase.
fn run_setup(state: &mut GameState, rng: &mut StdRng) {
    let mut steps = 0;
    while state.is_setup() {
        state.setup_step(rng).expect("setup step");
        steps += 1;
        assert!(steps <= 8, "setup should finish within 8 steps");
    }
    assert_eq!(steps, 8);
}

/// Points must always mirror the structure lists.
fn assert_points_invariant(state: &GameState) {
    for player in &state.players {
        assert_eq!(
            player.points as usize,
            player.settlements.len() + player.cities.len(),
            "points out of sync for {}",
            player.name
        );
    }
}

#[test]
fn test_full_game_runs_to_a_winner() {
    let mut state = GameState::new_standard();
    let mut rng = StdRng::seed_from_u64(7);

    run_setup(&mut state, &mut rng);
    assert_points_invariant(&state);

    // The two remote seats have no heuristic rules and pass every turn, so
    // the rule-based seats race each other to the threshold.
    let mut turns = 0;
    while !state.is_finished() {
        turns += 1;
        assert!(turns < 50_000, "game should reach a winner");

        state.begin_turn(&mut rng).expect("begin turn");
        let current = state.current().clone();
        let decision = heuristic_decision(current.strategy, &current);
        state.apply_decision(&decision, &mut rng).expect("apply");

        assert_points_invariant(&state);
    }

    let winner = state.winner.expect("winner recorded");
    let champion = &state.players[winner];
    assert!(champion.points >= POINTS_TO_WIN);
    assert!(!champion.strategy.is_remote(), "passing seats cannot win");
}

#[test]
fn test_finished_game_is_frozen() {
    let mut state = GameState::new_standard();
    let mut rng = StdRng::seed_from_u64(11);

    run_setup(&mut state, &mut rng);
    while !state.is_finished() {
        state.begin_turn(&mut rng).expect("begin turn");
        let current = state.current().clone();
        let decision = heuristic_decision(current.strategy, &current);
        state.apply_decision(&decision, &mut rng).expect("apply");
    }

    let frozen = state.clone();
    assert_eq!(state.begin_turn(&mut rng), Err(GameError::GameOver));
    assert_eq!(state.setup_step(&mut rng), Err(GameError::GameOver));
    assert_eq!(state, frozen);
}

#[test]
fn test_setup_placements_respect_spacing() {
    let mut state = GameState::new_standard();
    let mut rng = StdRng::seed_from_u64(13);

    run_setup(&mut state, &mut rng);

    let occupied: Vec<u8> = state
        .players
        .iter()
        .flat_map(|p| p.settlements.iter().copied())
        .collect();
    for (i, a) in occupied.iter().enumerate() {
        for b in occupied.iter().skip(i + 1) {
            assert!(a.abs_diff(*b) >= 2, "spots {a} and {b} too close");
        }
    }
}
