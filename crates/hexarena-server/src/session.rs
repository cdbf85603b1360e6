//! Arena session: one shared game driven step by step.
//!
//! The session owns the game state, the chronological log, the cumulative
//! win tally, and the thinking/playing flags. A step is refused while a
//! decision is outstanding or after a winner is recorded. Main-phase steps
//! are split in two so no lock needs to be held across the remote call:
//! [`Arena::start_turn`] rolls and hands back a [`PendingDecision`], the
//! caller resolves it without the session, and [`Arena::finish_turn`]
//! applies the result, unless a reset bumped the epoch in between, in
//! which case the stale decision is dropped on the floor.

use hexarena_core::{Decision, DecisionProvider, GameEvent, GameState, Outcome, Player, Strategy};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// First line of every fresh game log
const START_LINE: &str = "Game started! Setup phase begins.";

/// The shared arena session.
pub struct Arena {
    state: GameState,
    roster: Vec<Strategy>,
    providers: Vec<Arc<dyn DecisionProvider>>,
    log: Vec<String>,
    tally: HashMap<Strategy, u32>,
    thinking: bool,
    playing: bool,
    /// Bumped on every reset; decisions stamped with an older epoch are
    /// discarded instead of touching the new game
    epoch: u64,
    rng: StdRng,
}

/// A decision request in flight for one seat. Resolving it runs the
/// provider with no session lock held.
pub struct PendingDecision {
    pub seat: usize,
    epoch: u64,
    provider: Arc<dyn DecisionProvider>,
    player: Player,
    state: GameState,
}

impl PendingDecision {
    /// Ask the provider for its decision.
    pub async fn resolve(self) -> ResolvedDecision {
        let decision = self.provider.decide(&self.player, &self.state).await;
        ResolvedDecision {
            seat: self.seat,
            epoch: self.epoch,
            decision,
        }
    }
}

/// A provider's answer, stamped with the epoch it was requested under.
pub struct ResolvedDecision {
    pub seat: usize,
    epoch: u64,
    pub decision: Decision,
}

impl Arena {
    /// New session with one provider per seat.
    pub fn new(roster: Vec<Strategy>, providers: Vec<Arc<dyn DecisionProvider>>) -> Self {
        Self::with_rng(roster, providers, StdRng::from_entropy())
    }

    /// New session with a seeded RNG, for deterministic tests.
    pub fn with_seed(
        roster: Vec<Strategy>,
        providers: Vec<Arc<dyn DecisionProvider>>,
        seed: u64,
    ) -> Self {
        Self::with_rng(roster, providers, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        roster: Vec<Strategy>,
        providers: Vec<Arc<dyn DecisionProvider>>,
        rng: StdRng,
    ) -> Self {
        assert_eq!(roster.len(), providers.len(), "one provider per seat");
        Self {
            state: GameState::new(&roster),
            roster,
            providers,
            log: vec![START_LINE.to_string()],
            tally: HashMap::new(),
            thinking: false,
            playing: false,
            epoch: 0,
            rng,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Read-only snapshot for the presentation layer.
    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(&self.state).unwrap_or(serde_json::Value::Null)
    }

    /// Full chronological game log.
    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// Cumulative wins per strategy, across resets.
    pub fn tally(&self) -> &HashMap<Strategy, u32> {
        &self.tally
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_thinking(&self) -> bool {
        self.thinking
    }

    /// True when a step invocation would be a no-op: a decision is
    /// outstanding or the game already has a winner.
    pub fn is_blocked(&self) -> bool {
        self.thinking || self.state.is_finished()
    }

    /// Toggle continuous play; returns the new value.
    pub fn toggle_play(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    /// Replace the game wholesale. The win tally survives; an outstanding
    /// decision is orphaned by the epoch bump and can never touch the new
    /// game.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.thinking = false;
        self.state = GameState::new(&self.roster);
        self.log.clear();
        self.log.push(START_LINE.to_string());
    }

    fn record_events(&mut self, events: &[GameEvent]) -> Vec<String> {
        let lines: Vec<String> = events.iter().map(|e| e.to_string()).collect();
        self.log.extend(lines.iter().cloned());
        lines
    }

    /// One setup placement. Returns the new log lines; empty when refused.
    pub fn step_setup(&mut self) -> Vec<String> {
        if self.is_blocked() {
            return Vec::new();
        }
        match self.state.setup_step(&mut self.rng) {
            Ok(events) => self.record_events(&events),
            Err(e) => {
                debug!("setup step refused: {e}");
                Vec::new()
            }
        }
    }

    /// Open a main-phase turn: roll dice, run production, and hand back the
    /// decision request for the current seat. Marks the session as thinking
    /// until [`Arena::finish_turn`] (or a reset) clears it.
    pub fn start_turn(&mut self) -> Option<(PendingDecision, Vec<String>)> {
        if self.is_blocked() || self.state.is_setup() {
            return None;
        }

        let events = match self.state.begin_turn(&mut self.rng) {
            Ok(events) => events,
            Err(e) => {
                debug!("turn refused: {e}");
                return None;
            }
        };
        let lines = self.record_events(&events);

        let seat = self.state.current_player;
        self.thinking = true;
        let pending = PendingDecision {
            seat,
            epoch: self.epoch,
            provider: Arc::clone(&self.providers[seat]),
            player: self.state.players[seat].clone(),
            state: self.state.clone(),
        };
        Some((pending, lines))
    }

    /// Apply a resolved decision. Returns the new log lines; a decision from
    /// before the last reset is dropped without touching the session.
    pub fn finish_turn(&mut self, resolved: ResolvedDecision) -> Vec<String> {
        if resolved.epoch != self.epoch {
            debug!(seat = resolved.seat, "dropping stale decision from before reset");
            return Vec::new();
        }
        self.thinking = false;

        let (outcome, events) = match self.state.apply_decision(&resolved.decision, &mut self.rng)
        {
            Ok(result) => result,
            Err(e) => {
                debug!("decision refused: {e}");
                return Vec::new();
            }
        };

        match outcome {
            Outcome::SkippedNoSpot(action) => {
                debug!(seat = resolved.seat, ?action, "no spot available, action dropped");
            }
            Outcome::SkippedUnaffordable(action) => {
                debug!(seat = resolved.seat, ?action, "unaffordable at apply time, action dropped");
            }
            Outcome::Applied(_) | Outcome::Passed => {}
        }

        let lines = self.record_events(&events);

        if let Some(winner) = self.state.winner {
            let strategy = self.state.players[winner].strategy;
            *self.tally.entry(strategy).or_insert(0) += 1;
            // Autoplay stops on a win; the next game needs an explicit reset.
            self.playing = false;
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexarena_core::HeuristicProvider;

    fn heuristic_arena(seed: u64) -> Arena {
        let roster = Strategy::ALL.to_vec();
        let providers = roster
            .iter()
            .map(|&s| Arc::new(HeuristicProvider::new(s)) as Arc<dyn DecisionProvider>)
            .collect();
        Arena::with_seed(roster, providers, seed)
    }

    async fn run_to_winner(arena: &mut Arena) {
        let mut steps = 0;
        while !arena.state().is_finished() {
            steps += 1;
            assert!(steps < 100_000, "session should reach a winner");

            if arena.state().is_setup() {
                arena.step_setup();
            } else {
                let (pending, _) = arena.start_turn().expect("turn starts");
                let resolved = pending.resolve().await;
                arena.finish_turn(resolved);
            }
        }
    }

    #[tokio::test]
    async fn test_full_session_reaches_winner_and_counts_it() {
        let mut arena = heuristic_arena(5);
        run_to_winner(&mut arena).await;

        let winner_seat = arena.state().winner.unwrap();
        let winner_strategy = arena.state().players[winner_seat].strategy;
        assert_eq!(arena.tally().get(&winner_strategy), Some(&1));
        assert_eq!(arena.tally().values().sum::<u32>(), 1);
        assert!(arena
            .log()
            .iter()
            .any(|line| line.contains("wins with")));
    }

    #[tokio::test]
    async fn test_step_refused_while_thinking() {
        let mut arena = heuristic_arena(6);
        while arena.state().is_setup() {
            arena.step_setup();
        }

        let (pending, _) = arena.start_turn().unwrap();
        assert!(arena.is_thinking());

        // Both step entry points are no-ops while the decision is out.
        let before = arena.state().clone();
        assert!(arena.step_setup().is_empty());
        assert!(arena.start_turn().is_none());
        assert_eq!(*arena.state(), before);

        let resolved = pending.resolve().await;
        arena.finish_turn(resolved);
        assert!(!arena.is_thinking());
    }

    #[tokio::test]
    async fn test_reset_orphans_outstanding_decision() {
        let mut arena = heuristic_arena(7);
        while arena.state().is_setup() {
            arena.step_setup();
        }

        let (pending, _) = arena.start_turn().unwrap();
        arena.reset();
        assert!(!arena.is_thinking());

        let fresh = arena.state().clone();
        let fresh_log = arena.log().to_vec();

        // The stale reply arrives after the reset and must change nothing.
        let resolved = pending.resolve().await;
        assert!(arena.finish_turn(resolved).is_empty());
        assert_eq!(*arena.state(), fresh);
        assert_eq!(arena.log(), fresh_log);
    }

    #[tokio::test]
    async fn test_tally_survives_reset() {
        let mut arena = heuristic_arena(8);
        run_to_winner(&mut arena).await;
        assert_eq!(arena.tally().values().sum::<u32>(), 1);

        arena.reset();
        assert_eq!(arena.tally().values().sum::<u32>(), 1);
        assert!(!arena.state().is_finished());
        assert_eq!(arena.log().len(), 1);
    }

    #[tokio::test]
    async fn test_finished_game_blocks_steps() {
        let mut arena = heuristic_arena(9);
        run_to_winner(&mut arena).await;

        assert!(arena.is_blocked());
        let before = arena.state().clone();
        assert!(arena.step_setup().is_empty());
        assert!(arena.start_turn().is_none());
        assert_eq!(*arena.state(), before);
    }

    #[tokio::test]
    async fn test_winning_stops_autoplay() {
        let mut arena = heuristic_arena(10);
        arena.toggle_play();
        assert!(arena.is_playing());

        run_to_winner(&mut arena).await;
        assert!(!arena.is_playing());
    }
}
