//! Turn engine: the arena's game-state machine.
//!
//! One presentation step is either a setup placement
//! ([`GameState::setup_step`]) or a full main-phase turn:
//! [`GameState::begin_turn`] rolls and produces, then
//! [`GameState::apply_decision`] lands whatever the seat's provider decided.
//! The engine owns the state mutably; callers hand in the RNG and receive
//! events whose `Display` impls are the human-readable log lines. Operations
//! on a finished game return an error before touching anything, so a refused
//! step leaves the state bit-for-bit unchanged.

use crate::board::Resource;
use crate::decision::{BuildAction, Decision};
use crate::player::{Player, Strategy};
use crate::rules;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Victory points needed to win
pub const POINTS_TO_WIN: u32 = 10;

/// Number of seats at the table
pub const SEATS: usize = 4;

/// Setup placements drawn from at most this many of the lowest candidates
const SETUP_PICK_WINDOW: usize = 5;

/// Chance that a structure produces on a non-seven roll
const PRODUCTION_CHANCE: f64 = 0.3;

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Initial placement stage
    Setup {
        /// Which round of setup (1 or 2)
        round: u8,
    },
    /// Dice-driven play until a player reaches the point threshold
    Main,
}

/// Errors from engine operations. The engine never mutates state before
/// returning an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("game is over")]
    GameOver,

    #[error("operation not valid in this phase")]
    WrongPhase,
}

/// What applying a decision actually did. Skipped variants are invisible in
/// the game log but let callers and tests tell "chose to pass" apart from
/// "tried and failed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The action landed and its cost was paid
    Applied(BuildAction),
    /// No candidate spot (or no settlement left to upgrade); dropped
    SkippedNoSpot(BuildAction),
    /// Cost recheck failed at apply time; dropped
    SkippedUnaffordable(BuildAction),
    /// The player chose to pass
    Passed,
}

/// Events produced by engine operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A setup settlement was placed
    SettlementPlaced { player: String, spot: u8 },

    /// Both setup rounds are done; main play begins
    SetupComplete,

    /// Dice were rolled to open a turn
    DiceRolled {
        player: String,
        dice: (u8, u8),
        total: u8,
    },

    /// A settlement was built from a decision
    SettlementBuilt {
        player: String,
        spot: u8,
        reasoning: String,
    },

    /// A settlement was upgraded to a city
    CityBuilt {
        player: String,
        spot: u8,
        reasoning: String,
    },

    /// A road was built
    RoadBuilt {
        player: String,
        spot: u8,
        reasoning: String,
    },

    /// The player passed
    TurnPassed { player: String, reasoning: String },

    /// A player reached the point threshold
    GameWon { player: String, points: u32 },
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEvent::SettlementPlaced { player, spot } => {
                write!(f, "{player} placed a settlement at spot {spot}")
            }
            GameEvent::SetupComplete => write!(f, "Setup complete! Main game begins."),
            GameEvent::DiceRolled {
                player,
                dice,
                total,
            } => write!(f, "{player} rolled {total} ({}+{})", dice.0, dice.1),
            GameEvent::SettlementBuilt {
                player,
                spot,
                reasoning,
            } => write!(f, "{player} built a settlement at spot {spot}! {reasoning}"),
            GameEvent::CityBuilt {
                player,
                spot,
                reasoning,
            } => write!(f, "{player} upgraded to a city at spot {spot}! {reasoning}"),
            GameEvent::RoadBuilt {
                player, reasoning, ..
            } => write!(f, "{player} built a road. {reasoning}"),
            GameEvent::TurnPassed { player, reasoning } => {
                write!(f, "{player} passed. {reasoning}")
            }
            GameEvent::GameWon { player, points } => {
                write!(f, "{player} wins with {points} points!")
            }
        }
    }
}

/// The complete game state. Serialized as-is for the presentation snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// All players; index is seat and turn order
    pub players: Vec<Player>,
    /// Seat whose turn it is
    pub current_player: usize,
    /// Main-phase round counter (starts at 1, bumps when the seat wraps)
    pub turn: u32,
    /// Current game phase
    pub phase: GamePhase,
    /// Last dice roll; `None` until the first main-phase turn
    pub dice: Option<(u8, u8)>,
    /// Winning seat, set once a player reaches the threshold
    pub winner: Option<usize>,
}

impl GameState {
    /// Fresh game for the given seating order
    pub fn new(roster: &[Strategy]) -> Self {
        assert_eq!(roster.len(), SEATS, "the arena seats exactly {SEATS}");

        let players = roster
            .iter()
            .enumerate()
            .map(|(id, &strategy)| Player::new(id, strategy))
            .collect();

        Self {
            players,
            current_player: 0,
            turn: 1,
            phase: GamePhase::Setup { round: 1 },
            dice: None,
            winner: None,
        }
    }

    /// Fresh game with the default roster
    pub fn new_standard() -> Self {
        Self::new(&Strategy::ALL)
    }

    /// The player whose turn it is
    pub fn current(&self) -> &Player {
        &self.players[self.current_player]
    }

    pub fn is_setup(&self) -> bool {
        matches!(self.phase, GamePhase::Setup { .. })
    }

    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    fn guard_active(&self) -> Result<(), GameError> {
        if self.winner.is_some() {
            return Err(GameError::GameOver);
        }
        Ok(())
    }

    /// One setup placement for the current player, then seat advance.
    ///
    /// The settlement spot is drawn uniformly from the first
    /// min(5, N) candidates, biasing toward low-numbered spots without
    /// being deterministic. In round 2 the player also receives one random
    /// resource. If no settlement spot is open, the whole placement block is
    /// skipped and only the seat advances.
    pub fn setup_step<R: Rng>(&mut self, rng: &mut R) -> Result<Vec<GameEvent>, GameError> {
        self.guard_active()?;
        let GamePhase::Setup { round } = self.phase else {
            return Err(GameError::WrongPhase);
        };

        let mut events = Vec::new();
        let spots = rules::valid_settlement_spots(self);
        if !spots.is_empty() {
            let spot = spots[rng.gen_range(0..spots.len().min(SETUP_PICK_WINDOW))];
            {
                let player = &mut self.players[self.current_player];
                player.settlements.push(spot);
                player.points += 1;
            }

            // Road candidates are computed after the settlement lands: the
            // new structure already thins the candidate set.
            let road = rules::valid_road_spots(self.current(), self, rng)
                .first()
                .copied();

            let player = &mut self.players[self.current_player];
            if let Some(road_spot) = road {
                player.roads.push(road_spot);
            }
            if round == 2 {
                let granted = Resource::random(rng);
                player.resources.add(granted, 1);
            }
            events.push(GameEvent::SettlementPlaced {
                player: player.name.clone(),
                spot,
            });
        }

        self.current_player = (self.current_player + 1) % SEATS;
        if self.current_player == 0 {
            if round >= 2 {
                self.phase = GamePhase::Main;
                events.push(GameEvent::SetupComplete);
            } else {
                self.phase = GamePhase::Setup { round: round + 1 };
            }
        }

        Ok(events)
    }

    /// Roll dice and run production to open the current player's turn.
    ///
    /// On any total except 7, every settlement independently yields 1 unit
    /// of a random resource with probability 0.3 and every city 2 units with
    /// probability 0.3. A 7 produces nothing in this reduced ruleset.
    pub fn begin_turn<R: Rng>(&mut self, rng: &mut R) -> Result<Vec<GameEvent>, GameError> {
        self.guard_active()?;
        if self.phase != GamePhase::Main {
            return Err(GameError::WrongPhase);
        }

        let dice = rules::roll_dice(rng);
        let total = dice.0 + dice.1;
        self.dice = Some(dice);

        let events = vec![GameEvent::DiceRolled {
            player: self.current().name.clone(),
            dice,
            total,
        }];

        if total != 7 {
            for player in &mut self.players {
                for _ in 0..player.settlements.len() {
                    if rng.gen_bool(PRODUCTION_CHANCE) {
                        let produced = Resource::random(rng);
                        player.resources.add(produced, 1);
                    }
                }
                for _ in 0..player.cities.len() {
                    if rng.gen_bool(PRODUCTION_CHANCE) {
                        let produced = Resource::random(rng);
                        player.resources.add(produced, 2);
                    }
                }
            }
        }

        Ok(events)
    }

    /// Apply the current player's decision, check for a win, advance the
    /// seat.
    ///
    /// Affordability is rechecked here: the decision was made against a
    /// snapshot, and the recheck keeps a stale decision from spending
    /// resources the player no longer holds. Build actions without a
    /// candidate spot are dropped without a log line.
    pub fn apply_decision<R: Rng>(
        &mut self,
        decision: &Decision,
        rng: &mut R,
    ) -> Result<(Outcome, Vec<GameEvent>), GameError> {
        self.guard_active()?;
        if self.phase != GamePhase::Main {
            return Err(GameError::WrongPhase);
        }

        let mut events = Vec::new();
        let outcome = match decision.action {
            BuildAction::Settlement => {
                if !self.current().resources.can_afford(&decision.cost) {
                    Outcome::SkippedUnaffordable(BuildAction::Settlement)
                } else {
                    match rules::valid_settlement_spots(self).first().copied() {
                        None => Outcome::SkippedNoSpot(BuildAction::Settlement),
                        Some(spot) => {
                            let player = &mut self.players[self.current_player];
                            player.settlements.push(spot);
                            player.resources = player.resources.deducted(&decision.cost);
                            player.points += 1;
                            events.push(GameEvent::SettlementBuilt {
                                player: player.name.clone(),
                                spot,
                                reasoning: decision.reasoning.clone(),
                            });
                            Outcome::Applied(BuildAction::Settlement)
                        }
                    }
                }
            }

            BuildAction::City => {
                if !self.current().resources.can_afford(&decision.cost) {
                    Outcome::SkippedUnaffordable(BuildAction::City)
                } else {
                    let player = &mut self.players[self.current_player];
                    match player.settlements.pop() {
                        None => Outcome::SkippedNoSpot(BuildAction::City),
                        Some(spot) => {
                            player.cities.push(spot);
                            player.resources = player.resources.deducted(&decision.cost);
                            player.points += 1;
                            events.push(GameEvent::CityBuilt {
                                player: player.name.clone(),
                                spot,
                                reasoning: decision.reasoning.clone(),
                            });
                            Outcome::Applied(BuildAction::City)
                        }
                    }
                }
            }

            BuildAction::Road => {
                if !self.current().resources.can_afford(&decision.cost) {
                    Outcome::SkippedUnaffordable(BuildAction::Road)
                } else {
                    let spot = rules::valid_road_spots(self.current(), self, rng)
                        .first()
                        .copied();
                    match spot {
                        None => Outcome::SkippedNoSpot(BuildAction::Road),
                        Some(spot) => {
                            let player = &mut self.players[self.current_player];
                            player.roads.push(spot);
                            player.resources = player.resources.deducted(&decision.cost);
                            events.push(GameEvent::RoadBuilt {
                                player: player.name.clone(),
                                spot,
                                reasoning: decision.reasoning.clone(),
                            });
                            Outcome::Applied(BuildAction::Road)
                        }
                    }
                }
            }

            BuildAction::Pass => {
                events.push(GameEvent::TurnPassed {
                    player: self.current().name.clone(),
                    reasoning: decision.reasoning.clone(),
                });
                Outcome::Passed
            }
        };

        let acting = &self.players[self.current_player];
        if acting.points >= POINTS_TO_WIN {
            self.winner = Some(self.current_player);
            events.push(GameEvent::GameWon {
                player: acting.name.clone(),
                points: acting.points,
            });
        }

        self.current_player = (self.current_player + 1) % SEATS;
        if self.current_player == 0 {
            self.turn += 1;
        }

        Ok((outcome, events))
    }
}
