//! Hexarena - an AI bot arena over a reduced Catan variant
//!
//! This crate provides the core simulation logic for Hexarena, including:
//! - Static board model with the fixed 19-hex layout
//! - Player state and resource management
//! - Pure placement and dice rules over flat integer spot spaces
//! - Turn engine: setup placement, production, decision application,
//!   win detection
//! - Decision provider trait with the rule-based implementations
//!
//! # Architecture
//!
//! The engine is a plain state machine: the caller drives it step by step
//! and owns the RNG, so seeded tests are deterministic. Decision providers
//! are the only asynchronous seam: remote model-backed providers live in
//! the server crate; the trait and the rule-based providers live here.
//!
//! # Modules
//!
//! - [`board`]: static hex layout and resource kinds
//! - [`player`]: player state, resource hands, building costs
//! - [`rules`]: candidate spot enumeration and dice
//! - [`decision`]: decision types and providers
//! - [`game`]: game state machine

pub mod board;
pub mod decision;
pub mod game;
pub mod player;
pub mod rules;

// Re-export commonly used types
pub use board::{Board, Hex, HexKind, PlayerId, Resource, ROAD_SPOTS, SETTLEMENT_SPOTS};
pub use decision::{
    heuristic_decision, BuildAction, Decision, DecisionProvider, HeuristicProvider,
};
pub use game::{GameError, GameEvent, GamePhase, GameState, Outcome, POINTS_TO_WIN, SEATS};
pub use player::{costs, Player, ResourceHand, Strategy};
