//! Decision providers.
//!
//! A decision is what a player wants to build this turn, plus the reasoning
//! behind it. Providers are polymorphic: rule-based strategies answer
//! immediately from player state, model-backed strategies go over the wire.
//! A provider never fails: anything that goes wrong degrades to a pass
//! decision so the turn loop keeps moving.

use crate::game::GameState;
use crate::player::{costs, Player, ResourceHand, Strategy};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What a player can build with one decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildAction {
    Settlement,
    City,
    Road,
    Pass,
}

impl BuildAction {
    /// Fixed cost table. Passing costs nothing.
    pub fn cost(&self) -> ResourceHand {
        match self {
            BuildAction::Settlement => costs::settlement(),
            BuildAction::City => costs::city(),
            BuildAction::Road => costs::road(),
            BuildAction::Pass => ResourceHand::new(),
        }
    }
}

/// A player's decision for one turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub action: BuildAction,
    /// Cost attached from the fixed table, never taken from a provider reply
    pub cost: ResourceHand,
    pub reasoning: String,
}

impl Decision {
    /// Decision for an action, with its table cost attached
    pub fn build(action: BuildAction, reasoning: impl Into<String>) -> Self {
        Self {
            action,
            cost: action.cost(),
            reasoning: reasoning.into(),
        }
    }

    /// The fallback decision: do nothing this turn
    pub fn pass(reasoning: impl Into<String>) -> Self {
        Self::build(BuildAction::Pass, reasoning)
    }
}

/// Deterministic decision for the rule-based strategies.
///
/// Greedy converts to cities as soon as it can; balanced grows a settlement
/// base first. A strategy without hand-written rules passes.
pub fn heuristic_decision(strategy: Strategy, player: &Player) -> Decision {
    match strategy {
        Strategy::Greedy => {
            if player.resources.can_afford(&costs::city()) && !player.settlements.is_empty() {
                Decision::build(
                    BuildAction::City,
                    "Greedy: going for immediate points with a city",
                )
            } else if player.resources.can_afford(&costs::settlement()) {
                Decision::build(
                    BuildAction::Settlement,
                    "Greedy: building a settlement for points",
                )
            } else if player.resources.can_afford(&costs::road()) {
                Decision::build(
                    BuildAction::Road,
                    "Greedy: building a road to enable future settlements",
                )
            } else {
                Decision::pass("Cannot afford any actions")
            }
        }
        Strategy::Balanced => {
            if player.resources.can_afford(&costs::settlement()) && player.settlements.len() < 3 {
                Decision::build(
                    BuildAction::Settlement,
                    "Balanced: expanding the settlement base",
                )
            } else if player.resources.can_afford(&costs::city()) && !player.settlements.is_empty()
            {
                Decision::build(
                    BuildAction::City,
                    "Balanced: upgrading for better production",
                )
            } else if player.resources.can_afford(&costs::road()) {
                Decision::build(BuildAction::Road, "Balanced: building infrastructure")
            } else {
                Decision::pass("Cannot afford any actions")
            }
        }
        _ => Decision::pass("Cannot afford any actions"),
    }
}

/// A source of per-turn decisions for one seat.
#[async_trait]
pub trait DecisionProvider: Send + Sync {
    /// Decide what to build given the player's view of the game.
    async fn decide(&self, player: &Player, state: &GameState) -> Decision;
}

/// Rule-based provider for the heuristic strategies.
pub struct HeuristicProvider {
    strategy: Strategy,
}

impl HeuristicProvider {
    pub fn new(strategy: Strategy) -> Self {
        Self { strategy }
    }
}

#[async_trait]
impl DecisionProvider for HeuristicProvider {
    async fn decide(&self, player: &Player, _state: &GameState) -> Decision {
        heuristic_decision(self.strategy, player)
    }
}
