//! Player state and resource management.
//!
//! This module contains:
//! - Strategy identifiers (which decision provider drives a seat)
//! - Player struct with resources, structures, and points
//! - ResourceHand for managing resource counts
//! - Building costs

use crate::board::{PlayerId, Resource};
use serde::{Deserialize, Serialize};

/// The identifier selecting which decision provider a player uses.
///
/// Also serves as the key of the cumulative win tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Remote model-backed player (larger model)
    Sonnet,
    /// Remote model-backed player (smaller model)
    Haiku,
    /// Rule-based: points now, expansion later
    Greedy,
    /// Rule-based: expansion first, upgrades second
    Balanced,
}

impl Strategy {
    /// Default seating order
    pub const ALL: [Strategy; 4] = [
        Strategy::Sonnet,
        Strategy::Haiku,
        Strategy::Greedy,
        Strategy::Balanced,
    ];

    /// Display name shown in logs and the control panel
    pub fn display_name(&self) -> &'static str {
        match self {
            Strategy::Sonnet => "Claude Sonnet",
            Strategy::Haiku => "Claude Haiku",
            Strategy::Greedy => "Greedy Bot",
            Strategy::Balanced => "Balanced Bot",
        }
    }

    /// Hex color string for UI rendering
    pub fn color(&self) -> &'static str {
        match self {
            Strategy::Sonnet => "#8B5CF6",
            Strategy::Haiku => "#06B6D4",
            Strategy::Greedy => "#EF4444",
            Strategy::Balanced => "#10B981",
        }
    }

    /// Whether this strategy delegates decisions to a remote endpoint
    pub fn is_remote(&self) -> bool {
        self.model_id().is_some()
    }

    /// Model identifier sent to the remote endpoint, for remote strategies
    pub fn model_id(&self) -> Option<&'static str> {
        match self {
            Strategy::Sonnet => Some("claude-sonnet-4-20250514"),
            Strategy::Haiku => Some("claude-haiku-4-5-20251001"),
            Strategy::Greedy | Strategy::Balanced => None,
        }
    }
}

/// A hand of resources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHand {
    pub wood: u32,
    pub brick: u32,
    pub sheep: u32,
    pub wheat: u32,
    pub ore: u32,
}

impl ResourceHand {
    /// Create an empty hand
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hand with specific amounts
    pub fn with_amounts(wood: u32, brick: u32, sheep: u32, wheat: u32, ore: u32) -> Self {
        Self {
            wood,
            brick,
            sheep,
            wheat,
            ore,
        }
    }

    /// Total number of resource cards
    pub fn total(&self) -> u32 {
        self.wood + self.brick + self.sheep + self.wheat + self.ore
    }

    /// Check if hand is empty
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Get count of a specific resource
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Wood => self.wood,
            Resource::Brick => self.brick,
            Resource::Sheep => self.sheep,
            Resource::Wheat => self.wheat,
            Resource::Ore => self.ore,
        }
    }

    /// Add resources to hand
    pub fn add(&mut self, resource: Resource, amount: u32) {
        match resource {
            Resource::Wood => self.wood += amount,
            Resource::Brick => self.brick += amount,
            Resource::Sheep => self.sheep += amount,
            Resource::Wheat => self.wheat += amount,
            Resource::Ore => self.ore += amount,
        }
    }

    /// Check if a cost can be paid. Zero entries are vacuously satisfied, so
    /// a cost only constrains the resources it actually names.
    pub fn can_afford(&self, cost: &ResourceHand) -> bool {
        self.wood >= cost.wood
            && self.brick >= cost.brick
            && self.sheep >= cost.sheep
            && self.wheat >= cost.wheat
            && self.ore >= cost.ore
    }

    /// A new hand with the cost subtracted; the input is untouched. Callers
    /// must have verified affordability first (panics if insufficient).
    pub fn deducted(&self, cost: &ResourceHand) -> ResourceHand {
        assert!(self.can_afford(cost), "Cannot afford this cost");
        ResourceHand {
            wood: self.wood - cost.wood,
            brick: self.brick - cost.brick,
            sheep: self.sheep - cost.sheep,
            wheat: self.wheat - cost.wheat,
            ore: self.ore - cost.ore,
        }
    }
}

/// Building costs
pub mod costs {
    use super::ResourceHand;

    /// Cost to build a settlement: 1 wood, 1 brick, 1 sheep, 1 wheat
    pub fn settlement() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 1, 1, 0)
    }

    /// Cost to upgrade to a city: 2 wheat, 3 ore
    pub fn city() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 0, 2, 3)
    }

    /// Cost to build a road: 1 wood, 1 brick
    pub fn road() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 0, 0, 0)
    }
}

/// A single player's state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Seat index (0-3)
    pub id: PlayerId,
    /// Display name
    pub name: String,
    /// Which decision provider drives this seat
    pub strategy: Strategy,
    /// Display color
    pub color: String,
    /// Current resources
    pub resources: ResourceHand,
    /// Settlement spot indices, in placement order
    pub settlements: Vec<u8>,
    /// City spot indices (converted settlements), in upgrade order
    pub cities: Vec<u8>,
    /// Road spot indices, in placement order
    pub roads: Vec<u8>,
    /// Victory points. Tracked redundantly: intended to equal
    /// `settlements.len() + cities.len()`.
    pub points: u32,
}

impl Player {
    /// Create a new player for a seat
    pub fn new(id: PlayerId, strategy: Strategy) -> Self {
        Self {
            id,
            name: strategy.display_name().to_string(),
            strategy,
            color: strategy.color().to_string(),
            resources: ResourceHand::new(),
            settlements: Vec::new(),
            cities: Vec::new(),
            roads: Vec::new(),
            points: 0,
        }
    }

    /// Whether the player owns any structure at all. Road candidate
    /// enumeration thins out once this is true.
    pub fn owns_any_structure(&self) -> bool {
        !self.settlements.is_empty() || !self.cities.is_empty() || !self.roads.is_empty()
    }
}
