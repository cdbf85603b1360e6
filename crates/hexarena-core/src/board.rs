//! Static board model.
//!
//! This module contains:
//! - Resource types and the hex kinds that produce them
//! - The fixed 19-hex arena layout with dice-sum trigger numbers
//! - The flat spot spaces structures are placed into
//!
//! The board is static data consumed by renderers; production is rolled per
//! structure, so hexes never gate gameplay. Structures live in two flat
//! integer spot spaces (54 settlement spots, 72 road spots) rather than on a
//! vertex/edge graph, and placement legality uses a numeric-distance proxy;
//! see [`crate::rules`].

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Player identifier: an index into the seating order (0-3)
pub type PlayerId = usize;

/// Number of settlement/city spots. Settlements and cities share this space.
pub const SETTLEMENT_SPOTS: u8 = 54;

/// Number of road spots, a separate space from settlement spots.
pub const ROAD_SPOTS: u8 = 72;

/// The five producible resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Wood,
    Brick,
    Sheep,
    Wheat,
    Ore,
}

impl Resource {
    /// All resource types
    pub const ALL: [Resource; 5] = [
        Resource::Wood,
        Resource::Brick,
        Resource::Sheep,
        Resource::Wheat,
        Resource::Ore,
    ];

    /// Pick a resource kind uniformly at random
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Lowercase name used in logs and prompts
    pub fn name(&self) -> &'static str {
        match self {
            Resource::Wood => "wood",
            Resource::Brick => "brick",
            Resource::Sheep => "sheep",
            Resource::Wheat => "wheat",
            Resource::Ore => "ore",
        }
    }
}

/// What a hex cell produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HexKind {
    /// Produces the named resource when its number is rolled
    Resource(Resource),
    /// Desert - no production, no trigger number
    Desert,
}

/// A single hex cell on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hex {
    pub kind: HexKind,
    /// Dice-sum trigger (2-12); `None` for the desert
    pub number: Option<u8>,
}

impl Hex {
    fn producing(resource: Resource, number: u8) -> Self {
        Self {
            kind: HexKind::Resource(resource),
            number: Some(number),
        }
    }

    fn desert() -> Self {
        Self {
            kind: HexKind::Desert,
            number: None,
        }
    }

    /// The resource this hex produces, if any
    pub fn resource(&self) -> Option<Resource> {
        match self.kind {
            HexKind::Resource(r) => Some(r),
            HexKind::Desert => None,
        }
    }
}

/// The fixed 19-hex arena board. No mutable state lives here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub hexes: Vec<Hex>,
}

impl Board {
    /// The standard arena layout, row by row.
    pub fn standard() -> Self {
        use Resource::*;
        Self {
            hexes: vec![
                Hex::producing(Ore, 10),
                Hex::producing(Sheep, 2),
                Hex::producing(Wood, 9),
                Hex::producing(Wheat, 12),
                Hex::producing(Brick, 6),
                Hex::producing(Sheep, 4),
                Hex::producing(Brick, 10),
                Hex::producing(Wheat, 9),
                Hex::producing(Wood, 11),
                Hex::desert(),
                Hex::producing(Wood, 3),
                Hex::producing(Ore, 8),
                Hex::producing(Wood, 8),
                Hex::producing(Ore, 3),
                Hex::producing(Wheat, 4),
                Hex::producing(Sheep, 5),
                Hex::producing(Brick, 5),
                Hex::producing(Wheat, 6),
                Hex::producing(Sheep, 11),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_board_has_19_hexes() {
        assert_eq!(Board::standard().hexes.len(), 19);
    }

    #[test]
    fn test_exactly_one_desert_without_number() {
        let board = Board::standard();
        let deserts: Vec<_> = board
            .hexes
            .iter()
            .filter(|h| h.kind == HexKind::Desert)
            .collect();
        assert_eq!(deserts.len(), 1);
        assert!(deserts[0].number.is_none());
    }

    #[test]
    fn test_producing_hexes_have_valid_numbers() {
        for hex in Board::standard().hexes {
            if hex.resource().is_some() {
                let number = hex.number.unwrap();
                assert!((2..=12).contains(&number), "bad trigger number {number}");
            }
        }
    }

    #[test]
    fn test_random_resource_is_always_a_known_kind() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let r = Resource::random(&mut rng);
            assert!(Resource::ALL.contains(&r));
        }
    }
}
