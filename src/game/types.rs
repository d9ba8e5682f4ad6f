//! Core types for the rail game
//!
//! Hex geometry and the small value types shared by every other module.

use std::fmt;

/// A unique identifier for a seated player
/// This is a simple wrapper around a usize for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PlayerId(pub usize);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// One of the six sides of a hexagon, in axial coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeDirection {
    East,
    NorthEast,
    NorthWest,
    West,
    SouthWest,
    SouthEast,
}

impl EdgeDirection {
    /// All directions, counter-clockwise starting east
    pub const ALL: [EdgeDirection; 6] = [
        EdgeDirection::East,
        EdgeDirection::NorthEast,
        EdgeDirection::NorthWest,
        EdgeDirection::West,
        EdgeDirection::SouthWest,
        EdgeDirection::SouthEast,
    ];

    /// The axial offset of one step in this direction
    pub fn offset(self) -> (i32, i32) {
        match self {
            EdgeDirection::East => (1, 0),
            EdgeDirection::NorthEast => (1, -1),
            EdgeDirection::NorthWest => (0, -1),
            EdgeDirection::West => (-1, 0),
            EdgeDirection::SouthWest => (-1, 1),
            EdgeDirection::SouthEast => (0, 1),
        }
    }

    pub fn opposite(self) -> EdgeDirection {
        match self {
            EdgeDirection::East => EdgeDirection::West,
            EdgeDirection::NorthEast => EdgeDirection::SouthWest,
            EdgeDirection::NorthWest => EdgeDirection::SouthEast,
            EdgeDirection::West => EdgeDirection::East,
            EdgeDirection::SouthWest => EdgeDirection::NorthEast,
            EdgeDirection::SouthEast => EdgeDirection::NorthWest,
        }
    }
}

/// A position on the hex grid in axial coordinates
///
/// Ordered by `q` then `r` so position-keyed collections iterate the same way
/// on every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TilePosition {
    pub q: i32,
    pub r: i32,
}

impl TilePosition {
    pub const ORIGIN: TilePosition = TilePosition { q: 0, r: 0 };

    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The implicit third cube coordinate
    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    pub fn neighbour(&self, direction: EdgeDirection) -> TilePosition {
        let (dq, dr) = direction.offset();
        TilePosition::new(self.q + dq, self.r + dr)
    }

    pub fn neighbours(&self) -> [TilePosition; 6] {
        EdgeDirection::ALL.map(|direction| self.neighbour(direction))
    }

    pub fn is_adjacent(&self, other: &TilePosition) -> bool {
        self.distance_to(other) == 1
    }

    /// Number of steps between two positions
    pub fn distance_to(&self, other: &TilePosition) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        dq.max(dr).max(ds) as u32
    }

    /// All positions at exactly `radius` steps, walking the ring once
    pub fn ring(&self, radius: u32) -> Vec<TilePosition> {
        if radius == 0 {
            return vec![*self];
        }

        let mut results = Vec::with_capacity(6 * radius as usize);
        let (dq, dr) = EdgeDirection::SouthWest.offset();
        let mut current = TilePosition::new(
            self.q + dq * radius as i32,
            self.r + dr * radius as i32,
        );
        for direction in EdgeDirection::ALL {
            for _ in 0..radius {
                results.push(current);
                current = current.neighbour(direction);
            }
        }
        results
    }

    /// Center first, then every ring out to `radius`
    pub fn spiral(&self, radius: u32) -> Vec<TilePosition> {
        (0..=radius).flat_map(|ring| self.ring(ring)).collect()
    }
}

impl fmt::Display for TilePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// Terrain of a single tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TileType {
    Plain,
    Mountain,
}

/// The unordered set of terrain types on both sides of an edge
///
/// `(Plain, Mountain)` and `(Mountain, Plain)` are the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TerrainPair(TileType, TileType);

impl TerrainPair {
    pub fn new(a: TileType, b: TileType) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }
}

/// Key of an edge: the two adjacent tile positions, smaller one first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    a: TilePosition,
    b: TilePosition,
}

impl EdgeKey {
    pub fn new(first: TilePosition, second: TilePosition) -> Self {
        if first <= second {
            Self { a: first, b: second }
        } else {
            Self { a: second, b: first }
        }
    }

    pub fn first(&self) -> TilePosition {
        self.a
    }

    pub fn positions(&self) -> [TilePosition; 2] {
        [self.a, self.b]
    }

    pub fn touches(&self, position: &TilePosition) -> bool {
        self.a == *position || self.b == *position
    }

    /// Two edges connect when they share a tile
    pub fn connects_to(&self, other: &EdgeKey) -> bool {
        self != other && (other.touches(&self.a) || other.touches(&self.b))
    }

    /// The endpoint opposite `from`, if `from` is an endpoint at all
    pub fn other_end(&self, from: &TilePosition) -> Option<TilePosition> {
        if self.a == *from {
            Some(self.b)
        } else if self.b == *from {
            Some(self.a)
        } else {
            None
        }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.a, self.b)
    }
}

/// A city sitting on a tile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct City {
    pub position: TilePosition,
    pub name: String,
    pub is_starting_city: bool,
    pub roll_numbers: std::collections::BTreeSet<u32>,
}

impl City {
    pub fn new(position: TilePosition, name: impl Into<String>, is_starting_city: bool) -> Self {
        Self {
            position,
            name: name.into(),
            is_starting_city,
            roll_numbers: Default::default(),
        }
    }

    pub fn with_roll_numbers(mut self, numbers: impl IntoIterator<Item = u32>) -> Self {
        self.roll_numbers.extend(numbers);
        self
    }
}

/// Canonical roll numbers for an `sides`-sided die: 11, 12, ..., 1S, 21, ..., SS
///
/// Each digit is one die result, so `sides` must be at most 9.
pub fn roll_number_sequence(sides: u32) -> impl Iterator<Item = u32> {
    (1..=sides).flat_map(move |tens| (1..=sides).map(move |ones| tens * 10 + ones))
}
