//! # Game Module
//!
//! Terrain, agents and the rules that drive a session.
//!
//! This module contains the building blocks of a Tacojiman session:
//! - The immutable terrain grid produced by generation
//! - Regular enemies and the director that spawns and damages them
//! - The boss and its barrier/damage timeline
//! - Bomb descriptors, typed lifecycle events and session rules

pub mod bomb;
pub mod boss;
pub mod director;
pub mod enemy;
pub mod events;
pub mod rules;
pub mod session;
pub mod terrain;

pub use bomb::*;
pub use boss::*;
pub use director::*;
pub use enemy::*;
pub use events::*;
pub use rules::*;
pub use session::*;
pub use terrain::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Integer coordinate of a panel in the terrain grid.
///
/// # Examples
///
/// ```
/// use tacojiman::TilePos;
///
/// let pos = TilePos::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
///
/// let adjacent = pos.cardinal_neighbors();
/// assert_eq!(adjacent.len(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    /// Creates a new tile position with the given coordinates.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Calculates the Manhattan distance to another tile.
    ///
    /// # Examples
    ///
    /// ```
    /// use tacojiman::TilePos;
    ///
    /// let a = TilePos::new(0, 0);
    /// let b = TilePos::new(3, 4);
    /// assert_eq!(a.manhattan_distance(b), 7);
    /// ```
    pub fn manhattan_distance(self, other: TilePos) -> u32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs()) as u32
    }

    /// Calculates the Chebyshev (king-move) distance to another tile.
    pub fn chebyshev_distance(self, other: TilePos) -> u32 {
        (self.x - other.x).abs().max((self.y - other.y).abs()) as u32
    }

    /// Returns the tile one step away in the given direction.
    pub fn step(self, direction: Direction) -> TilePos {
        let (dx, dy) = direction.delta();
        TilePos::new(self.x + dx, self.y + dy)
    }

    /// Returns the 4 cardinal neighbours in N, S, E, W order.
    pub fn cardinal_neighbors(self) -> [TilePos; 4] {
        Direction::ALL.map(|direction| self.step(direction))
    }
}

/// The four grid directions; terrain is 4-connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// All directions in N, S, E, W order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Converts a direction to a tile delta. North is negative y.
    ///
    /// # Examples
    ///
    /// ```
    /// use tacojiman::Direction;
    ///
    /// assert_eq!(Direction::North.delta(), (0, -1));
    /// ```
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    /// The direction pointing back.
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }
}

/// A point in world (pixel) space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f32,
    pub y: f32,
}

impl WorldPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    ///
    /// # Examples
    ///
    /// ```
    /// use tacojiman::WorldPoint;
    ///
    /// let a = WorldPoint::new(0.0, 0.0);
    /// assert_eq!(a.distance(WorldPoint::new(3.0, 4.0)), 5.0);
    /// ```
    pub fn distance(self, other: WorldPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear interpolation; `t` is clamped to `0.0..=1.0`.
    pub fn lerp(self, other: WorldPoint, t: f32) -> WorldPoint {
        let t = t.clamp(0.0, 1.0);
        WorldPoint::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    /// Moves toward `target` by at most `max_step`, never overshooting.
    pub fn move_towards(self, target: WorldPoint, max_step: f32) -> WorldPoint {
        let distance = self.distance(target);
        if distance <= max_step || distance == 0.0 {
            return target;
        }
        self.lerp(target, max_step / distance)
    }
}

/// Unique identifier for enemies.
pub type EnemyId = Uuid;

/// Creates a new unique enemy ID.
pub fn new_enemy_id() -> EnemyId {
    Uuid::new_v4()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_pos_manhattan_distance() {
        let a = TilePos::new(0, 0);
        let b = TilePos::new(3, 4);
        assert_eq!(a.manhattan_distance(b), 7);
        assert_eq!(a.chebyshev_distance(b), 4);
    }

    #[test]
    fn test_tile_pos_cardinal_neighbors() {
        let pos = TilePos::new(5, 5);
        let adjacent = pos.cardinal_neighbors();
        assert_eq!(adjacent[0], TilePos::new(5, 4)); // North
        assert_eq!(adjacent[1], TilePos::new(5, 6)); // South
        assert_eq!(adjacent[2], TilePos::new(6, 5)); // East
        assert_eq!(adjacent[3], TilePos::new(4, 5)); // West
        assert!(!adjacent.contains(&TilePos::new(4, 4)));
    }

    #[test]
    fn test_direction_opposites() {
        for direction in Direction::ALL {
            assert_eq!(direction.opposite().opposite(), direction);
            let pos = TilePos::new(2, 2).step(direction).step(direction.opposite());
            assert_eq!(pos, TilePos::new(2, 2));
        }
    }

    #[test]
    fn test_world_point_move_towards_does_not_overshoot() {
        let start = WorldPoint::new(0.0, 0.0);
        let target = WorldPoint::new(10.0, 0.0);

        let partial = start.move_towards(target, 4.0);
        assert!((partial.x - 4.0).abs() < 1e-5);

        let arrived = start.move_towards(target, 25.0);
        assert_eq!(arrived, target);
    }

    #[test]
    fn test_enemy_id_uniqueness() {
        let id1 = new_enemy_id();
        let id2 = new_enemy_id();
        assert_ne!(id1, id2);
    }
}
