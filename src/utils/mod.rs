//! # Utilities Module
//!
//! Geometry helpers and the terrain pathfinder.

pub mod math;
pub mod pathfinding;

pub use self::math::*;
pub use self::pathfinding::*;
