//! # Generation Module
//!
//! Procedural terrain generation.
//!
//! Generators are seeded and driven through the [`Generator`] trait so a map
//! can be reproduced from its seed. Feature placement is best-effort: an
//! optional feature that cannot be placed is left out and logged, never
//! treated as an error.

pub mod map;

pub use map::*;

use crate::config::MapConfig;
use crate::game::{EnemyType, PanelType, TerrainGrid};
use crate::utils::TerrainPathfinder;
use crate::{TacoError, TacoResult};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Configuration for terrain generation.
///
/// World dimensions are in pixels; the grid gets `ceil(world / tile_size)`
/// tiles per axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    pub world_width: u32,
    pub world_height: u32,
    pub tile_size: u32,
    /// Neighbour houses to place
    pub other_house_count: u32,
    /// Attempts per neighbour house before giving up on it
    pub house_attempts: u32,
    /// Attempts for the station before giving up on it
    pub station_attempts: u32,
    /// Shortest rail spur
    pub rail_min_len: u32,
    /// Longest rail spur
    pub rail_max_len: u32,
    /// Fewest coastline tiles flooded along the sea edge
    pub sea_coast_min: u32,
    pub sea_coast_max: u32,
    /// How far the sea pushes inland from each coastline tile
    pub sea_depth_min: u32,
    pub sea_depth_max: u32,
    /// Length range of the extra river wandering off the sea
    pub river_min_len: u32,
    pub river_max_len: u32,
    /// Chebyshev radius kept clear around the house and between features
    pub exclusion_radius: u32,
}

impl GenerationConfig {
    /// Creates the shipped generation configuration with the given seed.
    ///
    /// # Examples
    ///
    /// ```
    /// use tacojiman::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(7);
    /// assert_eq!(config.grid_dimensions(), (28, 28));
    /// assert!(config.rail_max_len >= config.rail_min_len);
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            world_width: 840,
            world_height: 840,
            tile_size: 30,
            other_house_count: 2,
            house_attempts: 200,
            station_attempts: 100,
            rail_min_len: 3,
            rail_max_len: 8,
            sea_coast_min: 8,
            sea_coast_max: 19,
            sea_depth_min: 3,
            sea_depth_max: 6,
            river_min_len: 4,
            river_max_len: 9,
            exclusion_radius: 2,
        }
    }

    /// Creates a configuration for testing with a small map.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            world_width: 450,
            world_height: 450,
            ..Self::new(seed)
        }
    }

    /// Takes world and tile sizes from a session's map configuration.
    pub fn from_map_config(map: &MapConfig, seed: u64) -> Self {
        Self {
            world_width: map.world_width,
            world_height: map.world_height,
            tile_size: map.tile_size,
            ..Self::new(seed)
        }
    }

    /// Grid size in tiles as `(width, height)`.
    pub fn grid_dimensions(&self) -> (u32, u32) {
        if self.tile_size == 0 {
            return (0, 0);
        }
        (
            self.world_width.div_ceil(self.tile_size),
            self.world_height.div_ceil(self.tile_size),
        )
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Trait for procedural content generators.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> TacoResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> TacoResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

pub mod utils {
    use super::*;

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }

    /// Checks the structural invariants every generated map must hold.
    ///
    /// - exactly one player house, at the grid centre
    /// - every path panel has a ground route to the house
    pub fn validate_terrain(grid: &TerrainGrid) -> TacoResult<()> {
        let houses = grid.positions_of(PanelType::PlayerHouse);
        if houses.len() != 1 {
            return Err(TacoError::GenerationFailed(format!(
                "expected exactly one player house, found {}",
                houses.len()
            )));
        }
        if houses[0] != grid.center() {
            return Err(TacoError::GenerationFailed(format!(
                "player house at {:?}, expected {:?}",
                houses[0],
                grid.center()
            )));
        }

        let reachable =
            TerrainPathfinder::new().reachable_from(grid, grid.center(), EnemyType::Ground);
        if let Some(stranded) = grid
            .positions_of(PanelType::Path)
            .into_iter()
            .find(|pos| !reachable.contains(pos))
        {
            return Err(TacoError::GenerationFailed(format!(
                "path panel {:?} has no ground route to the house",
                stranded
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_config_creation() {
        let config = GenerationConfig::new(12345);
        assert_eq!(config.seed, 12345);
        assert_eq!(config.other_house_count, 2);
        assert_eq!(config.grid_dimensions(), (28, 28));
    }

    #[test]
    fn test_grid_dimensions_round_up() {
        let config = GenerationConfig {
            world_width: 100,
            world_height: 61,
            tile_size: 30,
            ..GenerationConfig::default()
        };
        assert_eq!(config.grid_dimensions(), (4, 3));

        let degenerate = GenerationConfig {
            tile_size: 0,
            ..GenerationConfig::default()
        };
        assert_eq!(degenerate.grid_dimensions(), (0, 0));
    }

    #[test]
    fn test_from_map_config() {
        let map = MapConfig {
            world_width: 300,
            world_height: 240,
            tile_size: 20,
        };
        let config = GenerationConfig::from_map_config(&map, 9);
        assert_eq!(config.seed, 9);
        assert_eq!(config.grid_dimensions(), (15, 12));
    }

    #[test]
    fn test_utils_rng_creation() {
        use rand::Rng;

        let config = GenerationConfig::for_testing(12345);
        let mut a = utils::create_rng(&config);
        let mut b = utils::create_rng(&config);
        assert_eq!(a.gen::<u64>(), b.gen::<u64>());
    }

    #[test]
    fn test_validate_terrain_rejects_off_centre_house() {
        let grid = TerrainGrid::parse(&["H##", "###", "###"], 30).unwrap();
        assert!(matches!(
            utils::validate_terrain(&grid),
            Err(TacoError::GenerationFailed(_))
        ));
    }

    #[test]
    fn test_validate_terrain_rejects_stranded_path() {
        let grid = TerrainGrid::parse(&["#..", ".H.", "..."], 30).unwrap();
        assert!(utils::validate_terrain(&grid).is_err());

        let connected = TerrainGrid::parse(&[".#.", ".H.", "..."], 30).unwrap();
        assert!(utils::validate_terrain(&connected).is_ok());
    }
}
