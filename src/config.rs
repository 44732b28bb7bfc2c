//! # Configuration
//!
//! Tunable values for a session, grouped the way the game uses them.
//!
//! Every section implements `Default` with the shipped balance, and every
//! struct is `#[serde(default)]` so a JSON override file only needs the keys
//! it changes.

use crate::{TacoError, TacoResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration for a game session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Session clock and bomb stock rules
    pub game: GameRulesConfig,
    /// World and tile dimensions
    pub map: MapConfig,
    /// Enemy director tuning
    pub enemy: EnemyConfig,
    /// Boss timeline and hit thresholds
    pub boss: BossConfig,
    /// Hit radii used by taps and arrival checks
    pub attack: AttackConfig,
}

impl GameConfig {
    /// Loads a configuration from a JSON file, filling missing keys with defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> TacoResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parses a configuration from a JSON string.
    ///
    /// # Examples
    ///
    /// ```
    /// use tacojiman::GameConfig;
    ///
    /// let config = GameConfig::from_json_str(r#"{ "map": { "tile_size": 40 } }"#).unwrap();
    /// assert_eq!(config.map.tile_size, 40);
    /// assert_eq!(config.enemy.absolute_max_count, 70);
    /// ```
    pub fn from_json_str(text: &str) -> TacoResult<Self> {
        let config: GameConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that cannot produce a playable session.
    pub fn validate(&self) -> TacoResult<()> {
        if self.map.tile_size == 0 {
            return Err(TacoError::InvalidConfig("tile_size must be positive".to_string()));
        }
        if self.map.world_width < self.map.tile_size || self.map.world_height < self.map.tile_size {
            return Err(TacoError::InvalidConfig(format!(
                "world {}x{} is smaller than one tile of {}",
                self.map.world_width, self.map.world_height, self.map.tile_size
            )));
        }
        if self.enemy.min_spawn_delay_ms == 0 {
            return Err(TacoError::InvalidConfig(
                "min_spawn_delay_ms must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.enemy.spawn_rate_multiplier) {
            return Err(TacoError::InvalidConfig(
                "spawn_rate_multiplier must lie in 0.0..=1.0".to_string(),
            ));
        }
        if self.enemy.spawn_weights.total() <= 0.0 {
            return Err(TacoError::InvalidConfig("spawn weights sum to zero".to_string()));
        }
        if self.boss.max_visual_hp == 0 || self.boss.total_hits_required < self.boss.max_visual_hp {
            return Err(TacoError::InvalidConfig(
                "boss needs at least one hit per visual hit point".to_string(),
            ));
        }
        Ok(())
    }
}

/// Session clock and bomb stock rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRulesConfig {
    /// Length of a session in seconds
    pub total_duration_secs: u32,
    /// Remaining seconds at which the boss appears
    pub boss_spawn_time_remaining: u32,
    /// Remaining seconds at which the bomb stock refills
    pub bomb_recovery_times: Vec<u32>,
    /// Bombs available at the start
    pub initial_bomb_stock: u32,
    /// Stock ceiling
    pub max_bomb_stock: u32,
}

impl Default for GameRulesConfig {
    fn default() -> Self {
        Self {
            total_duration_secs: 180,
            boss_spawn_time_remaining: 110,
            bomb_recovery_times: vec![120, 60],
            initial_bomb_stock: 1,
            max_bomb_stock: 1,
        }
    }
}

/// World and tile dimensions in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub world_width: u32,
    pub world_height: u32,
    pub tile_size: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            world_width: 840,
            world_height: 840,
            tile_size: 30,
        }
    }
}

/// Relative spawn probabilities per enemy type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnWeights {
    pub ground: f64,
    pub water: f64,
    pub air: f64,
    pub underground: f64,
}

impl SpawnWeights {
    /// Sum of all weights.
    pub fn total(&self) -> f64 {
        self.ground + self.water + self.air + self.underground
    }
}

impl Default for SpawnWeights {
    fn default() -> Self {
        Self {
            ground: 0.5,
            water: 0.25,
            air: 0.15,
            underground: 0.1,
        }
    }
}

/// Enemy director tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Population cap at the start of a session
    pub initial_max_count: usize,
    /// Population cap ceiling
    pub absolute_max_count: usize,
    /// Cap increase per difficulty cycle
    pub increase_per_cycle: usize,
    /// Length of a difficulty cycle in seconds
    pub difficulty_cycle_secs: u64,
    /// Spawn delay at the start of a session
    pub initial_spawn_delay_ms: u64,
    /// Spawn delay floor
    pub min_spawn_delay_ms: u64,
    /// Factor applied to the spawn delay every cycle
    pub spawn_rate_multiplier: f64,
    /// Ground enemies released as soon as spawning starts
    pub initial_ground_enemies: usize,
    pub spawn_weights: SpawnWeights,
    /// Inner radius, in tiles, of the underground spawn band around the house
    pub near_house_min_radius: i32,
    /// Outer radius, in tiles, of the underground spawn band around the house
    pub near_house_max_radius: i32,
    /// Pixel ring used when no panel qualifies for an underground spawn
    pub underground_ring_min_px: f32,
    pub underground_ring_max_px: f32,
    /// Pixels per second for a speed of 1.0
    pub speed_scale: f32,
    /// Open-set ceiling for a single path search
    pub path_search_limit: usize,
}

impl EnemyConfig {
    pub fn initial_spawn_delay(&self) -> Duration {
        Duration::from_millis(self.initial_spawn_delay_ms)
    }

    pub fn min_spawn_delay(&self) -> Duration {
        Duration::from_millis(self.min_spawn_delay_ms)
    }

    pub fn difficulty_cycle(&self) -> Duration {
        Duration::from_secs(self.difficulty_cycle_secs)
    }
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            initial_max_count: 40,
            absolute_max_count: 70,
            increase_per_cycle: 5,
            difficulty_cycle_secs: 15,
            initial_spawn_delay_ms: 500,
            min_spawn_delay_ms: 200,
            spawn_rate_multiplier: 0.8,
            initial_ground_enemies: 3,
            spawn_weights: SpawnWeights::default(),
            near_house_min_radius: 3,
            near_house_max_radius: 6,
            underground_ring_min_px: 80.0,
            underground_ring_max_px: 180.0,
            speed_scale: 10.0,
            path_search_limit: 4096,
        }
    }
}

/// Boss timeline and hit thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossConfig {
    /// Hits needed to bring the visual HP to zero
    pub total_hits_required: u32,
    /// Leading hits absorbed by the barrier
    pub barrier_threshold: u32,
    pub max_visual_hp: u32,
    /// Fixed award for the defeat
    pub defeat_score: u32,
    pub entrance_ms: u64,
    /// The entrance stops this many pixels short of the house, vertically
    pub entrance_offset_px: f32,
    pub approach_ms: u64,
    pub attack_interval_ms: u64,
    /// Score removed from the player per attack
    pub attack_damage: u32,
    /// Delay between defeat and removal
    pub teardown_ms: u64,
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            total_hits_required: 42,
            barrier_threshold: 10,
            max_visual_hp: 2,
            defeat_score: 100,
            entrance_ms: 2000,
            entrance_offset_px: 50.0,
            approach_ms: 8000,
            attack_interval_ms: 500,
            attack_damage: 5,
            teardown_ms: 1000,
        }
    }
}

/// Hit radii in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackConfig {
    pub normal_attack_radius: f32,
    pub boss_attack_radius: f32,
    pub house_click_radius: f32,
    /// An enemy this close to the house has arrived
    pub home_reach_radius: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            normal_attack_radius: 80.0,
            boss_attack_radius: 40.0,
            house_click_radius: 30.0,
            home_reach_radius: 25.0,
            min_zoom: 1.0,
            max_zoom: 3.0,
        }
    }
}
