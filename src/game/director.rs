//! # Enemy Director
//!
//! Owns the live enemy population: spawning, difficulty escalation, decoys,
//! movement ticks and damage queries.
//!
//! Spawn points for terrain-bound types are verified against the house once,
//! at construction, so a ground or water tako is only ever placed somewhere it
//! can walk home from. A map that offers no such point for a type with a
//! non-zero spawn weight is rejected outright.

use super::{
    AgentStep, DecoyId, DecoyTarget, DespawnReason, Enemy, EnemyId, EnemyType, GameEvent,
    MovementContext, PanelType, TerrainGrid, TilePos, WorldPoint,
};
use super::rules::{spawn_rule, tick_duration, SpawnRule};
use crate::config::EnemyConfig;
use crate::utils::{circle_contains, random_edge_point, random_point_in_ring, TerrainPathfinder};
use crate::{TacoError, TacoResult};
use log::{debug, info};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Result of a single-target attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttackHit {
    pub hit: bool,
    pub score: u32,
    pub enemy: Option<EnemyId>,
}

/// Spawns, moves and damages regular enemies.
#[derive(Debug)]
pub struct EnemyDirector {
    grid: Arc<TerrainGrid>,
    pathfinder: TerrainPathfinder,
    config: EnemyConfig,
    home_radius: f32,
    rng: StdRng,
    type_weights: WeightedIndex<f64>,
    enemies: Vec<Enemy>,
    decoys: Vec<DecoyTarget>,
    terrain_spawn_points: HashMap<EnemyType, Vec<TilePos>>,
    underground_spawn_points: Vec<TilePos>,
    spawning: bool,
    spawn_elapsed: Duration,
    spawn_timer: Duration,
    rule: SpawnRule,
    events: Vec<GameEvent>,
}

impl EnemyDirector {
    /// Creates a director for `grid`.
    ///
    /// Fails with [`TacoError::NoSpawnPoint`] when a terrain-bound type that can
    /// be drawn has no panel of its own terrain connected to the house.
    pub fn new(
        grid: Arc<TerrainGrid>,
        config: EnemyConfig,
        home_radius: f32,
        rng: StdRng,
    ) -> TacoResult<Self> {
        let weights = &config.spawn_weights;
        let type_weights = WeightedIndex::new([
            weights.ground,
            weights.water,
            weights.air,
            weights.underground,
        ])
        .map_err(|err| TacoError::InvalidConfig(format!("spawn weights: {}", err)))?;

        let pathfinder = TerrainPathfinder::with_search_limit(config.path_search_limit);
        let mut terrain_spawn_points = HashMap::new();
        for enemy_type in [EnemyType::Ground, EnemyType::Water] {
            let points = edge_spawn_points(&grid, &pathfinder, enemy_type);
            if points.is_empty() && type_weight(&config, enemy_type) > 0.0 {
                return Err(TacoError::NoSpawnPoint(enemy_type));
            }
            debug!(
                "{} edge spawn points for {:?} enemies",
                points.len(),
                enemy_type
            );
            terrain_spawn_points.insert(enemy_type, points);
        }
        let underground_spawn_points = near_house_points(
            &grid,
            config.near_house_min_radius,
            config.near_house_max_radius,
        );

        let rule = spawn_rule(Duration::ZERO, &config);
        Ok(Self {
            grid,
            pathfinder,
            config,
            home_radius,
            rng,
            type_weights,
            enemies: Vec::new(),
            decoys: Vec::new(),
            terrain_spawn_points,
            underground_spawn_points,
            spawning: false,
            spawn_elapsed: Duration::ZERO,
            spawn_timer: Duration::ZERO,
            rule,
            events: Vec::new(),
        })
    }

    pub fn grid(&self) -> &Arc<TerrainGrid> {
        &self.grid
    }

    pub fn pathfinder(&self) -> &TerrainPathfinder {
        &self.pathfinder
    }

    /// Live enemies, oldest first.
    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|enemy| enemy.id() == id)
    }

    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_spawning(&self) -> bool {
        self.spawning
    }

    /// Cap and delay currently in force.
    pub fn spawn_rule(&self) -> SpawnRule {
        self.rule
    }

    /// Verified spawn tiles for a terrain-bound type.
    pub fn spawn_points(&self, enemy_type: EnemyType) -> &[TilePos] {
        self.terrain_spawn_points
            .get(&enemy_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn decoys(&self) -> &[DecoyTarget] {
        &self.decoys
    }

    /// Drains events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Starts the spawn timer and releases the opening wave of ground enemies.
    pub fn start_spawning(&mut self) {
        if self.spawning {
            return;
        }
        self.spawning = true;
        self.spawn_timer = Duration::ZERO;
        info!(
            "Enemy spawning started (cap {}, delay {:?})",
            self.rule.max_enemies, self.rule.spawn_delay
        );
        for _ in 0..self.config.initial_ground_enemies {
            self.spawn_type(EnemyType::Ground);
        }
    }

    pub fn stop_spawning(&mut self) {
        if self.spawning {
            info!("Enemy spawning stopped with {} enemies alive", self.enemies.len());
        }
        self.spawning = false;
    }

    /// Draws a type by weight and spawns it.
    ///
    /// Returns `None` at the population cap or when the new enemy had no route.
    pub fn spawn(&mut self) -> Option<EnemyId> {
        let enemy_type = EnemyType::ALL[self.type_weights.sample(&mut self.rng)];
        self.spawn_type(enemy_type)
    }

    /// Spawns a specific type at a policy-chosen point, respecting the cap.
    pub fn spawn_type(&mut self, enemy_type: EnemyType) -> Option<EnemyId> {
        if self.enemies.len() >= self.rule.max_enemies {
            return None;
        }
        let position = self.spawn_position(enemy_type)?;
        self.spawn_at(enemy_type, position)
    }

    /// Places an enemy at an exact point, bypassing the cap.
    ///
    /// A terrain-bound enemy with no route is dropped with an
    /// [`GameEvent::EnemyDespawned`] and nothing is added.
    pub fn spawn_at(&mut self, enemy_type: EnemyType, position: WorldPoint) -> Option<EnemyId> {
        let mut enemy = Enemy::spawn(enemy_type, position, &self.grid, &self.pathfinder);
        let id = enemy.id();

        if !enemy.is_alive() {
            debug!(
                "Dropped {:?} spawn at ({:.0}, {:.0}): no route",
                enemy_type, position.x, position.y
            );
            self.events.push(GameEvent::EnemyDespawned {
                id,
                reason: DespawnReason::NoRoute,
            });
            return None;
        }

        enemy.retarget(&self.decoys);
        self.events.push(GameEvent::EnemySpawned {
            id,
            enemy_type,
            position,
        });
        self.enemies.push(enemy);
        Some(id)
    }

    fn spawn_position(&mut self, enemy_type: EnemyType) -> Option<WorldPoint> {
        match enemy_type {
            EnemyType::Ground | EnemyType::Water => {
                let tile = *self
                    .terrain_spawn_points
                    .get(&enemy_type)?
                    .choose(&mut self.rng)?;
                Some(self.grid.tile_center(tile))
            }
            EnemyType::Underground => {
                if let Some(&tile) = self.underground_spawn_points.choose(&mut self.rng) {
                    return Some(self.grid.tile_center(tile));
                }
                let home = self.grid.tile_center(self.grid.player_house());
                Some(random_point_in_ring(
                    &mut self.rng,
                    home,
                    self.config.underground_ring_min_px,
                    self.config.underground_ring_max_px,
                ))
            }
            EnemyType::Air => {
                let (width, height) = self.grid.world_size();
                Some(random_edge_point(&mut self.rng, width, height))
            }
        }
    }

    /// Advances spawning, escalation and movement by `dt` seconds.
    ///
    /// Returns the total penalty of enemies that reached the house.
    pub fn update(&mut self, dt: f32) -> u32 {
        let step = tick_duration(dt);

        if self.spawning {
            self.spawn_elapsed += step;
            self.escalate();

            self.spawn_timer += step;
            while self.spawn_timer >= self.rule.spawn_delay && !self.rule.spawn_delay.is_zero() {
                self.spawn_timer -= self.rule.spawn_delay;
                self.spawn();
            }
        }

        for enemy in &mut self.enemies {
            enemy.retarget(&self.decoys);
        }

        let context = MovementContext {
            grid: &self.grid,
            pathfinder: &self.pathfinder,
            speed_scale: self.config.speed_scale,
            home_radius: self.home_radius,
        };
        let mut penalty = 0;
        for enemy in &mut self.enemies {
            match enemy.update(dt, &context) {
                AgentStep::ReachedHome { penalty: value } => {
                    penalty += value;
                    self.events.push(GameEvent::EnemyReachedHome {
                        id: enemy.id(),
                        score_value: value,
                    });
                }
                AgentStep::NoRoute => self.events.push(GameEvent::EnemyDespawned {
                    id: enemy.id(),
                    reason: DespawnReason::NoRoute,
                }),
                AgentStep::Moving | AgentStep::Idle | AgentStep::Inactive => {}
            }
        }
        self.enemies.retain(Enemy::is_alive);

        penalty
    }

    fn escalate(&mut self) {
        let rule = spawn_rule(self.spawn_elapsed, &self.config);
        if rule != self.rule {
            info!(
                "Difficulty raised: cap {} -> {}, delay {:?} -> {:?}",
                self.rule.max_enemies, rule.max_enemies, self.rule.spawn_delay, rule.spawn_delay
            );
            self.rule = rule;
            self.events.push(GameEvent::DifficultyRaised {
                max_enemies: rule.max_enemies,
                spawn_delay_ms: rule.spawn_delay.as_millis() as u64,
            });
        }
    }

    /// Hits the most recently spawned enemy within `radius` that passes `filter`.
    ///
    /// The enemy takes one point of damage and is removed if that kills it.
    pub fn check_attack_hit<F>(
        &mut self,
        point: WorldPoint,
        radius: f32,
        filter: F,
        multiplier: f32,
    ) -> AttackHit
    where
        F: Fn(&Enemy) -> bool,
    {
        for index in (0..self.enemies.len()).rev() {
            let enemy = &mut self.enemies[index];
            if !circle_contains(point, radius, enemy.position()) || !filter(&*enemy) {
                continue;
            }

            let id = enemy.id();
            let outcome = enemy.take_damage(1, multiplier);
            if outcome.destroyed {
                let removed = self.enemies.remove(index);
                self.events.push(GameEvent::EnemyDestroyed {
                    id,
                    enemy_type: removed.enemy_type(),
                    score: outcome.score,
                });
            }
            return AttackHit {
                hit: true,
                score: outcome.score,
                enemy: Some(id),
            };
        }

        AttackHit::default()
    }

    /// Damages every enemy within `radius` in one pass.
    ///
    /// Returns the summed kill score.
    ///
    /// # Examples
    ///
    /// ```
    /// use rand::SeedableRng;
    /// use std::sync::Arc;
    /// use tacojiman::{EnemyConfig, EnemyDirector, EnemyType, TerrainGrid, WorldPoint};
    ///
    /// let grid = Arc::new(TerrainGrid::parse(&["#~.", "#H.", "###"], 30).unwrap());
    /// let mut director = EnemyDirector::new(
    ///     grid,
    ///     EnemyConfig::default(),
    ///     25.0,
    ///     rand::rngs::StdRng::seed_from_u64(1),
    /// )
    /// .unwrap();
    /// director.spawn_at(EnemyType::Air, WorldPoint::new(0.0, 0.0));
    /// director.spawn_at(EnemyType::Air, WorldPoint::new(10.0, 0.0));
    /// assert_eq!(director.check_area_hit(WorldPoint::new(5.0, 0.0), 20.0, 2, 1.0), 6);
    /// assert_eq!(director.enemy_count(), 0);
    /// ```
    pub fn check_area_hit(
        &mut self,
        point: WorldPoint,
        radius: f32,
        damage: i32,
        multiplier: f32,
    ) -> u32 {
        let mut total = 0;
        for index in (0..self.enemies.len()).rev() {
            if !circle_contains(point, radius, self.enemies[index].position()) {
                continue;
            }
            let outcome = self.enemies[index].take_damage(damage, multiplier);
            if outcome.destroyed {
                let removed = self.enemies.remove(index);
                total += outcome.score;
                self.events.push(GameEvent::EnemyDestroyed {
                    id: removed.id(),
                    enemy_type: removed.enemy_type(),
                    score: outcome.score,
                });
            }
        }
        total
    }

    /// Nearest enemy within `radius` of `point`.
    pub fn get_enemy_at_position(&self, point: WorldPoint, radius: f32) -> Option<&Enemy> {
        self.enemies
            .iter()
            .map(|enemy| (enemy.position().distance(point), enemy))
            .filter(|(distance, _)| *distance <= radius)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, enemy)| enemy)
    }

    /// Every enemy within `radius` of `point`.
    pub fn enemies_in_area(&self, point: WorldPoint, radius: f32) -> Vec<&Enemy> {
        self.enemies
            .iter()
            .filter(|enemy| circle_contains(point, radius, enemy.position()))
            .collect()
    }

    /// Removes every enemy, returning the sum of their score values.
    pub fn clear_all_enemies(&mut self) -> u32 {
        let total = self.enemies.iter().map(Enemy::score_value).sum();
        for enemy in self.enemies.drain(..) {
            self.events.push(GameEvent::EnemyDespawned {
                id: enemy.id(),
                reason: DespawnReason::Cleared,
            });
        }
        total
    }

    /// Adds or replaces a decoy and retargets every enemy.
    pub fn add_decoy_target(&mut self, position: WorldPoint, range: f32, id: DecoyId) {
        self.decoys.retain(|decoy| decoy.id != id);
        self.decoys.push(DecoyTarget::new(id, position, range));
        self.retarget_all();
    }

    /// Removes a decoy; returns whether it existed.
    pub fn remove_decoy_target(&mut self, id: DecoyId) -> bool {
        let before = self.decoys.len();
        self.decoys.retain(|decoy| decoy.id != id);
        let removed = self.decoys.len() != before;
        if removed {
            self.retarget_all();
        }
        removed
    }

    pub fn clear_all_decoy_targets(&mut self) {
        self.decoys.clear();
        self.retarget_all();
    }

    fn retarget_all(&mut self) {
        for enemy in &mut self.enemies {
            enemy.retarget(&self.decoys);
        }
    }
}

fn type_weight(config: &EnemyConfig, enemy_type: EnemyType) -> f64 {
    let weights = &config.spawn_weights;
    match enemy_type {
        EnemyType::Ground => weights.ground,
        EnemyType::Water => weights.water,
        EnemyType::Air => weights.air,
        EnemyType::Underground => weights.underground,
    }
}

/// Own-terrain tiles connected to the house, limited to those nearest an edge.
fn edge_spawn_points(
    grid: &TerrainGrid,
    pathfinder: &TerrainPathfinder,
    enemy_type: EnemyType,
) -> Vec<TilePos> {
    let house = grid.player_house();
    let home_terrain = |panel_type: PanelType| match enemy_type {
        EnemyType::Ground => matches!(panel_type, PanelType::Path | PanelType::Rail),
        EnemyType::Water => panel_type == PanelType::Water,
        EnemyType::Air | EnemyType::Underground => false,
    };

    let reachable = pathfinder.reachable_from(grid, house, enemy_type);
    let mut candidates: Vec<TilePos> = reachable
        .into_iter()
        .filter(|&pos| pos != house)
        .filter(|&pos| grid.panel_type_at(pos).map_or(false, home_terrain))
        .collect();

    let Some(closest) = candidates.iter().map(|&pos| grid.edge_distance(pos)).min() else {
        return Vec::new();
    };
    candidates.retain(|&pos| grid.edge_distance(pos) == closest);
    candidates.sort();
    candidates
}

/// Rice field and path tiles in a Chebyshev band around the house.
fn near_house_points(grid: &TerrainGrid, min_radius: i32, max_radius: i32) -> Vec<TilePos> {
    let house = grid.player_house();
    let (low, high) = (min_radius.min(max_radius).max(0), min_radius.max(max_radius).max(0));
    grid.panels()
        .filter(|panel| matches!(panel.panel_type, PanelType::RiceField | PanelType::Path))
        .map(|panel| panel.position())
        .filter(|&pos| {
            let distance = pos.chebyshev_distance(house) as i32;
            distance >= low && distance <= high
        })
        .collect()
}
