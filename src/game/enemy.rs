//! # Enemy Agents
//!
//! Regular tako: stats per type, the per-agent state machine, damage and
//! movement.
//!
//! Ground and water tako follow routes planned over the terrain grid and
//! self-destruct when no route exists. Air and underground tako fly or dig
//! straight at their target and never consult the pathfinder.

use super::{DespawnReason, EnemyId, TerrainGrid, TilePos, WorldPoint};
use crate::utils::TerrainPathfinder;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// The four kinds of regular tako.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyType {
    Ground,
    Water,
    Air,
    Underground,
}

impl EnemyType {
    pub const ALL: [EnemyType; 4] = [
        EnemyType::Ground,
        EnemyType::Water,
        EnemyType::Air,
        EnemyType::Underground,
    ];

    /// Base stats for this type.
    ///
    /// # Examples
    ///
    /// ```
    /// use tacojiman::EnemyType;
    ///
    /// let stats = EnemyType::Underground.stats();
    /// assert_eq!(stats.max_hp, 2);
    /// assert_eq!(stats.score_value, 4);
    /// ```
    pub fn stats(self) -> EnemyStats {
        match self {
            EnemyType::Ground => EnemyStats::new(2, 1.0, 1),
            EnemyType::Water => EnemyStats::new(2, 0.8, 2),
            EnemyType::Air => EnemyStats::new(2, 1.5, 3),
            EnemyType::Underground => EnemyStats::new(2, 0.5, 4),
        }
    }

    /// Whether this type moves along planned terrain routes.
    pub fn is_terrain_bound(self) -> bool {
        matches!(self, EnemyType::Ground | EnemyType::Water)
    }
}

/// Static stats of an enemy type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    pub max_hp: i32,
    /// Units per 100 ms
    pub speed: f32,
    pub score_value: u32,
}

impl EnemyStats {
    pub const fn new(max_hp: i32, speed: f32, score_value: u32) -> Self {
        Self {
            max_hp,
            speed,
            score_value,
        }
    }
}

/// Identifier of a decoy target.
pub type DecoyId = u64;

/// A temporary alternate target drawing enemies away from the house.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecoyTarget {
    pub id: DecoyId,
    pub position: WorldPoint,
    /// Enemies farther than this ignore the decoy
    pub range: f32,
}

impl DecoyTarget {
    pub fn new(id: DecoyId, position: WorldPoint, range: f32) -> Self {
        Self {
            id,
            position,
            range,
        }
    }
}

/// Lifecycle state of an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyState {
    Spawning,
    Moving,
    /// Took a non-lethal hit this tick
    Damaged,
    Destroyed,
    ReachedHome,
}

/// Result of a damage call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DamageOutcome {
    pub destroyed: bool,
    pub score: u32,
}

/// What an enemy did during one movement tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentStep {
    Moving,
    /// Parked on a decoy
    Idle,
    /// Arrived at the house; the penalty is the enemy's score value
    ReachedHome { penalty: u32 },
    /// No route to the target; the enemy is gone
    NoRoute,
    /// Already out of play
    Inactive,
}

/// Shared read-only inputs for moving enemies.
#[derive(Debug, Clone, Copy)]
pub struct MovementContext<'a> {
    pub grid: &'a TerrainGrid,
    pub pathfinder: &'a TerrainPathfinder,
    /// Pixels per second for a speed of 1.0
    pub speed_scale: f32,
    pub home_radius: f32,
}

/// Where an enemy is heading.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Destination {
    House,
    Decoy(DecoyId, WorldPoint),
}

/// A regular tako.
#[derive(Debug, Clone)]
pub struct Enemy {
    id: EnemyId,
    enemy_type: EnemyType,
    current_hp: i32,
    max_hp: i32,
    speed: f32,
    score_value: u32,
    position: WorldPoint,
    home: WorldPoint,
    destination: Destination,
    route: VecDeque<WorldPoint>,
    needs_route: bool,
    state: EnemyState,
    despawn_reason: Option<DespawnReason>,
}

impl Enemy {
    /// Creates an enemy in the `Spawning` state heading for `home`.
    ///
    /// No route is planned yet; see [`Enemy::spawn`].
    pub fn new(enemy_type: EnemyType, position: WorldPoint, home: WorldPoint) -> Self {
        let stats = enemy_type.stats();
        Self {
            id: super::new_enemy_id(),
            enemy_type,
            current_hp: stats.max_hp,
            max_hp: stats.max_hp,
            speed: stats.speed,
            score_value: stats.score_value,
            position,
            home,
            destination: Destination::House,
            route: VecDeque::new(),
            needs_route: true,
            state: EnemyState::Spawning,
            despawn_reason: None,
        }
    }

    /// Creates an enemy and plans its first route.
    ///
    /// A terrain-bound enemy with no route to the house comes back already
    /// destroyed with [`DespawnReason::NoRoute`].
    pub fn spawn(
        enemy_type: EnemyType,
        position: WorldPoint,
        grid: &TerrainGrid,
        pathfinder: &TerrainPathfinder,
    ) -> Self {
        let home = grid.tile_center(grid.player_house());
        let mut enemy = Self::new(enemy_type, position, home);
        if !enemy.plan_route(grid, pathfinder) {
            enemy.despawn(DespawnReason::NoRoute);
        }
        enemy
    }

    pub fn id(&self) -> EnemyId {
        self.id
    }

    pub fn enemy_type(&self) -> EnemyType {
        self.enemy_type
    }

    pub fn current_hp(&self) -> i32 {
        self.current_hp
    }

    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn score_value(&self) -> u32 {
        self.score_value
    }

    pub fn position(&self) -> WorldPoint {
        self.position
    }

    pub fn state(&self) -> EnemyState {
        self.state
    }

    pub fn despawn_reason(&self) -> Option<DespawnReason> {
        self.despawn_reason
    }

    /// Whether the enemy is still in play.
    pub fn is_alive(&self) -> bool {
        !matches!(self.state, EnemyState::Destroyed | EnemyState::ReachedHome)
    }

    /// Current movement target in world space.
    pub fn target(&self) -> WorldPoint {
        match self.destination {
            Destination::House => self.home,
            Destination::Decoy(_, position) => position,
        }
    }

    /// Decoy currently being chased, if any.
    pub fn decoy_id(&self) -> Option<DecoyId> {
        match self.destination {
            Destination::House => None,
            Destination::Decoy(id, _) => Some(id),
        }
    }

    /// Waypoints still ahead, nearest first.
    pub fn route(&self) -> impl Iterator<Item = &WorldPoint> {
        self.route.iter()
    }

    /// Whether the route will be recomputed on the next movement tick.
    pub fn needs_route(&self) -> bool {
        self.needs_route
    }

    /// Applies `amount` damage.
    ///
    /// On the killing hit the outcome carries `floor(score_value * multiplier)`.
    /// Hits on an enemy already out of play, or with a non-positive amount,
    /// change nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use tacojiman::{Enemy, EnemyType, WorldPoint};
    ///
    /// let mut enemy = Enemy::new(EnemyType::Underground, WorldPoint::new(0.0, 0.0), WorldPoint::new(100.0, 0.0));
    /// assert!(!enemy.take_damage(1, 2.5).destroyed);
    /// let outcome = enemy.take_damage(1, 2.5);
    /// assert!(outcome.destroyed);
    /// assert_eq!(outcome.score, 10);
    /// ```
    pub fn take_damage(&mut self, amount: i32, multiplier: f32) -> DamageOutcome {
        if !self.is_alive() || amount <= 0 {
            return DamageOutcome::default();
        }

        self.current_hp -= amount;
        if self.current_hp <= 0 {
            self.state = EnemyState::Destroyed;
            self.route.clear();
            DamageOutcome {
                destroyed: true,
                score: (self.score_value as f32 * multiplier.max(0.0)).floor() as u32,
            }
        } else {
            self.state = EnemyState::Damaged;
            DamageOutcome::default()
        }
    }

    /// Removes the enemy from play without a kill.
    pub fn despawn(&mut self, reason: DespawnReason) {
        if self.is_alive() {
            self.state = EnemyState::Destroyed;
            self.despawn_reason = Some(reason);
            self.route.clear();
        }
    }

    /// Picks the nearest decoy whose range covers this enemy, else the house.
    ///
    /// Ties go to the decoy listed first. A change of destination drops the
    /// current route. Returns whether the destination changed.
    pub fn retarget(&mut self, decoys: &[DecoyTarget]) -> bool {
        if !self.is_alive() {
            return false;
        }

        let mut nearest: Option<(f32, &DecoyTarget)> = None;
        for decoy in decoys {
            let distance = self.position.distance(decoy.position);
            if distance > decoy.range {
                continue;
            }
            if nearest.map_or(true, |(best, _)| distance < best) {
                nearest = Some((distance, decoy));
            }
        }

        let destination = match nearest {
            Some((_, decoy)) => Destination::Decoy(decoy.id, decoy.position),
            None => Destination::House,
        };
        if destination == self.destination {
            return false;
        }

        debug!(
            "Enemy {} retargeted from {:?} to {:?}",
            self.id, self.destination, destination
        );
        self.destination = destination;
        self.route.clear();
        self.needs_route = true;
        true
    }

    /// Replans the route to the current destination.
    ///
    /// Returns `false` when a terrain-bound enemy has no route.
    pub fn plan_route(&mut self, grid: &TerrainGrid, pathfinder: &TerrainPathfinder) -> bool {
        self.route.clear();
        self.needs_route = false;

        if !self.enemy_type.is_terrain_bound() {
            self.route.push_back(self.target());
            return true;
        }

        let start = grid.world_to_tile_clamped(self.position);
        let goal = match self.destination {
            Destination::House => Some(grid.player_house()),
            Destination::Decoy(_, position) => {
                nearest_reachable_tile(grid, pathfinder, start, position, self.enemy_type)
            }
        };
        let path = match goal {
            Some(goal) => pathfinder.find_path(grid, start, goal, self.enemy_type),
            None => Vec::new(),
        };
        if path.is_empty() {
            debug!(
                "No {:?} route from {:?} for enemy {}",
                self.enemy_type, start, self.id
            );
            return false;
        }

        self.route
            .extend(path.into_iter().map(|tile| grid.tile_center(tile)));
        true
    }

    /// Advances the enemy by `dt` seconds.
    pub fn update(&mut self, dt: f32, context: &MovementContext<'_>) -> AgentStep {
        if !self.is_alive() {
            return AgentStep::Inactive;
        }
        if matches!(self.state, EnemyState::Spawning | EnemyState::Damaged) {
            self.state = EnemyState::Moving;
        }

        if self.needs_route && !self.plan_route(context.grid, context.pathfinder) {
            self.despawn(DespawnReason::NoRoute);
            return AgentStep::NoRoute;
        }

        let mut budget = self.speed * context.speed_scale * dt.max(0.0);
        while budget > 0.0 {
            let Some(&waypoint) = self.route.front() else {
                break;
            };
            let distance = self.position.distance(waypoint);
            if distance <= budget {
                self.position = waypoint;
                budget -= distance;
                self.route.pop_front();
            } else {
                self.position = self.position.move_towards(waypoint, budget);
                budget = 0.0;
            }
        }

        match self.destination {
            Destination::House if self.position.distance(self.home) <= context.home_radius => {
                self.state = EnemyState::ReachedHome;
                self.route.clear();
                AgentStep::ReachedHome {
                    penalty: self.score_value,
                }
            }
            Destination::Decoy(..) if self.route.is_empty() => AgentStep::Idle,
            _ => AgentStep::Moving,
        }
    }
}

/// Tile closest to a world point among those reachable from `start`, ties
/// broken row-major.
fn nearest_reachable_tile(
    grid: &TerrainGrid,
    pathfinder: &TerrainPathfinder,
    start: TilePos,
    point: WorldPoint,
    enemy_type: EnemyType,
) -> Option<TilePos> {
    let reachable = pathfinder.reachable_from(grid, start, enemy_type);
    grid.panels()
        .map(|panel| panel.position())
        .filter(|pos| reachable.contains(pos))
        .fold(None, |best: Option<(f32, TilePos)>, pos| {
            let distance = grid.tile_center(pos).distance(point);
            match best {
                Some((best_distance, _)) if best_distance <= distance => best,
                _ => Some((distance, pos)),
            }
        })
        .map(|(_, pos)| pos)
}
