//! # Game Session
//!
//! Headless orchestrator for one round: generates the map, runs the clock,
//! drives the director and the boss, resolves taps and bombs, and keeps score.
//!
//! Every event raised by the director, the boss or the session itself is
//! delivered, in order, to the listener injected at construction.

use super::rules::{
    ending_for, final_score, subtract_score_safely, tick_duration, BombStock, ClockEvent, Ending,
    GameClock,
};
use super::{
    BombDescriptor, BombType, Boss, DecoyId, EnemyDirector, EnemyType, GameEvent,
    GameEventListener, PanelType, TerrainGrid, WorldPoint,
};
use crate::config::GameConfig;
use crate::generation::{generate_terrain, GenerationConfig};
use crate::persistence::ProgressStore;
use crate::utils::{clamp_to_world, point_on_circle};
use crate::TacoResult;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Distance from the house at which bunshin decoys appear.
const DECOY_DISTANCE_PX: f32 = 150.0;

/// Angles of the bunshin decoys around the house.
const DECOY_ANGLES: [f32; 2] = [PI * 2.0 / 3.0, PI * 4.0 / 3.0];

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionOutcome {
    TimeUp,
    BossDefeated,
    BossReachedHome,
}

/// What a tap did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapResult {
    /// Landed on an invulnerable panel, or the session is over
    Ignored,
    Attack { hit: bool, score: u32 },
    /// Tapped the house; carries the bomb fired, if any was in stock
    Bomb(Option<BombType>),
}

/// End-of-round report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub seed: u64,
    pub score: u32,
    pub ending: Ending,
    pub outcome: Option<SessionOutcome>,
    pub elapsed_secs: f32,
    pub enemies_destroyed: u32,
    pub enemies_reached_home: u32,
    pub bombs_used: u32,
    pub boss_spawned: bool,
    pub boss_defeated: bool,
    pub new_high_score: bool,
}

#[derive(Debug, Clone, Copy)]
struct ActiveDecoy {
    id: DecoyId,
    remaining: Duration,
}

/// One round of play.
pub struct GameSession {
    config: GameConfig,
    seed: u64,
    grid: Arc<TerrainGrid>,
    director: EnemyDirector,
    boss: Option<Boss>,
    clock: GameClock,
    bombs: BombStock,
    rng: StdRng,
    listener: Box<dyn GameEventListener>,
    score: u32,
    outcome: Option<SessionOutcome>,
    decoys: Vec<ActiveDecoy>,
    next_decoy_id: DecoyId,
    enemies_destroyed: u32,
    enemies_reached_home: u32,
    bombs_used: u32,
    boss_defeated: bool,
}

impl GameSession {
    /// Generates a map from `seed` and starts the round.
    ///
    /// # Examples
    ///
    /// ```
    /// use tacojiman::{GameConfig, GameSession, NullListener};
    ///
    /// let mut session = GameSession::new(GameConfig::default(), 7, Box::new(NullListener)).unwrap();
    /// assert_eq!(session.remaining_secs(), 180);
    /// session.tick(0.5);
    /// assert!(!session.is_over());
    /// ```
    pub fn new(
        config: GameConfig,
        seed: u64,
        listener: Box<dyn GameEventListener>,
    ) -> TacoResult<Self> {
        config.validate()?;

        let generation = GenerationConfig::from_map_config(&config.map, seed);
        let grid = Arc::new(generate_terrain(&generation)?);

        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
        let director = EnemyDirector::new(
            Arc::clone(&grid),
            config.enemy.clone(),
            config.attack.home_reach_radius,
            StdRng::seed_from_u64(rng.gen()),
        )?;
        let bombs = BombStock::new(&config.game, &mut rng);
        let clock = GameClock::new(&config.game);

        info!(
            "Session started: seed {}, {}x{} map, {} s on the clock",
            seed,
            grid.width(),
            grid.height(),
            config.game.total_duration_secs
        );

        let mut session = Self {
            config,
            seed,
            grid,
            director,
            boss: None,
            clock,
            bombs,
            rng,
            listener,
            score: 0,
            outcome: None,
            decoys: Vec::new(),
            next_decoy_id: 1,
            enemies_destroyed: 0,
            enemies_reached_home: 0,
            bombs_used: 0,
            boss_defeated: false,
        };
        session.director.start_spawning();
        session.flush_events();
        Ok(session)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn grid(&self) -> &Arc<TerrainGrid> {
        &self.grid
    }

    pub fn director(&self) -> &EnemyDirector {
        &self.director
    }

    pub fn boss(&self) -> Option<&Boss> {
        self.boss.as_ref()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn remaining_secs(&self) -> u32 {
        self.clock.remaining_secs()
    }

    pub fn bomb_stock(&self) -> &BombStock {
        &self.bombs
    }

    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// World-space centre of the player's house.
    pub fn house_point(&self) -> WorldPoint {
        self.grid.tile_center(self.grid.player_house())
    }

    /// Advances the round by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if self.is_over() {
            return;
        }
        let step = tick_duration(dt);

        for milestone in self.clock.advance(step) {
            match milestone {
                ClockEvent::BombRecovery => self.recover_bomb(),
                ClockEvent::BossDue => self.spawn_boss(),
                ClockEvent::TimeUp => self.end(SessionOutcome::TimeUp),
            }
        }

        if !self.is_over() {
            self.expire_decoys(step);
            let penalty = self.director.update(dt);
            self.score = subtract_score_safely(self.score, penalty);
            if let Some(boss) = self.boss.as_mut() {
                boss.update(dt);
            }
        }
        self.flush_events();

        let boss_gone = self.boss.as_ref().map_or(false, |boss| !boss.is_present());
        if self.boss_defeated && boss_gone {
            self.end(SessionOutcome::BossDefeated);
        }
    }

    /// Resolves a tap at `point` seen at camera zoom `zoom`.
    ///
    /// Tapping the house fires the stocked bomb. Anywhere else the nearest
    /// enemy under the finger and the boss may each take a hit, unless the
    /// tap or the target sits on an invulnerable panel.
    pub fn tap(&mut self, point: WorldPoint, zoom: f32) -> TapResult {
        if self.is_over() {
            return TapResult::Ignored;
        }
        if self.house_point().distance(point) < self.config.attack.house_click_radius {
            return TapResult::Bomb(self.activate_bomb(None));
        }
        if self.grid.is_invulnerable_at(point) {
            debug!("Tap at ({:.0}, {:.0}) landed on cover", point.x, point.y);
            return TapResult::Ignored;
        }

        let attack = &self.config.attack;
        let multiplier = zoom.clamp(attack.min_zoom, attack.max_zoom.max(attack.min_zoom));
        let grid = &self.grid;
        let hit = self.director.check_attack_hit(
            point,
            attack.normal_attack_radius,
            |enemy| !grid.is_invulnerable_at(enemy.position()),
            multiplier,
        );

        let mut any_hit = hit.hit;
        let mut score = hit.score;
        let boss_radius = attack.boss_attack_radius;
        let boss_exposed = self.boss.as_ref().map_or(false, |boss| {
            boss.check_collision(point, boss_radius) && !grid.is_invulnerable_at(boss.position())
        });
        if boss_exposed {
            any_hit = true;
            score += self.strike_boss(1, multiplier);
        }

        self.score = self.score.saturating_add(score);
        self.flush_events();
        if any_hit {
            self.listener.on_event(GameEvent::DamageDealt { point, score });
        }
        TapResult::Attack { hit: any_hit, score }
    }

    /// Fires the stocked bomb, aimed at `target` when the bomb is aimable.
    ///
    /// Returns the bomb used, or `None` with an empty stock.
    pub fn activate_bomb(&mut self, target: Option<WorldPoint>) -> Option<BombType> {
        if self.is_over() {
            return None;
        }
        let bomb = self.bombs.take()?;
        self.bombs_used += 1;
        let descriptor = bomb.descriptor();
        let house = self.house_point();
        info!("Bomb jutsu {} activated", bomb);

        if bomb.spawns_decoys() {
            self.place_decoys(house, &descriptor);
            return Some(bomb);
        }

        let center = if bomb.is_targeted() {
            target.unwrap_or(house)
        } else {
            house
        };
        let mut score = self
            .director
            .check_area_hit(center, descriptor.range, descriptor.damage, 1.0);
        let boss_in_blast = self
            .boss
            .as_ref()
            .map_or(false, |boss| boss.check_collision(center, descriptor.range));
        if boss_in_blast {
            score += self.strike_boss(descriptor.damage.max(0) as u32, 1.0);
        }

        self.score = self.score.saturating_add(score);
        self.flush_events();
        self.listener.on_event(GameEvent::DamageDealt {
            point: center,
            score,
        });
        Some(bomb)
    }

    /// Ends the round and folds the result into stored progress.
    pub fn finish(&mut self, store: &mut dyn ProgressStore) -> TacoResult<SessionSummary> {
        self.director.stop_spawning();
        let cleared = self.director.clear_all_enemies();
        self.director.clear_all_decoy_targets();
        self.decoys.clear();
        self.flush_events();
        debug!("Cleared enemies worth {} at session end", cleared);

        let ending = ending_for(self.score);
        let mut progress = store.load()?;
        let new_high_score = progress.record(self.score, ending.unlocks_title());
        store.save(&progress)?;

        info!(
            "Session finished with {} points ({}){}",
            self.score,
            ending.title(),
            if new_high_score { ", new high score" } else { "" }
        );
        Ok(SessionSummary {
            new_high_score,
            ..self.summary()
        })
    }

    /// Snapshot of the round so far.
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            seed: self.seed,
            score: self.score,
            ending: ending_for(self.score),
            outcome: self.outcome,
            elapsed_secs: self.clock.elapsed().as_secs_f32(),
            enemies_destroyed: self.enemies_destroyed,
            enemies_reached_home: self.enemies_reached_home,
            bombs_used: self.bombs_used,
            boss_spawned: self.boss.is_some(),
            boss_defeated: self.boss_defeated,
            new_high_score: false,
        }
    }

    fn end(&mut self, outcome: SessionOutcome) {
        if self.outcome.is_some() {
            return;
        }
        info!(
            "Session over ({:?}) with {} s left and {} points",
            outcome,
            self.clock.remaining_secs(),
            self.score
        );
        self.outcome = Some(outcome);
        self.director.stop_spawning();
    }

    fn recover_bomb(&mut self) {
        if let Some(bomb) = self.bombs.recover(&mut self.rng) {
            info!("Bomb stock recovered: {}", bomb);
            self.listener.on_event(GameEvent::BombRecovered { bomb });
        }
    }

    fn spawn_boss(&mut self) {
        if self.boss.is_some() {
            return;
        }
        self.director.stop_spawning();
        let spawn = self.boss_spawn_point();
        self.boss = Some(Boss::new(self.config.boss.clone(), spawn, self.house_point()));
    }

    /// A random path panel on the map edge, else any ground spawn point.
    fn boss_spawn_point(&mut self) -> WorldPoint {
        let grid = &self.grid;
        let edge_paths: Vec<_> = grid
            .positions_of(PanelType::Path)
            .into_iter()
            .filter(|&pos| grid.is_boundary(pos))
            .collect();
        let tile = edge_paths
            .choose(&mut self.rng)
            .or_else(|| self.director.spawn_points(EnemyType::Ground).first())
            .copied();
        match tile {
            Some(tile) => grid.tile_center(tile),
            None => WorldPoint::new(self.house_point().x, 0.0),
        }
    }

    fn strike_boss(&mut self, hits: u32, multiplier: f32) -> u32 {
        match self.boss.as_mut() {
            Some(boss) => boss.take_damage(hits, multiplier).score,
            None => 0,
        }
    }

    fn place_decoys(&mut self, house: WorldPoint, descriptor: &BombDescriptor) {
        let (width, height) = self.grid.world_size();
        let lifetime = Duration::from_millis(descriptor.duration_ms.unwrap_or(0));
        for angle in DECOY_ANGLES {
            let id = self.next_decoy_id;
            self.next_decoy_id += 1;
            let position = clamp_to_world(
                point_on_circle(house, DECOY_DISTANCE_PX, angle),
                width,
                height,
            );
            self.director.add_decoy_target(position, descriptor.range, id);
            self.decoys.push(ActiveDecoy {
                id,
                remaining: lifetime,
            });
        }
    }

    fn expire_decoys(&mut self, step: Duration) {
        let mut expired = Vec::new();
        self.decoys.retain_mut(|decoy| {
            decoy.remaining = decoy.remaining.saturating_sub(step);
            if decoy.remaining.is_zero() {
                expired.push(decoy.id);
                false
            } else {
                true
            }
        });
        for id in expired {
            self.director.remove_decoy_target(id);
        }
    }

    fn flush_events(&mut self) {
        let mut events = self.director.drain_events();
        if let Some(boss) = self.boss.as_mut() {
            events.extend(boss.drain_events());
        }

        for event in events {
            match &event {
                GameEvent::EnemyDestroyed { .. } => self.enemies_destroyed += 1,
                GameEvent::EnemyReachedHome { .. } => self.enemies_reached_home += 1,
                GameEvent::BossAttack { damage } => {
                    self.score = subtract_score_safely(self.score, *damage);
                }
                GameEvent::BossDefeated { .. } => self.boss_defeated = true,
                GameEvent::BossReachedHome => self.end(SessionOutcome::BossReachedHome),
                _ => {}
            }
            self.listener.on_event(event);
        }
    }
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("seed", &self.seed)
            .field("score", &self.score)
            .field("remaining_secs", &self.clock.remaining_secs())
            .field("enemies", &self.director.enemy_count())
            .field("boss", &self.boss.as_ref().map(Boss::phase))
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

/// Score a kill of `enemy_type` would award at `zoom`.
pub fn kill_score(enemy_type: EnemyType, zoom: f32) -> u32 {
    final_score(enemy_type.stats().score_value, zoom)
}
