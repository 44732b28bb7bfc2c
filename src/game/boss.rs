//! # Boss
//!
//! The scripted giant tako.
//!
//! The boss drops in, then walks straight at the house while attacking on a
//! fixed interval. Its defence runs independently of that timeline: a barrier
//! soaks the leading hits, after which visual hit points fall at fixed
//! cumulative hit counts. Arriving at the house ends the game; losing the last
//! visual hit point defeats it for a fixed award.

use super::{DamageOutcome, GameEvent, WorldPoint};
use crate::config::BossConfig;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Defence phase of the boss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossPhase {
    /// Dropping in; hits already wear down the barrier
    Entrance,
    /// Hits only wear down the barrier
    Barrier,
    /// Hits count toward visual hit point loss
    Damage,
    Defeated,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Movement {
    Entrance { elapsed_ms: f32 },
    Approach { from: WorldPoint, elapsed_ms: f32 },
    Arrived,
    Halted,
}

/// The boss agent.
#[derive(Debug, Clone)]
pub struct Boss {
    config: BossConfig,
    phase: BossPhase,
    movement: Movement,
    position: WorldPoint,
    spawn: WorldPoint,
    home: WorldPoint,
    visual_hp: u32,
    current_hits: u32,
    has_barrier: bool,
    current_barrier_hits: u32,
    attack_elapsed_ms: f32,
    teardown_remaining_ms: Option<f32>,
    removed: bool,
    events: Vec<GameEvent>,
}

impl Boss {
    /// Creates a boss at `spawn` that will head for `home`.
    pub fn new(config: BossConfig, spawn: WorldPoint, home: WorldPoint) -> Self {
        info!("Boss appears at ({:.0}, {:.0})", spawn.x, spawn.y);
        Self {
            visual_hp: config.max_visual_hp,
            config,
            phase: BossPhase::Entrance,
            movement: Movement::Entrance { elapsed_ms: 0.0 },
            position: spawn,
            spawn,
            home,
            current_hits: 0,
            has_barrier: true,
            current_barrier_hits: 0,
            attack_elapsed_ms: 0.0,
            teardown_remaining_ms: None,
            removed: false,
            events: vec![GameEvent::BossSpawned],
        }
    }

    pub fn phase(&self) -> BossPhase {
        self.phase
    }

    pub fn position(&self) -> WorldPoint {
        self.position
    }

    pub fn visual_hp(&self) -> u32 {
        self.visual_hp
    }

    pub fn current_hits(&self) -> u32 {
        self.current_hits
    }

    pub fn has_barrier(&self) -> bool {
        self.has_barrier
    }

    pub fn current_barrier_hits(&self) -> u32 {
        self.current_barrier_hits
    }

    pub fn is_defeated(&self) -> bool {
        self.phase == BossPhase::Defeated
    }

    /// Whether the boss made it to the house.
    pub fn reached_home(&self) -> bool {
        self.movement == Movement::Arrived
    }

    /// Whether the boss is still on the field, teardown included.
    pub fn is_present(&self) -> bool {
        !self.removed
    }

    /// Drains events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Point where the entrance stops, short of the house on the vertical axis.
    fn entrance_target(&self) -> WorldPoint {
        WorldPoint::new(self.spawn.x, self.home.y - self.config.entrance_offset_px)
    }

    /// Cumulative hits at which the `lost`-th visual hit point goes.
    fn hp_loss_threshold(&self, lost: u32) -> u32 {
        let total = self.config.total_hits_required;
        let max = self.config.max_visual_hp.max(1);
        (lost * total).div_ceil(max)
    }

    /// Tap or blast collision test.
    pub fn check_collision(&self, point: WorldPoint, radius: f32) -> bool {
        !self.removed && !self.is_defeated() && self.position.distance(point) <= radius
    }

    /// Registers `amount` hits.
    ///
    /// Hits land from the moment the boss appears and are ignored after defeat.
    /// The defeat award is fixed, so `_multiplier` only keeps the call shaped
    /// like an enemy hit.
    ///
    /// # Examples
    ///
    /// ```
    /// use tacojiman::{Boss, BossConfig, WorldPoint};
    ///
    /// let mut boss = Boss::new(BossConfig::default(), WorldPoint::new(0.0, 0.0), WorldPoint::new(0.0, 300.0));
    /// boss.update(2.0);
    /// for _ in 0..10 {
    ///     boss.take_damage(1, 1.0);
    /// }
    /// assert!(!boss.has_barrier());
    /// assert_eq!(boss.visual_hp(), 2);
    /// ```
    pub fn take_damage(&mut self, amount: u32, _multiplier: f32) -> DamageOutcome {
        if self.phase == BossPhase::Defeated || self.removed {
            return DamageOutcome::default();
        }

        for _ in 0..amount {
            self.current_hits += 1;

            if self.has_barrier {
                self.current_barrier_hits += 1;
                if self.current_barrier_hits >= self.config.barrier_threshold {
                    self.has_barrier = false;
                    self.current_barrier_hits = 0;
                    if self.phase != BossPhase::Entrance {
                        self.phase = BossPhase::Damage;
                    }
                    debug!("Boss barrier broken at hit {}", self.current_hits);
                    self.events.push(GameEvent::BossBarrierBroken);
                }
                continue;
            }

            while self.visual_hp > 0 {
                let lost = self.config.max_visual_hp - self.visual_hp;
                if self.current_hits < self.hp_loss_threshold(lost + 1) {
                    break;
                }
                self.visual_hp -= 1;
                debug!(
                    "Boss lost a hit point at hit {} ({} left)",
                    self.current_hits, self.visual_hp
                );
                self.events.push(GameEvent::BossHpLost {
                    remaining: self.visual_hp,
                });
            }

            if self.visual_hp == 0 {
                return self.defeat();
            }
        }

        DamageOutcome::default()
    }

    fn defeat(&mut self) -> DamageOutcome {
        info!("Boss defeated after {} hits", self.current_hits);
        self.phase = BossPhase::Defeated;
        self.movement = Movement::Halted;
        self.teardown_remaining_ms = Some(self.config.teardown_ms as f32);
        let score = self.config.defeat_score;
        self.events.push(GameEvent::BossDefeated { score });
        DamageOutcome {
            destroyed: true,
            score,
        }
    }

    /// Advances the timeline by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        if self.removed {
            return;
        }
        let dt_ms = dt.max(0.0) * 1000.0;

        if let Some(remaining) = self.teardown_remaining_ms.as_mut() {
            *remaining -= dt_ms;
            if *remaining <= 0.0 {
                self.removed = true;
                debug!("Boss removed after teardown");
            }
            return;
        }

        match self.movement {
            Movement::Entrance { elapsed_ms } => {
                let elapsed_ms = elapsed_ms + dt_ms;
                let t = elapsed_ms / self.config.entrance_ms.max(1) as f32;
                self.position = self.spawn.lerp(self.entrance_target(), t);
                if t >= 1.0 {
                    self.phase = if self.has_barrier {
                        BossPhase::Barrier
                    } else {
                        BossPhase::Damage
                    };
                    self.movement = Movement::Approach {
                        from: self.position,
                        elapsed_ms: 0.0,
                    };
                } else {
                    self.movement = Movement::Entrance { elapsed_ms };
                }
            }
            Movement::Approach { from, elapsed_ms } => {
                let elapsed_ms = elapsed_ms + dt_ms;

                self.attack_elapsed_ms += dt_ms;
                let interval = self.config.attack_interval_ms.max(1) as f32;
                while self.attack_elapsed_ms >= interval {
                    self.attack_elapsed_ms -= interval;
                    self.events.push(GameEvent::BossAttack {
                        damage: self.config.attack_damage,
                    });
                }

                let t = elapsed_ms / self.config.approach_ms.max(1) as f32;
                self.position = from.lerp(self.home, t);
                if t >= 1.0 {
                    self.position = self.home;
                    info!("Boss reached the house");
                    self.movement = Movement::Arrived;
                    self.events.push(GameEvent::BossReachedHome);
                } else {
                    self.movement = Movement::Approach { from, elapsed_ms };
                }
            }
            Movement::Arrived | Movement::Halted => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engaged_boss() -> Boss {
        let mut boss = Boss::new(
            BossConfig::default(),
            WorldPoint::new(100.0, 0.0),
            WorldPoint::new(420.0, 420.0),
        );
        boss.update(2.0);
        assert_eq!(boss.phase(), BossPhase::Barrier);
        boss.drain_events();
        boss
    }

    #[test]
    fn test_entrance_stops_short_of_house() {
        let mut boss = Boss::new(
            BossConfig::default(),
            WorldPoint::new(100.0, 0.0),
            WorldPoint::new(420.0, 420.0),
        );
        assert_eq!(boss.drain_events(), vec![GameEvent::BossSpawned]);
        boss.update(1.0);
        assert_eq!(boss.phase(), BossPhase::Entrance);
        assert_eq!(boss.position().x, 100.0);

        boss.update(1.0);
        assert_eq!(boss.position(), WorldPoint::new(100.0, 370.0));
        assert_eq!(boss.phase(), BossPhase::Barrier);
    }

    #[test]
    fn test_hits_count_during_entrance() {
        let mut boss = Boss::new(BossConfig::default(), WorldPoint::default(), WorldPoint::new(0.0, 300.0));
        assert_eq!(boss.take_damage(5, 1.0), DamageOutcome::default());
        assert_eq!(boss.current_hits(), 5);
        assert_eq!(boss.current_barrier_hits(), 5);
        assert_eq!(boss.phase(), BossPhase::Entrance);

        boss.take_damage(5, 1.0);
        assert!(!boss.has_barrier());
        assert_eq!(boss.phase(), BossPhase::Entrance);

        boss.update(2.0);
        assert_eq!(boss.phase(), BossPhase::Damage);
    }

    #[test]
    fn test_defeat_during_entrance_halts_the_drop() {
        let mut boss = Boss::new(BossConfig::default(), WorldPoint::default(), WorldPoint::new(0.0, 300.0));
        boss.update(1.0);
        let outcome = boss.take_damage(42, 1.0);
        assert!(outcome.destroyed);
        assert!(boss.is_defeated());

        let at = boss.position();
        boss.update(0.5);
        assert_eq!(boss.position(), at);
        assert_eq!(boss.phase(), BossPhase::Defeated);
        boss.update(0.6);
        assert!(!boss.is_present());
    }

    #[test]
    fn test_barrier_then_hp_thresholds() {
        let mut boss = engaged_boss();

        for hit in 1..=10 {
            boss.take_damage(1, 1.0);
            assert_eq!(boss.visual_hp(), 2, "hit {}", hit);
        }
        assert!(!boss.has_barrier());
        assert_eq!(boss.phase(), BossPhase::Damage);

        for _ in 11..=20 {
            boss.take_damage(1, 1.0);
        }
        assert_eq!(boss.visual_hp(), 2);
        boss.take_damage(1, 1.0);
        assert_eq!(boss.current_hits(), 21);
        assert_eq!(boss.visual_hp(), 1);

        for _ in 22..=41 {
            assert!(!boss.take_damage(1, 1.0).destroyed);
        }
        assert_eq!(boss.visual_hp(), 1);
        let outcome = boss.take_damage(1, 3.0);
        assert_eq!(outcome, DamageOutcome { destroyed: true, score: 100 });
        assert_eq!(boss.visual_hp(), 0);
        assert_eq!(boss.current_hits(), 42);

        let events = boss.drain_events();
        assert_eq!(
            events,
            vec![
                GameEvent::BossBarrierBroken,
                GameEvent::BossHpLost { remaining: 1 },
                GameEvent::BossHpLost { remaining: 0 },
                GameEvent::BossDefeated { score: 100 },
            ]
        );
    }

    #[test]
    fn test_amount_counts_as_hits() {
        let mut boss = engaged_boss();
        boss.take_damage(21, 1.0);
        assert_eq!(boss.visual_hp(), 1);
        let outcome = boss.take_damage(50, 1.0);
        assert!(outcome.destroyed);
        assert_eq!(boss.current_hits(), 42);
        assert_eq!(boss.take_damage(1, 1.0), DamageOutcome::default());
    }

    #[test]
    fn test_periodic_attacks_during_approach() {
        let mut boss = engaged_boss();
        boss.update(1.0);
        let attacks = boss
            .drain_events()
            .into_iter()
            .filter(|event| matches!(event, GameEvent::BossAttack { damage: 5 }))
            .count();
        assert_eq!(attacks, 2);
    }

    #[test]
    fn test_reaches_home_after_approach() {
        let mut boss = engaged_boss();
        for _ in 0..80 {
            boss.update(0.1);
        }
        assert!(boss.reached_home());
        assert_eq!(boss.position(), WorldPoint::new(420.0, 420.0));
        assert!(boss.drain_events().contains(&GameEvent::BossReachedHome));

        // No further attacks once arrived
        boss.update(5.0);
        assert!(boss.drain_events().is_empty());
    }

    #[test]
    fn test_teardown_after_defeat() {
        let mut boss = engaged_boss();
        boss.take_damage(42, 1.0);
        assert!(boss.is_defeated());
        assert!(!boss.check_collision(boss.position(), 100.0));
        assert!(boss.is_present());

        boss.update(0.5);
        assert!(boss.is_present());
        boss.update(0.6);
        assert!(!boss.is_present());
    }

    #[test]
    fn test_collision_radius() {
        let boss = engaged_boss();
        let at = boss.position();
        assert!(boss.check_collision(WorldPoint::new(at.x + 40.0, at.y), 40.0));
        assert!(!boss.check_collision(WorldPoint::new(at.x + 41.0, at.y), 40.0));
    }
}
