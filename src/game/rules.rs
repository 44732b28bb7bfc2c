//! # Game Rules
//!
//! Session clock, difficulty curve, bomb stock and score arithmetic.

use super::BombType;
use crate::config::{EnemyConfig, GameRulesConfig};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Converts a frame delta in seconds to a `Duration`, treating junk as zero.
pub fn tick_duration(dt: f32) -> Duration {
    if dt.is_finite() && dt > 0.0 {
        Duration::from_secs_f32(dt)
    } else {
        Duration::ZERO
    }
}

/// Milestones crossed while advancing the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    BossDue,
    BombRecovery,
    TimeUp,
}

/// Countdown for one session.
#[derive(Debug, Clone)]
pub struct GameClock {
    total_secs: u32,
    elapsed: Duration,
    boss_spawn_remaining: u32,
    boss_announced: bool,
    recovery_times: Vec<u32>,
    recoveries_done: Vec<u32>,
    time_up: bool,
}

impl GameClock {
    pub fn new(config: &GameRulesConfig) -> Self {
        Self {
            total_secs: config.total_duration_secs,
            elapsed: Duration::ZERO,
            boss_spawn_remaining: config.boss_spawn_time_remaining,
            boss_announced: false,
            recovery_times: config.bomb_recovery_times.clone(),
            recoveries_done: Vec::new(),
            time_up: false,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Whole seconds left, counted down once per elapsed second.
    pub fn remaining_secs(&self) -> u32 {
        let elapsed = self.elapsed.as_secs().min(u32::MAX as u64) as u32;
        self.total_secs.saturating_sub(elapsed)
    }

    pub fn is_finished(&self) -> bool {
        self.remaining_secs() == 0
    }

    /// Whether the boss should be on the field by now.
    pub fn boss_due(&self) -> bool {
        self.remaining_secs() <= self.boss_spawn_remaining
    }

    /// Advances the clock and reports every milestone crossed, in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use tacojiman::{ClockEvent, GameClock, GameRulesConfig};
    ///
    /// let mut clock = GameClock::new(&GameRulesConfig::default());
    /// assert!(clock.advance(Duration::from_secs(59)).is_empty());
    /// assert_eq!(clock.advance(Duration::from_secs(1)), vec![ClockEvent::BombRecovery]);
    /// assert_eq!(clock.advance(Duration::from_secs(10)), vec![ClockEvent::BossDue]);
    /// ```
    pub fn advance(&mut self, dt: Duration) -> Vec<ClockEvent> {
        let mut events = Vec::new();
        if self.time_up {
            return events;
        }
        self.elapsed += dt;
        let remaining = self.remaining_secs();

        for &time in &self.recovery_times {
            if remaining <= time && !self.recoveries_done.contains(&time) {
                self.recoveries_done.push(time);
                events.push(ClockEvent::BombRecovery);
            }
        }
        if !self.boss_announced && remaining <= self.boss_spawn_remaining && remaining > 0 {
            self.boss_announced = true;
            events.push(ClockEvent::BossDue);
        }
        if remaining == 0 {
            self.time_up = true;
            events.push(ClockEvent::TimeUp);
        }

        events
    }
}

/// Population cap and spawn interval in effect at some point in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnRule {
    pub max_enemies: usize,
    pub spawn_delay: Duration,
}

/// Difficulty curve after `elapsed` time of spawning.
///
/// Every full cycle multiplies the delay (down to its floor) and raises the
/// cap (up to its ceiling).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tacojiman::{spawn_rule, EnemyConfig};
///
/// let config = EnemyConfig::default();
/// let rule = spawn_rule(Duration::from_secs(31), &config);
/// assert_eq!(rule.max_enemies, 50);
/// assert_eq!(rule.spawn_delay, Duration::from_millis(320));
/// ```
pub fn spawn_rule(elapsed: Duration, config: &EnemyConfig) -> SpawnRule {
    let cycle = config.difficulty_cycle().as_secs_f64();
    let cycles = if cycle > 0.0 {
        (elapsed.as_secs_f64() / cycle).floor() as u32
    } else {
        0
    };

    let max_enemies = config
        .initial_max_count
        .saturating_add(config.increase_per_cycle.saturating_mul(cycles as usize))
        .min(config.absolute_max_count);
    let delay_ms = (config.initial_spawn_delay_ms as f64
        * config.spawn_rate_multiplier.powi(cycles.min(i32::MAX as u32) as i32))
    .round()
    .max(config.min_spawn_delay_ms as f64);

    SpawnRule {
        max_enemies,
        spawn_delay: Duration::from_millis(delay_ms as u64),
    }
}

/// `floor(base * zoom)`.
pub fn final_score(base: u32, zoom: f32) -> u32 {
    (base as f32 * zoom.max(0.0)).floor() as u32
}

/// Subtracts a penalty without going below zero.
pub fn subtract_score_safely(score: u32, penalty: u32) -> u32 {
    score.saturating_sub(penalty)
}

/// Ending reached for a final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Ending {
    Bad,
    Normal,
    Good,
    Special,
    True,
}

impl Ending {
    /// Title progress level this ending unlocks, on the `0..=10` progress scale.
    pub fn unlocks_title(self) -> u32 {
        match self {
            Ending::Bad => 1,
            Ending::Normal => 2,
            Ending::Good => 5,
            Ending::Special => 8,
            Ending::True => 10,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Ending::Bad => "Bad End",
            Ending::Normal => "Normal End",
            Ending::Good => "Good End",
            Ending::Special => "Special End",
            Ending::True => "True End",
        }
    }
}

/// Picks the ending tier for `score`.
pub fn ending_for(score: u32) -> Ending {
    match score {
        8001.. => Ending::True,
        5001..=8000 => Ending::Special,
        3001..=5000 => Ending::Good,
        1001..=3000 => Ending::Normal,
        _ => Ending::Bad,
    }
}

/// `M:SS` countdown text.
pub fn format_countdown(remaining_secs: u32) -> String {
    format!("{}:{:02}", remaining_secs / 60, remaining_secs % 60)
}

/// Bombs on hand and the type the next one will be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BombStock {
    stock: u32,
    max_stock: u32,
    current: Option<BombType>,
}

impl BombStock {
    pub fn new<R: Rng + ?Sized>(config: &GameRulesConfig, rng: &mut R) -> Self {
        let stock = config.initial_bomb_stock.min(config.max_bomb_stock);
        Self {
            stock,
            max_stock: config.max_bomb_stock,
            current: (stock > 0).then(|| BombType::random(rng)),
        }
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn current(&self) -> Option<BombType> {
        self.current
    }

    /// Spends a bomb, returning its type.
    pub fn take(&mut self) -> Option<BombType> {
        if self.stock == 0 {
            return None;
        }
        self.stock -= 1;
        let bomb = self.current;
        if self.stock == 0 {
            self.current = None;
        }
        bomb
    }

    /// Adds a bomb of a fresh random type unless the stock is full.
    pub fn recover<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<BombType> {
        if self.stock >= self.max_stock {
            return None;
        }
        self.stock += 1;
        let bomb = BombType::random(rng);
        self.current = Some(bomb);
        Some(bomb)
    }
}
