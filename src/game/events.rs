//! # Game Events
//!
//! Typed lifecycle notifications emitted by the director, the boss and the
//! session. Listeners are injected at construction.

use super::{EnemyId, EnemyType, WorldPoint};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Sender;

/// Why an enemy left play without being killed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DespawnReason {
    /// No route to its target existed
    NoRoute,
    /// Removed in bulk at session teardown
    Cleared,
}

/// Something the orchestrator may want to react to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EnemySpawned {
        id: EnemyId,
        enemy_type: EnemyType,
        position: WorldPoint,
    },
    EnemyDestroyed {
        id: EnemyId,
        enemy_type: EnemyType,
        score: u32,
    },
    EnemyDespawned {
        id: EnemyId,
        reason: DespawnReason,
    },
    /// An enemy got through; `score_value` is the penalty
    EnemyReachedHome {
        id: EnemyId,
        score_value: u32,
    },
    DamageDealt {
        point: WorldPoint,
        score: u32,
    },
    BossSpawned,
    BossBarrierBroken,
    BossHpLost {
        remaining: u32,
    },
    BossAttack {
        damage: u32,
    },
    BossReachedHome,
    BossDefeated {
        score: u32,
    },
    DifficultyRaised {
        max_enemies: usize,
        spawn_delay_ms: u64,
    },
    BombRecovered {
        bomb: super::BombType,
    },
}

/// Receives game events.
pub trait GameEventListener {
    fn on_event(&mut self, event: GameEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullListener;

impl GameEventListener for NullListener {
    fn on_event(&mut self, _event: GameEvent) {}
}

impl GameEventListener for Sender<GameEvent> {
    fn on_event(&mut self, event: GameEvent) {
        // A dropped receiver just means nobody is listening any more
        let _ = self.send(event);
    }
}

impl GameEventListener for Vec<GameEvent> {
    fn on_event(&mut self, event: GameEvent) {
        self.push(event);
    }
}
