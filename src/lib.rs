//! # Tacojiman
//!
//! Core simulation for a short-session arcade defense game: waves of tako
//! approach the player's house across a procedurally generated countryside,
//! the player taps them away, fires bomb jutsu, and faces a scripted boss.
//!
//! ## Architecture Overview
//!
//! The crate is presentation-free. Rendering, tweening and input gestures live
//! in whatever engine embeds it; the core only exposes the state and queries
//! those layers need.
//!
//! - **Generation**: ordered, constraint-based terrain generation
//! - **Terrain**: the immutable grid of typed panels shared by every agent
//! - **Pathfinding**: bounded A* with per-agent traversal rules
//! - **Agents**: regular enemies, their director, and the boss
//! - **Session**: a headless orchestrator wiring everything to a clock
//!
//! Cross-component signalling goes through typed [`GameEvent`]s delivered to
//! an injected [`GameEventListener`].

pub mod config;
pub mod game;
pub mod generation;
pub mod persistence;
pub mod utils;

// Core module re-exports
pub use config::*;
pub use game::*;
pub use generation::*;
pub use persistence::*;
pub use utils::*;


/// Core error type for the Tacojiman engine.
#[derive(thiserror::Error, Debug)]
pub enum TacoError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Configuration values cannot produce a playable session
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// A terrain-bound enemy type has no reachable spawn panel on this map
    #[error("No reachable spawn point for {0:?} enemies")]
    NoSpawnPoint(EnemyType),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}

/// Result type used throughout the Tacojiman codebase.
pub type TacoResult<T> = Result<T, TacoError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
