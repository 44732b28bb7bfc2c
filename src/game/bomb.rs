//! # Bomb Jutsu
//!
//! Static descriptors for the eight special abilities. Effect playback is up
//! to the embedding engine; the core only needs magnitude and extent.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The eight bomb jutsu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BombType {
    Proton,
    Muddy,
    Sentry,
    Muteki,
    Sol,
    Dainsleif,
    Jakuhou,
    Bunshin,
}

impl BombType {
    pub const ALL: [BombType; 8] = [
        BombType::Proton,
        BombType::Muddy,
        BombType::Sentry,
        BombType::Muteki,
        BombType::Sol,
        BombType::Dainsleif,
        BombType::Jakuhou,
        BombType::Bunshin,
    ];

    /// Damage, range and timing for this bomb.
    ///
    /// # Examples
    ///
    /// ```
    /// use tacojiman::BombType;
    ///
    /// let sentry = BombType::Sentry.descriptor();
    /// assert_eq!(sentry.damage, 1);
    /// assert_eq!(sentry.duration_ms, Some(5000));
    /// ```
    pub fn descriptor(self) -> BombDescriptor {
        let (damage, range, duration_ms) = match self {
            BombType::Proton => (1, 1000.0, None),
            BombType::Muddy => (1, 100.0, None),
            BombType::Sentry => (1, 150.0, Some(5000)),
            BombType::Muteki => (2, 60.0, None),
            BombType::Sol => (3, 150.0, None),
            BombType::Dainsleif => (2, 60.0, None),
            BombType::Jakuhou => (5, 200.0, None),
            BombType::Bunshin => (0, 120.0, Some(5000)),
        };
        BombDescriptor {
            bomb_type: self,
            damage,
            range,
            duration_ms,
        }
    }

    /// Whether the player aims this bomb; the rest go off around the house.
    pub fn is_targeted(self) -> bool {
        matches!(
            self,
            BombType::Proton | BombType::Muddy | BombType::Sentry | BombType::Dainsleif
        )
    }

    /// Whether this bomb places decoys instead of dealing damage.
    pub fn spawns_decoys(self) -> bool {
        self == BombType::Bunshin
    }

    /// Uniformly random bomb type.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> BombType {
        BombType::ALL[rng.gen_range(0..BombType::ALL.len())]
    }

    pub fn name(self) -> &'static str {
        match self {
            BombType::Proton => "proton",
            BombType::Muddy => "muddy",
            BombType::Sentry => "sentry",
            BombType::Muteki => "muteki",
            BombType::Sol => "sol",
            BombType::Dainsleif => "dainsleif",
            BombType::Jakuhou => "jakuhou",
            BombType::Bunshin => "bunshin",
        }
    }
}

impl fmt::Display for BombType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Read-only record describing one bomb.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BombDescriptor {
    pub bomb_type: BombType,
    pub damage: i32,
    /// Radius in pixels
    pub range: f32,
    /// Lifetime of lingering effects
    pub duration_ms: Option<u64>,
}

/// All eight descriptors in declaration order.
pub fn bomb_table() -> [BombDescriptor; 8] {
    BombType::ALL.map(BombType::descriptor)
}
