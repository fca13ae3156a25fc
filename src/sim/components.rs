use glam::Vec3;
use rand::{SeedableRng, rngs::SmallRng};

use crate::world::{Direction, Notoriety, Serial, TilePos};

/// Tile the mobile currently stands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position(pub TilePos);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Facing(pub Direction);

/// Fixed identity and looks of a mobile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Body {
    pub serial: Serial,
    pub body: u16,
    pub hue: u16,
    pub notoriety: Notoriety,
}

/// Step towards an adjacent tile; `None` while standing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Motion {
    pub target: Option<TilePos>,
    /// `0.0 .. 1.0` along the step.
    pub progress: f32,
}

impl Motion {
    /// Sub-tile offset from the current tile towards the target.
    pub fn offset(&self, from: TilePos) -> Vec3 {
        match self.target {
            Some(to) => {
                Vec3::new(
                    (to.x - from.x) as f32,
                    (to.y - from.y) as f32,
                    (to.z - from.z) as f32,
                ) * self.progress
            }
            None => Vec3::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    pub action: u8,
    pub progress: f32,
}

/// Random-walk brain: private generator plus tics left to idle.
#[derive(Debug, Clone)]
pub struct Wander {
    pub rng: SmallRng,
    pub pause: u32,
}

impl Wander {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            pause: 0,
        }
    }
}
