use std::time::{Duration, Instant};

use hecs::World;
use log::debug;

use super::{Animation, Body, Facing, Motion, Position, mob, systems};
use crate::world::{Mobile, Serial, TileMap};

pub const SIM_FPS: u32 = 20;
pub const TIC: Duration = Duration::from_micros(1_000_000 / SIM_FPS as u64);
/// Longest backlog worked off in one pump; anything older is dropped.
const MAX_CATCH_UP: u32 = SIM_FPS;

/// Owns the ECS world and drives all simulation systems.
pub struct TicRunner {
    world: World,
    last: Instant,
    tics: u64,
}

impl Default for TicRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl TicRunner {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            last: Instant::now(),
            tics: 0,
        }
    }

    #[inline]
    pub fn world(&self) -> &hecs::World {
        &self.world
    }

    /// Tics run since construction.
    pub fn tics(&self) -> u64 {
        self.tics
    }

    #[inline]
    pub fn spawn_mobile(&mut self, mobile: &Mobile) -> hecs::Entity {
        mob::spawn_mobile(&mut self.world, mobile)
    }

    /// Advance enough tics to synchronise simulation with real time.
    pub fn pump(&mut self, map: &mut TileMap) -> u32 {
        self.catch_up(map, Instant::now())
    }

    /// Run every tic due by `now`, then publish mobiles to `map`.
    pub fn catch_up(&mut self, map: &mut TileMap, now: Instant) -> u32 {
        let mut ran = 0;
        while now.saturating_duration_since(self.last) >= TIC {
            if ran == MAX_CATCH_UP {
                debug!("sim fell behind, skipping {:?}", now - self.last);
                self.last = now;
                break;
            }
            self.tick(map);
            self.last += TIC;
            ran += 1;
        }
        if ran > 0 {
            systems::sync(&self.world, map);
        }
        ran
    }

    /// Run one fixed-rate tic.
    pub fn tick(&mut self, map: &TileMap) {
        systems::wander(&mut self.world, map);
        systems::movement(&mut self.world);
        systems::animation(&mut self.world);
        self.tics += 1;
    }

    /// Publish the current state without advancing it.
    pub fn sync(&self, map: &mut TileMap) {
        systems::sync(&self.world, map);
    }

    /// Renderable snapshot of the mobile with `serial`.
    pub fn mobile(&self, serial: Serial) -> Option<Mobile> {
        let mut query = self
            .world
            .query::<(&Position, &Facing, &Body, &Motion, &Animation)>();
        query
            .iter()
            .find(|(_, (_, _, body, _, _))| body.serial == serial)
            .map(|(_, (pos, facing, body, motion, anim))| mob::to_mobile(pos, facing, body, motion, anim))
    }
}
