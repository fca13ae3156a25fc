use hecs::World;
use log::{trace, warn};
use rand::Rng;

use super::{Animation, Body, Facing, Motion, Position, Wander, mob};
use crate::defs::{ACTION_STAND, ACTION_WALK};
use crate::world::{Direction, ObjectKind, TileMap, TilePos, WorldObject, WorldStore};

/// Tics needed to cross one tile.
pub const STEP_TICS: u32 = 8;
/// Tics per full animation cycle.
pub const ANIM_TICS: u32 = 10;
/// Highest altitude change a single step may climb or drop.
pub const MAX_CLIMB: i32 = 8;
/// Statics this close above the ground block the tile.
pub const BLOCK_HEIGHT: i32 = 16;

const MIN_PAUSE: u32 = 10;
const PAUSE_SPREAD: u32 = 40;

/// Altitude a mobile would stand at on (x, y), or `None` if it cannot.
pub fn standing_height<S: WorldStore + ?Sized>(store: &S, x: i32, y: i32) -> Option<i32> {
    let objects = store.tile(x, y).sorted_objects();
    let ground = objects.iter().find_map(|o| match o {
        WorldObject::Ground(g) if !g.wet && !g.ignored => Some(g.pos.z),
        _ => None,
    })?;
    let blocked = objects.iter().any(|o| {
        matches!(o, WorldObject::Static(s)
            if !s.ignored && (ground..ground + BLOCK_HEIGHT).contains(&s.pos.z))
    });
    (!blocked).then_some(ground)
}

/* ── Wander system ────────────────────────────────────────────────── */
pub fn wander<S: WorldStore + ?Sized>(world: &mut World, store: &S) {
    for (_, (pos, facing, motion, brain)) in
        world.query_mut::<(&Position, &mut Facing, &mut Motion, &mut Wander)>()
    {
        if motion.target.is_some() {
            continue;
        }
        if brain.pause > 0 {
            brain.pause -= 1;
            continue;
        }

        let dir = Direction::from_index(brain.rng.random_range(0..8));
        brain.pause = MIN_PAUSE + brain.rng.random_range(0..PAUSE_SPREAD);
        facing.0 = dir;

        let (dx, dy) = dir.delta();
        let (x, y) = (pos.0.x + dx, pos.0.y + dy);
        match standing_height(store, x, y) {
            Some(z) if (z - pos.0.z).abs() <= MAX_CLIMB => {
                motion.target = Some(TilePos::new(x, y, z));
                motion.progress = 0.0;
            }
            _ => trace!("mobile at {:?} blocked towards {dir:?}", pos.0),
        }
    }
}

/* ── Movement system ──────────────────────────────────────────────── */
pub fn movement(world: &mut World) {
    for (_, (pos, motion)) in world.query_mut::<(&mut Position, &mut Motion)>() {
        let Some(to) = motion.target else {
            continue;
        };
        motion.progress += 1.0 / STEP_TICS as f32;
        if motion.progress >= 1.0 {
            pos.0 = to;
            *motion = Motion::default();
        }
    }
}

/* ── Animation system ─────────────────────────────────────────────── */
pub fn animation(world: &mut World) {
    for (_, (motion, anim)) in world.query_mut::<(&Motion, &mut Animation)>() {
        let action = if motion.target.is_some() {
            ACTION_WALK
        } else {
            ACTION_STAND
        };
        if anim.action != action {
            anim.action = action;
            anim.progress = 0.0;
        }
        anim.progress = (anim.progress + 1.0 / ANIM_TICS as f32).fract();
    }
}

/// Replace every mobile on the map with the current simulation state.
pub fn sync(world: &World, map: &mut TileMap) {
    map.remove_kind(ObjectKind::Mobile);
    let mut query = world.query::<(&Position, &Facing, &Body, &Motion, &Animation)>();
    for (_, (pos, facing, body, motion, anim)) in query.iter() {
        let mobile = mob::to_mobile(pos, facing, body, motion, anim);
        if let Err(e) = map.place(WorldObject::Mobile(mobile)) {
            warn!("dropping mobile {:#x}: {e}", body.serial);
        }
    }
}
