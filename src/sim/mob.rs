use hecs::World;

use super::{Animation, Body, Facing, Motion, Position, Wander};
use crate::world::Mobile;

pub fn spawn_mobile(world: &mut World, mobile: &Mobile) -> hecs::Entity {
    world.spawn((
        Position(mobile.pos),
        Facing(mobile.facing),
        Body {
            serial: mobile.serial,
            body: mobile.body,
            hue: mobile.hue,
            notoriety: mobile.notoriety,
        },
        Motion::default(),
        Animation {
            action: mobile.action,
            progress: mobile.anim_progress,
        },
        Wander::new(0x9E37_79B9 ^ mobile.serial as u64),
    ))
}

/// Rebuild the renderable view of one entity.
pub fn to_mobile(pos: &Position, facing: &Facing, body: &Body, motion: &Motion, anim: &Animation) -> Mobile {
    Mobile {
        pos: pos.0,
        serial: body.serial,
        body: body.body,
        hue: body.hue,
        facing: facing.0,
        action: anim.action,
        anim_progress: anim.progress,
        offset: motion.offset(pos.0),
        notoriety: body.notoriety,
    }
}
