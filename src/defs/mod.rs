pub mod flags;

pub use self::flags::PickFlags;

use crate::world::Notoriety;

/// Looping walk cycle.
pub const ACTION_WALK: u8 = 0;
/// Idle pose.
pub const ACTION_STAND: u8 = 1;

/// Hue used to highlight a targeted mobile of the given notoriety.
pub fn notoriety_hue(notoriety: Notoriety) -> u16 {
    match notoriety {
        Notoriety::Innocent => 0x0059,
        Notoriety::Ally => 0x003F,
        Notoriety::Attackable | Notoriety::Criminal => 0x03B2,
        Notoriety::Enemy => 0x0090,
        Notoriety::Murderer => 0x0022,
        Notoriety::Invulnerable => 0x0035,
    }
}

/// Broad animation family of a body id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyClass {
    Monster,
    Animal,
    Human,
}

pub fn body_class(body: u16) -> BodyClass {
    match body {
        0..200 => BodyClass::Monster,
        200..400 => BodyClass::Animal,
        _ => BodyClass::Human,
    }
}

/// Action index of the death animation a corpse freezes on.
pub fn death_action(body: u16) -> u8 {
    match body_class(body) {
        BodyClass::Monster => 2,
        BodyClass::Animal => 8,
        BodyClass::Human => 21,
    }
}
