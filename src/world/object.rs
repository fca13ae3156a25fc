use glam::Vec3;

use crate::world::texture::TextureId;

/// Network serial of an entity (mobiles, items, corpses).
pub type Serial = u32;

/// Integer tile position.  `z` is the altitude in content units
/// (one unit lifts a sprite by 4 screen pixels).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl TilePos {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// Eight compass facings, in the order the animation data is authored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    #[default]
    North = 0,
    Right = 1,
    East = 2,
    Down = 3,
    South = 4,
    Left = 5,
    West = 6,
    Up = 7,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::Right,
        Direction::East,
        Direction::Down,
        Direction::South,
        Direction::Left,
        Direction::West,
        Direction::Up,
    ];

    /// Tile step (dx, dy) for one move in this facing.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::Right => (1, -1),
            Direction::East => (1, 0),
            Direction::Down => (1, 1),
            Direction::South => (0, 1),
            Direction::Left => (-1, 1),
            Direction::West => (-1, 0),
            Direction::Up => (-1, -1),
        }
    }

    pub fn from_index(idx: u8) -> Self {
        Self::ALL[(idx & 7) as usize]
    }
}

/// Terrain cell.  Drawn flat with its land art, or stretched over the four
/// corner heights with a texmap texture.
#[derive(Clone, Debug, PartialEq)]
pub struct GroundTile {
    pub pos: TilePos,
    pub art_id: u16,
    pub ignored: bool,
    pub wet: bool,
    /// Texmap used when the tile is stretched; `None` = always flat.
    pub stretch_texture: Option<u16>,
    /// Height deltas relative to `pos.z` for (top, east, south, down).
    pub corner_deltas: [i32; 4],
}

#[derive(Clone, Debug, PartialEq)]
pub struct StaticItem {
    pub pos: TilePos,
    pub art_id: u16,
    pub hue: u16,
    pub ignored: bool,
}

/// Notoriety of a mobile, used for the selection highlight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Notoriety {
    #[default]
    Innocent,
    Ally,
    Attackable,
    Criminal,
    Enemy,
    Murderer,
    Invulnerable,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Mobile {
    pub pos: TilePos,
    pub serial: Serial,
    pub body: u16,
    pub hue: u16,
    pub facing: Direction,
    pub action: u8,
    /// Progress through the current action, `0.0 .. 1.0`.
    pub anim_progress: f32,
    /// Sub-tile offset while walking between tiles.
    pub offset: Vec3,
    pub notoriety: Notoriety,
}

impl Mobile {
    /// Frame to show out of an animation of `len` frames.
    pub fn frame_index(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let progress = self.anim_progress.clamp(0.0, 1.0);
        ((progress * len as f32) as usize).min(len - 1)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Corpse {
    pub pos: TilePos,
    pub serial: Serial,
    pub body: u16,
    pub hue: u16,
    pub facing: Direction,
    /// Fixed frame of the death animation.
    pub frame_index: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ItemEntity {
    pub pos: TilePos,
    pub serial: Serial,
    pub art_id: u16,
    pub hue: u16,
}

/// Overhead text with its own pre-rendered texture.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLabel {
    pub pos: TilePos,
    pub texture: TextureId,
    pub hue: u16,
    pub offset: Vec3,
}

/// Everything that can occupy a tile.
#[derive(Clone, Debug, PartialEq)]
pub enum WorldObject {
    Ground(GroundTile),
    Static(StaticItem),
    Mobile(Mobile),
    Corpse(Corpse),
    Item(ItemEntity),
    Text(TextLabel),
}

/// Field-less mirror of [`WorldObject`], handy for filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Ground,
    Static,
    Mobile,
    Corpse,
    Item,
    Text,
}

impl WorldObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            WorldObject::Ground(_) => ObjectKind::Ground,
            WorldObject::Static(_) => ObjectKind::Static,
            WorldObject::Mobile(_) => ObjectKind::Mobile,
            WorldObject::Corpse(_) => ObjectKind::Corpse,
            WorldObject::Item(_) => ObjectKind::Item,
            WorldObject::Text(_) => ObjectKind::Text,
        }
    }

    pub fn pos(&self) -> TilePos {
        match self {
            WorldObject::Ground(o) => o.pos,
            WorldObject::Static(o) => o.pos,
            WorldObject::Mobile(o) => o.pos,
            WorldObject::Corpse(o) => o.pos,
            WorldObject::Item(o) => o.pos,
            WorldObject::Text(o) => o.pos,
        }
    }

    #[inline]
    pub fn z(&self) -> i32 {
        self.pos().z
    }

    /// Raw 16-bit hue.  Ground tiles are never tinted.
    pub fn hue(&self) -> u16 {
        match self {
            WorldObject::Ground(_) => 0,
            WorldObject::Static(o) => o.hue,
            WorldObject::Mobile(o) => o.hue,
            WorldObject::Corpse(o) => o.hue,
            WorldObject::Item(o) => o.hue,
            WorldObject::Text(o) => o.hue,
        }
    }

    /// Serial for entity-backed objects.
    pub fn serial(&self) -> Option<Serial> {
        match self {
            WorldObject::Mobile(o) => Some(o.serial),
            WorldObject::Corpse(o) => Some(o.serial),
            WorldObject::Item(o) => Some(o.serial),
            _ => None,
        }
    }

    /// Only ground and static tiles carry the "ignored" flag.
    pub fn is_ignored(&self) -> bool {
        match self {
            WorldObject::Ground(o) => o.ignored,
            WorldObject::Static(o) => o.ignored,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mobile(progress: f32) -> Mobile {
        Mobile {
            pos: TilePos::new(0, 0, 0),
            serial: 1,
            body: 400,
            hue: 0,
            facing: Direction::South,
            action: 0,
            anim_progress: progress,
            offset: Vec3::ZERO,
            notoriety: Notoriety::Innocent,
        }
    }

    #[test]
    fn frame_index_stays_inside_animation() {
        assert_eq!(mobile(0.0).frame_index(5), 0);
        assert_eq!(mobile(0.5).frame_index(5), 2);
        assert_eq!(mobile(0.999).frame_index(5), 4);
        assert_eq!(mobile(1.0).frame_index(5), 4);
        assert_eq!(mobile(0.3).frame_index(0), 0);
    }

    #[test]
    fn ground_is_never_hued() {
        let g = WorldObject::Ground(GroundTile {
            pos: TilePos::new(1, 2, 3),
            art_id: 3,
            ignored: false,
            wet: false,
            stretch_texture: None,
            corner_deltas: [0; 4],
        });
        assert_eq!(g.hue(), 0);
        assert_eq!(g.kind(), ObjectKind::Ground);
        assert_eq!(g.z(), 3);
        assert_eq!(g.serial(), None);
    }

    #[test]
    fn direction_wraps_index() {
        assert_eq!(Direction::from_index(9), Direction::Right);
        assert_eq!(Direction::Down.delta(), (1, 1));
    }
}
