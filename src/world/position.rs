use glam::Vec3;

use crate::world::object::TilePos;

/// Where the viewer is centred: an integer tile plus a fractional
/// sub-tile offset used for smooth scrolling.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewerState {
    pub tile: TilePos,
    pub offset: Vec3,
}

impl ViewerState {
    pub fn new(tile: TilePos, offset: Vec3) -> Self {
        Self { tile, offset }
    }

    pub fn at(x: i32, y: i32, z: i32) -> Self {
        Self::new(TilePos::new(x, y, z), Vec3::ZERO)
    }

    /// Two viewer states share a window when their integer tile matches;
    /// the fractional offset only moves the screen origin.
    #[inline]
    pub fn same_tile(&self, other: &ViewerState) -> bool {
        self.tile == other.tile
    }
}
