use crate::world::{TilePos, ViewerState, WorldStore};

/// Roof altitude when the viewer is outdoors; above any authored content.
pub const OPEN_SKY: i32 = 255;

/// Square range of tiles walked this frame plus the indoor clip height.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewportWindow {
    pub origin_x: i32,
    pub origin_y: i32,
    pub size: i32,
    /// Objects at or above this altitude are hidden.
    pub max_roof_altitude: i32,
}

/// World tile of the window's local (0, 0).
#[inline]
pub fn compute_window(center: TilePos, half_extent: i32) -> (i32, i32) {
    (center.x - half_extent, center.y - half_extent)
}

/// Clip altitude for a viewer at `center`.
pub fn compute_roof_clip<S: WorldStore + ?Sized>(
    store: &S,
    center: TilePos,
    clearance: i32,
) -> i32 {
    if store.tile(center.x, center.y).is_under_roof(center.z, clearance) {
        center.z + clearance
    } else {
        OPEN_SKY
    }
}

impl ViewportWindow {
    pub fn compute<S: WorldStore + ?Sized>(
        store: &S,
        center: &ViewerState,
        size: i32,
        clearance: i32,
    ) -> Self {
        let (origin_x, origin_y) = compute_window(center.tile, size / 2);
        Self {
            origin_x,
            origin_y,
            size,
            max_roof_altitude: compute_roof_clip(store, center.tile, clearance),
        }
    }

    /// Exclusive at the top: `z == max_roof_altitude` is already hidden.
    #[inline]
    pub fn is_clipped(&self, z: i32) -> bool {
        z >= self.max_roof_altitude
    }

    /// Local grid coordinates in traversal order: `ix` outer, `iy` inner.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + use<> {
        let n = self.size.max(0);
        (0..n).flat_map(move |ix| (0..n).map(move |iy| (ix, iy)))
    }

    #[inline]
    pub fn world_tile(&self, ix: i32, iy: i32) -> (i32, i32) {
        (ix + self.origin_x, iy + self.origin_y)
    }
}
