//! Fixed isometric projection and the per-variant quad builders.
//!
//! All constants are in the content's native scale: a tile is a 44×44
//! diamond and one unit of altitude lifts a sprite by 4 pixels.

use glam::{IVec2, Vec2, Vec3, vec2, vec3};

use crate::{
    engine::{hue::Hue, types::Screen},
    renderer::{Quad, Vertex},
    world::ViewerState,
};

pub const TILE_SIZE: f32 = 44.0;
pub const TILE_HALF: f32 = 22.0;
/// Screen pixels per unit of altitude.
pub const Z_STEP: i32 = 4;

/// Stretched ground samples the texmap slightly inside its border.
pub const UV_MIN: f32 = 0.01;
pub const UV_MAX: f32 = 0.99;

/// Screen run of one diamond edge, used as the horizontal leg of a slope.
const NORMAL_RUN: f32 = TILE_HALF;

const FLAT_NORMAL: Vec3 = Vec3::Z;
const SPRITE_UV: [Vec2; 4] = [vec2(0.0, 0.0), vec2(1.0, 0.0), vec2(0.0, 1.0), vec2(1.0, 1.0)];
const STRETCH_UV: [Vec2; 4] = [
    vec2(UV_MIN, UV_MIN),
    vec2(UV_MAX, UV_MIN),
    vec2(UV_MIN, UV_MAX),
    vec2(UV_MAX, UV_MAX),
];

/// Offset from the viewer's own sub-tile position, truncated to whole pixels
/// so sprites never land between pixels.
#[inline]
fn sub_tile_shift(offset: Vec3) -> Vec2 {
    vec2(
        ((offset.x - offset.y) * TILE_HALF).trunc(),
        ((offset.x + offset.y) * TILE_HALF).trunc(),
    )
}

/// Screen position of the window's local tile (0, 0), centred on the
/// back-buffer and shifted by the viewer's fractional offset.
pub fn screen_offset(screen: Screen, window_size: i32, viewer: &ViewerState) -> Vec2 {
    let mut x = (screen.w / 2) as f32 - TILE_HALF;
    let mut y = (screen.h / 2) as f32 - ((window_size * TILE_SIZE as i32) / 2) as f32;
    y += (viewer.tile.z as f32 + viewer.offset.z) * Z_STEP as f32;
    let shift = sub_tile_shift(viewer.offset);
    x -= shift.x;
    y -= shift.y;
    vec2(x, y)
}

/// Top-left of the tile at local grid coordinates (x, y).
#[inline]
pub fn tile_origin(x: i32, y: i32, offset: Vec2) -> Vec2 {
    vec2(
        (x - y) as f32 * TILE_HALF + offset.x,
        (x + y) as f32 * TILE_HALF + offset.y,
    )
}

#[inline]
fn lift(z: i32) -> f32 {
    (z * Z_STEP) as f32
}

/// 44×44 land art at the tile's own height.
pub fn flat_ground(origin: Vec2, z: i32, depth: f32) -> Quad {
    let top = origin.y - lift(z);
    let corners = [
        vec3(origin.x, top, depth),
        vec3(origin.x + TILE_SIZE, top, depth),
        vec3(origin.x, top + TILE_SIZE, depth),
        vec3(origin.x + TILE_SIZE, top + TILE_SIZE, depth),
    ];
    build(corners, [FLAT_NORMAL; 4], SPRITE_UV, Hue::NONE)
}

/// Diamond without any lift: top, right, left, bottom.
pub fn diamond(origin: Vec2) -> [Vec2; 4] {
    [
        vec2(origin.x + TILE_HALF, origin.y),
        vec2(origin.x + TILE_SIZE, origin.y + TILE_HALF),
        vec2(origin.x, origin.y + TILE_HALF),
        vec2(origin.x + TILE_HALF, origin.y + TILE_SIZE),
    ]
}

/// Per-corner normals from the height slopes of the two diamond edges that
/// meet at each corner.  Level ground gives straight-up normals.
pub fn ground_normals(deltas: [i32; 4]) -> [Vec3; 4] {
    let h = deltas.map(|d| (d * Z_STEP) as f32);
    // x runs top→right and left→bottom, y runs top→left and right→bottom
    let slopes = [
        (h[1] - h[0], h[2] - h[0]),
        (h[1] - h[0], h[3] - h[1]),
        (h[3] - h[2], h[2] - h[0]),
        (h[3] - h[2], h[3] - h[1]),
    ];
    slopes.map(|(gx, gy)| {
        if gx == 0.0 && gy == 0.0 {
            FLAT_NORMAL
        } else {
            vec3(-gx, -gy, NORMAL_RUN).normalize()
        }
    })
}

/// Texmap stretched over the four corner heights.
pub fn stretched_ground(origin: Vec2, z: i32, deltas: [i32; 4], depth: f32) -> Quad {
    let base = diamond(origin);
    let corners = std::array::from_fn(|i| vec3(base[i].x, base[i].y - lift(z + deltas[i]), depth));
    build(corners, ground_normals(deltas), STRETCH_UV, Hue::NONE)
}

/// Statics and items: bottom-centre of the art on the tile point.
pub fn static_anchor(w: i32, h: i32, z: i32) -> Vec2 {
    vec2(
        ((w >> 1) - TILE_HALF as i32) as f32,
        (z * Z_STEP + h - TILE_SIZE as i32) as f32,
    )
}

/// Animation frames: authored centre, altitude and walking offset.
pub fn frame_anchor(center: IVec2, h: i32, z: i32, offset: Vec3) -> Vec2 {
    let shift = sub_tile_shift(offset);
    vec2(
        (center.x - TILE_HALF as i32) as f32 - shift.x,
        (center.y + z * Z_STEP + h - TILE_HALF as i32) as f32 - shift.y,
    )
}

/// Overhead labels: like statics, plus their own sub-tile offset.
pub fn label_anchor(w: i32, h: i32, z: i32, offset: Vec3) -> Vec2 {
    static_anchor(w, h, z) - sub_tile_shift(offset)
}

/// Axis-aligned sprite quad hanging from `anchor` pixels left/up of `origin`.
pub fn sprite_quad(origin: Vec2, anchor: Vec2, w: i32, h: i32, depth: f32, hue: Hue) -> Quad {
    let left = origin.x - anchor.x;
    let top = origin.y - anchor.y;
    let (w, h) = (w as f32, h as f32);
    let corners = [
        vec3(left, top, depth),
        vec3(left + w, top, depth),
        vec3(left, top + h, depth),
        vec3(left + w, top + h, depth),
    ];
    build(corners, [FLAT_NORMAL; 4], SPRITE_UV, hue)
}

fn build(corners: [Vec3; 4], normals: [Vec3; 4], uv: [Vec2; 4], hue: Hue) -> Quad {
    let hue = hue.to_vec2();
    std::array::from_fn(|i| Vertex::new(corners[i], normals[i], uv[i], hue))
}

/// Corner positions of a quad.
#[inline]
pub fn positions(quad: &Quad) -> [Vec3; 4] {
    quad.map(|v| v.position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::TilePos;

    #[test]
    fn tile_origin_is_isometric() {
        let o = Vec2::new(100.0, 50.0);
        assert_eq!(tile_origin(0, 0, o), o);
        assert_eq!(tile_origin(1, 0, o), Vec2::new(122.0, 72.0));
        assert_eq!(tile_origin(0, 1, o), Vec2::new(78.0, 72.0));
        assert_eq!(tile_origin(1, 1, o), Vec2::new(100.0, 94.0));
    }

    #[test]
    fn screen_offset_centres_window() {
        let screen = Screen::new(200, 200);
        let v = ViewerState::at(10, 10, 0);
        assert_eq!(screen_offset(screen, 1, &v), Vec2::new(78.0, 78.0));
        // altitude pushes the world down so the viewer stays centred
        let v = ViewerState::at(10, 10, 5);
        assert_eq!(screen_offset(screen, 1, &v), Vec2::new(78.0, 98.0));
    }

    #[test]
    fn sub_tile_offset_scrolls_smoothly() {
        let screen = Screen::new(200, 200);
        let v = ViewerState::new(TilePos::new(0, 0, 0), Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(screen_offset(screen, 1, &v), Vec2::new(67.0, 67.0));
    }

    #[test]
    fn flat_ground_lifts_by_altitude() {
        let q = flat_ground(Vec2::new(10.0, 20.0), 3, 7.0);
        assert_eq!(q[0].position, Vec3::new(10.0, 8.0, 7.0));
        assert_eq!(q[3].position, Vec3::new(54.0, 52.0, 7.0));
        assert_eq!(q[0].hue, Vec2::ZERO);
    }

    #[test]
    fn level_stretched_ground_matches_flat_lift() {
        let origin = Vec2::new(40.0, 60.0);
        for z in [-8, 0, 5] {
            let flat = flat_ground(origin, z, 0.0);
            let flat_lift = origin.y - flat[0].position.y;
            let stretched = stretched_ground(origin, z, [0, 0, 0, 0], 0.0);
            let base = diamond(origin);
            for i in 0..4 {
                assert_eq!(base[i].y - stretched[i].position.y, flat_lift);
                assert_eq!(stretched[i].normal, Vec3::Z);
            }
        }
    }

    #[test]
    fn stretched_corners_follow_deltas() {
        let q = stretched_ground(Vec2::ZERO, 0, [0, 2, -1, 0], 0.0);
        assert_eq!(q[1].position.y, TILE_HALF - 8.0);
        assert_eq!(q[2].position.y, TILE_HALF + 4.0);
        assert_eq!(q[0].uv, Vec2::new(UV_MIN, UV_MIN));
    }

    #[test]
    fn sloped_ground_bows_normals() {
        let n = ground_normals([0, 4, 0, 4]);
        for v in n {
            assert!((v.length() - 1.0).abs() < 1e-5);
            assert!(v.x < 0.0);
        }
        assert_ne!(ground_normals([0, 4, 0, 0])[0], ground_normals([0, 4, 0, 0])[3]);
    }

    #[test]
    fn static_anchor_sits_on_tile_point() {
        // 44 wide, 44 tall static at z 0 covers exactly the tile cell
        let anchor = static_anchor(44, 44, 0);
        let q = sprite_quad(Vec2::new(100.0, 100.0), anchor, 44, 44, 0.0, Hue::NONE);
        assert_eq!(q[0].position.truncate(), Vec2::new(100.0, 100.0));
        assert_eq!(q[3].position.truncate(), Vec2::new(144.0, 144.0));
        let tall = static_anchor(44, 60, 0);
        assert_eq!(tall, Vec2::new(0.0, 16.0));
    }

    #[test]
    fn frame_anchor_applies_walk_offset() {
        let still = frame_anchor(IVec2::new(20, 5), 60, 0, Vec3::ZERO);
        assert_eq!(still, Vec2::new(-2.0, 43.0));
        let moving = frame_anchor(IVec2::new(20, 5), 60, 0, Vec3::new(0.5, 0.5, 0.0));
        assert_eq!(moving, Vec2::new(-2.0, 21.0));
    }

    #[test]
    fn label_anchor_matches_static_when_still() {
        assert_eq!(label_anchor(30, 12, 2, Vec3::ZERO), static_anchor(30, 12, 2));
    }
}
