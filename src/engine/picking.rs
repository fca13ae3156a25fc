//! Mouse-over candidates collected during the traversal.
//!
//! Candidates are only ever appended, so insertion order *is* draw order:
//! the last candidate containing the cursor is the one painted on top.

use glam::{Vec2, Vec3};
use smallvec::SmallVec;

use crate::world::{ObjectKind, TextureBank, TextureId, WorldObject};

/// An object whose quad contained the cursor this frame.
#[derive(Clone, Debug, PartialEq)]
pub struct MouseOverItem {
    pub texture: TextureId,
    /// First corner of the drawn quad.
    pub anchor: Vec3,
    pub vertices: [Vec3; 4],
    pub object: WorldObject,
    /// Draw cursor value the object was submitted with.
    pub depth: u32,
}

impl MouseOverItem {
    pub fn new(texture: TextureId, vertices: [Vec3; 4], object: WorldObject, depth: u32) -> Self {
        Self {
            texture,
            anchor: vertices[0],
            vertices,
            object,
            depth,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MouseOverList {
    items: SmallVec<[MouseOverItem; 8]>,
}

impl MouseOverList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn push(&mut self, item: MouseOverItem) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MouseOverItem> {
        self.items.iter()
    }

    /// Highest-depth candidate of any kind.
    pub fn foremost(&self) -> Option<&MouseOverItem> {
        self.items.last()
    }

    /// Highest-depth candidate of one kind.
    pub fn foremost_of(&self, kind: ObjectKind) -> Option<&MouseOverItem> {
        self.items.iter().rev().find(|i| i.object.kind() == kind)
    }
}

/// Picking result of one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FramePick {
    pub object: Option<MouseOverItem>,
    pub ground: Option<MouseOverItem>,
}

impl FramePick {
    pub fn resolve(list: &MouseOverList) -> Self {
        Self {
            object: list.foremost().cloned(),
            ground: list.foremost_of(ObjectKind::Ground).cloned(),
        }
    }
}

/// Inclusive axis-aligned test between two opposite corners.
#[inline]
pub fn point_in_rect(top_left: Vec3, bottom_right: Vec3, p: Vec2) -> bool {
    p.x >= top_left.x && p.x <= bottom_right.x && p.y >= top_left.y && p.y <= bottom_right.y
}

#[inline]
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b - a).perp_dot(p - a)
}

/// Inclusive point-in-triangle, independent of winding.
pub fn point_in_triangle(a: Vec2, b: Vec2, c: Vec2, p: Vec2) -> bool {
    let d0 = edge(a, b, p);
    let d1 = edge(b, c, p);
    let d2 = edge(c, a, p);
    let has_neg = d0 < 0.0 || d1 < 0.0 || d2 < 0.0;
    let has_pos = d0 > 0.0 || d1 > 0.0 || d2 > 0.0;
    !(has_neg && has_pos)
}

/// General quadrilateral drawn as the strip (0, 1, 2) + (2, 1, 3).
pub fn point_in_quad(v: &[Vec3; 4], p: Vec2) -> bool {
    let [a, b, c, d] = v.map(|q| q.truncate());
    point_in_triangle(a, b, c, p) || point_in_triangle(c, b, d, p)
}

/// Pixel-accurate refinement for sprite quads: is the texel under `p`
/// covered?  Unknown textures count as solid.
pub fn texel_hit(bank: &TextureBank, texture: TextureId, v: &[Vec3; 4], p: Vec2) -> bool {
    let Ok(tex) = bank.texture(texture) else {
        return true;
    };
    let (tl, br) = (v[0], v[3]);
    let (w, h) = (br.x - tl.x, br.y - tl.y);
    if w <= 0.0 || h <= 0.0 || tex.w == 0 || tex.h == 0 {
        return false;
    }
    let u = (((p.x - tl.x) / w) * tex.w as f32) as usize;
    let t = (((p.y - tl.y) / h) * tex.h as f32) as usize;
    tex.is_opaque_at(u.min(tex.w - 1), t.min(tex.h - 1))
}
