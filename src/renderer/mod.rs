//! Rendering abstraction layer.
//!
//! *The traversal never touches a pixel buffer directly.*
//! It produces textured quads (four [`Vertex`]es each) in painter's order
//! and hands them to a type that implements [`QuadRenderer`].
//!
//! * Later submissions overpaint earlier ones; there is no depth buffer.
//! * A back-end may refuse a quad (for example when its batch is full);
//!   the traversal then treats that object as not drawn.

use glam::{Vec2, Vec3};

use crate::world::{TextureBank, TextureId};

/// Pixel format of the software frame-buffer (0xAARRGGBB).
pub type Rgba = u32;

/// Position, normal, texture coordinate and packed hue of one quad corner.
///
/// Corner order is a triangle strip: top-left, top-right, bottom-left,
/// bottom-right for sprites; top, right, left, bottom for stretched ground.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    /// Screen x, screen y, depth.
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    /// x = hue index, y = hue mode.
    pub hue: Vec2,
}

impl Vertex {
    pub const fn new(position: Vec3, normal: Vec3, uv: Vec2, hue: Vec2) -> Self {
        Self {
            position,
            normal,
            uv,
            hue,
        }
    }
}

pub type Quad = [Vertex; 4];

/// A batched quad renderer that owns its scratch for the whole frame.
pub trait QuadRenderer {
    /// (Re)allocate internal scratch for the requested resolution and clear it.
    fn begin_frame(&mut self, width: usize, height: usize);

    /// Queue one textured quad.  `false` means the quad was rejected and
    /// will not appear on screen.
    fn submit_quad(&mut self, texture: TextureId, quad: &Quad) -> bool;

    fn set_light_direction(&mut self, direction: Vec3);
    fn set_ambient_intensity(&mut self, intensity: f32);
    fn set_directional_intensity(&mut self, intensity: f32);

    /// Queue a wireframe outline drawn over the finished frame.
    fn draw_outline(&mut self, _corners: &[Vec3; 4], _colour: Rgba) {}

    /// Rasterise the batch and **loan** the finished buffer to `submit`.
    ///
    /// * `submit(&[Rgba], w, h)` is run exactly once per frame.
    /// * Queued quads and outlines are consumed; a second call without a
    ///   new `begin_frame` presents the finished buffer unchanged.
    /// * GPU back-ends simply call the closure with an empty slice.
    fn end_frame<F>(&mut self, bank: &TextureBank, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize);
}

pub mod software;

pub use software::Software;

#[cfg(test)]
pub(crate) mod recording;
