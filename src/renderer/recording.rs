//! Test double: remembers every submission and light uniform.

use glam::Vec3;

use super::{Quad, QuadRenderer, Rgba};
use crate::world::{TextureBank, TextureId};

#[derive(Default)]
pub struct RecordingRenderer {
    pub frames_begun: usize,
    pub frames_ended: usize,
    pub quads: Vec<(TextureId, Quad)>,
    pub outlines: Vec<([Vec3; 4], Rgba)>,
    /// Submissions with these 0-based indices (per frame) are rejected.
    pub reject: Vec<usize>,
    submitted_this_frame: usize,
    pub light_direction: Option<Vec3>,
    pub ambient: Option<f32>,
    pub directional: Option<f32>,
    pub light_updates: usize,
}

impl QuadRenderer for RecordingRenderer {
    fn begin_frame(&mut self, _width: usize, _height: usize) {
        self.frames_begun += 1;
        self.quads.clear();
        self.outlines.clear();
        self.submitted_this_frame = 0;
    }

    fn submit_quad(&mut self, texture: TextureId, quad: &Quad) -> bool {
        let idx = self.submitted_this_frame;
        self.submitted_this_frame += 1;
        if self.reject.contains(&idx) {
            return false;
        }
        self.quads.push((texture, *quad));
        true
    }

    fn set_light_direction(&mut self, direction: Vec3) {
        self.light_direction = Some(direction);
        self.light_updates += 1;
    }

    fn set_ambient_intensity(&mut self, intensity: f32) {
        self.ambient = Some(intensity);
    }

    fn set_directional_intensity(&mut self, intensity: f32) {
        self.directional = Some(intensity);
    }

    fn draw_outline(&mut self, corners: &[Vec3; 4], colour: Rgba) {
        self.outlines.push((*corners, colour));
    }

    fn end_frame<F>(&mut self, _bank: &TextureBank, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize),
    {
        self.frames_ended += 1;
        submit(&[], 0, 0);
    }
}
