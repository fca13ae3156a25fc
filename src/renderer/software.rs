//! ---------------------------------------------------------------------------
//! Batched software (CPU) quad renderer
//!
//! * Fills an owned `Vec<u32>` frame-buffer in **0xAARRGGBB** format.
//! * Quads are queued during the traversal and rasterised in `end_frame`,
//!   strictly in submission order.  Later quads overpaint earlier ones, so no
//!   Z-buffer is needed.
//! * Each quad is two triangles, (0, 1, 2) and (2, 1, 3), with barycentric
//!   UV and normal interpolation.
//! ---------------------------------------------------------------------------

use glam::{Vec2, Vec3};

use crate::{
    engine::hue::{Hue, HueMode},
    renderer::{Quad, QuadRenderer, Rgba},
    world::{NO_TEXTURE, Texture, TextureBank, TextureId},
};

/// Quads accepted per frame; further submissions are rejected.
pub const MAX_QUADS: usize = 32_768;

const CLEAR: Rgba = 0xFF_20_20_20;

/*───────────────────────────────────────────────────────────────────────*/
/*                              Backend                                 */
/*───────────────────────────────────────────────────────────────────────*/

#[derive(Clone, Copy, Debug)]
struct Batched {
    texture: TextureId,
    quad: Quad,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Uniforms {
    direction: Vec3,
    ambient: f32,
    directional: f32,
}

pub struct Software {
    scratch: Vec<Rgba>,
    batch: Vec<Batched>,
    outlines: Vec<([Vec3; 4], Rgba)>,
    max_quads: usize,
    uniforms: Uniforms,
    width: usize,
    height: usize,
}

impl Default for Software {
    fn default() -> Self {
        Self::with_max_quads(MAX_QUADS)
    }
}

impl Software {
    pub fn with_max_quads(max_quads: usize) -> Self {
        Self {
            scratch: Vec::new(),
            batch: Vec::new(),
            outlines: Vec::new(),
            max_quads,
            uniforms: Uniforms {
                direction: Vec3::NEG_Y,
                ambient: 0.0,
                directional: 0.0,
            },
            width: 0,
            height: 0,
        }
    }

    /// Quads waiting for the next `end_frame`.
    pub fn queued(&self) -> usize {
        self.batch.len()
    }
}

/*──────────────────────── QuadRenderer impl ──────────────────────────*/
impl QuadRenderer for Software {
    fn begin_frame(&mut self, w: usize, h: usize) {
        // (re)allocate if resolution changed
        if w != self.width || h != self.height {
            self.width = w;
            self.height = h;
            self.scratch.resize(w * h, 0);
        }
        self.scratch.fill(CLEAR);
        self.batch.clear();
        self.outlines.clear();
    }

    fn submit_quad(&mut self, texture: TextureId, quad: &Quad) -> bool {
        if self.batch.len() >= self.max_quads {
            return false;
        }
        self.batch.push(Batched {
            texture,
            quad: *quad,
        });
        true
    }

    fn set_light_direction(&mut self, direction: Vec3) {
        self.uniforms.direction = direction.normalize_or_zero();
    }

    fn set_ambient_intensity(&mut self, intensity: f32) {
        self.uniforms.ambient = intensity;
    }

    fn set_directional_intensity(&mut self, intensity: f32) {
        self.uniforms.directional = intensity;
    }

    fn draw_outline(&mut self, corners: &[Vec3; 4], colour: Rgba) {
        self.outlines.push((*corners, colour));
    }

    fn end_frame<F>(&mut self, bank: &TextureBank, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize),
    {
        let mut batch = std::mem::take(&mut self.batch);
        for b in &batch {
            let tex = bank
                .texture(b.texture)
                .or_else(|_| bank.texture(NO_TEXTURE));
            if let Ok(tex) = tex {
                self.draw_quad(&b.quad, tex);
            }
        }
        batch.clear();
        self.batch = batch;

        let mut outlines = std::mem::take(&mut self.outlines);
        for (c, colour) in &outlines {
            for (a, b) in [(0, 1), (1, 3), (3, 2), (2, 0)] {
                self.draw_line(c[a].x as i32, c[a].y as i32, c[b].x as i32, c[b].y as i32, *colour);
            }
        }
        outlines.clear();
        self.outlines = outlines;

        submit(&self.scratch, self.width, self.height);
    }
}

/*──────────────────────── rasterisation ──────────────────────────────*/

#[inline]
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b - a).perp_dot(p - a)
}

/// Brightness multiplier for a surface normal.
pub fn light_factor(normal: Vec3, direction: Vec3, ambient: f32, directional: f32) -> f32 {
    let n_dot_l = normal.normalize_or_zero().dot(direction).max(0.0);
    (1.0 + ambient + directional * n_dot_l).clamp(0.0, 2.0)
}

/// Colour of hue table entry `index` (procedural wheel; negative = white).
pub fn hue_colour(index: i32) -> Vec3 {
    if index < 0 {
        return Vec3::ONE;
    }
    // 32 hue families, each with 32 brightness steps
    let angle = (index % 32) as f32 / 32.0 * std::f32::consts::TAU;
    let level = 0.35 + 0.65 * ((index / 32) % 32) as f32 / 31.0;
    let rgb = Vec3::new(
        angle.cos() * 0.5 + 0.5,
        (angle - 2.094).cos() * 0.5 + 0.5,
        (angle + 2.094).cos() * 0.5 + 0.5,
    );
    rgb * level
}

#[inline]
fn unpack(c: Rgba) -> Vec3 {
    Vec3::new(
        ((c >> 16) & 0xFF) as f32,
        ((c >> 8) & 0xFF) as f32,
        (c & 0xFF) as f32,
    )
}

#[inline]
fn pack(rgb: Vec3) -> Rgba {
    let c = rgb.clamp(Vec3::ZERO, Vec3::splat(255.0));
    0xFF00_0000 | ((c.x as u32) << 16) | ((c.y as u32) << 8) | c.z as u32
}

/// Hue stage: tint, partial tint or half-blend against `dst`.
fn apply_hue(texel: Rgba, dst: Rgba, hue: Hue) -> Vec3 {
    let src = unpack(texel);
    match hue.mode {
        HueMode::None => src,
        HueMode::Full => hue_colour(hue.value) * (src.element_sum() / 3.0),
        HueMode::Partial => {
            if src.x == src.y && src.y == src.z {
                hue_colour(hue.value) * src.x
            } else {
                src
            }
        }
        HueMode::Transparent => (src + unpack(dst)) * 0.5,
    }
}

impl Software {
    fn draw_quad(&mut self, q: &Quad, tex: &Texture) {
        let hue = Hue::from_vec2(q[0].hue);
        self.draw_triangle([0, 1, 2], q, tex, hue);
        self.draw_triangle([2, 1, 3], q, tex, hue);
    }

    fn draw_triangle(&mut self, idx: [usize; 3], q: &Quad, tex: &Texture, hue: Hue) {
        if tex.w == 0 || tex.h == 0 || self.width == 0 || self.height == 0 {
            return;
        }
        let [a, b, c] = idx.map(|i| q[i].position.truncate());
        let area = edge(a, b, c);
        if area == 0.0 {
            return;
        }

        let min = a.min(b).min(c).floor().max(Vec2::ZERO);
        let max = a
            .max(b)
            .max(c)
            .ceil()
            .min(Vec2::new(self.width as f32, self.height as f32));
        if min.x >= max.x || min.y >= max.y {
            return;
        }

        let [va, vb, vc] = idx.map(|i| q[i]);
        for y in min.y as usize..max.y as usize {
            for x in min.x as usize..max.x as usize {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let w0 = edge(b, c, p) / area;
                let w1 = edge(c, a, p) / area;
                let w2 = edge(a, b, p) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let uv = va.uv * w0 + vb.uv * w1 + vc.uv * w2;
                let u = ((uv.x * tex.w as f32) as usize).min(tex.w - 1);
                let v = ((uv.y * tex.h as f32) as usize).min(tex.h - 1);
                let texel = tex.pixels[v * tex.w + u];
                if texel >> 24 == 0 {
                    continue;
                }

                let slot = y * self.width + x;
                let normal = va.normal * w0 + vb.normal * w1 + vc.normal * w2;
                let factor = light_factor(
                    normal,
                    self.uniforms.direction,
                    self.uniforms.ambient,
                    self.uniforms.directional,
                );
                let rgb = apply_hue(texel, self.scratch[slot], hue) * factor;
                self.scratch[slot] = pack(rgb);
            }
        }
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, col: Rgba) {
        let mut x0 = x0;
        let mut y0 = y0;
        let dx = (x1 - x0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let dy = -(y1 - y0).abs();
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            if (0..self.width as i32).contains(&x0) && (0..self.height as i32).contains(&y0) {
                self.scratch[y0 as usize * self.width + x0 as usize] = col;
            }
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
