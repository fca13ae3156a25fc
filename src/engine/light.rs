//! Brightness knobs → shader light uniforms.
//!
//! ```text
//! raw    = clamp(30 - overall + personal, 0, 30)
//! shaped = raw / 30 * 0.8 - 0.3          ∈ [-0.3, 0.5]
//! ```
//! `-0.3` matches the darkest authored content, `0.5` the brightest.

use glam::Vec3;

/// Upper end of the brightness scale used by the server.
pub const LIGHT_LEVELS: f32 = 30.0;

/// Inputs of the light model.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LightKnobs {
    pub personal: i32,
    pub overall: i32,
    /// Radians.
    pub direction: f32,
}

/// Uniforms handed to the quad renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightState {
    pub ambient: f32,
    pub directional: f32,
    pub direction: Vec3,
}

impl LightKnobs {
    pub fn recompute(&self) -> LightState {
        recompute(self.overall, self.personal, self.direction)
    }
}

/// Pure function of the three knobs.
pub fn recompute(overall: i32, personal: i32, direction: f32) -> LightState {
    let raw = (LIGHT_LEVELS - overall as f32 + personal as f32).clamp(0.0, LIGHT_LEVELS);
    let shaped = raw / LIGHT_LEVELS * 0.8 - 0.3;
    let (s, c) = direction.sin_cos();

    LightState {
        ambient: shaped * 0.8,
        directional: shaped,
        direction: Vec3::new(0.0, -c, s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_3;

    #[test]
    fn directional_stays_in_perceptual_window() {
        for overall in -60..=60 {
            for personal in -60..=60 {
                let l = recompute(overall, personal, 0.0);
                assert!((-0.3 - 1e-6..=0.5 + 1e-6).contains(&l.directional));
                assert!((l.ambient - l.directional * 0.8).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn monotonic_in_combined_term() {
        let mut last = f32::MIN;
        for combined in -40..=40 {
            // personal - overall == combined, spread over different pairs
            let l = recompute(10, 10 + combined, 0.0);
            let m = recompute(-7, -7 + combined, 0.0);
            assert_eq!(l, m);
            assert!(l.directional >= last);
            last = l.directional;
        }
    }

    #[test]
    fn extremes() {
        assert!((recompute(0, 0, 0.0).directional - 0.5).abs() < 1e-6);
        assert!((recompute(30, 0, 0.0).directional + 0.3).abs() < 1e-6);
    }

    #[test]
    fn direction_is_unit_length() {
        for i in 0..16 {
            let d = recompute(0, 0, i as f32 * FRAC_PI_3 / 2.0).direction;
            assert!((d.length() - 1.0).abs() < 1e-5);
            assert_eq!(d.x, 0.0);
        }
        let d = recompute(0, 0, 0.0).direction;
        assert!((d - Vec3::new(0.0, -1.0, 0.0)).length() < 1e-6);
    }
}
