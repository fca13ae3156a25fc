use glam::Vec2;

/// How the tint stage applies a hue.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum HueMode {
    #[default]
    None = 0,
    Full = 1,
    Partial = 2,
    Transparent = 3,
}

impl HueMode {
    pub fn from_index(idx: u8) -> Self {
        match idx {
            1 => HueMode::Full,
            2 => HueMode::Partial,
            3 => HueMode::Transparent,
            _ => HueMode::None,
        }
    }
}

/// Decoded hue as consumed by the renderer: table index plus mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Hue {
    pub value: i32,
    pub mode: HueMode,
}

pub const PARTIAL_BIT: u16 = 0x8000;
pub const TRANSPARENT_BIT: u16 = 0x4000;
pub const INDEX_MASK: u16 = 0x3FFF;

impl Hue {
    pub const NONE: Hue = Hue {
        value: 0,
        mode: HueMode::None,
    };

    /// Full tint with an explicit table index.
    pub fn full(value: i32) -> Self {
        Self {
            value,
            mode: HueMode::Full,
        }
    }

    /// Packed form stored in each vertex: x = value, y = mode.
    #[inline]
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.value as f32, self.mode as u8 as f32)
    }

    pub fn from_vec2(v: Vec2) -> Self {
        Self {
            value: v.x as i32,
            mode: HueMode::from_index(v.y as u8),
        }
    }
}

/// Decode a raw 16-bit hue field.
///
/// The partial bit is tested before the transparent bit, and the index is
/// `(raw & 0x3FFF) - 1` even when the masked bits are zero.
pub fn decode_hue(raw: u16) -> Hue {
    if raw == 0 {
        return Hue::NONE;
    }
    let mode = if raw & PARTIAL_BIT != 0 {
        HueMode::Partial
    } else if raw & TRANSPARENT_BIT != 0 {
        HueMode::Transparent
    } else {
        HueMode::Full
    };
    Hue {
        value: (raw & INDEX_MASK) as i32 - 1,
        mode,
    }
}
