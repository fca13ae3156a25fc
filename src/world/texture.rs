// Format-agnostic repository of decoded art, texmaps, animation frames and
// pre-rendered labels.  The engine and renderer talk about `TextureId` only.

use std::collections::HashMap;

/// Runtime handle for a texture in this bank.
///
/// *Guaranteed* to remain stable for the lifetime of the bank.
pub type TextureId = u16;

/// `TextureId` whose pixels are the checkerboard fallback.
/// Always = 0 because `TextureBank::new()` inserts it first.
pub const NO_TEXTURE: TextureId = 0;

/// CPU-side storage: 32-bit **ARGB** (0xAARRGGBB) in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub name: String,
    pub w: usize,
    pub h: usize,
    pub pixels: Vec<u32>,
}

impl Texture {
    /// Solid-colour texture, handy for tests and generated content.
    pub fn solid(name: impl Into<String>, w: usize, h: usize, argb: u32) -> Self {
        Self {
            name: name.into(),
            w,
            h,
            pixels: vec![argb; w * h],
        }
    }

    /// ARGB texel, `None` outside the texture.
    #[inline]
    pub fn texel(&self, u: usize, v: usize) -> Option<u32> {
        if u >= self.w || v >= self.h {
            return None;
        }
        self.pixels.get(v * self.w + u).copied()
    }

    /// `true` when the texel at (u, v) has any coverage.
    pub fn is_opaque_at(&self, u: usize, v: usize) -> bool {
        self.texel(u, v).is_some_and(|p| p >> 24 != 0)
    }
}

/// Convenience checkerboard 8×8 (dark/light grey).
impl Default for Texture {
    fn default() -> Self {
        const LIGHT: u32 = 0xFF_A0A0A0;
        const DARK: u32 = 0xFF_505050;
        let mut pix = vec![0u32; 8 * 8];
        for y in 0..8 {
            for x in 0..8 {
                pix[y * 8 + x] = if (x ^ y) & 1 == 0 { LIGHT } else { DARK };
            }
        }
        Texture {
            name: "CHECKER".to_string(),
            w: 8,
            h: 8,
            pixels: pix,
        }
    }
}

/// Things that can go wrong when using the bank.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextureError {
    /// Attempted to insert a second texture with an existing name.
    #[error("texture name `{0}` already present in bank")]
    Duplicate(String),

    /// Requested ID is outside `0 .. bank.len()`.
    #[error("texture id {0} out of range")]
    BadId(TextureId),
}

/// A format-agnostic cache of textures.
///
/// * Does **not** know about art files or texmaps, that is the loader's job.
/// * Stores exactly one copy of every name.
/// * ID **0** is always the "missing" checkerboard.
///
/// **Thread-safety:** access `TextureBank` from a single thread or wrap it
/// in `RwLock`; the struct itself is not `Sync`.
pub struct TextureBank {
    by_name: HashMap<String, TextureId>,
    data: Vec<Texture>,
}

impl TextureBank {
    /// Create an empty bank with a mandatory *missing* texture used as
    /// fallback.  The texture is inserted under the fixed name `"MISSING"`
    /// and obtains the handle **0**.
    pub fn new(missing_tex: Texture) -> Self {
        let mut by_name = HashMap::new();
        by_name.insert("MISSING".into(), NO_TEXTURE);
        Self {
            by_name,
            data: vec![missing_tex],
        }
    }

    pub fn default_with_checker() -> Self {
        Self::new(Texture::default())
    }

    /// Number of textures stored (including the "missing" one).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.len() == 1
    } // only checker

    /// Obtain the id for a *loaded* texture by name.
    pub fn id(&self, name: &str) -> Option<TextureId> {
        self.by_name.get(name).copied()
    }

    /// Fallback-safe query: unknown names resolve to the checkerboard id.
    pub fn id_or_missing(&self, name: &str) -> TextureId {
        self.id(name).unwrap_or(NO_TEXTURE)
    }

    /// Borrow a texture by id, with bounds-checking.
    pub fn texture(&self, id: TextureId) -> Result<&Texture, TextureError> {
        self.data.get(id as usize).ok_or(TextureError::BadId(id))
    }

    /// Width and height of a stored texture.
    pub fn size(&self, id: TextureId) -> Result<(usize, usize), TextureError> {
        self.texture(id).map(|t| (t.w, t.h))
    }

    /// Insert a texture under `name`.
    ///
    /// * Returns the newly assigned `TextureId`.
    /// * Fails if the name already exists (`Duplicate`).
    pub fn insert<S: Into<String>>(
        &mut self,
        name: S,
        tex: Texture,
    ) -> Result<TextureId, TextureError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(TextureError::Duplicate(name));
        }
        let id = self.data.len() as TextureId;
        self.data.push(tex);
        self.by_name.insert(name, id);
        Ok(id)
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
