use glam::IVec2;

use crate::world::{
    object::Direction,
    texture::{TextureBank, TextureId},
};

/// One frame of a body animation.
///
/// `texture` is `None` when the frame data failed to decode; callers treat
/// such a frame as missing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub texture: Option<TextureId>,
    /// Authored anchor: the pixel that sits on the owner's tile point.
    pub center: IVec2,
}

/// Asset and animation lookup by numeric id.
///
/// Every query must answer immediately; `None` means "not available" and
/// makes the traversal skip that one object.
pub trait Assets {
    /// Backing store for every handle returned below.
    fn textures(&self) -> &TextureBank;

    fn static_texture(&self, art_id: u16) -> Option<TextureId>;

    /// Native (width, height) of a static's art in screen units.
    fn static_dimensions(&self, art_id: u16) -> (i32, i32);

    fn land_texture(&self, art_id: u16) -> Option<TextureId>;

    fn texmap_texture(&self, texture_id: u16) -> Option<TextureId>;

    fn animation(
        &self,
        body: u16,
        action: u8,
        facing: Direction,
        hue: u16,
        mirrored: bool,
    ) -> Option<&[Frame]>;
}
