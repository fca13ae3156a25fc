mod assets;
mod object;
mod position;
pub mod sample;
mod texture;
mod tile;

pub use object::{
    Corpse, Direction, GroundTile, ItemEntity, Mobile, Notoriety, ObjectKind, Serial, StaticItem,
    TextLabel, TilePos, WorldObject,
};

pub use assets::{Assets, Frame};

pub use position::ViewerState;

pub use texture::{NO_TEXTURE, Texture, TextureBank, TextureError, TextureId};

pub use tile::{MapError, ROOF_CLEARANCE, Tile, TileMap, WorldStore};
