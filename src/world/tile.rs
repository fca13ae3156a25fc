use thiserror::Error;

use crate::world::object::{ObjectKind, WorldObject};

/// Default altitude above the viewer at which a covering object counts as
/// a roof.
pub const ROOF_CLEARANCE: i32 = 20;

/// One cell of the world grid and the objects standing on it, kept in
/// draw order.
#[derive(Clone, Debug, Default)]
pub struct Tile {
    pub x: i32,
    pub y: i32,
    objects: Vec<WorldObject>,
}

/// Draw-order key inside one tile: altitude first, then category.
fn sort_key(obj: &WorldObject) -> (i32, u8) {
    let rank = match obj.kind() {
        ObjectKind::Ground => 0,
        ObjectKind::Static => 1,
        ObjectKind::Item | ObjectKind::Corpse => 2,
        ObjectKind::Mobile => 3,
        ObjectKind::Text => 4,
    };
    (obj.z(), rank)
}

impl Tile {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            objects: Vec::new(),
        }
    }

    /// Objects in resolved render order.
    #[inline]
    pub fn sorted_objects(&self) -> &[WorldObject] {
        &self.objects
    }

    /// Insert keeping the sort stable: among equal keys, placement order wins.
    pub fn insert(&mut self, obj: WorldObject) {
        let key = sort_key(&obj);
        let at = self.objects.partition_point(|o| sort_key(o) <= key);
        self.objects.insert(at, obj);
    }

    /// Drop every object matching `pred`; returns how many went.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&WorldObject) -> bool) -> usize {
        let before = self.objects.len();
        self.objects.retain(|o| !pred(o));
        before - self.objects.len()
    }

    /// Is something solid at least `clearance` above a viewer at altitude `z`?
    pub fn is_under_roof(&self, z: i32, clearance: i32) -> bool {
        self.objects.iter().any(|o| {
            matches!(o, WorldObject::Static(_) | WorldObject::Ground(_))
                && !o.is_ignored()
                && o.z() >= z + clearance
        })
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Read access to the streamed world.
pub trait WorldStore {
    /// Any coordinate is valid; cells outside the loaded area are empty.
    fn tile(&self, x: i32, y: i32) -> &Tile;

    /// Streaming hint issued whenever the viewer's centre tile changes.
    fn recenter(&mut self, _x: i32, _y: i32) {}
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MapError {
    #[error("tile ({x}, {y}) lies outside the map")]
    OutOfBounds { x: i32, y: i32 },

    #[error("invalid map size {width}x{height}")]
    InvalidSize { width: i32, height: i32 },
}

/// Fully resident map: a dense `width × height` grid of tiles.
pub struct TileMap {
    pub index: u32,
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
    empty: Tile,
}

impl TileMap {
    pub fn new(index: u32, width: i32, height: i32) -> Result<Self, MapError> {
        if width <= 0 || height <= 0 {
            return Err(MapError::InvalidSize { width, height });
        }
        let mut tiles = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                tiles.push(Tile::new(x, y));
            }
        }
        Ok(Self {
            index,
            width,
            height,
            tiles,
            empty: Tile::new(-1, -1),
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    fn slot(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some((y * self.width + x) as usize)
    }

    pub fn tile_mut(&mut self, x: i32, y: i32) -> Result<&mut Tile, MapError> {
        let slot = self.slot(x, y).ok_or(MapError::OutOfBounds { x, y })?;
        Ok(&mut self.tiles[slot])
    }

    /// Place `obj` on the tile named by its own position.
    pub fn place(&mut self, obj: WorldObject) -> Result<(), MapError> {
        let p = obj.pos();
        self.tile_mut(p.x, p.y)?.insert(obj);
        Ok(())
    }

    /// Remove all objects of one kind from the whole map.
    pub fn remove_kind(&mut self, kind: ObjectKind) -> usize {
        self.tiles
            .iter_mut()
            .map(|t| t.remove_where(|o| o.kind() == kind))
            .sum()
    }
}

impl WorldStore for TileMap {
    fn tile(&self, x: i32, y: i32) -> &Tile {
        match self.slot(x, y) {
            Some(slot) => &self.tiles[slot],
            None => &self.empty,
        }
    }
}
