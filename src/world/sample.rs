//! Procedural demo world: terrain with hills and water, a roofed house,
//! trees, items, corpses and labels, plus the art they reference.
//!
//! Everything is generated from a seed, so the same seed always yields the
//! same map and the same pixels.

use std::collections::HashMap;

use glam::{IVec2, Vec3};
use noise::{Fbm, NoiseFn, Perlin};
use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::{
    defs,
    world::{
        assets::{Assets, Frame},
        object::{
            Corpse, Direction, GroundTile, ItemEntity, Mobile, Notoriety, Serial, StaticItem,
            TextLabel, TilePos, WorldObject,
        },
        position::ViewerState,
        texture::{Texture, TextureBank, TextureId},
        tile::{MapError, TileMap},
    },
};

/*──────────────────────────── art ids ───────────────────────────────*/

pub const LAND_GRASS: u16 = 0x0003;
pub const LAND_WATER: u16 = 0x00A8;
pub const LAND_FLOOR: u16 = 0x0519;

pub const TEXMAP_GRASS: u16 = 0x0003;
pub const TEXMAP_WATER: u16 = 0x00A8;

pub const STATIC_TREE: u16 = 0x0CCA;
pub const STATIC_WALL: u16 = 0x0006;
pub const STATIC_ROOF: u16 = 0x05A8;
/// Invisible helper static, always ignored.
pub const STATIC_NODRAW: u16 = 0x21BC;
pub const ITEM_CRATE: u16 = 0x0E3C;
pub const ITEM_BAG: u16 = 0x0E76;

pub const BODY_OGRE: u16 = 0x0001;
pub const BODY_HORSE: u16 = 0x00C8;
pub const BODY_HUMAN: u16 = 0x0190;
pub const BODIES: [u16; 3] = [BODY_HUMAN, BODY_OGRE, BODY_HORSE];

const FRAMES_PER_ACTION: usize = 4;
const WATER_LEVEL: i32 = -4;
const HOUSE_SIZE: i32 = 6;
const HOUSE_WALL: i32 = 20;

/*──────────────────────────── noise ─────────────────────────────────*/

/// Corner altitudes in world units.
const HILL_HEIGHT: f64 = 14.0;
/// Noise samples per tile.
const HILL_SCALE: f64 = 0.07;

/// Rolling hills; the same corner always gets the same height.
struct Terrain {
    fbm: Fbm<Perlin>,
}

impl Terrain {
    fn new(seed: u64) -> Self {
        Self {
            fbm: Fbm::<Perlin>::new(seed as u32),
        }
    }

    fn height(&self, x: i32, y: i32) -> i32 {
        let n = self.fbm.get([x as f64 * HILL_SCALE, y as f64 * HILL_SCALE]);
        (n * HILL_HEIGHT).round() as i32
    }
}

/*──────────────────────────── pixels ────────────────────────────────*/

const CLEAR: u32 = 0x00_000000;

fn argb(r: u8, g: u8, b: u8) -> u32 {
    0xFF00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

fn shade(base: (u8, u8, u8), amount: f32) -> u32 {
    let f = |c: u8| (c as f32 * amount).clamp(0.0, 255.0) as u8;
    argb(f(base.0), f(base.1), f(base.2))
}

/// Noisy fill, optionally masked to the 44×44 tile diamond.
fn speckled(name: &str, w: usize, h: usize, base: (u8, u8, u8), seed: u64, diamond: bool) -> Texture {
    let mut tex = Texture::solid(name, w, h, CLEAR);
    let mut rng = SmallRng::seed_from_u64(seed);
    let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
    for y in 0..h {
        for x in 0..w {
            if diamond {
                let d = (x as f32 + 0.5 - cx).abs() / cx + (y as f32 + 0.5 - cy).abs() / cy;
                if d > 1.0 {
                    continue;
                }
            }
            tex.pixels[y * w + x] = shade(base, 0.8 + rng.random::<f32>() * 0.4);
        }
    }
    tex
}

fn tree_texture() -> Texture {
    let (w, h) = (44, 80);
    let mut tex = Texture::solid("tree", w, h, CLEAR);
    let mut rng = SmallRng::seed_from_u64(11);
    for y in 0..h {
        for x in 0..w {
            let (fx, fy) = (x as f32 - 22.0, y as f32);
            let crown = (fx / 20.0).powi(2) + ((fy - 24.0) / 24.0).powi(2) <= 1.0;
            let trunk = fx.abs() <= 3.0 && fy > 40.0;
            if crown {
                tex.pixels[y * w + x] = shade((40, 120, 40), 0.7 + rng.random::<f32>() * 0.5);
            } else if trunk {
                tex.pixels[y * w + x] = argb(90, 60, 30);
            }
        }
    }
    tex
}

/// Wall segment standing on a tile: a block 44 wide with a lighter cap.
fn wall_texture() -> Texture {
    let (w, h) = (44, 64);
    let mut tex = speckled("wall", w, h, (150, 140, 120), 23, false);
    for y in 0..4 {
        for x in 0..w {
            tex.pixels[y * w + x] = argb(190, 180, 160);
        }
    }
    for y in (12..h).step_by(12) {
        for x in 0..w {
            tex.pixels[y * w + x] = argb(110, 100, 90);
        }
    }
    tex
}

fn item_texture(name: &str, w: usize, h: usize, base: (u8, u8, u8)) -> Texture {
    let mut tex = speckled(name, w, h, base, 31, false);
    for x in 0..w {
        tex.pixels[x] = argb(60, 40, 20);
        tex.pixels[(h - 1) * w + x] = argb(60, 40, 20);
    }
    tex
}

/// Upright figure; `step` swings the legs for walk frames.
fn body_texture(name: &str, w: usize, h: usize, base: (u8, u8, u8), step: usize) -> Texture {
    let mut tex = Texture::solid(name, w, h, CLEAR);
    let mut rng = SmallRng::seed_from_u64(step as u64);
    let cx = w as f32 / 2.0;
    let head = h as f32 * 0.15;
    let swing = [0.0, 3.0, 0.0, -3.0][step % 4];
    for y in 0..h {
        for x in 0..w {
            let (fx, fy) = (x as f32 + 0.5 - cx, y as f32 + 0.5);
            let on_head = fx * fx + (fy - head).powi(2) <= head * head;
            let on_torso = fx.abs() <= w as f32 * 0.3 && fy > head * 2.0 && fy < h as f32 * 0.65;
            let on_legs = fy >= h as f32 * 0.65
                && ((fx + 4.0 + swing).abs() <= 2.0 || (fx - 4.0 - swing).abs() <= 2.0);
            if on_head || on_torso || on_legs {
                tex.pixels[y * w + x] = shade(base, 0.85 + rng.random::<f32>() * 0.3);
            }
        }
    }
    tex
}

/// Fallen figure: the upright figure squashed to `1 / (step + 1)` height.
fn fallen_texture(name: &str, w: usize, h: usize, base: (u8, u8, u8), step: usize) -> Texture {
    let squash = step + 1;
    let (fw, fh) = (w + step * 6, (h / squash).max(8));
    let upright = body_texture(name, w, h, base, 0);
    let mut tex = Texture::solid(name, fw, fh, CLEAR);
    for y in 0..fh {
        for x in 0..fw {
            let sx = (x * w / fw).min(w - 1);
            let sy = (y * h / fh).min(h - 1);
            tex.pixels[y * fw + x] = upright.pixels[sy * w + sx];
        }
    }
    tex
}

/// Stand-in for pre-rendered overhead text: one blocky glyph per character.
pub fn label_texture(text: &str) -> Texture {
    let glyphs = text.chars().count().max(1);
    let (w, h) = (glyphs * 6 + 4, 12);
    let mut tex = Texture::solid(format!("label:{text}"), w, h, 0xC0_101010);
    for (i, ch) in text.chars().enumerate() {
        if ch == ' ' {
            continue;
        }
        // one fixed pattern per character
        let mut rng = SmallRng::seed_from_u64(ch as u64);
        for gy in 0..7 {
            for gx in 0..5 {
                if rng.random_bool(0.5) {
                    tex.pixels[(gy + 2) * w + 2 + i * 6 + gx] = argb(240, 240, 240);
                }
            }
        }
    }
    tex
}

/*──────────────────────────── assets ────────────────────────────────*/

/// In-memory art for the sample world.
pub struct SampleAssets {
    bank: TextureBank,
    land: HashMap<u16, TextureId>,
    texmaps: HashMap<u16, TextureId>,
    statics: HashMap<u16, TextureId>,
    animations: HashMap<(u16, u8), Vec<Frame>>,
}

impl SampleAssets {
    pub fn new() -> Result<Self, crate::world::TextureError> {
        let mut bank = TextureBank::default_with_checker();
        let mut land = HashMap::new();
        let mut texmaps = HashMap::new();
        let mut statics = HashMap::new();
        let mut animations = HashMap::new();

        let add = |bank: &mut TextureBank, tex: Texture| {
            let name = tex.name.clone();
            bank.insert(name, tex)
        };

        land.insert(LAND_GRASS, add(&mut bank, speckled("land:grass", 44, 44, (60, 140, 50), 1, true))?);
        land.insert(LAND_WATER, add(&mut bank, speckled("land:water", 44, 44, (40, 80, 170), 2, true))?);
        land.insert(LAND_FLOOR, add(&mut bank, speckled("land:floor", 44, 44, (130, 95, 60), 3, true))?);
        texmaps.insert(TEXMAP_GRASS, add(&mut bank, speckled("texmap:grass", 64, 64, (60, 140, 50), 4, false))?);
        texmaps.insert(TEXMAP_WATER, add(&mut bank, speckled("texmap:water", 64, 64, (40, 80, 170), 5, false))?);

        statics.insert(STATIC_TREE, add(&mut bank, tree_texture())?);
        statics.insert(STATIC_WALL, add(&mut bank, wall_texture())?);
        statics.insert(STATIC_ROOF, add(&mut bank, speckled("roof", 44, 44, (150, 50, 40), 6, true))?);
        statics.insert(ITEM_CRATE, add(&mut bank, item_texture("crate", 22, 20, (150, 110, 60)))?);
        statics.insert(ITEM_BAG, add(&mut bank, item_texture("bag", 14, 16, (128, 128, 128)))?);

        for body in BODIES {
            let (w, h, base) = match defs::body_class(body) {
                defs::BodyClass::Monster => (36, 70, (110, 130, 90)),
                defs::BodyClass::Animal => (40, 34, (120, 80, 50)),
                defs::BodyClass::Human => (24, 58, (128, 128, 128)),
            };
            let upright = |bank: &mut TextureBank, action: u8, step: usize| {
                let name = format!("anim:{body}:{action}:{step}");
                let tex = body_texture(&name, w, h, base, step);
                add(bank, tex).map(|id| Frame {
                    texture: Some(id),
                    center: IVec2::new(w as i32 / 2, 0),
                })
            };
            let walk = (0..FRAMES_PER_ACTION)
                .map(|s| upright(&mut bank, defs::ACTION_WALK, s))
                .collect::<Result<Vec<_>, _>>()?;
            let stand = vec![upright(&mut bank, defs::ACTION_STAND, 0)?];

            let death = defs::death_action(body);
            let mut fallen = Vec::with_capacity(FRAMES_PER_ACTION);
            for s in 0..FRAMES_PER_ACTION {
                let tex = fallen_texture(&format!("anim:{body}:{death}:{s}"), w, h, base, s);
                let fw = tex.w as i32;
                fallen.push(Frame {
                    texture: Some(add(&mut bank, tex)?),
                    center: IVec2::new(fw / 2, 0),
                });
            }

            animations.insert((body, defs::ACTION_WALK), walk);
            animations.insert((body, defs::ACTION_STAND), stand);
            animations.insert((body, death), fallen);
        }

        Ok(Self {
            bank,
            land,
            texmaps,
            statics,
            animations,
        })
    }

    /// Register a label texture, reusing it when the same text was seen before.
    pub fn label(&mut self, text: &str) -> Result<TextureId, crate::world::TextureError> {
        let tex = label_texture(text);
        if let Some(id) = self.bank.id(&tex.name) {
            return Ok(id);
        }
        let name = tex.name.clone();
        self.bank.insert(name, tex)
    }
}

impl Assets for SampleAssets {
    fn textures(&self) -> &TextureBank {
        &self.bank
    }

    fn static_texture(&self, art_id: u16) -> Option<TextureId> {
        self.statics.get(&art_id).copied()
    }

    fn static_dimensions(&self, art_id: u16) -> (i32, i32) {
        self.static_texture(art_id)
            .and_then(|id| self.bank.size(id).ok())
            .map_or((0, 0), |(w, h)| (w as i32, h as i32))
    }

    fn land_texture(&self, art_id: u16) -> Option<TextureId> {
        self.land.get(&art_id).copied()
    }

    fn texmap_texture(&self, texture_id: u16) -> Option<TextureId> {
        self.texmaps.get(&texture_id).copied()
    }

    // facings and mirroring share one set of frames here
    fn animation(
        &self,
        body: u16,
        action: u8,
        _facing: Direction,
        _hue: u16,
        _mirrored: bool,
    ) -> Option<&[Frame]> {
        self.animations.get(&(body, action)).map(Vec::as_slice)
    }
}

/*──────────────────────────── world ─────────────────────────────────*/

/// A generated map, its art, and where things start.
pub struct SampleWorld {
    pub map: TileMap,
    pub assets: SampleAssets,
    pub spawn: ViewerState,
    /// Mobiles to hand to the simulation; not placed on `map`.
    pub mobiles: Vec<Mobile>,
}

#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error(transparent)]
    Map(#[from] MapError),
    #[error(transparent)]
    Texture(#[from] crate::world::TextureError),
    #[error("sample map must be at least {min} tiles wide, got {got}")]
    TooSmall { min: i32, got: i32 },
}

pub const MIN_SIZE: i32 = 24;

/// Top-left corner of the house footprint.
pub fn house_origin(size: i32) -> (i32, i32) {
    (size / 2 + 3, size / 2 - HOUSE_SIZE - 2)
}

fn in_house(size: i32, x: i32, y: i32) -> bool {
    let (hx, hy) = house_origin(size);
    (hx..hx + HOUSE_SIZE).contains(&x) && (hy..hy + HOUSE_SIZE).contains(&y)
}

/// Build the whole demo world for a square map of `size` tiles.
pub fn generate(size: i32, seed: u64, mobiles: usize) -> Result<SampleWorld, SampleError> {
    if size < MIN_SIZE {
        return Err(SampleError::TooSmall {
            min: MIN_SIZE,
            got: size,
        });
    }
    let mut map = TileMap::new(0, size, size)?;
    let mut assets = SampleAssets::new()?;

    let terrain = Terrain::new(seed);
    let mut rng = SmallRng::seed_from_u64(seed);
    let (hx, hy) = house_origin(size);
    let house_z = terrain.height(hx, hy).max(WATER_LEVEL + 1);
    let corner = |x: i32, y: i32| {
        let touches = [(x, y), (x - 1, y), (x, y - 1), (x - 1, y - 1)];
        if touches.into_iter().any(|(tx, ty)| in_house(size, tx, ty)) {
            house_z
        } else {
            terrain.height(x, y).max(WATER_LEVEL)
        }
    };

    for y in 0..size {
        for x in 0..size {
            let z = corner(x, y);
            let deltas = [0, corner(x + 1, y) - z, corner(x, y + 1) - z, corner(x + 1, y + 1) - z];
            let wet = !in_house(size, x, y) && terrain.height(x, y) <= WATER_LEVEL;
            let (art_id, stretch) = if wet {
                (LAND_WATER, Some(TEXMAP_WATER))
            } else if in_house(size, x, y) {
                (LAND_FLOOR, None)
            } else if deltas != [0; 4] {
                (LAND_GRASS, Some(TEXMAP_GRASS))
            } else {
                (LAND_GRASS, None)
            };
            map.place(WorldObject::Ground(GroundTile {
                pos: TilePos::new(x, y, z),
                art_id,
                ignored: false,
                wet,
                stretch_texture: stretch,
                corner_deltas: deltas,
            }))?;

            let border = x < 2 || y < 2 || x >= size - 2 || y >= size - 2;
            let near_house = (hx - 2..hx + HOUSE_SIZE + 2).contains(&x)
                && (hy - 2..hy + HOUSE_SIZE + 2).contains(&y);
            if !wet && !near_house && !border && rng.random_ratio(1, 19) {
                map.place(WorldObject::Static(StaticItem {
                    pos: TilePos::new(x, y, z),
                    art_id: STATIC_TREE,
                    hue: 0,
                    ignored: false,
                }))?;
            }
        }
    }

    // walls on the footprint edge with a door gap, a roof over everything
    for y in hy..hy + HOUSE_SIZE {
        for x in hx..hx + HOUSE_SIZE {
            let edge = x == hx || y == hy || x == hx + HOUSE_SIZE - 1 || y == hy + HOUSE_SIZE - 1;
            let door = y == hy + HOUSE_SIZE - 1 && x == hx + HOUSE_SIZE / 2;
            if edge && !door {
                map.place(WorldObject::Static(StaticItem {
                    pos: TilePos::new(x, y, house_z),
                    art_id: STATIC_WALL,
                    hue: 0,
                    ignored: false,
                }))?;
            }
            map.place(WorldObject::Static(StaticItem {
                pos: TilePos::new(x, y, house_z + HOUSE_WALL),
                art_id: STATIC_ROOF,
                hue: 0,
                ignored: false,
            }))?;
        }
    }
    map.place(WorldObject::Static(StaticItem {
        pos: TilePos::new(hx + 1, hy + 1, house_z + HOUSE_WALL + 10),
        art_id: STATIC_NODRAW,
        hue: 0,
        ignored: true,
    }))?;

    // furniture inside, with every hue mode on show
    let inside = [
        (hx + 1, hy + 2, ITEM_CRATE, 0x0000),
        (hx + 2, hy + 2, ITEM_CRATE, 0x0021),
        (hx + 3, hy + 3, ITEM_BAG, 0x8035),
        (hx + 4, hy + 1, ITEM_BAG, 0x4001),
    ];
    for (i, (x, y, art_id, hue)) in inside.into_iter().enumerate() {
        map.place(WorldObject::Item(ItemEntity {
            pos: TilePos::new(x, y, house_z),
            serial: 0x4000_0001 + i as Serial,
            art_id,
            hue,
        }))?;
    }

    let sign = assets.label("Sample House")?;
    map.place(WorldObject::Text(TextLabel {
        pos: TilePos::new(hx + HOUSE_SIZE / 2, hy + HOUSE_SIZE, house_z),
        texture: sign,
        hue: 0,
        offset: Vec3::ZERO,
    }))?;

    let centre = size / 2;
    let spawn_z = corner(centre, centre);
    for (i, body) in BODIES.into_iter().enumerate() {
        let (x, y) = (centre - 4 + i as i32 * 2, centre + 4);
        let z = corner(x, y);
        map.place(WorldObject::Corpse(Corpse {
            pos: TilePos::new(x, y, z),
            serial: 0x4000_1000 + i as Serial,
            body,
            hue: 0,
            facing: Direction::ALL[i * 3 % 8],
            frame_index: FRAMES_PER_ACTION - 1,
        }))?;
    }

    let notoriety = [
        Notoriety::Innocent,
        Notoriety::Ally,
        Notoriety::Criminal,
        Notoriety::Enemy,
        Notoriety::Murderer,
        Notoriety::Invulnerable,
    ];
    let mut people = Vec::with_capacity(mobiles);
    for i in 0..mobiles {
        let (x, y) = free_spot(size, &terrain, &mut rng);
        people.push(Mobile {
            pos: TilePos::new(x, y, corner(x, y)),
            serial: 1 + i as Serial,
            body: BODIES[i % BODIES.len()],
            hue: if i % 4 == 0 { 0 } else { 0x0002 + (i as u16 * 37) % 0x3E8 },
            facing: Direction::from_index(i as u8),
            action: defs::ACTION_STAND,
            anim_progress: 0.0,
            offset: Vec3::ZERO,
            notoriety: notoriety[i % notoriety.len()],
        });
    }

    Ok(SampleWorld {
        map,
        assets,
        spawn: ViewerState::at(centre, centre, spawn_z),
        mobiles: people,
    })
}

/// Random dry spot outside the house, or the map centre if none turns up.
fn free_spot(size: i32, terrain: &Terrain, rng: &mut SmallRng) -> (i32, i32) {
    (0..64)
        .map(|_| (rng.random_range(4..size - 4), rng.random_range(4..size - 4)))
        .find(|&(x, y)| !in_house(size, x, y) && terrain.height(x, y) > WATER_LEVEL)
        .unwrap_or((size / 2, size / 2))
}
