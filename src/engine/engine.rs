use glam::{Vec2, Vec3};
use log::{debug, trace};

use crate::{
    defs::{self, PickFlags},
    engine::{
        geometry,
        hue::{Hue, decode_hue},
        light::{LightKnobs, LightState},
        picking::{FramePick, MouseOverItem, MouseOverList, point_in_quad, point_in_rect, texel_hit},
        types::{EngineConfig, FrameContext, FrameOutcome, FrameReport, Phase, SkipReason},
        viewport::ViewportWindow,
    },
    renderer::{Quad, QuadRenderer, Rgba},
    world::{Assets, ObjectKind, Serial, TextureId, ViewerState, WorldObject, WorldStore},
};

/// Outline colours of the debug overlay.
const OBJECT_OUTLINE: Rgba = 0xFF_FFFF00;
const GROUND_OUTLINE: Rgba = 0xFF_00FFFF;

/// Monotonic per-frame depth key; the only occlusion signal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawCursor(u32);

impl DrawCursor {
    #[inline]
    pub fn value(self) -> u32 {
        self.0
    }

    #[inline]
    fn depth(self) -> f32 {
        self.0 as f32
    }

    #[inline]
    fn advance(&mut self) {
        self.0 += 1;
    }
}

/// How a drawn quad is hit-tested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HitShape {
    /// Axis-aligned sprite, refined by texture alpha.
    Sprite,
    /// Stretched ground diamond.
    Quad,
    /// Never a pick candidate.
    None,
}

/// Result of turning one object into screen geometry.
enum Prepared {
    Ignored,
    Missing(&'static str),
    Ready {
        texture: TextureId,
        quad: Quad,
        hit: HitShape,
    },
}

/// Pick flag guarding each pickable kind.
fn pick_flag(kind: ObjectKind) -> Option<PickFlags> {
    match kind {
        ObjectKind::Ground => Some(PickFlags::GROUND_TILES),
        ObjectKind::Static => Some(PickFlags::STATICS),
        ObjectKind::Mobile => Some(PickFlags::MOBILES),
        ObjectKind::Corpse | ObjectKind::Item => Some(PickFlags::ITEMS),
        ObjectKind::Text => None,
    }
}

/// Per-frame isometric world renderer and mouse-over picker.
pub struct Engine<R: QuadRenderer> {
    pub renderer: R,
    pub config: EngineConfig,
    pub pick_flags: PickFlags,
    /// Make every pickable variant a candidate regardless of `pick_flags`.
    pub debug_pick_all: bool,
    phase: Phase,
    map_index: Option<u32>,
    last_center: Option<ViewerState>,
    window: Option<ViewportWindow>,
    light: LightKnobs,
    candidates: MouseOverList,
    last_pick: FramePick,
    objects_rendered: usize,
    /// A traversed frame is waiting for `draw`.
    pending: bool,
}

impl<R: QuadRenderer> Engine<R> {
    pub fn new(renderer: R, config: EngineConfig) -> Self {
        let mut engine = Self {
            renderer,
            config,
            pick_flags: PickFlags::empty(),
            debug_pick_all: false,
            phase: Phase::WarmingUp,
            map_index: None,
            last_center: None,
            window: None,
            light: LightKnobs::default(),
            candidates: MouseOverList::new(),
            last_pick: FramePick::default(),
            objects_rendered: 0,
            pending: false,
        };
        engine.apply_light();
        engine
    }

    /*──────────────────────────── light knobs ───────────────────────────*/

    pub fn set_personal_brightness(&mut self, personal: i32) {
        if self.light.personal != personal {
            self.light.personal = personal;
            self.apply_light();
        }
    }

    pub fn set_overall_brightness(&mut self, overall: i32) {
        if self.light.overall != overall {
            self.light.overall = overall;
            self.apply_light();
        }
    }

    /// Radians.
    pub fn set_light_direction(&mut self, direction: f32) {
        if self.light.direction != direction {
            self.light.direction = direction;
            self.apply_light();
        }
    }

    pub fn light(&self) -> LightState {
        self.light.recompute()
    }

    fn apply_light(&mut self) {
        let state = self.light.recompute();
        self.renderer.set_light_direction(state.direction);
        self.renderer.set_ambient_intensity(state.ambient);
        self.renderer.set_directional_intensity(state.directional);
    }

    /*──────────────────────────── results ───────────────────────────────*/

    pub fn objects_rendered_last_frame(&self) -> usize {
        self.objects_rendered
    }

    pub fn foremost_object_under_cursor(&self) -> Option<&WorldObject> {
        self.last_pick.object.as_ref().map(|i| &i.object)
    }

    pub fn foremost_ground_under_cursor(&self) -> Option<&WorldObject> {
        self.last_pick.ground.as_ref().map(|i| &i.object)
    }

    pub fn last_pick(&self) -> &FramePick {
        &self.last_pick
    }

    pub fn window(&self) -> Option<&ViewportWindow> {
        self.window.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /*──────────────────────────── frame steps ───────────────────────────*/

    /// Per-tick step: refresh the window if the viewer moved, then walk it.
    pub fn update<S, A>(&mut self, ctx: &FrameContext, store: &mut S, assets: &A) -> FrameOutcome
    where
        S: WorldStore + ?Sized,
        A: Assets + ?Sized,
    {
        self.pending = false;
        let Some(map_index) = ctx.map_index else {
            return FrameOutcome::Skipped(SkipReason::NoMap);
        };
        let Some(center) = ctx.center else {
            return FrameOutcome::Skipped(SkipReason::NoCenter);
        };

        if self.map_index != Some(map_index) {
            debug!("map changed to {map_index}");
            self.map_index = Some(map_index);
            self.last_center = None;
        }

        let window = match (self.window, self.last_center) {
            (Some(w), Some(last)) if last.same_tile(&center) => w,
            _ => {
                store.recenter(center.tile.x, center.tile.y);
                let w = ViewportWindow::compute(
                    &*store,
                    &center,
                    self.config.window_size,
                    self.config.roof_clearance,
                );
                debug!(
                    "window at ({}, {}) size {}, roof clip {}",
                    w.origin_x, w.origin_y, w.size, w.max_roof_altitude
                );
                self.window = Some(w);
                w
            }
        };
        self.last_center = Some(center);

        if ctx.minimized {
            return FrameOutcome::Skipped(SkipReason::Minimized);
        }
        if self.phase == Phase::WarmingUp {
            debug!("skipping warm-up frame");
            self.phase = Phase::Active;
            return FrameOutcome::Skipped(SkipReason::WarmingUp);
        }

        let report = self.traverse(ctx, &center, &window, &*store, assets);
        self.objects_rendered = report.objects_rendered;
        self.last_pick = report.pick.clone();
        self.pending = true;
        trace!(
            "frame: {} drawn, {} rejected, {} missing",
            report.objects_rendered, report.rejected, report.missing
        );
        FrameOutcome::Drawn(report)
    }

    /// Per-render step: overlay this frame's picks if asked, then flush.
    ///
    /// Presents at most once per drawn `update`; after a skipped update the
    /// renderer is left alone and `submit` is not called. Returns whether a
    /// frame went out.
    pub fn draw<A, F>(&mut self, assets: &A, submit: F) -> bool
    where
        A: Assets + ?Sized,
        F: FnOnce(&[Rgba], usize, usize),
    {
        if !std::mem::take(&mut self.pending) {
            return false;
        }
        if self.config.debug_overlay {
            if let Some(item) = &self.last_pick.object {
                self.renderer.draw_outline(&item.vertices, OBJECT_OUTLINE);
            }
            if let Some(item) = &self.last_pick.ground {
                self.renderer.draw_outline(&item.vertices, GROUND_OUTLINE);
            }
        }
        self.renderer.end_frame(assets.textures(), submit);
        true
    }

    /*──────────────────────────── traversal ─────────────────────────────*/

    fn traverse<S, A>(
        &mut self,
        ctx: &FrameContext,
        center: &ViewerState,
        window: &ViewportWindow,
        store: &S,
        assets: &A,
    ) -> FrameReport
    where
        S: WorldStore + ?Sized,
        A: Assets + ?Sized,
    {
        self.renderer.begin_frame(ctx.screen.w, ctx.screen.h);
        self.candidates.clear();

        let mut cursor = DrawCursor::default();
        let mut report = FrameReport::default();
        let offset = geometry::screen_offset(ctx.screen, window.size, center);

        for (ix, iy) in window.cells() {
            let (tx, ty) = window.world_tile(ix, iy);
            let origin = geometry::tile_origin(ix, iy, offset);

            for obj in store.tile(tx, ty).sorted_objects() {
                if window.is_clipped(obj.z()) {
                    continue;
                }

                let depth = cursor.depth();
                let (texture, quad, hit) = match prepare(obj, origin, depth, ctx.last_target, assets) {
                    Prepared::Ready { texture, quad, hit } => (texture, quad, hit),
                    Prepared::Ignored => continue,
                    Prepared::Missing(why) => {
                        trace!("skip {:?} at ({tx}, {ty}): {why}", obj.kind());
                        report.missing += 1;
                        continue;
                    }
                };

                if !self.renderer.submit_quad(texture, &quad) {
                    trace!("renderer rejected {:?} at ({tx}, {ty})", obj.kind());
                    report.rejected += 1;
                    continue;
                }

                let submitted = cursor.value();
                cursor.advance();
                report.objects_rendered += 1;

                if self.wants_pick(obj.kind()) {
                    let corners = geometry::positions(&quad);
                    if is_hit(hit, &corners, texture, ctx.cursor, assets) {
                        self.candidates
                            .push(MouseOverItem::new(texture, corners, obj.clone(), submitted));
                    }
                }
            }
        }

        report.pick = FramePick::resolve(&self.candidates);
        report
    }

    fn wants_pick(&self, kind: ObjectKind) -> bool {
        match pick_flag(kind) {
            Some(flag) => self.debug_pick_all || self.pick_flags.contains(flag),
            None => false,
        }
    }
}

fn is_hit<A: Assets + ?Sized>(
    shape: HitShape,
    corners: &[Vec3; 4],
    texture: TextureId,
    cursor: Vec2,
    assets: &A,
) -> bool {
    match shape {
        HitShape::Sprite => {
            point_in_rect(corners[0], corners[3], cursor)
                && texel_hit(assets.textures(), texture, corners, cursor)
        }
        HitShape::Quad => point_in_quad(corners, cursor),
        HitShape::None => false,
    }
}

/// Screen geometry and hue for one object, following the per-variant rules.
fn prepare<A: Assets + ?Sized>(
    obj: &WorldObject,
    origin: Vec2,
    depth: f32,
    last_target: Option<Serial>,
    assets: &A,
) -> Prepared {
    let bank = assets.textures();
    let dims = |tex: TextureId| bank.size(tex).ok().map(|(w, h)| (w as i32, h as i32));

    match obj {
        WorldObject::Ground(g) => {
            if g.ignored {
                return Prepared::Ignored;
            }
            match g.stretch_texture {
                Some(texmap) if !g.wet => {
                    let Some(texture) = assets.texmap_texture(texmap) else {
                        return Prepared::Missing("no texmap");
                    };
                    Prepared::Ready {
                        texture,
                        quad: geometry::stretched_ground(origin, g.pos.z, g.corner_deltas, depth),
                        hit: HitShape::Quad,
                    }
                }
                _ => {
                    let Some(texture) = assets.land_texture(g.art_id) else {
                        return Prepared::Missing("no land art");
                    };
                    Prepared::Ready {
                        texture,
                        quad: geometry::flat_ground(origin, g.pos.z, depth),
                        hit: HitShape::Sprite,
                    }
                }
            }
        }

        WorldObject::Static(s) => {
            if s.ignored {
                return Prepared::Ignored;
            }
            let Some(texture) = assets.static_texture(s.art_id) else {
                return Prepared::Missing("no static art");
            };
            let (w, h) = assets.static_dimensions(s.art_id);
            let anchor = geometry::static_anchor(w, h, s.pos.z);
            Prepared::Ready {
                texture,
                quad: geometry::sprite_quad(origin, anchor, w, h, depth, Hue::NONE),
                hit: HitShape::Sprite,
            }
        }

        WorldObject::Mobile(m) => {
            let Some(frames) = assets.animation(m.body, m.action, m.facing, m.hue, false) else {
                return Prepared::Missing("no animation");
            };
            let Some(frame) = frames.get(m.frame_index(frames.len())) else {
                return Prepared::Missing("empty animation");
            };
            let Some((texture, (w, h))) = frame.texture.and_then(|t| Some((t, dims(t)?))) else {
                return Prepared::Missing("corrupt frame");
            };
            let hue = if last_target == Some(m.serial) {
                Hue::full(defs::notoriety_hue(m.notoriety) as i32 - 1)
            } else {
                decode_hue(m.hue)
            };
            let anchor = geometry::frame_anchor(frame.center, h, m.pos.z, m.offset);
            Prepared::Ready {
                texture,
                quad: geometry::sprite_quad(origin, anchor, w, h, depth, hue),
                hit: HitShape::Sprite,
            }
        }

        WorldObject::Corpse(c) => {
            let action = defs::death_action(c.body);
            let Some(frames) = assets.animation(c.body, action, c.facing, c.hue, false) else {
                return Prepared::Missing("no death animation");
            };
            let Some(frame) = frames.get(c.frame_index) else {
                return Prepared::Missing("corpse frame out of range");
            };
            let Some((texture, (w, h))) = frame.texture.and_then(|t| Some((t, dims(t)?))) else {
                return Prepared::Missing("corrupt frame");
            };
            let anchor = geometry::frame_anchor(frame.center, h, c.pos.z, Vec3::ZERO);
            Prepared::Ready {
                texture,
                quad: geometry::sprite_quad(origin, anchor, w, h, depth, decode_hue(c.hue)),
                hit: HitShape::Sprite,
            }
        }

        WorldObject::Item(i) => {
            let Some(texture) = assets.static_texture(i.art_id) else {
                return Prepared::Missing("no item art");
            };
            let (w, h) = assets.static_dimensions(i.art_id);
            let anchor = geometry::static_anchor(w, h, i.pos.z);
            Prepared::Ready {
                texture,
                quad: geometry::sprite_quad(origin, anchor, w, h, depth, decode_hue(i.hue)),
                hit: HitShape::Sprite,
            }
        }

        WorldObject::Text(t) => {
            let Some((w, h)) = dims(t.texture) else {
                return Prepared::Missing("label texture gone");
            };
            let anchor = geometry::label_anchor(w, h, t.pos.z, t.offset);
            Prepared::Ready {
                texture: t.texture,
                quad: geometry::sprite_quad(origin, anchor, w, h, depth, decode_hue(t.hue)),
                hit: HitShape::None,
            }
        }
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use glam::IVec2;

    use super::*;
    use crate::{
        engine::{hue::HueMode, types::Screen},
        renderer::recording::RecordingRenderer,
        world::{
            Corpse, Direction, Frame, GroundTile, ItemEntity, Mobile, Notoriety, StaticItem,
            TextLabel, Texture, TextureBank, TileMap, TilePos,
        },
    };

    const LAND: u16 = 3;
    const TEXMAP: u16 = 9;
    const CRATE: u16 = 100;
    const HUMAN: u16 = 400;

    struct TestAssets {
        bank: TextureBank,
        land: TextureId,
        texmap: TextureId,
        fallen: TextureId,
        statics: HashMap<u16, (TextureId, (i32, i32))>,
        anims: HashMap<(u16, u8), Vec<Frame>>,
    }

    impl TestAssets {
        fn new() -> Self {
            let mut bank = TextureBank::default_with_checker();
            let land = bank.insert("land", Texture::solid("land", 44, 44, 0xFF_00AA00)).unwrap();
            let texmap = bank.insert("tex", Texture::solid("tex", 64, 64, 0xFF_008800)).unwrap();
            let crate_tex = bank.insert("crate", Texture::solid("crate", 44, 60, 0xFF_AA5500)).unwrap();
            let body = bank.insert("body", Texture::solid("body", 30, 60, 0xFF_FFFFFF)).unwrap();
            let fallen = bank.insert("fallen", Texture::solid("fallen", 50, 20, 0xFF_C0C0C0)).unwrap();
            let mut statics = HashMap::new();
            statics.insert(CRATE, (crate_tex, (44, 60)));
            let frames = vec![
                Frame {
                    texture: Some(body),
                    center: IVec2::new(15, 0),
                },
                Frame {
                    texture: None,
                    center: IVec2::ZERO,
                },
            ];
            let death = vec![
                frames[0],
                Frame {
                    texture: Some(fallen),
                    center: IVec2::new(25, 0),
                },
            ];
            let mut anims = HashMap::new();
            anims.insert((HUMAN, 0), frames);
            anims.insert((HUMAN, defs::death_action(HUMAN)), death);
            Self {
                bank,
                land,
                texmap,
                fallen,
                statics,
                anims,
            }
        }
    }

    impl Assets for TestAssets {
        fn textures(&self) -> &TextureBank {
            &self.bank
        }
        fn static_texture(&self, art_id: u16) -> Option<TextureId> {
            self.statics.get(&art_id).map(|s| s.0)
        }
        fn static_dimensions(&self, art_id: u16) -> (i32, i32) {
            self.statics.get(&art_id).map(|s| s.1).unwrap_or((0, 0))
        }
        fn land_texture(&self, art_id: u16) -> Option<TextureId> {
            (art_id == LAND).then_some(self.land)
        }
        fn texmap_texture(&self, texture_id: u16) -> Option<TextureId> {
            (texture_id == TEXMAP).then_some(self.texmap)
        }
        fn animation(
            &self,
            body: u16,
            action: u8,
            _facing: Direction,
            _hue: u16,
            _mirrored: bool,
        ) -> Option<&[Frame]> {
            self.anims.get(&(body, action)).map(|f| f.as_slice())
        }
    }

    /// Counts streaming hints.
    struct CountingStore {
        map: TileMap,
        recenters: usize,
    }

    impl WorldStore for CountingStore {
        fn tile(&self, x: i32, y: i32) -> &crate::world::Tile {
            self.map.tile(x, y)
        }
        fn recenter(&mut self, _x: i32, _y: i32) {
            self.recenters += 1;
        }
    }

    fn ground_at(x: i32, y: i32, z: i32) -> WorldObject {
        WorldObject::Ground(GroundTile {
            pos: TilePos::new(x, y, z),
            art_id: LAND,
            ignored: false,
            wet: false,
            stretch_texture: None,
            corner_deltas: [0; 4],
        })
    }

    fn crate_at(x: i32, y: i32, z: i32) -> WorldObject {
        WorldObject::Static(StaticItem {
            pos: TilePos::new(x, y, z),
            art_id: CRATE,
            hue: 0,
            ignored: false,
        })
    }

    fn mobile_at(x: i32, y: i32, serial: Serial) -> Mobile {
        Mobile {
            pos: TilePos::new(x, y, 0),
            serial,
            body: HUMAN,
            hue: 0x0021,
            facing: Direction::South,
            action: 0,
            anim_progress: 0.0,
            offset: Vec3::ZERO,
            notoriety: Notoriety::Murderer,
        }
    }

    /// 200×200 screen; with a one-tile window the tile's top-left lands at (78, 78).
    fn ctx(center: ViewerState, cursor: Vec2) -> FrameContext {
        FrameContext {
            map_index: Some(0),
            screen: Screen::new(200, 200),
            minimized: false,
            cursor,
            center: Some(center),
            last_target: None,
        }
    }

    fn one_tile_engine() -> Engine<RecordingRenderer> {
        let config = EngineConfig {
            window_size: 1,
            ..EngineConfig::default()
        };
        Engine::new(RecordingRenderer::default(), config)
    }

    fn warmed(engine: &mut Engine<RecordingRenderer>, map: &mut TileMap, assets: &TestAssets) {
        let c = ctx(ViewerState::at(0, 0, 0), Vec2::ZERO);
        assert_eq!(
            engine.update(&c, map, assets),
            FrameOutcome::Skipped(SkipReason::WarmingUp)
        );
    }

    #[test]
    fn first_frame_is_warm_up() {
        let assets = TestAssets::new();
        let mut map = TileMap::new(0, 1, 1).unwrap();
        map.place(ground_at(0, 0, 0)).unwrap();
        let mut engine = one_tile_engine();
        engine.pick_flags = PickFlags::ALL;

        let c = ctx(ViewerState::at(0, 0, 0), Vec2::new(100.0, 100.0));
        let outcome = engine.update(&c, &mut map, &assets);
        assert_eq!(outcome, FrameOutcome::Skipped(SkipReason::WarmingUp));
        assert_eq!(engine.renderer.frames_begun, 0);
        assert!(engine.renderer.quads.is_empty());
        assert!(engine.foremost_ground_under_cursor().is_none());
        assert_eq!(engine.phase(), Phase::Active);

        let outcome = engine.update(&c, &mut map, &assets);
        assert_eq!(outcome.report().map(|r| r.objects_rendered), Some(1));
    }

    #[test]
    fn ground_and_static_scenario() {
        let assets = TestAssets::new();
        let mut map = TileMap::new(0, 1, 1).unwrap();
        map.place(ground_at(0, 0, 0)).unwrap();
        map.place(crate_at(0, 0, 0)).unwrap();

        let mut engine = one_tile_engine();
        engine.pick_flags = PickFlags::OBJECTS | PickFlags::GROUND_TILES;
        warmed(&mut engine, &mut map, &assets);

        // crate spans (78, 62)..(122, 122), ground (78, 78)..(122, 122)
        let c = ctx(ViewerState::at(0, 0, 0), Vec2::new(100.0, 100.0));
        engine.update(&c, &mut map, &assets);

        assert_eq!(engine.objects_rendered_last_frame(), 2);
        assert_eq!(engine.foremost_object_under_cursor(), Some(&crate_at(0, 0, 0)));
        assert_eq!(engine.foremost_ground_under_cursor(), Some(&ground_at(0, 0, 0)));

        let quads = &engine.renderer.quads;
        assert_eq!(quads[0].1[0].position, Vec3::new(78.0, 78.0, 0.0));
        assert_eq!(quads[1].1[0].position, Vec3::new(78.0, 62.0, 1.0));
    }

    #[test]
    fn cursor_above_ground_picks_only_static() {
        let assets = TestAssets::new();
        let mut map = TileMap::new(0, 1, 1).unwrap();
        map.place(ground_at(0, 0, 0)).unwrap();
        map.place(crate_at(0, 0, 0)).unwrap();
        let mut engine = one_tile_engine();
        engine.pick_flags = PickFlags::ALL;
        warmed(&mut engine, &mut map, &assets);

        engine.update(&ctx(ViewerState::at(0, 0, 0), Vec2::new(100.0, 70.0)), &mut map, &assets);
        assert_eq!(engine.foremost_object_under_cursor(), Some(&crate_at(0, 0, 0)));
        assert!(engine.foremost_ground_under_cursor().is_none());
    }

    #[test]
    fn traversal_is_deterministic() {
        let assets = TestAssets::new();
        let mut map = TileMap::new(0, 6, 6).unwrap();
        for x in 0..6 {
            for y in 0..6 {
                map.place(ground_at(x, y, 0)).unwrap();
                if (x + y) % 3 == 0 {
                    map.place(crate_at(x, y, 0)).unwrap();
                }
            }
        }
        let mut engine = Engine::new(
            RecordingRenderer::default(),
            EngineConfig {
                window_size: 6,
                ..EngineConfig::default()
            },
        );
        engine.pick_flags = PickFlags::ALL;
        let c = ctx(ViewerState::at(3, 3, 0), Vec2::new(100.0, 90.0));
        engine.update(&c, &mut map, &assets);

        let first = engine.update(&c, &mut map, &assets);
        let first_quads = engine.renderer.quads.clone();
        let second = engine.update(&c, &mut map, &assets);
        assert_eq!(first, second);
        assert_eq!(first_quads, engine.renderer.quads);

        let depths: Vec<f32> = first_quads.iter().map(|(_, q)| q[0].position.z).collect();
        let expected: Vec<f32> = (0..depths.len()).map(|d| d as f32).collect();
        assert_eq!(depths, expected);
    }

    #[test]
    fn roof_clip_hides_objects_at_and_above_limit() {
        let assets = TestAssets::new();
        let mut map = TileMap::new(0, 1, 1).unwrap();
        map.place(ground_at(0, 0, 0)).unwrap();
        map.place(crate_at(0, 0, 19)).unwrap();
        map.place(crate_at(0, 0, 20)).unwrap();
        map.place(crate_at(0, 0, 40)).unwrap();
        let mut engine = one_tile_engine();
        warmed(&mut engine, &mut map, &assets);

        engine.update(&ctx(ViewerState::at(0, 0, 0), Vec2::ZERO), &mut map, &assets);
        assert_eq!(engine.window().map(|w| w.max_roof_altitude), Some(20));
        assert_eq!(engine.objects_rendered_last_frame(), 2);
    }

    #[test]
    fn outdoors_draws_everything() {
        let assets = TestAssets::new();
        let mut map = TileMap::new(0, 1, 1).unwrap();
        map.place(crate_at(0, 0, 60)).unwrap();
        let mut engine = one_tile_engine();
        warmed(&mut engine, &mut map, &assets);
        // the viewer stands above the crate, so nothing hangs over them
        engine.update(&ctx(ViewerState::at(0, 0, 50), Vec2::ZERO), &mut map, &assets);
        assert_eq!(engine.objects_rendered_last_frame(), 1);
    }

    #[test]
    fn missing_assets_are_skipped_quietly() {
        let assets = TestAssets::new();
        let mut map = TileMap::new(0, 1, 1).unwrap();
        map.place(WorldObject::Static(StaticItem {
            pos: TilePos::new(0, 0, 0),
            art_id: 555,
            hue: 0,
            ignored: false,
        }))
        .unwrap();
        let mut unknown_body = mobile_at(0, 0, 1);
        unknown_body.body = 7;
        map.place(WorldObject::Mobile(unknown_body)).unwrap();
        let mut corrupt = mobile_at(0, 0, 2);
        corrupt.anim_progress = 0.9; // second frame has no texture
        map.place(WorldObject::Mobile(corrupt)).unwrap();
        map.place(WorldObject::Corpse(Corpse {
            pos: TilePos::new(0, 0, 0),
            serial: 3,
            body: HUMAN,
            hue: 0,
            facing: Direction::North,
            frame_index: 7,
        }))
        .unwrap();

        let mut engine = one_tile_engine();
        engine.pick_flags = PickFlags::ALL;
        warmed(&mut engine, &mut map, &assets);
        let outcome = engine.update(&ctx(ViewerState::at(0, 0, 0), Vec2::new(100.0, 100.0)), &mut map, &assets);
        let report = outcome.report().unwrap();
        assert_eq!(report.objects_rendered, 0);
        assert_eq!(report.missing, 4);
        assert!(engine.renderer.quads.is_empty());
        assert!(engine.foremost_object_under_cursor().is_none());
    }

    #[test]
    fn rejected_submission_is_not_counted_or_picked() {
        let assets = TestAssets::new();
        let mut map = TileMap::new(0, 1, 1).unwrap();
        map.place(ground_at(0, 0, 0)).unwrap();
        map.place(crate_at(0, 0, 0)).unwrap();
        let mut engine = one_tile_engine();
        engine.pick_flags = PickFlags::ALL;
        engine.renderer.reject = vec![1];
        warmed(&mut engine, &mut map, &assets);

        let outcome = engine.update(&ctx(ViewerState::at(0, 0, 0), Vec2::new(100.0, 100.0)), &mut map, &assets);
        assert_eq!(outcome.report().map(|r| r.rejected), Some(1));
        assert_eq!(engine.objects_rendered_last_frame(), 1);
        assert_eq!(engine.foremost_object_under_cursor(), Some(&ground_at(0, 0, 0)));
    }

    #[test]
    fn rejection_does_not_advance_depth() {
        let assets = TestAssets::new();
        let mut map = TileMap::new(0, 1, 1).unwrap();
        map.place(ground_at(0, 0, 0)).unwrap();
        map.place(crate_at(0, 0, 0)).unwrap();
        let mut engine = one_tile_engine();
        engine.renderer.reject = vec![0];
        warmed(&mut engine, &mut map, &assets);
        engine.update(&ctx(ViewerState::at(0, 0, 0), Vec2::ZERO), &mut map, &assets);
        assert_eq!(engine.renderer.quads.len(), 1);
        assert_eq!(engine.renderer.quads[0].1[0].position.z, 0.0);
    }

    #[test]
    fn ignored_tiles_are_not_missing() {
        let assets = TestAssets::new();
        let mut map = TileMap::new(0, 1, 1).unwrap();
        map.place(WorldObject::Ground(GroundTile {
            pos: TilePos::new(0, 0, 0),
            art_id: LAND,
            ignored: true,
            wet: false,
            stretch_texture: None,
            corner_deltas: [0; 4],
        }))
        .unwrap();
        let mut engine = one_tile_engine();
        warmed(&mut engine, &mut map, &assets);
        let outcome = engine.update(&ctx(ViewerState::at(0, 0, 0), Vec2::ZERO), &mut map, &assets);
        let report = outcome.report().unwrap();
        assert_eq!((report.objects_rendered, report.missing), (0, 0));
    }

    #[test]
    fn stretched_ground_uses_diamond_hit_test() {
        let assets = TestAssets::new();
        let mut map = TileMap::new(0, 1, 1).unwrap();
        let hill = WorldObject::Ground(GroundTile {
            pos: TilePos::new(0, 0, 0),
            art_id: LAND,
            ignored: false,
            wet: false,
            stretch_texture: Some(TEXMAP),
            corner_deltas: [0, 0, 0, 0],
        });
        map.place(hill.clone()).unwrap();
        let mut engine = one_tile_engine();
        engine.pick_flags = PickFlags::GROUND_TILES;
        warmed(&mut engine, &mut map, &assets);

        // diamond centre
        engine.update(&ctx(ViewerState::at(0, 0, 0), Vec2::new(100.0, 100.0)), &mut map, &assets);
        assert_eq!(engine.foremost_ground_under_cursor(), Some(&hill));
        assert_eq!(engine.renderer.quads[0].0, assets.texmap);
        // inside the bounding box but outside the diamond
        engine.update(&ctx(ViewerState::at(0, 0, 0), Vec2::new(80.0, 80.0)), &mut map, &assets);
        assert!(engine.foremost_ground_under_cursor().is_none());
    }

    #[test]
    fn wet_ground_is_drawn_flat() {
        let assets = TestAssets::new();
        let mut map = TileMap::new(0, 1, 1).unwrap();
        map.place(WorldObject::Ground(GroundTile {
            pos: TilePos::new(0, 0, 0),
            art_id: LAND,
            ignored: false,
            wet: true,
            stretch_texture: Some(TEXMAP),
            corner_deltas: [0, 3, 3, 0],
        }))
        .unwrap();
        let mut engine = one_tile_engine();
        warmed(&mut engine, &mut map, &assets);
        engine.update(&ctx(ViewerState::at(0, 0, 0), Vec2::ZERO), &mut map, &assets);
        assert_eq!(engine.renderer.quads[0].0, assets.land);
    }

    #[test]
    fn targeted_mobile_gets_notoriety_hue() {
        let assets = TestAssets::new();
        let mut map = TileMap::new(0, 1, 1).unwrap();
        map.place(WorldObject::Mobile(mobile_at(0, 0, 42))).unwrap();
        let mut engine = one_tile_engine();
        warmed(&mut engine, &mut map, &assets);

        let mut c = ctx(ViewerState::at(0, 0, 0), Vec2::ZERO);
        engine.update(&c, &mut map, &assets);
        let plain = Hue::from_vec2(engine.renderer.quads[0].1[0].hue);
        assert_eq!(plain, decode_hue(0x0021));

        c.last_target = Some(42);
        engine.update(&c, &mut map, &assets);
        let marked = Hue::from_vec2(engine.renderer.quads[0].1[0].hue);
        assert_eq!(marked.mode, HueMode::Full);
        assert_eq!(marked.value, defs::notoriety_hue(Notoriety::Murderer) as i32 - 1);
    }

    #[test]
    fn pick_flags_select_variants() {
        let assets = TestAssets::new();
        let mut map = TileMap::new(0, 1, 1).unwrap();
        map.place(crate_at(0, 0, 0)).unwrap();
        map.place(WorldObject::Mobile(mobile_at(0, 0, 5))).unwrap();
        map.place(WorldObject::Item(ItemEntity {
            pos: TilePos::new(0, 0, 0),
            serial: 6,
            art_id: CRATE,
            hue: 0,
        }))
        .unwrap();
        let mut engine = one_tile_engine();
        warmed(&mut engine, &mut map, &assets);
        let c = ctx(ViewerState::at(0, 0, 0), Vec2::new(100.0, 95.0));

        engine.pick_flags = PickFlags::STATICS;
        engine.update(&c, &mut map, &assets);
        assert_eq!(engine.foremost_object_under_cursor().map(|o| o.kind()), Some(ObjectKind::Static));

        engine.pick_flags = PickFlags::MOBILES;
        engine.update(&c, &mut map, &assets);
        assert_eq!(engine.foremost_object_under_cursor().map(|o| o.kind()), Some(ObjectKind::Mobile));

        engine.pick_flags = PickFlags::ITEMS;
        engine.update(&c, &mut map, &assets);
        assert_eq!(engine.foremost_object_under_cursor().map(|o| o.kind()), Some(ObjectKind::Item));

        engine.pick_flags = PickFlags::empty();
        engine.update(&c, &mut map, &assets);
        assert!(engine.foremost_object_under_cursor().is_none());

        engine.debug_pick_all = true;
        engine.update(&c, &mut map, &assets);
        // mobiles sort after items on the same altitude
        assert_eq!(engine.foremost_object_under_cursor().map(|o| o.kind()), Some(ObjectKind::Mobile));
    }

    #[test]
    fn labels_draw_but_never_pick() {
        let mut assets = TestAssets::new();
        let label_tex = assets
            .bank
            .insert("label", Texture::solid("label", 40, 12, 0xFF_FFFFFF))
            .unwrap();
        let mut map = TileMap::new(0, 1, 1).unwrap();
        map.place(WorldObject::Text(TextLabel {
            pos: TilePos::new(0, 0, 0),
            texture: label_tex,
            hue: 0,
            offset: Vec3::ZERO,
        }))
        .unwrap();
        let mut engine = one_tile_engine();
        engine.debug_pick_all = true;
        warmed(&mut engine, &mut map, &assets);

        // label spans (80, 110)..(120, 122)
        engine.update(&ctx(ViewerState::at(0, 0, 0), Vec2::new(100.0, 115.0)), &mut map, &assets);
        assert_eq!(engine.objects_rendered_last_frame(), 1);
        assert_eq!(engine.renderer.quads[0].1[0].position.truncate(), Vec2::new(80.0, 110.0));
        assert!(engine.foremost_object_under_cursor().is_none());
    }

    #[test]
    fn degenerate_frames_are_noops() {
        let assets = TestAssets::new();
        let mut map = TileMap::new(0, 1, 1).unwrap();
        let mut engine = one_tile_engine();

        let mut c = ctx(ViewerState::at(0, 0, 0), Vec2::ZERO);
        c.map_index = None;
        assert_eq!(engine.update(&c, &mut map, &assets), FrameOutcome::Skipped(SkipReason::NoMap));
        c.map_index = Some(0);
        c.center = None;
        assert_eq!(engine.update(&c, &mut map, &assets), FrameOutcome::Skipped(SkipReason::NoCenter));
        // neither consumed the warm-up frame
        assert_eq!(engine.phase(), Phase::WarmingUp);

        let mut c = ctx(ViewerState::at(0, 0, 0), Vec2::ZERO);
        c.minimized = true;
        assert_eq!(engine.update(&c, &mut map, &assets), FrameOutcome::Skipped(SkipReason::Minimized));
        assert_eq!(engine.renderer.frames_begun, 0);
    }

    #[test]
    fn window_recomputes_only_when_tile_or_map_changes() {
        let assets = TestAssets::new();
        let mut store = CountingStore {
            map: TileMap::new(0, 4, 4).unwrap(),
            recenters: 0,
        };
        let mut engine = one_tile_engine();

        let here = ViewerState::at(1, 1, 0);
        engine.update(&ctx(here, Vec2::ZERO), &mut store, &assets);
        engine.update(&ctx(here, Vec2::ZERO), &mut store, &assets);
        let nudged = ViewerState::new(here.tile, Vec3::new(0.3, 0.0, 0.0));
        engine.update(&ctx(nudged, Vec2::ZERO), &mut store, &assets);
        assert_eq!(store.recenters, 1);

        engine.update(&ctx(ViewerState::at(2, 1, 0), Vec2::ZERO), &mut store, &assets);
        assert_eq!(store.recenters, 2);
        assert_eq!(engine.window().map(|w| w.origin_x), Some(2));

        let mut other_map = ctx(ViewerState::at(2, 1, 0), Vec2::ZERO);
        other_map.map_index = Some(1);
        engine.update(&other_map, &mut store, &assets);
        assert_eq!(store.recenters, 3);
    }

    #[test]
    fn light_uniforms_follow_knobs() {
        let mut engine = one_tile_engine();
        assert_eq!(engine.renderer.light_updates, 1);
        assert!((engine.renderer.directional.unwrap() - 0.5).abs() < 1e-6);

        engine.set_overall_brightness(30);
        assert_eq!(engine.renderer.light_updates, 2);
        assert!((engine.renderer.directional.unwrap() + 0.3).abs() < 1e-6);
        assert!((engine.renderer.ambient.unwrap() + 0.24).abs() < 1e-6);

        engine.set_overall_brightness(30);
        engine.set_personal_brightness(0);
        assert_eq!(engine.renderer.light_updates, 2);

        engine.set_light_direction(std::f32::consts::FRAC_PI_2);
        let dir = engine.renderer.light_direction.unwrap();
        assert!((dir - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-6);
    }

    #[test]
    fn overlay_outlines_last_picks() {
        let assets = TestAssets::new();
        let mut map = TileMap::new(0, 1, 1).unwrap();
        map.place(ground_at(0, 0, 0)).unwrap();
        map.place(crate_at(0, 0, 0)).unwrap();
        let mut engine = one_tile_engine();
        engine.config.debug_overlay = true;
        engine.pick_flags = PickFlags::ALL;
        warmed(&mut engine, &mut map, &assets);

        engine.update(&ctx(ViewerState::at(0, 0, 0), Vec2::new(100.0, 100.0)), &mut map, &assets);
        let mut flushed = false;
        engine.draw(&assets, |_, _, _| flushed = true);
        assert!(flushed);
        assert_eq!(engine.renderer.outlines.len(), 2);
        assert_eq!(engine.renderer.outlines[0].1, OBJECT_OUTLINE);
    }

    #[test]
    fn corpse_uses_death_frame_and_item_pick() {
        let assets = TestAssets::new();
        let mut map = TileMap::new(0, 1, 1).unwrap();
        let corpse = WorldObject::Corpse(Corpse {
            pos: TilePos::new(0, 0, 0),
            serial: 9,
            body: HUMAN,
            hue: 0x0021,
            facing: Direction::East,
            frame_index: 1,
        });
        map.place(corpse.clone()).unwrap();
        let mut engine = one_tile_engine();
        warmed(&mut engine, &mut map, &assets);

        // fallen frame 50×20 centred at (25, 0): spans (75, 80)..(125, 100)
        let c = ctx(ViewerState::at(0, 0, 0), Vec2::new(100.0, 90.0));
        engine.pick_flags = PickFlags::ITEMS;
        engine.update(&c, &mut map, &assets);
        let (texture, quad) = engine.renderer.quads[0];
        assert_eq!(texture, assets.fallen);
        assert_eq!(quad[0].position, Vec3::new(75.0, 80.0, 0.0));
        assert_eq!(quad[3].position, Vec3::new(125.0, 100.0, 0.0));
        assert!(quad.iter().all(|v| Hue::from_vec2(v.hue) == decode_hue(0x0021)));
        assert_eq!(engine.foremost_object_under_cursor(), Some(&corpse));

        engine.pick_flags = PickFlags::MOBILES | PickFlags::STATICS;
        engine.update(&c, &mut map, &assets);
        assert!(engine.foremost_object_under_cursor().is_none());
    }

    #[test]
    fn item_hue_reaches_vertices() {
        let assets = TestAssets::new();
        let mut engine = one_tile_engine();
        let mut map = TileMap::new(0, 1, 1).unwrap();
        warmed(&mut engine, &mut map, &assets);

        for (raw, mode, value) in [
            (0x0000, HueMode::None, 0),
            (0x0035, HueMode::Full, 0x34),
            (0x8035, HueMode::Partial, 0x34),
            (0x4001, HueMode::Transparent, 0),
        ] {
            let mut map = TileMap::new(0, 1, 1).unwrap();
            map.place(WorldObject::Item(ItemEntity {
                pos: TilePos::new(0, 0, 0),
                serial: 6,
                art_id: CRATE,
                hue: raw,
            }))
            .unwrap();
            engine.update(&ctx(ViewerState::at(0, 0, 0), Vec2::ZERO), &mut map, &assets);
            let quad = engine.renderer.quads[0].1;
            for v in quad {
                assert_eq!(Hue::from_vec2(v.hue), Hue { value, mode }, "hue {raw:#06x}");
            }
        }
    }

    #[test]
    fn skipped_frames_present_nothing() {
        let assets = TestAssets::new();
        let mut map = TileMap::new(0, 1, 1).unwrap();
        map.place(ground_at(0, 0, 0)).unwrap();
        map.place(crate_at(0, 0, 0)).unwrap();
        let mut engine = one_tile_engine();
        engine.config.debug_overlay = true;
        engine.pick_flags = PickFlags::ALL;

        let mut flushed = 0;
        warmed(&mut engine, &mut map, &assets);
        assert!(!engine.draw(&assets, |_, _, _| flushed += 1));

        let mut c = ctx(ViewerState::at(0, 0, 0), Vec2::new(100.0, 100.0));
        engine.update(&c, &mut map, &assets);
        assert!(engine.draw(&assets, |_, _, _| flushed += 1));
        // a second draw for the same update is a no-op
        assert!(!engine.draw(&assets, |_, _, _| flushed += 1));
        assert_eq!((flushed, engine.renderer.frames_ended), (1, 1));

        c.minimized = true;
        for _ in 0..5 {
            assert_eq!(
                engine.update(&c, &mut map, &assets),
                FrameOutcome::Skipped(SkipReason::Minimized)
            );
            assert!(!engine.draw(&assets, |_, _, _| flushed += 1));
        }
        assert_eq!((flushed, engine.renderer.frames_ended), (1, 1));
        assert_eq!(engine.renderer.outlines.len(), 2);
    }

    #[test]
    fn software_output_is_stable_across_skipped_frames() {
        let assets = TestAssets::new();
        let mut map = TileMap::new(0, 1, 1).unwrap();
        map.place(ground_at(0, 0, 0)).unwrap();
        map.place(WorldObject::Item(ItemEntity {
            pos: TilePos::new(0, 0, 0),
            serial: 6,
            art_id: CRATE,
            hue: 0x4001,
        }))
        .unwrap();
        let config = EngineConfig {
            window_size: 1,
            debug_overlay: true,
            ..EngineConfig::default()
        };
        let mut engine = Engine::new(crate::renderer::Software::default(), config);
        engine.pick_flags = PickFlags::ALL;

        let mut c = ctx(ViewerState::at(0, 0, 0), Vec2::new(100.0, 100.0));
        engine.update(&c, &mut map, &assets);
        engine.update(&c, &mut map, &assets);
        let mut first = Vec::new();
        assert!(engine.draw(&assets, |px, _, _| first = px.to_vec()));
        assert_eq!(first.len(), 200 * 200);

        c.minimized = true;
        for _ in 0..5 {
            engine.update(&c, &mut map, &assets);
            assert!(!engine.draw(&assets, |_, _, _| panic!("skipped frame presented")));
        }
        assert_eq!(engine.renderer.queued(), 0);

        c.minimized = false;
        engine.update(&c, &mut map, &assets);
        let mut again = Vec::new();
        assert!(engine.draw(&assets, |px, _, _| again = px.to_vec()));
        assert_eq!(first, again);
    }
}
