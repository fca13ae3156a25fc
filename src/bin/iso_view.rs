use std::time::{Duration, Instant};

use clap::Parser;
use log::info;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use isoview_rs::{
    defs::PickFlags,
    engine::{Engine, EngineConfig, FrameContext, Screen},
    renderer::Software,
    sim::{SIM_FPS, TicRunner, standing_height},
    world::{Serial, TileMap, ViewerState, WorldObject, sample},
};

/// Interactive isometric viewer over a generated sample world.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[arg(long, default_value_t = 1280)]
    width: usize,
    #[arg(long, default_value_t = 800)]
    height: usize,
    /// Side of the tile window drawn around the viewer.
    #[arg(long, default_value_t = 40)]
    window_size: i32,
    #[arg(long, default_value_t = 96)]
    map_size: i32,
    #[arg(long, default_value_t = 1)]
    seed: u64,
    #[arg(long, default_value_t = 24)]
    mobiles: usize,
    /// nothing | ground | statics | mobiles | items | objects | all
    #[arg(long, default_value = "all", value_parser = parse_pick)]
    pick: PickFlags,
    #[arg(long)]
    debug_overlay: bool,
    #[arg(long, default_value_t = 0)]
    personal: i32,
    #[arg(long, default_value_t = 0)]
    overall: i32,
}

fn parse_pick(name: &str) -> Result<PickFlags, String> {
    PickFlags::from_cli_name(name).ok_or_else(|| format!("unknown pick mode `{name}`"))
}

/// Tiles per frame while an arrow key is held.
const PAN_SPEED: f32 = 0.15;

/// Move the viewer in screen directions, rolling whole tiles out of the offset.
fn pan(view: &mut ViewerState, right: f32, down: f32, map: &TileMap) {
    view.offset.x += right + down;
    view.offset.y += down - right;
    for (off, tile, max) in [
        (&mut view.offset.x, &mut view.tile.x, map.width()),
        (&mut view.offset.y, &mut view.tile.y, map.height()),
    ] {
        while *off >= 0.5 {
            *off -= 1.0;
            *tile += 1;
        }
        while *off < -0.5 {
            *off += 1.0;
            *tile -= 1;
        }
        if *tile < 0 || *tile >= max {
            *tile = (*tile).clamp(0, max - 1);
            *off = 0.0;
        }
    }
    if let Some(z) = standing_height(map, view.tile.x, view.tile.y) {
        view.tile.z = z;
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut world = sample::generate(args.map_size, args.seed, args.mobiles)?;
    info!(
        "sample world {0}x{0}, seed {1}, {2} mobiles",
        args.map_size,
        args.seed,
        world.mobiles.len()
    );

    let mut sim = TicRunner::new();
    for m in &world.mobiles {
        sim.spawn_mobile(m);
    }
    sim.sync(&mut world.map);

    let config = EngineConfig {
        window_size: args.window_size,
        debug_overlay: args.debug_overlay,
        ..EngineConfig::default()
    };
    let mut engine = Engine::new(Software::default(), config);
    engine.pick_flags = args.pick;
    engine.set_personal_brightness(args.personal);
    engine.set_overall_brightness(args.overall);

    let mut win = Window::new(
        "isoview",
        args.width,
        args.height,
        WindowOptions::default(),
    )?;
    win.set_target_fps(60);

    let mut ctx = FrameContext::new(Screen::new(args.width, args.height));
    ctx.map_index = Some(world.map.index);
    let mut view = world.spawn;
    let mut light_angle = 0.0_f32;
    let mut overall = args.overall;
    let mut last_hover: Option<WorldObject> = None;

    // ────────────────── benchmarking state ──────────────────────────────
    let mut acc_time = Duration::ZERO;
    let mut acc_frames = 0usize;
    let mut last_print = Instant::now();

    while win.is_open() && !win.is_key_down(Key::Escape) {
        let t0 = Instant::now();

        /* viewer ---------------------------------------------------------- */
        let mut right = 0.0;
        let mut down = 0.0;
        if win.is_key_down(Key::Right) || win.is_key_down(Key::D) {
            right += PAN_SPEED;
        }
        if win.is_key_down(Key::Left) || win.is_key_down(Key::A) {
            right -= PAN_SPEED;
        }
        if win.is_key_down(Key::Down) || win.is_key_down(Key::S) {
            down += PAN_SPEED;
        }
        if win.is_key_down(Key::Up) || win.is_key_down(Key::W) {
            down -= PAN_SPEED;
        }
        if right != 0.0 || down != 0.0 {
            pan(&mut view, right, down, &world.map);
        }

        /* light & debug toggles ------------------------------------------- */
        if win.is_key_pressed(Key::PageUp, KeyRepeat::Yes) {
            overall = (overall - 1).max(0);
        }
        if win.is_key_pressed(Key::PageDown, KeyRepeat::Yes) {
            overall = (overall + 1).min(30);
        }
        engine.set_overall_brightness(overall);
        if win.is_key_down(Key::L) {
            light_angle = (light_angle + 0.02).rem_euclid(std::f32::consts::TAU);
            engine.set_light_direction(light_angle);
        }
        if win.is_key_pressed(Key::Tab, KeyRepeat::No) {
            engine.config.debug_overlay = !engine.config.debug_overlay;
        }
        if win.is_key_pressed(Key::P, KeyRepeat::No) {
            engine.debug_pick_all = !engine.debug_pick_all;
            info!("pick everything: {}", engine.debug_pick_all);
        }

        /* simulation ------------------------------------------------------ */
        sim.pump(&mut world.map);

        /* frame ----------------------------------------------------------- */
        if let Some((mx, my)) = win.get_mouse_pos(MouseMode::Clamp) {
            ctx.cursor = glam::Vec2::new(mx, my);
        }
        ctx.center = Some(view);
        engine.update(&ctx, &mut world.map, &world.assets);

        let hover = engine.foremost_object_under_cursor().cloned();
        if hover != last_hover {
            if let Some(obj) = &hover {
                match obj.serial() {
                    Some(serial) => info!("over {:?} {serial:#x} at {:?}", obj.kind(), obj.pos()),
                    None => info!("over {:?} at {:?}", obj.kind(), obj.pos()),
                }
            }
            last_hover = hover;
        }
        if win.get_mouse_down(MouseButton::Left) {
            let target: Option<Serial> = match &last_hover {
                Some(WorldObject::Mobile(m)) => Some(m.serial),
                _ => None,
            };
            if target != ctx.last_target {
                info!("target {target:?}");
                ctx.last_target = target;
            }
        }

        let mut shown = Ok(());
        let presented = engine.draw(&world.assets, |fb, w, h| {
            acc_time += t0.elapsed();
            acc_frames += 1;
            shown = win.update_with_buffer(fb, w, h);
        });
        shown?;
        if !presented {
            // keep input flowing on frames that were not drawn
            win.update();
        }

        if last_print.elapsed() >= Duration::from_secs(3) {
            let avg_ms = acc_time.as_secs_f64() * 1000.0 / acc_frames.max(1) as f64;
            info!(
                "avg frame: {:.2} ms ({:.1} FPS), {} objects, sim {} Hz",
                avg_ms,
                1000.0 / avg_ms,
                engine.objects_rendered_last_frame(),
                SIM_FPS
            );
            acc_time = Duration::ZERO;
            acc_frames = 0;
            last_print = Instant::now();
        }
    }
    Ok(())
}
