use glam::Vec2;

use crate::{
    engine::picking::FramePick,
    world::{ROOF_CLEARANCE, Serial, ViewerState},
};

/// Constants that depend on the *back-buffer*, not on the map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Screen {
    pub w: usize,
    pub h: usize,
}

impl Screen {
    pub fn new(w: usize, h: usize) -> Self {
        Self { w, h }
    }
}

/// Everything the host knows about this frame.  Passed to every update
/// instead of living in ambient globals.
#[derive(Clone, Copy, Debug)]
pub struct FrameContext {
    /// `None` while no map is loaded.
    pub map_index: Option<u32>,
    pub screen: Screen,
    pub minimized: bool,
    /// Cursor in back-buffer pixels, same space as quad vertices.
    pub cursor: Vec2,
    pub center: Option<ViewerState>,
    /// Serial of the currently targeted mobile, highlighted when drawn.
    pub last_target: Option<Serial>,
}

impl FrameContext {
    pub fn new(screen: Screen) -> Self {
        Self {
            map_index: None,
            screen,
            minimized: false,
            cursor: Vec2::ZERO,
            center: None,
            last_target: None,
        }
    }
}

/// Engine tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Side of the square tile window walked each frame.
    pub window_size: i32,
    /// Altitude above the viewer at which indoor clipping starts.
    pub roof_clearance: i32,
    /// Outline last frame's picks during `draw`.
    pub debug_overlay: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_size: 40,
            roof_clearance: ROOF_CLEARANCE,
            debug_overlay: false,
        }
    }
}

/// The first traversal after construction is a warm-up and draws nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    WarmingUp,
    Active,
}

/// Why a frame produced no draw calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    NoMap,
    NoCenter,
    Minimized,
    WarmingUp,
}

/// Statistics and picks of one finished traversal.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    pub objects_rendered: usize,
    /// Submissions the renderer declined.
    pub rejected: usize,
    /// Objects skipped for a missing asset or corrupt frame.
    pub missing: usize,
    pub pick: FramePick,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FrameOutcome {
    Skipped(SkipReason),
    Drawn(FrameReport),
}

impl FrameOutcome {
    pub fn report(&self) -> Option<&FrameReport> {
        match self {
            FrameOutcome::Drawn(r) => Some(r),
            FrameOutcome::Skipped(_) => None,
        }
    }
}
