//! Per-frame isometric traversal: viewport window, roof clipping, painter's
//! order submission and mouse-over picking.

pub mod engine;
pub mod geometry;
pub mod hue;
pub mod light;
pub mod picking;
pub mod types;
pub mod viewport;

pub use engine::{DrawCursor, Engine};
pub use hue::{Hue, HueMode, decode_hue};
pub use light::{LightKnobs, LightState};
pub use picking::{FramePick, MouseOverItem, MouseOverList};
pub use types::{EngineConfig, FrameContext, FrameOutcome, FrameReport, Phase, Screen, SkipReason};
pub use viewport::{OPEN_SKY, ViewportWindow};
