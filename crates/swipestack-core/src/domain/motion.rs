//! Motion state and rendered frames.

use serde::{Deserialize, Serialize};

use super::decision::SwipeDirection;
use super::events::Settlement;
use super::ids::ItemId;
use super::state::SessionState;

/// The animated transform of one card.
///
/// `x`/`y` in px, `rotation` in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub scale: f32,
    pub opacity: f32,
}

impl Pose {
    /// Resting pose of the active card.
    pub const NEUTRAL: Pose = Pose {
        x: 0.0,
        y: 0.0,
        rotation: 0.0,
        scale: 1.0,
        opacity: 1.0,
    };

    pub fn with_scale_opacity(scale: f32, opacity: f32) -> Self {
        Self {
            scale,
            opacity,
            ..Self::NEUTRAL
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// A card and where it is drawn this frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardFrame {
    pub item_id: ItemId,
    pub pose: Pose,
}

/// Everything the presentation layer needs for one animation tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    pub state: SessionState,

    pub active: Option<CardFrame>,

    pub next: Option<CardFrame>,

    /// Tick/cross hint while a drag is past the indicator threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<SwipeDirection>,

    /// Set on the one tick where the resolve animation settled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settled: Option<Settlement>,
}

impl RenderFrame {
    pub fn exhausted() -> Self {
        Self {
            state: SessionState::Exhausted,
            active: None,
            next: None,
            feedback: None,
            settled: None,
        }
    }
}
