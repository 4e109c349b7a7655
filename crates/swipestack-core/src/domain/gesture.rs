//! Pointer input and the per-event gesture sample.
//!
//! Coordinates are in px, timestamps in ms, velocities in px/ms (sign-carrying).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// A raw pointer/touch event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    #[serde(default)]
    pub pointer_id: u32,
    pub phase: PointerPhase,
    pub x: f32,
    pub y: f32,
    pub time_ms: f64,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, x: f32, y: f32, time_ms: f64) -> Self {
        Self {
            pointer_id: 0,
            phase,
            x,
            y,
            time_ms,
        }
    }

    pub fn down(x: f32, y: f32, time_ms: f64) -> Self {
        Self::new(PointerPhase::Down, x, y, time_ms)
    }

    pub fn moved(x: f32, y: f32, time_ms: f64) -> Self {
        Self::new(PointerPhase::Move, x, y, time_ms)
    }

    pub fn up(x: f32, y: f32, time_ms: f64) -> Self {
        Self::new(PointerPhase::Up, x, y, time_ms)
    }

    pub fn with_pointer(mut self, pointer_id: u32) -> Self {
        self.pointer_id = pointer_id;
        self
    }
}

/// The current drag relative to its start.
///
/// Recomputed on every input event and discarded on release.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GestureSample {
    pub dx: f32,
    pub dy: f32,
    pub velocity_x: f32,
    pub velocity_y: f32,
    pub is_active: bool,
}

impl GestureSample {
    pub fn speed(&self) -> f32 {
        self.velocity_x.hypot(self.velocity_y)
    }

    /// Same sample, marked as released.
    pub fn released(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// Spacing of synthesized move events.
pub const STROKE_FRAME_MS: f64 = 16.0;

/// Upper bound on approach moves per stroke (a few seconds of frames).
pub const MAX_STROKE_STEPS: u32 = 240;

fn default_steps() -> u32 {
    8
}

/// A scripted straight-line drag.
///
/// The pointer travels to `(dx, dy)`; the last move segment runs at the release
/// velocity, so the tracker reports exactly that velocity when the pointer lifts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub dx: f32,
    pub dy: f32,
    #[serde(default)]
    pub velocity_x: f32,
    #[serde(default)]
    pub velocity_y: f32,
    #[serde(default = "default_steps")]
    pub steps: u32,
    #[serde(default)]
    pub pointer_id: u32,
}

impl Stroke {
    pub fn new(dx: f32, dy: f32) -> Self {
        Self {
            dx,
            dy,
            velocity_x: 0.0,
            velocity_y: 0.0,
            steps: default_steps(),
            pointer_id: 0,
        }
    }

    pub fn with_release_velocity(mut self, velocity_x: f32, velocity_y: f32) -> Self {
        self.velocity_x = velocity_x;
        self.velocity_y = velocity_y;
        self
    }

    pub fn with_pointer(mut self, pointer_id: u32) -> Self {
        self.pointer_id = pointer_id;
        self
    }

    /// Down, `steps` approach moves, one release-velocity move, then up.
    pub fn events(&self, start_ms: f64) -> Vec<PointerEvent> {
        let steps = self.step_count();
        let frame = STROKE_FRAME_MS as f32;
        let approach_x = self.dx - self.velocity_x * frame;
        let approach_y = self.dy - self.velocity_y * frame;

        let mut t = start_ms;
        let mut events = Vec::with_capacity(steps as usize + 3);
        events.push(PointerEvent::down(0.0, 0.0, t).with_pointer(self.pointer_id));

        for i in 1..=steps {
            let frac = i as f32 / steps as f32;
            t += STROKE_FRAME_MS;
            events.push(
                PointerEvent::moved(approach_x * frac, approach_y * frac, t)
                    .with_pointer(self.pointer_id),
            );
        }

        t += STROKE_FRAME_MS;
        events.push(PointerEvent::moved(self.dx, self.dy, t).with_pointer(self.pointer_id));
        events.push(PointerEvent::up(self.dx, self.dy, t).with_pointer(self.pointer_id));
        events
    }

    /// Time from the down event to the release.
    pub fn duration_ms(&self) -> f64 {
        STROKE_FRAME_MS * (self.step_count() as f64 + 1.0)
    }

    fn step_count(&self) -> u32 {
        self.steps.clamp(1, MAX_STROKE_STEPS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stroke_starts_with_down_and_ends_with_up_at_target() {
        let events = Stroke::new(120.0, -4.0).events(0.0);
        assert_eq!(events.first().map(|e| e.phase), Some(PointerPhase::Down));

        let last = events.last().copied().unwrap();
        assert_eq!(last.phase, PointerPhase::Up);
        assert_eq!((last.x, last.y), (120.0, -4.0));
        assert_eq!(last.time_ms, Stroke::new(120.0, -4.0).duration_ms());
    }

    #[test]
    fn stroke_final_segment_runs_at_release_velocity() {
        let events = Stroke::new(10.0, 0.0)
            .with_release_velocity(0.25, 0.0)
            .events(100.0);
        let n = events.len();
        let before = events[n - 3];
        let last_move = events[n - 2];
        let vx = (last_move.x - before.x) / (last_move.time_ms - before.time_ms) as f32;
        assert!((vx - 0.25).abs() < 1e-6);
    }

    #[test]
    fn stroke_json_defaults() {
        let stroke: Stroke = serde_json::from_str(r#"{"dx": -30, "dy": 0}"#).unwrap();
        assert_eq!(stroke.steps, 8);
        assert_eq!(stroke.velocity_x, 0.0);
        assert_eq!(stroke.pointer_id, 0);
    }

    #[test]
    fn oversized_step_count_is_clamped() {
        let stroke: Stroke =
            serde_json::from_str(r#"{"dx": 50, "dy": 0, "steps": 4000000000}"#).unwrap();
        let events = stroke.events(0.0);
        assert_eq!(events.len(), MAX_STROKE_STEPS as usize + 3);
        assert_eq!(events.last().map(|e| e.time_ms), Some(stroke.duration_ms()));
    }

    #[test]
    fn sample_speed_combines_axes() {
        let s = GestureSample {
            dx: 3.0,
            dy: 4.0,
            velocity_x: 0.3,
            velocity_y: 0.4,
            is_active: true,
        };
        assert!((s.speed() - 0.5).abs() < 1e-6);
        assert!(!s.released().is_active);
    }
}
