//! Gesture Tracker - ポインタイベントを GestureSample に変換
//!
//! # 学習ポイント
//! - 1 ジェスチャ = 1 ポインタ。2 本目のポインタは無視する
//! - 速度は直前イベントとの差分（瞬間速度, px/ms）
//! - 副作用なし。判断（commit するか）は Classifier の仕事

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{GestureSample, PointerEvent};

/// Why an input event was dropped. Never surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    #[error("event targets a background item")]
    NotCurrentItem,

    #[error("previous gesture is still resolving")]
    Busy,

    #[error("queue is exhausted")]
    Exhausted,

    #[error("a gesture is already being tracked")]
    AlreadyTracking,

    #[error("no gesture in progress")]
    NoGesture,

    #[error("event from a second pointer")]
    OtherPointer,

    #[error("timestamp went backwards")]
    NonMonotonicTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// A release this long after the last move, without moving, reports zero velocity.
    pub stale_release_ms: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            stale_release_ms: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Track {
    pointer_id: u32,
    origin: (f32, f32),
    last: (f32, f32),
    last_time_ms: f64,
    velocity: (f32, f32),
    moved: bool,
}

impl Track {
    fn sample(&self, is_active: bool) -> GestureSample {
        GestureSample {
            dx: self.last.0 - self.origin.0,
            dy: self.last.1 - self.origin.1,
            velocity_x: self.velocity.0,
            velocity_y: self.velocity.1,
            is_active,
        }
    }

    fn update(&mut self, event: &PointerEvent) -> Result<(), IgnoreReason> {
        let dt = event.time_ms - self.last_time_ms;
        if dt < 0.0 {
            return Err(IgnoreReason::NonMonotonicTime);
        }
        if dt > 0.0 {
            let dt = dt as f32;
            self.velocity = (
                (event.x - self.last.0) / dt,
                (event.y - self.last.1) / dt,
            );
        }
        self.last = (event.x, event.y);
        self.last_time_ms = event.time_ms;
        Ok(())
    }
}

/// Tracks at most one gesture at a time.
#[derive(Debug, Clone, Default)]
pub struct GestureTracker {
    config: GestureConfig,
    track: Option<Track>,
}

impl GestureTracker {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            track: None,
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.track.is_some()
    }

    /// Has the tracked pointer moved since it went down?
    pub fn has_moved(&self) -> bool {
        self.track.is_some_and(|t| t.moved)
    }

    /// Latest sample of the gesture in progress.
    pub fn sample(&self) -> Option<GestureSample> {
        self.track.map(|t| t.sample(true))
    }

    pub fn down(&mut self, event: &PointerEvent) -> Result<(), IgnoreReason> {
        if self.track.is_some() {
            return Err(IgnoreReason::AlreadyTracking);
        }
        self.track = Some(Track {
            pointer_id: event.pointer_id,
            origin: (event.x, event.y),
            last: (event.x, event.y),
            last_time_ms: event.time_ms,
            velocity: (0.0, 0.0),
            moved: false,
        });
        Ok(())
    }

    pub fn moved(&mut self, event: &PointerEvent) -> Result<GestureSample, IgnoreReason> {
        let track = self.owned_track(event)?;
        track.update(event)?;
        track.moved = true;
        Ok(track.sample(true))
    }

    /// End the gesture and return the released sample.
    pub fn up(&mut self, event: &PointerEvent) -> Result<GestureSample, IgnoreReason> {
        let stale_release_ms = self.config.stale_release_ms;
        let track = self.owned_track(event)?;

        let dt = event.time_ms - track.last_time_ms;
        let repositioned = (event.x, event.y) != track.last;
        if repositioned && dt > 0.0 {
            track.update(event)?;
        } else if repositioned {
            // release always ends the gesture; an out-of-order timestamp keeps the velocity
            track.last = (event.x, event.y);
        } else if dt > stale_release_ms {
            // pointer rested before lifting
            track.velocity = (0.0, 0.0);
        }

        let sample = track.sample(false);
        self.track = None;
        Ok(sample)
    }

    /// Abandon the gesture (pointer cancel, blur, unmount).
    pub fn cancel(&mut self) -> Option<GestureSample> {
        self.track.take().map(|t| t.sample(false))
    }

    fn owned_track(&mut self, event: &PointerEvent) -> Result<&mut Track, IgnoreReason> {
        match self.track.as_mut() {
            None => Err(IgnoreReason::NoGesture),
            Some(t) if t.pointer_id != event.pointer_id => Err(IgnoreReason::OtherPointer),
            Some(t) => Ok(t),
        }
    }
}
