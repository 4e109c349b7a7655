//! Motion Controller - カードの見た目（x, y, rotation, scale, opacity）を駆動
//!
//! # モード
//! - Rest: 何もしていない
//! - Follow: ジェスチャ中。位置はポインタに 1:1 で追従
//! - Resolve: リリース後。spring-back か fly-off
//!
//! # 学習ポイント
//! - settled は Option::take による one-shot。Resolve 中の tick でしか立たない
//! - 追従中の速度を fly-off の初速に引き継ぐので、速いフリックほど速く飛ぶ

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::spring::{Spring, SpringConfig};
use crate::domain::{CommitDecision, GestureSample, Pose, SwipeDirection};

const POSITION_PRECISION: f32 = 0.5;
const ROTATION_PRECISION: f32 = 0.05;
const UNIT_PRECISION: f32 = 0.001;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Extra distance past the viewport edge for the fly-off target.
    pub offstage_margin: f32,

    pub follow: SpringConfig,
    pub spring_back: SpringConfig,
    pub fly_off: SpringConfig,
    pub next_card: SpringConfig,

    pub lift_scale: f32,
    /// Degrees of rotation per px of horizontal drag.
    pub rotation_per_px: f32,
    /// Extra exit rotation, degrees per px/ms of release speed.
    pub flick_rotation: f32,
    /// Release speed (px/ms) worth one unit of fly-off stiffness boost.
    pub flick_unit: f32,
    /// Cap on the fly-off stiffness boost, in flick units.
    pub flick_boost_cap: f32,

    pub next_rest_scale: f32,
    pub next_rest_opacity: f32,
    pub next_hint_scale: f32,
    pub next_hint_opacity: f32,

    /// Longest step a single tick may integrate.
    pub max_tick_ms: f32,
    /// Resolve animations are forced to settle after this long.
    pub settle_timeout_ms: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            viewport_width: 400.0,
            viewport_height: 700.0,
            offstage_margin: 200.0,
            follow: SpringConfig::new(800.0, 50.0),
            spring_back: SpringConfig::new(500.0, 50.0),
            fly_off: SpringConfig::new(200.0, 50.0),
            next_card: SpringConfig::new(400.0, 60.0),
            lift_scale: 1.05,
            rotation_per_px: 0.01,
            flick_rotation: 10.0,
            flick_unit: 0.2,
            flick_boost_cap: 3.0,
            next_rest_scale: 0.95,
            next_rest_opacity: 0.7,
            next_hint_scale: 0.97,
            next_hint_opacity: 0.9,
            max_tick_ms: 64.0,
            settle_timeout_ms: 3000.0,
        }
    }
}

impl MotionConfig {
    pub fn next_rest_pose(&self) -> Pose {
        Pose::with_scale_opacity(self.next_rest_scale, self.next_rest_opacity)
    }

    pub fn next_hint_pose(&self) -> Pose {
        Pose::with_scale_opacity(self.next_hint_scale, self.next_hint_opacity)
    }

    /// Off-stage pose for a committed direction.
    pub fn exit_pose(&self, direction: SwipeDirection, sample: &GestureSample) -> Pose {
        let sign = direction.horizontal_sign();
        let y = match direction {
            SwipeDirection::Up => -(self.offstage_margin + self.viewport_height),
            SwipeDirection::Left | SwipeDirection::Right => 0.0,
        };
        Pose {
            x: (self.offstage_margin + self.viewport_width) * sign,
            y,
            rotation: sample.dx * self.rotation_per_px
                + sign * self.flick_rotation * sample.velocity_x.abs(),
            scale: 1.0,
            opacity: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CardSprings {
    x: Spring,
    y: Spring,
    rotation: Spring,
    scale: Spring,
    opacity: Spring,
}

impl CardSprings {
    fn at(pose: Pose) -> Self {
        Self {
            x: Spring::at(pose.x, POSITION_PRECISION),
            y: Spring::at(pose.y, POSITION_PRECISION),
            rotation: Spring::at(pose.rotation, ROTATION_PRECISION),
            scale: Spring::at(pose.scale, UNIT_PRECISION),
            opacity: Spring::at(pose.opacity, UNIT_PRECISION),
        }
    }

    fn channels(&mut self) -> [&mut Spring; 5] {
        [
            &mut self.x,
            &mut self.y,
            &mut self.rotation,
            &mut self.scale,
            &mut self.opacity,
        ]
    }

    fn pose(&self) -> Pose {
        Pose {
            x: self.x.value(),
            y: self.y.value(),
            rotation: self.rotation.value(),
            scale: self.scale.value(),
            // underdamped fly-off may dip below zero
            opacity: self.opacity.value().clamp(0.0, 1.0),
        }
    }

    fn animate_to(&mut self, pose: Pose, config: SpringConfig) {
        self.x.animate_to(pose.x, config);
        self.y.animate_to(pose.y, config);
        self.rotation.animate_to(pose.rotation, config);
        self.scale.animate_to(pose.scale, config);
        self.opacity.animate_to(pose.opacity, config);
    }

    fn step(&mut self, dt_ms: f32) {
        for s in self.channels() {
            s.step(dt_ms);
        }
    }

    fn snap(&mut self) {
        for s in self.channels() {
            s.snap();
        }
    }

    fn is_settled(&self) -> bool {
        self.x.is_settled()
            && self.y.is_settled()
            && self.rotation.is_settled()
            && self.scale.is_settled()
            && self.opacity.is_settled()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Rest,
    Follow,
    Resolve {
        decision: CommitDecision,
        elapsed_ms: f32,
    },
}

/// Owns the motion state of the active card and the one behind it.
#[derive(Debug, Clone)]
pub struct MotionController {
    config: MotionConfig,
    mode: Mode,
    active: CardSprings,
    next: CardSprings,
}

impl MotionController {
    pub fn new(config: MotionConfig) -> Self {
        let next = CardSprings::at(config.next_rest_pose());
        Self {
            config,
            mode: Mode::Rest,
            active: CardSprings::at(Pose::NEUTRAL),
            next,
        }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn active_pose(&self) -> Pose {
        self.active.pose()
    }

    pub fn next_pose(&self) -> Pose {
        self.next.pose()
    }

    /// Anything still moving (including the next card easing back)?
    pub fn is_animating(&self) -> bool {
        self.mode != Mode::Rest || !self.active.is_settled() || !self.next.is_settled()
    }

    /// Mirror the pointer while a gesture is active.
    pub fn follow(&mut self, sample: &GestureSample) {
        let cfg = &self.config;
        // px/ms -> px/s, handed to the fly-off as its initial velocity
        self.active.x.set(sample.dx, sample.velocity_x * 1000.0);
        self.active.y.set(sample.dy, sample.velocity_y * 1000.0);
        self.active.rotation.set(sample.dx * cfg.rotation_per_px, 0.0);
        self.active.scale.animate_to(cfg.lift_scale, cfg.follow);
        self.active.opacity.animate_to(1.0, cfg.follow);
        self.next.animate_to(cfg.next_hint_pose(), cfg.next_card);
        self.mode = Mode::Follow;
    }

    /// Start the resolve animation for a released (or cancelled) gesture.
    pub fn resolve(&mut self, decision: CommitDecision, sample: &GestureSample) {
        let cfg = &self.config;
        match decision.direction() {
            None => {
                self.active.animate_to(Pose::NEUTRAL, cfg.spring_back);
                self.next.animate_to(cfg.next_rest_pose(), cfg.next_card);
            }
            Some(direction) => {
                let boost = 1.0 + (sample.speed() / cfg.flick_unit).min(cfg.flick_boost_cap);
                let exit = cfg.exit_pose(direction, sample);
                self.active.animate_to(exit, cfg.fly_off.stiffer(boost));
                self.next.animate_to(cfg.next_hint_pose(), cfg.next_card);
            }
        }
        debug!(?decision, "resolve started");
        self.mode = Mode::Resolve {
            decision,
            elapsed_ms: 0.0,
        };
    }

    /// Advance all springs. Returns the decision on the one tick the resolve settles.
    pub fn tick(&mut self, dt_ms: f32) -> Option<CommitDecision> {
        let dt_ms = dt_ms.clamp(0.0, self.config.max_tick_ms);
        if self.mode == Mode::Follow {
            // position and rotation are pinned to the pointer
            self.active.scale.step(dt_ms);
            self.active.opacity.step(dt_ms);
        } else {
            self.active.step(dt_ms);
        }
        self.next.step(dt_ms);

        let Mode::Resolve {
            decision,
            elapsed_ms,
        } = &mut self.mode
        else {
            return None;
        };
        *elapsed_ms += dt_ms;
        let decision = *decision;

        if !self.active.is_settled() {
            if *elapsed_ms < self.config.settle_timeout_ms {
                return None;
            }
            debug!(?decision, "resolve timed out; snapping to target");
        }
        self.active.snap();
        self.mode = Mode::Rest;
        Some(decision)
    }

    /// New item became active: neutral pose, next card at rest.
    pub fn reset(&mut self) {
        self.active = CardSprings::at(Pose::NEUTRAL);
        self.next = CardSprings::at(self.config.next_rest_pose());
        self.mode = Mode::Rest;
    }
}

impl Default for MotionController {
    fn default() -> Self {
        Self::new(MotionConfig::default())
    }
}
