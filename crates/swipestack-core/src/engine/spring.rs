//! Damped spring integrator.
//!
//! Tension/friction/mass in the same units as common UI spring libraries:
//! values in px (or degrees, or unitless), velocity per second.

use serde::{Deserialize, Serialize};

/// Integration step. Springs are advanced in fixed substeps of this size.
const SUBSTEP_MS: f32 = 1.0;

/// A velocity below `precision * VELOCITY_PRECISION_FACTOR` counts as at rest.
const VELOCITY_PRECISION_FACTOR: f32 = 10.0;

fn default_mass() -> f32 {
    1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringConfig {
    pub tension: f32,
    pub friction: f32,
    #[serde(default = "default_mass")]
    pub mass: f32,
}

impl SpringConfig {
    pub const fn new(tension: f32, friction: f32) -> Self {
        Self {
            tension,
            friction,
            mass: 1.0,
        }
    }

    /// Same spring with tension scaled by `factor`.
    pub fn stiffer(self, factor: f32) -> Self {
        Self {
            tension: self.tension * factor,
            ..self
        }
    }

    pub fn is_valid(&self) -> bool {
        self.tension > 0.0 && self.friction >= 0.0 && self.mass > 0.0
    }
}

/// One animated scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    value: f32,
    velocity: f32,
    target: f32,
    config: SpringConfig,
    precision: f32,
}

impl Spring {
    pub fn at(value: f32, precision: f32) -> Self {
        Self {
            value,
            velocity: 0.0,
            target: value,
            config: SpringConfig::new(170.0, 26.0),
            precision,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    /// Start animating toward `target`, keeping the current velocity.
    pub fn animate_to(&mut self, target: f32, config: SpringConfig) {
        self.target = target;
        self.config = config;
    }

    /// Jump to `value` and stay there. `velocity` is kept for a later hand-off.
    pub fn set(&mut self, value: f32, velocity: f32) {
        self.value = value;
        self.target = value;
        self.velocity = velocity;
    }

    /// Jump to the target and stop.
    pub fn snap(&mut self) {
        self.value = self.target;
        self.velocity = 0.0;
    }

    pub fn is_settled(&self) -> bool {
        (self.value - self.target).abs() < self.precision
            && self.velocity.abs() < self.precision * VELOCITY_PRECISION_FACTOR
    }

    /// Advance by `dt_ms`, snapping once within precision.
    pub fn step(&mut self, dt_ms: f32) {
        if dt_ms <= 0.0 {
            return;
        }
        let SpringConfig {
            tension,
            friction,
            mass,
        } = self.config;

        let mut remaining = dt_ms;
        while remaining > 0.0 && !self.is_settled() {
            let h = remaining.min(SUBSTEP_MS) / 1000.0;
            let force = -tension * (self.value - self.target) - friction * self.velocity;
            // semi-implicit Euler
            self.velocity += force / mass * h;
            self.value += self.velocity * h;
            remaining -= SUBSTEP_MS;
        }
        if self.is_settled() {
            self.snap();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_until_settled(spring: &mut Spring, frame_ms: f32, max_frames: usize) -> usize {
        for frame in 1..=max_frames {
            spring.step(frame_ms);
            if spring.is_settled() {
                return frame;
            }
        }
        panic!("spring did not settle: {spring:?}");
    }

    #[test]
    fn converges_to_target_and_snaps() {
        let mut s = Spring::at(120.0, 0.5);
        s.animate_to(0.0, SpringConfig::new(500.0, 50.0));
        run_until_settled(&mut s, 16.0, 200);
        assert_eq!(s.value(), 0.0);
        assert_eq!(s.velocity(), 0.0);
    }

    #[test]
    fn stiffer_spring_settles_sooner() {
        let mut soft = Spring::at(0.0, 0.5);
        soft.animate_to(600.0, SpringConfig::new(200.0, 50.0));
        let mut stiff = soft;
        stiff.animate_to(600.0, SpringConfig::new(200.0, 50.0).stiffer(4.0));

        let soft_frames = run_until_settled(&mut soft, 16.0, 1000);
        let stiff_frames = run_until_settled(&mut stiff, 16.0, 1000);
        assert!(stiff_frames < soft_frames, "{stiff_frames} vs {soft_frames}");
    }

    #[test]
    fn set_keeps_velocity_for_hand_off() {
        let mut s = Spring::at(0.0, 0.5);
        s.set(40.0, 250.0);
        assert_eq!((s.value(), s.target(), s.velocity()), (40.0, 40.0, 250.0));
        assert!(!s.is_settled());

        s.animate_to(600.0, SpringConfig::new(200.0, 50.0));
        s.step(16.0);
        assert!(s.value() > 40.0 + 250.0 * 0.016 * 0.5);
    }

    #[test]
    fn zero_or_negative_dt_is_a_no_op() {
        let mut s = Spring::at(10.0, 0.5);
        s.animate_to(0.0, SpringConfig::new(500.0, 50.0));
        s.step(0.0);
        s.step(-5.0);
        assert_eq!(s.value(), 10.0);
    }

    #[test]
    fn config_validation() {
        assert!(SpringConfig::new(800.0, 50.0).is_valid());
        assert!(!SpringConfig::new(0.0, 50.0).is_valid());
        assert!(!SpringConfig::new(200.0, -1.0).is_valid());
    }
}
