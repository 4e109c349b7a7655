//! Commit decision model.
//!
//! This module defines the CommitDecision type (what a release resolves to) and
//! the Classifier trait (how to derive it from the latest gesture sample).

use serde::{Deserialize, Serialize};

use super::GestureSample;

/// The committed direction of a swipe.
///
/// - `Left`: disagree / NO
/// - `Right`: agree / YES
/// - `Up`: skip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
}

impl SwipeDirection {
    /// `right -> Some(true)`, `left -> Some(false)`, `up -> None`.
    pub fn derived_prediction(self) -> Option<bool> {
        match self {
            SwipeDirection::Left => Some(false),
            SwipeDirection::Right => Some(true),
            SwipeDirection::Up => None,
        }
    }

    /// Horizontal sign of the exit path (0 for a skip).
    pub fn horizontal_sign(self) -> f32 {
        match self {
            SwipeDirection::Left => -1.0,
            SwipeDirection::Right => 1.0,
            SwipeDirection::Up => 0.0,
        }
    }
}

/// What a gesture resolves to. Computed fresh from the latest sample, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommitDecision {
    /// Nothing committed (still dragging, or cancelled and springing back).
    Pending,
    CommitLeft,
    CommitRight,
    CommitUp,
}

impl CommitDecision {
    pub fn direction(self) -> Option<SwipeDirection> {
        match self {
            CommitDecision::Pending => None,
            CommitDecision::CommitLeft => Some(SwipeDirection::Left),
            CommitDecision::CommitRight => Some(SwipeDirection::Right),
            CommitDecision::CommitUp => Some(SwipeDirection::Up),
        }
    }

    pub fn is_commit(self) -> bool {
        !matches!(self, CommitDecision::Pending)
    }
}

impl From<SwipeDirection> for CommitDecision {
    fn from(direction: SwipeDirection) -> Self {
        match direction {
            SwipeDirection::Left => CommitDecision::CommitLeft,
            SwipeDirection::Right => CommitDecision::CommitRight,
            SwipeDirection::Up => CommitDecision::CommitUp,
        }
    }
}

/// Trait for deciding whether a gesture commits.
///
/// Classifiers are pure functions: given the latest sample they return a
/// decision without side effects. Applying it (animating, advancing the queue)
/// is the coordinator's job.
pub trait Classifier: Send + Sync {
    fn classify(&self, sample: &GestureSample) -> CommitDecision;
}

/// Thresholds for [`ThresholdClassifier`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Release velocity (px/ms) above which a flick commits regardless of distance.
    pub velocity_trigger: f32,

    /// Displacement (px) above which a drag commits regardless of velocity.
    pub distance_threshold: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            velocity_trigger: 0.2,
            distance_threshold: 100.0,
        }
    }
}

/// Default classifier: velocity trigger OR distance threshold, per axis.
///
/// Only upward vertical motion commits (skip). When both axes qualify, `Up`
/// wins only if its normalized magnitude is strictly larger.
#[derive(Debug, Clone, Default)]
pub struct ThresholdClassifier {
    config: ClassifierConfig,
}

impl ThresholdClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Magnitude relative to the thresholds; > 1.0 means the axis qualifies.
    fn strength(&self, velocity: f32, displacement: f32) -> f32 {
        (velocity / self.config.velocity_trigger).max(displacement / self.config.distance_threshold)
    }

    fn horizontal(&self, sample: &GestureSample) -> CommitDecision {
        // Past the distance threshold the card goes where it was dragged;
        // otherwise it follows the flick.
        let sign = if sample.dx.abs() > self.config.distance_threshold {
            sample.dx
        } else {
            sample.velocity_x
        };
        if sign < 0.0 {
            CommitDecision::CommitLeft
        } else {
            CommitDecision::CommitRight
        }
    }
}

impl Classifier for ThresholdClassifier {
    fn classify(&self, sample: &GestureSample) -> CommitDecision {
        if sample.is_active {
            return CommitDecision::Pending;
        }

        let horizontal = self.strength(sample.velocity_x.abs(), sample.dx.abs());
        let upward = self.strength((-sample.velocity_y).max(0.0), (-sample.dy).max(0.0));

        match (horizontal > 1.0, upward > 1.0) {
            (false, false) => CommitDecision::Pending,
            (true, false) => self.horizontal(sample),
            (false, true) => CommitDecision::CommitUp,
            (true, true) if upward > horizontal => CommitDecision::CommitUp,
            (true, true) => self.horizontal(sample),
        }
    }
}
