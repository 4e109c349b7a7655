//! Engine - gesture → decision → motion → queue advance.
//!
//! Everything here is synchronous and single-threaded: input events and
//! animation ticks are fed in by the caller (see `app::session`).

pub mod coordinator;
pub mod motion;
pub mod spring;
pub mod tracker;

pub use self::coordinator::{EngineSettings, InputDisposition, SwipeCoordinator};
pub use self::motion::{MotionConfig, MotionController};
pub use self::spring::{Spring, SpringConfig};
pub use self::tracker::{GestureConfig, GestureTracker, IgnoreReason};
