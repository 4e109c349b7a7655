//! Domain model (ids, items, gestures, decisions, outcomes, motion, state).

pub mod decision;
pub mod errors;
pub mod events;
pub mod gesture;
pub mod ids;
pub mod item;
pub mod motion;
pub mod outcome;
pub mod state;

pub use decision::{Classifier, ClassifierConfig, CommitDecision, SwipeDirection, ThresholdClassifier};
pub use errors::{ItemError, SessionError, SinkError, SourceError, StoreError};
pub use events::{Notification, Settlement};
pub use gesture::{GestureSample, PointerEvent, PointerPhase, Stroke};
pub use ids::{ItemId, PredictionId};
pub use item::{Card, Category, Item, MarketCard, MarketStatus, ProfileCard};
pub use motion::{CardFrame, Pose, RenderFrame};
pub use outcome::{SwipeOutcome, default_stake};
pub use state::SessionState;
