//! Swipe session state machine.

use serde::{Deserialize, Serialize};

use super::decision::CommitDecision;

/// Per-item coordinator state.
///
/// State transitions:
/// - Idle -> Active (first move after pointer-down on the current item)
/// - Active -> Resolving (release, classifier decision attached)
/// - Resolving -> Idle (settled with Pending: spring-back)
/// - Resolving -> Settled -> Idle (settled with a commit: outcome + advance)
/// - Settled -> Exhausted (the committed item was the last one)
///
/// Settled is transient; it is never observed between two calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "decision", rename_all = "snake_case")]
pub enum SessionState {
    /// Waiting for a gesture on the current item.
    Idle,

    /// Gesture in progress.
    Active,

    /// Gesture ended; animating toward spring-back or fly-off.
    Resolving(CommitDecision),

    /// Resolve animation finished with a commit.
    Settled,

    /// Cursor reached the end of the queue.
    Exhausted,
}

impl SessionState {
    /// Can a new gesture start?
    pub fn accepts_gesture(self) -> bool {
        matches!(self, SessionState::Idle)
    }

    /// Is a gesture or its animation still running?
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            SessionState::Active | SessionState::Resolving(_) | SessionState::Settled
        )
    }
}
