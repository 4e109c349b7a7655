use serde::{Deserialize, Serialize};

use crate::domain::SwipeDirection;

/// Per-session tallies kept by the coordinator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCounts {
    pub agreed: usize,
    pub disagreed: usize,
    pub skipped: usize,
    pub sprung_back: usize,
    pub cancelled: usize,
    pub ignored_inputs: usize,
}

impl SessionCounts {
    pub fn committed(&self) -> usize {
        self.agreed + self.disagreed + self.skipped
    }

    pub(crate) fn record_commit(&mut self, direction: SwipeDirection) {
        match direction {
            SwipeDirection::Right => self.agreed += 1,
            SwipeDirection::Left => self.disagreed += 1,
            SwipeDirection::Up => self.skipped += 1,
        }
    }
}
