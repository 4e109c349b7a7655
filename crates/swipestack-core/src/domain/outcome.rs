//! Swipe outcome: the externally visible result of a completed swipe.
//!
//! One outcome is created per committed item and handed to the decision sink.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::decision::SwipeDirection;
use super::ids::ItemId;

/// Default stake attached to an agree/disagree swipe (0.01 ETH).
pub fn default_stake() -> Decimal {
    Decimal::new(1, 2)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwipeOutcome {
    pub item_id: ItemId,

    pub direction: SwipeDirection,

    /// `Some(true)` = YES, `Some(false)` = NO, `None` for a skip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_prediction: Option<bool>,

    pub stake: Decimal,
}

impl SwipeOutcome {
    pub fn new(item_id: ItemId, direction: SwipeDirection, stake: Decimal) -> Self {
        Self {
            item_id,
            direction,
            derived_prediction: direction.derived_prediction(),
            stake,
        }
    }

    pub fn is_skip(&self) -> bool {
        self.direction == SwipeDirection::Up
    }
}
