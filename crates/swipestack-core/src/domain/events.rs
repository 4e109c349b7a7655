//! Events - 決着イベントとユーザー通知
//!
//! - Settlement: resolve アニメーションの決着（1 ジェスチャにつき 1 回）
//! - Notification: トースト相当のユーザー向け通知

use serde::{Deserialize, Serialize};

use super::ids::ItemId;
use super::outcome::SwipeOutcome;

/// How a resolve animation ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Settlement {
    /// Card flew off; the outcome was dispatched and the queue advanced.
    Committed { outcome: SwipeOutcome },

    /// Card sprang back; the item is still current.
    SprungBack { item_id: ItemId },
}

impl Settlement {
    pub fn outcome(&self) -> Option<&SwipeOutcome> {
        match self {
            Settlement::Committed { outcome } => Some(outcome),
            Settlement::SprungBack { .. } => None,
        }
    }
}

/// Non-fatal, user-facing notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// Agree/disagree accepted by the sink.
    Predicted { item_id: ItemId, prediction: bool },

    /// Skip accepted by the sink.
    Skipped { item_id: ItemId },

    /// The sink rejected or failed; the card is gone regardless.
    SubmitFailed { item_id: ItemId, reason: String },

    /// Every item has been decided.
    Exhausted,
}

impl Notification {
    pub fn is_failure(&self) -> bool {
        matches!(self, Notification::SubmitFailed { .. })
    }
}
