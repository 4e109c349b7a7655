//! Notifier 実装
//!
//! - TracingNotifier: tracing にログとして流す（CLI 用）
//! - RecordingNotifier: メモリに溜める（テスト用）

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::domain::Notification;
use crate::ports::Notifier;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match &notification {
            Notification::Predicted { item_id, prediction } => {
                let side = if *prediction { "YES" } else { "NO" };
                info!(%item_id, "Predicted {side}");
            }
            Notification::Skipped { item_id } => info!(%item_id, "Skipped"),
            Notification::SubmitFailed { item_id, reason } => {
                warn!(%item_id, %reason, "Failed to process prediction");
            }
            Notification::Exhausted => info!("No more cards"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    seen: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().clone()
    }

    pub fn failures(&self) -> usize {
        self.seen.lock().iter().filter(|n| n.is_failure()).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().push(notification);
    }
}
