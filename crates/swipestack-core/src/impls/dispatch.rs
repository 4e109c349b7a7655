//! OutcomeDispatch 実装
//!
//! - ChannelDispatch: tokio mpsc に流して sink worker に渡す
//! - RecordingDispatch: 同期テスト用

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::warn;

use crate::domain::SwipeOutcome;
use crate::ports::OutcomeDispatch;

/// Unbounded, so dispatch never blocks the engine thread.
#[derive(Debug, Clone)]
pub struct ChannelDispatch {
    tx: mpsc::UnboundedSender<SwipeOutcome>,
}

impl ChannelDispatch {
    pub fn new(tx: mpsc::UnboundedSender<SwipeOutcome>) -> Self {
        Self { tx }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SwipeOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl OutcomeDispatch for ChannelDispatch {
    fn dispatch(&self, outcome: SwipeOutcome) {
        if let Err(e) = self.tx.send(outcome) {
            warn!(item_id = %e.0.item_id, "sink worker gone; outcome dropped");
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingDispatch {
    outcomes: Arc<Mutex<Vec<SwipeOutcome>>>,
}

impl RecordingDispatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcomes(&self) -> Vec<SwipeOutcome> {
        self.outcomes.lock().clone()
    }
}

impl OutcomeDispatch for RecordingDispatch {
    fn dispatch(&self, outcome: SwipeOutcome) {
        self.outcomes.lock().push(outcome);
    }
}
