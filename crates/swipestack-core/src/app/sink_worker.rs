//! SinkWorker - outcome を順に Decision Sink へ submit するタスク
//!
//! # 学習ポイント
//! - coordinator は mpsc に流すだけ（fire-and-forget）。await はここで閉じる
//! - 失敗してもロールバックしない。通知を 1 回出して次へ進む
//! - 送信側（ChannelDispatch）が全部 drop されたら recv が None になり終了

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::{Notification, SwipeOutcome};
use crate::ports::{DecisionSink, Notifier};

/// What the worker did before its channel closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkReport {
    pub submitted: usize,
    pub failed: usize,
}

/// Handle of the spawned worker.
pub struct SinkWorker {
    join: JoinHandle<SinkReport>,
}

impl SinkWorker {
    pub fn spawn(
        rx: mpsc::UnboundedReceiver<SwipeOutcome>,
        sink: Arc<dyn DecisionSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let join = tokio::spawn(sink_loop(rx, sink, notifier));
        Self { join }
    }

    /// Wait until every dispatched outcome has been submitted.
    ///
    /// Only returns once all senders are dropped.
    pub async fn join(self) -> SinkReport {
        match self.join.await {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "sink worker aborted");
                SinkReport::default()
            }
        }
    }
}

async fn sink_loop(
    mut rx: mpsc::UnboundedReceiver<SwipeOutcome>,
    sink: Arc<dyn DecisionSink>,
    notifier: Arc<dyn Notifier>,
) -> SinkReport {
    let mut report = SinkReport::default();

    while let Some(outcome) = rx.recv().await {
        match sink.submit(&outcome).await {
            Ok(()) => {
                report.submitted += 1;
                debug!(item_id = %outcome.item_id, direction = ?outcome.direction, "outcome submitted");
                let notification = match outcome.derived_prediction {
                    Some(prediction) => Notification::Predicted {
                        item_id: outcome.item_id,
                        prediction,
                    },
                    None => Notification::Skipped {
                        item_id: outcome.item_id,
                    },
                };
                notifier.notify(notification);
            }
            Err(e) => {
                report.failed += 1;
                warn!(item_id = %outcome.item_id, error = %e, "failed to submit outcome");
                notifier.notify(Notification::SubmitFailed {
                    item_id: outcome.item_id,
                    reason: e.to_string(),
                });
            }
        }
    }

    debug!(?report, "sink worker stopped");
    report
}
