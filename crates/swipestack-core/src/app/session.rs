//! SwipeSession - coordinator を tokio 上で駆動する
//!
//! # 学習ポイント
//! - engine 自体は同期。ここで入力とアニメーション tick を 1 本の流れに並べる
//! - フレームは watch channel で配る（最新だけ見えればよい）
//! - finish() で coordinator（= 送信側）を drop し、sink worker の drain を待つ

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use super::sink_worker::{SinkReport, SinkWorker};
use crate::domain::{
    Item, Notification, PointerEvent, RenderFrame, SessionError, SessionState, Settlement, Stroke,
};
use crate::engine::{InputDisposition, SwipeCoordinator};
use crate::observability::SessionCounts;
use crate::ports::Notifier;

/// Result of replaying one stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeReport {
    /// Disposition of the final (release) event.
    pub release: InputDisposition,
    pub settled: Vec<Settlement>,
}

impl StrokeReport {
    pub fn committed(&self) -> Option<&Settlement> {
        self.settled.iter().find(|s| s.outcome().is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub counts: SessionCounts,
    pub sink: SinkReport,
}

pub struct SwipeSession {
    coordinator: SwipeCoordinator,
    worker: SinkWorker,
    notifier: Arc<dyn Notifier>,
    frames: watch::Sender<RenderFrame>,
    frame_interval: Duration,
    /// Timeline for synthesized input, in ms.
    input_clock_ms: f64,
    exhausted_notified: bool,
}

impl SwipeSession {
    pub(crate) fn new(
        coordinator: SwipeCoordinator,
        worker: SinkWorker,
        notifier: Arc<dyn Notifier>,
        frame_interval: Duration,
    ) -> Self {
        let first = coordinator.frame();
        let (frames, _) = watch::channel(first.clone());
        let mut session = Self {
            coordinator,
            worker,
            notifier,
            frames,
            frame_interval,
            input_clock_ms: 0.0,
            exhausted_notified: false,
        };
        session.publish(first);
        session
    }

    /// Latest rendered frame, updated on every input and tick.
    pub fn subscribe(&self) -> watch::Receiver<RenderFrame> {
        self.frames.subscribe()
    }

    pub fn coordinator(&self) -> &SwipeCoordinator {
        &self.coordinator
    }

    pub fn state(&self) -> SessionState {
        self.coordinator.state()
    }

    pub fn counts(&self) -> &SessionCounts {
        self.coordinator.counts()
    }

    pub fn current(&self) -> Option<&Item> {
        self.coordinator.current()
    }

    pub fn input(&mut self, event: PointerEvent) -> InputDisposition {
        let disposition = self.coordinator.handle(event);
        let frame = self.coordinator.frame();
        self.publish(frame);
        disposition
    }

    pub fn blur(&mut self) {
        self.coordinator.blur();
        let frame = self.coordinator.frame();
        self.publish(frame);
    }

    pub fn replace(&mut self, items: Vec<Item>) -> Result<(), SessionError> {
        self.coordinator.replace(items)?;
        self.exhausted_notified = false;
        let frame = self.coordinator.frame();
        self.publish(frame);
        Ok(())
    }

    /// Replay a scripted stroke in real (tokio) time, then animate until idle.
    pub async fn play(&mut self, stroke: &Stroke) -> StrokeReport {
        let mut settled = Vec::new();
        let mut release = InputDisposition::Ignored(crate::engine::IgnoreReason::NoGesture);
        let mut prev_ms: Option<f64> = None;

        for event in stroke.events(self.input_clock_ms) {
            if let Some(prev) = prev_ms {
                let dt_ms = event.time_ms - prev;
                if dt_ms > 0.0 {
                    tokio::time::sleep(Duration::from_secs_f64(dt_ms / 1000.0)).await;
                    settled.extend(self.tick(dt_ms as f32));
                }
            }
            prev_ms = Some(event.time_ms);
            release = self.input(event);
        }
        self.input_clock_ms += stroke.duration_ms();

        settled.extend(self.animate_until_idle().await);
        StrokeReport { release, settled }
    }

    /// Tick on the frame interval until nothing moves.
    ///
    /// Returns immediately while a drag is held; a held card only moves on input.
    pub async fn animate_until_idle(&mut self) -> Vec<Settlement> {
        let mut interval = tokio::time::interval(self.frame_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await;

        let dt_ms = self.frame_interval.as_secs_f32() * 1000.0;
        let mut settled = Vec::new();
        while self.coordinator.is_animating() && self.coordinator.state() != SessionState::Active {
            interval.tick().await;
            self.input_clock_ms += f64::from(dt_ms);
            settled.extend(self.tick(dt_ms));
        }
        settled
    }

    /// Stop the session and wait for every dispatched outcome to be submitted.
    pub async fn finish(self) -> SessionSummary {
        let SwipeSession {
            coordinator,
            worker,
            ..
        } = self;
        let counts = coordinator.counts().clone();
        // the coordinator holds the last dispatch sender
        drop(coordinator);
        let sink = worker.join().await;
        SessionSummary { counts, sink }
    }

    fn tick(&mut self, dt_ms: f32) -> Option<Settlement> {
        let frame = self.coordinator.tick(dt_ms);
        let settled = frame.settled.clone();
        self.publish(frame);
        settled
    }

    fn publish(&mut self, frame: RenderFrame) {
        if frame.state == SessionState::Exhausted && !self.exhausted_notified {
            self.exhausted_notified = true;
            self.notifier.notify(Notification::Exhausted);
        }
        self.frames.send_replace(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::SessionBuilder;
    use crate::domain::item::fixtures;
    use crate::domain::{CommitDecision, SinkError, SwipeDirection, SwipeOutcome};
    use crate::impls::{RecordingNotifier, StaticItemSource};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct MemorySink {
        outcomes: Mutex<Vec<SwipeOutcome>>,
    }

    #[async_trait]
    impl crate::ports::DecisionSink for MemorySink {
        async fn submit(&self, outcome: &SwipeOutcome) -> Result<(), SinkError> {
            self.outcomes.lock().push(outcome.clone());
            Ok(())
        }
    }

    async fn session(ids: &[&str], sink: Arc<MemorySink>, notifier: RecordingNotifier) -> SwipeSession {
        SessionBuilder::new()
            .source(Arc::new(StaticItemSource::new(fixtures::markets(ids))))
            .sink(sink)
            .notifier(Arc::new(notifier))
            .build()
            .await
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn play_commits_and_publishes_frames() {
        let sink = Arc::new(MemorySink::default());
        let notifier = RecordingNotifier::new();
        let mut s = session(&["M1", "M2"], sink.clone(), notifier.clone()).await;
        let frames = s.subscribe();

        let report = s.play(&Stroke::new(140.0, 0.0)).await;
        assert_eq!(report.release, InputDisposition::Released(CommitDecision::CommitRight));
        assert_eq!(report.settled.len(), 1);
        assert_eq!(s.current().map(|i| i.id().as_str()), Some("M2"));

        let latest = frames.borrow().clone();
        assert_eq!(latest.state, SessionState::Idle);
        assert_eq!(latest.active.map(|c| c.item_id.as_str().to_string()), Some("M2".to_string()));

        let summary = s.finish().await;
        assert_eq!(summary.counts.agreed, 1);
        assert_eq!(summary.sink.submitted, 1);
        assert_eq!(sink.outcomes.lock()[0].direction, SwipeDirection::Right);
    }

    #[tokio::test(start_paused = true)]
    async fn held_drag_does_not_block_animation_loop() {
        let sink = Arc::new(MemorySink::default());
        let mut s = session(&["M1"], sink, RecordingNotifier::new()).await;

        s.input(PointerEvent::down(0.0, 0.0, 0.0));
        s.input(PointerEvent::moved(40.0, 0.0, 16.0));
        assert!(s.animate_until_idle().await.is_empty());
        assert_eq!(s.state(), SessionState::Active);

        s.blur();
        let settled = s.animate_until_idle().await;
        assert!(matches!(settled.as_slice(), [Settlement::SprungBack { .. }]));
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_is_notified_once_and_cleared_by_replace() {
        let sink = Arc::new(MemorySink::default());
        let notifier = RecordingNotifier::new();
        let mut s = session(&["M1"], sink, notifier.clone()).await;

        s.play(&Stroke::new(-150.0, 0.0)).await;
        s.play(&Stroke::new(-150.0, 0.0)).await;
        assert_eq!(s.state(), SessionState::Exhausted);

        let exhausted = |n: &RecordingNotifier| {
            n.notifications()
                .iter()
                .filter(|n| **n == Notification::Exhausted)
                .count()
        };
        assert_eq!(exhausted(&notifier), 1);

        s.replace(fixtures::markets(&["N1"])).unwrap();
        assert_eq!(s.state(), SessionState::Idle);
        s.play(&Stroke::new(0.0, -220.0)).await;
        assert_eq!(s.state(), SessionState::Exhausted);

        let summary = s.finish().await;
        assert_eq!(summary.counts.disagreed, 1);
        assert_eq!(summary.counts.skipped, 1);
        assert_eq!(exhausted(&notifier), 2);
    }
}
