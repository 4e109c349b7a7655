//! Swipe Session Coordinator - 1 枚ごとのジェスチャ → 決定 → 前進
//!
//! # 状態遷移
//! - Idle -> Active: pointer-down 後の最初の move
//! - Active -> Resolving: release（Classifier の結果を保持）
//! - Resolving -> Idle: Pending で settle（spring-back、sink 呼び出しなし）
//! - Resolving -> Settled -> Idle/Exhausted: commit で settle
//!
//! # 学習ポイント
//! - outcome の生成・dispatch・cursor の前進は settle の tick でだけ起きる
//! - settle は MotionController 側で one-shot なので二重 commit は構造的に起きない
//! - Resolving 中のジェスチャ開始は捨てる（キューイングしない）

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info};

use super::motion::{MotionConfig, MotionController};
use super::tracker::{GestureConfig, GestureTracker, IgnoreReason};
use crate::domain::{
    CardFrame, Classifier, ClassifierConfig, CommitDecision, GestureSample, Item, ItemId,
    PointerEvent, PointerPhase, RenderFrame, SessionError, SessionState, Settlement,
    SwipeDirection, SwipeOutcome, ThresholdClassifier, default_stake,
};
use crate::observability::SessionCounts;
use crate::ports::OutcomeDispatch;
use crate::queue::ItemQueue;

/// Tunables of the engine.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub gesture: GestureConfig,
    pub classifier: ClassifierConfig,
    pub motion: MotionConfig,
    /// Stake attached to every outcome.
    pub stake: Decimal,
    /// |dx| (px) past which the tick/cross hint shows during a drag.
    pub feedback_threshold: f32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            gesture: GestureConfig::default(),
            classifier: ClassifierConfig::default(),
            motion: MotionConfig::default(),
            stake: default_stake(),
            feedback_threshold: 50.0,
        }
    }
}

/// What happened to one input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputDisposition {
    /// Down recorded or drag updated.
    Accepted,
    /// Gesture ended; resolve animation started with this decision.
    Released(CommitDecision),
    /// Down and up without any move.
    Tapped,
    Ignored(IgnoreReason),
}

impl InputDisposition {
    pub fn is_ignored(self) -> bool {
        matches!(self, InputDisposition::Ignored(_))
    }
}

pub struct SwipeCoordinator {
    queue: ItemQueue,
    tracker: GestureTracker,
    classifier: Box<dyn Classifier>,
    motion: MotionController,
    dispatch: Arc<dyn OutcomeDispatch>,
    state: SessionState,
    stake: Decimal,
    feedback_threshold: f32,
    sample: Option<GestureSample>,
    counts: SessionCounts,
}

impl SwipeCoordinator {
    pub fn new(items: Vec<Item>, dispatch: Arc<dyn OutcomeDispatch>, settings: EngineSettings) -> Self {
        let classifier = Box::new(ThresholdClassifier::new(settings.classifier.clone()));
        Self::with_classifier(items, dispatch, settings, classifier)
    }

    pub fn with_classifier(
        items: Vec<Item>,
        dispatch: Arc<dyn OutcomeDispatch>,
        settings: EngineSettings,
        classifier: Box<dyn Classifier>,
    ) -> Self {
        let queue = ItemQueue::new(items);
        let state = initial_state(&queue);
        Self {
            queue,
            tracker: GestureTracker::new(settings.gesture),
            classifier,
            motion: MotionController::new(settings.motion),
            dispatch,
            state,
            stake: settings.stake,
            feedback_threshold: settings.feedback_threshold,
            sample: None,
            counts: SessionCounts::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current(&self) -> Option<&Item> {
        self.queue.current()
    }

    pub fn queue(&self) -> &ItemQueue {
        &self.queue
    }

    pub fn counts(&self) -> &SessionCounts {
        &self.counts
    }

    /// Does the driver need to keep ticking?
    pub fn is_animating(&self) -> bool {
        self.state.is_busy() || self.motion.is_animating()
    }

    /// Route a raw event aimed at the current item.
    pub fn handle(&mut self, event: PointerEvent) -> InputDisposition {
        match event.phase {
            PointerPhase::Down => match self.queue.current().map(|i| i.id().clone()) {
                Some(id) => self.pointer_down(&id, event),
                None => self.ignore(IgnoreReason::Exhausted, &event),
            },
            PointerPhase::Move => self.pointer_move(event),
            PointerPhase::Up => self.pointer_up(event),
            PointerPhase::Cancel => self.pointer_cancel(event),
        }
    }

    pub fn pointer_down(&mut self, target: &ItemId, event: PointerEvent) -> InputDisposition {
        if !self.state.accepts_gesture() {
            let reason = if self.state == SessionState::Exhausted {
                IgnoreReason::Exhausted
            } else {
                IgnoreReason::Busy
            };
            return self.ignore(reason, &event);
        }
        if self.queue.current().map(Item::id) != Some(target) {
            return self.ignore(IgnoreReason::NotCurrentItem, &event);
        }
        match self.tracker.down(&event) {
            Ok(()) => InputDisposition::Accepted,
            Err(reason) => self.ignore(reason, &event),
        }
    }

    pub fn pointer_move(&mut self, event: PointerEvent) -> InputDisposition {
        if !matches!(self.state, SessionState::Idle | SessionState::Active) {
            return self.ignore(IgnoreReason::NoGesture, &event);
        }
        let sample = match self.tracker.moved(&event) {
            Ok(sample) => sample,
            Err(reason) => return self.ignore(reason, &event),
        };
        if self.state == SessionState::Idle {
            debug!(item_id = ?self.current_id(), "gesture started");
            self.state = SessionState::Active;
        }
        self.motion.follow(&sample);
        self.sample = Some(sample);
        InputDisposition::Accepted
    }

    pub fn pointer_up(&mut self, event: PointerEvent) -> InputDisposition {
        if !matches!(self.state, SessionState::Idle | SessionState::Active) {
            return self.ignore(IgnoreReason::NoGesture, &event);
        }
        let moved = self.tracker.has_moved();
        let sample = match self.tracker.up(&event) {
            Ok(sample) => sample,
            Err(reason) => return self.ignore(reason, &event),
        };
        if !moved && sample.dx == 0.0 && sample.dy == 0.0 {
            return InputDisposition::Tapped;
        }

        let decision = self.classifier.classify(&sample);
        debug!(
            item_id = ?self.current_id(),
            dx = sample.dx,
            dy = sample.dy,
            vx = sample.velocity_x,
            vy = sample.velocity_y,
            ?decision,
            "gesture released"
        );
        self.begin_resolve(decision, sample);
        InputDisposition::Released(decision)
    }

    pub fn pointer_cancel(&mut self, event: PointerEvent) -> InputDisposition {
        if !matches!(self.state, SessionState::Idle | SessionState::Active) {
            return self.ignore(IgnoreReason::NoGesture, &event);
        }
        if self.tracker.sample().is_none() {
            return self.ignore(IgnoreReason::NoGesture, &event);
        }
        if self.abandon_gesture() {
            InputDisposition::Released(CommitDecision::Pending)
        } else {
            InputDisposition::Accepted
        }
    }

    /// Focus lost or view torn down: force a spring-back of any live gesture.
    pub fn blur(&mut self) {
        if self.tracker.is_tracking() {
            self.abandon_gesture();
        }
    }

    /// Advance animations by `dt_ms` and report the frame.
    pub fn tick(&mut self, dt_ms: f32) -> RenderFrame {
        let settled = match self.motion.tick(dt_ms) {
            Some(decision) => self.settle(decision),
            None => None,
        };
        let mut frame = self.frame();
        frame.settled = settled;
        frame
    }

    /// Current frame without advancing time.
    pub fn frame(&self) -> RenderFrame {
        if self.state == SessionState::Exhausted {
            return RenderFrame::exhausted();
        }
        let feedback = match (self.state, self.sample) {
            (SessionState::Active, Some(s)) if s.dx.abs() > self.feedback_threshold => {
                Some(if s.dx > 0.0 {
                    SwipeDirection::Right
                } else {
                    SwipeDirection::Left
                })
            }
            _ => None,
        };
        RenderFrame {
            state: self.state,
            active: self.queue.current().map(|item| CardFrame {
                item_id: item.id().clone(),
                pose: self.motion.active_pose(),
            }),
            next: self.queue.next().map(|item| CardFrame {
                item_id: item.id().clone(),
                pose: self.motion.next_pose(),
            }),
            feedback,
            settled: None,
        }
    }

    /// Swap in a new deck. Rejected while a gesture or its animation is running.
    pub fn replace(&mut self, items: Vec<Item>) -> Result<(), SessionError> {
        if self.state.is_busy() {
            return Err(SessionError::ReplaceWhileBusy { state: self.state });
        }
        self.tracker.cancel();
        self.sample = None;
        self.queue.replace(items);
        self.motion.reset();
        self.state = initial_state(&self.queue);
        info!(items = self.queue.len(), "queue replaced");
        Ok(())
    }

    /// Drop the tracked gesture. Returns whether a spring-back started.
    fn abandon_gesture(&mut self) -> bool {
        let Some(sample) = self.tracker.cancel() else {
            return false;
        };
        self.counts.cancelled += 1;
        if self.state != SessionState::Active {
            return false;
        }
        debug!(item_id = ?self.current_id(), "gesture cancelled; springing back");
        self.begin_resolve(CommitDecision::Pending, sample);
        true
    }

    fn begin_resolve(&mut self, decision: CommitDecision, sample: GestureSample) {
        self.motion.resolve(decision, &sample);
        self.sample = None;
        self.state = SessionState::Resolving(decision);
    }

    fn settle(&mut self, decision: CommitDecision) -> Option<Settlement> {
        let SessionState::Resolving(expected) = self.state else {
            return None;
        };
        debug_assert_eq!(expected, decision);
        let item_id = self.current_id()?;

        let Some(direction) = decision.direction() else {
            self.counts.sprung_back += 1;
            self.state = SessionState::Idle;
            debug!(%item_id, "sprung back");
            return Some(Settlement::SprungBack { item_id });
        };

        self.state = SessionState::Settled;
        let outcome = SwipeOutcome::new(item_id, direction, self.stake);
        self.counts.record_commit(direction);
        info!(item_id = %outcome.item_id, ?direction, "committed");
        self.dispatch.dispatch(outcome.clone());

        self.queue.advance();
        self.motion.reset();
        self.state = initial_state(&self.queue);
        if self.state == SessionState::Exhausted {
            info!("queue exhausted");
        }
        Some(Settlement::Committed { outcome })
    }

    fn ignore(&mut self, reason: IgnoreReason, event: &PointerEvent) -> InputDisposition {
        self.counts.ignored_inputs += 1;
        debug!(?reason, phase = ?event.phase, pointer_id = event.pointer_id, "input ignored");
        InputDisposition::Ignored(reason)
    }

    fn current_id(&self) -> Option<ItemId> {
        self.queue.current().map(|i| i.id().clone())
    }
}

fn initial_state(queue: &ItemQueue) -> SessionState {
    if queue.is_exhausted() {
        SessionState::Exhausted
    } else {
        SessionState::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Stroke;
    use crate::domain::item::fixtures;
    use crate::impls::RecordingDispatch;
    use rstest::rstest;

    struct Harness {
        coordinator: SwipeCoordinator,
        dispatch: RecordingDispatch,
        clock_ms: f64,
    }

    impl Harness {
        fn new(ids: &[&str]) -> Self {
            let dispatch = RecordingDispatch::new();
            let coordinator = SwipeCoordinator::new(
                fixtures::markets(ids),
                Arc::new(dispatch.clone()),
                EngineSettings::default(),
            );
            Self {
                coordinator,
                dispatch,
                clock_ms: 0.0,
            }
        }

        fn stroke(&mut self, stroke: Stroke) -> Vec<InputDisposition> {
            let events = stroke.events(self.clock_ms);
            self.clock_ms += stroke.duration_ms();
            events
                .into_iter()
                .map(|e| self.coordinator.handle(e))
                .collect()
        }

        fn run_frames(&mut self) -> Vec<RenderFrame> {
            let mut frames = Vec::new();
            for _ in 0..400 {
                let frame = self.coordinator.tick(16.0);
                self.clock_ms += 16.0;
                let done = frame.settled.is_some();
                frames.push(frame);
                if done {
                    break;
                }
            }
            frames
        }

        fn current(&self) -> Option<&str> {
            self.coordinator.current().map(|i| i.id().as_str())
        }
    }

    #[test]
    fn out_of_order_release_still_resolves() {
        let mut h = Harness::new(&["M1", "M2"]);
        h.coordinator.handle(PointerEvent::down(0.0, 0.0, 100.0));
        h.coordinator.handle(PointerEvent::moved(150.0, 0.0, 116.0));
        assert_eq!(
            h.coordinator.handle(PointerEvent::up(160.0, 0.0, 110.0)),
            InputDisposition::Released(CommitDecision::CommitRight)
        );

        h.run_frames();
        assert_eq!(h.current(), Some("M2"));
        assert_eq!(h.coordinator.state(), SessionState::Idle);
        assert_eq!(
            h.coordinator.handle(PointerEvent::down(0.0, 0.0, 2000.0)),
            InputDisposition::Accepted
        );
    }

    #[test]
    fn committed_drag_advances_after_settle_only() {
        let mut h = Harness::new(&["M1", "M2"]);
        let dispositions = h.stroke(Stroke::new(120.0, 0.0).with_release_velocity(0.05, 0.0));
        assert_eq!(
            dispositions.last(),
            Some(&InputDisposition::Released(CommitDecision::CommitRight))
        );
        assert_eq!(
            h.coordinator.state(),
            SessionState::Resolving(CommitDecision::CommitRight)
        );
        assert_eq!(h.current(), Some("M1"));

        let frames = h.run_frames();
        let (last, before) = frames.split_last().unwrap();
        assert!(before.iter().all(|f| f.settled.is_none()));
        assert!(before.iter().all(|f| f.active.as_ref().map(|c| c.item_id.as_str()) == Some("M1")));

        let outcome = last.settled.as_ref().and_then(Settlement::outcome).unwrap();
        assert_eq!(outcome.item_id.as_str(), "M1");
        assert_eq!(outcome.direction, SwipeDirection::Right);
        assert_eq!(outcome.derived_prediction, Some(true));
        assert_eq!(last.state, SessionState::Idle);
        assert_eq!(h.current(), Some("M2"));
        assert_eq!(h.dispatch.outcomes(), vec![outcome.clone()]);
        assert_eq!(last.active.as_ref().map(|c| c.pose), Some(crate::domain::Pose::NEUTRAL));
    }

    #[test]
    fn short_drag_springs_back() {
        let mut h = Harness::new(&["M1", "M2"]);
        h.stroke(Stroke::new(-30.0, 0.0).with_release_velocity(-0.05, 0.0));
        assert_eq!(
            h.coordinator.state(),
            SessionState::Resolving(CommitDecision::Pending)
        );

        let frames = h.run_frames();
        let last = frames.last().unwrap();
        assert_eq!(
            last.settled,
            Some(Settlement::SprungBack {
                item_id: ItemId::from("M1")
            })
        );
        assert_eq!(h.coordinator.state(), SessionState::Idle);
        assert_eq!(h.current(), Some("M1"));
        assert_eq!(h.coordinator.queue().cursor(), 0);
        assert!(h.dispatch.outcomes().is_empty());
        assert_eq!(last.active.as_ref().map(|c| c.pose), Some(crate::domain::Pose::NEUTRAL));
        assert_eq!(h.coordinator.counts().sprung_back, 1);
    }

    #[test]
    fn gestures_during_resolve_are_dropped() {
        let mut h = Harness::new(&["M1", "M2", "M3"]);
        h.stroke(Stroke::new(150.0, 0.0));

        for _ in 0..5 {
            let dispositions = h.stroke(Stroke::new(-150.0, 0.0).with_release_velocity(-0.5, 0.0));
            assert!(dispositions.iter().all(|d| d.is_ignored()));
            h.coordinator.tick(16.0);
        }
        h.run_frames();

        assert_eq!(h.dispatch.outcomes().len(), 1);
        assert_eq!(h.coordinator.queue().cursor(), 1);
        assert_eq!(h.current(), Some("M2"));
        assert!(h.coordinator.counts().ignored_inputs >= 5);
    }

    #[test]
    fn cursor_never_moves_while_active_or_resolving() {
        let mut h = Harness::new(&["M1", "M2"]);
        let events = Stroke::new(200.0, 0.0).events(0.0);
        let (up, drag) = events.split_last().unwrap();
        for e in drag {
            h.coordinator.handle(*e);
            assert_eq!(h.coordinator.queue().cursor(), 0);
            h.coordinator.tick(16.0);
        }
        assert_eq!(h.coordinator.state(), SessionState::Active);

        h.coordinator.handle(*up);
        let frames = h.run_frames();
        for f in &frames[..frames.len() - 1] {
            assert!(matches!(f.state, SessionState::Resolving(_)));
        }
        assert_eq!(h.coordinator.queue().cursor(), 1);
    }

    #[test]
    fn last_item_commit_exhausts_and_blocks_input() {
        let mut h = Harness::new(&["M1"]);
        h.stroke(Stroke::new(0.0, -200.0));
        let frames = h.run_frames();
        let outcome = frames.last().and_then(|f| f.settled.as_ref()).and_then(Settlement::outcome).cloned().unwrap();
        assert!(outcome.is_skip());
        assert_eq!(outcome.derived_prediction, None);

        assert_eq!(h.coordinator.state(), SessionState::Exhausted);
        assert_eq!(h.coordinator.frame(), RenderFrame::exhausted());

        let dispositions = h.stroke(Stroke::new(150.0, 0.0));
        assert_eq!(
            dispositions[0],
            InputDisposition::Ignored(IgnoreReason::Exhausted)
        );
        assert!(dispositions.iter().all(|d| d.is_ignored()));
        h.run_frames();
        assert_eq!(h.dispatch.outcomes().len(), 1);
    }

    #[test]
    fn background_item_gesture_is_ignored() {
        let mut h = Harness::new(&["M1", "M2"]);
        let d = h
            .coordinator
            .pointer_down(&ItemId::from("M2"), PointerEvent::down(0.0, 0.0, 0.0));
        assert_eq!(d, InputDisposition::Ignored(IgnoreReason::NotCurrentItem));
        assert_eq!(
            h.coordinator.pointer_move(PointerEvent::moved(200.0, 0.0, 16.0)),
            InputDisposition::Ignored(IgnoreReason::NoGesture)
        );
        assert_eq!(h.coordinator.state(), SessionState::Idle);
    }

    #[test]
    fn second_pointer_does_not_steer_the_gesture() {
        let mut h = Harness::new(&["M1", "M2"]);
        let c = &mut h.coordinator;
        c.handle(PointerEvent::down(0.0, 0.0, 0.0));
        c.handle(PointerEvent::moved(10.0, 0.0, 16.0));
        assert_eq!(
            c.handle(PointerEvent::moved(400.0, 0.0, 32.0).with_pointer(7)),
            InputDisposition::Ignored(IgnoreReason::OtherPointer)
        );
        assert_eq!(
            c.handle(PointerEvent::up(10.0, 0.0, 300.0)),
            InputDisposition::Released(CommitDecision::Pending)
        );
    }

    #[test]
    fn tap_without_move_does_nothing() {
        let mut h = Harness::new(&["M1"]);
        let c = &mut h.coordinator;
        assert_eq!(c.handle(PointerEvent::down(5.0, 5.0, 0.0)), InputDisposition::Accepted);
        assert_eq!(c.handle(PointerEvent::up(5.0, 5.0, 80.0)), InputDisposition::Tapped);
        assert_eq!(c.state(), SessionState::Idle);
        assert!(!c.is_animating());
    }

    #[test]
    fn blur_forces_spring_back() {
        let mut h = Harness::new(&["M1", "M2"]);
        let c = &mut h.coordinator;
        c.handle(PointerEvent::down(0.0, 0.0, 0.0));
        c.handle(PointerEvent::moved(300.0, 0.0, 16.0));
        c.blur();
        assert_eq!(c.state(), SessionState::Resolving(CommitDecision::Pending));
        assert_eq!(c.counts().cancelled, 1);

        let frames = h.run_frames();
        assert!(matches!(
            frames.last().and_then(|f| f.settled.clone()),
            Some(Settlement::SprungBack { .. })
        ));
        assert_eq!(h.current(), Some("M1"));
        assert!(h.dispatch.outcomes().is_empty());
    }

    #[test]
    fn feedback_hint_follows_drag_direction() {
        let mut h = Harness::new(&["M1"]);
        let c = &mut h.coordinator;
        c.handle(PointerEvent::down(0.0, 0.0, 0.0));
        c.handle(PointerEvent::moved(40.0, 0.0, 16.0));
        assert_eq!(c.frame().feedback, None);
        c.handle(PointerEvent::moved(60.0, 0.0, 32.0));
        assert_eq!(c.frame().feedback, Some(SwipeDirection::Right));
        c.handle(PointerEvent::moved(-70.0, 0.0, 48.0));
        assert_eq!(c.frame().feedback, Some(SwipeDirection::Left));
        c.handle(PointerEvent::up(-70.0, 0.0, 48.0));
        assert_eq!(c.frame().feedback, None);
    }

    #[test]
    fn next_card_is_hinted_while_dragging() {
        let mut h = Harness::new(&["M1", "M2"]);
        let rest = h.coordinator.frame().next.unwrap().pose;
        h.coordinator.handle(PointerEvent::down(0.0, 0.0, 0.0));
        h.coordinator.handle(PointerEvent::moved(30.0, 0.0, 16.0));
        for _ in 0..20 {
            h.coordinator.tick(16.0);
        }
        let hinted = h.coordinator.frame().next.unwrap().pose;
        assert!(hinted.scale > rest.scale);
        assert!(hinted.opacity > rest.opacity);
    }

    #[rstest]
    #[case::active(true)]
    #[case::resolving(false)]
    fn replace_is_rejected_while_busy(#[case] still_dragging: bool) {
        let mut h = Harness::new(&["M1"]);
        h.coordinator.handle(PointerEvent::down(0.0, 0.0, 0.0));
        h.coordinator.handle(PointerEvent::moved(150.0, 0.0, 16.0));
        if !still_dragging {
            h.coordinator.handle(PointerEvent::up(150.0, 0.0, 16.0));
        }
        let err = h.coordinator.replace(fixtures::markets(&["N1"])).unwrap_err();
        assert!(matches!(err, SessionError::ReplaceWhileBusy { .. }));
        assert_eq!(h.current(), Some("M1"));
    }

    #[test]
    fn replace_recovers_from_exhausted() {
        let mut h = Harness::new(&[]);
        assert_eq!(h.coordinator.state(), SessionState::Exhausted);

        h.coordinator.replace(fixtures::markets(&["N1", "N2"])).unwrap();
        assert_eq!(h.coordinator.state(), SessionState::Idle);
        assert_eq!(h.current(), Some("N1"));

        h.stroke(Stroke::new(-130.0, 0.0));
        h.run_frames();
        assert_eq!(h.dispatch.outcomes()[0].direction, SwipeDirection::Left);
        assert_eq!(h.current(), Some("N2"));
    }
}
