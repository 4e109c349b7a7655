//! SessionBuilder - セッションの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）: コラボレーター不足は build() で全部まとめて報告
//! - item の取得はここで 1 回だけ。壊れた item はロード時に捨てる

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::session::SwipeSession;
use super::sink_worker::SinkWorker;
use crate::config::Config;
use crate::domain::{Classifier, Item, SourceError, ThresholdClassifier};
use crate::engine::{EngineSettings, SwipeCoordinator};
use crate::impls::ChannelDispatch;
use crate::ports::{DecisionSink, ItemFilter, ItemSource, Notifier};

/// SessionBuilder は SwipeSession を構築
///
/// # 使用例
/// ```ignore
/// let session = SessionBuilder::new()
///     .source(Arc::new(catalog))
///     .sink(Arc::new(ledger))
///     .notifier(Arc::new(TracingNotifier))
///     .build()
///     .await?;
/// ```
pub struct SessionBuilder {
    source: Option<Arc<dyn ItemSource>>,
    sink: Option<Arc<dyn DecisionSink>>,
    notifier: Option<Arc<dyn Notifier>>,
    classifier: Option<Box<dyn Classifier>>,
    filter: ItemFilter,
    settings: EngineSettings,
    frame_interval: Duration,
}

/// BuildError はセッション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing collaborators: {0:?}. These must be set before build().")]
    MissingCollaborators(Vec<&'static str>),

    #[error("frame interval must be greater than zero")]
    ZeroFrameInterval,

    #[error("failed to load items: {0}")]
    Source(#[from] SourceError),
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self {
            source: None,
            sink: None,
            notifier: None,
            classifier: None,
            filter: ItemFilter::default(),
            settings: EngineSettings::default(),
            frame_interval: Duration::from_millis(16),
        }
    }

    /// Builder preloaded with the engine, filter and frame settings of `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new()
            .settings(config.engine_settings())
            .filter(config.session.filter.clone())
            .frame_interval(config.session.frame_interval())
    }

    pub fn source(mut self, source: Arc<dyn ItemSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn sink(mut self, sink: Arc<dyn DecisionSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Replace the default threshold classifier.
    pub fn classifier(mut self, classifier: Box<dyn Classifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn filter(mut self, filter: ItemFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Wire everything, fetch the items once and spawn the sink worker.
    ///
    /// Must be called inside a tokio runtime.
    pub async fn build(self) -> Result<SwipeSession, BuildError> {
        let mut missing = Vec::new();
        if self.source.is_none() {
            missing.push("source");
        }
        if self.sink.is_none() {
            missing.push("sink");
        }
        if self.notifier.is_none() {
            missing.push("notifier");
        }
        let (Some(source), Some(sink), Some(notifier)) =
            (self.source, self.sink, self.notifier)
        else {
            return Err(BuildError::MissingCollaborators(missing));
        };
        if self.frame_interval.is_zero() {
            return Err(BuildError::ZeroFrameInterval);
        }

        let fetched = source.fetch_items(&self.filter).await?;
        let items = load_valid(fetched);
        info!(items = items.len(), "session items loaded");

        let (dispatch, rx) = ChannelDispatch::channel();
        let classifier = self.classifier.unwrap_or_else(|| {
            Box::new(ThresholdClassifier::new(self.settings.classifier.clone()))
        });
        let coordinator =
            SwipeCoordinator::with_classifier(items, Arc::new(dispatch), self.settings, classifier);
        let worker = SinkWorker::spawn(rx, sink, notifier.clone());

        Ok(SwipeSession::new(
            coordinator,
            worker,
            notifier,
            self.frame_interval,
        ))
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop items that cannot be shown.
fn load_valid(items: Vec<Item>) -> Vec<Item> {
    items
        .into_iter()
        .filter(|item| match item.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "skipping malformed item");
                false
            }
        })
        .collect()
}
