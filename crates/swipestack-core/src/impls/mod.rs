//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryKvStore**: 開発用・テスト用の KV ストア
//! - **KvMarketCatalog**: `market:*` から item を読む Item Source
//! - **KvPredictionLedger**: `prediction:*` に書く Decision Sink
//! - **StaticItemSource**: 固定デッキ
//! - **TracingNotifier / RecordingNotifier**
//! - **ChannelDispatch / RecordingDispatch**

pub mod dispatch;
pub mod market_catalog;
pub mod memory_kv;
pub mod notifier;
pub mod prediction_ledger;
pub mod static_source;

pub use self::dispatch::{ChannelDispatch, RecordingDispatch};
pub use self::market_catalog::KvMarketCatalog;
pub use self::memory_kv::InMemoryKvStore;
pub use self::notifier::{RecordingNotifier, TracingNotifier};
pub use self::prediction_ledger::{KvPredictionLedger, PredictionRecord, PredictionStatus};
pub use self::static_source::StaticItemSource;
