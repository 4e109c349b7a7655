//! Ports - 抽象化レイヤー
//!
//! swipe engine の外側にあるコラボレーター（item の取得元、決定の記録先、
//! KV ストア、通知）へのインターフェース。
//!
//! # 設計原則
//! - engine は同期・単一スレッド。外部 I/O は async trait の向こう側
//! - coordinator が直接触るのは OutcomeDispatch だけ（fire-and-forget）

pub mod clock;
pub mod decision_sink;
pub mod dispatch;
pub mod id_generator;
pub mod item_source;
pub mod kv_store;
pub mod notifier;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::decision_sink::DecisionSink;
pub use self::dispatch::OutcomeDispatch;
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::item_source::{ItemFilter, ItemSource};
pub use self::kv_store::KeyValueStore;
pub use self::notifier::Notifier;
