//! App - アプリケーション層
//!
//! engine と ports を組み合わせて、tokio 上で動く 1 セッションを作る。
//!
//! # 主要コンポーネント
//! - **SessionBuilder**: コラボレーターのワイヤリングと item のロード
//! - **SwipeSession**: 入力・アニメーション tick・フレーム配信
//! - **SinkWorker**: outcome を順に Decision Sink へ submit

pub mod builder;
pub mod session;
pub mod sink_worker;

pub use self::builder::{BuildError, SessionBuilder};
pub use self::session::{SessionSummary, StrokeReport, SwipeSession};
pub use self::sink_worker::{SinkReport, SinkWorker};
