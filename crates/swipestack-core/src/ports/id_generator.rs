//! IdGenerator port - ID 生成の抽象化
//!
//! # 実装
//! - **UlidGenerator**: ULID ベース（Clock から時刻部分を取る）

use crate::domain::ids::{ItemId, PredictionId};
use crate::ports::Clock;
use ulid::Ulid;

/// Market item ids carry this prefix (`market_01H...`).
pub const MARKET_ID_PREFIX: &str = "market_";

/// IdGenerator は永続化する record の ID を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（sink worker から使う）
pub trait IdGenerator: Send + Sync {
    /// Prediction record の ID
    fn generate_prediction_id(&self) -> PredictionId;

    /// 新規 market の item ID
    fn generate_market_id(&self) -> ItemId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// FixedClock と組み合わせると timestamp 部分が決定的になる。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    fn next_ulid(&self) -> Ulid {
        let timestamp_ms = self.clock.now().timestamp_millis().max(0) as u64;
        Ulid::from_parts(timestamp_ms, rand::random())
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_prediction_id(&self) -> PredictionId {
        PredictionId::from(self.next_ulid())
    }

    fn generate_market_id(&self) -> ItemId {
        ItemId::new(format!("{MARKET_ID_PREFIX}{}", self.next_ulid()))
    }
}
