//! KvPredictionLedger - KV ストアへの予測記録（Decision Sink 実装）
//!
//! # キー
//! - `prediction:<id>`: PredictionRecord の JSON
//! - `user:<user>:predictions`: prediction id のリスト（新しい順）
//!
//! skip（up）は記録しない。

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::market_catalog::market_key;
use crate::domain::{Item, ItemId, PredictionId, SinkError, StoreError, SwipeOutcome};
use crate::ports::{Clock, DecisionSink, IdGenerator, KeyValueStore};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    #[default]
    Pending,
    Won,
    Lost,
}

/// A stored agree/disagree decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRecord {
    pub id: PredictionId,
    pub market_id: ItemId,
    pub user_id: String,
    /// `true` = YES
    pub prediction: bool,
    pub amount: Decimal,
    /// Odds of the chosen side at decision time, when the market was known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub odds: Option<u8>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub status: PredictionStatus,
}

fn prediction_key(id: &str) -> String {
    format!("prediction:{id}")
}

fn user_predictions_key(user_id: &str) -> String {
    format!("user:{user_id}:predictions")
}

pub struct KvPredictionLedger {
    store: Arc<dyn KeyValueStore>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    user_id: String,
}

impl KvPredictionLedger {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            store,
            ids,
            clock,
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// All records of `user_id`, newest first. Dangling ids are dropped.
    pub async fn predictions_for(&self, user_id: &str) -> Result<Vec<PredictionRecord>, StoreError> {
        let ids = self
            .store
            .lrange(&user_predictions_key(user_id), 0, -1)
            .await?;

        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            let key = prediction_key(&id);
            let Some(raw) = self.store.get(&key).await? else {
                warn!(%key, "dangling prediction id");
                continue;
            };
            let record = serde_json::from_str(&raw).map_err(|source| StoreError::Serde {
                key: key.clone(),
                source,
            })?;
            records.push(record);
        }
        Ok(records)
    }

    async fn odds_for(&self, market_id: &ItemId, prediction: bool) -> Result<Option<u8>, StoreError> {
        let Some(raw) = self.store.get(&market_key(market_id.as_str())).await? else {
            return Ok(None);
        };
        let odds = serde_json::from_str::<Item>(&raw)
            .ok()
            .and_then(|item| item.as_market().cloned())
            .map(|m| if prediction { m.yes_odds } else { m.no_odds });
        Ok(odds)
    }
}

#[async_trait]
impl DecisionSink for KvPredictionLedger {
    async fn submit(&self, outcome: &SwipeOutcome) -> Result<(), SinkError> {
        let Some(prediction) = outcome.derived_prediction else {
            debug!(item_id = %outcome.item_id, "skip recorded without a prediction");
            return Ok(());
        };
        if outcome.stake <= Decimal::ZERO {
            return Err(SinkError::Rejected(format!(
                "stake must be positive, got {}",
                outcome.stake
            )));
        }

        let record = PredictionRecord {
            id: self.ids.generate_prediction_id(),
            market_id: outcome.item_id.clone(),
            user_id: self.user_id.clone(),
            prediction,
            amount: outcome.stake,
            odds: self.odds_for(&outcome.item_id, prediction).await?,
            timestamp: self.clock.now(),
            status: PredictionStatus::Pending,
        };

        let id = record.id.to_string();
        let key = prediction_key(&id);
        let json = serde_json::to_string(&record).map_err(|source| StoreError::Serde {
            key: key.clone(),
            source,
        })?;
        self.store.set(&key, json).await?;
        self.store
            .lpush(&user_predictions_key(&self.user_id), id)
            .await?;

        debug!(prediction_id = %record.id, market_id = %record.market_id, prediction, "stored prediction");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::item::fixtures;
    use crate::domain::{SwipeDirection, default_stake};
    use crate::impls::{InMemoryKvStore, KvMarketCatalog};
    use crate::ports::{FixedClock, UlidGenerator};
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()
    }

    fn ledger(store: &InMemoryKvStore) -> KvPredictionLedger {
        let clock = Arc::new(FixedClock::new(fixed_now()));
        KvPredictionLedger::new(
            Arc::new(store.clone()),
            Arc::new(UlidGenerator::new(clock.clone())),
            clock,
            "alice",
        )
    }

    #[tokio::test]
    async fn agree_stores_record_and_indexes_it_for_the_user() {
        let store = InMemoryKvStore::new();
        let ledger = ledger(&store);

        let outcome = SwipeOutcome::new(ItemId::from("M1"), SwipeDirection::Right, default_stake());
        ledger.submit(&outcome).await.unwrap();

        let records = ledger.predictions_for("alice").await.unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.market_id, ItemId::from("M1"));
        assert!(r.prediction);
        assert_eq!(r.amount, default_stake());
        assert_eq!(r.timestamp, fixed_now());
        assert_eq!(r.status, PredictionStatus::Pending);
        assert_eq!(r.odds, None);
    }

    #[tokio::test]
    async fn skip_writes_nothing() {
        let store = InMemoryKvStore::new();
        let ledger = ledger(&store);

        let outcome = SwipeOutcome::new(ItemId::from("M1"), SwipeDirection::Up, default_stake());
        ledger.submit(&outcome).await.unwrap();

        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn odds_are_taken_from_the_chosen_side() {
        let store = InMemoryKvStore::new();
        let catalog = KvMarketCatalog::new(
            Arc::new(store.clone()),
            Arc::new(UlidGenerator::new(FixedClock::new(fixed_now()))),
        );
        catalog
            .put(&fixtures::market("M1", "ETH 4k", Decimal::ONE))
            .await
            .unwrap();
        let ledger = ledger(&store);

        ledger
            .submit(&SwipeOutcome::new(ItemId::from("M1"), SwipeDirection::Left, default_stake()))
            .await
            .unwrap();
        ledger
            .submit(&SwipeOutcome::new(ItemId::from("M1"), SwipeDirection::Right, default_stake()))
            .await
            .unwrap();

        let records = ledger.predictions_for("alice").await.unwrap();
        // newest first
        assert_eq!(records[0].odds, Some(65));
        assert_eq!(records[1].odds, Some(35));
    }

    #[tokio::test]
    async fn non_positive_stake_is_rejected() {
        let store = InMemoryKvStore::new();
        let ledger = ledger(&store);

        let outcome = SwipeOutcome::new(ItemId::from("M1"), SwipeDirection::Left, Decimal::ZERO);
        let err = ledger.submit(&outcome).await.unwrap_err();
        assert!(matches!(err, SinkError::Rejected(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn unknown_user_has_no_predictions() {
        let store = InMemoryKvStore::new();
        assert!(ledger(&store).predictions_for("bob").await.unwrap().is_empty());
    }
}
