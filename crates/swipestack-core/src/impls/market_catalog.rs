//! KvMarketCatalog - KV ストア上の market 一覧（Item Source 実装）
//!
//! # キー
//! - `market:<id>`: Item（market カード）の JSON
//!
//! 壊れたエントリはロード時にスキップする（swipe 中には起きない）。

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::{Item, MarketCard, MarketStatus, SourceError, StoreError};
use crate::ports::{IdGenerator, ItemFilter, ItemSource, KeyValueStore};

pub(crate) const MARKET_KEY_PATTERN: &str = "market:*";

pub(crate) fn market_key(id: &str) -> String {
    format!("market:{id}")
}

pub struct KvMarketCatalog {
    store: Arc<dyn KeyValueStore>,
    ids: Arc<dyn IdGenerator>,
}

impl KvMarketCatalog {
    pub fn new(store: Arc<dyn KeyValueStore>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { store, ids }
    }

    /// Assign a fresh `market_<ulid>` id and store the market.
    pub async fn publish(&self, card: MarketCard) -> Result<Item, StoreError> {
        let item = Item::market(self.ids.generate_market_id(), card);
        self.put(&item).await?;
        debug!(item_id = %item.id(), "published market");
        Ok(item)
    }

    /// Store an item under its existing id (seeding, tests).
    pub async fn put(&self, item: &Item) -> Result<(), StoreError> {
        let key = market_key(item.id().as_str());
        let json = serde_json::to_string(item).map_err(|source| StoreError::Serde {
            key: key.clone(),
            source,
        })?;
        self.store.set(&key, json).await
    }

    async fn load(&self, key: &str) -> Result<Option<Item>, StoreError> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };

        let item: Item = match serde_json::from_str(&raw) {
            Ok(item) => item,
            Err(e) => {
                warn!(key, error = %e, "skipping malformed market entry");
                return Ok(None);
            }
        };
        if item.as_market().is_none() {
            warn!(key, "skipping non-market entry");
            return Ok(None);
        }
        if let Err(e) = item.validate() {
            warn!(key, error = %e, "skipping invalid market");
            return Ok(None);
        }
        Ok(Some(item))
    }
}

#[async_trait]
impl ItemSource for KvMarketCatalog {
    async fn fetch_items(&self, filter: &ItemFilter) -> Result<Vec<Item>, SourceError> {
        let keys = self.store.keys(MARKET_KEY_PATTERN).await?;

        let mut markets = Vec::with_capacity(keys.len());
        for key in &keys {
            if let Some(item) = self.load(key).await? {
                markets.push(item);
            }
        }

        markets.retain(|item| {
            filter.matches(item)
                && item
                    .as_market()
                    .is_some_and(|m| m.status == MarketStatus::Active)
        });
        markets.sort_by(|a, b| pool_of(b).cmp(&pool_of(a)));
        markets.truncate(filter.limit);

        debug!(scanned = keys.len(), returned = markets.len(), "fetched markets");
        Ok(markets)
    }
}

fn pool_of(item: &Item) -> rust_decimal::Decimal {
    item.as_market()
        .map(|m| m.total_pool)
        .unwrap_or_default()
}
