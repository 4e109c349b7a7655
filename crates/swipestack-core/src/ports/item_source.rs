//! ItemSource port - カードの供給元
//!
//! セッション開始前に一度だけ呼ばれる。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Category, Item, SourceError};

fn default_limit() -> usize {
    10
}

/// Which items to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFilter {
    #[serde(default)]
    pub category: Option<Category>,

    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl ItemFilter {
    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn matches(&self, item: &Item) -> bool {
        self.category.is_none_or(|c| c == item.category())
    }
}

impl Default for ItemFilter {
    fn default() -> Self {
        Self {
            category: None,
            limit: default_limit(),
        }
    }
}

#[async_trait]
pub trait ItemSource: Send + Sync {
    async fn fetch_items(&self, filter: &ItemFilter) -> Result<Vec<Item>, SourceError>;
}
