//! StaticItemSource - 固定デッキ（profile カードなど）

use async_trait::async_trait;

use crate::domain::{Item, SourceError};
use crate::ports::{ItemFilter, ItemSource};

#[derive(Debug, Clone, Default)]
pub struct StaticItemSource {
    items: Vec<Item>,
}

impl StaticItemSource {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl ItemSource for StaticItemSource {
    async fn fetch_items(&self, filter: &ItemFilter) -> Result<Vec<Item>, SourceError> {
        Ok(self
            .items
            .iter()
            .filter(|item| filter.matches(item))
            .take(filter.limit)
            .cloned()
            .collect())
    }
}
