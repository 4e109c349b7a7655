//! KeyValueStore port - 永続化 API
//!
//! Redis 風の最小 API（set / get / lpush / lrange / keys）。
//! 書き込みは last-write-wins。値は JSON 文字列で保存する。

use async_trait::async_trait;

use crate::domain::StoreError;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Prepend to the list at `key`, creating it if needed. Returns the new length.
    async fn lpush(&self, key: &str, value: String) -> Result<usize, StoreError>;

    /// Inclusive range; negative indices count from the end (`0, -1` = all).
    async fn lrange(&self, key: &str, start: isize, stop: isize)
    -> Result<Vec<String>, StoreError>;

    /// Keys matching a glob pattern where `*` matches any run of characters.
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError>;
}
