//! InMemoryKvStore - 開発用・テスト用の KV ストア
//!
//! # 学習ポイント
//! - parking_lot::Mutex はロック中に await しない限り async から直接使える
//! - Redis の lrange（負のインデックス、end は inclusive）の再現
//! - key ごとに「値」か「リスト」のどちらかを持つ（型違いは WrongType）

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::StoreError;
use crate::ports::KeyValueStore;

#[derive(Debug, Clone)]
enum Entry {
    Value(String),
    List(VecDeque<String>),
}

/// InMemoryKvStore は HashMap を Mutex で包んだだけの KV ストア
///
/// `Clone` はストアを共有する（catalog と ledger で同じ中身を見る）。
#[derive(Debug, Clone, Default)]
pub struct InMemoryKvStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKvStore {
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.lock().insert(key.to_string(), Entry::Value(value));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.entries.lock().get(key) {
            None => Ok(None),
            Some(Entry::Value(v)) => Ok(Some(v.clone())),
            Some(Entry::List(_)) => Err(StoreError::WrongType {
                key: key.to_string(),
            }),
        }
    }

    async fn lpush(&self, key: &str, value: String) -> Result<usize, StoreError> {
        let mut entries = self.entries.lock();
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::List(VecDeque::new()));
        match entry {
            Entry::List(list) => {
                list.push_front(value);
                Ok(list.len())
            }
            Entry::Value(_) => Err(StoreError::WrongType {
                key: key.to_string(),
            }),
        }
    }

    async fn lrange(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> Result<Vec<String>, StoreError> {
        let entries = self.entries.lock();
        let list = match entries.get(key) {
            None => return Ok(Vec::new()),
            Some(Entry::List(list)) => list,
            Some(Entry::Value(_)) => {
                return Err(StoreError::WrongType {
                    key: key.to_string(),
                });
            }
        };

        let len = list.len() as isize;
        let start = if start < 0 { (len + start).max(0) } else { start };
        let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
        if start > stop || start >= len {
            return Ok(Vec::new());
        }

        Ok(list
            .iter()
            .skip(start as usize)
            .take((stop - start + 1) as usize)
            .cloned()
            .collect())
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<String> = self
            .entries
            .lock()
            .keys()
            .filter(|k| glob_match(pattern, k))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}

/// `*` matches any run of characters; everything else is literal.
fn glob_match(pattern: &str, key: &str) -> bool {
    let mut parts = pattern.split('*');
    let Some(first) = parts.next() else {
        return key.is_empty();
    };
    let Some(mut rest) = key.strip_prefix(first) else {
        return false;
    };

    let tail: Vec<&str> = parts.collect();
    let Some((last, middle)) = tail.split_last() else {
        // no `*` at all
        return rest.is_empty();
    };

    for part in middle {
        match rest.find(part) {
            Some(pos) => rest = &rest[pos + part.len()..],
            None => return false,
        }
    }
    rest.len() >= last.len() && rest.ends_with(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[tokio::test]
    async fn set_get_is_last_write_wins() {
        let store = InMemoryKvStore::new();
        store.set("market:1", "a".into()).await.unwrap();
        store.set("market:1", "b".into()).await.unwrap();
        assert_eq!(store.get("market:1").await.unwrap().as_deref(), Some("b"));
        assert_eq!(store.get("market:2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn lpush_prepends() {
        let store = InMemoryKvStore::new();
        assert_eq!(store.lpush("user:u:predictions", "p1".into()).await.unwrap(), 1);
        assert_eq!(store.lpush("user:u:predictions", "p2".into()).await.unwrap(), 2);
        let all = store.lrange("user:u:predictions", 0, -1).await.unwrap();
        assert_eq!(all, vec!["p2", "p1"]);
    }

    #[rstest]
    #[case::all(0, -1, &["c", "b", "a"])]
    #[case::first_two(0, 1, &["c", "b"])]
    #[case::last_one(-1, -1, &["a"])]
    #[case::stop_past_end(1, 99, &["b", "a"])]
    #[case::start_past_end(5, 10, &[])]
    #[case::inverted(2, 0, &[])]
    #[case::start_before_begin(-10, 0, &["c"])]
    #[tokio::test]
    async fn lrange_follows_inclusive_negative_indexing(
        #[case] start: isize,
        #[case] stop: isize,
        #[case] expected: &[&str],
    ) {
        let store = InMemoryKvStore::new();
        for v in ["a", "b", "c"] {
            store.lpush("l", v.into()).await.unwrap();
        }
        assert_eq!(store.lrange("l", start, stop).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn lrange_of_missing_key_is_empty() {
        let store = InMemoryKvStore::new();
        assert!(store.lrange("nope", 0, -1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn wrong_type_is_reported() {
        let store = InMemoryKvStore::new();
        store.set("k", "v".into()).await.unwrap();
        assert!(matches!(
            store.lpush("k", "x".into()).await,
            Err(StoreError::WrongType { .. })
        ));

        store.lpush("l", "x".into()).await.unwrap();
        assert!(matches!(store.get("l").await, Err(StoreError::WrongType { .. })));
    }

    #[tokio::test]
    async fn keys_are_filtered_by_pattern_and_sorted() {
        let store = InMemoryKvStore::new();
        store.set("market:2", "{}".into()).await.unwrap();
        store.set("market:1", "{}".into()).await.unwrap();
        store.set("prediction:1", "{}".into()).await.unwrap();

        assert_eq!(
            store.keys("market:*").await.unwrap(),
            vec!["market:1", "market:2"]
        );
        assert_eq!(store.keys("*").await.unwrap().len(), 3);
        assert_eq!(store.len(), 3);
    }

    #[rstest]
    #[case("market:*", "market:1", true)]
    #[case("market:*", "market:", true)]
    #[case("market:*", "prediction:1", false)]
    #[case("user:*:predictions", "user:alice:predictions", true)]
    #[case("user:*:predictions", "user:alice:likes", false)]
    #[case("exact", "exact", true)]
    #[case("exact", "exactly", false)]
    #[case("*:1", "market:1", true)]
    #[case("a*a", "a", false)]
    fn glob_matching(#[case] pattern: &str, #[case] key: &str, #[case] expected: bool) {
        assert_eq!(glob_match(pattern, key), expected);
    }
}
