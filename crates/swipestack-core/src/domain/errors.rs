//! Errors - エラー型と分類
//!
//! swipe engine 内の失敗はすべてローカルかつ非致命的。
//! - ItemError: 表示に必要なフィールド不足（ロード時にスキップ）
//! - StoreError / SourceError / SinkError: 外部コラボレーターの失敗
//! - SessionError: coordinator の誤用（ジェスチャ中の replace など）

use thiserror::Error;

use super::ids::ItemId;
use super::state::SessionState;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    #[error("item {item:?}: missing required field `{field}`")]
    MissingField { item: ItemId, field: &'static str },

    #[error("item {item:?}: invalid `{field}`: {reason}")]
    InvalidValue {
        item: ItemId,
        field: &'static str,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key {key} holds the wrong kind of value")]
    WrongType { key: String },

    #[error("serialization failed for {key}: {source}")]
    Serde {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("item source failed: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("decision rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cannot replace the queue while {state:?}")]
    ReplaceWhileBusy { state: SessionState },
}
