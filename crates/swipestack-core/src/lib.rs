//! swipestack-core
//!
//! Core building blocks for the swipe decision stack.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, item, gesture, decision, outcome, motion, state, events, errors）
//! - **ports**: 抽象化レイヤー（ItemSource, DecisionSink, KeyValueStore, Notifier, OutcomeDispatch, Clock, IdGenerator）
//! - **impls**: 実装（InMemoryKvStore, KvMarketCatalog, KvPredictionLedger など）
//! - **queue**: Item Queue（cursor 付きのデッキ）
//! - **engine**: gesture tracker, springs, motion controller, coordinator
//! - **app**: SessionBuilder, SwipeSession, SinkWorker
//! - **config**: TOML 設定と logging
//! - observability: SessionCounts
//! - error: crate レベルのエラー

pub mod app;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod impls;
pub mod observability;
pub mod ports;
pub mod queue;

pub use error::{Error, Result};
