//! DecisionSink port - 決定の記録先
//!
//! coordinator はこの呼び出しを待たない（sink worker が順に submit する）。

use async_trait::async_trait;

use crate::domain::{SinkError, SwipeOutcome};

#[async_trait]
pub trait DecisionSink: Send + Sync {
    async fn submit(&self, outcome: &SwipeOutcome) -> Result<(), SinkError>;
}
