//! OutcomeDispatch port - settle 時に outcome を手放す先
//!
//! coordinator は同期的に呼ぶ。実装は fire-and-forget でなければならない
//! （ブロックしない、失敗を返さない）。

use crate::domain::SwipeOutcome;

pub trait OutcomeDispatch: Send + Sync {
    fn dispatch(&self, outcome: SwipeOutcome);
}
