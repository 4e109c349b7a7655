//! Item queue: ordered items plus a cursor.

use crate::domain::Item;

/// Ordered sequence of items and a zero-based cursor.
///
/// Design:
/// - The cursor only moves forward, bounded to `[0, len]`.
/// - `cursor == len` is the exhausted condition.
/// - `advance`/`replace` are crate-private: only the coordinator moves the cursor.
#[derive(Debug, Clone, Default)]
pub struct ItemQueue {
    items: Vec<Item>,
    cursor: usize,
}

impl ItemQueue {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items, cursor: 0 }
    }

    /// Item at the cursor, or `None` once exhausted.
    pub fn current(&self) -> Option<&Item> {
        self.items.get(self.cursor)
    }

    /// Item behind the current one (drawn underneath it).
    pub fn next(&self) -> Option<&Item> {
        self.items.get(self.cursor + 1)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.items.len() - self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.items.len()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Move the cursor by one, clamped at `len`. Returns the new current item.
    pub(crate) fn advance(&mut self) -> Option<&Item> {
        self.cursor = (self.cursor + 1).min(self.items.len());
        self.current()
    }

    /// Swap in a new sequence and reset the cursor.
    pub(crate) fn replace(&mut self, items: Vec<Item>) {
        self.items = items;
        self.cursor = 0;
    }
}
