//! Queue module: the ordered item deck the coordinator owns.

mod deck;

pub use deck::ItemQueue;
