//! General-purpose data structures shared by the generator and simulation

mod indexed_heap;
mod weighted;

pub use indexed_heap::{HeapKey, IndexedHeap};
pub use weighted::WeightedDistribution;
