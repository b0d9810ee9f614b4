// Dataset trait — the sequence protocol consumed by training loops

use rxngraph_core::Result;

/// A dataset is an indexed, length-bearing collection of items.
///
/// Implementations must be `Send + Sync`: `get` takes `&self` and may be
/// called from several threads at once, so it must not mutate shared state.
pub trait Dataset: Send + Sync {
    /// What one index yields.
    type Item;

    /// Total number of items in the dataset.
    fn len(&self) -> usize;

    /// Whether the dataset is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Retrieve the item at position `index`.
    ///
    /// Fails with `Error::IndexOutOfRange` if `index >= self.len()`.
    fn get(&self, index: usize) -> Result<Self::Item>;

    /// Optional human-readable name.
    fn name(&self) -> &str {
        "dataset"
    }
}
