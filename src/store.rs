//! Storage for [BEP_0044](https://www.bittorrent.org/beps/bep_0044.html) items.

mod memory;

pub use memory::MemoryStore;

use crate::{common::Item, Id, Result};

/// Key-value store of validated items, keyed by their target.
///
/// Implementations must validate items before accepting them, and serialize
/// writes to the same target so that a stale mutable item never replaces a newer one.
pub trait Store: std::fmt::Debug + Send + Sync {
    /// Validate and store an item.
    ///
    /// Returns [crate::Error::StaleSequence] if a mutable item with an equal or
    /// higher sequence number is already stored for the same target.
    fn put(&self, item: Item) -> Result<()>;

    /// Returns the current item for a target, or `None` if nothing was stored.
    fn get(&self, target: &Id) -> Result<Option<Item>>;
}
