//! In-memory [Store] implementation.

use std::sync::{PoisonError, RwLock};

use lru::LruCache;
use tracing::{debug, trace};

use super::Store;
use crate::{common::Item, config::StoreConfig, BadItem, Error, Id, Result};

#[derive(Debug)]
/// In-memory [Store] guarded by a single read/write lock.
///
/// Reads share the lock, and each `put` holds the write lock for the whole
/// compare-and-replace, so concurrent writers to one target never lose an update.
pub struct MemoryStore {
    config: StoreConfig,
    items: RwLock<LruCache<Id, Item>>,
}

impl MemoryStore {
    /// Create an unbounded store with the default size limits.
    pub fn new() -> Self {
        Self::with_config(&StoreConfig::default())
    }

    pub fn with_config(config: &StoreConfig) -> Self {
        let items = match config.max_items {
            Some(capacity) => LruCache::new(capacity),
            None => LruCache::unbounded(),
        };

        Self {
            config: *config,
            items: RwLock::new(items),
        }
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn put(&self, item: Item) -> Result<()> {
        let target = *item.target();

        // Validation only depends on the item, so it runs before taking the lock.
        if let Err(error) = item
            .check_limits(self.config.max_value_size, self.config.max_salt_size)
            .and_then(|_| item.validate())
        {
            debug!(?target, ?error, "Rejected invalid item");
            return Err(error);
        }

        // A poisoned lock still holds a consistent map, since every write is a single `put`.
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);

        match (items.peek(&target), item.seq()) {
            (Some(Item::Mutable(existing)), Some(incoming)) => {
                let current = existing.seq();

                if incoming <= current {
                    debug!(?target, current, incoming, "Sequence number less than current.");

                    return Err(Error::StaleSequence { current, incoming });
                }
            }
            // Same target means same content, keep the first copy.
            (Some(Item::Immutable(_)), None) => {
                trace!(?target, "Immutable item already stored");

                return Ok(());
            }
            // Targets of both kinds can collide, neither replaces the other.
            (Some(Item::Mutable(_)), None) | (Some(Item::Immutable(_)), Some(_)) => {
                debug!(?target, "Item kind doesn't match the stored item");

                return Err(Error::BadItem(BadItem::KindMismatch));
            }
            (None, _) => {}
        }

        trace!(?target, seq = ?item.seq(), "Stored item");
        items.put(target, item);

        Ok(())
    }

    fn get(&self, target: &Id) -> Result<Option<Item>> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);

        Ok(items.peek(target).cloned())
    }
}
