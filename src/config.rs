use std::num::NonZeroUsize;

use crate::common::{MAX_SALT_SIZE, MAX_VALUE_SIZE};
use crate::health::HealthPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Limits enforced by a [crate::MemoryStore] on every `put`.
pub struct StoreConfig {
    /// Maximum size of a bencoded `v` field.
    ///
    /// Defaults to [MAX_VALUE_SIZE]
    pub max_value_size: usize,
    /// Maximum size of a mutable item's salt.
    ///
    /// Defaults to [MAX_SALT_SIZE]
    pub max_salt_size: usize,
    /// Maximum number of items to keep, evicting the least recently written.
    ///
    /// Defaults to None, keeping every item until it is superseded.
    pub max_items: Option<NonZeroUsize>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_value_size: MAX_VALUE_SIZE,
            max_salt_size: MAX_SALT_SIZE,
            max_items: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Node configurations
pub struct Config {
    /// Thresholds used to classify remote nodes.
    ///
    /// Defaults to [HealthPolicy::default]
    pub health: HealthPolicy,
    /// Storage limits for [BEP_0044](https://www.bittorrent.org/beps/bep_0044.html) items.
    ///
    /// Defaults to [StoreConfig::default]
    pub store: StoreConfig,
}
