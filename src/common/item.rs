//! A storage item of either kind, as held by a [crate::Store].

use serde::{Deserialize, Serialize};

use super::{check_salt, encode_bounded, ImmutableItem, MutableItem};
use crate::{Id, Result};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// [BEP_0044](https://www.bittorrent.org/beps/bep_0044.html) storage item.
pub enum Item {
    Immutable(ImmutableItem),
    Mutable(MutableItem),
}

impl Item {
    /// The address this item is stored under.
    pub fn target(&self) -> &Id {
        match self {
            Item::Immutable(item) => item.target(),
            Item::Mutable(item) => item.target(),
        }
    }

    pub fn value(&self) -> &[u8] {
        match self {
            Item::Immutable(item) => item.value(),
            Item::Mutable(item) => item.value(),
        }
    }

    /// Returns `true` if the item carries a public key.
    pub fn is_mutable(&self) -> bool {
        matches!(self, Item::Mutable(_))
    }

    /// Sequence number of a mutable item, `None` for immutable items.
    pub fn seq(&self) -> Option<u64> {
        match self {
            Item::Immutable(_) => None,
            Item::Mutable(item) => Some(item.seq()),
        }
    }

    /// Validate the item before accepting it.
    ///
    /// Immutable items must hash to their target, mutable items must carry a valid
    /// signature and a target derived from their key and salt.
    pub fn validate(&self) -> Result<()> {
        match self {
            Item::Immutable(item) => item.validate(),
            Item::Mutable(item) => item.validate(),
        }
    }

    /// Returns `false` if the requester already knows a sequence number at least as
    /// recent as this mutable item's, so a `get` can answer with the seq only.
    ///
    /// Immutable items are always considered newer.
    pub fn is_newer_than(&self, seq: Option<u64>) -> bool {
        match (self.seq(), seq) {
            (Some(current), Some(known)) => current > known,
            _ => true,
        }
    }

    pub(crate) fn check_limits(&self, max_value_size: usize, max_salt_size: usize) -> Result<()> {
        encode_bounded(self.value(), max_value_size)?;

        if let Item::Mutable(item) = self {
            check_salt(item.salt(), max_salt_size)?;
        }

        Ok(())
    }
}

impl From<ImmutableItem> for Item {
    fn from(item: ImmutableItem) -> Self {
        Item::Immutable(item)
    }
}

impl From<MutableItem> for Item {
    fn from(item: MutableItem) -> Self {
        Item::Mutable(item)
    }
}
