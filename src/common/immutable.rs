//! Helper functions and structs for immutable items.

use serde::{Deserialize, Serialize};
use sha1_smol::Sha1;

use super::{encode_bounded, encode_value, ID_SIZE, MAX_VALUE_SIZE};
use crate::{BadItem, Error, Id, Result};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// [BEP_0044](https://www.bittorrent.org/beps/bep_0044.html)'s Immutable item.
pub struct ImmutableItem {
    /// sha1 hash of the bencoded value
    target: Id,
    /// immutable value
    value: Box<[u8]>,
}

impl ImmutableItem {
    /// Create a new immutable item, addressed by the sha1 hash of its bencoded value.
    ///
    /// Fails if the bencoded value is larger than [MAX_VALUE_SIZE].
    pub fn new(value: &[u8]) -> Result<Self> {
        Self::with_max_size(value, MAX_VALUE_SIZE)
    }

    /// Same as [Self::new] with an explicit bound on the bencoded value size.
    pub fn with_max_size(value: &[u8], max_value_size: usize) -> Result<Self> {
        let encoded = encode_bounded(value, max_value_size)?;

        Ok(Self {
            target: Id(sha1(&encoded)),
            value: value.into(),
        })
    }

    /// Create an immutable item from a claimed target and a value,
    /// for example as received in a `put` request.
    ///
    /// Call [Self::validate] before trusting it.
    pub fn from_parts(target: Id, value: &[u8]) -> Self {
        Self {
            target,
            value: value.into(),
        }
    }

    /// Recompute the hash of the value and compare it to the target.
    pub fn validate(&self) -> Result<()> {
        if hash_immutable(&self.value)? != self.target.0 {
            return Err(Error::BadItem(BadItem::TargetMismatch));
        }

        Ok(())
    }

    // === Getters ===

    pub fn target(&self) -> &Id {
        &self.target
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

/// Return the target of an immutable value: the sha1 hash of the bencoded value.
pub fn hash_immutable(value: &[u8]) -> Result<[u8; ID_SIZE]> {
    Ok(sha1(&encode_value(value)?))
}

fn sha1(bytes: &[u8]) -> [u8; ID_SIZE] {
    let mut hasher = Sha1::new();
    hasher.update(bytes);

    hasher.digest().bytes()
}
