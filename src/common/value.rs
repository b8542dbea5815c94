//! Bencoding of the `v` field shared by immutable and mutable items.

use crate::{Error, Result};

/// Maximum size of the bencoded `v` field, as recommended by
/// [BEP_0044](https://www.bittorrent.org/beps/bep_0044.html).
pub const MAX_VALUE_SIZE: usize = 1000;
/// Maximum size of a mutable item's salt.
pub const MAX_SALT_SIZE: usize = 64;

/// Bencode a value as a byte string, e.g. `12:Hello world!`.
pub fn encode_value(value: &[u8]) -> Result<Vec<u8>> {
    Ok(serde_bencode::to_bytes(&serde_bytes::Bytes::new(value))?)
}

/// Returns the bencoded `value`, or [Error::ValueTooLarge] if it is longer than `max`.
pub(crate) fn encode_bounded(value: &[u8], max: usize) -> Result<Vec<u8>> {
    let encoded = encode_value(value)?;

    if encoded.len() > max {
        return Err(Error::ValueTooLarge {
            size: encoded.len(),
            max,
        });
    }

    Ok(encoded)
}

pub(crate) fn check_salt(salt: Option<&[u8]>, max: usize) -> Result<()> {
    match salt {
        Some(salt) if salt.len() > max => Err(Error::SaltTooLarge {
            size: salt.len(),
            max,
        }),
        _ => Ok(()),
    }
}
