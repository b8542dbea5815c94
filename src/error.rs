//! Main Crate Error

#[derive(thiserror::Error, Debug)]
/// Mainline store crate error enum.
pub enum Error {
    /// Signature verification failed, or the target does not match the item's content or key.
    #[error("Bad item: {0}")]
    BadItem(BadItem),

    #[error("Message (v field) too big: {size} > {max}")]
    ValueTooLarge { size: usize, max: usize },

    #[error("Salt (salt field) too big: {size} > {max}")]
    SaltTooLarge { size: usize, max: usize },

    /// The sequence number of a mutable write is not greater than the stored one.
    #[error("Sequence number {incoming} is less than or equal to current {current}")]
    StaleSequence { current: u64, incoming: u64 },

    #[error("Invalid Id size, expected 20, got {0}")]
    InvalidIdSize(usize),

    #[error("Invalid Id encoding, expected 40 hex characters")]
    InvalidIdHex,

    #[error("Invalid compact node info size, expected 26 or 38, got {0}")]
    InvalidNodeInfoSize(usize),

    #[error("Failed to encode bencode value: {0}")]
    /// Transparent [serde_bencode::Error]
    Bencode(#[from] serde_bencode::Error),
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
/// Reason a storage item failed validation.
pub enum BadItem {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("target doesn't match the sha1 hash of its content or key")]
    TargetMismatch,

    /// An immutable item for a mutable target, or the other way around.
    #[error("item kind doesn't match the item stored for this target")]
    KindMismatch,
}

#[derive(Debug, PartialEq, Eq, Clone)]
/// KRPC error body sent back to a requester whose put was rejected.
///
/// Codes follow [BEP_0005](https://www.bittorrent.org/beps/bep_0005.html) and
/// [BEP_0044](https://www.bittorrent.org/beps/bep_0044.html).
pub struct ErrorSpecific {
    pub code: i32,
    pub description: String,
}

impl From<&Error> for ErrorSpecific {
    fn from(error: &Error) -> Self {
        let (code, description) = match error {
            Error::BadItem(BadItem::InvalidSignature) => (206, "Invalid signature".to_string()),
            Error::BadItem(reason) => (203, format!("Bad item: {}", reason)),
            Error::ValueTooLarge { .. } => (205, "Message (v field) too big.".to_string()),
            Error::SaltTooLarge { .. } => (207, "salt (salt field) too big.".to_string()),
            Error::StaleSequence { .. } => (302, "Sequence number less than current.".to_string()),
            Error::InvalidIdSize(_) | Error::InvalidIdHex | Error::InvalidNodeInfoSize(_) => {
                (203, error.to_string())
            }
            Error::Bencode(_) => (201, error.to_string()),
        };

        ErrorSpecific { code, description }
    }
}
