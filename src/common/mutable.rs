//! Helper functions and structs for mutable items.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha1_smol::Sha1;

use super::{check_salt, encode_bounded, encode_value, MAX_SALT_SIZE, MAX_VALUE_SIZE};
use crate::{BadItem, Error, Id, Result};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// [BEP_0044](https://www.bittorrent.org/beps/bep_0044.html)'s Mutable item.
pub struct MutableItem {
    /// hash of the key and optional salt
    target: Id,
    /// ed25519 public key
    key: [u8; 32],
    /// sequence number
    seq: u64,
    /// mutable value
    value: Box<[u8]>,
    /// ed25519 signature
    #[serde(with = "serde_bytes")]
    signature: [u8; 64],
    /// Optional salt
    salt: Option<Box<[u8]>>,
    /// Optional compare-and-swap token, stored but not interpreted
    cas: Option<Box<[u8]>>,
}

impl MutableItem {
    /// Create a new mutable item from a signing key, value, sequence number,
    /// optional salt and optional CAS token.
    ///
    /// Fails if the bencoded value is larger than [MAX_VALUE_SIZE]
    /// or the salt is larger than [MAX_SALT_SIZE].
    pub fn new(
        signer: &SigningKey,
        value: &[u8],
        seq: u64,
        salt: Option<&[u8]>,
        cas: Option<&[u8]>,
    ) -> Result<Self> {
        Self::with_max_size(signer, value, seq, salt, cas, MAX_VALUE_SIZE)
    }

    /// Same as [Self::new] with an explicit bound on the bencoded value size.
    pub fn with_max_size(
        signer: &SigningKey,
        value: &[u8],
        seq: u64,
        salt: Option<&[u8]>,
        cas: Option<&[u8]>,
        max_value_size: usize,
    ) -> Result<Self> {
        let salt = non_empty(salt);

        encode_bounded(value, max_value_size)?;
        check_salt(salt, MAX_SALT_SIZE)?;

        let signable = encode_signable(seq, value, salt)?;
        let signature = signer.sign(&signable);
        let key = signer.verifying_key().to_bytes();

        Ok(Self {
            target: target_from_key(&key, salt),
            key,
            seq,
            value: value.into(),
            signature: signature.to_bytes(),
            salt: salt.map(|s| s.into()),
            cas: cas.map(|c| c.into()),
        })
    }

    /// Create a mutable item from its claimed target and already signed fields,
    /// for example as received in a `put` request.
    ///
    /// Call [Self::validate] before trusting it.
    pub fn from_parts(
        target: Id,
        key: [u8; 32],
        signature: [u8; 64],
        value: &[u8],
        seq: u64,
        salt: Option<&[u8]>,
        cas: Option<&[u8]>,
    ) -> Self {
        Self {
            target,
            key,
            seq,
            value: value.into(),
            signature,
            salt: non_empty(salt).map(|s| s.into()),
            cas: cas.map(|c| c.into()),
        }
    }

    /// Verify the signature, then confirm the target is derived from the key and salt.
    pub fn validate(&self) -> Result<()> {
        self.verify_signature()?;
        self.verify_target()
    }

    /// Verify the ed25519 signature over the canonical signable buffer.
    pub fn verify_signature(&self) -> Result<()> {
        let key = VerifyingKey::from_bytes(&self.key)
            .map_err(|_| Error::BadItem(BadItem::InvalidPublicKey))?;
        let signature = Signature::from_bytes(&self.signature);

        let signable = encode_signable(self.seq, &self.value, self.salt())?;

        key.verify(&signable, &signature)
            .map_err(|_| Error::BadItem(BadItem::InvalidSignature))
    }

    /// Confirm that `target == sha1(key ‖ salt)`.
    ///
    /// A valid signature alone does not prove the claimed target was derived from this key.
    pub fn verify_target(&self) -> Result<()> {
        if target_from_key(&self.key, self.salt()) != self.target {
            return Err(Error::BadItem(BadItem::TargetMismatch));
        }

        Ok(())
    }

    // === Getters ===

    pub fn target(&self) -> &Id {
        &self.target
    }

    pub fn key(&self) -> &[u8; 32] {
        &self.key
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn signature(&self) -> &[u8; 64] {
        &self.signature
    }

    pub fn salt(&self) -> Option<&[u8]> {
        self.salt.as_deref()
    }

    pub fn cas(&self) -> Option<&[u8]> {
        self.cas.as_deref()
    }
}

/// Return the target of a [MutableItem] by hashing its `public_key` and an optional `salt`
pub fn target_from_key(public_key: &[u8; 32], salt: Option<&[u8]>) -> Id {
    let mut hasher = Sha1::new();

    hasher.update(public_key);

    if let Some(salt) = salt {
        hasher.update(salt);
    }

    hasher.digest().bytes().into()
}

/// Encode the buffer signed by a mutable item's owner:
/// `[4:salt<bencoded salt>]3:seqi<seq>e1:v<bencoded value>`.
pub fn encode_signable(seq: u64, value: &[u8], salt: Option<&[u8]>) -> Result<Box<[u8]>> {
    let mut signable = vec![];

    if let Some(salt) = non_empty(salt) {
        signable.extend(b"4:salt");
        signable.extend(encode_value(salt)?);
    }

    signable.extend(format!("3:seqi{}e1:v", seq).into_bytes());
    signable.extend(encode_value(value)?);

    Ok(signable.into())
}

fn non_empty(salt: Option<&[u8]>) -> Option<&[u8]> {
    salt.filter(|s| !s.is_empty())
}
