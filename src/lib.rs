#![doc = include_str!("../README.md")]

// Public modules
mod common;
mod config;
mod error;
pub mod health;
pub mod store;

pub use crate::common::{
    encode_signable, encode_value, hash_immutable, target_from_key, Id, ImmutableItem, Item,
    MutableItem, Node, NodeInfo, ID_SIZE, MAX_SALT_SIZE, MAX_VALUE_SIZE,
};
pub use config::{Config, StoreConfig};
pub use error::{BadItem, Error, ErrorSpecific};
pub use health::{Health, HealthPolicy, NodeActivity};
pub use store::{MemoryStore, Store};

pub use ed25519_dalek::SigningKey;

/// Alias for `Result<T, Error>`.
pub type Result<T, E = Error> = std::result::Result<T, E>;
