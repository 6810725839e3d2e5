//! Typed persistence for the floe module.
//!
//! The host framework exposes a versioned key-value tree; this crate models
//! it with a [`Store`](kv::Store) trait, an in-memory implementation and an
//! overlay store used to make every message handler (and the distribute-
//! claims sandbox) atomic. On top of that sit typed stores for each record
//! kind, with archive sub-stores so live iteration stays bounded.

pub mod codec;
pub mod delegation;
pub mod errors;
pub mod host_zone;
pub mod keys;
pub mod kv;
pub mod redemption;
pub mod slash;
pub mod transfer;
pub mod unbonding;

pub use errors::{DbError, DbResult};
pub use kv::{CacheStore, MemStore, Store};
