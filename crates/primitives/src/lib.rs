//! Core domain types for the floe liquid-staking module.
//!
//! Everything persisted or passed across crate boundaries lives here: token
//! amounts and the fixed-point decimal used for redemption rates, IBC denom
//! trace handling, bech32 addresses, the host zone, and the record kinds the
//! state machine advances (delegation, unbonding, redemption, slash).

pub mod address;
pub mod constants;
pub mod dec;
pub mod denom;
pub mod events;
pub mod host_zone;
pub mod records;
pub mod types;

pub use address::Address;
pub use dec::Dec;
pub use types::{Amount, Coin, SignedAmount};
