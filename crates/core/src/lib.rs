//! The floe liquid-staking engine.
//!
//! This crate ties the record stores, the rate limiter and the collaborator
//! interfaces together into the module's message surface: deposit-and-mint,
//! redeem-and-escrow, the operator-driven delegation and undelegation
//! lifecycles, the redemption-rate safety monitor and the epoch hooks that
//! advance everything on day and hour boundaries.

#[cfg(test)]
use floe_test_utils as _;
#[cfg(test)]
use serde_json as _;

pub mod admin;
pub mod collaborators;
pub mod context;
pub mod delegation;
pub mod errors;
pub mod genesis;
pub mod hooks;
pub mod keeper;
pub mod msgs;
pub mod queries;
pub mod safety;
pub mod stake;
pub mod unbonding;

pub use context::Context;
pub use errors::{FloeError, FloeResult};
pub use keeper::Keeper;
