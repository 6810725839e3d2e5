//! IBC rate-limiting middleware for the token-transfer channel.
//!
//! The middleware wraps outgoing sends and incoming receives, accounts each
//! packet against a per-(denom, channel) quota on *net* flow, refuses
//! blacklisted denoms outright, lets whitelisted address pairs bypass the
//! quota, and tracks pending send sequences so a failed or timed-out send
//! rolls its outflow back.

pub mod errors;
pub mod gov;
pub mod keys;
pub mod middleware;
pub mod query;
pub mod store;
pub mod types;

pub use errors::RateLimitError;
pub use types::{Flow, PacketDirection, Path, Quota, RateLimit, WhitelistedAddressPair};
