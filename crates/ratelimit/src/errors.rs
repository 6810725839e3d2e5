//! Error types for the rate limiter.

use thiserror::Error;

use crate::types::PacketDirection;

/// Unified error type for rate-limit operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateLimitError {
    /// A packet would push the net flow past the quota.
    #[error("quota exceeded on {direction}: net flow {net} exceeds threshold {threshold}")]
    QuotaExceeded {
        /// Which direction the packet was moving.
        direction: PacketDirection,
        /// The net flow the packet would have produced.
        net: String,
        /// The quota threshold for this window.
        threshold: String,
    },

    /// Every transfer of this denom is refused.
    #[error("denom {denom} is blacklisted")]
    DenomBlacklisted {
        /// The blacklisted denom.
        denom: String,
    },

    /// No rate limit exists for the given path.
    #[error("rate limit not found for denom {denom} on channel {channel_id}")]
    RateLimitNotFound {
        /// The denom of the path.
        denom: String,
        /// The channel of the path.
        channel_id: String,
    },

    /// A rate limit already exists for the given path.
    #[error("rate limit already exists for denom {denom} on channel {channel_id}")]
    RateLimitAlreadyExists {
        /// The denom of the path.
        denom: String,
        /// The channel of the path.
        channel_id: String,
    },

    /// A new rate limit would divide by a zero channel value.
    #[error("zero channel value for denom {denom}")]
    ZeroChannelValue {
        /// The denom with no supply.
        denom: String,
    },

    /// The channel a rate limit was requested for does not exist.
    #[error("channel {channel_id} not found")]
    ChannelNotFound {
        /// The missing channel.
        channel_id: String,
    },

    /// A quota had percentages above 100 or a zero duration.
    #[error("invalid quota: {0}")]
    InvalidQuota(String),

    /// The ICS-20 packet data could not be parsed.
    #[error("invalid transfer packet: {0}")]
    InvalidPacket(String),

    /// A store-layer failure.
    #[error(transparent)]
    Db(#[from] floe_db::DbError),
}
