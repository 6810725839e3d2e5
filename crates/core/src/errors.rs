//! Error types for the liquid-staking engine.

use thiserror::Error;

use floe_db::DbError;
use floe_primitives::{
    address::AddressError, host_zone::HostZoneError, records::RecordError, Amount, Dec,
};
use floe_ratelimit::RateLimitError;

use crate::collaborators::CollaboratorError;

/// Unified error type for everything that can go wrong in a handler.
#[derive(Debug, Error)]
pub enum FloeError {
    /// A malformed bech32 address reached a handler.
    #[error("invalid address: {0}")]
    InvalidAddress(#[from] AddressError),

    /// The signer does not hold the role the message requires.
    #[error("signer {signer} is not the {role} address")]
    InvalidAdmin {
        /// The address that signed the message.
        signer: String,
        /// The role that was required.
        role: &'static str,
    },

    /// The zone is halted; only the safe admin can resume it.
    #[error("host zone is halted")]
    HostZoneHalted,

    /// The zone is not halted, so there is nothing to resume.
    #[error("host zone is not halted")]
    HostZoneNotHalted,

    /// The redemption rate left its safety band.
    #[error("redemption rate {rate} is outside the {bound} safety bounds")]
    RedemptionRateOutsideBounds {
        /// The offending rate.
        rate: Dec,
        /// Which band was crossed, `inner` or `outer`.
        bound: &'static str,
    },

    /// A liquid stake too small to mint a single staked token.
    #[error("liquid stake of {amount} would mint zero staked tokens")]
    InsufficientLiquidStake {
        /// The native amount offered.
        amount: Amount,
    },

    /// A redemption below the configured minimum.
    #[error("redemption of {amount} is below the minimum of {minimum}")]
    RedemptionBelowMinimum {
        /// The staked-token amount offered.
        amount: Amount,
        /// The configured minimum.
        minimum: Amount,
    },

    /// An account does not hold what the operation needs.
    #[error("insufficient funds: {address} holds {available}{denom}, needs {needed}")]
    InsufficientFunds {
        /// The account that came up short.
        address: String,
        /// The denom that was checked.
        denom: String,
        /// The amount required.
        needed: Amount,
        /// The amount available.
        available: Amount,
    },

    /// A delegation record lookup that must succeed did not.
    #[error("delegation record {id} not found")]
    DelegationRecordNotFound {
        /// The record id.
        id: u64,
    },

    /// A delegation record refused a transition.
    #[error("delegation record {id} is not in the correct state: {reason}")]
    DelegationRecordInvalidState {
        /// The record id.
        id: u64,
        /// Why the transition was refused.
        reason: String,
    },

    /// An unbonding record lookup that must succeed did not.
    #[error("unbonding record {id} not found")]
    UnbondingRecordNotFound {
        /// The record id.
        id: u64,
    },

    /// An unbonding record refused a transition.
    #[error("unbonding record {id} is not in the correct state: {reason}")]
    UnbondingRecordInvalidState {
        /// The record id.
        id: u64,
        /// Why the transition was refused.
        reason: String,
    },

    /// A new delegation batch while the previous transfer is unresolved.
    #[error("cannot prepare a delegation while the transfer for record {id} is in progress")]
    TransferInProgress {
        /// The record whose transfer is still in flight.
        id: u64,
    },

    /// Amount arithmetic left the 128-bit range.
    #[error("amount arithmetic overflowed")]
    AmountOverflow,

    /// An adjustment would take the delegated balance below zero.
    #[error("delegated balance would become negative")]
    NegativeDelegatedBalance,

    /// A structural invariant did not hold.
    #[error("invariant broken: {0}")]
    InvariantBroken(String),

    /// A malformed record field (e.g. tx hash) was supplied.
    #[error(transparent)]
    Record(#[from] RecordError),

    /// The host zone failed validation.
    #[error(transparent)]
    HostZone(#[from] HostZoneError),

    /// A store-layer failure.
    #[error(transparent)]
    Db(#[from] DbError),

    /// A rate-limiter failure.
    #[error(transparent)]
    RateLimit(#[from] RateLimitError),

    /// A collaborator (bank, transfer, channel) failure.
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

/// Result alias for handler operations.
pub type FloeResult<T> = Result<T, FloeError>;
