//! The record kinds the liquid-staking state machine advances.
//!
//! Records are append-and-advance: each one is created by a user action or an
//! epoch hook, walked through its status enum by transfer callbacks and
//! operator confirmations, and physically moved to an archive store when it
//! terminates. Ids are strictly monotonic within a kind (active + archive).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    address::Address,
    constants::TX_HASH_HEX_LEN,
    types::{Amount, SignedAmount},
};

/// Errors from stateless record validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// A remote tx hash was not 64 hex characters.
    #[error("invalid tx hash: {0}")]
    InvalidTxHash(String),
}

/// Validates a remote transaction hash: 64 lowercase hex characters.
///
/// The hash is never checked against the remote chain; it is a forensic
/// reference recorded alongside operator confirmations.
pub fn validate_tx_hash(hash: &str) -> Result<(), RecordError> {
    let ok = hash.len() == TX_HASH_HEX_LEN
        && hash
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    if ok {
        Ok(())
    } else {
        Err(RecordError::InvalidTxHash(hash.to_string()))
    }
}

/// Lifecycle of one epoch's batch of deposits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelegationStatus {
    /// The batch transfer to the remote delegation account is in flight.
    TransferInProgress,

    /// The transfer was acked unsuccessfully or timed out; the safe admin's
    /// overwrite facility is the recovery path.
    TransferFailed,

    /// Funds have landed remotely; the batch is waiting for the operator to
    /// delegate and confirm.
    DelegationQueue,

    /// The operator confirmed the remote delegation; the record is archived.
    DelegationComplete,
}

impl fmt::Display for DelegationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DelegationStatus::TransferInProgress => "transfer_in_progress",
            DelegationStatus::TransferFailed => "transfer_failed",
            DelegationStatus::DelegationQueue => "delegation_queue",
            DelegationStatus::DelegationComplete => "delegation_complete",
        };
        f.write_str(s)
    }
}

/// One epoch's worth of deposits on their way to the remote validator set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationRecord {
    /// Record id; equals the day-epoch number that created it.
    pub id: u64,

    /// The batch size in the native token.
    pub native_amount: Amount,

    /// Where the batch is in its lifecycle.
    pub status: DelegationStatus,

    /// Hash of the remote delegation transaction, set at confirmation.
    pub tx_hash: String,
}

impl DelegationRecord {
    /// Creates a fresh record in `TransferInProgress`.
    pub fn new(id: u64, native_amount: Amount) -> Self {
        Self {
            id,
            native_amount,
            status: DelegationStatus::TransferInProgress,
            tx_hash: String::new(),
        }
    }
}

/// Lifecycle of one batch of redemptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnbondingStatus {
    /// The open record new redemptions accumulate onto. Exactly one record
    /// is in this status at any time.
    AccumulatingRedemptions,

    /// Frozen at the undelegation epoch; waiting for the operator to execute
    /// the remote undelegation.
    UnbondingQueue,

    /// The operator confirmed the remote undelegation; the remote unbonding
    /// period is running.
    UnbondingInProgress,

    /// The unbonding period has elapsed; funds can be swept home.
    Unbonded,

    /// The operator confirmed the sweep; redeemers can be paid out.
    Claimable,

    /// All bound redemptions were paid; the record is archived.
    Archived,
}

impl fmt::Display for UnbondingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnbondingStatus::AccumulatingRedemptions => "accumulating_redemptions",
            UnbondingStatus::UnbondingQueue => "unbonding_queue",
            UnbondingStatus::UnbondingInProgress => "unbonding_in_progress",
            UnbondingStatus::Unbonded => "unbonded",
            UnbondingStatus::Claimable => "claimable",
            UnbondingStatus::Archived => "archived",
        };
        f.write_str(s)
    }
}

/// One batch of pending redemptions moving through the unbonding pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbondingRecord {
    /// Record id; equals the day-epoch number that created it.
    pub id: u64,

    /// Where the batch is in its lifecycle.
    pub status: UnbondingStatus,

    /// Native tokens owed to redeemers in this batch.
    pub native_amount: Amount,

    /// Staked tokens escrowed for this batch, burned at confirm-undelegation.
    pub st_token_amount: Amount,

    /// Unix seconds at which the remote unbonding completes.
    pub unbonding_completion_time_seconds: u64,

    /// Hash of the remote undelegation transaction.
    pub undelegation_tx_hash: String,

    /// Hash of the remote sweep transaction that returned the funds.
    pub unbonded_token_sweep_tx_hash: String,
}

impl UnbondingRecord {
    /// Creates a fresh empty record in `AccumulatingRedemptions`.
    pub fn accumulating(id: u64) -> Self {
        Self {
            id,
            status: UnbondingStatus::AccumulatingRedemptions,
            native_amount: 0,
            st_token_amount: 0,
            unbonding_completion_time_seconds: 0,
            undelegation_tx_hash: String::new(),
            unbonded_token_sweep_tx_hash: String::new(),
        }
    }
}

/// A single redeemer's claim on one unbonding record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionRecord {
    /// The unbonding record this claim is bound to.
    pub unbonding_record_id: u64,

    /// The redeemer to pay out from the claim address.
    pub redeemer: Address,

    /// Native tokens owed.
    pub native_amount: Amount,

    /// Staked tokens the redeemer escrowed.
    pub st_token_amount: Amount,
}

/// Audit trail of one operator delegated-balance adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlashRecord {
    /// Monotonically increasing id.
    pub id: u64,

    /// Block time at which the adjustment was recorded.
    pub time: u64,

    /// The remote validator the adjustment is attributed to.
    pub validator_address: String,

    /// The signed native amount applied to the delegated balance.
    pub native_amount: SignedAmount,
}
