//! Interfaces of the framework modules the engine consumes.
//!
//! The bank, account, transfer and staking-mirror modules belong to the host
//! framework; the engine only ever talks to them through these traits. All
//! state they touch goes through the same [`Store`] handle as the engine's
//! own records, so a handler's overlay rolls their effects back too.

use std::fmt::Debug;

use thiserror::Error;

use floe_db::Store;
use floe_primitives::{Address, Amount, Coin};

/// Errors surfaced by collaborator modules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    /// A send or burn exceeded the account's balance.
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

    /// The receiving address refuses bank sends.
    #[error("address {0} is blocked from receiving funds")]
    BlockedAddress(String),

    /// The transfer module refused to dispatch a packet.
    #[error("transfer dispatch failed: {0}")]
    TransferFailed(String),
}

/// The bank module: balances, supply, mint and burn.
pub trait Bank: Debug {
    /// Total supply of a denom.
    fn supply(&self, store: &dyn Store, denom: &str) -> Amount;

    /// Balance of an account in a denom.
    fn balance(&self, store: &dyn Store, address: &Address, denom: &str) -> Amount;

    /// Moves coins between accounts.
    fn send(
        &self,
        store: &dyn Store,
        from: &Address,
        to: &Address,
        coins: &[Coin],
    ) -> Result<(), CollaboratorError>;

    /// Mints coins into a module account.
    fn mint_to_module(
        &self,
        store: &dyn Store,
        module: &str,
        coins: &[Coin],
    ) -> Result<(), CollaboratorError>;

    /// Burns coins held by a module account.
    fn burn_from_module(
        &self,
        store: &dyn Store,
        module: &str,
        coins: &[Coin],
    ) -> Result<(), CollaboratorError>;

    /// Moves coins from a module account to a user account.
    fn send_from_module(
        &self,
        store: &dyn Store,
        module: &str,
        to: &Address,
        coins: &[Coin],
    ) -> Result<(), CollaboratorError>;

    /// Moves coins from a user account into a module account.
    fn send_to_module(
        &self,
        store: &dyn Store,
        from: &Address,
        module: &str,
        coins: &[Coin],
    ) -> Result<(), CollaboratorError>;

    /// Whether an address refuses bank sends (module escrows etc).
    fn is_blocked(&self, address: &Address) -> bool;
}

/// The account module: module-account address derivation.
pub trait AccountKeeper: Debug {
    /// The deterministic address of a named module account.
    fn module_address(&self, module: &str) -> Address;
}

/// A cross-chain token transfer to dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferMsg {
    /// Port on the local chain, normally `transfer`.
    pub source_port: String,

    /// The local channel to send over.
    pub source_channel: String,

    /// The coin to move.
    pub token: Coin,

    /// The local sending account.
    pub sender: Address,

    /// The remote receiving account (foreign bech32, passed through).
    pub receiver: String,

    /// Unix seconds after which the packet times out.
    pub timeout_timestamp: u64,
}

/// The transfer module: queues an outbound packet and reports its sequence.
pub trait TransferKeeper: Debug {
    /// Dispatches a transfer, returning the packet sequence number on the
    /// source channel. Resolution arrives later via ack or timeout.
    fn transfer(&self, store: &dyn Store, msg: &TransferMsg) -> Result<u64, CollaboratorError>;
}

/// The collaborator staking module that mirrors the delegated total.
///
/// The engine owns `remaining_delegated_balance`; every change is written to
/// this mirror in the same handler so the two can never diverge.
pub trait StakingMirror: Debug {
    /// The mirrored delegated total for a chain.
    fn total_delegations(&self, store: &dyn Store, chain_id: &str) -> Amount;

    /// Overwrites the mirrored delegated total for a chain.
    fn set_total_delegations(&self, store: &dyn Store, chain_id: &str, total: Amount);
}
