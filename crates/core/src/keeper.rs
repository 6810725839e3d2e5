//! The keeper: collaborator handles, parameters, and shared helpers.

use std::sync::Arc;

use floe_db::{host_zone as host_zone_store, Store};
use floe_params::ProtocolParams;
use floe_primitives::{host_zone::HostZone, Amount, SignedAmount};
use floe_ratelimit::gov::{ChannelRegistry, ChannelValueSource};

use crate::{
    collaborators::{AccountKeeper, Bank, StakingMirror, TransferKeeper},
    context::Context,
    errors::{FloeError, FloeResult},
};

/// The module keeper. Holds the collaborator handles and parameters; all
/// chain state lives in the store a [`Context`] carries.
#[derive(Debug, Clone)]
pub struct Keeper {
    pub(crate) bank: Arc<dyn Bank>,
    pub(crate) accounts: Arc<dyn AccountKeeper>,
    pub(crate) transfer: Arc<dyn TransferKeeper>,
    pub(crate) channels: Arc<dyn ChannelRegistry>,
    pub(crate) staking_mirror: Arc<dyn StakingMirror>,
    pub(crate) params: ProtocolParams,
}

impl Keeper {
    /// Creates a keeper over the given collaborators.
    pub fn new(
        bank: Arc<dyn Bank>,
        accounts: Arc<dyn AccountKeeper>,
        transfer: Arc<dyn TransferKeeper>,
        channels: Arc<dyn ChannelRegistry>,
        staking_mirror: Arc<dyn StakingMirror>,
        params: ProtocolParams,
    ) -> Self {
        Self {
            bank,
            accounts,
            transfer,
            channels,
            staking_mirror,
            params,
        }
    }

    /// The protocol parameters.
    pub fn params(&self) -> &ProtocolParams {
        &self.params
    }

    /// Reads the host zone.
    pub(crate) fn host_zone(&self, store: &dyn Store) -> FloeResult<HostZone> {
        Ok(host_zone_store::get(store)?)
    }

    /// Reads the host zone, refusing a halted one.
    pub(crate) fn unhalted_host_zone(&self, store: &dyn Store) -> FloeResult<HostZone> {
        let host_zone = self.host_zone(store)?;
        if host_zone.halted {
            return Err(FloeError::HostZoneHalted);
        }
        Ok(host_zone)
    }

    /// Applies a signed delta to the remaining delegated balance and writes
    /// the same total to the staking mirror, so the two never diverge.
    ///
    /// The zone is mutated in place; the caller persists it.
    pub(crate) fn delegation_changed(
        &self,
        ctx: &Context<'_>,
        host_zone: &mut HostZone,
        delta: SignedAmount,
    ) -> FloeResult<()> {
        let updated: Amount = if delta >= 0 {
            host_zone
                .remaining_delegated_balance
                .checked_add(delta.unsigned_abs())
                .ok_or(FloeError::AmountOverflow)?
        } else {
            host_zone
                .remaining_delegated_balance
                .checked_sub(delta.unsigned_abs())
                .ok_or(FloeError::NegativeDelegatedBalance)?
        };

        host_zone.remaining_delegated_balance = updated;
        self.staking_mirror
            .set_total_delegations(ctx.store, &host_zone.chain_id, updated);
        Ok(())
    }
}

/// Adapter exposing the bank's total supply as the rate limiter's
/// channel-value source.
#[derive(Debug)]
pub(crate) struct BankSupply<'a>(pub(crate) &'a dyn Bank);

impl ChannelValueSource for BankSupply<'_> {
    fn channel_value(&self, store: &dyn Store, denom: &str) -> Amount {
        self.0.supply(store, denom)
    }
}
