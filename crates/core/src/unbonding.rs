//! The undelegation lifecycle: accumulation, queueing, operator
//! confirmations, and the all-or-nothing claim distribution.

use tracing::{info, warn};

use floe_db::{
    host_zone as host_zone_store, redemption as redemption_store, unbonding as unbonding_store,
    CacheStore,
};
use floe_primitives::{
    constants::MODULE_NAME,
    events::{self, EventSink},
    records::{validate_tx_hash, UnbondingRecord, UnbondingStatus},
    Address, Amount, Coin,
};

use crate::{
    collaborators::CollaboratorError,
    context::Context,
    errors::{FloeError, FloeResult},
    keeper::Keeper,
};

impl Keeper {
    /// Freezes the accumulating unbonding record into the queue and opens a
    /// fresh one. Runs every fourth day epoch.
    ///
    /// An empty batch stays accumulating; no new record is created for it.
    pub fn prepare_undelegation(&self, ctx: &mut Context<'_>, epoch_number: u64) -> FloeResult<()> {
        let _ = self.unhalted_host_zone(ctx.store)?;

        let mut record = unbonding_store::accumulating(ctx.store)?.ok_or_else(|| {
            FloeError::InvariantBroken("no accumulating unbonding record".to_string())
        })?;

        if record.st_token_amount == 0 {
            info!(epoch_number, "no redemptions this cycle");
            return Ok(());
        }

        record.status = UnbondingStatus::UnbondingQueue;
        unbonding_store::set(ctx.store, &record)?;

        unbonding_store::safe_set(ctx.store, &UnbondingRecord::accumulating(epoch_number))?;

        info!(
            frozen_record_id = record.id,
            new_record_id = epoch_number,
            st_token_amount = %record.st_token_amount,
            native_amount = %record.native_amount,
            "unbonding batch queued"
        );
        Ok(())
    }

    /// Records the operator's confirmation that the batch was undelegated
    /// remotely, starts the unbonding clock, and burns the escrowed staked
    /// tokens.
    ///
    /// Refused while the zone is halted: burning supply against a suspect
    /// redemption rate would bake the drift in.
    pub fn confirm_undelegation(
        &self,
        ctx: &mut Context<'_>,
        sender: &Address,
        record_id: u64,
        native_amount: Amount,
        tx_hash: &str,
    ) -> FloeResult<()> {
        let mut host_zone = self.unhalted_host_zone(ctx.store)?;
        self.require_operator_or_safe(&host_zone, sender)?;
        validate_tx_hash(tx_hash)?;

        let mut record = unbonding_store::get(ctx.store, record_id)?
            .ok_or(FloeError::UnbondingRecordNotFound { id: record_id })?;
        if record.status != UnbondingStatus::UnbondingQueue {
            return Err(FloeError::UnbondingRecordInvalidState {
                id: record_id,
                reason: format!("expected unbonding_queue, found {}", record.status),
            });
        }
        if !record.undelegation_tx_hash.is_empty() {
            return Err(FloeError::UnbondingRecordInvalidState {
                id: record_id,
                reason: "undelegation tx hash already set".to_string(),
            });
        }
        if !record.unbonded_token_sweep_tx_hash.is_empty() {
            return Err(FloeError::UnbondingRecordInvalidState {
                id: record_id,
                reason: "sweep tx hash already set".to_string(),
            });
        }
        if record.native_amount == 0 || record.st_token_amount == 0 {
            return Err(FloeError::UnbondingRecordInvalidState {
                id: record_id,
                reason: "no tokens to unbond".to_string(),
            });
        }
        if native_amount != record.native_amount {
            return Err(FloeError::UnbondingRecordInvalidState {
                id: record_id,
                reason: format!(
                    "reported amount {native_amount} does not match record amount {}",
                    record.native_amount
                ),
            });
        }

        self.check_redemption_rate_bounds(ctx.store)?;

        record.undelegation_tx_hash = tx_hash.to_string();
        record.status = UnbondingStatus::UnbondingInProgress;
        record.unbonding_completion_time_seconds =
            ctx.block_time + host_zone.unbonding_period_seconds;
        unbonding_store::set(ctx.store, &record)?;

        let delta = i128::try_from(record.native_amount).map_err(|_| FloeError::AmountOverflow)?;
        self.delegation_changed(ctx, &mut host_zone, -delta)?;
        host_zone_store::set(ctx.store, &host_zone)?;

        // the batch's escrowed staked tokens leave supply here
        self.burn_redeemed_st_tokens(ctx, &host_zone.redemption_address, &host_zone.st_denom(), record.st_token_amount)?;

        info!(record_id, amount = %record.native_amount, tx_hash, "undelegation confirmed");
        ctx.emit(events::confirm_undelegation(
            record_id,
            record.native_amount,
            tx_hash,
            sender,
        ));
        Ok(())
    }

    /// Burns staked tokens out of the redemption escrow by routing them
    /// through the module account.
    fn burn_redeemed_st_tokens(
        &self,
        ctx: &Context<'_>,
        redemption_address: &Address,
        st_denom: &str,
        amount: Amount,
    ) -> FloeResult<()> {
        let coins = [Coin::new(st_denom.to_string(), amount)];
        self.bank
            .send_to_module(ctx.store, redemption_address, MODULE_NAME, &coins)?;
        self.bank.burn_from_module(ctx.store, MODULE_NAME, &coins)?;
        Ok(())
    }

    /// Flips records whose unbonding period has elapsed to `Unbonded`.
    /// Runs on every hour epoch.
    pub fn mark_finished_unbondings(&self, ctx: &mut Context<'_>) -> FloeResult<()> {
        for mut record in
            unbonding_store::all_by_status(ctx.store, UnbondingStatus::UnbondingInProgress)?
        {
            if ctx.block_time >= record.unbonding_completion_time_seconds {
                record.status = UnbondingStatus::Unbonded;
                unbonding_store::set(ctx.store, &record)?;
                info!(record_id = record.id, "unbonding period elapsed");
            }
        }
        Ok(())
    }

    /// Records the operator's confirmation that the unbonded tokens were
    /// swept back to the claim account.
    ///
    /// The claim balance must cover every unbonded batch, not just this one;
    /// a sweep confirmation with insufficient backing is refused.
    /// Deliberately allowed on a halted zone.
    pub fn confirm_unbonded_token_sweep(
        &self,
        ctx: &mut Context<'_>,
        sender: &Address,
        record_id: u64,
        tx_hash: &str,
    ) -> FloeResult<()> {
        let host_zone = self.host_zone(ctx.store)?;
        self.require_operator_or_safe(&host_zone, sender)?;
        validate_tx_hash(tx_hash)?;

        let mut record = unbonding_store::get(ctx.store, record_id)?
            .ok_or(FloeError::UnbondingRecordNotFound { id: record_id })?;
        if record.status != UnbondingStatus::Unbonded {
            return Err(FloeError::UnbondingRecordInvalidState {
                id: record_id,
                reason: format!("expected unbonded, found {}", record.status),
            });
        }
        if !record.unbonded_token_sweep_tx_hash.is_empty() {
            return Err(FloeError::UnbondingRecordInvalidState {
                id: record_id,
                reason: "sweep tx hash already set".to_string(),
            });
        }
        if record.native_amount == 0 || record.st_token_amount == 0 {
            return Err(FloeError::UnbondingRecordInvalidState {
                id: record_id,
                reason: "non-positive amount to sweep".to_string(),
            });
        }

        let mut required: Amount = 0;
        for unbonded in unbonding_store::all_by_status(ctx.store, UnbondingStatus::Unbonded)? {
            required = required
                .checked_add(unbonded.native_amount)
                .ok_or(FloeError::AmountOverflow)?;
        }
        let available = self.bank.balance(
            ctx.store,
            &host_zone.claim_address,
            &host_zone.native_token_ibc_denom,
        );
        if available < required {
            return Err(FloeError::InsufficientFunds {
                address: host_zone.claim_address.to_string(),
                denom: host_zone.native_token_ibc_denom.clone(),
                needed: required,
                available,
            });
        }

        record.status = UnbondingStatus::Claimable;
        record.unbonded_token_sweep_tx_hash = tx_hash.to_string();
        unbonding_store::set(ctx.store, &record)?;

        info!(record_id, amount = %record.native_amount, tx_hash, "unbonded token sweep confirmed");
        ctx.emit(events::confirm_unbonded_token_sweep(
            record_id,
            record.native_amount,
            tx_hash,
            sender,
        ));
        Ok(())
    }

    /// Pays every claimable batch out to its redeemers, all or nothing.
    ///
    /// The whole pass runs in a nested overlay: one failing send (blocked
    /// address, short claim balance) reverts every payout and leaves the
    /// records claimable for the next hourly tick.
    pub fn distribute_claims(&self, ctx: &mut Context<'_>) -> FloeResult<()> {
        let sandbox = CacheStore::wrap(ctx.store);
        let mut inner = Context::new(&sandbox, ctx.block_time, ctx.block_height);

        match self.distribute_claims_inner(&mut inner) {
            Ok(()) => {
                let events = std::mem::take(&mut inner.events);
                drop(inner);
                sandbox.commit();
                ctx.events.extend(events);
                Ok(())
            }
            Err(err) => {
                warn!(%err, "claim distribution reverted");
                Err(err)
            }
        }
    }

    fn distribute_claims_inner(&self, ctx: &mut Context<'_>) -> FloeResult<()> {
        let host_zone = self.unhalted_host_zone(ctx.store)?;
        let denom = host_zone.native_token_ibc_denom.clone();
        let cap = self.params.max_claims_per_distribution;

        let mut paid = 0usize;
        for mut record in unbonding_store::all_by_status(ctx.store, UnbondingStatus::Claimable)? {
            let claims = redemption_store::by_unbonding_id(ctx.store, record.id)?;

            // batches settle whole; stop before one that would blow the cap
            if paid > 0 && paid + claims.len() > cap {
                info!(
                    record_id = record.id,
                    paid, "claim cap reached, deferring remaining batches"
                );
                break;
            }

            for claim in &claims {
                if self.bank.is_blocked(&claim.redeemer) {
                    return Err(
                        CollaboratorError::BlockedAddress(claim.redeemer.to_string()).into(),
                    );
                }
                self.bank.send(
                    ctx.store,
                    &host_zone.claim_address,
                    &claim.redeemer,
                    &[Coin::new(denom.clone(), claim.native_amount)],
                )?;
                redemption_store::remove(ctx.store, record.id, &claim.redeemer);
            }
            paid += claims.len();

            record.status = UnbondingStatus::Archived;
            unbonding_store::archive(ctx.store, &record)?;
            info!(record_id = record.id, claims = claims.len(), "claims distributed");
        }
        Ok(())
    }
}
