//! The redemption-rate safety monitor.
//!
//! The redemption rate is recomputed at every block boundary and checked
//! against two nested safety bands. Crossing either band halts the zone and
//! blacklists the staked-token denom on the rate limiter, so the receipt
//! token cannot move over the wrapped channel while accounting is suspect.

use tracing::{error, info, warn};

use floe_db::{delegation as delegation_store, host_zone as host_zone_store, Store};
use floe_primitives::{
    events::{self, EventSink},
    Address, Amount, Dec,
};
use floe_ratelimit::store::{add_denom_to_blacklist, remove_denom_from_blacklist};

use crate::{
    context::Context,
    errors::{FloeError, FloeResult},
    keeper::Keeper,
};

impl Keeper {
    /// Block hook: recompute the rate, halt on a bounds violation.
    ///
    /// Never aborts the block; failures are logged and the chain moves on.
    pub fn begin_block(&self, ctx: &mut Context<'_>) {
        if !host_zone_store::exists(ctx.store) {
            return;
        }
        if let Err(err) = self.track_redemption_rate(ctx) {
            error!(%err, "redemption rate tracking failed");
        }
    }

    fn track_redemption_rate(&self, ctx: &mut Context<'_>) -> FloeResult<()> {
        self.update_redemption_rate(ctx)?;

        let host_zone = self.host_zone(ctx.store)?;
        if host_zone.halted {
            return Ok(());
        }
        if let Err(err) = self.check_redemption_rate_bounds(ctx.store) {
            warn!(%err, "halting host zone");
            self.halt_zone(ctx)?;
        }
        Ok(())
    }

    /// Recomputes the redemption rate from locked native value and staked
    /// supply.
    ///
    /// Native tokens locked = deposit balance (not yet batched) + active
    /// delegation records (batched, not yet confirmed) + the confirmed
    /// delegated balance. Redemptions do not move the rate: escrowed staked
    /// tokens remain in supply, and their native stays in the delegated
    /// balance, until both leave together at confirm-undelegation.
    ///
    /// A zero staked supply leaves the rate untouched.
    pub fn update_redemption_rate(&self, ctx: &mut Context<'_>) -> FloeResult<()> {
        let mut host_zone = self.host_zone(ctx.store)?;

        let st_supply = self.bank.supply(ctx.store, &host_zone.st_denom());
        if st_supply == 0 {
            info!("no staked tokens in circulation, redemption rate unchanged");
            return Ok(());
        }

        let deposit_balance = self.bank.balance(
            ctx.store,
            &host_zone.deposit_address,
            &host_zone.native_token_ibc_denom,
        );

        let mut undelegated_balance: Amount = 0;
        for record in delegation_store::all_active(ctx.store)? {
            undelegated_balance = undelegated_balance
                .checked_add(record.native_amount)
                .ok_or(FloeError::AmountOverflow)?;
        }

        let native_locked = deposit_balance
            .checked_add(undelegated_balance)
            .and_then(|sum| sum.checked_add(host_zone.remaining_delegated_balance))
            .ok_or(FloeError::AmountOverflow)?;
        if native_locked == 0 {
            return Err(FloeError::InvariantBroken(
                "nonzero staked supply with zero locked native balance".to_string(),
            ));
        }

        let rate =
            Dec::from_ratio(native_locked, st_supply).ok_or(FloeError::AmountOverflow)?;
        host_zone.last_redemption_rate = host_zone.redemption_rate;
        host_zone.redemption_rate = rate;
        host_zone_store::set(ctx.store, &host_zone)?;

        info!(
            rate = %host_zone.redemption_rate,
            previous = %host_zone.last_redemption_rate,
            %deposit_balance,
            %undelegated_balance,
            delegated_balance = %host_zone.remaining_delegated_balance,
            %st_supply,
            "redemption rate updated"
        );
        Ok(())
    }

    /// Errors if the current rate sits outside either safety band.
    pub fn check_redemption_rate_bounds(&self, store: &dyn Store) -> FloeResult<()> {
        let host_zone = self.host_zone(store)?;
        host_zone.validate_bounds()?;

        let rate = host_zone.redemption_rate;
        if host_zone.rate_outside_outer_bounds(rate) {
            return Err(FloeError::RedemptionRateOutsideBounds {
                rate,
                bound: "outer",
            });
        }
        if host_zone.rate_outside_inner_bounds(rate) {
            return Err(FloeError::RedemptionRateOutsideBounds {
                rate,
                bound: "inner",
            });
        }
        Ok(())
    }

    /// Halts the zone and blacklists the staked-token denom.
    pub fn halt_zone(&self, ctx: &mut Context<'_>) -> FloeResult<()> {
        let mut host_zone = self.host_zone(ctx.store)?;
        host_zone.halted = true;
        host_zone_store::set(ctx.store, &host_zone)?;

        add_denom_to_blacklist(ctx.store, &host_zone.st_denom());

        error!(
            chain_id = %host_zone.chain_id,
            rate = %host_zone.redemption_rate,
            "host zone halted"
        );
        ctx.emit(events::host_zone_halt(
            &host_zone.chain_id,
            host_zone.redemption_rate,
        ));
        Ok(())
    }

    /// Safe-admin resume of a halted zone.
    ///
    /// Only permitted once the rate is back inside the inner band; clears
    /// the halt flag and un-blacklists the staked-token denom.
    pub fn resume_host_zone(&self, ctx: &mut Context<'_>, sender: &Address) -> FloeResult<()> {
        let mut host_zone = self.host_zone(ctx.store)?;
        self.require_safe(&host_zone, sender)?;

        if !host_zone.halted {
            return Err(FloeError::HostZoneNotHalted);
        }

        let rate = host_zone.redemption_rate;
        if host_zone.rate_outside_inner_bounds(rate) {
            return Err(FloeError::RedemptionRateOutsideBounds {
                rate,
                bound: "inner",
            });
        }

        host_zone.halted = false;
        host_zone_store::set(ctx.store, &host_zone)?;
        remove_denom_from_blacklist(ctx.store, &host_zone.st_denom());

        warn!(chain_id = %host_zone.chain_id, %rate, "host zone resumed");
        ctx.emit(events::host_zone_resumed(&host_zone.chain_id, rate));
        Ok(())
    }

    /// Safe-admin update of the inner bounds.
    ///
    /// Refuses bounds that fall outside the outer band or that would place
    /// the current rate out of bounds.
    pub fn update_inner_redemption_rate_bounds(
        &self,
        ctx: &mut Context<'_>,
        sender: &Address,
        min_inner: Dec,
        max_inner: Dec,
    ) -> FloeResult<()> {
        let mut host_zone = self.host_zone(ctx.store)?;
        self.require_safe(&host_zone, sender)?;

        let mut updated = host_zone.clone();
        updated.min_inner_redemption_rate = min_inner;
        updated.max_inner_redemption_rate = max_inner;
        updated.validate_bounds()?;

        let rate = updated.redemption_rate;
        if updated.rate_outside_inner_bounds(rate) {
            return Err(FloeError::RedemptionRateOutsideBounds {
                rate,
                bound: "inner",
            });
        }

        host_zone.min_inner_redemption_rate = min_inner;
        host_zone.max_inner_redemption_rate = max_inner;
        host_zone_store::set(ctx.store, &host_zone)?;

        info!(%min_inner, %max_inner, "inner redemption rate bounds updated");
        Ok(())
    }
}
