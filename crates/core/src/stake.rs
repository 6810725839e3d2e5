//! Liquid stake and redeem stake: the user-facing engine.

use tracing::info;

use floe_db::{redemption as redemption_store, unbonding as unbonding_store};
use floe_primitives::{
    constants::MODULE_NAME,
    denom::is_ibc_denom,
    events::{self, EventSink},
    records::RedemptionRecord,
    Address, Amount, Coin,
};

use crate::{
    context::Context,
    errors::{FloeError, FloeResult},
    keeper::Keeper,
};

impl Keeper {
    /// Liquid-stakes native tokens and mints staked tokens to the staker.
    ///
    /// The staker's native tokens (held as an IBC voucher locally) are
    /// escrowed in the deposit account until the next delegation epoch;
    /// staked tokens mint at the current redemption rate.
    pub fn liquid_stake(
        &self,
        ctx: &mut Context<'_>,
        staker: &Address,
        native_amount: Amount,
    ) -> FloeResult<Coin> {
        let host_zone = self.unhalted_host_zone(ctx.store)?;
        staker.validate(&self.params.account_prefix)?;
        self.check_redemption_rate_bounds(ctx.store)?;

        if !is_ibc_denom(&host_zone.native_token_ibc_denom) {
            return Err(FloeError::InvariantBroken(format!(
                "host zone denom {} is not an IBC voucher",
                host_zone.native_token_ibc_denom
            )));
        }

        let st_amount = host_zone
            .redemption_rate
            .div_trunc(native_amount)
            .ok_or(FloeError::AmountOverflow)?;
        if st_amount == 0 {
            return Err(FloeError::InsufficientLiquidStake {
                amount: native_amount,
            });
        }

        // escrow the native tokens, then mint and hand over the staked tokens
        let native_token = Coin::new(host_zone.native_token_ibc_denom.clone(), native_amount);
        self.bank.send(
            ctx.store,
            staker,
            &host_zone.deposit_address,
            &[native_token],
        )?;

        let st_token = Coin::new(host_zone.st_denom(), st_amount);
        self.bank
            .mint_to_module(ctx.store, MODULE_NAME, std::slice::from_ref(&st_token))?;
        self.bank.send_from_module(
            ctx.store,
            MODULE_NAME,
            staker,
            std::slice::from_ref(&st_token),
        )?;

        info!(%staker, %native_amount, %st_amount, "liquid stake");
        ctx.emit(events::liquid_stake(
            staker,
            &host_zone.chain_id,
            &host_zone.native_token_ibc_denom,
            native_amount,
            &st_token.denom,
            st_amount,
        ));

        Ok(st_token)
    }

    /// Escrows staked tokens and queues a redemption on the accumulating
    /// unbonding record.
    ///
    /// No burn happens here: the escrowed staked tokens burn when the
    /// operator confirms the batch undelegation.
    pub fn redeem_stake(
        &self,
        ctx: &mut Context<'_>,
        redeemer: &Address,
        st_token_amount: Amount,
    ) -> FloeResult<Coin> {
        let host_zone = self.unhalted_host_zone(ctx.store)?;
        redeemer.validate(&self.params.account_prefix)?;
        self.check_redemption_rate_bounds(ctx.store)?;

        if st_token_amount < self.params.min_redemption_amount {
            return Err(FloeError::RedemptionBelowMinimum {
                amount: st_token_amount,
                minimum: self.params.min_redemption_amount,
            });
        }

        let mut unbonding_record = unbonding_store::accumulating(ctx.store)?.ok_or_else(|| {
            FloeError::InvariantBroken("no accumulating unbonding record".to_string())
        })?;

        let st_denom = host_zone.st_denom();
        let balance = self.bank.balance(ctx.store, redeemer, &st_denom);
        if balance < st_token_amount {
            return Err(FloeError::InsufficientFunds {
                address: redeemer.to_string(),
                denom: st_denom.clone(),
                needed: st_token_amount,
                available: balance,
            });
        }

        let native_amount = host_zone
            .redemption_rate
            .mul_trunc(st_token_amount)
            .ok_or(FloeError::AmountOverflow)?;

        // escrow the staked tokens before any record is written
        self.bank.send(
            ctx.store,
            redeemer,
            &host_zone.redemption_address,
            &[Coin::new(st_denom, st_token_amount)],
        )?;

        unbonding_record.st_token_amount = unbonding_record
            .st_token_amount
            .checked_add(st_token_amount)
            .ok_or(FloeError::AmountOverflow)?;
        unbonding_record.native_amount = unbonding_record
            .native_amount
            .checked_add(native_amount)
            .ok_or(FloeError::AmountOverflow)?;

        // one redemption record per (batch, redeemer); repeat redemptions in
        // the same window accumulate onto it
        let redemption_record =
            match redemption_store::get(ctx.store, unbonding_record.id, redeemer)? {
                Some(mut existing) => {
                    existing.st_token_amount = existing
                        .st_token_amount
                        .checked_add(st_token_amount)
                        .ok_or(FloeError::AmountOverflow)?;
                    existing.native_amount = existing
                        .native_amount
                        .checked_add(native_amount)
                        .ok_or(FloeError::AmountOverflow)?;
                    existing
                }
                None => RedemptionRecord {
                    unbonding_record_id: unbonding_record.id,
                    redeemer: redeemer.clone(),
                    native_amount,
                    st_token_amount,
                },
            };

        unbonding_store::set(ctx.store, &unbonding_record)?;
        redemption_store::set(ctx.store, &redemption_record)?;

        info!(
            %redeemer,
            %st_token_amount,
            %native_amount,
            unbonding_record_id = unbonding_record.id,
            "redeem stake"
        );
        ctx.emit(events::redeem_stake(
            redeemer,
            &host_zone.chain_id,
            unbonding_record.id,
            native_amount,
            st_token_amount,
        ));

        Ok(Coin::new(
            host_zone.native_token_denom.clone(),
            native_amount,
        ))
    }
}
