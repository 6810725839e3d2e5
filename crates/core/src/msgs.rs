//! The message surface and its dispatch.
//!
//! Every message executes inside an overlay of the base store: the handler
//! either commits wholesale or leaves no trace. Stateless validation runs
//! before dispatch, the way the original message checkers do.

use serde::{Deserialize, Serialize};

use floe_db::{CacheStore, Store};
use floe_primitives::{
    events::Event,
    records::{validate_tx_hash, DelegationRecord, RedemptionRecord, UnbondingRecord},
    Address, Amount, Dec, SignedAmount,
};
use floe_ratelimit::{
    gov::{
        add_rate_limit, remove_rate_limit_for_path, reset_rate_limit, update_rate_limit,
        RateLimitProposal,
    },
    store as ratelimit_store, WhitelistedAddressPair,
};

use crate::{
    context::Context,
    errors::{FloeError, FloeResult},
    keeper::{BankSupply, Keeper},
};

/// A signed transaction message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Msg {
    /// Deposit native tokens, mint staked tokens.
    LiquidStake {
        /// The staking account.
        staker: Address,
        /// Native amount in the host zone's IBC denom.
        native_amount: Amount,
    },

    /// Escrow staked tokens and queue a redemption.
    RedeemStake {
        /// The redeeming account.
        redeemer: Address,
        /// Staked-token amount to redeem.
        st_token_amount: Amount,
    },

    /// Operator confirmation of a remote delegation.
    ConfirmDelegation {
        /// The confirming admin.
        signer: Address,
        /// The delegation record.
        record_id: u64,
        /// Remote tx hash, forensic only.
        tx_hash: String,
    },

    /// Operator confirmation of a remote undelegation.
    ConfirmUndelegation {
        /// The confirming admin.
        signer: Address,
        /// The unbonding record.
        record_id: u64,
        /// The native amount undelegated remotely.
        native_amount: Amount,
        /// Remote tx hash, forensic only.
        tx_hash: String,
    },

    /// Operator confirmation of the unbonded-token sweep.
    ConfirmUnbondedTokenSweep {
        /// The confirming admin.
        signer: Address,
        /// The unbonding record.
        record_id: u64,
        /// Remote tx hash, forensic only.
        tx_hash: String,
    },

    /// Safe-admin delegated-balance adjustment (slash accounting).
    AdjustDelegatedBalance {
        /// The safe admin.
        signer: Address,
        /// The remote validator the adjustment is attributed to.
        validator_address: String,
        /// Signed native offset.
        delegation_offset: SignedAmount,
    },

    /// Safe-admin update of the inner safety band.
    UpdateInnerRedemptionRateBounds {
        /// The safe admin.
        signer: Address,
        /// New inner lower bound.
        min_inner_redemption_rate: Dec,
        /// New inner upper bound.
        max_inner_redemption_rate: Dec,
    },

    /// Safe-admin resume of a halted zone.
    ResumeHostZone {
        /// The safe admin.
        signer: Address,
    },

    /// Safe-admin rotation of the operator address.
    SetOperatorAddress {
        /// The safe admin.
        signer: Address,
        /// The new operator.
        new_operator: Address,
    },

    /// Safe-admin unconditional delegation-record replacement.
    OverwriteDelegationRecord {
        /// The safe admin.
        signer: Address,
        /// The replacement record.
        record: DelegationRecord,
    },

    /// Safe-admin unconditional unbonding-record replacement.
    OverwriteUnbondingRecord {
        /// The safe admin.
        signer: Address,
        /// The replacement record.
        record: UnbondingRecord,
    },

    /// Safe-admin unconditional redemption-record replacement.
    OverwriteRedemptionRecord {
        /// The safe admin.
        signer: Address,
        /// The replacement record.
        record: RedemptionRecord,
    },
}

/// A rate-limit governance action, delivered through the host chain's
/// proposal system after passing its own validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitMsg {
    /// Install a rate limit on a path.
    Add(RateLimitProposal),

    /// Replace the quota on a path and reset its flow.
    Update(RateLimitProposal),

    /// Remove the rate limit from a path.
    Remove {
        /// The accounting denom.
        denom: String,
        /// The local channel.
        channel_id: String,
    },

    /// Zero the flow on a path.
    Reset {
        /// The accounting denom.
        denom: String,
        /// The local channel.
        channel_id: String,
    },

    /// Let a (sender, receiver) pair bypass flow accounting.
    AddWhitelistedAddressPair {
        /// The packet sender.
        sender: String,
        /// The packet receiver.
        receiver: String,
    },

    /// Put a (sender, receiver) pair back under flow accounting.
    RemoveWhitelistedAddressPair {
        /// The packet sender.
        sender: String,
        /// The packet receiver.
        receiver: String,
    },
}

impl Msg {
    /// Stateless validation: address formats, amount positivity, tx-hash
    /// shape. Stateful checks live in the handlers.
    pub fn validate_basic(&self, account_prefix: &str) -> FloeResult<()> {
        match self {
            Msg::LiquidStake {
                staker,
                native_amount,
            } => {
                staker.validate(account_prefix)?;
                if *native_amount == 0 {
                    return Err(FloeError::InsufficientLiquidStake { amount: 0 });
                }
            }
            Msg::RedeemStake {
                redeemer,
                st_token_amount,
            } => {
                redeemer.validate(account_prefix)?;
                if *st_token_amount == 0 {
                    return Err(FloeError::RedemptionBelowMinimum {
                        amount: 0,
                        minimum: 1,
                    });
                }
            }
            Msg::ConfirmDelegation {
                signer, tx_hash, ..
            }
            | Msg::ConfirmUndelegation {
                signer, tx_hash, ..
            }
            | Msg::ConfirmUnbondedTokenSweep {
                signer, tx_hash, ..
            } => {
                signer.validate(account_prefix)?;
                validate_tx_hash(tx_hash)?;
            }
            Msg::AdjustDelegatedBalance {
                signer,
                validator_address,
                ..
            } => {
                signer.validate(account_prefix)?;
                if validator_address.is_empty() {
                    return Err(FloeError::InvariantBroken(
                        "validator address must be specified".to_string(),
                    ));
                }
            }
            Msg::UpdateInnerRedemptionRateBounds { signer, .. }
            | Msg::ResumeHostZone { signer }
            | Msg::OverwriteDelegationRecord { signer, .. }
            | Msg::OverwriteUnbondingRecord { signer, .. }
            | Msg::OverwriteRedemptionRecord { signer, .. } => {
                signer.validate(account_prefix)?;
            }
            Msg::SetOperatorAddress {
                signer,
                new_operator,
            } => {
                signer.validate(account_prefix)?;
                new_operator.validate(account_prefix)?;
            }
        }
        Ok(())
    }
}

impl Keeper {
    /// Executes one message atomically against the base store.
    ///
    /// On success the handler's writes commit and its events are returned;
    /// on error nothing survives.
    pub fn execute(
        &self,
        store: &dyn Store,
        block_time: u64,
        block_height: u64,
        msg: &Msg,
    ) -> FloeResult<Vec<Event>> {
        msg.validate_basic(&self.params.account_prefix)?;

        let sandbox = CacheStore::wrap(store);
        let mut ctx = Context::new(&sandbox, block_time, block_height);
        self.dispatch(&mut ctx, msg)?;

        let events = std::mem::take(&mut ctx.events);
        drop(ctx);
        sandbox.commit();
        Ok(events)
    }

    fn dispatch(&self, ctx: &mut Context<'_>, msg: &Msg) -> FloeResult<()> {
        match msg {
            Msg::LiquidStake {
                staker,
                native_amount,
            } => self.liquid_stake(ctx, staker, *native_amount).map(|_| ()),
            Msg::RedeemStake {
                redeemer,
                st_token_amount,
            } => self.redeem_stake(ctx, redeemer, *st_token_amount).map(|_| ()),
            Msg::ConfirmDelegation {
                signer,
                record_id,
                tx_hash,
            } => self.confirm_delegation(ctx, signer, *record_id, tx_hash),
            Msg::ConfirmUndelegation {
                signer,
                record_id,
                native_amount,
                tx_hash,
            } => self.confirm_undelegation(ctx, signer, *record_id, *native_amount, tx_hash),
            Msg::ConfirmUnbondedTokenSweep {
                signer,
                record_id,
                tx_hash,
            } => self.confirm_unbonded_token_sweep(ctx, signer, *record_id, tx_hash),
            Msg::AdjustDelegatedBalance {
                signer,
                validator_address,
                delegation_offset,
            } => self.adjust_delegated_balance(ctx, signer, validator_address, *delegation_offset),
            Msg::UpdateInnerRedemptionRateBounds {
                signer,
                min_inner_redemption_rate,
                max_inner_redemption_rate,
            } => self.update_inner_redemption_rate_bounds(
                ctx,
                signer,
                *min_inner_redemption_rate,
                *max_inner_redemption_rate,
            ),
            Msg::ResumeHostZone { signer } => self.resume_host_zone(ctx, signer),
            Msg::SetOperatorAddress {
                signer,
                new_operator,
            } => self.set_operator_address(ctx, signer, new_operator),
            Msg::OverwriteDelegationRecord { signer, record } => {
                self.overwrite_delegation_record(ctx, signer, record)
            }
            Msg::OverwriteUnbondingRecord { signer, record } => {
                self.overwrite_unbonding_record(ctx, signer, record)
            }
            Msg::OverwriteRedemptionRecord { signer, record } => {
                self.overwrite_redemption_record(ctx, signer, record)
            }
        }
    }

    /// Executes one pre-validated rate-limit governance action atomically.
    pub fn execute_rate_limit_msg(&self, store: &dyn Store, msg: &RateLimitMsg) -> FloeResult<()> {
        let sandbox = CacheStore::wrap(store);
        let supply = BankSupply(self.bank.as_ref());

        match msg {
            RateLimitMsg::Add(proposal) => {
                add_rate_limit(&sandbox, self.channels.as_ref(), &supply, proposal)?
            }
            RateLimitMsg::Update(proposal) => update_rate_limit(&sandbox, &supply, proposal)?,
            RateLimitMsg::Remove { denom, channel_id } => {
                remove_rate_limit_for_path(&sandbox, denom, channel_id)?
            }
            RateLimitMsg::Reset { denom, channel_id } => {
                reset_rate_limit(&sandbox, &supply, denom, channel_id)?
            }
            RateLimitMsg::AddWhitelistedAddressPair { sender, receiver } => {
                ratelimit_store::set_whitelisted_address_pair(
                    &sandbox,
                    &WhitelistedAddressPair {
                        sender: sender.clone(),
                        receiver: receiver.clone(),
                    },
                )?
            }
            RateLimitMsg::RemoveWhitelistedAddressPair { sender, receiver } => {
                ratelimit_store::remove_whitelisted_address_pair(&sandbox, sender, receiver)
            }
        }

        sandbox.commit();
        Ok(())
    }
}
