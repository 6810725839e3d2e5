//! Epoch hooks: the clockwork that advances the lifecycles.

use tracing::error;

use floe_db::CacheStore;
use floe_params::{EPOCH_DAY, EPOCH_HOUR};
use floe_ratelimit::gov::reset_expired_rate_limits;

use crate::{
    context::Context,
    errors::FloeResult,
    keeper::{BankSupply, Keeper},
};

/// One epoch boundary as reported by the epochs module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpochInfo {
    /// The epoch identifier, `day` or `hour`.
    pub identifier: String,

    /// The epoch number, monotonically increasing per identifier.
    pub number: u64,
}

impl Keeper {
    /// Runs the epoch boundary work.
    ///
    /// Every sub-step executes in its own overlay and logs-and-continues on
    /// failure, so one bad record cannot stall the whole epoch. Claim
    /// distribution additionally keeps its own all-or-nothing discipline.
    pub fn before_epoch_start(&self, ctx: &mut Context<'_>, epoch: &EpochInfo) {
        match epoch.identifier.as_str() {
            EPOCH_DAY => {
                self.sandboxed(ctx, "prepare_delegation", |keeper, sub| {
                    keeper.prepare_delegation(sub, epoch.number)
                });
                if self.params.is_undelegation_epoch(epoch.number) {
                    self.sandboxed(ctx, "prepare_undelegation", |keeper, sub| {
                        keeper.prepare_undelegation(sub, epoch.number)
                    });
                }
                self.sandboxed(ctx, "update_redemption_rate", |keeper, sub| {
                    keeper.update_redemption_rate(sub)
                });
            }
            EPOCH_HOUR => {
                self.sandboxed(ctx, "mark_finished_unbondings", |keeper, sub| {
                    keeper.mark_finished_unbondings(sub)
                });
                self.sandboxed(ctx, "distribute_claims", |keeper, sub| {
                    keeper.distribute_claims(sub)
                });
                self.sandboxed(ctx, "reset_rate_limits", |keeper, sub| {
                    let resets = reset_expired_rate_limits(
                        sub.store,
                        &BankSupply(keeper.bank.as_ref()),
                        epoch.number,
                    )?;
                    if resets > 0 {
                        tracing::info!(resets, hour_epoch = epoch.number, "rate limit windows reset");
                    }
                    Ok(())
                });
            }
            _ => {}
        }
    }

    /// Runs one hook step in its own overlay, committing on success and
    /// logging on failure.
    fn sandboxed<F>(&self, ctx: &mut Context<'_>, step: &'static str, run: F)
    where
        F: FnOnce(&Keeper, &mut Context<'_>) -> FloeResult<()>,
    {
        let sandbox = CacheStore::wrap(ctx.store);
        let mut sub = Context::new(&sandbox, ctx.block_time, ctx.block_height);
        match run(self, &mut sub) {
            Ok(()) => {
                let events = std::mem::take(&mut sub.events);
                drop(sub);
                sandbox.commit();
                ctx.events.extend(events);
            }
            Err(err) => {
                error!(step, %err, "epoch hook step failed");
            }
        }
    }
}
