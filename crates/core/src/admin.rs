//! Operator control: role checks, balance adjustments, record overwrites.
//!
//! Two privileged roles live on the host zone. The operator confirms remote
//! transactions; the safe additionally owns every recovery power, including
//! the overwrite facility that bypasses all state-machine guards. Overwrites
//! are the single recovery knob for a desynchronised remote/local view, so
//! they log loudly and emit an event.

use tracing::{info, warn};

use floe_db::{
    delegation as delegation_store, host_zone as host_zone_store,
    redemption as redemption_store, slash as slash_store, unbonding as unbonding_store,
};
use floe_primitives::{
    events::{self, EventSink},
    host_zone::HostZone,
    records::{DelegationRecord, RedemptionRecord, SlashRecord, UnbondingRecord},
    Address, SignedAmount,
};

use crate::{
    context::Context,
    errors::{FloeError, FloeResult},
    keeper::Keeper,
};

impl Keeper {
    /// Errors unless the sender is the operator or the safe address.
    pub(crate) fn require_operator_or_safe(
        &self,
        host_zone: &HostZone,
        sender: &Address,
    ) -> FloeResult<()> {
        if sender == &host_zone.operator_address || sender == &host_zone.safe_address {
            return Ok(());
        }
        Err(FloeError::InvalidAdmin {
            signer: sender.to_string(),
            role: "operator or safe",
        })
    }

    /// Errors unless the sender is the safe address.
    pub(crate) fn require_safe(&self, host_zone: &HostZone, sender: &Address) -> FloeResult<()> {
        if sender == &host_zone.safe_address {
            return Ok(());
        }
        Err(FloeError::InvalidAdmin {
            signer: sender.to_string(),
            role: "safe",
        })
    }

    /// Safe-admin adjustment of the delegated balance, used to account for
    /// remote slashing. The signed offset is applied to the remaining
    /// delegated balance (and its mirror) and appended to the slash-record
    /// audit trail regardless of sign.
    pub fn adjust_delegated_balance(
        &self,
        ctx: &mut Context<'_>,
        sender: &Address,
        validator_address: &str,
        delegation_offset: SignedAmount,
    ) -> FloeResult<()> {
        let mut host_zone = self.host_zone(ctx.store)?;
        self.require_safe(&host_zone, sender)?;

        self.delegation_changed(ctx, &mut host_zone, delegation_offset)?;
        host_zone_store::set(ctx.store, &host_zone)?;

        let slash_record = SlashRecord {
            id: slash_store::next_id(ctx.store),
            time: ctx.block_time,
            validator_address: validator_address.to_string(),
            native_amount: delegation_offset,
        };
        slash_store::set(ctx.store, &slash_record)?;

        warn!(
            slash_record_id = slash_record.id,
            validator = validator_address,
            offset = delegation_offset,
            "delegated balance adjusted"
        );
        ctx.emit(events::delegated_balance_adjusted(
            slash_record.id,
            validator_address,
            delegation_offset,
        ));
        Ok(())
    }

    /// Safe-admin rotation of the operator address.
    pub fn set_operator_address(
        &self,
        ctx: &mut Context<'_>,
        sender: &Address,
        new_operator: &Address,
    ) -> FloeResult<()> {
        let mut host_zone = self.host_zone(ctx.store)?;
        self.require_safe(&host_zone, sender)?;
        new_operator.validate(&self.params.account_prefix)?;

        info!(
            old = %host_zone.operator_address,
            new = %new_operator,
            "operator address rotated"
        );
        host_zone.operator_address = new_operator.clone();
        host_zone_store::set(ctx.store, &host_zone)?;
        Ok(())
    }

    /// Safe-admin unconditional replacement of a delegation record.
    pub fn overwrite_delegation_record(
        &self,
        ctx: &mut Context<'_>,
        sender: &Address,
        record: &DelegationRecord,
    ) -> FloeResult<()> {
        let host_zone = self.host_zone(ctx.store)?;
        self.require_safe(&host_zone, sender)?;

        delegation_store::set(ctx.store, record)?;
        warn!(record_id = record.id, %sender, "delegation record overwritten");
        ctx.emit(events::record_overwritten("delegation", record.id, sender));
        Ok(())
    }

    /// Safe-admin unconditional replacement of an unbonding record.
    pub fn overwrite_unbonding_record(
        &self,
        ctx: &mut Context<'_>,
        sender: &Address,
        record: &UnbondingRecord,
    ) -> FloeResult<()> {
        let host_zone = self.host_zone(ctx.store)?;
        self.require_safe(&host_zone, sender)?;

        unbonding_store::set(ctx.store, record)?;
        warn!(record_id = record.id, %sender, "unbonding record overwritten");
        ctx.emit(events::record_overwritten("unbonding", record.id, sender));
        Ok(())
    }

    /// Safe-admin unconditional replacement of a redemption record.
    pub fn overwrite_redemption_record(
        &self,
        ctx: &mut Context<'_>,
        sender: &Address,
        record: &RedemptionRecord,
    ) -> FloeResult<()> {
        let host_zone = self.host_zone(ctx.store)?;
        self.require_safe(&host_zone, sender)?;

        redemption_store::set(ctx.store, record)?;
        warn!(
            unbonding_record_id = record.unbonding_record_id,
            redeemer = %record.redeemer,
            %sender,
            "redemption record overwritten"
        );
        ctx.emit(events::record_overwritten(
            "redemption",
            record.unbonding_record_id,
            sender,
        ));
        Ok(())
    }
}
