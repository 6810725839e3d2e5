//! The delegation lifecycle: batch deposits out, operator confirmation back.

use tracing::{info, warn};

use floe_db::{
    delegation as delegation_store, host_zone as host_zone_store, transfer as transfer_store,
};
use floe_primitives::{
    constants::TRANSFER_PORT,
    events::{self, EventSink},
    records::{validate_tx_hash, DelegationRecord, DelegationStatus},
    Address, Coin,
};

use crate::{
    collaborators::TransferMsg,
    context::Context,
    errors::{FloeError, FloeResult},
    keeper::Keeper,
};

impl Keeper {
    /// Batches the deposit-account balance into a new delegation record and
    /// dispatches the cross-chain transfer to the remote delegation account.
    ///
    /// Runs on every day epoch. At most one batch transfer may be in flight;
    /// a second prepare while one is unresolved is refused.
    pub fn prepare_delegation(&self, ctx: &mut Context<'_>, epoch_number: u64) -> FloeResult<()> {
        let host_zone = self.unhalted_host_zone(ctx.store)?;

        for record in delegation_store::all_active(ctx.store)? {
            if record.status == DelegationStatus::TransferInProgress {
                return Err(FloeError::TransferInProgress { id: record.id });
            }
        }

        let balance = self.bank.balance(
            ctx.store,
            &host_zone.deposit_address,
            &host_zone.native_token_ibc_denom,
        );
        if balance == 0 {
            info!(epoch_number, "no new liquid stakes this epoch");
            return Ok(());
        }

        let record = DelegationRecord::new(epoch_number, balance);
        delegation_store::safe_set(ctx.store, &record)?;

        let timeout_timestamp = ctx.block_time + self.params.transfer_timeout_seconds;
        let sequence = self.transfer.transfer(
            ctx.store,
            &TransferMsg {
                source_port: TRANSFER_PORT.to_string(),
                source_channel: host_zone.transfer_channel_id.clone(),
                token: Coin::new(host_zone.native_token_ibc_denom.clone(), balance),
                sender: host_zone.deposit_address.clone(),
                receiver: host_zone.delegation_address.clone(),
                timeout_timestamp,
            },
        )?;

        // remember which record this packet belongs to for the callback
        transfer_store::set(
            ctx.store,
            &host_zone.transfer_channel_id,
            sequence,
            record.id,
        );

        info!(
            record_id = record.id,
            %balance,
            channel = %host_zone.transfer_channel_id,
            sequence,
            "delegation batch transfer dispatched"
        );
        Ok(())
    }

    /// Acknowledgement callback for a delegation batch transfer.
    ///
    /// A successful ack queues the record for the operator; a failed ack
    /// strands it in `TransferFailed`, where the safe admin's overwrite
    /// facility is the recovery path.
    pub fn on_transfer_ack(
        &self,
        ctx: &mut Context<'_>,
        channel_id: &str,
        sequence: u64,
        success: bool,
    ) -> FloeResult<()> {
        let Some(record_id) = transfer_store::get(ctx.store, channel_id, sequence) else {
            // not a packet this module dispatched
            return Ok(());
        };
        transfer_store::remove(ctx.store, channel_id, sequence);

        let mut record = delegation_store::get(ctx.store, record_id)?
            .ok_or(FloeError::DelegationRecordNotFound { id: record_id })?;
        if record.status != DelegationStatus::TransferInProgress {
            return Err(FloeError::DelegationRecordInvalidState {
                id: record_id,
                reason: format!("expected transfer_in_progress, found {}", record.status),
            });
        }

        record.status = if success {
            DelegationStatus::DelegationQueue
        } else {
            DelegationStatus::TransferFailed
        };
        delegation_store::set(ctx.store, &record)?;

        if success {
            info!(record_id, "delegation batch transfer acknowledged");
        } else {
            warn!(record_id, "delegation batch transfer failed");
        }
        Ok(())
    }

    /// Timeout callback for a delegation batch transfer.
    pub fn on_transfer_timeout(
        &self,
        ctx: &mut Context<'_>,
        channel_id: &str,
        sequence: u64,
    ) -> FloeResult<()> {
        self.on_transfer_ack(ctx, channel_id, sequence, false)
    }

    /// Records the operator's confirmation that the batch was delegated on
    /// the remote chain.
    ///
    /// The tx hash is a forensic reference only; it is never verified. The
    /// record is archived and the delegated balance (and its mirror) grows
    /// by the batch amount. Deliberately allowed on a halted zone.
    pub fn confirm_delegation(
        &self,
        ctx: &mut Context<'_>,
        sender: &Address,
        record_id: u64,
        tx_hash: &str,
    ) -> FloeResult<()> {
        let mut host_zone = self.host_zone(ctx.store)?;
        self.require_operator_or_safe(&host_zone, sender)?;
        validate_tx_hash(tx_hash)?;

        let mut record = delegation_store::get(ctx.store, record_id)?
            .ok_or(FloeError::DelegationRecordNotFound { id: record_id })?;
        if record.status != DelegationStatus::DelegationQueue {
            return Err(FloeError::DelegationRecordInvalidState {
                id: record_id,
                reason: format!("expected delegation_queue, found {}", record.status),
            });
        }
        if !record.tx_hash.is_empty() {
            return Err(FloeError::DelegationRecordInvalidState {
                id: record_id,
                reason: "tx hash already set".to_string(),
            });
        }
        if record.native_amount == 0 {
            return Err(FloeError::DelegationRecordInvalidState {
                id: record_id,
                reason: "non-positive delegation amount".to_string(),
            });
        }

        record.tx_hash = tx_hash.to_string();
        record.status = DelegationStatus::DelegationComplete;
        delegation_store::set(ctx.store, &record)?;
        delegation_store::archive(ctx.store, record.id)?;

        let delta =
            i128::try_from(record.native_amount).map_err(|_| FloeError::AmountOverflow)?;
        self.delegation_changed(ctx, &mut host_zone, delta)?;
        host_zone_store::set(ctx.store, &host_zone)?;

        info!(record_id, amount = %record.native_amount, tx_hash, "delegation confirmed");
        ctx.emit(events::confirm_delegation(
            record_id,
            record.native_amount,
            tx_hash,
            sender,
        ));
        Ok(())
    }
}
