//! Redemption record store.
//!
//! Keys are `unbondingId || redeemer`, so all claims bound to one unbonding
//! record sit under a common prefix; lookups by redeemer scan the whole
//! space and filter.

use floe_primitives::{records::RedemptionRecord, Address};

use crate::{
    codec,
    errors::DbResult,
    keys::{redemption_key, redemption_unbonding_prefix, REDEMPTION_PREFIX},
    kv::Store,
};

/// Writes a record, replacing any existing one for the same key.
pub fn set(store: &dyn Store, record: &RedemptionRecord) -> DbResult<()> {
    store.set(
        &redemption_key(record.unbonding_record_id, &record.redeemer),
        &codec::encode(record)?,
    );
    Ok(())
}

/// Reads the record for one (unbonding record, redeemer) pair.
pub fn get(
    store: &dyn Store,
    unbonding_id: u64,
    redeemer: &Address,
) -> DbResult<Option<RedemptionRecord>> {
    store
        .get(&redemption_key(unbonding_id, redeemer))
        .map(|bytes| codec::decode(&bytes))
        .transpose()
}

/// Deletes the record for one (unbonding record, redeemer) pair.
pub fn remove(store: &dyn Store, unbonding_id: u64, redeemer: &Address) {
    store.delete(&redemption_key(unbonding_id, redeemer));
}

/// All records bound to one unbonding record.
pub fn by_unbonding_id(store: &dyn Store, unbonding_id: u64) -> DbResult<Vec<RedemptionRecord>> {
    store
        .scan_prefix(&redemption_unbonding_prefix(unbonding_id))
        .into_iter()
        .map(|(_, bytes)| codec::decode(&bytes))
        .collect()
}

/// All records owned by one redeemer, across unbonding records.
pub fn by_redeemer(store: &dyn Store, redeemer: &Address) -> DbResult<Vec<RedemptionRecord>> {
    Ok(all(store)?
        .into_iter()
        .filter(|r| &r.redeemer == redeemer)
        .collect())
}

/// All redemption records.
pub fn all(store: &dyn Store) -> DbResult<Vec<RedemptionRecord>> {
    store
        .scan_prefix(REDEMPTION_PREFIX)
        .into_iter()
        .map(|(_, bytes)| codec::decode(&bytes))
        .collect()
}
