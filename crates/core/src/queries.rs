//! Read-only query surface.

use floe_db::{
    delegation as delegation_store, redemption as redemption_store, slash as slash_store,
    unbonding as unbonding_store, Store,
};
use floe_primitives::{
    host_zone::HostZone,
    records::{DelegationRecord, RedemptionRecord, SlashRecord, UnbondingRecord},
    Address,
};
use floe_ratelimit::{query as ratelimit_query, RateLimit, WhitelistedAddressPair};

use crate::{errors::FloeResult, keeper::Keeper};

/// Offset/limit pagination for record queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Records to skip.
    pub offset: usize,

    /// Maximum records to return.
    pub limit: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 100,
        }
    }
}

impl Pagination {
    fn apply<T>(&self, records: Vec<T>) -> Vec<T> {
        records
            .into_iter()
            .skip(self.offset)
            .take(self.limit)
            .collect()
    }
}

impl Keeper {
    /// The host zone.
    pub fn query_host_zone(&self, store: &dyn Store) -> FloeResult<HostZone> {
        self.host_zone(store)
    }

    /// Delegation records, optionally including the archive.
    pub fn query_delegation_records(
        &self,
        store: &dyn Store,
        include_archived: bool,
    ) -> FloeResult<Vec<DelegationRecord>> {
        let mut records = delegation_store::all_active(store)?;
        if include_archived {
            records.extend(delegation_store::all_archived(store)?);
        }
        Ok(records)
    }

    /// Unbonding records, optionally including the archive.
    pub fn query_unbonding_records(
        &self,
        store: &dyn Store,
        include_archived: bool,
    ) -> FloeResult<Vec<UnbondingRecord>> {
        let mut records = unbonding_store::all_active(store)?;
        if include_archived {
            records.extend(unbonding_store::all_archived(store)?);
        }
        Ok(records)
    }

    /// The redemption record for one (unbonding record, redeemer) pair.
    pub fn query_redemption_record(
        &self,
        store: &dyn Store,
        unbonding_record_id: u64,
        redeemer: &Address,
    ) -> FloeResult<Option<RedemptionRecord>> {
        Ok(redemption_store::get(store, unbonding_record_id, redeemer)?)
    }

    /// Redemption records filtered by redeemer and/or unbonding record,
    /// paginated.
    pub fn query_redemption_records(
        &self,
        store: &dyn Store,
        redeemer: Option<&Address>,
        unbonding_record_id: Option<u64>,
        pagination: Pagination,
    ) -> FloeResult<Vec<RedemptionRecord>> {
        let records = match unbonding_record_id {
            Some(id) => redemption_store::by_unbonding_id(store, id)?,
            None => redemption_store::all(store)?,
        };
        let filtered = match redeemer {
            Some(address) => records
                .into_iter()
                .filter(|r| &r.redeemer == address)
                .collect(),
            None => records,
        };
        Ok(pagination.apply(filtered))
    }

    /// All slash records.
    pub fn query_slash_records(&self, store: &dyn Store) -> FloeResult<Vec<SlashRecord>> {
        Ok(slash_store::all(store)?)
    }

    /// All rate limits.
    pub fn query_rate_limits(&self, store: &dyn Store) -> FloeResult<Vec<RateLimit>> {
        Ok(ratelimit_query::all_rate_limits(store)?)
    }

    /// The rate limit for one path.
    pub fn query_rate_limit(
        &self,
        store: &dyn Store,
        denom: &str,
        channel_id: &str,
    ) -> FloeResult<Option<RateLimit>> {
        Ok(ratelimit_query::rate_limit(store, denom, channel_id)?)
    }

    /// All rate limits whose channel connects to the given chain.
    pub fn query_rate_limits_by_chain_id(
        &self,
        store: &dyn Store,
        chain_id: &str,
    ) -> FloeResult<Vec<RateLimit>> {
        Ok(ratelimit_query::rate_limits_by_chain_id(
            store,
            self.channels.as_ref(),
            chain_id,
        )?)
    }

    /// All blacklisted denoms.
    pub fn query_all_blacklisted_denoms(&self, store: &dyn Store) -> Vec<String> {
        ratelimit_query::all_blacklisted_denoms(store)
    }

    /// All whitelisted address pairs.
    pub fn query_all_whitelisted_addresses(
        &self,
        store: &dyn Store,
    ) -> FloeResult<Vec<WhitelistedAddressPair>> {
        Ok(ratelimit_query::all_whitelisted_addresses(store)?)
    }

    /// All pending send packets, rendered `channel/sequence`.
    pub fn query_all_pending_send_packets(&self, store: &dyn Store) -> Vec<String> {
        ratelimit_query::all_pending_send_packets(store)
    }
}
