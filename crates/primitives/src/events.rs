//! Structured events emitted by the module.
//!
//! Events are (kind, attribute list) pairs handed to the host framework's
//! event manager. The constructors here pin the attribute schema so handlers
//! and tests agree on it.

use serde::{Deserialize, Serialize};

use crate::{address::Address, dec::Dec, types::Amount};

/// A structured event: a kind tag plus ordered key/value attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// The event kind, e.g. `liquid_stake`.
    pub kind: String,

    /// Ordered attribute pairs.
    pub attributes: Vec<(String, String)>,
}

impl Event {
    /// Creates an event with no attributes yet.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attributes: Vec::new(),
        }
    }

    /// Appends an attribute.
    pub fn attr(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.push((key.into(), value.to_string()));
        self
    }

    /// Looks up an attribute value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Anything events can be emitted into; handler contexts implement this.
pub trait EventSink {
    /// Records an event.
    fn emit(&mut self, event: Event);
}

impl EventSink for Vec<Event> {
    fn emit(&mut self, event: Event) {
        self.push(event);
    }
}

/// A successful liquid stake.
pub fn liquid_stake(
    staker: &Address,
    chain_id: &str,
    native_ibc_denom: &str,
    native_amount: Amount,
    st_denom: &str,
    st_amount: Amount,
) -> Event {
    Event::new("liquid_stake")
        .attr("liquid_staker", staker)
        .attr("host_zone", chain_id)
        .attr("native_ibc_denom", native_ibc_denom)
        .attr("native_amount", native_amount)
        .attr("sttoken_denom", st_denom)
        .attr("sttoken_amount", st_amount)
}

/// A successful redemption enqueue.
pub fn redeem_stake(
    redeemer: &Address,
    chain_id: &str,
    unbonding_record_id: u64,
    native_amount: Amount,
    st_amount: Amount,
) -> Event {
    Event::new("redeem_stake")
        .attr("redeemer", redeemer)
        .attr("host_zone", chain_id)
        .attr("unbonding_record_id", unbonding_record_id)
        .attr("native_amount", native_amount)
        .attr("sttoken_amount", st_amount)
}

/// An operator confirmation of a remote delegation.
pub fn confirm_delegation(record_id: u64, amount: Amount, tx_hash: &str, sender: &Address) -> Event {
    Event::new("confirm_delegation")
        .attr("record_id", record_id)
        .attr("amount", amount)
        .attr("tx_hash", tx_hash)
        .attr("sender", sender)
}

/// An operator confirmation of a remote undelegation.
pub fn confirm_undelegation(
    record_id: u64,
    amount: Amount,
    tx_hash: &str,
    sender: &Address,
) -> Event {
    Event::new("confirm_undelegation")
        .attr("record_id", record_id)
        .attr("amount", amount)
        .attr("tx_hash", tx_hash)
        .attr("sender", sender)
}

/// An operator confirmation of the unbonded-token sweep.
pub fn confirm_unbonded_token_sweep(
    record_id: u64,
    amount: Amount,
    tx_hash: &str,
    sender: &Address,
) -> Event {
    Event::new("confirm_unbonded_token_sweep")
        .attr("record_id", record_id)
        .attr("amount", amount)
        .attr("tx_hash", tx_hash)
        .attr("sender", sender)
}

/// The safety monitor halted the zone.
pub fn host_zone_halt(chain_id: &str, redemption_rate: Dec) -> Event {
    Event::new("host_zone_halt")
        .attr("host_zone", chain_id)
        .attr("redemption_rate", redemption_rate)
}

/// The safe admin resumed a halted zone.
pub fn host_zone_resumed(chain_id: &str, redemption_rate: Dec) -> Event {
    Event::new("host_zone_resumed")
        .attr("host_zone", chain_id)
        .attr("redemption_rate", redemption_rate)
}

/// The safe admin overwrote a record, bypassing state-machine guards.
pub fn record_overwritten(kind: &str, id: u64, sender: &Address) -> Event {
    Event::new("record_overwritten")
        .attr("record_kind", kind)
        .attr("record_id", id)
        .attr("sender", sender)
}

/// The safe admin adjusted the delegated balance (slash accounting).
pub fn delegated_balance_adjusted(
    slash_record_id: u64,
    validator_address: &str,
    offset: i128,
) -> Event {
    Event::new("delegated_balance_adjusted")
        .attr("slash_record_id", slash_record_id)
        .attr("validator_address", validator_address)
        .attr("delegation_offset", offset)
}

/// A transfer denied by the rate-limit middleware.
pub fn transfer_denied(
    reason: &str,
    direction: &str,
    denom: &str,
    channel_id: &str,
    amount: Amount,
    error: &str,
) -> Event {
    Event::new("transfer_denied")
        .attr("reason", reason)
        .attr("action", direction)
        .attr("denom", denom)
        .attr("channel", channel_id)
        .attr("amount", amount)
        .attr("error", error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_are_ordered_and_queryable() {
        let staker = Address::new("floe1staker");
        let event = liquid_stake(&staker, "celestia-1", "ibc/ABCD", 1_000_000, "stutia", 999_000);
        assert_eq!(event.kind, "liquid_stake");
        assert_eq!(event.get("native_amount"), Some("1000000"));
        assert_eq!(event.get("sttoken_amount"), Some("999000"));
        assert_eq!(event.get("missing"), None);
    }
}
