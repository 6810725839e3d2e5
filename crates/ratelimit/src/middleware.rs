//! The middleware hooks that wrap the transfer channel.
//!
//! Sends and receives are intercepted before reaching the transfer
//! application; acks and timeouts are observed afterwards so a send that
//! never completed can have its outflow rolled back. Every denial emits a
//! `transfer_denied` event alongside the error returned to the caller.

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use floe_db::Store;
use floe_primitives::{
    denom::{parse_denom_from_recv, parse_denom_from_send},
    events::{self, EventSink},
    Amount,
};

use crate::{
    errors::RateLimitError,
    store::{
        get_rate_limit, is_address_pair_whitelisted, is_denom_blacklisted, is_packet_pending,
        remove_pending_send_packet, set_pending_send_packet, set_rate_limit,
    },
    types::PacketDirection,
};

/// Reason attribute of a denial caused by the blacklist.
pub const DENIAL_BLACKLISTED: &str = "blacklisted_denom";

/// Reason attribute of a denial caused by an exhausted quota.
pub const DENIAL_QUOTA: &str = "rate_limit_exceeded";

/// The ICS-20 fungible token packet payload, as carried on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FungibleTokenPacketData {
    /// The token denom from the sender's perspective.
    pub denom: String,

    /// The transfer amount as a decimal string.
    pub amount: String,

    /// The sending address on the source chain.
    pub sender: String,

    /// The receiving address on the destination chain.
    pub receiver: String,

    /// Optional memo.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub memo: String,
}

/// A packet moving over the wrapped channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    /// Sequence number on the sending channel end.
    pub sequence: u64,

    /// Port on the sending chain.
    pub source_port: String,

    /// Channel on the sending chain.
    pub source_channel: String,

    /// Port on the receiving chain.
    pub destination_port: String,

    /// Channel on the receiving chain.
    pub destination_channel: String,

    /// JSON-encoded [`FungibleTokenPacketData`].
    pub data: Vec<u8>,
}

/// A transfer acknowledgement as the counterparty writes it.
///
/// ICS-20 acks are JSON, either `{"result": "<base64>"}` or
/// `{"error": "<reason>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Acknowledgement {
    /// The packet was executed on the counterparty.
    Result(String),

    /// The packet failed on the counterparty.
    Error(String),
}

/// Parses an acknowledgement and reports whether the transfer succeeded.
pub fn ack_succeeded(ack_bytes: &[u8]) -> Result<bool, RateLimitError> {
    match serde_json::from_slice::<Acknowledgement>(ack_bytes) {
        Ok(Acknowledgement::Result(_)) => Ok(true),
        Ok(Acknowledgement::Error(_)) => Ok(false),
        Err(e) => Err(RateLimitError::InvalidPacket(format!(
            "unparseable acknowledgement: {e}"
        ))),
    }
}

/// Everything the accountant needs to know about one packet.
#[derive(Debug, Clone)]
pub struct RateLimitedPacketInfo {
    /// The local channel end the limit is keyed by.
    pub channel_id: String,

    /// The accounting denom after source/sink resolution.
    pub denom: String,

    /// The transfer amount.
    pub amount: Amount,

    /// The packet sender.
    pub sender: String,

    /// The packet receiver.
    pub receiver: String,
}

/// Parses the ICS-20 payload out of a packet. A parse failure is fatal for
/// the packet.
pub fn parse_packet_data(packet: &Packet) -> Result<(FungibleTokenPacketData, Amount), RateLimitError> {
    let data: FungibleTokenPacketData = serde_json::from_slice(&packet.data)
        .map_err(|e| RateLimitError::InvalidPacket(e.to_string()))?;
    let amount: Amount = data
        .amount
        .parse()
        .map_err(|_| RateLimitError::InvalidPacket(format!("unparseable amount {}", data.amount)))?;
    Ok((data, amount))
}

/// Checks a packet against the blacklist, whitelist and quota, updating the
/// flow on success.
///
/// Returns whether the flow was updated: `false` means the packet passed
/// without being accounted (no limit on the path, or a whitelisted pair).
pub fn check_rate_limit_and_update_flow(
    store: &dyn Store,
    events: &mut dyn EventSink,
    direction: PacketDirection,
    info: &RateLimitedPacketInfo,
) -> Result<bool, RateLimitError> {
    if is_denom_blacklisted(store, &info.denom) {
        let err = RateLimitError::DenomBlacklisted {
            denom: info.denom.clone(),
        };
        error!(denom = %info.denom, channel = %info.channel_id, %direction, "transfer denied");
        events.emit(events::transfer_denied(
            DENIAL_BLACKLISTED,
            &direction.to_string(),
            &info.denom,
            &info.channel_id,
            info.amount,
            &err.to_string(),
        ));
        return Err(err);
    }

    let Some(mut rate_limit) = get_rate_limit(store, &info.denom, &info.channel_id)? else {
        return Ok(false);
    };

    if is_address_pair_whitelisted(store, &info.sender, &info.receiver) {
        debug!(sender = %info.sender, receiver = %info.receiver, "whitelisted transfer bypasses quota");
        return Ok(false);
    }

    let update = match direction {
        PacketDirection::Send => rate_limit.flow.add_outflow(info.amount, rate_limit.quota),
        PacketDirection::Recv => rate_limit.flow.add_inflow(info.amount, rate_limit.quota),
    };
    if let Err(err) = update {
        error!(denom = %info.denom, channel = %info.channel_id, %direction, %err, "transfer denied");
        events.emit(events::transfer_denied(
            DENIAL_QUOTA,
            &direction.to_string(),
            &info.denom,
            &info.channel_id,
            info.amount,
            &err.to_string(),
        ));
        return Err(err);
    }

    set_rate_limit(store, &rate_limit)?;
    Ok(true)
}

/// Send hook: runs before the packet is handed to the channel.
///
/// The local channel end of a send is the packet's *source* channel. When
/// the quota is consumed, the (channel, sequence) is remembered so a failed
/// ack or a timeout can roll the outflow back.
pub fn on_send_packet(
    store: &dyn Store,
    events: &mut dyn EventSink,
    packet: &Packet,
) -> Result<(), RateLimitError> {
    let (data, amount) = parse_packet_data(packet)?;
    let info = RateLimitedPacketInfo {
        channel_id: packet.source_channel.clone(),
        denom: parse_denom_from_send(&data.denom),
        amount,
        sender: data.sender,
        receiver: data.receiver,
    };

    let updated = check_rate_limit_and_update_flow(store, events, PacketDirection::Send, &info)?;
    if updated {
        set_pending_send_packet(store, &packet.source_channel, packet.sequence);
    }
    Ok(())
}

/// Receive hook: runs before the packet reaches the transfer application.
///
/// The local channel end of a receive is the packet's *destination* channel.
pub fn on_recv_packet(
    store: &dyn Store,
    events: &mut dyn EventSink,
    packet: &Packet,
) -> Result<(), RateLimitError> {
    let (data, amount) = parse_packet_data(packet)?;
    let info = RateLimitedPacketInfo {
        channel_id: packet.destination_channel.clone(),
        denom: parse_denom_from_recv(
            &packet.source_port,
            &packet.source_channel,
            &packet.destination_port,
            &packet.destination_channel,
            &data.denom,
        ),
        amount,
        sender: data.sender,
        receiver: data.receiver,
    };

    check_rate_limit_and_update_flow(store, events, PacketDirection::Recv, &info)?;
    Ok(())
}

/// Acknowledgement hook for a packet this chain sent.
///
/// A successful ack just retires the pending entry; a failed ack also undoes
/// the outflow the send consumed.
pub fn on_ack_packet(
    store: &dyn Store,
    packet: &Packet,
    success: bool,
) -> Result<(), RateLimitError> {
    if success {
        remove_pending_send_packet(store, &packet.source_channel, packet.sequence);
        return Ok(());
    }
    undo_send_packet(store, packet)
}

/// Timeout hook for a packet this chain sent; equivalent to a failed ack.
pub fn on_timeout_packet(store: &dyn Store, packet: &Packet) -> Result<(), RateLimitError> {
    undo_send_packet(store, packet)
}

/// Rolls back the outflow of a send that did not complete, provided the
/// packet was sent during the current window.
fn undo_send_packet(store: &dyn Store, packet: &Packet) -> Result<(), RateLimitError> {
    let (data, amount) = parse_packet_data(packet)?;
    let denom = parse_denom_from_send(&data.denom);

    let Some(mut rate_limit) = get_rate_limit(store, &denom, &packet.source_channel)? else {
        return Ok(());
    };

    if is_packet_pending(store, &packet.source_channel, packet.sequence) {
        rate_limit.flow.outflow = rate_limit.flow.outflow.saturating_sub(amount);
        set_rate_limit(store, &rate_limit)?;
        remove_pending_send_packet(store, &packet.source_channel, packet.sequence);
        debug!(
            %denom,
            channel = %packet.source_channel,
            sequence = packet.sequence,
            %amount,
            "rolled back outflow for unacknowledged send"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use floe_db::MemStore;
    use floe_primitives::events::Event;

    use super::*;
    use crate::{
        store::{add_denom_to_blacklist, set_whitelisted_address_pair},
        types::{Flow, Path, Quota, RateLimit, WhitelistedAddressPair},
    };

    fn packet(sequence: u64, denom: &str, amount: u128) -> Packet {
        let data = FungibleTokenPacketData {
            denom: denom.to_string(),
            amount: amount.to_string(),
            sender: "floe1sender".to_string(),
            receiver: "celestia1receiver".to_string(),
            memo: String::new(),
        };
        Packet {
            sequence,
            source_port: "transfer".to_string(),
            source_channel: "channel-0".to_string(),
            destination_port: "transfer".to_string(),
            destination_channel: "channel-9".to_string(),
            data: serde_json::to_vec(&data).unwrap(),
        }
    }

    fn install_limit(store: &MemStore, denom: &str, channel_value: u128) {
        set_rate_limit(
            store,
            &RateLimit {
                path: Path {
                    denom: denom.to_string(),
                    channel_id: "channel-0".to_string(),
                },
                quota: Quota {
                    max_percent_send: 10,
                    max_percent_recv: 10,
                    duration_hours: 24,
                },
                flow: Flow::new(channel_value),
            },
        )
        .unwrap();
    }

    #[test]
    fn send_counts_outflow_and_tracks_pending() {
        let store = MemStore::new();
        let mut events: Vec<Event> = Vec::new();
        install_limit(&store, "ufloe", 100);

        on_send_packet(&store, &mut events, &packet(1, "ufloe", 5)).unwrap();

        let limit = get_rate_limit(&store, "ufloe", "channel-0").unwrap().unwrap();
        assert_eq!(limit.flow.outflow, 5);
        assert!(is_packet_pending(&store, "channel-0", 1));
        assert!(events.is_empty());
    }

    #[test]
    fn send_without_limit_passes_unaccounted() {
        let store = MemStore::new();
        let mut events: Vec<Event> = Vec::new();

        on_send_packet(&store, &mut events, &packet(1, "uother", 5)).unwrap();
        assert!(!is_packet_pending(&store, "channel-0", 1));
    }

    #[test]
    fn quota_denial_emits_event_and_preserves_flow() {
        let store = MemStore::new();
        let mut events: Vec<Event> = Vec::new();
        install_limit(&store, "ufloe", 100);

        let err = on_send_packet(&store, &mut events, &packet(1, "ufloe", 15)).unwrap_err();
        assert!(matches!(err, RateLimitError::QuotaExceeded { .. }));

        let limit = get_rate_limit(&store, "ufloe", "channel-0").unwrap().unwrap();
        assert_eq!(limit.flow.outflow, 0);
        assert!(!is_packet_pending(&store, "channel-0", 1));

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, "transfer_denied");
        assert_eq!(events[0].get("reason"), Some(DENIAL_QUOTA));
        assert_eq!(events[0].get("action"), Some("send"));
    }

    #[test]
    fn blacklist_denies_even_whitelisted_pairs() {
        let store = MemStore::new();
        let mut events: Vec<Event> = Vec::new();
        install_limit(&store, "stutia", 100);
        add_denom_to_blacklist(&store, "stutia");
        set_whitelisted_address_pair(
            &store,
            &WhitelistedAddressPair {
                sender: "floe1sender".to_string(),
                receiver: "celestia1receiver".to_string(),
            },
        )
        .unwrap();

        let err = on_send_packet(&store, &mut events, &packet(1, "stutia", 1)).unwrap_err();
        assert!(matches!(err, RateLimitError::DenomBlacklisted { .. }));
        assert_eq!(events[0].get("reason"), Some(DENIAL_BLACKLISTED));
    }

    #[test]
    fn whitelisted_pair_bypasses_quota() {
        let store = MemStore::new();
        let mut events: Vec<Event> = Vec::new();
        install_limit(&store, "ufloe", 100);
        set_whitelisted_address_pair(
            &store,
            &WhitelistedAddressPair {
                sender: "floe1sender".to_string(),
                receiver: "celestia1receiver".to_string(),
            },
        )
        .unwrap();

        // far over quota, but whitelisted
        on_send_packet(&store, &mut events, &packet(1, "ufloe", 90)).unwrap();
        let limit = get_rate_limit(&store, "ufloe", "channel-0").unwrap().unwrap();
        assert_eq!(limit.flow.outflow, 0);
        assert!(!is_packet_pending(&store, "channel-0", 1));
    }

    #[test]
    fn failed_ack_rolls_back_outflow() {
        let store = MemStore::new();
        let mut events: Vec<Event> = Vec::new();
        install_limit(&store, "ufloe", 100);
        let pkt = packet(1, "ufloe", 5);

        on_send_packet(&store, &mut events, &pkt).unwrap();
        on_ack_packet(&store, &pkt, false).unwrap();

        let limit = get_rate_limit(&store, "ufloe", "channel-0").unwrap().unwrap();
        assert_eq!(limit.flow.outflow, 0);
        assert!(!is_packet_pending(&store, "channel-0", 1));
    }

    #[test]
    fn successful_ack_keeps_outflow() {
        let store = MemStore::new();
        let mut events: Vec<Event> = Vec::new();
        install_limit(&store, "ufloe", 100);
        let pkt = packet(1, "ufloe", 5);

        on_send_packet(&store, &mut events, &pkt).unwrap();
        on_ack_packet(&store, &pkt, true).unwrap();

        let limit = get_rate_limit(&store, "ufloe", "channel-0").unwrap().unwrap();
        assert_eq!(limit.flow.outflow, 5);
        assert!(!is_packet_pending(&store, "channel-0", 1));
    }

    #[test]
    fn timeout_after_quota_reset_is_ignored() {
        let store = MemStore::new();
        let mut events: Vec<Event> = Vec::new();
        install_limit(&store, "ufloe", 100);
        let pkt = packet(1, "ufloe", 5);
        on_send_packet(&store, &mut events, &pkt).unwrap();

        // quota reset clears the pending set; the late timeout must not
        // decrement the fresh window's flow
        remove_pending_send_packet(&store, "channel-0", 1);
        install_limit(&store, "ufloe", 100);
        on_timeout_packet(&store, &pkt).unwrap();

        let limit = get_rate_limit(&store, "ufloe", "channel-0").unwrap().unwrap();
        assert_eq!(limit.flow.outflow, 0);
    }

    #[test]
    fn recv_accounts_under_destination_channel() {
        let store = MemStore::new();
        let mut events: Vec<Event> = Vec::new();

        // inbound voucher: local chain is the sink, accounting denom is the
        // hash of transfer/channel-9/uosmo
        let accounting =
            floe_primitives::denom::hash_denom_trace("transfer/channel-9/uosmo");
        set_rate_limit(
            &store,
            &RateLimit {
                path: Path {
                    denom: accounting.clone(),
                    channel_id: "channel-9".to_string(),
                },
                quota: Quota {
                    max_percent_send: 10,
                    max_percent_recv: 10,
                    duration_hours: 24,
                },
                flow: Flow::new(1_000),
            },
        )
        .unwrap();

        on_recv_packet(&store, &mut events, &packet(3, "uosmo", 50)).unwrap();
        let limit = get_rate_limit(&store, &accounting, "channel-9").unwrap().unwrap();
        assert_eq!(limit.flow.inflow, 50);
    }

    #[test]
    fn ack_parsing() {
        assert_eq!(ack_succeeded(br#"{"result":"AQ=="}"#), Ok(true));
        assert_eq!(
            ack_succeeded(br#"{"error":"insufficient funds"}"#),
            Ok(false)
        );
        assert!(matches!(
            ack_succeeded(b"garbage"),
            Err(RateLimitError::InvalidPacket(_))
        ));
    }

    #[test]
    fn malformed_packet_is_fatal() {
        let store = MemStore::new();
        let mut events: Vec<Event> = Vec::new();
        let pkt = Packet {
            data: b"not-json".to_vec(),
            ..packet(1, "ufloe", 1)
        };
        assert!(matches!(
            on_send_packet(&store, &mut events, &pkt),
            Err(RateLimitError::InvalidPacket(_))
        ));
    }
}
