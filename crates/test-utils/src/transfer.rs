//! A mock of the cross-chain transfer module.
//!
//! Outbound coins are escrowed in a module account, the packet is recorded
//! in the store with an increasing per-channel sequence, and tests replay
//! the recorded packet into the rate-limit middleware or the ack callbacks.

use std::{collections::HashMap, sync::Arc};

use floe_core::collaborators::{Bank, CollaboratorError, TransferKeeper, TransferMsg};
use floe_db::Store;
use floe_ratelimit::middleware::{FungibleTokenPacketData, Packet};

use crate::bank::MockBank;

/// Module account escrowing outbound transfers.
pub const ESCROW_MODULE: &str = "transfer-escrow";

/// Destination channel stamped on recorded packets.
pub const COUNTERPARTY_CHANNEL: &str = "channel-450";

const SEQUENCE_PREFIX: &[u8] = b"mock-transfer/sequence/";
const OUTBOUND_PREFIX: &[u8] = b"mock-transfer/outbound/";

/// Transfer mock escrowing through the mock bank.
#[derive(Debug)]
pub struct MockTransfer {
    bank: Arc<MockBank>,
    /// Maps a local voucher denom to the full trace the packet would carry.
    denom_traces: HashMap<String, String>,
}

impl MockTransfer {
    /// Creates a transfer mock. `denom_traces` maps `ibc/...` vouchers to
    /// the `port/channel/base` trace the real module would unwrap them to.
    pub fn new(bank: Arc<MockBank>, denom_traces: HashMap<String, String>) -> Self {
        Self { bank, denom_traces }
    }

    fn sequence_key(channel_id: &str) -> Vec<u8> {
        [SEQUENCE_PREFIX, channel_id.as_bytes()].concat()
    }

    fn outbound_key(channel_id: &str, sequence: u64) -> Vec<u8> {
        [
            OUTBOUND_PREFIX,
            channel_id.as_bytes(),
            b"/",
            &sequence.to_be_bytes(),
        ]
        .concat()
    }

    fn next_sequence(store: &dyn Store, channel_id: &str) -> u64 {
        let key = Self::sequence_key(channel_id);
        let next = store
            .get(&key)
            .and_then(|bytes| Some(u64::from_be_bytes(bytes.try_into().ok()?)))
            .unwrap_or(0);
        store.set(&key, &(next + 1).to_be_bytes());
        next
    }

    /// The packet a previous transfer produced, for replay into middleware
    /// hooks or ack callbacks.
    pub fn outbound_packet(store: &dyn Store, channel_id: &str, sequence: u64) -> Option<Packet> {
        store
            .get(&Self::outbound_key(channel_id, sequence))
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
    }
}

impl TransferKeeper for MockTransfer {
    fn transfer(&self, store: &dyn Store, msg: &TransferMsg) -> Result<u64, CollaboratorError> {
        self.bank
            .send_to_module(store, &msg.sender, ESCROW_MODULE, &[msg.token.clone()])?;

        let sequence = Self::next_sequence(store, &msg.source_channel);
        let packet_denom = self
            .denom_traces
            .get(&msg.token.denom)
            .cloned()
            .unwrap_or_else(|| msg.token.denom.clone());
        let packet = Packet {
            sequence,
            source_port: msg.source_port.clone(),
            source_channel: msg.source_channel.clone(),
            destination_port: "transfer".to_string(),
            destination_channel: COUNTERPARTY_CHANNEL.to_string(),
            data: serde_json::to_vec(&FungibleTokenPacketData {
                denom: packet_denom,
                amount: msg.token.amount.to_string(),
                sender: msg.sender.to_string(),
                receiver: msg.receiver.clone(),
                memo: String::new(),
            })
            .map_err(|e| CollaboratorError::TransferFailed(e.to_string()))?,
        };
        store.set(
            &Self::outbound_key(&msg.source_channel, sequence),
            &serde_json::to_vec(&packet)
                .map_err(|e| CollaboratorError::TransferFailed(e.to_string()))?,
        );

        Ok(sequence)
    }
}
