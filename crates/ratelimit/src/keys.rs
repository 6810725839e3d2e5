//! Store key layout for the rate limiter.

use floe_db::keys::channel_sequence_key;
use floe_primitives::constants::CHANNEL_ID_KEY_WIDTH;

/// Prefix of rate-limit records, keyed `denom || channelId`.
pub const RATE_LIMIT_PREFIX: &[u8] = b"rate-limit/";

/// Prefix of blacklisted denoms.
pub const DENOM_BLACKLIST_PREFIX: &[u8] = b"denom-blacklist/";

/// Prefix of whitelisted address pairs, keyed `sender || receiver`.
pub const ADDRESS_WHITELIST_PREFIX: &[u8] = b"address-whitelist/";

/// Prefix of pending send packets, keyed `channelId || sequence`.
pub const PENDING_SEND_PACKET_PREFIX: &[u8] = b"pending-send-packet/";

/// Builds the key of one rate limit.
pub fn rate_limit_key(denom: &str, channel_id: &str) -> Vec<u8> {
    [RATE_LIMIT_PREFIX, denom.as_bytes(), channel_id.as_bytes()].concat()
}

/// Builds the key of one blacklisted denom.
pub fn blacklist_key(denom: &str) -> Vec<u8> {
    [DENOM_BLACKLIST_PREFIX, denom.as_bytes()].concat()
}

/// Builds the key of one whitelisted address pair.
pub fn whitelist_key(sender: &str, receiver: &str) -> Vec<u8> {
    [
        ADDRESS_WHITELIST_PREFIX,
        sender.as_bytes(),
        receiver.as_bytes(),
    ]
    .concat()
}

/// Builds the key of one pending send packet.
pub fn pending_send_key(channel_id: &str, sequence: u64) -> Vec<u8> {
    channel_sequence_key(PENDING_SEND_PACKET_PREFIX, channel_id, sequence)
}

/// Splits a pending-send key back into its channel id and sequence.
pub fn split_pending_send_key(key: &[u8]) -> Option<(String, u64)> {
    let rest = key.strip_prefix(PENDING_SEND_PACKET_PREFIX)?;
    if rest.len() != CHANNEL_ID_KEY_WIDTH + 8 {
        return None;
    }
    let (channel_bytes, seq_bytes) = rest.split_at(CHANNEL_ID_KEY_WIDTH);
    let channel = String::from_utf8(
        channel_bytes
            .iter()
            .copied()
            .take_while(|b| *b != 0)
            .collect(),
    )
    .ok()?;
    let sequence = u64::from_be_bytes(seq_bytes.try_into().ok()?);
    Some((channel, sequence))
}
