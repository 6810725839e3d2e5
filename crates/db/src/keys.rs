//! Store key layout.
//!
//! Keys are byte-concatenations of a prefix and fixed-width big-endian ids so
//! that iteration order equals numeric order. Channel ids inside composite
//! keys are padded to a fixed width with trailing zeros.

use floe_primitives::{constants::CHANNEL_ID_KEY_WIDTH, Address};

/// Key of the host zone singleton.
pub const HOST_ZONE_KEY: &[u8] = b"host-zone";

/// Prefix of live delegation records.
pub const DELEGATION_ACTIVE_PREFIX: &[u8] = b"delegation-records-active/";

/// Prefix of archived delegation records.
pub const DELEGATION_ARCHIVE_PREFIX: &[u8] = b"delegation-records-archive/";

/// Prefix of live unbonding records.
pub const UNBONDING_ACTIVE_PREFIX: &[u8] = b"unbonding-records-active/";

/// Prefix of archived unbonding records.
pub const UNBONDING_ARCHIVE_PREFIX: &[u8] = b"unbonding-records-archive/";

/// Prefix of redemption records, keyed `unbondingId || address`.
pub const REDEMPTION_PREFIX: &[u8] = b"redemption-records/";

/// Prefix of slash records.
pub const SLASH_PREFIX: &[u8] = b"slash-records/";

/// Prefix of transfer-in-progress markers, keyed `channelId || sequence`.
pub const TRANSFER_IN_PROGRESS_PREFIX: &[u8] = b"transfer-in-progress/";

/// Builds `prefix || u64 big-endian id`.
pub fn id_key(prefix: &[u8], id: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(prefix.len() + 8);
    key.extend_from_slice(prefix);
    key.extend_from_slice(&id.to_be_bytes());
    key
}

/// Pads a channel id to its fixed key width with trailing zeros.
pub fn padded_channel_id(channel_id: &str) -> [u8; CHANNEL_ID_KEY_WIDTH] {
    let mut padded = [0u8; CHANNEL_ID_KEY_WIDTH];
    let bytes = channel_id.as_bytes();
    let len = bytes.len().min(CHANNEL_ID_KEY_WIDTH);
    padded[..len].copy_from_slice(&bytes[..len]);
    padded
}

/// Builds `prefix || 16-byte channelId || u64 big-endian sequence`.
pub fn channel_sequence_key(prefix: &[u8], channel_id: &str, sequence: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(prefix.len() + CHANNEL_ID_KEY_WIDTH + 8);
    key.extend_from_slice(prefix);
    key.extend_from_slice(&padded_channel_id(channel_id));
    key.extend_from_slice(&sequence.to_be_bytes());
    key
}

/// Builds `prefix || u64 big-endian unbondingId || bech32 address`.
pub fn redemption_key(unbonding_id: u64, redeemer: &Address) -> Vec<u8> {
    let mut key = id_key(REDEMPTION_PREFIX, unbonding_id);
    key.extend_from_slice(redeemer.as_bytes());
    key
}

/// The prefix covering every redemption record of one unbonding record.
pub fn redemption_unbonding_prefix(unbonding_id: u64) -> Vec<u8> {
    id_key(REDEMPTION_PREFIX, unbonding_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_keys_sort_numerically() {
        let low = id_key(DELEGATION_ACTIVE_PREFIX, 2);
        let high = id_key(DELEGATION_ACTIVE_PREFIX, 300);
        assert!(low < high);
    }

    #[test]
    fn channel_padding_is_fixed_width() {
        let key_a = channel_sequence_key(TRANSFER_IN_PROGRESS_PREFIX, "channel-0", 1);
        let key_b = channel_sequence_key(TRANSFER_IN_PROGRESS_PREFIX, "channel-1000", 1);
        assert_eq!(key_a.len(), key_b.len());
    }

    #[test]
    fn redemption_keys_group_by_unbonding_id() {
        let redeemer = Address::new("floe1redeemer");
        let key = redemption_key(5, &redeemer);
        assert!(key.starts_with(&redemption_unbonding_prefix(5)));
        assert!(!key.starts_with(&redemption_unbonding_prefix(6)));
    }
}
