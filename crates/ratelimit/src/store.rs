//! Stores for rate limits, the denom blacklist, the address whitelist and
//! the pending-send set.

use floe_db::{codec, DbResult, Store};

use crate::{
    keys::{
        blacklist_key, pending_send_key, rate_limit_key, split_pending_send_key, whitelist_key,
        DENOM_BLACKLIST_PREFIX, PENDING_SEND_PACKET_PREFIX, RATE_LIMIT_PREFIX,
    },
    types::{RateLimit, WhitelistedAddressPair},
};

const MARKER: &[u8] = &[1];

/// Writes or replaces a rate limit.
pub fn set_rate_limit(store: &dyn Store, rate_limit: &RateLimit) -> DbResult<()> {
    store.set(
        &rate_limit_key(&rate_limit.path.denom, &rate_limit.path.channel_id),
        &codec::encode(rate_limit)?,
    );
    Ok(())
}

/// Reads the rate limit for a path, if one exists.
pub fn get_rate_limit(
    store: &dyn Store,
    denom: &str,
    channel_id: &str,
) -> DbResult<Option<RateLimit>> {
    store
        .get(&rate_limit_key(denom, channel_id))
        .map(|bytes| codec::decode(&bytes))
        .transpose()
}

/// Removes the rate limit for a path.
pub fn remove_rate_limit(store: &dyn Store, denom: &str, channel_id: &str) {
    store.delete(&rate_limit_key(denom, channel_id));
}

/// All rate limits.
pub fn all_rate_limits(store: &dyn Store) -> DbResult<Vec<RateLimit>> {
    store
        .scan_prefix(RATE_LIMIT_PREFIX)
        .into_iter()
        .map(|(_, bytes)| codec::decode(&bytes))
        .collect()
}

/// Adds a denom to the blacklist.
pub fn add_denom_to_blacklist(store: &dyn Store, denom: &str) {
    store.set(&blacklist_key(denom), MARKER);
}

/// Removes a denom from the blacklist.
pub fn remove_denom_from_blacklist(store: &dyn Store, denom: &str) {
    store.delete(&blacklist_key(denom));
}

/// Whether a denom is blacklisted.
pub fn is_denom_blacklisted(store: &dyn Store, denom: &str) -> bool {
    store.has(&blacklist_key(denom))
}

/// All blacklisted denoms.
pub fn all_blacklisted_denoms(store: &dyn Store) -> Vec<String> {
    store
        .scan_prefix(DENOM_BLACKLIST_PREFIX)
        .into_iter()
        .filter_map(|(key, _)| {
            String::from_utf8(key[DENOM_BLACKLIST_PREFIX.len()..].to_vec()).ok()
        })
        .collect()
}

/// Adds a (sender, receiver) pair to the whitelist.
pub fn set_whitelisted_address_pair(store: &dyn Store, pair: &WhitelistedAddressPair) -> DbResult<()> {
    store.set(
        &whitelist_key(&pair.sender, &pair.receiver),
        &codec::encode(pair)?,
    );
    Ok(())
}

/// Removes a (sender, receiver) pair from the whitelist.
pub fn remove_whitelisted_address_pair(store: &dyn Store, sender: &str, receiver: &str) {
    store.delete(&whitelist_key(sender, receiver));
}

/// Whether a (sender, receiver) pair bypasses flow accounting.
pub fn is_address_pair_whitelisted(store: &dyn Store, sender: &str, receiver: &str) -> bool {
    store.has(&whitelist_key(sender, receiver))
}

/// All whitelisted address pairs.
pub fn all_whitelisted_address_pairs(store: &dyn Store) -> DbResult<Vec<WhitelistedAddressPair>> {
    store
        .scan_prefix(crate::keys::ADDRESS_WHITELIST_PREFIX)
        .into_iter()
        .map(|(_, bytes)| codec::decode(&bytes))
        .collect()
}

/// Marks an outgoing packet as counted in the current window.
pub fn set_pending_send_packet(store: &dyn Store, channel_id: &str, sequence: u64) {
    store.set(&pending_send_key(channel_id, sequence), MARKER);
}

/// Drops a resolved packet from the pending-send set.
pub fn remove_pending_send_packet(store: &dyn Store, channel_id: &str, sequence: u64) {
    store.delete(&pending_send_key(channel_id, sequence));
}

/// Whether the packet was sent during the current window.
pub fn is_packet_pending(store: &dyn Store, channel_id: &str, sequence: u64) -> bool {
    store.has(&pending_send_key(channel_id, sequence))
}

/// All pending send packets as (channel, sequence) pairs.
pub fn all_pending_send_packets(store: &dyn Store) -> Vec<(String, u64)> {
    store
        .scan_prefix(PENDING_SEND_PACKET_PREFIX)
        .into_iter()
        .filter_map(|(key, _)| split_pending_send_key(&key))
        .collect()
}

/// Clears a channel's pending-send entries; runs when its quota resets.
pub fn remove_all_channel_pending_send_packets(store: &dyn Store, channel_id: &str) {
    for (channel, sequence) in all_pending_send_packets(store) {
        if channel == channel_id {
            remove_pending_send_packet(store, &channel, sequence);
        }
    }
}

#[cfg(test)]
mod tests {
    use floe_db::MemStore;

    use super::*;
    use crate::types::{Flow, Path, Quota};

    fn rate_limit(denom: &str, channel: &str) -> RateLimit {
        RateLimit {
            path: Path {
                denom: denom.to_string(),
                channel_id: channel.to_string(),
            },
            quota: Quota {
                max_percent_send: 10,
                max_percent_recv: 10,
                duration_hours: 24,
            },
            flow: Flow::new(1_000),
        }
    }

    #[test]
    fn rate_limit_crud() {
        let store = MemStore::new();
        let limit = rate_limit("utia", "channel-0");
        set_rate_limit(&store, &limit).unwrap();

        assert_eq!(
            get_rate_limit(&store, "utia", "channel-0").unwrap(),
            Some(limit)
        );
        assert_eq!(get_rate_limit(&store, "utia", "channel-1").unwrap(), None);

        set_rate_limit(&store, &rate_limit("utia", "channel-1")).unwrap();
        assert_eq!(all_rate_limits(&store).unwrap().len(), 2);

        remove_rate_limit(&store, "utia", "channel-0");
        assert_eq!(all_rate_limits(&store).unwrap().len(), 1);
    }

    #[test]
    fn blacklist_membership() {
        let store = MemStore::new();
        add_denom_to_blacklist(&store, "stutia");

        assert!(is_denom_blacklisted(&store, "stutia"));
        assert!(!is_denom_blacklisted(&store, "utia"));
        assert_eq!(all_blacklisted_denoms(&store), vec!["stutia".to_string()]);

        remove_denom_from_blacklist(&store, "stutia");
        assert!(!is_denom_blacklisted(&store, "stutia"));
    }

    #[test]
    fn whitelist_membership() {
        let store = MemStore::new();
        let pair = WhitelistedAddressPair {
            sender: "floe1deposit".to_string(),
            receiver: "celestia1delegation".to_string(),
        };
        set_whitelisted_address_pair(&store, &pair).unwrap();

        assert!(is_address_pair_whitelisted(
            &store,
            "floe1deposit",
            "celestia1delegation"
        ));
        assert!(!is_address_pair_whitelisted(
            &store,
            "celestia1delegation",
            "floe1deposit"
        ));
        assert_eq!(all_whitelisted_address_pairs(&store).unwrap(), vec![pair]);
    }

    #[test]
    fn pending_send_set_per_channel_cleanup() {
        let store = MemStore::new();
        set_pending_send_packet(&store, "channel-0", 1);
        set_pending_send_packet(&store, "channel-0", 2);
        set_pending_send_packet(&store, "channel-7", 1);

        assert!(is_packet_pending(&store, "channel-0", 1));
        assert_eq!(all_pending_send_packets(&store).len(), 3);

        remove_all_channel_pending_send_packets(&store, "channel-0");
        assert_eq!(
            all_pending_send_packets(&store),
            vec![("channel-7".to_string(), 1)]
        );
    }
}
