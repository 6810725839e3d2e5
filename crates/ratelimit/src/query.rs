//! Read-only query surface of the rate limiter.

use floe_db::Store;

use crate::{
    errors::RateLimitError,
    gov::ChannelRegistry,
    store,
    types::{RateLimit, WhitelistedAddressPair},
};

/// All rate limits.
pub fn all_rate_limits(store: &dyn Store) -> Result<Vec<RateLimit>, RateLimitError> {
    Ok(store::all_rate_limits(store)?)
}

/// The rate limit for one path, if any.
pub fn rate_limit(
    store: &dyn Store,
    denom: &str,
    channel_id: &str,
) -> Result<Option<RateLimit>, RateLimitError> {
    Ok(store::get_rate_limit(store, denom, channel_id)?)
}

/// All rate limits whose channel connects to the given chain.
pub fn rate_limits_by_chain_id(
    store: &dyn Store,
    channels: &dyn ChannelRegistry,
    chain_id: &str,
) -> Result<Vec<RateLimit>, RateLimitError> {
    Ok(store::all_rate_limits(store)?
        .into_iter()
        .filter(|limit| {
            channels
                .counterparty_chain_id(store, &limit.path.channel_id)
                .is_some_and(|counterparty| counterparty == chain_id)
        })
        .collect())
}

/// All blacklisted denoms.
pub fn all_blacklisted_denoms(store: &dyn Store) -> Vec<String> {
    store::all_blacklisted_denoms(store)
}

/// All whitelisted address pairs.
pub fn all_whitelisted_addresses(
    store: &dyn Store,
) -> Result<Vec<WhitelistedAddressPair>, RateLimitError> {
    Ok(store::all_whitelisted_address_pairs(store)?)
}

/// All pending send packets, rendered `channel/sequence`.
pub fn all_pending_send_packets(store: &dyn Store) -> Vec<String> {
    store::all_pending_send_packets(store)
        .into_iter()
        .map(|(channel, sequence)| format!("{channel}/{sequence}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use floe_db::MemStore;

    use super::*;
    use crate::types::{Flow, Path, Quota};

    #[derive(Debug)]
    struct FakeChannels;

    impl ChannelRegistry for FakeChannels {
        fn channel_exists(&self, _store: &dyn Store, _channel_id: &str) -> bool {
            true
        }

        fn counterparty_chain_id(&self, _store: &dyn Store, channel_id: &str) -> Option<String> {
            match channel_id {
                "channel-0" => Some("celestia-1".to_string()),
                "channel-1" => Some("osmosis-1".to_string()),
                _ => None,
            }
        }
    }

    fn limit(denom: &str, channel: &str) -> RateLimit {
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
            flow: Flow::new(100),
        }
    }

    #[test]
    fn chain_id_filter() {
        let store = MemStore::new();
        store::set_rate_limit(&store, &limit("utia", "channel-0")).unwrap();
        store::set_rate_limit(&store, &limit("uosmo", "channel-1")).unwrap();

        let celestia = rate_limits_by_chain_id(&store, &FakeChannels, "celestia-1").unwrap();
        assert_eq!(celestia.len(), 1);
        assert_eq!(celestia[0].path.channel_id, "channel-0");
    }

    #[test]
    fn pending_packet_rendering() {
        let store = MemStore::new();
        store::set_pending_send_packet(&store, "channel-0", 4);
        assert_eq!(all_pending_send_packets(&store), vec!["channel-0/4"]);
    }
}
