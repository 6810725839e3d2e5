//! A fixed-table mock of the IBC channel keeper.

use floe_db::Store;
use floe_ratelimit::gov::ChannelRegistry;

/// Channel registry answering from a static (channel, chain) table.
#[derive(Debug, Clone, Default)]
pub struct MockChannels {
    entries: Vec<(String, String)>,
}

impl MockChannels {
    /// Creates a registry from (channel id, counterparty chain id) pairs.
    pub fn new(entries: Vec<(&str, &str)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(channel, chain)| (channel.to_string(), chain.to_string()))
                .collect(),
        }
    }
}

impl ChannelRegistry for MockChannels {
    fn channel_exists(&self, _store: &dyn Store, channel_id: &str) -> bool {
        self.entries.iter().any(|(channel, _)| channel == channel_id)
    }

    fn counterparty_chain_id(&self, _store: &dyn Store, channel_id: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|(channel, _)| channel == channel_id)
            .map(|(_, chain)| chain.clone())
    }
}
