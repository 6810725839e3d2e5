//! A store-backed mock of the collaborator staking module's host-zone
//! delegated-total mirror.

use floe_core::collaborators::StakingMirror;
use floe_db::Store;
use floe_primitives::Amount;

const TOTAL_PREFIX: &[u8] = b"mock-staking/total/";

/// Staking mirror keeping the delegated total in the shared store.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockStakingMirror;

impl MockStakingMirror {
    fn key(chain_id: &str) -> Vec<u8> {
        [TOTAL_PREFIX, chain_id.as_bytes()].concat()
    }
}

impl StakingMirror for MockStakingMirror {
    fn total_delegations(&self, store: &dyn Store, chain_id: &str) -> Amount {
        store
            .get(&Self::key(chain_id))
            .and_then(|bytes| Some(u128::from_be_bytes(bytes.try_into().ok()?)))
            .unwrap_or(0)
    }

    fn set_total_delegations(&self, store: &dyn Store, chain_id: &str, total: Amount) {
        store.set(&Self::key(chain_id), &total.to_be_bytes());
    }
}
